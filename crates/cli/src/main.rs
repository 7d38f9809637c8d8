mod settings;

use std::path::PathBuf;
use std::process;
use std::time::Duration;

use clap::Parser;

use backdrop_core::blurring::infrastructure::cpu_gaussian_blurrer::CpuGaussianBlurrer;
use backdrop_core::pipeline::blur_controller::BlurController;
use backdrop_core::pipeline::pipeline_logger::StdoutPipelineLogger;
use backdrop_core::pipeline::tick_driver::TickDriver;
use backdrop_core::segmentation::infrastructure::mog2_background_model::Mog2BackgroundModel;
use backdrop_core::shared::blur_radius::BlurRadius;
use backdrop_core::shared::errors::PipelineError;
use backdrop_core::video::infrastructure::image_file_sink::ImageFileSink;
use backdrop_core::video::infrastructure::image_sequence_source::ImageSequenceSource;

use settings::Settings;

const MAX_FPS: f64 = 240.0;

/// Live background blur over a sequence of frames.
///
/// Reads frames from INPUT_DIR at the capture rate, keeps the moving
/// subject sharp and writes the composited frames to OUTPUT_DIR.
#[derive(Parser)]
#[command(name = "backdrop")]
struct Cli {
    /// Directory of input frames (png, jpg, bmp), read in name order.
    input_dir: PathBuf,

    /// Directory the composited frames are written to.
    output_dir: PathBuf,

    /// Blur strength control value (1-99); kernel size is 2*value+1.
    #[arg(long)]
    blur_amount: Option<i32>,

    /// Pass frames through without background blur.
    #[arg(long)]
    no_blur: bool,

    /// Blur the background even if saved settings turned it off.
    #[arg(long, conflicts_with = "no_blur")]
    blur: bool,

    /// Tick rate in frames per second (default: 30).
    #[arg(long)]
    fps: Option<f64>,

    /// Restart the input sequence after the last frame.
    #[arg(long = "loop")]
    looping: bool,

    /// Stop after this many ticks.
    #[arg(long)]
    max_frames: Option<usize>,

    /// Fit output frames into WIDTHxHEIGHT, keeping the aspect ratio.
    #[arg(long)]
    viewport: Option<String>,

    /// Persist the effective blur settings for later runs.
    #[arg(long)]
    save_settings: bool,
}

/// Effective run configuration after stored settings and flags are merged.
struct RunConfig {
    settings: Settings,
    viewport: Option<(u32, u32)>,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = resolve(&cli, Settings::load())?;
    let settings = &config.settings;

    let fps = 1000.0 / settings.tick_period_ms as f64;
    let source = ImageSequenceSource::new(&cli.input_dir, fps, cli.looping);
    let mut sink = ImageFileSink::new(&cli.output_dir);
    if let Some((w, h)) = config.viewport {
        sink = sink.with_viewport(w, h);
    }

    let mut controller = BlurController::new(
        Box::new(source),
        Box::new(sink),
        Box::new(Mog2BackgroundModel::default()),
        Box::new(CpuGaussianBlurrer::new()),
    )
    .with_logger(Box::new(StdoutPipelineLogger::default()));

    controller.set_blur_radius(settings.blur_amount)?;
    controller.start()?;
    if settings.blur_enabled {
        controller.set_blur_enabled(true)?;
    }
    log::info!(
        "Blur {} (kernel {}), tick every {} ms",
        if settings.blur_enabled { "on" } else { "off" },
        controller.blur_radius(),
        settings.tick_period_ms
    );

    let driver = TickDriver::new(Duration::from_millis(settings.tick_period_ms))
        .with_max_ticks(cli.max_frames);
    match driver.run(&mut controller) {
        Ok(report) => log::info!(
            "Presented {} frames ({} composited)",
            report.ticks,
            report.composited
        ),
        Err(PipelineError::SourceReadFailure { frame_index }) if !cli.looping => {
            log::info!("Input exhausted after {frame_index} frames");
        }
        Err(e) => return Err(e.into()),
    }
    controller.logger().summary();
    controller.stop();

    if cli.save_settings {
        let path = settings.save()?;
        log::info!("Settings saved to {}", path.display());
    }

    log::info!("Output written to {}", cli.output_dir.display());
    Ok(())
}

/// Applies flags over the stored settings and rejects invalid values
/// before anything reaches the pipeline.
fn resolve(cli: &Cli, stored: Settings) -> Result<RunConfig, Box<dyn std::error::Error>> {
    if !cli.input_dir.is_dir() {
        return Err(format!("Input directory not found: {}", cli.input_dir.display()).into());
    }

    let mut settings = stored;
    if let Some(amount) = cli.blur_amount {
        settings.blur_amount = amount;
    }
    BlurRadius::from_control_value(settings.blur_amount)?;

    if cli.no_blur {
        settings.blur_enabled = false;
    } else if cli.blur {
        settings.blur_enabled = true;
    }

    if let Some(fps) = cli.fps {
        if !(fps > 0.0 && fps <= MAX_FPS) {
            return Err(format!("FPS must be between 0 and {MAX_FPS}, got {fps}").into());
        }
        settings.tick_period_ms = ((1000.0 / fps).round() as u64).max(1);
    }
    if settings.tick_period_ms == 0 {
        return Err("Tick period must be at least 1 ms".into());
    }

    if cli.max_frames == Some(0) {
        return Err("--max-frames must be at least 1".into());
    }

    let viewport = cli.viewport.as_deref().map(parse_viewport).transpose()?;

    Ok(RunConfig { settings, viewport })
}

fn parse_viewport(value: &str) -> Result<(u32, u32), Box<dyn std::error::Error>> {
    let (w, h) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("Viewport must look like WIDTHxHEIGHT, got '{value}'"))?;
    let w: u32 = w.trim().parse()?;
    let h: u32 = h.trim().parse()?;
    if w == 0 || h == 0 {
        return Err(format!("Viewport dimensions must be positive, got '{value}'").into());
    }
    Ok((w, h))
}
