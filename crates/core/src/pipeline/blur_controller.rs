use std::time::Instant;

use crate::blurring::domain::background_compositor::BackgroundCompositor;
use crate::blurring::domain::frame_blurrer::FrameBlurrer;
use crate::imaging::threshold::threshold_binary;
use crate::pipeline::pipeline_logger::{NullPipelineLogger, PipelineLogger};
use crate::segmentation::domain::background_model::BackgroundModel;
use crate::segmentation::domain::mask_conditioner::MaskConditioner;
use crate::segmentation::domain::mask_refiner::MaskRefiner;
use crate::segmentation::domain::temporal_smoother::TemporalSmoother;
use crate::shared::blur_radius::BlurRadius;
use crate::shared::constants::{FOREGROUND_THRESHOLD, LEARNING_RATE, SEED_LEARNING_RATE};
use crate::shared::errors::{ConfigError, PipelineError};
use crate::shared::frame::Frame;
use crate::shared::mask::Mask;
use crate::shared::source_info::SourceInfo;
use crate::video::domain::frame_sink::FrameSink;
use crate::video::domain::frame_source::FrameSource;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlurState {
    Disabled,
    /// `first_frame_pending` is set on every enable; the next tick seeds
    /// the model and is shown unmodified.
    Enabled { first_frame_pending: bool },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControllerState {
    Off,
    On { blur: BlurState },
}

/// What a single tick presented.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// A blurred-background composite.
    Composited,
    /// The captured frame, unmodified.
    Passthrough,
    /// The camera is off; nothing was read or shown.
    Idle,
}

/// Owns all cross-frame state and runs one segmentation and blur pass
/// per tick.
///
/// Ticks are serialized by the caller (see `TickDriver`); every mutation of
/// model statistics, masks and the last output happens inside `tick` or an
/// explicit control call.
pub struct BlurController {
    source: Box<dyn FrameSource>,
    sink: Box<dyn FrameSink>,
    model: Box<dyn BackgroundModel>,
    refiner: MaskRefiner,
    smoother: TemporalSmoother,
    conditioner: MaskConditioner,
    compositor: BackgroundCompositor,
    logger: Box<dyn PipelineLogger>,
    state: ControllerState,
    radius: BlurRadius,
    learning_rate: f64,
    previous_mask: Option<Mask>,
    last_output: Option<Frame>,
    source_info: Option<SourceInfo>,
    frames_read: usize,
}

impl BlurController {
    pub fn new(
        source: Box<dyn FrameSource>,
        sink: Box<dyn FrameSink>,
        model: Box<dyn BackgroundModel>,
        blurrer: Box<dyn FrameBlurrer>,
    ) -> Self {
        Self {
            source,
            sink,
            model,
            refiner: MaskRefiner::default(),
            smoother: TemporalSmoother::default(),
            conditioner: MaskConditioner::default(),
            compositor: BackgroundCompositor::new(blurrer),
            logger: Box::new(NullPipelineLogger),
            state: ControllerState::Off,
            radius: BlurRadius::default(),
            learning_rate: LEARNING_RATE,
            previous_mask: None,
            last_output: None,
            source_info: None,
            frames_read: 0,
        }
    }

    pub fn with_logger(mut self, logger: Box<dyn PipelineLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn with_refiner(mut self, refiner: MaskRefiner) -> Self {
        self.refiner = refiner;
        self
    }

    /// Learning rate used after the seeding frame. Negative selects the
    /// model's automatic rate.
    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn blur_radius(&self) -> BlurRadius {
        self.radius
    }

    pub fn source_info(&self) -> Option<&SourceInfo> {
        self.source_info.as_ref()
    }

    pub fn last_output(&self) -> Option<&Frame> {
        self.last_output.as_ref()
    }

    pub fn logger(&self) -> &dyn PipelineLogger {
        self.logger.as_ref()
    }

    /// Opens the frame source. Blur starts disabled.
    pub fn start(&mut self) -> Result<(), PipelineError> {
        if self.state != ControllerState::Off {
            log::debug!("start ignored: camera already running");
            return Ok(());
        }
        let info = self
            .source
            .open()
            .map_err(|e| PipelineError::SourceUnavailable(e.to_string()))?;
        log::info!(
            "Camera started: {} ({}x{} @ {:.0} fps)",
            info.name,
            info.width,
            info.height,
            info.fps
        );
        self.logger.info(&format!("Camera started: {}", info.name));
        self.source_info = Some(info);
        self.frames_read = 0;
        self.state = ControllerState::On {
            blur: BlurState::Disabled,
        };
        Ok(())
    }

    /// Releases the source and clears retained frame and mask state.
    pub fn stop(&mut self) {
        if self.state == ControllerState::Off {
            return;
        }
        self.release();
        log::info!("Camera stopped");
        self.logger.info("Camera stopped");
    }

    /// Enabling rebuilds the background model and arms the first-frame
    /// discard. Disabling keeps the model untouched.
    pub fn set_blur_enabled(&mut self, enabled: bool) -> Result<(), PipelineError> {
        let ControllerState::On { blur } = self.state else {
            return Err(PipelineError::CameraOff);
        };
        match (blur, enabled) {
            (BlurState::Disabled, true) => {
                self.model.reset();
                self.previous_mask = None;
                self.state = ControllerState::On {
                    blur: BlurState::Enabled {
                        first_frame_pending: true,
                    },
                };
                log::info!("Background blur enabled (radius {})", self.radius);
            }
            (BlurState::Enabled { .. }, false) => {
                self.state = ControllerState::On {
                    blur: BlurState::Disabled,
                };
                log::info!("Background blur disabled");
            }
            _ => {}
        }
        Ok(())
    }

    /// Applies a linear control value (`1..=99`, radius `2v+1`). Rejected
    /// values leave the current radius in place.
    pub fn set_blur_radius(&mut self, control_value: i32) -> Result<(), ConfigError> {
        let radius = BlurRadius::from_control_value(control_value)?;
        if radius != self.radius {
            log::debug!("Blur radius set to {radius}");
        }
        self.radius = radius;
        Ok(())
    }

    /// Reads one frame, processes it according to the current state and
    /// hands the result to the sink.
    ///
    /// A failed read releases the source and returns the controller to
    /// `Off`; the caller must `start` again.
    pub fn tick(&mut self) -> Result<TickOutcome, PipelineError> {
        let ControllerState::On { blur } = self.state else {
            return Ok(TickOutcome::Idle);
        };

        let Some(frame) = self.source.try_read_frame() else {
            let frame_index = self.frames_read;
            log::warn!("Could not read frame {frame_index} from camera; stopping");
            self.release();
            return Err(PipelineError::SourceReadFailure { frame_index });
        };
        self.frames_read += 1;
        self.logger.tick(frame.index());

        let (output, outcome) = match blur {
            BlurState::Disabled => (frame, TickOutcome::Passthrough),
            BlurState::Enabled {
                first_frame_pending: true,
            } => {
                self.seed(&frame);
                (frame, TickOutcome::Passthrough)
            }
            BlurState::Enabled {
                first_frame_pending: false,
            } => (self.process(&frame), TickOutcome::Composited),
        };

        self.present(output)?;
        Ok(outcome)
    }

    /// Re-presents the last output frame without reprocessing it, e.g.
    /// after the viewport was resized. Returns `false` if nothing has been
    /// shown since the camera started.
    pub fn refresh_display(&mut self) -> Result<bool, PipelineError> {
        match &self.last_output {
            Some(frame) => {
                self.sink
                    .present(frame)
                    .map_err(|e| PipelineError::Sink(e.to_string()))?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Forwards a viewport change to the sink and redraws the last frame.
    pub fn resize_viewport(&mut self, width: u32, height: u32) -> Result<bool, PipelineError> {
        self.sink.resize_viewport(width, height);
        self.refresh_display()
    }

    fn seed(&mut self, frame: &Frame) {
        let start = Instant::now();
        let raw = self.model.apply(frame, SEED_LEARNING_RATE);
        self.logger.timing("model", elapsed_ms(start));
        self.previous_mask = Some(raw);
        self.state = ControllerState::On {
            blur: BlurState::Enabled {
                first_frame_pending: false,
            },
        };
        log::debug!("Background model seeded from frame {}", frame.index());
    }

    fn process(&mut self, frame: &Frame) -> Frame {
        let start = Instant::now();
        let raw = self.model.apply(frame, self.learning_rate);
        let raw = threshold_binary(&raw, FOREGROUND_THRESHOLD);
        self.logger.timing("model", elapsed_ms(start));

        let start = Instant::now();
        let refined = self.refiner.refine(frame, &raw);
        self.logger.timing("refine", elapsed_ms(start));

        let start = Instant::now();
        let smoothed = match self.previous_mask.take() {
            Some(previous) if previous.same_size(frame) => {
                self.smoother.smooth(&refined, &previous)
            }
            _ => refined,
        };
        self.logger.timing("smooth", elapsed_ms(start));

        let start = Instant::now();
        let alpha = self.conditioner.condition(&smoothed);
        self.logger.timing("condition", elapsed_ms(start));
        self.previous_mask = Some(smoothed);

        let start = Instant::now();
        let output = self.compositor.composite(frame, &alpha, self.radius);
        self.logger.timing("composite", elapsed_ms(start));
        self.logger.metric("foreground_coverage", alpha.coverage());

        output
    }

    fn present(&mut self, output: Frame) -> Result<(), PipelineError> {
        let output = self.last_output.insert(output);
        self.sink
            .present(output)
            .map_err(|e| PipelineError::Sink(e.to_string()))
    }

    fn release(&mut self) {
        self.source.close();
        self.state = ControllerState::Off;
        self.previous_mask = None;
        self.last_output = None;
        self.source_info = None;
    }
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}
