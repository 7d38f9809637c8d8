use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::pipeline::blur_controller::{BlurController, TickOutcome};
use crate::shared::constants::TICK_PERIOD_MS;
use crate::shared::errors::PipelineError;

/// Counts of what a driver run presented.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DriverReport {
    pub ticks: usize,
    pub composited: usize,
    pub passthrough: usize,
}

/// Calls [`BlurController::tick`] at a fixed period on the current thread.
///
/// Ticks never overlap. When a tick overruns the period the next one is
/// delayed rather than queued. Setting the cancel flag stops the loop
/// before the next tick; the running tick always completes.
pub struct TickDriver {
    period: Duration,
    max_ticks: Option<usize>,
    cancelled: Arc<AtomicBool>,
}

impl TickDriver {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            max_ticks: None,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_max_ticks(mut self, max_ticks: Option<usize>) -> Self {
        self.max_ticks = max_ticks;
        self
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Shared flag that stops the driver when set to `true`.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        self.cancelled.clone()
    }

    /// Runs until cancelled, the tick limit is reached, the controller goes
    /// idle, or a tick fails. A failed tick ends the run with its error.
    pub fn run(&self, controller: &mut BlurController) -> Result<DriverReport, PipelineError> {
        let ticker = crossbeam_channel::tick(self.period);
        let mut report = DriverReport::default();

        loop {
            if self.cancelled.load(Ordering::Relaxed) {
                log::debug!("Tick driver cancelled after {} ticks", report.ticks);
                break;
            }
            if self.max_ticks.is_some_and(|max| report.ticks >= max) {
                break;
            }
            if ticker.recv().is_err() {
                break;
            }
            if self.cancelled.load(Ordering::Relaxed) {
                break;
            }

            match controller.tick()? {
                TickOutcome::Idle => break,
                TickOutcome::Composited => report.composited += 1,
                TickOutcome::Passthrough => report.passthrough += 1,
            }
            report.ticks += 1;
        }

        Ok(report)
    }
}

impl Default for TickDriver {
    fn default() -> Self {
        Self::new(Duration::from_millis(TICK_PERIOD_MS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blurring::domain::frame_blurrer::FrameBlurrer;
    use crate::segmentation::domain::background_model::BackgroundModel;
    use crate::shared::blur_radius::BlurRadius;
    use crate::shared::frame::Frame;
    use crate::shared::mask::Mask;
    use crate::shared::source_info::SourceInfo;
    use crate::video::domain::frame_sink::FrameSink;
    use crate::video::domain::frame_source::FrameSource;
    use std::time::Instant;

    /// Yields `remaining` frames, or frames forever when `None`.
    struct CountdownSource {
        remaining: Option<usize>,
        next_index: usize,
    }

    impl FrameSource for CountdownSource {
        fn open(&mut self) -> Result<SourceInfo, Box<dyn std::error::Error>> {
            Ok(SourceInfo {
                width: 8,
                height: 8,
                fps: 30.0,
                name: "countdown".to_string(),
            })
        }

        fn try_read_frame(&mut self) -> Option<Frame> {
            if let Some(remaining) = self.remaining.as_mut() {
                if *remaining == 0 {
                    return None;
                }
                *remaining -= 1;
            }
            let frame = Frame::solid(8, 8, [90, 90, 90], self.next_index);
            self.next_index += 1;
            Some(frame)
        }

        fn close(&mut self) {}
    }

    struct DiscardSink;

    impl FrameSink for DiscardSink {
        fn present(&mut self, _frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
            Ok(())
        }
    }

    struct EmptyModel;

    impl BackgroundModel for EmptyModel {
        fn apply(&mut self, frame: &Frame, _learning_rate: f64) -> Mask {
            Mask::zeros_like(frame)
        }
        fn reset(&mut self) {}
        fn frames_seen(&self) -> usize {
            0
        }
    }

    struct IdentityBlurrer;

    impl FrameBlurrer for IdentityBlurrer {
        fn blur(&self, frame: &Frame, _radius: BlurRadius) -> Frame {
            frame.clone()
        }
    }

    fn controller(remaining: Option<usize>) -> BlurController {
        let mut controller = BlurController::new(
            Box::new(CountdownSource {
                remaining,
                next_index: 0,
            }),
            Box::new(DiscardSink),
            Box::new(EmptyModel),
            Box::new(IdentityBlurrer),
        );
        controller.start().unwrap();
        controller
    }

    fn fast_driver() -> TickDriver {
        TickDriver::new(Duration::from_millis(1))
    }

    #[test]
    fn test_default_period_is_capture_rate() {
        assert_eq!(TickDriver::default().period(), Duration::from_millis(33));
    }

    #[test]
    fn test_stops_at_tick_limit() {
        let mut controller = controller(None);
        controller.set_blur_enabled(true).unwrap();
        let report = fast_driver()
            .with_max_ticks(Some(4))
            .run(&mut controller)
            .unwrap();
        assert_eq!(
            report,
            DriverReport {
                ticks: 4,
                composited: 3,
                passthrough: 1,
            }
        );
    }

    #[test]
    fn test_cancelled_before_start_runs_no_ticks() {
        let mut controller = controller(None);
        let driver = fast_driver();
        driver.cancel_handle().store(true, Ordering::Relaxed);
        let report = driver.run(&mut controller).unwrap();
        assert_eq!(report.ticks, 0);
    }

    #[test]
    fn test_cancel_from_another_thread() {
        let mut controller = controller(None);
        let driver = fast_driver();
        let cancel = driver.cancel_handle();
        let handle = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(30));
            cancel.store(true, Ordering::Relaxed);
        });
        let report = driver.run(&mut controller).unwrap();
        handle.join().unwrap();
        assert!(report.ticks > 0);
    }

    #[test]
    fn test_read_failure_ends_run_with_error() {
        let mut controller = controller(Some(3));
        let err = fast_driver().run(&mut controller).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::SourceReadFailure { frame_index: 3 }
        ));
    }

    #[test]
    fn test_idle_controller_ends_run() {
        let mut controller = controller(Some(3));
        controller.stop();
        let report = fast_driver().run(&mut controller).unwrap();
        assert_eq!(report.ticks, 0);
    }

    #[test]
    fn test_ticks_are_paced() {
        let mut controller = controller(None);
        let start = Instant::now();
        TickDriver::new(Duration::from_millis(10))
            .with_max_ticks(Some(3))
            .run(&mut controller)
            .unwrap();
        assert!(start.elapsed() >= Duration::from_millis(30));
    }
}
