pub mod blur_controller;
pub mod pipeline_logger;
pub mod tick_driver;
