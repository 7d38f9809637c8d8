/// Learning rate used once the model has seen its seed frame.
pub const LEARNING_RATE: f64 = 0.001;

/// Learning rate for the first frame after (re)initialisation.
pub const SEED_LEARNING_RATE: f64 = 1.0;

pub const HISTORY_FRAMES: usize = 60;
pub const MIXTURE_COUNT: usize = 5;
pub const VARIANCE_THRESHOLD: f32 = 16.0;
pub const BACKGROUND_RATIO: f32 = 0.7;

/// Raw model output must exceed this to count as foreground (drops shadows at 127).
pub const FOREGROUND_THRESHOLD: u8 = 250;

/// Skin-tone range in 8-bit HSV (hue 0..180).
pub const SKIN_HSV_LOWER: [u8; 3] = [0, 20, 70];
pub const SKIN_HSV_UPPER: [u8; 3] = [20, 255, 255];

/// Shapes smaller than this many pixels are dropped from the refined mask.
pub const MIN_COMPONENT_AREA: usize = 1000;

pub const CURRENT_MASK_WEIGHT: f32 = 0.7;
pub const PREVIOUS_MASK_WEIGHT: f32 = 0.3;

/// Nominal tick period (~30 fps).
pub const TICK_PERIOD_MS: u64 = 33;
