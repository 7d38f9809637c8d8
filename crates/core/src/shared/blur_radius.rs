use crate::shared::errors::ConfigError;

pub const MIN_CONTROL_VALUE: i32 = 1;
pub const MAX_CONTROL_VALUE: i32 = 99;
pub const DEFAULT_CONTROL_VALUE: i32 = 21;

/// Side length of the square background blur kernel.
///
/// Always odd and at least 3; validation happens here so the blurring
/// code never has to coerce a bad value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BlurRadius(u32);

impl BlurRadius {
    pub fn new(kernel_size: i32) -> Result<Self, ConfigError> {
        if kernel_size < 3 || kernel_size % 2 == 0 {
            return Err(ConfigError::InvalidBlurRadius(kernel_size));
        }
        Ok(Self(kernel_size as u32))
    }

    /// Maps a linear control value (`1..=99`) to `2v + 1`.
    pub fn from_control_value(value: i32) -> Result<Self, ConfigError> {
        if !(MIN_CONTROL_VALUE..=MAX_CONTROL_VALUE).contains(&value) {
            return Err(ConfigError::ControlOutOfRange {
                value,
                min: MIN_CONTROL_VALUE,
                max: MAX_CONTROL_VALUE,
            });
        }
        Self::new(value * 2 + 1)
    }

    pub fn get(self) -> usize {
        self.0 as usize
    }
}

impl Default for BlurRadius {
    fn default() -> Self {
        Self(DEFAULT_CONTROL_VALUE as u32 * 2 + 1)
    }
}

impl std::fmt::Display for BlurRadius {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::minimum(1, 3)]
    #[case::default(21, 43)]
    #[case::maximum(99, 199)]
    #[case::middle(50, 101)]
    fn test_control_value_maps_to_odd_radius(#[case] value: i32, #[case] expected: usize) {
        let radius = BlurRadius::from_control_value(value).unwrap();
        assert_eq!(radius.get(), expected);
        assert_eq!(radius.get() % 2, 1);
    }

    #[rstest]
    #[case::zero(0)]
    #[case::negative(-4)]
    #[case::above_max(100)]
    fn test_control_value_out_of_range_rejected(#[case] value: i32) {
        assert_eq!(
            BlurRadius::from_control_value(value),
            Err(ConfigError::ControlOutOfRange {
                value,
                min: MIN_CONTROL_VALUE,
                max: MAX_CONTROL_VALUE,
            })
        );
    }

    #[rstest]
    #[case::even(8)]
    #[case::too_small(1)]
    #[case::non_positive(0)]
    #[case::negative_odd(-3)]
    fn test_invalid_kernel_size_rejected(#[case] size: i32) {
        assert_eq!(BlurRadius::new(size), Err(ConfigError::InvalidBlurRadius(size)));
    }

    #[test]
    fn test_default_matches_default_control_value() {
        assert_eq!(
            BlurRadius::default(),
            BlurRadius::from_control_value(DEFAULT_CONTROL_VALUE).unwrap()
        );
    }
}
