/// Properties reported by a frame source when it is opened.
#[derive(Clone, Debug, PartialEq)]
pub struct SourceInfo {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub name: String,
}

impl SourceInfo {
    pub fn pixel_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construction() {
        let info = SourceInfo {
            width: 640,
            height: 480,
            fps: 30.0,
            name: "camera0".to_string(),
        };
        assert_eq!(info.width, 640);
        assert_eq!(info.height, 480);
        assert_eq!(info.fps, 30.0);
        assert_eq!(info.name, "camera0");
        assert_eq!(info.pixel_count(), 307_200);
    }

    #[test]
    fn test_clone_is_independent() {
        let info = SourceInfo {
            width: 320,
            height: 240,
            fps: 15.0,
            name: "frames".to_string(),
        };
        let mut cloned = info.clone();
        cloned.width = 1;
        assert_eq!(info.width, 320);
        assert_ne!(info, cloned);
    }
}
