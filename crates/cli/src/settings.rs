use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use backdrop_core::shared::blur_radius::DEFAULT_CONTROL_VALUE;
use backdrop_core::shared::constants::TICK_PERIOD_MS;

/// User preferences persisted between runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Linear blur control value (`1..=99`).
    pub blur_amount: i32,
    pub blur_enabled: bool,
    #[serde(default = "default_tick_period_ms")]
    pub tick_period_ms: u64,
}

fn default_tick_period_ms() -> u64 {
    TICK_PERIOD_MS
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            blur_amount: DEFAULT_CONTROL_VALUE,
            blur_enabled: true,
            tick_period_ms: default_tick_period_ms(),
        }
    }
}

impl Settings {
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("Backdrop").join("settings.json"))
    }

    pub fn load() -> Self {
        Self::config_path()
            .map(|path| Self::load_from(&path))
            .unwrap_or_default()
    }

    /// Missing or unreadable files fall back to defaults.
    pub fn load_from(path: &Path) -> Self {
        fs::read_to_string(path)
            .ok()
            .and_then(|json| serde_json::from_str(&json).ok())
            .unwrap_or_default()
    }

    pub fn save(&self) -> Result<PathBuf, Box<dyn std::error::Error>> {
        let path = Self::config_path().ok_or("no configuration directory on this platform")?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}
