//! User defaults persisted between runs.
//!
//! Settings are stored as JSON in the user's config directory
//! (e.g., `~/.config/photokit/settings.json` on Linux).

use crate::error::Result;
use crate::workflow::EXAMPLE_QUALITY;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Session name used when none is configured.
pub const DEFAULT_SESSION_NAME: &str = "giant-image";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Name used to build output file names.
    pub name: String,
    /// Directory prefix for output files. Empty means the working directory.
    #[serde(default)]
    pub output_dir: String,
    /// JPEG quality used by the compression step.
    pub quality: u8,
}

impl Settings {
    /// Returns the path to the settings file.
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "photokit", "photokit").map(|dirs| {
            let config_dir = dirs.config_dir();
            if !config_dir.exists() {
                let _ = fs::create_dir_all(config_dir);
            }
            config_dir.join("settings.json")
        })
    }

    /// Loads settings from the user's config directory, falling back to
    /// defaults if the file is missing or unreadable.
    pub fn load() -> Self {
        Self::config_path()
            .map(|path| Self::load_from(&path))
            .unwrap_or_default()
    }

    pub fn load_from(path: &Path) -> Self {
        fs::read_to_string(path)
            .ok()
            .and_then(|content| match serde_json::from_str::<Settings>(&content) {
                Ok(settings) if settings.quality > 100 => {
                    log::warn!(
                        "Ignoring settings at {}: quality {} is outside 0-100",
                        path.display(),
                        settings.quality
                    );
                    None
                }
                Ok(settings) => Some(settings),
                Err(e) => {
                    log::warn!("Ignoring unreadable settings at {}: {}", path.display(), e);
                    None
                }
            })
            .unwrap_or_default()
    }

    /// Persists settings to the user's config directory.
    ///
    /// Returns the path written, or `None` if no config directory is known.
    ///
    /// # Errors
    /// Returns an error if serialization or file writing fails.
    pub fn save(&self) -> Result<Option<PathBuf>> {
        match Self::config_path() {
            Some(path) => {
                self.save_to(&path)?;
                Ok(Some(path))
            }
            None => Ok(None),
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            name: DEFAULT_SESSION_NAME.to_string(),
            output_dir: String::new(),
            quality: EXAMPLE_QUALITY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let settings = Settings {
            name: "holiday".to_string(),
            output_dir: "/srv/photos/".to_string(),
            quality: 60,
        };
        settings.save_to(&path).unwrap();

        assert_eq!(Settings::load_from(&path), settings);
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load_from(&dir.path().join("nope.json"));
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.quality, 50);
    }

    #[test]
    fn corrupt_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(Settings::load_from(&path), Settings::default());
    }

    #[test]
    fn out_of_range_quality_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{ "name": "n", "output_dir": "/tmp/", "quality": 200 }"#).unwrap();
        assert_eq!(Settings::load_from(&path), Settings::default());
    }

    #[test]
    fn output_dir_is_optional_in_json() {
        let settings: Settings =
            serde_json::from_str(r#"{ "name": "n", "quality": 10 }"#).unwrap();
        assert_eq!(settings.output_dir, "");
    }
}
