use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use log::warn;
use serde::{Deserialize, Serialize};

use super::error::Result;
use super::model::{Frequency, TreatmentDuration};
use super::notification::DEFAULT_TIMEOUT_SECONDS;
use super::reminders::model::ReminderConfig;

pub const DEFAULT_CHECK_INTERVAL_SECONDS: u64 = 60;

/// Application settings with reminder configuration.
/// NOTE: the settings form in ui/index.html mirrors these fields.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Settings {
    /// Where household.json lives
    pub data_dir: PathBuf,
    #[serde(default = "default_check_interval")]
    pub check_interval_seconds: u64,
    #[serde(default = "default_notification_timeout")]
    pub notification_timeout_seconds: u64,
    #[serde(default)]
    pub reminders: ReminderConfig,
    /// Prefilled in the add-medicine form
    #[serde(default)]
    pub default_frequency: Frequency,
    #[serde(default)]
    pub default_duration: TreatmentDuration,
}

fn default_check_interval() -> u64 {
    DEFAULT_CHECK_INTERVAL_SECONDS
}

fn default_notification_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECONDS
}

impl Settings {
    pub fn with_data_dir(data_dir: PathBuf) -> Self {
        Self {
            data_dir,
            check_interval_seconds: DEFAULT_CHECK_INTERVAL_SECONDS,
            notification_timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            reminders: ReminderConfig::default(),
            default_frequency: Frequency::default(),
            default_duration: TreatmentDuration::default(),
        }
    }

    /// Due check period, never below one second.
    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_seconds.max(1))
    }
}

impl Default for Settings {
    fn default() -> Self {
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string());

        Self::with_data_dir(PathBuf::from(home).join(".local/share/pill-reminder"))
    }
}

pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    pub fn new(app_config_dir: PathBuf) -> Self {
        Self {
            config_path: app_config_dir.join("settings.json"),
        }
    }

    /// Load settings, falling back to defaults when the file is missing or
    /// unreadable.
    pub fn load(&self) -> Settings {
        self.load_or(Settings::default)
    }

    /// Like `load`, with the caller choosing the defaults (the desktop shell
    /// puts data under the platform app-data directory).
    pub fn load_or(&self, default: impl FnOnce() -> Settings) -> Settings {
        if self.config_path.exists() {
            match fs::read_to_string(&self.config_path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(settings) => return settings,
                    Err(e) => warn!("Ignoring invalid {:?}: {}", self.config_path, e),
                },
                Err(e) => warn!("Could not read {:?}: {}", self.config_path, e),
            }
        }
        default()
    }

    pub fn save(&self, settings: &Settings) -> Result<()> {
        // Ensure directory exists
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(settings)?;
        fs::write(&self.config_path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::reminders::model::ReminderSound;
    use tempfile::tempdir;

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::new(dir.path().to_path_buf());

        let default = manager.load();
        assert_eq!(default.check_interval_seconds, 60);
        assert_eq!(default.notification_timeout_seconds, 5);

        let mut new_settings = Settings::with_data_dir(PathBuf::from("/tmp/pills"));
        new_settings.check_interval_seconds = 30;
        new_settings.reminders.sound = ReminderSound::None;

        manager.save(&new_settings).unwrap();
        let loaded = manager.load();

        assert_eq!(loaded, new_settings);
        assert_eq!(loaded.data_dir, PathBuf::from("/tmp/pills"));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("settings.json"),
            r#"{ "data_dir": "/srv/pills", "check_interval_seconds": 0 }"#,
        )
        .unwrap();

        let loaded = ConfigManager::new(dir.path().to_path_buf()).load();

        assert_eq!(loaded.data_dir, PathBuf::from("/srv/pills"));
        assert_eq!(loaded.notification_timeout_seconds, 5);
        assert_eq!(loaded.default_frequency, Frequency::hours(8));
        assert_eq!(loaded.check_interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_invalid_file_uses_supplied_default() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("settings.json"), "not json").unwrap();

        let manager = ConfigManager::new(dir.path().to_path_buf());
        let loaded = manager.load_or(|| Settings::with_data_dir(PathBuf::from("/data")));
        assert_eq!(loaded.data_dir, PathBuf::from("/data"));
    }
}
