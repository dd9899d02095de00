// Reminder model types for configuration and fired alerts.
//
// NOTE: the web UI receives DoseAlert through the "dose-due" event.
// Keep ui/index.html in sync when renaming fields.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::model::{MedicineId, ProfileId};

/// Sound options for dose reminders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ReminderSound {
    #[default]
    Chime,
    None,
}

impl ReminderSound {
    /// Tone frequency (Hz) and length (ms) of each note, or nothing when muted.
    pub fn notes(&self) -> &'static [(f32, u64)] {
        match self {
            Self::Chime => &[(880.0, 180), (660.0, 260)],
            Self::None => &[],
        }
    }
}

/// Reminder configuration - persisted in settings.json
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderConfig {
    /// Roll a stale schedule past now in one step instead of announcing
    /// every missed dose.
    #[serde(default = "default_catch_up")]
    pub catch_up_missed_doses: bool,
    #[serde(default)]
    pub sound: ReminderSound,
}

fn default_catch_up() -> bool {
    true
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            catch_up_missed_doses: true,
            sound: ReminderSound::Chime,
        }
    }
}

/// Alert fired when a dose is due
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoseAlert {
    pub profile_id: ProfileId,
    pub profile_name: String,
    pub medicine_id: MedicineId,
    pub medicine_name: String,
    /// Scheduled time of the announced dose
    pub due_at: DateTime<Utc>,
    /// When the following dose is due
    pub next_dose: DateTime<Utc>,
    /// Doses skipped by catch-up
    pub missed: u32,
    pub message: String,
    pub sound: ReminderSound,
}

pub fn dose_message(profile_name: &str, medicine_name: &str, missed: u32) -> String {
    let mut message = format!("Time for {} to take {}!", profile_name, medicine_name);
    if missed > 0 {
        message.push_str(&format!(" ({} missed)", missed));
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dose_message() {
        assert_eq!(dose_message("Mom", "Aspirin", 0), "Time for Mom to take Aspirin!");
        assert_eq!(
            dose_message("Mom", "Aspirin", 2),
            "Time for Mom to take Aspirin! (2 missed)"
        );
    }

    #[test]
    fn test_config_defaults_from_partial_json() {
        let config: ReminderConfig = serde_json::from_str("{}").unwrap();
        assert!(config.catch_up_missed_doses);
        assert_eq!(config.sound, ReminderSound::Chime);
        assert!(ReminderSound::None.notes().is_empty());
    }
}
