// Domain types for profiles and their medicines.
//
// NOTE: the web UI reads these through the Tauri commands; field names are
// camelCase on the wire so medicine lists saved by the browser version still load.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::error::{ReminderError, Result};

pub type MedicineId = u64;
pub type ProfileId = u64;

pub const MAX_FREQUENCY_HOURS: u32 = 24 * 365;
pub const MAX_FREQUENCY_DAYS: u32 = 365;
pub const MAX_DURATION_DAYS: u32 = 3650;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrequencyUnit {
    Hours,
    Days,
}

impl FrequencyUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hours => "hours",
            Self::Days => "days",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DurationUnit {
    Days,
    Weeks,
    /// Counted as 30 days.
    Months,
}

impl DurationUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Days => "days",
            Self::Weeks => "weeks",
            Self::Months => "months",
        }
    }

    fn days(&self) -> i64 {
        match self {
            Self::Days => 1,
            Self::Weeks => 7,
            Self::Months => 30,
        }
    }
}

/// How often a dose is taken, e.g. every 8 hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frequency {
    pub value: u32,
    pub unit: FrequencyUnit,
}

impl Frequency {
    pub fn hours(value: u32) -> Self {
        Self {
            value,
            unit: FrequencyUnit::Hours,
        }
    }

    pub fn days(value: u32) -> Self {
        Self {
            value,
            unit: FrequencyUnit::Days,
        }
    }

    pub fn label(&self) -> String {
        format!("{} {}", self.value, self.unit.as_str())
    }

    /// Longest accepted interval: one year.
    pub fn max_value(&self) -> u32 {
        match self.unit {
            FrequencyUnit::Hours => MAX_FREQUENCY_HOURS,
            FrequencyUnit::Days => MAX_FREQUENCY_DAYS,
        }
    }

    /// Same unit with the value forced into `1..=max_value()`.
    pub fn clamped(&self) -> Self {
        Self {
            value: self.value.clamp(1, self.max_value()),
            unit: self.unit,
        }
    }
}

impl Default for Frequency {
    fn default() -> Self {
        Self::hours(8)
    }
}

/// How long the whole treatment lasts, counted from when the medicine was added.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreatmentDuration {
    pub value: u32,
    pub unit: DurationUnit,
}

impl TreatmentDuration {
    pub fn days(value: u32) -> Self {
        Self {
            value,
            unit: DurationUnit::Days,
        }
    }

    pub fn weeks(value: u32) -> Self {
        Self {
            value,
            unit: DurationUnit::Weeks,
        }
    }

    pub fn months(value: u32) -> Self {
        Self {
            value,
            unit: DurationUnit::Months,
        }
    }

    pub fn label(&self) -> String {
        format!("{} {}", self.value, self.unit.as_str())
    }

    /// Saturates at `Duration::MAX` for values past the representable range.
    pub fn as_chrono(&self) -> Duration {
        Duration::try_days(i64::from(self.value) * self.unit.days()).unwrap_or(Duration::MAX)
    }

    /// Longest accepted treatment, about ten years in the chosen unit.
    pub fn max_value(&self) -> u32 {
        match self.unit {
            DurationUnit::Days => MAX_DURATION_DAYS,
            DurationUnit::Weeks => MAX_DURATION_DAYS / 7,
            DurationUnit::Months => MAX_DURATION_DAYS / 30,
        }
    }

    pub fn clamped(&self) -> Self {
        Self {
            value: self.value.clamp(1, self.max_value()),
            unit: self.unit,
        }
    }
}

impl Default for TreatmentDuration {
    fn default() -> Self {
        Self::days(7)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Medicine {
    pub id: MedicineId,
    pub name: String,
    pub frequency: Frequency,
    pub duration: TreatmentDuration,
    pub created_at: DateTime<Utc>,
    pub next_dose: DateTime<Utc>,
    /// Set when a reminder went out, cleared when the dose is acknowledged.
    #[serde(default)]
    pub notified: bool,
    #[serde(default)]
    pub last_notified: Option<DateTime<Utc>>,
}

/// Values submitted by the add-medicine form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMedicine {
    pub name: String,
    #[serde(default)]
    pub frequency: Frequency,
    #[serde(default)]
    pub duration: TreatmentDuration,
}

impl NewMedicine {
    pub fn new(name: impl Into<String>, frequency: Frequency, duration: TreatmentDuration) -> Self {
        Self {
            name: name.into(),
            frequency,
            duration,
        }
    }

    /// Check the submission and return the trimmed name.
    pub fn validate(&self) -> Result<String> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ReminderError::InvalidMedicine("name is empty".to_string()));
        }
        if self.frequency.value == 0 {
            return Err(ReminderError::InvalidMedicine(
                "frequency must be at least 1".to_string(),
            ));
        }
        if self.frequency.value > self.frequency.max_value() {
            return Err(ReminderError::InvalidMedicine(format!(
                "frequency must be at most {} {}",
                self.frequency.max_value(),
                self.frequency.unit.as_str()
            )));
        }
        if self.duration.value == 0 {
            return Err(ReminderError::InvalidMedicine(
                "duration must be at least 1".to_string(),
            ));
        }
        if self.duration.value > self.duration.max_value() {
            return Err(ReminderError::InvalidMedicine(format!(
                "duration must be at most {} {}",
                self.duration.max_value(),
                self.duration.unit.as_str()
            )));
        }
        Ok(name.to_string())
    }
}

/// A family member and their medicines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: ProfileId,
    pub name: String,
    #[serde(default)]
    pub medicines: Vec<Medicine>,
}

impl Profile {
    pub fn new(id: ProfileId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            medicines: Vec::new(),
        }
    }

    pub fn medicine(&self, id: MedicineId) -> Option<&Medicine> {
        self.medicines.iter().find(|m| m.id == id)
    }

    pub fn medicine_mut(&mut self, id: MedicineId) -> Option<&mut Medicine> {
        self.medicines.iter_mut().find(|m| m.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels() {
        assert_eq!(Frequency::hours(8).label(), "8 hours");
        assert_eq!(Frequency::days(1).label(), "1 days");
        assert_eq!(TreatmentDuration::weeks(2).label(), "2 weeks");
    }

    #[test]
    fn test_duration_months_are_thirty_days() {
        assert_eq!(TreatmentDuration::months(2).as_chrono(), Duration::days(60));
        assert_eq!(TreatmentDuration::weeks(3).as_chrono(), Duration::days(21));
        assert_eq!(TreatmentDuration::days(5).as_chrono(), Duration::days(5));
    }

    #[test]
    fn test_validate_new_medicine() {
        let ok = NewMedicine::new("  Ibuprofen ", Frequency::hours(8), TreatmentDuration::days(7));
        assert_eq!(ok.validate().unwrap(), "Ibuprofen");

        let blank = NewMedicine::new("   ", Frequency::hours(8), TreatmentDuration::days(7));
        assert!(matches!(blank.validate(), Err(ReminderError::InvalidMedicine(_))));

        let zero = NewMedicine::new("Aspirin", Frequency::hours(0), TreatmentDuration::days(7));
        assert!(zero.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_oversized_amounts() {
        let year = NewMedicine::new("Booster", Frequency::days(365), TreatmentDuration::months(121));
        assert!(year.validate().is_ok());

        let hours = NewMedicine::new("Aspirin", Frequency::hours(4_000_000_000), TreatmentDuration::days(7));
        assert!(matches!(hours.validate(), Err(ReminderError::InvalidMedicine(_))));

        let days = NewMedicine::new("Aspirin", Frequency::hours(8), TreatmentDuration::days(100_000_000));
        assert!(matches!(days.validate(), Err(ReminderError::InvalidMedicine(_))));

        let weeks = NewMedicine::new("Aspirin", Frequency::hours(8), TreatmentDuration::weeks(522));
        assert!(weeks.validate().is_err());
    }

    #[test]
    fn test_clamped_and_saturating_duration() {
        assert_eq!(Frequency::hours(0).clamped(), Frequency::hours(1));
        assert_eq!(Frequency::days(9_999).clamped(), Frequency::days(365));
        assert_eq!(TreatmentDuration::months(u32::MAX).clamped(), TreatmentDuration::months(121));
        assert_eq!(TreatmentDuration::months(u32::MAX).as_chrono(), Duration::MAX);
    }

    #[test]
    fn test_medicine_reads_browser_json() {
        // Shape written by the browser version's localStorage.
        let json = r#"{
            "id": 1700000000000,
            "name": "Amoxicillin",
            "frequency": { "value": 8, "unit": "hours" },
            "duration": { "value": 1, "unit": "weeks" },
            "createdAt": "2024-01-10T08:00:00.000Z",
            "nextDose": "2024-01-10T16:00:00.000Z",
            "notified": false
        }"#;
        let medicine: Medicine = serde_json::from_str(json).unwrap();
        assert_eq!(medicine.id, 1_700_000_000_000);
        assert_eq!(medicine.frequency, Frequency::hours(8));
        assert_eq!(medicine.duration.unit, DurationUnit::Weeks);
        assert!(medicine.last_notified.is_none());
    }
}
