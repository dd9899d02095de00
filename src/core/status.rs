use chrono::{DateTime, Utc};
use serde::Serialize;

use super::model::{Medicine, MedicineId};
use super::schedule;

const MILLIS_PER_MINUTE: i64 = 60 * 1000;
const MILLIS_PER_HOUR: i64 = 60 * MILLIS_PER_MINUTE;
const MILLIS_PER_DAY: i64 = 24 * MILLIS_PER_HOUR;

/// What a medicine card shows, computed for one instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MedicineStatus {
    pub id: MedicineId,
    pub name: String,
    pub frequency_label: String,
    pub duration_label: String,
    pub countdown: String,
    pub overdue: bool,
    pub duration_left: String,
    pub days_left: i64,
    pub notified: bool,
}

impl MedicineStatus {
    pub fn at(medicine: &Medicine, now: DateTime<Utc>) -> Self {
        Self {
            id: medicine.id,
            name: medicine.name.clone(),
            frequency_label: format!("Take every {}", medicine.frequency.label()),
            duration_label: format!("For {}", medicine.duration.label()),
            countdown: countdown(medicine, now),
            overdue: is_overdue(medicine, now),
            duration_left: duration_left(medicine, now),
            days_left: days_left(medicine, now),
            notified: medicine.notified,
        }
    }
}

pub fn is_overdue(medicine: &Medicine, now: DateTime<Utc>) -> bool {
    medicine.next_dose <= now
}

/// "Take now" once due, otherwise whole hours and minutes until the next dose.
pub fn countdown(medicine: &Medicine, now: DateTime<Utc>) -> String {
    let diff = (medicine.next_dose - now).num_milliseconds();
    if diff <= 0 {
        return "Take now".to_string();
    }
    let hours = diff / MILLIS_PER_HOUR;
    let minutes = (diff % MILLIS_PER_HOUR) / MILLIS_PER_MINUTE;
    format!("{hours}h {minutes}m")
}

/// Days remaining in the treatment, rounded up.
pub fn days_left(medicine: &Medicine, now: DateTime<Utc>) -> i64 {
    let remaining = (schedule::treatment_end(medicine) - now).num_milliseconds();
    // Ceiling division that also holds for negative values.
    -((-remaining).div_euclid(MILLIS_PER_DAY))
}

pub fn duration_left(medicine: &Medicine, now: DateTime<Utc>) -> String {
    match days_left(medicine, now) {
        n if n <= 0 => "Completed".to_string(),
        n => format!("{n} days left"),
    }
}
