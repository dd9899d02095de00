//! Parser for typed amounts such as "8 hours" or "2w".

use lazy_static::lazy_static;
use regex::Regex;

use super::error::{ReminderError, Result};
use super::model::{DurationUnit, Frequency, FrequencyUnit, TreatmentDuration};

lazy_static! {
    // Pattern: "8 hours", "8h", "every 8 hrs", "2 weeks"
    static ref AMOUNT_REGEX: Regex =
        Regex::new(r"^\s*(?:every\s+)?(\d+)\s*([A-Za-z]+)\s*$").expect("Invalid amount regex");
}

fn split_amount(text: &str) -> Result<(u32, String)> {
    let caps = AMOUNT_REGEX
        .captures(text)
        .ok_or_else(|| ReminderError::parse(text, "expected a number followed by a unit"))?;

    let value: u32 = caps[1]
        .parse()
        .map_err(|_| ReminderError::parse(text, "number is too large"))?;
    if value == 0 {
        return Err(ReminderError::parse(text, "must be at least 1"));
    }
    Ok((value, caps[2].to_lowercase()))
}

pub fn parse_frequency(text: &str) -> Result<Frequency> {
    let (value, unit) = split_amount(text)?;
    let unit = match unit.as_str() {
        "h" | "hr" | "hrs" | "hour" | "hours" => FrequencyUnit::Hours,
        "d" | "day" | "days" => FrequencyUnit::Days,
        _ => return Err(ReminderError::parse(text, "unit must be hours or days")),
    };
    let frequency = Frequency { value, unit };
    if value > frequency.max_value() {
        return Err(ReminderError::parse(
            text,
            format!("must be at most {} {}", frequency.max_value(), unit.as_str()),
        ));
    }
    Ok(frequency)
}

pub fn parse_duration(text: &str) -> Result<TreatmentDuration> {
    let (value, unit) = split_amount(text)?;
    let unit = match unit.as_str() {
        "d" | "day" | "days" => DurationUnit::Days,
        "w" | "wk" | "wks" | "week" | "weeks" => DurationUnit::Weeks,
        "m" | "mo" | "month" | "months" => DurationUnit::Months,
        _ => return Err(ReminderError::parse(text, "unit must be days, weeks or months")),
    };
    let duration = TreatmentDuration { value, unit };
    if value > duration.max_value() {
        return Err(ReminderError::parse(
            text,
            format!("must be at most {} {}", duration.max_value(), unit.as_str()),
        ));
    }
    Ok(duration)
}
