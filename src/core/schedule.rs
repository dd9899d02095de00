//! Due-dose arithmetic.
//!
//! Everything here takes `now` as an argument so the same rules drive the
//! live timer loop, the terminal listing and the tests.

use chrono::{DateTime, Days, Duration, Local, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::model::{Frequency, FrequencyUnit, Medicine};

/// Result of moving a medicine's schedule forward after a reminder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Advance {
    /// The dose time that was announced.
    pub previous: DateTime<Utc>,
    /// The new `next_dose`.
    pub next: DateTime<Utc>,
    /// Doses skipped while rolling a stale schedule past `now`.
    pub missed: u32,
}

/// Add one dosing interval to `from`, with day intervals following the
/// local calendar.
pub fn add_frequency(from: DateTime<Utc>, frequency: Frequency) -> DateTime<Utc> {
    add_frequency_in(from, frequency, &Local)
}

/// Add one dosing interval to `from` in the calendar of `tz`.
///
/// Hour intervals are exact elapsed time. Day intervals keep the wall-clock
/// time in `tz`, so a morning dose stays in the morning across DST changes.
/// When that wall-clock time is skipped or repeated on the target day, the
/// step is a fixed 24 h per day instead. A result past the representable
/// range saturates at `DateTime::<Utc>::MAX_UTC`, which is never due.
pub fn add_frequency_in<Tz: TimeZone>(
    from: DateTime<Utc>,
    frequency: Frequency,
    tz: &Tz,
) -> DateTime<Utc> {
    let value = i64::from(frequency.value);
    let fixed = match frequency.unit {
        FrequencyUnit::Hours => Duration::try_hours(value),
        FrequencyUnit::Days => {
            let calendar = from
                .with_timezone(tz)
                .checked_add_days(Days::new(u64::from(frequency.value)));
            if let Some(local) = calendar {
                return local.with_timezone(&Utc);
            }
            Duration::try_days(value)
        }
    };
    fixed
        .and_then(|step| from.checked_add_signed(step))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// A new medicine is first due one interval after it was added.
pub fn first_dose(now: DateTime<Utc>, frequency: Frequency) -> DateTime<Utc> {
    add_frequency(now, frequency)
}

pub fn treatment_end(medicine: &Medicine) -> DateTime<Utc> {
    medicine
        .created_at
        .checked_add_signed(medicine.duration.as_chrono())
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

pub fn is_active(medicine: &Medicine, now: DateTime<Utc>) -> bool {
    now < treatment_end(medicine)
}

/// A dose is due once its time has passed, unless it falls after the end of
/// the treatment.
pub fn is_due(medicine: &Medicine, now: DateTime<Utc>) -> bool {
    medicine.next_dose <= now && medicine.next_dose < treatment_end(medicine)
}

/// Move the schedule past the dose that was just announced.
///
/// With `catch_up`, a schedule left behind while the app was closed is rolled
/// forward in the same step so only one reminder goes out for the backlog.
pub fn advance(medicine: &mut Medicine, now: DateTime<Utc>, catch_up: bool) -> Advance {
    let previous = medicine.next_dose;
    let mut next = add_frequency(previous, medicine.frequency);
    let mut missed = 0;

    if catch_up {
        while next <= now {
            let stepped = add_frequency(next, medicine.frequency);
            // A saturated step never reaches `now`.
            if stepped <= next {
                break;
            }
            next = stepped;
            missed += 1;
        }
    }

    medicine.next_dose = next;
    medicine.notified = true;
    medicine.last_notified = Some(now);

    Advance {
        previous,
        next,
        missed,
    }
}

/// The user confirmed the announced dose.
pub fn acknowledge(medicine: &mut Medicine) {
    medicine.notified = false;
}
