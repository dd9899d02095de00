// Reminder engine - runs the due check over every profile.

use chrono::{DateTime, Utc};
use log::{debug, info};

use super::model::{dose_message, DoseAlert, ReminderConfig};
use crate::core::household::Household;
use crate::core::schedule;

/// Reminder engine state
pub struct ReminderEngine {
    config: ReminderConfig,
}

impl ReminderEngine {
    pub fn new(config: ReminderConfig) -> Self {
        Self { config }
    }

    /// Update the engine configuration (hot-reload friendly)
    pub fn update_config(&mut self, config: ReminderConfig) {
        self.config = config;
    }

    /// Run one due check.
    /// Walks profiles in order and their medicines in order; the first due
    /// medicine has its schedule advanced and is returned as an alert.
    /// Anything else that is due waits for the next check.
    pub fn check(&self, household: &mut Household, now: DateTime<Utc>) -> Option<DoseAlert> {
        for profile in &mut household.profiles {
            let Some(medicine) = profile
                .medicines
                .iter_mut()
                .find(|m| schedule::is_due(m, now))
            else {
                continue;
            };

            let step = schedule::advance(medicine, now, self.config.catch_up_missed_doses);
            info!(
                "Dose due: {} / {} (scheduled {}, next {}, missed {})",
                profile.name, medicine.name, step.previous, step.next, step.missed
            );

            return Some(DoseAlert {
                profile_id: profile.id,
                profile_name: profile.name.clone(),
                medicine_id: medicine.id,
                medicine_name: medicine.name.clone(),
                due_at: step.previous,
                next_dose: step.next,
                missed: step.missed,
                message: dose_message(&profile.name, &medicine.name, step.missed),
                sound: self.config.sound,
            });
        }

        debug!("Due check at {}: nothing due", now);
        None
    }
}

impl Default for ReminderEngine {
    fn default() -> Self {
        Self::new(ReminderConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{Frequency, NewMedicine, TreatmentDuration};
    use crate::core::reminders::model::ReminderSound;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 20, 8, 0, 0).unwrap()
    }

    fn household_with(meds: &[(&str, u32)]) -> Household {
        let mut household = Household::default();
        for (name, hours) in meds {
            let new = NewMedicine::new(*name, Frequency::hours(*hours), TreatmentDuration::days(7));
            household.add_medicine(1, &new, t0()).unwrap();
        }
        household
    }

    #[test]
    fn test_nothing_due_before_first_dose() {
        let mut household = household_with(&[("Aspirin", 8)]);
        let engine = ReminderEngine::default();
        assert!(engine.check(&mut household, t0() + Duration::hours(7)).is_none());
    }

    #[test]
    fn test_fires_and_advances() {
        let mut household = household_with(&[("Aspirin", 8)]);
        let engine = ReminderEngine::default();
        let now = t0() + Duration::hours(8) + Duration::minutes(1);

        let alert = engine.check(&mut household, now).unwrap();

        assert_eq!(alert.medicine_name, "Aspirin");
        assert_eq!(alert.profile_name, "Me");
        assert_eq!(alert.due_at, t0() + Duration::hours(8));
        assert_eq!(alert.next_dose, t0() + Duration::hours(16));
        assert_eq!(alert.message, "Time for Me to take Aspirin!");
        assert_eq!(alert.sound, ReminderSound::Chime);
        assert!(household.active().medicines[0].notified);

        // Same instant again: the schedule already moved on.
        assert!(engine.check(&mut household, now).is_none());
    }

    #[test]
    fn test_one_alert_per_check() {
        let mut household = household_with(&[("Aspirin", 4), ("Zinc", 4)]);
        let engine = ReminderEngine::default();
        let now = t0() + Duration::hours(5);

        let first = engine.check(&mut household, now).unwrap();
        assert_eq!(first.medicine_name, "Aspirin");

        let second = engine.check(&mut household, now).unwrap();
        assert_eq!(second.medicine_name, "Zinc");

        assert!(engine.check(&mut household, now).is_none());
    }

    #[test]
    fn test_profiles_checked_in_order() {
        let mut household = Household::default();
        let kid = household.add_profile("Kid").unwrap();
        let syrup = NewMedicine::new("Syrup", Frequency::hours(2), TreatmentDuration::days(3));
        household.add_medicine(kid, &syrup, t0()).unwrap();
        let zinc = NewMedicine::new("Zinc", Frequency::hours(4), TreatmentDuration::days(3));
        household.add_medicine(1, &zinc, t0()).unwrap();

        let engine = ReminderEngine::default();
        let now = t0() + Duration::hours(5);

        assert_eq!(engine.check(&mut household, now).unwrap().profile_name, "Me");
        assert_eq!(engine.check(&mut household, now).unwrap().profile_name, "Kid");
    }

    #[test]
    fn test_catch_up_toggle() {
        let later = t0() + Duration::hours(20);

        let mut household = household_with(&[("Aspirin", 4)]);
        let engine = ReminderEngine::default();
        let alert = engine.check(&mut household, later).unwrap();
        assert_eq!(alert.missed, 3);
        assert_eq!(alert.message, "Time for Me to take Aspirin! (3 missed)");
        assert!(engine.check(&mut household, later).is_none());

        let mut household = household_with(&[("Aspirin", 4)]);
        let mut engine = ReminderEngine::default();
        engine.update_config(ReminderConfig {
            catch_up_missed_doses: false,
            sound: ReminderSound::None,
        });
        let alert = engine.check(&mut household, later).unwrap();
        assert_eq!(alert.missed, 0);
        assert_eq!(alert.sound, ReminderSound::None);
        // Backlog drains one dose per check.
        assert!(engine.check(&mut household, later).is_some());
    }

    #[test]
    fn test_finished_treatment_is_silent() {
        let mut household = Household::default();
        let short = NewMedicine::new("Antibiotic", Frequency::days(1), TreatmentDuration::days(1));
        household.add_medicine(1, &short, t0()).unwrap();

        let engine = ReminderEngine::default();
        // First dose lands exactly on the end of a one-day treatment.
        assert!(engine.check(&mut household, t0() + Duration::days(3)).is_none());
    }
}
