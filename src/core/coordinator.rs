use chrono::{DateTime, Duration, Utc};
use log::{info, warn};

use super::config::Settings;
use super::error::{ReminderError, Result};
use super::household::Household;
use super::model::{Medicine, MedicineId, NewMedicine, Profile, ProfileId};
use super::notification::{Notification, NotificationCenter, NotificationKind};
use super::reminders::engine::ReminderEngine;
use super::reminders::model::DoseAlert;
use super::schedule;
use super::status::MedicineStatus;
use super::store::HouseholdStore;

pub struct CoordinatorOutput {
    pub alert: Option<DoseAlert>,
    /// Notification hidden by the timeout during this tick
    pub expired: Option<Notification>,
    pub logs: Vec<String>,
}

pub struct Coordinator {
    household: Household,
    store: HouseholdStore,
    engine: ReminderEngine,
    notifications: NotificationCenter,

    check_interval: Duration,
    last_check: Option<DateTime<Utc>>,
}

impl Coordinator {
    /// Load the household from the configured data directory.
    pub fn open(settings: &Settings) -> Result<Self> {
        let store = HouseholdStore::new(settings.data_dir.clone());
        let household = store.load()?;
        info!(
            "Loaded {} profiles from {:?}",
            household.profiles.len(),
            store.path()
        );
        let mut coordinator = Self {
            household,
            store,
            engine: ReminderEngine::new(settings.reminders),
            notifications: NotificationCenter::new(settings.notification_timeout_seconds),
            check_interval: Duration::seconds(1),
            last_check: None,
        };
        coordinator.apply_settings(settings);
        Ok(coordinator)
    }

    /// Hot-reload everything except the data directory.
    pub fn apply_settings(&mut self, settings: &Settings) {
        self.engine.update_config(settings.reminders);
        self.notifications
            .set_timeout(settings.notification_timeout_seconds);
        self.check_interval = Duration::from_std(settings.check_interval())
            .unwrap_or_else(|_| Duration::seconds(60));
    }

    /// Drive timers. Call often; the due check itself runs on the first tick
    /// and then once per check interval.
    pub fn tick(&mut self, now: DateTime<Utc>) -> CoordinatorOutput {
        let mut logs = Vec::new();

        // 1. Auto-dismiss
        let expired = self.notifications.expire(now);

        // 2. Due check
        let check_due = match self.last_check {
            Some(last) => now - last >= self.check_interval,
            None => true,
        };
        let mut alert = None;
        if check_due {
            self.last_check = Some(now);
            alert = self.engine.check(&mut self.household, now);
        }

        // 3. Announce and persist the advanced schedule
        if let Some(alert) = &alert {
            self.notifications
                .show(alert.message.clone(), NotificationKind::Info, now);
            logs.push(alert.message.clone());
            if let Err(e) = self.store.save(&self.household) {
                warn!("Failed to save household: {}", e);
                logs.push(format!("Failed to save household: {}", e));
            }
        }

        CoordinatorOutput {
            alert,
            expired,
            logs,
        }
    }

    pub fn household(&self) -> &Household {
        &self.household
    }

    pub fn notification(&self) -> Option<&Notification> {
        self.notifications.current()
    }

    pub fn close_notification(&mut self) -> Option<Notification> {
        self.notifications.close()
    }

    /// Card values for every medicine of the selected profile.
    pub fn statuses(&self, now: DateTime<Utc>) -> Vec<MedicineStatus> {
        self.household
            .active()
            .medicines
            .iter()
            .map(|m| MedicineStatus::at(m, now))
            .collect()
    }

    pub fn add_profile(&mut self, name: &str, now: DateTime<Utc>) -> Result<ProfileId> {
        let id = self.commit(now, |household| household.add_profile(name))?;
        self.notifications
            .show(format!("{} added", name.trim()), NotificationKind::Success, now);
        Ok(id)
    }

    pub fn select_profile(&mut self, id: ProfileId, now: DateTime<Utc>) -> Result<()> {
        self.commit(now, |household| household.select_profile(id))
    }

    pub fn delete_profile(&mut self, id: ProfileId, now: DateTime<Utc>) -> Result<Profile> {
        let removed = self.commit(now, |household| household.delete_profile(id))?;
        self.notifications
            .show(format!("{} removed", removed.name), NotificationKind::Info, now);
        Ok(removed)
    }

    pub fn add_medicine(
        &mut self,
        profile_id: ProfileId,
        new_medicine: &NewMedicine,
        now: DateTime<Utc>,
    ) -> Result<Medicine> {
        let medicine = self.commit(now, |household| {
            household
                .add_medicine(profile_id, new_medicine, now)
                .cloned()
        })?;
        info!(
            "Added {} every {} for {}, first dose {}",
            medicine.name,
            medicine.frequency.label(),
            medicine.duration.label(),
            medicine.next_dose
        );
        self.notifications.show(
            format!("{} added successfully", medicine.name),
            NotificationKind::Success,
            now,
        );
        Ok(medicine)
    }

    /// Remove a medicine from whichever profile holds it.
    pub fn delete_medicine(&mut self, medicine_id: MedicineId, now: DateTime<Utc>) -> Result<Medicine> {
        let removed = self.commit(now, |household| {
            let owner = household
                .find_medicine(medicine_id)
                .map(|(profile, _)| profile.id)
                .ok_or(ReminderError::MedicineNotFound(medicine_id))?;
            household.delete_medicine(owner, medicine_id)
        })?;
        self.notifications
            .show(format!("{} removed", removed.name), NotificationKind::Info, now);
        Ok(removed)
    }

    /// Mark the announced dose as taken.
    pub fn acknowledge_dose(&mut self, medicine_id: MedicineId, now: DateTime<Utc>) -> Result<()> {
        self.commit(now, |household| {
            household
                .find_medicine_mut(medicine_id)
                .map(schedule::acknowledge)
                .ok_or(ReminderError::MedicineNotFound(medicine_id))
        })
    }

    /// Apply a household change and save it. When the change fails, or it
    /// cannot be saved, the household is left as it was before.
    fn commit<T>(
        &mut self,
        now: DateTime<Utc>,
        change: impl FnOnce(&mut Household) -> Result<T>,
    ) -> Result<T> {
        let snapshot = self.household.clone();
        let value = match change(&mut self.household) {
            Ok(value) => value,
            Err(e) => {
                self.household = snapshot;
                return self.report(Err(e), now);
            }
        };
        if let Err(e) = self.store.save(&self.household) {
            self.household = snapshot;
            return self.report(Err(e), now);
        }
        Ok(value)
    }

    /// Surface a failure as an error notification and pass it on.
    fn report<T>(&mut self, result: Result<T>, now: DateTime<Utc>) -> Result<T> {
        if let Err(e) = &result {
            warn!("{}", e);
            self.notifications
                .show(e.to_string(), NotificationKind::Error, now);
        }
        result
    }
}
