//! Profiles and their medicine lists.
//!
//! The household is the whole persisted state: every profile, which one is
//! selected, and the id counters.

use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use super::error::{ReminderError, Result};
use super::model::{Medicine, MedicineId, NewMedicine, Profile, ProfileId};
use super::schedule;

pub const DEFAULT_PROFILE_NAME: &str = "Me";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Household {
    pub profiles: Vec<Profile>,
    pub active_profile: ProfileId,
    #[serde(default)]
    next_profile_id: ProfileId,
    #[serde(default)]
    next_medicine_id: MedicineId,
}

impl Default for Household {
    fn default() -> Self {
        Self {
            profiles: vec![Profile::new(1, DEFAULT_PROFILE_NAME)],
            active_profile: 1,
            next_profile_id: 2,
            next_medicine_id: 1,
        }
    }
}

impl Household {
    /// The selected profile. Falls back to the first one if the stored
    /// selection no longer exists.
    pub fn active(&self) -> &Profile {
        self.profile(self.active_profile)
            .unwrap_or(&self.profiles[0])
    }

    pub fn profile(&self, id: ProfileId) -> Option<&Profile> {
        self.profiles.iter().find(|p| p.id == id)
    }

    pub fn profile_mut(&mut self, id: ProfileId) -> Option<&mut Profile> {
        self.profiles.iter_mut().find(|p| p.id == id)
    }

    /// Add a profile and select it.
    pub fn add_profile(&mut self, name: &str) -> Result<ProfileId> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ReminderError::InvalidProfile("name is empty".to_string()));
        }

        let id = self.next_profile_id;
        self.next_profile_id += 1;
        self.profiles.push(Profile::new(id, name));
        self.active_profile = id;
        info!("Added profile {} ({})", name, id);
        Ok(id)
    }

    pub fn select_profile(&mut self, id: ProfileId) -> Result<()> {
        if self.profile(id).is_none() {
            return Err(ReminderError::ProfileNotFound(id));
        }
        self.active_profile = id;
        Ok(())
    }

    /// Remove a profile with all its medicines.
    ///
    /// The last profile cannot be removed. Removing the selected profile
    /// selects the first remaining one.
    pub fn delete_profile(&mut self, id: ProfileId) -> Result<Profile> {
        let index = self
            .profiles
            .iter()
            .position(|p| p.id == id)
            .ok_or(ReminderError::ProfileNotFound(id))?;
        if self.profiles.len() == 1 {
            return Err(ReminderError::LastProfile);
        }

        let removed = self.profiles.remove(index);
        if self.active_profile == id {
            self.active_profile = self.profiles[0].id;
        }
        info!("Deleted profile {} ({})", removed.name, removed.id);
        Ok(removed)
    }

    /// Add a medicine to a profile. The first dose is one interval from `now`.
    pub fn add_medicine(
        &mut self,
        profile_id: ProfileId,
        new_medicine: &NewMedicine,
        now: DateTime<Utc>,
    ) -> Result<&Medicine> {
        let name = new_medicine.validate()?;
        let id = self.next_medicine_id;

        let profile = self
            .profile_mut(profile_id)
            .ok_or(ReminderError::ProfileNotFound(profile_id))?;
        profile.medicines.push(Medicine {
            id,
            name,
            frequency: new_medicine.frequency,
            duration: new_medicine.duration,
            created_at: now,
            next_dose: schedule::first_dose(now, new_medicine.frequency),
            notified: false,
            last_notified: None,
        });
        self.next_medicine_id += 1;

        let profile = self
            .profile(profile_id)
            .ok_or(ReminderError::ProfileNotFound(profile_id))?;
        profile
            .medicine(id)
            .ok_or(ReminderError::MedicineNotFound(id))
    }

    pub fn delete_medicine(&mut self, profile_id: ProfileId, medicine_id: MedicineId) -> Result<Medicine> {
        let profile = self
            .profile_mut(profile_id)
            .ok_or(ReminderError::ProfileNotFound(profile_id))?;
        let index = profile
            .medicines
            .iter()
            .position(|m| m.id == medicine_id)
            .ok_or(ReminderError::MedicineNotFound(medicine_id))?;
        Ok(profile.medicines.remove(index))
    }

    /// Find a medicine in any profile.
    pub fn find_medicine(&self, medicine_id: MedicineId) -> Option<(&Profile, &Medicine)> {
        self.profiles
            .iter()
            .find_map(|p| p.medicine(medicine_id).map(|m| (p, m)))
    }

    pub fn find_medicine_mut(&mut self, medicine_id: MedicineId) -> Option<&mut Medicine> {
        self.profiles
            .iter_mut()
            .find_map(|p| p.medicine_mut(medicine_id))
    }

    /// Adopt a bare medicine list, as saved by the browser version, into the
    /// first profile.
    pub fn import_legacy(&mut self, medicines: Vec<Medicine>) {
        if let Some(max_id) = medicines.iter().map(|m| m.id).max() {
            self.next_medicine_id = self.next_medicine_id.max(max_id + 1);
        }
        info!("Imported {} medicines from legacy list", medicines.len());
        self.profiles[0].medicines.extend(medicines);
    }

    /// Repair state loaded from disk: at least one profile, a valid
    /// selection, amounts within the accepted bounds and counters above
    /// every id in use.
    pub(crate) fn normalize(&mut self) {
        for medicine in self.profiles.iter_mut().flat_map(|p| p.medicines.iter_mut()) {
            let frequency = medicine.frequency.clamped();
            let duration = medicine.duration.clamped();
            if frequency != medicine.frequency || duration != medicine.duration {
                warn!(
                    "Medicine {} ({}) had out-of-range amounts, using every {} for {}",
                    medicine.id,
                    medicine.name,
                    frequency.label(),
                    duration.label()
                );
                medicine.frequency = frequency;
                medicine.duration = duration;
            }
        }

        if self.profiles.is_empty() {
            let id = self.next_profile_id.max(1);
            self.profiles.push(Profile::new(id, DEFAULT_PROFILE_NAME));
        }
        if self.profile(self.active_profile).is_none() {
            self.active_profile = self.profiles[0].id;
        }
        let max_profile = self.profiles.iter().map(|p| p.id).max().unwrap_or(0);
        self.next_profile_id = self.next_profile_id.max(max_profile + 1);
        let max_medicine = self
            .profiles
            .iter()
            .flat_map(|p| p.medicines.iter().map(|m| m.id))
            .max()
            .unwrap_or(0);
        self.next_medicine_id = self.next_medicine_id.max(max_medicine + 1);
    }
}
