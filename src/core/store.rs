//! Persistent storage for the household.
//!
//! Stores profiles and medicines as a single JSON file in the app data directory.

use std::fs;
use std::path::PathBuf;

use log::{info, warn};
use serde::Deserialize;

use super::error::Result;
use super::household::Household;
use super::model::Medicine;

const FILE_NAME: &str = "household.json";

/// Shapes accepted on load.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredState {
    Household(Household),
    /// The browser version saved a bare list of medicines.
    Legacy(Vec<Medicine>),
}

pub struct HouseholdStore {
    /// Directory holding the data file
    data_dir: PathBuf,
}

impl HouseholdStore {
    /// Create a new store.
    ///
    /// # Arguments
    /// * `data_dir` - The app data directory
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn path(&self) -> PathBuf {
        self.data_dir.join(FILE_NAME)
    }

    fn backup_path(&self) -> PathBuf {
        self.data_dir.join(format!("{}.bak", FILE_NAME))
    }

    /// Load the household from disk.
    ///
    /// A missing file gives the default household. A file that does not parse
    /// is moved aside to `household.json.bak` and the default is returned.
    pub fn load(&self) -> Result<Household> {
        let path = self.path();
        if !path.exists() {
            info!("No saved household at {:?}, starting fresh", path);
            return Ok(Household::default());
        }

        let content = fs::read_to_string(&path)?;
        let mut household = match serde_json::from_str::<StoredState>(&content) {
            Ok(StoredState::Household(household)) => household,
            Ok(StoredState::Legacy(medicines)) => {
                let mut household = Household::default();
                household.import_legacy(medicines);
                household
            }
            Err(e) => {
                let backup = self.backup_path();
                warn!(
                    "Could not parse {:?} ({}), moving it to {:?}",
                    path, e, backup
                );
                fs::rename(&path, &backup)?;
                Household::default()
            }
        };
        household.normalize();
        Ok(household)
    }

    /// Save the household, replacing the file in one rename.
    pub fn save(&self, household: &Household) -> Result<()> {
        // Ensure directory exists
        fs::create_dir_all(&self.data_dir)?;

        let path = self.path();
        let tmp = self.data_dir.join(format!("{}.tmp", FILE_NAME));
        let content = serde_json::to_string_pretty(household)?;
        fs::write(&tmp, content)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{Frequency, NewMedicine, TreatmentDuration};
    use chrono::{TimeZone, Utc};
    use tempfile::tempdir;

    #[test]
    fn test_store_save_and_load() {
        let dir = tempdir().unwrap();
        let store = HouseholdStore::new(dir.path().to_path_buf());
        let now = Utc.with_ymd_and_hms(2025, 1, 5, 10, 0, 0).unwrap();

        let mut household = store.load().unwrap();
        let dad = household.add_profile("Dad").unwrap();
        let statin = NewMedicine::new("Statin", Frequency::days(1), TreatmentDuration::months(3));
        household.add_medicine(dad, &statin, now).unwrap();
        store.save(&household).unwrap();

        // Fresh store, same directory
        let store2 = HouseholdStore::new(dir.path().to_path_buf());
        let loaded = store2.load().unwrap();

        assert_eq!(loaded, household);
        assert_eq!(loaded.active().name, "Dad");
        assert_eq!(loaded.active().medicines[0].name, "Statin");
        assert!(!dir.path().join("household.json.tmp").exists());
    }

    #[test]
    fn test_missing_dir_is_created_on_save() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let store = HouseholdStore::new(nested.clone());

        store.save(&Household::default()).unwrap();
        assert!(nested.join("household.json").exists());
    }

    #[test]
    fn test_legacy_list_is_imported() {
        let dir = tempdir().unwrap();
        let legacy = r#"[
            {
                "id": 1700000000000,
                "name": "Amoxicillin",
                "frequency": { "value": 8, "unit": "hours" },
                "duration": { "value": 7, "unit": "days" },
                "createdAt": "2024-01-10T08:00:00.000Z",
                "nextDose": "2024-01-10T16:00:00.000Z",
                "notified": true
            }
        ]"#;
        fs::write(dir.path().join("household.json"), legacy).unwrap();

        let store = HouseholdStore::new(dir.path().to_path_buf());
        let household = store.load().unwrap();

        assert_eq!(household.profiles.len(), 1);
        let meds = &household.active().medicines;
        assert_eq!(meds.len(), 1);
        assert_eq!(meds[0].name, "Amoxicillin");
        assert!(meds[0].notified);
    }

    #[test]
    fn test_corrupt_file_is_backed_up() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("household.json"), "{ not json").unwrap();

        let store = HouseholdStore::new(dir.path().to_path_buf());
        let household = store.load().unwrap();

        assert_eq!(household, Household::default());
        assert!(!dir.path().join("household.json").exists());
        let backup = fs::read_to_string(dir.path().join("household.json.bak")).unwrap();
        assert_eq!(backup, "{ not json");
    }
}
