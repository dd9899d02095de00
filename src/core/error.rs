use std::io;

use thiserror::Error;

use super::model::{MedicineId, ProfileId};

pub type Result<T> = std::result::Result<T, ReminderError>;

#[derive(Debug, Error)]
pub enum ReminderError {
    #[error("profile {0} not found")]
    ProfileNotFound(ProfileId),

    #[error("medicine {0} not found")]
    MedicineNotFound(MedicineId),

    /// At least one profile must always exist.
    #[error("cannot delete the last profile")]
    LastProfile,

    #[error("invalid profile: {0}")]
    InvalidProfile(String),

    #[error("invalid medicine: {0}")]
    InvalidMedicine(String),

    #[error("could not parse {input:?}: {reason}")]
    Parse { input: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ReminderError {
    pub(crate) fn parse(input: &str, reason: impl Into<String>) -> Self {
        Self::Parse {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}
