pub mod repository;
pub mod sqlite;

pub use repository::*;
pub use sqlite::*;

use std::fmt;

use thiserror::Error;

/// The five record kinds, used to tag error conditions with the kind of the
/// offending row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Patient,
    Doctor,
    Department,
    Appointment,
    MedicalRecord,
}

impl Entity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Entity::Patient => "Patient",
            Entity::Doctor => "Doctor",
            Entity::Department => "Department",
            Entity::Appointment => "Appointment",
            Entity::MedicalRecord => "MedicalRecord",
        }
    }

    /// Backing table for the entity kind.
    pub(crate) fn table(&self) -> &'static str {
        match self {
            Entity::Patient => "patients",
            Entity::Doctor => "doctors",
            Entity::Department => "departments",
            Entity::Appointment => "appointments",
            Entity::MedicalRecord => "medical_records",
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("{entity} with id {id} not found")]
    NotFound { entity: Entity, id: i64 },

    #[error("referenced {entity} with id {id} does not exist")]
    ReferenceNotFound { entity: Entity, id: i64 },

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("migration failed at version {version}: {reason}")]
    MigrationFailed { version: i64, reason: String },
}
