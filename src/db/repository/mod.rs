//! Entity-scoped database operations.
//!
//! All referential-integrity work happens here: creates resolve their
//! foreign keys before writing, and deletes issue their own cascade and
//! set-null statements inside a transaction. The schema's FK constraints
//! only backstop what this layer already enforces.

mod appointment;
mod department;
mod doctor;
mod medical_record;
mod patient;

use rusqlite::{params, Connection};

use super::{DatabaseError, Entity};

pub use appointment::*;
pub use department::*;
pub use doctor::*;
pub use medical_record::*;
pub use patient::*;

pub(crate) fn row_exists(
    conn: &Connection,
    entity: Entity,
    id: i64,
) -> Result<bool, DatabaseError> {
    let sql = format!("SELECT 1 FROM {} WHERE id = ?1", entity.table());
    match conn.query_row(&sql, params![id], |_| Ok(())) {
        Ok(()) => Ok(true),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// Resolve a foreign key before a write, failing with the offending kind
/// and id.
pub(crate) fn ensure_reference(
    conn: &Connection,
    entity: Entity,
    id: i64,
) -> Result<(), DatabaseError> {
    if row_exists(conn, entity, id)? {
        Ok(())
    } else {
        tracing::debug!(%entity, id, "reference resolution failed");
        Err(DatabaseError::ReferenceNotFound { entity, id })
    }
}
