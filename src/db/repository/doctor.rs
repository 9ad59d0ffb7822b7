use rusqlite::{params, Connection, Row};

use crate::db::{DatabaseError, Entity};
use crate::models::*;

use super::ensure_reference;

const DOCTOR_SELECT: &str = "SELECT d.id, d.name, d.specialization, d.contact,
        d.department_id, dep.name
 FROM doctors d
 LEFT JOIN departments dep ON dep.id = d.department_id";

pub fn create_doctor(conn: &Connection, new: &NewDoctor) -> Result<Doctor, DatabaseError> {
    if new.name.trim().is_empty() {
        return Err(DatabaseError::Validation {
            field: "name".into(),
            reason: "must not be blank".into(),
        });
    }
    if let Some(department_id) = new.department_id {
        ensure_reference(conn, Entity::Department, department_id)?;
    }

    conn.execute(
        "INSERT INTO doctors (name, specialization, contact, department_id)
         VALUES (?1, ?2, ?3, ?4)",
        params![new.name, new.specialization, new.contact, new.department_id],
    )?;
    let id = conn.last_insert_rowid();

    get_doctor(conn, id)?.ok_or(DatabaseError::NotFound {
        entity: Entity::Doctor,
        id,
    })
}

pub fn get_doctor(conn: &Connection, id: i64) -> Result<Option<Doctor>, DatabaseError> {
    let sql = format!("{DOCTOR_SELECT} WHERE d.id = ?1");
    let mut stmt = conn.prepare(&sql)?;
    let result = stmt.query_row(params![id], doctor_from_row);

    match result {
        Ok(doctor) => Ok(Some(doctor)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn list_doctors(conn: &Connection, filter: &DoctorFilter) -> Result<Vec<Doctor>, DatabaseError> {
    let mut clauses: Vec<&str> = Vec::new();
    let mut values: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

    if let Some(department_id) = filter.department_id {
        clauses.push("d.department_id = ?");
        values.push(Box::new(department_id));
    }
    if let Some(specialization) = &filter.specialization {
        clauses.push("LOWER(d.specialization) LIKE LOWER(?)");
        values.push(Box::new(format!("%{specialization}%")));
    }

    let mut sql = String::from(DOCTOR_SELECT);
    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
    sql.push_str(" ORDER BY d.id");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(
        rusqlite::params_from_iter(values.iter().map(|v| v.as_ref())),
        doctor_from_row,
    )?;

    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

pub fn update_doctor(
    conn: &Connection,
    id: i64,
    update: &DoctorUpdate,
) -> Result<Doctor, DatabaseError> {
    let current = get_doctor(conn, id)?.ok_or(DatabaseError::NotFound {
        entity: Entity::Doctor,
        id,
    })?;

    if let Some(name) = &update.name {
        if name.trim().is_empty() {
            return Err(DatabaseError::Validation {
                field: "name".into(),
                reason: "must not be blank".into(),
            });
        }
    }
    if let Some(department_id) = update.department_id.set_value() {
        ensure_reference(conn, Entity::Department, *department_id)?;
    }

    conn.execute(
        "UPDATE doctors SET name = ?2, specialization = ?3, contact = ?4, department_id = ?5
         WHERE id = ?1",
        params![
            id,
            update.name.as_deref().unwrap_or(&current.name),
            update.specialization.apply(current.specialization.clone()),
            update.contact.apply(current.contact.clone()),
            update.department_id.apply(current.department_id),
        ],
    )?;

    get_doctor(conn, id)?.ok_or(DatabaseError::NotFound {
        entity: Entity::Doctor,
        id,
    })
}

/// Delete a doctor. The doctor's own appointments and medical records go
/// with them; assignment links on patients and departments are cleared.
pub fn delete_doctor(conn: &Connection, id: i64) -> Result<(), DatabaseError> {
    let tx = conn.unchecked_transaction()?;

    let appointments = tx.execute("DELETE FROM appointments WHERE doctor_id = ?1", params![id])?;
    let records = tx.execute(
        "DELETE FROM medical_records WHERE doctor_id = ?1",
        params![id],
    )?;
    let patients_unassigned = tx.execute(
        "UPDATE patients SET assigned_doctor_id = NULL WHERE assigned_doctor_id = ?1",
        params![id],
    )?;
    let departments_headless = tx.execute(
        "UPDATE departments SET head_doctor_id = NULL WHERE head_doctor_id = ?1",
        params![id],
    )?;

    let deleted = tx.execute("DELETE FROM doctors WHERE id = ?1", params![id])?;
    if deleted == 0 {
        return Err(DatabaseError::NotFound {
            entity: Entity::Doctor,
            id,
        });
    }
    tx.commit()?;

    tracing::info!(
        doctor_id = id,
        appointments,
        medical_records = records,
        patients_unassigned,
        departments_headless,
        "Doctor deleted; dependent rows removed, assignment links cleared"
    );
    Ok(())
}

fn doctor_from_row(row: &Row) -> rusqlite::Result<Doctor> {
    Ok(Doctor {
        id: row.get(0)?,
        name: row.get(1)?,
        specialization: row.get(2)?,
        contact: row.get(3)?,
        department_id: row.get(4)?,
        department_name: row.get(5)?,
    })
}
