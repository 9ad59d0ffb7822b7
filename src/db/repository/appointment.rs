use std::str::FromStr;

use chrono::NaiveDateTime;
use rusqlite::{params, Connection, Row};

use crate::db::{DatabaseError, Entity};
use crate::models::*;

use super::ensure_reference;

const APPOINTMENT_SELECT: &str = "SELECT a.id, a.patient_id, p.name, a.doctor_id, doc.name,
        a.scheduled_at, a.reason, a.status
 FROM appointments a
 LEFT JOIN patients p ON p.id = a.patient_id
 LEFT JOIN doctors doc ON doc.id = a.doctor_id";

pub fn create_appointment(
    conn: &Connection,
    new: &NewAppointment,
) -> Result<Appointment, DatabaseError> {
    ensure_reference(conn, Entity::Patient, new.patient_id)?;
    ensure_reference(conn, Entity::Doctor, new.doctor_id)?;

    let status = new.status.unwrap_or(AppointmentStatus::Scheduled);
    conn.execute(
        "INSERT INTO appointments (patient_id, doctor_id, scheduled_at, reason, status)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            new.patient_id,
            new.doctor_id,
            new.scheduled_at,
            new.reason,
            status.as_str(),
        ],
    )?;
    let id = conn.last_insert_rowid();

    get_appointment(conn, id)?.ok_or(DatabaseError::NotFound {
        entity: Entity::Appointment,
        id,
    })
}

pub fn get_appointment(conn: &Connection, id: i64) -> Result<Option<Appointment>, DatabaseError> {
    let sql = format!("{APPOINTMENT_SELECT} WHERE a.id = ?1");
    let mut stmt = conn.prepare(&sql)?;
    let result = stmt.query_row(params![id], read_row);

    match result {
        Ok(row) => Ok(Some(appointment_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn list_appointments(
    conn: &Connection,
    filter: &AppointmentFilter,
) -> Result<Vec<Appointment>, DatabaseError> {
    let mut clauses: Vec<&str> = Vec::new();
    let mut values: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

    if let Some(patient_id) = filter.patient_id {
        clauses.push("a.patient_id = ?");
        values.push(Box::new(patient_id));
    }
    if let Some(doctor_id) = filter.doctor_id {
        clauses.push("a.doctor_id = ?");
        values.push(Box::new(doctor_id));
    }
    if let Some(status) = filter.status {
        clauses.push("a.status = ?");
        values.push(Box::new(status.as_str()));
    }
    if let Some(on_date) = filter.on_date {
        clauses.push("date(a.scheduled_at) = ?");
        values.push(Box::new(on_date));
    }

    let mut sql = String::from(APPOINTMENT_SELECT);
    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
    sql.push_str(" ORDER BY a.id");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(
        rusqlite::params_from_iter(values.iter().map(|v| v.as_ref())),
        read_row,
    )?;

    let mut appointments = Vec::new();
    for row in rows {
        appointments.push(appointment_from_row(row?)?);
    }
    Ok(appointments)
}

pub fn update_appointment(
    conn: &Connection,
    id: i64,
    update: &AppointmentUpdate,
) -> Result<Appointment, DatabaseError> {
    let current = get_appointment(conn, id)?.ok_or(DatabaseError::NotFound {
        entity: Entity::Appointment,
        id,
    })?;

    if let Some(patient_id) = update.patient_id {
        ensure_reference(conn, Entity::Patient, patient_id)?;
    }
    if let Some(doctor_id) = update.doctor_id {
        ensure_reference(conn, Entity::Doctor, doctor_id)?;
    }

    conn.execute(
        "UPDATE appointments SET patient_id = ?2, doctor_id = ?3, scheduled_at = ?4,
         reason = ?5, status = ?6
         WHERE id = ?1",
        params![
            id,
            update.patient_id.unwrap_or(current.patient_id),
            update.doctor_id.unwrap_or(current.doctor_id),
            update.scheduled_at.unwrap_or(current.scheduled_at),
            update.reason.apply(current.reason.clone()),
            update.status.unwrap_or(current.status).as_str(),
        ],
    )?;

    get_appointment(conn, id)?.ok_or(DatabaseError::NotFound {
        entity: Entity::Appointment,
        id,
    })
}

pub fn delete_appointment(conn: &Connection, id: i64) -> Result<(), DatabaseError> {
    let deleted = conn.execute("DELETE FROM appointments WHERE id = ?1", params![id])?;
    if deleted == 0 {
        return Err(DatabaseError::NotFound {
            entity: Entity::Appointment,
            id,
        });
    }
    Ok(())
}

// Internal row type for Appointment mapping
struct AppointmentRow {
    id: i64,
    patient_id: i64,
    patient_name: Option<String>,
    doctor_id: i64,
    doctor_name: Option<String>,
    scheduled_at: NaiveDateTime,
    reason: Option<String>,
    status: String,
}

fn read_row(row: &Row) -> rusqlite::Result<AppointmentRow> {
    Ok(AppointmentRow {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        patient_name: row.get(2)?,
        doctor_id: row.get(3)?,
        doctor_name: row.get(4)?,
        scheduled_at: row.get(5)?,
        reason: row.get(6)?,
        status: row.get(7)?,
    })
}

fn appointment_from_row(row: AppointmentRow) -> Result<Appointment, DatabaseError> {
    Ok(Appointment {
        id: row.id,
        patient_id: row.patient_id,
        patient_name: row.patient_name,
        doctor_id: row.doctor_id,
        doctor_name: row.doctor_name,
        scheduled_at: row.scheduled_at,
        reason: row.reason,
        status: AppointmentStatus::from_str(&row.status)?,
    })
}
