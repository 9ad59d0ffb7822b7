use std::str::FromStr;

use chrono::{Local, NaiveDate};
use rusqlite::{params, Connection, Row};

use crate::db::{DatabaseError, Entity};
use crate::models::*;

use super::ensure_reference;

const PATIENT_SELECT: &str = "SELECT p.id, p.name, p.date_of_birth, p.contact, p.patient_type,
        p.assigned_doctor_id, doc.name, p.assigned_department_id, dep.name,
        i.room, i.admission_date, i.discharge_date, o.last_visit_date
 FROM patients p
 LEFT JOIN doctors doc ON doc.id = p.assigned_doctor_id
 LEFT JOIN departments dep ON dep.id = p.assigned_department_id
 LEFT JOIN inpatients i ON i.id = p.id
 LEFT JOIN outpatients o ON o.id = p.id";

pub fn create_patient(conn: &Connection, new: &NewPatient) -> Result<Patient, DatabaseError> {
    if new.name.trim().is_empty() {
        return Err(DatabaseError::Validation {
            field: "name".into(),
            reason: "must not be blank".into(),
        });
    }
    if let NewPatientKind::InPatient { room, .. } = &new.kind {
        if room.trim().is_empty() {
            return Err(DatabaseError::Validation {
                field: "room".into(),
                reason: "required for inpatients".into(),
            });
        }
    }
    if let Some(doctor_id) = new.assigned_doctor_id {
        ensure_reference(conn, Entity::Doctor, doctor_id)?;
    }
    if let Some(department_id) = new.assigned_department_id {
        ensure_reference(conn, Entity::Department, department_id)?;
    }

    // The base row and the variant row must land together.
    let tx = conn.unchecked_transaction()?;
    let patient_type = match &new.kind {
        NewPatientKind::InPatient { .. } => PatientType::InPatient,
        NewPatientKind::OutPatient { .. } => PatientType::OutPatient,
    };
    tx.execute(
        "INSERT INTO patients (name, date_of_birth, contact, patient_type,
         assigned_doctor_id, assigned_department_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            new.name,
            new.date_of_birth,
            new.contact,
            patient_type.as_str(),
            new.assigned_doctor_id,
            new.assigned_department_id,
        ],
    )?;
    let id = tx.last_insert_rowid();

    match &new.kind {
        NewPatientKind::InPatient {
            room,
            admission_date,
            discharge_date,
        } => {
            tx.execute(
                "INSERT INTO inpatients (id, room, admission_date, discharge_date)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    id,
                    room,
                    admission_date.unwrap_or_else(|| Local::now().date_naive()),
                    discharge_date,
                ],
            )?;
        }
        NewPatientKind::OutPatient { last_visit_date } => {
            tx.execute(
                "INSERT INTO outpatients (id, last_visit_date) VALUES (?1, ?2)",
                params![id, last_visit_date.unwrap_or_else(|| Local::now().date_naive())],
            )?;
        }
    }
    tx.commit()?;

    get_patient(conn, id)?.ok_or(DatabaseError::NotFound {
        entity: Entity::Patient,
        id,
    })
}

pub fn get_patient(conn: &Connection, id: i64) -> Result<Option<Patient>, DatabaseError> {
    let sql = format!("{PATIENT_SELECT} WHERE p.id = ?1");
    let mut stmt = conn.prepare(&sql)?;
    let result = stmt.query_row(params![id], read_row);

    match result {
        Ok(row) => Ok(Some(patient_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn list_patients(
    conn: &Connection,
    filter: &PatientFilter,
) -> Result<Vec<Patient>, DatabaseError> {
    let mut clauses: Vec<&str> = Vec::new();
    let mut values: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

    if let Some(patient_type) = filter.patient_type {
        clauses.push("p.patient_type = ?");
        values.push(Box::new(patient_type.as_str()));
    }
    if let Some(doctor_id) = filter.assigned_doctor_id {
        clauses.push("p.assigned_doctor_id = ?");
        values.push(Box::new(doctor_id));
    }
    if let Some(department_id) = filter.assigned_department_id {
        clauses.push("p.assigned_department_id = ?");
        values.push(Box::new(department_id));
    }

    let mut sql = String::from(PATIENT_SELECT);
    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
    sql.push_str(" ORDER BY p.id");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(
        rusqlite::params_from_iter(values.iter().map(|v| v.as_ref())),
        read_row,
    )?;

    let mut patients = Vec::new();
    for row in rows {
        patients.push(patient_from_row(row?)?);
    }
    Ok(patients)
}

pub fn update_patient(
    conn: &Connection,
    id: i64,
    update: &PatientUpdate,
) -> Result<Patient, DatabaseError> {
    let current = get_patient(conn, id)?.ok_or(DatabaseError::NotFound {
        entity: Entity::Patient,
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
    // Updates may only touch fields of the patient's own variant.
    match &current.kind {
        PatientKind::InPatient { .. } => {
            if update.last_visit_date.is_some() {
                return Err(DatabaseError::Validation {
                    field: "last_visit_date".into(),
                    reason: "patient is an inpatient".into(),
                });
            }
        }
        PatientKind::OutPatient { .. } => {
            if update.room.is_some()
                || update.admission_date.is_some()
                || !update.discharge_date.is_keep()
            {
                return Err(DatabaseError::Validation {
                    field: "room".into(),
                    reason: "patient is an outpatient".into(),
                });
            }
        }
    }
    if let Some(room) = &update.room {
        if room.trim().is_empty() {
            return Err(DatabaseError::Validation {
                field: "room".into(),
                reason: "must not be blank".into(),
            });
        }
    }
    if let Some(doctor_id) = update.assigned_doctor_id.set_value() {
        ensure_reference(conn, Entity::Doctor, *doctor_id)?;
    }
    if let Some(department_id) = update.assigned_department_id.set_value() {
        ensure_reference(conn, Entity::Department, *department_id)?;
    }

    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "UPDATE patients SET name = ?2, date_of_birth = ?3, contact = ?4,
         assigned_doctor_id = ?5, assigned_department_id = ?6
         WHERE id = ?1",
        params![
            id,
            update.name.as_deref().unwrap_or(&current.name),
            update.date_of_birth.unwrap_or(current.date_of_birth),
            update.contact.apply(current.contact.clone()),
            update.assigned_doctor_id.apply(current.assigned_doctor_id),
            update
                .assigned_department_id
                .apply(current.assigned_department_id),
        ],
    )?;

    match &current.kind {
        PatientKind::InPatient {
            room,
            admission_date,
            discharge_date,
        } => {
            tx.execute(
                "UPDATE inpatients SET room = ?2, admission_date = ?3, discharge_date = ?4
                 WHERE id = ?1",
                params![
                    id,
                    update.room.as_deref().unwrap_or(room),
                    update.admission_date.unwrap_or(*admission_date),
                    update.discharge_date.apply(*discharge_date),
                ],
            )?;
        }
        PatientKind::OutPatient { last_visit_date } => {
            tx.execute(
                "UPDATE outpatients SET last_visit_date = ?2 WHERE id = ?1",
                params![id, update.last_visit_date.unwrap_or(*last_visit_date)],
            )?;
        }
    }
    tx.commit()?;

    get_patient(conn, id)?.ok_or(DatabaseError::NotFound {
        entity: Entity::Patient,
        id,
    })
}

/// Delete a patient and everything that cannot outlive it: appointments,
/// medical records, and the variant row.
pub fn delete_patient(conn: &Connection, id: i64) -> Result<(), DatabaseError> {
    let tx = conn.unchecked_transaction()?;

    let appointments = tx.execute(
        "DELETE FROM appointments WHERE patient_id = ?1",
        params![id],
    )?;
    let records = tx.execute(
        "DELETE FROM medical_records WHERE patient_id = ?1",
        params![id],
    )?;
    tx.execute("DELETE FROM inpatients WHERE id = ?1", params![id])?;
    tx.execute("DELETE FROM outpatients WHERE id = ?1", params![id])?;

    let deleted = tx.execute("DELETE FROM patients WHERE id = ?1", params![id])?;
    if deleted == 0 {
        return Err(DatabaseError::NotFound {
            entity: Entity::Patient,
            id,
        });
    }
    tx.commit()?;

    tracing::info!(
        patient_id = id,
        appointments,
        medical_records = records,
        "Patient deleted with dependent rows"
    );
    Ok(())
}

// Internal row type for Patient mapping
struct PatientRow {
    id: i64,
    name: String,
    date_of_birth: NaiveDate,
    contact: Option<String>,
    patient_type: String,
    assigned_doctor_id: Option<i64>,
    assigned_doctor_name: Option<String>,
    assigned_department_id: Option<i64>,
    assigned_department_name: Option<String>,
    room: Option<String>,
    admission_date: Option<NaiveDate>,
    discharge_date: Option<NaiveDate>,
    last_visit_date: Option<NaiveDate>,
}

fn read_row(row: &Row) -> rusqlite::Result<PatientRow> {
    Ok(PatientRow {
        id: row.get(0)?,
        name: row.get(1)?,
        date_of_birth: row.get(2)?,
        contact: row.get(3)?,
        patient_type: row.get(4)?,
        assigned_doctor_id: row.get(5)?,
        assigned_doctor_name: row.get(6)?,
        assigned_department_id: row.get(7)?,
        assigned_department_name: row.get(8)?,
        room: row.get(9)?,
        admission_date: row.get(10)?,
        discharge_date: row.get(11)?,
        last_visit_date: row.get(12)?,
    })
}

fn patient_from_row(row: PatientRow) -> Result<Patient, DatabaseError> {
    let missing = |field: &str| DatabaseError::Validation {
        field: field.into(),
        reason: format!("variant row for patient {} is incomplete", row.id),
    };

    let kind = match PatientType::from_str(&row.patient_type)? {
        PatientType::InPatient => PatientKind::InPatient {
            room: row.room.ok_or_else(|| missing("room"))?,
            admission_date: row.admission_date.ok_or_else(|| missing("admission_date"))?,
            discharge_date: row.discharge_date,
        },
        PatientType::OutPatient => PatientKind::OutPatient {
            last_visit_date: row
                .last_visit_date
                .ok_or_else(|| missing("last_visit_date"))?,
        },
    };

    Ok(Patient {
        id: row.id,
        name: row.name,
        date_of_birth: row.date_of_birth,
        contact: row.contact,
        assigned_doctor_id: row.assigned_doctor_id,
        assigned_doctor_name: row.assigned_doctor_name,
        assigned_department_id: row.assigned_department_id,
        assigned_department_name: row.assigned_department_name,
        kind,
    })
}
