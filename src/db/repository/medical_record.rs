use chrono::Local;
use rusqlite::{params, Connection, Row};

use crate::db::{DatabaseError, Entity};
use crate::models::*;

use super::ensure_reference;

const RECORD_SELECT: &str = "SELECT r.id, r.patient_id, p.name, r.doctor_id, doc.name,
        r.record_date, r.diagnosis, r.treatment
 FROM medical_records r
 LEFT JOIN patients p ON p.id = r.patient_id
 LEFT JOIN doctors doc ON doc.id = r.doctor_id";

pub fn create_medical_record(
    conn: &Connection,
    new: &NewMedicalRecord,
) -> Result<MedicalRecord, DatabaseError> {
    ensure_reference(conn, Entity::Patient, new.patient_id)?;
    ensure_reference(conn, Entity::Doctor, new.doctor_id)?;

    conn.execute(
        "INSERT INTO medical_records (patient_id, doctor_id, record_date, diagnosis, treatment)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            new.patient_id,
            new.doctor_id,
            new.record_date.unwrap_or_else(|| Local::now().date_naive()),
            new.diagnosis,
            new.treatment,
        ],
    )?;
    let id = conn.last_insert_rowid();

    get_medical_record(conn, id)?.ok_or(DatabaseError::NotFound {
        entity: Entity::MedicalRecord,
        id,
    })
}

pub fn get_medical_record(
    conn: &Connection,
    id: i64,
) -> Result<Option<MedicalRecord>, DatabaseError> {
    let sql = format!("{RECORD_SELECT} WHERE r.id = ?1");
    let mut stmt = conn.prepare(&sql)?;
    let result = stmt.query_row(params![id], record_from_row);

    match result {
        Ok(record) => Ok(Some(record)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn list_medical_records(
    conn: &Connection,
    filter: &MedicalRecordFilter,
) -> Result<Vec<MedicalRecord>, DatabaseError> {
    let mut clauses: Vec<&str> = Vec::new();
    let mut values: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

    if let Some(patient_id) = filter.patient_id {
        clauses.push("r.patient_id = ?");
        values.push(Box::new(patient_id));
    }
    if let Some(doctor_id) = filter.doctor_id {
        clauses.push("r.doctor_id = ?");
        values.push(Box::new(doctor_id));
    }

    let mut sql = String::from(RECORD_SELECT);
    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
    sql.push_str(" ORDER BY r.id");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(
        rusqlite::params_from_iter(values.iter().map(|v| v.as_ref())),
        record_from_row,
    )?;

    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

pub fn update_medical_record(
    conn: &Connection,
    id: i64,
    update: &MedicalRecordUpdate,
) -> Result<MedicalRecord, DatabaseError> {
    let current = get_medical_record(conn, id)?.ok_or(DatabaseError::NotFound {
        entity: Entity::MedicalRecord,
        id,
    })?;

    if let Some(patient_id) = update.patient_id {
        ensure_reference(conn, Entity::Patient, patient_id)?;
    }
    if let Some(doctor_id) = update.doctor_id {
        ensure_reference(conn, Entity::Doctor, doctor_id)?;
    }

    conn.execute(
        "UPDATE medical_records SET patient_id = ?2, doctor_id = ?3, record_date = ?4,
         diagnosis = ?5, treatment = ?6
         WHERE id = ?1",
        params![
            id,
            update.patient_id.unwrap_or(current.patient_id),
            update.doctor_id.unwrap_or(current.doctor_id),
            update.record_date.unwrap_or(current.record_date),
            update.diagnosis.apply(current.diagnosis.clone()),
            update.treatment.apply(current.treatment.clone()),
        ],
    )?;

    get_medical_record(conn, id)?.ok_or(DatabaseError::NotFound {
        entity: Entity::MedicalRecord,
        id,
    })
}

pub fn delete_medical_record(conn: &Connection, id: i64) -> Result<(), DatabaseError> {
    let deleted = conn.execute("DELETE FROM medical_records WHERE id = ?1", params![id])?;
    if deleted == 0 {
        return Err(DatabaseError::NotFound {
            entity: Entity::MedicalRecord,
            id,
        });
    }
    Ok(())
}

fn record_from_row(row: &Row) -> rusqlite::Result<MedicalRecord> {
    Ok(MedicalRecord {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        patient_name: row.get(2)?,
        doctor_id: row.get(3)?,
        doctor_name: row.get(4)?,
        record_date: row.get(5)?,
        diagnosis: row.get(6)?,
        treatment: row.get(7)?,
    })
}
