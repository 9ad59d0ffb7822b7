use rusqlite::{params, Connection, Row};

use crate::db::{DatabaseError, Entity};
use crate::models::*;

use super::{ensure_reference, row_exists};

const DEPARTMENT_SELECT: &str = "SELECT dep.id, dep.name, dep.specialty,
        dep.head_doctor_id, doc.name
 FROM departments dep
 LEFT JOIN doctors doc ON doc.id = dep.head_doctor_id";

pub fn create_department(
    conn: &Connection,
    new: &NewDepartment,
) -> Result<Department, DatabaseError> {
    if new.name.trim().is_empty() {
        return Err(DatabaseError::Validation {
            field: "name".into(),
            reason: "must not be blank".into(),
        });
    }
    if department_name_taken(conn, &new.name, None)? {
        return Err(DatabaseError::Conflict(format!(
            "department name '{}' already exists",
            new.name
        )));
    }
    if let Some(doctor_id) = new.head_doctor_id {
        ensure_reference(conn, Entity::Doctor, doctor_id)?;
    }

    conn.execute(
        "INSERT INTO departments (name, specialty, head_doctor_id) VALUES (?1, ?2, ?3)",
        params![new.name, new.specialty, new.head_doctor_id],
    )
    .map_err(|e| map_unique_violation(e, &new.name))?;
    let id = conn.last_insert_rowid();

    get_department(conn, id)?.ok_or(DatabaseError::NotFound {
        entity: Entity::Department,
        id,
    })
}

pub fn get_department(conn: &Connection, id: i64) -> Result<Option<Department>, DatabaseError> {
    let sql = format!("{DEPARTMENT_SELECT} WHERE dep.id = ?1");
    let mut stmt = conn.prepare(&sql)?;
    let result = stmt.query_row(params![id], department_from_row);

    match result {
        Ok(department) => Ok(Some(department)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn list_departments(conn: &Connection) -> Result<Vec<Department>, DatabaseError> {
    let sql = format!("{DEPARTMENT_SELECT} ORDER BY dep.id");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], department_from_row)?;

    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

pub fn update_department(
    conn: &Connection,
    id: i64,
    update: &DepartmentUpdate,
) -> Result<Department, DatabaseError> {
    let current = get_department(conn, id)?.ok_or(DatabaseError::NotFound {
        entity: Entity::Department,
        id,
    })?;

    if let Some(name) = &update.name {
        if name.trim().is_empty() {
            return Err(DatabaseError::Validation {
                field: "name".into(),
                reason: "must not be blank".into(),
            });
        }
        if name != &current.name && department_name_taken(conn, name, Some(id))? {
            return Err(DatabaseError::Conflict(format!(
                "department name '{name}' already exists"
            )));
        }
    }
    if let Some(doctor_id) = update.head_doctor_id.set_value() {
        ensure_reference(conn, Entity::Doctor, *doctor_id)?;
    }

    let name = update.name.as_deref().unwrap_or(&current.name);
    conn.execute(
        "UPDATE departments SET name = ?2, specialty = ?3, head_doctor_id = ?4 WHERE id = ?1",
        params![
            id,
            name,
            update.specialty.apply(current.specialty.clone()),
            update.head_doctor_id.apply(current.head_doctor_id),
        ],
    )
    .map_err(|e| map_unique_violation(e, name))?;

    get_department(conn, id)?.ok_or(DatabaseError::NotFound {
        entity: Entity::Department,
        id,
    })
}

/// Delete a department. Doctors and patients pointing at it are left in
/// place with the link cleared.
pub fn delete_department(conn: &Connection, id: i64) -> Result<(), DatabaseError> {
    let tx = conn.unchecked_transaction()?;

    let doctors_unassigned = tx.execute(
        "UPDATE doctors SET department_id = NULL WHERE department_id = ?1",
        params![id],
    )?;
    let patients_unassigned = tx.execute(
        "UPDATE patients SET assigned_department_id = NULL WHERE assigned_department_id = ?1",
        params![id],
    )?;

    let deleted = tx.execute("DELETE FROM departments WHERE id = ?1", params![id])?;
    if deleted == 0 {
        return Err(DatabaseError::NotFound {
            entity: Entity::Department,
            id,
        });
    }
    tx.commit()?;

    tracing::info!(
        department_id = id,
        doctors_unassigned,
        patients_unassigned,
        "Department deleted; assignment links cleared"
    );
    Ok(())
}

pub fn assign_head_doctor(
    conn: &Connection,
    department_id: i64,
    doctor_id: i64,
) -> Result<Department, DatabaseError> {
    if !row_exists(conn, Entity::Department, department_id)? {
        return Err(DatabaseError::NotFound {
            entity: Entity::Department,
            id: department_id,
        });
    }
    ensure_reference(conn, Entity::Doctor, doctor_id)?;

    conn.execute(
        "UPDATE departments SET head_doctor_id = ?2 WHERE id = ?1",
        params![department_id, doctor_id],
    )?;

    get_department(conn, department_id)?.ok_or(DatabaseError::NotFound {
        entity: Entity::Department,
        id: department_id,
    })
}

/// Clear the head-doctor reference. Succeeds as a no-op when the department
/// already has no head.
pub fn unassign_head_doctor(
    conn: &Connection,
    department_id: i64,
) -> Result<Department, DatabaseError> {
    if !row_exists(conn, Entity::Department, department_id)? {
        return Err(DatabaseError::NotFound {
            entity: Entity::Department,
            id: department_id,
        });
    }

    conn.execute(
        "UPDATE departments SET head_doctor_id = NULL WHERE id = ?1",
        params![department_id],
    )?;

    get_department(conn, department_id)?.ok_or(DatabaseError::NotFound {
        entity: Entity::Department,
        id: department_id,
    })
}

/// Count of doctors working in the department.
pub fn staff_count(conn: &Connection, department_id: i64) -> Result<i64, DatabaseError> {
    if !row_exists(conn, Entity::Department, department_id)? {
        return Err(DatabaseError::NotFound {
            entity: Entity::Department,
            id: department_id,
        });
    }

    let count = conn.query_row(
        "SELECT COUNT(*) FROM doctors WHERE department_id = ?1",
        params![department_id],
        |row| row.get::<_, i64>(0),
    )?;
    Ok(count)
}

/// Doctors in the department whose specialization exactly equals the
/// department's own specialty.
pub fn doctors_matching_department_specialty(
    conn: &Connection,
    department_id: i64,
) -> Result<Vec<Doctor>, DatabaseError> {
    let department = get_department(conn, department_id)?.ok_or(DatabaseError::NotFound {
        entity: Entity::Department,
        id: department_id,
    })?;
    let specialty = department.specialty.ok_or_else(|| DatabaseError::Validation {
        field: "specialty".into(),
        reason: format!(
            "department '{}' has no specialty to match doctors against",
            department.name
        ),
    })?;

    let mut stmt = conn.prepare(
        "SELECT d.id, d.name, d.specialization, d.contact, d.department_id, dep.name
         FROM doctors d
         LEFT JOIN departments dep ON dep.id = d.department_id
         WHERE d.department_id = ?1 AND d.specialization = ?2
         ORDER BY d.id",
    )?;
    let rows = stmt.query_map(params![department_id, specialty], |row| {
        Ok(Doctor {
            id: row.get(0)?,
            name: row.get(1)?,
            specialization: row.get(2)?,
            contact: row.get(3)?,
            department_id: row.get(4)?,
            department_name: row.get(5)?,
        })
    })?;

    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

fn department_name_taken(
    conn: &Connection,
    name: &str,
    exclude_id: Option<i64>,
) -> Result<bool, DatabaseError> {
    let taken = match exclude_id {
        Some(id) => conn.query_row(
            "SELECT 1 FROM departments WHERE name = ?1 AND id != ?2 LIMIT 1",
            params![name, id],
            |_| Ok(()),
        ),
        None => conn.query_row(
            "SELECT 1 FROM departments WHERE name = ?1 LIMIT 1",
            params![name],
            |_| Ok(()),
        ),
    };
    match taken {
        Ok(()) => Ok(true),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(false),
        Err(e) => Err(e.into()),
    }
}

// Backstop for concurrent writers racing past the name pre-check.
fn map_unique_violation(e: rusqlite::Error, name: &str) -> DatabaseError {
    match &e {
        rusqlite::Error::SqliteFailure(err, _)
            if err.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            DatabaseError::Conflict(format!("department name '{name}' already exists"))
        }
        _ => DatabaseError::Sqlite(e),
    }
}

fn department_from_row(row: &Row) -> rusqlite::Result<Department> {
    Ok(Department {
        id: row.get(0)?,
        name: row.get(1)?,
        specialty: row.get(2)?,
        head_doctor_id: row.get(3)?,
        head_doctor_name: row.get(4)?,
    })
}
