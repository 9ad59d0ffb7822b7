use chrono::{NaiveDate, NaiveDateTime};

use super::enums::AppointmentStatus;

/// Three-state field update: leave the stored value untouched, clear it to
/// NULL, or set a new value. An absent field is never a clear — blank input
/// does not wipe data.
#[derive(Debug, Clone, PartialEq)]
pub enum Patch<T> {
    Keep,
    Clear,
    Set(T),
}

// Not derived: Keep must be the default for any T, not just T: Default.
impl<T> Default for Patch<T> {
    fn default() -> Self {
        Patch::Keep
    }
}

impl<T> Patch<T> {
    pub fn is_keep(&self) -> bool {
        matches!(self, Patch::Keep)
    }

    /// The value being set, if any. Used to re-validate changed references.
    pub fn set_value(&self) -> Option<&T> {
        match self {
            Patch::Set(v) => Some(v),
            _ => None,
        }
    }

    pub fn apply(&self, current: Option<T>) -> Option<T>
    where
        T: Clone,
    {
        match self {
            Patch::Keep => current,
            Patch::Clear => None,
            Patch::Set(v) => Some(v.clone()),
        }
    }
}

/// Partial patient update. Required fields use `Option` (None = keep);
/// optional fields use `Patch` so they can be cleared explicitly. Variant
/// fields only apply to the patient's own variant.
#[derive(Debug, Clone, Default)]
pub struct PatientUpdate {
    pub name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub contact: Patch<String>,
    pub assigned_doctor_id: Patch<i64>,
    pub assigned_department_id: Patch<i64>,
    pub room: Option<String>,
    pub admission_date: Option<NaiveDate>,
    pub discharge_date: Patch<NaiveDate>,
    pub last_visit_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default)]
pub struct DoctorUpdate {
    pub name: Option<String>,
    pub specialization: Patch<String>,
    pub contact: Patch<String>,
    pub department_id: Patch<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct DepartmentUpdate {
    pub name: Option<String>,
    pub specialty: Patch<String>,
    pub head_doctor_id: Patch<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct AppointmentUpdate {
    pub patient_id: Option<i64>,
    pub doctor_id: Option<i64>,
    pub scheduled_at: Option<NaiveDateTime>,
    pub reason: Patch<String>,
    pub status: Option<AppointmentStatus>,
}

#[derive(Debug, Clone, Default)]
pub struct MedicalRecordUpdate {
    pub patient_id: Option<i64>,
    pub doctor_id: Option<i64>,
    pub record_date: Option<NaiveDate>,
    pub diagnosis: Patch<String>,
    pub treatment: Patch<String>,
}
