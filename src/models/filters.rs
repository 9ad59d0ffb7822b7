use chrono::NaiveDate;

use super::enums::{AppointmentStatus, PatientType};

#[derive(Debug, Default)]
pub struct PatientFilter {
    pub patient_type: Option<PatientType>,
    pub assigned_doctor_id: Option<i64>,
    pub assigned_department_id: Option<i64>,
}

#[derive(Debug, Default)]
pub struct DoctorFilter {
    pub department_id: Option<i64>,
    /// Case-insensitive substring match on specialization.
    pub specialization: Option<String>,
}

#[derive(Debug, Default)]
pub struct AppointmentFilter {
    pub patient_id: Option<i64>,
    pub doctor_id: Option<i64>,
    pub status: Option<AppointmentStatus>,
    /// Appointments whose scheduled date-time falls on this calendar day.
    pub on_date: Option<NaiveDate>,
}

#[derive(Debug, Default)]
pub struct MedicalRecordFilter {
    pub patient_id: Option<i64>,
    pub doctor_id: Option<i64>,
}
