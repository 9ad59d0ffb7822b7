use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::enums::AppointmentStatus;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: i64,
    pub patient_id: i64,
    pub patient_name: Option<String>,
    pub doctor_id: i64,
    pub doctor_name: Option<String>,
    pub scheduled_at: NaiveDateTime,
    pub reason: Option<String>,
    pub status: AppointmentStatus,
}

/// Both references must resolve at creation time. Status defaults to
/// Scheduled when omitted.
#[derive(Debug, Clone)]
pub struct NewAppointment {
    pub patient_id: i64,
    pub doctor_id: i64,
    pub scheduled_at: NaiveDateTime,
    pub reason: Option<String>,
    pub status: Option<AppointmentStatus>,
}
