use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicalRecord {
    pub id: i64,
    pub patient_id: i64,
    pub patient_name: Option<String>,
    pub doctor_id: i64,
    pub doctor_name: Option<String>,
    pub record_date: NaiveDate,
    pub diagnosis: Option<String>,
    pub treatment: Option<String>,
}

/// Record date defaults to today when omitted.
#[derive(Debug, Clone)]
pub struct NewMedicalRecord {
    pub patient_id: i64,
    pub doctor_id: i64,
    pub record_date: Option<NaiveDate>,
    pub diagnosis: Option<String>,
    pub treatment: Option<String>,
}
