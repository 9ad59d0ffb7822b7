use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::enums::PatientType;

/// A patient as read back from the store, with assignment names resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub id: i64,
    pub name: String,
    pub date_of_birth: NaiveDate,
    pub contact: Option<String>,
    pub assigned_doctor_id: Option<i64>,
    pub assigned_doctor_name: Option<String>,
    pub assigned_department_id: Option<i64>,
    pub assigned_department_name: Option<String>,
    #[serde(flatten)]
    pub kind: PatientKind,
}

/// The in/out variant. Serializes with a `patient_type` discriminant and
/// only the fields valid for the tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "patient_type")]
pub enum PatientKind {
    #[serde(rename = "inpatient")]
    InPatient {
        room: String,
        admission_date: NaiveDate,
        discharge_date: Option<NaiveDate>,
    },
    #[serde(rename = "outpatient")]
    OutPatient { last_visit_date: NaiveDate },
}

impl PatientKind {
    pub fn patient_type(&self) -> PatientType {
        match self {
            PatientKind::InPatient { .. } => PatientType::InPatient,
            PatientKind::OutPatient { .. } => PatientType::OutPatient,
        }
    }
}

/// Construction input. The variant tag is fixed once created.
#[derive(Debug, Clone)]
pub struct NewPatient {
    pub name: String,
    pub date_of_birth: NaiveDate,
    pub contact: Option<String>,
    pub assigned_doctor_id: Option<i64>,
    pub assigned_department_id: Option<i64>,
    pub kind: NewPatientKind,
}

/// Variant fields at creation. Omitted dates default to today.
#[derive(Debug, Clone)]
pub enum NewPatientKind {
    InPatient {
        room: String,
        admission_date: Option<NaiveDate>,
        discharge_date: Option<NaiveDate>,
    },
    OutPatient { last_visit_date: Option<NaiveDate> },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn inpatient_json_carries_tag_and_own_fields_only() {
        let patient = Patient {
            id: 1,
            name: "Ada Kovacs".into(),
            date_of_birth: date(1980, 5, 4),
            contact: Some("555-0100".into()),
            assigned_doctor_id: None,
            assigned_doctor_name: None,
            assigned_department_id: None,
            assigned_department_name: None,
            kind: PatientKind::InPatient {
                room: "101".into(),
                admission_date: date(2024, 1, 10),
                discharge_date: None,
            },
        };

        let json = serde_json::to_value(&patient).unwrap();
        assert_eq!(json["patient_type"], "inpatient");
        assert_eq!(json["room"], "101");
        assert_eq!(json["admission_date"], "2024-01-10");
        assert!(json.get("last_visit_date").is_none());

        let back: Patient = serde_json::from_value(json).unwrap();
        assert_eq!(back, patient);
    }

    #[test]
    fn outpatient_json_round_trip() {
        let patient = Patient {
            id: 2,
            name: "Ben Osei".into(),
            date_of_birth: date(1992, 11, 23),
            contact: None,
            assigned_doctor_id: None,
            assigned_doctor_name: None,
            assigned_department_id: None,
            assigned_department_name: None,
            kind: PatientKind::OutPatient {
                last_visit_date: date(2024, 2, 2),
            },
        };

        let json = serde_json::to_value(&patient).unwrap();
        assert_eq!(json["patient_type"], "outpatient");
        assert_eq!(json["last_visit_date"], "2024-02-02");
        assert!(json.get("room").is_none());

        let back: Patient = serde_json::from_value(json).unwrap();
        assert_eq!(back, patient);
    }
}
