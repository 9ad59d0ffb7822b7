use serde::{Deserialize, Serialize};

/// Department names are unique. `head_doctor_name` is resolved on read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Department {
    pub id: i64,
    pub name: String,
    pub specialty: Option<String>,
    pub head_doctor_id: Option<i64>,
    pub head_doctor_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewDepartment {
    pub name: String,
    pub specialty: Option<String>,
    pub head_doctor_id: Option<i64>,
}
