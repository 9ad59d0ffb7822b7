use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Doctor {
    pub id: i64,
    pub name: String,
    pub specialization: Option<String>,
    pub contact: Option<String>,
    pub department_id: Option<i64>,
    pub department_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewDoctor {
    pub name: String,
    pub specialization: Option<String>,
    pub contact: Option<String>,
    pub department_id: Option<i64>,
}
