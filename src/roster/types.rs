use serde::{Deserialize, Serialize};

/// One employee record as it appears in `employees.json` and in API responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub id: String,
    pub name: String,
    pub skills: Vec<String>,
    pub experience_years: f64,
    pub projects: Vec<String>,
    pub availability: String,
}
