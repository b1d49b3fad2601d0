use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use super::types::Employee;

#[derive(Debug, Error)]
pub enum RosterError {
    #[error("Failed to read roster {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse roster: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Duplicate employee id: {0}")]
    DuplicateId(String),

    #[error("Invalid employee record {id}: {reason}")]
    InvalidRecord { id: String, reason: String },
}

#[derive(Deserialize)]
struct RosterFile {
    employees: Vec<Employee>,
}

pub fn load_roster(path: &Path) -> Result<Vec<Employee>, RosterError> {
    let contents = fs::read_to_string(path).map_err(|source| RosterError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let employees = parse_roster(&contents)?;
    tracing::info!("Loaded {} employees from {}", employees.len(), path.display());
    Ok(employees)
}

/// Parses `{"employees": [...]}` and enforces the roster invariants.
pub fn parse_roster(contents: &str) -> Result<Vec<Employee>, RosterError> {
    let file: RosterFile = serde_json::from_str(contents)?;

    let mut seen = HashSet::with_capacity(file.employees.len());
    for employee in &file.employees {
        if !employee.experience_years.is_finite() || employee.experience_years < 0.0 {
            return Err(RosterError::InvalidRecord {
                id: employee.id.clone(),
                reason: format!(
                    "experience_years must be a non-negative number, got {}",
                    employee.experience_years
                ),
            });
        }
        if !seen.insert(employee.id.as_str()) {
            return Err(RosterError::DuplicateId(employee.id.clone()));
        }
    }

    Ok(file.employees)
}
