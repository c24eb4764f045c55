use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::validation::{validate_text, ValidationResult};

const LOOKUP_NAME_MAX: usize = 30;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct ContractType {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct EmployeeType {
    pub name: String,
}

/// Body for both lookup tables, which carry nothing but their name
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupRequest {
    pub name: String,
}

impl LookupRequest {
    pub fn validate(&self) -> ValidationResult {
        validate_text("name", &self.name, LOOKUP_NAME_MAX)
    }
}
