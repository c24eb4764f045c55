use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::validation::{validate_max_len, validate_text, ValidationResult};

const NAME_MAX: usize = 40;
const PERSON_ID_MAX: usize = 15;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Country {
    pub code: i32,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountryRequest {
    pub name: String,
}

impl CountryRequest {
    pub fn validate(&self) -> ValidationResult {
        validate_text("name", &self.name, NAME_MAX)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Department {
    pub code: i32,
    pub name: String,
    pub country: i32,
    pub country_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepartmentRequest {
    pub name: String,
    pub country: i32,
}

impl DepartmentRequest {
    pub fn validate(&self) -> ValidationResult {
        validate_text("name", &self.name, NAME_MAX)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct City {
    pub code: i32,
    pub name: String,
    pub department: i32,
    pub department_name: String,
    pub country_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CityRequest {
    pub name: String,
    pub department: i32,
}

impl CityRequest {
    pub fn validate(&self) -> ValidationResult {
        validate_text("name", &self.name, NAME_MAX)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Campus {
    pub code: i32,
    pub name: String,
    pub city: i32,
    pub city_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampusRequest {
    pub name: String,
    pub city: i32,
}

impl CampusRequest {
    pub fn validate(&self) -> ValidationResult {
        validate_text("name", &self.name, NAME_MAX)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Faculty {
    pub code: i32,
    pub name: String,
    pub location: Option<String>,
    pub phone_number: Option<String>,
    pub campus: i32,
    pub campus_name: String,
    pub dean_id: Option<String>,
    pub dean_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FacultyRequest {
    pub name: String,
    pub location: Option<String>,
    pub phone_number: Option<String>,
    pub campus: i32,
    pub dean_id: Option<String>,
}

impl FacultyRequest {
    pub fn validate(&self) -> ValidationResult {
        validate_text("name", &self.name, NAME_MAX)?;
        if let Some(location) = &self.location {
            validate_max_len("location", location, 60)?;
        }
        if let Some(phone) = &self.phone_number {
            validate_max_len("phone_number", phone, 20)?;
        }
        if let Some(dean_id) = &self.dean_id {
            validate_max_len("dean_id", dean_id, PERSON_ID_MAX)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Area {
    pub code: i32,
    pub name: String,
    pub faculty: i32,
    pub faculty_name: String,
    pub coordinator_id: Option<String>,
    pub coordinator_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AreaRequest {
    pub name: String,
    pub faculty: i32,
    pub coordinator_id: Option<String>,
}

impl AreaRequest {
    pub fn validate(&self) -> ValidationResult {
        validate_text("name", &self.name, NAME_MAX)?;
        if let Some(coordinator_id) = &self.coordinator_id {
            validate_max_len("coordinator_id", coordinator_id, PERSON_ID_MAX)?;
        }
        Ok(())
    }
}

/// Query-string filters for the location lists
#[derive(Debug, Default, Deserialize)]
pub struct LocationFilter {
    pub country: Option<i32>,
    pub department: Option<i32>,
    pub city: Option<i32>,
    pub campus: Option<i32>,
    pub faculty: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_names_are_rejected() {
        let request = CountryRequest {
            name: "".to_string(),
        };
        assert!(request.validate().is_err());

        let request = DepartmentRequest {
            name: "Valle del Cauca".to_string(),
            country: 1,
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_faculty_optional_fields_are_bounded() {
        let request = FacultyRequest {
            name: "Facultad de Ciencias".to_string(),
            location: Some("Cali".to_string()),
            phone_number: Some("5".repeat(21)),
            campus: 1,
            dean_id: None,
        };

        let err = request.validate().unwrap_err();
        assert_eq!(err.field, "phone_number");
    }

    #[test]
    fn test_person_references_fit_the_id_column() {
        let faculty = FacultyRequest {
            name: "Facultad de Ciencias".to_string(),
            location: None,
            phone_number: None,
            campus: 1,
            dean_id: Some("1234567890123456".to_string()),
        };
        assert_eq!(faculty.validate().unwrap_err().field, "dean_id");

        let area = AreaRequest {
            name: "Bienestar".to_string(),
            faculty: 1,
            coordinator_id: Some("1234567890123456".to_string()),
        };
        assert_eq!(area.validate().unwrap_err().field, "coordinator_id");

        let area = AreaRequest {
            coordinator_id: Some("123456789012345".to_string()),
            ..area
        };
        assert!(area.validate().is_ok());
    }
}
