use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::validation::{validate_text, ValidationResult};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Program {
    pub code: i32,
    pub name: String,
    pub area: i32,
    pub area_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgramRequest {
    pub name: String,
    pub area: i32,
}

impl ProgramRequest {
    pub fn validate(&self) -> ValidationResult {
        validate_text("name", &self.name, 40)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Subject {
    pub code: String,
    pub name: String,
    pub program: i32,
    pub program_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubjectRequest {
    pub code: String,
    pub name: String,
    pub program: i32,
}

impl SubjectRequest {
    pub fn validate(&self) -> ValidationResult {
        validate_text("code", &self.code, 10)?;
        validate_text("name", &self.name, 30)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Group {
    pub nrc: String,
    pub number: i32,
    pub semester: String,
    pub subject: String,
    pub subject_name: String,
    pub professor: String,
    pub professor_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupRequest {
    pub nrc: String,
    pub number: i32,
    pub semester: String,
    pub subject: String,
    pub professor: String,
}

impl GroupRequest {
    pub fn validate(&self) -> ValidationResult {
        validate_text("nrc", &self.nrc, 10)?;
        validate_text("semester", &self.semester, 6)?;
        validate_text("subject", &self.subject, 10)?;
        validate_text("professor", &self.professor, 15)
    }
}

/// Row shape of an enrollment joined with its student and group
#[derive(Debug, Clone, FromRow)]
pub struct EnrollmentRow {
    pub id: i32,
    pub student: String,
    pub student_name: String,
    pub group_nrc: String,
    pub group_number: i32,
    pub subject_name: String,
    pub enrollment_date: NaiveDate,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GroupInfo {
    pub nrc: String,
    pub subject: String,
    pub number: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Enrollment {
    pub id: i32,
    pub student: String,
    pub student_name: String,
    pub group: String,
    pub group_info: GroupInfo,
    pub enrollment_date: NaiveDate,
    pub status: String,
}

impl From<EnrollmentRow> for Enrollment {
    fn from(row: EnrollmentRow) -> Self {
        Self {
            id: row.id,
            student: row.student,
            student_name: row.student_name,
            group: row.group_nrc.clone(),
            group_info: GroupInfo {
                nrc: row.group_nrc,
                subject: row.subject_name,
                number: row.group_number,
            },
            enrollment_date: row.enrollment_date,
            status: row.status,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrollmentRequest {
    pub student: String,
    pub group: String,
    /// Defaults to today
    pub enrollment_date: Option<NaiveDate>,
    pub status: String,
}

impl EnrollmentRequest {
    pub fn validate(&self) -> ValidationResult {
        validate_text("student", &self.student, 15)?;
        validate_text("group", &self.group, 10)?;
        validate_text("status", &self.status, 15)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ProgramFilter {
    pub area: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SubjectFilter {
    pub program: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GroupFilter {
    pub subject: Option<String>,
    pub semester: Option<String>,
    pub professor: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EnrollmentFilter {
    pub student: Option<String>,
    pub group: Option<String>,
    pub status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_enrollment_row_conversion() {
        let row = EnrollmentRow {
            id: 7,
            student: "2001".to_string(),
            student_name: "Laura Herrera".to_string(),
            group_nrc: "10234".to_string(),
            group_number: 1,
            subject_name: "Cálculo I".to_string(),
            enrollment_date: NaiveDate::from_ymd_opt(2024, 8, 1).unwrap(),
            status: "active".to_string(),
        };

        let enrollment = Enrollment::from(row);

        assert_eq!(enrollment.group, "10234");
        assert_eq!(
            enrollment.group_info,
            GroupInfo {
                nrc: "10234".to_string(),
                subject: "Cálculo I".to_string(),
                number: 1,
            }
        );
    }

    #[test]
    fn test_group_semester_length() {
        let request = GroupRequest {
            nrc: "10234".to_string(),
            number: 1,
            semester: "2024-2B".to_string(),
            subject: "MAT101".to_string(),
            professor: "1001".to_string(),
        };

        assert_eq!(request.validate().unwrap_err().field, "semester");
    }
}
