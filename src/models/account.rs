use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::validation::{validate_email, validate_max_len, validate_text, ValidationError, ValidationResult};
use crate::auth::UserRole;

/// Employee type that marks someone as a fitness trainer
pub const TRAINER_EMPLOYEE_TYPE: &str = "Entrenador";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Student {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub birth_date: NaiveDate,
    pub birth_place: i32,
    pub birth_place_name: String,
    pub campus: i32,
    pub campus_name: String,
}

impl Student {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentRequest {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub birth_date: NaiveDate,
    pub birth_place: i32,
    pub campus: i32,
}

impl StudentRequest {
    pub fn validate(&self) -> ValidationResult {
        validate_text("id", &self.id, 15)?;
        validate_text("first_name", &self.first_name, 30)?;
        validate_text("last_name", &self.last_name, 30)?;
        validate_email("email", &self.email)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Employee {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub contract_type: String,
    pub contract_type_name: String,
    pub employee_type: String,
    pub employee_type_name: String,
    pub faculty: i32,
    pub faculty_name: String,
    pub campus: i32,
    pub campus_name: String,
    pub birth_place: i32,
    pub birth_place_name: String,
}

impl Employee {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeRequest {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub contract_type: String,
    pub employee_type: String,
    pub faculty: i32,
    pub campus: i32,
    pub birth_place: i32,
}

impl EmployeeRequest {
    pub fn validate(&self) -> ValidationResult {
        validate_text("id", &self.id, 15)?;
        validate_text("first_name", &self.first_name, 30)?;
        validate_text("last_name", &self.last_name, 30)?;
        validate_email("email", &self.email)?;
        validate_text("contract_type", &self.contract_type, 30)?;
        validate_text("employee_type", &self.employee_type, 30)
    }
}

/// Row of the `users` table
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub role: String,
    pub is_active: bool,
    pub is_staff: bool,
    pub created_at: DateTime<Utc>,
    pub student_id: Option<String>,
    pub employee_id: Option<String>,
}

impl User {
    pub fn role(&self) -> UserRole {
        UserRole::from_str(&self.role).unwrap_or(UserRole::Student)
    }
}

/// Who a user account stands for. The role and the profile link travel
/// together so a user can never be a student and an employee at once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    Student(String),
    Employee(String),
    Admin,
}

impl Identity {
    pub fn from_parts(
        role: &UserRole,
        student: Option<String>,
        employee: Option<String>,
    ) -> Result<Self, ValidationError> {
        let student = student.filter(|id| !id.trim().is_empty());
        let employee = employee.filter(|id| !id.trim().is_empty());

        match (role, student, employee) {
            (_, Some(_), Some(_)) => Err(ValidationError::new(
                "non_field_errors",
                "User cannot be both a student and an employee.",
            )),
            (UserRole::Student, Some(student), None) => Ok(Identity::Student(student)),
            (UserRole::Student, _, _) => Err(ValidationError::new(
                "student",
                "A STUDENT user must be linked to a student.",
            )),
            (UserRole::Employee, None, Some(employee)) => Ok(Identity::Employee(employee)),
            (UserRole::Employee, _, _) => Err(ValidationError::new(
                "employee",
                "An EMPLOYEE user must be linked to an employee.",
            )),
            (UserRole::Admin, None, None) => Ok(Identity::Admin),
            (UserRole::Admin, _, _) => Err(ValidationError::new(
                "role",
                "An ADMIN user cannot be linked to a student or an employee.",
            )),
        }
    }

    pub fn role(&self) -> UserRole {
        match self {
            Identity::Student(_) => UserRole::Student,
            Identity::Employee(_) => UserRole::Employee,
            Identity::Admin => UserRole::Admin,
        }
    }

    pub fn student_id(&self) -> Option<&str> {
        match self {
            Identity::Student(id) => Some(id),
            _ => None,
        }
    }

    pub fn employee_id(&self) -> Option<&str> {
        match self {
            Identity::Employee(id) => Some(id),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserRequest {
    pub username: String,
    /// Required on create, optional on update
    pub password: Option<String>,
    pub role: UserRole,
    pub is_active: Option<bool>,
    pub is_staff: Option<bool>,
    pub student: Option<String>,
    pub employee: Option<String>,
}

impl UserRequest {
    pub fn validate(&self) -> Result<Identity, ValidationError> {
        validate_text("username", &self.username, 30)?;
        if let Some(student) = &self.student {
            validate_max_len("student", student, 15)?;
        }
        if let Some(employee) = &self.employee {
            validate_max_len("employee", employee, 15)?;
        }
        Identity::from_parts(&self.role, self.student.clone(), self.employee.clone())
    }
}

/// User representation returned by the API; the password hash never leaves the server
#[derive(Debug, Clone, Serialize)]
pub struct UserDetail {
    pub username: String,
    pub role: UserRole,
    pub is_active: bool,
    pub is_staff: bool,
    pub created_at: DateTime<Utc>,
    pub student: Option<String>,
    pub student_details: Option<Student>,
    pub employee: Option<String>,
    pub employee_details: Option<Employee>,
}

impl UserDetail {
    pub fn from_user(user: User, student: Option<Student>, employee: Option<Employee>) -> Self {
        let role = user.role();
        Self {
            username: user.username,
            role,
            is_active: user.is_active,
            is_staff: user.is_staff,
            created_at: user.created_at,
            student: user.student_id,
            student_details: student,
            employee: user.employee_id,
            employee_details: employee,
        }
    }

    /// Name shown on the dashboards: the linked person's name or the username
    pub fn display_name(&self) -> String {
        self.student_details
            .as_ref()
            .map(Student::full_name)
            .or_else(|| self.employee_details.as_ref().map(Employee::full_name))
            .unwrap_or_else(|| self.username.clone())
    }

    pub fn is_trainer(&self) -> bool {
        self.employee_details
            .as_ref()
            .map(|employee| employee.employee_type == TRAINER_EMPLOYEE_TYPE)
            .unwrap_or(false)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct StudentFilter {
    pub campus: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EmployeeFilter {
    pub faculty: Option<i32>,
    pub employee_type: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UserFilter {
    pub role: Option<UserRole>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_identity_requires_matching_link() {
        assert_eq!(
            Identity::from_parts(&UserRole::Student, Some("2001".into()), None).unwrap(),
            Identity::Student("2001".into())
        );
        assert_eq!(
            Identity::from_parts(&UserRole::Employee, None, Some("1001".into())).unwrap(),
            Identity::Employee("1001".into())
        );
        assert_eq!(
            Identity::from_parts(&UserRole::Admin, None, None).unwrap(),
            Identity::Admin
        );

        assert_matches!(
            Identity::from_parts(&UserRole::Student, None, None),
            Err(ValidationError { field, .. }) if field == "student"
        );
        assert_matches!(
            Identity::from_parts(&UserRole::Employee, Some("2001".into()), None),
            Err(ValidationError { field, .. }) if field == "employee"
        );
        assert_matches!(
            Identity::from_parts(&UserRole::Admin, None, Some("1001".into())),
            Err(ValidationError { field, .. }) if field == "role"
        );
    }

    #[test]
    fn test_identity_rejects_both_links() {
        for role in [UserRole::Student, UserRole::Employee, UserRole::Admin] {
            let result = Identity::from_parts(&role, Some("2001".into()), Some("1001".into()));
            assert_matches!(result, Err(ValidationError { field, .. }) if field == "non_field_errors");
        }
    }

    #[test]
    fn test_blank_link_counts_as_missing() {
        assert!(Identity::from_parts(&UserRole::Admin, Some("  ".into()), None).is_ok());
    }

    #[test]
    fn test_user_links_fit_the_id_column() {
        let request = UserRequest {
            username: "laura.h".to_string(),
            password: Some("secret123".to_string()),
            role: UserRole::Student,
            is_active: None,
            is_staff: None,
            student: Some("1234567890123456".to_string()),
            employee: None,
        };
        assert_matches!(request.validate(), Err(ValidationError { field, .. }) if field == "student");

        let request = UserRequest {
            role: UserRole::Employee,
            student: None,
            employee: Some("1234567890123456".to_string()),
            ..request
        };
        assert_matches!(request.validate(), Err(ValidationError { field, .. }) if field == "employee");
    }

    #[test]
    fn test_identity_accessors() {
        let identity = Identity::Employee("1003".into());
        assert_eq!(identity.role(), UserRole::Employee);
        assert_eq!(identity.employee_id(), Some("1003"));
        assert_eq!(identity.student_id(), None);
    }
}
