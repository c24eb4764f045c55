use std::collections::HashMap;

use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::password::{hash_password, validate_password_strength, PasswordPolicy};
use crate::auth::UserRole;
use crate::models::{
    Employee, EmployeeFilter, EmployeeRequest, Student, StudentFilter, StudentRequest, User,
    UserDetail, UserRequest, ValidationError, TRAINER_EMPLOYEE_TYPE,
};

const STUDENT_SELECT: &str = "SELECT s.id, s.first_name, s.last_name, s.email, s.birth_date,
            s.birth_place_code AS birth_place, bp.name AS birth_place_name,
            s.campus_code AS campus, ca.name AS campus_name
     FROM students s
     JOIN cities bp ON bp.code = s.birth_place_code
     JOIN campuses ca ON ca.code = s.campus_code";

const EMPLOYEE_SELECT: &str = "SELECT e.id, e.first_name, e.last_name, e.email,
            e.contract_type, e.contract_type AS contract_type_name,
            e.employee_type, e.employee_type AS employee_type_name,
            e.faculty_code AS faculty, f.name AS faculty_name,
            e.campus_code AS campus, ca.name AS campus_name,
            e.birth_place_code AS birth_place, bp.name AS birth_place_name
     FROM employees e
     JOIN faculties f ON f.code = e.faculty_code
     JOIN campuses ca ON ca.code = e.campus_code
     JOIN cities bp ON bp.code = e.birth_place_code";

const USER_SELECT: &str = "SELECT id, username, password_hash, role, is_active, is_staff, created_at,
            student_id, employee_id
     FROM users";

/// Students, employees and login accounts
#[derive(Debug, Clone)]
pub struct AccountService {
    db: PgPool,
}

impl AccountService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    // Students

    pub async fn list_students(&self, filter: &StudentFilter) -> Result<Vec<Student>> {
        let query = format!(
            "{} WHERE ($1::int IS NULL OR s.campus_code = $1) ORDER BY s.last_name, s.first_name",
            STUDENT_SELECT
        );
        let students = sqlx::query_as::<_, Student>(&query)
            .bind(filter.campus)
            .fetch_all(&self.db)
            .await?;
        Ok(students)
    }

    pub async fn get_student(&self, id: &str) -> Result<Option<Student>> {
        let query = format!("{} WHERE s.id = $1", STUDENT_SELECT);
        let student = sqlx::query_as::<_, Student>(&query)
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(student)
    }

    pub async fn create_student(&self, request: StudentRequest) -> Result<Student> {
        request.validate()?;
        sqlx::query(
            "INSERT INTO students (id, first_name, last_name, email, birth_date, campus_code, birth_place_code)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(request.id.trim())
        .bind(request.first_name.trim())
        .bind(request.last_name.trim())
        .bind(request.email.trim())
        .bind(request.birth_date)
        .bind(request.campus)
        .bind(request.birth_place)
        .execute(&self.db)
        .await?;

        tracing::info!("Created student {}", request.id);
        self.get_student(request.id.trim())
            .await?
            .ok_or_else(|| anyhow::anyhow!("Created student {} could not be read back", request.id))
    }

    pub async fn update_student(&self, id: &str, request: StudentRequest) -> Result<Option<Student>> {
        request.validate()?;
        ensure_same_key("id", id, &request.id)?;

        let updated = sqlx::query(
            "UPDATE students
             SET first_name = $2, last_name = $3, email = $4, birth_date = $5,
                 campus_code = $6, birth_place_code = $7
             WHERE id = $1",
        )
        .bind(id)
        .bind(request.first_name.trim())
        .bind(request.last_name.trim())
        .bind(request.email.trim())
        .bind(request.birth_date)
        .bind(request.campus)
        .bind(request.birth_place)
        .execute(&self.db)
        .await?;

        if updated.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_student(id).await
    }

    pub async fn delete_student(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM students WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // Employees

    pub async fn list_employees(&self, filter: &EmployeeFilter) -> Result<Vec<Employee>> {
        let query = format!(
            "{} WHERE ($1::int IS NULL OR e.faculty_code = $1)
               AND ($2::text IS NULL OR e.employee_type = $2)
             ORDER BY e.last_name, e.first_name",
            EMPLOYEE_SELECT
        );
        let employees = sqlx::query_as::<_, Employee>(&query)
            .bind(filter.faculty)
            .bind(&filter.employee_type)
            .fetch_all(&self.db)
            .await?;
        Ok(employees)
    }

    pub async fn get_employee(&self, id: &str) -> Result<Option<Employee>> {
        let query = format!("{} WHERE e.id = $1", EMPLOYEE_SELECT);
        let employee = sqlx::query_as::<_, Employee>(&query)
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(employee)
    }

    pub async fn create_employee(&self, request: EmployeeRequest) -> Result<Employee> {
        request.validate()?;
        sqlx::query(
            "INSERT INTO employees (id, first_name, last_name, email, contract_type, employee_type,
                                    faculty_code, campus_code, birth_place_code)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(request.id.trim())
        .bind(request.first_name.trim())
        .bind(request.last_name.trim())
        .bind(request.email.trim())
        .bind(&request.contract_type)
        .bind(&request.employee_type)
        .bind(request.faculty)
        .bind(request.campus)
        .bind(request.birth_place)
        .execute(&self.db)
        .await?;

        tracing::info!("Created employee {}", request.id);
        self.get_employee(request.id.trim())
            .await?
            .ok_or_else(|| anyhow::anyhow!("Created employee {} could not be read back", request.id))
    }

    pub async fn update_employee(&self, id: &str, request: EmployeeRequest) -> Result<Option<Employee>> {
        request.validate()?;
        ensure_same_key("id", id, &request.id)?;

        let updated = sqlx::query(
            "UPDATE employees
             SET first_name = $2, last_name = $3, email = $4, contract_type = $5,
                 employee_type = $6, faculty_code = $7, campus_code = $8, birth_place_code = $9
             WHERE id = $1",
        )
        .bind(id)
        .bind(request.first_name.trim())
        .bind(request.last_name.trim())
        .bind(request.email.trim())
        .bind(&request.contract_type)
        .bind(&request.employee_type)
        .bind(request.faculty)
        .bind(request.campus)
        .bind(request.birth_place)
        .execute(&self.db)
        .await?;

        if updated.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_employee(id).await
    }

    pub async fn delete_employee(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM employees WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // Users

    pub async fn list_users(&self, role: Option<UserRole>) -> Result<Vec<UserDetail>> {
        let query = format!(
            "{} WHERE ($1::text IS NULL OR role = $1) ORDER BY username",
            USER_SELECT
        );
        let users = sqlx::query_as::<_, User>(&query)
            .bind(role.map(|role| role.as_str()))
            .fetch_all(&self.db)
            .await?;

        self.user_details(users).await
    }

    pub async fn get_user(&self, username: &str) -> Result<Option<UserDetail>> {
        match self.find_user(username).await? {
            Some(user) => Ok(Some(self.user_detail(user).await?)),
            None => Ok(None),
        }
    }

    pub async fn get_user_by_id(&self, id: Uuid) -> Result<Option<UserDetail>> {
        let query = format!("{} WHERE id = $1", USER_SELECT);
        let user = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        match user {
            Some(user) => Ok(Some(self.user_detail(user).await?)),
            None => Ok(None),
        }
    }

    pub async fn find_user(&self, username: &str) -> Result<Option<User>> {
        let query = format!("{} WHERE username = $1", USER_SELECT);
        let user = sqlx::query_as::<_, User>(&query)
            .bind(username)
            .fetch_optional(&self.db)
            .await?;
        Ok(user)
    }

    /// Attach the linked student or employee to a user row
    pub async fn user_detail(&self, user: User) -> Result<UserDetail> {
        let student = match &user.student_id {
            Some(id) => self.get_student(id).await?,
            None => None,
        };
        let employee = match &user.employee_id {
            Some(id) => self.get_employee(id).await?,
            None => None,
        };
        Ok(UserDetail::from_user(user, student, employee))
    }

    async fn user_details(&self, users: Vec<User>) -> Result<Vec<UserDetail>> {
        let student_ids: Vec<String> = users.iter().filter_map(|u| u.student_id.clone()).collect();
        let employee_ids: Vec<String> = users.iter().filter_map(|u| u.employee_id.clone()).collect();

        let mut students: HashMap<String, Student> = HashMap::new();
        if !student_ids.is_empty() {
            let query = format!("{} WHERE s.id = ANY($1)", STUDENT_SELECT);
            for student in sqlx::query_as::<_, Student>(&query)
                .bind(&student_ids)
                .fetch_all(&self.db)
                .await?
            {
                students.insert(student.id.clone(), student);
            }
        }

        let mut employees: HashMap<String, Employee> = HashMap::new();
        if !employee_ids.is_empty() {
            let query = format!("{} WHERE e.id = ANY($1)", EMPLOYEE_SELECT);
            for employee in sqlx::query_as::<_, Employee>(&query)
                .bind(&employee_ids)
                .fetch_all(&self.db)
                .await?
            {
                employees.insert(employee.id.clone(), employee);
            }
        }

        Ok(users
            .into_iter()
            .map(|user| {
                let student = user.student_id.as_ref().and_then(|id| students.remove(id));
                let employee = user.employee_id.as_ref().and_then(|id| employees.remove(id));
                UserDetail::from_user(user, student, employee)
            })
            .collect())
    }

    pub async fn create_user(&self, request: UserRequest) -> Result<UserDetail> {
        let identity = request.validate()?;
        let password = request
            .password
            .as_deref()
            .filter(|password| !password.is_empty())
            .ok_or_else(|| ValidationError::new("password", "This field is required"))?;
        let password_hash = hashed(password).await?;

        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (id, username, password_hash, role, is_active, is_staff, student_id, employee_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING id, username, password_hash, role, is_active, is_staff, created_at,
                       student_id, employee_id",
        )
        .bind(Uuid::new_v4())
        .bind(request.username.trim())
        .bind(&password_hash)
        .bind(identity.role().as_str())
        .bind(request.is_active.unwrap_or(true))
        .bind(request.is_staff.unwrap_or(false))
        .bind(identity.student_id())
        .bind(identity.employee_id())
        .fetch_one(&self.db)
        .await?;

        tracing::info!("Created {} user {}", user.role, user.username);
        self.user_detail(user).await
    }

    /// Full replacement; the password only changes when one is given. The
    /// username is the key fitness documents refer to, so it stays fixed.
    pub async fn update_user(&self, username: &str, request: UserRequest) -> Result<Option<UserDetail>> {
        let identity = request.validate()?;
        ensure_same_key("username", username, &request.username)?;
        let password_hash = match request.password.as_deref().filter(|p| !p.is_empty()) {
            Some(password) => Some(hashed(password).await?),
            None => None,
        };

        let user = sqlx::query_as::<_, User>(
            "UPDATE users
             SET password_hash = COALESCE($2, password_hash), role = $3,
                 is_active = $4, is_staff = $5, student_id = $6, employee_id = $7
             WHERE username = $1
             RETURNING id, username, password_hash, role, is_active, is_staff, created_at,
                       student_id, employee_id",
        )
        .bind(username)
        .bind(password_hash)
        .bind(identity.role().as_str())
        .bind(request.is_active.unwrap_or(true))
        .bind(request.is_staff.unwrap_or(false))
        .bind(identity.student_id())
        .bind(identity.employee_id())
        .fetch_optional(&self.db)
        .await?;

        match user {
            Some(user) => Ok(Some(self.user_detail(user).await?)),
            None => Ok(None),
        }
    }

    pub async fn delete_user(&self, username: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE username = $1")
            .bind(username)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn count_users(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.db)
            .await?;
        Ok(count)
    }

    pub async fn count_trainers(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM employees WHERE employee_type = $1")
            .bind(TRAINER_EMPLOYEE_TYPE)
            .fetch_one(&self.db)
            .await?;
        Ok(count)
    }
}

/// Policy check, then bcrypt on the blocking pool
async fn hashed(password: &str) -> Result<String> {
    validate_password_strength(password, &PasswordPolicy::default())
        .map_err(|err| ValidationError::new("password", err.to_string()))?;
    let password = password.to_string();
    Ok(tokio::task::spawn_blocking(move || hash_password(&password)).await??)
}

/// Natural keys are fixed once created
pub(crate) fn ensure_same_key(field: &str, path_key: &str, body_key: &str) -> Result<(), ValidationError> {
    if path_key != body_key.trim() {
        return Err(ValidationError::new(field, "This identifier cannot be changed"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::verify_password;

    #[tokio::test]
    async fn test_weak_password_is_a_validation_error() {
        let err = hashed("short").await.unwrap_err();
        let validation = err.downcast_ref::<ValidationError>().unwrap();
        assert_eq!(validation.field, "password");
    }

    #[tokio::test]
    async fn test_accepted_password_is_hashed() {
        let hash = hashed("secret123").await.unwrap();
        assert!(hash.starts_with("$2"));
        assert!(verify_password("secret123", &hash).unwrap());
    }

    #[test]
    fn test_key_cannot_change() {
        assert!(ensure_same_key("id", "2001", "2001").is_ok());
        assert!(ensure_same_key("id", "2001", " 2001 ").is_ok());
        assert_eq!(ensure_same_key("id", "2001", "2002").unwrap_err().field, "id");
    }
}
