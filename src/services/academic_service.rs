use anyhow::Result;
use chrono::Utc;
use sqlx::PgPool;

use super::account_service::ensure_same_key;
use crate::models::{
    Enrollment, EnrollmentFilter, EnrollmentRequest, EnrollmentRow, Group, GroupFilter,
    GroupRequest, Program, ProgramFilter, ProgramRequest, Subject, SubjectFilter, SubjectRequest,
};

const PROGRAM_SELECT: &str = "SELECT p.code, p.name, p.area_code AS area, a.name AS area_name
     FROM programs p
     JOIN areas a ON a.code = p.area_code";

const SUBJECT_SELECT: &str = "SELECT s.code, s.name, s.program_code AS program, p.name AS program_name
     FROM subjects s
     JOIN programs p ON p.code = s.program_code";

const GROUP_SELECT: &str = "SELECT g.nrc, g.number, g.semester, g.subject_code AS subject,
            s.name AS subject_name, g.professor_id AS professor,
            e.first_name || ' ' || e.last_name AS professor_name
     FROM course_groups g
     JOIN subjects s ON s.code = g.subject_code
     JOIN employees e ON e.id = g.professor_id";

const ENROLLMENT_SELECT: &str = "SELECT en.id, en.student_id AS student,
            st.first_name || ' ' || st.last_name AS student_name,
            en.group_nrc, g.number AS group_number, s.name AS subject_name,
            en.enrollment_date, en.status
     FROM enrollments en
     JOIN students st ON st.id = en.student_id
     JOIN course_groups g ON g.nrc = en.group_nrc
     JOIN subjects s ON s.code = g.subject_code";

/// Programs, subjects, groups and enrollments
#[derive(Debug, Clone)]
pub struct AcademicService {
    db: PgPool,
}

impl AcademicService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    // Programs

    pub async fn list_programs(&self, filter: &ProgramFilter) -> Result<Vec<Program>> {
        let query = format!(
            "{} WHERE ($1::int IS NULL OR p.area_code = $1) ORDER BY p.name",
            PROGRAM_SELECT
        );
        let programs = sqlx::query_as::<_, Program>(&query)
            .bind(filter.area)
            .fetch_all(&self.db)
            .await?;
        Ok(programs)
    }

    pub async fn get_program(&self, code: i32) -> Result<Option<Program>> {
        let query = format!("{} WHERE p.code = $1", PROGRAM_SELECT);
        let program = sqlx::query_as::<_, Program>(&query)
            .bind(code)
            .fetch_optional(&self.db)
            .await?;
        Ok(program)
    }

    pub async fn create_program(&self, request: ProgramRequest) -> Result<Program> {
        request.validate()?;
        let code: i32 = sqlx::query_scalar(
            "INSERT INTO programs (name, area_code) VALUES ($1, $2) RETURNING code",
        )
        .bind(request.name.trim())
        .bind(request.area)
        .fetch_one(&self.db)
        .await?;

        self.get_program(code)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Created program {} could not be read back", code))
    }

    pub async fn update_program(&self, code: i32, request: ProgramRequest) -> Result<Option<Program>> {
        request.validate()?;
        let updated = sqlx::query("UPDATE programs SET name = $2, area_code = $3 WHERE code = $1")
            .bind(code)
            .bind(request.name.trim())
            .bind(request.area)
            .execute(&self.db)
            .await?;

        if updated.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_program(code).await
    }

    pub async fn delete_program(&self, code: i32) -> Result<bool> {
        let result = sqlx::query("DELETE FROM programs WHERE code = $1")
            .bind(code)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // Subjects

    pub async fn list_subjects(&self, filter: &SubjectFilter) -> Result<Vec<Subject>> {
        let query = format!(
            "{} WHERE ($1::int IS NULL OR s.program_code = $1) ORDER BY s.code",
            SUBJECT_SELECT
        );
        let subjects = sqlx::query_as::<_, Subject>(&query)
            .bind(filter.program)
            .fetch_all(&self.db)
            .await?;
        Ok(subjects)
    }

    pub async fn get_subject(&self, code: &str) -> Result<Option<Subject>> {
        let query = format!("{} WHERE s.code = $1", SUBJECT_SELECT);
        let subject = sqlx::query_as::<_, Subject>(&query)
            .bind(code)
            .fetch_optional(&self.db)
            .await?;
        Ok(subject)
    }

    pub async fn create_subject(&self, request: SubjectRequest) -> Result<Subject> {
        request.validate()?;
        sqlx::query("INSERT INTO subjects (code, name, program_code) VALUES ($1, $2, $3)")
            .bind(request.code.trim())
            .bind(request.name.trim())
            .bind(request.program)
            .execute(&self.db)
            .await?;

        self.get_subject(request.code.trim())
            .await?
            .ok_or_else(|| anyhow::anyhow!("Created subject {} could not be read back", request.code))
    }

    pub async fn update_subject(&self, code: &str, request: SubjectRequest) -> Result<Option<Subject>> {
        request.validate()?;
        ensure_same_key("code", code, &request.code)?;

        let updated = sqlx::query("UPDATE subjects SET name = $2, program_code = $3 WHERE code = $1")
            .bind(code)
            .bind(request.name.trim())
            .bind(request.program)
            .execute(&self.db)
            .await?;

        if updated.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_subject(code).await
    }

    pub async fn delete_subject(&self, code: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM subjects WHERE code = $1")
            .bind(code)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // Groups

    pub async fn list_groups(&self, filter: &GroupFilter) -> Result<Vec<Group>> {
        let query = format!(
            "{} WHERE ($1::text IS NULL OR g.subject_code = $1)
               AND ($2::text IS NULL OR g.semester = $2)
               AND ($3::text IS NULL OR g.professor_id = $3)
             ORDER BY g.semester DESC, g.subject_code, g.number",
            GROUP_SELECT
        );
        let groups = sqlx::query_as::<_, Group>(&query)
            .bind(&filter.subject)
            .bind(&filter.semester)
            .bind(&filter.professor)
            .fetch_all(&self.db)
            .await?;
        Ok(groups)
    }

    pub async fn get_group(&self, nrc: &str) -> Result<Option<Group>> {
        let query = format!("{} WHERE g.nrc = $1", GROUP_SELECT);
        let group = sqlx::query_as::<_, Group>(&query)
            .bind(nrc)
            .fetch_optional(&self.db)
            .await?;
        Ok(group)
    }

    pub async fn create_group(&self, request: GroupRequest) -> Result<Group> {
        request.validate()?;
        sqlx::query(
            "INSERT INTO course_groups (nrc, number, semester, subject_code, professor_id)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(request.nrc.trim())
        .bind(request.number)
        .bind(request.semester.trim())
        .bind(request.subject.trim())
        .bind(request.professor.trim())
        .execute(&self.db)
        .await?;

        self.get_group(request.nrc.trim())
            .await?
            .ok_or_else(|| anyhow::anyhow!("Created group {} could not be read back", request.nrc))
    }

    pub async fn update_group(&self, nrc: &str, request: GroupRequest) -> Result<Option<Group>> {
        request.validate()?;
        ensure_same_key("nrc", nrc, &request.nrc)?;

        let updated = sqlx::query(
            "UPDATE course_groups
             SET number = $2, semester = $3, subject_code = $4, professor_id = $5
             WHERE nrc = $1",
        )
        .bind(nrc)
        .bind(request.number)
        .bind(request.semester.trim())
        .bind(request.subject.trim())
        .bind(request.professor.trim())
        .execute(&self.db)
        .await?;

        if updated.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_group(nrc).await
    }

    pub async fn delete_group(&self, nrc: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM course_groups WHERE nrc = $1")
            .bind(nrc)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // Enrollments

    pub async fn list_enrollments(&self, filter: &EnrollmentFilter) -> Result<Vec<Enrollment>> {
        let query = format!(
            "{} WHERE ($1::text IS NULL OR en.student_id = $1)
               AND ($2::text IS NULL OR en.group_nrc = $2)
               AND ($3::text IS NULL OR en.status = $3)
             ORDER BY en.enrollment_date DESC, en.id DESC",
            ENROLLMENT_SELECT
        );
        let rows = sqlx::query_as::<_, EnrollmentRow>(&query)
            .bind(&filter.student)
            .bind(&filter.group)
            .bind(&filter.status)
            .fetch_all(&self.db)
            .await?;
        Ok(rows.into_iter().map(Enrollment::from).collect())
    }

    pub async fn get_enrollment(&self, id: i32) -> Result<Option<Enrollment>> {
        let query = format!("{} WHERE en.id = $1", ENROLLMENT_SELECT);
        let row = sqlx::query_as::<_, EnrollmentRow>(&query)
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(row.map(Enrollment::from))
    }

    /// A student can enroll in a group only once; the unique constraint rejects repeats
    pub async fn create_enrollment(&self, request: EnrollmentRequest) -> Result<Enrollment> {
        request.validate()?;
        let id: i32 = sqlx::query_scalar(
            "INSERT INTO enrollments (student_id, group_nrc, enrollment_date, status)
             VALUES ($1, $2, $3, $4)
             RETURNING id",
        )
        .bind(request.student.trim())
        .bind(request.group.trim())
        .bind(request.enrollment_date.unwrap_or_else(|| Utc::now().date_naive()))
        .bind(request.status.trim())
        .fetch_one(&self.db)
        .await?;

        tracing::info!("Enrolled student {} in group {}", request.student, request.group);
        self.get_enrollment(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Created enrollment {} could not be read back", id))
    }

    pub async fn update_enrollment(
        &self,
        id: i32,
        request: EnrollmentRequest,
    ) -> Result<Option<Enrollment>> {
        request.validate()?;
        let updated = sqlx::query(
            "UPDATE enrollments
             SET student_id = $2, group_nrc = $3,
                 enrollment_date = COALESCE($4, enrollment_date), status = $5
             WHERE id = $1",
        )
        .bind(id)
        .bind(request.student.trim())
        .bind(request.group.trim())
        .bind(request.enrollment_date)
        .bind(request.status.trim())
        .execute(&self.db)
        .await?;

        if updated.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_enrollment(id).await
    }

    pub async fn delete_enrollment(&self, id: i32) -> Result<bool> {
        let result = sqlx::query("DELETE FROM enrollments WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
