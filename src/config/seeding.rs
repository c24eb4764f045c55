use anyhow::Result;
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::password::hash_password;
use crate::models::{
    Difficulty, Exercise, ExercisePayload, ExerciseType, RoutineExercise, RoutinePayload,
    TRAINER_EMPLOYEE_TYPE,
};
use crate::services::document_store::filters;
use crate::services::FitnessService;

const DEMO_TRAINER: &str = "trainer";

/// Demo data for a fresh installation. Every step is safe to run again.
pub struct DatabaseSeeder {
    pool: PgPool,
    fitness: FitnessService,
}

struct Campus {
    city: i32,
    campus: i32,
    faculty: i32,
}

impl DatabaseSeeder {
    pub fn new(pool: PgPool, fitness: FitnessService) -> Self {
        Self { pool, fitness }
    }

    pub async fn seed_all(&self) -> Result<()> {
        tracing::info!("Starting database seeding...");

        let campus = self.seed_locations().await?;
        self.seed_human_resources().await?;
        self.seed_people(&campus).await?;
        self.seed_academics(&campus).await?;
        self.seed_users().await?;
        self.seed_exercises().await?;

        tracing::info!("Database seeding completed!");
        Ok(())
    }

    async fn seed_locations(&self) -> Result<Campus> {
        let country = self
            .code_or_insert(
                "SELECT code FROM countries WHERE name = $1",
                "INSERT INTO countries (name) VALUES ($1) RETURNING code",
                "Colombia",
                None,
            )
            .await?;
        let department = self
            .code_or_insert(
                "SELECT code FROM departments WHERE name = $1 AND country_code = $2",
                "INSERT INTO departments (name, country_code) VALUES ($1, $2) RETURNING code",
                "Valle del Cauca",
                Some(country),
            )
            .await?;
        let city = self
            .code_or_insert(
                "SELECT code FROM cities WHERE name = $1 AND department_code = $2",
                "INSERT INTO cities (name, department_code) VALUES ($1, $2) RETURNING code",
                "Cali",
                Some(department),
            )
            .await?;
        let campus = self
            .code_or_insert(
                "SELECT code FROM campuses WHERE name = $1 AND city_code = $2",
                "INSERT INTO campuses (name, city_code) VALUES ($1, $2) RETURNING code",
                "Campus Cali",
                Some(city),
            )
            .await?;
        let faculty = self
            .code_or_insert(
                "SELECT code FROM faculties WHERE name = $1 AND campus_code = $2",
                "INSERT INTO faculties (name, campus_code) VALUES ($1, $2) RETURNING code",
                "Facultad de Ciencias",
                Some(campus),
            )
            .await?;
        self.code_or_insert(
            "SELECT code FROM areas WHERE name = $1 AND faculty_code = $2",
            "INSERT INTO areas (name, faculty_code) VALUES ($1, $2) RETURNING code",
            "Bienestar Universitario",
            Some(faculty),
        )
        .await?;

        Ok(Campus { city, campus, faculty })
    }

    async fn seed_human_resources(&self) -> Result<()> {
        for name in ["Planta", "Catedra"] {
            sqlx::query("INSERT INTO contract_types (name) VALUES ($1) ON CONFLICT DO NOTHING")
                .bind(name)
                .execute(&self.pool)
                .await?;
        }
        for name in ["Instructor", TRAINER_EMPLOYEE_TYPE] {
            sqlx::query("INSERT INTO employee_types (name) VALUES ($1) ON CONFLICT DO NOTHING")
                .bind(name)
                .execute(&self.pool)
                .await?;
        }
        Ok(())
    }

    async fn seed_people(&self, campus: &Campus) -> Result<()> {
        let students = [
            ("1001", "Laura", "Gomez", "laura.gomez@campus.edu.co", (2002, 3, 14)),
            ("1002", "Andres", "Rojas", "andres.rojas@campus.edu.co", (2001, 9, 2)),
        ];
        for (id, first_name, last_name, email, (year, month, day)) in students {
            let birth_date = NaiveDate::from_ymd_opt(year, month, day)
                .ok_or_else(|| anyhow::anyhow!("Invalid birth date for student {}", id))?;
            sqlx::query(
                r#"
                INSERT INTO students (id, first_name, last_name, email, birth_date, campus_code, birth_place_code)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                ON CONFLICT (id) DO NOTHING
                "#,
            )
            .bind(id)
            .bind(first_name)
            .bind(last_name)
            .bind(email)
            .bind(birth_date)
            .bind(campus.campus)
            .bind(campus.city)
            .execute(&self.pool)
            .await?;
        }

        let employees = [
            ("2001", "Carlos", "Mejia", "carlos.mejia@campus.edu.co", "Instructor"),
            ("2002", "Diana", "Lopez", "diana.lopez@campus.edu.co", TRAINER_EMPLOYEE_TYPE),
        ];
        for (id, first_name, last_name, email, employee_type) in employees {
            sqlx::query(
                r#"
                INSERT INTO employees (id, first_name, last_name, email, contract_type, employee_type,
                                       faculty_code, campus_code, birth_place_code)
                VALUES ($1, $2, $3, $4, 'Planta', $5, $6, $7, $8)
                ON CONFLICT (id) DO NOTHING
                "#,
            )
            .bind(id)
            .bind(first_name)
            .bind(last_name)
            .bind(email)
            .bind(employee_type)
            .bind(campus.faculty)
            .bind(campus.campus)
            .bind(campus.city)
            .execute(&self.pool)
            .await?;
        }

        Ok(())
    }

    async fn seed_academics(&self, campus: &Campus) -> Result<()> {
        let area: i32 = sqlx::query_scalar("SELECT code FROM areas WHERE faculty_code = $1 ORDER BY code LIMIT 1")
            .bind(campus.faculty)
            .fetch_one(&self.pool)
            .await?;
        let program = self
            .code_or_insert(
                "SELECT code FROM programs WHERE name = $1 AND area_code = $2",
                "INSERT INTO programs (name, area_code) VALUES ($1, $2) RETURNING code",
                "Ciencias del Deporte",
                Some(area),
            )
            .await?;

        sqlx::query(
            "INSERT INTO subjects (code, name, program_code) VALUES ('DEP101', 'Acondicionamiento Fisico', $1) \
             ON CONFLICT (code) DO NOTHING",
        )
        .bind(program)
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "INSERT INTO course_groups (nrc, number, semester, subject_code, professor_id) \
             VALUES ('50101', 1, '2024-2', 'DEP101', '2001') ON CONFLICT (nrc) DO NOTHING",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "INSERT INTO enrollments (student_id, group_nrc, status) VALUES ('1001', '50101', 'Activo') \
             ON CONFLICT ON CONSTRAINT enrollments_student_group_unique DO NOTHING",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn seed_users(&self) -> Result<()> {
        let users = [
            ("student", "student123", "STUDENT", false, Some("1001"), None),
            (DEMO_TRAINER, "trainer123", "EMPLOYEE", false, None, Some("2002")),
            ("admin", "admin12345", "ADMIN", true, None, None),
        ];

        for (username, password, role, is_staff, student_id, employee_id) in users {
            let password_hash = hash_password(password)
                .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?;
            let inserted = sqlx::query(
                r#"
                INSERT INTO users (id, username, password_hash, role, is_staff, student_id, employee_id)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                ON CONFLICT (username) DO NOTHING
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(username)
            .bind(password_hash)
            .bind(role)
            .bind(is_staff)
            .bind(student_id)
            .bind(employee_id)
            .execute(&self.pool)
            .await?;

            if inserted.rows_affected() > 0 {
                tracing::info!("Created demo user {}", username);
            }
        }

        Ok(())
    }

    async fn seed_exercises(&self) -> Result<()> {
        let seeded = self
            .fitness
            .store()
            .count::<Exercise>(&filters([("created_by", Some("system".to_string()))]))
            .await?;
        if seeded > 0 {
            return Ok(());
        }

        let library = [
            ("Caminata Rapida", ExerciseType::Cardio, Difficulty::Low, 30.0, "Caminata continua a ritmo sostenido"),
            ("Burpees", ExerciseType::Cardio, Difficulty::High, 10.0, "Sentadilla, plancha y salto encadenados"),
            ("Sentadillas Basicas", ExerciseType::Strength, Difficulty::Low, 10.0, "Sentadilla con peso corporal"),
            ("Flexiones de Pecho", ExerciseType::Strength, Difficulty::Medium, 10.0, "Flexiones con apoyo en manos y pies"),
            ("Plancha Abdominal", ExerciseType::Strength, Difficulty::Medium, 5.0, "Plancha isometrica sobre antebrazos"),
            ("Estiramiento de Isquiotibiales", ExerciseType::Mobility, Difficulty::Low, 5.0, "Estiramiento sentado de cadena posterior"),
        ];

        let mut ids = Vec::with_capacity(library.len());
        for (name, exercise_type, difficulty, duration, description) in library {
            let record = self
                .fitness
                .create_exercise(ExercisePayload {
                    name: name.to_string(),
                    exercise_type,
                    description: Some(description.to_string()),
                    duration: Some(duration),
                    difficulty: Some(difficulty),
                    video_url: None,
                    created_by: None,
                })
                .await?;
            ids.push(record.id);
        }

        let exercises = ids
            .into_iter()
            .take(3)
            .map(|exercise_id| RoutineExercise {
                exercise_id,
                sets: Some(3),
                reps: Some(12),
                rest: Some(60),
                duration: None,
            })
            .collect();

        self.fitness
            .create_routine(RoutinePayload {
                name: "Rutina de Iniciacion".to_string(),
                description: Some("Circuito basico de cuerpo completo".to_string()),
                exercises,
                created_by: DEMO_TRAINER.to_string(),
                is_template: true,
                adopted_from: None,
                user_id: None,
            })
            .await?;

        Ok(())
    }

    /// Returns the code of the row named `name`, inserting it when missing
    async fn code_or_insert(
        &self,
        select: &str,
        insert: &str,
        name: &str,
        parent: Option<i32>,
    ) -> Result<i32> {
        let mut lookup = sqlx::query_scalar(select).bind(name);
        if let Some(parent) = parent {
            lookup = lookup.bind(parent);
        }
        if let Some(code) = lookup.fetch_optional(&self.pool).await? {
            return Ok(code);
        }

        let mut create = sqlx::query_scalar(insert).bind(name);
        if let Some(parent) = parent {
            create = create.bind(parent);
        }
        let code = create.fetch_one(&self.pool).await?;
        Ok(code)
    }
}
