use anyhow::Result;
use sqlx::PgPool;

use crate::models::{
    Area, AreaRequest, Campus, CampusRequest, City, CityRequest, Country, CountryRequest,
    Department, DepartmentRequest, Faculty, FacultyRequest,
};

const DEPARTMENT_SELECT: &str = "SELECT d.code, d.name, d.country_code AS country, c.name AS country_name
     FROM departments d
     JOIN countries c ON c.code = d.country_code";

const CITY_SELECT: &str = "SELECT ci.code, ci.name, ci.department_code AS department,
            d.name AS department_name, co.name AS country_name
     FROM cities ci
     JOIN departments d ON d.code = ci.department_code
     JOIN countries co ON co.code = d.country_code";

const CAMPUS_SELECT: &str = "SELECT ca.code, ca.name, ca.city_code AS city, ci.name AS city_name
     FROM campuses ca
     JOIN cities ci ON ci.code = ca.city_code";

const FACULTY_SELECT: &str = "SELECT f.code, f.name, f.location, f.phone_number, f.campus_code AS campus,
            ca.name AS campus_name, f.dean_id,
            CASE WHEN e.id IS NULL THEN NULL ELSE e.first_name || ' ' || e.last_name END AS dean_name
     FROM faculties f
     JOIN campuses ca ON ca.code = f.campus_code
     LEFT JOIN employees e ON e.id = f.dean_id";

const AREA_SELECT: &str = "SELECT a.code, a.name, a.faculty_code AS faculty, f.name AS faculty_name,
            a.coordinator_id,
            CASE WHEN e.id IS NULL THEN NULL ELSE e.first_name || ' ' || e.last_name END AS coordinator_name
     FROM areas a
     JOIN faculties f ON f.code = a.faculty_code
     LEFT JOIN employees e ON e.id = a.coordinator_id";

/// Countries, departments, cities, campuses, faculties and areas
#[derive(Debug, Clone)]
pub struct LocationService {
    db: PgPool,
}

impl LocationService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    // Countries

    pub async fn list_countries(&self) -> Result<Vec<Country>> {
        let countries = sqlx::query_as::<_, Country>("SELECT code, name FROM countries ORDER BY name")
            .fetch_all(&self.db)
            .await?;
        Ok(countries)
    }

    pub async fn get_country(&self, code: i32) -> Result<Option<Country>> {
        let country = sqlx::query_as::<_, Country>("SELECT code, name FROM countries WHERE code = $1")
            .bind(code)
            .fetch_optional(&self.db)
            .await?;
        Ok(country)
    }

    pub async fn create_country(&self, request: CountryRequest) -> Result<Country> {
        request.validate()?;
        let country = sqlx::query_as::<_, Country>(
            "INSERT INTO countries (name) VALUES ($1) RETURNING code, name",
        )
        .bind(request.name.trim())
        .fetch_one(&self.db)
        .await?;
        Ok(country)
    }

    pub async fn update_country(&self, code: i32, request: CountryRequest) -> Result<Option<Country>> {
        request.validate()?;
        let country = sqlx::query_as::<_, Country>(
            "UPDATE countries SET name = $2 WHERE code = $1 RETURNING code, name",
        )
        .bind(code)
        .bind(request.name.trim())
        .fetch_optional(&self.db)
        .await?;
        Ok(country)
    }

    pub async fn delete_country(&self, code: i32) -> Result<bool> {
        self.delete("countries", code).await
    }

    // Departments

    pub async fn list_departments(&self, country: Option<i32>) -> Result<Vec<Department>> {
        let query = format!(
            "{} WHERE ($1::int IS NULL OR d.country_code = $1) ORDER BY d.name",
            DEPARTMENT_SELECT
        );
        let departments = sqlx::query_as::<_, Department>(&query)
            .bind(country)
            .fetch_all(&self.db)
            .await?;
        Ok(departments)
    }

    pub async fn get_department(&self, code: i32) -> Result<Option<Department>> {
        let query = format!("{} WHERE d.code = $1", DEPARTMENT_SELECT);
        let department = sqlx::query_as::<_, Department>(&query)
            .bind(code)
            .fetch_optional(&self.db)
            .await?;
        Ok(department)
    }

    pub async fn create_department(&self, request: DepartmentRequest) -> Result<Department> {
        request.validate()?;
        let code: i32 = sqlx::query_scalar(
            "INSERT INTO departments (name, country_code) VALUES ($1, $2) RETURNING code",
        )
        .bind(request.name.trim())
        .bind(request.country)
        .fetch_one(&self.db)
        .await?;

        self.require(self.get_department(code).await?, "department", code)
    }

    pub async fn update_department(
        &self,
        code: i32,
        request: DepartmentRequest,
    ) -> Result<Option<Department>> {
        request.validate()?;
        let updated = sqlx::query("UPDATE departments SET name = $2, country_code = $3 WHERE code = $1")
            .bind(code)
            .bind(request.name.trim())
            .bind(request.country)
            .execute(&self.db)
            .await?;

        if updated.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_department(code).await
    }

    pub async fn delete_department(&self, code: i32) -> Result<bool> {
        self.delete("departments", code).await
    }

    // Cities

    pub async fn list_cities(&self, department: Option<i32>) -> Result<Vec<City>> {
        let query = format!(
            "{} WHERE ($1::int IS NULL OR ci.department_code = $1) ORDER BY ci.name",
            CITY_SELECT
        );
        let cities = sqlx::query_as::<_, City>(&query)
            .bind(department)
            .fetch_all(&self.db)
            .await?;
        Ok(cities)
    }

    pub async fn get_city(&self, code: i32) -> Result<Option<City>> {
        let query = format!("{} WHERE ci.code = $1", CITY_SELECT);
        let city = sqlx::query_as::<_, City>(&query)
            .bind(code)
            .fetch_optional(&self.db)
            .await?;
        Ok(city)
    }

    pub async fn create_city(&self, request: CityRequest) -> Result<City> {
        request.validate()?;
        let code: i32 = sqlx::query_scalar(
            "INSERT INTO cities (name, department_code) VALUES ($1, $2) RETURNING code",
        )
        .bind(request.name.trim())
        .bind(request.department)
        .fetch_one(&self.db)
        .await?;

        self.require(self.get_city(code).await?, "city", code)
    }

    pub async fn update_city(&self, code: i32, request: CityRequest) -> Result<Option<City>> {
        request.validate()?;
        let updated = sqlx::query("UPDATE cities SET name = $2, department_code = $3 WHERE code = $1")
            .bind(code)
            .bind(request.name.trim())
            .bind(request.department)
            .execute(&self.db)
            .await?;

        if updated.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_city(code).await
    }

    pub async fn delete_city(&self, code: i32) -> Result<bool> {
        self.delete("cities", code).await
    }

    // Campuses

    pub async fn list_campuses(&self, city: Option<i32>) -> Result<Vec<Campus>> {
        let query = format!(
            "{} WHERE ($1::int IS NULL OR ca.city_code = $1) ORDER BY ca.name",
            CAMPUS_SELECT
        );
        let campuses = sqlx::query_as::<_, Campus>(&query)
            .bind(city)
            .fetch_all(&self.db)
            .await?;
        Ok(campuses)
    }

    pub async fn get_campus(&self, code: i32) -> Result<Option<Campus>> {
        let query = format!("{} WHERE ca.code = $1", CAMPUS_SELECT);
        let campus = sqlx::query_as::<_, Campus>(&query)
            .bind(code)
            .fetch_optional(&self.db)
            .await?;
        Ok(campus)
    }

    pub async fn create_campus(&self, request: CampusRequest) -> Result<Campus> {
        request.validate()?;
        let code: i32 = sqlx::query_scalar(
            "INSERT INTO campuses (name, city_code) VALUES ($1, $2) RETURNING code",
        )
        .bind(request.name.trim())
        .bind(request.city)
        .fetch_one(&self.db)
        .await?;

        self.require(self.get_campus(code).await?, "campus", code)
    }

    pub async fn update_campus(&self, code: i32, request: CampusRequest) -> Result<Option<Campus>> {
        request.validate()?;
        let updated = sqlx::query("UPDATE campuses SET name = $2, city_code = $3 WHERE code = $1")
            .bind(code)
            .bind(request.name.trim())
            .bind(request.city)
            .execute(&self.db)
            .await?;

        if updated.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_campus(code).await
    }

    pub async fn delete_campus(&self, code: i32) -> Result<bool> {
        self.delete("campuses", code).await
    }

    // Faculties

    pub async fn list_faculties(&self, campus: Option<i32>) -> Result<Vec<Faculty>> {
        let query = format!(
            "{} WHERE ($1::int IS NULL OR f.campus_code = $1) ORDER BY f.name",
            FACULTY_SELECT
        );
        let faculties = sqlx::query_as::<_, Faculty>(&query)
            .bind(campus)
            .fetch_all(&self.db)
            .await?;
        Ok(faculties)
    }

    pub async fn get_faculty(&self, code: i32) -> Result<Option<Faculty>> {
        let query = format!("{} WHERE f.code = $1", FACULTY_SELECT);
        let faculty = sqlx::query_as::<_, Faculty>(&query)
            .bind(code)
            .fetch_optional(&self.db)
            .await?;
        Ok(faculty)
    }

    pub async fn create_faculty(&self, request: FacultyRequest) -> Result<Faculty> {
        request.validate()?;
        let code: i32 = sqlx::query_scalar(
            "INSERT INTO faculties (name, location, phone_number, campus_code, dean_id)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING code",
        )
        .bind(request.name.trim())
        .bind(&request.location)
        .bind(&request.phone_number)
        .bind(request.campus)
        .bind(blank_to_none(request.dean_id))
        .fetch_one(&self.db)
        .await?;

        self.require(self.get_faculty(code).await?, "faculty", code)
    }

    pub async fn update_faculty(&self, code: i32, request: FacultyRequest) -> Result<Option<Faculty>> {
        request.validate()?;
        let updated = sqlx::query(
            "UPDATE faculties
             SET name = $2, location = $3, phone_number = $4, campus_code = $5, dean_id = $6
             WHERE code = $1",
        )
        .bind(code)
        .bind(request.name.trim())
        .bind(&request.location)
        .bind(&request.phone_number)
        .bind(request.campus)
        .bind(blank_to_none(request.dean_id))
        .execute(&self.db)
        .await?;

        if updated.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_faculty(code).await
    }

    pub async fn delete_faculty(&self, code: i32) -> Result<bool> {
        self.delete("faculties", code).await
    }

    // Areas

    pub async fn list_areas(&self, faculty: Option<i32>) -> Result<Vec<Area>> {
        let query = format!(
            "{} WHERE ($1::int IS NULL OR a.faculty_code = $1) ORDER BY a.name",
            AREA_SELECT
        );
        let areas = sqlx::query_as::<_, Area>(&query)
            .bind(faculty)
            .fetch_all(&self.db)
            .await?;
        Ok(areas)
    }

    pub async fn get_area(&self, code: i32) -> Result<Option<Area>> {
        let query = format!("{} WHERE a.code = $1", AREA_SELECT);
        let area = sqlx::query_as::<_, Area>(&query)
            .bind(code)
            .fetch_optional(&self.db)
            .await?;
        Ok(area)
    }

    pub async fn create_area(&self, request: AreaRequest) -> Result<Area> {
        request.validate()?;
        let code: i32 = sqlx::query_scalar(
            "INSERT INTO areas (name, faculty_code, coordinator_id) VALUES ($1, $2, $3) RETURNING code",
        )
        .bind(request.name.trim())
        .bind(request.faculty)
        .bind(blank_to_none(request.coordinator_id))
        .fetch_one(&self.db)
        .await?;

        self.require(self.get_area(code).await?, "area", code)
    }

    pub async fn update_area(&self, code: i32, request: AreaRequest) -> Result<Option<Area>> {
        request.validate()?;
        let updated = sqlx::query(
            "UPDATE areas SET name = $2, faculty_code = $3, coordinator_id = $4 WHERE code = $1",
        )
        .bind(code)
        .bind(request.name.trim())
        .bind(request.faculty)
        .bind(blank_to_none(request.coordinator_id))
        .execute(&self.db)
        .await?;

        if updated.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_area(code).await
    }

    pub async fn delete_area(&self, code: i32) -> Result<bool> {
        self.delete("areas", code).await
    }

    async fn delete(&self, table: &'static str, code: i32) -> Result<bool> {
        let result = sqlx::query(&format!("DELETE FROM {} WHERE code = $1", table))
            .bind(code)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    fn require<T>(&self, row: Option<T>, kind: &str, code: i32) -> Result<T> {
        row.ok_or_else(|| anyhow::anyhow!("Created {} {} could not be read back", kind, code))
    }
}

/// Treat an empty optional reference as absent
pub(crate) fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
