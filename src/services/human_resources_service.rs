use anyhow::Result;
use sqlx::{postgres::PgRow, FromRow, PgPool};

use crate::models::{ContractType, EmployeeType, LookupRequest};

/// Contract and employee type lookups, both keyed by their name
#[derive(Debug, Clone)]
pub struct HumanResourcesService {
    db: PgPool,
}

impl HumanResourcesService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn list_contract_types(&self) -> Result<Vec<ContractType>> {
        self.list("contract_types").await
    }

    pub async fn get_contract_type(&self, name: &str) -> Result<Option<ContractType>> {
        self.get("contract_types", name).await
    }

    pub async fn create_contract_type(&self, request: LookupRequest) -> Result<ContractType> {
        self.create("contract_types", request).await
    }

    pub async fn update_contract_type(
        &self,
        name: &str,
        request: LookupRequest,
    ) -> Result<Option<ContractType>> {
        self.rename("contract_types", name, request).await
    }

    pub async fn delete_contract_type(&self, name: &str) -> Result<bool> {
        self.delete("contract_types", name).await
    }

    pub async fn list_employee_types(&self) -> Result<Vec<EmployeeType>> {
        self.list("employee_types").await
    }

    pub async fn get_employee_type(&self, name: &str) -> Result<Option<EmployeeType>> {
        self.get("employee_types", name).await
    }

    pub async fn create_employee_type(&self, request: LookupRequest) -> Result<EmployeeType> {
        self.create("employee_types", request).await
    }

    pub async fn update_employee_type(
        &self,
        name: &str,
        request: LookupRequest,
    ) -> Result<Option<EmployeeType>> {
        self.rename("employee_types", name, request).await
    }

    pub async fn delete_employee_type(&self, name: &str) -> Result<bool> {
        self.delete("employee_types", name).await
    }

    async fn list<T>(&self, table: &'static str) -> Result<Vec<T>>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let rows = sqlx::query_as::<_, T>(&format!("SELECT name FROM {} ORDER BY name", table))
            .fetch_all(&self.db)
            .await?;
        Ok(rows)
    }

    async fn get<T>(&self, table: &'static str, name: &str) -> Result<Option<T>>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let row = sqlx::query_as::<_, T>(&format!("SELECT name FROM {} WHERE name = $1", table))
            .bind(name)
            .fetch_optional(&self.db)
            .await?;
        Ok(row)
    }

    async fn create<T>(&self, table: &'static str, request: LookupRequest) -> Result<T>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        request.validate()?;
        let row = sqlx::query_as::<_, T>(&format!(
            "INSERT INTO {} (name) VALUES ($1) RETURNING name",
            table
        ))
        .bind(request.name.trim())
        .fetch_one(&self.db)
        .await?;
        Ok(row)
    }

    /// Employees follow the rename through the cascading foreign key
    async fn rename<T>(&self, table: &'static str, name: &str, request: LookupRequest) -> Result<Option<T>>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        request.validate()?;
        let row = sqlx::query_as::<_, T>(&format!(
            "UPDATE {} SET name = $2 WHERE name = $1 RETURNING name",
            table
        ))
        .bind(name)
        .bind(request.name.trim())
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }

    async fn delete(&self, table: &'static str, name: &str) -> Result<bool> {
        let result = sqlx::query(&format!("DELETE FROM {} WHERE name = $1", table))
            .bind(name)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
