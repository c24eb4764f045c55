use anyhow::{Context, Result};
use sqlx::{types::Json, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::models::{Document, Exercise, FollowUp, Progress, Recommendation, Record, Routine};

/// Equality filter on a top-level document field
pub type FieldFilter = (&'static str, String);

/// Schemaless collections kept as JSONB documents, one table per collection
#[derive(Debug, Clone)]
pub struct DocumentStore {
    pool: PgPool,
}

fn table<D: Document>() -> String {
    format!("fitness_{}", D::COLLECTION)
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, filters: &[FieldFilter]) {
    for (position, (field, value)) in filters.iter().enumerate() {
        builder.push(if position == 0 { " WHERE " } else { " AND " });
        builder.push(format!("doc->>'{}' = ", field));
        builder.push_bind(value.clone());
    }
}

impl DocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create every collection and its indexes if missing
    pub async fn ensure_collections(&self) -> Result<()> {
        self.ensure_collection::<Exercise>().await?;
        self.ensure_collection::<Routine>().await?;
        self.ensure_collection::<Progress>().await?;
        self.ensure_collection::<Recommendation>().await?;
        self.ensure_collection::<FollowUp>().await?;
        tracing::info!("Fitness collections ready");
        Ok(())
    }

    async fn ensure_collection<D: Document>(&self) -> Result<()> {
        let table = table::<D>();

        sqlx::query(&format!(
            "CREATE TABLE IF NOT EXISTS {} (
                id TEXT PRIMARY KEY,
                doc JSONB NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )",
            table
        ))
        .execute(&self.pool)
        .await
        .with_context(|| format!("Failed to create collection {}", D::COLLECTION))?;

        for field in D::INDEXES {
            sqlx::query(&format!(
                "CREATE INDEX IF NOT EXISTS idx_{table}_{field} ON {table} ((doc->>'{field}'))",
                table = table,
                field = field
            ))
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to index {}.{}", D::COLLECTION, field))?;
        }

        Ok(())
    }

    pub async fn insert<D: Document>(&self, document: D) -> Result<Record<D>> {
        let id = Uuid::new_v4().simple().to_string();

        sqlx::query(&format!("INSERT INTO {} (id, doc) VALUES ($1, $2)", table::<D>()))
            .bind(&id)
            .bind(Json(&document))
            .execute(&self.pool)
            .await?;

        Ok(Record { id, document })
    }

    pub async fn get<D: Document>(&self, id: &str) -> Result<Option<Record<D>>> {
        let row = sqlx::query_as::<_, (String, Json<D>)>(&format!(
            "SELECT id, doc FROM {} WHERE id = $1",
            table::<D>()
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(id, Json(document))| Record { id, document }))
    }

    pub async fn exists<D: Document>(&self, id: &str) -> Result<bool> {
        let row = sqlx::query(&format!("SELECT 1 FROM {} WHERE id = $1", table::<D>()))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.is_some())
    }

    /// Replace the whole document; `None` when the id is unknown
    pub async fn replace<D: Document>(&self, id: &str, document: D) -> Result<Option<Record<D>>> {
        let result = sqlx::query(&format!("UPDATE {} SET doc = $2 WHERE id = $1", table::<D>()))
            .bind(id)
            .bind(Json(&document))
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        Ok(Some(Record {
            id: id.to_string(),
            document,
        }))
    }

    pub async fn delete<D: Document>(&self, id: &str) -> Result<bool> {
        let result = sqlx::query(&format!("DELETE FROM {} WHERE id = $1", table::<D>()))
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Documents matching every filter, newest first
    pub async fn find<D: Document>(&self, filters: &[FieldFilter]) -> Result<Vec<Record<D>>> {
        let mut builder = QueryBuilder::<Postgres>::new(format!("SELECT id, doc FROM {}", table::<D>()));
        push_filters(&mut builder, filters);
        builder.push(format!(
            " ORDER BY (doc->>'{}')::timestamptz DESC, created_at DESC",
            D::ORDER_FIELD
        ));

        let rows = builder
            .build_query_as::<(String, Json<D>)>()
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(id, Json(document))| Record { id, document })
            .collect())
    }

    pub async fn count<D: Document>(&self, filters: &[FieldFilter]) -> Result<i64> {
        let mut builder = QueryBuilder::<Postgres>::new(format!("SELECT COUNT(*) FROM {}", table::<D>()));
        push_filters(&mut builder, filters);

        let (count,) = builder
            .build_query_as::<(i64,)>()
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Collect the `Some` filters into store filters
pub fn filters<const N: usize>(fields: [(&'static str, Option<String>); N]) -> Vec<FieldFilter> {
    fields
        .into_iter()
        .filter_map(|(field, value)| value.map(|value| (field, value)))
        .collect()
}
