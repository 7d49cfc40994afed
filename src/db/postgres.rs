use serde_json::{Map, Value};
use sqlx::{postgres::PgPoolOptions, types::Json, PgPool};

use super::DocumentStore;
use crate::{error::AppResult, models::UserId};

/// Creates a PostgreSQL connection pool
///
/// Establishes a pool of database connections for efficient reuse.
/// The pool automatically manages connection lifecycle and limits.
pub async fn create_pool(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// User documents stored as one JSONB value per row
///
/// A merge write is an upsert whose update concatenates the stored object
/// with the new fields (`doc || excluded.doc`), which replaces each named
/// top-level key and keeps the rest.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl DocumentStore for PostgresStore {
    async fn read(&self, user_id: &UserId) -> AppResult<Option<Value>> {
        let doc: Option<Json<Value>> =
            sqlx::query_scalar("SELECT doc FROM user_documents WHERE user_id = $1")
                .bind(user_id.as_str())
                .fetch_optional(&self.pool)
                .await?;

        Ok(doc.map(|Json(doc)| doc))
    }

    async fn merge_write(&self, user_id: &UserId, fields: Map<String, Value>) -> AppResult<()> {
        let field_count = fields.len();

        sqlx::query(
            r#"
            INSERT INTO user_documents (user_id, doc)
            VALUES ($1, $2)
            ON CONFLICT (user_id)
            DO UPDATE SET doc = user_documents.doc || EXCLUDED.doc, updated_at = now()
            "#,
        )
        .bind(user_id.as_str())
        .bind(Json(Value::Object(fields)))
        .execute(&self.pool)
        .await?;

        tracing::debug!(user_id = %user_id, field_count, "Merged fields into user document");

        Ok(())
    }

    fn name(&self) -> &'static str {
        "postgres"
    }
}
