use super::{DocumentStore, FieldFilter, Query, StoreError};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use futures::TryStreamExt;
use serde_json::Value;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Postgres, QueryBuilder};
use tracing::{debug, info};

/// Document store backed by a single PostgreSQL table.
///
/// Each row is one document: `(collection, key)` is the primary key and the
/// document body lives in a JSONB column. Field comparisons and ordering use
/// the "C" collation so strings compare by code point.
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    /// Connect to PostgreSQL and make sure the documents table exists
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .context("Failed to connect to PostgreSQL")?;

        let store = Self { pool };
        store.create_schema().await?;

        info!("Connected to PostgreSQL document store");
        Ok(store)
    }

    pub async fn create_schema(&self) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS documents (
                collection TEXT NOT NULL,
                key TEXT NOT NULL,
                data JSONB NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL,
                PRIMARY KEY (collection, key)
            )",
        )
        .execute(&self.pool)
        .await
        .context("Failed to create documents table")?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS documents_name_idx
             ON documents (collection, (data->>'name') COLLATE \"C\")",
        )
        .execute(&self.pool)
        .await
        .context("Failed to create documents name index")?;

        Ok(())
    }
}

fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &FieldFilter) {
    builder
        .push(" AND (data->>")
        .push_bind(filter.field.clone())
        .push(") COLLATE \"C\" ")
        .push(filter.op.sql())
        .push(" ")
        .push_bind(filter.value.clone());
}

/// Build the SELECT for `query` against `collection`
pub(crate) fn build_select<'a>(collection: &str, query: &Query) -> QueryBuilder<'a, Postgres> {
    let mut builder = QueryBuilder::new("SELECT data FROM documents WHERE collection = ");
    builder.push_bind(collection.to_string());

    for filter in &query.filters {
        push_filter(&mut builder, filter);
    }

    if let Some(cursor) = query.cursor_filter() {
        push_filter(&mut builder, &cursor);
    }

    if let Some(order) = &query.order_by {
        builder
            .push(" AND data ? ")
            .push_bind(order.field.clone())
            .push(" ORDER BY (data->>")
            .push_bind(order.field.clone())
            .push(") COLLATE \"C\" ")
            .push(order.direction.sql());
    }

    if let Some(limit) = query.limit {
        builder.push(" LIMIT ").push_bind(i64::from(limit));
    }

    builder
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn run_query(&self, collection: &str, query: &Query) -> Result<Vec<Value>, StoreError> {
        let mut builder = build_select(collection, query);
        debug!("postgres query on '{}': {}", collection, builder.sql());

        let mut rows = builder.build_query_scalar::<Value>().fetch(&self.pool);
        let mut documents = Vec::new();
        while let Some(document) = rows.try_next().await? {
            documents.push(document);
        }

        Ok(documents)
    }

    async fn set(&self, collection: &str, key: &str, document: Value) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO documents (collection, key, data, updated_at)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (collection, key)
             DO UPDATE SET data = EXCLUDED.data, updated_at = EXCLUDED.updated_at",
        )
        .bind(collection)
        .bind(key)
        .bind(document)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, collection: &str, key: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM documents WHERE collection = $1 AND key = $2")
            .bind(collection)
            .bind(key)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
