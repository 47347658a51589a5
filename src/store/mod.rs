//! Document store abstraction.
//!
//! Collections hold JSON documents addressed by a string key. Queries support
//! what the word repository needs from an external document database:
//! field filters, a single order-by, a "start after" cursor and a limit.
//!
//! # Backends
//!
//! - `memory`: in-process ordered maps, used for local runs and tests
//! - `postgres`: a single JSONB table in PostgreSQL

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use serde_json::Value;

pub use memory::MemoryStore;
pub use postgres::PgDocumentStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("document serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("document store unavailable: {0}")]
    Unavailable(String),
}

/// Comparison applied by a [`FieldFilter`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Lt,
    Le,
    Gt,
    Ge,
}

impl FilterOp {
    pub fn sql(&self) -> &'static str {
        match self {
            FilterOp::Eq => "=",
            FilterOp::Lt => "<",
            FilterOp::Le => "<=",
            FilterOp::Gt => ">",
            FilterOp::Ge => ">=",
        }
    }

    /// Evaluate `lhs <op> rhs` using code-point string ordering
    pub fn matches(&self, lhs: &str, rhs: &str) -> bool {
        match self {
            FilterOp::Eq => lhs == rhs,
            FilterOp::Lt => lhs < rhs,
            FilterOp::Le => lhs <= rhs,
            FilterOp::Gt => lhs > rhs,
            FilterOp::Ge => lhs >= rhs,
        }
    }
}

/// Filter on a top-level string field of a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldFilter {
    pub field: String,
    pub op: FilterOp,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

impl Direction {
    pub fn sql(&self) -> &'static str {
        match self {
            Direction::Ascending => "ASC",
            Direction::Descending => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub field: String,
    pub direction: Direction,
}

/// A query against one collection.
///
/// Documents missing a filtered or ordered field never match. `start_after`
/// is interpreted relative to `order_by` and is ignored without it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pub filters: Vec<FieldFilter>,
    pub order_by: Option<OrderBy>,
    pub start_after: Option<String>,
    pub limit: Option<u32>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, field: &str, op: FilterOp, value: impl Into<String>) -> Self {
        self.filters.push(FieldFilter {
            field: field.to_string(),
            op,
            value: value.into(),
        });
        self
    }

    pub fn order_by(mut self, field: &str, direction: Direction) -> Self {
        self.order_by = Some(OrderBy {
            field: field.to_string(),
            direction,
        });
        self
    }

    pub fn start_after(mut self, value: impl Into<String>) -> Self {
        self.start_after = Some(value.into());
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// The filter implied by `start_after` for the current ordering
    pub fn cursor_filter(&self) -> Option<FieldFilter> {
        let order = self.order_by.as_ref()?;
        let value = self.start_after.as_ref()?;

        let op = match order.direction {
            Direction::Ascending => FilterOp::Gt,
            Direction::Descending => FilterOp::Lt,
        };

        Some(FieldFilter {
            field: order.field.clone(),
            op,
            value: value.clone(),
        })
    }
}

/// A partitioned JSON document store.
///
/// Collections are created implicitly on first write.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Run `query` against `collection`, returning matching documents in order
    async fn run_query(&self, collection: &str, query: &Query) -> Result<Vec<Value>, StoreError>;

    /// Create or fully replace the document at `key`
    async fn set(&self, collection: &str, key: &str, document: Value) -> Result<(), StoreError>;

    /// Remove the document at `key`; succeeds if it does not exist
    async fn delete(&self, collection: &str, key: &str) -> Result<(), StoreError>;
}
