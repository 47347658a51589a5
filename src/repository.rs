//! Data access for word records.
//!
//! A `WordRepository` is scoped to one language partition (one collection in
//! the document store). Handlers build a fresh repository per request.

use crate::models::{LanguageCode, WordRecord};
use crate::store::{Direction, DocumentStore, FilterOp, Query, StoreError};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// High code point appended to a prefix to form the exclusive upper bound of
/// a prefix range. Every name starting with the prefix sorts below it.
pub const PREFIX_SENTINEL: char = '\u{f8ff}';

const NAME_FIELD: &str = "name";

pub struct WordRepository {
    store: Arc<dyn DocumentStore>,
    language: LanguageCode,
}

impl WordRepository {
    pub fn new(store: Arc<dyn DocumentStore>, language: LanguageCode) -> Self {
        Self { store, language }
    }

    pub fn language(&self) -> &LanguageCode {
        &self.language
    }

    /// Exact lookup of `name` within this partition
    pub async fn find_by_name(&self, name: &str) -> Result<Option<WordRecord>, StoreError> {
        let query = Query::new().filter(NAME_FIELD, FilterOp::Eq, name);
        let documents = self.store.run_query(self.language.as_str(), &query).await?;

        documents
            .into_iter()
            .next()
            .map(serde_json::from_value)
            .transpose()
            .map_err(StoreError::from)
    }

    /// List records whose name starts with `prefix`, ordered by name.
    ///
    /// Pages are 1-based. Reaching page N re-runs the query N-1 times, each
    /// time restarting after the last name of the previous page; no cursor is
    /// kept between calls.
    pub async fn list(
        &self,
        prefix: &str,
        limit: u32,
        page: u32,
        descending: bool,
    ) -> Result<Vec<WordRecord>, StoreError> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let direction = if descending {
            Direction::Descending
        } else {
            Direction::Ascending
        };
        let base = prefix_query(prefix, direction, limit);
        let collection = self.language.as_str();

        let mut query = base.clone();
        for skipped in 1..page.max(1) {
            let previous = self.store.run_query(collection, &query).await?;
            let Some(last) = previous.last() else {
                debug!(
                    "Page {} of '{}' in '{}' is empty, nothing to start after",
                    skipped, prefix, collection
                );
                return Ok(Vec::new());
            };
            query = base.clone().start_after(name_of(last)?);
        }

        self.store
            .run_query(collection, &query)
            .await?
            .into_iter()
            .map(|document| serde_json::from_value(document).map_err(StoreError::from))
            .collect()
    }

    /// Upsert `record` under its name; replaces any existing document
    pub async fn create(&self, record: &WordRecord) -> Result<(), StoreError> {
        let document = serde_json::to_value(record)?;
        self.store
            .set(self.language.as_str(), &record.name, document)
            .await
    }

    /// Delete `name` from this partition; a missing document is not an error
    pub async fn delete(&self, name: &str) -> Result<(), StoreError> {
        self.store.delete(self.language.as_str(), name).await
    }
}

/// Half-open range `[prefix, prefix + PREFIX_SENTINEL)` on the name field
fn prefix_query(prefix: &str, direction: Direction, limit: u32) -> Query {
    let upper = format!("{}{}", prefix, PREFIX_SENTINEL);

    Query::new()
        .filter(NAME_FIELD, FilterOp::Ge, prefix)
        .filter(NAME_FIELD, FilterOp::Lt, upper)
        .order_by(NAME_FIELD, direction)
        .limit(limit)
}

fn name_of(document: &Value) -> Result<String, StoreError> {
    let record: WordRecord = serde_json::from_value(document.clone())?;
    Ok(record.name)
}
