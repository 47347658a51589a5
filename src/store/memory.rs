use super::{Direction, DocumentStore, FieldFilter, Query, StoreError};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};
use tracing::debug;

type Collections = HashMap<String, BTreeMap<String, Value>>;

/// In-process document store.
///
/// Clones share the same underlying collections.
#[derive(Clone, Default)]
pub struct MemoryStore {
    collections: Arc<RwLock<Collections>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in `collection`
    pub fn document_count(&self, collection: &str) -> Result<usize, StoreError> {
        let collections = self.read()?;
        Ok(collections.get(collection).map_or(0, BTreeMap::len))
    }

    /// Fetch a document by key, bypassing the query path
    pub fn get(&self, collection: &str, key: &str) -> Result<Option<Value>, StoreError> {
        let collections = self.read()?;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.get(key))
            .cloned())
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Collections>, StoreError> {
        self.collections
            .read()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Collections>, StoreError> {
        self.collections
            .write()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))
    }
}

fn string_field<'a>(document: &'a Value, field: &str) -> Option<&'a str> {
    document.get(field).and_then(Value::as_str)
}

fn passes(document: &Value, filter: &FieldFilter) -> bool {
    string_field(document, &filter.field)
        .map(|actual| filter.op.matches(actual, &filter.value))
        .unwrap_or(false)
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn run_query(&self, collection: &str, query: &Query) -> Result<Vec<Value>, StoreError> {
        debug!("memory query on '{}': {:?}", collection, query);

        let cursor = query.cursor_filter();
        let mut matches: Vec<Value> = {
            let collections = self.read()?;
            let Some(documents) = collections.get(collection) else {
                return Ok(Vec::new());
            };

            documents
                .values()
                .filter(|doc| query.filters.iter().all(|f| passes(doc, f)))
                .filter(|doc| cursor.as_ref().map_or(true, |f| passes(doc, f)))
                .filter(|doc| {
                    query
                        .order_by
                        .as_ref()
                        .map_or(true, |order| string_field(doc, &order.field).is_some())
                })
                .cloned()
                .collect()
        };

        if let Some(order) = &query.order_by {
            matches.sort_by(|a, b| {
                let ordering = string_field(a, &order.field).cmp(&string_field(b, &order.field));
                match order.direction {
                    Direction::Ascending => ordering,
                    Direction::Descending => ordering.reverse(),
                }
            });
        }

        if let Some(limit) = query.limit {
            matches.truncate(limit as usize);
        }

        Ok(matches)
    }

    async fn set(&self, collection: &str, key: &str, document: Value) -> Result<(), StoreError> {
        let mut collections = self.write()?;
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(key.to_string(), document);
        Ok(())
    }

    async fn delete(&self, collection: &str, key: &str) -> Result<(), StoreError> {
        let mut collections = self.write()?;
        if let Some(documents) = collections.get_mut(collection) {
            documents.remove(key);
        }
        Ok(())
    }
}
