//! In-process document backend.

use crate::datastore::{document_id, BackendKind, Datastore, Table};
use crate::filter::Filter;
use crate::types::Document;
use crate::DbError;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

/// Per-table maps of documents keyed by id.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<Table, BTreeMap<String, Document>>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in a table.
    pub async fn len(&self, table: Table) -> usize {
        self.tables
            .read()
            .await
            .get(&table)
            .map(|t| t.len())
            .unwrap_or(0)
    }
}

#[async_trait]
impl Datastore for MemoryStore {
    async fn get(&self, table: Table, id: &str) -> Result<Option<Document>, DbError> {
        let tables = self.tables.read().await;
        Ok(tables.get(&table).and_then(|t| t.get(id)).cloned())
    }

    async fn scan(&self, table: Table, filter: &Filter) -> Result<Vec<Document>, DbError> {
        let tables = self.tables.read().await;
        Ok(tables
            .get(&table)
            .map(|t| t.values().filter(|doc| filter.matches(doc)).cloned().collect())
            .unwrap_or_default())
    }

    async fn put(&self, table: Table, doc: Document) -> Result<(), DbError> {
        let id = document_id(&doc)?.to_string();
        let mut tables = self.tables.write().await;
        tables.entry(table).or_default().insert(id, doc);
        Ok(())
    }

    async fn update(&self, table: Table, id: &str, patch: Document) -> Result<bool, DbError> {
        let mut tables = self.tables.write().await;
        let Some(doc) = tables.get_mut(&table).and_then(|t| t.get_mut(id)) else {
            return Ok(false);
        };
        for (key, value) in patch {
            if key != "id" {
                doc.insert(key, value);
            }
        }
        Ok(true)
    }

    async fn delete(&self, table: Table, id: &str) -> Result<bool, DbError> {
        let mut tables = self.tables.write().await;
        Ok(tables
            .get_mut(&table)
            .map(|t| t.remove(id).is_some())
            .unwrap_or(false))
    }

    fn backend(&self) -> BackendKind {
        BackendKind::Memory
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: serde_json::Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_put_get_delete() {
        let store = MemoryStore::new();
        store
            .put(Table::Categories, doc(json!({"id": "c1", "name": "Books"})))
            .await
            .unwrap();

        let found = store.get(Table::Categories, "c1").await.unwrap().unwrap();
        assert_eq!(found["name"], "Books");
        assert_eq!(store.len(Table::Categories).await, 1);

        assert!(store.delete(Table::Categories, "c1").await.unwrap());
        assert!(!store.delete(Table::Categories, "c1").await.unwrap());
        assert!(store.get(Table::Categories, "c1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_put_requires_id() {
        let store = MemoryStore::new();
        let err = store
            .put(Table::Categories, doc(json!({"name": "Books"})))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::InvalidDocument(_)));
    }

    #[tokio::test]
    async fn test_update_merges_and_keeps_id() {
        let store = MemoryStore::new();
        store
            .put(
                Table::Products,
                doc(json!({"id": "p1", "name": "Pen", "quantity": 3, "deleted_at": "x"})),
            )
            .await
            .unwrap();

        let patched = store
            .update(
                Table::Products,
                "p1",
                doc(json!({"id": "other", "quantity": 7, "deleted_at": null})),
            )
            .await
            .unwrap();
        assert!(patched);

        let found = store.get(Table::Products, "p1").await.unwrap().unwrap();
        assert_eq!(found["id"], "p1");
        assert_eq!(found["name"], "Pen");
        assert_eq!(found["quantity"], 7);
        assert!(found["deleted_at"].is_null());

        assert!(!store
            .update(Table::Products, "missing", Document::new())
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_scan_applies_filter() {
        let store = MemoryStore::new();
        for (id, user) in [("a", "u1"), ("b", "u2"), ("c", "u1")] {
            store
                .put(Table::Carts, doc(json!({"id": id, "user_id": user})))
                .await
                .unwrap();
        }
        let rows = store
            .scan(Table::Carts, &Filter::all().eq("user_id", "u1"))
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
    }
}
