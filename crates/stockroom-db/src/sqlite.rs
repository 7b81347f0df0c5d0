//! Relational backend: one SQLite table per entity.

use crate::datastore::{document_id, BackendKind, Datastore, Table};
use crate::filter::Filter;
use crate::schema::init_schema;
use crate::types::{Document, Value};
use crate::{Db, DbError};
use async_trait::async_trait;
use tracing::{debug, warn};

/// [`Datastore`] over a SQLite pool.
///
/// Documents are flattened onto the table's columns; fields outside
/// [`Table::columns`] are not persisted.
#[derive(Clone, Debug)]
pub struct SqliteStore {
    db: Db,
}

impl SqliteStore {
    /// Connect and create the schema.
    pub async fn open(url: &str) -> Result<Self, DbError> {
        let db = Db::connect(url).await?;
        init_schema(&db).await?;
        Ok(Self { db })
    }
}

fn check_filter(table: Table, filter: &Filter) -> Result<(), DbError> {
    for condition in filter.conditions() {
        if !table.has_column(condition.field()) {
            return Err(DbError::QueryError(format!(
                "no column '{}' in {}",
                condition.field(),
                table
            )));
        }
    }
    Ok(())
}

#[async_trait]
impl Datastore for SqliteStore {
    async fn get(&self, table: Table, id: &str) -> Result<Option<Document>, DbError> {
        let sql = format!("SELECT * FROM {} WHERE id = ?", table.name());
        let result = self.db.query(&sql, &[Value::from(id)]).await?;
        Ok(result.first().map(|row| row.to_document()))
    }

    async fn scan(&self, table: Table, filter: &Filter) -> Result<Vec<Document>, DbError> {
        check_filter(table, filter)?;
        let (sql, params) = match filter.to_sql() {
            Some((clause, params)) => (
                format!("SELECT * FROM {} WHERE {}", table.name(), clause),
                params,
            ),
            None => (format!("SELECT * FROM {}", table.name()), Vec::new()),
        };
        debug!(%table, sql = %sql, "scan");
        let result = self.db.query(&sql, &params).await?;
        Ok(result.iter().map(|row| row.to_document()).collect())
    }

    async fn put(&self, table: Table, doc: Document) -> Result<(), DbError> {
        document_id(&doc)?;
        let columns = table.columns();
        let placeholders = vec!["?"; columns.len()].join(", ");
        let sql = format!(
            "INSERT OR REPLACE INTO {} ({}) VALUES ({})",
            table.name(),
            columns.join(", "),
            placeholders
        );
        let params: Vec<Value> = columns
            .iter()
            .map(|column| doc.get(*column).map(Value::from).unwrap_or(Value::Null))
            .collect();
        self.db.execute(&sql, &params).await?;
        Ok(())
    }

    async fn update(&self, table: Table, id: &str, patch: Document) -> Result<bool, DbError> {
        let mut assignments = Vec::new();
        let mut params = Vec::new();
        for (key, value) in &patch {
            if key == "id" {
                continue;
            }
            if !table.has_column(key) {
                warn!(%table, field = %key, "ignoring unknown field in update");
                continue;
            }
            assignments.push(format!("{} = ?", key));
            params.push(Value::from(value));
        }

        if assignments.is_empty() {
            return Ok(self.get(table, id).await?.is_some());
        }

        params.push(Value::from(id));
        let sql = format!(
            "UPDATE {} SET {} WHERE id = ?",
            table.name(),
            assignments.join(", ")
        );
        Ok(self.db.execute(&sql, &params).await? > 0)
    }

    async fn delete(&self, table: Table, id: &str) -> Result<bool, DbError> {
        let sql = format!("DELETE FROM {} WHERE id = ?", table.name());
        Ok(self.db.execute(&sql, &[Value::from(id)]).await? > 0)
    }

    fn backend(&self) -> BackendKind {
        BackendKind::Sqlite
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use serde_json::json;

    fn doc(value: serde_json::Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    async fn sqlite() -> SqliteStore {
        SqliteStore::open("sqlite::memory:").await.unwrap()
    }

    fn product(id: &str, name: &str, price: i64, deleted: bool, category: &str) -> Document {
        doc(json!({
            "id": id,
            "name": name,
            "price": price,
            "quantity": 4,
            "category_id": category,
            "image_url": null,
            "is_deleted": deleted,
            "deleted_at": null,
            "created_at": "2026-01-01T00:00:00Z",
            "updated_at": "2026-01-01T00:00:00Z",
        }))
    }

    async fn seed(store: &dyn Datastore) {
        store.put(Table::Products, product("p1", "Red Pen", 150, false, "c1")).await.unwrap();
        store.put(Table::Products, product("p2", "Blue pen", 250, false, "c1")).await.unwrap();
        store.put(Table::Products, product("p3", "Red Book", 900, true, "c2")).await.unwrap();
        store.put(Table::Products, product("p4", "Notebook", 500, false, "c2")).await.unwrap();
    }

    async fn ids(store: &dyn Datastore, filter: &Filter) -> Vec<String> {
        let mut ids: Vec<String> = store
            .scan(Table::Products, filter)
            .await
            .unwrap()
            .into_iter()
            .filter_map(|d| d.get("id").and_then(|v| v.as_str()).map(String::from))
            .collect();
        ids.sort();
        ids
    }

    #[tokio::test]
    async fn test_backends_agree_on_filters() {
        let memory = MemoryStore::new();
        let sqlite = sqlite().await;
        seed(&memory).await;
        seed(&sqlite).await;

        let filters = [
            Filter::all(),
            Filter::all().not_true("is_deleted"),
            Filter::all().is_true("is_deleted"),
            Filter::all().not_true("is_deleted").contains("name", "Red"),
            Filter::all().contains("name", "pen"),
            Filter::all().eq("category_id", "c2"),
            Filter::all().between("price", 200.0, 600.0),
            Filter::all().gte("price", 500.0).not_true("is_deleted"),
        ];
        for filter in &filters {
            assert_eq!(ids(&memory, filter).await, ids(&sqlite, filter).await, "{:?}", filter);
        }
    }

    #[tokio::test]
    async fn test_sqlite_update_patch() {
        let store = sqlite().await;
        seed(&store).await;

        let patch = doc(json!({"is_deleted": false, "deleted_at": null, "quantity": 9}));
        assert!(store.update(Table::Products, "p3", patch).await.unwrap());

        let found = store.get(Table::Products, "p3").await.unwrap().unwrap();
        assert_eq!(found["quantity"], 9);
        assert_eq!(found["is_deleted"], 0);
        assert!(found["deleted_at"].is_null());

        assert!(!store
            .update(Table::Products, "missing", doc(json!({"quantity": 1})))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_sqlite_stores_json_details_as_text() {
        let store = sqlite().await;
        store
            .put(
                Table::AuditLogs,
                doc(json!({
                    "id": "l1",
                    "product_id": "p1",
                    "action": "UPDATE",
                    "user_id": "u1",
                    "details": {"before": {"quantity": 1}},
                    "time": "2026-01-01T00:00:00Z",
                })),
            )
            .await
            .unwrap();
        let found = store.get(Table::AuditLogs, "l1").await.unwrap().unwrap();
        assert_eq!(found["details"], r#"{"before":{"quantity":1}}"#);
    }

    #[tokio::test]
    async fn test_scan_rejects_unknown_column() {
        let store = sqlite().await;
        let err = store
            .scan(Table::Categories, &Filter::all().not_true("is_deleted"))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::QueryError(_)));
    }
}
