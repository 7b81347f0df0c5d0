//! The document datastore abstraction shared by both backends.

use crate::filter::Filter;
use crate::memory::MemoryStore;
use crate::sqlite::SqliteStore;
use crate::types::Document;
use crate::DbError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;

/// The logical tables. Every table is keyed by a string `id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Table {
    Products,
    Categories,
    Users,
    Carts,
    AuditLogs,
}

impl Table {
    /// All tables, in creation order.
    pub const ALL: [Table; 5] = [
        Table::Products,
        Table::Categories,
        Table::Users,
        Table::Carts,
        Table::AuditLogs,
    ];

    /// The table name.
    pub fn name(&self) -> &'static str {
        match self {
            Table::Products => "products",
            Table::Categories => "categories",
            Table::Users => "users",
            Table::Carts => "carts",
            Table::AuditLogs => "audit_logs",
        }
    }

    /// The persisted columns. `id` is always first.
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            Table::Products => &[
                "id",
                "name",
                "price",
                "quantity",
                "category_id",
                "image_url",
                "is_deleted",
                "deleted_at",
                "created_at",
                "updated_at",
            ],
            Table::Categories => &["id", "name", "description"],
            Table::Users => &["id", "username", "password_hash", "role", "created_at"],
            Table::Carts => &[
                "id",
                "user_id",
                "product_id",
                "quantity",
                "created_at",
                "updated_at",
            ],
            Table::AuditLogs => &["id", "product_id", "action", "user_id", "details", "time"],
        }
    }

    /// Check if `column` is persisted in this table.
    pub fn has_column(&self, column: &str) -> bool {
        self.columns().contains(&column)
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Key/scan access to document tables.
///
/// `update` merges the patch into the stored document; a `null` in the patch
/// clears the field. `update` and `delete` return whether the row existed.
#[async_trait]
pub trait Datastore: Send + Sync {
    /// Fetch one document by key.
    async fn get(&self, table: Table, id: &str) -> Result<Option<Document>, DbError>;

    /// Read every document matching the filter.
    async fn scan(&self, table: Table, filter: &Filter) -> Result<Vec<Document>, DbError>;

    /// Insert or replace a document. The document must carry a string `id`.
    async fn put(&self, table: Table, doc: Document) -> Result<(), DbError>;

    /// Merge a patch into an existing document.
    async fn update(&self, table: Table, id: &str, patch: Document) -> Result<bool, DbError>;

    /// Remove a document.
    async fn delete(&self, table: Table, id: &str) -> Result<bool, DbError>;

    /// Backend name for logs.
    fn backend(&self) -> BackendKind;
}

/// Extract the `id` key of a document.
pub fn document_id(doc: &Document) -> Result<&str, DbError> {
    doc.get("id")
        .and_then(|v| v.as_str())
        .ok_or_else(|| DbError::InvalidDocument("missing string `id`".to_string()))
}

/// Which datastore implementation to run on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// In-process document maps. Data is lost on exit.
    #[default]
    Memory,
    /// SQLite through a connection pool.
    Sqlite,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Memory => f.write_str("memory"),
            BackendKind::Sqlite => f.write_str("sqlite"),
        }
    }
}

impl FromStr for BackendKind {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" | "mem" => Ok(BackendKind::Memory),
            "sqlite" => Ok(BackendKind::Sqlite),
            other => Err(DbError::OpenError(format!("unknown backend '{}'", other))),
        }
    }
}

/// Build the configured backend. SQLite schemas are created on open.
pub async fn open(kind: BackendKind, database_url: &str) -> Result<Arc<dyn Datastore>, DbError> {
    let store: Arc<dyn Datastore> = match kind {
        BackendKind::Memory => Arc::new(MemoryStore::new()),
        BackendKind::Sqlite => Arc::new(SqliteStore::open(database_url).await?),
    };
    info!(backend = %kind, "datastore ready");
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_kind_parse() {
        assert_eq!("memory".parse::<BackendKind>().unwrap(), BackendKind::Memory);
        assert_eq!(" SQLite ".parse::<BackendKind>().unwrap(), BackendKind::Sqlite);
        assert!("dynamo".parse::<BackendKind>().is_err());
    }

    #[test]
    fn test_columns_start_with_id() {
        for table in Table::ALL {
            assert_eq!(table.columns()[0], "id", "{}", table);
        }
        assert!(Table::Products.has_column("is_deleted"));
        assert!(!Table::Categories.has_column("is_deleted"));
    }
}
