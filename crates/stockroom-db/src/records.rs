//! Typed access to one table.

use crate::datastore::{Datastore, Table};
use crate::filter::Filter;
use crate::types::{from_document, to_document, Document};
use crate::DbError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::warn;

/// A table whose documents deserialize into `T`.
///
/// Rows that fail to deserialize are skipped in scans and logged, so one bad
/// row does not take a listing down.
pub struct Records<T> {
    store: Arc<dyn Datastore>,
    table: Table,
    _record: PhantomData<fn() -> T>,
}

impl<T> Clone for Records<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            table: self.table,
            _record: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Records<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Records")
            .field("table", &self.table)
            .field("backend", &self.store.backend())
            .finish()
    }
}

impl<T> Records<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Bind a table of the given store.
    pub fn new(store: Arc<dyn Datastore>, table: Table) -> Self {
        Self {
            store,
            table,
            _record: PhantomData,
        }
    }

    /// The bound table.
    pub fn table(&self) -> Table {
        self.table
    }

    /// The underlying store.
    pub fn store(&self) -> &Arc<dyn Datastore> {
        &self.store
    }

    /// Fetch one record by key.
    pub async fn find(&self, id: &str) -> Result<Option<T>, DbError> {
        match self.store.get(self.table, id).await? {
            Some(doc) => Ok(Some(from_document(doc)?)),
            None => Ok(None),
        }
    }

    /// Every record matching the filter.
    pub async fn scan(&self, filter: &Filter) -> Result<Vec<T>, DbError> {
        let docs = self.store.scan(self.table, filter).await?;
        let mut records = Vec::with_capacity(docs.len());
        for doc in docs {
            let id = doc
                .get("id")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string();
            match from_document(doc) {
                Ok(record) => records.push(record),
                Err(e) => warn!(table = %self.table, id = %id, error = %e, "skipping unreadable row"),
            }
        }
        Ok(records)
    }

    /// Every record in the table.
    pub async fn all(&self) -> Result<Vec<T>, DbError> {
        self.scan(&Filter::all()).await
    }

    /// Insert or replace a record.
    pub async fn put(&self, record: &T) -> Result<(), DbError> {
        self.store.put(self.table, to_document(record)?).await
    }

    /// Merge fields into a record. Returns whether it existed.
    pub async fn patch(&self, id: &str, patch: Document) -> Result<bool, DbError> {
        self.store.update(self.table, id, patch).await
    }

    /// Remove a record. Returns whether it existed.
    pub async fn delete(&self, id: &str) -> Result<bool, DbError> {
        self.store.delete(self.table, id).await
    }
}

/// Build a patch document from `key => value` pairs.
///
/// ```rust,ignore
/// let patch = patch! { "quantity" => 3, "updated_at" => now };
/// ```
#[macro_export]
macro_rules! patch {
    ($($key:expr => $value:expr),* $(,)?) => {{
        let mut doc = $crate::Document::new();
        $(doc.insert(($key).to_string(), $crate::serde_json::json!($value));)*
        doc
    }};
}
