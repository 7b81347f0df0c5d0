//! Datastore layer for Stockroom.
//!
//! Tables hold JSON documents keyed by a string `id`. The [`Datastore`] trait
//! exposes key lookups and filtered scans; [`MemoryStore`] keeps documents in
//! process and [`SqliteStore`] flattens them onto relational tables through
//! `sqlx`. Callers pick one at startup with [`open`].
//!
//! # Example
//!
//! ```rust,ignore
//! use stockroom_db::{open, BackendKind, Filter, Table};
//!
//! let store = open(BackendKind::Sqlite, "sqlite://stockroom.db").await?;
//! let active = store
//!     .scan(Table::Products, &Filter::all().not_true("is_deleted"))
//!     .await?;
//! ```

mod datastore;
mod db;
mod error;
mod filter;
mod memory;
mod records;
mod schema;
mod sqlite;
mod types;

pub use datastore::{document_id, open, BackendKind, Datastore, Table};
pub use db::Db;
pub use error::DbError;
pub use filter::{Condition, Filter};
pub use memory::MemoryStore;
pub use records::Records;
pub use schema::{init_schema, SCHEMA};
pub use sqlite::SqliteStore;
pub use types::{de, from_document, to_document, Document, QueryResult, Row, Value};

#[doc(hidden)]
pub use serde_json;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        params, patch, BackendKind, Datastore, Db, DbError, Document, Filter, QueryResult, Records,
        Row, Table, Value,
    };
}

/// Create a parameter list for SQL queries.
///
/// # Example
///
/// ```rust,ignore
/// use stockroom_db::params;
///
/// let params = params!["value1", 42, 3.14];
/// ```
#[macro_export]
macro_rules! params {
    () => {
        &[]
    };
    ($($param:expr),+ $(,)?) => {
        &[$($crate::Value::from($param)),+]
    };
}
