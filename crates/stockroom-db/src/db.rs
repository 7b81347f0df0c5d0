//! SQLite connection pool and query execution.

use crate::{DbError, QueryResult, Row, Value};
use sqlx::query::Query;
use sqlx::sqlite::{
    SqliteArguments, SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow,
};
use sqlx::{Column, Row as _, Sqlite, TypeInfo, ValueRef};
use std::str::FromStr;
use tracing::debug;

/// SQLite database handle.
///
/// Cheap to clone; all clones share one connection pool.
#[derive(Clone, Debug)]
pub struct Db {
    pool: SqlitePool,
}

impl Db {
    /// Connect to the database at `url`, creating the file if needed.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let db = Db::connect("sqlite://stockroom.db").await?;
    /// ```
    pub async fn connect(url: &str) -> Result<Self, DbError> {
        if url.contains(":memory:") {
            return Self::in_memory().await;
        }
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| DbError::OpenError(e.to_string()))?
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| DbError::OpenError(e.to_string()))?;
        debug!(url, "opened sqlite pool");
        Ok(Self { pool })
    }

    /// Open a private in-memory database.
    ///
    /// The pool holds a single connection that is never recycled, since every
    /// new connection to `:memory:` would see an empty database.
    pub async fn in_memory() -> Result<Self, DbError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| DbError::OpenError(e.to_string()))?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| DbError::OpenError(e.to_string()))?;
        Ok(Self { pool })
    }

    /// Execute a SQL statement that doesn't return rows.
    ///
    /// Returns the number of rows affected.
    ///
    /// ```rust,ignore
    /// db.execute(
    ///     "INSERT INTO categories (id, name) VALUES (?, ?)",
    ///     params!["cat_1", "Books"]
    /// ).await?;
    /// ```
    pub async fn execute(&self, sql: &str, params: &[Value]) -> Result<u64, DbError> {
        let result = bind_all(sqlx::query(sql), params)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Execute a SQL query and return raw results.
    pub async fn query(&self, sql: &str, params: &[Value]) -> Result<QueryResult, DbError> {
        let rows = bind_all(sqlx::query(sql), params)
            .fetch_all(&self.pool)
            .await?;

        let columns: Vec<String> = rows
            .first()
            .map(|row| row.columns().iter().map(|c| c.name().to_string()).collect())
            .unwrap_or_default();

        let rows = rows
            .iter()
            .map(|row| convert_row(row, &columns))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(QueryResult::new(columns, rows))
    }
}

fn bind_all<'q>(
    mut query: Query<'q, Sqlite, SqliteArguments<'q>>,
    params: &[Value],
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    for param in params {
        query = match param {
            Value::Null => query.bind(None::<i64>),
            Value::Integer(i) => query.bind(*i),
            Value::Real(f) => query.bind(*f),
            Value::Text(s) => query.bind(s.clone()),
            Value::Blob(b) => query.bind(b.clone()),
        };
    }
    query
}

/// Convert by the storage class of each value, not the declared column type.
fn convert_row(row: &SqliteRow, columns: &[String]) -> Result<Row, DbError> {
    let mut values = Vec::with_capacity(columns.len());
    for index in 0..columns.len() {
        let raw = row.try_get_raw(index)?;
        if raw.is_null() {
            values.push(Value::Null);
            continue;
        }
        let storage = raw.type_info().name().to_string();
        let value = match storage.as_str() {
            "INTEGER" | "BOOLEAN" => Value::Integer(row.try_get_unchecked::<i64, _>(index)?),
            "REAL" | "NUMERIC" => Value::Real(row.try_get_unchecked::<f64, _>(index)?),
            "BLOB" => Value::Blob(row.try_get_unchecked::<Vec<u8>, _>(index)?),
            _ => Value::Text(row.try_get_unchecked::<String, _>(index)?),
        };
        values.push(value);
    }
    Ok(Row::new(columns.to_vec(), values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params;

    #[tokio::test]
    async fn test_execute_and_query_roundtrip() {
        let db = Db::in_memory().await.unwrap();
        db.execute(
            "CREATE TABLE t (id TEXT PRIMARY KEY, n INTEGER, price REAL, note TEXT)",
            params![],
        )
        .await
        .unwrap();

        let affected = db
            .execute(
                "INSERT INTO t (id, n, price, note) VALUES (?, ?, ?, ?)",
                params!["a", 3, 1.5, None::<String>],
            )
            .await
            .unwrap();
        assert_eq!(affected, 1);

        let result = db.query("SELECT * FROM t WHERE id = ?", params!["a"]).await.unwrap();
        let row = result.first().unwrap();
        assert_eq!(row.get("n"), Some(&Value::Integer(3)));
        assert_eq!(row.get("price"), Some(&Value::Real(1.5)));
        assert_eq!(row.get("note"), Some(&Value::Null));
    }
}
