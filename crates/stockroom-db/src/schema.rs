//! Relational schema for the SQLite backend.

use crate::{Db, DbError};
use tracing::info;

/// DDL statements, applied in order. Every statement is idempotent.
pub const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS products (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        price INTEGER NOT NULL DEFAULT 0,
        quantity INTEGER NOT NULL DEFAULT 0,
        category_id TEXT,
        image_url TEXT,
        is_deleted INTEGER NOT NULL DEFAULT 0,
        deleted_at TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS categories (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        description TEXT
    )",
    "CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY,
        username TEXT NOT NULL,
        password_hash TEXT NOT NULL,
        role TEXT NOT NULL,
        created_at TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS carts (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        product_id TEXT NOT NULL,
        quantity INTEGER NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS audit_logs (
        id TEXT PRIMARY KEY,
        product_id TEXT NOT NULL,
        action TEXT NOT NULL,
        user_id TEXT NOT NULL,
        details TEXT NOT NULL DEFAULT '{}',
        time TEXT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_carts_user ON carts (user_id)",
    "CREATE INDEX IF NOT EXISTS idx_carts_user_product ON carts (user_id, product_id)",
    "CREATE INDEX IF NOT EXISTS idx_products_category ON products (category_id)",
    "CREATE INDEX IF NOT EXISTS idx_users_username ON users (username)",
    "CREATE INDEX IF NOT EXISTS idx_audit_logs_product ON audit_logs (product_id)",
];

/// Create all tables and indexes.
pub async fn init_schema(db: &Db) -> Result<(), DbError> {
    for statement in SCHEMA {
        db.execute(statement, &[]).await?;
    }
    info!(statements = SCHEMA.len(), "schema initialized");
    Ok(())
}
