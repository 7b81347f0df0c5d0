//! Per-entity table access over a [`stockroom_db::Datastore`].
//!
//! Repositories translate between domain records and documents and never
//! apply business rules.

mod audit_logs;
mod carts;
mod categories;
mod products;

pub use audit_logs::AuditLogRepository;
pub use carts::CartRepository;
pub use categories::CategoryRepository;
pub use products::ProductRepository;
