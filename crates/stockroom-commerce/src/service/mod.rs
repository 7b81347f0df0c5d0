//! Services compose repositories and apply the business rules.

mod audit;
mod cart;
mod categories;
mod products;

pub use audit::{AuditService, RECENT_LOG_LIMIT};
pub use cart::CartService;
pub use categories::CategoryService;
pub use products::ProductService;
