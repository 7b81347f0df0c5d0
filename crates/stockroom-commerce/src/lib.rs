//! Catalog, cart and audit logic for Stockroom.
//!
//! - **Catalog**: products with soft delete, categories, stock levels
//! - **Cart**: per-user cart lines checked against stock
//! - **Audit**: an append-only trail of product mutations
//! - **Search**: product filters and client-side pagination
//!
//! Services run over any [`stockroom_db::Datastore`] backend.
//!
//! # Example
//!
//! ```rust,ignore
//! use stockroom_commerce::prelude::*;
//!
//! let store = stockroom_db::open(BackendKind::Memory, "").await?;
//! let products = ProductService::new(store.clone());
//! let cart = CartService::new(store);
//!
//! let pen = products.create(input, &admin_id).await?;
//! cart.add_to_cart(&user_id, &pen.id, 2).await?;
//! let view = cart.get_cart(&user_id).await?;
//! println!("Total: {}", Currency::USD.format(view.total_amount));
//! ```

pub mod error;
pub mod ids;
pub mod money;

pub mod audit;
pub mod cart;
pub mod catalog;
pub mod repository;
pub mod search;
pub mod service;

pub use error::CommerceError;
pub use ids::*;
pub use money::{Currency, Money};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::CommerceError;
    pub use crate::ids::*;
    pub use crate::money::{Currency, Money};

    // Catalog
    pub use crate::catalog::{
        Category, CategoryInput, InventoryStats, Product, ProductInput, StockStatus,
        LOW_STOCK_THRESHOLD,
    };

    // Cart
    pub use crate::cart::{CartItem, CartLine, CartView};

    // Audit
    pub use crate::audit::{AuditAction, AuditLogEntry, AuditStats, EnrichedLogEntry};

    // Search
    pub use crate::search::{Page, Pagination, ProductFilter};

    // Services
    pub use crate::service::{AuditService, CartService, CategoryService, ProductService};
}
