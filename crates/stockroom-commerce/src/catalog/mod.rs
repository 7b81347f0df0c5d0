//! Catalog types: products, categories, inventory.

mod category;
mod inventory;
mod product;

pub use category::{Category, CategoryInput};
pub use inventory::{InventoryStats, StockStatus, LOW_STOCK_THRESHOLD};
pub use product::{Product, ProductInput};
