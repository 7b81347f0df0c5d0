//! Shopping cart module.
//!
//! Contains the persisted cart line and the product-joined cart view.

mod item;
mod view;

pub use item::CartItem;
pub use view::{CartLine, CartView};
