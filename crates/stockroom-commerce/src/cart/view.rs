//! Cart lines joined with their products.

use crate::cart::CartItem;
use crate::catalog::{Product, StockStatus};
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// A cart line with its product and derived fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartLine {
    #[serde(flatten)]
    pub item: CartItem,
    pub product: Product,
    /// Product price times line quantity.
    pub subtotal: Money,
    /// Whether current stock covers the line quantity.
    pub is_available: bool,
    pub stock_status: StockStatus,
}

impl CartLine {
    /// Join a line with its product.
    pub fn new(item: CartItem, product: Product) -> Self {
        let subtotal = product.price.times(item.quantity);
        let is_available = product.quantity >= item.quantity;
        let stock_status = product.stock_status();
        Self {
            item,
            product,
            subtotal,
            is_available,
            stock_status,
        }
    }
}

/// A user's cart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct CartView {
    pub items: Vec<CartLine>,
    /// Number of lines.
    pub total_items: usize,
    /// Sum of line subtotals.
    pub total_amount: Money,
}

impl CartView {
    /// Build a view from already-joined lines.
    pub fn from_lines(items: Vec<CartLine>) -> Self {
        let total_amount = items.iter().map(|line| line.subtotal).sum();
        Self {
            total_items: items.len(),
            total_amount,
            items,
        }
    }

    /// Sum of line quantities.
    pub fn unit_count(&self) -> i64 {
        self.items.iter().map(|line| line.item.quantity).sum()
    }

    /// Check if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
