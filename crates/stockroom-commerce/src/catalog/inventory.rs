//! Stock levels and inventory statistics.

use crate::catalog::Product;
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// Quantities below this are reported as low stock.
pub const LOW_STOCK_THRESHOLD: i64 = 5;

/// Three-tier stock label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    /// No units left.
    OutOfStock,
    /// Fewer than [`LOW_STOCK_THRESHOLD`] units left.
    Low,
    /// Plenty left.
    InStock,
}

impl StockStatus {
    /// Classify a stock quantity.
    pub fn for_quantity(quantity: i64) -> Self {
        if quantity <= 0 {
            StockStatus::OutOfStock
        } else if quantity < LOW_STOCK_THRESHOLD {
            StockStatus::Low
        } else {
            StockStatus::InStock
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            StockStatus::OutOfStock => "Out of stock",
            StockStatus::Low => "Low stock",
            StockStatus::InStock => "In stock",
        }
    }

    /// CSS class hint for views.
    pub fn css_class(&self) -> &'static str {
        match self {
            StockStatus::OutOfStock => "danger",
            StockStatus::Low => "warning",
            StockStatus::InStock => "success",
        }
    }
}

/// Aggregate stock figures over active products.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct InventoryStats {
    pub total: usize,
    pub in_stock: usize,
    pub low_stock: usize,
    pub out_of_stock: usize,
    /// Sum of price times quantity.
    pub total_value: Money,
}

impl InventoryStats {
    /// Tally a set of products.
    pub fn collect<'a>(products: impl IntoIterator<Item = &'a Product>) -> Self {
        let mut stats = Self::default();
        for product in products {
            stats.total += 1;
            stats.total_value = stats.total_value + product.stock_value();
            match product.stock_status() {
                StockStatus::OutOfStock => stats.out_of_stock += 1,
                StockStatus::Low => stats.low_stock += 1,
                StockStatus::InStock => stats.in_stock += 1,
            }
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stock_status_tiers() {
        assert_eq!(StockStatus::for_quantity(0), StockStatus::OutOfStock);
        assert_eq!(StockStatus::for_quantity(1), StockStatus::Low);
        assert_eq!(StockStatus::for_quantity(4), StockStatus::Low);
        assert_eq!(StockStatus::for_quantity(5), StockStatus::InStock);
    }

    #[test]
    fn test_stock_status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_value(StockStatus::OutOfStock).unwrap(),
            serde_json::json!("out_of_stock")
        );
    }
}
