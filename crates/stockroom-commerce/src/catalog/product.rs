//! Product records and admin form input.

use crate::catalog::StockStatus;
use crate::error::{CommerceError, Result};
use crate::ids::{CategoryId, ProductId};
use crate::money::Money;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stockroom_db::de;

/// A product in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    /// Unique product identifier.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Unit price.
    pub price: Money,
    /// Units in stock.
    pub quantity: i64,
    /// Category reference. May dangle after a category is deleted.
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    /// Public URL of the product image.
    #[serde(default)]
    pub image_url: Option<String>,
    /// Soft-delete flag.
    #[serde(default, deserialize_with = "de::flexible_bool")]
    pub is_deleted: bool,
    /// When the product was soft-deleted.
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Build a new, active product from validated input.
    pub fn from_input(input: ProductInput) -> Self {
        let now = Utc::now();
        Self {
            id: ProductId::generate(),
            name: input.name,
            price: input.price,
            quantity: input.quantity,
            category_id: input.category_id,
            image_url: input.image_url,
            is_deleted: false,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Stock status label for the current quantity.
    pub fn stock_status(&self) -> StockStatus {
        StockStatus::for_quantity(self.quantity)
    }

    /// Whether the product can be added to a cart at all.
    pub fn is_purchasable(&self) -> bool {
        !self.is_deleted
    }

    /// Stock value (price times quantity).
    pub fn stock_value(&self) -> Money {
        self.price.times(self.quantity)
    }
}

/// Fields an admin supplies when creating or editing a product.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductInput {
    pub name: String,
    pub price: Money,
    pub quantity: i64,
    pub category_id: Option<CategoryId>,
    /// New image URL. On update, `None` keeps the current image.
    pub image_url: Option<String>,
}

impl ProductInput {
    /// Trim and check the input.
    pub fn validate(mut self) -> Result<Self> {
        self.name = self.name.trim().to_string();
        if self.name.is_empty() {
            return Err(CommerceError::ValidationError(
                "product name is required".to_string(),
            ));
        }
        if self.price.is_negative() {
            return Err(CommerceError::ValidationError(
                "price cannot be negative".to_string(),
            ));
        }
        if self.quantity < 0 {
            return Err(CommerceError::ValidationError(
                "quantity cannot be negative".to_string(),
            ));
        }
        self.category_id = self
            .category_id
            .filter(|id| !id.as_str().trim().is_empty());
        self.image_url = self.image_url.filter(|url| !url.trim().is_empty());
        Ok(self)
    }
}
