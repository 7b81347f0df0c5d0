//! Cart/inventory reconciliation.
//!
//! Stock checks and the writes that follow them are separate datastore calls.
//! Two concurrent adds for the same product can both pass the check.

use crate::cart::{CartItem, CartLine, CartView};
use crate::error::{CommerceError, Result};
use crate::ids::{ProductId, UserId};
use crate::repository::{CartRepository, ProductRepository};
use std::sync::Arc;
use stockroom_db::Datastore;
use tracing::{debug, info};

#[derive(Clone, Debug)]
pub struct CartService {
    carts: CartRepository,
    products: ProductRepository,
}

impl CartService {
    pub fn new(store: Arc<dyn Datastore>) -> Self {
        Self {
            carts: CartRepository::new(Arc::clone(&store)),
            products: ProductRepository::new(store),
        }
    }

    /// Add `quantity` units of a product, merging into an existing line.
    pub async fn add_to_cart(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
        quantity: i64,
    ) -> Result<CartItem> {
        if quantity <= 0 {
            return Err(CommerceError::InvalidQuantity(quantity));
        }

        let product = self
            .products
            .find_by_id(product_id.as_str())
            .await?
            .ok_or_else(|| CommerceError::ProductNotFound(product_id.to_string()))?;
        if !product.is_purchasable() {
            return Err(CommerceError::ProductUnavailable(product_id.to_string()));
        }
        if quantity > product.quantity {
            return Err(CommerceError::InsufficientInventory {
                product_id: product_id.to_string(),
                requested: quantity,
                available: product.quantity,
            });
        }

        match self
            .carts
            .find_line(user_id.as_str(), product_id.as_str())
            .await?
        {
            Some(mut line) => {
                let combined = line.quantity + quantity;
                if combined > product.quantity {
                    return Err(CommerceError::InsufficientInventory {
                        product_id: product_id.to_string(),
                        requested: combined,
                        available: product.quantity,
                    });
                }
                self.carts.set_quantity(line.id.as_str(), combined).await?;
                line.quantity = combined;
                debug!(user_id = %user_id, product_id = %product_id, quantity = combined, "cart line merged");
                Ok(line)
            }
            None => {
                let line = CartItem::new(user_id.clone(), product_id.clone(), quantity);
                self.carts.create(&line).await?;
                debug!(user_id = %user_id, product_id = %product_id, quantity, "cart line created");
                Ok(line)
            }
        }
    }

    /// Lines joined with their products, oldest line first.
    ///
    /// Lines whose product is gone or soft-deleted are left out.
    pub async fn get_cart(&self, user_id: &UserId) -> Result<CartView> {
        let mut items = self.carts.find_by_user(user_id.as_str()).await?;
        items.sort_by(|a, b| a.created_at.cmp(&b.created_at));

        let mut lines = Vec::with_capacity(items.len());
        for item in items {
            match self.products.find_by_id(item.product_id.as_str()).await? {
                Some(product) if !product.is_deleted => lines.push(CartLine::new(item, product)),
                _ => debug!(cart_item_id = %item.id, "skipping line for unavailable product"),
            }
        }
        Ok(CartView::from_lines(lines))
    }

    /// Set a line's quantity. Zero or less removes the line and returns `None`.
    pub async fn update_quantity(
        &self,
        user_id: &UserId,
        cart_item_id: &str,
        quantity: i64,
    ) -> Result<Option<CartItem>> {
        let mut line = self.owned_line(user_id, cart_item_id).await?;

        if quantity <= 0 {
            self.carts.delete(cart_item_id).await?;
            debug!(cart_item_id, "cart line removed by zero quantity");
            return Ok(None);
        }

        let product = self
            .products
            .find_by_id(line.product_id.as_str())
            .await?
            .ok_or_else(|| CommerceError::ProductNotFound(line.product_id.to_string()))?;
        if quantity > product.quantity {
            return Err(CommerceError::InsufficientInventory {
                product_id: line.product_id.to_string(),
                requested: quantity,
                available: product.quantity,
            });
        }

        self.carts.set_quantity(cart_item_id, quantity).await?;
        line.quantity = quantity;
        Ok(Some(line))
    }

    pub async fn remove(&self, user_id: &UserId, cart_item_id: &str) -> Result<()> {
        self.owned_line(user_id, cart_item_id).await?;
        self.carts.delete(cart_item_id).await?;
        Ok(())
    }

    /// Delete every line. Returns how many were removed.
    pub async fn clear(&self, user_id: &UserId) -> Result<usize> {
        let removed = self.carts.clear(user_id.as_str()).await?;
        info!(user_id = %user_id, removed, "cart cleared");
        Ok(removed)
    }

    /// Sum of line quantities.
    pub async fn count(&self, user_id: &UserId) -> Result<i64> {
        let items = self.carts.find_by_user(user_id.as_str()).await?;
        Ok(items.iter().map(|item| item.quantity).sum())
    }

    /// Key lookup, then ownership check. Another user's line reads as missing.
    async fn owned_line(&self, user_id: &UserId, cart_item_id: &str) -> Result<CartItem> {
        self.carts
            .find_by_id(cart_item_id)
            .await?
            .filter(|line| line.is_owned_by(user_id))
            .ok_or_else(|| CommerceError::CartItemNotFound(cart_item_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ProductInput, StockStatus};
    use crate::money::Money;
    use crate::service::ProductService;
    use stockroom_db::{MemoryStore, SqliteStore};

    struct Fixture {
        cart: CartService,
        products: ProductService,
        admin: UserId,
        shopper: UserId,
    }

    fn fixture_with(store: Arc<dyn Datastore>) -> Fixture {
        Fixture {
            cart: CartService::new(Arc::clone(&store)),
            products: ProductService::new(store),
            admin: UserId::new("admin"),
            shopper: UserId::new("shopper"),
        }
    }

    fn fixture() -> Fixture {
        fixture_with(Arc::new(MemoryStore::new()))
    }

    impl Fixture {
        async fn product(&self, name: &str, price: i64, quantity: i64) -> ProductId {
            self.products
                .create(
                    ProductInput {
                        name: name.to_string(),
                        price: Money::new(price),
                        quantity,
                        category_id: None,
                        image_url: None,
                    },
                    &self.admin,
                )
                .await
                .unwrap()
                .id
        }
    }

    #[tokio::test]
    async fn test_requesting_more_than_stock_creates_no_line() {
        let f = fixture();
        let pen = f.product("Pen", 150, 5).await;

        let err = f.cart.add_to_cart(&f.shopper, &pen, 6).await.unwrap_err();
        assert!(matches!(
            err,
            CommerceError::InsufficientInventory { requested: 6, available: 5, .. }
        ));
        assert!(f.cart.get_cart(&f.shopper).await.unwrap().is_empty());
        assert_eq!(f.cart.count(&f.shopper).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_sequential_adds_accumulate_on_one_line() {
        let f = fixture();
        let pen = f.product("Pen", 150, 10).await;

        let first = f.cart.add_to_cart(&f.shopper, &pen, 2).await.unwrap();
        let second = f.cart.add_to_cart(&f.shopper, &pen, 3).await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(second.quantity, 5);

        let cart = f.cart.get_cart(&f.shopper).await.unwrap();
        assert_eq!(cart.total_items, 1);
        assert_eq!(cart.items[0].item.quantity, 5);
        assert_eq!(cart.total_amount, Money::new(750));

        let err = f.cart.add_to_cart(&f.shopper, &pen, 6).await.unwrap_err();
        assert!(matches!(
            err,
            CommerceError::InsufficientInventory { requested: 11, available: 10, .. }
        ));
        assert_eq!(f.cart.count(&f.shopper).await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_add_rejects_bad_requests() {
        let f = fixture();
        let pen = f.product("Pen", 150, 10).await;

        assert!(matches!(
            f.cart.add_to_cart(&f.shopper, &pen, 0).await,
            Err(CommerceError::InvalidQuantity(0))
        ));
        assert!(matches!(
            f.cart.add_to_cart(&f.shopper, &ProductId::new("nope"), 1).await,
            Err(CommerceError::ProductNotFound(_))
        ));

        f.products.soft_delete(pen.as_str(), &f.admin).await.unwrap();
        assert!(matches!(
            f.cart.add_to_cart(&f.shopper, &pen, 1).await,
            Err(CommerceError::ProductUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_cart_view_drops_deleted_products_and_labels_stock() {
        let f = fixture();
        let pen = f.product("Pen", 150, 3).await;
        let lamp = f.product("Lamp", 900, 20).await;
        f.cart.add_to_cart(&f.shopper, &pen, 2).await.unwrap();
        f.cart.add_to_cart(&f.shopper, &lamp, 1).await.unwrap();

        let cart = f.cart.get_cart(&f.shopper).await.unwrap();
        let pen_line = cart.items.iter().find(|l| l.product.id == pen).unwrap();
        assert_eq!(pen_line.stock_status, StockStatus::Low);
        assert!(pen_line.is_available);

        f.products.soft_delete(lamp.as_str(), &f.admin).await.unwrap();
        let cart = f.cart.get_cart(&f.shopper).await.unwrap();
        assert_eq!(cart.total_items, 1);
        assert_eq!(cart.total_amount, Money::new(300));
        // the line itself is still stored
        assert_eq!(f.cart.count(&f.shopper).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_update_quantity_checks_stock_and_ownership() {
        let f = fixture();
        let pen = f.product("Pen", 150, 4).await;
        let line = f.cart.add_to_cart(&f.shopper, &pen, 1).await.unwrap();

        let updated = f
            .cart
            .update_quantity(&f.shopper, line.id.as_str(), 4)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.quantity, 4);

        assert!(matches!(
            f.cart.update_quantity(&f.shopper, line.id.as_str(), 5).await,
            Err(CommerceError::InsufficientInventory { .. })
        ));
        assert!(matches!(
            f.cart.update_quantity(&f.admin, line.id.as_str(), 1).await,
            Err(CommerceError::CartItemNotFound(_))
        ));
        assert!(matches!(
            f.cart.remove(&f.admin, line.id.as_str()).await,
            Err(CommerceError::CartItemNotFound(_))
        ));

        let removed = f
            .cart
            .update_quantity(&f.shopper, line.id.as_str(), 0)
            .await
            .unwrap();
        assert!(removed.is_none());
        assert!(f.cart.get_cart(&f.shopper).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_remove_and_clear() {
        let f = fixture();
        let pen = f.product("Pen", 150, 9).await;
        let lamp = f.product("Lamp", 900, 9).await;
        let line = f.cart.add_to_cart(&f.shopper, &pen, 1).await.unwrap();
        f.cart.add_to_cart(&f.shopper, &lamp, 2).await.unwrap();
        f.cart.add_to_cart(&f.admin, &lamp, 1).await.unwrap();

        f.cart.remove(&f.shopper, line.id.as_str()).await.unwrap();
        assert!(matches!(
            f.cart.remove(&f.shopper, line.id.as_str()).await,
            Err(CommerceError::CartItemNotFound(_))
        ));
        assert_eq!(f.cart.count(&f.shopper).await.unwrap(), 2);

        assert_eq!(f.cart.clear(&f.shopper).await.unwrap(), 1);
        assert_eq!(f.cart.count(&f.shopper).await.unwrap(), 0);
        assert_eq!(f.cart.count(&f.admin).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_cart_rules_hold_on_sqlite() {
        let store = SqliteStore::open("sqlite::memory:").await.unwrap();
        let f = fixture_with(Arc::new(store));
        let pen = f.product("Pen", 150, 5).await;

        assert!(f.cart.add_to_cart(&f.shopper, &pen, 6).await.is_err());
        f.cart.add_to_cart(&f.shopper, &pen, 2).await.unwrap();
        f.cart.add_to_cart(&f.shopper, &pen, 2).await.unwrap();

        let cart = f.cart.get_cart(&f.shopper).await.unwrap();
        assert_eq!(cart.total_items, 1);
        assert_eq!(cart.items[0].item.quantity, 4);
        assert_eq!(cart.items[0].stock_status, StockStatus::InStock);
    }
}
