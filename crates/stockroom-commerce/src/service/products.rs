//! Product catalog service. Every mutation is followed by an audit entry.

use crate::audit::AuditAction;
use crate::catalog::{InventoryStats, Product, ProductInput};
use crate::error::{CommerceError, Result};
use crate::ids::UserId;
use crate::repository::ProductRepository;
use crate::search::{paginate, Page, ProductFilter};
use crate::service::AuditService;
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use stockroom_db::{to_document, Datastore};
use tracing::{info, warn};

#[derive(Clone, Debug)]
pub struct ProductService {
    products: ProductRepository,
    audit: AuditService,
}

fn newest_first(mut products: Vec<Product>) -> Vec<Product> {
    products.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    products
}

impl ProductService {
    pub fn new(store: Arc<dyn Datastore>) -> Self {
        Self {
            products: ProductRepository::new(Arc::clone(&store)),
            audit: AuditService::new(store),
        }
    }

    /// Products that are not soft-deleted, newest first.
    pub async fn list_active(&self) -> Result<Vec<Product>> {
        Ok(newest_first(self.products.find_all_active().await?))
    }

    /// Every product, including soft-deleted ones.
    pub async fn list_all(&self) -> Result<Vec<Product>> {
        Ok(newest_first(self.products.find_all_including_deleted().await?))
    }

    /// Soft-deleted products, most recently deleted first.
    pub async fn list_deleted(&self) -> Result<Vec<Product>> {
        let mut products = self.products.find_deleted().await?;
        products.sort_by(|a, b| b.deleted_at.cmp(&a.deleted_at));
        Ok(products)
    }

    /// A product by id, deleted or not.
    pub async fn get(&self, id: &str) -> Result<Product> {
        self.products
            .find_by_id(id)
            .await?
            .ok_or_else(|| CommerceError::ProductNotFound(id.to_string()))
    }

    pub async fn search(&self, filter: &ProductFilter) -> Result<Vec<Product>> {
        Ok(newest_first(self.products.search(filter).await?))
    }

    /// Active products in a category.
    pub async fn by_category(&self, category_id: &str) -> Result<Vec<Product>> {
        Ok(newest_first(self.products.find_by_category(category_id).await?))
    }

    /// Search, then slice to one page.
    pub async fn paginate(
        &self,
        page: usize,
        per_page: usize,
        filter: &ProductFilter,
    ) -> Result<Page<Product>> {
        let products = self.search(filter).await?;
        Ok(paginate(products, page, per_page))
    }

    /// Stock figures over active products.
    pub async fn inventory_stats(&self) -> Result<InventoryStats> {
        let products = self.products.find_all_active().await?;
        Ok(InventoryStats::collect(&products))
    }

    pub async fn create(&self, input: ProductInput, actor: &UserId) -> Result<Product> {
        let product = Product::from_input(input.validate()?);
        self.products.create(&product).await?;
        info!(product_id = %product.id, name = %product.name, "product created");

        self.audit
            .log_action(
                &product.id,
                AuditAction::Create,
                actor,
                json!({
                    "name": product.name,
                    "price": product.price,
                    "quantity": product.quantity,
                }),
            )
            .await
            .inspect_err(|e| warn!(product_id = %product.id, error = %e, "audit append failed"))?;
        Ok(product)
    }

    /// Replace the editable fields. A missing image keeps the current one.
    pub async fn update(&self, id: &str, input: ProductInput, actor: &UserId) -> Result<Product> {
        let input = input.validate()?;
        let before = self.get(id).await?;

        let after = Product {
            name: input.name,
            price: input.price,
            quantity: input.quantity,
            category_id: input.category_id,
            image_url: input.image_url.or_else(|| before.image_url.clone()),
            updated_at: Utc::now(),
            ..before.clone()
        };

        let mut changes = to_document(&after)?;
        for fixed in ["id", "created_at", "is_deleted", "deleted_at"] {
            changes.remove(fixed);
        }
        if !self.products.update(id, changes).await? {
            return Err(CommerceError::ProductNotFound(id.to_string()));
        }
        info!(product_id = %id, "product updated");

        self.audit
            .log_action(
                &after.id,
                AuditAction::Update,
                actor,
                json!({ "before": before, "after": after }),
            )
            .await
            .inspect_err(|e| warn!(product_id = %id, error = %e, "audit append failed"))?;
        Ok(after)
    }

    /// Flag the product as deleted. It stays retrievable and restorable.
    pub async fn soft_delete(&self, id: &str, actor: &UserId) -> Result<()> {
        let product = self.get(id).await?;
        self.products.soft_delete(id).await?;
        info!(product_id = %id, "product soft-deleted");

        self.audit
            .log_action(&product.id, AuditAction::Delete, actor, json!({ "name": product.name }))
            .await
            .inspect_err(|e| warn!(product_id = %id, error = %e, "audit append failed"))?;
        Ok(())
    }

    /// Remove the product row permanently. Its audit history stays.
    pub async fn hard_delete(&self, id: &str, actor: &UserId) -> Result<()> {
        let product = self.get(id).await?;
        self.products.delete(id).await?;
        info!(product_id = %id, "product permanently deleted");

        self.audit
            .log_action(
                &product.id,
                AuditAction::HardDelete,
                actor,
                json!({ "name": product.name }),
            )
            .await
            .inspect_err(|e| warn!(product_id = %id, error = %e, "audit append failed"))?;
        Ok(())
    }

    pub async fn restore(&self, id: &str, actor: &UserId) -> Result<()> {
        let product = self.get(id).await?;
        self.products.restore(id).await?;
        info!(product_id = %id, "product restored");

        self.audit
            .log_action(&product.id, AuditAction::Restore, actor, json!({}))
            .await
            .inspect_err(|e| warn!(product_id = %id, error = %e, "audit append failed"))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::AuditLogEntry;
    use crate::money::Money;
    use crate::repository::AuditLogRepository;
    use stockroom_db::MemoryStore;

    fn input(name: &str, price: i64, quantity: i64, category: Option<&str>) -> ProductInput {
        ProductInput {
            name: name.to_string(),
            price: Money::new(price),
            quantity,
            category_id: category.map(Into::into),
            image_url: None,
        }
    }

    fn setup() -> (ProductService, AuditLogRepository) {
        let store: Arc<dyn Datastore> = Arc::new(MemoryStore::new());
        (
            ProductService::new(Arc::clone(&store)),
            AuditLogRepository::new(store),
        )
    }

    fn actions(entries: &[AuditLogEntry]) -> Vec<AuditAction> {
        let mut actions: Vec<AuditAction> = entries.iter().map(|e| e.action).collect();
        actions.sort();
        actions
    }

    #[tokio::test]
    async fn test_soft_delete_hides_and_restore_shows() {
        let (service, _) = setup();
        let admin = UserId::new("admin");
        let pen = service.create(input("Pen", 150, 10, None), &admin).await.unwrap();

        service.soft_delete(pen.id.as_str(), &admin).await.unwrap();
        assert!(service.list_active().await.unwrap().is_empty());
        assert_eq!(service.list_deleted().await.unwrap().len(), 1);

        let with_deleted = service
            .search(&ProductFilter::default().including_deleted(true))
            .await
            .unwrap();
        assert_eq!(with_deleted.len(), 1);
        assert!(with_deleted[0].is_deleted);
        assert!(with_deleted[0].deleted_at.is_some());

        service.restore(pen.id.as_str(), &admin).await.unwrap();
        let active = service.list_active().await.unwrap();
        assert_eq!(active.len(), 1);
        assert!(!active[0].is_deleted);
        assert!(active[0].deleted_at.is_none());
    }

    #[tokio::test]
    async fn test_every_mutation_is_audited() {
        let (service, logs) = setup();
        let admin = UserId::new("admin");
        let pen = service.create(input("Pen", 150, 10, None), &admin).await.unwrap();
        let id = pen.id.as_str();

        service.update(id, input("Pen", 175, 8, None), &admin).await.unwrap();
        service.soft_delete(id, &admin).await.unwrap();
        service.restore(id, &admin).await.unwrap();
        service.hard_delete(id, &admin).await.unwrap();

        let entries = logs.find_by_product(id).await.unwrap();
        assert_eq!(
            actions(&entries),
            vec![
                AuditAction::Create,
                AuditAction::Update,
                AuditAction::Delete,
                AuditAction::Restore,
                AuditAction::HardDelete,
            ]
        );
        assert!(service.get(id).await.unwrap_err().is_not_found());

        let create = entries.iter().find(|e| e.action == AuditAction::Create).unwrap();
        assert_eq!(create.details, json!({"name": "Pen", "price": 150, "quantity": 10}));
        let update = entries.iter().find(|e| e.action == AuditAction::Update).unwrap();
        assert_eq!(update.details["before"]["price"], 150);
        assert_eq!(update.details["after"]["price"], 175);
        let restore = entries.iter().find(|e| e.action == AuditAction::Restore).unwrap();
        assert_eq!(restore.details, json!({}));
    }

    #[tokio::test]
    async fn test_update_keeps_image_when_none_given() {
        let (service, _) = setup();
        let admin = UserId::new("admin");
        let mut with_image = input("Lamp", 900, 2, None);
        with_image.image_url = Some("/media/products/images/lamp.png".to_string());
        let lamp = service.create(with_image, &admin).await.unwrap();

        let updated = service
            .update(lamp.id.as_str(), input("Desk Lamp", 950, 2, None), &admin)
            .await
            .unwrap();
        assert_eq!(updated.name, "Desk Lamp");
        assert_eq!(updated.image_url.as_deref(), Some("/media/products/images/lamp.png"));
        assert_eq!(updated.created_at, lamp.created_at);

        let stored = service.get(lamp.id.as_str()).await.unwrap();
        assert_eq!(stored, updated);
    }

    #[tokio::test]
    async fn test_search_and_paginate() {
        let (service, _) = setup();
        let admin = UserId::new("admin");
        for i in 0..8 {
            let category = if i % 2 == 0 { "even" } else { "odd" };
            service
                .create(input(&format!("Item {}", i), 100 * (i + 1), i, Some(category)), &admin)
                .await
                .unwrap();
        }

        let evens = service.by_category("even").await.unwrap();
        assert_eq!(evens.len(), 4);

        let filter = ProductFilter::default()
            .category("odd")
            .price_range(Some(Money::new(300)), Some(Money::new(700)));
        let found = service.search(&filter).await.unwrap();
        let mut prices: Vec<i64> = found.iter().map(|p| p.price.amount_minor).collect();
        prices.sort();
        assert_eq!(prices, vec![400, 600]);

        let page = service
            .paginate(2, 6, &ProductFilter::default())
            .await
            .unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.pagination.total_items, 8);
        assert!(page.pagination.has_prev);
        assert!(!page.pagination.has_next);
    }

    #[tokio::test]
    async fn test_inventory_stats() {
        let (service, _) = setup();
        let admin = UserId::new("admin");
        service.create(input("A", 100, 0, None), &admin).await.unwrap();
        service.create(input("B", 200, 3, None), &admin).await.unwrap();
        service.create(input("C", 300, 10, None), &admin).await.unwrap();
        let gone = service.create(input("D", 400, 10, None), &admin).await.unwrap();
        service.soft_delete(gone.id.as_str(), &admin).await.unwrap();

        let stats = service.inventory_stats().await.unwrap();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.out_of_stock, 1);
        assert_eq!(stats.low_stock, 1);
        assert_eq!(stats.in_stock, 1);
        assert_eq!(stats.total_value, Money::new(600 + 3000));
    }

    #[tokio::test]
    async fn test_missing_product_operations_fail() {
        let (service, logs) = setup();
        let admin = UserId::new("admin");
        assert!(matches!(
            service.soft_delete("nope", &admin).await,
            Err(CommerceError::ProductNotFound(_))
        ));
        assert!(matches!(
            service.update("nope", input("X", 1, 1, None), &admin).await,
            Err(CommerceError::ProductNotFound(_))
        ));
        assert!(logs.find_all_sorted().await.unwrap().is_empty());
    }
}
