use crate::catalog::Product;
use crate::error::Result;
use crate::search::ProductFilter;
use chrono::Utc;
use std::sync::Arc;
use stockroom_db::{patch, Datastore, Document, Filter, Records, Table};

/// Product table access.
#[derive(Clone, Debug)]
pub struct ProductRepository {
    records: Records<Product>,
}

impl ProductRepository {
    pub fn new(store: Arc<dyn Datastore>) -> Self {
        Self {
            records: Records::new(store, Table::Products),
        }
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Product>> {
        Ok(self.records.find(id).await?)
    }

    /// Products that are not soft-deleted.
    pub async fn find_all_active(&self) -> Result<Vec<Product>> {
        Ok(self.records.scan(&Filter::all().not_true("is_deleted")).await?)
    }

    pub async fn find_all_including_deleted(&self) -> Result<Vec<Product>> {
        Ok(self.records.all().await?)
    }

    pub async fn find_deleted(&self) -> Result<Vec<Product>> {
        Ok(self.records.scan(&Filter::all().is_true("is_deleted")).await?)
    }

    /// Active products in a category.
    pub async fn find_by_category(&self, category_id: &str) -> Result<Vec<Product>> {
        let filter = Filter::all()
            .not_true("is_deleted")
            .eq("category_id", category_id);
        Ok(self.records.scan(&filter).await?)
    }

    pub async fn search(&self, filter: &ProductFilter) -> Result<Vec<Product>> {
        Ok(self.records.scan(&filter.to_filter()).await?)
    }

    pub async fn create(&self, product: &Product) -> Result<()> {
        Ok(self.records.put(product).await?)
    }

    /// Merge changed fields. Returns whether the product existed.
    pub async fn update(&self, id: &str, changes: Document) -> Result<bool> {
        Ok(self.records.patch(id, changes).await?)
    }

    pub async fn soft_delete(&self, id: &str) -> Result<bool> {
        let now = Utc::now();
        self.update(
            id,
            patch! { "is_deleted" => true, "deleted_at" => now, "updated_at" => now },
        )
        .await
    }

    pub async fn restore(&self, id: &str) -> Result<bool> {
        self.update(
            id,
            patch! { "is_deleted" => false, "deleted_at" => None::<String>, "updated_at" => Utc::now() },
        )
        .await
    }

    /// Remove the row permanently.
    pub async fn delete(&self, id: &str) -> Result<bool> {
        Ok(self.records.delete(id).await?)
    }
}
