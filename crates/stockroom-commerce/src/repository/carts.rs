use crate::cart::CartItem;
use crate::error::Result;
use chrono::Utc;
use std::sync::Arc;
use stockroom_db::{patch, Datastore, Filter, Records, Table};

/// Cart line table access.
#[derive(Clone, Debug)]
pub struct CartRepository {
    records: Records<CartItem>,
}

impl CartRepository {
    pub fn new(store: Arc<dyn Datastore>) -> Self {
        Self {
            records: Records::new(store, Table::Carts),
        }
    }

    /// All lines of one user.
    pub async fn find_by_user(&self, user_id: &str) -> Result<Vec<CartItem>> {
        Ok(self
            .records
            .scan(&Filter::all().eq("user_id", user_id))
            .await?)
    }

    /// The line for a (user, product) pair, if any.
    pub async fn find_line(&self, user_id: &str, product_id: &str) -> Result<Option<CartItem>> {
        let filter = Filter::all()
            .eq("user_id", user_id)
            .eq("product_id", product_id);
        Ok(self.records.scan(&filter).await?.into_iter().next())
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<CartItem>> {
        Ok(self.records.find(id).await?)
    }

    pub async fn create(&self, item: &CartItem) -> Result<()> {
        Ok(self.records.put(item).await?)
    }

    /// Overwrite a line's quantity and touch `updated_at`.
    pub async fn set_quantity(&self, id: &str, quantity: i64) -> Result<bool> {
        Ok(self
            .records
            .patch(id, patch! { "quantity" => quantity, "updated_at" => Utc::now() })
            .await?)
    }

    pub async fn delete(&self, id: &str) -> Result<bool> {
        Ok(self.records.delete(id).await?)
    }

    /// Delete every line of a user. Returns how many were removed.
    pub async fn clear(&self, user_id: &str) -> Result<usize> {
        let mut removed = 0;
        for item in self.find_by_user(user_id).await? {
            if self.records.delete(item.id.as_str()).await? {
                removed += 1;
            }
        }
        Ok(removed)
    }
}
