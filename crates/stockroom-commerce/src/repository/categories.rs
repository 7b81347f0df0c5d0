use crate::catalog::Category;
use crate::error::Result;
use std::sync::Arc;
use stockroom_db::{Datastore, Records, Table};

/// Category table access.
#[derive(Clone, Debug)]
pub struct CategoryRepository {
    records: Records<Category>,
}

impl CategoryRepository {
    pub fn new(store: Arc<dyn Datastore>) -> Self {
        Self {
            records: Records::new(store, Table::Categories),
        }
    }

    pub async fn find_all(&self) -> Result<Vec<Category>> {
        Ok(self.records.all().await?)
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Category>> {
        Ok(self.records.find(id).await?)
    }

    /// Insert or replace.
    pub async fn save(&self, category: &Category) -> Result<()> {
        Ok(self.records.put(category).await?)
    }

    pub async fn delete(&self, id: &str) -> Result<bool> {
        Ok(self.records.delete(id).await?)
    }
}
