use crate::catalog::{Category, CategoryInput};
use crate::error::{CommerceError, Result};
use crate::repository::CategoryRepository;
use std::sync::Arc;
use stockroom_db::Datastore;
use tracing::info;

/// Category management. Deleting a category leaves products untouched.
#[derive(Clone, Debug)]
pub struct CategoryService {
    categories: CategoryRepository,
}

impl CategoryService {
    pub fn new(store: Arc<dyn Datastore>) -> Self {
        Self {
            categories: CategoryRepository::new(store),
        }
    }

    /// All categories by name.
    pub async fn list(&self) -> Result<Vec<Category>> {
        let mut categories = self.categories.find_all().await?;
        categories.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(categories)
    }

    pub async fn get(&self, id: &str) -> Result<Category> {
        self.categories
            .find_by_id(id)
            .await?
            .ok_or_else(|| CommerceError::CategoryNotFound(id.to_string()))
    }

    pub async fn create(&self, input: CategoryInput) -> Result<Category> {
        let input = input.validate()?;
        let category = Category::new(input.name, input.description);
        self.categories.save(&category).await?;
        info!(category_id = %category.id, "category created");
        Ok(category)
    }

    pub async fn update(&self, id: &str, input: CategoryInput) -> Result<Category> {
        let input = input.validate()?;
        let mut category = self.get(id).await?;
        category.name = input.name;
        category.description = input.description;
        self.categories.save(&category).await?;
        Ok(category)
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        if !self.categories.delete(id).await? {
            return Err(CommerceError::CategoryNotFound(id.to_string()));
        }
        info!(category_id = %id, "category deleted");
        Ok(())
    }
}
