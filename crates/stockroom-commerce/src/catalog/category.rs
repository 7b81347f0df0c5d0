//! Product categories.

use crate::error::{CommerceError, Result};
use crate::ids::CategoryId;
use serde::{Deserialize, Serialize};

/// A flat product category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl Category {
    /// Create a new category with a generated id.
    pub fn new(name: impl Into<String>, description: Option<String>) -> Self {
        Self {
            id: CategoryId::generate(),
            name: name.into(),
            description,
        }
    }
}

/// Fields an admin supplies for a category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct CategoryInput {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl CategoryInput {
    /// Trim and check the input.
    pub fn validate(self) -> Result<Self> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(CommerceError::ValidationError(
                "category name is required".to_string(),
            ));
        }
        let description = self
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());
        Ok(Self { name, description })
    }
}
