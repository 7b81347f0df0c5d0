//! Product search criteria.

use crate::ids::CategoryId;
use crate::money::Money;
use serde::{Deserialize, Serialize};
use stockroom_db::Filter;

/// Criteria for the product listing. Soft-deleted products are excluded
/// unless `include_deleted` is set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ProductFilter {
    /// Restrict to one category.
    pub category_id: Option<CategoryId>,
    /// Lowest price, inclusive.
    pub min_price: Option<Money>,
    /// Highest price, inclusive.
    pub max_price: Option<Money>,
    /// Case-sensitive substring of the product name.
    pub search: Option<String>,
    /// Also match soft-deleted products.
    #[serde(default)]
    pub include_deleted: bool,
}

impl ProductFilter {
    /// Restrict to a category.
    pub fn category(mut self, id: impl Into<CategoryId>) -> Self {
        self.category_id = Some(id.into());
        self
    }

    /// Restrict to a price range; either bound may be open.
    pub fn price_range(mut self, min: Option<Money>, max: Option<Money>) -> Self {
        self.min_price = min;
        self.max_price = max;
        self
    }

    /// Restrict to names containing `term`.
    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    /// Also match soft-deleted products.
    pub fn including_deleted(mut self, include: bool) -> Self {
        self.include_deleted = include;
        self
    }

    /// Drop blank criteria.
    pub fn normalized(mut self) -> Self {
        self.category_id = self.category_id.filter(|id| !id.as_str().trim().is_empty());
        self.search = self
            .search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        self
    }

    /// Check if no narrowing criteria are set.
    pub fn is_empty(&self) -> bool {
        self.category_id.is_none()
            && self.min_price.is_none()
            && self.max_price.is_none()
            && self.search.is_none()
    }

    /// Render as a datastore filter.
    pub fn to_filter(&self) -> Filter {
        let mut filter = if self.include_deleted {
            Filter::all()
        } else {
            Filter::all().not_true("is_deleted")
        };
        if let Some(category) = &self.category_id {
            filter = filter.eq("category_id", category.as_str());
        }
        if let Some(min) = self.min_price {
            filter = filter.gte("price", min.as_f64());
        }
        if let Some(max) = self.max_price {
            filter = filter.lte("price", max.as_f64());
        }
        if let Some(term) = &self.search {
            filter = filter.contains("name", term.clone());
        }
        filter
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_drops_blanks() {
        let filter = ProductFilter::default()
            .category("")
            .search("   ")
            .normalized();
        assert!(filter.is_empty());
    }

    #[test]
    fn test_to_filter_excludes_deleted_by_default() {
        let filter = ProductFilter::default().to_filter();
        assert_eq!(filter.conditions().len(), 1);
        assert!(ProductFilter::default()
            .including_deleted(true)
            .to_filter()
            .is_empty());

        let filter = ProductFilter::default()
            .category("c1")
            .price_range(Some(Money::new(100)), None)
            .search("pen")
            .to_filter();
        assert_eq!(filter.conditions().len(), 4);
    }
}
