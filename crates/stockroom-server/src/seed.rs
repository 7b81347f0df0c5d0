//! Demo data: the two staff accounts plus a small sample catalog.

use serde::Serialize;
use stockroom_auth::Role;
use stockroom_commerce::catalog::{CategoryInput, ProductInput};
use stockroom_commerce::{CategoryId, Money, UserId};
use tracing::info;

use crate::state::AppState;

/// Built-in accounts as `(username, password, role)`.
pub const DEFAULT_USERS: [(&str, &str, Role); 2] = [
    ("admin", "admin123", Role::Admin),
    ("staff", "staff123", Role::Staff),
];

const SAMPLE_CATEGORIES: [(&str, &str); 4] = [
    ("Electronics", "Phones, laptops and accessories"),
    ("Fashion", "Clothing and footwear"),
    ("Home", "Kitchen and household goods"),
    ("Food", "Groceries and snacks"),
];

/// `(name, price in minor units, quantity, category name)`.
const SAMPLE_PRODUCTS: [(&str, i64, i64, &str); 5] = [
    ("iPhone 15 Pro Max", 119_900, 50, "Electronics"),
    ("MacBook Air M3", 109_900, 30, "Electronics"),
    ("Basic T-shirt", 1_999, 100, "Fashion"),
    ("White sneakers", 8_900, 3, "Fashion"),
    ("Smart rice cooker", 12_900, 0, "Home"),
];

/// What a seed run added.
#[derive(Debug, Default, Serialize)]
pub struct SeedReport {
    pub users: Vec<String>,
    pub categories: Vec<String>,
    pub products: Vec<String>,
}

impl SeedReport {
    pub fn is_empty(&self) -> bool {
        self.users.is_empty() && self.categories.is_empty() && self.products.is_empty()
    }
}

/// Insert the default accounts if absent, and the sample catalog if the
/// store has no categories and no products yet.
pub async fn seed(state: &AppState) -> anyhow::Result<SeedReport> {
    let mut report = SeedReport::default();

    for (username, password, role) in DEFAULT_USERS {
        if state.users.ensure_user(username, password, role).await? {
            report.users.push(username.to_string());
        }
    }

    let mut categories = state.categories.list().await?;
    if categories.is_empty() {
        for (name, description) in SAMPLE_CATEGORIES {
            let category = state
                .categories
                .create(CategoryInput {
                    name: name.to_string(),
                    description: Some(description.to_string()),
                })
                .await?;
            report.categories.push(category.name.clone());
            categories.push(category);
        }
    }

    if state.products.list_all().await?.is_empty() {
        let actor = match state.users.find_by_username("admin").await? {
            Some(admin) => admin.id,
            None => UserId::new("system"),
        };
        for (name, price, quantity, category) in SAMPLE_PRODUCTS {
            let category_id: Option<CategoryId> = categories
                .iter()
                .find(|c| c.name == category)
                .map(|c| c.id.clone());
            let input = ProductInput {
                name: name.to_string(),
                price: Money::new(price),
                quantity,
                category_id,
                image_url: None,
            };
            let product = state.products.create(input, &actor).await?;
            report.products.push(product.name);
        }
    }

    info!(
        users = report.users.len(),
        categories = report.categories.len(),
        products = report.products.len(),
        "seed finished"
    );
    Ok(report)
}
