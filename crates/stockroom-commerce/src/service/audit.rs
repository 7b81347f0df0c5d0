//! Audit trail service.

use crate::audit::{AuditAction, AuditLogEntry, AuditStats, EnrichedLogEntry};
use crate::error::Result;
use crate::ids::{ProductId, UserId};
use crate::repository::{AuditLogRepository, ProductRepository};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use stockroom_db::{Datastore, Records, Table};
use tracing::debug;

/// Number of entries in [`AuditStats::recent`].
pub const RECENT_LOG_LIMIT: usize = 10;

const UNKNOWN_USER: &str = "Unknown";
const DELETED_PRODUCT: &str = "(deleted)";

/// The slice of a user row the audit views need.
#[derive(Debug, Serialize, Deserialize)]
struct UserName {
    id: String,
    username: String,
}

/// Records product mutations and reads them back with display names.
#[derive(Clone, Debug)]
pub struct AuditService {
    logs: AuditLogRepository,
    products: ProductRepository,
    users: Records<UserName>,
}

impl AuditService {
    pub fn new(store: Arc<dyn Datastore>) -> Self {
        Self {
            logs: AuditLogRepository::new(Arc::clone(&store)),
            products: ProductRepository::new(Arc::clone(&store)),
            users: Records::new(store, Table::Users),
        }
    }

    /// Append an entry.
    pub async fn log_action(
        &self,
        product_id: &ProductId,
        action: AuditAction,
        user_id: &UserId,
        details: serde_json::Value,
    ) -> Result<AuditLogEntry> {
        let entry = AuditLogEntry::new(product_id.clone(), action, user_id.clone(), details);
        self.logs.append(&entry).await?;
        debug!(product_id = %product_id, action = %action, user_id = %user_id, "audit entry appended");
        Ok(entry)
    }

    /// Every entry, newest first.
    pub async fn all(&self) -> Result<Vec<EnrichedLogEntry>> {
        let entries = self.logs.find_all_sorted().await?;
        self.enrich(entries).await
    }

    pub async fn by_product(&self, product_id: &str) -> Result<Vec<EnrichedLogEntry>> {
        let entries = self.logs.find_by_product(product_id).await?;
        self.enrich(entries).await
    }

    pub async fn by_user(&self, user_id: &str) -> Result<Vec<EnrichedLogEntry>> {
        let entries = self.logs.find_by_user(user_id).await?;
        self.enrich(entries).await
    }

    pub async fn by_action(&self, action: AuditAction) -> Result<Vec<EnrichedLogEntry>> {
        let entries = self.logs.find_by_action(action).await?;
        self.enrich(entries).await
    }

    /// Totals per action and the most recent entries.
    pub async fn stats(&self) -> Result<AuditStats> {
        let entries = self.logs.find_all_sorted().await?;
        let mut by_action: std::collections::BTreeMap<AuditAction, usize> =
            AuditAction::ALL.into_iter().map(|a| (a, 0)).collect();
        for entry in &entries {
            *by_action.entry(entry.action).or_default() += 1;
        }
        Ok(AuditStats {
            total: entries.len(),
            by_action,
            recent: entries.into_iter().take(RECENT_LOG_LIMIT).collect(),
        })
    }

    async fn enrich(&self, entries: Vec<AuditLogEntry>) -> Result<Vec<EnrichedLogEntry>> {
        let mut usernames: HashMap<UserId, String> = HashMap::new();
        let mut product_names: HashMap<ProductId, String> = HashMap::new();
        let mut enriched = Vec::with_capacity(entries.len());

        for entry in entries {
            if !usernames.contains_key(&entry.user_id) {
                let name = self
                    .users
                    .find(entry.user_id.as_str())
                    .await
                    .ok()
                    .flatten()
                    .map(|u| u.username)
                    .unwrap_or_else(|| UNKNOWN_USER.to_string());
                usernames.insert(entry.user_id.clone(), name);
            }
            if !product_names.contains_key(&entry.product_id) {
                let name = self
                    .products
                    .find_by_id(entry.product_id.as_str())
                    .await
                    .ok()
                    .flatten()
                    .map(|p| p.name)
                    .unwrap_or_else(|| DELETED_PRODUCT.to_string());
                product_names.insert(entry.product_id.clone(), name);
            }

            let username = usernames
                .get(&entry.user_id)
                .cloned()
                .unwrap_or_else(|| UNKNOWN_USER.to_string());
            let product_name = product_names
                .get(&entry.product_id)
                .cloned()
                .unwrap_or_else(|| DELETED_PRODUCT.to_string());
            enriched.push(EnrichedLogEntry {
                entry,
                username,
                product_name,
            });
        }
        Ok(enriched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use stockroom_db::MemoryStore;

    #[tokio::test]
    async fn test_enrich_falls_back_for_missing_rows() {
        let store: Arc<dyn Datastore> = Arc::new(MemoryStore::new());
        let audit = AuditService::new(Arc::clone(&store));
        Records::<UserName>::new(Arc::clone(&store), Table::Users)
            .put(&UserName {
                id: "u1".to_string(),
                username: "admin".to_string(),
            })
            .await
            .unwrap();

        audit
            .log_action(&ProductId::new("gone"), AuditAction::HardDelete, &UserId::new("u1"), json!({"name": "Pen"}))
            .await
            .unwrap();
        audit
            .log_action(&ProductId::new("gone"), AuditAction::Create, &UserId::new("ghost"), json!({}))
            .await
            .unwrap();

        let logs = audit.by_product("gone").await.unwrap();
        assert_eq!(logs.len(), 2);
        assert!(logs.iter().all(|l| l.product_name == "(deleted)"));
        let names: Vec<&str> = logs.iter().map(|l| l.username.as_str()).collect();
        assert!(names.contains(&"admin"));
        assert!(names.contains(&"Unknown"));
    }

    #[tokio::test]
    async fn test_stats_counts_every_action() {
        let store: Arc<dyn Datastore> = Arc::new(MemoryStore::new());
        let audit = AuditService::new(store);
        let user = UserId::new("u1");
        for i in 0..12 {
            let action = if i % 2 == 0 { AuditAction::Create } else { AuditAction::Update };
            audit
                .log_action(&ProductId::new(format!("p{}", i)), action, &user, json!({}))
                .await
                .unwrap();
        }

        let stats = audit.stats().await.unwrap();
        assert_eq!(stats.total, 12);
        assert_eq!(stats.by_action[&AuditAction::Create], 6);
        assert_eq!(stats.by_action[&AuditAction::Update], 6);
        assert_eq!(stats.by_action[&AuditAction::HardDelete], 0);
        assert_eq!(stats.recent.len(), RECENT_LOG_LIMIT);
        assert!(stats.recent.windows(2).all(|w| w[0].time >= w[1].time));
    }
}
