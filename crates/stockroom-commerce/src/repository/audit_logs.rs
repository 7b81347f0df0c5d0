use crate::audit::{AuditAction, AuditLogEntry};
use crate::error::Result;
use std::sync::Arc;
use stockroom_db::{Datastore, Filter, Records, Table};

/// Audit log table access. Entries are only ever appended.
#[derive(Clone, Debug)]
pub struct AuditLogRepository {
    records: Records<AuditLogEntry>,
}

impl AuditLogRepository {
    pub fn new(store: Arc<dyn Datastore>) -> Self {
        Self {
            records: Records::new(store, Table::AuditLogs),
        }
    }

    pub async fn append(&self, entry: &AuditLogEntry) -> Result<()> {
        Ok(self.records.put(entry).await?)
    }

    /// Every entry, newest first.
    pub async fn find_all_sorted(&self) -> Result<Vec<AuditLogEntry>> {
        self.sorted(Filter::all()).await
    }

    pub async fn find_by_product(&self, product_id: &str) -> Result<Vec<AuditLogEntry>> {
        self.sorted(Filter::all().eq("product_id", product_id)).await
    }

    pub async fn find_by_user(&self, user_id: &str) -> Result<Vec<AuditLogEntry>> {
        self.sorted(Filter::all().eq("user_id", user_id)).await
    }

    pub async fn find_by_action(&self, action: AuditAction) -> Result<Vec<AuditLogEntry>> {
        self.sorted(Filter::all().eq("action", action.as_str())).await
    }

    async fn sorted(&self, filter: Filter) -> Result<Vec<AuditLogEntry>> {
        let mut entries = self.records.scan(&filter).await?;
        entries.sort_by(|a, b| b.time.cmp(&a.time));
        Ok(entries)
    }
}
