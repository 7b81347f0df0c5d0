//! Audit log records.

use crate::ids::{AuditLogId, ProductId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use stockroom_db::de;

/// What happened to a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
    Restore,
    HardDelete,
}

impl AuditAction {
    pub const ALL: [AuditAction; 5] = [
        AuditAction::Create,
        AuditAction::Update,
        AuditAction::Delete,
        AuditAction::Restore,
        AuditAction::HardDelete,
    ];

    /// The stored tag (e.g., "HARD_DELETE").
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Create => "CREATE",
            AuditAction::Update => "UPDATE",
            AuditAction::Delete => "DELETE",
            AuditAction::Restore => "RESTORE",
            AuditAction::HardDelete => "HARD_DELETE",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            AuditAction::Create => "Created",
            AuditAction::Update => "Updated",
            AuditAction::Delete => "Deleted",
            AuditAction::Restore => "Restored",
            AuditAction::HardDelete => "Permanently deleted",
        }
    }

    /// CSS class hint for views.
    pub fn css_class(&self) -> &'static str {
        match self {
            AuditAction::Create => "success",
            AuditAction::Update => "warning",
            AuditAction::Delete => "danger",
            AuditAction::Restore => "info",
            AuditAction::HardDelete => "dark",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuditAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim().to_uppercase().replace('-', "_");
        AuditAction::ALL
            .into_iter()
            .find(|action| action.as_str() == tag)
            .ok_or_else(|| format!("unknown audit action '{}'", s))
    }
}

/// An append-only audit record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuditLogEntry {
    pub id: AuditLogId,
    pub product_id: ProductId,
    pub action: AuditAction,
    pub user_id: UserId,
    /// Free-form JSON. Stored as text by the relational backend.
    #[serde(default, deserialize_with = "de::json_blob")]
    pub details: serde_json::Value,
    pub time: DateTime<Utc>,
}

impl AuditLogEntry {
    /// Stamp a new entry with the current time.
    pub fn new(
        product_id: ProductId,
        action: AuditAction,
        user_id: UserId,
        details: serde_json::Value,
    ) -> Self {
        Self {
            id: AuditLogId::generate(),
            product_id,
            action,
            user_id,
            details,
            time: Utc::now(),
        }
    }
}

/// An entry with display names resolved.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnrichedLogEntry {
    #[serde(flatten)]
    pub entry: AuditLogEntry,
    /// Acting user's name, or "Unknown".
    pub username: String,
    /// Product name, or "(deleted)".
    pub product_name: String,
}

/// Counts over the whole audit log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AuditStats {
    pub total: usize,
    /// Every action is present, including those with zero entries.
    pub by_action: BTreeMap<AuditAction, usize>,
    /// The ten newest entries.
    pub recent: Vec<AuditLogEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_tags() {
        assert_eq!(
            serde_json::to_value(AuditAction::HardDelete).unwrap(),
            serde_json::json!("HARD_DELETE")
        );
        assert_eq!("hard-delete".parse::<AuditAction>(), Ok(AuditAction::HardDelete));
        assert_eq!("UPDATE".parse::<AuditAction>(), Ok(AuditAction::Update));
        assert!("PURGE".parse::<AuditAction>().is_err());
    }

    #[test]
    fn test_entry_reads_text_details() {
        let json = serde_json::json!({
            "id": "l1",
            "product_id": "p1",
            "action": "CREATE",
            "user_id": "u1",
            "details": "{\"name\":\"Pen\"}",
            "time": "2026-03-01T08:00:00Z"
        });
        let entry: AuditLogEntry = serde_json::from_value(json).unwrap();
        assert_eq!(entry.action, AuditAction::Create);
        assert_eq!(entry.details["name"], "Pen");
    }
}
