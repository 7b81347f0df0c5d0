use crate::error::Result;
use crate::user::UserAccount;
use std::sync::Arc;
use stockroom_db::{Datastore, Document, Filter, Records, Table};

/// User table access.
#[derive(Clone, Debug)]
pub struct UserRepository {
    records: Records<UserAccount>,
}

impl UserRepository {
    pub fn new(store: Arc<dyn Datastore>) -> Self {
        Self {
            records: Records::new(store, Table::Users),
        }
    }

    pub async fn find_all(&self) -> Result<Vec<UserAccount>> {
        Ok(self.records.all().await?)
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<UserAccount>> {
        Ok(self.records.find(id).await?)
    }

    /// First user with this exact username.
    pub async fn find_by_username(&self, username: &str) -> Result<Option<UserAccount>> {
        Ok(self
            .records
            .scan(&Filter::all().eq("username", username))
            .await?
            .into_iter()
            .next())
    }

    pub async fn save(&self, account: &UserAccount) -> Result<()> {
        Ok(self.records.put(account).await?)
    }

    pub async fn patch(&self, id: &str, patch: Document) -> Result<bool> {
        Ok(self.records.patch(id, patch).await?)
    }

    pub async fn delete(&self, id: &str) -> Result<bool> {
        Ok(self.records.delete(id).await?)
    }
}
