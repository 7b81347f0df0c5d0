//! User management and login.

use crate::error::{AuthError, Result};
use crate::password::PasswordHasher;
use crate::repository::UserRepository;
use crate::session::SessionUser;
use crate::user::{PublicUser, Registration, Role, UserAccount, UserInput};
use std::sync::Arc;
use stockroom_commerce::ids::UserId;
use stockroom_db::{patch, Datastore};
use tracing::{info, warn};

/// Accounts, passwords and the admin user screens.
#[derive(Clone, Debug)]
pub struct UserService {
    users: UserRepository,
    hasher: PasswordHasher,
}

impl UserService {
    pub fn new(store: Arc<dyn Datastore>, hasher: PasswordHasher) -> Self {
        Self {
            users: UserRepository::new(store),
            hasher,
        }
    }

    /// Every user, by username. Hashes are never included.
    pub async fn list(&self) -> Result<Vec<PublicUser>> {
        let mut users: Vec<PublicUser> = self
            .users
            .find_all()
            .await?
            .iter()
            .map(UserAccount::public)
            .collect();
        users.sort_by_key(|u| u.username.to_lowercase());
        Ok(users)
    }

    pub async fn get(&self, id: &UserId) -> Result<PublicUser> {
        self.users
            .find_by_id(id.as_str())
            .await?
            .map(|u| u.public())
            .ok_or_else(|| AuthError::UnknownUser(id.to_string()))
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<PublicUser>> {
        Ok(self
            .users
            .find_by_username(username)
            .await?
            .map(|u| u.public()))
    }

    /// Admin-created account with any role.
    pub async fn create(&self, input: &UserInput) -> Result<PublicUser> {
        input.validate(true)?;
        let account = self
            .insert(input.username.trim(), &input.password, input.role)
            .await?;
        Ok(account.public())
    }

    /// Change username and role, and the password if a new one is given.
    pub async fn update(&self, id: &UserId, input: &UserInput) -> Result<PublicUser> {
        input.validate(false)?;
        let username = input.username.trim();

        let current = self
            .users
            .find_by_id(id.as_str())
            .await?
            .ok_or_else(|| AuthError::UnknownUser(id.to_string()))?;
        if current.username != username {
            self.ensure_username_free(username).await?;
        }

        let mut changes = patch! { "username" => username, "role" => input.role };
        if let Some(password) = input.new_password() {
            changes.insert(
                "password_hash".to_string(),
                self.hash_password(password).await?.into(),
            );
        }
        if !self.users.patch(id.as_str(), changes).await? {
            return Err(AuthError::UnknownUser(id.to_string()));
        }
        info!(user = %username, role = %input.role, "user updated");

        Ok(PublicUser {
            username: username.to_string(),
            role: input.role,
            ..current.public()
        })
    }

    /// Delete an account. `actor` may not delete themselves.
    pub async fn delete(&self, id: &UserId, actor: &UserId) -> Result<()> {
        if id == actor {
            return Err(AuthError::CannotDeleteSelf);
        }
        if !self.users.delete(id.as_str()).await? {
            return Err(AuthError::UnknownUser(id.to_string()));
        }
        info!(user_id = %id, by = %actor, "user deleted");
        Ok(())
    }

    /// Check a username and password.
    ///
    /// An unknown username and a wrong password are reported separately.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<SessionUser> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(AuthError::Validation(
                "Username and password are required".to_string(),
            ));
        }
        let account = self
            .users
            .find_by_username(username)
            .await?
            .ok_or_else(|| AuthError::UnknownUser(username.to_string()))?;

        if !self.verify_password(password, &account.password_hash).await? {
            warn!(user = %username, "wrong password");
            return Err(AuthError::InvalidCredentials);
        }
        Ok(SessionUser::from(&account))
    }

    /// Self-service sign-up. New accounts are always customers.
    pub async fn register(&self, form: &Registration) -> Result<PublicUser> {
        form.validate()?;
        let account = self
            .insert(form.username.trim(), &form.password, Role::Customer)
            .await?;
        Ok(account.public())
    }

    /// Create the account unless the username is taken. Returns whether it was created.
    pub async fn ensure_user(&self, username: &str, password: &str, role: Role) -> Result<bool> {
        if self.users.find_by_username(username).await?.is_some() {
            return Ok(false);
        }
        self.insert(username, password, role).await?;
        Ok(true)
    }

    async fn insert(&self, username: &str, password: &str, role: Role) -> Result<UserAccount> {
        self.ensure_username_free(username).await?;
        let account = UserAccount::new(username, self.hash_password(password).await?, role);
        self.users.save(&account).await?;
        info!(user = %username, role = %role, "user created");
        Ok(account)
    }

    async fn ensure_username_free(&self, username: &str) -> Result<()> {
        if self.users.find_by_username(username).await?.is_some() {
            return Err(AuthError::DuplicateUser(username.to_string()));
        }
        Ok(())
    }

    // Argon2 is CPU-bound; keep it off the async workers.
    async fn hash_password(&self, password: &str) -> Result<String> {
        let hasher = self.hasher.clone();
        let password = password.to_string();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AuthError::Hash(e.to_string()))?
    }

    async fn verify_password(&self, password: &str, hash: &str) -> Result<bool> {
        let hasher = self.hasher.clone();
        let password = password.to_string();
        let hash = hash.to_string();
        tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|e| AuthError::Hash(e.to_string()))?
    }
}
