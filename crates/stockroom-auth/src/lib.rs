//! Authentication for Stockroom.
//!
//! Provides user accounts, Argon2 password hashing, role checks and
//! cookie-keyed login sessions.

mod error;
mod password;
mod repository;
mod service;
mod session;
mod user;

pub use error::{AuthError, Result};
pub use password::{PasswordHasher, MIN_PASSWORD_LEN};
pub use repository::UserRepository;
pub use service::UserService;
pub use session::{AuthSessions, SessionUser};
pub use user::{PublicUser, Registration, Role, UserAccount, UserInput, MIN_USERNAME_LEN};
