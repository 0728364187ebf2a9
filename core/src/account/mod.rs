//! User accounts: profiles, password hashes and bearer-token sessions.

mod password;
mod session;
mod user;

pub use password::{PasswordRecord, PasswordStore};
pub use session::{Session, SessionStore};
pub use user::{NewUser, User, UserStore};

use crate::storage::Storage;
use crate::{CasaError, Result};
use chrono::Duration;
use std::sync::Arc;
use tracing::{debug, info};

/// Registration and login on top of the three account stores
pub struct Accounts {
    pub users: UserStore,
    pub passwords: PasswordStore,
    pub sessions: SessionStore,
}

impl Accounts {
    pub fn new(storage: Arc<Storage>, session_ttl: Duration) -> Self {
        Self {
            users: UserStore::new(storage.clone()),
            passwords: PasswordStore::new(storage.clone()),
            sessions: SessionStore::new(storage, session_ttl),
        }
    }

    /// Create or update a user; a password in the payload replaces the stored hash.
    ///
    /// The password is hashed before anything is written, so a hashing
    /// failure leaves the stores untouched.
    pub async fn register(&self, mut new_user: NewUser) -> Result<User> {
        let hash = match new_user.password.take() {
            Some(plain) if plain.is_empty() => {
                return Err(CasaError::Validation("password must not be empty".into()));
            }
            Some(plain) => Some(self.passwords.hash(&plain).await?),
            None => None,
        };

        let user = self.users.create_or_update(new_user)?;

        if let Some(hash) = hash {
            self.passwords.set(&user.id, hash)?;
            debug!(target: "account", user_id = %user.id, "Password stored");
        }

        info!(target: "account", user_id = %user.id, name = %user.name, "User registered");
        Ok(user)
    }

    /// Exchange login (name or email) and password for a session.
    ///
    /// Unknown logins and wrong passwords fail the same way.
    pub async fn authenticate(&self, login: &str, password: &str) -> Result<Session> {
        let user = self
            .users
            .find_by_login(login)?
            .ok_or(CasaError::Unauthorized)?;

        if !self.passwords.verify(&user.id, password).await {
            debug!(target: "account", user_id = %user.id, "Password rejected");
            return Err(CasaError::Unauthorized);
        }

        let session = self.sessions.issue(&user)?;
        info!(target: "account", user_id = %user.id, "User authenticated");
        Ok(session)
    }

    pub fn logout(&self, user_id: &str) -> Result<usize> {
        self.sessions.revoke_user(user_id)
    }
}
