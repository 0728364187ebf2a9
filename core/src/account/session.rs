use super::User;
use crate::storage::{Storage, CF_SESSIONS};
use crate::Result;
use chrono::{DateTime, Duration, Utc};
use rand::distr::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

const TOKEN_LEN: usize = 48;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

fn new_token() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LEN)
        .map(char::from)
        .collect()
}

pub struct SessionStore {
    storage: Arc<Storage>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(storage: Arc<Storage>, ttl: Duration) -> Self {
        Self { storage, ttl }
    }

    pub fn issue(&self, user: &User) -> Result<Session> {
        let now = Utc::now();
        let session = Session {
            token: new_token(),
            user_id: user.id.clone(),
            created_at: now,
            expires_at: now + self.ttl,
        };
        self.storage.put(CF_SESSIONS, &session.token, &session)?;
        Ok(session)
    }

    pub fn validate(&self, token: &str) -> Result<Option<Session>> {
        self.validate_at(token, Utc::now())
    }

    pub fn validate_at(&self, token: &str, now: DateTime<Utc>) -> Result<Option<Session>> {
        if token.is_empty() {
            return Ok(None);
        }
        let Some(session) = self.storage.get::<Session>(CF_SESSIONS, token)? else {
            return Ok(None);
        };
        if session.is_expired_at(now) {
            debug!(target: "account", user_id = %session.user_id, "Expired session dropped");
            self.storage.delete(CF_SESSIONS, token)?;
            return Ok(None);
        }
        Ok(Some(session))
    }

    /// Remove every session of `user_id`
    pub fn revoke_user(&self, user_id: &str) -> Result<usize> {
        let mut revoked = 0;
        for (token, session) in self.storage.scan::<Session>(CF_SESSIONS)? {
            if session.user_id == user_id {
                self.storage.delete(CF_SESSIONS, &token)?;
                revoked += 1;
            }
        }
        debug!(target: "account", user_id = %user_id, revoked, "Sessions revoked");
        Ok(revoked)
    }
}
