use crate::storage::{Storage, CF_PASSWORDS};
use crate::{CasaError, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

const BCRYPT_COST: u32 = 10;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PasswordRecord {
    pub user_id: String,
    pub password: String,
}

pub struct PasswordStore {
    storage: Arc<Storage>,
    cost: u32,
}

impl PasswordStore {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self::with_cost(storage, BCRYPT_COST)
    }

    pub fn with_cost(storage: Arc<Storage>, cost: u32) -> Self {
        Self { storage, cost }
    }

    /// bcrypt hash, computed off the async workers
    pub async fn hash(&self, plain: &str) -> Result<String> {
        let plain = plain.to_owned();
        let cost = self.cost;
        tokio::task::spawn_blocking(move || bcrypt::hash(plain, cost))
            .await
            .map_err(|e| CasaError::Hashing(e.to_string()))?
            .map_err(|e| CasaError::Hashing(e.to_string()))
    }

    pub fn set(&self, user_id: &str, hash: String) -> Result<()> {
        self.storage.put(
            CF_PASSWORDS,
            user_id,
            &PasswordRecord {
                user_id: user_id.to_string(),
                password: hash,
            },
        )
    }

    /// False for a missing record or any hashing failure
    pub async fn verify(&self, user_id: &str, plain: &str) -> bool {
        let record: PasswordRecord = match self.storage.get(CF_PASSWORDS, user_id) {
            Ok(Some(record)) => record,
            Ok(None) => return false,
            Err(e) => {
                warn!(target: "account", error = %e, "Failed to load password record");
                return false;
            }
        };

        let plain = plain.to_owned();
        match tokio::task::spawn_blocking(move || bcrypt::verify(plain, &record.password)).await {
            Ok(Ok(matches)) => matches,
            Ok(Err(e)) => {
                warn!(target: "account", error = %e, "Stored hash could not be verified");
                false
            }
            Err(e) => {
                warn!(target: "account", error = %e, "Password check task failed");
                false
            }
        }
    }
}
