use crate::storage::{Storage, CF_USERS};
use crate::{CasaError, Result};
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Registration payload. With an `id` it updates the fields it carries.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct NewUser {
    #[serde(default, alias = "_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

fn new_id() -> String {
    let bytes: [u8; 12] = rand::rng().random();
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

fn validate_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CasaError::Validation("name must not be empty".into()));
    }
    Ok(name.to_string())
}

fn validate_email(email: &str) -> Result<String> {
    let email = email.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(email),
        _ => Err(CasaError::Validation(format!("invalid email: {}", email))),
    }
}

pub struct UserStore {
    storage: Arc<Storage>,
    // held across the uniqueness check and the write
    write_lock: Mutex<()>,
}

impl UserStore {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self {
            storage,
            write_lock: Mutex::new(()),
        }
    }

    pub fn get(&self, id: &str) -> Result<Option<User>> {
        self.storage.get(CF_USERS, id)
    }

    pub fn all(&self) -> Result<Vec<User>> {
        Ok(self
            .storage
            .scan::<User>(CF_USERS)?
            .into_iter()
            .map(|(_, user)| user)
            .collect())
    }

    /// Look a user up by email or name
    pub fn find_by_login(&self, login: &str) -> Result<Option<User>> {
        let login = login.trim();
        if login.is_empty() {
            return Ok(None);
        }
        let email = login.to_lowercase();
        Ok(self
            .all()?
            .into_iter()
            .find(|user| user.email == email || user.name == login))
    }

    fn ensure_unique(&self, candidate: &User) -> Result<()> {
        for user in self.all()? {
            if user.id == candidate.id {
                continue;
            }
            if user.name == candidate.name {
                return Err(CasaError::Conflict(format!("name already taken: {}", user.name)));
            }
            if user.email == candidate.email {
                return Err(CasaError::Conflict(format!("email already taken: {}", user.email)));
            }
        }
        Ok(())
    }

    pub fn create_or_update(&self, new_user: NewUser) -> Result<User> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let user = match new_user.id.filter(|id| !id.is_empty()) {
            None => User {
                id: new_id(),
                name: validate_name(new_user.name.as_deref().unwrap_or_default())?,
                email: validate_email(new_user.email.as_deref().unwrap_or_default())?,
                created_at: Utc::now(),
            },
            Some(id) => {
                let mut user = self
                    .get(&id)?
                    .ok_or_else(|| CasaError::NotFound(format!("user {}", id)))?;
                if let Some(name) = new_user.name {
                    user.name = validate_name(&name)?;
                }
                if let Some(email) = new_user.email {
                    user.email = validate_email(&email)?;
                }
                user
            }
        };

        self.ensure_unique(&user)?;
        self.storage.put(CF_USERS, &user.id, &user)?;
        Ok(user)
    }
}
