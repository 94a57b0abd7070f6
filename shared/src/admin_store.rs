//! The admin account: one persisted document, password salted and hashed
//! at rest, matched in constant time.

use chrono::{DateTime, Utc};
use constant_time_eq::constant_time_eq;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::blob_store::{keys, BlobStore};
use crate::error::{StoreError, StoreResult};

pub const MIN_PASSWORD_LEN: usize = 6;

const DEFAULT_USERNAME: &str = "admin";
const DEFAULT_PASSWORD: &str = "password123";

/// The stored shape. Password material never leaves this module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminAccount {
    pub username: String,
    pub password_hash: String,
    pub password_salt: String,
    pub email: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login_at: Option<DateTime<Utc>>,
}

/// What the API hands out: the account minus password material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminProfile {
    pub username: String,
    pub email: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePatch {
    pub username: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
}

impl From<AdminAccount> for AdminProfile {
    fn from(account: AdminAccount) -> Self {
        AdminProfile {
            username: account.username,
            email: account.email,
            name: account.name,
            last_login_at: account.last_login_at,
        }
    }
}

#[derive(Clone)]
pub struct AdminStore {
    blob: BlobStore,
}

impl AdminStore {
    pub fn new(blob: BlobStore) -> Self {
        Self { blob }
    }

    async fn load(&self) -> AdminAccount {
        self.blob
            .get_or_init(keys::ADMIN, default_account())
            .await
            .value
    }

    async fn save(&self, account: &AdminAccount) {
        self.blob.write(keys::ADMIN, account).await;
    }

    pub async fn profile(&self) -> AdminProfile {
        self.load().await.into()
    }

    /// Check credentials; on success stamp `lastLoginAt` and return the
    /// profile. The caller issues the session token.
    pub async fn login(&self, username: &str, password: &str) -> StoreResult<AdminProfile> {
        let mut account = self.load().await;
        if account.username != username || !verify_password(&account, password) {
            return Err(StoreError::InvalidCredentials);
        }
        account.last_login_at = Some(Utc::now());
        self.save(&account).await;
        tracing::info!("admin {} logged in", account.username);
        Ok(account.into())
    }

    /// Replace the password after verifying the current one. A fresh salt
    /// is drawn on every change.
    pub async fn change_password(&self, current: &str, next: &str) -> StoreResult<()> {
        let mut account = self.load().await;
        if !verify_password(&account, current) {
            return Err(StoreError::InvalidCredentials);
        }
        if next.chars().count() < MIN_PASSWORD_LEN {
            return Err(StoreError::WeakPassword);
        }
        let salt = new_salt();
        account.password_hash = hash_password(&salt, next);
        account.password_salt = salt;
        self.save(&account).await;
        tracing::info!("admin password changed");
        Ok(())
    }

    /// Overwrite whichever profile fields are present; absent fields stay.
    pub async fn update_profile(&self, patch: ProfilePatch) -> AdminProfile {
        let mut account = self.load().await;
        if let Some(username) = patch.username {
            account.username = username;
        }
        if let Some(email) = patch.email {
            account.email = email;
        }
        if let Some(name) = patch.name {
            account.name = name;
        }
        self.save(&account).await;
        account.into()
    }
}

fn verify_password(account: &AdminAccount, password: &str) -> bool {
    let candidate = hash_password(&account.password_salt, password);
    constant_time_eq(candidate.as_bytes(), account.password_hash.as_bytes())
}

fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn new_salt() -> String {
    hex::encode(rand::random::<[u8; 16]>())
}

fn default_account() -> AdminAccount {
    let salt = new_salt();
    AdminAccount {
        username: DEFAULT_USERNAME.to_string(),
        password_hash: hash_password(&salt, DEFAULT_PASSWORD),
        password_salt: salt,
        email: "admin@example.com".to_string(),
        name: "Administrator".to_string(),
        last_login_at: None,
    }
}
