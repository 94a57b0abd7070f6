//! Free-form contact details visitors leave for the author.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::blob_store::{keys, BlobStore};
use crate::error::{StoreError, StoreResult};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactKind {
    Email,
    Wechat,
    #[default]
    Phone,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactEntry {
    pub id: String,
    pub contact: String,
    #[serde(rename = "type")]
    pub kind: ContactKind,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct ContactStore {
    blob: BlobStore,
}

impl ContactStore {
    pub fn new(blob: BlobStore) -> Self {
        Self { blob }
    }

    async fn load(&self) -> Vec<ContactEntry> {
        self.blob.get_or_init(keys::CONTACTS, Vec::new()).await.value
    }

    pub async fn list(&self) -> Vec<ContactEntry> {
        self.load().await
    }

    /// Record a contact detail. The value is stored trimmed; the kind
    /// defaults to phone when the client does not say.
    pub async fn add(&self, contact: &str, kind: Option<ContactKind>) -> StoreResult<ContactEntry> {
        let contact = contact.trim();
        if contact.is_empty() {
            return Err(StoreError::Validation(
                "Contact detail must not be empty".to_string(),
            ));
        }
        let entry = ContactEntry {
            id: Uuid::new_v4().to_string(),
            contact: contact.to_string(),
            kind: kind.unwrap_or_default(),
            created_at: Utc::now(),
        };
        let mut contacts = self.load().await;
        contacts.push(entry.clone());
        self.blob.write(keys::CONTACTS, &contacts).await;
        Ok(entry)
    }

    pub async fn remove(&self, id: &str) -> StoreResult<()> {
        let mut contacts = self.load().await;
        let before = contacts.len();
        contacts.retain(|entry| entry.id != id);
        if contacts.len() == before {
            return Err(StoreError::NotFound("contact"));
        }
        self.blob.write(keys::CONTACTS, &contacts).await;
        Ok(())
    }
}
