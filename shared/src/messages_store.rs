//! Visitor messages left through the contact form.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::blob_store::{keys, BlobStore};
use crate::error::{StoreError, StoreResult};

// Shorter submissions are rejected as noise.
const MIN_CONTENT_CHARS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    Unread,
    Read,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub email: String,
    pub content: String,
    pub received_at: DateTime<Utc>,
    pub status: MessageStatus,
}

#[derive(Clone)]
pub struct MessageStore {
    blob: BlobStore,
}

impl MessageStore {
    pub fn new(blob: BlobStore) -> Self {
        Self { blob }
    }

    async fn load(&self) -> Vec<Message> {
        self.blob.get_or_init(keys::MESSAGES, Vec::new()).await.value
    }

    /// Messages in the order they arrived.
    pub async fn list(&self) -> Vec<Message> {
        self.load().await
    }

    /// Record a new message. The content is stored trimmed and the message
    /// starts out unread.
    pub async fn create(&self, email: &str, content: &str) -> StoreResult<Message> {
        if !email.contains('@') {
            return Err(StoreError::Validation(
                "Please enter a valid email address".to_string(),
            ));
        }
        let content = content.trim();
        if content.chars().count() < MIN_CONTENT_CHARS {
            return Err(StoreError::Validation(format!(
                "Message must be at least {MIN_CONTENT_CHARS} characters"
            )));
        }
        let message = Message {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            content: content.to_string(),
            received_at: Utc::now(),
            status: MessageStatus::Unread,
        };
        let mut messages = self.load().await;
        messages.push(message.clone());
        self.blob.write(keys::MESSAGES, &messages).await;
        tracing::info!("new message from {}", message.email);
        Ok(message)
    }

    pub async fn delete(&self, id: &str) -> StoreResult<()> {
        let mut messages = self.load().await;
        let before = messages.len();
        messages.retain(|message| message.id != id);
        if messages.len() == before {
            return Err(StoreError::NotFound("message"));
        }
        self.blob.write(keys::MESSAGES, &messages).await;
        Ok(())
    }
}
