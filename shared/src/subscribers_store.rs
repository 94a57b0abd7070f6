//! Newsletter subscribers. Emails are unique across the collection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::blob_store::{keys, BlobStore};
use crate::error::{StoreError, StoreResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriberStatus {
    Confirmed,
    Pending,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscriber {
    pub id: String,
    pub email: String,
    pub subscribed_at: DateTime<Utc>,
    pub status: SubscriberStatus,
}

#[derive(Clone)]
pub struct SubscriberStore {
    blob: BlobStore,
}

impl SubscriberStore {
    pub fn new(blob: BlobStore) -> Self {
        Self { blob }
    }

    async fn load(&self) -> Vec<Subscriber> {
        self.blob
            .get_or_init(keys::SUBSCRIBERS, Vec::new())
            .await
            .value
    }

    pub async fn list(&self) -> Vec<Subscriber> {
        self.load().await
    }

    /// Add a subscriber. A duplicate email fails without touching the
    /// stored collection. New subscribers skip the confirmation step.
    pub async fn subscribe(&self, email: &str) -> StoreResult<Subscriber> {
        if !email.contains('@') {
            return Err(StoreError::Validation(
                "Please enter a valid email address".to_string(),
            ));
        }
        let mut subscribers = self.load().await;
        if subscribers.iter().any(|sub| sub.email == email) {
            return Err(StoreError::Validation(
                "This email is already subscribed".to_string(),
            ));
        }
        let subscriber = Subscriber {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            subscribed_at: Utc::now(),
            status: SubscriberStatus::Confirmed,
        };
        subscribers.push(subscriber.clone());
        self.blob.write(keys::SUBSCRIBERS, &subscribers).await;
        tracing::info!("new subscriber {}", subscriber.email);
        Ok(subscriber)
    }

    pub async fn remove(&self, id: &str) -> StoreResult<()> {
        let mut subscribers = self.load().await;
        let before = subscribers.len();
        subscribers.retain(|sub| sub.id != id);
        if subscribers.len() == before {
            return Err(StoreError::NotFound("subscriber"));
        }
        self.blob.write(keys::SUBSCRIBERS, &subscribers).await;
        Ok(())
    }
}
