use std::time::Duration;

use inkpost_shared::about_store::AboutStore;
use inkpost_shared::admin_store::AdminStore;
use inkpost_shared::contacts_store::ContactStore;
use inkpost_shared::messages_store::MessageStore;
use inkpost_shared::posts_store::PostStore;
use inkpost_shared::settings_store::SettingsStore;
use inkpost_shared::subscribers_store::SubscriberStore;
use inkpost_shared::BlobStore;

use crate::auth::SessionTable;

/// Everything the handlers need: one store per document plus the session
/// table, all cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub blob: BlobStore,
    pub posts: PostStore,
    pub about: AboutStore,
    pub messages: MessageStore,
    pub subscribers: SubscriberStore,
    pub contacts: ContactStore,
    pub settings: SettingsStore,
    pub admin: AdminStore,
    pub sessions: SessionTable,
}

impl AppState {
    pub fn new(blob: BlobStore, session_ttl: Duration) -> Self {
        Self {
            posts: PostStore::new(blob.clone()),
            about: AboutStore::new(blob.clone()),
            messages: MessageStore::new(blob.clone()),
            subscribers: SubscriberStore::new(blob.clone()),
            contacts: ContactStore::new(blob.clone()),
            settings: SettingsStore::new(blob.clone()),
            admin: AdminStore::new(blob.clone()),
            sessions: SessionTable::new(session_ttl),
            blob,
        }
    }
}
