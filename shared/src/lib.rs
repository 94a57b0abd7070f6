//! Core of the inkpost blog platform: the blob store adapter plus one
//! typed store per persisted document. The HTTP layer in the backend
//! crate is a thin shell over these modules.

pub mod about_store;
pub mod admin_store;
pub mod blob_store;
pub mod contacts_store;
pub mod error;
pub mod messages_store;
pub mod posts_store;
pub mod settings_store;
pub mod subscribers_store;
pub mod upload;

pub use blob_store::BlobStore;
pub use error::{StoreError, StoreResult};
