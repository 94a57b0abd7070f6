//! Named JSON documents and uploaded files in an object-store bucket, with
//! a local-filesystem fallback for development and degraded operation.

use std::sync::Arc;

use anyhow::{Context, Result};
use bytes::Bytes;
use object_store::aws::AmazonS3Builder;
use object_store::local::LocalFileSystem;
use object_store::path::Path as StorePath;
use object_store::{Attribute, Attributes, ObjectStore, PutOptions, PutPayload};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Keys of the persisted JSON documents.
pub mod keys {
    pub const ABOUT: &str = "about.json";
    pub const POSTS: &str = "posts.json";
    pub const ADMIN: &str = "admin.json";
    pub const SUBSCRIBERS: &str = "subscribers.json";
    pub const CONTACTS: &str = "contacts.json";
    pub const MESSAGES: &str = "messages.json";
    pub const SETTINGS: &str = "settings.json";
}

// Uploaded files live apart from the JSON documents.
const UPLOADS_PREFIX: &str = "uploads";

/// Result of a seed-on-read: the document, plus whether this call created it.
#[derive(Debug, Clone, PartialEq)]
pub struct Seeded<T> {
    pub value: T,
    pub was_initialized: bool,
}

/// A stored upload handed back with its content type.
#[derive(Debug, Clone)]
pub struct StoredFile {
    pub bytes: Bytes,
    pub content_type: String,
}

struct Inner {
    remote: Option<Arc<dyn ObjectStore>>,
    local: Arc<dyn ObjectStore>,
}

/// Blob store with an optional bucket as primary backend and a local
/// directory as fallback. Cheap to clone.
#[derive(Clone)]
pub struct BlobStore {
    inner: Arc<Inner>,
}

impl BlobStore {
    /// Build from `STORAGE_*` environment variables. Without a
    /// `STORAGE_BUCKET` the store runs against the data directory alone.
    pub fn from_env() -> Result<Self> {
        let data_dir = std::env::var("DATA_DIR").unwrap_or_else(|_| "./data".to_string());
        let remote = match std::env::var("STORAGE_BUCKET") {
            Ok(bucket) => {
                tracing::info!("blob store: bucket {bucket} with local fallback at {data_dir}");
                Some(build_remote(&bucket)?)
            },
            Err(_) => {
                tracing::info!("blob store: local only at {data_dir}");
                None
            },
        };
        Self::with_backends(remote, &data_dir)
    }

    /// Local-filesystem store rooted at `root`, no bucket.
    pub fn local_only(root: impl AsRef<std::path::Path>) -> Result<Self> {
        Self::with_backends(None, root)
    }

    fn with_backends(
        remote: Option<Arc<dyn ObjectStore>>,
        root: impl AsRef<std::path::Path>,
    ) -> Result<Self> {
        let root = root.as_ref();
        std::fs::create_dir_all(root)
            .with_context(|| format!("failed to create data directory {}", root.display()))?;
        let local = LocalFileSystem::new_with_prefix(root)
            .with_context(|| format!("failed to open data directory {}", root.display()))?;
        Ok(Self {
            inner: Arc::new(Inner {
                remote,
                local: Arc::new(local),
            }),
        })
    }

    /// Fetch a JSON document, persisting `default` under `key` when nothing
    /// is stored yet. Never fails: a backend error falls through to the
    /// fallback, and on total failure the default is returned un-persisted.
    pub async fn get_or_init<T>(&self, key: &str, default: T) -> Seeded<T>
    where
        T: Serialize + DeserializeOwned,
    {
        let path = StorePath::from(key);
        if let Some(remote) = &self.inner.remote {
            match fetch_json::<T>(remote.as_ref(), &path).await {
                Ok(Some(value)) => {
                    return Seeded {
                        value,
                        was_initialized: false,
                    };
                },
                Ok(None) => {
                    self.write(key, &default).await;
                    return Seeded {
                        value: default,
                        was_initialized: true,
                    };
                },
                Err(err) => {
                    tracing::warn!("bucket read for {key} failed, trying local fallback: {err:#}");
                },
            }
        }
        match fetch_json::<T>(self.inner.local.as_ref(), &path).await {
            Ok(Some(value)) => Seeded {
                value,
                was_initialized: false,
            },
            Ok(None) => {
                self.write(key, &default).await;
                Seeded {
                    value: default,
                    was_initialized: true,
                }
            },
            Err(err) => {
                tracing::error!("local read for {key} failed, serving default: {err:#}");
                Seeded {
                    value: default,
                    was_initialized: false,
                }
            },
        }
    }

    /// Persist a JSON document under `key`. Best effort: a bucket failure is
    /// shadow-written to the local fallback, and failures are logged rather
    /// than returned.
    pub async fn write<T: Serialize>(&self, key: &str, value: &T) {
        let data = match serde_json::to_vec_pretty(value) {
            Ok(data) => data,
            Err(err) => {
                tracing::error!("serializing document {key} failed: {err}");
                return;
            },
        };
        let path = StorePath::from(key);
        let payload = PutPayload::from(data);
        if let Some(remote) = &self.inner.remote {
            let options = PutOptions {
                attributes: content_type_attributes("application/json"),
                ..Default::default()
            };
            match remote.put_opts(&path, payload.clone(), options).await {
                Ok(_) => return,
                Err(err) => {
                    tracing::warn!("bucket write for {key} failed, shadow-writing local: {err}");
                },
            }
        }
        if let Err(err) = self.inner.local.put(&path, payload).await {
            tracing::error!("local write for {key} failed: {err}");
        }
    }

    /// Remove a document if present. Absence is a no-op; failures are logged
    /// and swallowed.
    pub async fn delete(&self, key: &str) {
        let path = StorePath::from(key);
        let store = self
            .inner
            .remote
            .as_deref()
            .unwrap_or(self.inner.local.as_ref());
        match store.delete(&path).await {
            Ok(()) | Err(object_store::Error::NotFound { .. }) => {},
            Err(err) => tracing::warn!("delete for {key} failed: {err}"),
        }
    }

    /// Store raw upload bytes under the uploads namespace and return the
    /// serving path. Errors only when every backend rejects the write.
    pub async fn put_file(
        &self,
        file_name: &str,
        bytes: Bytes,
        content_type: &str,
    ) -> Result<String> {
        let path = StorePath::from(format!("{UPLOADS_PREFIX}/{file_name}"));
        let url = format!("/{UPLOADS_PREFIX}/{file_name}");
        let payload = PutPayload::from(bytes);
        if let Some(remote) = &self.inner.remote {
            // The local backend rejects put attributes, so the content type
            // only travels with the bucket copy; local reads recover it from
            // the file extension.
            let options = PutOptions {
                attributes: content_type_attributes(content_type),
                ..Default::default()
            };
            match remote.put_opts(&path, payload.clone(), options).await {
                Ok(_) => return Ok(url),
                Err(err) => {
                    tracing::warn!("bucket write for {path} failed, shadow-writing local: {err}");
                },
            }
        }
        self.inner
            .local
            .put(&path, payload)
            .await
            .with_context(|| format!("failed to store {file_name} locally"))?;
        Ok(url)
    }

    /// Fetch stored upload bytes with their content type. `None` when the
    /// file does not exist.
    pub async fn get_file(&self, file_name: &str) -> Option<StoredFile> {
        let path = StorePath::from(format!("{UPLOADS_PREFIX}/{file_name}"));
        if let Some(remote) = &self.inner.remote {
            match remote.get(&path).await {
                Ok(result) => {
                    let content_type = result
                        .attributes
                        .get(&Attribute::ContentType)
                        .map(|value| value.to_string())
                        .unwrap_or_else(|| content_type_for(file_name).to_string());
                    return match result.bytes().await {
                        Ok(bytes) => Some(StoredFile {
                            bytes,
                            content_type,
                        }),
                        Err(err) => {
                            tracing::warn!("reading {path} body failed: {err}");
                            None
                        },
                    };
                },
                Err(object_store::Error::NotFound { .. }) => return None,
                Err(err) => {
                    tracing::warn!("bucket read for {path} failed, trying local fallback: {err}");
                },
            }
        }
        match self.inner.local.get(&path).await {
            Ok(result) => match result.bytes().await {
                Ok(bytes) => Some(StoredFile {
                    bytes,
                    content_type: content_type_for(file_name).to_string(),
                }),
                Err(err) => {
                    tracing::warn!("reading {path} body failed: {err}");
                    None
                },
            },
            Err(object_store::Error::NotFound { .. }) => None,
            Err(err) => {
                tracing::warn!("local read for {path} failed: {err}");
                None
            },
        }
    }
}

fn build_remote(bucket: &str) -> Result<Arc<dyn ObjectStore>> {
    let mut builder = AmazonS3Builder::from_env().with_bucket_name(bucket);
    if let Ok(endpoint) = std::env::var("STORAGE_ENDPOINT") {
        builder = builder.with_endpoint(endpoint);
    }
    if let Ok(region) = std::env::var("STORAGE_REGION") {
        builder = builder.with_region(region);
    }
    if let Ok(key_id) = std::env::var("STORAGE_ACCESS_KEY_ID") {
        builder = builder.with_access_key_id(key_id);
    }
    if let Ok(secret) = std::env::var("STORAGE_SECRET_ACCESS_KEY") {
        builder = builder.with_secret_access_key(secret);
    }
    let store = builder.build().context("failed to configure bucket storage")?;
    Ok(Arc::new(store))
}

async fn fetch_json<T: DeserializeOwned>(
    store: &dyn ObjectStore,
    path: &StorePath,
) -> Result<Option<T>> {
    match store.get(path).await {
        Ok(result) => {
            let data = result.bytes().await.context("failed to read document body")?;
            let value = serde_json::from_slice(&data)
                .with_context(|| format!("failed to parse JSON document {path}"))?;
            Ok(Some(value))
        },
        Err(object_store::Error::NotFound { .. }) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

fn content_type_attributes(content_type: &str) -> Attributes {
    let mut attributes = Attributes::new();
    attributes.insert(Attribute::ContentType, content_type.to_string().into());
    attributes
}

/// Content type implied by a file name. Locally stored files carry no
/// attribute metadata, so the extension is all there is.
fn content_type_for(file_name: &str) -> &'static str {
    let ext = file_name.rsplit('.').next().unwrap_or_default();
    match ext.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}
