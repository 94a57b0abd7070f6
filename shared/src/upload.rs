//! Upload validation and file-name generation. The bytes themselves go
//! through [`crate::blob_store::BlobStore::put_file`] unchanged.

use rand::Rng;

use crate::error::{StoreError, StoreResult};

pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

// Declared MIME type to canonical extension, the only types accepted.
const ALLOWED_TYPES: &[(&str, &str)] = &[
    ("image/jpeg", "jpg"),
    ("image/png", "png"),
    ("image/gif", "gif"),
    ("image/webp", "webp"),
];

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const SUFFIX_LEN: usize = 9;

/// Reject anything that is not a supported image or is over the size cap.
pub fn validate(content_type: &str, size: usize) -> StoreResult<()> {
    if !ALLOWED_TYPES.iter().any(|(mime, _)| *mime == content_type) {
        return Err(StoreError::UnsupportedType(content_type.to_string()));
    }
    if size > MAX_UPLOAD_BYTES {
        return Err(StoreError::TooLarge { size });
    }
    Ok(())
}

/// `{millis}-{9 random base36 chars}.{ext}`. The extension comes from the
/// original file name, falling back to the one the MIME type implies.
pub fn generate_file_name(original_name: &str, content_type: &str) -> String {
    let ext = extension_of(original_name)
        .or_else(|| extension_for_type(content_type))
        .unwrap_or("bin");
    let millis = chrono::Utc::now().timestamp_millis();
    format!("{millis}-{}.{ext}", random_suffix())
}

fn extension_of(name: &str) -> Option<&str> {
    let (stem, ext) = name.rsplit_once('.')?;
    (!stem.is_empty() && !ext.is_empty()).then_some(ext)
}

fn extension_for_type(content_type: &str) -> Option<&'static str> {
    ALLOWED_TYPES
        .iter()
        .find(|(mime, _)| *mime == content_type)
        .map(|(_, ext)| *ext)
}

fn random_suffix() -> String {
    let mut rng = rand::thread_rng();
    (0..SUFFIX_LEN)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect()
}
