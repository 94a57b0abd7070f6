use thiserror::Error;

use crate::admin_store::MIN_PASSWORD_LEN;
use crate::upload::MAX_UPLOAD_BYTES;

/// Domain outcomes the stores report to callers. Storage failures never
/// surface here; the blob store absorbs those and degrades to defaults.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Validation(String),
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("new password must be at least {min} characters", min = MIN_PASSWORD_LEN)]
    WeakPassword,
    #[error("unsupported file type: {0}")]
    UnsupportedType(String),
    #[error("file is {size} bytes, limit is {limit} bytes", limit = MAX_UPLOAD_BYTES)]
    TooLarge { size: usize },
}

pub type StoreResult<T> = Result<T, StoreError>;
