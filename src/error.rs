use crate::content::ContentKind;
use crate::storage::StorageError;
use crate::store::StoreError;

pub const MISSING_TITLE: &str = "missing title";
pub const MISSING_NAME: &str = "missing name";
pub const MISSING_EVENT_DETAILS: &str = "missing date or location";

/// Errors raised by the content core.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    /// Submitted content is unusable (e.g. no title in any language).
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Every slug candidate for `base` is already taken.
    #[error("Could not generate unique slug for '{base}'")]
    SlugExhausted { base: String },

    #[error("{kind} with id {id} not found")]
    NotFound { kind: ContentKind, id: i64 },

    /// No default page has this slug.
    #[error("Page '{slug}' not found")]
    PageNotFound { slug: String },

    #[error("Upload exceeds {limit} bytes")]
    UploadTooLarge { limit: usize },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Storage error: {0}")]
    Storage(String),
}

pub type ContentResult<T> = Result<T, ContentError>;

impl ContentError {
    pub fn missing_title() -> Self {
        ContentError::Validation(MISSING_TITLE.to_string())
    }

    pub fn missing_name() -> Self {
        ContentError::Validation(MISSING_NAME.to_string())
    }

    pub fn missing_event_details() -> Self {
        ContentError::Validation(MISSING_EVENT_DETAILS.to_string())
    }
}

impl From<StorageError> for ContentError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::TooLarge { limit } => ContentError::UploadTooLarge { limit },
            other => ContentError::Storage(other.to_string()),
        }
    }
}
