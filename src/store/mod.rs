//! Persistence contract for language-grouped content.
//!
//! Every backend implements the whole trait; the content core never issues
//! queries of its own.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use crate::content::{
    AdditionalImage, ContentItem, ContentKind, FieldSet, GroupId, ImageItem, NewContentItem, Page,
    SharedUpdate,
};
use crate::i18n::Language;
use async_trait::async_trait;

/// Errors surfaced by a persistence backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A uniqueness constraint (e.g. slug per language) was violated.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A row the operation depends on does not exist.
    #[error("Row {0} not found")]
    Missing(i64),

    /// A stored value could not be mapped back into the domain.
    #[error("Corrupt row: {0}")]
    Corrupt(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn get(&self, kind: ContentKind, id: i64) -> StoreResult<Option<ContentItem>>;

    async fn get_by_group_and_lang(
        &self,
        kind: ContentKind,
        group_id: &GroupId,
        lang: Language,
    ) -> StoreResult<Option<ContentItem>>;

    async fn get_by_slug(
        &self,
        kind: ContentKind,
        lang: Language,
        slug: &str,
    ) -> StoreResult<Option<ContentItem>>;

    /// Rows of `kind`, optionally restricted to one language, ordered by `(sort_order, id)`.
    async fn list(&self, kind: ContentKind, lang: Option<Language>) -> StoreResult<Vec<ContentItem>>;

    async fn create(&self, item: NewContentItem) -> StoreResult<ContentItem>;

    /// Replace the per-language text of one row.
    async fn update_fields(&self, id: i64, fields: &FieldSet) -> StoreResult<ContentItem>;

    async fn set_group(&self, kind: ContentKind, id: i64, group_id: &GroupId) -> StoreResult<()>;

    /// Write shared attributes to every row of the group; only provided values overwrite.
    async fn update_shared_for_group(
        &self,
        kind: ContentKind,
        group_id: &GroupId,
        update: &SharedUpdate,
    ) -> StoreResult<()>;

    /// Set the lead reference on the owner's whole group (or just the owner if ungrouped).
    async fn set_lead_for_group(
        &self,
        kind: ContentKind,
        owner_id: i64,
        lead_url: Option<&str>,
    ) -> StoreResult<()>;

    /// Delete one row together with its additional images.
    async fn delete(&self, kind: ContentKind, id: i64) -> StoreResult<()>;

    /// Delete every row of a group together with their additional images.
    async fn delete_group(&self, kind: ContentKind, group_id: &GroupId) -> StoreResult<u64>;

    /// Gallery of one owner row, ordered by `(sort_order, id)`.
    async fn get_additional_images(
        &self,
        content_type: &str,
        owner_id: i64,
    ) -> StoreResult<Vec<AdditionalImage>>;

    /// Replace an owner's gallery wholesale.
    async fn replace_additional_image_items(
        &self,
        content_type: &str,
        owner_id: i64,
        items: &[ImageItem],
    ) -> StoreResult<()>;

    async fn list_pages(&self, lang: Language) -> StoreResult<Vec<Page>>;

    async fn upsert_page(&self, page: &Page) -> StoreResult<Page>;
}
