//! Gallery edits: removals, new uploads and the lead image of a group.

use super::model::{AdditionalImage, ContentItem, ImageItem};
use super::resolve::resolve_gallery_owner;
use crate::error::{ContentError, ContentResult};
use crate::storage::{generate_filename, FileStorage};
use crate::store::ContentStore;
use futures::future::join_all;
use serde::Serialize;

/// A file received for the gallery.
#[derive(Debug, Clone)]
pub struct Upload {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Default)]
pub struct GalleryEdit {
    /// Ids of existing images to drop.
    pub remove_ids: Vec<i64>,
    /// New files appended after the kept images.
    pub uploads: Vec<Upload>,
    /// Explicitly selected lead image URL.
    pub lead: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GalleryOutcome {
    pub owner_id: i64,
    pub images: Vec<AdditionalImage>,
    pub lead_url: Option<String>,
}

/// Kept images renumbered from 0, followed by `new_urls`.
pub fn plan_gallery(
    existing: &[AdditionalImage],
    remove_ids: &[i64],
    new_urls: &[String],
) -> Vec<ImageItem> {
    let kept = existing
        .iter()
        .filter(|img| !remove_ids.contains(&img.id))
        .map(|img| (img.image_url.clone(), img.alt_text.clone()));
    let added = new_urls.iter().map(|url| (url.clone(), String::new()));

    kept.chain(added)
        .enumerate()
        .map(|(idx, (image_url, alt_text))| ImageItem {
            image_url,
            alt_text,
            sort_order: idx as i32,
        })
        .collect()
}

/// Lead image after an edit.
///
/// An explicit selection wins. Otherwise the current lead stays while it is
/// still part of the gallery; if it is gone (or was never set) the first
/// gallery image takes over.
pub fn choose_lead(
    selected: Option<&str>,
    current: Option<&str>,
    items: &[ImageItem],
) -> Option<String> {
    if let Some(selected) = selected.map(str::trim).filter(|s| !s.is_empty()) {
        return Some(selected.to_string());
    }

    match current.filter(|c| !c.is_empty()) {
        Some(current) if items.iter().any(|i| i.image_url == current) => Some(current.to_string()),
        _ => items.first().map(|i| i.image_url.clone()),
    }
}

/// Apply `edit` to the gallery of `base`'s group.
///
/// New files are uploaded first, then the owner's images are replaced
/// wholesale and the lead is written to every variant. If an upload or the
/// replace fails, the files uploaded by this edit are deleted again before
/// the error is returned. Files of removed images are deleted from storage
/// last; a failed delete leaves an orphaned file behind but does not fail
/// the edit.
pub async fn apply_gallery_edit(
    store: &dyn ContentStore,
    storage: &dyn FileStorage,
    base: &ContentItem,
    edit: GalleryEdit,
) -> ContentResult<GalleryOutcome> {
    let tag = base.kind.gallery_tag().ok_or_else(|| {
        ContentError::Validation(format!("{} has no gallery", base.kind))
    })?;

    let owner_id = resolve_gallery_owner(store, base).await;
    let existing = store.get_additional_images(tag, owner_id).await?;

    let results = join_all(edit.uploads.iter().map(|upload| {
        let path = generate_filename(&upload.filename, base.kind.path_segment());
        async move {
            storage
                .upload(&upload.bytes, &path, &upload.content_type)
                .await
        }
    }))
    .await;

    let mut new_urls = Vec::with_capacity(results.len());
    let mut first_error = None;
    for result in results {
        match result {
            Ok(url) => new_urls.push(url),
            Err(e) => {
                first_error.get_or_insert(e);
            }
        }
    }
    if let Some(e) = first_error {
        discard(storage, &new_urls).await;
        return Err(e.into());
    }

    let items = plan_gallery(&existing, &edit.remove_ids, &new_urls);
    if let Err(e) = store
        .replace_additional_image_items(tag, owner_id, &items)
        .await
    {
        discard(storage, &new_urls).await;
        return Err(e.into());
    }

    let lead_url = choose_lead(edit.lead.as_deref(), base.lead_url.as_deref(), &items);
    store
        .set_lead_for_group(base.kind, owner_id, lead_url.as_deref())
        .await?;

    for removed in existing.iter().filter(|img| edit.remove_ids.contains(&img.id)) {
        let still_used = lead_url.as_deref() == Some(removed.image_url.as_str())
            || items.iter().any(|i| i.image_url == removed.image_url);
        if !still_used {
            let _ = storage.delete(&removed.image_url).await;
        }
    }

    let images = store.get_additional_images(tag, owner_id).await?;
    Ok(GalleryOutcome {
        owner_id,
        images,
        lead_url,
    })
}

/// Best-effort removal of files that never made it into the gallery.
async fn discard(storage: &dyn FileStorage, urls: &[String]) {
    for url in urls {
        let _ = storage.delete(url).await;
    }
}
