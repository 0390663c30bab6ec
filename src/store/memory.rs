use super::{ContentStore, StoreError, StoreResult};
use crate::content::{
    AdditionalImage, ContentItem, ContentKind, FieldSet, GroupId, ImageItem, NewContentItem, Page,
    SharedUpdate,
};
use crate::i18n::Language;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Default)]
struct State {
    next_id: i64,
    next_image_id: i64,
    items: BTreeMap<i64, ContentItem>,
    images: Vec<AdditionalImage>,
    pages: Vec<Page>,
}

/// Process-local store with the same semantics as [`super::PgStore`].
///
/// Used when no database is configured, and by tests.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        // Every mutation completes before the guard drops, so a poisoned
        // lock still holds consistent data.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Total number of content rows, across kinds and languages.
    pub fn len(&self) -> usize {
        self.state().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn sorted(mut items: Vec<ContentItem>) -> Vec<ContentItem> {
    items.sort_by_key(|item| (item.sort_order, item.id));
    items
}

impl State {
    fn group_of(&self, kind: ContentKind, id: i64) -> Option<Option<GroupId>> {
        self.items
            .get(&id)
            .filter(|item| item.kind == kind)
            .map(|item| item.group_id.clone())
    }

    fn remove_images_of(&mut self, kind: ContentKind, ids: &[i64]) {
        if let Some(tag) = kind.gallery_tag() {
            self.images
                .retain(|img| !(img.content_type == tag && ids.contains(&img.content_id)));
        }
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn get(&self, kind: ContentKind, id: i64) -> StoreResult<Option<ContentItem>> {
        Ok(self
            .state()
            .items
            .get(&id)
            .filter(|item| item.kind == kind)
            .cloned())
    }

    async fn get_by_group_and_lang(
        &self,
        kind: ContentKind,
        group_id: &GroupId,
        lang: Language,
    ) -> StoreResult<Option<ContentItem>> {
        Ok(self
            .state()
            .items
            .values()
            .find(|item| {
                item.kind == kind && item.lang == lang && item.group_id.as_ref() == Some(group_id)
            })
            .cloned())
    }

    async fn get_by_slug(
        &self,
        kind: ContentKind,
        lang: Language,
        slug: &str,
    ) -> StoreResult<Option<ContentItem>> {
        Ok(self
            .state()
            .items
            .values()
            .find(|item| item.kind == kind && item.lang == lang && item.slug.as_deref() == Some(slug))
            .cloned())
    }

    async fn list(&self, kind: ContentKind, lang: Option<Language>) -> StoreResult<Vec<ContentItem>> {
        let items = self
            .state()
            .items
            .values()
            .filter(|item| item.kind == kind && lang.map_or(true, |l| item.lang == l))
            .cloned()
            .collect();
        Ok(sorted(items))
    }

    async fn create(&self, new: NewContentItem) -> StoreResult<ContentItem> {
        let mut state = self.state();

        if let Some(slug) = &new.slug {
            let clash = state.items.values().any(|item| {
                item.kind == new.kind && item.lang == new.lang && item.slug.as_ref() == Some(slug)
            });
            if clash {
                return Err(StoreError::Conflict(format!(
                    "slug '{}' already used for {} in {}",
                    slug, new.kind, new.lang
                )));
            }
        }

        state.next_id += 1;
        let now = Utc::now();
        let item = ContentItem {
            id: state.next_id,
            kind: new.kind,
            lang: new.lang,
            group_id: new.group_id,
            slug: new.slug,
            fields: new.fields,
            shared: new.shared,
            lead_url: new.lead_url,
            sort_order: new.sort_order,
            published: new.published,
            created_at: now,
            updated_at: now,
        };
        state.items.insert(item.id, item.clone());
        Ok(item)
    }

    async fn update_fields(&self, id: i64, fields: &FieldSet) -> StoreResult<ContentItem> {
        let mut state = self.state();
        let item = state.items.get_mut(&id).ok_or(StoreError::Missing(id))?;
        item.fields = fields.clone();
        item.updated_at = Utc::now();
        Ok(item.clone())
    }

    async fn set_group(&self, kind: ContentKind, id: i64, group_id: &GroupId) -> StoreResult<()> {
        let mut state = self.state();
        let item = state
            .items
            .get_mut(&id)
            .filter(|item| item.kind == kind)
            .ok_or(StoreError::Missing(id))?;
        item.group_id = Some(group_id.clone());
        item.updated_at = Utc::now();
        Ok(())
    }

    async fn update_shared_for_group(
        &self,
        kind: ContentKind,
        group_id: &GroupId,
        update: &SharedUpdate,
    ) -> StoreResult<()> {
        let mut state = self.state();
        let now = Utc::now();
        for item in state
            .items
            .values_mut()
            .filter(|item| item.kind == kind && item.group_id.as_ref() == Some(group_id))
        {
            for (name, value) in update.values.iter() {
                item.shared.set(name, value);
            }
            if let Some(sort_order) = update.sort_order {
                item.sort_order = sort_order;
            }
            if let Some(published) = update.published {
                item.published = published;
            }
            item.updated_at = now;
        }
        Ok(())
    }

    async fn set_lead_for_group(
        &self,
        kind: ContentKind,
        owner_id: i64,
        lead_url: Option<&str>,
    ) -> StoreResult<()> {
        let mut state = self.state();
        let group = state.group_of(kind, owner_id).ok_or(StoreError::Missing(owner_id))?;
        let now = Utc::now();
        for item in state.items.values_mut().filter(|item| {
            item.kind == kind
                && match &group {
                    Some(group_id) => item.group_id.as_ref() == Some(group_id),
                    None => item.id == owner_id,
                }
        }) {
            item.lead_url = lead_url.map(str::to_string);
            item.updated_at = now;
        }
        Ok(())
    }

    async fn delete(&self, kind: ContentKind, id: i64) -> StoreResult<()> {
        let mut state = self.state();
        if state.group_of(kind, id).is_some() {
            state.items.remove(&id);
            state.remove_images_of(kind, &[id]);
        }
        Ok(())
    }

    async fn delete_group(&self, kind: ContentKind, group_id: &GroupId) -> StoreResult<u64> {
        let mut state = self.state();
        let ids: Vec<i64> = state
            .items
            .values()
            .filter(|item| item.kind == kind && item.group_id.as_ref() == Some(group_id))
            .map(|item| item.id)
            .collect();
        for id in &ids {
            state.items.remove(id);
        }
        state.remove_images_of(kind, &ids);
        Ok(ids.len() as u64)
    }

    async fn get_additional_images(
        &self,
        content_type: &str,
        owner_id: i64,
    ) -> StoreResult<Vec<AdditionalImage>> {
        let mut images: Vec<AdditionalImage> = self
            .state()
            .images
            .iter()
            .filter(|img| img.content_type == content_type && img.content_id == owner_id)
            .cloned()
            .collect();
        images.sort_by_key(|img| (img.sort_order, img.id));
        Ok(images)
    }

    async fn replace_additional_image_items(
        &self,
        content_type: &str,
        owner_id: i64,
        items: &[ImageItem],
    ) -> StoreResult<()> {
        let mut state = self.state();
        state
            .images
            .retain(|img| !(img.content_type == content_type && img.content_id == owner_id));
        for item in items {
            state.next_image_id += 1;
            let id = state.next_image_id;
            state.images.push(AdditionalImage {
                id,
                content_type: content_type.to_string(),
                content_id: owner_id,
                image_url: item.image_url.clone(),
                alt_text: item.alt_text.clone(),
                sort_order: item.sort_order,
            });
        }
        Ok(())
    }

    async fn list_pages(&self, lang: Language) -> StoreResult<Vec<Page>> {
        Ok(self
            .state()
            .pages
            .iter()
            .filter(|page| page.lang == lang)
            .cloned()
            .collect())
    }

    async fn upsert_page(&self, page: &Page) -> StoreResult<Page> {
        let mut state = self.state();
        match state
            .pages
            .iter_mut()
            .find(|p| p.lang == page.lang && p.slug == page.slug)
        {
            Some(existing) => *existing = page.clone(),
            None => state.pages.push(page.clone()),
        }
        Ok(page.clone())
    }
}
