//! Language resolution for content groups.
//!
//! A request for language `L` is answered by the group's `L` variant when it
//! exists, otherwise by the first variant found along [`FALLBACK_ORDER`].

use super::kind::ContentKind;
use super::model::{ContentItem, GroupId, LanguageMap};
use crate::error::ContentResult;
use crate::i18n::{Language, FALLBACK_ORDER};
use crate::store::ContentStore;
use std::collections::HashMap;

/// Resolve `item` to its variant in `lang`.
///
/// Ungrouped items come back unchanged. When the group has no `lang`
/// variant the first fallback variant is used, and the item itself when no
/// other variant exists.
pub async fn resolve_variant(
    store: &dyn ContentStore,
    item: ContentItem,
    lang: Language,
) -> ContentResult<ContentItem> {
    let Some(group_id) = item.group_id.clone() else {
        return Ok(item);
    };
    if item.lang == lang {
        return Ok(item);
    }

    if let Some(variant) = store.get_by_group_and_lang(item.kind, &group_id, lang).await? {
        return Ok(variant);
    }

    for fallback in FALLBACK_ORDER.into_iter().filter(|l| *l != lang) {
        if fallback == item.lang {
            return Ok(item);
        }
        if let Some(variant) = store
            .get_by_group_and_lang(item.kind, &group_id, fallback)
            .await?
        {
            return Ok(variant);
        }
    }

    Ok(item)
}

/// Look a slug up in `lang`, then across every fallback language, and
/// resolve the hit back to `lang`.
pub async fn find_by_slug(
    store: &dyn ContentStore,
    kind: ContentKind,
    lang: Language,
    slug: &str,
) -> ContentResult<Option<ContentItem>> {
    let search = std::iter::once(lang).chain(FALLBACK_ORDER.into_iter().filter(|l| *l != lang));

    for candidate in search {
        if let Some(hit) = store.get_by_slug(kind, candidate, slug).await? {
            return resolve_variant(store, hit, lang).await.map(Some);
        }
    }
    Ok(None)
}

/// Every stored variant of a group, keyed by language.
pub async fn group_variants(
    store: &dyn ContentStore,
    kind: ContentKind,
    group_id: &GroupId,
) -> ContentResult<LanguageMap<ContentItem>> {
    let mut variants = LanguageMap::new();
    for lang in Language::all() {
        if let Some(item) = store.get_by_group_and_lang(kind, group_id, lang).await? {
            variants.insert(lang, item);
        }
    }
    Ok(variants)
}

/// Pick one row per group for `lang`, ordered by `(sort_order, id)`.
///
/// Ungrouped rows stand alone. Within a group the `lang` row wins, else the
/// earliest language in [`FALLBACK_ORDER`].
pub fn pick_variants(items: Vec<ContentItem>, lang: Language) -> Vec<ContentItem> {
    let rank = |item: &ContentItem| {
        if item.lang == lang {
            0
        } else {
            1 + FALLBACK_ORDER
                .iter()
                .position(|l| *l == item.lang)
                .unwrap_or(FALLBACK_ORDER.len())
        }
    };

    let mut chosen: HashMap<GroupKey, ContentItem> = HashMap::new();
    for item in items {
        let key = GroupKey::of(&item);
        match chosen.get(&key) {
            Some(current) if rank(current) <= rank(&item) => {}
            _ => {
                chosen.insert(key, item);
            }
        }
    }

    let mut picked: Vec<ContentItem> = chosen.into_values().collect();
    picked.sort_by_key(|item| (item.sort_order, item.id));
    picked
}

#[derive(PartialEq, Eq, Hash)]
enum GroupKey {
    Group(GroupId),
    Single(i64),
}

impl GroupKey {
    fn of(item: &ContentItem) -> Self {
        match &item.group_id {
            Some(group_id) => GroupKey::Group(group_id.clone()),
            None => GroupKey::Single(item.id),
        }
    }
}

/// Public listing for `lang`: published rows, one per group.
pub async fn list_resolved(
    store: &dyn ContentStore,
    kind: ContentKind,
    lang: Language,
) -> ContentResult<Vec<ContentItem>> {
    let published = store
        .list(kind, None)
        .await?
        .into_iter()
        .filter(|item| item.published)
        .collect();
    Ok(pick_variants(published, lang))
}

/// Which variant's id holds the group's additional images.
///
/// Galleries were historically attached to whichever variant was edited, so
/// the owner is the first of `[en, sk, hu, base]` with any images, or the
/// first candidate when none has any. Never fails: lookup errors yield
/// `base.id`.
pub async fn resolve_gallery_owner(store: &dyn ContentStore, base: &ContentItem) -> i64 {
    let (Some(group_id), Some(tag)) = (&base.group_id, base.kind.gallery_tag()) else {
        return base.id;
    };

    let mut candidates = Vec::with_capacity(FALLBACK_ORDER.len() + 1);
    for lang in FALLBACK_ORDER {
        match store.get_by_group_and_lang(base.kind, group_id, lang).await {
            Ok(Some(variant)) => candidates.push(variant.id),
            Ok(None) => {}
            Err(_) => return base.id,
        }
    }
    candidates.push(base.id);

    let mut seen = Vec::with_capacity(candidates.len());
    candidates.retain(|id| {
        if seen.contains(id) {
            false
        } else {
            seen.push(*id);
            true
        }
    });

    for &id in &candidates {
        match store.get_additional_images(tag, id).await {
            Ok(images) if !images.is_empty() => return id,
            Ok(_) => {}
            Err(_) => return base.id,
        }
    }

    candidates[0]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{FieldSet, ImageItem, NewContentItem, SharedUpdate};
    use crate::store::MemoryStore;

    async fn variant(
        store: &MemoryStore,
        group: Option<&GroupId>,
        lang: Language,
        slug: &str,
        title: &str,
    ) -> ContentItem {
        store
            .create(NewContentItem {
                kind: ContentKind::Event,
                lang,
                group_id: group.cloned(),
                slug: Some(slug.to_string()),
                fields: FieldSet::new().with("title", title),
                shared: FieldSet::new(),
                lead_url: None,
                sort_order: 0,
                published: true,
            })
            .await
            .unwrap()
    }

    fn image(url: &str) -> ImageItem {
        ImageItem {
            image_url: url.to_string(),
            alt_text: String::new(),
            sort_order: 0,
        }
    }

    // ==================== resolve_variant Tests ====================

    #[tokio::test]
    async fn test_ungrouped_item_returned_unchanged() {
        let store = MemoryStore::new();
        let item = variant(&store, None, Language::SLOVAK, "solo", "Solo").await;
        let resolved = resolve_variant(&store, item.clone(), Language::ENGLISH)
            .await
            .unwrap();
        assert_eq!(resolved, item);
    }

    #[tokio::test]
    async fn test_requested_variant_preferred() {
        let store = MemoryStore::new();
        let group = GroupId::generate();
        let en = variant(&store, Some(&group), Language::ENGLISH, "a", "Launch").await;
        let hu = variant(&store, Some(&group), Language::HUNGARIAN, "a", "Indulás").await;

        let resolved = resolve_variant(&store, en, Language::HUNGARIAN).await.unwrap();
        assert_eq!(resolved.id, hu.id);
    }

    #[tokio::test]
    async fn test_falls_back_in_order() {
        let store = MemoryStore::new();
        let group = GroupId::generate();
        let sk = variant(&store, Some(&group), Language::SLOVAK, "a", "Spustenie").await;
        let hu = variant(&store, Some(&group), Language::HUNGARIAN, "a", "Indulás").await;

        // No English row: sk precedes hu in the fallback order
        let resolved = resolve_variant(&store, hu.clone(), Language::ENGLISH)
            .await
            .unwrap();
        assert_eq!(resolved.id, sk.id);

        let en = variant(&store, Some(&group), Language::ENGLISH, "a", "Launch").await;
        let resolved = resolve_variant(&store, hu, Language::ENGLISH).await.unwrap();
        assert_eq!(resolved.id, en.id);
    }

    #[tokio::test]
    async fn test_resolution_is_total() {
        let store = MemoryStore::new();
        let group = GroupId::generate();
        let only = variant(&store, Some(&group), Language::HUNGARIAN, "a", "Indulás").await;

        for lang in Language::all() {
            let resolved = resolve_variant(&store, only.clone(), lang).await.unwrap();
            assert_eq!(resolved.id, only.id);
        }
    }

    // ==================== find_by_slug Tests ====================

    #[tokio::test]
    async fn test_find_by_slug_in_other_language() {
        let store = MemoryStore::new();
        let group = GroupId::generate();
        let en = variant(&store, Some(&group), Language::ENGLISH, "launch", "Launch").await;
        variant(&store, Some(&group), Language::SLOVAK, "spustenie", "Spustenie").await;

        // A Slovak slug requested with ?lang=en lands on the English variant
        let found = find_by_slug(&store, ContentKind::Event, Language::ENGLISH, "spustenie")
            .await
            .unwrap();
        assert_eq!(found.map(|i| i.id), Some(en.id));
    }

    #[tokio::test]
    async fn test_find_by_slug_missing() {
        let store = MemoryStore::new();
        let found = find_by_slug(&store, ContentKind::Event, Language::SLOVAK, "nope")
            .await
            .unwrap();
        assert!(found.is_none());
    }

    // ==================== Listing Tests ====================

    #[tokio::test]
    async fn test_group_variants() {
        let store = MemoryStore::new();
        let group = GroupId::generate();
        variant(&store, Some(&group), Language::ENGLISH, "a", "Launch").await;
        variant(&store, Some(&group), Language::HUNGARIAN, "a", "Indulás").await;

        let variants = group_variants(&store, ContentKind::Event, &group).await.unwrap();
        let langs: Vec<_> = variants.keys().copied().collect();
        assert_eq!(langs, vec![Language::ENGLISH, Language::HUNGARIAN]);
    }

    #[tokio::test]
    async fn test_list_resolved_one_per_group() {
        let store = MemoryStore::new();
        let first = GroupId::generate();
        let second = GroupId::generate();
        variant(&store, Some(&first), Language::ENGLISH, "a", "A").await;
        let a_sk = variant(&store, Some(&first), Language::SLOVAK, "a", "A sk").await;
        let b_hu = variant(&store, Some(&second), Language::HUNGARIAN, "b", "B hu").await;
        let solo = variant(&store, None, Language::ENGLISH, "c", "C").await;

        let listed = list_resolved(&store, ContentKind::Event, Language::SLOVAK)
            .await
            .unwrap();
        let ids: Vec<_> = listed.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![a_sk.id, b_hu.id, solo.id]);
    }

    #[tokio::test]
    async fn test_list_resolved_skips_unpublished() {
        let store = MemoryStore::new();
        let group = GroupId::generate();
        variant(&store, Some(&group), Language::ENGLISH, "a", "A").await;
        store
            .update_shared_for_group(
                ContentKind::Event,
                &group,
                &SharedUpdate {
                    published: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let listed = list_resolved(&store, ContentKind::Event, Language::ENGLISH)
            .await
            .unwrap();
        assert!(listed.is_empty());
    }

    #[test]
    fn test_pick_variants_orders_by_sort_order() {
        let now = chrono::Utc::now();
        let row = |id: i64, sort_order: i32| ContentItem {
            id,
            kind: ContentKind::Theme,
            lang: Language::ENGLISH,
            group_id: None,
            slug: None,
            fields: FieldSet::new(),
            shared: FieldSet::new(),
            lead_url: None,
            sort_order,
            published: true,
            created_at: now,
            updated_at: now,
        };
        let picked = pick_variants(vec![row(1, 9), row(2, 0), row(3, 0)], Language::ENGLISH);
        let ids: Vec<_> = picked.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    // ==================== Gallery Owner Tests ====================

    #[tokio::test]
    async fn test_gallery_owner_is_variant_with_images() {
        let store = MemoryStore::new();
        let group = GroupId::generate();
        let en = variant(&store, Some(&group), Language::ENGLISH, "a", "Launch").await;
        let sk = variant(&store, Some(&group), Language::SLOVAK, "a", "Spustenie").await;
        let hu = variant(&store, Some(&group), Language::HUNGARIAN, "a", "Indulás").await;
        store
            .replace_additional_image_items("event", sk.id, &[image("/1.jpg"), image("/2.jpg")])
            .await
            .unwrap();

        for base in [&en, &sk, &hu] {
            assert_eq!(resolve_gallery_owner(&store, base).await, sk.id);
        }
    }

    #[tokio::test]
    async fn test_gallery_owner_defaults_to_first_candidate() {
        let store = MemoryStore::new();
        let group = GroupId::generate();
        let sk = variant(&store, Some(&group), Language::SLOVAK, "a", "Spustenie").await;
        let hu = variant(&store, Some(&group), Language::HUNGARIAN, "a", "Indulás").await;

        assert_eq!(resolve_gallery_owner(&store, &hu).await, sk.id);
    }

    #[tokio::test]
    async fn test_gallery_owner_of_ungrouped_item() {
        let store = MemoryStore::new();
        let solo = variant(&store, None, Language::HUNGARIAN, "a", "Solo").await;
        assert_eq!(resolve_gallery_owner(&store, &solo).await, solo.id);
    }
}
