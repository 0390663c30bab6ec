//! Create and edit language groups from partially filled multilingual input.
//!
//! Operators usually type content in one language. Creation copies that
//! content into every language that was left empty; editing fills only the
//! fields that are still empty in storage, so translations entered later
//! are never overwritten by replication.

use super::kind::{ContentKind, TitleSource};
use super::model::{ContentItem, FieldSet, GroupId, LanguageMap, NewContentItem, SharedUpdate};
use super::slug::{slugify, unique_slug_for};
use crate::error::{ContentError, ContentResult};
use crate::i18n::Language;
use crate::store::ContentStore;
use serde::Serialize;

/// One submitted multilingual form, already split by language.
#[derive(Debug, Clone, PartialEq)]
pub struct PostedContent {
    pub kind: ContentKind,
    pub text: LanguageMap<FieldSet>,
    pub shared: SharedUpdate,
    pub lead_url: Option<String>,
}

impl PostedContent {
    pub fn new(kind: ContentKind) -> Self {
        Self {
            kind,
            text: LanguageMap::new(),
            shared: SharedUpdate::default(),
            lead_url: None,
        }
    }

    /// Set a per-language text field; blank values are dropped.
    pub fn with_text(mut self, lang: Language, field: &str, value: &str) -> Self {
        self.text.entry(lang).or_default().set(field, value);
        self
    }

    pub fn with_shared(mut self, field: &str, value: &str) -> Self {
        self.shared.values.set(field, value);
        self
    }

    fn text_in(&self, lang: Language) -> Option<&FieldSet> {
        self.text.get(&lang)
    }

    /// Languages that count as filled in, in enumeration order.
    ///
    /// A language is filled when its title is present; kinds without a
    /// per-language title count any non-empty text field.
    pub fn filled_languages(&self) -> Vec<Language> {
        let fields = self.kind.text_fields();
        Language::all()
            .into_iter()
            .filter(|lang| match (self.kind.title_source(), self.text_in(*lang)) {
                (_, None) => false,
                (TitleSource::Text(title), Some(text)) => text.get(title).is_some(),
                (_, Some(text)) => text.has_any(fields),
            })
            .collect()
    }

    /// First language carrying any non-empty text field.
    pub fn source_language(&self) -> Option<Language> {
        let fields = self.kind.text_fields();
        Language::all()
            .into_iter()
            .find(|lang| self.text_in(*lang).is_some_and(|t| t.has_any(fields)))
    }

    fn validate_for_create(&self) -> ContentResult<()> {
        let shared = &self.shared.values;
        match self.kind.title_source() {
            TitleSource::Shared(field) => {
                if shared.get(field).is_none() {
                    return Err(ContentError::missing_name());
                }
            }
            TitleSource::Text(_) | TitleSource::AnyField => {
                if self.filled_languages().is_empty() {
                    return Err(ContentError::missing_title());
                }
            }
        }

        if self
            .kind
            .required_shared()
            .iter()
            .any(|field| shared.get(field).is_none())
        {
            return Err(match self.kind {
                ContentKind::Team => ContentError::missing_name(),
                _ => ContentError::missing_event_details(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreatedGroup {
    pub group_id: GroupId,
    pub ids: LanguageMap<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdatedGroup {
    pub group_id: GroupId,
    /// Existing variants whose text changed.
    pub updated: LanguageMap<i64>,
    /// Variants that did not exist before this edit.
    pub created: LanguageMap<i64>,
}

/// Copy every field missing from `target` out of `source`.
fn fill_from(target: &mut FieldSet, source: Option<&FieldSet>, fields: &[&str]) {
    let Some(source) = source else { return };
    for field in fields {
        if target.get(field).is_none() {
            if let Some(value) = source.get(field) {
                target.set(field, value);
            }
        }
    }
}

/// Whether a variant with these values has something to show as its title.
fn has_title(kind: ContentKind, fields: &FieldSet, shared: &FieldSet) -> bool {
    match kind.title_source() {
        TitleSource::Text(field) => fields.get(field).is_some(),
        TitleSource::Shared(field) => shared.get(field).is_some(),
        TitleSource::AnyField => fields.has_any(kind.text_fields()),
    }
}

fn slug_base(kind: ContentKind, fields: &FieldSet) -> String {
    match kind.title_source() {
        TitleSource::Text(field) => fields.get(field).map(slugify).unwrap_or_default(),
        _ => String::new(),
    }
}

/// Create a new group with one row per supported language.
///
/// Validation runs before anything is written. Languages left empty get the
/// source language's text, so every language ends up with a row.
pub async fn create_group(
    store: &dyn ContentStore,
    posted: &PostedContent,
) -> ContentResult<CreatedGroup> {
    posted.validate_for_create()?;

    let kind = posted.kind;
    let fields = kind.text_fields();
    let source = posted
        .source_language()
        .and_then(|lang| posted.text_in(lang));
    let group_id = GroupId::generate();
    let mut ids = LanguageMap::new();

    for lang in Language::all() {
        let mut text = posted.text_in(lang).cloned().unwrap_or_default();
        fill_from(&mut text, source, fields);

        let slug = if kind.has_slug() {
            Some(unique_slug_for(store, kind, lang, &slug_base(kind, &text)).await?)
        } else {
            None
        };

        let created = store
            .create(NewContentItem {
                kind,
                lang,
                group_id: Some(group_id.clone()),
                slug,
                fields: text,
                shared: posted.shared.values.clone(),
                lead_url: posted.lead_url.clone(),
                sort_order: posted.shared.sort_order.unwrap_or(0),
                published: posted.shared.published.unwrap_or(true),
            })
            .await?;
        ids.insert(lang, created.id);
    }

    Ok(CreatedGroup { group_id, ids })
}

/// Apply an edit submitted against `base_id` to its whole group.
///
/// Legacy rows without a group get one first. Posted text wins; fields
/// left empty in the form are backfilled from the source language only
/// where the stored value is empty too. Missing variants are created.
/// Shared values go out last so that new variants receive them as well.
pub async fn update_group(
    store: &dyn ContentStore,
    kind: ContentKind,
    base_id: i64,
    posted: &PostedContent,
) -> ContentResult<UpdatedGroup> {
    let base = store
        .get(kind, base_id)
        .await?
        .ok_or(ContentError::NotFound { kind, id: base_id })?;

    let group_id = match &base.group_id {
        Some(group_id) => group_id.clone(),
        None => {
            let minted = GroupId::generate();
            store.set_group(kind, base.id, &minted).await?;
            minted
        }
    };

    let fields = kind.text_fields();
    let source = posted
        .source_language()
        .and_then(|lang| posted.text_in(lang));
    let mut updated = LanguageMap::new();
    let mut created = LanguageMap::new();

    for lang in Language::all() {
        let posted_text = posted.text_in(lang);
        match store.get_by_group_and_lang(kind, &group_id, lang).await? {
            Some(existing) => {
                let mut merged = existing.fields.clone();
                for field in fields {
                    if let Some(value) = posted_text.and_then(|t| t.get(field)) {
                        merged.set(field, value);
                    } else if existing.fields.get(field).is_none() {
                        if let Some(value) = source.and_then(|s| s.get(field)) {
                            merged.set(field, value);
                        }
                    }
                }
                if merged != existing.fields {
                    store.update_fields(existing.id, &merged).await?;
                    updated.insert(lang, existing.id);
                }
            }
            None => {
                if let Some(id) =
                    create_missing_variant(store, &base, &group_id, lang, posted_text, source, posted)
                        .await?
                {
                    created.insert(lang, id);
                }
            }
        }
    }

    if !posted.shared.is_empty() {
        store
            .update_shared_for_group(kind, &group_id, &posted.shared)
            .await?;
    }
    if let Some(lead) = &posted.lead_url {
        store.set_lead_for_group(kind, base.id, Some(lead)).await?;
    }

    Ok(UpdatedGroup {
        group_id,
        updated,
        created,
    })
}

async fn create_missing_variant(
    store: &dyn ContentStore,
    base: &ContentItem,
    group_id: &GroupId,
    lang: Language,
    posted_text: Option<&FieldSet>,
    source: Option<&FieldSet>,
    posted: &PostedContent,
) -> ContentResult<Option<i64>> {
    let kind = base.kind;
    let fields = kind.text_fields();

    let mut text = posted_text.cloned().unwrap_or_default();
    fill_from(&mut text, source, fields);
    fill_from(&mut text, Some(&base.fields), fields);

    let mut shared = base.shared.clone();
    for (name, value) in posted.shared.values.iter() {
        shared.set(name, value);
    }
    if !has_title(kind, &text, &shared) {
        return Ok(None);
    }

    let slug = if kind.has_slug() {
        let seed = match &base.slug {
            Some(slug) if !slug.is_empty() => slug.clone(),
            _ => slug_base(kind, &text),
        };
        Some(unique_slug_for(store, kind, lang, &seed).await?)
    } else {
        None
    };

    let row = store
        .create(NewContentItem {
            kind,
            lang,
            group_id: Some(group_id.clone()),
            slug,
            fields: text,
            shared: base.shared.clone(),
            lead_url: base.lead_url.clone(),
            sort_order: base.sort_order,
            published: base.published,
        })
        .await?;
    Ok(Some(row.id))
}

/// Delete the group `id` belongs to (or just `id` when ungrouped).
///
/// Returns the number of rows removed.
pub async fn delete_group(store: &dyn ContentStore, kind: ContentKind, id: i64) -> ContentResult<u64> {
    let base = store
        .get(kind, id)
        .await?
        .ok_or(ContentError::NotFound { kind, id })?;

    match &base.group_id {
        Some(group_id) => Ok(store.delete_group(kind, group_id).await?),
        None => {
            store.delete(kind, base.id).await?;
            Ok(1)
        }
    }
}
