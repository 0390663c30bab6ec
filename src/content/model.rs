//! Content rows, field sets and gallery records.

use super::kind::{ContentKind, TitleSource};
use crate::i18n::Language;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Values keyed by language, iterated in enumeration order (`en`, `sk`, `hu`).
pub type LanguageMap<T> = BTreeMap<Language, T>;

/// Opaque identifier shared by all language variants of one logical item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(String);

impl GroupId {
    /// Mint a fresh group id.
    pub fn generate() -> Self {
        GroupId(uuid::Uuid::new_v4().to_string())
    }

    /// Wrap an existing stored id.
    pub fn new(id: impl Into<String>) -> Self {
        GroupId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for GroupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Named string fields where an empty value and an absent value are the same thing.
///
/// Values are stored trimmed; setting a blank value removes the key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldSet(BTreeMap<String, String>);

impl FieldSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// The non-empty value of `name`, if any.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn set(&mut self, name: &str, value: &str) {
        let value = value.trim();
        if value.is_empty() {
            self.0.remove(name);
        } else {
            self.0.insert(name.to_string(), value.to_string());
        }
    }

    pub fn with(mut self, name: &str, value: &str) -> Self {
        self.set(name, value);
        self
    }

    /// True when no field holds a non-empty value.
    pub fn is_blank(&self) -> bool {
        self.0.values().all(|v| v.trim().is_empty())
    }

    /// True when any of `names` holds a non-empty value.
    pub fn has_any(&self, names: &[&str]) -> bool {
        names.iter().any(|name| self.get(name).is_some())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FieldSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = FieldSet::new();
        for (k, v) in iter {
            set.set(&k.into(), &v.into());
        }
        set
    }
}

/// One language variant of a content item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentItem {
    pub id: i64,
    pub kind: ContentKind,
    pub lang: Language,
    pub group_id: Option<GroupId>,
    pub slug: Option<String>,
    /// Per-language text (title, description, bio, ...).
    pub fields: FieldSet,
    /// Untranslated attributes (event date, location, social links, ...).
    pub shared: FieldSet,
    /// Lead image / photo / file reference.
    pub lead_url: Option<String>,
    pub sort_order: i32,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ContentItem {
    /// The item's title according to its kind's title source.
    pub fn title(&self) -> Option<&str> {
        match self.kind.title_source() {
            TitleSource::Text(field) => self.fields.get(field),
            TitleSource::Shared(field) => self.shared.get(field),
            TitleSource::AnyField => self
                .kind
                .text_fields()
                .iter()
                .find_map(|field| self.fields.get(field)),
        }
    }
}

/// Insert payload for a new variant row.
#[derive(Debug, Clone, PartialEq)]
pub struct NewContentItem {
    pub kind: ContentKind,
    pub lang: Language,
    pub group_id: Option<GroupId>,
    pub slug: Option<String>,
    pub fields: FieldSet,
    pub shared: FieldSet,
    pub lead_url: Option<String>,
    pub sort_order: i32,
    pub published: bool,
}

/// Shared-attribute changes applied to every variant of a group.
///
/// Only present values overwrite; everything else keeps its stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SharedUpdate {
    pub values: FieldSet,
    pub sort_order: Option<i32>,
    pub published: Option<bool>,
}

impl SharedUpdate {
    pub fn is_empty(&self) -> bool {
        self.values.is_blank() && self.sort_order.is_none() && self.published.is_none()
    }
}

/// A stored gallery image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct AdditionalImage {
    pub id: i64,
    pub content_type: String,
    pub content_id: i64,
    pub image_url: String,
    pub alt_text: String,
    pub sort_order: i32,
}

/// Gallery entry as written by a wholesale replace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageItem {
    pub image_url: String,
    pub alt_text: String,
    pub sort_order: i32,
}

/// A static page, one row per `(lang, slug)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub lang: Language,
    pub slug: String,
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
}
