//! URL slugs and small text sanitizers.

use super::kind::ContentKind;
use crate::error::{ContentError, ContentResult};
use crate::i18n::Language;
use crate::store::{ContentStore, StoreError};
use regex::Regex;
use std::future::Future;
use std::sync::OnceLock;
use unicode_normalization::UnicodeNormalization;

/// Maximum slug length in characters.
pub const MAX_SLUG_LEN: usize = 80;

/// Candidates tried by [`unique_slug`] before giving up.
pub const MAX_SLUG_ATTEMPTS: u32 = 50;

fn non_alphanumeric_run() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^a-z0-9]+").expect("valid slug regex"))
}

fn location_noise() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"[()'"]"#).expect("valid location regex"))
}

fn whitespace_run() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s{2,}").expect("valid whitespace regex"))
}

/// Derive a URL-safe slug from a title.
///
/// Decomposes accented characters and drops the combining marks, so
/// "Szlovák Érték" becomes "szlovak-ertek". Runs of anything outside
/// `[a-z0-9]` collapse to one hyphen.
pub fn slugify(input: &str) -> String {
    let stripped: String = input
        .nfd()
        .filter(|c| !('\u{0300}'..='\u{036f}').contains(c))
        .collect::<String>()
        .to_lowercase();

    let hyphenated = non_alphanumeric_run().replace_all(&stripped, "-");
    hyphenated
        .trim_matches('-')
        .chars()
        .take(MAX_SLUG_LEN)
        .collect()
}

/// Find a free slug in `lang`, trying `base`, `base-2`, `base-3`, ...
///
/// `exists` reports whether a candidate is taken in the given language.
/// Fails with [`ContentError::SlugExhausted`] once [`MAX_SLUG_ATTEMPTS`]
/// candidates are all taken.
pub async fn unique_slug<F, Fut>(lang: Language, base: &str, mut exists: F) -> ContentResult<String>
where
    F: FnMut(Language, String) -> Fut,
    Fut: Future<Output = Result<bool, StoreError>>,
{
    for attempt in 0..MAX_SLUG_ATTEMPTS {
        let candidate = if attempt == 0 {
            base.to_string()
        } else {
            format!("{}-{}", base, attempt + 1)
        };
        if !exists(lang, candidate.clone()).await? {
            return Ok(candidate);
        }
    }

    Err(ContentError::SlugExhausted {
        base: base.to_string(),
    })
}

/// Unique slug for a `kind` row in `lang`, checked against the store.
///
/// An empty `base` is replaced by the kind's default base.
pub async fn unique_slug_for(
    store: &dyn ContentStore,
    kind: ContentKind,
    lang: Language,
    base: &str,
) -> ContentResult<String> {
    let base = if base.is_empty() {
        kind.default_slug_base()
    } else {
        base
    };
    unique_slug(lang, base, |lang, candidate| async move {
        Ok(store.get_by_slug(kind, lang, &candidate).await?.is_some())
    })
    .await
}

/// Strip parentheses and quotes from a location and collapse whitespace.
///
/// Returns `None` when nothing is left.
pub fn sanitize_location(input: &str) -> Option<String> {
    let cleaned = location_noise().replace_all(input, "");
    let collapsed = whitespace_run().replace_all(&cleaned, " ");
    let trimmed = collapsed.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
