//! Adapters from flat `${field}_${lang}` form bodies to typed submissions.

use crate::content::{sanitize_location, ContentKind, LanguageMap, PageText, PostedContent};
use crate::i18n::Language;
use std::collections::HashMap;

/// Form keys accepted for the lead image / photo reference.
const LEAD_KEYS: [&str; 3] = ["lead_url", "image_url", "photo_url"];

/// Build the typed submission for `kind` from a flat form.
///
/// Per-language text is read from `title_en`, `description_sk`, ... and
/// shared attributes from their plain names. Blank values count as absent.
/// `sort_order` is ignored unless it parses; `published` is only set when
/// the key is present (`on`/`true` mean published).
pub fn posted_content(kind: ContentKind, form: &HashMap<String, String>) -> PostedContent {
    let mut posted = PostedContent::new(kind);

    for lang in Language::all() {
        for field in kind.text_fields() {
            if let Some(value) = form.get(&format!("{}_{}", field, lang.code())) {
                posted = posted.with_text(lang, field, value);
            }
        }
    }

    for field in kind.shared_fields() {
        let Some(value) = form.get(*field) else {
            continue;
        };
        if *field == "location" {
            if let Some(location) = sanitize_location(value) {
                posted = posted.with_shared(field, &location);
            }
        } else {
            posted = posted.with_shared(field, value);
        }
    }

    posted.shared.sort_order = form
        .get("sort_order")
        .and_then(|v| v.trim().parse::<i32>().ok());
    posted.shared.published = form
        .get("published")
        .map(|v| matches!(v.trim(), "on" | "true"));
    posted.lead_url = LEAD_KEYS
        .iter()
        .filter_map(|key| form.get(*key))
        .map(|v| v.trim())
        .find(|v| !v.is_empty())
        .map(str::to_string);

    posted
}

/// Per-language page text from `title_<lang>` / `content_<lang>` keys.
///
/// Languages with neither key are left out.
pub fn posted_page_texts(form: &HashMap<String, String>) -> LanguageMap<PageText> {
    Language::all()
        .into_iter()
        .filter_map(|lang| {
            let text = PageText {
                title: form.get(&format!("title_{}", lang.code())).cloned(),
                content: form.get(&format!("content_{}", lang.code())).cloned(),
            };
            (text != PageText::default()).then_some((lang, text))
        })
        .collect()
}
