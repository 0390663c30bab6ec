//! The site's static pages: defaults seeded at startup and admin edits.

use super::model::{LanguageMap, Page};
use crate::error::{ContentError, ContentResult};
use crate::i18n::Language;
use crate::store::ContentStore;

/// A page every site carries.
#[derive(Debug, Clone, Copy)]
pub struct DefaultPage {
    pub slug: &'static str,
    /// Title per language code; the first entry is used for any other language.
    titles: &'static [(&'static str, &'static str)],
    pub content: &'static str,
}

impl DefaultPage {
    pub fn title(&self, lang: Language) -> &'static str {
        self.titles
            .iter()
            .find(|(code, _)| *code == lang.code())
            .or_else(|| self.titles.first())
            .map(|(_, title)| *title)
            .unwrap_or(self.slug)
    }

    fn page(&self, lang: Language) -> Page {
        Page {
            lang,
            slug: self.slug.to_string(),
            title: self.title(lang).to_string(),
            content: self.content.to_string(),
            image_url: None,
        }
    }
}

pub static DEFAULT_PAGES: [DefaultPage; 5] = [
    DefaultPage {
        slug: "home",
        titles: &[("en", "Home"), ("sk", "Domov"), ("hu", "Főoldal")],
        content: "<p>Welcome to our site.</p>",
    },
    DefaultPage {
        slug: "about-us",
        titles: &[("en", "About Us"), ("sk", "O nás"), ("hu", "Rólunk")],
        content: "<p>About our organization.</p>",
    },
    DefaultPage {
        slug: "focus-areas",
        titles: &[("en", "Focus Areas"), ("sk", "Zamerania"), ("hu", "Fókuszterületek")],
        content: "<p>Our key focus areas.</p>",
    },
    DefaultPage {
        slug: "gdpr",
        titles: &[("en", "GDPR")],
        content: "<p>Privacy and data protection information.</p>",
    },
    DefaultPage {
        slug: "contact",
        titles: &[("en", "Contact"), ("sk", "Kontakt"), ("hu", "Kapcsolat")],
        content: "<p>Get in touch with us.</p>",
    },
];

pub fn default_page(slug: &str) -> Option<&'static DefaultPage> {
    DEFAULT_PAGES.iter().find(|page| page.slug == slug)
}

/// Write every default page that is missing in an enabled language.
///
/// Stored pages are never touched, so running this on every start is safe.
/// Returns the number of pages written.
pub async fn ensure_default_pages(store: &dyn ContentStore) -> ContentResult<usize> {
    let mut written = 0;
    for lang in Language::all() {
        let existing = store.list_pages(lang).await?;
        for default in &DEFAULT_PAGES {
            if existing.iter().any(|page| page.slug == default.slug) {
                continue;
            }
            store.upsert_page(&default.page(lang)).await?;
            written += 1;
        }
    }
    Ok(written)
}

/// Posted text of one page in one language.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageText {
    pub title: Option<String>,
    pub content: Option<String>,
}

/// Save the posted text of the default page `slug` in every enabled language.
///
/// A blank or missing title becomes the default title. Missing content keeps
/// the stored content (or the default for a page not stored yet); posted
/// content, even blank, replaces it. The page image is never changed.
pub async fn save_page(
    store: &dyn ContentStore,
    slug: &str,
    texts: &LanguageMap<PageText>,
) -> ContentResult<Vec<Page>> {
    let default = default_page(slug).ok_or_else(|| ContentError::PageNotFound {
        slug: slug.to_string(),
    })?;

    let mut saved = Vec::new();
    for lang in Language::all() {
        let stored = store
            .list_pages(lang)
            .await?
            .into_iter()
            .find(|page| page.slug == slug);
        let text = texts.get(&lang);

        let title = text
            .and_then(|t| t.title.as_deref())
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| default.title(lang))
            .to_string();
        let content = match text.and_then(|t| t.content.as_deref()) {
            Some(posted) => posted.trim().to_string(),
            None => stored
                .as_ref()
                .map(|page| page.content.clone())
                .unwrap_or_else(|| default.content.to_string()),
        };

        let page = Page {
            lang,
            slug: default.slug.to_string(),
            title,
            content,
            image_url: stored.and_then(|page| page.image_url),
        };
        saved.push(store.upsert_page(&page).await?);
    }
    Ok(saved)
}
