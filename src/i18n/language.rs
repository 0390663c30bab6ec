//! Language type: validated language representation.

use crate::i18n::{LanguageConfig, LanguageRegistry};
use anyhow::{bail, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;

/// A validated language.
///
/// Only supported, enabled languages can be constructed. Ordering follows
/// the registry's enumeration order (`en`, `sk`, `hu`), not the code's
/// alphabetical order, so ordered maps keyed by `Language` iterate in the
/// same order the replication engine scans languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Language {
    /// ISO 639-1 language code
    code: &'static str,
}

/// Order in which group variants are tried when the requested language is
/// missing. English first: it is the language most often filled in first.
pub const FALLBACK_ORDER: [Language; 3] = [Language::ENGLISH, Language::SLOVAK, Language::HUNGARIAN];

impl Language {
    pub const ENGLISH: Language = Language { code: "en" };
    pub const SLOVAK: Language = Language { code: "sk" };
    pub const HUNGARIAN: Language = Language { code: "hu" };

    /// Create a Language from a language code string.
    ///
    /// # Returns
    /// * `Ok(Language)` if the code is valid and the language is enabled
    /// * `Err` if the code is not found or the language is disabled
    pub fn from_code(code: &str) -> Result<Language> {
        let registry = LanguageRegistry::get();

        match registry.get_by_code(code) {
            Some(config) if config.enabled => Ok(Language { code: config.code }),
            Some(_) => bail!("Language '{}' is not enabled", code),
            None => bail!("Unknown language code: '{}'", code),
        }
    }

    /// Language for a `?lang=` query value; unknown or missing codes fall
    /// back to the canonical language.
    pub fn from_query(code: Option<&str>) -> Language {
        code.map(|c| c.trim().to_lowercase())
            .and_then(|c| Language::from_code(&c).ok())
            .unwrap_or_else(Language::canonical)
    }

    /// Every enabled language, in enumeration order.
    pub fn all() -> Vec<Language> {
        LanguageRegistry::get()
            .list_enabled()
            .map(|config| Language { code: config.code })
            .collect()
    }

    /// Get the canonical language (English).
    pub fn canonical() -> Language {
        let config = LanguageRegistry::get().canonical();
        Language { code: config.code }
    }

    /// Get the ISO 639-1 language code.
    pub fn code(&self) -> &'static str {
        self.code
    }

    /// Get the full language configuration from the registry.
    ///
    /// # Panics
    /// Panics if the language code is not found in the registry. This cannot
    /// happen for a Language built through `from_code` or the constants.
    pub fn config(&self) -> &'static LanguageConfig {
        LanguageRegistry::get()
            .get_by_code(self.code)
            .expect("Language code should always be valid")
    }

    /// Get the English name of the language.
    pub fn name(&self) -> &'static str {
        self.config().name
    }

    /// Get the native name of the language.
    pub fn native_name(&self) -> &'static str {
        self.config().native_name
    }

    pub fn is_canonical(&self) -> bool {
        self.config().is_canonical
    }

    fn position(&self) -> usize {
        LanguageRegistry::get()
            .position(self.code)
            .unwrap_or(usize::MAX)
    }
}

impl Ord for Language {
    fn cmp(&self, other: &Self) -> Ordering {
        self.position()
            .cmp(&other.position())
            .then_with(|| self.code.cmp(other.code))
    }
}

impl PartialOrd for Language {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code)
    }
}

impl Serialize for Language {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code)
    }
}

/// Only supported codes deserialize; anything else is a data error.
impl<'de> Deserialize<'de> for Language {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = String::deserialize(deserializer)?;
        Language::from_code(&code).map_err(serde::de::Error::custom)
    }
}
