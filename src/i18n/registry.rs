//! Supported languages and their metadata.
//!
//! The table order is significant: it is the enumeration order used when
//! picking a source language for replication, and the sort order of
//! [`super::Language`].

/// Metadata for one supported language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageConfig {
    /// ISO 639-1 code stored in the `lang` column.
    pub code: &'static str,
    pub name: &'static str,
    pub native_name: &'static str,
    /// The language used when a request names none (exactly one entry).
    pub is_canonical: bool,
    /// Disabled languages are rejected by `?lang=` and skipped by replication.
    pub enabled: bool,
}

const LANGUAGES: &[LanguageConfig] = &[
    LanguageConfig {
        code: "en",
        name: "English",
        native_name: "English",
        is_canonical: true,
        enabled: true,
    },
    LanguageConfig {
        code: "sk",
        name: "Slovak",
        native_name: "Slovenčina",
        is_canonical: false,
        enabled: true,
    },
    LanguageConfig {
        code: "hu",
        name: "Hungarian",
        native_name: "Magyar",
        is_canonical: false,
        enabled: true,
    },
];

static REGISTRY: LanguageRegistry = LanguageRegistry {
    languages: LANGUAGES,
};

/// Read-only view over the language table.
#[derive(Debug)]
pub struct LanguageRegistry {
    languages: &'static [LanguageConfig],
}

impl LanguageRegistry {
    pub fn get() -> &'static LanguageRegistry {
        &REGISTRY
    }

    pub fn get_by_code(&self, code: &str) -> Option<&'static LanguageConfig> {
        self.languages.iter().find(|lang| lang.code == code)
    }

    /// Index of `code` in the table, if registered.
    pub fn position(&self, code: &str) -> Option<usize> {
        self.languages.iter().position(|lang| lang.code == code)
    }

    pub fn list_enabled(&self) -> impl Iterator<Item = &'static LanguageConfig> {
        self.languages.iter().filter(|lang| lang.enabled)
    }

    /// The canonical entry; the first row if none is flagged.
    pub fn canonical(&self) -> &'static LanguageConfig {
        self.languages
            .iter()
            .find(|lang| lang.is_canonical)
            .unwrap_or(&self.languages[0])
    }

    pub fn is_enabled(&self, code: &str) -> bool {
        self.get_by_code(code).is_some_and(|lang| lang.enabled)
    }
}
