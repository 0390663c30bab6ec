use crate::content::ContentKind;
use crate::error::{MISSING_EVENT_DETAILS, MISSING_NAME, MISSING_TITLE};
use crate::i18n::Language;

/// All localized user-facing strings for a language
#[derive(Debug, Clone)]
pub struct LanguageStrings {
    // ==================== Not Found Messages ====================
    pub event_not_found: &'static str,
    pub news_not_found: &'static str,
    pub theme_not_found: &'static str,
    pub team_not_found: &'static str,
    pub document_not_found: &'static str,
    pub focus_area_not_found: &'static str,
    pub page_not_found: &'static str,

    // ==================== Validation Messages ====================
    /// Shown when no language carries a title
    pub missing_title: &'static str,

    /// Shown when a team member is submitted without a name
    pub missing_name: &'static str,

    /// Shown when an event lacks its shared date or location
    pub missing_event_details: &'static str,

    /// Shown when an upload exceeds the size cap
    /// Placeholders: {limit}
    pub upload_too_large: &'static str,

    // ==================== Other Messages ====================
    pub internal_error: &'static str,
    pub unauthorized: &'static str,
}

impl LanguageStrings {
    /// Strings for a language; unknown languages get English.
    pub fn for_language(language: Language) -> &'static LanguageStrings {
        match language.code() {
            "sk" => &SLOVAK_STRINGS,
            "hu" => &HUNGARIAN_STRINGS,
            _ => &ENGLISH_STRINGS,
        }
    }

    /// Localized "not found" message for a content kind.
    pub fn not_found(&self, kind: ContentKind) -> &'static str {
        match kind {
            ContentKind::Event => self.event_not_found,
            ContentKind::News => self.news_not_found,
            ContentKind::Theme => self.theme_not_found,
            ContentKind::Team => self.team_not_found,
            ContentKind::Document => self.document_not_found,
            ContentKind::FocusArea => self.focus_area_not_found,
        }
    }

    /// Localized text for a core validation message, if one exists.
    pub fn validation(&self, message: &str) -> Option<&'static str> {
        match message {
            MISSING_TITLE => Some(self.missing_title),
            MISSING_NAME => Some(self.missing_name),
            MISSING_EVENT_DETAILS => Some(self.missing_event_details),
            _ => None,
        }
    }

    pub fn upload_too_large_message(&self, limit: usize) -> String {
        self.upload_too_large.replace("{limit}", &limit.to_string())
    }
}

// ==================== English Strings ====================

pub const ENGLISH_STRINGS: LanguageStrings = LanguageStrings {
    event_not_found: "Event Not Found",
    news_not_found: "News Not Found",
    theme_not_found: "Theme Not Found",
    team_not_found: "Team Member Not Found",
    document_not_found: "Document Not Found",
    focus_area_not_found: "Focus Area Not Found",
    page_not_found: "Page Not Found",

    missing_title: "Please enter a title in at least one language.",
    missing_name: "Please enter a name.",
    missing_event_details: "Please enter a title in at least one language and provide the shared Date and Location.",
    upload_too_large: "The uploaded file is larger than {limit} bytes.",

    internal_error: "An internal error occurred",
    unauthorized: "Authentication required",
};

// ==================== Slovak Strings ====================

pub const SLOVAK_STRINGS: LanguageStrings = LanguageStrings {
    event_not_found: "Podujatie sa nenašlo",
    news_not_found: "Novinka sa nenašla",
    theme_not_found: "Téma sa nenašla",
    team_not_found: "Člen tímu sa nenašiel",
    document_not_found: "Dokument sa nenašiel",
    focus_area_not_found: "Zameranie sa nenašlo",
    page_not_found: "Stránka sa nenašla",

    missing_title: "Zadajte názov aspoň v jednom jazyku.",
    missing_name: "Zadajte meno.",
    missing_event_details: "Zadajte názov aspoň v jednom jazyku a spoločný dátum a miesto.",
    upload_too_large: "Nahraný súbor je väčší ako {limit} bajtov.",

    internal_error: "Nastala interná chyba",
    unauthorized: "Vyžaduje sa prihlásenie",
};

// ==================== Hungarian Strings ====================

pub const HUNGARIAN_STRINGS: LanguageStrings = LanguageStrings {
    event_not_found: "Esemény nem található",
    news_not_found: "Hír nem található",
    theme_not_found: "Téma nem található",
    team_not_found: "Csapattag nem található",
    document_not_found: "Dokumentum nem található",
    focus_area_not_found: "Fókuszterület nem található",
    page_not_found: "Az oldal nem található",

    missing_title: "Adjon meg címet legalább egy nyelven.",
    missing_name: "Adjon meg nevet.",
    missing_event_details: "Adjon meg címet legalább egy nyelven, valamint a közös dátumot és helyszínt.",
    upload_too_large: "A feltöltött fájl nagyobb, mint {limit} bájt.",

    internal_error: "Belső hiba történt",
    unauthorized: "Hitelesítés szükséges",
};
