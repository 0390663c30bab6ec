//! Content kinds and their per-kind field layout.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Where a kind's title lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleSource {
    /// A per-language text field.
    Text(&'static str),
    /// A shared field written identically to every variant (team `name`).
    Shared(&'static str),
    /// No dedicated title: any non-empty text field counts.
    AnyField,
}

/// The content types that exist as language groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Event,
    News,
    Theme,
    Team,
    Document,
    FocusArea,
}

impl ContentKind {
    pub const ALL: [ContentKind; 6] = [
        ContentKind::Event,
        ContentKind::News,
        ContentKind::Theme,
        ContentKind::Team,
        ContentKind::Document,
        ContentKind::FocusArea,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Event => "event",
            Self::News => "news",
            Self::Theme => "theme",
            Self::Team => "team",
            Self::Document => "document",
            Self::FocusArea => "focus_area",
        }
    }

    /// Plural segment used in URLs and upload folders.
    pub fn path_segment(&self) -> &'static str {
        match self {
            Self::Event => "events",
            Self::News => "news",
            Self::Theme => "themes",
            Self::Team => "team",
            Self::Document => "documents",
            Self::FocusArea => "focus-areas",
        }
    }

    /// Per-language text fields, title-like field first.
    pub fn text_fields(&self) -> &'static [&'static str] {
        match self {
            Self::Event | Self::Theme | Self::Document => &["title", "description"],
            Self::News => &["title", "summary", "content"],
            Self::Team => &["role", "bio"],
            Self::FocusArea => &[
                "group",
                "field",
                "experts",
                "description",
                "activity_description",
                "type_of_activity",
            ],
        }
    }

    /// Attributes with no translation, written to every variant of a group.
    pub fn shared_fields(&self) -> &'static [&'static str] {
        match self {
            Self::Event => &["event_date", "location"],
            Self::News => &["published_at"],
            Self::Team => &["name", "linkedin", "facebook", "twitter"],
            Self::Document => &["file_url"],
            Self::Theme | Self::FocusArea => &[],
        }
    }

    /// Shared fields that must be present when a group is created.
    pub fn required_shared(&self) -> &'static [&'static str] {
        match self {
            Self::Event => &["event_date", "location"],
            Self::Team => &["name"],
            _ => &[],
        }
    }

    pub fn title_source(&self) -> TitleSource {
        match self {
            Self::Team => TitleSource::Shared("name"),
            Self::FocusArea => TitleSource::AnyField,
            _ => TitleSource::Text("title"),
        }
    }

    /// Whether rows of this kind carry a URL slug.
    pub fn has_slug(&self) -> bool {
        matches!(self, Self::Event | Self::News | Self::Theme)
    }

    /// Base used when a title slugifies to nothing.
    pub fn default_slug_base(&self) -> &'static str {
        match self {
            Self::Event => "event",
            Self::News => "article",
            _ => "item",
        }
    }

    /// Tag under which the kind's additional images are stored, if it has a gallery.
    pub fn gallery_tag(&self) -> Option<&'static str> {
        match self {
            Self::Event => Some("event"),
            Self::News => Some("news"),
            Self::Theme => Some("theme"),
            Self::Team => Some("team"),
            Self::Document | Self::FocusArea => None,
        }
    }
}

impl std::fmt::Display for ContentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentKind {
    type Err = String;

    /// Accepts the storage name as well as the plural path segments used in URLs.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "event" | "events" => Ok(Self::Event),
            "news" => Ok(Self::News),
            "theme" | "themes" => Ok(Self::Theme),
            "team" => Ok(Self::Team),
            "document" | "documents" => Ok(Self::Document),
            "focus_area" | "focus-areas" | "focus_areas" => Ok(Self::FocusArea),
            other => Err(format!("unknown content kind: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_through_str() {
        for kind in ContentKind::ALL {
            assert_eq!(kind.as_str().parse::<ContentKind>(), Ok(kind));
        }
    }

    #[test]
    fn test_path_segment_parses_back() {
        for kind in ContentKind::ALL {
            assert_eq!(kind.path_segment().parse::<ContentKind>(), Ok(kind));
        }
    }

    #[test]
    fn test_plural_path_segments() {
        assert_eq!("events".parse::<ContentKind>(), Ok(ContentKind::Event));
        assert_eq!("focus-areas".parse::<ContentKind>(), Ok(ContentKind::FocusArea));
        assert!("partners".parse::<ContentKind>().is_err());
    }

    #[test]
    fn test_title_field_is_first_text_field() {
        for kind in ContentKind::ALL {
            if let TitleSource::Text(field) = kind.title_source() {
                assert_eq!(kind.text_fields()[0], field);
            }
        }
    }

    #[test]
    fn test_required_shared_are_shared() {
        for kind in ContentKind::ALL {
            for field in kind.required_shared() {
                assert!(kind.shared_fields().contains(field));
            }
        }
    }

    #[test]
    fn test_slugged_kinds() {
        assert!(ContentKind::Event.has_slug());
        assert!(!ContentKind::Team.has_slug());
        assert!(!ContentKind::FocusArea.has_slug());
        assert_eq!(ContentKind::News.default_slug_base(), "article");
    }

    #[test]
    fn test_serde_snake_case() {
        assert_eq!(
            serde_json::to_string(&ContentKind::FocusArea).unwrap(),
            "\"focus_area\""
        );
    }
}
