//! Internationalization (i18n) module for multi-language support.
//!
//! # Architecture
//!
//! - `registry`: Single source of truth for all supported languages and their metadata
//! - `language`: Type-safe `Language` value plus the central fallback order
//! - `strings`: Localized user-facing messages
//!
//! # Example
//!
//! ```rust,ignore
//! use polyglot_cms::i18n::{Language, FALLBACK_ORDER};
//!
//! let slovak = Language::from_code("sk")?;
//! let requested = Language::from_query(Some("de")); // falls back to English
//! ```

mod language;
mod registry;
mod strings;

pub use language::{Language, FALLBACK_ORDER};
pub use registry::{LanguageConfig, LanguageRegistry};
pub use strings::LanguageStrings;
