//! Multilingual content groups for a small CMS backend.
//!
//! Every content item exists once per supported language. Rows describing
//! the same real-world entity share a group id; reads resolve the requested
//! language with a fixed fallback order and writes replicate across the
//! group.

pub mod config;
pub mod content;
pub mod error;
pub mod form;
pub mod i18n;
pub mod retry;
pub mod security;
pub mod server;
pub mod storage;
pub mod store;
