use anyhow::{Context, Result};
use std::path::PathBuf;

const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct Config {
    // Database (None runs the in-memory store)
    pub database_url: Option<String>,
    pub db_connect_attempts: u32,

    // HTTP
    pub port: u16,

    // Admin credentials (HTTP Basic)
    pub admin_user: String,
    pub admin_password: String,

    // Uploads
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            // Database
            database_url: std::env::var("DATABASE_URL")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            db_connect_attempts: parse_var("DB_CONNECT_ATTEMPTS", 5)?,

            // HTTP
            port: parse_var("PORT", 8080)?,

            // Admin
            admin_user: std::env::var("ADMIN_USER").unwrap_or_else(|_| "admin".to_string()),
            admin_password: std::env::var("ADMIN_PASSWORD")
                .ok()
                .filter(|v| !v.is_empty())
                .context("ADMIN_PASSWORD not set")?,

            // Uploads
            upload_dir: std::env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("uploads")),
            max_upload_bytes: parse_var("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
        })
    }
}

/// Parse an optional numeric variable; a present but malformed value is an error.
fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .parse()
            .with_context(|| format!("{name} must be a number, got '{value}'")),
        _ => Ok(default),
    }
}
