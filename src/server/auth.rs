use super::error::{AppError, AppErrorKind};
use super::AppState;
use crate::i18n::Language;
use crate::security::verify_basic_auth;
use axum::async_trait;
use axum::extract::{FromRequestParts, Query};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use serde::Deserialize;
use tracing::warn;

/// `?lang=` query parameter.
#[derive(Debug, Default, Deserialize)]
pub struct LangQuery {
    pub lang: Option<String>,
}

impl LangQuery {
    pub fn language(&self) -> Language {
        Language::from_query(self.lang.as_deref())
    }
}

pub(super) fn request_language(parts: &Parts) -> Language {
    Query::<LangQuery>::try_from_uri(&parts.uri)
        .map(|Query(q)| q.language())
        .unwrap_or_else(|_| Language::canonical())
}

/// Proof that the request carried valid admin Basic credentials.
///
/// Add it as a handler argument to protect a route.
#[derive(Debug, Clone, Copy)]
pub struct AdminAuth;

#[async_trait]
impl FromRequestParts<AppState> for AdminAuth {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok());

        if verify_basic_auth(header, &state.admin.user, &state.admin.password) {
            return Ok(AdminAuth);
        }

        warn!(path = %parts.uri.path(), "Rejected admin request without valid credentials");
        Err(AppError::new(AppErrorKind::Unauthorized, request_language(parts)))
    }
}
