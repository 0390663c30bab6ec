use crate::content::ContentKind;
use crate::error::ContentError;
use crate::i18n::{Language, LanguageStrings};
use crate::store::StoreError;
use axum::extract::multipart::MultipartError;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// What went wrong while handling a request.
#[derive(Debug, thiserror::Error)]
pub enum AppErrorKind {
    #[error(transparent)]
    Content(#[from] ContentError),

    /// Lookup by slug found nothing in any language.
    #[error("{0} not found")]
    Missing(ContentKind),

    /// The `{kind}` path segment names no content kind.
    #[error("Unknown content kind: {0}")]
    UnknownKind(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,
}

/// Handler error carrying the request language for localized messages.
#[derive(Debug)]
pub struct AppError {
    pub lang: Language,
    pub kind: AppErrorKind,
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn new(kind: AppErrorKind, lang: Language) -> Self {
        Self { lang, kind }
    }

    pub fn in_language(mut self, lang: Language) -> Self {
        self.lang = lang;
        self
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.kind, f)
    }
}

impl From<AppErrorKind> for AppError {
    fn from(kind: AppErrorKind) -> Self {
        AppError::new(kind, Language::canonical())
    }
}

impl From<ContentError> for AppError {
    fn from(err: ContentError) -> Self {
        AppErrorKind::from(err).into()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppErrorKind::from(err).into()
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        AppErrorKind::from(err).into()
    }
}

impl From<StoreError> for AppErrorKind {
    fn from(err: StoreError) -> Self {
        AppErrorKind::Content(err.into())
    }
}

impl From<MultipartError> for AppErrorKind {
    fn from(err: MultipartError) -> Self {
        AppErrorKind::BadRequest(err.body_text())
    }
}

/// Attach the request language to a fallible result.
pub trait Localize<T> {
    fn localized(self, lang: Language) -> AppResult<T>;
}

impl<T, E: Into<AppError>> Localize<T> for Result<T, E> {
    fn localized(self, lang: Language) -> AppResult<T> {
        self.map_err(|e| e.into().in_language(lang))
    }
}

fn internal(strings: &LanguageStrings, err: &dyn std::fmt::Display) -> (StatusCode, &'static str, String) {
    tracing::error!(error = %err, "Internal error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        strings.internal_error.to_string(),
    )
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let strings = LanguageStrings::for_language(self.lang);

        let (status, code, message) = match &self.kind {
            AppErrorKind::Content(err) => match err {
                ContentError::Validation(msg) => (
                    StatusCode::BAD_REQUEST,
                    "VALIDATION_ERROR",
                    strings
                        .validation(msg)
                        .map(str::to_string)
                        .unwrap_or_else(|| msg.clone()),
                ),
                ContentError::NotFound { kind, .. } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    strings.not_found(*kind).to_string(),
                ),
                ContentError::PageNotFound { .. } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    strings.page_not_found.to_string(),
                ),
                ContentError::UploadTooLarge { limit } => (
                    StatusCode::PAYLOAD_TOO_LARGE,
                    "PAYLOAD_TOO_LARGE",
                    strings.upload_too_large_message(*limit),
                ),
                ContentError::Store(StoreError::Conflict(msg)) => {
                    (StatusCode::CONFLICT, "CONFLICT", msg.clone())
                }
                ContentError::SlugExhausted { .. }
                | ContentError::Store(_)
                | ContentError::Storage(_) => internal(strings, err),
            },
            AppErrorKind::Missing(kind) => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                strings.not_found(*kind).to_string(),
            ),
            AppErrorKind::UnknownKind(_) => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                self.kind.to_string(),
            ),
            AppErrorKind::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppErrorKind::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                strings.unauthorized.to_string(),
            ),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        if status == StatusCode::UNAUTHORIZED {
            return (
                status,
                [(header::WWW_AUTHENTICATE, r#"Basic realm="admin""#)],
                axum::Json(body),
            )
                .into_response();
        }
        (status, axum::Json(body)).into_response()
    }
}
