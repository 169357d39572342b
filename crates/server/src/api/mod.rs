pub mod flyway;
pub mod handlers;
pub mod media;
pub mod middleware;
pub mod movies;
pub mod prediction;
pub mod routes;
pub mod training;

pub use routes::create_router;

use axum::http::StatusCode;
use axum::Json;
use once_cell::sync::Lazy;
use regex_lite::Regex;
use serde::Serialize;

use reardiff_core::StoreError;

static IMDB_ID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^tt[0-9]{7,8}$").unwrap());
static HASH_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-f0-9]{40}$").unwrap());

/// Error body shared by every failing endpoint.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub message: String,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

fn error_response(status: StatusCode, error: &str, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            success: false,
            error: error.to_string(),
            message: message.into(),
        }),
    )
}

/// Map store failures to their HTTP classification.
pub fn store_error(e: StoreError) -> ApiError {
    let (status, error) = match &e {
        StoreError::NotFound(_) => (StatusCode::NOT_FOUND, "NotFound"),
        StoreError::AlreadyDeleted(_) => (StatusCode::CONFLICT, "AlreadyDeleted"),
        StoreError::NoFieldsToUpdate => (StatusCode::BAD_REQUEST, "NoFieldsToUpdate"),
        StoreError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "StoreError"),
    };
    error_response(status, error, e.to_string())
}

pub fn validation_error(message: impl Into<String>) -> ApiError {
    error_response(
        StatusCode::UNPROCESSABLE_ENTITY,
        "ValidationError",
        message,
    )
}

pub fn identifier_mismatch() -> ApiError {
    error_response(
        StatusCode::BAD_REQUEST,
        "IdentifierMismatch",
        "Path identifier and body identifier do not match",
    )
}

/// Validate an IMDB id (`tt` + 7-8 digits), rejecting before any store access.
pub fn ensure_imdb_id(imdb_id: &str) -> Result<(), ApiError> {
    if IMDB_ID_RE.is_match(imdb_id) {
        Ok(())
    } else {
        Err(validation_error(format!(
            "Invalid IMDB ID (expected tt followed by 7-8 digits): {}",
            imdb_id
        )))
    }
}

/// Validate a media hash (exactly 40 lowercase hex chars).
pub fn ensure_hash(hash: &str) -> Result<(), ApiError> {
    if HASH_RE.is_match(hash) {
        Ok(())
    } else {
        Err(validation_error(format!(
            "Invalid hash (expected 40 lowercase hex characters): {}",
            hash
        )))
    }
}

/// Split a single-or-comma-separated id parameter, validating each entry.
pub fn parse_imdb_ids(raw: Option<&str>) -> Result<Vec<String>, ApiError> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };
    let mut ids = Vec::new();
    for id in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        ensure_imdb_id(id)?;
        ids.push(id.to_string());
    }
    Ok(ids)
}

pub(crate) fn default_limit() -> u32 {
    100
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_imdb_id() {
        assert!(ensure_imdb_id("tt1234567").is_ok());
        assert!(ensure_imdb_id("tt12345678").is_ok());
        assert!(ensure_imdb_id("tt123456").is_err());
        assert!(ensure_imdb_id("nm1234567").is_err());
        assert!(ensure_imdb_id("tt123456789").is_err());
    }

    #[test]
    fn test_ensure_hash() {
        assert!(ensure_hash("55af51b9883b2e29e02fc728113747c706e480e3").is_ok());
        assert!(ensure_hash("55AF51B9883B2E29E02FC728113747C706E480E3").is_err());
        assert!(ensure_hash("55af51b9").is_err());
    }

    #[test]
    fn test_parse_imdb_ids() {
        assert!(parse_imdb_ids(None).unwrap().is_empty());
        assert_eq!(
            parse_imdb_ids(Some("tt1234567, tt7654321")).unwrap(),
            vec!["tt1234567".to_string(), "tt7654321".to_string()]
        );
        assert!(parse_imdb_ids(Some("tt1234567,bogus")).is_err());
    }

    #[test]
    fn test_store_error_mapping() {
        let (status, _) = store_error(StoreError::NotFound("x".to_string()));
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = store_error(StoreError::AlreadyDeleted("x".to_string()));
        assert_eq!(status, StatusCode::CONFLICT);
        let (status, _) = store_error(StoreError::NoFieldsToUpdate);
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _) = store_error(StoreError::Database("x".to_string()));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
