//! HTTP surface: router, handlers and error responses.
//!
//! # Endpoints
//!
//! - `GET /lookup/:source_lang/:target_lang/:word`: stored record, or a fresh
//!   translation persisted on miss
//! - `GET /list/:language/?word=&limit=10&page=1&desc=true`: prefix listing
//! - `DELETE /delete/:language/:word`: idempotent removal, 204
//! - `GET /health`

use crate::models::{InvalidLanguageCode, LanguageCode, WordRecord};
use crate::repository::WordRepository;
use crate::store::{DocumentStore, StoreError};
use crate::translation::{translate_word, Translator};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get};
use axum::{Json, Router};
use serde::de::{self, Unexpected};
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

/// Shared collaborators handed to every request
#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn DocumentStore>,
    translator: Arc<dyn Translator>,
}

impl AppState {
    pub fn new(store: Arc<dyn DocumentStore>, translator: Arc<dyn Translator>) -> Self {
        Self { store, translator }
    }

    /// Fresh repository handle scoped to one language partition
    fn repository(&self, language: LanguageCode) -> WordRepository {
        WordRepository::new(Arc::clone(&self.store), language)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    InvalidLanguage(#[from] InvalidLanguageCode),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("{0:#}")]
    Translation(anyhow::Error),
}

const INTERNAL_ERROR_MESSAGE: &str = "internal server error";

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            ServiceError::InvalidLanguage(_) => StatusCode::BAD_REQUEST,
            ServiceError::Store(_) | ServiceError::Translation(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        // Server-side causes stay in the log
        let message = if status.is_server_error() {
            error!("Request failed: {}", self);
            INTERNAL_ERROR_MESSAGE.to_string()
        } else {
            warn!("Rejected request: {}", self);
            self.to_string()
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/lookup/:source_lang/:target_lang/:word", get(lookup))
        .route("/list/:language", get(list_words))
        .route("/list/:language/", get(list_words))
        .route("/delete/:language/:word", delete(delete_word))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

/// Look up `word` in the source partition, translating on a miss.
///
/// Response shape depends on the branch taken:
/// - stored record with the target: the record narrowed to that translation
/// - no stored record: the new record, which is also persisted
/// - stored record without the target: the adapter's single-translation
///   record, while the merged record is persisted
async fn lookup(
    State(state): State<AppState>,
    Path((source_lang, target_lang, word)): Path<(String, String, String)>,
) -> Result<Json<WordRecord>, ServiceError> {
    let source = LanguageCode::from_code(&source_lang)?;
    let target = LanguageCode::from_code(&target_lang)?;
    let translator = state.translator.as_ref();
    let repo = state.repository(source.clone());

    let Some(mut stored) = repo.find_by_name(&word).await? else {
        info!("Lookup miss for '{}' in {}, translating to {}", word, source, target);
        let record = translate_word(translator, &word, source.as_str(), target.as_str())
            .await
            .map_err(ServiceError::Translation)?;
        repo.create(&record).await?;
        return Ok(Json(record));
    };

    if let Some(narrowed) = stored.narrowed_to(target.as_str()) {
        info!("Lookup hit for '{}' in {} with {} translation", word, source, target);
        return Ok(Json(narrowed));
    }

    info!(
        "Lookup hit for '{}' in {} without {} translation, merging",
        word, source, target
    );
    let translated = translate_word(translator, &word, source.as_str(), target.as_str())
        .await
        .map_err(ServiceError::Translation)?;

    if let Some(text) = translated.translation_for(target.as_str()) {
        stored.add_translation(target.as_str(), text);
    }
    repo.create(&stored).await?;

    Ok(Json(translated))
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub word: String,
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_desc", deserialize_with = "deserialize_flag")]
    pub desc: bool,
}

fn default_limit() -> u32 {
    10
}

fn default_page() -> u32 {
    1
}

fn default_desc() -> bool {
    true
}

/// Query-string boolean: true/false, 1/0, yes/no, on/off, t/f, y/n in any case
fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" | "t" | "y" => Some(true),
        "false" | "0" | "no" | "off" | "f" | "n" => Some(false),
        _ => None,
    }
}

fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_flag(&raw).ok_or_else(|| {
        de::Error::invalid_value(Unexpected::Str(&raw), &"a boolean such as true, 0 or no")
    })
}

/// List records in a partition whose name starts with `word`
async fn list_words(
    State(state): State<AppState>,
    Path(language): Path<String>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<WordRecord>>, ServiceError> {
    let repo = state.repository(LanguageCode::from_code(&language)?);

    let records = repo
        .list(&params.word, params.limit, params.page, params.desc)
        .await?;

    Ok(Json(records))
}

/// Delete `word` from a partition; 204 whether or not it existed
async fn delete_word(
    State(state): State<AppState>,
    Path((language, word)): Path<(String, String)>,
) -> Result<StatusCode, ServiceError> {
    let repo = state.repository(LanguageCode::from_code(&language)?);

    repo.delete(&word).await?;
    info!("Deleted '{}' from {}", word, repo.language());

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_params_defaults() {
        let params: ListParams = serde_json::from_str("{}").expect("Should parse");

        assert_eq!(params.word, "");
        assert_eq!(params.limit, 10);
        assert_eq!(params.page, 1);
        assert!(params.desc);
    }

    #[test]
    fn test_parse_flag_accepts_common_spellings() {
        for raw in ["true", "True", "TRUE", "1", "yes", "On", "t", "Y"] {
            assert_eq!(parse_flag(raw), Some(true), "{}", raw);
        }
        for raw in ["false", "False", "0", "no", "OFF", "f", "n"] {
            assert_eq!(parse_flag(raw), Some(false), "{}", raw);
        }
        for raw in ["", "2", "maybe", "truee"] {
            assert_eq!(parse_flag(raw), None, "{}", raw);
        }
    }

    #[test]
    fn test_list_params_desc_from_string() {
        let params: ListParams =
            serde_json::from_str(r#"{"desc": "False"}"#).expect("Should parse");
        assert!(!params.desc);

        let result: Result<ListParams, _> = serde_json::from_str(r#"{"desc": "maybe"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_language_is_bad_request() {
        let err = ServiceError::from(InvalidLanguageCode("xyz".to_string()));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_store_failure_is_server_error() {
        let err = ServiceError::from(StoreError::Unavailable("down".to_string()));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_server_error_body_hides_cause() {
        let err = ServiceError::from(StoreError::Unavailable("pool at db-7 down".to_string()));
        let response = err.into_response();

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let body: serde_json::Value = serde_json::from_slice(&bytes).expect("json");
        assert_eq!(body, serde_json::json!({"error": "internal server error"}));
    }

    #[tokio::test]
    async fn test_bad_request_body_names_the_code() {
        let err = ServiceError::from(InvalidLanguageCode("xyz".to_string()));
        let response = err.into_response();

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let body: serde_json::Value = serde_json::from_slice(&bytes).expect("json");
        assert!(body["error"].as_str().expect("message").contains("xyz"));
    }

    #[test]
    fn test_translation_failure_message_keeps_cause() {
        let cause = anyhow::anyhow!("Google Translate API error (400 Bad Request): bad pair");
        let err = ServiceError::Translation(cause.context("Translation of 'algo' failed"));

        let message = err.to_string();
        assert!(message.contains("'algo'"));
        assert!(message.contains("bad pair"));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
