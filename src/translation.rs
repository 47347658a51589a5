use crate::config::Config;
use crate::models::WordRecord;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// External translation provider.
///
/// One call per translation; implementations do not cache or retry.
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, source_lang: &str, target_lang: &str) -> Result<String>;
}

/// Google Cloud Translation v2 request body
#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
    format: &'static str,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    data: TranslationsData,
}

#[derive(Debug, Deserialize)]
struct TranslationsData {
    translations: Vec<Translation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Translation {
    translated_text: String,
}

/// Translator backed by the Google Cloud Translation v2 REST API
#[derive(Debug, Clone)]
pub struct GoogleTranslator {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
}

impl GoogleTranslator {
    pub fn new(client: reqwest::Client, config: &Config) -> Self {
        Self {
            client,
            api_url: config.translate_api_url.clone(),
            api_key: config.translate_api_key.clone(),
        }
    }
}

#[async_trait]
impl Translator for GoogleTranslator {
    async fn translate(&self, text: &str, source_lang: &str, target_lang: &str) -> Result<String> {
        debug!("Translating '{}' from {} to {}", text, source_lang, target_lang);

        let request = TranslateRequest {
            q: text,
            source: source_lang,
            target: target_lang,
            format: "text",
        };

        let response = self
            .client
            .post(&self.api_url)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .context("Failed to send request to Google Translate API")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("<failed to read body: {}>", e));
            anyhow::bail!("Google Translate API error ({}): {}", status, body);
        }

        let parsed: TranslateResponse = response
            .json()
            .await
            .context("Failed to parse Google Translate API response")?;

        parsed
            .data
            .translations
            .into_iter()
            .next()
            .map(|t| t.translated_text)
            .context("Google Translate API response contained no translations")
    }
}

/// Translate `word` and shape the result into a new record.
///
/// The record lives in the `source_lang` partition and carries exactly one
/// translation, for `target_lang`.
pub async fn translate_word(
    translator: &dyn Translator,
    word: &str,
    source_lang: &str,
    target_lang: &str,
) -> Result<WordRecord> {
    let translated = translator
        .translate(word, source_lang, target_lang)
        .await
        .with_context(|| {
            format!(
                "Translation of '{}' from {} to {} failed",
                word, source_lang, target_lang
            )
        })?;

    Ok(WordRecord::new(word, source_lang).with_translation(target_lang, translated))
}
