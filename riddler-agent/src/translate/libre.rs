//! LibreTranslate-compatible HTTP translator.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{TranslateError, Translator};

/// Translator backed by a LibreTranslate `POST /translate` endpoint.
pub struct LibreTranslator {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl LibreTranslator {
    /// Create a new translator for the given base URL.
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, TranslateError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TranslateError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn translate_url(&self) -> String {
        format!("{}/translate", self.base_url)
    }
}

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
    format: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    #[serde(rename = "translatedText")]
    translated_text: String,
}

#[async_trait]
impl Translator for LibreTranslator {
    async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<String, TranslateError> {
        if source == target {
            return Ok(text.to_string());
        }

        let body = TranslateRequest {
            q: text,
            source,
            target,
            format: "text",
            api_key: self.api_key.as_deref(),
        };

        let response = self
            .client
            .post(self.translate_url())
            .json(&body)
            .send()
            .await
            .map_err(|e| TranslateError::NetworkError(e.to_string()))?;

        let status = response.status();
        if status.as_u16() == 400 {
            return Err(TranslateError::Unsupported {
                source_lang: source.to_string(),
                target_lang: target.to_string(),
            });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TranslateError::RequestFailed(format!("HTTP {}: {}", status, body)));
        }

        let parsed: TranslateResponse = response
            .json()
            .await
            .map_err(|e| TranslateError::ParseError(e.to_string()))?;

        Ok(parsed.translated_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_translate_posts_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/translate"))
            .and(body_json(serde_json::json!({
                "q": "bridge",
                "source": "en",
                "target": "hi",
                "format": "text"
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "translatedText": "पुल" })),
            )
            .mount(&server)
            .await;

        let translator = LibreTranslator::new(server.uri(), None, Duration::from_secs(5)).unwrap();
        let out = translator.translate("bridge", "en", "hi").await.unwrap();
        assert_eq!(out, "पुल");
    }

    #[tokio::test]
    async fn test_same_language_short_circuits() {
        // No server mounted: any HTTP call would fail
        let translator =
            LibreTranslator::new("http://127.0.0.1:9", None, Duration::from_millis(200)).unwrap();
        let out = translator.translate("bridge", "en", "en").await.unwrap();
        assert_eq!(out, "bridge");
    }

    #[tokio::test]
    async fn test_bad_request_is_unsupported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/translate"))
            .respond_with(ResponseTemplate::new(400))
            .mount(&server)
            .await;

        let translator = LibreTranslator::new(server.uri(), None, Duration::from_secs(5)).unwrap();
        let err = translator.translate("bridge", "en", "xx").await.unwrap_err();
        assert!(matches!(err, TranslateError::Unsupported { .. }));
    }
}
