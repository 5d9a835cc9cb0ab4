use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::config::Lang;
use crate::error::{Error, Result};
use crate::item::TranslationItem;
use super::traits::{BatchTranslator, TranslationResult, TranslatorInfo};

/// Translates through a running `audarma-web` server's `/api/translate`.
///
/// The server owns the API key, the fallback cursor and usage accounting;
/// this side only ships the batch.
pub struct RemoteApiTranslator {
    client: Client,
    /// Server root, e.g. "http://127.0.0.1:3000"
    pub base_url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TranslateRequest<'a> {
    items: &'a [TranslationItem],
    source_locale: &'a Lang,
    target_locale: &'a Lang,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    #[serde(default)]
    translations: Vec<String>,
    meta: Option<ResponseMeta>,
}

#[derive(Debug, Deserialize)]
struct ResponseMeta {
    #[serde(default)]
    tokens: u64,
    #[serde(default)]
    cost: f64,
    #[serde(default)]
    model: String,
}

impl RemoteApiTranslator {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl BatchTranslator for RemoteApiTranslator {
    fn info(&self) -> TranslatorInfo {
        TranslatorInfo {
            name: "Remote API",
            requires_api_key: false,
        }
    }

    async fn translate_batch(
        &self,
        items: &[TranslationItem],
        source: &Lang,
        target: &Lang,
    ) -> Result<TranslationResult> {
        let url = format!("{}/api/translate", self.base_url.trim_end_matches('/'));
        debug!("Translating {} items from {} to {} via {}", items.len(), source, target, url);

        let response = self
            .client
            .post(&url)
            .json(&TranslateRequest {
                items,
                source_locale: source,
                target_locale: target,
            })
            .send()
            .await
            .map_err(|e| Error::TranslationRequest(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Translation API error: {} {}", status, body);
            return Err(Error::TranslationRequest(format!("HTTP {status}: {body}")));
        }

        let data: TranslateResponse = response
            .json()
            .await
            .map_err(|e| Error::TranslationInvalidResponse(e.to_string()))?;

        debug!("Received {} translations", data.translations.len());

        let meta = data.meta.unwrap_or(ResponseMeta {
            tokens: 0,
            cost: 0.0,
            model: String::new(),
        });

        Ok(TranslationResult {
            translations: data.translations,
            tokens_used: meta.tokens,
            cost_usd: meta.cost,
            model_used: meta.model,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_posts_batch_and_reads_meta() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/translate"))
            .and(body_partial_json(json!({
                "items": [{"contentType": "ui", "contentId": "x", "text": "Hello"}],
                "sourceLocale": "en",
                "targetLocale": "fr"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "translations": ["Bonjour"],
                "meta": {"tokens": 15, "cost": 0.000008, "model": "Qwen3-32B", "itemCount": 1}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let translator = RemoteApiTranslator::new(server.uri());
        let result = translator
            .translate_batch(
                &[TranslationItem::new("ui", "x", "Hello")],
                &Lang::new("en"),
                &Lang::new("fr"),
            )
            .await
            .unwrap();

        assert_eq!(result.translations, vec!["Bonjour"]);
        assert_eq!(result.tokens_used, 15);
        assert_eq!(result.model_used, "Qwen3-32B");
    }

    #[tokio::test]
    async fn test_server_failure_is_request_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({
                "success": false,
                "error": "All 2 translation backends are rate limited"
            })))
            .mount(&server)
            .await;

        let err = RemoteApiTranslator::new(server.uri())
            .translate_batch(
                &[TranslationItem::new("ui", "x", "Hello")],
                &Lang::new("en"),
                &Lang::new("fr"),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::TranslationRequest(_)));
    }
}
