use reqwest::Client;
use tracing::{debug, warn};

use super::answer::{completion_text, parse_classification};
use super::types::{ChatCompletionRequest, ChatCompletionResponse, Classification, Message};
use crate::config::{ApiKey, DeepSeekConfig};

const CLASSIFY_PROMPT: &str = "You are an expert in historical sources. \
When given a title, determine whether it represents a primary source. \
Respond only with True or False. \
Respond with False if you are unsure.";

const TRANSLATE_PROMPT: &str = "You are an expert in translating Arabic texts to English. \
When given a string of Arabic text, translate it to English with ALA-LC transliterations where needed. \
Do not make any additions or omissions to the text. \
Include only the translation and nothing else in your output.";

const CLASSIFY_MAX_TOKENS: u32 = 5;
const CLASSIFY_TEMPERATURE: f32 = 1.0;
const TRANSLATE_MAX_TOKENS: u32 = 100;
const TRANSLATE_TEMPERATURE: f32 = 1.3;

#[derive(Debug, thiserror::Error)]
pub enum DeepSeekError {
    #[error("DEEPSEEK_API_KEY not set. Get one at https://platform.deepseek.com/api_keys")]
    ApiKeyNotSet,

    #[error("DeepSeek rejected the API key")]
    Unauthorized,

    #[error("API rate limit exceeded. Please retry later.")]
    RateLimited,

    #[error("DeepSeek account balance is insufficient")]
    InsufficientBalance,

    #[error("API error ({code}): {message}")]
    Api { code: u16, message: String },

    #[error("API returned no completion")]
    EmptyCompletion,

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// Language-model operations used by the search shell.
/// Implemented by `DeepSeekClient`; tests substitute canned answers.
pub trait TextService {
    async fn classify(&self, title: &str) -> Result<Classification, DeepSeekError>;
    async fn translate(&self, arabic_text: &str) -> Result<String, DeepSeekError>;
}

#[derive(Clone)]
pub struct DeepSeekClient {
    http: Client,
    api_key: ApiKey,
    model: String,
    base_url: String,
}

impl DeepSeekClient {
    pub fn new(http: Client, config: &DeepSeekConfig) -> Result<Self, DeepSeekError> {
        let api_key = config.api_key.clone().ok_or(DeepSeekError::ApiKeyNotSet)?;
        Ok(Self {
            http,
            api_key,
            model: config.model.clone(),
            base_url: config.base_url.as_str().trim_end_matches('/').to_string(),
        })
    }

    #[cfg(test)]
    pub(crate) fn with_base_url(http: Client, base_url: &str) -> Self {
        Self {
            http,
            api_key: ApiKey::new("test-key"),
            model: crate::config::DEFAULT_DEEPSEEK_MODEL.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn complete(
        &self,
        system: &str,
        user: String,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String, DeepSeekError> {
        let url = format!("{}/chat/completions", self.base_url);
        let request = ChatCompletionRequest {
            model: &self.model,
            messages: vec![Message::system(system), Message::user(user)],
            max_tokens,
            temperature,
        };

        let response = self
            .http
            .post(&url)
            .bearer_auth(self.api_key.expose())
            .header("User-Agent", crate::USER_AGENT)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let err = classify_status(status.as_u16(), &text);
            warn!(error = %err, "DeepSeek API error");
            return Err(err);
        }

        let body: ChatCompletionResponse = response.json().await?;
        if let Some(err) = &body.error {
            let message = err.message.clone().unwrap_or_else(|| "Unknown error".into());
            warn!(kind = ?err.kind, %message, "DeepSeek API error in 200 response");
            return Err(DeepSeekError::Api {
                code: status.as_u16(),
                message,
            });
        }

        debug!(model = %self.model, "completion received");
        completion_text(&body).ok_or(DeepSeekError::EmptyCompletion)
    }
}

impl TextService for DeepSeekClient {
    async fn classify(&self, title: &str) -> Result<Classification, DeepSeekError> {
        let answer = self
            .complete(
                CLASSIFY_PROMPT,
                format!("Title: {title}"),
                CLASSIFY_MAX_TOKENS,
                CLASSIFY_TEMPERATURE,
            )
            .await?;
        Ok(parse_classification(&answer))
    }

    async fn translate(&self, arabic_text: &str) -> Result<String, DeepSeekError> {
        self.complete(
            TRANSLATE_PROMPT,
            format!("Arabic Text: {arabic_text}"),
            TRANSLATE_MAX_TOKENS,
            TRANSLATE_TEMPERATURE,
        )
        .await
    }
}

/// Fail-closed: only an explicit affirmative counts. Errors and unclear
/// answers are logged and read as "not a primary source".
pub async fn is_primary_source(service: &impl TextService, title: &str) -> bool {
    match service.classify(title).await {
        Ok(Classification::Unrecognized(answer)) => {
            debug!(%answer, "unrecognized classification answer");
            false
        }
        Ok(classification) => classification.is_primary_source(),
        Err(e) => {
            warn!(error = %e, "classification failed");
            false
        }
    }
}

/// `None` marks a failed translation; the failure itself is logged here.
pub async fn translate_or_none(service: &impl TextService, arabic_text: &str) -> Option<String> {
    service
        .translate(arabic_text)
        .await
        .inspect_err(|e| warn!(error = %e, "translation failed"))
        .ok()
}

fn classify_status(code: u16, body: &str) -> DeepSeekError {
    match code {
        401 => DeepSeekError::Unauthorized,
        402 => DeepSeekError::InsufficientBalance,
        429 => DeepSeekError::RateLimited,
        _ => {
            let message = serde_json::from_str::<ChatCompletionResponse>(body)
                .ok()
                .and_then(|b| b.error)
                .and_then(|e| e.message)
                .unwrap_or_else(|| {
                    let end = body.floor_char_boundary(200);
                    format!("HTTP {code}: {}", &body[..end])
                });
            DeepSeekError::Api { code, message }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Canned {
        classify: fn() -> Result<Classification, DeepSeekError>,
        translate: fn() -> Result<String, DeepSeekError>,
    }

    impl TextService for Canned {
        async fn classify(&self, _title: &str) -> Result<Classification, DeepSeekError> {
            (self.classify)()
        }

        async fn translate(&self, _arabic_text: &str) -> Result<String, DeepSeekError> {
            (self.translate)()
        }
    }

    fn canned(classify: fn() -> Result<Classification, DeepSeekError>) -> Canned {
        Canned {
            classify,
            translate: || Err(DeepSeekError::RateLimited),
        }
    }

    #[tokio::test]
    async fn primary_source_only_on_affirmative() {
        assert!(is_primary_source(&canned(|| Ok(Classification::PrimarySource)), "t").await);
        assert!(!is_primary_source(&canned(|| Ok(Classification::NotPrimarySource)), "t").await);
        assert!(
            !is_primary_source(&canned(|| Ok(Classification::Unrecognized("maybe".into()))), "t")
                .await
        );
    }

    #[tokio::test]
    async fn classification_failure_is_false() {
        let service = canned(|| Err(DeepSeekError::EmptyCompletion));
        assert!(!is_primary_source(&service, "t").await);
    }

    #[tokio::test]
    async fn translation_failure_is_none() {
        let service = canned(|| Ok(Classification::PrimarySource));
        assert_eq!(translate_or_none(&service, "نص").await, None);
    }

    #[tokio::test]
    async fn translation_success_passes_through() {
        let service = Canned {
            classify: || Ok(Classification::NotPrimarySource),
            translate: || Ok("There is no faith".into()),
        };
        assert_eq!(
            translate_or_none(&service, "لا إيمان").await.as_deref(),
            Some("There is no faith")
        );
    }

    #[test]
    fn status_401_is_unauthorized() {
        assert!(matches!(classify_status(401, ""), DeepSeekError::Unauthorized));
    }

    #[test]
    fn status_402_is_insufficient_balance() {
        assert!(matches!(
            classify_status(402, "{}"),
            DeepSeekError::InsufficientBalance
        ));
    }

    #[test]
    fn status_with_error_body_uses_message() {
        let body = r#"{"error":{"message":"Model Not Exist","type":"invalid_request_error"}}"#;
        match classify_status(400, body) {
            DeepSeekError::Api { code, message } => {
                assert_eq!(code, 400);
                assert_eq!(message, "Model Not Exist");
            }
            other => panic!("expected Api error, got: {other:?}"),
        }
    }

    #[test]
    fn status_without_body_keeps_snippet() {
        let body = "x".repeat(500);
        match classify_status(503, &body) {
            DeepSeekError::Api { code: 503, message } => {
                assert!(message.starts_with("HTTP 503: "));
                assert_eq!(message.len(), "HTTP 503: ".len() + 200);
            }
            other => panic!("expected Api(503), got: {other:?}"),
        }
    }

    #[test]
    fn missing_key_is_rejected() {
        let config = DeepSeekConfig {
            api_key: None,
            base_url: url::Url::parse(crate::config::DEFAULT_DEEPSEEK_BASE_URL).unwrap(),
            model: "deepseek-chat".into(),
        };
        assert!(matches!(
            DeepSeekClient::new(Client::new(), &config),
            Err(DeepSeekError::ApiKeyNotSet)
        ));
    }
}
