use std::env;

use url::Url;

pub const DEFAULT_SEARCH_URL: &str = "https://shamela.ws/ajax/search";
pub const DEFAULT_DEEPSEEK_BASE_URL: &str = "https://api.deepseek.com";
pub const DEFAULT_DEEPSEEK_MODEL: &str = "deepseek-chat";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} is not a valid URL: {source}")]
    InvalidUrl {
        var: &'static str,
        source: url::ParseError,
    },
}

#[derive(Clone)]
pub struct ApiKey(String);

impl ApiKey {
    #[cfg(test)]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub(crate) fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

/// Runtime settings, read once at startup and handed to each client.
///
/// Environment variables:
/// - `SHAMELA_SEARCH_URL`: search endpoint (default: shamela.ws ajax search)
/// - `DEEPSEEK_API_KEY`: enables translate/classify (optional)
/// - `DEEPSEEK_BASE_URL`: chat-completion API base (default: api.deepseek.com)
/// - `DEEPSEEK_MODEL`: model name (default: deepseek-chat)
#[derive(Debug, Clone)]
pub struct Config {
    pub search_url: Url,
    pub deepseek: DeepSeekConfig,
}

#[derive(Debug, Clone)]
pub struct DeepSeekConfig {
    pub api_key: Option<ApiKey>,
    pub base_url: Url,
    pub model: String,
}

impl Config {
    /// Load from the process environment, picking up a `.env` file if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_blank = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let search_url = parse_url(
            "SHAMELA_SEARCH_URL",
            non_blank("SHAMELA_SEARCH_URL").as_deref(),
            DEFAULT_SEARCH_URL,
        )?;
        let base_url = parse_url(
            "DEEPSEEK_BASE_URL",
            non_blank("DEEPSEEK_BASE_URL").as_deref(),
            DEFAULT_DEEPSEEK_BASE_URL,
        )?;

        Ok(Self {
            search_url,
            deepseek: DeepSeekConfig {
                api_key: non_blank("DEEPSEEK_API_KEY").map(ApiKey),
                base_url,
                model: non_blank("DEEPSEEK_MODEL")
                    .unwrap_or_else(|| DEFAULT_DEEPSEEK_MODEL.to_string()),
            },
        })
    }
}

fn parse_url(var: &'static str, value: Option<&str>, default: &str) -> Result<Url, ConfigError> {
    Url::parse(value.unwrap_or(default)).map_err(|source| ConfigError::InvalidUrl { var, source })
}
