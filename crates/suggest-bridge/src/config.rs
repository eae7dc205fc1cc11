//! Suggestion provider settings
//!
//! All limits are truncation/cost controls, not semantic parameters.
//! Environment variable names follow the OpenAI-client convention so an
//! existing key/model setup works unchanged.

use std::env;

use serde::{Deserialize, Serialize};

pub const DEFAULT_MODEL: &str = "gpt-4.1-mini";
pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MAX_CANDIDATES: usize = 25;
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 400;
pub const DEFAULT_DOM_EXCERPT_CHARS: usize = 20_000;

pub const ENV_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_BASE_URL: &str = "OPENAI_BASE_URL";
pub const ENV_MODEL: &str = "OPENAI_MODEL";
pub const ENV_MAX_CANDIDATES: &str = "OPENAI_MAX_CANDIDATES";
pub const ENV_MAX_OUTPUT_TOKENS: &str = "OPENAI_MAX_OUTPUT_TOKENS";
pub const ENV_DOM_EXCERPT_CHARS: &str = "OPENAI_DOM_SNAPSHOT_CHARS";

/// Suggestion provider configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SuggestionConfig {
    pub model: String,
    pub endpoint: String,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Max scanned candidates forwarded to the provider
    pub max_candidates: usize,

    /// Output budget requested from the model
    pub max_output_tokens: u32,

    /// Char cap on the raw-DOM excerpt included in the prompt
    pub dom_excerpt_chars: usize,
}

impl Default for SuggestionConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: None,
            max_candidates: DEFAULT_MAX_CANDIDATES,
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
            dom_excerpt_chars: DEFAULT_DOM_EXCERPT_CHARS,
        }
    }
}

impl SuggestionConfig {
    /// Build a configuration from environment overrides on top of defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            model: env::var(ENV_MODEL).unwrap_or(defaults.model),
            endpoint: env::var(ENV_BASE_URL)
                .map(|base| endpoint_from_base(&base))
                .unwrap_or(defaults.endpoint),
            api_key: env::var(ENV_API_KEY).ok().filter(|k| !k.trim().is_empty()),
            max_candidates: parse_env(ENV_MAX_CANDIDATES, defaults.max_candidates),
            max_output_tokens: parse_env(ENV_MAX_OUTPUT_TOKENS, defaults.max_output_tokens),
            dom_excerpt_chars: parse_env(ENV_DOM_EXCERPT_CHARS, defaults.dom_excerpt_chars),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

/// Join a base URL with the chat-completions path, tolerating a
/// trailing slash on the base
pub(crate) fn endpoint_from_base(base: &str) -> String {
    format!("{}/chat/completions", base.trim_end_matches('/'))
}

fn parse_env<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
