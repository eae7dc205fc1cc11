//! OpenAI-compatible suggestion provider
//!
//! One chat-completions call per resolution, temperature 0, JSON-object
//! response format. The model is asked for a single locator as
//! `{"strategy": ..., "expression": ..., "reason": ...}`; anything that
//! does not parse into a known strategy is a malformed suggestion.

use async_trait::async_trait;
use healbrowser_core_types::{DomElementDescriptor, Locator};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::{SuggestError, SuggestionConfig, SuggestionProvider, SuggestionRequest};

const SYSTEM_PROMPT: &str = "You are an expert QA automation engineer. Given metadata for DOM \
elements, choose the most stable locator that targets the requested element. Prefer ids, \
data-testid attributes, aria-labels, and text matches over brittle structural selectors. \
Respond in JSON with \"strategy\" (one of: id, css, xpath, link-text, partial-text, \
aria-label, data-testid), \"expression\", and \"reason\" keys. Use an empty \"expression\" \
if no candidate fits.";

/// Locator payload expected back from the model
#[derive(Debug, Deserialize)]
struct SuggestionPayload {
    #[serde(default)]
    strategy: String,
    #[serde(default)]
    expression: String,
    #[serde(default)]
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

/// Suggestion provider backed by an OpenAI-compatible chat endpoint
#[derive(Debug)]
pub struct OpenAiSuggestionProvider {
    client: reqwest::Client,
    config: SuggestionConfig,
    api_key: String,
}

impl OpenAiSuggestionProvider {
    /// Construction fails fast when no API key is configured, so a
    /// misconfigured provider is caught at wiring time rather than on
    /// the first resolution.
    pub fn new(config: SuggestionConfig) -> Result<Self, SuggestError> {
        let api_key = config
            .api_key
            .clone()
            .ok_or(SuggestError::MissingApiKey)?;
        Ok(Self {
            client: reqwest::Client::new(),
            config,
            api_key,
        })
    }

    fn build_payload(&self, request: &SuggestionRequest) -> serde_json::Value {
        let user_prompt = build_user_prompt(
            request,
            self.config.max_candidates,
            self.config.dom_excerpt_chars,
        );
        json!({
            "model": self.config.model,
            "temperature": 0,
            "response_format": {"type": "json_object"},
            "max_tokens": self.config.max_output_tokens,
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": user_prompt},
            ],
        })
    }
}

#[async_trait]
impl SuggestionProvider for OpenAiSuggestionProvider {
    async fn suggest(
        &self,
        request: &SuggestionRequest,
    ) -> Result<Option<Locator>, SuggestError> {
        let payload = self.build_payload(request);

        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SuggestError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let completion: ChatCompletion = response.json().await?;
        let content = completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| SuggestError::Malformed("response carried no choices".to_string()))?;

        parse_suggestion(&content)
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}

/// Compose the user message: target, failed locators, candidate
/// metadata, and a char-capped raw-DOM excerpt.
fn build_user_prompt(
    request: &SuggestionRequest,
    max_candidates: usize,
    dom_excerpt_chars: usize,
) -> String {
    let candidates: Vec<&DomElementDescriptor> =
        request.candidates.iter().take(max_candidates).collect();
    let candidate_json =
        serde_json::to_string_pretty(&candidates).unwrap_or_else(|_| "[]".to_string());

    let failed: Vec<String> = request
        .failed_locators
        .iter()
        .map(|locator| locator.to_string())
        .collect();

    let excerpt = request
        .dom_excerpt
        .as_deref()
        .map(|dom| truncate_chars(dom, dom_excerpt_chars))
        .unwrap_or_default();

    format!(
        "Target description: {target}\n\
         Failed locators provided by the test: {failed:?}\n\n\
         Candidate elements (JSON list):\n{candidate_json}\n\n\
         DOM excerpt (truncated to {len} chars):\n{excerpt}",
        target = request.target,
        failed = failed,
        candidate_json = candidate_json,
        len = excerpt.chars().count(),
        excerpt = excerpt,
    )
}

/// Char-boundary-safe prefix truncation
fn truncate_chars(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}

/// Interpret the model's JSON answer. An empty expression is a
/// well-formed "no suggestion"; an unknown strategy is malformed.
fn parse_suggestion(content: &str) -> Result<Option<Locator>, SuggestError> {
    let payload: SuggestionPayload = serde_json::from_str(content)
        .map_err(|err| SuggestError::Malformed(format!("not a JSON locator: {err}")))?;

    if payload.expression.trim().is_empty() {
        debug!("provider declined to suggest a locator");
        return Ok(None);
    }

    let strategy = payload
        .strategy
        .parse()
        .map_err(|_| SuggestError::Malformed(format!("unknown strategy '{}'", payload.strategy)))?;

    if let Some(reason) = &payload.reason {
        debug!(reason = %reason, "suggestion rationale");
    }

    Ok(Some(Locator::new(strategy, payload.expression.trim())))
}
