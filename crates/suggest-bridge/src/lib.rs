//! Optional locator suggestion oracle
//!
//! Abstraction over LLM-backed selector pickers so multiple vendors can
//! plug into the resolution engine. The engine works identically with or
//! without a provider wired in: one `suggest` call per resolution, no
//! retry, and every failure is recoverable by falling through to the
//! next tier.

pub mod config;
pub mod errors;
pub mod openai;

pub use config::*;
pub use errors::*;
pub use openai::*;

use async_trait::async_trait;
use healbrowser_core_types::{DomElementDescriptor, Locator, TargetDescription};

/// What the oracle gets to see: the target signals, the declared
/// locators that already failed, a bounded candidate list, and an
/// optional raw-DOM excerpt. The provider owns truncation of all three
/// per its configured limits.
#[derive(Clone, Debug)]
pub struct SuggestionRequest {
    pub target: TargetDescription,
    pub failed_locators: Vec<Locator>,
    pub candidates: Vec<DomElementDescriptor>,
    pub dom_excerpt: Option<String>,
}

/// Locator suggestion oracle
#[async_trait]
pub trait SuggestionProvider: Send + Sync {
    /// Propose a single locator, or `Ok(None)` for a well-formed
    /// "no idea". Errors are never fatal to the caller.
    async fn suggest(&self, request: &SuggestionRequest)
        -> Result<Option<Locator>, SuggestError>;

    /// Short provider name for logs
    fn name(&self) -> &'static str;
}

/// Deterministic provider used for tests and offline development
#[derive(Debug, Clone)]
pub struct MockSuggestionProvider {
    outcome: MockOutcome,
}

#[derive(Debug, Clone)]
enum MockOutcome {
    Suggest(Locator),
    Empty,
    Fail(String),
}

impl MockSuggestionProvider {
    /// Always proposes the given locator
    pub fn suggesting(locator: Locator) -> Self {
        Self {
            outcome: MockOutcome::Suggest(locator),
        }
    }

    /// Always answers "no suggestion"
    pub fn empty() -> Self {
        Self {
            outcome: MockOutcome::Empty,
        }
    }

    /// Always fails, e.g. to exercise fallthrough behavior
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            outcome: MockOutcome::Fail(reason.into()),
        }
    }
}

#[async_trait]
impl SuggestionProvider for MockSuggestionProvider {
    async fn suggest(
        &self,
        _request: &SuggestionRequest,
    ) -> Result<Option<Locator>, SuggestError> {
        match &self.outcome {
            MockOutcome::Suggest(locator) => Ok(Some(locator.clone())),
            MockOutcome::Empty => Ok(None),
            MockOutcome::Fail(reason) => Err(SuggestError::Malformed(reason.clone())),
        }
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
