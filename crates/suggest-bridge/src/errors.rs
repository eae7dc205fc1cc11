//! Error types for the suggestion boundary

use thiserror::Error;

/// Suggestion error enumeration
///
/// All variants are recoverable at the engine level: the resolution
/// falls through to the heuristic tier.
#[derive(Debug, Error)]
pub enum SuggestError {
    /// No API key configured; the provider cannot be constructed
    #[error("suggestion provider has no API key configured")]
    MissingApiKey,

    /// Transport-level failure on the suggestion call
    #[error("suggestion request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The remote API answered with a non-success status
    #[error("suggestion API returned status {status}: {body}")]
    Api { status: u16, body: String },

    /// The response could not be interpreted as a locator
    #[error("malformed suggestion: {0}")]
    Malformed(String),
}
