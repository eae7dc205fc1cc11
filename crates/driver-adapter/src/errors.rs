//! Error types for the driver boundary

use healbrowser_core_types::ElementHandle;
use thiserror::Error;

/// Driver error enumeration
#[derive(Debug, Error, Clone)]
pub enum DriverError {
    /// A driver-side wait expired before any element matched.
    /// Callers treat this exactly like a zero-match result.
    #[error("driver wait expired: {0}")]
    Timeout(String),

    /// The handle refers to an element that no longer exists
    #[error("stale element: {0}")]
    StaleElement(ElementHandle),

    /// The element exists but cannot receive interaction
    #[error("element not interactable: {0}")]
    NotInteractable(ElementHandle),

    /// The locator expression is not decidable by this driver
    #[error("unsupported locator expression: {0}")]
    UnsupportedExpression(String),

    /// Transport or protocol failure on the browser connection
    #[error("driver protocol error: {0}")]
    Protocol(String),
}

impl DriverError {
    /// Whether this error means "no element right now" rather than a
    /// broken driver connection
    pub fn is_miss(&self) -> bool {
        matches!(
            self,
            DriverError::Timeout(_) | DriverError::StaleElement(_)
        )
    }
}
