//! Error types for the resolution engine
//!
//! Misses, provider failures, and persistence failures are recovered
//! inside their tier and never surface here; only total exhaustion and
//! post-resolution driver failures propagate to the caller.

use driver_adapter::DriverError;
use healbrowser_core_types::LogicalKey;
use thiserror::Error;

/// Resolution error enumeration
#[derive(Debug, Error)]
pub enum HealError {
    /// Every tier was exhausted. Carries the attempted tier/strategy
    /// descriptions so a human can add a new declared locator.
    #[error("element not resolved for '{key}' (attempted: {attempts:?})")]
    ElementNotResolved {
        key: LogicalKey,
        attempts: Vec<String>,
    },

    /// The element resolved but acting on it failed
    #[error("driver failure: {0}")]
    Driver(#[from] DriverError),
}

impl HealError {
    /// Attempted strategies, when this is an exhaustion failure
    pub fn attempts(&self) -> &[String] {
        match self {
            HealError::ElementNotResolved { attempts, .. } => attempts,
            HealError::Driver(_) => &[],
        }
    }
}
