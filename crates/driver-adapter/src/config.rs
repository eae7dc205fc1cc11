//! Driver construction settings
//!
//! The browser/process lifecycle lives outside this workspace; this is
//! the configuration surface handed to whichever [`crate::Driver`]
//! implementation the caller wires in. Every field has a default and an
//! environment override.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default driver-side implicit wait when nothing overrides it
pub const DEFAULT_IMPLICIT_WAIT_MS: u64 = 10_000;

pub const ENV_HEADLESS: &str = "HEALBROWSER_HEADLESS";
pub const ENV_IMPLICIT_WAIT_MS: &str = "HEALBROWSER_IMPLICIT_WAIT_MS";
pub const ENV_DRIVER_PATH: &str = "HEALBROWSER_DRIVER_PATH";

/// Browser driver configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DriverConfig {
    /// Run the browser without a visible window
    pub headless: bool,

    /// Driver-side implicit wait applied to element queries
    pub implicit_wait_ms: u64,

    /// Custom driver binary, when the system default is not wanted
    pub driver_path: Option<PathBuf>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            headless: false,
            implicit_wait_ms: DEFAULT_IMPLICIT_WAIT_MS,
            driver_path: None,
        }
    }
}

impl DriverConfig {
    /// Build a configuration from environment overrides on top of defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            headless: env::var(ENV_HEADLESS)
                .map(|v| parse_flag(&v))
                .unwrap_or(defaults.headless),
            implicit_wait_ms: env::var(ENV_IMPLICIT_WAIT_MS)
                .ok()
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.implicit_wait_ms),
            driver_path: env::var(ENV_DRIVER_PATH).ok().map(PathBuf::from),
        }
    }

    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    pub fn with_implicit_wait(mut self, wait: Duration) -> Self {
        self.implicit_wait_ms = wait.as_millis() as u64;
        self
    }

    pub fn implicit_wait(&self) -> Duration {
        Duration::from_millis(self.implicit_wait_ms)
    }
}

/// Accepted truthy spellings for boolean environment flags
pub(crate) fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes"
    )
}
