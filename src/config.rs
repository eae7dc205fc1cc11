//! Application configuration
//!
//! A small env-driven layer over the per-component configs. Every knob
//! is optional: defaults put the memory store under the user data
//! directory, leave the suggestion provider off, and take the driver
//! settings from their own environment variables.

use std::env;
use std::path::PathBuf;

use driver_adapter::DriverConfig;

pub const ENV_MEMORY_PATH: &str = "HEALBROWSER_MEMORY_PATH";
pub const ENV_SUGGESTIONS: &str = "HEALBROWSER_SUGGESTIONS";

/// Top-level application configuration
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Durable memory store location
    pub memory_path: PathBuf,

    /// Whether to wire the LLM suggestion tier into the engine
    pub suggestions_enabled: bool,

    /// Settings for the external driver implementation
    pub driver: DriverConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            memory_path: default_memory_path(),
            suggestions_enabled: false,
            driver: DriverConfig::default(),
        }
    }
}

impl AppConfig {
    /// Build a configuration from environment overrides on top of defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            memory_path: env::var(ENV_MEMORY_PATH)
                .map(PathBuf::from)
                .unwrap_or(defaults.memory_path),
            suggestions_enabled: env::var(ENV_SUGGESTIONS)
                .map(|v| truthy(&v))
                .unwrap_or(defaults.suggestions_enabled),
            driver: DriverConfig::from_env(),
        }
    }
}

/// Default store location: `<user data dir>/healbrowser/memory.json`,
/// falling back to the working directory when no data dir exists.
pub fn default_memory_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("healbrowser")
        .join("memory.json")
}

fn truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert!(config.memory_path.ends_with("healbrowser/memory.json"));
        assert!(!config.suggestions_enabled);
    }

    #[test]
    fn test_truthy() {
        assert!(truthy("1"));
        assert!(truthy(" TRUE "));
        assert!(!truthy("off"));
    }
}
