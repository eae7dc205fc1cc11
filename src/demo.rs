//! Demo resolution run against the fixture login page
//!
//! Resolves the credential fields, clicks the login button, and leaves
//! the winning locators in the durable memory store. Run it twice to
//! watch the second pass start at the memory tier.

use std::sync::Arc;

use anyhow::{Context, Result};
use locator_heal::{HealingFinder, MatchResult};
use locator_memory::LocatorMemory;
use suggest_bridge::{OpenAiSuggestionProvider, SuggestionConfig};
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::pages::login;

/// Build the engine for the demo: fixture driver, durable memory at the
/// configured path, and the suggestion tier when enabled and configured.
fn build_finder(config: &AppConfig) -> HealingFinder {
    let driver = Arc::new(login::drifted_login_page());
    let memory = Arc::new(LocatorMemory::with_persistence(&config.memory_path));
    let mut finder = HealingFinder::new(driver, memory);

    if config.suggestions_enabled {
        match OpenAiSuggestionProvider::new(SuggestionConfig::from_env()) {
            Ok(provider) => {
                info!("suggestion tier enabled");
                finder = finder.with_suggester(Arc::new(provider));
            }
            Err(err) => {
                warn!(error = %err, "suggestion tier requested but unavailable, continuing without it");
            }
        }
    }

    finder
}

fn report(label: &str, result: &MatchResult) {
    println!(
        "{label}: tier={} confidence={:.2} locator={}",
        result.tier, result.confidence, result.locator
    );
}

/// Run the login-page resolution flow end to end
pub async fn run_demo(config: &AppConfig) -> Result<()> {
    let finder = build_finder(config);

    println!(
        "Resolving login page elements (memory: {})",
        config.memory_path.display()
    );

    let username = finder
        .resolve(
            &login::username_key(),
            &login::username_target(),
            &login::username_candidates(),
        )
        .await
        .context("resolving username field")?;
    report("username-field", &username);

    let password = finder
        .resolve(
            &login::password_key(),
            &login::password_target(),
            &login::password_candidates(),
        )
        .await
        .context("resolving password field")?;
    report("password-field", &password);

    let button = finder
        .click(
            &login::login_button_key(),
            &login::login_button_target(),
            &login::login_button_candidates(),
        )
        .await
        .context("clicking login button")?;
    report("login-button", &button);

    println!("Login button clicked via healed locator");
    Ok(())
}
