//! Login page: logical elements, declared locators, demo fixture
//!
//! The declared lists intentionally describe an older build of the page
//! than [`drifted_login_page`] renders, so the demo exercises the whole
//! fallback chain: the username field still resolves from its declared
//! list, the password field needs its second candidate, and the login
//! button has drifted past every declared locator and must be healed.

use driver_adapter::{FixtureDriver, FixtureElement};
use healbrowser_core_types::{Locator, LogicalKey, TargetDescription};

pub fn login_button_key() -> LogicalKey {
    LogicalKey::scoped("login-page", "login-button")
}

pub fn username_key() -> LogicalKey {
    LogicalKey::scoped("login-page", "username-field")
}

pub fn password_key() -> LogicalKey {
    LogicalKey::scoped("login-page", "password-field")
}

/// Declared candidates for the login button, most to least specific
pub fn login_button_candidates() -> Vec<Locator> {
    vec![
        Locator::xpath("//button[@id='Entrar']"),
        Locator::xpath("//button[contains(@class,'Entrar')]"),
        Locator::data_testid("entrar-submit"),
    ]
}

pub fn login_button_target() -> TargetDescription {
    TargetDescription::new().with_text("Entrar").with_tag("button")
}

pub fn username_candidates() -> Vec<Locator> {
    vec![
        Locator::css("input[name='username']"),
        Locator::aria_label("Phone number, username, or email"),
    ]
}

pub fn username_target() -> TargetDescription {
    TargetDescription::new()
        .with_tag("input")
        .with_aria_label("Phone number, username, or email")
}

pub fn password_candidates() -> Vec<Locator> {
    vec![
        Locator::css("input[name='password']"),
        Locator::css("input[type='password']"),
    ]
}

pub fn password_target() -> TargetDescription {
    TargetDescription::new().with_tag("input").with_aria_label("Password")
}

/// The demo page, one release after the declared locators were written:
/// the login button lost its id and classes and is only recognizable by
/// its visible text.
pub fn drifted_login_page() -> FixtureDriver {
    FixtureDriver::new(vec![
        FixtureElement::new("input")
            .with_attr("name", "username")
            .with_aria_label("Phone number, username, or email"),
        FixtureElement::new("input")
            .with_attr("type", "password")
            .with_aria_label("Password"),
        FixtureElement::new("button")
            .with_text("Entrar")
            .with_class("primary-action"),
        FixtureElement::new("a").with_text("Forgot password?"),
    ])
}
