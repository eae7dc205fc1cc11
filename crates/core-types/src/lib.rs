//! Shared primitives for the HealBrowser resolution engine
//!
//! The vocabulary every other crate speaks:
//! - [`LogicalKey`] - caller-chosen stable identity for "the element I mean"
//! - [`LocatorStrategy`] / [`Locator`] - decidable DOM queries
//! - [`ElementHandle`] - opaque driver-scoped element reference
//! - [`DomElementDescriptor`] - observable attributes of a scanned element
//! - [`TargetDescription`] - the signal set a caller wants matched

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stable identifier for a logical UI element, independent of its current
/// locator. Used as the memory lookup key; immutable once chosen.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogicalKey(pub String);

impl LogicalKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Compose a key from a page name and a semantic element name,
    /// e.g. `LogicalKey::scoped("login-page", "login-button")`.
    pub fn scoped(page: &str, element: &str) -> Self {
        Self(format!("{page}/{element}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LogicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Locator strategy enumeration
///
/// Each variant maps to a decidable query at the driver boundary:
/// - `Id`: element id attribute, exact
/// - `Css`: CSS selector
/// - `XPath`: XPath expression
/// - `LinkText`: trimmed visible text, exact
/// - `PartialText`: visible text, case-insensitive substring
/// - `AriaLabel`: aria-label attribute, exact
/// - `DataTestId`: data-testid attribute, exact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LocatorStrategy {
    Id,
    Css,
    #[serde(rename = "xpath")]
    XPath,
    LinkText,
    PartialText,
    AriaLabel,
    #[serde(rename = "data-testid")]
    DataTestId,
}

impl LocatorStrategy {
    /// Get strategy name as string
    pub fn name(&self) -> &'static str {
        match self {
            LocatorStrategy::Id => "id",
            LocatorStrategy::Css => "css",
            LocatorStrategy::XPath => "xpath",
            LocatorStrategy::LinkText => "link-text",
            LocatorStrategy::PartialText => "partial-text",
            LocatorStrategy::AriaLabel => "aria-label",
            LocatorStrategy::DataTestId => "data-testid",
        }
    }

    /// All strategies, in the order they are documented
    pub fn all() -> &'static [LocatorStrategy] {
        &[
            LocatorStrategy::Id,
            LocatorStrategy::Css,
            LocatorStrategy::XPath,
            LocatorStrategy::LinkText,
            LocatorStrategy::PartialText,
            LocatorStrategy::AriaLabel,
            LocatorStrategy::DataTestId,
        ]
    }
}

impl fmt::Display for LocatorStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error raised when parsing an unknown strategy name
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown locator strategy: '{0}'")]
pub struct StrategyParseError(pub String);

impl FromStr for LocatorStrategy {
    type Err = StrategyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "id" => Ok(LocatorStrategy::Id),
            "css" => Ok(LocatorStrategy::Css),
            "xpath" => Ok(LocatorStrategy::XPath),
            "link-text" => Ok(LocatorStrategy::LinkText),
            "partial-text" => Ok(LocatorStrategy::PartialText),
            "aria-label" => Ok(LocatorStrategy::AriaLabel),
            "data-testid" => Ok(LocatorStrategy::DataTestId),
            other => Err(StrategyParseError(other.to_string())),
        }
    }
}

/// A (strategy, expression) pair identifying zero or more DOM elements
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locator {
    pub strategy: LocatorStrategy,
    pub expression: String,
}

impl Locator {
    pub fn new(strategy: LocatorStrategy, expression: impl Into<String>) -> Self {
        Self {
            strategy,
            expression: expression.into(),
        }
    }

    pub fn id(expression: impl Into<String>) -> Self {
        Self::new(LocatorStrategy::Id, expression)
    }

    pub fn css(expression: impl Into<String>) -> Self {
        Self::new(LocatorStrategy::Css, expression)
    }

    pub fn xpath(expression: impl Into<String>) -> Self {
        Self::new(LocatorStrategy::XPath, expression)
    }

    pub fn link_text(expression: impl Into<String>) -> Self {
        Self::new(LocatorStrategy::LinkText, expression)
    }

    pub fn partial_text(expression: impl Into<String>) -> Self {
        Self::new(LocatorStrategy::PartialText, expression)
    }

    pub fn aria_label(expression: impl Into<String>) -> Self {
        Self::new(LocatorStrategy::AriaLabel, expression)
    }

    pub fn data_testid(expression: impl Into<String>) -> Self {
        Self::new(LocatorStrategy::DataTestId, expression)
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.strategy.name(), self.expression)
    }
}

/// Opaque driver-scoped element reference
///
/// Valid only against the driver that produced it and only for the page
/// state it was produced from.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct ElementHandle(pub u64);

impl fmt::Display for ElementHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "element-{}", self.0)
    }
}

/// Observable attributes of a scanned element
///
/// Produced fresh per scan, never persisted. `dom_index` is the element's
/// document-order position within the scan and is the deterministic
/// tie-breaker for equal similarity scores.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DomElementDescriptor {
    pub tag_name: String,
    pub text: Option<String>,
    pub aria_label: Option<String>,
    pub data_testid: Option<String>,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub visible: bool,
    pub enabled: bool,
    pub dom_index: usize,
}

impl DomElementDescriptor {
    /// Whether the element can currently receive interaction
    pub fn is_interactable(&self) -> bool {
        self.visible && self.enabled
    }

    /// Trimmed visible text, if any
    pub fn trimmed_text(&self) -> Option<&str> {
        self.text.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }
}

/// The weighted signal set a caller wants matched when declared locators
/// have failed. All signals are optional; unspecified signals do not
/// participate in scoring.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TargetDescription {
    pub text: Option<String>,
    pub tag: Option<String>,
    pub aria_label: Option<String>,
    pub data_testid: Option<String>,
}

impl TargetDescription {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn with_aria_label(mut self, label: impl Into<String>) -> Self {
        self.aria_label = Some(label.into());
        self
    }

    pub fn with_data_testid(mut self, testid: impl Into<String>) -> Self {
        self.data_testid = Some(testid.into());
        self
    }

    /// True when no signal is specified at all
    pub fn is_empty(&self) -> bool {
        self.text.is_none()
            && self.tag.is_none()
            && self.aria_label.is_none()
            && self.data_testid.is_none()
    }
}

impl fmt::Display for TargetDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(text) = &self.text {
            parts.push(format!("text='{text}'"));
        }
        if let Some(tag) = &self.tag {
            parts.push(format!("tag={tag}"));
        }
        if let Some(label) = &self.aria_label {
            parts.push(format!("aria-label='{label}'"));
        }
        if let Some(testid) = &self.data_testid {
            parts.push(format!("data-testid='{testid}'"));
        }
        if parts.is_empty() {
            f.write_str("<unspecified>")
        } else {
            f.write_str(&parts.join(" "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logical_key_scoped() {
        let key = LogicalKey::scoped("login-page", "login-button");
        assert_eq!(key.as_str(), "login-page/login-button");
    }

    #[test]
    fn test_strategy_name_round_trip() {
        for strategy in LocatorStrategy::all() {
            let parsed: LocatorStrategy = strategy.name().parse().unwrap();
            assert_eq!(parsed, *strategy);
        }
    }

    #[test]
    fn test_strategy_parse_unknown() {
        let err = "by-magic".parse::<LocatorStrategy>().unwrap_err();
        assert_eq!(err, StrategyParseError("by-magic".to_string()));
    }

    #[test]
    fn test_locator_display() {
        let locator = Locator::css("#submit");
        assert_eq!(locator.to_string(), "css:#submit");

        let locator = Locator::link_text("Entrar");
        assert_eq!(locator.to_string(), "link-text:Entrar");
    }

    #[test]
    fn test_locator_serde_kebab_case() {
        let locator = Locator::data_testid("login-submit");
        let json = serde_json::to_string(&locator).unwrap();
        assert!(json.contains("\"data-testid\""));

        let back: Locator = serde_json::from_str(&json).unwrap();
        assert_eq!(back, locator);
    }

    #[test]
    fn test_descriptor_interactable() {
        let descriptor = DomElementDescriptor {
            tag_name: "button".to_string(),
            visible: true,
            enabled: true,
            ..Default::default()
        };
        assert!(descriptor.is_interactable());

        let hidden = DomElementDescriptor {
            visible: false,
            ..descriptor
        };
        assert!(!hidden.is_interactable());
    }

    #[test]
    fn test_descriptor_trimmed_text() {
        let descriptor = DomElementDescriptor {
            text: Some("  Entrar  ".to_string()),
            ..Default::default()
        };
        assert_eq!(descriptor.trimmed_text(), Some("Entrar"));

        let blank = DomElementDescriptor {
            text: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(blank.trimmed_text(), None);
    }

    #[test]
    fn test_target_description_builder() {
        let target = TargetDescription::new()
            .with_text("Entrar")
            .with_tag("button");
        assert_eq!(target.text.as_deref(), Some("Entrar"));
        assert_eq!(target.tag.as_deref(), Some("button"));
        assert!(!target.is_empty());
        assert!(TargetDescription::new().is_empty());
    }
}
