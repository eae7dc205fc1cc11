//! Driver boundary for HealBrowser
//!
//! The resolution engine depends on this capability set and nothing else
//! from the browser side:
//! - query elements by locator ([`Driver::find_elements`])
//! - describe an element's observable attributes ([`Driver::describe`])
//! - click an element ([`Driver::click`])
//! - capture a raw page excerpt ([`Driver::page_source`])
//!
//! Real WebDriver/CDP clients implement [`Driver`] outside this workspace
//! and own their waits: a wait that expires surfaces as
//! [`DriverError::Timeout`], which callers treat as a zero-match result.
//! [`FixtureDriver`] is the in-process implementation used by tests and
//! the demo CLI.

pub mod config;
pub mod errors;
pub mod fixture;

pub use config::*;
pub use errors::*;
pub use fixture::*;

use std::sync::Arc;

use async_trait::async_trait;
use healbrowser_core_types::{DomElementDescriptor, ElementHandle, Locator};

/// Element query/describe/click port
#[async_trait]
pub trait Driver: Send + Sync {
    /// Return the handles of all elements matching the locator, in
    /// document order. An expired driver-side wait is a [`DriverError::Timeout`].
    async fn find_elements(&self, locator: &Locator) -> Result<Vec<ElementHandle>, DriverError>;

    /// Describe the element's currently observable attributes
    async fn describe(&self, handle: ElementHandle)
        -> Result<DomElementDescriptor, DriverError>;

    /// Click the element
    async fn click(&self, handle: ElementHandle) -> Result<(), DriverError>;

    /// Raw serialized page content, for bounded excerpts only
    async fn page_source(&self) -> Result<String, DriverError>;
}

/// Shared driver reference injected into the engine and scanner
pub type SharedDriver = Arc<dyn Driver>;
