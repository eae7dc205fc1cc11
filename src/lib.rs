//! HealBrowser library
//!
//! Exposes the configuration layer, demo flow, and page objects for
//! integration testing.

pub mod config;
pub mod demo;
pub mod pages;

// Re-export commonly used types for external use
pub use config::AppConfig;
pub use healbrowser_core_types::{
    DomElementDescriptor, ElementHandle, Locator, LocatorStrategy, LogicalKey, TargetDescription,
};
pub use locator_heal::{HealError, HealingFinder, MatchResult, ResolutionTier, ResolveOptions};
pub use locator_memory::{LocatorMemory, MemoryRecord};
