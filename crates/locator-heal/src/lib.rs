//! Locator resolution & self-heal
//!
//! This crate implements the tiered element resolution engine:
//! - learned-memory lookup (cheapest, most trusted)
//! - declared candidates in caller priority order
//! - optional LLM suggestion (pluggable oracle)
//! - similarity heuristic over a DOM snapshot, with confidence scoring
//!
//! Every successful resolution below the memory tier is written back to
//! the memory store, so the next resolution for the same key starts at
//! the top of the chain.

pub mod builder;
pub mod errors;
pub mod resolver;
pub mod scorer;
pub mod types;

pub use builder::*;
pub use errors::*;
pub use resolver::*;
pub use scorer::*;
pub use types::*;
