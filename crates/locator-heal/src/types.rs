//! Core types for the resolution engine

use healbrowser_core_types::{ElementHandle, Locator};
use serde::{Deserialize, Serialize};

/// Confidence assigned when an ambiguous learned locator is accepted as
/// the last resort. Ambiguity is never accepted at full confidence.
pub const AMBIGUOUS_MEMORY_CONFIDENCE: f64 = 0.5;

/// Fallback-chain stage that produced a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResolutionTier {
    /// Learned locator from the memory store
    Memory,

    /// Caller-declared candidate locator
    Declared,

    /// Locator proposed by the suggestion oracle
    Suggested,

    /// Best similarity match over a DOM snapshot
    Heuristic,
}

impl ResolutionTier {
    /// Get tier name as string
    pub fn name(&self) -> &'static str {
        match self {
            ResolutionTier::Memory => "memory",
            ResolutionTier::Declared => "declared",
            ResolutionTier::Suggested => "suggested",
            ResolutionTier::Heuristic => "heuristic",
        }
    }
}

impl std::fmt::Display for ResolutionTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A successful resolution
#[derive(Debug, Clone)]
pub struct MatchResult {
    /// Locator that produced (or was built for) the element
    pub locator: Locator,

    /// Live element handle, valid for the current page state
    pub element: ElementHandle,

    /// Confidence score (0.0-1.0); informational for exact tiers,
    /// computed for the heuristic tier
    pub confidence: f64,

    /// Tier that produced this match
    pub tier: ResolutionTier,
}

impl MatchResult {
    pub fn new(
        locator: Locator,
        element: ElementHandle,
        confidence: f64,
        tier: ResolutionTier,
    ) -> Self {
        Self {
            locator,
            element,
            confidence,
            tier,
        }
    }

    /// Whether this match came from an exact (non-scored) source
    pub fn is_exact(&self) -> bool {
        self.confidence >= 1.0
    }
}

/// Engine tuning knobs
#[derive(Debug, Clone)]
pub struct ResolveOptions {
    /// Cap on elements taken per DOM snapshot
    pub max_scan_candidates: usize,

    /// Confidence assigned to an ambiguous memory hit accepted as the
    /// last resort
    pub ambiguous_memory_confidence: f64,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            max_scan_candidates: dom_scanner::DEFAULT_MAX_CANDIDATES,
            ambiguous_memory_confidence: AMBIGUOUS_MEMORY_CONFIDENCE,
        }
    }
}

impl ResolveOptions {
    pub fn with_max_scan_candidates(mut self, max: usize) -> Self {
        self.max_scan_candidates = max;
        self
    }
}
