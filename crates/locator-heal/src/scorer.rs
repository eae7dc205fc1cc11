//! Similarity scoring over scanned element descriptors
//!
//! Pure functions: no driver access, fully deterministic for a fixed
//! snapshot. Weights are fixed constants; semantic attributes
//! (aria-label, data-testid) are weighted above structural ones because
//! they churn least across releases. The raw sum is normalized by the
//! total weight of the signals the target actually specifies, so a
//! candidate matching every requested signal scores 1.0 and partial
//! matches sum proportionally.

use healbrowser_core_types::{DomElementDescriptor, TargetDescription};

pub const WEIGHT_TEXT_EXACT: f64 = 0.45;
pub const WEIGHT_TEXT_PARTIAL: f64 = 0.25;
pub const WEIGHT_ARIA_LABEL: f64 = 0.2;
pub const WEIGHT_DATA_TESTID: f64 = 0.2;
pub const WEIGHT_TAG: f64 = 0.15;

/// Minimum score a candidate must reach to be accepted
pub const ACCEPT_THRESHOLD: f64 = 0.5;

/// Score one candidate against the target signals, in [0, 1]
pub fn score(target: &TargetDescription, candidate: &DomElementDescriptor) -> f64 {
    let mut earned = 0.0;
    let mut applicable = 0.0;

    if let Some(text) = &target.text {
        applicable += WEIGHT_TEXT_EXACT;
        let wanted = text.trim();
        match candidate.trimmed_text() {
            Some(actual) if actual == wanted => earned += WEIGHT_TEXT_EXACT,
            Some(actual)
                if actual.to_lowercase().contains(&wanted.to_lowercase()) =>
            {
                earned += WEIGHT_TEXT_PARTIAL
            }
            _ => {}
        }
    }

    if let Some(label) = &target.aria_label {
        applicable += WEIGHT_ARIA_LABEL;
        if candidate.aria_label.as_deref() == Some(label.as_str()) {
            earned += WEIGHT_ARIA_LABEL;
        }
    }

    if let Some(testid) = &target.data_testid {
        applicable += WEIGHT_DATA_TESTID;
        if candidate.data_testid.as_deref() == Some(testid.as_str()) {
            earned += WEIGHT_DATA_TESTID;
        }
    }

    if let Some(tag) = &target.tag {
        applicable += WEIGHT_TAG;
        if candidate.tag_name.eq_ignore_ascii_case(tag) {
            earned += WEIGHT_TAG;
        }
    }

    if applicable == 0.0 {
        0.0
    } else {
        earned / applicable
    }
}

/// Best-scoring candidate, by index into the scored slice
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BestMatch {
    pub index: usize,
    pub score: f64,
}

/// Score every candidate and return the best one at or above
/// [`ACCEPT_THRESHOLD`]. Ties break toward the earlier element
/// (document order), which keeps the result reproducible for a fixed
/// scan. Below-threshold bests yield `None`: "no confident match".
pub fn find_best_match(
    target: &TargetDescription,
    candidates: &[DomElementDescriptor],
) -> Option<BestMatch> {
    let mut best: Option<BestMatch> = None;
    for (index, candidate) in candidates.iter().enumerate() {
        let candidate_score = score(target, candidate);
        let improves = match &best {
            None => true,
            Some(current) => candidate_score > current.score,
        };
        if improves {
            best = Some(BestMatch {
                index,
                score: candidate_score,
            });
        }
    }
    best.filter(|m| m.score >= ACCEPT_THRESHOLD)
}
