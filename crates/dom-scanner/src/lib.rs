//! DOM snapshot scanner
//!
//! Produces a bounded, document-order list of interactable elements for
//! the heuristic and suggestion tiers. A scan is a best-effort
//! point-in-time snapshot: elements that disappear mid-scan are skipped,
//! never fatal.

use healbrowser_core_types::{DomElementDescriptor, ElementHandle, Locator};

use driver_adapter::{DriverError, SharedDriver};
use thiserror::Error;
use tracing::debug;

/// Query covering the controls a user can interact with. Mirrors the
/// interactive-control sweep the heuristic tier is scoped to; everything
/// else on the page is never a healing candidate.
pub const INTERACTIVE_SELECTOR: &str =
    "button, a, input, select, textarea, [role='button'], [type='button'], [type='submit']";

/// Default snapshot cap when the caller does not override it
pub const DEFAULT_MAX_CANDIDATES: usize = 25;

/// Scan error enumeration
#[derive(Debug, Error, Clone)]
pub enum ScanError {
    /// The interactive-elements query itself failed
    #[error("interactive element query failed: {0}")]
    Query(#[source] DriverError),
}

/// A scanned element: the driver handle plus its observed attributes
#[derive(Clone, Debug)]
pub struct ScannedElement {
    pub handle: ElementHandle,
    pub descriptor: DomElementDescriptor,
}

/// Scanner over the driver boundary
pub struct DomScanner {
    driver: SharedDriver,
}

impl DomScanner {
    pub fn new(driver: SharedDriver) -> Self {
        Self { driver }
    }

    /// Snapshot up to `max_candidates` interactable elements in document
    /// order. Truncation is silent and deterministic (document-order
    /// prefix); elements that go stale between query and describe are
    /// skipped.
    pub async fn scan(&self, max_candidates: usize) -> Result<Vec<ScannedElement>, ScanError> {
        let query = Locator::css(INTERACTIVE_SELECTOR);
        let handles = match self.driver.find_elements(&query).await {
            Ok(handles) => handles,
            Err(err) if err.is_miss() => {
                debug!(error = %err, "interactive query matched nothing");
                Vec::new()
            }
            Err(err) => return Err(ScanError::Query(err)),
        };

        let mut scanned = Vec::new();
        for handle in handles {
            if scanned.len() >= max_candidates {
                break;
            }
            let descriptor = match self.driver.describe(handle).await {
                Ok(descriptor) => descriptor,
                Err(err) => {
                    debug!(%handle, error = %err, "skipping element that vanished mid-scan");
                    continue;
                }
            };
            if !descriptor.is_interactable() {
                continue;
            }
            scanned.push(ScannedElement { handle, descriptor });
        }

        debug!(count = scanned.len(), "dom scan complete");
        Ok(scanned)
    }
}
