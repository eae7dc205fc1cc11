//! Durable locator construction for healed elements
//!
//! After the heuristic (or suggestion) tier wins, the element in hand is
//! only a live handle; this builds the locator that gets persisted so
//! the next run can skip straight to it. Preference order runs from the
//! attributes least likely to churn to the ones most likely to.

use healbrowser_core_types::{DomElementDescriptor, Locator};

/// Visible text longer than this is too fragile to anchor a locator on
pub const MAX_TEXT_LOCATOR_LEN: usize = 40;

/// Build the most stable locator the descriptor supports:
/// id → data-testid → aria-label → short exact text → tag.class → tag
pub fn build_locator(descriptor: &DomElementDescriptor) -> Locator {
    if let Some(id) = nonempty(descriptor.id.as_deref()) {
        return Locator::id(id);
    }

    if let Some(testid) = nonempty(descriptor.data_testid.as_deref()) {
        return Locator::data_testid(testid);
    }

    if let Some(label) = nonempty(descriptor.aria_label.as_deref()) {
        return Locator::aria_label(label);
    }

    if let Some(text) = descriptor.trimmed_text() {
        if text.chars().count() < MAX_TEXT_LOCATOR_LEN {
            return Locator::link_text(text);
        }
    }

    if let Some(class) = descriptor.classes.first() {
        return Locator::css(format!("{}.{}", descriptor.tag_name, class));
    }

    // Last resort: anything is better than losing the heal entirely.
    Locator::css(descriptor.tag_name.clone())
}

fn nonempty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
