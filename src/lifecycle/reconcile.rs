//! Item quantity reconciliation
//!
//! Invariant: `0 <= delivered_quantity`, `0 <= pending_quantity`, and
//! `delivered_quantity + pending_quantity <= quantity` for every item after
//! any function here returns.

use uuid::Uuid;

use super::transition::ConfirmOutcome;
use crate::models::{DeliveryItem, PendingReport};

/// Set pending quantities from a courier report.
///
/// Each value is clamped to `[0, quantity - delivered_quantity]`. Reports for
/// unknown item ids are skipped and returned so the caller can log them; a
/// later report for the same item overrides an earlier one.
pub fn apply_pending(items: &mut [DeliveryItem], reports: &[PendingReport]) -> Vec<Uuid> {
    let mut skipped = Vec::new();

    for report in reports {
        match items.iter_mut().find(|item| item.id == report.id) {
            Some(item) => {
                let open = (item.quantity - item.delivered_quantity).max(0);
                item.pending_quantity = report.pending_quantity.clamp(0, open);
            }
            None => skipped.push(report.id),
        }
    }

    skipped
}

/// Move every pending quantity into the delivered total.
pub fn confirm(items: &mut [DeliveryItem]) -> ConfirmOutcome {
    for item in items.iter_mut() {
        let pending = item.pending_quantity.max(0);
        item.delivered_quantity = (item.delivered_quantity + pending).clamp(0, item.quantity);
        item.pending_quantity = 0;
    }

    if items.iter().all(DeliveryItem::is_fully_delivered) {
        ConfirmOutcome::Full
    } else {
        ConfirmOutcome::Partial
    }
}
