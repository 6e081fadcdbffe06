//! Role-scoped visibility of deliveries

use crate::models::{Delivery, DeliveryStatus, Identity, Role};
use crate::store::DeliveryFilter;

/// Listing filter for a caller
pub fn filter_for(identity: &Identity) -> DeliveryFilter {
    match identity.role {
        Role::Admin => DeliveryFilter::All,
        Role::Client => DeliveryFilter::CreatedBy(identity.id),
        Role::Courier => DeliveryFilter::CourierPool(identity.id),
    }
}

/// Whether a caller may look at a single delivery
pub fn can_view(identity: &Identity, delivery: &Delivery) -> bool {
    match identity.role {
        Role::Admin => true,
        Role::Client => delivery.creator_id == identity.id,
        Role::Courier => {
            delivery.is_assigned_to(identity.id) || delivery.status == DeliveryStatus::New
        }
    }
}
