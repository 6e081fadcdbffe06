//! Delivery lifecycle engine
//!
//! Each action loads the delivery, checks the caller's role and ownership,
//! applies the status transition and item bookkeeping, and saves everything
//! together with the new audit notes under an optimistic version check.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use super::reconcile;
use super::transition::{next_status, Action, ConfirmOutcome};
use super::visibility;
use crate::error::{AppError, Result};
use crate::models::{
    render_notes, AuditNote, AuditTag, CreateDeliveryRequest, Delivery, DeliveryItem,
    DeliveryStatus, DeliveryView, Identity, PendingReport, Role, User,
};
use crate::store::Repository;

pub struct DeliveryEngine {
    store: Arc<dyn Repository>,
}

impl DeliveryEngine {
    pub fn new(store: Arc<dyn Repository>) -> Self {
        Self { store }
    }

    // Queries

    /// Deliveries visible to the caller, newest first
    pub async fn list(&self, identity: &Identity) -> Result<Vec<DeliveryView>> {
        let deliveries = self
            .store
            .list_deliveries(visibility::filter_for(identity))
            .await?;

        let mut users = HashMap::new();
        let mut views = Vec::with_capacity(deliveries.len());
        for delivery in deliveries {
            views.push(self.view_with(delivery, &mut users).await?);
        }
        Ok(views)
    }

    pub async fn get(&self, identity: &Identity, id: Uuid) -> Result<DeliveryView> {
        let delivery = self.load(id).await?;
        if !visibility::can_view(identity, &delivery) {
            return Err(AppError::Forbidden(
                "You cannot view this delivery".to_string(),
            ));
        }
        self.view(delivery).await
    }

    /// Attach creator and courier names for the API
    pub async fn view(&self, delivery: Delivery) -> Result<DeliveryView> {
        self.view_with(delivery, &mut HashMap::new()).await
    }

    async fn view_with(
        &self,
        delivery: Delivery,
        users: &mut HashMap<Uuid, Option<User>>,
    ) -> Result<DeliveryView> {
        let creator = self.cached_user(delivery.creator_id, users).await?;
        let courier = match delivery.courier_id {
            Some(id) => self.cached_user(id, users).await?,
            None => None,
        };

        Ok(DeliveryView {
            id: delivery.id,
            delivery_number: delivery.delivery_number,
            order_date: delivery.order_date,
            address: delivery.address,
            status: delivery.status,
            notes: render_notes(&delivery.notes),
            creator_id: delivery.creator_id,
            creator_name: creator.map(|u| u.name),
            courier_id: delivery.courier_id,
            courier_name: courier.as_ref().map(|u| u.name.clone()),
            courier_username: courier.map(|u| u.username),
            estimated_date: delivery.estimated_date,
            items: delivery.items,
        })
    }

    async fn cached_user(
        &self,
        id: Uuid,
        users: &mut HashMap<Uuid, Option<User>>,
    ) -> Result<Option<User>> {
        if let Some(user) = users.get(&id) {
            return Ok(user.clone());
        }
        let user = self.store.find_user(id).await?;
        users.insert(id, user.clone());
        Ok(user)
    }

    // Actions

    /// Place a new order. Only clients create deliveries.
    pub async fn create(
        &self,
        identity: &Identity,
        request: CreateDeliveryRequest,
    ) -> Result<Delivery> {
        if identity.role != Role::Client {
            return Err(AppError::Forbidden(
                "Only clients can create deliveries".to_string(),
            ));
        }

        let address = request.address.trim();
        if address.is_empty() {
            return Err(AppError::Validation("address is required".to_string()));
        }
        if request.items.is_empty() {
            return Err(AppError::Validation(
                "at least one item is required".to_string(),
            ));
        }
        for item in &request.items {
            if item.name.trim().is_empty() {
                return Err(AppError::Validation("item name is required".to_string()));
            }
            if item.quantity < 1 {
                return Err(AppError::Validation(format!(
                    "quantity of {} must be at least 1",
                    item.name.trim()
                )));
            }
        }

        let now = Utc::now();
        let order_date = request.date.unwrap_or_else(|| now.date_naive());
        let estimated_date = order_date
            .succ_opt()
            .ok_or_else(|| AppError::Validation("date is out of range".to_string()))?;

        let id = Uuid::new_v4();
        let mut notes = vec![AuditNote::new(AuditTag::Client, "Order created.")];
        if let Some(comment) = non_blank(request.notes.as_deref()) {
            notes.push(AuditNote::new(AuditTag::Client, comment));
        }

        let delivery = Delivery {
            id,
            delivery_number: format!("DEL-{}", now.timestamp_millis()),
            order_date,
            address: address.to_string(),
            status: DeliveryStatus::New,
            creator_id: identity.id,
            courier_id: None,
            estimated_date,
            items: request
                .items
                .iter()
                .map(|item| DeliveryItem::new(id, item.name.trim(), item.quantity))
                .collect(),
            notes,
            version: 0,
            created_at: now,
        };
        self.store.insert_delivery(&delivery).await?;

        tracing::info!(
            delivery_id = %delivery.id,
            creator_id = %identity.id,
            items = delivery.items.len(),
            "Delivery created"
        );
        Ok(delivery)
    }

    /// Take a delivery from the pool. Couriers take it for themselves; admins
    /// must name the courier.
    pub async fn assign(
        &self,
        identity: &Identity,
        id: Uuid,
        courier_id: Option<Uuid>,
    ) -> Result<Delivery> {
        let mut delivery = self.load(id).await?;

        let (courier, note) = match identity.role {
            Role::Courier => {
                if courier_id.is_some_and(|requested| requested != identity.id) {
                    return Err(AppError::Forbidden(
                        "Couriers can only assign deliveries to themselves".to_string(),
                    ));
                }
                (
                    identity.id,
                    AuditNote::new(AuditTag::Courier, "Accepted for delivery."),
                )
            }
            Role::Admin => {
                let courier_id = courier_id.ok_or_else(|| {
                    AppError::Validation("courier_id is required".to_string())
                })?;
                let courier = self.find_courier(courier_id).await?;
                (
                    courier.id,
                    AuditNote::new(
                        AuditTag::Admin,
                        format!("Assigned to courier {}.", courier.name),
                    ),
                )
            }
            Role::Client => {
                return Err(AppError::Forbidden(
                    "Only couriers and admins can assign deliveries".to_string(),
                ))
            }
        };

        let from = delivery.status;
        delivery.status = next_status(from, Action::Assign)?;
        delivery.courier_id = Some(courier);
        self.commit(&mut delivery, vec![note], identity, from).await?;
        Ok(delivery)
    }

    /// Return an assigned delivery to the pool. Refused once anything has
    /// been delivered.
    pub async fn unassign(&self, identity: &Identity, id: Uuid) -> Result<Delivery> {
        let mut delivery = self.load(id).await?;
        require_courier_or_admin(identity, &delivery)?;

        let from = delivery.status;
        let to = next_status(from, Action::Unassign)?;
        if delivery.total_delivered() > 0 {
            return Err(AppError::Conflict(
                "Cannot withdraw from a delivery that is partly delivered".to_string(),
            ));
        }

        let courier_name = match delivery.courier_id {
            Some(courier_id) if courier_id == identity.id => identity.name.clone(),
            Some(courier_id) => self
                .store
                .find_user(courier_id)
                .await?
                .map(|u| u.name)
                .unwrap_or_else(|| courier_id.to_string()),
            None => "unknown".to_string(),
        };
        let note = AuditNote::new(
            AuditTag::System,
            format!("Courier {} withdrew from the delivery.", courier_name),
        );

        delivery.status = to;
        delivery.courier_id = None;
        self.commit(&mut delivery, vec![note], identity, from).await?;
        Ok(delivery)
    }

    /// Remove an order that nobody has picked up yet
    pub async fn delete(&self, identity: &Identity, id: Uuid) -> Result<()> {
        let delivery = self.load(id).await?;
        if delivery.creator_id != identity.id && !identity.is_admin() {
            return Err(AppError::Forbidden(
                "Only the creator or an admin can delete a delivery".to_string(),
            ));
        }
        if delivery.status != DeliveryStatus::New {
            return Err(AppError::Conflict(
                "Only new, unassigned deliveries can be deleted".to_string(),
            ));
        }

        if !self.store.delete_delivery(id).await? {
            return Err(AppError::NotFound(format!("Delivery {} not found", id)));
        }
        tracing::info!(delivery_id = %id, actor_id = %identity.id, "Delivery deleted");
        Ok(())
    }

    /// Courier reports how much of each item is being handed over now
    pub async fn report_pending(
        &self,
        identity: &Identity,
        id: Uuid,
        reports: &[PendingReport],
    ) -> Result<Delivery> {
        let mut delivery = self.load(id).await?;
        require_assigned_courier(identity, &delivery)?;
        if delivery.status.is_terminal() {
            return Err(AppError::Conflict(format!(
                "Delivery {} is already {}",
                id, delivery.status
            )));
        }

        let skipped = reconcile::apply_pending(&mut delivery.items, reports);
        for item_id in &skipped {
            tracing::warn!(delivery_id = %id, item_id = %item_id, "Skipping pending report for unknown item");
        }

        let handed_over: i64 = delivery.items.iter().map(|i| i.pending_quantity).sum();
        let note = AuditNote::new(
            AuditTag::Courier,
            format!("Reported {} unit(s) ready for handover.", handed_over),
        );
        let from = delivery.status;
        self.commit(&mut delivery, vec![note], identity, from).await?;
        Ok(delivery)
    }

    /// Courier marks the delivery as handed over
    pub async fn complete(
        &self,
        identity: &Identity,
        id: Uuid,
        comment: Option<&str>,
    ) -> Result<Delivery> {
        let mut delivery = self.load(id).await?;
        require_assigned_courier(identity, &delivery)?;

        let from = delivery.status;
        delivery.status = next_status(from, Action::Complete)?;

        let mut notes = vec![AuditNote::new(AuditTag::Courier, "Delivery reported.")];
        if let Some(comment) = non_blank(comment) {
            notes.push(AuditNote::new(AuditTag::Courier, comment));
        }
        self.commit(&mut delivery, notes, identity, from).await?;
        Ok(delivery)
    }

    /// Client accepts the pending quantities. The delivery is finished when
    /// every item is fully delivered, otherwise it goes back to the courier.
    pub async fn confirm(
        &self,
        identity: &Identity,
        id: Uuid,
    ) -> Result<(Delivery, ConfirmOutcome)> {
        let mut delivery = self.load(id).await?;
        require_creator_or_admin(identity, &delivery)?;

        let from = delivery.status;
        // Validate the source status before touching quantities
        next_status(from, Action::Confirm(ConfirmOutcome::Full))?;

        let outcome = reconcile::confirm(&mut delivery.items);
        delivery.status = next_status(from, Action::Confirm(outcome))?;

        let message = match outcome {
            ConfirmOutcome::Full => "Receipt confirmed (full).",
            ConfirmOutcome::Partial => "Receipt confirmed (partial).",
        };
        let note = AuditNote::new(identity.role.into(), message);
        self.commit(&mut delivery, vec![note], identity, from).await?;
        Ok((delivery, outcome))
    }

    /// Client disputes the delivery
    pub async fn report_problem(
        &self,
        identity: &Identity,
        id: Uuid,
        description: Option<&str>,
    ) -> Result<Delivery> {
        let mut delivery = self.load(id).await?;
        require_creator_or_admin(identity, &delivery)?;

        let from = delivery.status;
        delivery.status = next_status(from, Action::ReportProblem)?;

        let message = match non_blank(description) {
            Some(text) => format!("PROBLEM: {}", text),
            None => "PROBLEM reported.".to_string(),
        };
        let note = AuditNote::new(identity.role.into(), message);
        self.commit(&mut delivery, vec![note], identity, from).await?;
        Ok(delivery)
    }

    /// Courier (or admin) settles a dispute; the client confirms again
    pub async fn resolve_problem(&self, identity: &Identity, id: Uuid) -> Result<Delivery> {
        let mut delivery = self.load(id).await?;
        require_courier_or_admin(identity, &delivery)?;

        let from = delivery.status;
        delivery.status = next_status(from, Action::ResolveProblem)?;

        let note = AuditNote::new(
            identity.role.into(),
            "Problem resolved, awaiting client confirmation.",
        );
        self.commit(&mut delivery, vec![note], identity, from).await?;
        Ok(delivery)
    }

    pub async fn update_estimated_date(
        &self,
        identity: &Identity,
        id: Uuid,
        date: NaiveDate,
    ) -> Result<Delivery> {
        let mut delivery = self.load(id).await?;

        if !identity.is_admin() {
            require_assigned_courier(identity, &delivery)?;
            if matches!(
                delivery.status,
                DeliveryStatus::New | DeliveryStatus::Delivered
            ) {
                return Err(AppError::Conflict(format!(
                    "Cannot change the estimated date of a delivery that is {}",
                    delivery.status
                )));
            }
        }

        delivery.estimated_date = date;
        let note = AuditNote::new(
            identity.role.into(),
            format!("Estimated delivery date set to {}.", date),
        );
        let from = delivery.status;
        self.commit(&mut delivery, vec![note], identity, from).await?;
        Ok(delivery)
    }

    // Helpers

    async fn load(&self, id: Uuid) -> Result<Delivery> {
        self.store
            .find_delivery(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Delivery {} not found", id)))
    }

    async fn find_courier(&self, id: Uuid) -> Result<User> {
        let user = self
            .store
            .find_user(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))?;
        if user.role != Role::Courier {
            return Err(AppError::Validation(format!(
                "{} is not a courier",
                user.username
            )));
        }
        if !user.is_active {
            return Err(AppError::Validation(format!(
                "Courier {} is blocked",
                user.username
            )));
        }
        Ok(user)
    }

    /// Persist the delivery and fold the saved notes and version back into it
    async fn commit(
        &self,
        delivery: &mut Delivery,
        notes: Vec<AuditNote>,
        identity: &Identity,
        from: DeliveryStatus,
    ) -> Result<()> {
        self.store
            .save_delivery(delivery, &notes, delivery.version)
            .await?;
        delivery.notes.extend(notes);
        delivery.version += 1;

        tracing::info!(
            delivery_id = %delivery.id,
            actor_id = %identity.id,
            role = identity.role.as_str(),
            from = from.as_str(),
            to = delivery.status.as_str(),
            "Delivery updated"
        );
        Ok(())
    }
}

fn non_blank(text: Option<&str>) -> Option<&str> {
    text.map(str::trim).filter(|t| !t.is_empty())
}

fn require_assigned_courier(identity: &Identity, delivery: &Delivery) -> Result<()> {
    if identity.role == Role::Courier && delivery.is_assigned_to(identity.id) {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Only the assigned courier can do this".to_string(),
        ))
    }
}

fn require_courier_or_admin(identity: &Identity, delivery: &Delivery) -> Result<()> {
    if identity.is_admin() {
        return Ok(());
    }
    require_assigned_courier(identity, delivery)
}

fn require_creator_or_admin(identity: &Identity, delivery: &Delivery) -> Result<()> {
    if identity.is_admin() || delivery.creator_id == identity.id {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Only the client who placed the order or an admin can do this".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewItem;
    use crate::store::MemoryStore;

    struct Fixture {
        store: Arc<MemoryStore>,
        engine: DeliveryEngine,
        client: Identity,
        other_client: Identity,
        courier: Identity,
        other_courier: Identity,
        admin: Identity,
    }

    async fn add_user(store: &MemoryStore, username: &str, role: Role) -> Identity {
        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            password_hash: String::new(),
            role,
            name: format!("{} name", username),
            is_active: true,
            created_at: Utc::now(),
        };
        store.insert_user(&user).await.unwrap();
        Identity::from(&user)
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        Fixture {
            engine: DeliveryEngine::new(store.clone()),
            client: add_user(&store, "ann", Role::Client).await,
            other_client: add_user(&store, "bob", Role::Client).await,
            courier: add_user(&store, "carl", Role::Courier).await,
            other_courier: add_user(&store, "cleo", Role::Courier).await,
            admin: add_user(&store, "root", Role::Admin).await,
            store,
        }
    }

    fn order(items: &[(&str, i64)]) -> CreateDeliveryRequest {
        CreateDeliveryRequest {
            address: "12 Baker St".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 5, 1),
            items: items
                .iter()
                .map(|(name, quantity)| NewItem {
                    name: name.to_string(),
                    quantity: *quantity,
                })
                .collect(),
            notes: None,
        }
    }

    fn pending(delivery: &Delivery, quantities: &[i64]) -> Vec<PendingReport> {
        delivery
            .items
            .iter()
            .zip(quantities)
            .map(|(item, q)| PendingReport {
                id: item.id,
                pending_quantity: *q,
            })
            .collect()
    }

    /// Create, assign to `fx.courier`, report and complete
    async fn handed_over(fx: &Fixture, items: &[(&str, i64)], quantities: &[i64]) -> Delivery {
        let created = fx.engine.create(&fx.client, order(items)).await.unwrap();
        fx.engine.assign(&fx.courier, created.id, None).await.unwrap();
        let reported = fx
            .engine
            .report_pending(&fx.courier, created.id, &pending(&created, quantities))
            .await
            .unwrap();
        assert!(reported.items.iter().zip(quantities).all(|(i, q)| i.pending_quantity == *q));
        fx.engine.complete(&fx.courier, created.id, None).await.unwrap()
    }

    fn assert_conflict<T: std::fmt::Debug>(result: Result<T>) {
        assert!(matches!(result.unwrap_err(), AppError::Conflict(_)));
    }

    fn assert_forbidden<T: std::fmt::Debug>(result: Result<T>) {
        assert!(matches!(result.unwrap_err(), AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_create_sets_defaults() {
        let fx = fixture().await;
        let mut request = order(&[("Milk", 10)]);
        request.notes = Some("Ring twice".to_string());
        let delivery = fx.engine.create(&fx.client, request).await.unwrap();

        assert_eq!(delivery.status, DeliveryStatus::New);
        assert_eq!(delivery.creator_id, fx.client.id);
        assert_eq!(delivery.courier_id, None);
        assert_eq!(
            delivery.estimated_date,
            NaiveDate::from_ymd_opt(2026, 5, 2).unwrap()
        );
        assert!(delivery.delivery_number.starts_with("DEL-"));
        assert_eq!(delivery.items[0].delivered_quantity, 0);
        assert_eq!(delivery.items[0].pending_quantity, 0);
        assert_eq!(delivery.notes.len(), 2);
        assert_eq!(delivery.notes[1].message, "Ring twice");
    }

    #[tokio::test]
    async fn test_create_validation() {
        let fx = fixture().await;

        let mut blank_address = order(&[("Milk", 1)]);
        blank_address.address = "   ".to_string();
        let cases = [blank_address, order(&[]), order(&[("Milk", 0)]), order(&[("", 2)])];
        for request in cases {
            assert!(matches!(
                fx.engine.create(&fx.client, request).await.unwrap_err(),
                AppError::Validation(_)
            ));
        }

        assert_forbidden(fx.engine.create(&fx.courier, order(&[("Milk", 1)])).await);
    }

    #[tokio::test]
    async fn test_full_round_trip() {
        let fx = fixture().await;
        let waiting = handed_over(&fx, &[("Milk", 10)], &[10]).await;
        assert_eq!(waiting.status, DeliveryStatus::WaitingForClient);

        let (done, outcome) = fx.engine.confirm(&fx.client, waiting.id).await.unwrap();
        assert_eq!(outcome, ConfirmOutcome::Full);
        assert_eq!(done.status, DeliveryStatus::Delivered);
        assert_eq!(done.items[0].delivered_quantity, 10);
        assert_eq!(done.items[0].pending_quantity, 0);

        let stored = fx.store.find_delivery(done.id).await.unwrap().unwrap();
        assert_eq!(stored.status, DeliveryStatus::Delivered);
        assert!(stored.notes.last().unwrap().message.contains("full"));
    }

    #[tokio::test]
    async fn test_partial_round_trip_then_finish() {
        let fx = fixture().await;
        let waiting = handed_over(&fx, &[("Water", 12)], &[10]).await;

        let (partial, outcome) = fx.engine.confirm(&fx.client, waiting.id).await.unwrap();
        assert_eq!(outcome, ConfirmOutcome::Partial);
        assert_eq!(partial.status, DeliveryStatus::Assigned);
        assert_eq!(partial.items[0].delivered_quantity, 10);
        assert_eq!(partial.items[0].pending_quantity, 0);

        // Over-reporting is clamped to the 2 units still open
        fx.engine
            .report_pending(&fx.courier, partial.id, &pending(&partial, &[5]))
            .await
            .unwrap();
        fx.engine.complete(&fx.courier, partial.id, None).await.unwrap();
        let (done, outcome) = fx.engine.confirm(&fx.client, partial.id).await.unwrap();
        assert_eq!(outcome, ConfirmOutcome::Full);
        assert_eq!(done.items[0].delivered_quantity, 12);
    }

    #[tokio::test]
    async fn test_delivered_iff_every_item_complete() {
        let fx = fixture().await;
        let waiting = handed_over(&fx, &[("Milk", 3), ("Eggs", 6)], &[3, 5]).await;
        let (delivery, _) = fx.engine.confirm(&fx.client, waiting.id).await.unwrap();
        assert_eq!(delivery.status, DeliveryStatus::Assigned);
        assert!(!delivery.is_fully_delivered());
    }

    #[tokio::test]
    async fn test_confirm_requires_waiting_status_and_owner() {
        let fx = fixture().await;
        let created = fx.engine.create(&fx.client, order(&[("Milk", 1)])).await.unwrap();
        assert_conflict(fx.engine.confirm(&fx.client, created.id).await);

        let waiting = handed_over(&fx, &[("Milk", 1)], &[1]).await;
        assert_forbidden(fx.engine.confirm(&fx.other_client, waiting.id).await);
        assert_forbidden(fx.engine.confirm(&fx.courier, waiting.id).await);
        assert!(fx.engine.confirm(&fx.admin, waiting.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_concurrent_confirmation_does_not_double_count() {
        let fx = fixture().await;
        let waiting = handed_over(&fx, &[("Milk", 10)], &[4]).await;

        let (first, second) = tokio::join!(
            fx.engine.confirm(&fx.client, waiting.id),
            fx.engine.confirm(&fx.client, waiting.id)
        );
        assert!(first.is_ok() || second.is_ok());

        let stored = fx.store.find_delivery(waiting.id).await.unwrap().unwrap();
        assert_eq!(stored.items[0].delivered_quantity, 4);
        assert_eq!(stored.items[0].pending_quantity, 0);
    }

    #[tokio::test]
    async fn test_assign_rules() {
        let fx = fixture().await;
        let created = fx.engine.create(&fx.client, order(&[("Milk", 1)])).await.unwrap();

        assert_forbidden(fx.engine.assign(&fx.client, created.id, None).await);
        assert_forbidden(
            fx.engine
                .assign(&fx.courier, created.id, Some(fx.other_courier.id))
                .await,
        );
        assert!(matches!(
            fx.engine.assign(&fx.admin, created.id, None).await.unwrap_err(),
            AppError::Validation(_)
        ));
        assert!(matches!(
            fx.engine
                .assign(&fx.admin, created.id, Some(fx.client.id))
                .await
                .unwrap_err(),
            AppError::Validation(_)
        ));

        let assigned = fx
            .engine
            .assign(&fx.admin, created.id, Some(fx.courier.id))
            .await
            .unwrap();
        assert_eq!(assigned.courier_id, Some(fx.courier.id));
        assert_eq!(assigned.status, DeliveryStatus::Assigned);

        assert_conflict(fx.engine.assign(&fx.other_courier, created.id, None).await);
    }

    #[tokio::test]
    async fn test_unassign_returns_to_pool() {
        let fx = fixture().await;
        let created = fx.engine.create(&fx.client, order(&[("Milk", 1)])).await.unwrap();
        fx.engine.assign(&fx.courier, created.id, None).await.unwrap();

        assert_forbidden(fx.engine.unassign(&fx.other_courier, created.id).await);
        let back = fx.engine.unassign(&fx.courier, created.id).await.unwrap();
        assert_eq!(back.status, DeliveryStatus::New);
        assert_eq!(back.courier_id, None);
        let note = back.notes.last().unwrap();
        assert_eq!(note.tag, AuditTag::System);
        assert!(note.message.contains("carl name"));
    }

    #[tokio::test]
    async fn test_unassign_after_partial_delivery_conflicts() {
        let fx = fixture().await;
        let waiting = handed_over(&fx, &[("Milk", 5)], &[2]).await;
        fx.engine.confirm(&fx.client, waiting.id).await.unwrap();

        assert_conflict(fx.engine.unassign(&fx.courier, waiting.id).await);
        assert_conflict(fx.engine.unassign(&fx.admin, waiting.id).await);
    }

    #[tokio::test]
    async fn test_delete_only_new_by_creator_or_admin() {
        let fx = fixture().await;
        let first = fx.engine.create(&fx.client, order(&[("Milk", 1)])).await.unwrap();
        assert_forbidden(fx.engine.delete(&fx.other_client, first.id).await);
        fx.engine.delete(&fx.client, first.id).await.unwrap();
        assert!(fx.store.find_delivery(first.id).await.unwrap().is_none());

        let second = fx.engine.create(&fx.client, order(&[("Milk", 1)])).await.unwrap();
        fx.engine.assign(&fx.courier, second.id, None).await.unwrap();
        assert_conflict(fx.engine.delete(&fx.admin, second.id).await);

        assert!(matches!(
            fx.engine.delete(&fx.admin, Uuid::new_v4()).await.unwrap_err(),
            AppError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_report_pending_only_by_assigned_courier() {
        let fx = fixture().await;
        let created = fx.engine.create(&fx.client, order(&[("Milk", 3)])).await.unwrap();
        fx.engine.assign(&fx.courier, created.id, None).await.unwrap();
        let reports = pending(&created, &[3]);

        assert_forbidden(fx.engine.report_pending(&fx.other_courier, created.id, &reports).await);
        assert_forbidden(fx.engine.report_pending(&fx.client, created.id, &reports).await);
    }

    #[tokio::test]
    async fn test_report_pending_rejected_once_delivered() {
        let fx = fixture().await;
        let waiting = handed_over(&fx, &[("Milk", 2)], &[2]).await;
        let (done, _) = fx.engine.confirm(&fx.client, waiting.id).await.unwrap();
        assert_eq!(done.status, DeliveryStatus::Delivered);

        assert_conflict(
            fx.engine
                .report_pending(&fx.courier, done.id, &pending(&done, &[1]))
                .await,
        );
        let stored = fx.store.find_delivery(done.id).await.unwrap().unwrap();
        assert_eq!(stored.notes.len(), done.notes.len());
        assert_eq!(stored.version, done.version);
    }

    #[tokio::test]
    async fn test_complete_requires_assigned_status() {
        let fx = fixture().await;
        let waiting = handed_over(&fx, &[("Milk", 1)], &[1]).await;
        assert_conflict(fx.engine.complete(&fx.courier, waiting.id, None).await);
    }

    #[tokio::test]
    async fn test_complete_appends_courier_comment() {
        let fx = fixture().await;
        let created = fx.engine.create(&fx.client, order(&[("Milk", 1)])).await.unwrap();
        fx.engine.assign(&fx.courier, created.id, None).await.unwrap();
        let done = fx
            .engine
            .complete(&fx.courier, created.id, Some("Left at reception"))
            .await
            .unwrap();

        let messages: Vec<&str> = done.notes.iter().map(|n| n.message.as_str()).collect();
        assert_eq!(
            &messages[messages.len() - 2..],
            &["Delivery reported.", "Left at reception"]
        );
    }

    #[tokio::test]
    async fn test_dispute_round_trip() {
        let fx = fixture().await;
        let waiting = handed_over(&fx, &[("Milk", 1)], &[1]).await;

        assert_forbidden(fx.engine.report_problem(&fx.other_client, waiting.id, None).await);
        let disputed = fx
            .engine
            .report_problem(&fx.client, waiting.id, Some("Box was damaged"))
            .await
            .unwrap();
        assert_eq!(disputed.status, DeliveryStatus::Disputed);
        assert!(disputed.notes.last().unwrap().message.contains("Box was damaged"));

        assert_forbidden(fx.engine.resolve_problem(&fx.other_courier, waiting.id).await);
        let resolved = fx.engine.resolve_problem(&fx.courier, waiting.id).await.unwrap();
        assert_eq!(resolved.status, DeliveryStatus::WaitingForClient);

        assert_conflict(fx.engine.resolve_problem(&fx.courier, waiting.id).await);
    }

    #[tokio::test]
    async fn test_notes_are_append_only() {
        let fx = fixture().await;
        let waiting = handed_over(&fx, &[("Milk", 2)], &[2]).await;
        let before = waiting.notes.clone();
        let (done, _) = fx.engine.confirm(&fx.client, waiting.id).await.unwrap();

        assert_eq!(&done.notes[..before.len()], &before[..]);
        assert_eq!(done.notes.len(), before.len() + 1);
    }

    #[tokio::test]
    async fn test_estimated_date_rules() {
        let fx = fixture().await;
        let date = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
        let created = fx.engine.create(&fx.client, order(&[("Milk", 1)])).await.unwrap();

        let updated = fx
            .engine
            .update_estimated_date(&fx.admin, created.id, date)
            .await
            .unwrap();
        assert_eq!(updated.estimated_date, date);

        assert_forbidden(fx.engine.update_estimated_date(&fx.courier, created.id, date).await);
        assert_forbidden(fx.engine.update_estimated_date(&fx.client, created.id, date).await);

        fx.engine.assign(&fx.courier, created.id, None).await.unwrap();
        assert!(fx
            .engine
            .update_estimated_date(&fx.courier, created.id, date)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_visibility() {
        let fx = fixture().await;
        let open = fx.engine.create(&fx.client, order(&[("Milk", 1)])).await.unwrap();
        let mine = fx.engine.create(&fx.other_client, order(&[("Tea", 1)])).await.unwrap();
        let theirs = fx.engine.create(&fx.other_client, order(&[("Jam", 1)])).await.unwrap();
        fx.engine.assign(&fx.courier, mine.id, None).await.unwrap();
        fx.engine.assign(&fx.other_courier, theirs.id, None).await.unwrap();

        let ids = |views: Vec<DeliveryView>| {
            let mut ids: Vec<Uuid> = views.into_iter().map(|v| v.id).collect();
            ids.sort();
            ids
        };
        let sorted = |mut v: Vec<Uuid>| {
            v.sort();
            v
        };

        assert_eq!(
            ids(fx.engine.list(&fx.client).await.unwrap()),
            vec![open.id]
        );
        assert_eq!(
            ids(fx.engine.list(&fx.courier).await.unwrap()),
            sorted(vec![open.id, mine.id])
        );
        assert_eq!(fx.engine.list(&fx.admin).await.unwrap().len(), 3);

        assert_forbidden(fx.engine.get(&fx.client, mine.id).await);
        assert_forbidden(fx.engine.get(&fx.courier, theirs.id).await);
        let view = fx.engine.get(&fx.courier, mine.id).await.unwrap();
        assert_eq!(view.creator_name.as_deref(), Some("bob name"));
        assert_eq!(view.courier_username.as_deref(), Some("carl"));
    }
}
