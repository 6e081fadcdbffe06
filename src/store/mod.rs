//! Persistence for users and deliveries
//!
//! The lifecycle engine only talks to [`Repository`]. Two implementations
//! exist: [`SqliteStore`] for the running server and [`MemoryStore`] for tests
//! and throwaway instances.

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{AuditNote, Delivery, DeliveryStatus, Role, User};

/// Which deliveries a listing should return
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryFilter {
    All,
    /// Deliveries placed by this client
    CreatedBy(Uuid),
    /// Deliveries assigned to this courier plus the open pool
    CourierPool(Uuid),
}

impl DeliveryFilter {
    pub fn matches(&self, delivery: &Delivery) -> bool {
        match self {
            DeliveryFilter::All => true,
            DeliveryFilter::CreatedBy(id) => delivery.creator_id == *id,
            DeliveryFilter::CourierPool(id) => {
                delivery.courier_id == Some(*id) || delivery.status == DeliveryStatus::New
            }
        }
    }
}

/// Storage operations, one group per entity
#[async_trait]
pub trait Repository: Send + Sync {
    /// Fails with `Conflict` when the username is taken
    async fn insert_user(&self, user: &User) -> Result<()>;
    async fn find_user(&self, id: Uuid) -> Result<Option<User>>;
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>>;
    async fn list_users(&self) -> Result<Vec<User>>;
    /// Returns false when no such user exists
    async fn set_user_active(&self, id: Uuid, active: bool) -> Result<bool>;
    /// Users holding `role`, counting only blocked accounts when `blocked_only`
    async fn count_users(&self, role: Role, blocked_only: bool) -> Result<i64>;

    /// Store a new delivery with its items and notes
    async fn insert_delivery(&self, delivery: &Delivery) -> Result<()>;
    async fn find_delivery(&self, id: Uuid) -> Result<Option<Delivery>>;
    /// Newest order date first
    async fn list_deliveries(&self, filter: DeliveryFilter) -> Result<Vec<Delivery>>;
    /// Persist scalar fields and item quantities, append `notes`, and bump the
    /// version. Fails with `Conflict` if the stored version is no longer
    /// `expected_version`.
    async fn save_delivery(
        &self,
        delivery: &Delivery,
        notes: &[AuditNote],
        expected_version: i64,
    ) -> Result<()>;
    /// Delete a delivery and everything it owns; false when absent
    async fn delete_delivery(&self, id: Uuid) -> Result<bool>;
    /// All deliveries, or only those in `status`
    async fn count_deliveries(&self, status: Option<DeliveryStatus>) -> Result<i64>;
}
