//! In-memory repository

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{DeliveryFilter, Repository};
use crate::error::{AppError, Result};
use crate::models::{AuditNote, Delivery, DeliveryStatus, Role, User};

#[derive(Default)]
struct Inner {
    users: HashMap<Uuid, User>,
    deliveries: HashMap<Uuid, Delivery>,
}

/// Repository that keeps everything in process memory
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Repository for MemoryStore {
    async fn insert_user(&self, user: &User) -> Result<()> {
        let mut inner = self.inner.write().await;
        if inner.users.values().any(|u| u.username == user.username) {
            return Err(AppError::Conflict(format!(
                "Username {} already exists",
                user.username
            )));
        }
        inner.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(self
            .inner
            .read()
            .await
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        let mut users: Vec<User> = self.inner.read().await.users.values().cloned().collect();
        users.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.username.cmp(&b.username))
        });
        Ok(users)
    }

    async fn set_user_active(&self, id: Uuid, active: bool) -> Result<bool> {
        let mut inner = self.inner.write().await;
        match inner.users.get_mut(&id) {
            Some(user) => {
                user.is_active = active;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn count_users(&self, role: Role, blocked_only: bool) -> Result<i64> {
        let inner = self.inner.read().await;
        let count = inner
            .users
            .values()
            .filter(|u| u.role == role && (!blocked_only || !u.is_active))
            .count();
        Ok(count as i64)
    }

    async fn insert_delivery(&self, delivery: &Delivery) -> Result<()> {
        let mut inner = self.inner.write().await;
        if inner.deliveries.contains_key(&delivery.id) {
            return Err(AppError::Conflict(format!(
                "Delivery {} already exists",
                delivery.id
            )));
        }
        inner.deliveries.insert(delivery.id, delivery.clone());
        Ok(())
    }

    async fn find_delivery(&self, id: Uuid) -> Result<Option<Delivery>> {
        Ok(self.inner.read().await.deliveries.get(&id).cloned())
    }

    async fn list_deliveries(&self, filter: DeliveryFilter) -> Result<Vec<Delivery>> {
        let mut deliveries: Vec<Delivery> = self
            .inner
            .read()
            .await
            .deliveries
            .values()
            .filter(|d| filter.matches(d))
            .cloned()
            .collect();
        deliveries.sort_by(|a, b| {
            b.order_date
                .cmp(&a.order_date)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        Ok(deliveries)
    }

    async fn save_delivery(
        &self,
        delivery: &Delivery,
        notes: &[AuditNote],
        expected_version: i64,
    ) -> Result<()> {
        let mut inner = self.inner.write().await;
        let stored = inner
            .deliveries
            .get_mut(&delivery.id)
            .filter(|d| d.version == expected_version)
            .ok_or_else(|| {
                AppError::Conflict(format!(
                    "Delivery {} was modified concurrently, retry the action",
                    delivery.id
                ))
            })?;

        stored.address = delivery.address.clone();
        stored.status = delivery.status;
        stored.courier_id = delivery.courier_id;
        stored.estimated_date = delivery.estimated_date;
        for item in &delivery.items {
            if let Some(existing) = stored.items.iter_mut().find(|i| i.id == item.id) {
                existing.delivered_quantity = item.delivered_quantity;
                existing.pending_quantity = item.pending_quantity;
            }
        }
        stored.notes.extend_from_slice(notes);
        stored.version += 1;
        Ok(())
    }

    async fn delete_delivery(&self, id: Uuid) -> Result<bool> {
        Ok(self.inner.write().await.deliveries.remove(&id).is_some())
    }

    async fn count_deliveries(&self, status: Option<DeliveryStatus>) -> Result<i64> {
        let inner = self.inner.read().await;
        let count = inner
            .deliveries
            .values()
            .filter(|d| status.map_or(true, |s| d.status == s))
            .count();
        Ok(count as i64)
    }
}
