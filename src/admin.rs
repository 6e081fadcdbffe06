//! Admin oversight: user management and dashboard counts

use std::sync::Arc;

use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{DeliveryStatus, Identity, Role, Stats, User};
use crate::store::Repository;

pub struct Oversight {
    store: Arc<dyn Repository>,
}

impl Oversight {
    pub fn new(store: Arc<dyn Repository>) -> Self {
        Self { store }
    }

    pub async fn list_users(&self, identity: &Identity) -> Result<Vec<User>> {
        require_admin(identity)?;
        self.store.list_users().await
    }

    /// Block or unblock an account. Admins cannot block themselves.
    pub async fn set_active(&self, identity: &Identity, user_id: Uuid, active: bool) -> Result<()> {
        require_admin(identity)?;
        if !active && user_id == identity.id {
            return Err(AppError::Conflict(
                "You cannot block your own account".to_string(),
            ));
        }

        if !self.store.set_user_active(user_id, active).await? {
            return Err(AppError::NotFound(format!("User {} not found", user_id)));
        }
        tracing::info!(user_id = %user_id, admin_id = %identity.id, active, "User active flag changed");
        Ok(())
    }

    pub async fn stats(&self, identity: &Identity) -> Result<Stats> {
        require_admin(identity)?;
        let store = &self.store;

        Ok(Stats {
            clients: store.count_users(Role::Client, false).await?,
            couriers: store.count_users(Role::Courier, false).await?,
            blocked_clients: store.count_users(Role::Client, true).await?,
            blocked_couriers: store.count_users(Role::Courier, true).await?,
            deliveries_total: store.count_deliveries(None).await?,
            deliveries_delivered: store
                .count_deliveries(Some(DeliveryStatus::Delivered))
                .await?,
        })
    }
}

fn require_admin(identity: &Identity) -> Result<()> {
    if identity.is_admin() {
        Ok(())
    } else {
        Err(AppError::Forbidden("Admin access required".to_string()))
    }
}
