//! Delivery tracking server - orders, courier fulfillment and admin oversight

pub mod admin;
pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod models;
pub mod store;

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::admin::Oversight;
use crate::auth::{AuthSettings, Authenticator};
use crate::lifecycle::DeliveryEngine;
use crate::store::{Repository, SqliteStore};

/// Application state shared across handlers
pub struct AppState {
    pub auth: Authenticator,
    pub engine: DeliveryEngine,
    pub oversight: Oversight,
}

impl AppState {
    pub fn new(store: Arc<dyn Repository>, settings: &AuthSettings) -> Arc<Self> {
        Arc::new(Self {
            auth: Authenticator::new(store.clone(), settings),
            engine: DeliveryEngine::new(store.clone()),
            oversight: Oversight::new(store),
        })
    }

    pub fn with_pool(pool: SqlitePool, settings: &AuthSettings) -> Arc<Self> {
        Self::new(Arc::new(SqliteStore::new(pool)), settings)
    }
}
