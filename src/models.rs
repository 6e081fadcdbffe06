//! Data models for users, deliveries and their line items

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role a user acts under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Client,
    Courier,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Client => "client",
            Role::Courier => "courier",
            Role::Admin => "admin",
        }
    }

    /// Role requested at registration; anything unrecognised becomes a client
    pub fn from_requested(requested: Option<&str>) -> Self {
        requested
            .and_then(|r| r.parse().ok())
            .unwrap_or(Role::Client)
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "client" => Ok(Role::Client),
            "courier" => Ok(Role::Courier),
            "admin" => Ok(Role::Admin),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

/// A registered account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// The resolved caller of an authenticated request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: Uuid,
    pub username: String,
    pub role: Role,
    pub name: String,
}

impl Identity {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl From<&User> for Identity {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            role: user.role,
            name: user.name.clone(),
        }
    }
}

/// Lifecycle status of a delivery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    /// Open in the pool, no courier yet
    New,
    Assigned,
    WaitingForClient,
    Delivered,
    Disputed,
}

impl DeliveryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryStatus::New => "new",
            DeliveryStatus::Assigned => "assigned",
            DeliveryStatus::WaitingForClient => "waiting_for_client",
            DeliveryStatus::Delivered => "delivered",
            DeliveryStatus::Disputed => "disputed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, DeliveryStatus::Delivered)
    }
}

impl std::fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DeliveryStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(DeliveryStatus::New),
            "assigned" => Ok(DeliveryStatus::Assigned),
            "waiting_for_client" => Ok(DeliveryStatus::WaitingForClient),
            "delivered" => Ok(DeliveryStatus::Delivered),
            "disputed" => Ok(DeliveryStatus::Disputed),
            _ => Err(format!("Invalid delivery status: {}", s)),
        }
    }
}

/// Who an audit note is attributed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditTag {
    Client,
    Courier,
    Admin,
    System,
}

impl AuditTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditTag::Client => "client",
            AuditTag::Courier => "courier",
            AuditTag::Admin => "admin",
            AuditTag::System => "system",
        }
    }
}

impl From<Role> for AuditTag {
    fn from(role: Role) -> Self {
        match role {
            Role::Client => AuditTag::Client,
            Role::Courier => AuditTag::Courier,
            Role::Admin => AuditTag::Admin,
        }
    }
}

impl std::str::FromStr for AuditTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "client" => Ok(AuditTag::Client),
            "courier" => Ok(AuditTag::Courier),
            "admin" => Ok(AuditTag::Admin),
            "system" => Ok(AuditTag::System),
            _ => Err(format!("Invalid audit tag: {}", s)),
        }
    }
}

/// One line of a delivery's append-only audit trail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditNote {
    pub at: DateTime<Utc>,
    pub tag: AuditTag,
    pub message: String,
}

impl AuditNote {
    pub fn new(tag: AuditTag, message: impl Into<String>) -> Self {
        Self {
            at: Utc::now(),
            tag,
            message: message.into(),
        }
    }

    /// Render as `[timestamp] [TAG]: message`
    pub fn render(&self) -> String {
        format!(
            "[{}] [{}]: {}",
            self.at.format("%Y-%m-%d %H:%M:%S"),
            self.tag.as_str().to_uppercase(),
            self.message
        )
    }
}

/// Render a whole trail the way it is shown to clients: one note per line
pub fn render_notes(notes: &[AuditNote]) -> String {
    notes
        .iter()
        .map(AuditNote::render)
        .collect::<Vec<_>>()
        .join("\n")
}

/// A line item of a delivery
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryItem {
    pub id: Uuid,
    pub delivery_id: Uuid,
    pub name: String,
    /// Ordered quantity
    pub quantity: i64,
    /// Cumulative quantity confirmed by the client
    pub delivered_quantity: i64,
    /// Quantity handed over and awaiting client confirmation
    pub pending_quantity: i64,
}

impl DeliveryItem {
    pub fn new(delivery_id: Uuid, name: impl Into<String>, quantity: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            delivery_id,
            name: name.into(),
            quantity,
            delivered_quantity: 0,
            pending_quantity: 0,
        }
    }

    /// Quantity not yet confirmed nor awaiting confirmation
    #[cfg(test)]
    pub fn remaining(&self) -> i64 {
        (self.quantity - self.delivered_quantity - self.pending_quantity).max(0)
    }

    pub fn is_fully_delivered(&self) -> bool {
        self.delivered_quantity >= self.quantity
    }
}

/// A delivery together with the items and notes it owns
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Delivery {
    pub id: Uuid,
    pub delivery_number: String,
    pub order_date: NaiveDate,
    pub address: String,
    pub status: DeliveryStatus,
    pub creator_id: Uuid,
    pub courier_id: Option<Uuid>,
    pub estimated_date: NaiveDate,
    pub items: Vec<DeliveryItem>,
    pub notes: Vec<AuditNote>,
    /// Bumped on every save; used for optimistic concurrency
    pub version: i64,
    pub created_at: DateTime<Utc>,
}

impl Delivery {
    pub fn total_delivered(&self) -> i64 {
        self.items.iter().map(|i| i.delivered_quantity).sum()
    }

    pub fn is_fully_delivered(&self) -> bool {
        self.items.iter().all(DeliveryItem::is_fully_delivered)
    }

    pub fn is_assigned_to(&self, user_id: Uuid) -> bool {
        self.courier_id == Some(user_id)
    }
}

/// Aggregate counts for the admin dashboard
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub clients: i64,
    pub couriers: i64,
    pub blocked_clients: i64,
    pub blocked_couriers: i64,
    pub deliveries_total: i64,
    pub deliveries_delivered: i64,
}

/// A delivery as returned over the API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryView {
    pub id: Uuid,
    pub delivery_number: String,
    pub order_date: NaiveDate,
    pub address: String,
    pub status: DeliveryStatus,
    pub notes: String,
    pub creator_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator_name: Option<String>,
    pub courier_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub courier_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub courier_username: Option<String>,
    pub estimated_date: NaiveDate,
    pub items: Vec<DeliveryItem>,
}

/// Request to log in
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Successful login
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: Identity,
}

/// Request to register a new account
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub name: String,
    pub role: Option<String>,
}

/// One requested line of a new delivery
#[derive(Debug, Clone, Deserialize)]
pub struct NewItem {
    pub name: String,
    pub quantity: i64,
}

/// Request to create a delivery
#[derive(Debug, Clone, Deserialize)]
pub struct CreateDeliveryRequest {
    pub address: String,
    /// Order date; defaults to today
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub items: Vec<NewItem>,
    pub notes: Option<String>,
}

/// Request to assign a delivery; admins name the courier
#[derive(Debug, Default, Deserialize)]
pub struct AssignRequest {
    pub courier_id: Option<Uuid>,
}

/// One pending-quantity report
#[derive(Debug, Clone, Deserialize)]
pub struct PendingReport {
    pub id: Uuid,
    #[serde(default)]
    pub pending_quantity: i64,
}

/// Request to report pending quantities
#[derive(Debug, Deserialize)]
pub struct UpdateItemsRequest {
    pub items: Vec<PendingReport>,
}

/// Optional free-text comment accompanying an action
#[derive(Debug, Default, Deserialize)]
pub struct NotesRequest {
    pub notes: Option<String>,
}

/// Request to change the estimated delivery date
#[derive(Debug, Deserialize)]
pub struct EstimatedDateRequest {
    pub date: NaiveDate,
}

/// Plain acknowledgement body
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
