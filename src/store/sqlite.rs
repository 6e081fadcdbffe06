//! SQLite-backed repository

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use super::{DeliveryFilter, Repository};
use crate::error::{AppError, Result};
use crate::models::{AuditNote, Delivery, DeliveryItem, DeliveryStatus, Role, User};

/// Database store
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Apply the embedded schema migrations
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::Internal(format!("Migration failed: {}", e)))
    }

    #[cfg(test)]
    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn items_for(&self, clause: &str, bind: Option<&str>) -> Result<Vec<ItemRow>> {
        let sql = format!(
            r#"
            SELECT i.id, i.delivery_id, i.name, i.quantity, i.delivered_quantity, i.pending_quantity
            FROM delivery_items i
            JOIN deliveries d ON d.id = i.delivery_id
            WHERE {}
            ORDER BY i.delivery_id, i.position ASC
            "#,
            clause
        );
        let mut query = sqlx::query_as::<_, ItemRow>(&sql);
        if let Some(value) = bind {
            query = query.bind(value);
        }
        Ok(query.fetch_all(&self.pool).await?)
    }

    async fn notes_for(&self, clause: &str, bind: Option<&str>) -> Result<Vec<NoteRow>> {
        let sql = format!(
            r#"
            SELECT n.delivery_id, n.created_at, n.tag, n.message
            FROM delivery_notes n
            JOIN deliveries d ON d.id = n.delivery_id
            WHERE {}
            ORDER BY n.delivery_id, n.seq ASC
            "#,
            clause
        );
        let mut query = sqlx::query_as::<_, NoteRow>(&sql);
        if let Some(value) = bind {
            query = query.bind(value);
        }
        Ok(query.fetch_all(&self.pool).await?)
    }

    /// Load deliveries matching a WHERE clause over `deliveries d`
    async fn load_deliveries(&self, clause: &str, bind: Option<String>) -> Result<Vec<Delivery>> {
        let sql = format!(
            r#"
            SELECT d.id, d.delivery_number, d.order_date, d.address, d.status, d.creator_id,
                   d.courier_id, d.estimated_date, d.version, d.created_at
            FROM deliveries d
            WHERE {}
            ORDER BY d.order_date DESC, d.created_at DESC
            "#,
            clause
        );
        let mut query = sqlx::query_as::<_, DeliveryRow>(&sql);
        if let Some(value) = &bind {
            query = query.bind(value.clone());
        }
        let rows = query.fetch_all(&self.pool).await?;
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let mut items: HashMap<String, Vec<DeliveryItem>> = HashMap::new();
        for row in self.items_for(clause, bind.as_deref()).await? {
            let key = row.delivery_id.clone();
            items.entry(key).or_default().push(row.try_into()?);
        }

        let mut notes: HashMap<String, Vec<AuditNote>> = HashMap::new();
        for row in self.notes_for(clause, bind.as_deref()).await? {
            let key = row.delivery_id.clone();
            notes.entry(key).or_default().push(row.try_into()?);
        }

        rows.into_iter()
            .map(|row| {
                let delivery_items = items.remove(&row.id).unwrap_or_default();
                let delivery_notes = notes.remove(&row.id).unwrap_or_default();
                row.into_delivery(delivery_items, delivery_notes)
            })
            .collect()
    }
}

#[async_trait]
impl Repository for SqliteStore {
    async fn insert_user(&self, user: &User) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, username, password_hash, role, name, is_active, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(user.id.to_string())
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(&user.name)
        .bind(user.is_active)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::Conflict(format!("Username {} already exists", user.username))
            }
            other => AppError::Database(other),
        })?;

        Ok(())
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, password_hash, role, name, is_active, created_at
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, password_hash, role, name, is_active, created_at
            FROM users
            WHERE username = ?
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, password_hash, role, name, is_active, created_at
            FROM users
            ORDER BY created_at ASC, username ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|r| r.try_into()).collect()
    }

    async fn set_user_active(&self, id: Uuid, active: bool) -> Result<bool> {
        let result = sqlx::query("UPDATE users SET is_active = ? WHERE id = ?")
            .bind(active)
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn count_users(&self, role: Role, blocked_only: bool) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM users WHERE role = ? AND (? = 0 OR is_active = 0)",
        )
        .bind(role.as_str())
        .bind(blocked_only)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn insert_delivery(&self, delivery: &Delivery) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        let delivery_id = delivery.id.to_string();

        sqlx::query(
            r#"
            INSERT INTO deliveries (id, delivery_number, order_date, address, status, creator_id,
                                    courier_id, estimated_date, version, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&delivery_id)
        .bind(&delivery.delivery_number)
        .bind(delivery.order_date)
        .bind(&delivery.address)
        .bind(delivery.status.as_str())
        .bind(delivery.creator_id.to_string())
        .bind(delivery.courier_id.map(|u| u.to_string()))
        .bind(delivery.estimated_date)
        .bind(delivery.version)
        .bind(delivery.created_at)
        .execute(&mut *tx)
        .await?;

        for (position, item) in delivery.items.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO delivery_items (id, delivery_id, position, name, quantity,
                                            delivered_quantity, pending_quantity)
                VALUES (?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(item.id.to_string())
            .bind(&delivery_id)
            .bind(position as i64)
            .bind(&item.name)
            .bind(item.quantity)
            .bind(item.delivered_quantity)
            .bind(item.pending_quantity)
            .execute(&mut *tx)
            .await?;
        }

        for (seq, note) in delivery.notes.iter().enumerate() {
            insert_note(&mut tx, &delivery_id, seq as i64, note).await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn find_delivery(&self, id: Uuid) -> Result<Option<Delivery>> {
        Ok(self
            .load_deliveries("d.id = ?", Some(id.to_string()))
            .await?
            .into_iter()
            .next())
    }

    async fn list_deliveries(&self, filter: DeliveryFilter) -> Result<Vec<Delivery>> {
        match filter {
            DeliveryFilter::All => self.load_deliveries("1 = 1", None).await,
            DeliveryFilter::CreatedBy(id) => {
                self.load_deliveries("d.creator_id = ?", Some(id.to_string()))
                    .await
            }
            DeliveryFilter::CourierPool(id) => {
                self.load_deliveries(
                    "(d.courier_id = ? OR d.status = 'new')",
                    Some(id.to_string()),
                )
                .await
            }
        }
    }

    async fn save_delivery(
        &self,
        delivery: &Delivery,
        notes: &[AuditNote],
        expected_version: i64,
    ) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        let delivery_id = delivery.id.to_string();

        let updated = sqlx::query(
            r#"
            UPDATE deliveries
            SET address = ?, status = ?, courier_id = ?, estimated_date = ?, version = version + 1
            WHERE id = ? AND version = ?
            "#,
        )
        .bind(&delivery.address)
        .bind(delivery.status.as_str())
        .bind(delivery.courier_id.map(|u| u.to_string()))
        .bind(delivery.estimated_date)
        .bind(&delivery_id)
        .bind(expected_version)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(AppError::Conflict(format!(
                "Delivery {} was modified concurrently, retry the action",
                delivery.id
            )));
        }

        for item in &delivery.items {
            sqlx::query(
                r#"
                UPDATE delivery_items
                SET delivered_quantity = ?, pending_quantity = ?
                WHERE id = ? AND delivery_id = ?
                "#,
            )
            .bind(item.delivered_quantity)
            .bind(item.pending_quantity)
            .bind(item.id.to_string())
            .bind(&delivery_id)
            .execute(&mut *tx)
            .await?;
        }

        if !notes.is_empty() {
            let (next_seq,): (i64,) = sqlx::query_as(
                "SELECT COALESCE(MAX(seq) + 1, 0) FROM delivery_notes WHERE delivery_id = ?",
            )
            .bind(&delivery_id)
            .fetch_one(&mut *tx)
            .await?;

            for (offset, note) in notes.iter().enumerate() {
                insert_note(&mut tx, &delivery_id, next_seq + offset as i64, note).await?;
            }
        }

        tx.commit().await?;
        Ok(())
    }

    async fn delete_delivery(&self, id: Uuid) -> Result<bool> {
        let mut tx = self.pool.begin().await?;
        let delivery_id = id.to_string();

        sqlx::query("DELETE FROM delivery_items WHERE delivery_id = ?")
            .bind(&delivery_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM delivery_notes WHERE delivery_id = ?")
            .bind(&delivery_id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM deliveries WHERE id = ?")
            .bind(&delivery_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_deliveries(&self, status: Option<DeliveryStatus>) -> Result<i64> {
        let status = status.map(|s| s.as_str());
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM deliveries WHERE ? IS NULL OR status = ?")
                .bind(status)
                .bind(status)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}

async fn insert_note(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    delivery_id: &str,
    seq: i64,
    note: &AuditNote,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO delivery_notes (delivery_id, seq, created_at, tag, message)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(delivery_id)
    .bind(seq)
    .bind(note.at)
    .bind(note.tag.as_str())
    .bind(&note.message)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

fn parse_uuid(value: &str, field: &str) -> Result<Uuid> {
    Uuid::parse_str(value).map_err(|e| AppError::Internal(format!("Invalid {} UUID: {}", field, e)))
}

// Internal row types for sqlx

#[derive(sqlx::FromRow)]
struct UserRow {
    id: String,
    username: String,
    password_hash: String,
    role: String,
    name: String,
    is_active: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = AppError;

    fn try_from(row: UserRow) -> Result<Self> {
        Ok(User {
            id: parse_uuid(&row.id, "user id")?,
            username: row.username,
            password_hash: row.password_hash,
            role: row
                .role
                .parse()
                .map_err(|e| AppError::Internal(format!("Invalid role: {}", e)))?,
            name: row.name,
            is_active: row.is_active,
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct DeliveryRow {
    id: String,
    delivery_number: String,
    order_date: NaiveDate,
    address: String,
    status: String,
    creator_id: String,
    courier_id: Option<String>,
    estimated_date: NaiveDate,
    version: i64,
    created_at: DateTime<Utc>,
}

impl DeliveryRow {
    fn into_delivery(self, items: Vec<DeliveryItem>, notes: Vec<AuditNote>) -> Result<Delivery> {
        Ok(Delivery {
            id: parse_uuid(&self.id, "delivery id")?,
            delivery_number: self.delivery_number,
            order_date: self.order_date,
            address: self.address,
            status: self
                .status
                .parse()
                .map_err(|e| AppError::Internal(format!("Invalid status: {}", e)))?,
            creator_id: parse_uuid(&self.creator_id, "creator_id")?,
            courier_id: self
                .courier_id
                .as_deref()
                .map(|s| parse_uuid(s, "courier_id"))
                .transpose()?,
            estimated_date: self.estimated_date,
            items,
            notes,
            version: self.version,
            created_at: self.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ItemRow {
    id: String,
    delivery_id: String,
    name: String,
    quantity: i64,
    delivered_quantity: i64,
    pending_quantity: i64,
}

impl TryFrom<ItemRow> for DeliveryItem {
    type Error = AppError;

    fn try_from(row: ItemRow) -> Result<Self> {
        Ok(DeliveryItem {
            id: parse_uuid(&row.id, "item id")?,
            delivery_id: parse_uuid(&row.delivery_id, "delivery_id")?,
            name: row.name,
            quantity: row.quantity,
            delivered_quantity: row.delivered_quantity,
            pending_quantity: row.pending_quantity,
        })
    }
}

#[derive(sqlx::FromRow)]
struct NoteRow {
    delivery_id: String,
    created_at: DateTime<Utc>,
    tag: String,
    message: String,
}

impl TryFrom<NoteRow> for AuditNote {
    type Error = AppError;

    fn try_from(row: NoteRow) -> Result<Self> {
        Ok(AuditNote {
            at: row.created_at,
            tag: row
                .tag
                .parse()
                .map_err(|e| AppError::Internal(format!("Invalid audit tag: {}", e)))?,
            message: row.message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AuditTag;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn setup_test_db() -> SqliteStore {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create in-memory database");

        let store = SqliteStore::new(pool);
        store.migrate().await.expect("Failed to run migrations");
        store
    }

    fn user(username: &str, role: Role) -> User {
        User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            password_hash: "hash".to_string(),
            role,
            name: username.to_uppercase(),
            is_active: true,
            created_at: Utc::now(),
        }
    }

    fn delivery(creator: &User, order_date: NaiveDate) -> Delivery {
        let id = Uuid::new_v4();
        Delivery {
            id,
            delivery_number: format!("DEL-{}", id.simple()),
            order_date,
            address: "1 Main St".to_string(),
            status: DeliveryStatus::New,
            creator_id: creator.id,
            courier_id: None,
            estimated_date: order_date.succ_opt().unwrap(),
            items: vec![
                DeliveryItem::new(id, "Milk", 10),
                DeliveryItem::new(id, "Bread", 2),
            ],
            notes: vec![AuditNote::new(AuditTag::Client, "Delivery created.")],
            version: 0,
            created_at: Utc::now(),
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 5, d).unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_find_user() {
        let store = setup_test_db().await;
        let ann = user("ann", Role::Client);
        store.insert_user(&ann).await.unwrap();

        let by_id = store.find_user(ann.id).await.unwrap().unwrap();
        assert_eq!(by_id.username, "ann");
        assert_eq!(by_id.role, Role::Client);
        assert!(by_id.is_active);

        let by_name = store.find_user_by_username("ann").await.unwrap().unwrap();
        assert_eq!(by_name.id, ann.id);
        assert!(store.find_user_by_username("bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username_is_conflict() {
        let store = setup_test_db().await;
        store.insert_user(&user("ann", Role::Client)).await.unwrap();
        let result = store.insert_user(&user("ann", Role::Courier)).await;
        assert!(matches!(result.unwrap_err(), AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_set_user_active() {
        let store = setup_test_db().await;
        let ann = user("ann", Role::Client);
        store.insert_user(&ann).await.unwrap();

        assert!(store.set_user_active(ann.id, false).await.unwrap());
        assert!(!store.find_user(ann.id).await.unwrap().unwrap().is_active);
        assert!(!store.set_user_active(Uuid::new_v4(), false).await.unwrap());
    }

    #[tokio::test]
    async fn test_delivery_round_trip_keeps_items_and_notes_in_order() {
        let store = setup_test_db().await;
        let ann = user("ann", Role::Client);
        store.insert_user(&ann).await.unwrap();
        let created = delivery(&ann, day(3));
        store.insert_delivery(&created).await.unwrap();

        let fetched = store.find_delivery(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.status, DeliveryStatus::New);
        assert_eq!(fetched.estimated_date, day(4));
        let names: Vec<&str> = fetched.items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Milk", "Bread"]);
        assert_eq!(fetched.notes.len(), 1);
        assert_eq!(fetched.notes[0].tag, AuditTag::Client);
    }

    #[tokio::test]
    async fn test_find_delivery_not_found() {
        let store = setup_test_db().await;
        assert!(store.find_delivery(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_delivery_appends_notes_and_bumps_version() {
        let store = setup_test_db().await;
        let ann = user("ann", Role::Client);
        let carl = user("carl", Role::Courier);
        store.insert_user(&ann).await.unwrap();
        store.insert_user(&carl).await.unwrap();
        let created = delivery(&ann, day(3));
        store.insert_delivery(&created).await.unwrap();

        let mut changed = created.clone();
        changed.status = DeliveryStatus::Assigned;
        changed.courier_id = Some(carl.id);
        changed.items[0].pending_quantity = 4;
        let note = AuditNote::new(AuditTag::Courier, "Accepted for delivery.");
        store.save_delivery(&changed, &[note], 0).await.unwrap();

        let fetched = store.find_delivery(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.version, 1);
        assert_eq!(fetched.status, DeliveryStatus::Assigned);
        assert_eq!(fetched.courier_id, Some(carl.id));
        assert_eq!(fetched.items[0].pending_quantity, 4);
        assert_eq!(fetched.notes.len(), 2);
        assert_eq!(fetched.notes[1].message, "Accepted for delivery.");
    }

    #[tokio::test]
    async fn test_save_delivery_with_stale_version_conflicts() {
        let store = setup_test_db().await;
        let ann = user("ann", Role::Client);
        store.insert_user(&ann).await.unwrap();
        let created = delivery(&ann, day(3));
        store.insert_delivery(&created).await.unwrap();

        store.save_delivery(&created, &[], 0).await.unwrap();
        let result = store.save_delivery(&created, &[], 0).await;
        assert!(matches!(result.unwrap_err(), AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_list_deliveries_filters() {
        let store = setup_test_db().await;
        let ann = user("ann", Role::Client);
        let bob = user("bob", Role::Client);
        let carl = user("carl", Role::Courier);
        let cleo = user("cleo", Role::Courier);
        for u in [&ann, &bob, &carl, &cleo] {
            store.insert_user(u).await.unwrap();
        }

        let open = delivery(&ann, day(1));
        let mut mine = delivery(&bob, day(2));
        mine.status = DeliveryStatus::Assigned;
        mine.courier_id = Some(carl.id);
        let mut other = delivery(&bob, day(3));
        other.status = DeliveryStatus::Assigned;
        other.courier_id = Some(cleo.id);
        for d in [&open, &mine, &other] {
            store.insert_delivery(d).await.unwrap();
        }

        let all = store.list_deliveries(DeliveryFilter::All).await.unwrap();
        let ids: Vec<Uuid> = all.iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![other.id, mine.id, open.id]);
        assert!(all.iter().all(|d| d.items.len() == 2));

        let bobs = store
            .list_deliveries(DeliveryFilter::CreatedBy(bob.id))
            .await
            .unwrap();
        assert_eq!(bobs.len(), 2);

        let pool = store
            .list_deliveries(DeliveryFilter::CourierPool(carl.id))
            .await
            .unwrap();
        let ids: Vec<Uuid> = pool.iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![mine.id, open.id]);
    }

    #[tokio::test]
    async fn test_counts() {
        let store = setup_test_db().await;
        let ann = user("ann", Role::Client);
        let mut bob = user("bob", Role::Client);
        bob.is_active = false;
        let carl = user("carl", Role::Courier);
        for u in [&ann, &bob, &carl] {
            store.insert_user(u).await.unwrap();
        }

        assert_eq!(store.count_users(Role::Client, false).await.unwrap(), 2);
        assert_eq!(store.count_users(Role::Client, true).await.unwrap(), 1);
        assert_eq!(store.count_users(Role::Courier, false).await.unwrap(), 1);
        assert_eq!(store.count_users(Role::Courier, true).await.unwrap(), 0);
        assert_eq!(store.count_users(Role::Admin, false).await.unwrap(), 0);

        let open = delivery(&ann, day(1));
        let mut done = delivery(&ann, day(2));
        done.status = DeliveryStatus::Delivered;
        done.courier_id = Some(carl.id);
        for d in [&open, &done] {
            store.insert_delivery(d).await.unwrap();
        }

        assert_eq!(store.count_deliveries(None).await.unwrap(), 2);
        assert_eq!(
            store
                .count_deliveries(Some(DeliveryStatus::Delivered))
                .await
                .unwrap(),
            1
        );
        assert_eq!(
            store
                .count_deliveries(Some(DeliveryStatus::Disputed))
                .await
                .unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn test_delete_delivery_cascades() {
        let store = setup_test_db().await;
        let ann = user("ann", Role::Client);
        store.insert_user(&ann).await.unwrap();
        let created = delivery(&ann, day(3));
        store.insert_delivery(&created).await.unwrap();

        assert!(store.delete_delivery(created.id).await.unwrap());
        assert!(store.find_delivery(created.id).await.unwrap().is_none());

        let (items,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM delivery_items")
            .fetch_one(store.pool())
            .await
            .unwrap();
        assert_eq!(items, 0);
        assert!(!store.delete_delivery(created.id).await.unwrap());
    }
}
