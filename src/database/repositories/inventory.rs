//! Inventory repository implementation

use sqlx::PgPool;
use chrono::Utc;
use crate::models::inventory::{BulkInventoryUpdate, BulkUpdateOutcome, InventoryItem, InventoryItemRequest};
use crate::utils::errors::CampHubError;
use crate::utils::helpers::trim_to_option;

#[derive(Clone, Debug)]
pub struct InventoryRepository {
    pool: PgPool,
}

impl InventoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, user_id: i64, request: &InventoryItemRequest) -> Result<InventoryItem, CampHubError> {
        let now = Utc::now();
        let item = sqlx::query_as::<_, InventoryItem>(
            r#"
            INSERT INTO inventory_items (user_id, name, quantity, description, is_shared_gear, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            RETURNING *
            "#
        )
        .bind(user_id)
        .bind(request.name.trim())
        .bind(request.quantity)
        .bind(trim_to_option(request.description.as_deref()))
        .bind(request.is_shared_gear)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(item)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<InventoryItem>, CampHubError> {
        let item = sqlx::query_as::<_, InventoryItem>("SELECT * FROM inventory_items WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(item)
    }

    pub async fn update(&self, id: i64, request: &InventoryItemRequest) -> Result<InventoryItem, CampHubError> {
        let item = sqlx::query_as::<_, InventoryItem>(
            r#"
            UPDATE inventory_items
            SET name = $2, quantity = $3, description = $4, is_shared_gear = $5, updated_at = $6
            WHERE id = $1
            RETURNING *
            "#
        )
        .bind(id)
        .bind(request.name.trim())
        .bind(request.quantity)
        .bind(trim_to_option(request.description.as_deref()))
        .bind(request.is_shared_gear)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        item.ok_or(CampHubError::InventoryItemNotFound { item_id: id })
    }

    pub async fn delete(&self, id: i64) -> Result<(), CampHubError> {
        sqlx::query("DELETE FROM inventory_items WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// The user's items, alphabetical
    pub async fn list_for_user(&self, user_id: i64) -> Result<Vec<InventoryItem>, CampHubError> {
        let items = sqlx::query_as::<_, InventoryItem>(
            "SELECT * FROM inventory_items WHERE user_id = $1 ORDER BY name ASC, id ASC"
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Apply a bulk edit in one transaction.
    ///
    /// Updates naming items that do not exist, belong to someone else, or
    /// carry a negative quantity are skipped. Only rows whose values actually
    /// change are counted.
    pub async fn apply_bulk(&self, user_id: i64, bulk: &BulkInventoryUpdate) -> Result<BulkUpdateOutcome, CampHubError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;
        let mut outcome = BulkUpdateOutcome { creates_count: 0, updates_count: 0 };

        if let Some(new_item) = bulk.new_item.as_ref().filter(|n| !n.name.trim().is_empty()) {
            sqlx::query(
                r#"
                INSERT INTO inventory_items (user_id, name, quantity, description, is_shared_gear, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6, $6)
                "#
            )
            .bind(user_id)
            .bind(new_item.name.trim())
            .bind(new_item.quantity)
            .bind(trim_to_option(new_item.description.as_deref()))
            .bind(new_item.is_shared_gear)
            .bind(now)
            .execute(&mut *tx)
            .await?;
            outcome.creates_count += 1;
        }

        for update in &bulk.updates {
            if update.quantity.map_or(false, |q| q < 0) {
                continue;
            }

            let result = sqlx::query(
                r#"
                UPDATE inventory_items
                SET quantity = COALESCE($3, quantity),
                    is_shared_gear = COALESCE($4, is_shared_gear),
                    updated_at = $5
                WHERE id = $1 AND user_id = $2
                  AND (quantity IS DISTINCT FROM COALESCE($3, quantity)
                       OR is_shared_gear IS DISTINCT FROM COALESCE($4, is_shared_gear))
                "#
            )
            .bind(update.id)
            .bind(user_id)
            .bind(update.quantity)
            .bind(update.is_shared_gear)
            .bind(now)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() > 0 {
                outcome.updates_count += 1;
            }
        }

        tx.commit().await?;
        Ok(outcome)
    }
}
