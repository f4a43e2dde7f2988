//! Personal gear inventory
//!
//! Every item belongs to one user; nobody else can read or change it. Items
//! flagged as shared gear show up pooled on the camp pages of the owner's
//! camps.

use tracing::{debug, info};

use crate::database::DatabaseService;
use crate::models::{BulkInventoryUpdate, BulkUpdateOutcome, InventoryItem, InventoryItemRequest, QuickAddItem};
use crate::utils::errors::{CampHubError, Result};
use crate::utils::logging::log_user_action;
use crate::utils::validation::validate_inventory_request;
use crate::workflow::{deny, Actor};

#[derive(Clone, Debug)]
pub struct InventoryService {
    db: DatabaseService,
}

impl InventoryService {
    pub fn new(db: DatabaseService) -> Self {
        Self { db }
    }

    async fn owned_item(&self, actor: &Actor, item_id: i64) -> Result<InventoryItem> {
        actor.ensure_active()?;
        let item = self
            .db
            .inventory
            .find_by_id(item_id)
            .await?
            .ok_or(CampHubError::InventoryItemNotFound { item_id })?;

        if item.user_id != actor.user_id {
            return deny("You do not have permission to access this item");
        }
        Ok(item)
    }

    pub async fn list(&self, actor: &Actor) -> Result<Vec<InventoryItem>> {
        actor.ensure_active()?;
        self.db.inventory.list_for_user(actor.user_id).await
    }

    pub async fn get(&self, actor: &Actor, item_id: i64) -> Result<InventoryItem> {
        self.owned_item(actor, item_id).await
    }

    pub async fn create(&self, actor: &Actor, request: InventoryItemRequest) -> Result<InventoryItem> {
        actor.ensure_active()?;
        validate_inventory_request(&request)?;

        let item = self.db.inventory.create(actor.user_id, &request).await?;
        debug!(item_id = item.id, user_id = actor.user_id, "Inventory item created");
        Ok(item)
    }

    pub async fn update(&self, actor: &Actor, item_id: i64, request: InventoryItemRequest) -> Result<InventoryItem> {
        self.owned_item(actor, item_id).await?;
        validate_inventory_request(&request)?;
        self.db.inventory.update(item_id, &request).await
    }

    pub async fn delete(&self, actor: &Actor, item_id: i64) -> Result<()> {
        let item = self.owned_item(actor, item_id).await?;
        self.db.inventory.delete(item.id).await?;
        log_user_action(actor.user_id, "delete_inventory_item", Some(&item.name));
        Ok(())
    }

    /// Optional new item plus quantity/shared-flag edits in one go.
    /// Invalid or foreign entries are skipped rather than failing the batch.
    pub async fn bulk_update(&self, actor: &Actor, mut bulk: BulkInventoryUpdate) -> Result<BulkUpdateOutcome> {
        actor.ensure_active()?;

        if let Some(new_item) = bulk.new_item.as_ref() {
            if let Err(e) = validate_inventory_request(new_item) {
                debug!(user_id = actor.user_id, error = %e, "Skipping invalid new item in bulk update");
                bulk.new_item = None;
            }
        }

        let outcome = self.db.inventory.apply_bulk(actor.user_id, &bulk).await?;
        info!(
            user_id = actor.user_id,
            creates = outcome.creates_count,
            updates = outcome.updates_count,
            "Inventory bulk update applied"
        );
        Ok(outcome)
    }

    /// One unit of a catalogue item, not shared
    pub async fn quick_add(&self, actor: &Actor, item: QuickAddItem) -> Result<InventoryItem> {
        self.create(actor, InventoryItemRequest::new(item.label(), 1)).await
    }

    pub fn quick_add_catalogue(&self) -> &'static [QuickAddItem] {
        &QuickAddItem::ALL
    }
}
