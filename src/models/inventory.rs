//! Personal inventory model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InventoryItem {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub quantity: i32,
    pub description: Option<String>,
    pub is_shared_gear: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryItemRequest {
    pub name: String,
    pub quantity: i32,
    pub description: Option<String>,
    #[serde(default)]
    pub is_shared_gear: bool,
}

impl InventoryItemRequest {
    pub fn new(name: &str, quantity: i32) -> Self {
        Self {
            name: name.to_string(),
            quantity,
            description: None,
            is_shared_gear: false,
        }
    }
}

/// One entry of a bulk update; absent fields are left alone
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InventoryItemUpdate {
    pub id: i64,
    pub quantity: Option<i32>,
    pub is_shared_gear: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BulkInventoryUpdate {
    pub new_item: Option<InventoryItemRequest>,
    #[serde(default)]
    pub updates: Vec<InventoryItemUpdate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkUpdateOutcome {
    pub creates_count: usize,
    pub updates_count: usize,
}

impl BulkUpdateOutcome {
    /// User-facing summary such as "1 item created and 2 changes saved!"
    pub fn message(&self) -> String {
        let mut parts = Vec::new();
        if self.creates_count > 0 {
            parts.push(format!(
                "{} item{} created",
                self.creates_count,
                if self.creates_count == 1 { "" } else { "s" }
            ));
        }
        if self.updates_count > 0 {
            parts.push(format!(
                "{} change{} saved",
                self.updates_count,
                if self.updates_count == 1 { "" } else { "s" }
            ));
        }

        if parts.is_empty() {
            "No changes to save.".to_string()
        } else {
            format!("{}!", parts.join(" and "))
        }
    }
}

/// Common gear that can be added with one click
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuickAddItem {
    Tent,
    Canopy,
    Table,
    Chairs,
    Cooler,
    Grill,
    SleepingBag,
    Cot,
    Generator,
    Lights,
    SoundSystem,
    Art,
    Shade,
    FirePit,
    Tools,
    FirstAid,
}

impl QuickAddItem {
    pub const ALL: [QuickAddItem; 16] = [
        QuickAddItem::Tent,
        QuickAddItem::Canopy,
        QuickAddItem::Table,
        QuickAddItem::Chairs,
        QuickAddItem::Cooler,
        QuickAddItem::Grill,
        QuickAddItem::SleepingBag,
        QuickAddItem::Cot,
        QuickAddItem::Generator,
        QuickAddItem::Lights,
        QuickAddItem::SoundSystem,
        QuickAddItem::Art,
        QuickAddItem::Shade,
        QuickAddItem::FirePit,
        QuickAddItem::Tools,
        QuickAddItem::FirstAid,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            QuickAddItem::Tent => "tent",
            QuickAddItem::Canopy => "canopy",
            QuickAddItem::Table => "table",
            QuickAddItem::Chairs => "chairs",
            QuickAddItem::Cooler => "cooler",
            QuickAddItem::Grill => "grill",
            QuickAddItem::SleepingBag => "sleeping-bag",
            QuickAddItem::Cot => "cot",
            QuickAddItem::Generator => "generator",
            QuickAddItem::Lights => "lights",
            QuickAddItem::SoundSystem => "sound-system",
            QuickAddItem::Art => "art",
            QuickAddItem::Shade => "shade",
            QuickAddItem::FirePit => "fire-pit",
            QuickAddItem::Tools => "tools",
            QuickAddItem::FirstAid => "first-aid",
        }
    }

    /// Item name stored in the inventory
    pub fn label(&self) -> &'static str {
        match self {
            QuickAddItem::Tent => "Tent",
            QuickAddItem::Canopy => "Canopy",
            QuickAddItem::Table => "Table",
            QuickAddItem::Chairs => "Camp Chairs",
            QuickAddItem::Cooler => "Cooler",
            QuickAddItem::Grill => "Grill",
            QuickAddItem::SleepingBag => "Sleeping Bag",
            QuickAddItem::Cot => "Cot",
            QuickAddItem::Generator => "Generator",
            QuickAddItem::Lights => "Lights",
            QuickAddItem::SoundSystem => "Sound System",
            QuickAddItem::Art => "Art Installation",
            QuickAddItem::Shade => "Shade Structure",
            QuickAddItem::FirePit => "Fire Pit",
            QuickAddItem::Tools => "Tools",
            QuickAddItem::FirstAid => "First Aid Kit",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|item| item.key() == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bulk_message() {
        let outcome = |creates_count, updates_count| BulkUpdateOutcome { creates_count, updates_count };
        assert_eq!(outcome(0, 0).message(), "No changes to save.");
        assert_eq!(outcome(1, 0).message(), "1 item created!");
        assert_eq!(outcome(0, 3).message(), "3 changes saved!");
        assert_eq!(outcome(2, 1).message(), "2 items created and 1 change saved!");
    }

    #[test]
    fn test_quick_add_catalogue() {
        assert_eq!(QuickAddItem::from_key("chairs").map(|i| i.label()), Some("Camp Chairs"));
        assert_eq!(QuickAddItem::from_key("first-aid").map(|i| i.label()), Some("First Aid Kit"));
        assert_eq!(QuickAddItem::from_key("hot-tub"), None);
        for item in QuickAddItem::ALL {
            assert_eq!(QuickAddItem::from_key(item.key()), Some(item));
        }
    }
}
