use std::ops::Add;

use enum_map::Enum;
use serde::{Deserialize, Serialize};

use crate::data::ids::ItemId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Weapon,
    Armor,
    Shield,
    Accessory,
    Consumable,
    Misc,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Enum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentSlot {
    MainHand,
    OffHand,
    Head,
    Chest,
    Legs,
    Feet,
    Hands,
    Accessory,
    Ring,
    Necklace,
}

impl EquipmentSlot {
    pub fn display_name(&self) -> &'static str {
        match self {
            EquipmentSlot::MainHand => "main hand",
            EquipmentSlot::OffHand => "off hand",
            EquipmentSlot::Head => "head",
            EquipmentSlot::Chest => "chest",
            EquipmentSlot::Legs => "legs",
            EquipmentSlot::Feet => "feet",
            EquipmentSlot::Hands => "hands",
            EquipmentSlot::Accessory => "accessory",
            EquipmentSlot::Ring => "ring",
            EquipmentSlot::Necklace => "necklace",
        }
    }
}

/// Additive stat block shared by item deltas and base character stats.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StatBlock {
    pub damage: i32,
    pub defense: i32,
    pub speed: i32,
    pub health: i32,
}

impl Add for StatBlock {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            damage: self.damage + rhs.damage,
            defense: self.defense + rhs.defense,
            speed: self.speed + rhs.speed,
            health: self.health + rhs.health,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConsumableEffect {
    pub restore_health: i32,
}

fn default_true() -> bool {
    true
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ItemData {
    #[serde(skip)]
    pub id: ItemId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub kind: ItemKind,
    #[serde(default)]
    pub slot: Option<EquipmentSlot>,
    #[serde(default)]
    pub stats: StatBlock,
    #[serde(default)]
    pub effects: Option<ConsumableEffect>,
    #[serde(default)]
    pub value: u32,
    #[serde(default)]
    pub weight: u32,
    #[serde(default = "default_true")]
    pub stackable: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_defaults() {
        let item: ItemData = serde_json::from_str(
            r#"{ "name": "Rusty Sword", "kind": "weapon", "slot": "main_hand" }"#,
        )
        .unwrap();
        assert!(item.stackable);
        assert_eq!(item.value, 0);
        assert_eq!(item.slot, Some(EquipmentSlot::MainHand));
        assert_eq!(item.stats, StatBlock::default());
    }

    #[test]
    fn test_item_rejects_unknown_fields() {
        let result: Result<ItemData, _> = serde_json::from_str(
            r#"{ "name": "Thing", "kind": "misc", "colour": "red" }"#,
        );
        assert!(result.is_err());
    }
}
