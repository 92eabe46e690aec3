use std::collections::HashMap;

pub mod enemy;
pub mod ids;
pub mod item;
pub mod loader;
pub mod npc;
pub mod quest;
pub mod room;

pub use enemy::{EnemyAttack, EnemyData, LootEntry, RangedValue};
pub use ids::{AreaId, EnemyId, ItemId, NpcId, QuestId, RoomId};
pub use item::{ConsumableEffect, EquipmentSlot, ItemData, ItemKind, StatBlock};
pub use loader::{load_game_data, ContentError, ContentLoadError};
pub use npc::{NpcData, NpcDialogue};
pub use quest::{ObjectiveKind, QuestData, QuestObjective};
pub use room::{AreaData, Direction, RoomData};

/// Every content template loaded at startup. Immutable for the lifetime of
/// the process; shared read-only with the game thread.
#[derive(Debug)]
pub struct GameData {
    pub items: HashMap<ItemId, ItemData>,
    pub npcs: HashMap<NpcId, NpcData>,
    pub enemies: HashMap<EnemyId, EnemyData>,
    pub quests: HashMap<QuestId, QuestData>,
    pub rooms: HashMap<RoomId, RoomData>,
    pub areas: HashMap<AreaId, AreaData>,
}

impl GameData {
    pub fn get_item(&self, id: &ItemId) -> Option<&ItemData> {
        self.items.get(id)
    }

    pub fn get_npc(&self, id: &NpcId) -> Option<&NpcData> {
        self.npcs.get(id)
    }

    pub fn get_enemy(&self, id: &EnemyId) -> Option<&EnemyData> {
        self.enemies.get(id)
    }

    pub fn get_quest(&self, id: &QuestId) -> Option<&QuestData> {
        self.quests.get(id)
    }

    pub fn get_room(&self, id: &RoomId) -> Option<&RoomData> {
        self.rooms.get(id)
    }

    pub fn iter_quests(&self) -> impl Iterator<Item = &QuestData> {
        self.quests.values()
    }

    pub fn iter_area_rooms<'a>(&'a self, area: &AreaId) -> impl Iterator<Item = &'a RoomData> {
        self.areas
            .get(area)
            .into_iter()
            .flat_map(|area| area.rooms.iter())
            .filter_map(|room_id| self.rooms.get(room_id))
    }

    /// Display name for an item id, falling back to the raw id for
    /// references that predate a content change.
    pub fn item_name<'a>(&'a self, id: &'a ItemId) -> &'a str {
        self.items.get(id).map_or(id.as_str(), |item| &item.name)
    }

    pub fn enemy_name<'a>(&'a self, id: &'a EnemyId) -> &'a str {
        self.enemies.get(id).map_or(id.as_str(), |enemy| &enemy.name)
    }
}
