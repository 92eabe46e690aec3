use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::data::{GameData, ItemId, RoomId, StatBlock};
use crate::game::storage::password::PasswordHash;

use super::{
    basic_stats::BasicStats,
    equipment::Equipment,
    friends::FriendList,
    health_points::HealthPoints,
    inventory::Inventory,
    level::{experience_to_next_level, ExperiencePoints, Level},
    position::Position,
    quest_log::QuestLog,
};

pub const STARTING_MAX_HEALTH: i32 = 100;
pub const LEVEL_UP_HEALTH_BONUS: i32 = 10;

/// Stat totals after equipment deltas. Recomputed on demand; never stored.
#[derive(Clone, Copy, Debug, Default)]
pub struct DerivedStats {
    pub damage: i32,
    pub defense: i32,
    pub speed: i32,
    pub max_health: i32,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct LevelUpResult {
    pub levels_gained: u32,
}

/// The full durable character record. One of these lives inside each playing
/// session; the storage module rewrites the whole record on save. Fields this
/// server version does not know about round-trip through `extra`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Character {
    pub name: String,
    pub password: PasswordHash,
    #[serde(default)]
    pub level: Level,
    #[serde(default)]
    pub experience: ExperiencePoints,
    pub health: HealthPoints,
    pub max_health: i32,
    #[serde(default)]
    pub gold: u32,
    pub position: Position,
    #[serde(default)]
    pub basic_stats: BasicStats,
    #[serde(default)]
    pub inventory: Inventory,
    #[serde(default)]
    pub equipment: Equipment,
    #[serde(default)]
    pub quest_log: QuestLog,
    #[serde(default)]
    pub taken_one_time_items: BTreeSet<String>,
    #[serde(default)]
    pub defeated_one_time_enemies: BTreeSet<String>,
    #[serde(default)]
    pub friends: FriendList,
    #[serde(default)]
    pub homestone: Option<RoomId>,
    #[serde(default)]
    pub last_saved: Option<DateTime<Utc>>,
    #[serde(skip)]
    pub in_combat: bool,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Character {
    pub fn create(
        name: String,
        password: PasswordHash,
        room: RoomId,
        coords: Option<(i32, i32)>,
    ) -> Self {
        Self {
            name,
            password,
            level: Level::default(),
            experience: ExperiencePoints::default(),
            health: HealthPoints::new(STARTING_MAX_HEALTH),
            max_health: STARTING_MAX_HEALTH,
            gold: 0,
            position: Position::new(room, coords),
            basic_stats: BasicStats::default(),
            inventory: Inventory::default(),
            equipment: Equipment::default(),
            quest_log: QuestLog::default(),
            taken_one_time_items: BTreeSet::new(),
            defeated_one_time_enemies: BTreeSet::new(),
            friends: FriendList::default(),
            homestone: None,
            last_saved: None,
            in_combat: false,
            extra: serde_json::Map::new(),
        }
    }

    pub fn derived_stats(&self, data: &GameData) -> DerivedStats {
        let mut totals = StatBlock {
            damage: self.basic_stats.damage,
            defense: self.basic_stats.defense,
            speed: self.basic_stats.speed,
            health: 0,
        };
        for (_, item_id) in self.equipment.iter_equipped() {
            if let Some(item) = data.get_item(item_id) {
                totals = totals + item.stats;
            }
        }
        DerivedStats {
            damage: totals.damage,
            defense: totals.defense,
            speed: totals.speed,
            max_health: self.max_health + totals.health,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health.hp > 0
    }

    pub fn apply_damage(&mut self, amount: i32) {
        self.health.hp = (self.health.hp - amount).max(0);
    }

    /// Heals up to `max_health`, returning the amount actually restored.
    pub fn heal(&mut self, amount: i32, max_health: i32) -> i32 {
        let before = self.health.hp;
        self.health.hp = (self.health.hp + amount).min(max_health).max(before);
        self.health.hp - before
    }

    /// Adds experience and applies any level-ups: each level grants
    /// `LEVEL_UP_HEALTH_BONUS` max health and a full heal.
    pub fn add_experience(&mut self, amount: i32) -> LevelUpResult {
        self.experience.xp += amount.max(0);

        let mut levels_gained = 0;
        while self.experience.xp >= experience_to_next_level(self.level) {
            self.experience.xp -= experience_to_next_level(self.level);
            self.level.level += 1;
            self.max_health += LEVEL_UP_HEALTH_BONUS;
            levels_gained += 1;
        }
        if levels_gained > 0 {
            self.health.hp = self.max_health;
        }

        LevelUpResult { levels_gained }
    }

    /// Key for the per-character one-time pickup sets: `area.room.item`.
    pub fn one_time_key(room: &RoomId, id: &str) -> String {
        format!("{}.{}", room, id)
    }

    pub fn has_taken_room_item(&self, room: &RoomId, item: &ItemId) -> bool {
        self.taken_one_time_items
            .contains(&Self::one_time_key(room, item.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_character() -> Character {
        Character::create(
            "Alice".to_string(),
            PasswordHash::derive("secret"),
            RoomId::from("town.square"),
            None,
        )
    }

    #[test]
    fn test_level_up_carries_remainder() {
        let mut character = test_character();
        let result = character.add_experience(130);
        assert_eq!(result.levels_gained, 1);
        assert_eq!(character.level, Level::new(2));
        assert_eq!(character.experience.xp, 30);
        assert_eq!(character.max_health, STARTING_MAX_HEALTH + LEVEL_UP_HEALTH_BONUS);
        assert_eq!(character.health.hp, character.max_health);
    }

    #[test]
    fn test_multi_level_gain() {
        let mut character = test_character();
        // 100 (1->2) + 200 (2->3) + 40 remainder
        let result = character.add_experience(340);
        assert_eq!(result.levels_gained, 2);
        assert_eq!(character.level, Level::new(3));
        assert_eq!(character.experience.xp, 40);
    }

    #[test]
    fn test_damage_clamps_at_zero() {
        let mut character = test_character();
        character.apply_damage(10_000);
        assert_eq!(character.health.hp, 0);
        assert!(!character.is_alive());
    }

    #[test]
    fn test_character_round_trips_unknown_fields() {
        let mut character = test_character();
        character.extra.insert(
            "future_field".to_string(),
            serde_json::json!({ "nested": true }),
        );

        let json = serde_json::to_string(&character).unwrap();
        let reloaded: Character = serde_json::from_str(&json).unwrap();
        assert_eq!(
            reloaded.extra.get("future_field"),
            Some(&serde_json::json!({ "nested": true }))
        );
    }
}
