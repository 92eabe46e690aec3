use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::data::{EnemyId, GameData, ItemId, RoomId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EnemyInstanceId(pub u64);

/// A live enemy in a room. Holds its own copy of the combat-relevant
/// template values so the instance stays coherent for its whole life.
#[derive(Clone, Debug)]
pub struct EnemyInstance {
    pub id: EnemyInstanceId,
    pub template: EnemyId,
    pub current_health: i32,
    /// Cumulative damage dealt per character; drives target selection.
    pub threat: BTreeMap<String, i32>,
}

impl EnemyInstance {
    pub fn is_alive(&self) -> bool {
        self.current_health > 0
    }

    pub fn add_threat(&mut self, character: &str, damage: i32) {
        *self.threat.entry(character.to_string()).or_insert(0) += damage;
    }

    pub fn clear_threat(&mut self, character: &str) {
        self.threat.remove(character);
    }

    pub fn total_threat(&self) -> i32 {
        self.threat.values().sum()
    }
}

/// Mutable per-room live state. Floor items are shared (player drops);
/// template items are per-character one-time pickups tracked on the
/// character record.
#[derive(Debug, Default)]
pub struct LiveRoom {
    pub floor_items: Vec<(ItemId, u32)>,
    pub enemies: Vec<EnemyInstance>,
    pub characters: BTreeSet<String>,
}

impl LiveRoom {
    pub fn live_enemy(&self, id: EnemyInstanceId) -> Option<&EnemyInstance> {
        self.enemies
            .iter()
            .find(|enemy| enemy.id == id && enemy.is_alive())
    }

    pub fn live_enemy_mut(&mut self, id: EnemyInstanceId) -> Option<&mut EnemyInstance> {
        self.enemies
            .iter_mut()
            .find(|enemy| enemy.id == id && enemy.is_alive())
    }
}

pub struct WorldState {
    rooms: HashMap<RoomId, LiveRoom>,
    next_instance_id: u64,
}

impl WorldState {
    /// Builds live state for every loaded room and populates the initial
    /// enemy instances from the room templates.
    pub fn new(data: &GameData) -> Self {
        let mut world = Self {
            rooms: data
                .rooms
                .keys()
                .map(|id| (id.clone(), LiveRoom::default()))
                .collect(),
            next_instance_id: 0,
        };

        let mut spawn_list: Vec<(RoomId, EnemyId)> = Vec::new();
        for room in data.rooms.values() {
            for enemy_id in &room.enemies {
                spawn_list.push((room.id.clone(), enemy_id.clone()));
            }
        }
        spawn_list.sort();
        for (room_id, enemy_id) in spawn_list {
            world.spawn_enemy(data, &room_id, &enemy_id);
        }

        world
    }

    pub fn room(&self, id: &RoomId) -> Option<&LiveRoom> {
        self.rooms.get(id)
    }

    pub fn room_mut(&mut self, id: &RoomId) -> Option<&mut LiveRoom> {
        self.rooms.get_mut(id)
    }

    /// Mints a fresh full-health instance with an empty threat table.
    pub fn spawn_enemy(
        &mut self,
        data: &GameData,
        room_id: &RoomId,
        enemy_id: &EnemyId,
    ) -> Option<EnemyInstanceId> {
        let template = data.get_enemy(enemy_id)?;
        let room = self.rooms.get_mut(room_id)?;

        self.next_instance_id += 1;
        let id = EnemyInstanceId(self.next_instance_id);
        room.enemies.push(EnemyInstance {
            id,
            template: enemy_id.clone(),
            current_health: template.max_health,
            threat: BTreeMap::new(),
        });
        Some(id)
    }

    pub fn remove_enemy(&mut self, room_id: &RoomId, id: EnemyInstanceId) -> Option<EnemyInstance> {
        let room = self.rooms.get_mut(room_id)?;
        let index = room.enemies.iter().position(|enemy| enemy.id == id)?;
        Some(room.enemies.remove(index))
    }

    pub fn add_character(&mut self, room_id: &RoomId, name: &str) {
        if let Some(room) = self.rooms.get_mut(room_id) {
            room.characters.insert(name.to_string());
        }
    }

    pub fn remove_character(&mut self, room_id: &RoomId, name: &str) {
        if let Some(room) = self.rooms.get_mut(room_id) {
            room.characters.remove(name);
        }
    }

    pub fn move_character(&mut self, from: &RoomId, to: &RoomId, name: &str) {
        self.remove_character(from, name);
        self.add_character(to, name);
    }

    pub fn characters_in_room(&self, room_id: &RoomId) -> impl Iterator<Item = &str> {
        self.rooms
            .get(room_id)
            .into_iter()
            .flat_map(|room| room.characters.iter())
            .map(String::as_str)
    }

    pub fn drop_item(&mut self, room_id: &RoomId, item: &ItemId, quantity: u32) {
        let Some(room) = self.rooms.get_mut(room_id) else {
            return;
        };
        if let Some(entry) = room.floor_items.iter_mut().find(|(id, _)| id == item) {
            entry.1 += quantity;
        } else {
            room.floor_items.push((item.clone(), quantity));
        }
    }

    /// Takes up to `quantity` of a dropped item, returning how many were
    /// actually on the floor.
    pub fn take_floor_item(&mut self, room_id: &RoomId, item: &ItemId, quantity: u32) -> u32 {
        let Some(room) = self.rooms.get_mut(room_id) else {
            return 0;
        };
        let Some(entry) = room.floor_items.iter_mut().find(|(id, _)| id == item) else {
            return 0;
        };
        let taken = entry.1.min(quantity);
        entry.1 -= taken;
        room.floor_items.retain(|(_, quantity)| *quantity > 0);
        taken
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_floor_items_stack_and_deplete() {
        let data = crate::game::tests::fixtures::small_world();
        let mut world = WorldState::new(&data);
        let room = RoomId::from("forest.glade");
        let thyme = ItemId::new("thyme");

        world.drop_item(&room, &thyme, 2);
        world.drop_item(&room, &thyme, 1);
        assert_eq!(world.room(&room).unwrap().floor_items, vec![(thyme.clone(), 3)]);

        assert_eq!(world.take_floor_item(&room, &thyme, 5), 3);
        assert!(world.room(&room).unwrap().floor_items.is_empty());
    }

    #[test]
    fn test_initial_enemies_spawned_from_templates() {
        let data = crate::game::tests::fixtures::small_world();
        let world = WorldState::new(&data);
        let glade = world.room(&RoomId::from("forest.glade")).unwrap();
        assert_eq!(glade.enemies.len(), 1);
        assert_eq!(glade.enemies[0].template, EnemyId::new("wolf"));
        assert!(glade.enemies[0].threat.is_empty());
    }
}
