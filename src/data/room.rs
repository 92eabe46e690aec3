use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::data::ids::{AreaId, EnemyId, ItemId, NpcId, RoomId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    pub fn parse(word: &str) -> Option<Direction> {
        match word {
            "north" | "n" => Some(Direction::North),
            "south" | "s" => Some(Direction::South),
            "east" | "e" => Some(Direction::East),
            "west" | "w" => Some(Direction::West),
            _ => None,
        }
    }

    pub fn offset(&self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::South => (0, 1),
            Direction::East => (1, 0),
            Direction::West => (-1, 0),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::North => "north",
            Direction::South => "south",
            Direction::East => "east",
            Direction::West => "west",
        };
        f.write_str(name)
    }
}

/// Raw shape of a room file before the loader qualifies it with its area.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoomFile {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub exits: BTreeMap<Direction, RoomId>,
    #[serde(default)]
    pub items: Vec<ItemId>,
    #[serde(default)]
    pub npcs: Vec<NpcId>,
    #[serde(default)]
    pub enemies: Vec<EnemyId>,
    #[serde(default)]
    pub coords: Option<(i32, i32)>,
    #[serde(default)]
    pub grid_size: Option<(u32, u32)>,
}

#[derive(Clone, Debug)]
pub struct RoomData {
    pub id: RoomId,
    pub area: AreaId,
    pub name: String,
    pub description: String,
    pub exits: BTreeMap<Direction, RoomId>,
    pub items: Vec<ItemId>,
    pub npcs: Vec<NpcId>,
    pub enemies: Vec<EnemyId>,
    pub coords: Option<(i32, i32)>,
}

impl RoomData {
    pub fn from_file(area: &AreaId, base_name: &str, file: RoomFile) -> Self {
        Self {
            id: RoomId::new(area, base_name),
            area: area.clone(),
            name: file.name,
            description: file.description,
            exits: file.exits,
            items: file.items,
            npcs: file.npcs,
            enemies: file.enemies,
            coords: file.coords,
        }
    }
}

#[derive(Clone, Debug)]
pub struct AreaData {
    pub id: AreaId,
    /// Declared by the first room file in the area that carries one.
    pub grid_size: Option<(u32, u32)>,
    pub rooms: Vec<RoomId>,
}
