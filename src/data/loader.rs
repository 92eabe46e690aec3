use std::collections::HashMap;
use std::path::{Path, PathBuf};

use log::info;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::data::{
    enemy::EnemyData,
    ids::{AreaId, EnemyId, ItemId, NpcId, QuestId, RoomId},
    item::ItemData,
    npc::NpcData,
    quest::{ObjectiveKind, QuestData},
    room::{AreaData, RoomData, RoomFile},
    GameData,
};

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("{kind} {id}: parse error in {path}: {message}")]
    Parse {
        kind: &'static str,
        id: String,
        path: String,
        message: String,
    },

    #[error("duplicate {kind} id {id} from {path}")]
    DuplicateId {
        kind: &'static str,
        id: String,
        path: String,
    },

    #[error("{owner} references unknown {kind} {id}")]
    UnresolvedReference {
        owner: String,
        kind: &'static str,
        id: String,
    },

    #[error("enemy {enemy}: attack {index} has a malformed damage range")]
    InvalidDamageRange { enemy: String, index: usize },

    #[error("enemy {enemy}: gold reward has a malformed range")]
    InvalidGoldRange { enemy: String },

    #[error("enemy {enemy}: loot entry {index} has chance {chance} outside 0-100")]
    InvalidLootChance {
        enemy: String,
        index: usize,
        chance: f32,
    },

    #[error("enemy {enemy}: loot entry {index} has a malformed quantity range")]
    InvalidLootQuantity { enemy: String, index: usize },

    #[error("enemy {enemy}: attack {index} has accuracy {accuracy} outside 0-100")]
    InvalidAccuracy {
        enemy: String,
        index: usize,
        accuracy: i32,
    },

    #[error("room {room}: exit {direction} references unknown room {target}")]
    UnknownExit {
        room: String,
        direction: String,
        target: String,
    },

    #[error("room {room}: exit {direction} target {target} is not of the form area.room")]
    UnqualifiedExit {
        room: String,
        direction: String,
        target: String,
    },

    #[error("quest {quest}: objective {index} has quantity 0")]
    ZeroQuantityObjective { quest: String, index: usize },
}

fn format_report(errors: &[ContentError]) -> String {
    errors
        .iter()
        .map(|error| format!("  - {}", error))
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Error)]
pub enum ContentLoadError {
    #[error("missing content directory {0}")]
    MissingDirectory(PathBuf),

    #[error("failed reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("content load failed with {} error(s):\n{}", .0.len(), format_report(.0))]
    Invalid(Vec<ContentError>),
}

fn list_json_files(dir: &Path) -> Result<Vec<(String, PathBuf)>, ContentLoadError> {
    let mut files = Vec::new();
    let entries = std::fs::read_dir(dir).map_err(|source| ContentLoadError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    for entry in entries {
        let entry = entry.map_err(|source| ContentLoadError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.extension().map_or(false, |ext| ext == "json") {
            if let Some(base) = path.file_stem().and_then(|stem| stem.to_str()) {
                files.push((base.to_string(), path));
            }
        }
    }

    // Deterministic load order regardless of directory iteration order.
    files.sort();
    Ok(files)
}

fn list_subdirectories(dir: &Path) -> Result<Vec<(String, PathBuf)>, ContentLoadError> {
    let mut dirs = Vec::new();
    let entries = std::fs::read_dir(dir).map_err(|source| ContentLoadError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    for entry in entries {
        let entry = entry.map_err(|source| ContentLoadError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.is_dir() {
            if let Some(name) = path.file_name().and_then(|name| name.to_str()) {
                dirs.push((name.to_string(), path));
            }
        }
    }

    dirs.sort();
    Ok(dirs)
}

fn parse_file<T: DeserializeOwned>(
    kind: &'static str,
    id: &str,
    path: &Path,
    errors: &mut Vec<ContentError>,
) -> Result<Option<T>, ContentLoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| ContentLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    match serde_json::from_str(&text) {
        Ok(value) => Ok(Some(value)),
        Err(error) => {
            errors.push(ContentError::Parse {
                kind,
                id: id.to_string(),
                path: path.display().to_string(),
                message: error.to_string(),
            });
            Ok(None)
        }
    }
}

/// Walk the content directory tree once and build the immutable template
/// store. Collects every error before failing so a single report names all
/// broken content.
pub fn load_game_data(content_dir: &Path) -> Result<GameData, ContentLoadError> {
    let mut errors = Vec::new();

    for required in ["items", "npcs", "quests", "enemies", "areas"] {
        let dir = content_dir.join(required);
        if !dir.is_dir() {
            return Err(ContentLoadError::MissingDirectory(dir));
        }
    }

    let mut items: HashMap<ItemId, ItemData> = HashMap::new();
    for (base, path) in list_json_files(&content_dir.join("items"))? {
        if let Some(mut item) = parse_file::<ItemData>("item", &base, &path, &mut errors)? {
            item.id = ItemId::new(&base);
            if items.insert(item.id.clone(), item).is_some() {
                errors.push(ContentError::DuplicateId {
                    kind: "item",
                    id: base,
                    path: path.display().to_string(),
                });
            }
        }
    }

    let mut npcs: HashMap<NpcId, NpcData> = HashMap::new();
    for (base, path) in list_json_files(&content_dir.join("npcs"))? {
        if let Some(mut npc) = parse_file::<NpcData>("npc", &base, &path, &mut errors)? {
            npc.id = NpcId::new(&base);
            if npcs.insert(npc.id.clone(), npc).is_some() {
                errors.push(ContentError::DuplicateId {
                    kind: "npc",
                    id: base,
                    path: path.display().to_string(),
                });
            }
        }
    }

    let mut enemies: HashMap<EnemyId, EnemyData> = HashMap::new();
    for (base, path) in list_json_files(&content_dir.join("enemies"))? {
        if let Some(mut enemy) = parse_file::<EnemyData>("enemy", &base, &path, &mut errors)? {
            enemy.id = EnemyId::new(&base);
            if enemies.insert(enemy.id.clone(), enemy).is_some() {
                errors.push(ContentError::DuplicateId {
                    kind: "enemy",
                    id: base,
                    path: path.display().to_string(),
                });
            }
        }
    }

    let mut quests: HashMap<QuestId, QuestData> = HashMap::new();
    for (base, path) in list_json_files(&content_dir.join("quests"))? {
        if let Some(mut quest) = parse_file::<QuestData>("quest", &base, &path, &mut errors)? {
            quest.id = QuestId::new(&base);
            if quests.insert(quest.id.clone(), quest).is_some() {
                errors.push(ContentError::DuplicateId {
                    kind: "quest",
                    id: base,
                    path: path.display().to_string(),
                });
            }
        }
    }

    let mut rooms: HashMap<RoomId, RoomData> = HashMap::new();
    let mut areas: HashMap<AreaId, AreaData> = HashMap::new();
    for (area_name, area_path) in list_subdirectories(&content_dir.join("areas"))? {
        let area_id = AreaId::new(&area_name);
        let mut area = AreaData {
            id: area_id.clone(),
            grid_size: None,
            rooms: Vec::new(),
        };

        for (base, path) in list_json_files(&area_path)? {
            if let Some(file) = parse_file::<RoomFile>("room", &base, &path, &mut errors)? {
                // First file in the area that declares a grid size wins.
                if area.grid_size.is_none() {
                    area.grid_size = file.grid_size;
                }
                let room = RoomData::from_file(&area_id, &base, file);
                if rooms.contains_key(&room.id) {
                    errors.push(ContentError::DuplicateId {
                        kind: "room",
                        id: room.id.to_string(),
                        path: path.display().to_string(),
                    });
                } else {
                    area.rooms.push(room.id.clone());
                    rooms.insert(room.id.clone(), room);
                }
            }
        }

        areas.insert(area_id, area);
    }

    verify_enemies(&enemies, &items, &mut errors);
    verify_npcs(&npcs, &quests, &mut errors);
    verify_quests(&quests, &items, &npcs, &enemies, &rooms, &mut errors);
    verify_rooms(&rooms, &items, &npcs, &enemies, &mut errors);

    if !errors.is_empty() {
        return Err(ContentLoadError::Invalid(errors));
    }

    info!(
        "Loaded content: {} items, {} npcs, {} enemies, {} quests, {} rooms in {} areas",
        items.len(),
        npcs.len(),
        enemies.len(),
        quests.len(),
        rooms.len(),
        areas.len()
    );

    Ok(GameData {
        items,
        npcs,
        enemies,
        quests,
        rooms,
        areas,
    })
}

fn verify_enemies(
    enemies: &HashMap<EnemyId, EnemyData>,
    items: &HashMap<ItemId, ItemData>,
    errors: &mut Vec<ContentError>,
) {
    for enemy in enemies.values() {
        for (index, attack) in enemy.attacks.iter().enumerate() {
            if !attack.damage.is_valid() {
                errors.push(ContentError::InvalidDamageRange {
                    enemy: enemy.id.to_string(),
                    index,
                });
            }
            if !(0..=100).contains(&attack.accuracy) {
                errors.push(ContentError::InvalidAccuracy {
                    enemy: enemy.id.to_string(),
                    index,
                    accuracy: attack.accuracy,
                });
            }
        }

        if !enemy.gold.is_valid() {
            errors.push(ContentError::InvalidGoldRange {
                enemy: enemy.id.to_string(),
            });
        }

        for (index, entry) in enemy.loot.iter().enumerate() {
            if !items.contains_key(&entry.item) {
                errors.push(ContentError::UnresolvedReference {
                    owner: format!("enemy {}", enemy.id),
                    kind: "item",
                    id: entry.item.to_string(),
                });
            }
            if !(0.0..=100.0).contains(&entry.chance) {
                errors.push(ContentError::InvalidLootChance {
                    enemy: enemy.id.to_string(),
                    index,
                    chance: entry.chance,
                });
            }
            if !entry.quantity.is_valid() || entry.quantity.min() == 0 {
                errors.push(ContentError::InvalidLootQuantity {
                    enemy: enemy.id.to_string(),
                    index,
                });
            }
        }
    }
}

fn verify_npcs(
    npcs: &HashMap<NpcId, NpcData>,
    quests: &HashMap<QuestId, QuestData>,
    errors: &mut Vec<ContentError>,
) {
    for npc in npcs.values() {
        for quest_id in &npc.quests {
            if !quests.contains_key(quest_id) {
                errors.push(ContentError::UnresolvedReference {
                    owner: format!("npc {}", npc.id),
                    kind: "quest",
                    id: quest_id.to_string(),
                });
            }
        }
    }
}

fn verify_quests(
    quests: &HashMap<QuestId, QuestData>,
    items: &HashMap<ItemId, ItemData>,
    npcs: &HashMap<NpcId, NpcData>,
    enemies: &HashMap<EnemyId, EnemyData>,
    rooms: &HashMap<RoomId, RoomData>,
    errors: &mut Vec<ContentError>,
) {
    for quest in quests.values() {
        let owner = format!("quest {}", quest.id);

        if !npcs.contains_key(&quest.giver) {
            errors.push(ContentError::UnresolvedReference {
                owner: owner.clone(),
                kind: "npc",
                id: quest.giver.to_string(),
            });
        }
        if let Some(turn_in) = &quest.turn_in_npc {
            if !npcs.contains_key(turn_in) {
                errors.push(ContentError::UnresolvedReference {
                    owner: owner.clone(),
                    kind: "npc",
                    id: turn_in.to_string(),
                });
            }
        }

        for (index, objective) in quest.objectives.iter().enumerate() {
            if objective.quantity == 0 {
                errors.push(ContentError::ZeroQuantityObjective {
                    quest: quest.id.to_string(),
                    index,
                });
            }

            let resolved = match objective.kind {
                ObjectiveKind::Kill => enemies.contains_key(&EnemyId::new(&objective.target)),
                ObjectiveKind::Collect => items.contains_key(&ItemId::new(&objective.target)),
                ObjectiveKind::Visit => rooms.contains_key(&RoomId::from(objective.target.as_str())),
                ObjectiveKind::Deliver => npcs.contains_key(&NpcId::new(&objective.target)),
            };
            if !resolved {
                let kind = match objective.kind {
                    ObjectiveKind::Kill => "enemy",
                    ObjectiveKind::Collect => "item",
                    ObjectiveKind::Visit => "room",
                    ObjectiveKind::Deliver => "npc",
                };
                errors.push(ContentError::UnresolvedReference {
                    owner: owner.clone(),
                    kind,
                    id: objective.target.clone(),
                });
            }
        }

        for item_id in quest
            .rewards
            .items
            .iter()
            .chain(quest.prerequisites.items.iter())
        {
            if !items.contains_key(item_id) {
                errors.push(ContentError::UnresolvedReference {
                    owner: owner.clone(),
                    kind: "item",
                    id: item_id.to_string(),
                });
            }
        }

        for quest_id in &quest.prerequisites.quests {
            if !quests.contains_key(quest_id) {
                errors.push(ContentError::UnresolvedReference {
                    owner: owner.clone(),
                    kind: "quest",
                    id: quest_id.to_string(),
                });
            }
        }
    }
}

fn verify_rooms(
    rooms: &HashMap<RoomId, RoomData>,
    items: &HashMap<ItemId, ItemData>,
    npcs: &HashMap<NpcId, NpcData>,
    enemies: &HashMap<EnemyId, EnemyData>,
    errors: &mut Vec<ContentError>,
) {
    for room in rooms.values() {
        let owner = format!("room {}", room.id);

        for (direction, target) in &room.exits {
            if !target.is_qualified() {
                errors.push(ContentError::UnqualifiedExit {
                    room: room.id.to_string(),
                    direction: direction.to_string(),
                    target: target.to_string(),
                });
            } else if !rooms.contains_key(target) {
                errors.push(ContentError::UnknownExit {
                    room: room.id.to_string(),
                    direction: direction.to_string(),
                    target: target.to_string(),
                });
            }
        }

        for item_id in &room.items {
            if !items.contains_key(item_id) {
                errors.push(ContentError::UnresolvedReference {
                    owner: owner.clone(),
                    kind: "item",
                    id: item_id.to_string(),
                });
            }
        }
        for npc_id in &room.npcs {
            if !npcs.contains_key(npc_id) {
                errors.push(ContentError::UnresolvedReference {
                    owner: owner.clone(),
                    kind: "npc",
                    id: npc_id.to_string(),
                });
            }
        }
        for enemy_id in &room.enemies {
            if !enemies.contains_key(enemy_id) {
                errors.push(ContentError::UnresolvedReference {
                    owner: owner.clone(),
                    kind: "enemy",
                    id: enemy_id.to_string(),
                });
            }
        }
    }
}
