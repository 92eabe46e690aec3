use rand::prelude::SliceRandom;
use rand::rngs::StdRng;
use rand::Rng;

use crate::config::ServerConfig;
use crate::data::{EnemyData, GameData, ObjectiveKind, RoomId};
use crate::game::commands::emit_quest_progress;
use crate::game::components::Character;
use crate::game::messages::OutputCategory;
use crate::game::resources::{
    CombatList, CombatSession, EnemyInstanceId, RespawnList, ServerMessages, SessionRegistry,
    WorldState,
};
use crate::game::storage::StorageDirs;

use super::save_system::save_character;

/// Why a character left a combat session; controls the notice the rest of
/// the session sees.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LeaveReason {
    Death,
    Flee,
    Disconnect,
}

/// Uniform ±variance multiplier, rounded, as used by every strike.
pub fn vary_round(value: i32, variance: f32, rng: &mut StdRng) -> i32 {
    if variance <= 0.0 {
        return value;
    }
    let factor = 1.0 + rng.gen_range(-variance..=variance);
    ((value as f32) * factor).round() as i32
}

/// Threat-weighted target selection: probability proportional to the threat
/// each player has built on this enemy, uniform when nobody has any.
fn pick_threat_target(
    threat_of: impl Fn(&str) -> i32,
    players: &[String],
    rng: &mut StdRng,
) -> Option<String> {
    if players.is_empty() {
        return None;
    }
    let weights: Vec<i64> = players.iter().map(|player| threat_of(player) as i64).collect();
    let total: i64 = weights.iter().sum();
    if total <= 0 {
        return players.choose(rng).cloned();
    }
    let mut roll = rng.gen_range(0..total);
    for (player, weight) in players.iter().zip(weights) {
        roll -= weight;
        if roll < 0 {
            return Some(player.clone());
        }
    }
    players.last().cloned()
}

/// One enemy attack against a character: attack choice, accuracy roll,
/// variance, defense reduction with a floor of 1.
fn strike_character(
    data: &GameData,
    config: &ServerConfig,
    messages: &mut ServerMessages,
    rng: &mut StdRng,
    room: &RoomId,
    enemy_name: &str,
    template: &EnemyData,
    character: &mut Character,
) {
    let Some(attack) = template.attacks.choose(rng) else {
        return;
    };
    if attack.accuracy < 100 && rng.gen_range(0..100) >= attack.accuracy {
        messages.room_output(
            room,
            None,
            OutputCategory::Combat,
            format!("The {} lunges at {} and misses.", enemy_name, character.name),
        );
        return;
    }

    let defense = character.derived_stats(data).defense;
    let raw = vary_round(attack.damage.roll(rng), config.damage_variance, rng);
    let damage = (raw - defense).max(1);
    character.apply_damage(damage);
    messages.room_output(
        room,
        None,
        OutputCategory::Combat,
        format!(
            "The {} hits {} for {} damage.",
            enemy_name, character.name, damage
        ),
    );
}

/// Ends a session: everyone still in it gets `in_combat` cleared and a
/// notice. Surviving enemy instances stay in the room.
pub fn finish_session(
    combat: &mut CombatList,
    sessions: &mut SessionRegistry,
    messages: &mut ServerMessages,
    room: &RoomId,
) {
    let Some(session) = combat.remove(room) else {
        return;
    };
    for player in &session.players {
        if let Some(character) = sessions.character_mut(player) {
            character.in_combat = false;
        }
        messages.character_output(
            player,
            OutputCategory::Success,
            "The fight is over. You catch your breath.",
        );
    }
}

/// Removes a character from whatever session they are in, erasing their
/// threat on every enemy of that session, then runs the session-end check.
pub fn remove_player_from_combat(
    world: &mut WorldState,
    combat: &mut CombatList,
    sessions: &mut SessionRegistry,
    messages: &mut ServerMessages,
    name: &str,
    reason: LeaveReason,
) {
    let Some(room_id) = combat.room_of_player(name).cloned() else {
        return;
    };
    let Some(session) = combat.session_mut(&room_id) else {
        return;
    };
    session.remove_player(name);
    let enemy_ids = session.enemies.clone();

    if let Some(room) = world.room_mut(&room_id) {
        for enemy_id in enemy_ids {
            if let Some(enemy) = room.enemies.iter_mut().find(|enemy| enemy.id == enemy_id) {
                enemy.clear_threat(name);
            }
        }
    }

    if reason == LeaveReason::Disconnect {
        messages.room_output(
            &room_id,
            Some(name),
            OutputCategory::Combat,
            format!("{} vanishes from the fight.", name),
        );
    }

    if combat.session(&room_id).map_or(false, CombatSession::is_over) {
        finish_session(combat, sessions, messages, &room_id);
    }
}

/// Death bookkeeping on the character itself: full heal, teleport to the
/// homestone (or the configured default respawn), combat flag cleared.
/// The caller has already removed the character from their session.
pub fn resolve_death(
    data: &GameData,
    config: &ServerConfig,
    world: &mut WorldState,
    messages: &mut ServerMessages,
    character: &mut Character,
) {
    let from = character.position.room.clone();
    messages.room_output(
        &from,
        Some(&character.name),
        OutputCategory::Combat,
        format!("{} falls!", character.name),
    );

    character.in_combat = false;

    let dest = character
        .homestone
        .clone()
        .filter(|room| data.get_room(room).is_some())
        .unwrap_or_else(|| config.default_respawn_room.clone());

    world.move_character(&from, &dest, &character.name);
    character.position.room = dest.clone();
    if let Some(room) = data.get_room(&dest) {
        if let Some(coords) = room.coords {
            character.position.coords = coords;
        }
    }

    let max_health = character.derived_stats(data).max_health;
    character.health.hp = max_health;

    let dest_name = data
        .get_room(&dest)
        .map_or(dest.as_str(), |room| room.name.as_str());
    messages.character_output(
        &character.name,
        OutputCategory::Warning,
        format!("Darkness takes you... you awaken at {}.", dest_name),
    );
    messages.room_output(
        &dest,
        Some(&character.name),
        OutputCategory::Normal,
        format!("{} appears, looking shaken.", character.name),
    );
}

/// The free strike an enemy earns when a flee attempt fails.
pub fn flee_free_strike(
    data: &GameData,
    config: &ServerConfig,
    world: &mut WorldState,
    combat: &CombatList,
    messages: &mut ServerMessages,
    rng: &mut StdRng,
    character: &mut Character,
) {
    let Some(room_id) = combat.room_of_player(&character.name).cloned() else {
        return;
    };
    let Some(session) = combat.session(&room_id) else {
        return;
    };

    let template_id = session.enemies.iter().find_map(|enemy_id| {
        world
            .room(&room_id)
            .and_then(|room| room.live_enemy(*enemy_id))
            .map(|enemy| enemy.template.clone())
    });
    let Some(template_id) = template_id else {
        return;
    };
    let Some(template) = data.get_enemy(&template_id) else {
        return;
    };

    let enemy_name = template.name.clone();
    strike_character(
        data, config, messages, rng, &room_id, &enemy_name, template, character,
    );
}

/// Enemy defeat: removal from room and session, base rewards and quest
/// progress for every participant, per-entry loot rolls to one random
/// participant, respawn scheduling. Every participant is saved.
fn handle_enemy_defeat(
    data: &GameData,
    config: &ServerConfig,
    world: &mut WorldState,
    combat: &mut CombatList,
    respawns: &mut RespawnList,
    sessions: &mut SessionRegistry,
    messages: &mut ServerMessages,
    storage: &StorageDirs,
    rng: &mut StdRng,
    room_id: &RoomId,
    enemy_id: EnemyInstanceId,
    now: u64,
) {
    let Some(instance) = world.remove_enemy(room_id, enemy_id) else {
        return;
    };
    if let Some(session) = combat.session_mut(room_id) {
        session.remove_enemy(enemy_id);
    }

    let Some(template) = data.get_enemy(&instance.template) else {
        return;
    };
    let participants: Vec<String> = combat
        .session(room_id)
        .map(|session| session.players.clone())
        .unwrap_or_default();

    messages.room_output(
        room_id,
        None,
        OutputCategory::Combat,
        format!("The {} is defeated!", template.name),
    );

    for player in &participants {
        let gold = template.gold.roll(rng).max(0) as u32;
        let mut level_ups = 0;
        if let Some(character) = sessions.character_mut(player) {
            character.gold = character.gold.saturating_add(gold);
            level_ups = character.add_experience(template.experience).levels_gained;
            character
                .defeated_one_time_enemies
                .insert(Character::one_time_key(room_id, template.id.as_str()));
        }

        messages.character_output(
            player,
            OutputCategory::Success,
            format!(
                "You gain {} experience and {} gold.",
                template.experience, gold
            ),
        );

        let updates = sessions
            .character_mut(player)
            .map(|character| {
                character.quest_log.record_progress(
                    data,
                    ObjectiveKind::Kill,
                    template.id.as_str(),
                    1,
                )
            })
            .unwrap_or_default();
        emit_quest_progress(messages, data, player, &updates);

        if level_ups > 0 {
            if let Some(character) = sessions.character(player) {
                messages.character_output(
                    player,
                    OutputCategory::Success,
                    format!("You are now level {}!", character.level.level),
                );
            }
        }
    }

    // One Bernoulli trial per loot entry per kill; a single random
    // participant receives the drop.
    for entry in &template.loot {
        if participants.is_empty() {
            break;
        }
        if rng.gen_range(0.0..100.0) >= entry.chance {
            continue;
        }
        let Some(receiver) = participants.choose(rng).cloned() else {
            continue;
        };
        let quantity = entry.quantity.roll(rng).max(1) as u32;
        let stackable = data
            .get_item(&entry.item)
            .map_or(true, |item| item.stackable);
        let item_name = data.item_name(&entry.item).to_string();

        let added = sessions
            .character_mut(&receiver)
            .map(|character| {
                character
                    .inventory
                    .try_add(&entry.item, quantity, stackable, config.inventory_capacity)
                    .is_ok()
            })
            .unwrap_or(false);

        if added {
            messages.character_output(
                &receiver,
                OutputCategory::Loot,
                format!("You receive {} x{}.", item_name, quantity),
            );
        } else {
            // No room: the drop lands on the floor instead.
            world.drop_item(room_id, &entry.item, quantity);
            messages.character_output(
                &receiver,
                OutputCategory::Loot,
                format!(
                    "A {} drops, but your hands are full; it falls to the ground.",
                    item_name
                ),
            );
        }
    }

    for player in &participants {
        if let Some(character) = sessions.character_mut(player) {
            save_character(storage, config, data, character);
        }
    }

    respawns.schedule(
        room_id.clone(),
        instance.template.clone(),
        now + config.enemy_respawn_ticks,
    );
}


/// One combat round for every session: phase P1 (all player strikes, in
/// join order) then phase P2 (all surviving enemy strikes), then the end
/// check. Sessions are processed in room order, so a tick is deterministic
/// for a given RNG state.
pub fn combat_system(
    data: &GameData,
    config: &ServerConfig,
    world: &mut WorldState,
    combat: &mut CombatList,
    respawns: &mut RespawnList,
    sessions: &mut SessionRegistry,
    messages: &mut ServerMessages,
    storage: &StorageDirs,
    rng: &mut StdRng,
    now: u64,
) {
    for room_id in combat.room_ids() {
        // Phase P1: player strikes.
        let players: Vec<String> = combat
            .session(&room_id)
            .map(|session| session.players.clone())
            .unwrap_or_default();

        for player in &players {
            let Some(session) = combat.session(&room_id) else {
                break;
            };
            if !session.contains_player(player) {
                continue;
            }

            let live_ids: Vec<EnemyInstanceId> = session
                .enemies
                .iter()
                .filter(|enemy_id| {
                    world
                        .room(&room_id)
                        .and_then(|room| room.live_enemy(**enemy_id))
                        .is_some()
                })
                .copied()
                .collect();
            let Some(&target_id) = live_ids.choose(rng) else {
                break;
            };

            let Some(damage_stat) = sessions
                .character(player)
                .map(|character| character.derived_stats(data).damage)
            else {
                continue;
            };
            let damage = vary_round(damage_stat, config.damage_variance, rng).max(1);

            let mut defeated = false;
            if let Some(room) = world.room_mut(&room_id) {
                if let Some(enemy) = room.live_enemy_mut(target_id) {
                    enemy.current_health -= damage;
                    enemy.add_threat(player, damage);
                    defeated = !enemy.is_alive();
                    let enemy_name = data.enemy_name(&enemy.template).to_string();
                    messages.room_output(
                        &room_id,
                        None,
                        OutputCategory::Combat,
                        format!("{} hits the {} for {} damage.", player, enemy_name, damage),
                    );
                }
            }

            if defeated {
                handle_enemy_defeat(
                    data, config, world, combat, respawns, sessions, messages, storage, rng,
                    &room_id, target_id, now,
                );
            }
        }

        // Phase P2: enemy strikes.
        let enemy_ids: Vec<EnemyInstanceId> = combat
            .session(&room_id)
            .map(|session| session.enemies.clone())
            .unwrap_or_default();

        for enemy_id in enemy_ids {
            let Some(session) = combat.session(&room_id) else {
                break;
            };
            if !session.contains_enemy(enemy_id) {
                continue;
            }
            let players = session.players.clone();
            if players.is_empty() {
                break;
            }

            let Some((template_id, enemy_name, target)) =
                world.room(&room_id).and_then(|room| {
                    let enemy = room.live_enemy(enemy_id)?;
                    let target = pick_threat_target(
                        |player| enemy.threat.get(player).copied().unwrap_or(0),
                        &players,
                        rng,
                    )?;
                    Some((
                        enemy.template.clone(),
                        data.enemy_name(&enemy.template).to_string(),
                        target,
                    ))
                })
            else {
                continue;
            };
            let Some(template) = data.get_enemy(&template_id) else {
                continue;
            };

            let died = {
                let Some(character) = sessions.character_mut(&target) else {
                    continue;
                };
                strike_character(
                    data, config, messages, rng, &room_id, &enemy_name, template, character,
                );
                !character.is_alive()
            };

            if died {
                remove_player_from_combat(
                    world,
                    combat,
                    sessions,
                    messages,
                    &target,
                    LeaveReason::Death,
                );
                if let Some(character) = sessions.character_mut(&target) {
                    resolve_death(data, config, world, messages, character);
                }
                if let Some(character) = sessions.character_mut(&target) {
                    save_character(storage, config, data, character);
                }
            }
        }

        // End-of-round check.
        if combat.session(&room_id).map_or(false, CombatSession::is_over) {
            finish_session(combat, sessions, messages, &room_id);
        } else if let Some(session) = combat.session_mut(&room_id) {
            session.round += 1;
        }
    }
}
