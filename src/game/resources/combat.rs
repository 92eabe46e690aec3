use std::collections::BTreeMap;

use crate::data::{EnemyId, RoomId};

use super::world_state::EnemyInstanceId;

/// One shared fight in one room. Both sides mutate as characters join,
/// flee, die, or disconnect and as enemies fall.
#[derive(Debug)]
pub struct CombatSession {
    pub room: RoomId,
    pub players: Vec<String>,
    pub enemies: Vec<EnemyInstanceId>,
    pub round: u32,
    pub started_tick: u64,
}

impl CombatSession {
    pub fn contains_player(&self, name: &str) -> bool {
        self.players.iter().any(|player| player == name)
    }

    pub fn contains_enemy(&self, id: EnemyInstanceId) -> bool {
        self.enemies.contains(&id)
    }

    pub fn remove_player(&mut self, name: &str) {
        self.players.retain(|player| player != name);
    }

    pub fn remove_enemy(&mut self, id: EnemyInstanceId) {
        self.enemies.retain(|enemy| *enemy != id);
    }

    pub fn is_over(&self) -> bool {
        self.players.is_empty() || self.enemies.is_empty()
    }
}

/// At most one combat session per room; characters fighting the same enemy
/// group share it.
#[derive(Default)]
pub struct CombatList {
    sessions: BTreeMap<RoomId, CombatSession>,
}

impl CombatList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self, room: &RoomId) -> Option<&CombatSession> {
        self.sessions.get(room)
    }

    pub fn session_mut(&mut self, room: &RoomId) -> Option<&mut CombatSession> {
        self.sessions.get_mut(room)
    }

    pub fn insert(&mut self, session: CombatSession) {
        self.sessions.insert(session.room.clone(), session);
    }

    pub fn remove(&mut self, room: &RoomId) -> Option<CombatSession> {
        self.sessions.remove(room)
    }

    pub fn room_of_player(&self, name: &str) -> Option<&RoomId> {
        self.sessions
            .values()
            .find(|session| session.contains_player(name))
            .map(|session| &session.room)
    }

    /// Deterministic processing order within a tick.
    pub fn room_ids(&self) -> Vec<RoomId> {
        self.sessions.keys().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[derive(Clone, Debug)]
pub struct PendingRespawn {
    pub room: RoomId,
    pub enemy: EnemyId,
    pub due_tick: u64,
}

/// Defeated enemies come back this way; entries whose template vanished by
/// the time they fire are silently dropped by the respawn system.
#[derive(Default)]
pub struct RespawnList {
    pending: Vec<PendingRespawn>,
}

impl RespawnList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, room: RoomId, enemy: EnemyId, due_tick: u64) {
        self.pending.push(PendingRespawn {
            room,
            enemy,
            due_tick,
        });
    }

    pub fn take_due(&mut self, now: u64) -> Vec<PendingRespawn> {
        let (due, waiting): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pending)
            .into_iter()
            .partition(|respawn| respawn.due_tick <= now);
        self.pending = waiting;
        due
    }

    pub fn pending_for_room(&self, room: &RoomId) -> usize {
        self.pending.iter().filter(|respawn| &respawn.room == room).count()
    }
}
