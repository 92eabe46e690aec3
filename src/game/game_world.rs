use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError};
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::ServerConfig;
use crate::data::GameData;
use crate::game::messages::{ClientMessage, ControlMessage, OutputCategory, ServerMessage};
use crate::game::resources::{
    CombatList, ConnectionId, PendingMessage, RespawnList, ServerMessages, SessionRegistry,
    SessionState, WorldState, WorldTime,
};
use crate::game::storage::StorageDirs;
use crate::game::systems::{
    combat_system::combat_system, command_system::command_system, game_server,
    passive_recovery_system::passive_recovery_system, respawn_system::respawn_system,
    save_system::save_character,
};

/// How often the loop wakes to poll session inboxes between ticks.
const INBOX_POLL_INTERVAL: Duration = Duration::from_millis(25);

/// The single-owner game state. Everything that mutates lives here, and the
/// one thread running `run` is the only thing that touches it: every
/// handler and system observes a consistent world between inbox messages.
pub struct GameWorld {
    pub data: GameData,
    pub config: ServerConfig,
    pub storage: StorageDirs,
    pub world: WorldState,
    pub sessions: SessionRegistry,
    pub combat: CombatList,
    pub respawns: RespawnList,
    pub messages: ServerMessages,
    pub rng: StdRng,
    pub time: WorldTime,
}

impl GameWorld {
    pub fn new(data: GameData, config: ServerConfig, storage: StorageDirs) -> Self {
        Self::with_rng(data, config, storage, StdRng::from_entropy())
    }

    /// Seeded construction, used by tests to make combat deterministic.
    pub fn with_rng(
        data: GameData,
        config: ServerConfig,
        storage: StorageDirs,
        rng: StdRng,
    ) -> Self {
        let world = WorldState::new(&data);
        Self {
            data,
            config,
            storage,
            world,
            sessions: SessionRegistry::new(),
            combat: CombatList::new(),
            respawns: RespawnList::new(),
            messages: ServerMessages::new(),
            rng,
            time: WorldTime::new(),
        }
    }

    /// The game thread main loop: drain control messages and session
    /// inboxes, advance the clock at the configured interval, fan queued
    /// events out to session outboxes after every unit of work.
    pub fn run(&mut self, control_rx: Receiver<ControlMessage>) {
        let tick_interval = self.config.tick_interval();
        let mut next_tick = Instant::now() + tick_interval;
        info!("game world running, tick interval {:?}", tick_interval);

        loop {
            let timeout = next_tick
                .saturating_duration_since(Instant::now())
                .min(INBOX_POLL_INTERVAL);
            match control_rx.recv_timeout(timeout) {
                Ok(message) => {
                    if self.handle_control_message(message) {
                        break;
                    }
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }

            self.pump_session_inboxes();

            if Instant::now() >= next_tick {
                self.tick();
                next_tick += tick_interval;
            }
        }

        info!("game world stopped");
    }

    /// Returns true when the loop should shut down.
    pub(crate) fn handle_control_message(&mut self, message: ControlMessage) -> bool {
        match message {
            ControlMessage::AddClient {
                client_message_rx,
                server_message_tx,
                response_tx,
            } => {
                let connection_id = self
                    .sessions
                    .add_client(client_message_rx, server_message_tx);
                response_tx.send(connection_id).ok();
                false
            }
            ControlMessage::RemoveClient { connection_id } => {
                let Self {
                    data,
                    config,
                    storage,
                    world,
                    sessions,
                    combat,
                    messages,
                    ..
                } = self;
                game_server::handle_disconnect(
                    data, config, world, combat, sessions, messages, storage, connection_id,
                );
                self.flush_messages();
                false
            }
            ControlMessage::Shutdown { response_tx } => {
                info!("shutdown requested, saving all characters");
                self.save_all();
                response_tx.send(()).ok();
                true
            }
        }
    }

    fn pump_session_inboxes(&mut self) {
        for connection_id in self.sessions.connection_ids() {
            loop {
                let message = match self.sessions.get(connection_id) {
                    Some(session) => match session.client_message_rx.try_recv() {
                        Ok(message) => message,
                        Err(_) => break,
                    },
                    None => break,
                };
                self.handle_client_message(connection_id, message);
            }
        }
    }

    pub(crate) fn handle_client_message(&mut self, connection_id: ConnectionId, message: ClientMessage) {
        let state = self.sessions.get(connection_id).map(|session| session.state);
        let Self {
            data,
            config,
            storage,
            world,
            sessions,
            combat,
            respawns,
            messages,
            rng,
            time,
        } = self;

        match (state, message) {
            (Some(SessionState::Unauthenticated), message) => {
                game_server::handle_unauthenticated_message(
                    data,
                    config,
                    world,
                    combat,
                    sessions,
                    messages,
                    storage,
                    connection_id,
                    message,
                );
            }
            (Some(SessionState::Playing), ClientMessage::Command { line }) => {
                command_system(
                    data,
                    config,
                    world,
                    combat,
                    respawns,
                    sessions,
                    messages,
                    storage,
                    rng,
                    time,
                    connection_id,
                    &line,
                );
            }
            (Some(SessionState::Playing), _) => {
                if let Some(session) = sessions.get(connection_id) {
                    session.send(ServerMessage::Output {
                        category: OutputCategory::Warning,
                        text: "You are already logged in.".to_string(),
                    });
                }
            }
            _ => {}
        }

        self.flush_messages();
    }

    /// One advancement of the game clock: regen every tick, combat rounds
    /// every `combat_ticks`, then due respawns.
    pub fn tick(&mut self) {
        self.time.advance();
        let now = self.time.ticks;

        let Self {
            data,
            config,
            storage,
            world,
            sessions,
            combat,
            respawns,
            messages,
            rng,
            ..
        } = self;

        passive_recovery_system(data, config, sessions, messages);

        if now % config.combat_ticks == 0 {
            combat_system(
                data, config, world, combat, respawns, sessions, messages, storage, rng, now,
            );
        }

        respawn_system(data, world, respawns, messages, now);

        self.flush_messages();
    }

    /// Resolves queued events against current occupancy and pushes them into
    /// session outboxes, preserving per-character emission order.
    pub fn flush_messages(&mut self) {
        for pending in self.messages.drain() {
            match pending {
                PendingMessage::Character { name, message } => {
                    self.sessions.send_to_character(&name, message);
                }
                PendingMessage::Room {
                    room,
                    exclude,
                    message,
                } => {
                    let recipients: Vec<String> = self
                        .world
                        .characters_in_room(&room)
                        .filter(|name| exclude.as_deref() != Some(*name))
                        .map(str::to_string)
                        .collect();
                    for name in recipients {
                        self.sessions.send_to_character(&name, message.clone());
                    }
                }
                PendingMessage::Global { message } => {
                    for session in self.sessions.iter_playing() {
                        session.send(message.clone());
                    }
                }
            }
        }
    }

    fn save_all(&mut self) {
        let connection_ids = self.sessions.connection_ids();
        let Self {
            data,
            config,
            storage,
            sessions,
            ..
        } = self;
        for connection_id in connection_ids {
            if let Some(session) = sessions.get_mut(connection_id) {
                if let Some(character) = session.character.as_mut() {
                    save_character(storage, config, data, character);
                }
            }
        }
    }
}
