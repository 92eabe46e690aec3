use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crossbeam_channel::Receiver;
use tokio::sync::mpsc::UnboundedSender;

use crate::game::commands::context::CommandContext;
use crate::game::components::Character;
use crate::game::messages::{ClientMessage, ServerMessage};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConnectionId(pub u32);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Playing,
    Disconnecting,
}

/// A live connection. While `Playing` it owns the character record; the
/// single-threaded game loop is what makes that ownership safe to hand out
/// one mutable borrow at a time.
pub struct Session {
    pub connection_id: ConnectionId,
    pub state: SessionState,
    pub client_message_rx: Receiver<ClientMessage>,
    pub server_message_tx: UnboundedSender<ServerMessage>,
    pub character: Option<Character>,
    /// Whoever last whispered to this character, for `reply`.
    pub reply_to: Option<String>,
    pub context: CommandContext,
}

impl Session {
    /// Send failures mean the client task already went away; the disconnect
    /// control message is on its way, so they are ignored here.
    pub fn send(&self, message: ServerMessage) {
        self.server_message_tx.send(message).ok();
    }

    pub fn character_name(&self) -> Option<&str> {
        self.character.as_ref().map(|character| character.name.as_str())
    }

    pub fn is_playing(&self) -> bool {
        self.state == SessionState::Playing
    }
}

#[derive(Default)]
pub struct SessionRegistry {
    sessions: BTreeMap<ConnectionId, Session>,
    by_character: HashMap<String, ConnectionId>,
    next_connection_id: u32,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_client(
        &mut self,
        client_message_rx: Receiver<ClientMessage>,
        server_message_tx: UnboundedSender<ServerMessage>,
    ) -> ConnectionId {
        self.next_connection_id += 1;
        let connection_id = ConnectionId(self.next_connection_id);
        self.sessions.insert(
            connection_id,
            Session {
                connection_id,
                state: SessionState::Unauthenticated,
                client_message_rx,
                server_message_tx,
                character: None,
                reply_to: None,
                context: CommandContext::default(),
            },
        );
        connection_id
    }

    pub fn get(&self, connection_id: ConnectionId) -> Option<&Session> {
        self.sessions.get(&connection_id)
    }

    pub fn get_mut(&mut self, connection_id: ConnectionId) -> Option<&mut Session> {
        self.sessions.get_mut(&connection_id)
    }

    /// Removes the session entirely; dropping its outbound sender is what
    /// tells the transport to tear the connection down.
    pub fn remove(&mut self, connection_id: ConnectionId) -> Option<Session> {
        let session = self.sessions.remove(&connection_id)?;
        if let Some(name) = session.character_name() {
            if self.by_character.get(name) == Some(&connection_id) {
                self.by_character.remove(name);
            }
        }
        Some(session)
    }

    /// Takes a session out of the registry for the duration of one command so
    /// handlers can hold `&mut Character` while reading the registry.
    pub fn take(&mut self, connection_id: ConnectionId) -> Option<Session> {
        self.sessions.remove(&connection_id)
    }

    pub fn restore(&mut self, session: Session) {
        self.sessions.insert(session.connection_id, session);
    }

    pub fn bind_character(&mut self, connection_id: ConnectionId, canonical_name: &str) {
        self.by_character
            .insert(canonical_name.to_string(), connection_id);
    }

    /// For teardown of a session that was `take`n and never restored.
    pub fn unbind_character(&mut self, canonical_name: &str) {
        self.by_character.remove(canonical_name);
    }

    pub fn connection_for_character(&self, canonical_name: &str) -> Option<ConnectionId> {
        self.by_character.get(canonical_name).copied()
    }

    pub fn character(&self, canonical_name: &str) -> Option<&Character> {
        let connection_id = self.connection_for_character(canonical_name)?;
        self.sessions.get(&connection_id)?.character.as_ref()
    }

    pub fn character_mut(&mut self, canonical_name: &str) -> Option<&mut Character> {
        let connection_id = self.connection_for_character(canonical_name)?;
        self.sessions.get_mut(&connection_id)?.character.as_mut()
    }

    pub fn send_to_character(&self, canonical_name: &str, message: ServerMessage) {
        if let Some(connection_id) = self.connection_for_character(canonical_name) {
            if let Some(session) = self.sessions.get(&connection_id) {
                session.send(message);
            }
        }
    }

    pub fn connection_ids(&self) -> Vec<ConnectionId> {
        self.sessions.keys().copied().collect()
    }

    pub fn iter_playing(&self) -> impl Iterator<Item = &Session> {
        self.sessions.values().filter(|session| session.is_playing())
    }

    pub fn playing_character_names(&self) -> Vec<String> {
        self.iter_playing()
            .filter_map(|session| session.character_name().map(str::to_string))
            .collect()
    }
}
