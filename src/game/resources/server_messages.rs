use crate::data::RoomId;
use crate::game::messages::{OutputCategory, ServerMessage};

/// A queued game event with its audience. A single queue (rather than one
/// per audience) keeps delivery for any one character in emission order.
pub enum PendingMessage {
    Character {
        name: String,
        message: ServerMessage,
    },
    Room {
        room: RoomId,
        exclude: Option<String>,
        message: ServerMessage,
    },
    Global {
        message: ServerMessage,
    },
}

/// Collects events during command handling and ticks; the game loop drains
/// it into session outboxes after every unit of work.
#[derive(Default)]
pub struct ServerMessages {
    pending: Vec<PendingMessage>,
}

impl ServerMessages {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn send_character(&mut self, name: &str, message: ServerMessage) {
        self.pending.push(PendingMessage::Character {
            name: name.to_string(),
            message,
        });
    }

    pub fn send_room(&mut self, room: &RoomId, exclude: Option<&str>, message: ServerMessage) {
        self.pending.push(PendingMessage::Room {
            room: room.clone(),
            exclude: exclude.map(str::to_string),
            message,
        });
    }

    pub fn send_global(&mut self, message: ServerMessage) {
        self.pending.push(PendingMessage::Global { message });
    }

    pub fn character_output(&mut self, name: &str, category: OutputCategory, text: impl Into<String>) {
        self.send_character(
            name,
            ServerMessage::Output {
                category,
                text: text.into(),
            },
        );
    }

    pub fn room_output(
        &mut self,
        room: &RoomId,
        exclude: Option<&str>,
        category: OutputCategory,
        text: impl Into<String>,
    ) {
        self.send_room(
            room,
            exclude,
            ServerMessage::Output {
                category,
                text: text.into(),
            },
        );
    }

    pub fn global_output(&mut self, category: OutputCategory, text: impl Into<String>) {
        self.send_global(ServerMessage::Output {
            category,
            text: text.into(),
        });
    }

    pub fn drain(&mut self) -> Vec<PendingMessage> {
        std::mem::take(&mut self.pending)
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
