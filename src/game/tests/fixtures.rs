use std::path::Path;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::ServerConfig;
use crate::data::{load_game_data, GameData, RoomId};
use crate::game::messages::{ClientMessage, OutputCategory, ServerMessage};
use crate::game::resources::ConnectionId;
use crate::game::storage::StorageDirs;
use crate::game::GameWorld;

fn write_content(root: &Path, files: &[(&str, &str)]) {
    for (rel, text) in files {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, text).unwrap();
    }
}

/// A small but complete world: a town with a homestone binder, a forest
/// with a wolf and a herbalist offering a collect quest.
pub fn small_world() -> GameData {
    let dir = tempfile::tempdir().unwrap();
    write_content(
        dir.path(),
        &[
            (
                "items/thyme.json",
                r#"{ "name": "Thyme", "kind": "misc", "description": "A fragrant sprig.",
                     "value": 1 }"#,
            ),
            (
                "items/rusty_sword.json",
                r#"{ "name": "Rusty Sword", "kind": "weapon", "slot": "main_hand",
                     "stats": { "damage": 3 }, "value": 5, "stackable": false }"#,
            ),
            (
                "items/wolf_pelt.json",
                r#"{ "name": "Wolf Pelt", "kind": "misc", "value": 4 }"#,
            ),
            (
                "items/healing_draught.json",
                r#"{ "name": "Healing Draught", "kind": "consumable",
                     "effects": { "restore_health": 25 }, "value": 10 }"#,
            ),
            (
                "npcs/herbalist.json",
                r#"{ "name": "Herbalist", "description": "A stooped figure smelling of sage.",
                     "dialogue": {
                         "greeting": "Welcome, wanderer.",
                         "responses": { "herbs": "Thyme grows where the wolves prowl." }
                     },
                     "quests": ["gather_herbs"] }"#,
            ),
            (
                "npcs/stonewarden.json",
                r#"{ "name": "Stonewarden", "dialogue": { "greeting": "Rest here." },
                     "homestone_binder": true }"#,
            ),
            (
                "enemies/wolf.json",
                r#"{ "name": "Wolf", "max_health": 30,
                     "attacks": [ { "damage": [5, 5] } ],
                     "defense": 0, "experience": 10, "gold": [1, 3],
                     "loot": [ { "item": "wolf_pelt", "chance": 50.0 } ] }"#,
            ),
            (
                "quests/gather_herbs.json",
                r#"{ "name": "Gather Herbs", "description": "Bring back sprigs of thyme.",
                     "giver": "herbalist",
                     "objectives": [ { "kind": "collect", "target": "thyme", "quantity": 3 } ],
                     "rewards": { "experience": 20, "gold": 5 },
                     "dialogue": {
                         "offer": "The wolves trample my thyme. Bring me three sprigs.",
                         "progress": "Still short a few sprigs, I see.",
                         "complete": "Wonderful! These will do nicely."
                     } }"#,
            ),
            (
                "areas/town/square.json",
                r#"{ "name": "Town Square", "description": "A quiet cobbled square.",
                     "grid_size": [2, 2], "coords": [0, 0],
                     "exits": { "north": "forest.glade" },
                     "npcs": ["stonewarden"] }"#,
            ),
            (
                "areas/forest/glade.json",
                r#"{ "name": "Forest Glade", "description": "Sunlight dapples the grass.",
                     "coords": [0, 0],
                     "exits": { "south": "town.square", "north": "forest.path" },
                     "npcs": ["herbalist"], "enemies": ["wolf"] }"#,
            ),
            (
                "areas/forest/path.json",
                r#"{ "name": "Forest Path", "description": "A narrow dirt track.",
                     "coords": [0, 1],
                     "exits": { "south": "forest.glade" },
                     "items": ["rusty_sword"] }"#,
            ),
        ],
    );
    load_game_data(dir.path()).unwrap()
}

/// A game world with a seeded RNG and temp-dir storage. The returned guard
/// keeps the storage directory alive for the duration of the test.
pub fn seeded_world(seed: u64, config: ServerConfig) -> (GameWorld, tempfile::TempDir) {
    let data = small_world();
    let dir = tempfile::tempdir().unwrap();
    let storage = StorageDirs::new(dir.path()).unwrap();
    let world = GameWorld::with_rng(data, config, storage, StdRng::seed_from_u64(seed));
    (world, dir)
}

/// A connected client as the tests see it: the inbound sender is unused
/// because tests inject messages directly, but holding it keeps the session
/// channel open.
pub struct TestClient {
    pub connection_id: ConnectionId,
    #[allow(dead_code)]
    client_tx: crossbeam_channel::Sender<ClientMessage>,
    server_rx: tokio::sync::mpsc::UnboundedReceiver<ServerMessage>,
}

impl TestClient {
    pub fn drain(&mut self) -> Vec<ServerMessage> {
        let mut messages = Vec::new();
        while let Ok(message) = self.server_rx.try_recv() {
            messages.push(message);
        }
        messages
    }

    /// Output event texts, in delivery order.
    pub fn output_texts(&mut self) -> Vec<(OutputCategory, String)> {
        self.drain()
            .into_iter()
            .filter_map(|message| match message {
                ServerMessage::Output { category, text } => Some((category, text)),
                _ => None,
            })
            .collect()
    }

    pub fn is_closed(&mut self) -> bool {
        matches!(
            self.server_rx.try_recv(),
            Err(tokio::sync::mpsc::error::TryRecvError::Disconnected)
        )
    }
}

pub fn connect(world: &mut GameWorld) -> TestClient {
    let (client_tx, client_rx) = crossbeam_channel::unbounded();
    let (server_tx, server_rx) = tokio::sync::mpsc::unbounded_channel();
    let connection_id = world.sessions.add_client(client_rx, server_tx);
    TestClient {
        connection_id,
        client_tx,
        server_rx,
    }
}

pub fn create_character(world: &mut GameWorld, client: &TestClient, name: &str) {
    world.handle_client_message(
        client.connection_id,
        ClientMessage::Create {
            name: name.to_string(),
            password: "secret".to_string(),
        },
    );
}

pub fn login(world: &mut GameWorld, client: &TestClient, name: &str, password: &str) {
    world.handle_client_message(
        client.connection_id,
        ClientMessage::Auth {
            name: name.to_string(),
            password: password.to_string(),
        },
    );
}

pub fn command(world: &mut GameWorld, client: &TestClient, line: &str) {
    world.handle_client_message(
        client.connection_id,
        ClientMessage::Command {
            line: line.to_string(),
        },
    );
}

/// Moves a character without the movement command, for test setup.
pub fn teleport(world: &mut GameWorld, name: &str, room: &str) {
    let room_id = RoomId::from(room);
    let Some(character) = world.sessions.character_mut(name) else {
        panic!("no such character {name}");
    };
    let from = character.position.room.clone();
    character.position.room = room_id.clone();
    world.world.move_character(&from, &room_id, name);
}
