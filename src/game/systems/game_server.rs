use log::{info, warn};

use crate::config::ServerConfig;
use crate::data::GameData;
use crate::game::commands::describe_room;
use crate::game::components::Character;
use crate::game::messages::{AuthError, AuthResponse, ClientMessage, OutputCategory, ServerMessage};
use crate::game::resources::{
    CombatList, ConnectionId, ServerMessages, SessionRegistry, SessionState, WorldState,
};
use crate::game::storage::{self, CharacterStorageError, PasswordHash, StorageDirs};

use super::combat_system::{remove_player_from_combat, LeaveReason};
use super::save_system::save_character;

fn send_auth_result(
    sessions: &SessionRegistry,
    connection_id: ConnectionId,
    result: Result<AuthResponse, AuthError>,
) {
    if let Some(session) = sessions.get(connection_id) {
        session.send(ServerMessage::AuthResult { result });
    }
}

/// Installs an authenticated character into its session and the world, and
/// announces the arrival. Shared by login and character creation.
fn install_character(
    data: &GameData,
    config: &ServerConfig,
    world: &mut WorldState,
    sessions: &mut SessionRegistry,
    messages: &mut ServerMessages,
    connection_id: ConnectionId,
    mut character: Character,
) {
    // A room that disappeared from content since the last save falls back
    // to the default respawn point.
    if data.get_room(&character.position.room).is_none() {
        character.position.room = config.default_respawn_room.clone();
        if let Some(room) = data.get_room(&character.position.room) {
            if let Some(coords) = room.coords {
                character.position.coords = coords;
            }
        }
    }

    let name = character.name.clone();
    world.add_character(&character.position.room, &name);

    let Some(session) = sessions.get_mut(connection_id) else {
        // Client went away between auth and install; drop them from the room.
        world.remove_character(&character.position.room, &name);
        return;
    };
    session.state = SessionState::Playing;
    session.character = Some(character);
    sessions.bind_character(connection_id, &name);

    send_auth_result(
        sessions,
        connection_id,
        Ok(AuthResponse {
            character_name: name.clone(),
        }),
    );

    info!("character {} logged in on connection {}", name, connection_id);

    messages.global_output(OutputCategory::System, format!("{} has entered Embermoor.", name));
    for session in sessions.iter_playing() {
        if let Some(other) = &session.character {
            if other.name != name && other.friends.is_friend(&name) {
                messages.character_output(
                    &other.name,
                    OutputCategory::System,
                    format!("Your friend {} is online.", name),
                );
            }
        }
    }

    if let Some(character) = sessions.character(&name) {
        let look = describe_room(data, world, character);
        messages.character_output(&name, OutputCategory::Normal, look);
    }
}

fn handle_login(
    data: &GameData,
    config: &ServerConfig,
    world: &mut WorldState,
    combat: &mut CombatList,
    sessions: &mut SessionRegistry,
    messages: &mut ServerMessages,
    storage_dirs: &StorageDirs,
    connection_id: ConnectionId,
    name: &str,
    password: &str,
) {
    let canonical = match storage::name::canonicalize(name, config.name_min_len, config.name_max_len)
    {
        Ok(canonical) => canonical,
        Err(error) => {
            send_auth_result(sessions, connection_id, Err(AuthError::InvalidName(error.to_string())));
            return;
        }
    };

    let character = match storage::character::try_load(storage_dirs, &canonical) {
        Ok(character) => character,
        Err(CharacterStorageError::NotFound(_)) => {
            send_auth_result(sessions, connection_id, Err(AuthError::UnknownCharacter));
            return;
        }
        Err(error) => {
            warn!("login failed loading character {}: {}", canonical, error);
            send_auth_result(sessions, connection_id, Err(AuthError::Failed));
            return;
        }
    };

    if !character.password.verify(password) {
        send_auth_result(sessions, connection_id, Err(AuthError::InvalidPassword));
        return;
    }

    // Single-login rule: the old session is torn down and its in-memory
    // state discarded; this freshly loaded record wins.
    if let Some(old_connection) = sessions.connection_for_character(&canonical) {
        info!(
            "character {} logged in elsewhere; superseding connection {}",
            canonical, old_connection
        );
        remove_player_from_combat(
            world,
            combat,
            sessions,
            messages,
            &canonical,
            LeaveReason::Disconnect,
        );
        if let Some(mut old_session) = sessions.remove(old_connection) {
            old_session.state = SessionState::Disconnecting;
            old_session.send(ServerMessage::SystemNotice {
                text: "You have been logged in elsewhere.".to_string(),
            });
            if let Some(old_character) = old_session.character.as_ref() {
                world.remove_character(&old_character.position.room, &canonical);
            }
            // Dropping the session here closes its outbound channel, which
            // ends the client task.
        }
    }

    install_character(data, config, world, sessions, messages, connection_id, character);
}

fn handle_create(
    data: &GameData,
    config: &ServerConfig,
    world: &mut WorldState,
    sessions: &mut SessionRegistry,
    messages: &mut ServerMessages,
    storage_dirs: &StorageDirs,
    connection_id: ConnectionId,
    name: &str,
    password: &str,
) {
    let canonical = match storage::name::canonicalize(name, config.name_min_len, config.name_max_len)
    {
        Ok(canonical) => canonical,
        Err(error) => {
            send_auth_result(sessions, connection_id, Err(AuthError::InvalidName(error.to_string())));
            return;
        }
    };

    if password.len() < config.password_min_len {
        send_auth_result(
            sessions,
            connection_id,
            Err(AuthError::PasswordTooShort(config.password_min_len)),
        );
        return;
    }

    if storage::character::exists(storage_dirs, &canonical) {
        send_auth_result(sessions, connection_id, Err(AuthError::NameTaken));
        return;
    }

    let start_room = config.default_respawn_room.clone();
    let coords = data.get_room(&start_room).and_then(|room| room.coords);
    let mut character = Character::create(
        canonical.clone(),
        PasswordHash::derive(password),
        start_room,
        coords,
    );

    match storage::character::try_create(storage_dirs, &mut character) {
        Ok(()) => {}
        Err(CharacterStorageError::AlreadyExists(_)) => {
            send_auth_result(sessions, connection_id, Err(AuthError::NameTaken));
            return;
        }
        Err(error) => {
            warn!("character creation failed for {}: {}", canonical, error);
            send_auth_result(sessions, connection_id, Err(AuthError::Failed));
            return;
        }
    }

    info!("created character {}", canonical);
    install_character(data, config, world, sessions, messages, connection_id, character);
}

/// Routes a message from a not-yet-authenticated session.
pub fn handle_unauthenticated_message(
    data: &GameData,
    config: &ServerConfig,
    world: &mut WorldState,
    combat: &mut CombatList,
    sessions: &mut SessionRegistry,
    messages: &mut ServerMessages,
    storage_dirs: &StorageDirs,
    connection_id: ConnectionId,
    message: ClientMessage,
) {
    match message {
        ClientMessage::Auth { name, password } => handle_login(
            data,
            config,
            world,
            combat,
            sessions,
            messages,
            storage_dirs,
            connection_id,
            &name,
            &password,
        ),
        ClientMessage::Create { name, password } => handle_create(
            data,
            config,
            world,
            sessions,
            messages,
            storage_dirs,
            connection_id,
            &name,
            &password,
        ),
        ClientMessage::Command { .. } => {
            if let Some(session) = sessions.get(connection_id) {
                session.send(ServerMessage::Output {
                    category: OutputCategory::Warning,
                    text: "Please log in first.".to_string(),
                });
            }
        }
    }
}

/// Clean teardown of a connection that went away: combat removal with the
/// disconnect reason, world occupancy, final save, world announcement.
pub fn handle_disconnect(
    data: &GameData,
    config: &ServerConfig,
    world: &mut WorldState,
    combat: &mut CombatList,
    sessions: &mut SessionRegistry,
    messages: &mut ServerMessages,
    storage_dirs: &StorageDirs,
    connection_id: ConnectionId,
) {
    let Some(mut session) = sessions.remove(connection_id) else {
        return;
    };
    let Some(character) = session.character.as_mut() else {
        return;
    };

    let name = character.name.clone();
    info!("character {} disconnected", name);

    remove_player_from_combat(
        world,
        combat,
        sessions,
        messages,
        &name,
        LeaveReason::Disconnect,
    );
    character.in_combat = false;
    world.remove_character(&character.position.room, &name);
    save_character(storage_dirs, config, data, character);
    messages.global_output(OutputCategory::System, format!("{} has left Embermoor.", name));
}
