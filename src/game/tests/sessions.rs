use crate::config::ServerConfig;
use crate::data::RoomId;
use crate::game::messages::{AuthError, ServerMessage};

use super::fixtures::{command, connect, create_character, login, seeded_world, teleport};

fn auth_results(messages: &[ServerMessage]) -> Vec<&Result<crate::game::messages::AuthResponse, AuthError>> {
    messages
        .iter()
        .filter_map(|message| match message {
            ServerMessage::AuthResult { result } => Some(result),
            _ => None,
        })
        .collect()
}

#[test]
fn test_create_then_relogin() {
    let (mut world, _guard) = seeded_world(1, ServerConfig::default());

    let mut client = connect(&mut world);
    create_character(&mut world, &client, "alice");
    let messages = client.drain();
    let results = auth_results(&messages);
    assert_eq!(results.len(), 1);
    // Names canonicalize on the way in.
    assert_eq!(results[0].as_ref().unwrap().character_name, "Alice");

    command(&mut world, &client, "quit");
    assert!(world.sessions.connection_for_character("Alice").is_none());

    let mut again = connect(&mut world);
    login(&mut world, &again, "ALICE", "secret");
    let messages = again.drain();
    assert!(auth_results(&messages)[0].is_ok());
}

#[test]
fn test_login_rejects_bad_credentials() {
    let (mut world, _guard) = seeded_world(1, ServerConfig::default());

    let mut client = connect(&mut world);
    create_character(&mut world, &client, "Alice");
    client.drain();

    let mut wrong = connect(&mut world);
    login(&mut world, &wrong, "Alice", "wrong");
    let messages = wrong.drain();
    assert_eq!(
        auth_results(&messages)[0],
        &Err(AuthError::InvalidPassword)
    );

    let mut nobody = connect(&mut world);
    login(&mut world, &nobody, "Ghost", "secret");
    let messages = nobody.drain();
    assert_eq!(
        auth_results(&messages)[0],
        &Err(AuthError::UnknownCharacter)
    );

    let mut bad_name = connect(&mut world);
    login(&mut world, &bad_name, "x!", "secret");
    let messages = bad_name.drain();
    assert!(matches!(
        auth_results(&messages)[0],
        Err(AuthError::InvalidName(_))
    ));
}

#[test]
fn test_create_validates_name_and_password() {
    let (mut world, _guard) = seeded_world(1, ServerConfig::default());

    let mut client = connect(&mut world);
    create_character(&mut world, &client, "Alice");
    client.drain();

    let mut taken = connect(&mut world);
    create_character(&mut world, &taken, "ALICE");
    let messages = taken.drain();
    assert_eq!(auth_results(&messages)[0], &Err(AuthError::NameTaken));

    let mut short = connect(&mut world);
    world.handle_client_message(
        short.connection_id,
        crate::game::messages::ClientMessage::Create {
            name: "Bob".to_string(),
            password: "xy".to_string(),
        },
    );
    let messages = short.drain();
    assert_eq!(
        auth_results(&messages)[0],
        &Err(AuthError::PasswordTooShort(3))
    );
}

/// S3: a second login supersedes the first. The old connection is told and
/// torn down, combat loses the character, the new session plays on.
#[test]
fn test_duplicate_login_supersedes() {
    let config = ServerConfig {
        combat_ticks: 1,
        damage_variance: 0.0,
        ..Default::default()
    };
    let (mut world, _guard) = seeded_world(9, config);

    let mut first = connect(&mut world);
    create_character(&mut world, &first, "Alice");
    teleport(&mut world, "Alice", "forest.glade");
    command(&mut world, &first, "attack wolf");
    assert!(world.sessions.character("Alice").unwrap().in_combat);
    first.drain();

    let mut second = connect(&mut world);
    login(&mut world, &second, "Alice", "secret");

    // Old connection: notice, then channel closed.
    let messages = first.drain();
    assert!(messages.iter().any(|message| matches!(
        message,
        ServerMessage::SystemNotice { text } if text.contains("logged in elsewhere")
    )));
    assert!(first.is_closed());

    // New connection owns the character now.
    let messages = second.drain();
    assert!(auth_results(&messages)[0].is_ok());
    assert_eq!(
        world.sessions.connection_for_character("Alice"),
        Some(second.connection_id)
    );

    // The solo fight ended when its only fighter was disconnected from it.
    assert!(world.combat.is_empty());
    let glade = world.world.room(&RoomId::from("forest.glade")).unwrap();
    assert!(glade.enemies[0].threat.get("Alice").is_none());

    // The fresh session is not in combat.
    assert!(!world.sessions.character("Alice").unwrap().in_combat);
}

#[test]
fn test_disconnect_saves_and_clears_world() {
    let (mut world, _guard) = seeded_world(1, ServerConfig::default());

    let client = connect(&mut world);
    create_character(&mut world, &client, "Alice");
    teleport(&mut world, "Alice", "forest.glade");
    world.sessions.character_mut("Alice").unwrap().gold = 99;

    world.handle_control_message(crate::game::messages::ControlMessage::RemoveClient {
        connection_id: client.connection_id,
    });

    assert!(world.sessions.connection_for_character("Alice").is_none());
    assert!(!world
        .world
        .characters_in_room(&RoomId::from("forest.glade"))
        .any(|name| name == "Alice"));

    // The save landed: gold survives a fresh login.
    let mut again = connect(&mut world);
    login(&mut world, &again, "Alice", "secret");
    again.drain();
    assert_eq!(world.sessions.character("Alice").unwrap().gold, 99);
}
