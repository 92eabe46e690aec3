use crate::config::ServerConfig;
use crate::data::RoomId;
use crate::game::messages::OutputCategory;

use super::fixtures::{command, connect, create_character, seeded_world, teleport};

fn combat_config() -> ServerConfig {
    ServerConfig {
        combat_ticks: 1,
        damage_variance: 0.0,
        enemy_respawn_ticks: 3,
        ..Default::default()
    }
}

/// Two players against one wolf: join mid-fight, threat accumulation,
/// shared rewards, respawn scheduling.
#[test]
fn test_two_players_one_wolf() {
    let (mut world, _guard) = seeded_world(7, combat_config());
    let glade = RoomId::from("forest.glade");

    let mut alice = connect(&mut world);
    create_character(&mut world, &alice, "Alice");
    teleport(&mut world, "Alice", "forest.glade");
    world.sessions.character_mut("Alice").unwrap().basic_stats.damage = 10;

    let bob = connect(&mut world);
    create_character(&mut world, &bob, "Bob");
    teleport(&mut world, "Bob", "forest.glade");
    world.sessions.character_mut("Bob").unwrap().basic_stats.damage = 5;

    command(&mut world, &alice, "attack wolf");
    assert!(world.sessions.character("Alice").unwrap().in_combat);

    // Round 1: Alice hits for exactly 10 (variance 0), wolf retaliates for 5.
    world.tick();
    {
        let room = world.world.room(&glade).unwrap();
        assert_eq!(room.enemies[0].current_health, 20);
        assert_eq!(room.enemies[0].threat.get("Alice"), Some(&10));
    }
    assert_eq!(world.sessions.character("Alice").unwrap().health.hp, 95);

    command(&mut world, &bob, "attack wolf");
    assert!(world.sessions.character("Bob").unwrap().in_combat);

    // Round 2: both strike; threat table now covers both fighters.
    world.tick();
    {
        let room = world.world.room(&glade).unwrap();
        assert_eq!(room.enemies[0].current_health, 5);
        assert_eq!(room.enemies[0].threat.get("Alice"), Some(&20));
        assert_eq!(room.enemies[0].threat.get("Bob"), Some(&5));
    }

    // Round 3: Alice's strike fells the wolf; rewards go to both.
    world.tick();
    {
        let room = world.world.room(&glade).unwrap();
        assert!(room.enemies.is_empty());
    }
    assert!(world.combat.is_empty());

    let alice_char = world.sessions.character("Alice").unwrap();
    let bob_char = world.sessions.character("Bob").unwrap();
    assert_eq!(alice_char.experience.xp, 10);
    assert_eq!(bob_char.experience.xp, 10);
    assert!((1..=3).contains(&(alice_char.gold as i32)));
    assert!((1..=3).contains(&(bob_char.gold as i32)));
    assert!(!alice_char.in_combat);
    assert!(!bob_char.in_combat);

    // A wolf pelt either went to exactly one participant or stayed unrolled.
    let pelts = alice_char.inventory.count(&"wolf_pelt".into())
        + bob_char.inventory.count(&"wolf_pelt".into());
    assert!(pelts <= 1);

    assert_eq!(world.respawns.pending_for_room(&glade), 1);

    let texts: Vec<String> = alice
        .output_texts()
        .into_iter()
        .map(|(_, text)| text)
        .collect();
    assert!(texts.iter().any(|text| text.contains("is defeated")));
}

/// A defeated enemy is gone until its respawn tick, then returns at full
/// health with an empty threat table.
#[test]
fn test_respawn_after_interval() {
    let (mut world, _guard) = seeded_world(11, combat_config());
    let glade = RoomId::from("forest.glade");

    let alice = connect(&mut world);
    create_character(&mut world, &alice, "Alice");
    teleport(&mut world, "Alice", "forest.glade");
    world.sessions.character_mut("Alice").unwrap().basic_stats.damage = 30;

    command(&mut world, &alice, "attack wolf");
    world.tick();
    assert!(world.world.room(&glade).unwrap().enemies.is_empty());
    let defeat_tick = world.time.ticks;

    // Not back early.
    world.tick();
    assert!(world.world.room(&glade).unwrap().enemies.is_empty());

    while world.time.ticks < defeat_tick + 3 {
        world.tick();
    }
    let room = world.world.room(&glade).unwrap();
    assert_eq!(room.enemies.len(), 1);
    assert_eq!(room.enemies[0].current_health, 30);
    assert!(room.enemies[0].threat.is_empty());
}

#[test]
fn test_movement_locked_in_combat() {
    let (mut world, _guard) = seeded_world(3, combat_config());

    let mut alice = connect(&mut world);
    create_character(&mut world, &alice, "Alice");
    teleport(&mut world, "Alice", "forest.glade");
    command(&mut world, &alice, "attack wolf");
    alice.drain();

    command(&mut world, &alice, "north");
    let texts = alice.output_texts();
    assert!(texts
        .iter()
        .any(|(category, text)| *category == OutputCategory::Warning
            && text.contains("You can't leave while in combat")));
    assert_eq!(
        world.sessions.character("Alice").unwrap().position.room,
        RoomId::from("forest.glade")
    );
}

#[test]
fn test_flee_success_moves_through_an_exit() {
    let config = ServerConfig {
        flee_success_chance: 1.0,
        ..combat_config()
    };
    let (mut world, _guard) = seeded_world(5, config);

    let alice = connect(&mut world);
    create_character(&mut world, &alice, "Alice");
    teleport(&mut world, "Alice", "forest.glade");
    command(&mut world, &alice, "attack wolf");

    command(&mut world, &alice, "flee");
    let character = world.sessions.character("Alice").unwrap();
    assert!(!character.in_combat);
    // The glade exits south and north; either way, we moved.
    assert_ne!(character.position.room, RoomId::from("forest.glade"));
    assert!(world.combat.is_empty());

    // The wolf keeps no grudge against the departed.
    let glade = world.world.room(&RoomId::from("forest.glade")).unwrap();
    assert!(glade.enemies[0].threat.get("Alice").is_none());
}

/// A failed flee costs a free enemy strike before the next round.
#[test]
fn test_flee_failure_grants_free_strike() {
    let config = ServerConfig {
        flee_success_chance: 0.0,
        ..combat_config()
    };
    let (mut world, _guard) = seeded_world(5, config);

    let alice = connect(&mut world);
    create_character(&mut world, &alice, "Alice");
    teleport(&mut world, "Alice", "forest.glade");
    command(&mut world, &alice, "attack wolf");

    let before = world.sessions.character("Alice").unwrap().health.hp;
    command(&mut world, &alice, "flee");
    let character = world.sessions.character("Alice").unwrap();
    assert!(character.in_combat);
    assert_eq!(character.health.hp, before - 5);
}

/// Death teleports home, restores health, and drops the fighter from the
/// session.
#[test]
fn test_death_returns_to_respawn_at_full_health() {
    let (mut world, _guard) = seeded_world(13, combat_config());

    let alice = connect(&mut world);
    create_character(&mut world, &alice, "Alice");
    teleport(&mut world, "Alice", "forest.glade");
    world.sessions.character_mut("Alice").unwrap().health.hp = 3;

    command(&mut world, &alice, "attack wolf");
    world.tick();

    let character = world.sessions.character("Alice").unwrap();
    assert_eq!(character.position.room, RoomId::from("town.square"));
    assert_eq!(character.health.hp, character.max_health);
    assert!(!character.in_combat);
    assert!(world.combat.is_empty());

    // Occupancy moved with the body.
    assert!(world
        .world
        .characters_in_room(&RoomId::from("town.square"))
        .any(|name| name == "Alice"));
    assert!(!world
        .world
        .characters_in_room(&RoomId::from("forest.glade"))
        .any(|name| name == "Alice"));
}

/// Out-of-combat characters regenerate up to max and hear about it once.
#[test]
fn test_passive_regen_refreshes() {
    let (mut world, _guard) = seeded_world(1, combat_config());

    let mut alice = connect(&mut world);
    create_character(&mut world, &alice, "Alice");
    world.sessions.character_mut("Alice").unwrap().health.hp = 95;
    alice.drain();

    world.tick();
    let character = world.sessions.character("Alice").unwrap();
    assert_eq!(character.health.hp, 100);

    let texts = alice.output_texts();
    assert!(texts
        .iter()
        .any(|(_, text)| text.contains("fully refreshed")));

    // No further refresh chatter once topped out.
    world.tick();
    assert!(alice.output_texts().is_empty());
}
