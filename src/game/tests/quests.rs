use crate::config::ServerConfig;
use crate::data::{ItemId, QuestId, RoomId};
use crate::game::messages::OutputCategory;

use super::fixtures::{command, connect, create_character, seeded_world, teleport};

fn gather_herbs() -> QuestId {
    QuestId::new("gather_herbs")
}

fn collect_progress(world: &crate::game::GameWorld, name: &str) -> u32 {
    world
        .sessions
        .character(name)
        .unwrap()
        .quest_log
        .get_active(&gather_herbs())
        .unwrap()
        .objectives[0]
        .current
}

/// The collect quest lifecycle from S2: progress follows inventory through
/// take and drop, caps at the objective quantity, and never auto-completes.
#[test]
fn test_collect_progress_follows_inventory() {
    let (mut world, _guard) = seeded_world(2, ServerConfig::default());
    let glade = RoomId::from("forest.glade");
    let thyme = ItemId::new("thyme");

    let mut alice = connect(&mut world);
    create_character(&mut world, &alice, "Alice");
    teleport(&mut world, "Alice", "forest.glade");
    world.world.drop_item(&glade, &thyme, 5);

    command(&mut world, &alice, "talk herbalist");
    let texts = alice.output_texts();
    assert!(texts
        .iter()
        .any(|(_, text)| text.contains("1) Gather Herbs")));

    command(&mut world, &alice, "accept 1");
    assert!(world
        .sessions
        .character("Alice")
        .unwrap()
        .quest_log
        .is_active(&gather_herbs()));
    assert_eq!(collect_progress(&world, "Alice"), 0);

    command(&mut world, &alice, "take thyme");
    command(&mut world, &alice, "take thyme");
    assert_eq!(collect_progress(&world, "Alice"), 2);

    command(&mut world, &alice, "drop thyme");
    assert_eq!(collect_progress(&world, "Alice"), 1);

    command(&mut world, &alice, "take thyme");
    command(&mut world, &alice, "take thyme");
    assert_eq!(collect_progress(&world, "Alice"), 3);

    // A fourth sprig does not push past the objective quantity.
    command(&mut world, &alice, "take thyme");
    assert_eq!(collect_progress(&world, "Alice"), 3);

    // Eligible for turn-in, but not auto-completed.
    let character = world.sessions.character("Alice").unwrap();
    assert!(character.quest_log.is_active(&gather_herbs()));
    assert!(!character.quest_log.is_completed(&gather_herbs()));
}

#[test]
fn test_turn_in_consumes_items_and_rewards() {
    let (mut world, _guard) = seeded_world(2, ServerConfig::default());
    let glade = RoomId::from("forest.glade");
    let thyme = ItemId::new("thyme");

    let mut alice = connect(&mut world);
    create_character(&mut world, &alice, "Alice");
    teleport(&mut world, "Alice", "forest.glade");
    world.world.drop_item(&glade, &thyme, 4);

    command(&mut world, &alice, "talk herbalist");
    command(&mut world, &alice, "accept 1");
    for _ in 0..4 {
        command(&mut world, &alice, "take thyme");
    }
    alice.drain();

    command(&mut world, &alice, "quest complete gather herbs");
    let texts = alice.output_texts();
    assert!(texts
        .iter()
        .any(|(category, text)| *category == OutputCategory::Success
            && text.contains("Quest complete: Gather Herbs")));

    let character = world.sessions.character("Alice").unwrap();
    assert!(character.quest_log.is_completed(&gather_herbs()));
    assert!(!character.quest_log.is_active(&gather_herbs()));
    assert_eq!(character.inventory.count(&thyme), 1);
    assert_eq!(character.experience.xp, 20);
    assert_eq!(character.gold, 5);
}

#[test]
fn test_turn_in_requires_satisfied_objectives() {
    let (mut world, _guard) = seeded_world(2, ServerConfig::default());

    let mut alice = connect(&mut world);
    create_character(&mut world, &alice, "Alice");
    teleport(&mut world, "Alice", "forest.glade");

    command(&mut world, &alice, "talk herbalist");
    command(&mut world, &alice, "accept 1");
    alice.drain();

    command(&mut world, &alice, "turn in gather herbs");
    let texts = alice.output_texts();
    // The quest's own progress dialogue is used for the refusal.
    assert!(texts
        .iter()
        .any(|(category, text)| *category == OutputCategory::Warning
            && text.contains("Still short a few sprigs")));
    assert!(world
        .sessions
        .character("Alice")
        .unwrap()
        .quest_log
        .is_active(&gather_herbs()));
}

#[test]
fn test_accept_rejects_duplicates_and_repeats() {
    let (mut world, _guard) = seeded_world(2, ServerConfig::default());
    let glade = RoomId::from("forest.glade");
    let thyme = ItemId::new("thyme");

    let mut alice = connect(&mut world);
    create_character(&mut world, &alice, "Alice");
    teleport(&mut world, "Alice", "forest.glade");
    world.world.drop_item(&glade, &thyme, 3);

    command(&mut world, &alice, "talk herbalist");
    command(&mut world, &alice, "accept 1");
    alice.drain();

    // Already active.
    command(&mut world, &alice, "accept gather herbs");
    assert!(alice
        .output_texts()
        .iter()
        .any(|(category, text)| *category == OutputCategory::Warning
            && text.contains("already have that quest")));

    for _ in 0..3 {
        command(&mut world, &alice, "take thyme");
    }
    command(&mut world, &alice, "quest complete gather herbs");
    alice.drain();

    // Completed and not repeatable.
    command(&mut world, &alice, "accept gather herbs");
    assert!(alice
        .output_texts()
        .iter()
        .any(|(category, text)| *category == OutputCategory::Warning
            && text.contains("already completed")));
}

#[test]
fn test_abandon_clears_numbered_list_entry() {
    let (mut world, _guard) = seeded_world(2, ServerConfig::default());

    let mut alice = connect(&mut world);
    create_character(&mut world, &alice, "Alice");
    teleport(&mut world, "Alice", "forest.glade");

    command(&mut world, &alice, "talk herbalist");
    command(&mut world, &alice, "accept 1");
    command(&mut world, &alice, "quest");
    alice.drain();

    command(&mut world, &alice, "abandon 1");
    assert!(alice
        .output_texts()
        .iter()
        .any(|(_, text)| text.contains("Quest abandoned: Gather Herbs")));
    let character = world.sessions.character("Alice").unwrap();
    assert!(!character.quest_log.is_active(&gather_herbs()));
    assert!(!character.quest_log.is_completed(&gather_herbs()));
}

/// Context lists die when an unrelated verb runs: `accept 1` after moving
/// away no longer resolves.
#[test]
fn test_offered_list_cleared_by_other_verbs() {
    let (mut world, _guard) = seeded_world(2, ServerConfig::default());

    let mut alice = connect(&mut world);
    create_character(&mut world, &alice, "Alice");
    teleport(&mut world, "Alice", "forest.glade");

    command(&mut world, &alice, "talk herbalist");
    command(&mut world, &alice, "look");
    alice.drain();

    command(&mut world, &alice, "accept 1");
    assert!(alice
        .output_texts()
        .iter()
        .any(|(category, _)| *category == OutputCategory::Warning));
    assert!(!world
        .sessions
        .character("Alice")
        .unwrap()
        .quest_log
        .is_active(&gather_herbs()));
}
