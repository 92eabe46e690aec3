use rand::rngs::StdRng;
use thiserror::Error;

use crate::config::ServerConfig;
use crate::data::{Direction, GameData, QuestId, RoomData};
use crate::game::components::{Character, ProgressUpdate};
use crate::game::resources::{
    CombatList, RespawnList, ServerMessages, SessionRegistry, WorldState, WorldTime,
};
use crate::game::storage::StorageDirs;
use crate::game::messages::OutputCategory;
use crate::game::resources::sessions::Session;

pub mod context;
pub mod fuzzy;

mod combat;
mod equipment;
mod inventory;
mod meta;
mod movement;
mod npc;
mod observation;
mod quests;
mod social;

/// Everything a command handler may touch. The actor's session is taken out
/// of the registry before dispatch, so `sessions` only ever addresses peers.
pub struct CommandCtx<'a> {
    pub data: &'a GameData,
    pub config: &'a ServerConfig,
    pub world: &'a mut WorldState,
    pub combat: &'a mut CombatList,
    pub respawns: &'a mut RespawnList,
    pub messages: &'a mut ServerMessages,
    pub sessions: &'a mut SessionRegistry,
    pub storage: &'a StorageDirs,
    pub rng: &'a mut StdRng,
    pub time: &'a WorldTime,
}

#[derive(Debug, Error)]
pub enum CommandError {
    /// User-visible precondition or validation failure. The handler has not
    /// mutated anything when it returns this.
    #[error("{0}")]
    Warning(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type CommandResult = Result<(), CommandError>;

pub(crate) fn warning(text: impl Into<String>) -> CommandError {
    CommandError::Warning(text.into())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommandOutcome {
    Continue,
    Quit,
}

#[derive(Clone, Copy, Debug)]
enum Verb {
    Move(Direction),
    Go,
    Look,
    Examine,
    Inventory,
    Take,
    Drop,
    Use,
    Equip,
    Unequip,
    EquipmentList,
    Say,
    Tell,
    Reply,
    Emote,
    Who,
    Friends,
    Talk,
    Ask,
    Bind,
    Quest,
    Accept,
    Abandon,
    TurnIn,
    Attack,
    Flee,
    Help,
    Stats,
    Health,
    Save,
    Quit,
    Password,
}

fn parse_verb(word: &str) -> Option<(Verb, &'static str)> {
    if let Some(direction) = Direction::parse(word) {
        let canonical = match direction {
            Direction::North => "north",
            Direction::South => "south",
            Direction::East => "east",
            Direction::West => "west",
        };
        return Some((Verb::Move(direction), canonical));
    }

    let entry = match word {
        "go" => (Verb::Go, "go"),
        "look" | "l" => (Verb::Look, "look"),
        "examine" | "ex" => (Verb::Examine, "examine"),
        "inventory" | "inv" | "i" => (Verb::Inventory, "inventory"),
        "take" | "get" => (Verb::Take, "take"),
        "drop" => (Verb::Drop, "drop"),
        "use" => (Verb::Use, "use"),
        "equip" | "wield" | "wear" => (Verb::Equip, "equip"),
        "unequip" | "unwield" | "remove" => (Verb::Unequip, "unequip"),
        "equipment" | "eq" => (Verb::EquipmentList, "equipment"),
        "say" => (Verb::Say, "say"),
        "tell" => (Verb::Tell, "tell"),
        "reply" => (Verb::Reply, "reply"),
        "emote" => (Verb::Emote, "emote"),
        "who" => (Verb::Who, "who"),
        "friends" | "f" => (Verb::Friends, "friends"),
        "talk" | "speak" => (Verb::Talk, "talk"),
        "ask" => (Verb::Ask, "ask"),
        "bind" => (Verb::Bind, "bind"),
        "quest" | "quests" => (Verb::Quest, "quest"),
        "accept" => (Verb::Accept, "accept"),
        "abandon" => (Verb::Abandon, "abandon"),
        "turn" => (Verb::TurnIn, "turn"),
        "attack" | "fight" | "kill" => (Verb::Attack, "attack"),
        "flee" | "run" => (Verb::Flee, "flee"),
        "help" => (Verb::Help, "help"),
        "stats" => (Verb::Stats, "stats"),
        "health" => (Verb::Health, "health"),
        "save" => (Verb::Save, "save"),
        "quit" | "logout" | "exit" => (Verb::Quit, "quit"),
        "password" => (Verb::Password, "password"),
        _ => return None,
    };
    Some(entry)
}

/// Routes one line of input. The caller has already taken the session out of
/// the registry; a `Quit` outcome tells it to run the disconnect path
/// instead of restoring the session.
pub fn dispatch(ctx: &mut CommandCtx, session: &mut Session, line: &str) -> CommandOutcome {
    let Session {
        character,
        context,
        reply_to,
        ..
    } = session;
    let Some(character) = character.as_mut() else {
        return CommandOutcome::Continue;
    };
    let actor = character.name.clone();

    let line = line.trim();
    if line.is_empty() {
        return CommandOutcome::Continue;
    }

    let mut parts = line.splitn(2, |c: char| c.is_whitespace());
    let verb_word = parts.next().unwrap_or_default().to_lowercase();
    let mut args = parts.next().unwrap_or_default().trim();

    let Some((verb, canonical)) = parse_verb(&verb_word) else {
        ctx.messages.character_output(
            &actor,
            OutputCategory::Warning,
            format!("Unknown command: {}. Type 'help' for a list.", verb_word),
        );
        return CommandOutcome::Continue;
    };

    // `turn in <quest>` is the only two-word verb.
    if let Verb::TurnIn = verb {
        match args.strip_prefix("in") {
            Some(rest) if rest.is_empty() || rest.starts_with(char::is_whitespace) => {
                args = rest.trim();
            }
            _ => {
                ctx.messages.character_output(
                    &actor,
                    OutputCategory::Warning,
                    "Did you mean 'turn in <quest>'?",
                );
                return CommandOutcome::Continue;
            }
        }
    }

    context.clear_for_verb(canonical);

    let result = match verb {
        Verb::Move(direction) => movement::move_direction(ctx, character, direction),
        Verb::Go => movement::go(ctx, character, args),
        Verb::Look => observation::look(ctx, character, args),
        Verb::Examine => observation::examine(ctx, character, args),
        Verb::Inventory => inventory::show_inventory(ctx, character),
        Verb::Take => inventory::take(ctx, character, args),
        Verb::Drop => inventory::drop_item(ctx, character, args),
        Verb::Use => inventory::use_item(ctx, character, args),
        Verb::Equip => equipment::equip(ctx, character, args),
        Verb::Unequip => equipment::unequip(ctx, character, args),
        Verb::EquipmentList => equipment::show_equipment(ctx, character),
        Verb::Say => social::say(ctx, character, args),
        Verb::Tell => social::tell(ctx, character, args),
        Verb::Reply => social::reply(ctx, character, reply_to, args),
        Verb::Emote => social::emote(ctx, character, args),
        Verb::Who => social::who(ctx, character),
        Verb::Friends => social::friends(ctx, character, args),
        Verb::Talk => npc::talk(ctx, character, context, args),
        Verb::Ask => npc::ask(ctx, character, args),
        Verb::Bind => npc::bind(ctx, character),
        Verb::Quest => quests::quest(ctx, character, context, args),
        Verb::Accept => quests::accept(ctx, character, context, args),
        Verb::Abandon => quests::abandon(ctx, character, context, args),
        Verb::TurnIn => quests::turn_in(ctx, character, args),
        Verb::Attack => combat::attack(ctx, character, args),
        Verb::Flee => combat::flee(ctx, character),
        Verb::Help => meta::help(ctx, character),
        Verb::Stats => meta::stats(ctx, character),
        Verb::Health => meta::health(ctx, character),
        Verb::Save => meta::save(ctx, character),
        Verb::Quit => meta::quit(ctx, character),
        Verb::Password => meta::password(ctx, character, args),
    };

    match result {
        Ok(()) => {
            if matches!(verb, Verb::Quit) {
                CommandOutcome::Quit
            } else {
                CommandOutcome::Continue
            }
        }
        Err(CommandError::Warning(text)) => {
            ctx.messages
                .character_output(&actor, OutputCategory::Warning, text);
            CommandOutcome::Continue
        }
        Err(CommandError::Internal(error)) => {
            log::error!("command {:?} from {} failed: {:?}", line, actor, error);
            ctx.messages
                .character_output(&actor, OutputCategory::Error, "An error occurred.");
            CommandOutcome::Continue
        }
    }
}

/// Current room template, or an internal error if the character is somehow
/// standing in a room the content no longer has.
pub(crate) fn room_template<'a>(
    data: &'a GameData,
    character: &Character,
) -> Result<&'a RoomData, CommandError> {
    data.get_room(&character.position.room).ok_or_else(|| {
        CommandError::Internal(anyhow::anyhow!(
            "character {} is in unknown room {}",
            character.name,
            character.position.room
        ))
    })
}

/// The room text sent on `look` and after movement.
pub(crate) fn describe_room(data: &GameData, world: &WorldState, character: &Character) -> String {
    let Some(room) = data.get_room(&character.position.room) else {
        return "You are nowhere.".to_string();
    };

    let mut lines = vec![room.name.clone()];
    if !room.description.is_empty() {
        lines.push(room.description.clone());
    }

    let mut item_names: Vec<String> = room
        .items
        .iter()
        .filter(|item| !character.has_taken_room_item(&room.id, item))
        .map(|item| data.item_name(item).to_string())
        .collect();
    if let Some(live) = world.room(&room.id) {
        for (item, quantity) in &live.floor_items {
            if *quantity > 1 {
                item_names.push(format!("{} x{}", data.item_name(item), quantity));
            } else {
                item_names.push(data.item_name(item).to_string());
            }
        }
    }
    if !item_names.is_empty() {
        lines.push(format!("Items: {}", item_names.join(", ")));
    }

    let npc_names: Vec<&str> = room
        .npcs
        .iter()
        .filter_map(|npc| data.get_npc(npc).map(|npc| npc.name.as_str()))
        .collect();
    if !npc_names.is_empty() {
        lines.push(format!("Also here: {}", npc_names.join(", ")));
    }

    if let Some(live) = world.room(&room.id) {
        let enemy_names: Vec<&str> = live
            .enemies
            .iter()
            .filter(|enemy| enemy.is_alive())
            .map(|enemy| data.enemy_name(&enemy.template))
            .collect();
        if !enemy_names.is_empty() {
            lines.push(format!("Enemies: {}", enemy_names.join(", ")));
        }
    }

    let others: Vec<&str> = world
        .characters_in_room(&room.id)
        .filter(|name| *name != character.name)
        .collect();
    if !others.is_empty() {
        lines.push(format!("Players: {}", others.join(", ")));
    }

    let exits: Vec<String> = room.exits.keys().map(|dir| dir.to_string()).collect();
    if exits.is_empty() {
        lines.push("Exits: none".to_string());
    } else {
        lines.push(format!("Exits: {}", exits.join(", ")));
    }

    lines.join("\n")
}

/// Non-exact fuzzy matches echo what they resolved to.
pub(crate) fn echo_canonical(messages: &mut ServerMessages, actor: &str, canonical: &str) {
    messages.character_output(actor, OutputCategory::Normal, format!("({})", canonical));
}

pub(crate) fn emit_quest_progress(
    messages: &mut ServerMessages,
    data: &GameData,
    actor: &str,
    updates: &[(QuestId, ProgressUpdate)],
) {
    for (quest_id, update) in updates {
        let quest_name = data
            .get_quest(quest_id)
            .map_or(quest_id.as_str(), |quest| quest.name.as_str());
        let text = if update.satisfied_now {
            format!(
                "[{}] objective complete ({}/{})",
                quest_name, update.current, update.quantity
            )
        } else {
            format!("[{}] {}/{}", quest_name, update.current, update.quantity)
        };
        messages.character_output(actor, OutputCategory::Success, text);
    }
}

/// Save at the end of a state-changing handler. Failures are an operator
/// problem; the player's in-memory state is intact and the next save retries.
pub(crate) fn persist(ctx: &mut CommandCtx, character: &mut Character) {
    crate::game::systems::save_system::save_character(ctx.storage, ctx.config, ctx.data, character);
}
