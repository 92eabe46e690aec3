use crate::game::components::{experience_to_next_level, Character};
use crate::game::messages::OutputCategory;
use crate::game::storage::PasswordHash;

use super::{persist, warning, CommandCtx, CommandResult};

const HELP_TEXT: &str = "\
Movement:   north (n), south (s), east (e), west (w), go <dir>
Looking:    look (l) [target], examine (ex) <target>
Inventory:  inventory (inv, i), take <item>, drop <item>, use <item>
Equipment:  equip <item>, unequip <item>, equipment (eq)
Social:     say <msg>, tell <player> <msg>, reply <msg>, emote <action>,
            who, friends [add|remove|note] ...
People:     talk <npc>, ask <npc> about <topic>, bind
Quests:     quest [list], quest info <name>, accept <quest|number>,
            abandon <quest|number>, quest complete <name>, turn in <name>
Combat:     attack <target>, flee
Other:      help, stats, health, save, password <new>, quit";

pub fn help(ctx: &mut CommandCtx, character: &mut Character) -> CommandResult {
    ctx.messages
        .character_output(&character.name, OutputCategory::Normal, HELP_TEXT);
    Ok(())
}

pub fn stats(ctx: &mut CommandCtx, character: &mut Character) -> CommandResult {
    let derived = character.derived_stats(ctx.data);
    let text = format!(
        "{} — level {}\n\
         Experience: {}/{}\n\
         Health: {}/{}\n\
         Damage: {}  Defense: {}  Speed: {}\n\
         Gold: {}",
        character.name,
        character.level.level,
        character.experience.xp,
        experience_to_next_level(character.level),
        character.health.hp,
        derived.max_health,
        derived.damage,
        derived.defense,
        derived.speed,
        character.gold
    );
    ctx.messages
        .character_output(&character.name, OutputCategory::Normal, text);
    Ok(())
}

pub fn health(ctx: &mut CommandCtx, character: &mut Character) -> CommandResult {
    let max_health = character.derived_stats(ctx.data).max_health;
    ctx.messages.character_output(
        &character.name,
        OutputCategory::Normal,
        format!("Health: {}/{}", character.health.hp, max_health),
    );
    Ok(())
}

pub fn save(ctx: &mut CommandCtx, character: &mut Character) -> CommandResult {
    persist(ctx, character);
    ctx.messages
        .character_output(&character.name, OutputCategory::Success, "Saved.");
    Ok(())
}

/// The dispatch loop turns a successful quit into the disconnect path, which
/// says goodbye on the way out; this just makes sure the record is on disk.
pub fn quit(ctx: &mut CommandCtx, character: &mut Character) -> CommandResult {
    persist(ctx, character);
    Ok(())
}

pub fn password(ctx: &mut CommandCtx, character: &mut Character, args: &str) -> CommandResult {
    let new_password = args.trim();
    if new_password.len() < ctx.config.password_min_len {
        return Err(warning(format!(
            "Passwords must be at least {} characters.",
            ctx.config.password_min_len
        )));
    }

    character.password = PasswordHash::derive(new_password);
    persist(ctx, character);
    ctx.messages.character_output(
        &character.name,
        OutputCategory::Success,
        "Password changed.",
    );
    Ok(())
}
