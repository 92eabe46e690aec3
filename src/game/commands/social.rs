use crate::game::components::Character;
use crate::game::messages::OutputCategory;
use crate::game::storage;

use super::{persist, warning, CommandCtx, CommandResult};

pub fn say(ctx: &mut CommandCtx, character: &mut Character, args: &str) -> CommandResult {
    if args.is_empty() {
        return Err(warning("Say what?"));
    }

    ctx.messages.character_output(
        &character.name,
        OutputCategory::Chat,
        format!("You say, \"{}\"", args),
    );
    ctx.messages.room_output(
        &character.position.room,
        Some(&character.name),
        OutputCategory::Chat,
        format!("{} says, \"{}\"", character.name, args),
    );
    Ok(())
}

/// Shared by `tell` and `reply`: whispers to an online character and records
/// the sender for their `reply`.
fn send_whisper(
    ctx: &mut CommandCtx,
    character: &Character,
    target: &str,
    text: &str,
) -> CommandResult {
    let Some(connection_id) = ctx.sessions.connection_for_character(target) else {
        return Err(warning(format!("{} is not online.", target)));
    };

    if let Some(session) = ctx.sessions.get_mut(connection_id) {
        session.reply_to = Some(character.name.clone());
    }

    ctx.messages.character_output(
        &character.name,
        OutputCategory::Whisper,
        format!("You tell {}: {}", target, text),
    );
    ctx.messages.character_output(
        target,
        OutputCategory::Whisper,
        format!("{} tells you: {}", character.name, text),
    );
    Ok(())
}

pub fn tell(ctx: &mut CommandCtx, character: &mut Character, args: &str) -> CommandResult {
    let mut parts = args.splitn(2, |c: char| c.is_whitespace());
    let target_word = parts.next().unwrap_or_default();
    let text = parts.next().unwrap_or_default().trim();
    if target_word.is_empty() || text.is_empty() {
        return Err(warning("Usage: tell <player> <message>"));
    }

    let target = storage::name::canonicalize(
        target_word,
        ctx.config.name_min_len,
        ctx.config.name_max_len,
    )
    .map_err(|_| warning(format!("{} is not online.", target_word)))?;

    if target == character.name {
        return Err(warning("You mutter to yourself."));
    }

    send_whisper(ctx, character, &target, text)
}

pub fn reply(
    ctx: &mut CommandCtx,
    character: &mut Character,
    reply_to: &mut Option<String>,
    args: &str,
) -> CommandResult {
    if args.is_empty() {
        return Err(warning("Reply what?"));
    }
    let Some(target) = reply_to.clone() else {
        return Err(warning("No one has whispered to you."));
    };
    send_whisper(ctx, character, &target, args)
}

pub fn emote(ctx: &mut CommandCtx, character: &mut Character, args: &str) -> CommandResult {
    if args.is_empty() {
        return Err(warning("Emote what?"));
    }
    ctx.messages.room_output(
        &character.position.room,
        None,
        OutputCategory::Chat,
        format!("{} {}", character.name, args),
    );
    Ok(())
}

pub fn who(ctx: &mut CommandCtx, character: &mut Character) -> CommandResult {
    // The actor's session is out of the registry while this runs.
    let mut online: Vec<(String, u32)> = vec![(character.name.clone(), character.level.level)];
    for session in ctx.sessions.iter_playing() {
        if let Some(other) = &session.character {
            online.push((other.name.clone(), other.level.level));
        }
    }
    online.sort();

    let mut lines = vec![format!("Online ({}):", online.len())];
    for (name, level) in online {
        lines.push(format!("  {} (level {})", name, level));
    }
    ctx.messages
        .character_output(&character.name, OutputCategory::Normal, lines.join("\n"));
    Ok(())
}

pub fn friends(ctx: &mut CommandCtx, character: &mut Character, args: &str) -> CommandResult {
    let mut parts = args.splitn(2, |c: char| c.is_whitespace());
    let sub = parts.next().unwrap_or_default().to_lowercase();
    let rest = parts.next().unwrap_or_default().trim();

    match sub.as_str() {
        "" | "list" => {
            if character.friends.names.is_empty() {
                ctx.messages.character_output(
                    &character.name,
                    OutputCategory::Normal,
                    "Your friends list is empty.",
                );
                return Ok(());
            }
            let mut lines = vec!["Friends:".to_string()];
            for friend in character.friends.names.clone() {
                let status = if ctx.sessions.connection_for_character(&friend).is_some() {
                    "online"
                } else {
                    "offline"
                };
                let mut line = format!("  {} ({})", friend, status);
                if let Some(note) = character.friends.note(&friend) {
                    line.push_str(&format!(" — {}", note));
                }
                lines.push(line);
            }
            ctx.messages
                .character_output(&character.name, OutputCategory::Normal, lines.join("\n"));
            Ok(())
        }
        "add" => {
            let target = storage::name::canonicalize(
                rest,
                ctx.config.name_min_len,
                ctx.config.name_max_len,
            )
            .map_err(|error| warning(error.to_string()))?;
            if target == character.name {
                return Err(warning("You are already your own best friend."));
            }
            if !storage::character::exists(ctx.storage, &target) {
                return Err(warning(format!("No character named {} exists.", target)));
            }
            if !character.friends.add(target.clone()) {
                return Err(warning(format!("{} is already on your list.", target)));
            }
            ctx.messages.character_output(
                &character.name,
                OutputCategory::Success,
                format!("{} added to your friends.", target),
            );
            persist(ctx, character);
            Ok(())
        }
        "remove" => {
            let target = storage::name::canonicalize(
                rest,
                ctx.config.name_min_len,
                ctx.config.name_max_len,
            )
            .map_err(|error| warning(error.to_string()))?;
            if !character.friends.remove(&target) {
                return Err(warning(format!("{} is not on your list.", target)));
            }
            ctx.messages.character_output(
                &character.name,
                OutputCategory::Success,
                format!("{} removed from your friends.", target),
            );
            persist(ctx, character);
            Ok(())
        }
        "note" => {
            let mut note_parts = rest.splitn(2, |c: char| c.is_whitespace());
            let target_word = note_parts.next().unwrap_or_default();
            let note = note_parts.next().unwrap_or_default().trim();
            if target_word.is_empty() || note.is_empty() {
                return Err(warning("Usage: friends note <name> <text>"));
            }
            let target = storage::name::canonicalize(
                target_word,
                ctx.config.name_min_len,
                ctx.config.name_max_len,
            )
            .map_err(|error| warning(error.to_string()))?;
            if !character.friends.set_note(&target, note.to_string()) {
                return Err(warning(format!("{} is not on your list.", target)));
            }
            ctx.messages.character_output(
                &character.name,
                OutputCategory::Success,
                format!("Note saved for {}.", target),
            );
            persist(ctx, character);
            Ok(())
        }
        _ => Err(warning("Usage: friends [add|remove|note] ...")),
    }
}
