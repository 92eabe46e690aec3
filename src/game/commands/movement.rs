use crate::data::{Direction, ObjectiveKind, RoomId};
use crate::game::components::Character;
use crate::game::messages::OutputCategory;

use super::{
    describe_room, emit_quest_progress, persist, room_template, warning, CommandCtx, CommandResult,
};

/// Moves the character to `dest`, emitting departure, arrival, and the
/// mover's auto-look in that order, then visit progress. Shared between
/// walking and a successful flee.
pub(crate) fn relocate(
    ctx: &mut CommandCtx,
    character: &mut Character,
    dest_id: RoomId,
    departure_text: String,
) -> CommandResult {
    let dest = ctx.data.get_room(&dest_id).ok_or_else(|| {
        super::CommandError::Internal(anyhow::anyhow!("exit leads to unknown room {}", dest_id))
    })?;

    let from = character.position.room.clone();
    ctx.messages
        .room_output(&from, Some(&character.name), OutputCategory::Normal, departure_text);

    ctx.world.move_character(&from, &dest_id, &character.name);
    character.position.room = dest_id.clone();
    if let Some(coords) = dest.coords {
        character.position.coords = coords;
    }

    ctx.messages.room_output(
        &dest_id,
        Some(&character.name),
        OutputCategory::Normal,
        format!("{} arrives.", character.name),
    );

    let look = describe_room(ctx.data, ctx.world, character);
    ctx.messages
        .character_output(&character.name, OutputCategory::Normal, look);

    let updates = character.quest_log.record_progress(
        ctx.data,
        ObjectiveKind::Visit,
        dest_id.as_str(),
        1,
    );
    emit_quest_progress(ctx.messages, ctx.data, &character.name, &updates);

    persist(ctx, character);
    Ok(())
}

pub fn move_direction(
    ctx: &mut CommandCtx,
    character: &mut Character,
    direction: Direction,
) -> CommandResult {
    if character.in_combat {
        return Err(warning("You can't leave while in combat!"));
    }

    let room = room_template(ctx.data, character)?;
    let Some(dest_id) = room.exits.get(&direction).cloned() else {
        return Err(warning(format!("You can't go {}.", direction)));
    };

    let departure = format!("{} leaves {}.", character.name, direction);
    relocate(ctx, character, dest_id, departure)
}

pub fn go(ctx: &mut CommandCtx, character: &mut Character, args: &str) -> CommandResult {
    let word = args.trim().to_lowercase();
    let Some(direction) = Direction::parse(&word) else {
        return Err(warning("Go where? Try north, south, east or west."));
    };
    move_direction(ctx, character, direction)
}
