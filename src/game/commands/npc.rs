use crate::data::{NpcData, NpcId, ObjectiveKind};
use crate::game::components::Character;
use crate::game::messages::OutputCategory;

use super::{
    context::{CommandContext, ContextKey},
    echo_canonical, emit_quest_progress, fuzzy, persist, room_template, warning, CommandCtx,
    CommandResult,
};

fn find_npc<'a>(
    ctx: &'a CommandCtx,
    character: &Character,
    query: &str,
) -> Result<(fuzzy::FuzzyMatch<NpcId>, &'a NpcData), super::CommandError> {
    let room = room_template(ctx.data, character)?;
    let candidates: Vec<(NpcId, String)> = room
        .npcs
        .iter()
        .filter_map(|npc| {
            ctx.data
                .get_npc(npc)
                .map(|npc_data| (npc.clone(), npc_data.name.clone()))
        })
        .collect();

    let matched =
        fuzzy::best(query, candidates).ok_or_else(|| warning("There is no one here by that name."))?;
    let npc = ctx
        .data
        .get_npc(&matched.value)
        .ok_or_else(|| warning("There is no one here by that name."))?;
    Ok((matched, npc))
}

pub fn talk(
    ctx: &mut CommandCtx,
    character: &mut Character,
    context: &mut CommandContext,
    args: &str,
) -> CommandResult {
    if args.is_empty() {
        return Err(warning("Talk to whom?"));
    }

    let (matched, npc) = find_npc(ctx, character, args)?;
    let npc = npc.clone();
    if !matched.is_exact() {
        echo_canonical(ctx.messages, &character.name, &npc.name);
    }

    if npc.dialogue.greeting.is_empty() {
        ctx.messages.character_output(
            &character.name,
            OutputCategory::Normal,
            format!("{} nods at you.", npc.name),
        );
    } else {
        ctx.messages.character_output(
            &character.name,
            OutputCategory::Normal,
            format!("{} says, \"{}\"", npc.name, npc.dialogue.greeting),
        );
    }

    // Deliver objectives advance by speaking to their target.
    let updates = character.quest_log.record_progress(
        ctx.data,
        ObjectiveKind::Deliver,
        npc.id.as_str(),
        1,
    );
    emit_quest_progress(ctx.messages, ctx.data, &character.name, &updates);

    // Offerable quests: not active, not completed unless repeatable.
    let offered: Vec<_> = npc
        .quests
        .iter()
        .filter(|quest_id| {
            !character.quest_log.is_active(quest_id)
                && ctx.data.get_quest(quest_id).map_or(false, |quest| {
                    quest.repeatable || !character.quest_log.is_completed(quest_id)
                })
        })
        .cloned()
        .collect();

    if !offered.is_empty() {
        let mut lines = vec![format!("{} has work for you:", npc.name)];
        for (index, quest_id) in offered.iter().enumerate() {
            if let Some(quest) = ctx.data.get_quest(quest_id) {
                lines.push(format!("  {}) {} (level {})", index + 1, quest.name, quest.level));
            }
        }
        lines.push("Type 'accept <number>' to take one on.".to_string());
        ctx.messages
            .character_output(&character.name, OutputCategory::Normal, lines.join("\n"));
        context.set(ContextKey::OfferedQuests, offered);
    }

    if !updates.is_empty() {
        persist(ctx, character);
    }
    Ok(())
}

pub fn ask(ctx: &mut CommandCtx, character: &mut Character, args: &str) -> CommandResult {
    // Grammar: ask <npc> about <topic>
    let tokens: Vec<&str> = args.split_whitespace().collect();
    let Some(about_at) = tokens.iter().position(|token| token.eq_ignore_ascii_case("about"))
    else {
        return Err(warning("Usage: ask <npc> about <topic>"));
    };
    let npc_query = tokens[..about_at].join(" ");
    let topic = tokens[about_at + 1..].join(" ");
    if npc_query.is_empty() || topic.is_empty() {
        return Err(warning("Usage: ask <npc> about <topic>"));
    }

    let (matched, npc) = find_npc(ctx, character, &npc_query)?;
    let npc = npc.clone();
    if !matched.is_exact() {
        echo_canonical(ctx.messages, &character.name, &npc.name);
    }

    let text = match npc.response_for_topic(&topic) {
        Some(response) => format!("{} says, \"{}\"", npc.name, response),
        None => format!("{} has nothing to say about that.", npc.name),
    };
    ctx.messages
        .character_output(&character.name, OutputCategory::Normal, text);
    Ok(())
}

pub fn bind(ctx: &mut CommandCtx, character: &mut Character) -> CommandResult {
    let room = room_template(ctx.data, character)?;
    let binder_name = room
        .npcs
        .iter()
        .filter_map(|npc| ctx.data.get_npc(npc))
        .find(|npc| npc.homestone_binder)
        .map(|npc| npc.name.clone());
    let Some(binder_name) = binder_name else {
        return Err(warning("There is no homestone binder here."));
    };

    let room_id = room.id.clone();
    let room_name = room.name.clone();
    character.homestone = Some(room_id);

    ctx.messages.character_output(
        &character.name,
        OutputCategory::Success,
        format!(
            "{} attunes your homestone. You will return to {} when you fall.",
            binder_name, room_name
        ),
    );

    persist(ctx, character);
    Ok(())
}
