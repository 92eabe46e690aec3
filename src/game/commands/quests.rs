use crate::data::{ItemId, ObjectiveKind, QuestData, QuestId};
use crate::game::components::Character;
use crate::game::messages::OutputCategory;

use super::{
    context::{CommandContext, ContextKey},
    echo_canonical, fuzzy, persist, room_template, warning, CommandCtx, CommandResult,
};

fn quest_by_id<'a>(ctx: &'a CommandCtx, id: &QuestId) -> Result<&'a QuestData, super::CommandError> {
    ctx.data
        .get_quest(id)
        .ok_or_else(|| warning("That quest no longer exists."))
}

/// Resolves `<quest|number>` against a context list first, then by fuzzy
/// name over `candidates`.
fn resolve_quest_arg(
    context: &CommandContext,
    key: ContextKey,
    candidates: Vec<(QuestId, String)>,
    args: &str,
) -> Option<(QuestId, bool)> {
    if let Ok(number) = args.trim().parse::<usize>() {
        return context
            .resolve_number(key, number)
            .map(|quest| (quest.clone(), true));
    }
    fuzzy::best(args, candidates).map(|matched| {
        let exact = matched.is_exact();
        (matched.value, exact)
    })
}

fn active_quest_candidates(ctx: &CommandCtx, character: &Character) -> Vec<(QuestId, String)> {
    character
        .quest_log
        .active
        .iter()
        .filter_map(|active| {
            ctx.data
                .get_quest(&active.quest)
                .map(|quest| (quest.id.clone(), quest.name.clone()))
        })
        .collect()
}

fn describe_active_quest(ctx: &CommandCtx, character: &Character, quest: &QuestData) -> String {
    let mut lines = vec![format!("{} (level {})", quest.name, quest.level)];
    if !quest.description.is_empty() {
        lines.push(quest.description.clone());
    }
    if let Some(active) = character.quest_log.get_active(&quest.id) {
        for (objective, progress) in quest.objectives.iter().zip(active.objectives.iter()) {
            lines.push(format!(
                "  {} — {}/{}",
                objective.describe(),
                progress.current,
                objective.quantity
            ));
        }
    }
    lines.join("\n")
}

pub fn quest(
    ctx: &mut CommandCtx,
    character: &mut Character,
    context: &mut CommandContext,
    args: &str,
) -> CommandResult {
    if let Some(rest) = args.strip_prefix("info") {
        let rest = rest.trim();
        if rest.is_empty() {
            return Err(warning("Usage: quest info <name>"));
        }
        let candidates = active_quest_candidates(ctx, character);
        let Some(matched) = fuzzy::best(rest, candidates) else {
            return Err(warning("You don't have that quest."));
        };
        let quest = quest_by_id(ctx, &matched.value)?.clone();
        if !matched.is_exact() {
            echo_canonical(ctx.messages, &character.name, &quest.name);
        }
        let text = describe_active_quest(ctx, character, &quest);
        ctx.messages
            .character_output(&character.name, OutputCategory::Normal, text);
        return Ok(());
    }

    if let Some(rest) = args.strip_prefix("complete") {
        return turn_in(ctx, character, rest.trim());
    }

    if !args.is_empty() && args != "list" {
        return Err(warning("Usage: quest [list|info <name>|complete <name>]"));
    }

    if character.quest_log.active.is_empty() {
        ctx.messages.character_output(
            &character.name,
            OutputCategory::Normal,
            "You have no active quests.",
        );
        return Ok(());
    }

    let mut lines = vec!["Active quests:".to_string()];
    let mut numbered = Vec::new();
    for (index, active) in character.quest_log.active.iter().enumerate() {
        let Some(quest) = ctx.data.get_quest(&active.quest) else {
            continue;
        };
        let done = quest
            .objectives
            .iter()
            .zip(active.objectives.iter())
            .filter(|(objective, progress)| progress.current >= objective.quantity)
            .count();
        lines.push(format!(
            "  {}) {} ({}/{} objectives)",
            index + 1,
            quest.name,
            done,
            quest.objectives.len()
        ));
        numbered.push(quest.id.clone());
    }
    context.set(ContextKey::NumberedQuests, numbered);

    ctx.messages
        .character_output(&character.name, OutputCategory::Normal, lines.join("\n"));
    Ok(())
}

pub fn accept(
    ctx: &mut CommandCtx,
    character: &mut Character,
    context: &mut CommandContext,
    args: &str,
) -> CommandResult {
    if args.is_empty() {
        return Err(warning("Accept what?"));
    }

    let room = room_template(ctx.data, character)?;
    let room_npcs = room.npcs.clone();

    // Quests offerable in this room, for name matching.
    let mut candidates: Vec<(QuestId, String)> = Vec::new();
    for npc_id in &room_npcs {
        let Some(npc) = ctx.data.get_npc(npc_id) else {
            continue;
        };
        for quest_id in &npc.quests {
            if let Some(quest) = ctx.data.get_quest(quest_id) {
                candidates.push((quest.id.clone(), quest.name.clone()));
            }
        }
    }

    let Some((quest_id, exact)) =
        resolve_quest_arg(context, ContextKey::OfferedQuests, candidates, args)
    else {
        return Err(warning("No one here is offering that quest."));
    };
    let quest = quest_by_id(ctx, &quest_id)?.clone();

    // Co-location with the giver, also for numbered shorthand.
    if !room_npcs.contains(&quest.giver) {
        return Err(warning("The quest giver isn't here."));
    }

    if character.quest_log.is_active(&quest.id) {
        return Err(warning("You already have that quest."));
    }
    if !quest.repeatable && character.quest_log.is_completed(&quest.id) {
        return Err(warning("You have already completed that quest."));
    }
    if character.level.level < quest.prerequisites.level.max(quest.level) {
        return Err(warning(format!(
            "You must be level {} to accept {}.",
            quest.prerequisites.level.max(quest.level),
            quest.name
        )));
    }
    for required in &quest.prerequisites.quests {
        if !character.quest_log.is_completed(required) {
            let name = ctx
                .data
                .get_quest(required)
                .map_or(required.as_str(), |quest| quest.name.as_str());
            return Err(warning(format!("You must first complete {}.", name)));
        }
    }
    for required in &quest.prerequisites.items {
        if !character.inventory.has(required, 1) {
            return Err(warning(format!(
                "You need a {} before taking this on.",
                ctx.data.item_name(required)
            )));
        }
    }

    // Starter items are granted atomically with acceptance: stage the adds
    // on a copy so a full inventory rejects the whole accept.
    let mut staged = character.inventory.clone();
    for objective in &quest.objectives {
        if objective.kind == ObjectiveKind::Collect && objective.given_by_quest_giver {
            let item_id = ItemId::new(&objective.target);
            let stackable = ctx
                .data
                .get_item(&item_id)
                .map_or(true, |item| item.stackable);
            staged
                .try_add(
                    &item_id,
                    objective.quantity,
                    stackable,
                    ctx.config.inventory_capacity,
                )
                .map_err(|_| warning("You need more inventory space for the quest items."))?;
        }
    }

    character.inventory = staged;
    character.quest_log.start(&quest);
    character
        .quest_log
        .reconcile_collect(ctx.data, &character.inventory);

    if !exact {
        echo_canonical(ctx.messages, &character.name, &quest.name);
    }
    if !quest.dialogue.offer.is_empty() {
        ctx.messages
            .character_output(&character.name, OutputCategory::Normal, quest.dialogue.offer.clone());
    }
    ctx.messages.character_output(
        &character.name,
        OutputCategory::Success,
        format!("Quest accepted: {}", quest.name),
    );

    persist(ctx, character);
    Ok(())
}

pub fn abandon(
    ctx: &mut CommandCtx,
    character: &mut Character,
    context: &mut CommandContext,
    args: &str,
) -> CommandResult {
    if args.is_empty() {
        return Err(warning("Abandon what?"));
    }

    let candidates = active_quest_candidates(ctx, character);
    let Some((quest_id, exact)) =
        resolve_quest_arg(context, ContextKey::NumberedQuests, candidates, args)
    else {
        return Err(warning("You don't have that quest."));
    };
    let quest = quest_by_id(ctx, &quest_id)?.clone();

    if character.quest_log.abandon(&quest.id).is_none() {
        return Err(warning("You don't have that quest."));
    }

    // Quest-giver-granted collect items are taken back, up to however many
    // are still held.
    for objective in &quest.objectives {
        if objective.kind == ObjectiveKind::Collect && objective.given_by_quest_giver {
            let item_id = ItemId::new(&objective.target);
            let mut removable = character.inventory.count(&item_id).min(objective.quantity);
            if character.equipment.is_equipped(&item_id) && removable > 0 {
                removable = removable.saturating_sub(1);
            }
            if removable > 0 {
                character.inventory.try_remove(&item_id, removable).ok();
            }
        }
    }

    if !exact {
        echo_canonical(ctx.messages, &character.name, &quest.name);
    }
    ctx.messages.character_output(
        &character.name,
        OutputCategory::Success,
        format!("Quest abandoned: {}", quest.name),
    );

    persist(ctx, character);
    Ok(())
}

pub fn turn_in(ctx: &mut CommandCtx, character: &mut Character, args: &str) -> CommandResult {
    if args.is_empty() {
        return Err(warning("Turn in which quest?"));
    }

    let candidates = active_quest_candidates(ctx, character);
    let Some(matched) = fuzzy::best(args, candidates) else {
        return Err(warning("You don't have that quest."));
    };
    let quest = quest_by_id(ctx, &matched.value)?.clone();

    let room = room_template(ctx.data, character)?;
    if !room.npcs.contains(quest.turn_in_npc()) {
        let npc_name = ctx
            .data
            .get_npc(quest.turn_in_npc())
            .map_or("the quest giver", |npc| npc.name.as_str());
        return Err(warning(format!("You must return to {} to finish this.", npc_name)));
    }

    if !character.quest_log.objectives_satisfied(&quest) {
        let text = if quest.dialogue.progress.is_empty() {
            format!("You haven't finished {} yet.", quest.name)
        } else {
            quest.dialogue.progress.clone()
        };
        return Err(warning(text));
    }

    // Stage the whole exchange so it commits or fails as one unit: collect
    // objective items out, reward items in.
    let mut staged = character.inventory.clone();
    for objective in &quest.objectives {
        if objective.kind != ObjectiveKind::Collect {
            continue;
        }
        let item_id = ItemId::new(&objective.target);
        let equipped = u32::from(character.equipment.is_equipped(&item_id));
        let spare = staged.count(&item_id).saturating_sub(equipped);
        if spare < objective.quantity {
            return Err(warning(format!(
                "Unequip the {} before handing it over.",
                ctx.data.item_name(&item_id)
            )));
        }
        staged
            .try_remove(&item_id, objective.quantity)
            .map_err(|_| warning("You no longer have the required items."))?;
    }
    for item_id in &quest.rewards.items {
        let stackable = ctx.data.get_item(item_id).map_or(true, |item| item.stackable);
        staged
            .try_add(item_id, 1, stackable, ctx.config.inventory_capacity)
            .map_err(|_| warning("You need more inventory space for the rewards."))?;
    }

    character.inventory = staged;
    character.gold = character.gold.saturating_add(quest.rewards.gold);
    let level_result = character.add_experience(quest.rewards.experience);
    character.quest_log.complete(&quest.id);
    character
        .quest_log
        .reconcile_collect(ctx.data, &character.inventory);

    if !matched.is_exact() {
        echo_canonical(ctx.messages, &character.name, &quest.name);
    }
    if !quest.dialogue.complete.is_empty() {
        ctx.messages.character_output(
            &character.name,
            OutputCategory::Normal,
            quest.dialogue.complete.clone(),
        );
    }
    ctx.messages.character_output(
        &character.name,
        OutputCategory::Success,
        format!(
            "Quest complete: {}! You gain {} experience and {} gold.",
            quest.name, quest.rewards.experience, quest.rewards.gold
        ),
    );
    for item_id in &quest.rewards.items {
        ctx.messages.character_output(
            &character.name,
            OutputCategory::Loot,
            format!("You receive a {}.", ctx.data.item_name(item_id)),
        );
    }
    if level_result.levels_gained > 0 {
        ctx.messages.character_output(
            &character.name,
            OutputCategory::Success,
            format!("You are now level {}!", character.level.level),
        );
    }

    persist(ctx, character);
    Ok(())
}
