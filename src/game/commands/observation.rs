use crate::data::{EnemyId, ItemId, NpcId};
use crate::game::components::Character;
use crate::game::messages::OutputCategory;

use super::{
    describe_room, echo_canonical, fuzzy, room_template, warning, CommandCtx, CommandResult,
};

enum LookTarget {
    Item(ItemId),
    Npc(NpcId),
    Enemy(EnemyId),
    Player(String),
}

/// Candidates in room-first order: room items, NPCs, enemies, other
/// players, then the character's own inventory.
fn find_target(
    ctx: &CommandCtx,
    character: &Character,
    query: &str,
) -> Option<fuzzy::FuzzyMatch<LookTarget>> {
    let room = ctx.data.get_room(&character.position.room)?;
    let mut candidates: Vec<(LookTarget, String)> = Vec::new();

    for item in &room.items {
        if !character.has_taken_room_item(&room.id, item) {
            candidates.push((
                LookTarget::Item(item.clone()),
                ctx.data.item_name(item).to_string(),
            ));
        }
    }
    if let Some(live) = ctx.world.room(&room.id) {
        for (item, _) in &live.floor_items {
            candidates.push((
                LookTarget::Item(item.clone()),
                ctx.data.item_name(item).to_string(),
            ));
        }
    }
    for npc in &room.npcs {
        if let Some(npc_data) = ctx.data.get_npc(npc) {
            candidates.push((LookTarget::Npc(npc.clone()), npc_data.name.clone()));
        }
    }
    if let Some(live) = ctx.world.room(&room.id) {
        for enemy in live.enemies.iter().filter(|enemy| enemy.is_alive()) {
            candidates.push((
                LookTarget::Enemy(enemy.template.clone()),
                ctx.data.enemy_name(&enemy.template).to_string(),
            ));
        }
    }
    for name in ctx.world.characters_in_room(&room.id) {
        if name != character.name {
            candidates.push((LookTarget::Player(name.to_string()), name.to_string()));
        }
    }
    for entry in character.inventory.iter() {
        candidates.push((
            LookTarget::Item(entry.item.clone()),
            ctx.data.item_name(&entry.item).to_string(),
        ));
    }

    fuzzy::best(query, candidates)
}

fn describe_target(ctx: &CommandCtx, target: &LookTarget, detailed: bool) -> String {
    match target {
        LookTarget::Item(item_id) => match ctx.data.get_item(item_id) {
            Some(item) => {
                let mut text = if item.description.is_empty() {
                    format!("{}. Nothing unusual about it.", item.name)
                } else {
                    format!("{}. {}", item.name, item.description)
                };
                if detailed {
                    let stats = &item.stats;
                    let mut parts = Vec::new();
                    if stats.damage != 0 {
                        parts.push(format!("damage {:+}", stats.damage));
                    }
                    if stats.defense != 0 {
                        parts.push(format!("defense {:+}", stats.defense));
                    }
                    if stats.speed != 0 {
                        parts.push(format!("speed {:+}", stats.speed));
                    }
                    if stats.health != 0 {
                        parts.push(format!("health {:+}", stats.health));
                    }
                    if let Some(slot) = item.slot {
                        parts.push(format!("slot: {}", slot.display_name()));
                    }
                    parts.push(format!("value: {} gold", item.value));
                    if !parts.is_empty() {
                        text.push_str(&format!("\n[{}]", parts.join(", ")));
                    }
                }
                text
            }
            None => "You see nothing special.".to_string(),
        },
        LookTarget::Npc(npc_id) => ctx.data.get_npc(npc_id).map_or_else(
            || "You see nothing special.".to_string(),
            |npc| {
                if npc.description.is_empty() {
                    format!("{} stands here.", npc.name)
                } else {
                    npc.description.clone()
                }
            },
        ),
        LookTarget::Enemy(enemy_id) => ctx.data.get_enemy(enemy_id).map_or_else(
            || "You see nothing special.".to_string(),
            |enemy| {
                if enemy.description.is_empty() {
                    format!("A {} eyes you warily.", enemy.name)
                } else {
                    enemy.description.clone()
                }
            },
        ),
        LookTarget::Player(name) => {
            let level = ctx
                .sessions
                .character(name)
                .map(|character| character.level.level);
            match level {
                Some(level) => format!("{}, an adventurer of level {}.", name, level),
                None => format!("{}, an adventurer.", name),
            }
        }
    }
}

pub fn look(ctx: &mut CommandCtx, character: &mut Character, args: &str) -> CommandResult {
    if args.is_empty() {
        room_template(ctx.data, character)?;
        let text = describe_room(ctx.data, ctx.world, character);
        ctx.messages
            .character_output(&character.name, OutputCategory::Normal, text);
        return Ok(());
    }

    let Some(matched) = find_target(ctx, character, args) else {
        return Err(warning("You don't see that here."));
    };
    let text = describe_target(ctx, &matched.value, false);
    if !matched.is_exact() {
        let canonical = canonical_name(ctx, &matched.value);
        echo_canonical(ctx.messages, &character.name, &canonical);
    }
    ctx.messages
        .character_output(&character.name, OutputCategory::Normal, text);
    Ok(())
}

pub fn examine(ctx: &mut CommandCtx, character: &mut Character, args: &str) -> CommandResult {
    if args.is_empty() {
        return Err(warning("Examine what?"));
    }

    let Some(matched) = find_target(ctx, character, args) else {
        return Err(warning("You don't see that here."));
    };
    let text = describe_target(ctx, &matched.value, true);
    if !matched.is_exact() {
        let canonical = canonical_name(ctx, &matched.value);
        echo_canonical(ctx.messages, &character.name, &canonical);
    }
    ctx.messages
        .character_output(&character.name, OutputCategory::Normal, text);
    Ok(())
}

fn canonical_name(ctx: &CommandCtx, target: &LookTarget) -> String {
    match target {
        LookTarget::Item(id) => ctx.data.item_name(id).to_string(),
        LookTarget::Npc(id) => ctx
            .data
            .get_npc(id)
            .map_or_else(|| id.to_string(), |npc| npc.name.clone()),
        LookTarget::Enemy(id) => ctx.data.enemy_name(id).to_string(),
        LookTarget::Player(name) => name.clone(),
    }
}
