use crate::data::{ItemId, ItemKind};
use crate::game::components::{Character, InventoryError};
use crate::game::messages::OutputCategory;

use super::{echo_canonical, fuzzy, persist, room_template, warning, CommandCtx, CommandResult};

pub fn show_inventory(ctx: &mut CommandCtx, character: &mut Character) -> CommandResult {
    let mut lines = vec!["You are carrying:".to_string()];
    if character.inventory.is_empty() {
        lines.push("  nothing".to_string());
    }
    for entry in character.inventory.iter() {
        let name = ctx.data.item_name(&entry.item);
        let mut line = if entry.quantity > 1 {
            format!("  {} x{}", name, entry.quantity)
        } else {
            format!("  {}", name)
        };
        if character.equipment.is_equipped(&entry.item) {
            line.push_str(" (equipped)");
        }
        lines.push(line);
    }
    lines.push(format!("Gold: {}", character.gold));
    ctx.messages
        .character_output(&character.name, OutputCategory::Normal, lines.join("\n"));
    Ok(())
}

enum TakeSource {
    Floor(ItemId),
    OneTime(ItemId),
}

pub fn take(ctx: &mut CommandCtx, character: &mut Character, args: &str) -> CommandResult {
    if args.is_empty() {
        return Err(warning("Take what?"));
    }

    let room = room_template(ctx.data, character)?;
    let room_id = room.id.clone();

    let mut candidates: Vec<(TakeSource, String)> = Vec::new();
    if let Some(live) = ctx.world.room(&room_id) {
        for (item, _) in &live.floor_items {
            candidates.push((
                TakeSource::Floor(item.clone()),
                ctx.data.item_name(item).to_string(),
            ));
        }
    }
    for item in &room.items {
        if !character.has_taken_room_item(&room_id, item) {
            candidates.push((
                TakeSource::OneTime(item.clone()),
                ctx.data.item_name(item).to_string(),
            ));
        }
    }

    let Some(matched) = fuzzy::best(args, candidates) else {
        return Err(warning("You don't see that here."));
    };

    let item_id = match &matched.value {
        TakeSource::Floor(item) | TakeSource::OneTime(item) => item.clone(),
    };
    let Some(item) = ctx.data.get_item(&item_id) else {
        return Err(warning("You don't see that here."));
    };

    character
        .inventory
        .try_add(&item_id, 1, item.stackable, ctx.config.inventory_capacity)
        .map_err(|_| warning("Your inventory is full."))?;

    match matched.value {
        TakeSource::Floor(_) => {
            ctx.world.take_floor_item(&room_id, &item_id, 1);
        }
        TakeSource::OneTime(_) => {
            character
                .taken_one_time_items
                .insert(Character::one_time_key(&room_id, item_id.as_str()));
        }
    }

    if !matched.is_exact() {
        echo_canonical(ctx.messages, &character.name, &item.name);
    }
    ctx.messages.character_output(
        &character.name,
        OutputCategory::Success,
        format!("You take the {}.", item.name),
    );
    ctx.messages.room_output(
        &room_id,
        Some(&character.name),
        OutputCategory::Normal,
        format!("{} picks up a {}.", character.name, item.name),
    );

    persist(ctx, character);
    Ok(())
}

pub fn drop_item(ctx: &mut CommandCtx, character: &mut Character, args: &str) -> CommandResult {
    if args.is_empty() {
        return Err(warning("Drop what?"));
    }

    let candidates: Vec<(ItemId, String)> = character
        .inventory
        .iter()
        .map(|entry| (entry.item.clone(), ctx.data.item_name(&entry.item).to_string()))
        .collect();
    let Some(matched) = fuzzy::best(args, candidates) else {
        return Err(warning("You aren't carrying that."));
    };
    let exact = matched.is_exact();
    let item_id = matched.value;

    // The equipped copy stays put until it is unequipped.
    if character.equipment.is_equipped(&item_id) && character.inventory.count(&item_id) <= 1 {
        return Err(warning("You'll have to unequip it first."));
    }

    match character.inventory.try_remove(&item_id, 1) {
        Ok(()) => {}
        Err(InventoryError::NotEnoughItems) => return Err(warning("You aren't carrying that.")),
        Err(error) => return Err(super::CommandError::Internal(anyhow::anyhow!(error))),
    }

    let room_id = character.position.room.clone();
    ctx.world.drop_item(&room_id, &item_id, 1);

    let name = ctx.data.item_name(&item_id).to_string();
    if !exact {
        echo_canonical(ctx.messages, &character.name, &name);
    }
    ctx.messages.character_output(
        &character.name,
        OutputCategory::Success,
        format!("You drop the {}.", name),
    );
    ctx.messages.room_output(
        &room_id,
        Some(&character.name),
        OutputCategory::Normal,
        format!("{} drops a {}.", character.name, name),
    );

    persist(ctx, character);
    Ok(())
}

pub fn use_item(ctx: &mut CommandCtx, character: &mut Character, args: &str) -> CommandResult {
    if args.is_empty() {
        return Err(warning("Use what?"));
    }

    let candidates: Vec<(ItemId, String)> = character
        .inventory
        .iter()
        .map(|entry| (entry.item.clone(), ctx.data.item_name(&entry.item).to_string()))
        .collect();
    let Some(matched) = fuzzy::best(args, candidates) else {
        return Err(warning("You aren't carrying that."));
    };
    let exact = matched.is_exact();
    let item_id = matched.value;

    let Some(item) = ctx.data.get_item(&item_id) else {
        return Err(warning("You aren't carrying that."));
    };
    if item.kind != ItemKind::Consumable {
        return Err(warning(format!("You can't use the {}.", item.name)));
    }
    let Some(effect) = item.effects else {
        return Err(warning(format!("The {} has no effect.", item.name)));
    };

    character
        .inventory
        .try_remove(&item_id, 1)
        .map_err(|_| warning("You aren't carrying that."))?;

    let max_health = character.derived_stats(ctx.data).max_health;
    let healed = character.heal(effect.restore_health, max_health);

    if !exact {
        echo_canonical(ctx.messages, &character.name, &item.name);
    }
    ctx.messages.character_output(
        &character.name,
        OutputCategory::Success,
        format!(
            "You use the {} and recover {} health ({}/{}).",
            item.name, healed, character.health.hp, max_health
        ),
    );

    persist(ctx, character);
    Ok(())
}
