use crate::data::ItemId;
use crate::game::components::Character;
use crate::game::messages::OutputCategory;

use super::{echo_canonical, fuzzy, persist, warning, CommandCtx, CommandResult};

pub fn equip(ctx: &mut CommandCtx, character: &mut Character, args: &str) -> CommandResult {
    if args.is_empty() {
        return Err(warning("Equip what?"));
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
    let Some(slot) = item.slot else {
        return Err(warning(format!("You can't equip the {}.", item.name)));
    };
    if character.equipment.is_equipped(&item_id) {
        return Err(warning(format!("The {} is already equipped.", item.name)));
    }

    character
        .equipment
        .equip(slot, item_id)
        .map_err(|error| warning(error.to_string()))?;

    if !exact {
        echo_canonical(ctx.messages, &character.name, &item.name);
    }
    ctx.messages.character_output(
        &character.name,
        OutputCategory::Success,
        format!("You equip the {} ({}).", item.name, slot.display_name()),
    );

    persist(ctx, character);
    Ok(())
}

pub fn unequip(ctx: &mut CommandCtx, character: &mut Character, args: &str) -> CommandResult {
    if args.is_empty() {
        return Err(warning("Unequip what?"));
    }

    let candidates: Vec<(crate::data::EquipmentSlot, String)> = character
        .equipment
        .iter_equipped()
        .map(|(slot, item)| (slot, ctx.data.item_name(item).to_string()))
        .collect();
    let Some(matched) = fuzzy::best(args, candidates) else {
        return Err(warning("You don't have that equipped."));
    };

    let item_id = character
        .equipment
        .unequip(matched.value)
        .map_err(|error| warning(error.to_string()))?;

    let name = ctx.data.item_name(&item_id).to_string();
    if !matched.is_exact() {
        echo_canonical(ctx.messages, &character.name, &name);
    }
    ctx.messages.character_output(
        &character.name,
        OutputCategory::Success,
        format!("You unequip the {}.", name),
    );

    persist(ctx, character);
    Ok(())
}

pub fn show_equipment(ctx: &mut CommandCtx, character: &mut Character) -> CommandResult {
    let mut lines = vec!["Equipment:".to_string()];
    for (slot, item) in character.equipment.slots.iter() {
        let name = item
            .as_ref()
            .map_or("-", |item| ctx.data.item_name(item));
        lines.push(format!("  {:<10} {}", slot.display_name(), name));
    }

    let derived = character.derived_stats(ctx.data);
    lines.push(format!(
        "Totals: damage {}, defense {}, speed {}, max health {}",
        derived.damage, derived.defense, derived.speed, derived.max_health
    ));

    ctx.messages
        .character_output(&character.name, OutputCategory::Normal, lines.join("\n"));
    Ok(())
}
