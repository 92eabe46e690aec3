use rand::prelude::SliceRandom;
use rand::Rng;

use crate::data::{Direction, RoomId};
use crate::game::components::Character;
use crate::game::messages::OutputCategory;
use crate::game::resources::{CombatSession, EnemyInstanceId};
use crate::game::systems::combat_system::{
    flee_free_strike, remove_player_from_combat, resolve_death, LeaveReason,
};

use super::{echo_canonical, fuzzy, movement, persist, room_template, warning, CommandCtx, CommandResult};

pub fn attack(ctx: &mut CommandCtx, character: &mut Character, args: &str) -> CommandResult {
    if args.is_empty() {
        return Err(warning("Attack what?"));
    }
    if character.in_combat {
        return Err(warning("You are already in combat!"));
    }

    let room_id = character.position.room.clone();
    let candidates: Vec<(EnemyInstanceId, String)> = ctx
        .world
        .room(&room_id)
        .map(|room| {
            room.enemies
                .iter()
                .filter(|enemy| enemy.is_alive())
                .map(|enemy| (enemy.id, ctx.data.enemy_name(&enemy.template).to_string()))
                .collect()
        })
        .unwrap_or_default();

    let Some(matched) = fuzzy::best(args, candidates) else {
        return Err(warning("You don't see that here."));
    };
    let target_id = matched.value;

    let enemy_name = ctx
        .world
        .room(&room_id)
        .and_then(|room| room.live_enemy(target_id))
        .map(|enemy| ctx.data.enemy_name(&enemy.template).to_string())
        .ok_or_else(|| warning("You don't see that here."))?;

    if let Some(session) = ctx.combat.session_mut(&room_id) {
        // Join the room's ongoing fight.
        if !session.contains_player(&character.name) {
            for player in session.players.clone() {
                ctx.messages.character_output(
                    &player,
                    OutputCategory::Combat,
                    format!("{} joins the fight!", character.name),
                );
            }
            session.players.push(character.name.clone());
        }
        if !session.contains_enemy(target_id) {
            session.enemies.push(target_id);
        }
    } else {
        ctx.combat.insert(CombatSession {
            room: room_id.clone(),
            players: vec![character.name.clone()],
            enemies: vec![target_id],
            round: 0,
            started_tick: ctx.time.ticks,
        });
    }

    character.in_combat = true;

    if !matched.is_exact() {
        echo_canonical(ctx.messages, &character.name, &enemy_name);
    }
    ctx.messages.character_output(
        &character.name,
        OutputCategory::Combat,
        format!("You attack the {}!", enemy_name),
    );
    ctx.messages.room_output(
        &room_id,
        Some(&character.name),
        OutputCategory::Combat,
        format!("{} attacks the {}!", character.name, enemy_name),
    );
    Ok(())
}

pub fn flee(ctx: &mut CommandCtx, character: &mut Character) -> CommandResult {
    if !character.in_combat {
        return Err(warning("You are not in combat."));
    }

    let name = character.name.clone();
    let room_id = character.position.room.clone();

    if ctx.rng.gen::<f32>() < ctx.config.flee_success_chance {
        remove_player_from_combat(
            ctx.world,
            ctx.combat,
            ctx.sessions,
            ctx.messages,
            &name,
            LeaveReason::Flee,
        );
        character.in_combat = false;
        ctx.messages
            .character_output(&name, OutputCategory::Success, "You flee from the fight!");

        let exits: Vec<(Direction, RoomId)> = room_template(ctx.data, character)?
            .exits
            .iter()
            .map(|(direction, dest)| (*direction, dest.clone()))
            .collect();

        if let Some((direction, dest)) = exits.choose(ctx.rng).cloned() {
            let departure = format!("{} flees {}!", name, direction);
            movement::relocate(ctx, character, dest, departure)?;
        } else {
            // Nowhere to run: the escape still succeeds, in place.
            ctx.messages.room_output(
                &room_id,
                Some(&name),
                OutputCategory::Combat,
                format!("{} breaks away from the fight.", name),
            );
            persist(ctx, character);
        }
    } else {
        ctx.messages
            .character_output(&name, OutputCategory::Warning, "You fail to get away!");
        flee_free_strike(
            ctx.data,
            ctx.config,
            ctx.world,
            ctx.combat,
            ctx.messages,
            ctx.rng,
            character,
        );
        if !character.is_alive() {
            remove_player_from_combat(
                ctx.world,
                ctx.combat,
                ctx.sessions,
                ctx.messages,
                &name,
                LeaveReason::Death,
            );
            resolve_death(ctx.data, ctx.config, ctx.world, ctx.messages, character);
        }
        persist(ctx, character);
    }

    Ok(())
}
