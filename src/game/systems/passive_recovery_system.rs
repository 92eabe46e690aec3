use crate::config::ServerConfig;
use crate::data::GameData;
use crate::game::messages::OutputCategory;
use crate::game::resources::{ServerMessages, SessionRegistry};

/// Out-of-combat health regeneration, run once per tick. Characters recover
/// a fraction of their derived max health, rounded up, and hear about it
/// once when they top out.
pub fn passive_recovery_system(
    data: &GameData,
    config: &ServerConfig,
    sessions: &mut SessionRegistry,
    messages: &mut ServerMessages,
) {
    for connection_id in sessions.connection_ids() {
        let Some(session) = sessions.get_mut(connection_id) else {
            continue;
        };
        if !session.is_playing() {
            continue;
        }
        let Some(character) = session.character.as_mut() else {
            continue;
        };
        if character.in_combat {
            continue;
        }

        let max_health = character.derived_stats(data).max_health;
        if character.health.hp >= max_health {
            continue;
        }

        let amount = ((max_health as f32) * config.regen_rate_per_tick).ceil() as i32;
        character.health.hp = (character.health.hp + amount).min(max_health);

        if character.health.hp >= max_health {
            let name = character.name.clone();
            messages.character_output(&name, OutputCategory::Success, "You feel fully refreshed.");
        }
    }
}
