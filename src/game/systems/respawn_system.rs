use log::debug;

use crate::data::GameData;
use crate::game::messages::OutputCategory;
use crate::game::resources::{RespawnList, ServerMessages, WorldState};

/// Re-creates enemy instances whose respawn time has arrived. Entries whose
/// template or room no longer exists drop silently.
pub fn respawn_system(
    data: &GameData,
    world: &mut WorldState,
    respawns: &mut RespawnList,
    messages: &mut ServerMessages,
    now: u64,
) {
    for respawn in respawns.take_due(now) {
        if data.get_enemy(&respawn.enemy).is_none() {
            debug!(
                "dropping respawn of {} in {}: template is gone",
                respawn.enemy, respawn.room
            );
            continue;
        }
        if world.spawn_enemy(data, &respawn.room, &respawn.enemy).is_some() {
            messages.room_output(
                &respawn.room,
                None,
                OutputCategory::Normal,
                format!("A {} prowls back in.", data.enemy_name(&respawn.enemy)),
            );
        }
    }
}
