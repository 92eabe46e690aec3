use rand::rngs::StdRng;

use crate::config::ServerConfig;
use crate::data::GameData;
use crate::game::commands::{self, CommandCtx, CommandOutcome};
use crate::game::messages::OutputCategory;
use crate::game::resources::{
    CombatList, ConnectionId, RespawnList, ServerMessages, SessionRegistry, WorldState, WorldTime,
};
use crate::game::storage::StorageDirs;

use super::combat_system::{remove_player_from_combat, LeaveReason};

/// Routes one command line for a playing session. The session is taken out
/// of the registry for the duration so the handler can hold the character
/// mutably while reading (or whispering at) everyone else.
pub fn command_system(
    data: &GameData,
    config: &ServerConfig,
    world: &mut WorldState,
    combat: &mut CombatList,
    respawns: &mut RespawnList,
    sessions: &mut SessionRegistry,
    messages: &mut ServerMessages,
    storage: &StorageDirs,
    rng: &mut StdRng,
    time: &WorldTime,
    connection_id: ConnectionId,
    line: &str,
) {
    let Some(mut session) = sessions.take(connection_id) else {
        return;
    };

    let outcome = {
        let mut ctx = CommandCtx {
            data,
            config,
            world: &mut *world,
            combat: &mut *combat,
            respawns: &mut *respawns,
            messages: &mut *messages,
            sessions: &mut *sessions,
            storage,
            rng: &mut *rng,
            time,
        };
        commands::dispatch(&mut ctx, &mut session, line)
    };

    match outcome {
        CommandOutcome::Continue => sessions.restore(session),
        CommandOutcome::Quit => {
            // The handler already saved; finish the disconnect here. Not
            // restoring the session drops its outbound channel, which ends
            // the client task.
            session.send(crate::game::messages::ServerMessage::Output {
                category: OutputCategory::System,
                text: "Farewell, adventurer.".to_string(),
            });
            if let Some(character) = session.character.as_ref() {
                let name = character.name.clone();
                remove_player_from_combat(
                    world,
                    combat,
                    sessions,
                    messages,
                    &name,
                    LeaveReason::Disconnect,
                );
                world.remove_character(&character.position.room, &name);
                sessions.unbind_character(&name);
                messages.global_output(
                    OutputCategory::System,
                    format!("{} has left Embermoor.", name),
                );
            }
        }
    }
}
