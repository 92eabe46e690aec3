use log::{error, warn};

use crate::config::ServerConfig;
use crate::data::GameData;
use crate::game::components::Character;
use crate::game::storage::{self, StorageDirs};

/// The one save entry point: reconciles collect-objective progress against
/// live inventory, then writes the record with bounded retries. A save that
/// exhausts its retries is an operator problem; the in-memory character is
/// untouched and the next save point tries again.
pub fn save_character(
    storage_dirs: &StorageDirs,
    config: &ServerConfig,
    data: &GameData,
    character: &mut Character,
) -> bool {
    {
        let Character {
            quest_log,
            inventory,
            ..
        } = character;
        quest_log.reconcile_collect(data, inventory);
    }

    let attempts = config.save_retry_limit.max(1);
    for attempt in 1..=attempts {
        match storage::character::save(storage_dirs, character) {
            Ok(()) => return true,
            Err(err) => {
                warn!(
                    "save attempt {}/{} for character {} failed: {}",
                    attempt, attempts, character.name, err
                );
            }
        }
    }

    error!(
        "giving up on saving character {} after {} attempts; record kept in memory",
        character.name, attempts
    );
    false
}
