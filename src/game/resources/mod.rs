pub mod combat;
pub mod server_messages;
pub mod sessions;
pub mod world_state;
pub mod world_time;

pub use combat::{CombatList, CombatSession, PendingRespawn, RespawnList};
pub use server_messages::{PendingMessage, ServerMessages};
pub use sessions::{ConnectionId, Session, SessionRegistry, SessionState};
pub use world_state::{EnemyInstance, EnemyInstanceId, LiveRoom, WorldState};
pub use world_time::WorldTime;
