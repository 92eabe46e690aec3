pub mod combat_system;
pub mod command_system;
pub mod game_server;
pub mod passive_recovery_system;
pub mod respawn_system;
pub mod save_system;
