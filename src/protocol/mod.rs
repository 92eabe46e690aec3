use thiserror::Error;

pub mod connection;
pub mod server;

pub use connection::{Connection, ConnectionError};
pub use server::GameServer;

#[derive(Debug, Error)]
pub enum ProtocolServerError {
    #[error("server initiated disconnect")]
    ServerInitiatedDisconnect,
}
