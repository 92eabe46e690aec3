pub mod client;
pub mod control;
pub mod server;

pub use client::ClientMessage;
pub use control::ControlMessage;
pub use server::{AuthError, AuthResponse, OutputCategory, ServerMessage};
