use serde::{Deserialize, Serialize};

/// One frame from the client. The transport delivers one of these per line;
/// everything after authentication is a raw command line for the router.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Auth { name: String, password: String },
    Create { name: String, password: String },
    Command { line: String },
}
