use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputCategory {
    Normal,
    Success,
    Warning,
    Error,
    Combat,
    Chat,
    Whisper,
    System,
    Loot,
}

#[derive(Clone, Debug, Error, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthError {
    #[error("Authentication failed")]
    Failed,

    #[error("No character by that name exists")]
    UnknownCharacter,

    #[error("Invalid password")]
    InvalidPassword,

    #[error("{0}")]
    InvalidName(String),

    #[error("That name is already taken")]
    NameTaken,

    #[error("Passwords must be at least {0} characters")]
    PasswordTooShort(usize),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub character_name: String,
}

/// One frame to the client. Categorized output is the whole of normal play;
/// the rest is session lifecycle.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    AuthResult {
        result: Result<AuthResponse, AuthError>,
    },
    SystemNotice {
        text: String,
    },
    Output {
        category: OutputCategory,
        text: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_shape() {
        let message = ServerMessage::Output {
            category: OutputCategory::Loot,
            text: "You receive a Wolf Pelt.".to_string(),
        };
        let json = serde_json::to_string(&message).unwrap();
        assert!(json.contains(r#""type":"output""#));
        assert!(json.contains(r#""category":"loot""#));

        let round_trip: ServerMessage = serde_json::from_str(&json).unwrap();
        assert!(matches!(round_trip, ServerMessage::Output { .. }));
    }

    #[test]
    fn test_auth_result_round_trip() {
        let message = ServerMessage::AuthResult {
            result: Err(AuthError::PasswordTooShort(3)),
        };
        let json = serde_json::to_string(&message).unwrap();
        let round_trip: ServerMessage = serde_json::from_str(&json).unwrap();
        match round_trip {
            ServerMessage::AuthResult { result } => {
                assert_eq!(result, Err(AuthError::PasswordTooShort(3)));
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }
}
