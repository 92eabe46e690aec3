use serde::{Deserialize, Serialize};

/// Base combat stats owned by the character. Never overwritten by
/// equipment; displays and combat use the derived totals instead.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct BasicStats {
    pub damage: i32,
    pub defense: i32,
    pub speed: i32,
}

impl Default for BasicStats {
    fn default() -> Self {
        Self {
            damage: 5,
            defense: 0,
            speed: 5,
        }
    }
}
