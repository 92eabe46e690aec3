use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HealthPoints {
    pub hp: i32,
}

impl HealthPoints {
    pub fn new(hp: i32) -> Self {
        Self { hp }
    }
}
