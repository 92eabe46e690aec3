use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Level {
    pub level: u32,
}

impl Level {
    pub fn new(level: u32) -> Self {
        Self { level }
    }
}

impl Default for Level {
    fn default() -> Self {
        Self { level: 1 }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExperiencePoints {
    pub xp: i32,
}

/// Experience required to advance from `level` to `level + 1`.
pub fn experience_to_next_level(level: Level) -> i32 {
    (level.level as i32) * 100
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_experience_curve() {
        assert_eq!(experience_to_next_level(Level::new(1)), 100);
        assert_eq!(experience_to_next_level(Level::new(7)), 700);
    }
}
