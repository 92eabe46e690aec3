use rand::Rng;
use serde::Deserialize;

use crate::data::{
    ids::{EnemyId, ItemId},
    item::StatBlock,
};

/// A content value that is either a fixed scalar or a `[min, max]` range
/// resolved with a uniform roll.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RangedValue {
    Fixed(i32),
    Range(i32, i32),
}

impl RangedValue {
    pub fn roll(&self, rng: &mut impl Rng) -> i32 {
        match *self {
            RangedValue::Fixed(value) => value,
            RangedValue::Range(min, max) => rng.gen_range(min..=max),
        }
    }

    pub fn min(&self) -> i32 {
        match *self {
            RangedValue::Fixed(value) => value,
            RangedValue::Range(min, _) => min,
        }
    }

    pub fn is_valid(&self) -> bool {
        match *self {
            RangedValue::Fixed(value) => value >= 0,
            RangedValue::Range(min, max) => min >= 0 && min <= max,
        }
    }
}

impl Default for RangedValue {
    fn default() -> Self {
        RangedValue::Fixed(0)
    }
}

fn default_accuracy() -> i32 {
    100
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnemyAttack {
    pub damage: RangedValue,
    #[serde(default = "default_accuracy")]
    pub accuracy: i32,
}

fn default_quantity() -> RangedValue {
    RangedValue::Fixed(1)
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LootEntry {
    pub item: ItemId,
    pub chance: f32,
    #[serde(default = "default_quantity")]
    pub quantity: RangedValue,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnemyData {
    #[serde(skip)]
    pub id: EnemyId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub max_health: i32,
    pub attacks: Vec<EnemyAttack>,
    #[serde(default)]
    pub defense: i32,
    #[serde(default)]
    pub experience: i32,
    #[serde(default)]
    pub gold: RangedValue,
    #[serde(default)]
    pub loot: Vec<LootEntry>,
    #[serde(default)]
    pub stats: StatBlock,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_ranged_value_forms() {
        let fixed: RangedValue = serde_json::from_str("7").unwrap();
        assert_eq!(fixed, RangedValue::Fixed(7));

        let range: RangedValue = serde_json::from_str("[2, 5]").unwrap();
        assert_eq!(range, RangedValue::Range(2, 5));

        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..32 {
            let rolled = range.roll(&mut rng);
            assert!((2..=5).contains(&rolled));
        }
        assert_eq!(fixed.roll(&mut rng), 7);
    }

    #[test]
    fn test_ranged_value_validity() {
        assert!(RangedValue::Range(1, 3).is_valid());
        assert!(!RangedValue::Range(5, 2).is_valid());
        assert!(!RangedValue::Fixed(-1).is_valid());
    }

    #[test]
    fn test_enemy_attack_default_accuracy() {
        let attack: EnemyAttack = serde_json::from_str(r#"{ "damage": [5, 5] }"#).unwrap();
        assert_eq!(attack.accuracy, 100);
    }
}
