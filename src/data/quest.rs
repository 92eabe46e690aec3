use serde::{Deserialize, Serialize};

use crate::data::ids::{ItemId, NpcId, QuestId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectiveKind {
    Kill,
    Collect,
    Visit,
    Deliver,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QuestObjective {
    pub kind: ObjectiveKind,
    /// Target id, interpreted per kind: enemy for kill, item for collect,
    /// room for visit, npc for deliver.
    pub target: String,
    pub quantity: u32,
    #[serde(default)]
    pub given_by_quest_giver: bool,
}

impl QuestObjective {
    pub fn describe(&self) -> String {
        match self.kind {
            ObjectiveKind::Kill => format!("Slay {} x{}", self.target, self.quantity),
            ObjectiveKind::Collect => format!("Collect {} x{}", self.target, self.quantity),
            ObjectiveKind::Visit => format!("Visit {}", self.target),
            ObjectiveKind::Deliver => format!("Deliver to {}", self.target),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QuestRewards {
    pub experience: i32,
    pub gold: u32,
    pub items: Vec<ItemId>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QuestPrerequisites {
    pub level: u32,
    pub quests: Vec<QuestId>,
    pub items: Vec<ItemId>,
}

impl Default for QuestPrerequisites {
    fn default() -> Self {
        Self {
            level: 1,
            quests: Vec::new(),
            items: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QuestDialogue {
    pub offer: String,
    pub progress: String,
    pub complete: String,
}

fn default_level() -> u32 {
    1
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QuestData {
    #[serde(skip)]
    pub id: QuestId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub giver: NpcId,
    #[serde(default)]
    pub turn_in_npc: Option<NpcId>,
    #[serde(default = "default_level")]
    pub level: u32,
    pub objectives: Vec<QuestObjective>,
    #[serde(default)]
    pub rewards: QuestRewards,
    #[serde(default)]
    pub dialogue: QuestDialogue,
    #[serde(default)]
    pub prerequisites: QuestPrerequisites,
    #[serde(default)]
    pub repeatable: bool,
}

impl QuestData {
    /// The NPC the quest is handed in to; defaults to the giver.
    pub fn turn_in_npc(&self) -> &NpcId {
        self.turn_in_npc.as_ref().unwrap_or(&self.giver)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turn_in_defaults_to_giver() {
        let quest: QuestData = serde_json::from_str(
            r#"{
                "name": "Gather Herbs",
                "giver": "herbalist",
                "objectives": [
                    { "kind": "collect", "target": "thyme", "quantity": 3 }
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(quest.turn_in_npc(), &NpcId::new("herbalist"));
        assert_eq!(quest.level, 1);
        assert!(!quest.repeatable);
    }

    #[test]
    fn test_unknown_objective_kind_rejected() {
        let result: Result<QuestObjective, _> =
            serde_json::from_str(r#"{ "kind": "escort", "target": "caravan", "quantity": 1 }"#);
        assert!(result.is_err());
    }
}
