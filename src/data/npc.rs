use std::collections::BTreeMap;

use serde::Deserialize;

use crate::data::ids::{NpcId, QuestId};

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NpcDialogue {
    pub greeting: String,
    pub responses: BTreeMap<String, String>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NpcData {
    #[serde(skip)]
    pub id: NpcId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub dialogue: NpcDialogue,
    #[serde(default)]
    pub quests: Vec<QuestId>,
    #[serde(default)]
    pub hostile: bool,
    #[serde(default)]
    pub homestone_binder: bool,
}

impl NpcData {
    /// Topic lookup is case-insensitive over the authored response keys.
    pub fn response_for_topic(&self, topic: &str) -> Option<&str> {
        let topic = topic.trim().to_lowercase();
        self.dialogue
            .responses
            .iter()
            .find(|(key, _)| key.to_lowercase() == topic)
            .map(|(_, text)| text.as_str())
    }
}
