use serde::{Deserialize, Serialize};

use crate::data::{GameData, ObjectiveKind, QuestData, QuestId};

use super::inventory::Inventory;

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectiveProgress {
    pub current: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ActiveQuest {
    pub quest: QuestId,
    pub objectives: Vec<ObjectiveProgress>,
}

#[derive(Clone, Copy, Debug)]
pub struct ProgressUpdate {
    pub objective_index: usize,
    pub current: u32,
    pub quantity: u32,
    /// The objective reached its quantity with this update.
    pub satisfied_now: bool,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct QuestLog {
    pub active: Vec<ActiveQuest>,
    pub completed: Vec<QuestId>,
}

impl QuestLog {
    pub fn is_active(&self, quest: &QuestId) -> bool {
        self.active.iter().any(|active| &active.quest == quest)
    }

    pub fn is_completed(&self, quest: &QuestId) -> bool {
        self.completed.contains(quest)
    }

    pub fn get_active(&self, quest: &QuestId) -> Option<&ActiveQuest> {
        self.active.iter().find(|active| &active.quest == quest)
    }

    pub fn start(&mut self, quest: &QuestData) {
        self.active.push(ActiveQuest {
            quest: quest.id.clone(),
            objectives: vec![ObjectiveProgress::default(); quest.objectives.len()],
        });
    }

    pub fn abandon(&mut self, quest: &QuestId) -> Option<ActiveQuest> {
        let index = self.active.iter().position(|active| &active.quest == quest)?;
        Some(self.active.remove(index))
    }

    /// Moves a quest from active to completed. Repeatable quests record a
    /// single completion entry no matter how often they are turned in.
    pub fn complete(&mut self, quest: &QuestId) {
        self.active.retain(|active| &active.quest != quest);
        if !self.completed.contains(quest) {
            self.completed.push(quest.clone());
        }
    }

    /// Advances every objective of every active quest matching
    /// `(kind, target)`, capped at the objective quantity. Returns what
    /// changed per quest so callers can narrate progress.
    pub fn record_progress(
        &mut self,
        data: &GameData,
        kind: ObjectiveKind,
        target: &str,
        amount: u32,
    ) -> Vec<(QuestId, ProgressUpdate)> {
        let mut updates = Vec::new();

        for active in self.active.iter_mut() {
            let Some(quest) = data.get_quest(&active.quest) else {
                continue;
            };
            for (index, objective) in quest.objectives.iter().enumerate() {
                if objective.kind != kind || objective.target != target {
                    continue;
                }
                let progress = &mut active.objectives[index];
                if progress.current >= objective.quantity {
                    continue;
                }
                progress.current = (progress.current + amount).min(objective.quantity);
                updates.push((
                    active.quest.clone(),
                    ProgressUpdate {
                        objective_index: index,
                        current: progress.current,
                        quantity: objective.quantity,
                        satisfied_now: progress.current >= objective.quantity,
                    },
                ));
            }
        }

        updates
    }

    /// Synchronizes every active collect objective with live inventory:
    /// `current = min(count(target), quantity)`. Idempotent.
    pub fn reconcile_collect(&mut self, data: &GameData, inventory: &Inventory) {
        for active in self.active.iter_mut() {
            let Some(quest) = data.get_quest(&active.quest) else {
                continue;
            };
            for (index, objective) in quest.objectives.iter().enumerate() {
                if objective.kind != ObjectiveKind::Collect {
                    continue;
                }
                let held = inventory.count(&objective.target.as_str().into());
                active.objectives[index].current = held.min(objective.quantity);
            }
        }
    }

    pub fn objectives_satisfied(&self, quest: &QuestData) -> bool {
        self.get_active(&quest.id).map_or(false, |active| {
            quest
                .objectives
                .iter()
                .zip(active.objectives.iter())
                .all(|(objective, progress)| progress.current >= objective.quantity)
        })
    }
}
