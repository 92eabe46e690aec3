use std::collections::HashMap;

use crate::data::QuestId;

/// Keys for the per-session ephemeral state that lets numbered shorthand
/// ("accept 2") resolve against the last list the player was shown.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ContextKey {
    /// Quests an NPC just offered, in display order.
    OfferedQuests,
    /// The numbered active-quest list from the `quest` command.
    NumberedQuests,
}

impl ContextKey {
    /// Verbs that keep this key alive; any other executed verb clears it.
    fn exceptions(&self) -> &'static [&'static str] {
        match self {
            ContextKey::OfferedQuests => &["accept", "ask", "talk"],
            ContextKey::NumberedQuests => &["abandon", "quest"],
        }
    }
}

#[derive(Default)]
pub struct CommandContext {
    entries: HashMap<ContextKey, Vec<QuestId>>,
}

impl CommandContext {
    pub fn set(&mut self, key: ContextKey, values: Vec<QuestId>) {
        self.entries.insert(key, values);
    }

    /// Resolves a 1-based number against the remembered list.
    pub fn resolve_number(&self, key: ContextKey, number: usize) -> Option<&QuestId> {
        self.entries
            .get(&key)
            .and_then(|values| values.get(number.checked_sub(1)?))
    }

    /// Called once per executed verb, before the handler runs.
    pub fn clear_for_verb(&mut self, verb: &str) {
        self.entries.retain(|key, _| key.exceptions().contains(&verb));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_cleared_by_foreign_verbs() {
        let mut context = CommandContext::default();
        context.set(ContextKey::OfferedQuests, vec![QuestId::new("gather_herbs")]);

        // `ask` is in the exception list; the offer survives.
        context.clear_for_verb("ask");
        assert!(context.resolve_number(ContextKey::OfferedQuests, 1).is_some());

        // Moving away is not; the offer is gone.
        context.clear_for_verb("north");
        assert!(context.resolve_number(ContextKey::OfferedQuests, 1).is_none());
    }

    #[test]
    fn test_resolve_number_is_one_based() {
        let mut context = CommandContext::default();
        context.set(
            ContextKey::NumberedQuests,
            vec![QuestId::new("first"), QuestId::new("second")],
        );
        assert_eq!(
            context.resolve_number(ContextKey::NumberedQuests, 2),
            Some(&QuestId::new("second"))
        );
        assert_eq!(context.resolve_number(ContextKey::NumberedQuests, 0), None);
        assert_eq!(context.resolve_number(ContextKey::NumberedQuests, 3), None);
    }
}
