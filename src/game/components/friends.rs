use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct FriendList {
    pub names: Vec<String>,
    #[serde(default)]
    pub notes: BTreeMap<String, String>,
}

impl FriendList {
    pub fn is_friend(&self, name: &str) -> bool {
        self.names.iter().any(|friend| friend == name)
    }

    pub fn add(&mut self, name: String) -> bool {
        if self.is_friend(&name) {
            return false;
        }
        self.names.push(name);
        true
    }

    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.names.len();
        self.names.retain(|friend| friend != name);
        self.notes.remove(name);
        self.names.len() != before
    }

    pub fn set_note(&mut self, name: &str, note: String) -> bool {
        if !self.is_friend(name) {
            return false;
        }
        self.notes.insert(name.to_string(), note);
        true
    }

    pub fn note(&self, name: &str) -> Option<&str> {
        self.notes.get(name).map(String::as_str)
    }
}
