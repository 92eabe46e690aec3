use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! content_id {
    ($name:ident) => {
        #[derive(
            Clone, Debug, Default, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }
    };
}

content_id!(ItemId);
content_id!(NpcId);
content_id!(EnemyId);
content_id!(QuestId);
content_id!(AreaId);

/// Room ids take the form `area.room`, derived from the area folder name and
/// the room file base name.
#[derive(Clone, Debug, Default, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub String);

impl RoomId {
    pub fn new(area: &AreaId, room: &str) -> Self {
        Self(format!("{}.{}", area.0, room))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn area_id(&self) -> Option<AreaId> {
        self.0.split_once('.').map(|(area, _)| AreaId::new(area))
    }

    pub fn room_name(&self) -> Option<&str> {
        self.0.split_once('.').map(|(_, room)| room)
    }

    pub fn is_qualified(&self) -> bool {
        self.0.split_once('.').map_or(false, |(area, room)| {
            !area.is_empty() && !room.is_empty() && !room.contains('.')
        })
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RoomId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_id_parts() {
        let id = RoomId::new(&AreaId::new("forest"), "glade");
        assert_eq!(id.as_str(), "forest.glade");
        assert_eq!(id.area_id(), Some(AreaId::new("forest")));
        assert_eq!(id.room_name(), Some("glade"));
        assert!(id.is_qualified());
    }

    #[test]
    fn test_room_id_unqualified() {
        assert!(!RoomId::from("glade").is_qualified());
        assert!(!RoomId::from("forest.").is_qualified());
        assert!(!RoomId::from(".glade").is_qualified());
        assert!(!RoomId::from("a.b.c").is_qualified());
    }
}
