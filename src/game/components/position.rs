use serde::{Deserialize, Serialize};

use crate::data::{AreaId, RoomId};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Position {
    pub room: RoomId,
    #[serde(default)]
    pub coords: (i32, i32),
}

impl Position {
    pub fn new(room: RoomId, coords: Option<(i32, i32)>) -> Self {
        Self {
            room,
            coords: coords.unwrap_or((0, 0)),
        }
    }

    pub fn area(&self) -> Option<AreaId> {
        self.room.area_id()
    }
}
