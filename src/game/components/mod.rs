pub mod basic_stats;
pub mod character;
pub mod equipment;
pub mod friends;
pub mod health_points;
pub mod inventory;
pub mod level;
pub mod position;
pub mod quest_log;

pub use basic_stats::BasicStats;
pub use character::{Character, DerivedStats, LevelUpResult};
pub use equipment::{Equipment, EquipmentError};
pub use friends::FriendList;
pub use health_points::HealthPoints;
pub use inventory::{Inventory, InventoryEntry, InventoryError};
pub use level::{experience_to_next_level, ExperiencePoints, Level};
pub use position::Position;
pub use quest_log::{ActiveQuest, ObjectiveProgress, ProgressUpdate, QuestLog};
