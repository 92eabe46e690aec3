use std::path::{Path, PathBuf};

use directories::ProjectDirs;

pub mod character;
pub mod name;
pub mod password;

pub use character::CharacterStorageError;
pub use name::NameError;
pub use password::PasswordHash;

/// Resolved on-disk layout for durable state.
#[derive(Clone, Debug)]
pub struct StorageDirs {
    pub characters_dir: PathBuf,
}

impl StorageDirs {
    pub fn new(data_dir: &Path) -> std::io::Result<Self> {
        let characters_dir = data_dir.join("characters");
        std::fs::create_dir_all(&characters_dir)?;
        Ok(Self { characters_dir })
    }
}

pub fn default_data_dir() -> PathBuf {
    ProjectDirs::from("", "", "embermoor")
        .map(|project| PathBuf::from(project.data_local_dir()))
        .unwrap_or_else(|| PathBuf::from("data"))
}
