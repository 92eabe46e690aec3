use std::io::Write;
use std::path::PathBuf;

use chrono::Utc;
use thiserror::Error;

use crate::game::components::Character;

use super::StorageDirs;

#[derive(Debug, Error)]
pub enum CharacterStorageError {
    #[error("character {0} not found")]
    NotFound(String),

    #[error("character {0} already exists")]
    AlreadyExists(String),

    #[error("character record for {name} is corrupt: {message}")]
    Corrupt { name: String, message: String },

    #[error("storage failure for character {name}: {source}")]
    Storage {
        name: String,
        source: anyhow::Error,
    },
}

fn character_path(dirs: &StorageDirs, canonical_name: &str) -> PathBuf {
    dirs.characters_dir.join(format!("{}.json", canonical_name))
}

/// Case-insensitivity falls out of canonicalization: every spelling of a
/// name maps to the same file.
pub fn exists(dirs: &StorageDirs, canonical_name: &str) -> bool {
    character_path(dirs, canonical_name).exists()
}

pub fn try_load(dirs: &StorageDirs, canonical_name: &str) -> Result<Character, CharacterStorageError> {
    let path = character_path(dirs, canonical_name);
    let text = std::fs::read_to_string(&path).map_err(|error| {
        if error.kind() == std::io::ErrorKind::NotFound {
            CharacterStorageError::NotFound(canonical_name.to_string())
        } else {
            CharacterStorageError::Storage {
                name: canonical_name.to_string(),
                source: anyhow::Error::new(error)
                    .context(format!("failed to read file {}", path.display())),
            }
        }
    })?;

    serde_json::from_str(&text).map_err(|error| CharacterStorageError::Corrupt {
        name: canonical_name.to_string(),
        message: error.to_string(),
    })
}

/// Rewrites the whole record through a temp file in the same directory so a
/// crash mid-save never truncates an existing character.
pub fn save(dirs: &StorageDirs, character: &mut Character) -> Result<(), CharacterStorageError> {
    character.last_saved = Some(Utc::now());
    write_record(dirs, character, true)
}

/// As `save`, but refuses to clobber an existing file.
pub fn try_create(dirs: &StorageDirs, character: &mut Character) -> Result<(), CharacterStorageError> {
    if exists(dirs, &character.name) {
        return Err(CharacterStorageError::AlreadyExists(character.name.clone()));
    }
    character.last_saved = Some(Utc::now());
    write_record(dirs, character, false)
}

fn write_record(
    dirs: &StorageDirs,
    character: &Character,
    allow_overwrite: bool,
) -> Result<(), CharacterStorageError> {
    let storage_failure = |source: anyhow::Error| CharacterStorageError::Storage {
        name: character.name.clone(),
        source,
    };

    let path = character_path(dirs, &character.name);
    std::fs::create_dir_all(&dirs.characters_dir)
        .map_err(|error| storage_failure(anyhow::Error::new(error).context("create storage dir")))?;

    let json = serde_json::to_string_pretty(character)
        .map_err(|error| storage_failure(anyhow::Error::new(error).context("serialise character")))?;

    let mut file = tempfile::Builder::new()
        .tempfile_in(&dirs.characters_dir)
        .map_err(|error| storage_failure(anyhow::Error::new(error).context("create temp file")))?;
    file.write_all(json.as_bytes())
        .map_err(|error| storage_failure(anyhow::Error::new(error).context("write temp file")))?;

    if allow_overwrite {
        file.persist(&path).map_err(|error| {
            storage_failure(anyhow::Error::new(error).context("persist character file"))
        })?;
    } else {
        file.persist_noclobber(&path).map_err(|error| {
            storage_failure(anyhow::Error::new(error).context("persist_noclobber character file"))
        })?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::RoomId;
    use crate::game::storage::password::PasswordHash;

    fn test_dirs() -> (tempfile::TempDir, StorageDirs) {
        let dir = tempfile::tempdir().unwrap();
        let dirs = StorageDirs::new(dir.path()).unwrap();
        (dir, dirs)
    }

    fn test_character(name: &str) -> Character {
        Character::create(
            name.to_string(),
            PasswordHash::derive("secret"),
            RoomId::from("town.square"),
            None,
        )
    }

    #[test]
    fn test_save_load_round_trip() {
        let (_guard, dirs) = test_dirs();
        let mut character = test_character("Alice");
        character.gold = 42;

        save(&dirs, &mut character).unwrap();
        assert!(character.last_saved.is_some());
        assert!(exists(&dirs, "Alice"));

        let loaded = try_load(&dirs, "Alice").unwrap();
        assert_eq!(loaded.name, "Alice");
        assert_eq!(loaded.gold, 42);
        assert!(loaded.password.verify("secret"));
    }

    #[test]
    fn test_load_missing_is_not_found() {
        let (_guard, dirs) = test_dirs();
        assert!(matches!(
            try_load(&dirs, "Nobody"),
            Err(CharacterStorageError::NotFound(_))
        ));
    }

    #[test]
    fn test_corrupt_record_reported() {
        let (_guard, dirs) = test_dirs();
        std::fs::write(dirs.characters_dir.join("Broken.json"), "{ not json").unwrap();
        assert!(matches!(
            try_load(&dirs, "Broken"),
            Err(CharacterStorageError::Corrupt { .. })
        ));
    }

    #[test]
    fn test_create_refuses_overwrite() {
        let (_guard, dirs) = test_dirs();
        let mut character = test_character("Alice");
        try_create(&dirs, &mut character).unwrap();
        assert!(matches!(
            try_create(&dirs, &mut character),
            Err(CharacterStorageError::AlreadyExists(_))
        ));
    }
}
