use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io::ErrorKind::NotFound;
use std::path::PathBuf;
use std::str::FromStr;

use log::debug;
use serde_json::{Map, Value};

use crate::model::entity::{Entity, CLASS_KEY};
use crate::model::Kind;

/// Keyed collection of every live entity, mirroring one JSON file on disk.
/// Keys are `<Kind>.<id>`. The whole file is rewritten on every save and
/// read back in one piece by `reload`.
pub struct FileStorage {
    file_path: PathBuf,
    objects: BTreeMap<String, Entity>,
}

impl FileStorage {
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
            objects: BTreeMap::new(),
        }
    }

    /// The live mapping. Callers may inspect it freely; use `all_mut` to
    /// mutate entries in place or remove them.
    pub const fn all(&self) -> &BTreeMap<String, Entity> {
        &self.objects
    }

    pub fn all_mut(&mut self) -> &mut BTreeMap<String, Entity> {
        &mut self.objects
    }

    /// Inserts an entity under its composite key, silently replacing any
    /// previous entry with the same key.
    pub fn add(&mut self, entity: Entity) {
        self.objects.insert(entity.key(), entity);
    }

    /// Serializes every entity into one JSON object and rewrites the
    /// backing file. I/O failures propagate; there is no retry.
    pub fn save(&self) -> Result<(), StorageError> {
        let mut records = Map::new();
        for (key, entity) in &self.objects {
            records.insert(key.clone(), Value::Object(entity.to_record()));
        }

        fs::write(&self.file_path, serde_json::to_string(&records)?)?;
        debug!("saved {} objects to {}", self.objects.len(), self.file_path.display());

        Ok(())
    }

    /// Loads the backing file into the mapping. A missing file is a no-op;
    /// a file that is not valid JSON is an error. Records whose
    /// discriminator is not a known kind are skipped.
    pub fn reload(&mut self) -> Result<(), StorageError> {
        let data = match fs::read_to_string(&self.file_path) {
            Ok(data) => data,
            Err(error) if error.kind() == NotFound => return Ok(()),
            Err(error) => return Err(StorageError::Io(error)),
        };

        let records: Map<String, Value> = serde_json::from_str(&data)?;
        for (key, record) in records {
            let Value::Object(record) = record else {
                debug!("skipping non-object record {key}");
                continue;
            };
            let kind = record
                .get(CLASS_KEY)
                .and_then(Value::as_str)
                .and_then(|name| Kind::from_str(name).ok());
            let Some(kind) = kind else {
                debug!("skipping record {key} with unknown class");
                continue;
            };

            self.objects.insert(key, Entity::from_record(kind, record)?);
        }
        debug!("reloaded {} objects from {}", self.objects.len(), self.file_path.display());

        Ok(())
    }
}

#[derive(Debug)]
pub enum StorageError {
    Io(std::io::Error),
    Json(serde_json::Error),
    Timestamp(chrono::ParseError),
}

impl std::error::Error for StorageError {}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Io(error) => write!(f, "{error}"),
            Self::Json(error) => write!(f, "{error}"),
            Self::Timestamp(error) => write!(f, "{error}"),
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<chrono::ParseError> for StorageError {
    fn from(value: chrono::ParseError) -> Self {
        Self::Timestamp(value)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use serde_json::json;
    use tempfile::tempdir;

    use crate::model::entity::Entity;
    use crate::model::Kind;
    use crate::storage::FileStorage;

    #[test]
    fn test_add_uses_composite_keys() {
        let dir = tempdir().expect("Failed to create temp dir");
        let mut storage = FileStorage::new(dir.path().join("file.json"));

        for kind in Kind::ALL {
            storage.add(Entity::new(kind));
        }

        assert_eq!(Kind::ALL.len(), storage.all().len());
        for (key, entity) in storage.all() {
            assert_eq!(format!("{}.{}", entity.kind(), entity.id()), *key);
        }
    }

    #[test]
    fn test_add_overwrites_same_key() {
        let dir = tempdir().expect("Failed to create temp dir");
        let mut storage = FileStorage::new(dir.path().join("file.json"));

        let entity = Entity::new(Kind::User);
        let mut replacement = entity.clone();
        replacement.set_attr("email", json!("x@y.com"));

        storage.add(entity);
        storage.add(replacement);

        assert_eq!(1, storage.all().len());
    }

    #[test]
    fn test_save_and_reload_round_trip() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("file.json");

        let mut storage = FileStorage::new(&path);
        let mut user = Entity::new(Kind::User);
        user.set_attr("email", json!("x@y.com"));
        storage.add(user);
        storage.add(Entity::new(Kind::City));
        storage.save().expect("Failed to save");

        let mut fresh = FileStorage::new(&path);
        fresh.reload().expect("Failed to reload");

        assert_eq!(
            storage.all().keys().collect::<Vec<_>>(),
            fresh.all().keys().collect::<Vec<_>>()
        );
        for (key, entity) in storage.all() {
            assert_eq!(entity.to_record(), fresh.all()[key].to_record());
        }
    }

    #[test]
    fn test_reload_without_file_is_a_no_op() {
        let dir = tempdir().expect("Failed to create temp dir");
        let mut storage = FileStorage::new(dir.path().join("missing.json"));

        storage.reload().expect("Missing file should not be an error");
        assert!(storage.all().is_empty());
    }

    #[test]
    fn test_reload_rejects_invalid_json() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("file.json");
        fs::write(&path, "not json at all").expect("Failed to write");

        assert!(FileStorage::new(&path).reload().is_err());
    }

    #[test]
    fn test_reload_skips_unknown_classes() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("file.json");
        fs::write(
            &path,
            json!({
                "Ghost.1": {"__class__": "Ghost", "id": "1"},
                "User.2": {
                    "__class__": "User",
                    "id": "2",
                    "created_at": "2024-01-01T00:00:00.000000",
                    "updated_at": "2024-01-01T00:00:00.000000"
                }
            })
            .to_string(),
        )
        .expect("Failed to write");

        let mut storage = FileStorage::new(&path);
        storage.reload().expect("Failed to reload");

        assert_eq!(vec!["User.2".to_owned()], storage.all().keys().cloned().collect::<Vec<_>>());
    }

    #[test]
    fn test_reload_rejects_bad_timestamps() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("file.json");
        fs::write(
            &path,
            json!({
                "User.1": {"__class__": "User", "id": "1", "created_at": "yesterday"}
            })
            .to_string(),
        )
        .expect("Failed to write");

        assert!(FileStorage::new(&path).reload().is_err());
    }
}
