use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde_json::Value;
use tracing::debug;
use weft_dsl::FlowDocument;

use crate::{check_key, fill_identity, StoreError, WorkflowStore};

/// Key under which the save timestamp rides along in the written payload.
/// Document parsing ignores it on load.
const SAVED_AT_KEY: &str = "saved_at";

/// One-JSON-file-per-workflow store rooted at a directory, laid out as
/// `root/group/name.json`.
pub struct FileWorkflowStore {
    root: PathBuf,
}

impl FileWorkflowStore {
    /// Create a store rooted at the given directory. The directory is
    /// created lazily on first save.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FileWorkflowStore { root: root.into() }
    }

    /// The store's root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, group: &str, name: &str) -> PathBuf {
        self.root.join(group).join(format!("{}.json", name))
    }

    fn not_found(group: &str, name: &str) -> StoreError {
        StoreError::NotFound {
            group: group.to_string(),
            name: name.to_string(),
        }
    }
}

impl WorkflowStore for FileWorkflowStore {
    fn load(&self, group: &str, name: &str) -> Result<FlowDocument, StoreError> {
        check_key(group, name)?;
        let path = self.path_for(group, name);
        let text = fs::read_to_string(&path).map_err(|err| match err.kind() {
            ErrorKind::NotFound => Self::not_found(group, name),
            _ => err.into(),
        })?;
        Ok(serde_json::from_str(&text)?)
    }

    fn save(
        &self,
        group: &str,
        name: &str,
        doc: &FlowDocument,
    ) -> Result<FlowDocument, StoreError> {
        check_key(group, name)?;
        let stored = fill_identity(name, doc);

        let mut payload = serde_json::to_value(&stored)?;
        if let Some(map) = payload.as_object_mut() {
            map.insert(
                SAVED_AT_KEY.to_string(),
                Value::String(Utc::now().to_rfc3339()),
            );
        }

        fs::create_dir_all(self.root.join(group))?;
        let path = self.path_for(group, name);
        debug!(group, name, path = %path.display(), "writing workflow");
        fs::write(&path, serde_json::to_string_pretty(&payload)?)?;
        Ok(stored)
    }

    fn list(&self, group: &str) -> Result<Vec<String>, StoreError> {
        let dir = self.root.join(group);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        let mut names = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) == Some("json") {
                if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    fn delete(&self, group: &str, name: &str) -> Result<(), StoreError> {
        check_key(group, name)?;
        let path = self.path_for(group, name);
        fs::remove_file(&path).map_err(|err| match err.kind() {
            ErrorKind::NotFound => Self::not_found(group, name),
            _ => err.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use weft_dsl::Step;

    fn store() -> (tempfile::TempDir, FileWorkflowStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FileWorkflowStore::new(dir.path());
        (dir, store)
    }

    #[test]
    fn test_save_load_round_trip() {
        let (_dir, store) = store();
        let mut doc = FlowDocument::named("daily");
        doc.steps = vec![
            Step::new("SetVariable")
                .with_param("name", json!("x"))
                .with_param("value", json!(1)),
        ];

        let stored = store.save("jobs", "daily", &doc).unwrap();
        let loaded = store.load("jobs", "daily").unwrap();
        assert_eq!(loaded, stored);
        assert_eq!(loaded.steps.len(), 1);
    }

    #[test]
    fn test_written_payload_carries_timestamp() {
        let (dir, store) = store();
        store.save("jobs", "daily", &FlowDocument::default()).unwrap();

        let text = fs::read_to_string(dir.path().join("jobs").join("daily.json")).unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();
        assert!(value.get("saved_at").and_then(Value::as_str).is_some());
    }

    #[test]
    fn test_load_missing_is_not_found() {
        let (_dir, store) = store();
        assert!(matches!(
            store.load("jobs", "missing"),
            Err(StoreError::NotFound { .. })
        ));
    }

    #[test]
    fn test_list_and_delete() {
        let (_dir, store) = store();
        store.save("jobs", "b", &FlowDocument::default()).unwrap();
        store.save("jobs", "a", &FlowDocument::default()).unwrap();

        assert_eq!(store.list("jobs").unwrap(), vec!["a", "b"]);
        assert!(store.list("unknown").unwrap().is_empty());

        store.delete("jobs", "a").unwrap();
        assert_eq!(store.list("jobs").unwrap(), vec!["b"]);
        assert!(matches!(
            store.delete("jobs", "a"),
            Err(StoreError::NotFound { .. })
        ));
    }

    #[test]
    fn test_path_traversal_is_rejected() {
        let (_dir, store) = store();
        assert!(matches!(
            store.save("..", "escape", &FlowDocument::default()),
            Err(StoreError::InvalidKey(_))
        ));
        assert!(matches!(
            store.load("jobs", "../escape"),
            Err(StoreError::InvalidKey(_))
        ));
    }
}
