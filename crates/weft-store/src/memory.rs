use std::collections::HashMap;
use std::sync::RwLock;

use tracing::debug;
use weft_dsl::FlowDocument;

use crate::{check_key, fill_identity, StoreError, WorkflowStore};

/// Map-backed store for hosts and tests; contents are lost on drop.
#[derive(Default)]
pub struct InMemoryWorkflowStore {
    entries: RwLock<HashMap<(String, String), FlowDocument>>,
}

impl InMemoryWorkflowStore {
    /// Create an empty store
    pub fn new() -> Self {
        InMemoryWorkflowStore::default()
    }

    /// Number of stored workflows across all groups
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Whether the store holds no workflows
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<(String, String), FlowDocument>> {
        self.entries.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<(String, String), FlowDocument>> {
        self.entries.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl WorkflowStore for InMemoryWorkflowStore {
    fn load(&self, group: &str, name: &str) -> Result<FlowDocument, StoreError> {
        check_key(group, name)?;
        self.read()
            .get(&(group.to_string(), name.to_string()))
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                group: group.to_string(),
                name: name.to_string(),
            })
    }

    fn save(
        &self,
        group: &str,
        name: &str,
        doc: &FlowDocument,
    ) -> Result<FlowDocument, StoreError> {
        check_key(group, name)?;
        let stored = fill_identity(name, doc);
        debug!(group, name, "storing workflow");
        self.write()
            .insert((group.to_string(), name.to_string()), stored.clone());
        Ok(stored)
    }

    fn list(&self, group: &str) -> Result<Vec<String>, StoreError> {
        let mut names: Vec<String> = self
            .read()
            .keys()
            .filter(|(g, _)| g == group)
            .map(|(_, n)| n.clone())
            .collect();
        names.sort();
        Ok(names)
    }

    fn delete(&self, group: &str, name: &str) -> Result<(), StoreError> {
        check_key(group, name)?;
        self.write()
            .remove(&(group.to_string(), name.to_string()))
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound {
                group: group.to_string(),
                name: name.to_string(),
            })
    }
}
