//! Workflow persistence for Weft.
//!
//! Workflows are keyed by `(group, name)` and stored as
//! [`FlowDocument`](weft_dsl::FlowDocument) payloads. The store is shape
//! agnostic: it persists whatever step list it is given, flat or nested,
//! and leaves normalization to the DSL layer. Two implementations are
//! provided, an in-memory map for hosts and tests and a one-file-per-
//! workflow directory layout on disk.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod file;
mod memory;

pub use file::FileWorkflowStore;
pub use memory::InMemoryWorkflowStore;

use thiserror::Error;
use weft_dsl::FlowDocument;

/// Store error type
#[derive(Error, Debug)]
pub enum StoreError {
    /// No workflow is stored under the key
    #[error("Workflow not found: {group}/{name}")]
    NotFound {
        /// Workflow group
        group: String,
        /// Workflow name within the group
        name: String,
    },

    /// A key component is empty or would escape the store's namespace
    #[error("Invalid workflow key: {0}")]
    InvalidKey(String),

    /// Filesystem error
    #[error("IO error: {0}")]
    Io(String),

    /// Payload (de)serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

/// Keyed workflow storage.
///
/// `save` returns the document as stored, which may differ from the input:
/// a missing `id` is filled with a fresh uuid and a missing `name` with the
/// key's name component.
pub trait WorkflowStore {
    /// Load the workflow stored under `(group, name)`
    fn load(&self, group: &str, name: &str) -> Result<FlowDocument, StoreError>;

    /// Store a workflow under `(group, name)`, replacing any previous payload
    fn save(&self, group: &str, name: &str, doc: &FlowDocument)
        -> Result<FlowDocument, StoreError>;

    /// The names stored in a group, sorted; an unknown group is empty
    fn list(&self, group: &str) -> Result<Vec<String>, StoreError>;

    /// Remove the workflow stored under `(group, name)`
    fn delete(&self, group: &str, name: &str) -> Result<(), StoreError>;
}

/// Reject empty key components and anything that could traverse paths.
pub(crate) fn check_key(group: &str, name: &str) -> Result<(), StoreError> {
    for part in [group, name] {
        if part.is_empty() {
            return Err(StoreError::InvalidKey("empty key component".to_string()));
        }
        if part.contains(['/', '\\']) || part == "." || part == ".." {
            return Err(StoreError::InvalidKey(format!(
                "key component '{}' is not a plain name",
                part
            )));
        }
    }
    Ok(())
}

/// Fill a document's identity from the key before storing it.
pub(crate) fn fill_identity(name: &str, doc: &FlowDocument) -> FlowDocument {
    let mut doc = doc.clone();
    if doc.id.is_none() {
        doc.id = Some(uuid::Uuid::new_v4().to_string());
    }
    if doc.name.is_none() {
        doc.name = Some(name.to_string());
    }
    doc
}
