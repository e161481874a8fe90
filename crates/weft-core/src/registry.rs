use std::collections::HashMap;

use crate::{Action, Params};

/// Factory function producing a fresh action instance from a step's
/// parameter mapping
pub type ActionFactory = Box<dyn Fn(Params) -> Box<dyn Action> + Send + Sync>;

/// Maps tool identifiers (and display names as a fallback) to action
/// factories.
///
/// The registry is an explicit object constructed once at startup and passed
/// by reference into the engine; it is read-only during a run and may be
/// shared across runs and engine instances.
#[derive(Default)]
pub struct ActionRegistry {
    by_id: HashMap<String, usize>,
    by_name: HashMap<String, usize>,
    factories: Vec<ActionFactory>,
}

impl ActionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        ActionRegistry::default()
    }

    /// Register a factory under a tool identifier and a display name.
    ///
    /// Later registrations replace earlier ones for the same key.
    pub fn register<F>(&mut self, id: &str, name: &str, factory: F)
    where
        F: Fn(Params) -> Box<dyn Action> + Send + Sync + 'static,
    {
        let index = self.factories.len();
        self.factories.push(Box::new(factory));
        self.by_id.insert(id.to_string(), index);
        self.by_name.insert(name.to_string(), index);
    }

    /// Resolve a step's factory: by `id` first, falling back to the display
    /// name
    pub fn resolve(&self, id: Option<&str>, name: Option<&str>) -> Option<&ActionFactory> {
        let index = id
            .and_then(|id| self.by_id.get(id))
            .or_else(|| name.and_then(|name| self.by_name.get(name)))?;
        self.factories.get(*index)
    }

    /// Whether a tool identifier is registered
    pub fn contains_id(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    /// Number of registered factories
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}
