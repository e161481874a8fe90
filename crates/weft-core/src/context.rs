use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Shared mutable variable store for one workflow run.
///
/// The context is exclusively owned by the engine for the duration of a
/// `run()` invocation and is read and written by actions during their
/// `execute` call. Besides the ordered variable mapping it carries two
/// engine-owned slots that replace the original design's reserved dict
/// keys: the exit code recorded by an `Exit` signal, and the branch-taken
/// flag through which the actions of one if/elseif/else chain cooperate.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Context {
    values: Map<String, Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    exit_code: Option<i32>,

    #[serde(skip)]
    branch_taken: Option<bool>,
}

impl Context {
    /// Create an empty context
    pub fn new() -> Self {
        Context::default()
    }

    /// Create a context seeded with the given variables
    pub fn from_values(values: Map<String, Value>) -> Self {
        Context {
            values,
            exit_code: None,
            branch_taken: None,
        }
    }

    /// Get a variable by name
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Set a variable, replacing any previous value
    pub fn set(&mut self, name: &str, value: Value) {
        self.values.insert(name.to_string(), value);
    }

    /// Remove a variable, returning its previous value
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.values.shift_remove(name)
    }

    /// Whether a variable is set
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Get a variable as a string slice
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    /// Get a variable as an integer
    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Value::as_i64)
    }

    /// Get a variable as a float
    pub fn get_f64(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Value::as_f64)
    }

    /// Get a variable as a boolean
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(Value::as_bool)
    }

    /// The full variable mapping
    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    /// The exit code recorded by an `Exit` signal, if any
    pub fn exit_code(&self) -> Option<i32> {
        self.exit_code
    }

    /// Record the run's exit code. Called by the engine when an `Exit`
    /// signal reaches the top level.
    pub fn set_exit_code(&mut self, code: i32) {
        self.exit_code = Some(code);
    }

    /// Branch-chain state: `None` outside a chain, otherwise whether a
    /// branch of the current chain has already run.
    pub fn branch_taken(&self) -> Option<bool> {
        self.branch_taken
    }

    /// Open or update the current chain's state. Called by `If`/`ElseIf`/
    /// `Else` actions.
    pub fn set_branch_taken(&mut self, taken: bool) {
        self.branch_taken = Some(taken);
    }

    /// Seal the current chain. The engine calls this before dispatching any
    /// step that does not continue a chain.
    pub fn clear_branch_state(&mut self) {
        self.branch_taken = None;
    }

    /// Detach the chain state, for save/restore around a nested descent
    pub fn take_branch_state(&mut self) -> Option<bool> {
        self.branch_taken.take()
    }

    /// Restore chain state detached by [`Context::take_branch_state`]
    pub fn restore_branch_state(&mut self, state: Option<bool>) {
        self.branch_taken = state;
    }
}
