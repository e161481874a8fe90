//! Execution engine for weft workflows.
//!
//! A workflow is a nested list of [`Step`](weft_dsl::Step)s. The engine walks
//! that list recursively: for each step it resolves an [`Action`]
//! implementation through an [`ActionRegistry`], instantiates it from the
//! step's parameters and runs it against a shared [`Context`]. Logic actions
//! (loops and branch chains) receive their nested bodies through the
//! `"children"` parameter and re-enter the engine through the [`StepRunner`]
//! seam, so flow-control signals raised anywhere inside a body unwind to the
//! frame that handles them.
//!
//! Control flow that is not plain success travels on a single channel,
//! [`ExecInterrupt`]: `Break`/`Continue`/`Exit` signals and fatal faults both
//! use it, and each stack frame either consumes an interrupt or passes it
//! upward untouched.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod context;
mod engine;
mod error;
mod registry;
mod signal;
mod types;

pub use context::Context;
pub use engine::{Engine, RunReport, RunStatus};
pub use error::CoreError;
pub use registry::{ActionFactory, ActionRegistry};
pub use signal::{ExecInterrupt, FlowSignal};
pub use types::{ParamField, ParamKind};

/// Ordered parameter mapping, as carried by `Step.params`
pub type Params = serde_json::Map<String, serde_json::Value>;

/// Re-entry seam through which logic actions run their nested bodies.
///
/// The engine passes an implementation of this trait into every `execute`
/// call; loop and branch actions hand their child steps back through it
/// instead of interpreting steps themselves.
pub trait StepRunner {
    /// Run a list of child steps against the context.
    ///
    /// Interrupts raised inside the children propagate out unchanged; the
    /// calling action decides which ones it consumes.
    fn run_children(&self, steps: &[weft_dsl::Step], ctx: &mut Context)
        -> Result<(), ExecInterrupt>;
}

/// A runnable workflow step implementation.
///
/// Actions are instantiated per step execution from the step's parameter
/// mapping by a registered [`ActionFactory`], so an instance never outlives
/// one `execute` call's worth of state assumptions.
pub trait Action: Send + Sync {
    /// Stable display name of the action
    fn name(&self) -> &str;

    /// One-line human-readable description
    fn description(&self) -> &str;

    /// Run the action.
    ///
    /// `Ok(true)` means success, `Ok(false)` means the step failed in a way
    /// the action already reported (the engine turns it into a run failure).
    /// Signals and faults travel through the `Err` channel.
    fn execute(&self, ctx: &mut Context, runner: &dyn StepRunner) -> Result<bool, ExecInterrupt>;

    /// Declarative parameter schema, for front-end form building
    fn param_schema(&self) -> Vec<ParamField> {
        Vec::new()
    }
}
