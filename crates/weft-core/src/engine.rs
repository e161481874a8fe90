use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, error, trace};
use weft_dsl::{Step, StepKind, CHILDREN_PARAM};

use crate::{ActionRegistry, Context, CoreError, ExecInterrupt, FlowSignal, StepRunner};

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    /// Every top-level step ran to completion
    Completed,
    /// An `Exit` signal terminated the run deliberately
    ExitedEarly(i32),
    /// A fault aborted the run
    Failed(CoreError),
}

impl RunStatus {
    /// Whether the run ended without a fault
    pub fn is_success(&self) -> bool {
        !matches!(self, RunStatus::Failed(_))
    }
}

/// Outcome of one workflow run: the terminal status plus the final context.
///
/// The context is returned even on failure so callers can inspect the
/// variables as they stood when the run stopped.
#[derive(Debug)]
pub struct RunReport {
    /// Terminal status of the run
    pub status: RunStatus,
    /// Final state of the variable store
    pub context: Context,
}

/// Recursive interpreter for nested step lists.
///
/// An engine is loaded with a workflow's nested steps and bound to an
/// [`ActionRegistry`]; each [`Engine::run`] call walks the steps against a
/// fresh (or caller-seeded) [`Context`] and returns a [`RunReport`]. The
/// engine itself is single-threaded and synchronous; recursion into loop and
/// branch bodies happens on the call stack through the [`StepRunner`] seam.
pub struct Engine {
    steps: Vec<Step>,
    registry: Arc<ActionRegistry>,
}

impl Engine {
    /// Create an engine bound to a registry, with no steps loaded
    pub fn new(registry: Arc<ActionRegistry>) -> Self {
        Engine {
            steps: Vec::new(),
            registry,
        }
    }

    /// Load the nested steps to execute.
    ///
    /// Loading is a plain assignment: no validation or resolution happens
    /// until [`Engine::run`], so a workflow referencing unregistered tools
    /// loads fine and fails at the offending step.
    pub fn load(&mut self, steps: Vec<Step>) {
        self.steps = steps;
    }

    /// The currently loaded steps
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Run the loaded steps.
    ///
    /// `initial` seeds the variable store; `None` starts from an empty
    /// context. Signals reaching the top level are resolved here: `Exit`
    /// records its code and ends the run early, while a stray `Break` or
    /// `Continue` with no enclosing loop is a fault.
    pub fn run(&self, initial: Option<Context>) -> RunReport {
        let mut ctx = initial.unwrap_or_default();
        let executor = Executor {
            registry: &self.registry,
        };

        let status = match executor.run_children(&self.steps, &mut ctx) {
            Ok(()) => RunStatus::Completed,
            Err(ExecInterrupt::Signal(FlowSignal::Exit(code))) => {
                debug!(code, "flow exited early");
                ctx.set_exit_code(code);
                RunStatus::ExitedEarly(code)
            }
            Err(ExecInterrupt::Signal(signal)) => {
                let err = CoreError::SignalOutsideLoop(signal.to_string());
                error!("{}", err);
                RunStatus::Failed(err)
            }
            Err(ExecInterrupt::Fault(err)) => RunStatus::Failed(err),
        };

        RunReport {
            status,
            context: ctx,
        }
    }
}

/// The engine's step-walking half, handed to actions as their re-entry seam.
struct Executor<'a> {
    registry: &'a ActionRegistry,
}

impl Executor<'_> {
    fn run_steps(&self, steps: &[Step], ctx: &mut Context) -> Result<(), ExecInterrupt> {
        for (index, step) in steps.iter().enumerate() {
            let position = index + 1;

            if step.disabled {
                debug!(step = step.label(), position, "skipping disabled step");
                // A disabled If still seals its chain, so following
                // ElseIf/Else siblings are skipped instead of faulting as
                // orphans.
                if matches!(step.kind(), StepKind::If) {
                    ctx.set_branch_taken(true);
                }
                continue;
            }

            // Stray markers in already-nested input carry no behavior.
            if matches!(step.kind(), StepKind::EndMarker(_)) {
                trace!(position, "ignoring end marker");
                continue;
            }

            // Any step that does not continue a branch chain seals the one
            // currently open at this level.
            if !step.is_branch() {
                ctx.clear_branch_state();
            }

            if step.id.is_none() && step.tool_name.is_none() {
                return Err(CoreError::MissingToolId(format!(
                    "step at position {} has neither id nor tool name",
                    position
                ))
                .into());
            }

            let factory = self
                .registry
                .resolve(step.id.as_deref(), step.tool_name.as_deref())
                .ok_or_else(|| CoreError::ToolNotFound(step.label().to_string()))?;

            let mut params = step.params.clone();
            if let Some(children) = &step.children {
                let value = serde_json::to_value(children).map_err(CoreError::from)?;
                params.insert(CHILDREN_PARAM.to_string(), value);
            }

            let action = factory(params);
            trace!(step = step.label(), position, "executing step");

            match action.execute(ctx, self) {
                Ok(true) => {}
                Ok(false) => {
                    let err = CoreError::StepFailed(step.label().to_string());
                    error!(position, "{}", err);
                    return Err(err.into());
                }
                Err(ExecInterrupt::Fault(err)) => {
                    error!(step = step.label(), position, "{}", err);
                    return Err(err.into());
                }
                Err(interrupt) => return Err(interrupt),
            }
        }
        Ok(())
    }
}

impl StepRunner for Executor<'_> {
    fn run_children(&self, steps: &[Step], ctx: &mut Context) -> Result<(), ExecInterrupt> {
        // Each descent gets a clean branch slate; whatever chain state the
        // enclosing level had open comes back when the descent returns, even
        // on an interrupt.
        let saved = ctx.take_branch_state();
        let result = self.run_steps(steps, ctx);
        ctx.restore_branch_state(saved);
        result
    }
}
