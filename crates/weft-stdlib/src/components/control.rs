//! Flow-control signal actions: `Break`, `Continue` and `ExitFlow`.
//!
//! These never complete normally; each raises its signal through the
//! interrupt channel and lets the nearest frame that handles it decide.

use weft_core::{
    Action, Context, CoreError, ExecInterrupt, FlowSignal, ParamField, ParamKind, Params,
    StepRunner,
};

use crate::params::opt_i64;

/// Terminates the innermost enclosing loop.
pub struct Break;

impl Action for Break {
    fn name(&self) -> &str {
        "Break"
    }

    fn description(&self) -> &str {
        "Stops the innermost enclosing loop"
    }

    fn execute(&self, _ctx: &mut Context, _runner: &dyn StepRunner) -> Result<bool, ExecInterrupt> {
        Err(FlowSignal::Break.into())
    }
}

/// Skips to the innermost enclosing loop's next iteration.
pub struct Continue;

impl Action for Continue {
    fn name(&self) -> &str {
        "Continue"
    }

    fn description(&self) -> &str {
        "Skips to the next iteration of the innermost enclosing loop"
    }

    fn execute(&self, _ctx: &mut Context, _runner: &dyn StepRunner) -> Result<bool, ExecInterrupt> {
        Err(FlowSignal::Continue.into())
    }
}

/// Terminates the whole run with an exit code (default 0), from any nesting
/// depth.
pub struct ExitFlow {
    code: Result<i32, CoreError>,
}

impl ExitFlow {
    /// Build from a step's parameters
    pub fn from_params(params: Params) -> Box<dyn Action> {
        let code = match opt_i64(&params, "code") {
            None => Ok(0),
            Some(code) => i32::try_from(code).map_err(|_| {
                CoreError::InvalidParameter(format!("exit code {} is out of range", code))
            }),
        };
        Box::new(ExitFlow { code })
    }
}

impl Action for ExitFlow {
    fn name(&self) -> &str {
        "ExitFlow"
    }

    fn description(&self) -> &str {
        "Ends the run immediately with an exit code"
    }

    fn execute(&self, _ctx: &mut Context, _runner: &dyn StepRunner) -> Result<bool, ExecInterrupt> {
        Err(FlowSignal::Exit(self.code.clone()?).into())
    }

    fn param_schema(&self) -> Vec<ParamField> {
        vec![ParamField::new("code", ParamKind::Int)]
    }
}
