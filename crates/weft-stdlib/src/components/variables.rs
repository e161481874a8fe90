//! Context variable manipulation actions.

use serde_json::Value;
use tracing::debug;
use weft_core::{Action, Context, CoreError, ExecInterrupt, ParamField, ParamKind, Params, StepRunner};

use crate::params::{require_str, resolve_value};

/// Sets a context variable.
///
/// The value may reference another variable with a `"$name"` string.
pub struct SetVariable {
    name: Result<String, CoreError>,
    value: Value,
}

impl SetVariable {
    /// Build from a step's parameters
    pub fn from_params(params: Params) -> Box<dyn Action> {
        Box::new(SetVariable {
            name: require_str(&params, "name"),
            value: params.get("value").cloned().unwrap_or(Value::Null),
        })
    }
}

impl Action for SetVariable {
    fn name(&self) -> &str {
        "SetVariable"
    }

    fn description(&self) -> &str {
        "Sets a variable in the run context"
    }

    fn execute(&self, ctx: &mut Context, _runner: &dyn StepRunner) -> Result<bool, ExecInterrupt> {
        let name = self.name.clone()?;
        let value = resolve_value(ctx, &self.value);
        debug!(name = %name, "setting variable");
        ctx.set(&name, value);
        Ok(true)
    }

    fn param_schema(&self) -> Vec<ParamField> {
        vec![
            ParamField::new("name", ParamKind::String).required(),
            ParamField::new("value", ParamKind::Text),
        ]
    }
}

/// Removes a context variable. Removing a variable that is not set is a
/// no-op.
pub struct DeleteVariable {
    name: Result<String, CoreError>,
}

impl DeleteVariable {
    /// Build from a step's parameters
    pub fn from_params(params: Params) -> Box<dyn Action> {
        Box::new(DeleteVariable {
            name: require_str(&params, "name"),
        })
    }
}

impl Action for DeleteVariable {
    fn name(&self) -> &str {
        "DeleteVariable"
    }

    fn description(&self) -> &str {
        "Removes a variable from the run context"
    }

    fn execute(&self, ctx: &mut Context, _runner: &dyn StepRunner) -> Result<bool, ExecInterrupt> {
        let name = self.name.clone()?;
        if ctx.remove(&name).is_none() {
            debug!(name = %name, "variable was not set");
        }
        Ok(true)
    }

    fn param_schema(&self) -> Vec<ParamField> {
        vec![ParamField::new("name", ParamKind::String).required()]
    }
}
