//! Loop actions: `For`, `ForEach`, `ForEachDict` and `While`.
//!
//! Every loop owns a nested body and is the handling frame for `Break` and
//! `Continue` signals raised anywhere inside it: `Break` stops the loop and
//! the action completes normally, `Continue` moves to the next iteration.
//! `Exit` signals and faults pass through untouched.

use serde_json::Value;
use tracing::warn;
use weft_core::{
    Action, Context, CoreError, ExecInterrupt, FlowSignal, ParamField, ParamKind, Params,
    StepRunner,
};
use weft_dsl::Step;

use crate::conditions::{BasicConditionEvaluator, ConditionEvaluator};
use crate::params::{children, opt_i64, opt_str, require_i64, require_str, resolve_value, str_or};

/// What one body run decided for the loop.
enum IterFlow {
    Next,
    Stop,
}

fn run_body(
    runner: &dyn StepRunner,
    body: &[Step],
    ctx: &mut Context,
) -> Result<IterFlow, ExecInterrupt> {
    match runner.run_children(body, ctx) {
        Ok(()) => Ok(IterFlow::Next),
        Err(ExecInterrupt::Signal(FlowSignal::Continue)) => Ok(IterFlow::Next),
        Err(ExecInterrupt::Signal(FlowSignal::Break)) => Ok(IterFlow::Stop),
        Err(other) => Err(other),
    }
}

/// Runs its body a fixed number of times, exposing the 0-based iteration
/// index as a context variable.
pub struct For {
    count: Result<i64, CoreError>,
    index_var: String,
    body: Vec<Step>,
}

impl For {
    /// Build from a step's parameters
    pub fn from_params(params: Params) -> Box<dyn Action> {
        Box::new(For {
            count: require_i64(&params, "count"),
            index_var: str_or(&params, "index_var", "loop_index"),
            body: children(&params),
        })
    }
}

impl Action for For {
    fn name(&self) -> &str {
        "For"
    }

    fn description(&self) -> &str {
        "Runs its body a fixed number of times"
    }

    fn execute(&self, ctx: &mut Context, runner: &dyn StepRunner) -> Result<bool, ExecInterrupt> {
        let count = self.count.clone()?;
        if count < 0 {
            return Err(CoreError::InvalidParameter(format!(
                "loop count must not be negative, got {}",
                count
            ))
            .into());
        }

        for index in 0..count {
            ctx.set(&self.index_var, Value::from(index));
            if let IterFlow::Stop = run_body(runner, &self.body, ctx)? {
                break;
            }
        }
        Ok(true)
    }

    fn param_schema(&self) -> Vec<ParamField> {
        vec![
            ParamField::new("count", ParamKind::Int).required(),
            ParamField::new("index_var", ParamKind::String),
        ]
    }
}

/// Runs its body once per element of a list.
///
/// `items` is either a literal array or a `"$name"` reference to a context
/// variable holding one. The current element is bound to `item_var`
/// (default `"item"`); when `index_var` is given the 0-based position is
/// bound as well.
pub struct ForEach {
    items: Result<Value, CoreError>,
    item_var: String,
    index_var: Option<String>,
    body: Vec<Step>,
}

impl ForEach {
    /// Build from a step's parameters
    pub fn from_params(params: Params) -> Box<dyn Action> {
        Box::new(ForEach {
            items: params
                .get("items")
                .cloned()
                .ok_or_else(|| CoreError::InvalidParameter("missing required parameter 'items'".to_string())),
            item_var: str_or(&params, "item_var", "item"),
            index_var: opt_str(&params, "index_var"),
            body: children(&params),
        })
    }
}

impl Action for ForEach {
    fn name(&self) -> &str {
        "ForEach"
    }

    fn description(&self) -> &str {
        "Runs its body once per element of a list"
    }

    fn execute(&self, ctx: &mut Context, runner: &dyn StepRunner) -> Result<bool, ExecInterrupt> {
        let items = resolve_value(ctx, &self.items.clone()?);
        let items = items.as_array().cloned().ok_or_else(|| {
            CoreError::InvalidParameter("'items' must resolve to a list".to_string())
        })?;

        for (index, item) in items.into_iter().enumerate() {
            ctx.set(&self.item_var, item);
            if let Some(index_var) = &self.index_var {
                ctx.set(index_var, Value::from(index as i64));
            }
            if let IterFlow::Stop = run_body(runner, &self.body, ctx)? {
                break;
            }
        }
        Ok(true)
    }

    fn param_schema(&self) -> Vec<ParamField> {
        vec![
            ParamField::new("items", ParamKind::Text).required(),
            ParamField::new("item_var", ParamKind::String),
            ParamField::new("index_var", ParamKind::String),
        ]
    }
}

/// Runs its body once per entry of a mapping, in the mapping's own key
/// order.
pub struct ForEachDict {
    items: Result<Value, CoreError>,
    key_var: String,
    value_var: String,
    body: Vec<Step>,
}

impl ForEachDict {
    /// Build from a step's parameters
    pub fn from_params(params: Params) -> Box<dyn Action> {
        Box::new(ForEachDict {
            items: params
                .get("items")
                .cloned()
                .ok_or_else(|| CoreError::InvalidParameter("missing required parameter 'items'".to_string())),
            key_var: str_or(&params, "key_var", "key"),
            value_var: str_or(&params, "value_var", "value"),
            body: children(&params),
        })
    }
}

impl Action for ForEachDict {
    fn name(&self) -> &str {
        "ForEachDict"
    }

    fn description(&self) -> &str {
        "Runs its body once per entry of a mapping"
    }

    fn execute(&self, ctx: &mut Context, runner: &dyn StepRunner) -> Result<bool, ExecInterrupt> {
        let items = resolve_value(ctx, &self.items.clone()?);
        let entries = items.as_object().cloned().ok_or_else(|| {
            CoreError::InvalidParameter("'items' must resolve to a mapping".to_string())
        })?;

        for (key, value) in entries {
            ctx.set(&self.key_var, Value::String(key));
            ctx.set(&self.value_var, value);
            if let IterFlow::Stop = run_body(runner, &self.body, ctx)? {
                break;
            }
        }
        Ok(true)
    }

    fn param_schema(&self) -> Vec<ParamField> {
        vec![
            ParamField::new("items", ParamKind::Text).required(),
            ParamField::new("key_var", ParamKind::String),
            ParamField::new("value_var", ParamKind::String),
        ]
    }
}

/// Runs its body while a condition holds.
///
/// `max_loops` caps the iteration count; a loop that reaches the cap with
/// the condition still true is reported as a failed step rather than being
/// allowed to spin forever.
pub struct While {
    cond: Result<String, CoreError>,
    max_loops: Option<i64>,
    body: Vec<Step>,
}

impl While {
    /// Build from a step's parameters
    pub fn from_params(params: Params) -> Box<dyn Action> {
        Box::new(While {
            cond: require_str(&params, "cond"),
            max_loops: opt_i64(&params, "max_loops"),
            body: children(&params),
        })
    }
}

impl Action for While {
    fn name(&self) -> &str {
        "While"
    }

    fn description(&self) -> &str {
        "Runs its body while a condition holds"
    }

    fn execute(&self, ctx: &mut Context, runner: &dyn StepRunner) -> Result<bool, ExecInterrupt> {
        let cond = self.cond.clone()?;
        let evaluator = BasicConditionEvaluator;
        let mut iterations: i64 = 0;

        loop {
            if !evaluator.evaluate(&cond, ctx)? {
                return Ok(true);
            }
            if let Some(max) = self.max_loops {
                if iterations >= max {
                    warn!(cond = %cond, max, "while loop hit its iteration cap");
                    return Ok(false);
                }
            }
            iterations += 1;
            if let IterFlow::Stop = run_body(runner, &self.body, ctx)? {
                return Ok(true);
            }
        }
    }

    fn param_schema(&self) -> Vec<ParamField> {
        vec![
            ParamField::new("cond", ParamKind::String).required(),
            ParamField::new("max_loops", ParamKind::Int),
        ]
    }
}
