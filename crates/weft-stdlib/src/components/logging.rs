//! User-facing log output.

use serde_json::{json, Value};
use tracing::{debug, error, info, warn};
use weft_core::{Action, Context, ExecInterrupt, ParamField, ParamKind, Params, StepRunner};

use crate::params::{str_or, require_str};

/// Context key under which rendered log lines accumulate, so hosts and tests
/// can read a run's output back without capturing the tracing stream.
pub const LOG_VAR: &str = "__log__";

/// Emits a log message, with `{name}` placeholders interpolated from context
/// variables.
pub struct PrintLog {
    message: Result<String, weft_core::CoreError>,
    level: String,
}

impl PrintLog {
    /// Build from a step's parameters
    pub fn from_params(params: Params) -> Box<dyn Action> {
        Box::new(PrintLog {
            message: require_str(&params, "message"),
            level: str_or(&params, "level", "info"),
        })
    }
}

/// Replace `{name}` placeholders with the named variables' display values.
/// Unknown placeholders are left in place.
fn interpolate(template: &str, ctx: &Context) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) => {
                let name = &after[..close];
                match ctx.get(name) {
                    Some(Value::String(s)) => out.push_str(s),
                    Some(value) => out.push_str(&value.to_string()),
                    None => {
                        out.push('{');
                        out.push_str(name);
                        out.push('}');
                    }
                }
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

impl Action for PrintLog {
    fn name(&self) -> &str {
        "PrintLog"
    }

    fn description(&self) -> &str {
        "Emits a log message with variable interpolation"
    }

    fn execute(&self, ctx: &mut Context, _runner: &dyn StepRunner) -> Result<bool, ExecInterrupt> {
        let message = self.message.clone()?;
        let rendered = interpolate(&message, ctx);

        match self.level.as_str() {
            "debug" => debug!("{}", rendered),
            "warn" => warn!("{}", rendered),
            "error" => error!("{}", rendered),
            _ => info!("{}", rendered),
        }

        let mut lines = ctx
            .get(LOG_VAR)
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        lines.push(json!(rendered));
        ctx.set(LOG_VAR, Value::Array(lines));
        Ok(true)
    }

    fn param_schema(&self) -> Vec<ParamField> {
        vec![
            ParamField::new("message", ParamKind::Text).required(),
            ParamField::new("level", ParamKind::Options)
                .with_options(&["debug", "info", "warn", "error"]),
        ]
    }
}
