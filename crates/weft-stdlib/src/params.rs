//! Helpers for pulling typed values out of a step's parameter mapping.

use serde_json::Value;
use weft_core::{Context, CoreError, Params};
use weft_dsl::{Step, CHILDREN_PARAM};

/// Get a required string parameter
pub fn require_str(params: &Params, key: &str) -> Result<String, CoreError> {
    params
        .get(key)
        .and_then(Value::as_str)
        .map(String::from)
        .ok_or_else(|| CoreError::InvalidParameter(format!("missing required parameter '{}'", key)))
}

/// Get an optional string parameter
pub fn opt_str(params: &Params, key: &str) -> Option<String> {
    params.get(key).and_then(Value::as_str).map(String::from)
}

/// Get an optional string parameter with a default
pub fn str_or(params: &Params, key: &str, default: &str) -> String {
    opt_str(params, key).unwrap_or_else(|| default.to_string())
}

/// Get a required integer parameter
pub fn require_i64(params: &Params, key: &str) -> Result<i64, CoreError> {
    params
        .get(key)
        .and_then(Value::as_i64)
        .ok_or_else(|| CoreError::InvalidParameter(format!("missing required parameter '{}'", key)))
}

/// Get an optional integer parameter
pub fn opt_i64(params: &Params, key: &str) -> Option<i64> {
    params.get(key).and_then(Value::as_i64)
}

/// Extract the nested body a logic action governs.
///
/// The engine serializes a step's children under the `"children"` key before
/// instantiating the action; a step with no body yields an empty list.
pub fn children(params: &Params) -> Vec<Step> {
    params
        .get(CHILDREN_PARAM)
        .cloned()
        .and_then(|value| serde_json::from_value(value).ok())
        .unwrap_or_default()
}

/// Resolve a parameter value against the context.
///
/// A string of the form `"$name"` reads the variable `name` (missing
/// variables resolve to null); any other value passes through unchanged.
pub fn resolve_value(ctx: &Context, value: &Value) -> Value {
    if let Some(s) = value.as_str() {
        if let Some(name) = s.strip_prefix('$') {
            return ctx.get(name).cloned().unwrap_or(Value::Null);
        }
    }
    value.clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use weft_core::Params;

    fn params(value: Value) -> Params {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_require_str() {
        let p = params(json!({ "name": "x", "count": 3 }));
        assert_eq!(require_str(&p, "name").unwrap(), "x");
        assert!(require_str(&p, "count").is_err());
        assert!(require_str(&p, "missing").is_err());
    }

    #[test]
    fn test_children_extraction() {
        let p = params(json!({ "children": [{ "tool_name": "PrintLog" }] }));
        let body = children(&p);
        assert_eq!(body.len(), 1);
        assert_eq!(body[0].tool_name.as_deref(), Some("PrintLog"));

        assert!(children(&params(json!({}))).is_empty());
    }

    #[test]
    fn test_resolve_value() {
        let mut ctx = Context::new();
        ctx.set("x", json!(41));

        assert_eq!(resolve_value(&ctx, &json!("$x")), json!(41));
        assert_eq!(resolve_value(&ctx, &json!("$missing")), Value::Null);
        assert_eq!(resolve_value(&ctx, &json!("plain")), json!("plain"));
        assert_eq!(resolve_value(&ctx, &json!(5)), json!(5));
    }
}
