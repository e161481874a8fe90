//! Condition expression evaluation for `If`/`ElseIf`/`While` actions.

use serde_json::Value;
use weft_core::{Context, CoreError};

/// Evaluates a condition expression against the run's variables.
///
/// The trait exists so hosts can plug in a richer expression language; the
/// bundled [`BasicConditionEvaluator`] covers simple comparisons.
pub trait ConditionEvaluator {
    /// Evaluate an expression to a boolean
    fn evaluate(&self, expression: &str, ctx: &Context) -> Result<bool, CoreError>;
}

/// Evaluator for expressions of the form `variable OP literal`.
///
/// Supported operators: `==`, `!=`, `>=`, `<=`, `>`, `<`. The left operand
/// names a context variable (an optional `$` prefix is accepted); the right
/// operand is a JSON literal, with an unquoted word falling back to a plain
/// string. A bare variable name with no operator evaluates to the variable's
/// truthiness: null and missing are false, booleans are themselves, numbers
/// are true when nonzero, strings and collections when non-empty.
#[derive(Debug, Default, Clone, Copy)]
pub struct BasicConditionEvaluator;

// Two-character operators first so "x>=1" does not split at ">".
const OPERATORS: [&str; 6] = ["==", "!=", ">=", "<=", ">", "<"];

impl BasicConditionEvaluator {
    fn lookup<'a>(&self, ctx: &'a Context, name: &str) -> Option<&'a Value> {
        let name = name.trim();
        let name = name.strip_prefix('$').unwrap_or(name);
        ctx.get(name)
    }

    fn parse_literal(&self, text: &str) -> Value {
        let text = text.trim();
        serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
    }
}

impl ConditionEvaluator for BasicConditionEvaluator {
    fn evaluate(&self, expression: &str, ctx: &Context) -> Result<bool, CoreError> {
        let expression = expression.trim();
        if expression.is_empty() {
            return Err(CoreError::InvalidParameter(
                "empty condition expression".to_string(),
            ));
        }

        for op in OPERATORS {
            if let Some(at) = expression.find(op) {
                let (left, rest) = expression.split_at(at);
                let right = &rest[op.len()..];
                if left.trim().is_empty() || right.trim().is_empty() {
                    return Err(CoreError::InvalidParameter(format!(
                        "malformed condition '{}'",
                        expression
                    )));
                }

                let value = self.lookup(ctx, left).cloned().unwrap_or(Value::Null);
                let literal = self.parse_literal(right);
                return Ok(compare(op, &value, &literal));
            }
        }

        // No operator: bare variable truthiness
        Ok(truthy(self.lookup(ctx, expression).unwrap_or(&Value::Null)))
    }
}

fn compare(op: &str, left: &Value, right: &Value) -> bool {
    match op {
        "==" => loose_eq(left, right),
        "!=" => !loose_eq(left, right),
        _ => match (left.as_f64(), right.as_f64()) {
            (Some(l), Some(r)) => match op {
                ">" => l > r,
                "<" => l < r,
                ">=" => l >= r,
                "<=" => l <= r,
                _ => false,
            },
            // Ordering comparisons only apply to numbers
            _ => false,
        },
    }
}

// Equality with numeric coercion, so `x == 1` matches both 1 and 1.0.
fn loose_eq(left: &Value, right: &Value) -> bool {
    if let (Some(l), Some(r)) = (left.as_f64(), right.as_f64()) {
        return l == r;
    }
    left == right
}

/// Truthiness of a context value
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ctx() -> Context {
        let mut ctx = Context::new();
        ctx.set("x", json!(1));
        ctx.set("ratio", json!(0.5));
        ctx.set("name", json!("weft"));
        ctx.set("flag", json!(true));
        ctx.set("items", json!([1, 2]));
        ctx.set("empty", json!(""));
        ctx
    }

    fn eval(expression: &str) -> bool {
        BasicConditionEvaluator.evaluate(expression, &ctx()).unwrap()
    }

    #[test]
    fn test_equality() {
        assert!(eval("x == 1"));
        assert!(eval("x==1"));
        assert!(!eval("x == 2"));
        assert!(eval("x != 2"));
        assert!(eval("name == \"weft\""));
        assert!(eval("name == weft"));
        assert!(eval("flag == true"));
    }

    #[test]
    fn test_numeric_coercion() {
        // Integer variable against a float literal still matches
        assert!(eval("x == 1.0"));
        assert!(eval("ratio < 1"));
    }

    #[test]
    fn test_ordering() {
        assert!(eval("x >= 1"));
        assert!(eval("x <= 1"));
        assert!(!eval("x > 1"));
        assert!(eval("ratio > 0.1"));
        // Ordering against a non-number is never true
        assert!(!eval("name > 1"));
    }

    #[test]
    fn test_bare_variable_truthiness() {
        assert!(eval("x"));
        assert!(eval("flag"));
        assert!(eval("name"));
        assert!(eval("items"));
        assert!(!eval("empty"));
        assert!(!eval("missing"));
        assert!(eval("$x"));
    }

    #[test]
    fn test_missing_variable_compares_as_null() {
        assert!(!eval("missing == 1"));
        assert!(eval("missing != 1"));
        assert!(eval("missing == null"));
    }

    #[test]
    fn test_malformed_expressions() {
        let evaluator = BasicConditionEvaluator;
        assert!(evaluator.evaluate("", &ctx()).is_err());
        assert!(evaluator.evaluate("== 1", &ctx()).is_err());
        assert!(evaluator.evaluate("x ==", &ctx()).is_err());
    }
}
