//! Conditional branching: `If`, `ElseIf` and `Else`.
//!
//! The three actions of a chain cooperate through the context's
//! branch-taken slot: `If` opens a chain and records whether its branch
//! ran, `ElseIf` and `Else` consult that slot and only run while no earlier
//! branch has. The engine seals a chain as soon as any non-branch step is
//! dispatched at the same level, so `ElseIf`/`Else` encountering a sealed
//! slot is a structural fault.

use weft_core::{
    Action, Context, CoreError, ExecInterrupt, ParamField, ParamKind, Params, StepRunner,
};
use weft_dsl::Step;

use crate::conditions::{BasicConditionEvaluator, ConditionEvaluator};
use crate::params::{children, require_str};

/// Opens a branch chain; runs its body when its condition holds.
pub struct If {
    cond: Result<String, CoreError>,
    body: Vec<Step>,
}

impl If {
    /// Build from a step's parameters
    pub fn from_params(params: Params) -> Box<dyn Action> {
        Box::new(If {
            cond: require_str(&params, "cond"),
            body: children(&params),
        })
    }
}

impl Action for If {
    fn name(&self) -> &str {
        "If"
    }

    fn description(&self) -> &str {
        "Runs its body when a condition holds"
    }

    fn execute(&self, ctx: &mut Context, runner: &dyn StepRunner) -> Result<bool, ExecInterrupt> {
        let cond = self.cond.clone()?;
        let matched = BasicConditionEvaluator.evaluate(&cond, ctx)?;

        // Opening a new chain overwrites whatever chain state came before.
        ctx.set_branch_taken(matched);
        if matched {
            runner.run_children(&self.body, ctx)?;
        }
        Ok(true)
    }

    fn param_schema(&self) -> Vec<ParamField> {
        vec![ParamField::new("cond", ParamKind::String).required()]
    }
}

/// Continues an open chain with its own condition; runs only while no
/// earlier branch of the chain has.
pub struct ElseIf {
    cond: Result<String, CoreError>,
    body: Vec<Step>,
}

impl ElseIf {
    /// Build from a step's parameters
    pub fn from_params(params: Params) -> Box<dyn Action> {
        Box::new(ElseIf {
            cond: require_str(&params, "cond"),
            body: children(&params),
        })
    }
}

impl Action for ElseIf {
    fn name(&self) -> &str {
        "ElseIf"
    }

    fn description(&self) -> &str {
        "Runs its body when no earlier branch ran and its condition holds"
    }

    fn execute(&self, ctx: &mut Context, runner: &dyn StepRunner) -> Result<bool, ExecInterrupt> {
        match ctx.branch_taken() {
            None => Err(CoreError::ValidationError(
                "ElseIf without a preceding If at the same level".to_string(),
            )
            .into()),
            Some(true) => Ok(true),
            Some(false) => {
                let cond = self.cond.clone()?;
                let matched = BasicConditionEvaluator.evaluate(&cond, ctx)?;
                if matched {
                    ctx.set_branch_taken(true);
                    runner.run_children(&self.body, ctx)?;
                }
                Ok(true)
            }
        }
    }

    fn param_schema(&self) -> Vec<ParamField> {
        vec![ParamField::new("cond", ParamKind::String).required()]
    }
}

/// Unconditional final branch; runs only while no earlier branch of the
/// chain has.
pub struct Else {
    body: Vec<Step>,
}

impl Else {
    /// Build from a step's parameters
    pub fn from_params(params: Params) -> Box<dyn Action> {
        Box::new(Else {
            body: children(&params),
        })
    }
}

impl Action for Else {
    fn name(&self) -> &str {
        "Else"
    }

    fn description(&self) -> &str {
        "Runs its body when no earlier branch of the chain ran"
    }

    fn execute(&self, ctx: &mut Context, runner: &dyn StepRunner) -> Result<bool, ExecInterrupt> {
        match ctx.branch_taken() {
            None => Err(CoreError::ValidationError(
                "Else without a preceding If at the same level".to_string(),
            )
            .into()),
            Some(true) => Ok(true),
            Some(false) => {
                ctx.set_branch_taken(true);
                runner.run_children(&self.body, ctx)?;
                Ok(true)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct MarkingRunner;

    impl StepRunner for MarkingRunner {
        fn run_children(&self, steps: &[Step], ctx: &mut Context) -> Result<(), ExecInterrupt> {
            // Record which body ran through its first step's tool name.
            if let Some(step) = steps.first() {
                ctx.set("ran", json!(step.label()));
            }
            Ok(())
        }
    }

    fn params(value: serde_json::Value) -> Params {
        value.as_object().unwrap().clone()
    }

    fn body_params(cond: &str, tag: &str) -> Params {
        params(json!({
            "cond": cond,
            "children": [{ "tool_name": tag }]
        }))
    }

    #[test]
    fn test_if_true_runs_body_and_marks_taken() {
        let mut ctx = Context::new();
        ctx.set("x", json!(1));

        let action = If::from_params(body_params("x == 1", "then"));
        assert!(action.execute(&mut ctx, &MarkingRunner).unwrap());
        assert_eq!(ctx.get_str("ran"), Some("then"));
        assert_eq!(ctx.branch_taken(), Some(true));
    }

    #[test]
    fn test_if_false_skips_body() {
        let mut ctx = Context::new();
        ctx.set("x", json!(2));

        let action = If::from_params(body_params("x == 1", "then"));
        assert!(action.execute(&mut ctx, &MarkingRunner).unwrap());
        assert!(!ctx.contains("ran"));
        assert_eq!(ctx.branch_taken(), Some(false));
    }

    #[test]
    fn test_else_if_runs_when_chain_open_and_untaken() {
        let mut ctx = Context::new();
        ctx.set("x", json!(2));
        ctx.set_branch_taken(false);

        let action = ElseIf::from_params(body_params("x == 2", "elseif"));
        assert!(action.execute(&mut ctx, &MarkingRunner).unwrap());
        assert_eq!(ctx.get_str("ran"), Some("elseif"));
        assert_eq!(ctx.branch_taken(), Some(true));
    }

    #[test]
    fn test_else_if_skips_when_branch_already_taken() {
        let mut ctx = Context::new();
        ctx.set("x", json!(2));
        ctx.set_branch_taken(true);

        let action = ElseIf::from_params(body_params("x == 2", "elseif"));
        assert!(action.execute(&mut ctx, &MarkingRunner).unwrap());
        assert!(!ctx.contains("ran"));
    }

    #[test]
    fn test_orphan_branches_are_faults() {
        let mut ctx = Context::new();

        let action = ElseIf::from_params(body_params("x == 1", "elseif"));
        assert!(matches!(
            action.execute(&mut ctx, &MarkingRunner),
            Err(ExecInterrupt::Fault(CoreError::ValidationError(_)))
        ));

        let action = Else::from_params(params(json!({})));
        assert!(matches!(
            action.execute(&mut ctx, &MarkingRunner),
            Err(ExecInterrupt::Fault(CoreError::ValidationError(_)))
        ));
    }

    #[test]
    fn test_else_runs_when_nothing_matched() {
        let mut ctx = Context::new();
        ctx.set_branch_taken(false);

        let action = Else::from_params(params(json!({
            "children": [{ "tool_name": "fallback" }]
        })));
        assert!(action.execute(&mut ctx, &MarkingRunner).unwrap());
        assert_eq!(ctx.get_str("ran"), Some("fallback"));
        assert_eq!(ctx.branch_taken(), Some(true));
    }
}
