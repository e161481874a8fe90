//! Conversion between the two representations of a workflow:
//!
//! * the **flat** form, where loop bodies and if/elseif/else chains are
//!   delimited by position and `EndMarker` sentinels, as persisted to disk
//!   and produced incrementally by the tree editor;
//! * the **nested** form, where logic-bearing steps own a `children` list,
//!   as consumed by the recursive execution engine.
//!
//! [`nest_steps`] performs the flat-to-nested direction with a single
//! left-to-right scan over an explicit stack of open logic frames.
//! [`flatten_steps`] is its inverse; round-tripping a well-formed flat list
//! through both reproduces its canonical form.

use tracing::warn;

use crate::error::{error_codes, StructureError};
use crate::step::{Scope, Step, StepKind};

/// How the normalizer treats malformed input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NestMode {
    /// Reject any structural violation. Required before execution.
    Strict,
    /// Best-effort repair for display of malformed or in-progress editor
    /// state: unmatched markers are dropped and frames still open at end of
    /// input are force-closed. Never used to drive execution.
    Lenient,
}

/// One open logic region during the scan.
enum Frame {
    /// A loop header accumulating its body.
    Loop { header: Step, body: Vec<Step> },
    /// An if/elseif/else chain: branches sealed so far, plus the branch
    /// currently accumulating its body.
    IfChain {
        sealed: Vec<Step>,
        branch: Step,
        body: Vec<Step>,
    },
}

impl Frame {
    fn scope(&self) -> Scope {
        match self {
            Frame::Loop { .. } => Scope::Loop,
            Frame::IfChain { .. } => Scope::If,
        }
    }

    /// Append a finished child to the currently accumulating body.
    fn push(&mut self, step: Step) {
        match self {
            Frame::Loop { body, .. } => body.push(step),
            Frame::IfChain { body, .. } => body.push(step),
        }
    }

    /// Close the frame, yielding the nested steps it contributes to its
    /// parent: one loop header, or every branch of a chain as consecutive
    /// siblings.
    fn close(self) -> Vec<Step> {
        match self {
            Frame::Loop { mut header, body } => {
                header.children = Some(body);
                vec![header]
            }
            Frame::IfChain {
                mut sealed,
                mut branch,
                body,
            } => {
                branch.children = Some(body);
                sealed.push(branch);
                sealed
            }
        }
    }
}

/// Convert a flat, marker-delimited step list into a strictly nested tree.
///
/// Input steps are canonicalized first (editor-only fields stripped,
/// `params["children"]` hoisted), so either representation is accepted on
/// read: a step that already carries `children` is treated as an
/// already-nested subtree and passes through without consuming a marker.
///
/// In the output no EndMarker remains; loop headers own their body and the
/// branches of an if/elseif/else chain stay distinct sibling nodes, each
/// owning its own body, so the engine can evaluate branch conditions in
/// declared order.
pub fn nest_steps(steps: &[Step], mode: NestMode) -> Result<Vec<Step>, StructureError> {
    let strict = mode == NestMode::Strict;
    let mut top: Vec<Step> = Vec::new();
    let mut stack: Vec<Frame> = Vec::new();

    for raw in steps {
        let line = raw.line;
        let step = raw.canonical();

        // Already-nested subtrees pass through opaquely; their boundary is
        // structural, not marker-delimited.
        if step.children.is_some() {
            push_child(&mut stack, &mut top, step);
            continue;
        }

        match step.kind() {
            StepKind::Loop(_) => {
                stack.push(Frame::Loop {
                    header: step,
                    body: Vec::new(),
                });
            }
            StepKind::If => {
                stack.push(Frame::IfChain {
                    sealed: Vec::new(),
                    branch: step,
                    body: Vec::new(),
                });
            }
            StepKind::ElseIf | StepKind::Else => match stack.last_mut() {
                Some(Frame::IfChain {
                    sealed,
                    branch,
                    body,
                }) => {
                    // Seal the previous branch and start accumulating this one.
                    let mut done = std::mem::replace(branch, step);
                    done.children = Some(std::mem::take(body));
                    sealed.push(done);
                }
                _ => {
                    if strict {
                        return Err(StructureError::new(
                            error_codes::ORPHAN_BRANCH,
                            "branch step does not continue an open If chain",
                        )
                        .with_step(step.label())
                        .with_line(line));
                    }
                    warn!(step = step.label(), "orphan branch step kept as plain child");
                    push_child(&mut stack, &mut top, step);
                }
            },
            StepKind::EndMarker(scope) => {
                let Some(scope) = scope else {
                    if strict {
                        return Err(StructureError::new(
                            error_codes::INVALID_SCOPE,
                            "EndMarker has a missing or unknown scope",
                        )
                        .with_step(step.label())
                        .with_line(line));
                    }
                    warn!("dropping EndMarker with invalid scope");
                    continue;
                };
                match stack.last() {
                    Some(frame) if frame.scope() == scope => {
                        let closed = stack.pop().expect("frame stack is non-empty").close();
                        for nested in closed {
                            push_child(&mut stack, &mut top, nested);
                        }
                    }
                    Some(frame) => {
                        if strict {
                            return Err(StructureError::new(
                                error_codes::SCOPE_MISMATCH,
                                format!(
                                    "EndMarker scope '{}' does not match the open '{}' frame",
                                    scope,
                                    frame.scope()
                                ),
                            )
                            .with_step(step.label())
                            .with_line(line));
                        }
                        warn!(marker = %scope, open = %frame.scope(), "dropping mismatched EndMarker");
                    }
                    None => {
                        if strict {
                            return Err(StructureError::new(
                                error_codes::UNMATCHED_END_MARKER,
                                format!("EndMarker scope '{}' has no open frame to close", scope),
                            )
                            .with_step(step.label())
                            .with_line(line));
                        }
                        warn!(marker = %scope, "dropping unmatched EndMarker");
                    }
                }
            }
            StepKind::Plain => push_child(&mut stack, &mut top, step),
        }
    }

    if !stack.is_empty() {
        if strict {
            let label = match stack.first().expect("frame stack is non-empty") {
                Frame::Loop { header, .. } => header.label().to_string(),
                Frame::IfChain { branch, .. } => branch.label().to_string(),
            };
            return Err(StructureError::new(
                error_codes::UNTERMINATED_BLOCK,
                "logic block is not closed by a matching EndMarker",
            )
            .with_step(&label));
        }
        warn!(open_frames = stack.len(), "force-closing unterminated logic blocks");
        while let Some(frame) = stack.pop() {
            for nested in frame.close() {
                push_child(&mut stack, &mut top, nested);
            }
        }
    }

    Ok(top)
}

/// Append a finished nested step to the innermost open frame, or to the top
/// level when no frame is open.
fn push_child(stack: &mut Vec<Frame>, top: &mut Vec<Step>, step: Step) {
    match stack.last_mut() {
        Some(frame) => frame.push(step),
        None => top.push(step),
    }
}

/// Convert a nested step tree back to the flat, marker-delimited form.
///
/// For each logic-bearing node the walk emits the node, its flattened
/// children, then the closing EndMarker; an if/elseif/else chain emits one
/// `scope = "if"` marker after its last branch. Steps without children, and
/// EndMarkers already present in the input, pass through unchanged, so
/// flattening an already-flat list is the identity.
pub fn flatten_steps(steps: &[Step]) -> Vec<Step> {
    let mut out = Vec::new();
    let mut i = 0;

    while i < steps.len() {
        let step = &steps[i];
        match step.kind() {
            StepKind::Loop(_) if step.children.is_some() => {
                emit_branch(&mut out, step);
                out.push(Step::end_marker(Scope::Loop));
                i += 1;
            }
            StepKind::If if step.children.is_some() => {
                emit_branch(&mut out, step);
                i += 1;
                while i < steps.len()
                    && matches!(steps[i].kind(), StepKind::ElseIf | StepKind::Else)
                {
                    emit_branch(&mut out, &steps[i]);
                    i += 1;
                }
                out.push(Step::end_marker(Scope::If));
            }
            _ => {
                out.push(step.clone());
                i += 1;
            }
        }
    }
    out
}

/// Emit a logic header or chain branch followed by its flattened body.
fn emit_branch(out: &mut Vec<Step>, step: &Step) {
    let mut header = step.clone();
    let children = header.children.take().unwrap_or_default();
    out.push(header);
    out.extend(flatten_steps(&children));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::LoopKind;
    use serde_json::json;

    fn flat_loop_with_body() -> Vec<Step> {
        vec![
            Step::new("For").with_param("count", json!(3)),
            Step::new("PrintLog").with_param("message", json!("tick")),
            Step::end_marker(Scope::Loop),
            Step::new("PrintLog").with_param("message", json!("done")),
        ]
    }

    #[test]
    fn test_nest_loop_body() {
        let nested = nest_steps(&flat_loop_with_body(), NestMode::Strict).unwrap();
        assert_eq!(nested.len(), 2);
        assert_eq!(nested[0].kind(), StepKind::Loop(LoopKind::For));

        let body = nested[0].children.as_ref().unwrap();
        assert_eq!(body.len(), 1);
        assert_eq!(body[0].tool_name.as_deref(), Some("PrintLog"));
        assert_eq!(nested[1].params["message"], json!("done"));
    }

    #[test]
    fn test_nest_if_chain_keeps_branches_as_siblings() {
        let flat = vec![
            Step::new("If").with_param("cond", json!("x==1")),
            Step::new("PrintLog").with_param("message", json!("one")),
            Step::new("ElseIf").with_param("cond", json!("x==2")),
            Step::new("PrintLog").with_param("message", json!("two")),
            Step::new("Else"),
            Step::new("PrintLog").with_param("message", json!("other")),
            Step::end_marker(Scope::If),
        ];

        let nested = nest_steps(&flat, NestMode::Strict).unwrap();
        assert_eq!(nested.len(), 3);
        assert_eq!(nested[0].kind(), StepKind::If);
        assert_eq!(nested[1].kind(), StepKind::ElseIf);
        assert_eq!(nested[2].kind(), StepKind::Else);
        for branch in &nested {
            assert_eq!(branch.children.as_ref().unwrap().len(), 1);
        }
    }

    #[test]
    fn test_nest_doubly_nested_loops() {
        let flat = vec![
            Step::new("ForEach").with_param("items", json!([1, 2])),
            Step::new("While").with_param("cond", json!("x")),
            Step::new("Break"),
            Step::end_marker(Scope::Loop),
            Step::end_marker(Scope::Loop),
        ];

        let nested = nest_steps(&flat, NestMode::Strict).unwrap();
        assert_eq!(nested.len(), 1);
        let inner = &nested[0].children.as_ref().unwrap()[0];
        assert_eq!(inner.kind(), StepKind::Loop(LoopKind::While));
        assert_eq!(inner.children.as_ref().unwrap().len(), 1);
    }

    #[test]
    fn test_nest_chain_nested_in_loop() {
        let flat = vec![
            Step::new("For").with_param("count", json!(1)),
            Step::new("If").with_param("cond", json!("x==1")),
            Step::new("PrintLog"),
            Step::end_marker(Scope::If),
            Step::end_marker(Scope::Loop),
        ];

        let nested = nest_steps(&flat, NestMode::Strict).unwrap();
        let body = nested[0].children.as_ref().unwrap();
        assert_eq!(body.len(), 1);
        assert_eq!(body[0].kind(), StepKind::If);
    }

    #[test]
    fn test_disabled_header_still_consumes_its_region() {
        let flat = vec![
            Step::new("For").with_param("count", json!(3)).with_disabled(true),
            Step::new("PrintLog"),
            Step::end_marker(Scope::Loop),
            Step::new("SetVariable"),
        ];

        let nested = nest_steps(&flat, NestMode::Strict).unwrap();
        assert_eq!(nested.len(), 2);
        assert!(nested[0].disabled);
        assert_eq!(nested[0].children.as_ref().unwrap().len(), 1);
        assert_eq!(nested[1].tool_name.as_deref(), Some("SetVariable"));
    }

    #[test]
    fn test_strict_rejects_unmatched_end_marker() {
        let flat = vec![Step::new("PrintLog"), Step::end_marker(Scope::Loop)];
        let err = nest_steps(&flat, NestMode::Strict).unwrap_err();
        assert_eq!(err.code, error_codes::UNMATCHED_END_MARKER);
    }

    #[test]
    fn test_strict_rejects_scope_mismatch() {
        // A loop header closed by an if-scoped marker
        let flat = vec![
            Step::new("For").with_param("count", json!(3)),
            Step::end_marker(Scope::If),
        ];
        let err = nest_steps(&flat, NestMode::Strict).unwrap_err();
        assert_eq!(err.code, error_codes::SCOPE_MISMATCH);

        // And the reverse: an open If closed by a loop-scoped marker
        let flat = vec![Step::new("If"), Step::end_marker(Scope::Loop)];
        let err = nest_steps(&flat, NestMode::Strict).unwrap_err();
        assert_eq!(err.code, error_codes::SCOPE_MISMATCH);
    }

    #[test]
    fn test_strict_rejects_orphan_branch() {
        let flat = vec![Step::new("ElseIf").with_param("cond", json!("x==2"))];
        let err = nest_steps(&flat, NestMode::Strict).unwrap_err();
        assert_eq!(err.code, error_codes::ORPHAN_BRANCH);
    }

    #[test]
    fn test_branch_after_sealed_chain_is_orphan() {
        // The EndMarker closes the whole chain; a following ElseIf must not
        // be treated as continuing it.
        let flat = vec![
            Step::new("If").with_param("cond", json!("x==1")),
            Step::end_marker(Scope::If),
            Step::new("ElseIf").with_param("cond", json!("x==2")),
        ];
        let err = nest_steps(&flat, NestMode::Strict).unwrap_err();
        assert_eq!(err.code, error_codes::ORPHAN_BRANCH);
    }

    #[test]
    fn test_branch_inside_loop_is_orphan() {
        // Innermost open frame is a loop, so ElseIf has no chain to continue
        let flat = vec![
            Step::new("While").with_param("cond", json!("x")),
            Step::new("ElseIf"),
            Step::end_marker(Scope::Loop),
        ];
        let err = nest_steps(&flat, NestMode::Strict).unwrap_err();
        assert_eq!(err.code, error_codes::ORPHAN_BRANCH);
    }

    #[test]
    fn test_strict_rejects_unterminated_block() {
        let flat = vec![Step::new("For").with_param("count", json!(3)), Step::new("PrintLog")];
        let err = nest_steps(&flat, NestMode::Strict).unwrap_err();
        assert_eq!(err.code, error_codes::UNTERMINATED_BLOCK);
        assert_eq!(err.step.as_deref(), Some("For"));
    }

    #[test]
    fn test_strict_rejects_invalid_marker_scope() {
        let flat = vec![
            Step::new("For").with_param("count", json!(1)),
            Step::new("EndMarker").with_param("scope", json!("block")),
        ];
        let err = nest_steps(&flat, NestMode::Strict).unwrap_err();
        assert_eq!(err.code, error_codes::INVALID_SCOPE);
    }

    #[test]
    fn test_lenient_force_closes_open_frames() {
        let flat = vec![
            Step::new("For").with_param("count", json!(3)),
            Step::new("PrintLog"),
        ];
        let nested = nest_steps(&flat, NestMode::Lenient).unwrap();
        assert_eq!(nested.len(), 1);
        assert_eq!(nested[0].children.as_ref().unwrap().len(), 1);
    }

    #[test]
    fn test_lenient_drops_unmatched_marker() {
        let flat = vec![
            Step::new("PrintLog"),
            Step::end_marker(Scope::If),
            Step::new("SetVariable"),
        ];
        let nested = nest_steps(&flat, NestMode::Lenient).unwrap();
        assert_eq!(nested.len(), 2);
        assert!(nested.iter().all(|s| !s.is_end_marker()));
    }

    #[test]
    fn test_already_nested_subtree_passes_through() {
        let steps = vec![Step::new("For")
            .with_param("count", json!(2))
            .with_children(vec![Step::new("PrintLog")])];

        // No EndMarker required: the subtree boundary is structural
        let nested = nest_steps(&steps, NestMode::Strict).unwrap();
        assert_eq!(nested.len(), 1);
        assert_eq!(nested[0].children.as_ref().unwrap().len(), 1);
    }

    #[test]
    fn test_flatten_emits_markers() {
        let nested = nest_steps(&flat_loop_with_body(), NestMode::Strict).unwrap();
        let flat = flatten_steps(&nested);

        assert_eq!(flat.len(), 4);
        assert_eq!(flat[2].end_scope(), Some(Scope::Loop));
        assert!(flat.iter().all(|s| s.children.is_none()));
    }

    #[test]
    fn test_flatten_chain_emits_single_if_marker() {
        let nested = vec![
            Step::new("If")
                .with_param("cond", json!("x==1"))
                .with_children(vec![Step::new("PrintLog")]),
            Step::new("Else").with_children(vec![Step::new("SetVariable")]),
        ];
        let flat = flatten_steps(&nested);

        let markers: Vec<_> = flat.iter().filter(|s| s.is_end_marker()).collect();
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].end_scope(), Some(Scope::If));
        assert_eq!(flat.last().unwrap().end_scope(), Some(Scope::If));
    }

    #[test]
    fn test_flatten_of_flat_list_is_identity() {
        let flat = flat_loop_with_body();
        assert_eq!(flatten_steps(&flat), flat);
    }
}
