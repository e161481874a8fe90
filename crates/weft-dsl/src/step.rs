use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Tool name of the sentinel step that closes a logic body in flat form.
pub const END_MARKER_TOOL: &str = "EndMarker";

/// Parameter key carrying an EndMarker's scope (`"loop"` or `"if"`).
pub const SCOPE_PARAM: &str = "scope";

/// Parameter key under which nested children may be embedded in `params`.
pub const CHILDREN_PARAM: &str = "children";

/// The loop-family logic kinds. Each owns a single governed body closed by
/// an `EndMarker` with `scope = "loop"` in flat form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopKind {
    /// Fixed-count loop
    For,
    /// Iterate over a list
    ForEach,
    /// Iterate over a mapping's entries
    ForEachDict,
    /// Loop while a condition holds
    While,
}

/// The scope an EndMarker closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Closes a loop body
    Loop,
    /// Closes an entire if/elseif/else chain
    If,
}

impl Scope {
    /// The wire representation of this scope
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Loop => "loop",
            Scope::If => "if",
        }
    }

    /// Parse a wire scope string; unknown scopes yield `None`
    pub fn parse(s: &str) -> Option<Scope> {
        match s {
            "loop" => Some(Scope::Loop),
            "if" => Some(Scope::If),
            _ => None,
        }
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structural classification of a step, derived from its tool name.
///
/// An `EndMarker` with a missing or unknown `scope` param classifies as
/// `EndMarker(None)`; the normalizer rejects it in strict mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    /// A loop header owning a body
    Loop(LoopKind),
    /// Opens an if/elseif/else chain
    If,
    /// Continues an open chain with its own condition
    ElseIf,
    /// Unconditional final branch of a chain
    Else,
    /// Sentinel closing a logic body or chain in flat form
    EndMarker(Option<Scope>),
    /// Any other executable step
    Plain,
}

/// The atomic unit of a workflow.
///
/// A step references an action implementation through `id` (or, as a
/// fallback, `tool_name`), carries an ordered parameter mapping, and, in
/// nested form, may own an ordered list of child steps. `line` and
/// `expanded` are editor-only annotations with no semantic meaning to the
/// engine; they are stripped by [`Step::canonical`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Step {
    /// Tool identifier; resolved against the registry first
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Human-readable display label; used for lookups when `id` is absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,

    /// Ordered, action-specific parameter mapping
    #[serde(default)]
    pub params: Map<String, Value>,

    /// A disabled step (and its whole governed range) is skipped by the engine
    #[serde(default, skip_serializing_if = "is_false")]
    pub disabled: bool,

    /// Editor-only 1-based position annotation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,

    /// Editor-only expansion state
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expanded: Option<bool>,

    /// Child steps; present for logic-bearing steps in nested form
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<Step>>,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl Step {
    /// Create a plain step with the given tool name and no parameters
    pub fn new(tool_name: &str) -> Self {
        Step {
            id: None,
            tool_name: Some(tool_name.to_string()),
            params: Map::new(),
            disabled: false,
            line: None,
            expanded: None,
            children: None,
        }
    }

    /// Create an EndMarker sentinel closing the given scope
    pub fn end_marker(scope: Scope) -> Self {
        let mut step = Step::new(END_MARKER_TOOL);
        step.params
            .insert(SCOPE_PARAM.to_string(), Value::String(scope.as_str().to_string()));
        step
    }

    /// Set the tool identifier
    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    /// Add a parameter
    pub fn with_param(mut self, key: &str, value: Value) -> Self {
        self.params.insert(key.to_string(), value);
        self
    }

    /// Attach nested children
    pub fn with_children(mut self, children: Vec<Step>) -> Self {
        self.children = Some(children);
        self
    }

    /// Mark the step disabled
    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Structural classification, keyed on `tool_name` (falling back to `id`
    /// for steps that only carry an identifier).
    pub fn kind(&self) -> StepKind {
        let tool = self.tool_name.as_deref().or(self.id.as_deref());
        match tool {
            Some("For") => StepKind::Loop(LoopKind::For),
            Some("ForEach") => StepKind::Loop(LoopKind::ForEach),
            Some("ForEachDict") => StepKind::Loop(LoopKind::ForEachDict),
            Some("While") => StepKind::Loop(LoopKind::While),
            Some("If") => StepKind::If,
            Some("ElseIf") => StepKind::ElseIf,
            Some("Else") => StepKind::Else,
            Some(END_MARKER_TOOL) => StepKind::EndMarker(self.end_scope()),
            _ => StepKind::Plain,
        }
    }

    /// Whether this step is an EndMarker sentinel
    pub fn is_end_marker(&self) -> bool {
        matches!(self.kind(), StepKind::EndMarker(_))
    }

    /// Whether this step opens an if/elseif/else chain or continues one
    pub fn is_branch(&self) -> bool {
        matches!(self.kind(), StepKind::If | StepKind::ElseIf | StepKind::Else)
    }

    /// The scope of an EndMarker, if this step is one and its scope is valid
    pub fn end_scope(&self) -> Option<Scope> {
        self.params
            .get(SCOPE_PARAM)
            .and_then(|v| v.as_str())
            .and_then(Scope::parse)
    }

    /// Display label for diagnostics: `id` first, else `tool_name`
    pub fn label(&self) -> &str {
        self.id
            .as_deref()
            .or(self.tool_name.as_deref())
            .unwrap_or("<unnamed>")
    }

    /// Canonical form of this step: editor-only fields stripped and
    /// `params["children"]` hoisted into the top-level `children` field,
    /// applied recursively.
    ///
    /// When children are present in both locations the top-level field wins
    /// and the params copy is discarded, so a canonical step has exactly one
    /// location for nested content.
    pub fn canonical(&self) -> Step {
        let mut step = self.clone();
        step.line = None;
        step.expanded = None;

        let embedded = step.params.shift_remove(CHILDREN_PARAM);
        if step.children.is_none() {
            if let Some(value) = embedded {
                if let Ok(children) = serde_json::from_value::<Vec<Step>>(value) {
                    step.children = Some(children);
                }
            }
        }
        if let Some(children) = step.children.take() {
            step.children = Some(children.iter().map(Step::canonical).collect());
        }
        step
    }
}

/// Canonicalize a whole step list
pub fn canonical_steps(steps: &[Step]) -> Vec<Step> {
    steps.iter().map(Step::canonical).collect()
}
