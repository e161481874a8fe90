//! # Weft DSL
//!
//! Document model and normalization for Weft workflows. A workflow is an
//! ordered list of [`Step`]s that exists in two equivalent representations:
//!
//! * a **flat** list where loop bodies and if/elseif/else chains are closed
//!   by sentinel `EndMarker` steps (the shape persisted to disk and edited
//!   incrementally by the tree editor);
//! * a **nested** tree where logic-bearing steps own their `children` (the
//!   shape the execution engine walks recursively).
//!
//! [`nest_steps`] and [`flatten_steps`] convert between the two; round-
//! tripping a well-formed flat list reproduces its canonical form.
//!
//! ## Example
//!
//! ```
//! use weft_dsl::{nest_steps, flatten_steps, NestMode, Scope, Step};
//! use serde_json::json;
//!
//! let flat = vec![
//!     Step::new("For").with_param("count", json!(3)),
//!     Step::new("PrintLog").with_param("message", json!("tick")),
//!     Step::end_marker(Scope::Loop),
//! ];
//!
//! let nested = nest_steps(&flat, NestMode::Strict).unwrap();
//! assert_eq!(nested.len(), 1);
//! assert_eq!(nested[0].children.as_ref().unwrap().len(), 1);
//!
//! // The inverse walk restores the marker-delimited form.
//! assert_eq!(flatten_steps(&nested), flat);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod document;
mod error;
mod hierarchy;
mod step;

pub use document::FlowDocument;
pub use error::{error_codes, DslError, StructureError};
pub use hierarchy::{flatten_steps, nest_steps, NestMode};
pub use step::{
    canonical_steps, LoopKind, Scope, Step, StepKind, CHILDREN_PARAM, END_MARKER_TOOL, SCOPE_PARAM,
};
