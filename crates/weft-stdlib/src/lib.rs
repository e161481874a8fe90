//! Standard library of actions for Weft workflows.
//!
//! Every action a workflow can reference out of the box lives here:
//! variable manipulation, logging, the loop family, branch chains and the
//! flow-control signals. [`register_builtins`] installs the whole set into
//! an [`ActionRegistry`]; hosts extend the registry with their own actions
//! afterwards.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod components;
pub mod conditions;
pub mod params;

use weft_core::ActionRegistry;

use crate::components::branches::{Else, ElseIf, If};
use crate::components::control::{Break, Continue, ExitFlow};
use crate::components::logging::PrintLog;
use crate::components::loops::{For, ForEach, ForEachDict, While};
use crate::components::variables::{DeleteVariable, SetVariable};

pub use crate::components::logging::LOG_VAR;

/// Register every built-in action under its snake_case identifier and its
/// display name.
pub fn register_builtins(registry: &mut ActionRegistry) {
    registry.register("set_variable", "SetVariable", SetVariable::from_params);
    registry.register("delete_variable", "DeleteVariable", DeleteVariable::from_params);
    registry.register("print_log", "PrintLog", PrintLog::from_params);

    registry.register("break", "Break", |_| Box::new(Break));
    registry.register("continue", "Continue", |_| Box::new(Continue));
    registry.register("exit_flow", "ExitFlow", ExitFlow::from_params);

    registry.register("for", "For", For::from_params);
    registry.register("for_each", "ForEach", ForEach::from_params);
    registry.register("for_each_dict", "ForEachDict", ForEachDict::from_params);
    registry.register("while", "While", While::from_params);

    registry.register("if", "If", If::from_params);
    registry.register("else_if", "ElseIf", ElseIf::from_params);
    registry.register("else", "Else", Else::from_params);
}
