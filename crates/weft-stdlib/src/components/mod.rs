//! The built-in action implementations.

pub mod branches;
pub mod control;
pub mod logging;
pub mod loops;
pub mod variables;
