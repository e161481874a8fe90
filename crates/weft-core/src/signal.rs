use std::fmt;

use crate::CoreError;

/// A non-local control transfer requested by an action.
///
/// Signals are not errors: `Break` and `Continue` are handled by the nearest
/// enclosing loop frame, while `Exit` unwinds the entire run and is recorded
/// by the top-level engine as a deliberate termination with a caller-supplied
/// code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowSignal {
    /// Terminate the innermost enclosing loop
    Break,
    /// Skip to the innermost enclosing loop's next iteration
    Continue,
    /// Terminate the whole run immediately with the given exit code
    Exit(i32),
}

impl fmt::Display for FlowSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowSignal::Break => write!(f, "Break"),
            FlowSignal::Continue => write!(f, "Continue"),
            FlowSignal::Exit(code) => write!(f, "Exit({})", code),
        }
    }
}

/// The single non-success channel flowing up through `execute` and
/// `run_children` calls.
///
/// Loop actions pattern-match `Signal(Break)` and `Signal(Continue)` and let
/// everything else pass through untouched; `Signal(Exit)` and `Fault` unwind
/// every frame to the top of the run.
#[derive(Debug)]
pub enum ExecInterrupt {
    /// A flow-control signal on its way to the frame that handles it
    Signal(FlowSignal),
    /// A fatal fault that aborts the run
    Fault(CoreError),
}

impl From<FlowSignal> for ExecInterrupt {
    fn from(signal: FlowSignal) -> Self {
        ExecInterrupt::Signal(signal)
    }
}

impl From<CoreError> for ExecInterrupt {
    fn from(err: CoreError) -> Self {
        ExecInterrupt::Fault(err)
    }
}

impl fmt::Display for ExecInterrupt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecInterrupt::Signal(signal) => write!(f, "flow signal {}", signal),
            ExecInterrupt::Fault(err) => write!(f, "{}", err),
        }
    }
}
