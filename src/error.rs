/// Represents the failures that abort an evaluation.
///
/// These are the only hard stops in the core: everything else (unknown
/// names, out-of-domain operands) recovers as `undef` plus a diagnostic.
/// An `EvalError` unwinds past every context frame to the caller that
/// started the evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    /// An `assert()` expression evaluated a false condition.
    AssertionFailed {
        /// The fully formatted failure message, quoting the condition's
        /// source form, the source line, and the user message if one was
        /// given.
        message: String,
    },
    /// Runaway recursion or a runaway C-style comprehension loop.
    Recursion {
        /// What recursed: `"function"` or `"for loop"`.
        kind: &'static str,
        /// The name of the recursing function; empty for loops.
        name: String,
    },
    /// A gated expression form was evaluated with its feature disabled.
    ExperimentalFeatureDisabled {
        /// The feature's option name (e.g. `each-expression`).
        feature: &'static str,
    },
}

impl std::fmt::Display for EvalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AssertionFailed { message } => write!(f, "{message}"),
            Self::Recursion { kind, name } => {
                if name.is_empty() {
                    write!(f, "ERROR: Recursion detected in {kind}.")
                } else {
                    write!(f, "ERROR: Recursion detected calling {kind} '{name}'.")
                }
            },
            Self::ExperimentalFeatureDisabled { feature } => {
                write!(f, "ERROR: Experimental feature not enabled: '{feature}'.")
            },
        }
    }
}

impl std::error::Error for EvalError {}
