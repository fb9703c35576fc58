use std::{cell::Cell, rc::Rc};

use crate::{
    diag::{Level, LogSink, Message, MessageSink},
    error::EvalError,
    eval::core::EvalResult,
    features::{Feature, FeatureSet},
};

/// Default budget for nested function calls.
///
/// The evaluator recurses on the host stack, so the budget is set well
/// inside what a default thread stack tolerates.
pub const MAX_CALL_DEPTH: usize = 512;

/// Per-evaluation configuration and shared evaluation state.
///
/// A session owns everything that outlives individual context frames: the
/// immutable [`FeatureSet`], the diagnostic sink, and the call-depth
/// sentinel that defends against non-terminating user programs. Every
/// [`Context`](crate::eval::context::Context) in a chain borrows the same
/// session.
///
/// ## Example
/// ```
/// use carve::{eval::session::Session, features::FeatureSet};
///
/// let session = Session::new(FeatureSet::all());
/// assert!(session.features().each_expression);
/// ```
pub struct Session {
    features:       FeatureSet,
    max_call_depth: usize,
    call_depth:     Cell<usize>,
    sink:           Rc<dyn MessageSink>,
}

impl Session {
    /// Creates a session with the given features and the default sink,
    /// which reports through the `log` crate.
    #[must_use]
    pub fn new(features: FeatureSet) -> Self {
        Self::with_sink(features, Rc::new(LogSink))
    }

    /// Creates a session delivering diagnostics to a custom sink.
    #[must_use]
    pub fn with_sink(features: FeatureSet, sink: Rc<dyn MessageSink>) -> Self {
        Self { features,
               max_call_depth: MAX_CALL_DEPTH,
               call_depth: Cell::new(0),
               sink }
    }

    /// Replaces the call-depth budget.
    #[must_use]
    pub fn with_call_depth(mut self, max_call_depth: usize) -> Self {
        self.max_call_depth = max_call_depth;
        self
    }

    /// Gets the session's feature set.
    #[must_use]
    pub const fn features(&self) -> &FeatureSet {
        &self.features
    }

    /// Requires an experimental feature to be enabled.
    ///
    /// # Errors
    /// Returns [`EvalError::ExperimentalFeatureDisabled`] when it is not.
    pub const fn require_feature(&self, feature: Feature) -> EvalResult<()> {
        self.features.require(feature)
    }

    /// Emits a warning to the diagnostic sink.
    pub fn warning(&self, text: impl Into<String>) {
        self.sink.print(&Message { level: Level::Warning,
                                   text:  text.into(), });
    }

    /// Emits echo output to the diagnostic sink.
    pub fn echo(&self, text: impl Into<String>) {
        self.sink.print(&Message { level: Level::Echo,
                                   text:  text.into(), });
    }

    /// Enters a function call, enforcing the depth budget.
    ///
    /// The returned guard decrements the counter when dropped, so the
    /// depth stays balanced on every exit path, including error unwinds.
    ///
    /// # Errors
    /// Returns [`EvalError::Recursion`] naming the function when the
    /// budget is exhausted.
    pub(crate) fn enter_call(&self, name: &str) -> EvalResult<CallGuard<'_>> {
        let depth = self.call_depth.get() + 1;
        if depth > self.max_call_depth {
            return Err(EvalError::Recursion { kind: "function",
                                              name: name.to_string(), });
        }

        self.call_depth.set(depth);
        Ok(CallGuard { session: self })
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
         .field("features", &self.features)
         .field("max_call_depth", &self.max_call_depth)
         .field("call_depth", &self.call_depth.get())
         .finish_non_exhaustive()
    }
}

/// Balances the call-depth counter on scope exit.
pub(crate) struct CallGuard<'a> {
    session: &'a Session,
}

impl Drop for CallGuard<'_> {
    fn drop(&mut self) {
        let depth = self.session.call_depth.get();
        self.session.call_depth.set(depth - 1);
    }
}
