use crate::{error::EvalError, eval::core::EvalResult};

/// Identifies an experimental language feature.
///
/// Each gated expression form names the feature it requires; evaluating
/// such a form with the feature disabled raises
/// [`EvalError::ExperimentalFeatureDisabled`] rather than silently
/// succeeding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    /// Gates evaluation of `assert()` expressions.
    AssertExpression,
    /// Gates evaluation of `echo()` expressions.
    EchoExpression,
    /// Gates evaluation of `each` comprehension elements.
    EachExpression,
    /// Gates evaluation of C-style `for (init; cond; incr)` comprehensions.
    ForCExpression,
    /// Gates the `else` branch of comprehension `if` elements.
    ElseExpression,
}

impl Feature {
    /// Gets the feature's option name as shown to users.
    ///
    /// ## Example
    /// ```
    /// use carve::features::Feature;
    ///
    /// assert_eq!(Feature::EachExpression.name(), "each-expression");
    /// ```
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::AssertExpression => "assert-expression",
            Self::EchoExpression => "echo-expression",
            Self::EachExpression => "each-expression",
            Self::ForCExpression => "for-c-expression",
            Self::ElseExpression => "else-expression",
        }
    }
}

/// The set of enabled experimental features.
///
/// The set is decided once at startup and injected into the evaluation
/// [`Session`](crate::eval::session::Session); nothing in the core mutates
/// it afterwards. The parser consults the same set when reducing
/// `assert`/`echo` call expressions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeatureSet {
    /// Enables `assert()` expressions.
    pub assert_expression: bool,
    /// Enables `echo()` expressions.
    pub echo_expression:   bool,
    /// Enables `each` comprehension elements.
    pub each_expression:   bool,
    /// Enables C-style comprehension loops.
    pub for_c_expression:  bool,
    /// Enables `else` branches in comprehension `if` elements.
    pub else_expression:   bool,
}

impl FeatureSet {
    /// Creates a set with every experimental feature disabled.
    #[must_use]
    pub const fn none() -> Self {
        Self { assert_expression: false,
               echo_expression:   false,
               each_expression:   false,
               for_c_expression:  false,
               else_expression:   false, }
    }

    /// Creates a set with every experimental feature enabled.
    #[must_use]
    pub const fn all() -> Self {
        Self { assert_expression: true,
               echo_expression:   true,
               each_expression:   true,
               for_c_expression:  true,
               else_expression:   true, }
    }

    /// Tests whether a feature is enabled in this set.
    #[must_use]
    pub const fn is_enabled(&self, feature: Feature) -> bool {
        match feature {
            Feature::AssertExpression => self.assert_expression,
            Feature::EchoExpression => self.echo_expression,
            Feature::EachExpression => self.each_expression,
            Feature::ForCExpression => self.for_c_expression,
            Feature::ElseExpression => self.else_expression,
        }
    }

    /// Requires a feature, failing when it is disabled.
    ///
    /// # Errors
    /// Returns [`EvalError::ExperimentalFeatureDisabled`] naming the
    /// feature when it is not enabled in this set.
    ///
    /// ## Example
    /// ```
    /// use carve::features::{Feature, FeatureSet};
    ///
    /// assert!(FeatureSet::all().require(Feature::EachExpression).is_ok());
    /// assert!(FeatureSet::none().require(Feature::EachExpression).is_err());
    /// ```
    pub const fn require(&self, feature: Feature) -> EvalResult<()> {
        if self.is_enabled(feature) {
            Ok(())
        } else {
            Err(EvalError::ExperimentalFeatureDisabled { feature: feature.name(), })
        }
    }
}
