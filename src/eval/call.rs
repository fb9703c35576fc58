use std::collections::HashMap;

use crate::{
    ast::{Assignment, Expr},
    eval::{context::Context, core::EvalResult},
    value::core::Value,
};

/// A call site: the caller's context plus the argument list.
///
/// A `CallContext` is built at every call boundary — function calls,
/// module instantiations, `assert`/`echo`, and the comprehension binding
/// forms — and holds the raw argument expressions until the callee decides
/// how to bind them. Argument expressions are evaluated lazily, in the
/// caller's scope.
///
/// ## Example
/// ```
/// use carve::{
///     ast::{Assignment, Expr, Location},
///     eval::{call::CallContext, context::Context, session::Session},
///     features::FeatureSet,
///     value::core::Value,
/// };
///
/// let session = Session::new(FeatureSet::none());
/// let context = Context::new(&session);
///
/// let arguments = vec![Assignment::positional(Expr::Literal { value: Value::Number(1.0),
///                                                             loc:   Location::NONE, },
///                                             Location::NONE)];
/// let call = CallContext::new(&context, &arguments);
///
/// assert_eq!(call.num_args(), 1);
/// assert_eq!(call.arg_name(0), "");
/// assert_eq!(call.arg_value(0, None).unwrap(), Value::Number(1.0));
/// ```
pub struct CallContext<'a> {
    context:   &'a Context<'a>,
    arguments: &'a [Assignment],
}

impl<'a> CallContext<'a> {
    /// Creates a call context over a caller scope and an argument list.
    #[must_use]
    pub const fn new(context: &'a Context<'a>, arguments: &'a [Assignment]) -> Self {
        Self { context, arguments }
    }

    /// Gets the caller's context.
    #[must_use]
    pub const fn context(&self) -> &'a Context<'a> {
        self.context
    }

    /// Counts the call-site arguments.
    #[must_use]
    pub const fn num_args(&self) -> usize {
        self.arguments.len()
    }

    /// Gets the name of argument `i`; empty for positional arguments.
    ///
    /// # Panics
    /// Panics when `i` is out of range; call sites iterate up to
    /// [`Self::num_args`].
    #[must_use]
    pub fn arg_name(&self, i: usize) -> &'a str {
        &self.arguments[i].name
    }

    /// Evaluates argument `i`.
    ///
    /// The expression is evaluated in `eval_in` when given, otherwise in
    /// the caller's context. An argument without an expression yields
    /// `undef`.
    ///
    /// # Errors
    /// Propagates any error raised by the argument expression.
    ///
    /// # Panics
    /// Panics when `i` is out of range; call sites iterate up to
    /// [`Self::num_args`].
    pub fn arg_value(&self, i: usize, eval_in: Option<&Context<'_>>) -> EvalResult<Value> {
        match &self.arguments[i].expr {
            Some(expr) => expr.evaluate(eval_in.unwrap_or(self.context)),
            None => Ok(Value::Undefined),
        }
    }

    /// Matches the call-site arguments against a declared parameter list.
    ///
    /// Walking the arguments in order: an argument named after a declared
    /// parameter binds that parameter; an unnamed argument binds the next
    /// parameter (in declared order) not already bound. Arguments naming
    /// no declared parameter, and unnamed arguments with no parameter
    /// left, are dropped. The returned map holds the unevaluated argument
    /// expressions keyed by parameter name; missing parameters are simply
    /// absent, leaving the callee to fall back to defaults or `undef`.
    ///
    /// ## Example
    /// ```
    /// use carve::{
    ///     ast::{Assignment, Expr, Location},
    ///     eval::{call::CallContext, context::Context, session::Session},
    ///     features::FeatureSet,
    ///     value::core::Value,
    /// };
    ///
    /// fn number(n: f64) -> Expr {
    ///     Expr::Literal { value: Value::Number(n),
    ///                     loc:   Location::NONE, }
    /// }
    ///
    /// let session = Session::new(FeatureSet::none());
    /// let context = Context::new(&session);
    ///
    /// // f(7, r = 2) against parameters (r, h)
    /// let arguments = vec![Assignment::positional(number(7.0), Location::NONE),
    ///                      Assignment::new("r", Some(number(2.0)), Location::NONE)];
    /// let parameters = vec![Assignment::new("r", None, Location::NONE),
    ///                       Assignment::new("h", None, Location::NONE)];
    ///
    /// let call = CallContext::new(&context, &arguments);
    /// let resolved = call.resolve_arguments(&parameters);
    ///
    /// assert_eq!(resolved.len(), 1);
    /// assert!(resolved.contains_key("r"));
    /// ```
    #[must_use]
    pub fn resolve_arguments<'p>(&self,
                                 parameters: &'p [Assignment])
                                 -> HashMap<&'p str, &'a Expr> {
        let mut resolved: HashMap<&'p str, &'a Expr> = HashMap::new();

        for arg in self.arguments {
            let Some(expr) = &arg.expr else {
                continue;
            };

            if arg.name.is_empty() {
                if let Some(parameter) =
                    parameters.iter()
                              .find(|p| !resolved.contains_key(p.name.as_str()))
                {
                    resolved.insert(&parameter.name, expr);
                }
            } else if let Some(parameter) = parameters.iter().find(|p| p.name == arg.name) {
                resolved.insert(&parameter.name, expr);
            }
        }

        resolved
    }

    /// Evaluates the argument list sequentially into a target context.
    ///
    /// Each expression is evaluated in `target` and bound there before the
    /// next one runs, so later assignments see earlier bindings. This is
    /// the binding rule of `let`, comprehension `let`, and the init and
    /// increment lists of the C-style loop.
    ///
    /// # Errors
    /// Propagates the first error raised by a binding expression.
    pub fn assign_to(&self, target: &mut Context<'_>) -> EvalResult<()> {
        for arg in self.arguments {
            let value = match &arg.expr {
                Some(expr) => expr.evaluate(target)?,
                None => Value::Undefined,
            };
            target.set_variable(arg.name.clone(), value);
        }
        Ok(())
    }
}
