use std::collections::HashMap;

use crate::{
    ast::{AssignmentList, Expr},
    eval::{builtin, call::CallContext, core::EvalResult, session::Session},
    value::core::Value,
};

/// A user-defined function: a parameter list and a body expression.
///
/// Functions are registered on the context frame of the scope that
/// declares them and are resolved by walking the chain upward, so an
/// inner scope can shadow an outer function.
#[derive(Debug, Clone, PartialEq)]
pub struct UserFunction {
    /// Declared parameters; expressions are default values.
    pub parameters: AssignmentList,
    /// The expression evaluated when the function is called.
    pub body:       Expr,
}

/// A user-defined module signature.
///
/// The module's body belongs to the geometry back-end; the expression core
/// only knows the parameter list, which it binds into a parameter context
/// when the module is instantiated.
#[derive(Debug, Clone, PartialEq)]
pub struct UserModule {
    /// Declared parameters; expressions are default values.
    pub parameters: AssignmentList,
}

/// A frame in the lexical scope chain.
///
/// Each frame maps names to values and borrows its parent, so the chain
/// mirrors the nesting of the syntactic scopes that created it: a frame is
/// created on entering a function body, `let` or comprehension binding and
/// dropped on scope exit, releasing its bindings on every exit path.
/// Lookup walks parents until the name is found; the chain never cycles
/// because parents strictly outlive children.
///
/// ## Example
/// ```
/// use carve::{
///     eval::{context::Context, session::Session},
///     features::FeatureSet,
///     value::core::Value,
/// };
///
/// let session = Session::new(FeatureSet::none());
/// let mut root = Context::new(&session);
/// root.set_variable("x", Value::Number(1.0));
///
/// let mut inner = root.child();
/// inner.set_variable("x", Value::Number(2.0));
///
/// // The child shadows, the parent is untouched.
/// assert_eq!(inner.lookup_variable("x", true), Value::Number(2.0));
/// drop(inner);
/// assert_eq!(root.lookup_variable("x", true), Value::Number(1.0));
/// ```
pub struct Context<'a> {
    variables: HashMap<String, Value>,
    functions: HashMap<String, UserFunction>,
    modules:   HashMap<String, UserModule>,
    parent:    Option<&'a Context<'a>>,
    session:   &'a Session,
}

impl<'a> Context<'a> {
    /// Creates a root context for one evaluation.
    #[must_use]
    pub fn new(session: &'a Session) -> Self {
        Self { variables: HashMap::new(),
               functions: HashMap::new(),
               modules: HashMap::new(),
               parent: None,
               session }
    }

    /// Creates a child frame whose lookups fall through to `self`.
    #[must_use]
    pub fn child(&self) -> Context<'_> {
        Context { variables: HashMap::new(),
                  functions: HashMap::new(),
                  modules:   HashMap::new(),
                  parent:    Some(self),
                  session:   self.session, }
    }

    /// Gets the session shared by this chain.
    #[must_use]
    pub const fn session(&self) -> &'a Session {
        self.session
    }

    /// Binds a name in this frame, shadowing any ancestor binding.
    pub fn set_variable(&mut self, name: impl Into<String>, value: Value) {
        self.variables.insert(name.into(), value);
    }

    /// Looks a variable up through the chain.
    ///
    /// Returns `undef` when the name is unbound anywhere; unless `silent`
    /// is set, the miss also emits a warning through the session's sink.
    #[must_use]
    pub fn lookup_variable(&self, name: &str, silent: bool) -> Value {
        let mut current = Some(self);
        while let Some(context) = current {
            if let Some(value) = context.variables.get(name) {
                return value.clone();
            }
            current = context.parent;
        }

        if !silent {
            self.session
                .warning(format!("Ignoring unknown variable '{name}'."));
        }
        Value::Undefined
    }

    /// Copies a published frame of bindings into this frame.
    ///
    /// Used by the C-style comprehension loop to publish the increment
    /// results computed in a scratch child frame back into the loop
    /// context.
    pub fn apply_variables(&mut self, bindings: HashMap<String, Value>) {
        self.variables.extend(bindings);
    }

    /// Consumes the frame, returning its local bindings.
    #[must_use]
    pub fn into_variables(self) -> HashMap<String, Value> {
        self.variables
    }

    /// Registers a user-defined function in this frame.
    pub fn register_function(&mut self, name: impl Into<String>, function: UserFunction) {
        self.functions.insert(name.into(), function);
    }

    /// Registers a user-defined module signature in this frame.
    pub fn register_module(&mut self, name: impl Into<String>, module: UserModule) {
        self.modules.insert(name.into(), module);
    }

    /// Evaluates a function call resolved through the chain.
    ///
    /// User-defined functions are searched frame by frame toward the root;
    /// when none matches, the builtin registry is consulted. An unknown
    /// name warns and yields `undef` — a bad call never aborts the
    /// evaluation.
    ///
    /// # Errors
    /// Propagates any error raised while evaluating arguments, defaults or
    /// the function body.
    pub fn evaluate_function(&self, name: &str, call: &CallContext<'_>) -> EvalResult<Value> {
        if let Some((definition, function)) = self.find_function(name) {
            let mut frame = definition.child();
            frame.set_parameters(&function.parameters, call)?;
            return function.body.evaluate(&frame);
        }

        if let Some(builtin) = builtin::find(name) {
            if !builtin.arity.check(call.num_args()) {
                self.session
                    .warning(format!("Wrong number of arguments for '{name}'."));
                return Ok(Value::Undefined);
            }

            let mut args = Vec::with_capacity(call.num_args());
            for i in 0..call.num_args() {
                args.push(call.arg_value(i, None)?);
            }
            return Ok((builtin.func)(&args));
        }

        self.session
            .warning(format!("Ignoring unknown function '{name}'."));
        Ok(Value::Undefined)
    }

    /// Binds a module instantiation's parameters for the geometry back-end.
    ///
    /// The module signature is resolved through the chain like a function;
    /// the returned context holds the fully bound parameters and chains to
    /// the module's defining scope. Unknown modules warn and return
    /// `None`.
    ///
    /// # Errors
    /// Propagates any error raised while evaluating arguments or defaults.
    pub fn bind_module_parameters(&self,
                                  name: &str,
                                  call: &CallContext<'_>)
                                  -> EvalResult<Option<Context<'_>>> {
        let Some((definition, module)) = self.find_module(name) else {
            self.session
                .warning(format!("Ignoring unknown module '{name}'."));
            return Ok(None);
        };

        let mut frame = definition.child();
        frame.set_parameters(&module.parameters, call)?;
        Ok(Some(frame))
    }

    /// Binds a declared parameter list against a call site.
    ///
    /// Defaults evaluate first, in the defining scope, and call-site
    /// arguments (evaluated in the caller's scope) overwrite them.
    /// Parameters with neither bind `undef` explicitly, keeping the body's
    /// lookups silent.
    pub(crate) fn set_parameters(&mut self,
                                 parameters: &AssignmentList,
                                 call: &CallContext<'_>)
                                 -> EvalResult<()> {
        for parameter in parameters {
            let Some(default) = &parameter.expr else {
                continue;
            };
            let value = match self.parent {
                Some(definition) => default.evaluate(definition)?,
                None => default.evaluate(self)?,
            };
            self.set_variable(parameter.name.clone(), value);
        }

        let resolved = call.resolve_arguments(parameters);
        for parameter in parameters {
            match resolved.get(parameter.name.as_str()) {
                Some(expr) => {
                    let value = expr.evaluate(call.context())?;
                    self.set_variable(parameter.name.clone(), value);
                },
                None if parameter.expr.is_none() => {
                    self.set_variable(parameter.name.clone(), Value::Undefined);
                },
                None => {},
            }
        }
        Ok(())
    }

    /// Finds a user function and the frame that declares it.
    fn find_function(&self, name: &str) -> Option<(&Context<'a>, &UserFunction)> {
        let mut current = Some(self);
        while let Some(context) = current {
            if let Some(function) = context.functions.get(name) {
                return Some((context, function));
            }
            current = context.parent;
        }
        None
    }

    /// Finds a user module signature and the frame that declares it.
    fn find_module(&self, name: &str) -> Option<(&Context<'a>, &UserModule)> {
        let mut current = Some(self);
        while let Some(context) = current {
            if let Some(module) = context.modules.get(name) {
                return Some((context, module));
            }
            current = context.parent;
        }
        None
    }
}

impl std::fmt::Debug for Context<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
         .field("variables", &self.variables)
         .field("depth", &{
             let mut depth = 0usize;
             let mut current = self.parent;
             while let Some(context) = current {
                 depth += 1;
                 current = context.parent;
             }
             depth
         })
         .finish_non_exhaustive()
    }
}
