use std::fmt::Write as _;

use crate::{
    ast::{Assignment, AssignmentList, Expr, Location},
    error::EvalError,
    eval::{call::CallContext, context::Context, core::EvalResult},
    features::Feature,
    value::core::Value,
};

/// Evaluates an `assert(condition, message)` expression.
///
/// The call arguments are resolved against the parameter list
/// `[condition, message]` and bound in a child frame (evaluated in the
/// caller's scope). A false condition aborts the evaluation with a
/// message quoting the condition's source form and line, plus the user
/// message when one was given. A passing assertion evaluates its body in
/// the child frame — so `condition` and `message` are visible there — and
/// returns its value, or `undef` without a body.
pub(super) fn eval_assert(context: &Context<'_>,
                          arguments: &AssignmentList,
                          body: Option<&Expr>,
                          loc: Location)
                          -> EvalResult<Value> {
    context.session().require_feature(Feature::AssertExpression)?;

    let parameters = vec![Assignment::new("condition", None, Location::NONE),
                          Assignment::new("message", None, Location::NONE)];

    let call = CallContext::new(context, arguments);
    let resolved = call.resolve_arguments(&parameters);

    let mut frame = context.child();
    for parameter in &parameters {
        if let Some(expr) = resolved.get(parameter.name.as_str()) {
            let value = expr.evaluate(context)?;
            frame.set_variable(parameter.name.clone(), value);
        }
    }

    let condition = frame.lookup_variable("condition", false);
    if !condition.to_bool() {
        let mut message = String::from("ERROR: Assertion");

        if let Some(expr) = resolved.get("condition") {
            let _ = write!(message, " '{expr}'");
        }
        let _ = write!(message, " failed, line {}", loc.first_line);

        let user_message = frame.lookup_variable("message", true);
        if user_message.is_defined() {
            let _ = write!(message, ": {}", user_message.to_echo_string());
        }

        return Err(EvalError::AssertionFailed { message });
    }

    match body {
        Some(body) => body.evaluate(&frame),
        None => Ok(Value::Undefined),
    }
}

/// Evaluates an `echo(...)` expression.
///
/// The arguments are evaluated in the caller's scope and written to the
/// diagnostic sink as `ECHO: name = value, ...` with strings in their
/// quoted echo form. The body — when present — evaluates in the caller's
/// scope, not in a child frame: echo binds nothing.
pub(super) fn eval_echo(context: &Context<'_>,
                        arguments: &AssignmentList,
                        body: Option<&Expr>)
                        -> EvalResult<Value> {
    context.session().require_feature(Feature::EchoExpression)?;

    let call = CallContext::new(context, arguments);

    let mut text = String::from("ECHO: ");
    for i in 0..call.num_args() {
        if i > 0 {
            text.push_str(", ");
        }
        let name = call.arg_name(i);
        if !name.is_empty() {
            let _ = write!(text, "{name} = ");
        }
        let value = call.arg_value(i, None)?;
        text.push_str(&value.to_echo_string());
    }
    context.session().echo(text);

    match body {
        Some(body) => body.evaluate(context),
        None => Ok(Value::Undefined),
    }
}

/// Evaluates a `let(bindings) body` expression.
///
/// The bindings evaluate sequentially into a child frame — later bindings
/// see earlier ones — and the body evaluates there. The frame is dropped
/// on return, so the bindings never leak into the enclosing scope. The
/// comprehension `let` element shares this evaluation; only its splicing
/// at the call site differs.
pub(super) fn eval_let(context: &Context<'_>,
                       arguments: &AssignmentList,
                       body: &Expr)
                       -> EvalResult<Value> {
    let mut frame = context.child();
    CallContext::new(context, arguments).assign_to(&mut frame)?;

    body.evaluate(&frame)
}
