use std::rc::Rc;

use crate::{
    ast::{AssignmentList, Expr},
    error::EvalError,
    eval::{call::CallContext, context::Context, core::EvalResult},
    features::Feature,
    value::core::Value,
};

/// Ranges with at least this many values refuse to expand.
///
/// The same bound caps the C-style loop's iteration counter.
pub const ITERATION_LIMIT: u32 = 1_000_000;

/// Flattens one level of nesting.
///
/// Used when a comprehension's body is itself a comprehension, so that
/// `[[a, b], [c]]` becomes `[a, b, c]`. Only one level is removed; deeper
/// nesting is the user's own.
fn flatten(values: Vec<Value>) -> Vec<Value> {
    let mut flat = Vec::with_capacity(values.len());
    for value in values {
        if let Value::Vector(inner) = value {
            flat.extend(inner.iter().cloned());
        } else {
            flat.push(value);
        }
    }
    flat
}

/// Wraps the element values, flattening when the body was a comprehension.
fn comprehension_result(values: Vec<Value>, body: &Expr) -> Value {
    let values = if body.is_list_comprehension() {
        flatten(values)
    } else {
        values
    };
    Value::Vector(Rc::new(values))
}

/// Evaluates an `if` comprehension element.
///
/// The chosen branch contributes its value as a singleton — unless the
/// branch is itself a comprehension, whose vector result passes through
/// unwrapped. A false condition with no `else` contributes nothing. The
/// `else` branch is experimental and is rejected up front when its
/// feature is disabled, whichever way the condition would go.
pub(super) fn eval_lc_if(context: &Context<'_>,
                         cond: &Expr,
                         if_expr: &Expr,
                         else_expr: Option<&Expr>)
                         -> EvalResult<Value> {
    if else_expr.is_some() {
        context.session().require_feature(Feature::ElseExpression)?;
    }

    let branch = if cond.evaluate(context)?.to_bool() {
        Some(if_expr)
    } else {
        else_expr
    };

    match branch {
        Some(expr) if expr.is_list_comprehension() => expr.evaluate(context),
        Some(expr) => Ok(Value::Vector(Rc::new(vec![expr.evaluate(context)?]))),
        None => Ok(Value::Vector(Rc::new(Vec::new()))),
    }
}

/// Evaluates a `for` comprehension element.
///
/// The binding's value expression is evaluated once in the enclosing
/// scope, then iterated: ranges yield each step, vectors each element,
/// `undef` nothing, and any other value a single iteration. Each
/// iteration binds the variable in a fresh child frame, keeping loop
/// bindings out of the enclosing scope.
pub(super) fn eval_lc_for(context: &Context<'_>,
                          arguments: &AssignmentList,
                          body: &Expr)
                          -> EvalResult<Value> {
    // The parser reduces comprehension for statements to one binding.
    if arguments.is_empty() {
        return Ok(Value::Vector(Rc::new(Vec::new())));
    }

    let call = CallContext::new(context, arguments);
    let it_name = call.arg_name(0);
    let it_values = call.arg_value(0, None)?;

    let mut values = Vec::new();
    match &it_values {
        Value::Range(range) => {
            let steps = range.num_values();
            if steps >= ITERATION_LIMIT {
                context.session().warning(format!(
                    "Bad range parameter in for statement: too many elements ({steps})."
                ));
            } else {
                for step in range.iter() {
                    let mut frame = context.child();
                    frame.set_variable(it_name, Value::Number(step));
                    values.push(body.evaluate(&frame)?);
                }
            }
        },
        Value::Vector(elements) => {
            for element in elements.iter() {
                let mut frame = context.child();
                frame.set_variable(it_name, element.clone());
                values.push(body.evaluate(&frame)?);
            }
        },
        Value::Undefined => {},
        other => {
            let mut frame = context.child();
            frame.set_variable(it_name, other.clone());
            values.push(body.evaluate(&frame)?);
        },
    }

    Ok(comprehension_result(values, body))
}

/// Evaluates a C-style `for (init; cond; incr)` comprehension loop.
///
/// The init list binds sequentially into a fresh frame. While the
/// condition holds, the body value is appended; the increment list then
/// evaluates in a scratch child frame whose results are published back
/// with [`Context::apply_variables`], so half-evaluated increments never
/// leak into the loop scope. The iteration counter aborts runaway loops.
pub(super) fn eval_lc_for_c(context: &Context<'_>,
                            arguments: &AssignmentList,
                            incr_arguments: &AssignmentList,
                            cond: &Expr,
                            body: &Expr)
                            -> EvalResult<Value> {
    context.session().require_feature(Feature::ForCExpression)?;

    let mut frame = context.child();
    CallContext::new(context, arguments).assign_to(&mut frame)?;

    let mut counter: u32 = 0;
    let mut values = Vec::new();
    while cond.evaluate(&frame)?.to_bool() {
        values.push(body.evaluate(&frame)?);

        if counter == ITERATION_LIMIT {
            return Err(EvalError::Recursion { kind: "for loop",
                                              name: String::new(), });
        }
        counter += 1;

        let published = {
            let mut scratch = frame.child();
            CallContext::new(&frame, incr_arguments).assign_to(&mut scratch)?;
            scratch.into_variables()
        };
        frame.apply_variables(published);
    }

    Ok(comprehension_result(values, body))
}

/// Evaluates an `each` comprehension element.
///
/// Ranges expand to their values (subject to the iteration cap), vectors
/// pass through, `undef` contributes nothing, and any other value becomes
/// a singleton. When the operand is itself a comprehension its result is
/// flattened one level, mirroring the body rule of the loops.
pub(super) fn eval_lc_each(context: &Context<'_>, expr: &Expr) -> EvalResult<Value> {
    context.session().require_feature(Feature::EachExpression)?;

    let value = expr.evaluate(context)?;

    let mut values = Vec::new();
    match &value {
        Value::Range(range) => {
            let steps = range.num_values();
            if steps >= ITERATION_LIMIT {
                context.session().warning(format!(
                    "Bad range parameter in for statement: too many elements ({steps})."
                ));
            } else {
                values.extend(range.iter().map(Value::Number));
            }
        },
        Value::Vector(elements) => values.extend(elements.iter().cloned()),
        Value::Undefined => {},
        other => values.push(other.clone()),
    }

    Ok(comprehension_result(values, expr))
}
