use std::rc::Rc;

use crate::{
    ast::{BinaryOperator, Expr, UnaryOperator},
    error::EvalError,
    eval::{call::CallContext, context::Context},
    value::{core::Value, range::RangeValue},
};

/// Result type used by the evaluator.
///
/// Evaluation either produces a [`Value`] or an [`EvalError`] that unwinds
/// to the evaluation's top caller. Recoverable problems never take this
/// path; they surface as `undef` plus a diagnostic.
pub type EvalResult<T> = Result<T, EvalError>;

impl Expr {
    /// Evaluates the expression in a context.
    ///
    /// This is the main entry point of the core: a recursive walk
    /// dispatching on the expression variant. Evaluation is pure with
    /// respect to the AST — the same tree can be evaluated repeatedly —
    /// and evaluates operands left to right, except where an operator is
    /// lazy (ternary branches and the short-circuit connectives evaluate
    /// exactly the operands they need).
    ///
    /// # Errors
    /// Returns an [`EvalError`] for failed assertions, runaway recursion
    /// or loops, and gated expression forms whose feature is disabled.
    ///
    /// ## Example
    /// ```
    /// use carve::{
    ///     ast::{BinaryOperator, Expr, Location},
    ///     eval::{context::Context, session::Session},
    ///     features::FeatureSet,
    ///     value::core::Value,
    /// };
    ///
    /// let session = Session::new(FeatureSet::none());
    /// let context = Context::new(&session);
    ///
    /// // 1 + 2
    /// let expr = Expr::BinaryOp { op:    BinaryOperator::Add,
    ///                             left:  Box::new(Expr::Literal { value: Value::Number(1.0),
    ///                                                             loc:   Location::NONE, }),
    ///                             right: Box::new(Expr::Literal { value: Value::Number(2.0),
    ///                                                             loc:   Location::NONE, }),
    ///                             loc:   Location::NONE, };
    ///
    /// assert_eq!(expr.evaluate(&context).unwrap(), Value::Number(3.0));
    /// ```
    pub fn evaluate(&self, context: &Context<'_>) -> EvalResult<Value> {
        match self {
            Self::UnaryOp { op, expr, .. } => {
                let value = expr.evaluate(context)?;
                Ok(match op {
                    UnaryOperator::Not => value.not(),
                    UnaryOperator::Negate => value.negate(),
                })
            },
            Self::BinaryOp { op, left, right, .. } => eval_binary(context, *op, left, right),
            Self::TernaryOp { cond,
                              if_expr,
                              else_expr,
                              .. } => {
                // The unchosen branch is never evaluated.
                if cond.evaluate(context)?.to_bool() {
                    if_expr.evaluate(context)
                } else {
                    else_expr.evaluate(context)
                }
            },
            Self::ArrayLookup { array, index, .. } => {
                let array = array.evaluate(context)?;
                let index = index.evaluate(context)?;
                Ok(array.index(&index))
            },
            Self::Literal { value, .. } => Ok(value.clone()),
            Self::Range { begin, step, end, .. } => eval_range(context, begin, step.as_deref(), end),
            Self::Vector { children, .. } => eval_vector(context, children),
            Self::Lookup { name, .. } => Ok(context.lookup_variable(name, false)),
            Self::MemberLookup { expr, member, .. } => eval_member(context, expr, member),
            Self::FunctionCall { name, arguments, .. } => {
                let _guard = context.session().enter_call(name)?;
                let call = CallContext::new(context, arguments);
                context.evaluate_function(name, &call)
            },
            Self::Assert { arguments, body, .. } => {
                super::effects::eval_assert(context, arguments, body.as_deref(), self.location())
            },
            Self::Echo { arguments, body, .. } => {
                super::effects::eval_echo(context, arguments, body.as_deref())
            },
            Self::Let { arguments, body, .. } | Self::LcLet { arguments, body, .. } => {
                super::effects::eval_let(context, arguments, body)
            },
            Self::LcIf { cond,
                         if_expr,
                         else_expr,
                         .. } => {
                super::comprehension::eval_lc_if(context, cond, if_expr, else_expr.as_deref())
            },
            Self::LcFor { arguments, body, .. } => {
                super::comprehension::eval_lc_for(context, arguments, body)
            },
            Self::LcForC { arguments,
                           incr_arguments,
                           cond,
                           body,
                           .. } => {
                super::comprehension::eval_lc_for_c(context, arguments, incr_arguments, cond, body)
            },
            Self::LcEach { expr, .. } => super::comprehension::eval_lc_each(context, expr),
        }
    }
}

/// Evaluates a binary operation.
///
/// `&&` and `||` short-circuit on the left operand's boolean coercion and
/// return the coercion of the operand that decided the result; every other
/// operator evaluates both sides left to right and applies the total value
/// operation.
fn eval_binary(context: &Context<'_>,
               op: BinaryOperator,
               left: &Expr,
               right: &Expr)
               -> EvalResult<Value> {
    use BinaryOperator::{Add, And, Div, Eq, Ge, Gt, Le, Lt, Mod, Mul, Ne, Or, Sub};

    match op {
        And => {
            if !left.evaluate(context)?.to_bool() {
                return Ok(Value::Bool(false));
            }
            Ok(Value::Bool(right.evaluate(context)?.to_bool()))
        },
        Or => {
            if left.evaluate(context)?.to_bool() {
                return Ok(Value::Bool(true));
            }
            Ok(Value::Bool(right.evaluate(context)?.to_bool()))
        },
        _ => {
            let lhs = left.evaluate(context)?;
            let rhs = right.evaluate(context)?;
            Ok(match op {
                Mul => lhs.mul(&rhs),
                Div => lhs.div(&rhs),
                Mod => lhs.modulo(&rhs),
                Add => lhs.add(&rhs),
                Sub => lhs.sub(&rhs),
                Lt => lhs.less_than(&rhs),
                Le => lhs.less_or_equal(&rhs),
                Gt => lhs.greater_than(&rhs),
                Ge => lhs.greater_or_equal(&rhs),
                Eq => lhs.equals(&rhs),
                Ne => lhs.not_equals(&rhs),
                And | Or => unreachable!("short-circuit operators handled above"),
            })
        },
    }
}

/// Evaluates a range expression.
///
/// All present operands must be numbers; anything else makes the whole
/// range `undef`. The probing order (begin, end, step) stops at the first
/// non-number.
fn eval_range(context: &Context<'_>,
              begin: &Expr,
              step: Option<&Expr>,
              end: &Expr)
              -> EvalResult<Value> {
    if let Value::Number(begin) = begin.evaluate(context)?
       && let Value::Number(end) = end.evaluate(context)?
    {
        match step {
            None => return Ok(Value::Range(RangeValue::new(begin, end))),
            Some(step) => {
                if let Value::Number(step) = step.evaluate(context)? {
                    return Ok(Value::Range(RangeValue::with_step(begin, step, end)));
                }
            },
        }
    }

    Ok(Value::Undefined)
}

/// Evaluates a vector literal, splicing comprehension children.
///
/// The splice test looks at the child node, not at its value: only a
/// list-comprehension element spreads its result into the parent.
fn eval_vector(context: &Context<'_>, children: &[Expr]) -> EvalResult<Value> {
    let mut elements = Vec::with_capacity(children.len());

    for child in children {
        let value = child.evaluate(context)?;
        if child.is_list_comprehension() {
            // A non-vector result (comprehension let over a scalar body)
            // contributes nothing.
            if let Value::Vector(spliced) = value {
                elements.extend(spliced.iter().cloned());
            }
        } else {
            elements.push(value);
        }
    }

    Ok(Value::Vector(Rc::new(elements)))
}

/// Evaluates a member access.
///
/// Vectors expose `x`/`y`/`z` as their first three elements and ranges
/// expose `begin`/`step`/`end`; everything else is `undef`.
fn eval_member(context: &Context<'_>, expr: &Expr, member: &str) -> EvalResult<Value> {
    let value = expr.evaluate(context)?;

    let index = match (&value, member) {
        (Value::Vector(_), "x") | (Value::Range(_), "begin") => 0.0,
        (Value::Vector(_), "y") | (Value::Range(_), "step") => 1.0,
        (Value::Vector(_), "z") | (Value::Range(_), "end") => 2.0,
        _ => return Ok(Value::Undefined),
    };
    Ok(value.index(&Value::Number(index)))
}
