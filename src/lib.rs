//! # carve
//!
//! carve is a small declarative solid-modeling language. This crate is its
//! expression evaluation core: the expression AST, the lexical-scoping
//! context chain, and the recursive evaluator — including list
//! comprehensions, `let`-bindings, function calls with named/positional
//! argument resolution, and the `assert`/`echo` side-effecting forms.
//!
//! The core has no lexer, parser or renderer of its own. A front end hands
//! it AST nodes; a geometry back end consumes the bound parameter contexts
//! it produces.

#![warn(
    clippy::redundant_clone,
    clippy::needless_pass_by_value,
    clippy::similar_names,
    clippy::large_enum_variant,
    clippy::string_lit_as_bytes,
    clippy::match_same_arms,
    clippy::cargo,
    clippy::nursery,
    clippy::perf,
    clippy::style,
    clippy::suspicious,
    clippy::correctness,
    clippy::complexity,
    clippy::pedantic,
    //missing_docs,
)]
#![allow(clippy::missing_errors_doc)]

use crate::{
    ast::Expr,
    eval::{context::Context, core::EvalResult},
    value::core::Value,
};

/// Defines the structure of parsed code.
///
/// This module declares the `Expr` enum and related types that represent
/// the syntactic structure of source code as a tree. The AST is built by
/// the front end and traversed by the evaluator.
///
/// # Responsibilities
/// - Defines expression and assignment types for all language constructs.
/// - Attaches source locations to AST nodes for diagnostics.
/// - Renders nodes back to their source form for assertion messages.
pub mod ast;
/// Diagnostic message delivery.
///
/// Declares the message levels, the `MessageSink` trait through which
/// warnings and `echo` output leave the core, the default `log`-backed
/// sink, and a capturing sink for tests and embedding hosts.
///
/// # Responsibilities
/// - Defines the level-tagged `Message` type.
/// - Routes diagnostics without coupling the core to an output stream.
pub mod diag;
/// Provides the unified error type for evaluation.
///
/// This module defines the errors that abort an evaluation: failed
/// assertions, runaway recursion or loops, and disabled experimental
/// features. Recoverable conditions are not errors; they propagate as the
/// `undef` value instead.
///
/// # Responsibilities
/// - Defines the `EvalError` enum with detailed messages.
/// - Supports integration with standard error handling traits.
pub mod error;
/// Orchestrates expression evaluation.
///
/// This module ties together the context chain, call-site argument
/// resolution, the evaluator dispatch, comprehension handling, the
/// side-effecting forms and the builtin registry.
///
/// # Responsibilities
/// - Coordinates the evaluation components and their shared session.
/// - Enforces the recursion and iteration budgets.
/// - Manages the flow of values and errors between scopes.
pub mod eval;
/// Experimental feature configuration.
///
/// Declares the named feature flags that gate the experimental expression
/// forms, and the immutable set injected into each evaluation session.
///
/// # Responsibilities
/// - Maps features to their user-facing option names.
/// - Rejects gated forms with a dedicated error when disabled.
pub mod features;
/// Defines the runtime data types for evaluation.
///
/// This module declares the value variants produced by expressions —
/// undefined, booleans, numbers, strings, vectors and ranges — together
/// with their total arithmetic, comparison and indexing operations.
///
/// # Responsibilities
/// - Defines the `Value` enum and all supported variants.
/// - Implements undefined-propagating operators and coercions.
/// - Provides the display and echo renderings used in diagnostics.
pub mod value;

/// Evaluates an expression in a fresh root context.
///
/// This is the convenience entry point for hosts evaluating standalone
/// expressions: it creates a root [`Context`] over the given session and
/// walks the tree. Hosts that register user functions or bind variables
/// first create their own context and call
/// [`Expr::evaluate`] directly.
///
/// # Errors
/// Returns an error when the expression fails an assertion, exceeds a
/// recursion or iteration budget, or uses a disabled experimental
/// feature.
///
/// # Examples
/// ```
/// use carve::{
///     ast::{BinaryOperator, Expr, Location},
///     eval::session::Session,
///     features::FeatureSet,
///     value::core::Value,
/// };
///
/// let session = Session::new(FeatureSet::none());
///
/// // 2 * 3
/// let expr = Expr::BinaryOp { op:    BinaryOperator::Mul,
///                             left:  Box::new(Expr::Literal { value: Value::Number(2.0),
///                                                             loc:   Location::NONE, }),
///                             right: Box::new(Expr::Literal { value: Value::Number(3.0),
///                                                             loc:   Location::NONE, }),
///                             loc:   Location::NONE, };
///
/// assert_eq!(carve::evaluate(&expr, &session).unwrap(), Value::Number(6.0));
/// ```
pub fn evaluate(expr: &Expr, session: &eval::session::Session) -> EvalResult<Value> {
    let context = Context::new(session);
    expr.evaluate(&context)
}
