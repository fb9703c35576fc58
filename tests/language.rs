use std::rc::Rc;

use carve::{
    ast::{Assignment, AssignmentList, BinaryOperator, Expr, Location, UnaryOperator},
    diag::{CapturedMessages, Level},
    error::EvalError,
    eval::{
        call::CallContext,
        context::{Context, UserFunction, UserModule},
        session::Session,
    },
    features::FeatureSet,
    value::{core::Value, range::RangeValue},
};

fn b(expr: Expr) -> Box<Expr> {
    Box::new(expr)
}

fn num(n: f64) -> Expr {
    Expr::Literal { value: Value::Number(n),
                    loc:   Location::NONE, }
}

fn lit(value: Value) -> Expr {
    Expr::Literal { value,
                    loc: Location::NONE, }
}

fn var(name: &str) -> Expr {
    Expr::Lookup { name: name.to_string(),
                   loc:  Location::NONE, }
}

fn binary(op: BinaryOperator, left: Expr, right: Expr) -> Expr {
    Expr::BinaryOp { op,
                     left: b(left),
                     right: b(right),
                     loc: Location::NONE }
}

fn vector(children: Vec<Expr>) -> Expr {
    Expr::Vector { children,
                   loc: Location::NONE, }
}

fn range(begin: Expr, end: Expr) -> Expr {
    Expr::Range { begin: b(begin),
                  step:  None,
                  end:   b(end),
                  loc:   Location::NONE, }
}

fn named(name: &str, expr: Expr) -> Assignment {
    Assignment::new(name, Some(expr), Location::NONE)
}

fn pos(expr: Expr) -> Assignment {
    Assignment::positional(expr, Location::NONE)
}

fn call(name: &str, arguments: AssignmentList) -> Expr {
    Expr::FunctionCall { name: name.to_string(),
                         arguments,
                         loc: Location::NONE }
}

fn numbers(values: &[f64]) -> Value {
    Value::from(values.iter().copied().map(Value::Number).collect::<Vec<_>>())
}

/// Evaluates with every feature enabled and a captured sink.
fn eval(expr: &Expr) -> Value {
    let session = Session::with_sink(FeatureSet::all(), Rc::new(CapturedMessages::default()));
    carve::evaluate(expr, &session).expect("evaluation failed")
}

fn captured_session(features: FeatureSet) -> (Rc<CapturedMessages>, Session) {
    let sink = Rc::new(CapturedMessages::default());
    (sink.clone(), Session::with_sink(features, sink))
}

#[test]
fn arithmetic_and_precedence() {
    // 1 + 2 * 3, associated by the parser; the evaluator confirms.
    let expr = binary(BinaryOperator::Add,
                      num(1.0),
                      binary(BinaryOperator::Mul, num(2.0), num(3.0)));
    assert_eq!(eval(&expr), Value::Number(7.0));
}

#[test]
fn unary_operators() {
    let negate = Expr::UnaryOp { op:   UnaryOperator::Negate,
                                 expr: b(vector(vec![num(1.0), num(-2.0)])),
                                 loc:  Location::NONE, };
    assert_eq!(eval(&negate), numbers(&[-1.0, 2.0]));

    let not = Expr::UnaryOp { op:   UnaryOperator::Not,
                              expr: b(lit(Value::Undefined)),
                              loc:  Location::NONE, };
    assert_eq!(eval(&not), Value::Bool(true));
}

#[test]
fn undef_propagates_through_arithmetic() {
    let sum = binary(BinaryOperator::Add, lit(Value::Undefined), num(1.0));
    assert_eq!(eval(&sum), Value::Undefined);

    // (undef + 1) == undef
    let comparison = binary(BinaryOperator::Eq,
                            binary(BinaryOperator::Add, lit(Value::Undefined), num(1.0)),
                            lit(Value::Undefined));
    assert_eq!(eval(&comparison), Value::Bool(true));
}

#[test]
fn equality_is_structural_across_kinds() {
    let cross = binary(BinaryOperator::Eq, num(1.0), lit(Value::Bool(true)));
    assert_eq!(eval(&cross), Value::Bool(false));

    let ne = binary(BinaryOperator::Ne, lit(Value::from("a")), lit(Value::from("b")));
    assert_eq!(eval(&ne), Value::Bool(true));
}

#[test]
fn string_operations() {
    let concat = binary(BinaryOperator::Add, lit(Value::from("ab")), lit(Value::from("cd")));
    assert_eq!(eval(&concat), Value::from("abcd"));

    let less = binary(BinaryOperator::Lt, lit(Value::from("abc")), lit(Value::from("abd")));
    assert_eq!(eval(&less), Value::Bool(true));

    let indexed = Expr::ArrayLookup { array: b(lit(Value::from("abc"))),
                                      index: b(num(1.0)),
                                      loc:   Location::NONE, };
    assert_eq!(eval(&indexed), Value::from("b"));
}

#[test]
fn vector_arithmetic_and_products() {
    let sum = binary(BinaryOperator::Add,
                     vector(vec![num(1.0), num(2.0)]),
                     vector(vec![num(10.0), num(20.0)]));
    assert_eq!(eval(&sum), numbers(&[11.0, 22.0]));

    let mismatched = binary(BinaryOperator::Add,
                            vector(vec![num(1.0)]),
                            vector(vec![num(1.0), num(2.0)]));
    assert_eq!(eval(&mismatched), Value::Undefined);

    let dot = binary(BinaryOperator::Mul,
                     vector(vec![num(1.0), num(2.0), num(3.0)]),
                     vector(vec![num(4.0), num(5.0), num(6.0)]));
    assert_eq!(eval(&dot), Value::Number(32.0));

    let scaled = binary(BinaryOperator::Mul, vector(vec![num(1.0), num(2.0)]), num(3.0));
    assert_eq!(eval(&scaled), numbers(&[3.0, 6.0]));

    let matrix = vector(vec![vector(vec![num(1.0), num(2.0)]),
                             vector(vec![num(3.0), num(4.0)])]);
    let product = binary(BinaryOperator::Mul, matrix, vector(vec![num(1.0), num(2.0)]));
    assert_eq!(eval(&product), numbers(&[5.0, 11.0]));
}

#[test]
fn indexing_truncates_and_bounds_checks() {
    let elements = vector(vec![num(10.0), num(20.0), num(30.0)]);

    let truncated = Expr::ArrayLookup { array: b(elements.clone()),
                                        index: b(num(1.9)),
                                        loc:   Location::NONE, };
    assert_eq!(eval(&truncated), Value::Number(20.0));

    let out_of_range = Expr::ArrayLookup { array: b(elements.clone()),
                                           index: b(num(3.0)),
                                           loc:   Location::NONE, };
    assert_eq!(eval(&out_of_range), Value::Undefined);

    let negative = Expr::ArrayLookup { array: b(elements),
                                       index: b(num(-0.5)),
                                       loc:   Location::NONE, };
    assert_eq!(eval(&negative), Value::Undefined);
}

#[test]
fn range_construction_and_members() {
    let r = range(num(1.0), num(3.0));
    assert_eq!(eval(&r), Value::Range(RangeValue::new(1.0, 3.0)));

    // A non-numeric operand spoils the whole range.
    let bad = Expr::Range { begin: b(num(1.0)),
                            step:  Some(b(lit(Value::from("x")))),
                            end:   b(num(3.0)),
                            loc:   Location::NONE, };
    assert_eq!(eval(&bad), Value::Undefined);

    let member = |name: &str| Expr::MemberLookup { expr:   b(range(num(1.0), num(3.0))),
                                                   member: name.to_string(),
                                                   loc:    Location::NONE, };
    assert_eq!(eval(&member("begin")), Value::Number(1.0));
    assert_eq!(eval(&member("step")), Value::Number(1.0));
    assert_eq!(eval(&member("end")), Value::Number(3.0));
}

#[test]
fn member_lookup_on_vectors() {
    let point = vector(vec![num(4.0), num(5.0)]);

    let member = |name: &str| Expr::MemberLookup { expr:   b(point.clone()),
                                                   member: name.to_string(),
                                                   loc:    Location::NONE, };
    assert_eq!(eval(&member("x")), Value::Number(4.0));
    assert_eq!(eval(&member("y")), Value::Number(5.0));
    assert_eq!(eval(&member("z")), Value::Undefined);
    assert_eq!(eval(&member("w")), Value::Undefined);
}

#[test]
fn ternary_evaluates_one_branch() {
    // The unchosen branch would fail the assertion if it ran.
    let poisoned = Expr::Assert { arguments: vec![pos(lit(Value::Bool(false)))],
                                  body:      None,
                                  loc:       Location::NONE, };
    let expr = Expr::TernaryOp { cond:      b(lit(Value::Bool(true))),
                                 if_expr:   b(num(1.0)),
                                 else_expr: b(poisoned),
                                 loc:       Location::NONE, };
    assert_eq!(eval(&expr), Value::Number(1.0));
}

#[test]
fn logical_operators_short_circuit() {
    let (sink, session) = captured_session(FeatureSet::all());
    let context = Context::new(&session);

    let echo = Expr::Echo { arguments: vec![pos(num(1.0))],
                            body:      None,
                            loc:       Location::NONE, };

    // false && echo(1): the right operand must not run.
    let silent = binary(BinaryOperator::And, lit(Value::Bool(false)), echo.clone());
    assert_eq!(silent.evaluate(&context).unwrap(), Value::Bool(false));
    assert!(sink.is_empty());

    // true || echo(1): same on the other side.
    let silent = binary(BinaryOperator::Or, lit(Value::Bool(true)), echo.clone());
    assert_eq!(silent.evaluate(&context).unwrap(), Value::Bool(true));
    assert!(sink.is_empty());

    // true && echo(1): now the right side runs and coerces to false.
    let noisy = binary(BinaryOperator::And, lit(Value::Bool(true)), echo);
    assert_eq!(noisy.evaluate(&context).unwrap(), Value::Bool(false));
    assert_eq!(sink.take().len(), 1);
}

#[test]
fn let_bindings_are_sequential_and_scoped() {
    // let (a = 10, b = a + 1) [a, b]
    let expr = Expr::Let { arguments: vec![named("a", num(10.0)),
                                           named("b", binary(BinaryOperator::Add,
                                                             var("a"),
                                                             num(1.0)))],
                           body:      b(vector(vec![var("a"), var("b")])),
                           loc:       Location::NONE, };

    let (sink, session) = captured_session(FeatureSet::all());
    let context = Context::new(&session);
    assert_eq!(expr.evaluate(&context).unwrap(), numbers(&[10.0, 11.0]));

    // The bindings do not leak into the enclosing scope.
    assert_eq!(context.lookup_variable("a", true), Value::Undefined);
    assert!(sink.is_empty());
}

#[test]
fn unknown_variable_warns_and_recovers() {
    let (sink, session) = captured_session(FeatureSet::none());
    let context = Context::new(&session);

    assert_eq!(var("ghost").evaluate(&context).unwrap(), Value::Undefined);

    let messages = sink.take();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].level, Level::Warning);
    assert!(messages[0].text.contains("ghost"));
}

#[test]
fn comprehension_for_over_range() {
    // [for (i = [1:3]) i * i]
    let lc = Expr::LcFor { arguments: vec![named("i", range(num(1.0), num(3.0)))],
                           body:      b(binary(BinaryOperator::Mul, var("i"), var("i"))),
                           loc:       Location::NONE, };
    let expr = vector(vec![lc]);
    assert_eq!(eval(&expr), numbers(&[1.0, 4.0, 9.0]));
}

#[test]
fn comprehension_for_over_scalar_and_undef() {
    let over_scalar = Expr::LcFor { arguments: vec![named("i", num(7.0))],
                                    body:      b(var("i")),
                                    loc:       Location::NONE, };
    assert_eq!(eval(&over_scalar), numbers(&[7.0]));

    let over_undef = Expr::LcFor { arguments: vec![named("i", lit(Value::Undefined))],
                                   body:      b(var("i")),
                                   loc:       Location::NONE, };
    assert_eq!(eval(&over_undef), numbers(&[]));
}

#[test]
fn comprehension_bodies_flatten_one_level() {
    // [for (i = [1:2]) for (j = [1:2]) 10 * i + j] => [11, 12, 21, 22]
    let inner = Expr::LcFor { arguments: vec![named("j", range(num(1.0), num(2.0)))],
                              body:      b(binary(BinaryOperator::Add,
                                                  binary(BinaryOperator::Mul,
                                                         num(10.0),
                                                         var("i")),
                                                  var("j"))),
                              loc:       Location::NONE, };
    let outer = Expr::LcFor { arguments: vec![named("i", range(num(1.0), num(2.0)))],
                              body:      b(inner),
                              loc:       Location::NONE, };
    assert_eq!(eval(&vector(vec![outer])), numbers(&[11.0, 12.0, 21.0, 22.0]));
}

#[test]
fn vector_splices_comprehension_children_only() {
    // [1, each [2, 3], 4]
    let each = Expr::LcEach { expr: b(vector(vec![num(2.0), num(3.0)])),
                              loc:  Location::NONE, };
    let spliced = vector(vec![num(1.0), each, num(4.0)]);
    assert_eq!(eval(&spliced), numbers(&[1.0, 2.0, 3.0, 4.0]));

    // A looked-up vector is one element, never spliced.
    let expr = Expr::Let { arguments: vec![named("v", vector(vec![num(2.0), num(3.0)]))],
                           body:      b(vector(vec![num(1.0), var("v"), num(4.0)])),
                           loc:       Location::NONE, };
    let expected = Value::from(vec![Value::Number(1.0), numbers(&[2.0, 3.0]), Value::Number(4.0)]);
    assert_eq!(eval(&expr), expected);
}

#[test]
fn comprehension_if_with_and_without_else() {
    let lc_if = |cond: bool, else_expr: Option<Expr>| Expr::LcIf { cond:      b(lit(Value::Bool(cond))),
                                                                   if_expr:   b(num(1.0)),
                                                                   else_expr: else_expr.map(b),
                                                                   loc:       Location::NONE, };

    assert_eq!(eval(&vector(vec![lc_if(true, None)])), numbers(&[1.0]));
    assert_eq!(eval(&vector(vec![lc_if(false, None)])), numbers(&[]));
    assert_eq!(eval(&vector(vec![lc_if(false, Some(num(9.0)))])), numbers(&[9.0]));
}

#[test]
fn comprehension_else_requires_its_feature() {
    let gated = Expr::LcIf { cond:      b(lit(Value::Bool(true))),
                             if_expr:   b(num(1.0)),
                             else_expr: Some(b(num(2.0))),
                             loc:       Location::NONE, };

    let session = Session::new(FeatureSet { else_expression: false,
                                            ..FeatureSet::all() });
    let context = Context::new(&session);
    // Rejected up front, whichever branch the condition would pick.
    assert_eq!(gated.evaluate(&context),
               Err(EvalError::ExperimentalFeatureDisabled { feature: "else-expression", }));
}

#[test]
fn each_requires_its_feature() {
    let each = Expr::LcEach { expr: b(vector(vec![num(1.0)])),
                              loc:  Location::NONE, };

    let session = Session::new(FeatureSet::none());
    let context = Context::new(&session);
    assert_eq!(each.evaluate(&context),
               Err(EvalError::ExperimentalFeatureDisabled { feature: "each-expression", }));
}

#[test]
fn each_expands_ranges_and_wraps_scalars() {
    let each_range = Expr::LcEach { expr: b(range(num(1.0), num(3.0))),
                                    loc:  Location::NONE, };
    assert_eq!(eval(&vector(vec![each_range])), numbers(&[1.0, 2.0, 3.0]));

    let each_scalar = Expr::LcEach { expr: b(num(5.0)),
                                     loc:  Location::NONE, };
    assert_eq!(eval(&vector(vec![each_scalar])), numbers(&[5.0]));

    let each_undef = Expr::LcEach { expr: b(lit(Value::Undefined)),
                                    loc:  Location::NONE, };
    assert_eq!(eval(&vector(vec![each_undef])), numbers(&[]));
}

#[test]
fn c_style_loop_counts_and_publishes_increments() {
    // for (x = 0; x < 5; x = x + 1) x
    let expr = Expr::LcForC { arguments:      vec![named("x", num(0.0))],
                              incr_arguments: vec![named("x",
                                                         binary(BinaryOperator::Add,
                                                                var("x"),
                                                                num(1.0)))],
                              cond:           b(binary(BinaryOperator::Lt, var("x"), num(5.0))),
                              body:           b(var("x")),
                              loc:            Location::NONE, };
    assert_eq!(eval(&vector(vec![expr.clone()])), numbers(&[0.0, 1.0, 2.0, 3.0, 4.0]));

    let session = Session::new(FeatureSet::none());
    let context = Context::new(&session);
    assert_eq!(expr.evaluate(&context),
               Err(EvalError::ExperimentalFeatureDisabled { feature: "for-c-expression", }));
}

#[test]
fn runaway_c_style_loop_is_aborted() {
    let expr = Expr::LcForC { arguments:      Vec::new(),
                              incr_arguments: Vec::new(),
                              cond:           b(lit(Value::Bool(true))),
                              body:           b(num(1.0)),
                              loc:            Location::NONE, };

    let session = Session::new(FeatureSet::all());
    let context = Context::new(&session);
    assert_eq!(expr.evaluate(&context),
               Err(EvalError::Recursion { kind: "for loop",
                                          name: String::new(), }));
}

#[test]
fn oversized_ranges_warn_and_yield_nothing() {
    let over = Expr::LcFor { arguments: vec![named("i", range(num(1.0), num(1_000_000.0)))],
                             body:      b(var("i")),
                             loc:       Location::NONE, };

    let (sink, session) = captured_session(FeatureSet::all());
    let context = Context::new(&session);
    assert_eq!(over.evaluate(&context).unwrap(), numbers(&[]));

    let messages = sink.take();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].text.contains("too many elements (1000000)"));
}

#[test]
fn largest_allowed_range_iterates() {
    let expr = Expr::LcFor { arguments: vec![named("i", range(num(1.0), num(999_999.0)))],
                             body:      b(num(0.0)),
                             loc:       Location::NONE, };

    let (sink, session) = captured_session(FeatureSet::all());
    let context = Context::new(&session);
    let result = expr.evaluate(&context).unwrap();

    assert_eq!(result.as_vector().unwrap().len(), 999_999);
    assert!(sink.is_empty());
}

#[test]
fn user_functions_bind_named_and_positional_arguments() {
    let session = Session::new(FeatureSet::none());
    let mut context = Context::new(&session);

    // f(a, b = 10) = [a, b]
    context.register_function("f",
                              UserFunction { parameters: vec![Assignment::new("a",
                                                                              None,
                                                                              Location::NONE),
                                                              named("b", num(10.0))],
                                             body:       vector(vec![var("a"), var("b")]), });

    let f = |arguments: AssignmentList| call("f", arguments);

    assert_eq!(f(vec![pos(num(1.0))]).evaluate(&context).unwrap(),
               numbers(&[1.0, 10.0]));
    assert_eq!(f(vec![pos(num(1.0)), pos(num(2.0))]).evaluate(&context).unwrap(),
               numbers(&[1.0, 2.0]));

    // A named argument takes its parameter; positionals fill what is left.
    assert_eq!(f(vec![named("b", num(5.0)), pos(num(1.0))]).evaluate(&context)
                                                           .unwrap(),
               numbers(&[1.0, 5.0]));

    // Extra arguments are dropped, missing ones fall back to defaults.
    assert_eq!(f(vec![pos(num(1.0)), pos(num(2.0)), pos(num(3.0))]).evaluate(&context)
                                                                   .unwrap(),
               numbers(&[1.0, 2.0]));
}

#[test]
fn missing_parameter_without_default_binds_undef() {
    let (sink, session) = captured_session(FeatureSet::none());
    let mut context = Context::new(&session);

    context.register_function("f",
                              UserFunction { parameters: vec![Assignment::new("a",
                                                                              None,
                                                                              Location::NONE)],
                                             body:       var("a"), });

    assert_eq!(call("f", Vec::new()).evaluate(&context).unwrap(),
               Value::Undefined);
    // Bound explicitly, so the body's lookup stays quiet.
    assert!(sink.is_empty());
}

#[test]
fn unknown_function_warns_and_recovers() {
    let (sink, session) = captured_session(FeatureSet::none());
    let context = Context::new(&session);

    let expr = call("no_such_fn", vec![pos(num(1.0))]);
    assert_eq!(expr.evaluate(&context).unwrap(), Value::Undefined);

    let messages = sink.take();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].text.contains("no_such_fn"));
}

#[test]
fn recursive_function_hits_the_depth_budget() {
    let session = Session::new(FeatureSet::none()).with_call_depth(32);
    let mut context = Context::new(&session);

    // f(n) = n <= 0 ? 0 : f(n - 1)
    let recurse = call("f", vec![pos(binary(BinaryOperator::Sub, var("n"), num(1.0)))]);
    let body = Expr::TernaryOp { cond:      b(binary(BinaryOperator::Le, var("n"), num(0.0))),
                                 if_expr:   b(num(0.0)),
                                 else_expr: b(recurse),
                                 loc:       Location::NONE, };
    context.register_function("f",
                              UserFunction { parameters: vec![Assignment::new("n",
                                                                              None,
                                                                              Location::NONE)],
                                             body });

    // Inside the budget: 31 nested calls.
    assert_eq!(call("f", vec![pos(num(30.0))]).evaluate(&context).unwrap(),
               Value::Number(0.0));

    // One past the budget raises.
    assert_eq!(call("f", vec![pos(num(40.0))]).evaluate(&context),
               Err(EvalError::Recursion { kind: "function",
                                          name: "f".to_string(), }));

    // The guard rewinds the counter, so the next call starts fresh.
    assert_eq!(call("f", vec![pos(num(30.0))]).evaluate(&context).unwrap(),
               Value::Number(0.0));
}

#[test]
fn assert_failure_quotes_condition_line_and_message() {
    let expr = Expr::Assert { arguments: vec![pos(lit(Value::Bool(false))),
                                              pos(lit(Value::from("nope")))],
                              body:      None,
                              loc:       Location::line(3), };

    let session = Session::new(FeatureSet::all());
    let Err(EvalError::AssertionFailed { message }) = carve::evaluate(&expr, &session) else {
        panic!("expected an assertion failure");
    };

    assert!(message.contains("'false'"), "message was: {message}");
    assert!(message.contains("line 3"), "message was: {message}");
    assert!(message.contains("\"nope\""), "message was: {message}");
}

#[test]
fn assert_passes_into_its_body() {
    // assert(true) condition — the bindings are visible in the body.
    let expr = Expr::Assert { arguments: vec![pos(lit(Value::Bool(true)))],
                              body:      Some(b(var("condition"))),
                              loc:       Location::NONE, };
    assert_eq!(eval(&expr), Value::Bool(true));

    let bare = Expr::Assert { arguments: vec![pos(lit(Value::Bool(true)))],
                              body:      None,
                              loc:       Location::NONE, };
    assert_eq!(eval(&bare), Value::Undefined);
}

#[test]
fn assert_requires_its_feature() {
    let expr = Expr::Assert { arguments: vec![pos(lit(Value::Bool(true)))],
                              body:      None,
                              loc:       Location::NONE, };

    let session = Session::new(FeatureSet::none());
    assert_eq!(carve::evaluate(&expr, &session),
               Err(EvalError::ExperimentalFeatureDisabled { feature: "assert-expression", }));
}

#[test]
fn echo_formats_arguments_and_returns_its_body() {
    let (sink, session) = captured_session(FeatureSet::all());
    let context = Context::new(&session);

    let expr = Expr::Echo { arguments: vec![pos(num(1.0)),
                                            named("x", binary(BinaryOperator::Add,
                                                              num(1.0),
                                                              num(1.0))),
                                            pos(lit(Value::from("s")))],
                            body:      Some(b(num(9.0))),
                            loc:       Location::NONE, };
    assert_eq!(expr.evaluate(&context).unwrap(), Value::Number(9.0));

    let messages = sink.take();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].level, Level::Echo);
    assert_eq!(messages[0].text, "ECHO: 1, x = 2, \"s\"");
}

#[test]
fn call_factory_rewrites_gated_names() {
    let all = FeatureSet::all();
    let none = FeatureSet::none();

    assert!(matches!(Expr::call("assert", Vec::new(), None, &all, Location::NONE),
                     Expr::Assert { .. }));
    assert!(matches!(Expr::call("echo", Vec::new(), None, &all, Location::NONE),
                     Expr::Echo { .. }));
    assert!(matches!(Expr::call("let", Vec::new(), Some(num(1.0)), &all, Location::NONE),
                     Expr::Let { .. }));
    assert!(matches!(Expr::call("let", Vec::new(), Some(num(1.0)), &none, Location::NONE),
                     Expr::Let { .. }));

    // With the features off, the names stay plain calls.
    assert!(matches!(Expr::call("assert", Vec::new(), None, &none, Location::NONE),
                     Expr::FunctionCall { .. }));
    assert!(matches!(Expr::call("echo", Vec::new(), None, &none, Location::NONE),
                     Expr::FunctionCall { .. }));
    assert!(matches!(Expr::call("cube", Vec::new(), None, &all, Location::NONE),
                     Expr::FunctionCall { .. }));
}

#[test]
fn literal_nodes_know_themselves() {
    assert!(num(1.0).is_literal());
    assert!(vector(vec![num(1.0), num(2.0)]).is_literal());
    assert!(range(num(1.0), num(2.0)).is_literal());
    assert!(Expr::UnaryOp { op:   UnaryOperator::Negate,
                            expr: b(num(1.0)),
                            loc:  Location::NONE, }.is_literal());

    assert!(!var("x").is_literal());
    assert!(!vector(vec![num(1.0), var("x")]).is_literal());
    assert!(!binary(BinaryOperator::Add, num(1.0), num(2.0)).is_literal());
}

#[test]
fn expressions_print_their_source_form() {
    let expr = binary(BinaryOperator::Add,
                      num(1.0),
                      binary(BinaryOperator::Mul, var("x"), num(3.0)));
    assert_eq!(expr.to_string(), "(1 + (x * 3))");

    let lc = Expr::LcFor { arguments: vec![named("i", range(num(1.0), num(3.0)))],
                           body:      b(var("i")),
                           loc:       Location::NONE, };
    assert_eq!(lc.to_string(), "for(i = [1 : 3]) (i)");

    let ternary = Expr::TernaryOp { cond:      b(var("c")),
                                    if_expr:   b(num(1.0)),
                                    else_expr: b(num(2.0)),
                                    loc:       Location::NONE, };
    assert_eq!(ternary.to_string(), "(c ? 1 : 2)");
}

#[test]
fn builtin_functions_are_resolved_after_user_functions() {
    let session = Session::new(FeatureSet::none());
    let mut context = Context::new(&session);

    assert_eq!(call("len", vec![pos(lit(Value::from("abc")))]).evaluate(&context)
                                                              .unwrap(),
               Value::Number(3.0));
    assert_eq!(call("min", vec![pos(num(3.0)), pos(num(1.0)), pos(num(2.0))]).evaluate(&context)
                                                                             .unwrap(),
               Value::Number(1.0));
    assert_eq!(call("max", vec![pos(vector(vec![num(1.0), num(5.0)]))]).evaluate(&context)
                                                                       .unwrap(),
               Value::Number(5.0));
    assert_eq!(call("concat",
                    vec![pos(vector(vec![num(1.0)])), pos(num(2.0))]).evaluate(&context)
                                                                     .unwrap(),
               numbers(&[1.0, 2.0]));
    assert_eq!(call("str", vec![pos(num(1.0)), pos(lit(Value::from("x")))]).evaluate(&context)
                                                                           .unwrap(),
               Value::from("1x"));

    // A user function shadows the builtin of the same name.
    context.register_function("len",
                              UserFunction { parameters: Vec::new(),
                                             body:       num(42.0), });
    assert_eq!(call("len", vec![pos(lit(Value::from("abc")))]).evaluate(&context)
                                                              .unwrap(),
               Value::Number(42.0));
}

#[test]
fn builtin_arity_mismatch_warns_and_recovers() {
    let (sink, session) = captured_session(FeatureSet::none());
    let context = Context::new(&session);

    let expr = call("abs", vec![pos(num(1.0)), pos(num(2.0))]);
    assert_eq!(expr.evaluate(&context).unwrap(), Value::Undefined);
    assert_eq!(sink.take().len(), 1);
}

#[test]
fn module_parameters_bind_for_the_back_end() {
    let (sink, session) = captured_session(FeatureSet::none());
    let mut context = Context::new(&session);

    context.register_module("cylinder",
                            UserModule { parameters: vec![named("r", num(1.0)),
                                                          named("h", num(1.0))], });

    let arguments = vec![named("h", num(5.0))];
    let call_site = CallContext::new(&context, &arguments);
    let bound = context.bind_module_parameters("cylinder", &call_site)
                       .unwrap()
                       .expect("module should resolve");

    assert_eq!(bound.lookup_variable("r", true), Value::Number(1.0));
    assert_eq!(bound.lookup_variable("h", true), Value::Number(5.0));

    drop(bound);
    let missing = CallContext::new(&context, &arguments);
    assert!(context.bind_module_parameters("sphere", &missing)
                   .unwrap()
                   .is_none());
    assert_eq!(sink.take().len(), 1);
}

#[test]
fn evaluation_does_not_mutate_the_tree() {
    let expr = vector(vec![Expr::LcFor { arguments: vec![named("i",
                                                               range(num(1.0), num(3.0)))],
                                         body:      b(var("i")),
                                         loc:       Location::NONE, }]);
    let snapshot = expr.clone();

    let first = eval(&expr);
    let second = eval(&expr);

    assert_eq!(expr, snapshot);
    assert_eq!(first, second);
}
