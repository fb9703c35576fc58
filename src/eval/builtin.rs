use std::rc::Rc;

use crate::value::core::Value;

/// Type alias for builtin function handlers.
///
/// A builtin receives the evaluated argument values and returns a value.
/// Builtins are total: out-of-domain inputs produce `undef`, never an
/// error.
pub(crate) type BuiltinFn = fn(&[Value]) -> Value;

/// Specifies the allowed number of arguments for a builtin.
#[derive(Clone, Copy)]
pub(crate) enum Arity {
    /// The builtin takes exactly this many arguments.
    Exact(usize),
    /// The builtin takes at least this many arguments.
    AtLeast(usize),
}

/// Defines builtin functions by generating a lookup table and a name list.
///
/// Each entry provides a name, an arity specification and a function
/// pointer. The macro produces `BuiltinDef` (per-entry metadata),
/// `BUILTIN_TABLE` (the static lookup table) and `BUILTIN_FUNCTIONS` (the
/// public list of builtin names).
macro_rules! builtin_functions {
    (
        $(
            $name:literal => {
                arity: $arity:expr,
                func: $func:expr $(,)?
            }
        ),* $(,)?
    ) => {
        pub(crate) struct BuiltinDef {
            pub(crate) name:  &'static str,
            pub(crate) arity: Arity,
            pub(crate) func:  BuiltinFn,
        }
        static BUILTIN_TABLE: &[BuiltinDef] = &[
            $(
                BuiltinDef { name: $name, arity: $arity, func: $func },
            )*
        ];
        /// Names of every builtin function, in registration order.
        pub const BUILTIN_FUNCTIONS: &[&str] = &[
            $($name,)*
        ];
    };
}

builtin_functions! {
    "abs"    => { arity: Arity::Exact(1), func: abs },
    "sign"   => { arity: Arity::Exact(1), func: sign },
    "floor"  => { arity: Arity::Exact(1), func: |args| unary_round(f64::floor, args) },
    "ceil"   => { arity: Arity::Exact(1), func: |args| unary_round(f64::ceil, args) },
    "round"  => { arity: Arity::Exact(1), func: |args| unary_round(f64::round, args) },
    "sqrt"   => { arity: Arity::Exact(1), func: |args| unary_round(f64::sqrt, args) },
    "pow"    => { arity: Arity::Exact(2), func: pow },
    "min"    => { arity: Arity::AtLeast(1), func: |args| fold_numeric(f64::min, args) },
    "max"    => { arity: Arity::AtLeast(1), func: |args| fold_numeric(f64::max, args) },
    "len"    => { arity: Arity::Exact(1), func: len },
    "concat" => { arity: Arity::AtLeast(0), func: concat },
    "str"    => { arity: Arity::AtLeast(0), func: str_fn },
}

impl Arity {
    /// Tests whether the given argument count satisfies this constraint.
    pub(crate) const fn check(&self, n: usize) -> bool {
        match self {
            Self::Exact(m) => n == *m,
            Self::AtLeast(m) => n >= *m,
        }
    }
}

/// Finds a builtin definition by name.
pub(crate) fn find(name: &str) -> Option<&'static BuiltinDef> {
    BUILTIN_TABLE.iter().find(|b| b.name == name)
}

fn abs(args: &[Value]) -> Value {
    match args[0] {
        Value::Number(n) => Value::Number(n.abs()),
        _ => Value::Undefined,
    }
}

fn sign(args: &[Value]) -> Value {
    match args[0] {
        Value::Number(n) if n == 0.0 => Value::Number(0.0),
        Value::Number(n) => Value::Number(n.signum()),
        _ => Value::Undefined,
    }
}

/// Applies a unary numeric function, or `undef` off the numbers.
fn unary_round(f: fn(f64) -> f64, args: &[Value]) -> Value {
    match args[0] {
        Value::Number(n) => Value::Number(f(n)),
        _ => Value::Undefined,
    }
}

fn pow(args: &[Value]) -> Value {
    match (&args[0], &args[1]) {
        (Value::Number(base), Value::Number(exp)) => Value::Number(base.powf(*exp)),
        _ => Value::Undefined,
    }
}

/// Folds `min`/`max` over the arguments, or over a single vector argument.
fn fold_numeric(f: fn(f64, f64) -> f64, args: &[Value]) -> Value {
    let values: &[Value] = match args {
        [Value::Vector(elements)] => elements,
        _ => args,
    };

    let mut result: Option<f64> = None;
    for value in values {
        let Value::Number(n) = value else {
            return Value::Undefined;
        };
        result = Some(result.map_or(*n, |acc| f(acc, *n)));
    }

    result.map_or(Value::Undefined, Value::Number)
}

#[allow(clippy::cast_precision_loss)]
fn len(args: &[Value]) -> Value {
    match &args[0] {
        Value::Text(text) => Value::Number(text.chars().count() as f64),
        Value::Vector(elements) => Value::Number(elements.len() as f64),
        _ => Value::Undefined,
    }
}

/// Concatenates the arguments into one vector, splicing vector arguments.
fn concat(args: &[Value]) -> Value {
    let mut elements = Vec::with_capacity(args.len());
    for value in args {
        if let Value::Vector(inner) = value {
            elements.extend(inner.iter().cloned());
        } else {
            elements.push(value.clone());
        }
    }
    Value::Vector(Rc::new(elements))
}

/// Concatenates the display forms of the arguments into a string.
fn str_fn(args: &[Value]) -> Value {
    let mut text = String::new();
    for value in args {
        text.push_str(&value.to_string());
    }
    Value::Text(text)
}
