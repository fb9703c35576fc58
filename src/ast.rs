use crate::{features::FeatureSet, value::core::Value};

/// A region of source code attached to every AST node.
///
/// Locations are diagnostic only: they end up in warnings and assertion
/// messages, and evaluation never branches on them. Nodes produced
/// programmatically (rather than by the parser) can carry
/// [`Location::NONE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    /// Line on which the node starts (1-based).
    pub first_line: i32,
    /// Column on which the node starts.
    pub first_col:  i32,
    /// Line on which the node ends.
    pub last_line:  i32,
    /// Column on which the node ends.
    pub last_col:   i32,
}

impl Location {
    /// The sentinel location for nodes without a source position.
    pub const NONE: Self = Self::new(0, 0, 0, 0);

    /// Creates a location from its four coordinates.
    #[must_use]
    pub const fn new(first_line: i32, first_col: i32, last_line: i32, last_col: i32) -> Self {
        Self { first_line,
               first_col,
               last_line,
               last_col }
    }

    /// Creates a location spanning a single line.
    ///
    /// ## Example
    /// ```
    /// use carve::ast::Location;
    ///
    /// let loc = Location::line(7);
    /// assert_eq!(loc.first_line, 7);
    /// assert_eq!(loc.last_line, 7);
    /// ```
    #[must_use]
    pub const fn line(line: i32) -> Self {
        Self::new(line, 0, line, 0)
    }
}

/// A `(name, optional expression)` pair with a source location.
///
/// Assignment lists are the currency of both declaration sites (function
/// and module parameter lists, where the expression is the default value)
/// and call sites (`let` bindings and call arguments, where an empty name
/// marks a positional argument).
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    /// The bound name; empty for a positional call argument.
    pub name: String,
    /// The bound expression, or `None` for a bare parameter declaration.
    pub expr: Option<Expr>,
    /// Location of the assignment in the source.
    pub loc:  Location,
}

impl Assignment {
    /// Creates a named assignment or parameter.
    #[must_use]
    pub fn new(name: impl Into<String>, expr: Option<Expr>, loc: Location) -> Self {
        Self { name: name.into(),
               expr,
               loc }
    }

    /// Creates a positional (unnamed) call argument.
    #[must_use]
    pub fn positional(expr: Expr, loc: Location) -> Self {
        Self { name: String::new(),
               expr: Some(expr),
               loc }
    }
}

/// A list of assignments, in declaration or call order.
pub type AssignmentList = Vec<Assignment>;

/// Represents a unary operator.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum UnaryOperator {
    /// Logical NOT (`!x`), negating the boolean coercion of the operand.
    Not,
    /// Arithmetic negation (`-x`).
    Negate,
}

/// Represents a binary operator.
///
/// Binary operators include arithmetic, comparisons and the short-circuit
/// logical connectives.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BinaryOperator {
    /// Short-circuit logical and (`&&`)
    And,
    /// Short-circuit logical or (`||`)
    Or,
    /// Multiplication (`*`), including vector and matrix products
    Mul,
    /// Division (`/`)
    Div,
    /// Modulo (`%`)
    Mod,
    /// Addition (`+`), including vector sums and string concatenation
    Add,
    /// Subtraction (`-`)
    Sub,
    /// Less than (`<`)
    Lt,
    /// Less than or equal (`<=`)
    Le,
    /// Greater than (`>`)
    Gt,
    /// Greater than or equal (`>=`)
    Ge,
    /// Structural equality (`==`)
    Eq,
    /// Structural inequality (`!=`)
    Ne,
}

impl std::fmt::Display for UnaryOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let operator = match self {
            Self::Not => "!",
            Self::Negate => "-",
        };
        write!(f, "{operator}")
    }
}

impl std::fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use BinaryOperator::{Add, And, Div, Eq, Ge, Gt, Le, Lt, Mod, Mul, Ne, Or, Sub};

        let operator = match self {
            And => "&&",
            Or => "||",
            Mul => "*",
            Div => "/",
            Mod => "%",
            Add => "+",
            Sub => "-",
            Lt => "<",
            Le => "<=",
            Gt => ">",
            Ge => ">=",
            Eq => "==",
            Ne => "!=",
        };
        write!(f, "{operator}")
    }
}

/// An abstract syntax tree node representing an expression.
///
/// `Expr` covers every expression form of the language: literals, variable
/// lookups, operators, ranges, vectors, function calls, the side-effecting
/// `assert`/`echo`/`let` forms and the list-comprehension elements. Each
/// node owns its sub-expressions exclusively and carries a [`Location`].
/// Nodes are never mutated after construction; the same tree may be
/// evaluated any number of times.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A unary operation (negation or logical NOT).
    UnaryOp {
        /// The unary operator to apply.
        op:   UnaryOperator,
        /// The operand expression.
        expr: Box<Self>,
        /// Location of the node in the source.
        loc:  Location,
    },
    /// A binary operation (arithmetic, comparison or logical).
    BinaryOp {
        /// The operator.
        op:    BinaryOperator,
        /// Left operand.
        left:  Box<Self>,
        /// Right operand.
        right: Box<Self>,
        /// Location of the node in the source.
        loc:   Location,
    },
    /// A conditional (`cond ? then : else`) expression.
    TernaryOp {
        /// The condition expression.
        cond:      Box<Self>,
        /// Expression evaluated when the condition coerces to `true`.
        if_expr:   Box<Self>,
        /// Expression evaluated otherwise.
        else_expr: Box<Self>,
        /// Location of the node in the source.
        loc:       Location,
    },
    /// An indexing expression (`value[index]`).
    ArrayLookup {
        /// The indexed expression.
        array: Box<Self>,
        /// The index expression.
        index: Box<Self>,
        /// Location of the node in the source.
        loc:   Location,
    },
    /// A constant value.
    Literal {
        /// The constant value.
        value: Value,
        /// Location of the node in the source.
        loc:   Location,
    },
    /// A range expression (`[begin : step : end]`).
    Range {
        /// The first value of the range.
        begin: Box<Self>,
        /// The increment; defaults to `1` when absent.
        step:  Option<Box<Self>>,
        /// The last value of the range.
        end:   Box<Self>,
        /// Location of the node in the source.
        loc:   Location,
    },
    /// A vector literal (`[a, b, c]`).
    ///
    /// Children that are list-comprehension nodes are spliced into the
    /// parent vector during evaluation.
    Vector {
        /// The element expressions.
        children: Vec<Self>,
        /// Location of the node in the source.
        loc:      Location,
    },
    /// A variable read, resolved through the context chain.
    Lookup {
        /// Name of the variable.
        name: String,
        /// Location of the node in the source.
        loc:  Location,
    },
    /// A member access (`value.x`, `range.begin`, ...).
    MemberLookup {
        /// The accessed expression.
        expr:   Box<Self>,
        /// The member name.
        member: String,
        /// Location of the node in the source.
        loc:    Location,
    },
    /// A function call with named and positional arguments.
    FunctionCall {
        /// Name of the function being called.
        name:      String,
        /// Arguments to the function.
        arguments: AssignmentList,
        /// Location of the node in the source.
        loc:       Location,
    },
    /// An `assert(condition, message)` expression with an optional body.
    Assert {
        /// The call-site arguments, resolved against `[condition, message]`.
        arguments: AssignmentList,
        /// Expression evaluated (and returned) when the assertion holds.
        body:      Option<Box<Self>>,
        /// Location of the node in the source.
        loc:       Location,
    },
    /// An `echo(...)` expression with an optional body.
    Echo {
        /// The call-site arguments echoed to the diagnostic sink.
        arguments: AssignmentList,
        /// Expression evaluated (and returned) after echoing.
        body:      Option<Box<Self>>,
        /// Location of the node in the source.
        loc:       Location,
    },
    /// A `let(bindings) body` expression.
    Let {
        /// The sequential bindings.
        arguments: AssignmentList,
        /// The expression evaluated in the new scope.
        body:      Box<Self>,
        /// Location of the node in the source.
        loc:       Location,
    },
    /// A conditional list-comprehension element.
    LcIf {
        /// The condition expression.
        cond:      Box<Self>,
        /// Element(s) produced when the condition holds.
        if_expr:   Box<Self>,
        /// Element(s) produced otherwise (experimental).
        else_expr: Option<Box<Self>>,
        /// Location of the node in the source.
        loc:       Location,
    },
    /// An iterating list-comprehension element (`for (i = ...) body`).
    LcFor {
        /// The single iteration binding.
        arguments: AssignmentList,
        /// The element expression evaluated per iteration.
        body:      Box<Self>,
        /// Location of the node in the source.
        loc:       Location,
    },
    /// A C-style list-comprehension loop (`for (init; cond; incr) body`).
    LcForC {
        /// The initial sequential bindings.
        arguments:      AssignmentList,
        /// The increment bindings applied after each iteration.
        incr_arguments: AssignmentList,
        /// The loop condition.
        cond:           Box<Self>,
        /// The element expression evaluated per iteration.
        body:           Box<Self>,
        /// Location of the node in the source.
        loc:            Location,
    },
    /// An `each` list-comprehension element, splicing its operand.
    LcEach {
        /// The spliced expression.
        expr: Box<Self>,
        /// Location of the node in the source.
        loc:  Location,
    },
    /// A `let` list-comprehension element.
    LcLet {
        /// The sequential bindings.
        arguments: AssignmentList,
        /// The element expression evaluated in the new scope.
        body:      Box<Self>,
        /// Location of the node in the source.
        loc:       Location,
    },
}

impl Expr {
    /// Gets the location of `self`.
    #[must_use]
    pub const fn location(&self) -> Location {
        match self {
            Self::UnaryOp { loc, .. }
            | Self::BinaryOp { loc, .. }
            | Self::TernaryOp { loc, .. }
            | Self::ArrayLookup { loc, .. }
            | Self::Literal { loc, .. }
            | Self::Range { loc, .. }
            | Self::Vector { loc, .. }
            | Self::Lookup { loc, .. }
            | Self::MemberLookup { loc, .. }
            | Self::FunctionCall { loc, .. }
            | Self::Assert { loc, .. }
            | Self::Echo { loc, .. }
            | Self::Let { loc, .. }
            | Self::LcIf { loc, .. }
            | Self::LcFor { loc, .. }
            | Self::LcForC { loc, .. }
            | Self::LcEach { loc, .. }
            | Self::LcLet { loc, .. } => *loc,
        }
    }

    /// Gets the first source line of `self`.
    ///
    /// ## Example
    /// ```
    /// use carve::ast::{Expr, Location};
    ///
    /// let expr = Expr::Lookup { name: "x".to_string(),
    ///                           loc:  Location::line(5), };
    ///
    /// assert_eq!(expr.line_number(), 5);
    /// ```
    #[must_use]
    pub const fn line_number(&self) -> i32 {
        self.location().first_line
    }

    /// Tests whether this node is a constant.
    ///
    /// A node is literal when it is a [`Expr::Literal`], or a unary
    /// operation, range or vector all of whose sub-expressions are literal.
    /// Optimizers may use this to fold subtrees; it never changes
    /// evaluation semantics.
    #[must_use]
    pub fn is_literal(&self) -> bool {
        match self {
            Self::Literal { .. } => true,
            Self::UnaryOp { expr, .. } => expr.is_literal(),
            Self::Range { begin, step, end, .. } => {
                begin.is_literal()
                && end.is_literal()
                && step.as_ref().is_none_or(|step| step.is_literal())
            },
            Self::Vector { children, .. } => children.iter().all(Self::is_literal),
            _ => false,
        }
    }

    /// Tests whether this node is a list-comprehension element.
    ///
    /// The splice rule is decided on the node, not on the produced value: a
    /// looked-up variable holding a vector does not splice even when that
    /// vector came out of a comprehension.
    #[must_use]
    pub const fn is_list_comprehension(&self) -> bool {
        matches!(self,
                 Self::LcIf { .. }
                 | Self::LcFor { .. }
                 | Self::LcForC { .. }
                 | Self::LcEach { .. }
                 | Self::LcLet { .. })
    }

    /// Creates a call expression, rewriting the special names.
    ///
    /// This is the factory used by the parser when reducing a call: the
    /// names `assert` and `echo` produce the corresponding side-effecting
    /// variants when their experimental feature is enabled, and `let`
    /// (with a body) always produces [`Expr::Let`]. Every other name — and
    /// the special names with their feature disabled — produces a plain
    /// [`Expr::FunctionCall`], so the evaluator itself never inspects call
    /// names.
    ///
    /// ## Example
    /// ```
    /// use carve::{
    ///     ast::{Expr, Location},
    ///     features::FeatureSet,
    /// };
    ///
    /// let call = Expr::call("assert", Vec::new(), None, &FeatureSet::none(), Location::NONE);
    /// assert!(matches!(call, Expr::FunctionCall { .. }));
    ///
    /// let assert = Expr::call("assert", Vec::new(), None, &FeatureSet::all(), Location::NONE);
    /// assert!(matches!(assert, Expr::Assert { .. }));
    /// ```
    #[must_use]
    pub fn call(name: impl Into<String>,
                arguments: AssignmentList,
                body: Option<Self>,
                features: &FeatureSet,
                loc: Location)
                -> Self {
        let name = name.into();

        match name.as_str() {
            "assert" if features.assert_expression => {
                return Self::Assert { arguments,
                                      body: body.map(Box::new),
                                      loc };
            },
            "echo" if features.echo_expression => {
                return Self::Echo { arguments,
                                    body: body.map(Box::new),
                                    loc };
            },
            "let" => {
                if let Some(body) = body {
                    return Self::Let { arguments,
                                       body: Box::new(body),
                                       loc };
                }
            },
            _ => {},
        }

        Self::FunctionCall { name,
                             arguments,
                             loc }
    }
}

/// Writes an assignment list in its source form (`a = 1, 2, b = x`).
pub(crate) fn fmt_assignments(f: &mut std::fmt::Formatter<'_>,
                              arguments: &[Assignment])
                              -> std::fmt::Result {
    for (i, arg) in arguments.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        if !arg.name.is_empty() {
            write!(f, "{}", arg.name)?;
            if arg.expr.is_some() {
                write!(f, " = ")?;
            }
        }
        if let Some(expr) = &arg.expr {
            write!(f, "{expr}")?;
        }
    }
    Ok(())
}

impl std::fmt::Display for Expr {
    /// Writes the expression in its source form.
    ///
    /// This rendering is what assertion failures and diagnostics quote; it
    /// parenthesizes operators rather than reconstructing precedence.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnaryOp { op, expr, .. } => write!(f, "{op}{expr}"),
            Self::BinaryOp { op, left, right, .. } => write!(f, "({left} {op} {right})"),
            Self::TernaryOp { cond,
                              if_expr,
                              else_expr,
                              .. } => write!(f, "({cond} ? {if_expr} : {else_expr})"),
            Self::ArrayLookup { array, index, .. } => write!(f, "{array}[{index}]"),
            Self::Literal { value, .. } => write!(f, "{value}"),
            Self::Range { begin, step, end, .. } => {
                write!(f, "[{begin}")?;
                if let Some(step) = step {
                    write!(f, " : {step}")?;
                }
                write!(f, " : {end}]")
            },
            Self::Vector { children, .. } => {
                write!(f, "[")?;
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{child}")?;
                }
                write!(f, "]")
            },
            Self::Lookup { name, .. } => write!(f, "{name}"),
            Self::MemberLookup { expr, member, .. } => write!(f, "{expr}.{member}"),
            Self::FunctionCall { name, arguments, .. } => {
                write!(f, "{name}(")?;
                fmt_assignments(f, arguments)?;
                write!(f, ")")
            },
            Self::Assert { arguments, body, .. } => {
                write!(f, "assert(")?;
                fmt_assignments(f, arguments)?;
                write!(f, ")")?;
                if let Some(body) = body {
                    write!(f, " {body}")?;
                }
                Ok(())
            },
            Self::Echo { arguments, body, .. } => {
                write!(f, "echo(")?;
                fmt_assignments(f, arguments)?;
                write!(f, ")")?;
                if let Some(body) = body {
                    write!(f, " {body}")?;
                }
                Ok(())
            },
            Self::Let { arguments, body, .. } => {
                write!(f, "let(")?;
                fmt_assignments(f, arguments)?;
                write!(f, ") {body}")
            },
            Self::LcIf { cond,
                         if_expr,
                         else_expr,
                         .. } => {
                write!(f, "if({cond}) ({if_expr})")?;
                if let Some(else_expr) = else_expr {
                    write!(f, " else ({else_expr})")?;
                }
                Ok(())
            },
            Self::LcFor { arguments, body, .. } => {
                write!(f, "for(")?;
                fmt_assignments(f, arguments)?;
                write!(f, ") ({body})")
            },
            Self::LcForC { arguments,
                           incr_arguments,
                           cond,
                           body,
                           .. } => {
                write!(f, "for(")?;
                fmt_assignments(f, arguments)?;
                write!(f, ";{cond};")?;
                fmt_assignments(f, incr_arguments)?;
                write!(f, ") {body}")
            },
            Self::LcEach { expr, .. } => write!(f, "each ({expr})"),
            Self::LcLet { arguments, body, .. } => {
                write!(f, "let(")?;
                fmt_assignments(f, arguments)?;
                write!(f, ") ({body})")
            },
        }
    }
}
