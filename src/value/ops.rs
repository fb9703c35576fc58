use std::{cmp::Ordering, rc::Rc};

use crate::value::core::Value;

impl Value {
    /// Adds two values.
    ///
    /// Numbers add numerically. Vectors of the same length add
    /// elementwise (recursively, so matrices add too); mismatched lengths
    /// yield `undef`. Strings concatenate. Anything else yields `undef`.
    ///
    /// ## Example
    /// ```
    /// use carve::value::core::Value;
    ///
    /// let a = Value::from(vec![Value::Number(1.0), Value::Number(2.0)]);
    /// let b = Value::from(vec![Value::Number(10.0), Value::Number(20.0)]);
    ///
    /// assert_eq!(a.add(&b),
    ///            Value::from(vec![Value::Number(11.0), Value::Number(22.0)]));
    /// assert_eq!(Value::from("ab").add(&Value::from("cd")), Value::from("abcd"));
    /// assert_eq!(Value::Undefined.add(&Value::Number(1.0)), Value::Undefined);
    /// ```
    #[must_use]
    pub fn add(&self, other: &Self) -> Self {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => Self::Number(a + b),
            (Self::Vector(a), Self::Vector(b)) => elementwise(a, b, Self::add),
            (Self::Text(a), Self::Text(b)) => Self::Text(format!("{a}{b}")),
            _ => Self::Undefined,
        }
    }

    /// Subtracts `other` from `self`.
    ///
    /// Numbers subtract numerically and same-length vectors subtract
    /// elementwise; anything else yields `undef`.
    #[must_use]
    pub fn sub(&self, other: &Self) -> Self {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => Self::Number(a - b),
            (Self::Vector(a), Self::Vector(b)) => elementwise(a, b, Self::sub),
            _ => Self::Undefined,
        }
    }

    /// Multiplies two values.
    ///
    /// Beyond numeric multiplication this covers the linear-algebra
    /// shapes: vector·scalar scaling (either order), vector·vector dot
    /// products, and matrix·vector, vector·matrix and matrix·matrix
    /// products. Incompatible shapes yield `undef`.
    ///
    /// ## Example
    /// ```
    /// use carve::value::core::Value;
    ///
    /// fn vec2(x: f64, y: f64) -> Value {
    ///     Value::from(vec![Value::Number(x), Value::Number(y)])
    /// }
    ///
    /// // Dot product
    /// assert_eq!(vec2(1.0, 2.0).mul(&vec2(3.0, 4.0)), Value::Number(11.0));
    ///
    /// // Matrix times vector
    /// let matrix = Value::from(vec![vec2(1.0, 2.0), vec2(3.0, 4.0)]);
    /// assert_eq!(matrix.mul(&vec2(1.0, 2.0)), vec2(5.0, 11.0));
    ///
    /// // Scaling
    /// assert_eq!(vec2(1.0, 2.0).mul(&Value::Number(3.0)), vec2(3.0, 6.0));
    /// ```
    #[must_use]
    pub fn mul(&self, other: &Self) -> Self {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => Self::Number(a * b),
            (Self::Vector(elements), Self::Number(_)) => scale(elements, other),
            (Self::Number(_), Self::Vector(elements)) => scale(elements, self),
            (Self::Vector(a), Self::Vector(b)) => mul_vectors(a, b),
            _ => Self::Undefined,
        }
    }

    /// Divides `self` by `other`.
    ///
    /// Only defined for numbers; division follows IEEE-754, so dividing by
    /// zero produces an infinity rather than an error.
    #[must_use]
    pub fn div(&self, other: &Self) -> Self {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => Self::Number(a / b),
            _ => Self::Undefined,
        }
    }

    /// Computes `self` modulo `other` on numbers.
    #[must_use]
    pub fn modulo(&self, other: &Self) -> Self {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => Self::Number(a % b),
            _ => Self::Undefined,
        }
    }

    /// Negates a number, or a vector elementwise.
    #[must_use]
    pub fn negate(&self) -> Self {
        match self {
            Self::Number(n) => Self::Number(-n),
            Self::Vector(elements) => {
                Self::Vector(Rc::new(elements.iter().map(Self::negate).collect()))
            },
            _ => Self::Undefined,
        }
    }

    /// Logically negates the boolean coercion of the value.
    #[must_use]
    pub fn not(&self) -> Self {
        Self::Bool(!self.to_bool())
    }

    /// Tests `self < other`.
    ///
    /// Numbers compare numerically and strings lexicographically; any
    /// other combination yields `undef` (which coerces to `false` where a
    /// boolean is required).
    #[must_use]
    pub fn less_than(&self, other: &Self) -> Self {
        self.ordering(other)
            .map_or(Self::Undefined, |o| Self::Bool(o == Ordering::Less))
    }

    /// Tests `self <= other`; see [`Self::less_than`].
    #[must_use]
    pub fn less_or_equal(&self, other: &Self) -> Self {
        self.ordering(other)
            .map_or(Self::Undefined, |o| Self::Bool(o != Ordering::Greater))
    }

    /// Tests `self > other`; see [`Self::less_than`].
    #[must_use]
    pub fn greater_than(&self, other: &Self) -> Self {
        self.ordering(other)
            .map_or(Self::Undefined, |o| Self::Bool(o == Ordering::Greater))
    }

    /// Tests `self >= other`; see [`Self::less_than`].
    #[must_use]
    pub fn greater_or_equal(&self, other: &Self) -> Self {
        self.ordering(other)
            .map_or(Self::Undefined, |o| Self::Bool(o != Ordering::Less))
    }

    /// Tests structural equality.
    ///
    /// Values of different kinds compare unequal, and `undef` equals only
    /// itself — so `(undef + 1) == undef` holds. The result is always a
    /// boolean.
    ///
    /// ## Example
    /// ```
    /// use carve::value::core::Value;
    ///
    /// assert_eq!(Value::Undefined.equals(&Value::Undefined), Value::Bool(true));
    /// assert_eq!(Value::Number(1.0).equals(&Value::Bool(true)), Value::Bool(false));
    /// ```
    #[must_use]
    pub fn equals(&self, other: &Self) -> Self {
        Self::Bool(self == other)
    }

    /// Tests structural inequality; the negation of [`Self::equals`].
    #[must_use]
    pub fn not_equals(&self, other: &Self) -> Self {
        Self::Bool(self != other)
    }

    /// Indexes the value.
    ///
    /// The index is floor-truncated to an integer. Vectors yield the
    /// element, strings yield a one-character string, and ranges expose
    /// `begin`/`step`/`end` at indices 0/1/2. Anything out of range — and
    /// any non-numeric index — yields `undef`.
    ///
    /// ## Example
    /// ```
    /// use carve::value::{core::Value, range::RangeValue};
    ///
    /// let v = Value::from(vec![Value::Number(10.0), Value::Number(20.0)]);
    /// assert_eq!(v.index(&Value::Number(1.9)), Value::Number(20.0));
    /// assert_eq!(v.index(&Value::Number(2.0)), Value::Undefined);
    ///
    /// let text = Value::from("abc");
    /// assert_eq!(text.index(&Value::Number(0.0)), Value::from("a"));
    ///
    /// let range = Value::Range(RangeValue::with_step(1.0, 2.0, 9.0));
    /// assert_eq!(range.index(&Value::Number(1.0)), Value::Number(2.0));
    /// ```
    #[must_use]
    pub fn index(&self, index: &Self) -> Self {
        let Self::Number(n) = index else {
            return Self::Undefined;
        };
        let Some(i) = element_index(*n) else {
            return Self::Undefined;
        };

        match self {
            Self::Vector(elements) => elements.get(i).cloned().unwrap_or(Self::Undefined),
            Self::Text(text) => {
                text.chars()
                    .nth(i)
                    .map_or(Self::Undefined, |ch| Self::Text(ch.to_string()))
            },
            Self::Range(range) => match i {
                0 => Self::Number(range.begin),
                1 => Self::Number(range.step),
                2 => Self::Number(range.end),
                _ => Self::Undefined,
            },
            _ => Self::Undefined,
        }
    }

    /// Orders two values when their kinds support comparison.
    fn ordering(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a.partial_cmp(b),
            (Self::Text(a), Self::Text(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

/// Floor-truncates a numeric index, rejecting negatives and non-finites.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn element_index(value: f64) -> Option<usize> {
    if !value.is_finite() {
        return None;
    }

    let floored = value.floor();
    if floored < 0.0 {
        return None;
    }

    Some(floored as usize)
}

/// Combines two vectors elementwise; mismatched lengths yield `undef`.
fn elementwise(a: &[Value], b: &[Value], f: fn(&Value, &Value) -> Value) -> Value {
    if a.len() != b.len() {
        return Value::Undefined;
    }

    Value::Vector(Rc::new(a.iter().zip(b.iter()).map(|(l, r)| f(l, r)).collect()))
}

/// Scales every element of a vector by a numeric factor.
fn scale(elements: &[Value], factor: &Value) -> Value {
    Value::Vector(Rc::new(elements.iter().map(|e| e.mul(factor)).collect()))
}

/// Multiplies two vector values: dot product or a matrix product shape.
fn mul_vectors(a: &[Value], b: &[Value]) -> Value {
    if let (Some(x), Some(y)) = (number_list(a), number_list(b)) {
        if x.len() != y.len() {
            return Value::Undefined;
        }
        return Value::Number(dot(&x, &y));
    }

    match (matrix_rows(a), matrix_rows(b)) {
        (Some(matrix), None) => number_list(b).map_or(Value::Undefined, |v| {
                                                  matrix_times_vector(&matrix, &v)
                                              }),
        (None, Some(matrix)) => number_list(a).map_or(Value::Undefined, |v| {
                                                  vector_times_matrix(&v, &matrix)
                                              }),
        (Some(left), Some(right)) => matrix_times_matrix(&left, &right),
        _ => Value::Undefined,
    }
}

/// Views a slice of values as numbers, or `None` if any element is not one.
fn number_list(values: &[Value]) -> Option<Vec<f64>> {
    values.iter().map(Value::as_number).collect()
}

/// Views a slice of values as a rectangular matrix of numbers.
fn matrix_rows(values: &[Value]) -> Option<Vec<Vec<f64>>> {
    if values.is_empty() {
        return None;
    }

    let rows: Vec<Vec<f64>> = values.iter()
                                    .map(|row| row.as_vector().and_then(number_list))
                                    .collect::<Option<_>>()?;

    let width = rows[0].len();
    if rows.iter().any(|row| row.len() != width) {
        return None;
    }
    Some(rows)
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

fn matrix_times_vector(matrix: &[Vec<f64>], vector: &[f64]) -> Value {
    if matrix[0].len() != vector.len() {
        return Value::Undefined;
    }

    Value::Vector(Rc::new(matrix.iter()
                                .map(|row| Value::Number(dot(row, vector)))
                                .collect()))
}

fn vector_times_matrix(vector: &[f64], matrix: &[Vec<f64>]) -> Value {
    if vector.len() != matrix.len() {
        return Value::Undefined;
    }

    let columns = matrix[0].len();
    let products = (0..columns).map(|j| {
                                   let sum = vector.iter()
                                                   .zip(matrix.iter())
                                                   .map(|(v, row)| v * row[j])
                                                   .sum();
                                   Value::Number(sum)
                               })
                               .collect();
    Value::Vector(Rc::new(products))
}

fn matrix_times_matrix(left: &[Vec<f64>], right: &[Vec<f64>]) -> Value {
    if left[0].len() != right.len() {
        return Value::Undefined;
    }

    let columns = right[0].len();
    let rows = left.iter()
                   .map(|row| {
                       let products = (0..columns).map(|j| {
                                                      let sum = row.iter()
                                                                   .zip(right.iter())
                                                                   .map(|(v, r)| v * r[j])
                                                                   .sum();
                                                      Value::Number(sum)
                                                  })
                                                  .collect();
                       Value::Vector(Rc::new(products))
                   })
                   .collect();
    Value::Vector(Rc::new(rows))
}
