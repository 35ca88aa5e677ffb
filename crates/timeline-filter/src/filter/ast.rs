//! Abstract Syntax Tree (AST) for the boolean skeleton of a query.

/// A parsed boolean expression over clause results.
///
/// Clauses are referenced by index; their truth values are computed per
/// record and supplied to [`Expr::evaluate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// A `True` / `False` literal.
    Literal(bool),

    /// The result of the clause at this index.
    Clause(usize),

    /// Logical AND of two expressions.
    And(Box<Expr>, Box<Expr>),

    /// Logical OR of two expressions.
    Or(Box<Expr>, Box<Expr>),

    /// Logical NOT of an expression.
    Not(Box<Expr>),
}

impl Expr {
    /// Creates an AND expression.
    pub fn and(left: Expr, right: Expr) -> Self {
        Expr::And(Box::new(left), Box::new(right))
    }

    /// Creates an OR expression.
    pub fn or(left: Expr, right: Expr) -> Self {
        Expr::Or(Box::new(left), Box::new(right))
    }

    /// Creates a NOT expression.
    pub fn negate(inner: Expr) -> Self {
        Expr::Not(Box::new(inner))
    }

    /// Evaluates the expression given each clause's (negation-applied) result.
    ///
    /// # Panics
    ///
    /// Panics if a clause index is out of range for `clause_values`; the
    /// parser only produces indices for clauses it compiled.
    pub fn evaluate(&self, clause_values: &[bool]) -> bool {
        match self {
            Expr::Literal(value) => *value,
            Expr::Clause(index) => clause_values[*index],
            Expr::And(left, right) => left.evaluate(clause_values) && right.evaluate(clause_values),
            Expr::Or(left, right) => left.evaluate(clause_values) || right.evaluate(clause_values),
            Expr::Not(inner) => !inner.evaluate(clause_values),
        }
    }
}
