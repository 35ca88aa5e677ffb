//! Recursive descent parser for filter queries.

use crate::record::Schema;

use super::ast::Expr;
use super::clause::Clause;
use super::error::{FilterError, FilterResult};
use super::lexer::{Lexer, QueryToken};

/// A query split into its boolean skeleton and compiled clauses.
#[derive(Debug)]
pub struct ParsedQuery {
    /// The boolean expression; clause leaves index into `clauses`.
    pub expr: Expr,
    /// Every clause occurrence, in order.
    pub clauses: Vec<Clause>,
}

/// Parser for filter queries.
///
/// # Grammar
///
/// ```text
/// query    ::= or_expr
/// or_expr  ::= and_expr ("or" and_expr)*
/// and_expr ::= unary ("and" unary)*
/// unary    ::= "not" unary | primary
/// primary  ::= "(" or_expr ")" | "True" | "False" | clause
/// clause   ::= field ["not"] operator quoted-literal
/// ```
///
/// # Operator Precedence (highest to lowest)
///
/// 1. `not` - unary
/// 2. `and` - binary, left-associative
/// 3. `or` - binary, left-associative
///
/// # Example
///
/// ```
/// use timeline_filter::filter::{Expr, QueryParser};
/// use timeline_filter::Schema;
///
/// let schema = Schema::new(vec!["desc".to_string()]);
/// let parsed = QueryParser::parse(r#"not desc contains "x""#, &schema).unwrap();
/// assert!(matches!(parsed.expr, Expr::Not(_)));
/// assert_eq!(parsed.clauses.len(), 1);
/// ```
pub struct QueryParser {
    tokens: Vec<QueryToken>,
    position: usize,
}

impl QueryParser {
    /// Parses a query string against a schema.
    ///
    /// # Errors
    ///
    /// Returns `FilterError::EmptyExpression` if the input contains no tokens,
    /// any lexer error for clauses or stray words, and
    /// `FilterError::UnexpectedToken` / `FilterError::UnexpectedEndOfInput` /
    /// `FilterError::UnclosedParenthesis` for structural faults.
    pub fn parse(input: &str, schema: &Schema) -> FilterResult<ParsedQuery> {
        Self::parse_lexed(Lexer::new(input, schema))
    }

    /// Parses a query without checking field names.
    ///
    /// Used when no schema is available, so structural faults, unknown
    /// operators and bad literals are still reported.
    ///
    /// # Errors
    ///
    /// The same as [`QueryParser::parse`], minus `FilterError::UnknownField`.
    pub fn parse_unchecked(input: &str) -> FilterResult<ParsedQuery> {
        Self::parse_lexed(Lexer::without_schema(input))
    }

    fn parse_lexed(lexer: Lexer<'_>) -> FilterResult<ParsedQuery> {
        let output = lexer.tokenize()?;
        let tokens: Vec<QueryToken> = output.tokens.into_iter().map(|pt| pt.token).collect();
        let expr = Self::parse_tokens(tokens)?;
        Ok(ParsedQuery {
            expr,
            clauses: output.clauses,
        })
    }

    /// Parses an already-tokenized skeleton.
    pub fn parse_tokens(tokens: Vec<QueryToken>) -> FilterResult<Expr> {
        if tokens.is_empty() {
            return Err(FilterError::EmptyExpression);
        }

        let mut parser = Self {
            tokens,
            position: 0,
        };
        let expr = parser.parse_expression()?;

        // Check that we consumed all tokens
        if let Some(remaining) = parser.peek() {
            return Err(FilterError::unexpected_token(describe(remaining)));
        }

        Ok(expr)
    }

    /// Returns the current token without consuming it.
    fn peek(&self) -> Option<QueryToken> {
        self.tokens.get(self.position).copied()
    }

    /// Consumes and returns the current token.
    fn advance(&mut self) -> Option<QueryToken> {
        let token = self.peek();
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    /// Checks if the current token matches the expected token type.
    fn check(&self, expected: QueryToken) -> bool {
        self.peek() == Some(expected)
    }

    fn parse_expression(&mut self) -> FilterResult<Expr> {
        self.parse_or_expr()
    }

    /// Parses OR expressions: `and_expr ("or" and_expr)*`
    fn parse_or_expr(&mut self) -> FilterResult<Expr> {
        let mut left = self.parse_and_expr()?;

        while self.check(QueryToken::Or) {
            self.advance();
            let right = self.parse_and_expr()?;
            left = Expr::or(left, right);
        }

        Ok(left)
    }

    /// Parses AND expressions: `unary ("and" unary)*`
    fn parse_and_expr(&mut self) -> FilterResult<Expr> {
        let mut left = self.parse_unary_expr()?;

        while self.check(QueryToken::And) {
            self.advance();
            let right = self.parse_unary_expr()?;
            left = Expr::and(left, right);
        }

        Ok(left)
    }

    /// Parses unary expressions: `"not" unary | primary`
    fn parse_unary_expr(&mut self) -> FilterResult<Expr> {
        if self.check(QueryToken::Not) {
            self.advance();
            let inner = self.parse_unary_expr()?;
            return Ok(Expr::negate(inner));
        }

        self.parse_primary()
    }

    /// Parses primary expressions: `"(" expression ")" | literal | clause`
    fn parse_primary(&mut self) -> FilterResult<Expr> {
        let token = self.advance().ok_or(FilterError::UnexpectedEndOfInput)?;

        match token {
            QueryToken::OpenParen => {
                let inner = self.parse_expression()?;
                if !self.check(QueryToken::CloseParen) {
                    return Err(FilterError::UnclosedParenthesis);
                }
                self.advance();
                Ok(inner)
            }
            QueryToken::Bool(value) => Ok(Expr::Literal(value)),
            QueryToken::Clause(index) => Ok(Expr::Clause(index)),
            other @ (QueryToken::And | QueryToken::Or | QueryToken::Not | QueryToken::CloseParen) => {
                Err(FilterError::unexpected_token(describe(other)))
            }
        }
    }
}

fn describe(token: QueryToken) -> String {
    match token {
        QueryToken::And => "and".to_string(),
        QueryToken::Or => "or".to_string(),
        QueryToken::Not => "not".to_string(),
        QueryToken::OpenParen => "(".to_string(),
        QueryToken::CloseParen => ")".to_string(),
        QueryToken::Bool(true) => "True".to_string(),
        QueryToken::Bool(false) => "False".to_string(),
        QueryToken::Clause(index) => format!("clause #{}", index + 1),
    }
}
