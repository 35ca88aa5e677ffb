//! Lexer (tokenizer) for filter queries.
//!
//! A query mixes boolean connectives with embedded clauses. The lexer turns
//! every clause into a single [`QueryToken::Clause`] token, compiling the
//! clause as it goes, so the parser only ever sees the boolean skeleton.

use crate::record::Schema;

use super::clause::{read_word, scan_clause, Clause, RawClause};
use super::error::{FilterError, FilterResult};

/// A token with its position in the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionedToken {
    /// The token.
    pub token: QueryToken,
    /// The byte position where the token starts (0-indexed).
    pub position: usize,
}

/// A token in a filter query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryToken {
    /// The `and` connective.
    And,

    /// The `or` connective.
    Or,

    /// The `not` connective.
    Not,

    /// Opening parenthesis `(`.
    OpenParen,

    /// Closing parenthesis `)`.
    CloseParen,

    /// A `True` or `False` literal.
    Bool(bool),

    /// A clause, by index into [`LexerOutput::clauses`].
    Clause(usize),
}

/// Tokens of a query plus the clauses they refer to.
#[derive(Debug)]
pub struct LexerOutput {
    /// The tokens, in input order.
    pub tokens: Vec<PositionedToken>,
    /// Compiled clauses, in order of occurrence.
    pub clauses: Vec<Clause>,
}

/// Lexer for tokenizing filter queries against a schema.
pub struct Lexer<'a> {
    input: &'a str,
    /// `None` skips field name checks.
    schema: Option<&'a Schema>,
    /// Current byte position in the input string.
    position: usize,
    clauses: Vec<Clause>,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given query and schema.
    pub fn new(input: &'a str, schema: &'a Schema) -> Self {
        Self {
            input,
            schema: Some(schema),
            position: 0,
            clauses: Vec::new(),
        }
    }

    /// Creates a lexer that accepts any field name.
    ///
    /// Operators and literals are still compiled, so only the schema check
    /// is skipped.
    pub fn without_schema(input: &'a str) -> Self {
        Self {
            input,
            schema: None,
            position: 0,
            clauses: Vec::new(),
        }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.position..]
    }

    /// Skips whitespace characters.
    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        self.position += rest.len() - rest.trim_start().len();
    }

    fn token(&mut self, token: QueryToken, start: usize, len: usize) -> PositionedToken {
        self.position = start + len;
        PositionedToken {
            token,
            position: start,
        }
    }

    /// Returns the next token with its position, or None at end of input.
    pub fn next_token(&mut self) -> Option<FilterResult<PositionedToken>> {
        self.skip_whitespace();

        let rest = self.rest();
        let c = rest.chars().next()?;
        let start = self.position;

        match c {
            '(' => Some(Ok(self.token(QueryToken::OpenParen, start, 1))),
            ')' => Some(Ok(self.token(QueryToken::CloseParen, start, 1))),
            '"' | '\'' => Some(Err(FilterError::malformed_clause(
                rest,
                "literal without a field and operator",
            ))),
            _ => {
                if let Some(found) = scan_clause(rest) {
                    return Some(self.read_clause(found, start));
                }

                let (word, _) = read_word(rest);
                let token = match word.to_ascii_lowercase().as_str() {
                    "and" => QueryToken::And,
                    "or" => QueryToken::Or,
                    "not" => QueryToken::Not,
                    "true" => QueryToken::Bool(true),
                    "false" => QueryToken::Bool(false),
                    _ => {
                        return Some(Err(FilterError::malformed_clause(
                            word,
                            "expected and/or/not or <field> [not] <operator> \"<literal>\"",
                        )))
                    }
                };
                Some(Ok(self.token(token, start, word.len())))
            }
        }
    }

    fn read_clause(
        &mut self,
        found: FilterResult<RawClause<'a>>,
        start: usize,
    ) -> FilterResult<PositionedToken> {
        let raw = found?;
        let clause = raw.resolve(self.schema)?;
        let index = self.clauses.len();
        self.clauses.push(clause);
        Ok(self.token(QueryToken::Clause(index), start, raw.len))
    }

    /// Collects all tokens and the clauses they reference.
    ///
    /// # Errors
    ///
    /// Fails on the first clause that cannot be located, resolved or compiled,
    /// and on any word that is neither a connective nor a clause.
    pub fn tokenize(mut self) -> FilterResult<LexerOutput> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token() {
            tokens.push(token?);
        }
        Ok(LexerOutput {
            tokens,
            clauses: self.clauses,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> Schema {
        Schema::new(vec!["a".into(), "b".into(), "c".into()])
    }

    fn tokens(input: &str) -> Vec<QueryToken> {
        Lexer::new(input, &schema())
            .tokenize()
            .unwrap()
            .tokens
            .into_iter()
            .map(|pt| pt.token)
            .collect()
    }

    #[test]
    fn test_tokenize_single_clause() {
        assert_eq!(tokens(r#"a == "1""#), vec![QueryToken::Clause(0)]);
    }

    #[test]
    fn test_tokenize_connectives() {
        assert_eq!(
            tokens(r#"(a contains "x" or b == "y") and not (c regex "z")"#),
            vec![
                QueryToken::OpenParen,
                QueryToken::Clause(0),
                QueryToken::Or,
                QueryToken::Clause(1),
                QueryToken::CloseParen,
                QueryToken::And,
                QueryToken::Not,
                QueryToken::OpenParen,
                QueryToken::Clause(2),
                QueryToken::CloseParen,
            ]
        );
    }

    #[test]
    fn test_tokenize_connectives_case_insensitive() {
        assert_eq!(
            tokens(r#"NOT a == "1" AND True Or FALSE"#),
            vec![
                QueryToken::Not,
                QueryToken::Clause(0),
                QueryToken::And,
                QueryToken::Bool(true),
                QueryToken::Or,
                QueryToken::Bool(false),
            ]
        );
    }

    #[test]
    fn test_tokenize_parens_hug_clauses() {
        assert_eq!(
            tokens(r#"(a == "1")"#),
            vec![
                QueryToken::OpenParen,
                QueryToken::Clause(0),
                QueryToken::CloseParen
            ]
        );
    }

    #[test]
    fn test_connective_words_inside_literals_are_not_tokens() {
        let schema = schema();
        let output = Lexer::new(r#"a contains "x and (y or not z)""#, &schema)
            .tokenize()
            .unwrap();
        assert_eq!(output.tokens.len(), 1);
        assert_eq!(output.clauses[0].literal(), "x and (y or not z)");
    }

    #[test]
    fn test_token_positions() {
        let schema = schema();
        let output = Lexer::new(r#"not  a == "1""#, &schema).tokenize().unwrap();
        assert_eq!(output.tokens[0].position, 0);
        assert_eq!(output.tokens[1].position, 5);
    }

    #[test]
    fn test_clauses_in_occurrence_order() {
        let schema = schema();
        let output = Lexer::new(r#"b == "2" or a not == "1""#, &schema)
            .tokenize()
            .unwrap();
        assert_eq!(output.clauses.len(), 2);
        assert_eq!(output.clauses[0].literal(), "2");
        assert_eq!(output.clauses[1].literal(), "1");
        assert!(output.clauses[1].is_negated());
    }

    #[test]
    fn test_bare_word_is_malformed() {
        let err = Lexer::new("a", &schema()).tokenize().unwrap_err();
        assert!(matches!(err, FilterError::MalformedClause { ref text, .. } if text == "a"));
    }

    #[test]
    fn test_stray_literal_is_malformed() {
        let err = Lexer::new(r#"a == "1" and "2""#, &schema())
            .tokenize()
            .unwrap_err();
        assert!(matches!(err, FilterError::MalformedClause { .. }));
    }

    #[test]
    fn test_unknown_field_is_reported() {
        let err = Lexer::new(r#"z == "1""#, &schema()).tokenize().unwrap_err();
        assert!(matches!(err, FilterError::UnknownField { ref field, .. } if field == "z"));
    }

    #[test]
    fn test_without_schema_accepts_any_field() {
        let output = Lexer::without_schema(r#"z == "1" or y not contains "2""#)
            .tokenize()
            .unwrap();
        assert_eq!(output.clauses.len(), 2);
        assert!(output.clauses[1].is_negated());

        let err = Lexer::without_schema(r#"z startswith "1""#)
            .tokenize()
            .unwrap_err();
        assert!(matches!(err, FilterError::UnknownOperator { .. }));
    }

    #[test]
    fn test_empty_input_has_no_tokens() {
        let schema = schema();
        let output = Lexer::new("   ", &schema).tokenize().unwrap();
        assert!(output.tokens.is_empty());
        assert!(output.clauses.is_empty());
    }
}
