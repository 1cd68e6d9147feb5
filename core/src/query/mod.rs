//! Query lines: classification, lexing, shunting-yard parsing, and
//! boolean evaluation over skip lists.

pub mod boolean;
pub mod lexer;
pub mod parser;

use crate::error::QueryError;
use crate::tokenizer::Normalizer;
use crate::Position;

pub use boolean::BooleanProcessor;
pub use lexer::lex;
pub use parser::to_postfix;

pub const AND: &str = "AND";
pub const OR: &str = "OR";
pub const NOT: &str = "NOT";

/// A lexed query token. Parenthesis variants never appear in postfix output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Term(String),
    /// Normalized words with their offsets from the first word.
    Phrase(Vec<(String, Position)>),
    /// An operand with no indexable terms, such as a lone stopword. Matches nothing.
    Empty,
    And,
    Or,
    Not,
    Open,
    Close,
}

impl Token {
    pub fn is_value(&self) -> bool {
        matches!(self, Token::Term(_) | Token::Phrase(_) | Token::Empty)
    }

    pub fn precedence(&self) -> u8 {
        match self {
            Token::Not => 3,
            Token::And => 2,
            Token::Or => 1,
            _ => 0,
        }
    }
}

/// How query lines are interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QueryMode {
    /// Boolean when the line uses operators, parentheses or quotes; ranked otherwise.
    #[default]
    Auto,
    Boolean,
    Ranked,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EvaluationStrategy {
    /// Strict left-to-right postfix evaluation with plain merges.
    Naive,
    /// Selectivity-ordered AND runs, NOT-run cancellation, skip-pointer merges.
    #[default]
    Optimized,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    /// Postfix tokens.
    Boolean(Vec<Token>),
    /// Normalized free-text terms, duplicates kept.
    Ranked(Vec<String>),
}

/// True when a raw line uses boolean or phrasal syntax.
pub fn has_boolean_syntax(line: &str) -> bool {
    line.contains(['(', ')', '"'])
        || line.split_whitespace().any(|w| matches!(w, AND | OR | NOT))
}

pub fn parse_query(
    line: &str,
    mode: QueryMode,
    normalizer: &Normalizer,
) -> Result<Query, QueryError> {
    let boolean = match mode {
        QueryMode::Boolean => true,
        QueryMode::Ranked => false,
        QueryMode::Auto => has_boolean_syntax(line),
    };
    if boolean {
        let infix = lex(line, normalizer)?;
        Ok(Query::Boolean(to_postfix(&infix)?))
    } else {
        Ok(Query::Ranked(normalizer.terms(line)))
    }
}
