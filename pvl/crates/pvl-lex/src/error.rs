//! Lexical errors.

use thiserror::Error;

/// An error produced while tokenizing label text.
///
/// Every variant carries the 1-based line/column of the offense and a
/// short snippet of the surrounding source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    /// A character that cannot begin or continue any token here.
    #[error(
        "unexpected character {found:?} at line {line}, column {column}, \
         expected {expected}: near {snippet:?}"
    )]
    UnexpectedChar {
        found: char,
        expected: &'static str,
        line: u32,
        column: u32,
        snippet: String,
    },

    /// A quoted string with no closing quote before end of input.
    #[error("unterminated quoted string opened at line {line}, column {column}: near {snippet:?}")]
    UnterminatedString {
        line: u32,
        column: u32,
        snippet: String,
    },

    /// A comment with no closing delimiter before end of input.
    #[error("unterminated comment opened at line {line}, column {column}: near {snippet:?}")]
    UnterminatedComment {
        line: u32,
        column: u32,
        snippet: String,
    },

    /// A `<units>` expression with no closing `>` before end of input.
    #[error(
        "unterminated units expression opened at line {line}, column {column}: near {snippet:?}"
    )]
    UnterminatedUnits {
        line: u32,
        column: u32,
        snippet: String,
    },
}

impl LexError {
    /// Line number of the offense (1-based).
    pub fn line(&self) -> u32 {
        match self {
            LexError::UnexpectedChar { line, .. }
            | LexError::UnterminatedString { line, .. }
            | LexError::UnterminatedComment { line, .. }
            | LexError::UnterminatedUnits { line, .. } => *line,
        }
    }

    /// Column number of the offense (1-based).
    pub fn column(&self) -> u32 {
        match self {
            LexError::UnexpectedChar { column, .. }
            | LexError::UnterminatedString { column, .. }
            | LexError::UnterminatedComment { column, .. }
            | LexError::UnterminatedUnits { column, .. } => *column,
        }
    }
}
