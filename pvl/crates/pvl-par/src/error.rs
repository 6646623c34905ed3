//! Parsing and decoding errors.

use pvl_lex::{Dialect, LexError};
use thiserror::Error;

/// An error converting one token into a typed scalar.
///
/// Every variant surfaces the raw token text so callers can build their
/// own user-facing messages.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// A decimal integer that does not fit in 64 bits (strict dialects).
    #[error("integer {text:?} at line {line}, column {column} does not fit in 64 bits")]
    IntegerOverflow {
        text: String,
        line: u32,
        column: u32,
    },

    /// A based literal whose digits are not legal for its radix.
    #[error("{text:?} at line {line}, column {column} is not a valid base-{base} integer")]
    BasedInteger {
        text: String,
        base: u32,
        line: u32,
        column: u32,
    },

    /// A word shaped like a date/time whose fields or timezone violate
    /// the dialect's rules.
    #[error("invalid date/time {text:?} at line {line}, column {column}: {reason}")]
    DateTime {
        text: String,
        reason: String,
        line: u32,
        column: u32,
    },

    /// An unrecognized backslash escape inside a quoted string.
    #[error("invalid escape sequence `\\{escape}` in string at line {line}, column {column}")]
    Escape {
        escape: char,
        line: u32,
        column: u32,
    },

    /// An unquoted symbol that fails the ODL identifier rule.
    #[error("{text:?} at line {line}, column {column} is not a valid identifier")]
    Identifier {
        text: String,
        line: u32,
        column: u32,
    },

    /// A `<units>` expression with nothing inside it.
    #[error("quantity at line {line}, column {column} has empty units")]
    EmptyUnits { line: u32, column: u32 },

    /// A quantity factory that could not build a value from its units.
    #[error("cannot build quantity with units {units:?} at line {line}, column {column}: {reason}")]
    Quantity {
        units: String,
        reason: String,
        line: u32,
        column: u32,
    },
}

/// An error assembling the label tree from tokens.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The token stream did not match the statement grammar.
    #[error("expected {expected} but found {found} at line {line}, column {column}")]
    Unexpected {
        expected: String,
        found: String,
        line: u32,
        column: u32,
    },

    /// `name =` with nothing after it, under a dialect that forbids it.
    #[error("parameter {key:?} at line {line} has no value ({dialect} forbids empty values)")]
    MissingValue {
        key: String,
        line: u32,
        dialect: Dialect,
    },

    /// An end statement naming a different identifier than its begin.
    #[error(
        "block {name:?} opened at line {line} is closed under the name {found:?} at line {end_line}"
    )]
    MismatchedBlockName {
        name: String,
        found: String,
        line: u32,
        end_line: u32,
    },

    /// An end keyword that does not pair with the begin keyword used.
    #[error("block {name:?} opened with {begin} at line {line} is closed with {found}")]
    MismatchedBlockEnd {
        name: String,
        begin: String,
        found: String,
        line: u32,
    },

    /// A block still open at `END` or end of input.
    #[error("block {name:?} opened at line {line} is never closed")]
    UnterminatedBlock { name: String, line: u32 },
}
