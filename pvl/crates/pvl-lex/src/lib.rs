//! pvl-lex - lexical analysis for PVL label text.
//!
//! This crate turns label text into a stream of [`Token`]s under the
//! rules of a dialect [`Grammar`]. Four concrete dialects are modeled
//! (PVL per CCSDS 641.0-B-2, ODL per PDS3 chapter 12, the PDS3 label
//! standard, and ISIS cube labels) plus the permissive Omni superset
//! that accepts anything the others do.
//!
//! The stream is lazy and restartable: callers pull one token at a
//! time, which is what lets the parser stop at the first top-level
//! `END` and never touch trailing non-text bytes.

pub mod cursor;
pub mod error;
pub mod grammar;
pub mod lexer;
pub mod patterns;
pub mod token;

pub use cursor::Cursor;
pub use error::LexError;
pub use grammar::{Dialect, Grammar};
pub use lexer::Lexer;
pub use token::{Token, TokenKind};
