//! Lexical tokens.

use std::borrow::Cow;

use pvl_util::Span;

/// What a token is, structurally.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    /// An unquoted run of characters: identifiers, numbers, dates,
    /// keywords. The decoder tells these apart.
    Word,
    /// A quoted string, quotes included in the text.
    QuotedString,
    /// A comment, delimiters included.
    Comment,
    /// The units payload between `<` and `>`.
    Units,
    /// `=`
    Equals,
    /// `,`
    Comma,
    /// `(`
    SequenceOpen,
    /// `)`
    SequenceClose,
    /// `{`
    SetOpen,
    /// `}`
    SetClose,
    /// `<`
    UnitsOpen,
    /// `>`
    UnitsClose,
    /// The dialect's statement-end delimiter.
    StatementEnd,
    /// End of input.
    Eof,
}

impl TokenKind {
    /// A short human-readable name for error messages.
    pub fn describe(self) -> &'static str {
        match self {
            TokenKind::Word => "a word",
            TokenKind::QuotedString => "a quoted string",
            TokenKind::Comment => "a comment",
            TokenKind::Units => "a units expression",
            TokenKind::Equals => "`=`",
            TokenKind::Comma => "`,`",
            TokenKind::SequenceOpen => "`(`",
            TokenKind::SequenceClose => "`)`",
            TokenKind::SetOpen => "`{`",
            TokenKind::SetClose => "`}`",
            TokenKind::UnitsOpen => "`<`",
            TokenKind::UnitsClose => "`>`",
            TokenKind::StatementEnd => "a statement delimiter",
            TokenKind::Eof => "end of input",
        }
    }
}

/// One token: kind, source text, and location.
///
/// The text borrows from the source wherever possible; it is owned only
/// when dash-continuation elision had to rewrite the lexeme.
#[derive(Clone, Debug, PartialEq)]
pub struct Token<'s> {
    pub kind: TokenKind,
    pub text: Cow<'s, str>,
    pub span: Span,
}

impl<'s> Token<'s> {
    /// Creates a token.
    pub fn new(kind: TokenKind, text: impl Into<Cow<'s, str>>, span: Span) -> Self {
        Self {
            kind,
            text: text.into(),
            span,
        }
    }

    /// Case-insensitive comparison against a keyword, for words only.
    pub fn word_eq(&self, keyword: &str) -> bool {
        self.kind == TokenKind::Word && self.text.eq_ignore_ascii_case(keyword)
    }

    /// Whether this is the end-of-input token.
    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }
}
