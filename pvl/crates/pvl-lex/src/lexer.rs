//! The PVL lexer.
//!
//! Transforms label text into a stream of [`Token`]s under the rules of
//! a [`Grammar`]. The stream is pulled lazily one token at a time and
//! can be rewound to a snapshot, which together make it restartable:
//! the parser stops at the first top-level `END` and the lexer never
//! touches whatever follows it.

use std::borrow::Cow;

use pvl_util::{context_snippet, Span};

use crate::cursor::{Cursor, CursorSnapshot};
use crate::error::LexError;
use crate::grammar::Grammar;
use crate::token::{Token, TokenKind};

/// Tokenizer for one source buffer under one grammar.
pub struct Lexer<'s> {
    cursor: Cursor<'s>,
    grammar: Grammar,
    /// Set between a `<` token and its closing `>`, where the input is
    /// raw units text rather than ordinary tokens.
    in_units: bool,
    finished: bool,
}

/// A saved lexer state, for rewinding the stream.
#[derive(Clone, Copy, Debug)]
pub struct LexerSnapshot {
    cursor: CursorSnapshot,
    in_units: bool,
    finished: bool,
}

impl<'s> Lexer<'s> {
    /// Creates a lexer over `source` with the given grammar.
    pub fn new(source: &'s str, grammar: Grammar) -> Self {
        Self {
            cursor: Cursor::new(source),
            grammar,
            in_units: false,
            finished: false,
        }
    }

    /// The grammar this lexer follows.
    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    /// Captures the stream position for a later [`restore`].
    ///
    /// [`restore`]: Lexer::restore
    pub fn snapshot(&self) -> LexerSnapshot {
        LexerSnapshot {
            cursor: self.cursor.snapshot(),
            in_units: self.in_units,
            finished: self.finished,
        }
    }

    /// Rewinds the stream to a previously captured position.
    pub fn restore(&mut self, snapshot: LexerSnapshot) {
        self.cursor.restore(snapshot.cursor);
        self.in_units = snapshot.in_units;
        self.finished = snapshot.finished;
    }

    /// Returns the next token, or a token of kind [`TokenKind::Eof`] at
    /// end of input.
    ///
    /// Comments are returned as tokens of kind [`TokenKind::Comment`];
    /// whitespace is skipped.
    pub fn next_token(&mut self) -> Result<Token<'s>, LexError> {
        if self.in_units {
            return self.lex_units_payload();
        }
        self.skip_whitespace();

        let start = self.cursor.position();
        let line = self.cursor.line();
        let column = self.cursor.column();

        if self.cursor.is_at_end() {
            return Ok(Token::new(
                TokenKind::Eof,
                "",
                Span::point(start, line, column),
            ));
        }

        if let Some((open, close)) = self.comment_open() {
            return self.lex_block_comment(open, close);
        }
        if let Some(marker) = self.grammar.line_comment {
            if self.cursor.current_char() == marker && self.at_line_start() {
                return Ok(self.lex_line_comment());
            }
        }

        let c = self.cursor.current_char();
        match c {
            '=' => Ok(self.punct(TokenKind::Equals)),
            ',' => Ok(self.punct(TokenKind::Comma)),
            '(' => Ok(self.punct(TokenKind::SequenceOpen)),
            ')' => Ok(self.punct(TokenKind::SequenceClose)),
            '{' => Ok(self.punct(TokenKind::SetOpen)),
            '}' => Ok(self.punct(TokenKind::SetClose)),
            '<' => {
                let token = self.punct(TokenKind::UnitsOpen);
                self.in_units = true;
                Ok(token)
            }
            '>' => Ok(self.punct(TokenKind::UnitsClose)),
            c if Some(c) == self.grammar.statement_delimiter => {
                Ok(self.punct(TokenKind::StatementEnd))
            }
            c if self.grammar.is_quote(c) => self.lex_quoted(),
            '+' if self.grammar.is_reserved('+') => {
                // Reserved outside numbers, but a sign may begin one.
                let next = self.cursor.peek(1);
                if next.is_ascii_digit() || next == '.' {
                    Ok(self.lex_word())
                } else {
                    Err(self.unexpected_char(c, "a value or parameter name"))
                }
            }
            c if self.grammar.is_reserved(c) => {
                Err(self.unexpected_char(c, "a value or parameter name"))
            }
            _ => Ok(self.lex_word()),
        }
    }

    fn skip_whitespace(&mut self) {
        while !self.cursor.is_at_end() && self.grammar.is_whitespace(self.cursor.current_char()) {
            self.cursor.advance();
        }
    }

    /// Whether only blank characters precede the cursor on its line.
    fn at_line_start(&self) -> bool {
        let before = &self.cursor.source()[..self.cursor.position()];
        before
            .chars()
            .rev()
            .take_while(|&c| c != '\n')
            .all(|c| self.grammar.is_whitespace(c))
    }

    fn comment_open(&self) -> Option<(&'static str, &'static str)> {
        self.grammar
            .comments
            .iter()
            .copied()
            .find(|(open, _)| self.cursor.starts_with(open))
    }

    fn lex_block_comment(
        &mut self,
        open: &'static str,
        close: &'static str,
    ) -> Result<Token<'s>, LexError> {
        let start = self.cursor.position();
        let line = self.cursor.line();
        let column = self.cursor.column();
        self.cursor.advance_n(open.chars().count());
        loop {
            if self.cursor.is_at_end() {
                return Err(LexError::UnterminatedComment {
                    line,
                    column,
                    snippet: context_snippet(self.cursor.source(), start),
                });
            }
            if self.cursor.starts_with(close) {
                self.cursor.advance_n(close.chars().count());
                break;
            }
            self.cursor.advance();
        }
        Ok(Token::new(
            TokenKind::Comment,
            self.cursor.slice_from(start),
            Span::new(start, self.cursor.position(), line, column),
        ))
    }

    fn lex_line_comment(&mut self) -> Token<'s> {
        let start = self.cursor.position();
        let line = self.cursor.line();
        let column = self.cursor.column();
        while !self.cursor.is_at_end() && self.cursor.current_char() != '\n' {
            self.cursor.advance();
        }
        Token::new(
            TokenKind::Comment,
            self.cursor.slice_from(start),
            Span::new(start, self.cursor.position(), line, column),
        )
    }

    fn punct(&mut self, kind: TokenKind) -> Token<'s> {
        let start = self.cursor.position();
        let line = self.cursor.line();
        let column = self.cursor.column();
        self.cursor.advance();
        Token::new(
            kind,
            self.cursor.slice_from(start),
            Span::new(start, self.cursor.position(), line, column),
        )
    }

    fn lex_quoted(&mut self) -> Result<Token<'s>, LexError> {
        let start = self.cursor.position();
        let line = self.cursor.line();
        let column = self.cursor.column();
        let quote = self.cursor.current_char();
        self.cursor.advance();

        // Dash-continuation elision rewrites the lexeme; everything else
        // borrows. `rewritten` holds the already-elided prefix and
        // `segment_start` the beginning of the still-borrowed tail.
        let mut rewritten: Option<String> = None;
        let mut segment_start = start;

        loop {
            if self.cursor.is_at_end() {
                return Err(LexError::UnterminatedString {
                    line,
                    column,
                    snippet: context_snippet(self.cursor.source(), start),
                });
            }
            let c = self.cursor.current_char();
            if c == quote {
                if self.grammar.doubled_quote_escape && self.cursor.peek(1) == quote {
                    self.cursor.advance();
                    self.cursor.advance();
                    continue;
                }
                self.cursor.advance();
                break;
            }
            if c == '\\' && self.grammar.backslash_escape {
                self.cursor.advance();
                if !self.cursor.is_at_end() {
                    self.cursor.advance();
                }
                continue;
            }
            if c == '-' && self.grammar.dash_continuation && self.continuation_ahead() {
                let buffer = rewritten.get_or_insert_with(String::new);
                buffer.push_str(&self.cursor.source()[segment_start..self.cursor.position()]);
                self.skip_continuation();
                segment_start = self.cursor.position();
                continue;
            }
            self.cursor.advance();
        }

        let end = self.cursor.position();
        let text: Cow<'s, str> = match rewritten {
            Some(mut buffer) => {
                buffer.push_str(&self.cursor.source()[segment_start..end]);
                Cow::Owned(buffer)
            }
            None => Cow::Borrowed(&self.cursor.source()[start..end]),
        };
        Ok(Token::new(
            TokenKind::QuotedString,
            text,
            Span::new(start, end, line, column),
        ))
    }

    fn lex_word(&mut self) -> Token<'s> {
        let start = self.cursor.position();
        let line = self.cursor.line();
        let column = self.cursor.column();

        // The first character always belongs to the word; the caller
        // vetted it. A sign is only word-legal in this position.
        let first = self.cursor.current_char();
        let mut has_digit = first.is_ascii_digit();
        let mut radix_ok = has_digit || first == '+' || first == '-';
        self.cursor.advance();

        let mut rewritten: Option<String> = None;
        let mut segment_start = start;
        // 0 = no `#` yet, 1 = inside based-integer digits, 2 = closed.
        let mut hashes = 0u8;

        loop {
            if self.cursor.is_at_end() {
                break;
            }
            let c = self.cursor.current_char();
            if self.grammar.is_whitespace(c) {
                break;
            }
            if self.comment_open().is_some() {
                break;
            }
            if c == '#' {
                // `#` continues the word only as a based-integer marker:
                // after a pure digit run (the radix) or to close the
                // digit section it opened.
                if hashes == 0 && radix_ok && has_digit {
                    hashes = 1;
                    self.cursor.advance();
                    continue;
                }
                if hashes == 1 {
                    hashes = 2;
                    self.cursor.advance();
                    continue;
                }
                break;
            }
            if c == '-' && self.grammar.dash_continuation && self.continuation_ahead() {
                let buffer = rewritten.get_or_insert_with(String::new);
                buffer.push_str(&self.cursor.source()[segment_start..self.cursor.position()]);
                self.skip_continuation();
                segment_start = self.cursor.position();
                continue;
            }
            if self.grammar.is_reserved(c) {
                break;
            }
            if c.is_ascii_digit() {
                has_digit = true;
            } else {
                radix_ok = false;
            }
            self.cursor.advance();
        }

        let end = self.cursor.position();
        let text: Cow<'s, str> = match rewritten {
            Some(mut buffer) => {
                buffer.push_str(&self.cursor.source()[segment_start..end]);
                Cow::Owned(buffer)
            }
            None => Cow::Borrowed(&self.cursor.source()[start..end]),
        };
        Token::new(TokenKind::Word, text, Span::new(start, end, line, column))
    }

    /// Inside `<`...`>`: everything up to the closing `>` is one raw
    /// units token.
    fn lex_units_payload(&mut self) -> Result<Token<'s>, LexError> {
        self.skip_whitespace();
        let start = self.cursor.position();
        let line = self.cursor.line();
        let column = self.cursor.column();

        while !self.cursor.is_at_end() && self.cursor.current_char() != '>' {
            self.cursor.advance();
        }
        if self.cursor.is_at_end() {
            return Err(LexError::UnterminatedUnits {
                line,
                column,
                snippet: context_snippet(self.cursor.source(), start),
            });
        }
        self.in_units = false;
        let text = self.cursor.slice_from(start).trim_end();
        Ok(Token::new(
            TokenKind::Units,
            text,
            Span::new(start, start + text.len(), line, column),
        ))
    }

    /// Whether the `-` under the cursor is a line continuation: only
    /// blanks remain between it and the next newline.
    fn continuation_ahead(&self) -> bool {
        let rest = &self.cursor.source()[self.cursor.position() + 1..];
        for c in rest.chars() {
            match c {
                ' ' | '\t' | '\r' => continue,
                '\n' => return true,
                _ => return false,
            }
        }
        false
    }

    /// Consumes a continuation: the dash, the line tail, the newline,
    /// and the leading blanks of the next line.
    fn skip_continuation(&mut self) {
        self.cursor.advance();
        while matches!(self.cursor.current_char(), ' ' | '\t' | '\r') {
            self.cursor.advance();
        }
        if self.cursor.current_char() == '\n' {
            self.cursor.advance();
        }
        while matches!(self.cursor.current_char(), ' ' | '\t') {
            self.cursor.advance();
        }
    }

    fn unexpected_char(&self, found: char, expected: &'static str) -> LexError {
        LexError::UnexpectedChar {
            found,
            expected,
            line: self.cursor.line(),
            column: self.cursor.column(),
            snippet: context_snippet(self.cursor.source(), self.cursor.position()),
        }
    }
}

impl<'s> Iterator for Lexer<'s> {
    type Item = Result<Token<'s>, LexError>;

    /// Yields tokens through the terminating [`TokenKind::Eof`] token,
    /// then `None`. An error also ends the stream.
    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.next_token() {
            Ok(token) => {
                if token.is_eof() {
                    self.finished = true;
                }
                Some(Ok(token))
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}
