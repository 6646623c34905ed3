//! Character cursor over label text.
//!
//! The cursor owns position state while the lexer walks the source. It
//! handles UTF-8 correctly and tracks 1-based line/column numbers for
//! error reporting. A snapshot can be taken and restored, which is what
//! makes the token stream restartable.

/// A cursor over source text, advancing one character at a time.
pub struct Cursor<'a> {
    source: &'a str,
    position: usize,
    line: u32,
    column: u32,
}

impl<'a> Cursor<'a> {
    /// Creates a cursor at the start of `source`.
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            position: 0,
            line: 1,
            column: 1,
        }
    }

    /// The character at the cursor, or `'\0'` at end of input.
    pub fn current_char(&self) -> char {
        self.source[self.position..].chars().next().unwrap_or('\0')
    }

    /// The character `n` characters ahead of the cursor, or `'\0'`.
    pub fn peek(&self, n: usize) -> char {
        self.source[self.position..].chars().nth(n).unwrap_or('\0')
    }

    /// Whether the rest of the input starts with `prefix`.
    pub fn starts_with(&self, prefix: &str) -> bool {
        self.source[self.position..].starts_with(prefix)
    }

    /// Advances past the current character, updating line/column.
    pub fn advance(&mut self) {
        if let Some(c) = self.source[self.position..].chars().next() {
            self.position += c.len_utf8();
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
    }

    /// Advances past `n` characters (or to the end, whichever is first).
    pub fn advance_n(&mut self, n: usize) {
        for _ in 0..n {
            if self.is_at_end() {
                break;
            }
            self.advance();
        }
    }

    /// Whether the cursor is past the last character.
    pub fn is_at_end(&self) -> bool {
        self.position >= self.source.len()
    }

    /// Current byte position.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Current line number (1-based).
    pub fn line(&self) -> u32 {
        self.line
    }

    /// Current column number (1-based).
    pub fn column(&self) -> u32 {
        self.column
    }

    /// The source slice from `start` up to the cursor.
    pub fn slice_from(&self, start: usize) -> &'a str {
        &self.source[start..self.position]
    }

    /// The full source text.
    pub fn source(&self) -> &'a str {
        self.source
    }

    /// Captures the cursor state for a later [`restore`].
    ///
    /// [`restore`]: Cursor::restore
    pub fn snapshot(&self) -> CursorSnapshot {
        CursorSnapshot {
            position: self.position,
            line: self.line,
            column: self.column,
        }
    }

    /// Rewinds the cursor to a previously captured state.
    pub fn restore(&mut self, snapshot: CursorSnapshot) {
        self.position = snapshot.position;
        self.line = snapshot.line;
        self.column = snapshot.column;
    }
}

/// A saved cursor state.
#[derive(Clone, Copy, Debug)]
pub struct CursorSnapshot {
    position: usize,
    line: u32,
    column: u32,
}
