//! Dialect grammars.
//!
//! A [`Grammar`] is an immutable table of the lexical rules of one PVL
//! dialect: which characters separate tokens, which sequences open
//! comments, which keyword pairs open and close aggregation blocks, and
//! which words name booleans. The four concrete dialects plus the
//! permissive Omni superset are built by the associated constructors;
//! nothing in a grammar is mutated after construction, so grammars are
//! `Copy` and freely shareable.

use std::fmt;

/// The dialect family understood by this crate.
///
/// The first four are real standards (or de-facto ones); `Omni` is a
/// parse-only superset that accepts any text the others accept.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// CCSDS 641.0-B-2 Parameter Value Language.
    Pvl,
    /// Object Description Language, PDS3 standard chapter 12.
    Odl,
    /// The PDS3 label standard (stricter ODL).
    Pds3,
    /// ISIS cube labels.
    Isis,
    /// Permissive superset used for reading real-world labels.
    Omni,
}

impl Dialect {
    /// The strict dialects, in the order tools report them.
    pub const STRICT: [Dialect; 4] = [Dialect::Pvl, Dialect::Odl, Dialect::Pds3, Dialect::Isis];

    /// The grammar for this dialect.
    pub fn grammar(self) -> Grammar {
        match self {
            Dialect::Pvl => Grammar::pvl(),
            Dialect::Odl => Grammar::odl(),
            Dialect::Pds3 => Grammar::pds3(),
            Dialect::Isis => Grammar::isis(),
            Dialect::Omni => Grammar::omni(),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Dialect::Pvl => "PVL",
            Dialect::Odl => "ODL",
            Dialect::Pds3 => "PDS3",
            Dialect::Isis => "ISIS",
            Dialect::Omni => "Omni",
        };
        f.write_str(name)
    }
}

const WHITESPACE: &[char] = &[' ', '\t', '\n', '\r', '\x0b', '\x0c'];

// NUL counts as whitespace in Omni so that producers that (mis)use NUL
// as a delimiter still parse.
const OMNI_WHITESPACE: &[char] = &[' ', '\t', '\n', '\r', '\x0b', '\x0c', '\0'];

// U+FFFD is reserved everywhere: the byte-wise ASCII fallback in the
// loader substitutes it for non-text bytes, and it must never extend a
// token.
const RESERVED: &[char] = &[
    '&', '<', '>', '\'', '{', '}', ',', '[', ']', '=', '!', '#', '(', ')', '%', '+', '"', ';',
    '~', '|', '\u{fffd}',
];

const ISIS_RESERVED: &[char] = &[
    '&', '<', '>', '\'', '{', '}', ',', '[', ']', '=', '!', '#', '(', ')', '%', '"', ';', '~',
    '|', '\u{fffd}',
];

const OMNI_RESERVED: &[char] = &[
    '&', '<', '>', '\'', '{', '}', ',', '[', ']', '=', '!', '#', '(', ')', '%', '"', ';', '~',
    '|', '\0', '\u{fffd}',
];

const COMMENTS: &[(&str, &str)] = &[("/*", "*/")];

const QUOTES: &[char] = &['"', '\''];

const AGGREGATION_PVL: &[(&str, &str)] = &[
    ("BEGIN_OBJECT", "END_OBJECT"),
    ("OBJECT", "END_OBJECT"),
    ("BEGIN_GROUP", "END_GROUP"),
    ("GROUP", "END_GROUP"),
];

const AGGREGATION_ODL: &[(&str, &str)] = &[("OBJECT", "END_OBJECT"), ("GROUP", "END_GROUP")];

const TRUE_WORDS: &[&str] = &["TRUE", "YES"];
const FALSE_WORDS: &[&str] = &["FALSE", "NO"];
const NULL_WORDS: &[&str] = &["NULL"];
const NO_WORDS: &[&str] = &[];

/// Lexical and decoding rules for one dialect.
///
/// The fields are descriptor tables, not behavior: the lexer, decoder,
/// and parser consult them. All keyword comparison is case-insensitive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Grammar {
    /// Which dialect these rules describe.
    pub dialect: Dialect,
    /// Characters skipped between tokens.
    pub whitespace: &'static [char],
    /// Characters that terminate an unquoted token.
    pub reserved: &'static [char],
    /// Comment open/close delimiter pairs, in match order.
    pub comments: &'static [(&'static str, &'static str)],
    /// Character opening a to-end-of-line comment at line start.
    pub line_comment: Option<char>,
    /// Allowed string quote characters.
    pub quotes: &'static [char],
    /// Statement-end delimiter, where the dialect has one.
    pub statement_delimiter: Option<char>,
    /// Aggregation begin keyword paired with its required end keyword.
    pub aggregation_keywords: &'static [(&'static str, &'static str)],
    /// The label-terminating keyword.
    pub end_keyword: &'static str,
    /// Words decoding to boolean true.
    pub true_words: &'static [&'static str],
    /// Words decoding to boolean false.
    pub false_words: &'static [&'static str],
    /// Words decoding to the null value.
    pub null_words: &'static [&'static str],
    /// Attach UTC to date-times written without a timezone.
    pub assume_utc: bool,
    /// Reject date-times carrying a non-UTC offset.
    pub require_utc: bool,
    /// Accept 60 in the seconds field (leap second).
    pub allow_leap_second: bool,
    /// Accept `name =` with no value (Empty-at-line sentinel).
    pub allow_empty_value: bool,
    /// Elide `-` line continuations (ISIS style).
    pub dash_continuation: bool,
    /// A doubled quote character escapes itself inside strings.
    pub doubled_quote_escape: bool,
    /// Backslash escapes are recognized inside strings.
    pub backslash_escape: bool,
    /// Unquoted symbols and parameter names must satisfy the ODL
    /// identifier rule.
    pub validate_identifiers: bool,
}

impl Grammar {
    /// The permissive base PVL grammar (CCSDS 641.0-B-2).
    pub const fn pvl() -> Grammar {
        Grammar {
            dialect: Dialect::Pvl,
            whitespace: WHITESPACE,
            reserved: RESERVED,
            comments: COMMENTS,
            line_comment: None,
            quotes: QUOTES,
            statement_delimiter: Some(';'),
            aggregation_keywords: AGGREGATION_PVL,
            end_keyword: "END",
            true_words: TRUE_WORDS,
            false_words: FALSE_WORDS,
            null_words: NULL_WORDS,
            assume_utc: false,
            require_utc: false,
            allow_leap_second: true,
            allow_empty_value: false,
            dash_continuation: false,
            doubled_quote_escape: true,
            backslash_escape: false,
            validate_identifiers: false,
        }
    }

    /// The stricter ODL grammar (PDS3 chapter 12).
    pub const fn odl() -> Grammar {
        Grammar {
            dialect: Dialect::Odl,
            whitespace: WHITESPACE,
            reserved: RESERVED,
            comments: COMMENTS,
            line_comment: None,
            quotes: QUOTES,
            statement_delimiter: None,
            aggregation_keywords: AGGREGATION_ODL,
            end_keyword: "END",
            true_words: NO_WORDS,
            false_words: NO_WORDS,
            null_words: NO_WORDS,
            assume_utc: false,
            require_utc: false,
            allow_leap_second: false,
            allow_empty_value: false,
            dash_continuation: false,
            doubled_quote_escape: false,
            backslash_escape: true,
            validate_identifiers: true,
        }
    }

    /// The PDS3 label standard grammar (stricter ODL).
    pub const fn pds3() -> Grammar {
        Grammar {
            dialect: Dialect::Pds3,
            whitespace: WHITESPACE,
            reserved: RESERVED,
            comments: COMMENTS,
            line_comment: None,
            quotes: QUOTES,
            statement_delimiter: None,
            aggregation_keywords: AGGREGATION_ODL,
            end_keyword: "END",
            true_words: NO_WORDS,
            false_words: NO_WORDS,
            null_words: NO_WORDS,
            assume_utc: true,
            require_utc: true,
            allow_leap_second: false,
            allow_empty_value: false,
            dash_continuation: false,
            doubled_quote_escape: false,
            backslash_escape: true,
            validate_identifiers: true,
        }
    }

    /// The de-facto ISIS cube-label grammar.
    pub const fn isis() -> Grammar {
        Grammar {
            dialect: Dialect::Isis,
            whitespace: WHITESPACE,
            reserved: ISIS_RESERVED,
            comments: COMMENTS,
            line_comment: Some('#'),
            quotes: QUOTES,
            statement_delimiter: None,
            aggregation_keywords: AGGREGATION_ODL,
            end_keyword: "END",
            true_words: TRUE_WORDS,
            false_words: FALSE_WORDS,
            null_words: NULL_WORDS,
            assume_utc: false,
            require_utc: false,
            allow_leap_second: true,
            allow_empty_value: false,
            dash_continuation: true,
            doubled_quote_escape: false,
            backslash_escape: true,
            validate_identifiers: false,
        }
    }

    /// The Omni superset grammar, which parses anything the others do.
    pub const fn omni() -> Grammar {
        Grammar {
            dialect: Dialect::Omni,
            whitespace: OMNI_WHITESPACE,
            reserved: OMNI_RESERVED,
            comments: COMMENTS,
            line_comment: Some('#'),
            quotes: QUOTES,
            statement_delimiter: Some(';'),
            aggregation_keywords: AGGREGATION_PVL,
            end_keyword: "END",
            true_words: TRUE_WORDS,
            false_words: FALSE_WORDS,
            null_words: NULL_WORDS,
            assume_utc: false,
            require_utc: false,
            allow_leap_second: true,
            allow_empty_value: true,
            dash_continuation: true,
            doubled_quote_escape: true,
            backslash_escape: true,
            validate_identifiers: false,
        }
    }

    /// Whether `c` separates tokens.
    pub fn is_whitespace(&self, c: char) -> bool {
        self.whitespace.contains(&c)
    }

    /// Whether `c` may not appear inside an unquoted token.
    pub fn is_reserved(&self, c: char) -> bool {
        self.reserved.contains(&c)
    }

    /// Whether `c` opens a quoted string.
    pub fn is_quote(&self, c: char) -> bool {
        self.quotes.contains(&c)
    }

    /// Whether `word` is the label-terminating keyword.
    pub fn is_end_keyword(&self, word: &str) -> bool {
        self.end_keyword.eq_ignore_ascii_case(word)
    }

    /// The end keyword required for an aggregation opened with `begin`.
    pub fn block_end_for(&self, begin: &str) -> Option<&'static str> {
        self.aggregation_keywords
            .iter()
            .find(|(b, _)| b.eq_ignore_ascii_case(begin))
            .map(|&(_, e)| e)
    }

    /// Whether `word` opens an aggregation block.
    pub fn is_begin_keyword(&self, word: &str) -> bool {
        self.block_end_for(word).is_some()
    }

    /// Whether `word` closes an aggregation block.
    pub fn is_end_block_keyword(&self, word: &str) -> bool {
        self.aggregation_keywords
            .iter()
            .any(|(_, e)| e.eq_ignore_ascii_case(word))
    }

    /// Whether `word` has structural meaning and cannot be a plain value.
    pub fn is_reserved_keyword(&self, word: &str) -> bool {
        self.is_end_keyword(word)
            || self.is_begin_keyword(word)
            || self.is_end_block_keyword(word)
    }

    /// Whether `word` is a boolean true word.
    pub fn is_true_word(&self, word: &str) -> bool {
        self.true_words.iter().any(|w| w.eq_ignore_ascii_case(word))
    }

    /// Whether `word` is a boolean false word.
    pub fn is_false_word(&self, word: &str) -> bool {
        self.false_words.iter().any(|w| w.eq_ignore_ascii_case(word))
    }

    /// Whether `word` is a null word.
    pub fn is_null_word(&self, word: &str) -> bool {
        self.null_words.iter().any(|w| w.eq_ignore_ascii_case(word))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dialect_display() {
        assert_eq!(Dialect::Pds3.to_string(), "PDS3");
        assert_eq!(Dialect::Omni.to_string(), "Omni");
    }

    #[test]
    fn test_aggregation_lookup_is_case_insensitive() {
        let g = Grammar::isis();
        assert_eq!(g.block_end_for("Object"), Some("END_OBJECT"));
        assert_eq!(g.block_end_for("group"), Some("END_GROUP"));
        assert_eq!(g.block_end_for("BEGIN_OBJECT"), None);
    }

    #[test]
    fn test_pvl_accepts_both_begin_forms() {
        let g = Grammar::pvl();
        assert_eq!(g.block_end_for("BEGIN_OBJECT"), Some("END_OBJECT"));
        assert_eq!(g.block_end_for("OBJECT"), Some("END_OBJECT"));
    }

    #[test]
    fn test_plus_reserved_except_isis_and_omni() {
        assert!(Grammar::pvl().is_reserved('+'));
        assert!(Grammar::pds3().is_reserved('+'));
        assert!(!Grammar::isis().is_reserved('+'));
        assert!(!Grammar::omni().is_reserved('+'));
    }

    #[test]
    fn test_omni_treats_nul_as_whitespace() {
        assert!(Grammar::omni().is_whitespace('\0'));
        assert!(!Grammar::pvl().is_whitespace('\0'));
    }

    #[test]
    fn test_reserved_keywords() {
        let g = Grammar::omni();
        assert!(g.is_reserved_keyword("end"));
        assert!(g.is_reserved_keyword("End_Group"));
        assert!(g.is_reserved_keyword("BEGIN_OBJECT"));
        assert!(!g.is_reserved_keyword("ENDIANNESS"));
    }
}
