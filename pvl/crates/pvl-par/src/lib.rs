//! pvl-par - parsing PVL label text into a label tree.
//!
//! The [`Parser`] consumes the lazy token stream of `pvl-lex`, converts
//! value tokens through the [`Decoder`], and assembles an
//! order-preserving [`Module`] tree. It implements this statement
//! grammar:
//!
//! ```text
//! module       := statement* end_stmt?
//! statement    := assignment | begin_block | end_block
//! assignment   := identifier '=' value terminator?
//! begin_block  := BEGIN_KW ('=')? identifier terminator?
//! end_block    := END_KW   ('=')? identifier? terminator?
//! value        := scalar | sequence | set | quantity | empty
//! ```
//!
//! Recovery is dialect-driven: under Omni a missing value becomes an
//! [`Value::Empty`] sentinel, while the strict dialects fail fast. Once
//! the top-level `END` statement is consumed the parser never requests
//! another token, so labels followed by raw binary data parse cleanly.

use std::collections::VecDeque;
use std::sync::Arc;

use pvl_lex::{Grammar, Lexer, Token, TokenKind};
use pvl_util::Span;

pub mod ast;
pub mod decoder;
pub mod error;

pub use ast::{BasedInteger, Block, BlockKind, Module, PvlDateTime, PvlTime, Quantity, Value};
pub use decoder::{Decoder, RealParts};
pub use error::{DecodeError, ParseError};

use pvl_lex::patterns;

/// Builds the value for every `value <units>` construct.
///
/// The default factory produces [`Value::Quantity`]; supplying a custom
/// factory lets callers substitute richer unit-aware types without this
/// crate depending on any particular units library.
pub trait QuantityFactory {
    /// Combines a decoded value with its units text.
    fn quantity(&self, value: Value, units: &str, span: Span) -> Result<Value, DecodeError>;
}

/// The factory used when none is supplied.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultQuantityFactory;

impl QuantityFactory for DefaultQuantityFactory {
    fn quantity(&self, value: Value, units: &str, _span: Span) -> Result<Value, DecodeError> {
        Ok(Value::quantity(value, units))
    }
}

/// Recursive-descent parser over one source buffer.
pub struct Parser<'s> {
    lexer: Lexer<'s>,
    grammar: Grammar,
    decoder: Decoder,
    quantity_factory: Arc<dyn QuantityFactory>,
    lookahead: VecDeque<Token<'s>>,
}

impl<'s> Parser<'s> {
    /// Creates a parser for `source` under the given grammar.
    pub fn new(source: &'s str, grammar: Grammar) -> Self {
        Self {
            lexer: Lexer::new(source, grammar),
            grammar,
            decoder: Decoder::new(grammar),
            quantity_factory: Arc::new(DefaultQuantityFactory),
            lookahead: VecDeque::new(),
        }
    }

    /// Replaces the quantity factory.
    pub fn with_quantity_factory(mut self, factory: Arc<dyn QuantityFactory>) -> Self {
        self.quantity_factory = factory;
        self
    }

    /// The grammar this parser follows.
    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    /// Parses the label into a module.
    ///
    /// Statements are appended in source order, duplicate parameter
    /// names included. Parsing stops at the first top-level `END`
    /// statement (or end of input); nothing past it is read.
    pub fn parse(&mut self) -> Result<Module, ParseError> {
        let grammar = self.grammar;
        let mut module = Module::new();
        loop {
            let (kind, is_end_label, is_end_block, found, line, column) = {
                let token = self.peek(0)?;
                (
                    token.kind,
                    token.kind == TokenKind::Word && grammar.is_end_keyword(&token.text),
                    token.kind == TokenKind::Word && grammar.is_end_block_keyword(&token.text),
                    describe(token),
                    token.span.line,
                    token.span.column,
                )
            };
            match kind {
                TokenKind::Eof => break,
                TokenKind::Word if is_end_label => {
                    self.bump()?;
                    // The label may be followed by arbitrary non-text
                    // bytes; no further token is requested.
                    break;
                }
                TokenKind::Word if is_end_block => {
                    return Err(ParseError::Unexpected {
                        expected: "a parameter name or aggregation begin".to_string(),
                        found,
                        line,
                        column,
                    });
                }
                TokenKind::Word => self.dispatch_statement(&mut module)?,
                _ => {
                    return Err(ParseError::Unexpected {
                        expected: "a parameter name, aggregation keyword, or END".to_string(),
                        found,
                        line,
                        column,
                    });
                }
            }
        }
        Ok(module)
    }

    /// A statement that is not an end: either a block or an assignment.
    fn dispatch_statement(&mut self, module: &mut Module) -> Result<(), ParseError> {
        let grammar = self.grammar;
        let is_begin = {
            let token = self.peek(0)?;
            token.kind == TokenKind::Word && grammar.is_begin_keyword(&token.text)
        };
        if is_begin {
            self.parse_block(module)
        } else {
            self.parse_assignment(module)
        }
    }

    fn parse_assignment(&mut self, module: &mut Module) -> Result<(), ParseError> {
        let grammar = self.grammar;
        let name_token = self.bump()?;
        let name = name_token.text.to_string();
        let name_line = name_token.span.line;
        // Pointer statements (`^IMAGE = 188`) name a parameter with a
        // leading caret.
        let checked_name = name.strip_prefix('^').unwrap_or(&name);
        if grammar.validate_identifiers && !patterns::is_odl_identifier(checked_name) {
            return Err(DecodeError::Identifier {
                text: name,
                line: name_token.span.line,
                column: name_token.span.column,
            }
            .into());
        }

        {
            let token = self.peek(0)?;
            if token.kind != TokenKind::Equals {
                let (found, line, column) = (describe(token), token.span.line, token.span.column);
                return Err(ParseError::Unexpected {
                    expected: "`=`".to_string(),
                    found,
                    line,
                    column,
                });
            }
        }
        self.bump()?;

        if self.value_is_missing()? {
            if grammar.allow_empty_value {
                module.append(name, Value::Empty { line: name_line });
                return Ok(());
            }
            return Err(ParseError::MissingValue {
                key: name,
                line: name_line,
                dialect: grammar.dialect,
            });
        }

        let value = self.parse_value()?;
        if self.peek(0)?.kind == TokenKind::StatementEnd {
            self.bump()?;
        }
        module.append(name, value);
        Ok(())
    }

    /// Whether the assignment under construction has no value token:
    /// the next token already belongs to the following statement.
    fn value_is_missing(&mut self) -> Result<bool, ParseError> {
        let grammar = self.grammar;
        let (kind, ends_something) = {
            let token = self.peek(0)?;
            // END and block-end keywords cannot be values. Block-begin
            // keywords can (`kind = Group`), so those are only a
            // statement start when the `=` lookahead below says so.
            let ends = token.kind == TokenKind::Word
                && (grammar.is_end_keyword(&token.text)
                    || grammar.is_end_block_keyword(&token.text));
            (token.kind, ends)
        };
        match kind {
            TokenKind::Eof | TokenKind::StatementEnd => Ok(true),
            TokenKind::Word | TokenKind::QuotedString => {
                if ends_something {
                    return Ok(true);
                }
                // A word followed by `=` is the next statement's name.
                Ok(self.peek(1)?.kind == TokenKind::Equals)
            }
            _ => Ok(false),
        }
    }

    fn parse_value(&mut self) -> Result<Value, ParseError> {
        let (kind, found, line, column) = {
            let token = self.peek(0)?;
            (token.kind, describe(token), token.span.line, token.span.column)
        };
        match kind {
            TokenKind::Word => {
                let token = self.bump()?;
                let value = self.decoder.decode_word(&token.text, token.span)?;
                self.maybe_units(value)
            }
            TokenKind::QuotedString => {
                let token = self.bump()?;
                let value = self.decoder.decode_quoted(&token.text, token.span)?;
                self.maybe_units(value)
            }
            TokenKind::SequenceOpen => {
                let items = self.parse_collection(TokenKind::SequenceClose)?;
                Ok(Value::Sequence(items))
            }
            TokenKind::SetOpen => {
                let items = self.parse_collection(TokenKind::SetClose)?;
                Ok(Value::Set(items))
            }
            _ => Err(ParseError::Unexpected {
                expected: "a value".to_string(),
                found,
                line,
                column,
            }),
        }
    }

    /// Attaches a `<units>` expression to a scalar, if one follows.
    fn maybe_units(&mut self, value: Value) -> Result<Value, ParseError> {
        if self.peek(0)?.kind != TokenKind::UnitsOpen {
            return Ok(value);
        }
        self.bump()?;
        let units_token = self.bump()?;
        if units_token.kind != TokenKind::Units {
            return Err(ParseError::Unexpected {
                expected: "a units expression".to_string(),
                found: describe(&units_token),
                line: units_token.span.line,
                column: units_token.span.column,
            });
        }
        let close = self.bump()?;
        if close.kind != TokenKind::UnitsClose {
            return Err(ParseError::Unexpected {
                expected: "`>`".to_string(),
                found: describe(&close),
                line: close.span.line,
                column: close.span.column,
            });
        }
        let units = units_token.text.trim();
        if units.is_empty() {
            return Err(DecodeError::EmptyUnits {
                line: units_token.span.line,
                column: units_token.span.column,
            }
            .into());
        }
        Ok(self
            .quantity_factory
            .quantity(value, units, units_token.span)?)
    }

    fn parse_collection(&mut self, close: TokenKind) -> Result<Vec<Value>, ParseError> {
        self.bump()?;
        let mut items = Vec::new();
        if self.peek(0)?.kind == close {
            self.bump()?;
            return Ok(items);
        }
        loop {
            items.push(self.parse_value()?);
            let (kind, found, line, column) = {
                let token = self.peek(0)?;
                (token.kind, describe(token), token.span.line, token.span.column)
            };
            if kind == TokenKind::Comma {
                self.bump()?;
                continue;
            }
            if kind == close {
                self.bump()?;
                break;
            }
            return Err(ParseError::Unexpected {
                expected: format!("`,` or {}", close.describe()),
                found,
                line,
                column,
            });
        }
        Ok(items)
    }

    fn parse_block(&mut self, module: &mut Module) -> Result<(), ParseError> {
        let grammar = self.grammar;
        let begin_token = self.bump()?;
        let begin_keyword = begin_token.text.to_string();
        let begin_line = begin_token.span.line;
        let expected_end = match grammar.block_end_for(&begin_keyword) {
            Some(end) => end,
            None => {
                return Err(ParseError::Unexpected {
                    expected: "an aggregation begin keyword".to_string(),
                    found: format!("`{begin_keyword}`"),
                    line: begin_line,
                    column: begin_token.span.column,
                })
            }
        };
        let kind = if expected_end.eq_ignore_ascii_case("END_GROUP") {
            BlockKind::Group
        } else {
            BlockKind::Object
        };

        if self.peek(0)?.kind == TokenKind::Equals {
            self.bump()?;
        }
        let name_token = self.bump()?;
        if name_token.kind != TokenKind::Word {
            return Err(ParseError::Unexpected {
                expected: "an aggregation block name".to_string(),
                found: describe(&name_token),
                line: name_token.span.line,
                column: name_token.span.column,
            });
        }
        let name = name_token.text.to_string();
        if self.peek(0)?.kind == TokenKind::StatementEnd {
            self.bump()?;
        }

        let mut body = Module::new();
        loop {
            let (kind_here, is_end_label, is_end_block, found, line, column) = {
                let token = self.peek(0)?;
                (
                    token.kind,
                    token.kind == TokenKind::Word && grammar.is_end_keyword(&token.text),
                    token.kind == TokenKind::Word && grammar.is_end_block_keyword(&token.text),
                    describe(token),
                    token.span.line,
                    token.span.column,
                )
            };
            match kind_here {
                TokenKind::Eof => {
                    return Err(ParseError::UnterminatedBlock {
                        name,
                        line: begin_line,
                    })
                }
                TokenKind::Word if is_end_label => {
                    return Err(ParseError::UnterminatedBlock {
                        name,
                        line: begin_line,
                    })
                }
                TokenKind::Word if is_end_block => {
                    let end_token = self.bump()?;
                    if !end_token.text.eq_ignore_ascii_case(expected_end) {
                        return Err(ParseError::MismatchedBlockEnd {
                            name,
                            begin: begin_keyword,
                            found: end_token.text.to_string(),
                            line: begin_line,
                        });
                    }
                    self.finish_block_end(&name, begin_line)?;
                    break;
                }
                TokenKind::Word => self.dispatch_statement(&mut body)?,
                _ => {
                    return Err(ParseError::Unexpected {
                        expected: "a parameter name, aggregation keyword, or block end"
                            .to_string(),
                        found,
                        line,
                        column,
                    })
                }
            }
        }

        module.append(name, Value::Block(Block { kind, body }));
        Ok(())
    }

    /// Consumes what follows an end keyword: an optional (`=`-prefixed
    /// or bare) block name that must match the begin name, then an
    /// optional statement delimiter.
    fn finish_block_end(&mut self, name: &str, begin_line: u32) -> Result<(), ParseError> {
        let grammar = self.grammar;
        if self.peek(0)?.kind == TokenKind::Equals {
            self.bump()?;
            let name_token = self.bump()?;
            if name_token.kind != TokenKind::Word {
                return Err(ParseError::Unexpected {
                    expected: "an aggregation block name".to_string(),
                    found: describe(&name_token),
                    line: name_token.span.line,
                    column: name_token.span.column,
                });
            }
            if name_token.text != name {
                return Err(ParseError::MismatchedBlockName {
                    name: name.to_string(),
                    found: name_token.text.to_string(),
                    line: begin_line,
                    end_line: name_token.span.line,
                });
            }
        } else {
            // A bare word is the end name only when it does not begin
            // the following statement.
            let is_bare_name = {
                let token = self.peek(0)?;
                token.kind == TokenKind::Word && !grammar.is_reserved_keyword(&token.text)
            };
            if is_bare_name && self.peek(1)?.kind != TokenKind::Equals {
                let name_token = self.bump()?;
                if name_token.text != name {
                    return Err(ParseError::MismatchedBlockName {
                        name: name.to_string(),
                        found: name_token.text.to_string(),
                        line: begin_line,
                        end_line: name_token.span.line,
                    });
                }
            }
        }
        if self.peek(0)?.kind == TokenKind::StatementEnd {
            self.bump()?;
        }
        Ok(())
    }

    /// Fills the lookahead buffer through index `n`, skipping comments.
    fn fill(&mut self, n: usize) -> Result<(), ParseError> {
        while self.lookahead.len() <= n {
            let token = loop {
                let token = self.lexer.next_token()?;
                if token.kind != TokenKind::Comment {
                    break token;
                }
            };
            self.lookahead.push_back(token);
        }
        Ok(())
    }

    fn peek(&mut self, n: usize) -> Result<&Token<'s>, ParseError> {
        self.fill(n)?;
        Ok(&self.lookahead[n])
    }

    fn bump(&mut self) -> Result<Token<'s>, ParseError> {
        self.fill(0)?;
        Ok(self
            .lookahead
            .pop_front()
            .unwrap_or_else(|| Token::new(TokenKind::Eof, "", Span::DUMMY)))
    }
}

fn describe(token: &Token<'_>) -> String {
    match token.kind {
        TokenKind::Word | TokenKind::QuotedString => format!("`{}`", token.text),
        other => other.describe().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pvl_lex::Dialect;

    fn parse(source: &str, grammar: Grammar) -> Result<Module, ParseError> {
        Parser::new(source, grammar).parse()
    }

    fn parse_omni(source: &str) -> Module {
        parse(source, Grammar::omni()).unwrap()
    }

    #[test]
    fn test_assignments_and_sequence() {
        let module = parse_omni("foo = bar\nitems = (1, 2, 3)\nEND\n");
        assert_eq!(module.get("foo"), Some(&Value::symbol("bar")));
        assert_eq!(
            module.get("items"),
            Some(&Value::Sequence(vec![
                Value::from(1),
                Value::from(2),
                Value::from(3)
            ]))
        );
    }

    #[test]
    fn test_duplicate_keys_kept_in_order() {
        let module = parse_omni("k = 1\nother = x\nk = 2\nEND");
        assert_eq!(module.get("k"), Some(&Value::Integer(1)));
        let all: Vec<_> = module.get_all("k").collect();
        assert_eq!(all, vec![&Value::Integer(1), &Value::Integer(2)]);
        let keys: Vec<&str> = module.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["k", "other", "k"]);
    }

    #[test]
    fn test_empty_value_only_under_omni() {
        let module = parse_omni("A =\nEnd");
        assert_eq!(module.get("A"), Some(&Value::Empty { line: 1 }));

        let err = parse("A =\nEnd", Grammar::pds3()).unwrap_err();
        assert!(matches!(
            err,
            ParseError::MissingValue {
                line: 1,
                dialect: Dialect::Pds3,
                ..
            }
        ));
    }

    #[test]
    fn test_empty_value_between_assignments() {
        let module = parse_omni("A =\nB = 1\nEND");
        assert_eq!(module.get("A"), Some(&Value::Empty { line: 1 }));
        assert_eq!(module.get("B"), Some(&Value::Integer(1)));
    }

    #[test]
    fn test_bare_identifier_reports_expected_equals() {
        let err = parse("foo\nEND", Grammar::omni()).unwrap_err();
        match &err {
            ParseError::Unexpected { expected, .. } => assert_eq!(expected, "`=`"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().contains("`=`"));
    }

    #[test]
    fn test_quantity() {
        let module = parse_omni("length = 42 <m/s>\nEND");
        assert_eq!(
            module.get("length"),
            Some(&Value::quantity(Value::from(42), "m/s"))
        );
    }

    #[test]
    fn test_quantity_inside_sequence() {
        let module = parse_omni("v = (1 <m>, 2 <m>)\nEND");
        assert_eq!(
            module.get("v"),
            Some(&Value::Sequence(vec![
                Value::quantity(Value::from(1), "m"),
                Value::quantity(Value::from(2), "m"),
            ]))
        );
    }

    #[test]
    fn test_empty_units_rejected() {
        let err = parse("x = 1 < >\nEND", Grammar::omni()).unwrap_err();
        assert!(matches!(
            err,
            ParseError::Decode(DecodeError::EmptyUnits { .. })
        ));
    }

    #[test]
    fn test_custom_quantity_factory() {
        #[derive(Debug)]
        struct Tagging;
        impl QuantityFactory for Tagging {
            fn quantity(
                &self,
                value: Value,
                units: &str,
                _span: Span,
            ) -> Result<Value, DecodeError> {
                Ok(Value::symbol(format!(
                    "{}!{units}",
                    value.as_integer().unwrap_or(0)
                )))
            }
        }

        let module = Parser::new("x = 5 <m>\nEND", Grammar::omni())
            .with_quantity_factory(Arc::new(Tagging))
            .parse()
            .unwrap();
        assert_eq!(module.get("x"), Some(&Value::symbol("5!m")));
    }

    #[test]
    fn test_sets_and_nested_sequences() {
        let module = parse_omni("s = {a, 2}\nq = ((1, 2), (3))\nEND");
        assert_eq!(
            module.get("s"),
            Some(&Value::Set(vec![Value::symbol("a"), Value::from(2)]))
        );
        assert_eq!(
            module.get("q"),
            Some(&Value::Sequence(vec![
                Value::Sequence(vec![Value::from(1), Value::from(2)]),
                Value::Sequence(vec![Value::from(3)]),
            ]))
        );
    }

    #[test]
    fn test_empty_collections() {
        let module = parse_omni("a = ()\nb = {}\nEND");
        assert_eq!(module.get("a"), Some(&Value::Sequence(vec![])));
        assert_eq!(module.get("b"), Some(&Value::Set(vec![])));
    }

    #[test]
    fn test_nested_blocks() {
        let source = "\
OBJECT = IMAGE
  LINES = 1024
  GROUP = STATS
    MEAN = 4.5
  END_GROUP = STATS
END_OBJECT = IMAGE
END
";
        let module = parse(source, Grammar::pds3()).unwrap();
        let image = module.get_block("IMAGE").unwrap();
        assert_eq!(image.kind, BlockKind::Object);
        assert_eq!(image.body.get("LINES"), Some(&Value::Integer(1024)));
        let stats = image.body.get_block("STATS").unwrap();
        assert_eq!(stats.kind, BlockKind::Group);
        assert_eq!(stats.body.get("MEAN"), Some(&Value::Real(4.5)));
    }

    #[test]
    fn test_isis_style_blocks() {
        let source = "\
Object = IsisCube
  Group = Dimensions
    Samples = 704
  End_Group
End_Object
End
";
        let module = parse(source, Grammar::isis()).unwrap();
        let cube = module.get_block("IsisCube").unwrap();
        let dims = cube.body.get_block("Dimensions").unwrap();
        assert_eq!(dims.body.get("Samples"), Some(&Value::Integer(704)));
    }

    #[test]
    fn test_mismatched_block_name() {
        let source = "OBJECT = IMAGE\nLINES = 1\nEND_OBJECT = TABLE\nEND";
        let err = parse(source, Grammar::omni()).unwrap_err();
        assert!(matches!(
            err,
            ParseError::MismatchedBlockName { ref name, ref found, .. }
                if name == "IMAGE" && found == "TABLE"
        ));
    }

    #[test]
    fn test_mismatched_block_end_keyword() {
        let source = "GROUP = G\nx = 1\nEND_OBJECT = G\nEND";
        let err = parse(source, Grammar::omni()).unwrap_err();
        assert!(matches!(err, ParseError::MismatchedBlockEnd { .. }));
    }

    #[test]
    fn test_unterminated_block() {
        let err = parse("OBJECT = IMAGE\nLINES = 1\nEND", Grammar::omni()).unwrap_err();
        assert!(matches!(
            err,
            ParseError::UnterminatedBlock { ref name, line: 1 } if name == "IMAGE"
        ));
    }

    #[test]
    fn test_stray_block_end() {
        let err = parse("END_OBJECT = IMAGE\nEND", Grammar::omni()).unwrap_err();
        assert!(matches!(err, ParseError::Unexpected { .. }));
    }

    #[test]
    fn test_stops_at_end_statement() {
        // Everything after END would be a lexer error if it were read.
        let module = parse_omni("a = 1\nEND\n!!!! not pvl at all ((((");
        assert_eq!(module.len(), 1);

        let module = parse(
            "a = 1\nEND # trailing noise !!!",
            Grammar::pds3(),
        );
        assert!(module.is_ok());
    }

    #[test]
    fn test_comments_are_skipped() {
        let module = parse(
            "/* head */ a = 1 /* mid */\nb = 2 /* tail */\nEND",
            Grammar::pvl(),
        )
        .unwrap();
        assert_eq!(module.len(), 2);

        let module = parse_omni("# leading comment\na = 1\nEND");
        assert_eq!(module.get("a"), Some(&Value::Integer(1)));
    }

    #[test]
    fn test_statement_delimiters_under_pvl() {
        let module = parse("a = 1;\nBEGIN_GROUP = G;\nb = 2;\nEND_GROUP = G;\nEND;", Grammar::pvl());
        let module = module.unwrap();
        assert_eq!(module.get("a"), Some(&Value::Integer(1)));
        assert!(module.get_block("G").is_some());
    }

    #[test]
    fn test_module_without_end_statement() {
        let module = parse_omni("a = 1\nb = 2");
        assert_eq!(module.len(), 2);
    }

    #[test]
    fn test_strict_key_identifier_rule() {
        let err = parse("BAD-KEY = 1\nEND", Grammar::pds3()).unwrap_err();
        assert!(matches!(
            err,
            ParseError::Decode(DecodeError::Identifier { .. })
        ));
        assert!(parse("BAD-KEY = 1\nEND", Grammar::omni()).is_ok());
    }
}
