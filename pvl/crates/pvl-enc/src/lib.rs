//! pvl-enc - writing a label tree back to PVL text.
//!
//! The [`Encoder`] serializes a [`Module`] under one dialect's
//! formatting and validity rules, described by an [`EncodeConfig`]
//! profile. Emission walks the tree in insertion order: each block
//! writes its begin line, recurses into its body, then writes its end
//! line. The encoder fails fast on any dialect violation — it reports
//! the offending parameter and rule rather than silently rewriting the
//! value.

use chrono::{FixedOffset, NaiveTime, Timelike};

use pvl_lex::patterns;
use pvl_par::{BlockKind, Module, PvlDateTime, PvlTime, Quantity, Value};

pub mod config;
pub mod error;

pub use config::EncodeConfig;
pub use error::EncodeError;

use pvl_lex::Dialect;
use pvl_par::Block;

/// Serializes label trees to text under one dialect profile.
#[derive(Clone, Copy, Debug)]
pub struct Encoder {
    config: EncodeConfig,
}

impl Encoder {
    /// Creates an encoder from an explicit profile.
    pub const fn new(config: EncodeConfig) -> Self {
        Self { config }
    }

    /// The CCSDS PVL encoder.
    pub const fn pvl() -> Self {
        Self::new(EncodeConfig::pvl())
    }

    /// The ODL encoder.
    pub const fn odl() -> Self {
        Self::new(EncodeConfig::odl())
    }

    /// The PDS3 label encoder.
    pub const fn pds3() -> Self {
        Self::new(EncodeConfig::pds3())
    }

    /// The ISIS cube-label encoder.
    pub const fn isis() -> Self {
        Self::new(EncodeConfig::isis())
    }

    /// The encoder for a dialect, or `None` for the parse-only Omni.
    pub fn for_dialect(dialect: Dialect) -> Option<Self> {
        EncodeConfig::for_dialect(dialect).map(Self::new)
    }

    /// The profile this encoder enforces.
    pub fn config(&self) -> &EncodeConfig {
        &self.config
    }

    /// Writes the module as label text, ending with the dialect's end
    /// keyword.
    pub fn encode(&self, module: &Module) -> Result<String, EncodeError> {
        let mut out = String::new();
        let mut path = Vec::new();
        self.encode_body(&mut out, module, 0, &mut path)?;
        out.push_str(self.config.end_keyword);
        if let Some(delimiter) = self.config.statement_delimiter {
            out.push_str(delimiter);
        }
        out.push_str(self.config.newline);
        if self.config.trailing_blank_after_end {
            out.push_str(self.config.newline);
        }
        Ok(out)
    }

    fn encode_body(
        &self,
        out: &mut String,
        module: &Module,
        depth: usize,
        path: &mut Vec<String>,
    ) -> Result<(), EncodeError> {
        // `=` columns align to the longest scalar key of this body;
        // block begin/end lines stay out of the computation.
        let width = if self.config.align_assignments {
            module
                .iter()
                .filter(|(_, value)| !matches!(value, Value::Block(_)))
                .map(|(key, _)| self.shown_key(key).chars().count())
                .max()
                .unwrap_or(0)
        } else {
            0
        };
        for (key, value) in module.iter() {
            match value {
                Value::Block(block) => self.encode_block(out, key, block, depth, path)?,
                _ => self.encode_assignment(out, key, value, depth, width, path)?,
            }
        }
        Ok(())
    }

    fn shown_key(&self, key: &str) -> String {
        if self.config.uppercase_parameters {
            key.to_ascii_uppercase()
        } else {
            key.to_string()
        }
    }

    fn encode_assignment(
        &self,
        out: &mut String,
        key: &str,
        value: &Value,
        depth: usize,
        width: usize,
        path: &mut Vec<String>,
    ) -> Result<(), EncodeError> {
        path.push(key.to_string());
        let shown = self.shown_key(key);
        self.check_name(&shown, "parameter name", true, path)?;

        let mut line = " ".repeat(self.config.indent_width * depth);
        if width > 0 {
            line.push_str(&format!("{shown:<width$}"));
        } else {
            line.push_str(&shown);
        }
        line.push_str(" = ");
        let col = line.chars().count();
        let rendered = self.format_value(value, col, path)?;
        line.push_str(&rendered);
        if let Some(delimiter) = self.config.statement_delimiter {
            line.push_str(delimiter);
        }
        line.push_str(self.config.newline);
        out.push_str(&line);
        path.pop();
        Ok(())
    }

    fn encode_block(
        &self,
        out: &mut String,
        name: &str,
        block: &Block,
        depth: usize,
        path: &mut Vec<String>,
    ) -> Result<(), EncodeError> {
        path.push(name.to_string());
        // Block names keep their case in every dialect.
        self.check_name(name, "block name", false, path)?;

        let (begin, end) = match block.kind {
            BlockKind::Object => (self.config.object_begin, self.config.object_end),
            BlockKind::Group => (self.config.group_begin, self.config.group_end),
        };
        let indent = " ".repeat(self.config.indent_width * depth);

        out.push_str(&indent);
        out.push_str(begin);
        out.push_str(" = ");
        out.push_str(name);
        if let Some(delimiter) = self.config.statement_delimiter {
            out.push_str(delimiter);
        }
        out.push_str(self.config.newline);

        self.encode_body(out, &block.body, depth + 1, path)?;

        out.push_str(&indent);
        out.push_str(end);
        if self.config.end_block_names {
            out.push_str(" = ");
            out.push_str(name);
        }
        if let Some(delimiter) = self.config.statement_delimiter {
            out.push_str(delimiter);
        }
        out.push_str(self.config.newline);
        path.pop();
        Ok(())
    }

    fn check_name(
        &self,
        name: &str,
        what: &str,
        allow_pointer: bool,
        path: &[String],
    ) -> Result<(), EncodeError> {
        let grammar = self.config.dialect.grammar();
        // Pointer parameters (`^IMAGE = 188`) are ordinary statements
        // whose name carries a leading caret.
        let body = if allow_pointer {
            name.strip_prefix('^').unwrap_or(name)
        } else {
            name
        };
        let bad = body.is_empty()
            || body
                .chars()
                .any(|c| grammar.is_whitespace(c) || grammar.is_reserved(c))
            || grammar.is_reserved_keyword(body)
            || (grammar.validate_identifiers && !patterns::is_odl_identifier(body));
        if bad {
            return Err(self.rule(path, format!("{what} {name:?} is not a valid identifier")));
        }
        Ok(())
    }

    fn format_value(
        &self,
        value: &Value,
        col: usize,
        path: &mut Vec<String>,
    ) -> Result<String, EncodeError> {
        match value {
            Value::Empty { .. } => Err(self.rule(path, "empty values cannot be encoded")),
            Value::Null => {
                if self.config.dialect.grammar().null_words.is_empty() {
                    return Err(self.rule(path, "this dialect has no representation for null"));
                }
                Ok("NULL".to_string())
            }
            Value::Boolean(value) => {
                if self.config.dialect.grammar().true_words.is_empty() {
                    return Err(self.rule(path, "this dialect has no representation for booleans"));
                }
                Ok(if *value { "TRUE" } else { "FALSE" }.to_string())
            }
            Value::Integer(value) => Ok(value.to_string()),
            Value::BasedInteger(based) => Ok(format!(
                "{}{}#{}#",
                if based.negative { "-" } else { "" },
                based.base,
                based.digits
            )),
            Value::Real(value) => self.format_real(*value, path),
            Value::String(text) => Ok(self.quote_text(text)),
            Value::Symbol(text) => Ok(self.format_symbol(text, col)),
            Value::Date(date) => Ok(date.to_string()),
            Value::Time(time) => self.format_time(time, path),
            Value::DateTime(datetime) => self.format_datetime(datetime, path),
            Value::Quantity(quantity) => self.format_quantity(quantity, col, path),
            Value::Sequence(items) => self.format_collection(items, '(', ')', col, path, false),
            Value::Set(items) => self.format_collection(items, '{', '}', col, path, true),
            Value::Block(_) => Err(self.rule(path, "aggregation blocks cannot be used as values")),
        }
    }

    fn format_real(&self, value: f64, path: &[String]) -> Result<String, EncodeError> {
        if !value.is_finite() {
            return Err(self.rule(path, "non-finite reals cannot be encoded"));
        }
        let magnitude = value.abs();
        if value.fract() == 0.0 && magnitude < 1e16 {
            Ok(format!("{value:.1}"))
        } else if magnitude >= 1e16 || magnitude < 1e-4 {
            // Plain formatting would print these as enormous digit runs
            // (or lose the fraction); exponent form reads back as a real.
            Ok(format!("{value:e}"))
        } else {
            Ok(format!("{value}"))
        }
    }

    /// Double-quoted text string, escaped per the dialect.
    fn quote_text(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len() + 2);
        out.push('"');
        for c in text.chars() {
            match c {
                '"' => {
                    if self.config.backslash_escapes {
                        out.push('\\');
                        out.push('"');
                    } else {
                        out.push_str("\"\"");
                    }
                }
                '\\' if self.config.backslash_escapes => out.push_str("\\\\"),
                _ => out.push(c),
            }
        }
        out.push('"');
        out
    }

    /// A symbol stays bare when it would read back as the same symbol;
    /// otherwise it is single-quoted. A bare symbol crossing the line
    /// limit becomes a double-quoted text string.
    fn format_symbol(&self, text: &str, col: usize) -> String {
        let grammar = self.config.dialect.grammar();
        let needs_quotes = text.is_empty()
            || grammar.is_reserved_keyword(text)
            || text
                .chars()
                .any(|c| grammar.is_whitespace(c) || grammar.is_reserved(c))
            || (grammar.validate_identifiers && !patterns::is_odl_identifier(text))
            // a bare `/*` would open a comment
            || text.contains("/*")
            // a bare trailing dash at end of line would read back as a
            // line continuation
            || (grammar.dash_continuation && text.ends_with('-'))
            // bare words that would decode as another type
            || grammar.is_true_word(text)
            || grammar.is_false_word(text)
            || grammar.is_null_word(text)
            || patterns::is_decimal_integer(text)
            || patterns::is_real(text)
            || patterns::based_integer_parts(text).is_some()
            || patterns::datetime_shape(text).is_some();
        if !needs_quotes {
            if let Some(width) = self.config.line_width {
                if col + text.chars().count() > width {
                    return self.quote_text(text);
                }
            }
            return text.to_string();
        }
        let mut out = String::with_capacity(text.len() + 2);
        out.push('\'');
        for c in text.chars() {
            match c {
                '\'' => {
                    if self.config.backslash_escapes {
                        out.push('\\');
                        out.push('\'');
                    } else {
                        out.push_str("''");
                    }
                }
                '\\' if self.config.backslash_escapes => out.push_str("\\\\"),
                _ => out.push(c),
            }
        }
        out.push('\'');
        out
    }

    fn format_time(&self, time: &PvlTime, path: &[String]) -> Result<String, EncodeError> {
        match time {
            PvlTime::Naive(clock) => self.format_clock(clock, path),
            PvlTime::Aware { time, offset } => {
                let mut out = self.format_clock(time, path)?;
                out.push_str(&self.format_offset(offset, path)?);
                Ok(out)
            }
        }
    }

    fn format_datetime(
        &self,
        datetime: &PvlDateTime,
        path: &[String],
    ) -> Result<String, EncodeError> {
        match datetime {
            PvlDateTime::Naive(naive) => Ok(format!(
                "{}T{}",
                naive.date(),
                self.format_clock(&naive.time(), path)?
            )),
            PvlDateTime::Aware(aware) => {
                let clock = self.format_clock(&aware.time(), path)?;
                let offset = self.format_offset(aware.offset(), path)?;
                Ok(format!("{}T{clock}{offset}", aware.date_naive()))
            }
        }
    }

    fn format_clock(&self, time: &NaiveTime, path: &[String]) -> Result<String, EncodeError> {
        // chrono models a leap second as second 59 with an oversized
        // fractional part.
        let (second, nanos) = if time.nanosecond() >= 1_000_000_000 {
            (60, time.nanosecond() - 1_000_000_000)
        } else {
            (time.second(), time.nanosecond())
        };
        let micros = nanos / 1_000;
        let mut out = format!("{:02}:{:02}:{:02}", time.hour(), time.minute(), second);
        if micros != 0 {
            if let Some(max) = self.config.max_fraction_digits {
                let step = 10u32.pow(6 - max);
                if micros % step != 0 {
                    return Err(self.rule(
                        path,
                        "PDS labels only support times with millisecond precision",
                    ));
                }
            }
            let frac = format!("{micros:06}");
            out.push('.');
            out.push_str(frac.trim_end_matches('0'));
        }
        Ok(out)
    }

    fn format_offset(
        &self,
        offset: &FixedOffset,
        path: &[String],
    ) -> Result<String, EncodeError> {
        let seconds = offset.local_minus_utc();
        if self.config.require_utc_times && seconds != 0 {
            return Err(self.rule(path, "PDS labels should only have UTC times"));
        }
        if seconds == 0 {
            return Ok("Z".to_string());
        }
        let sign = if seconds < 0 { '-' } else { '+' };
        let magnitude = seconds.abs();
        Ok(format!(
            "{sign}{:02}:{:02}",
            magnitude / 3600,
            (magnitude % 3600) / 60
        ))
    }

    fn format_quantity(
        &self,
        quantity: &Quantity,
        col: usize,
        path: &mut Vec<String>,
    ) -> Result<String, EncodeError> {
        match &*quantity.value {
            Value::Set(_)
            | Value::Sequence(_)
            | Value::Block(_)
            | Value::Quantity(_)
            | Value::Empty { .. } => {
                return Err(self.rule(
                    path,
                    format!(
                        "a quantity value must be a scalar, not {}",
                        quantity.value.kind_name()
                    ),
                ));
            }
            _ => {}
        }
        if quantity.units.trim().is_empty() {
            return Err(self.rule(path, "quantity units must not be empty"));
        }
        if quantity.units.contains('>') {
            return Err(self.rule(path, "quantity units may not contain `>`"));
        }
        let inner = self.format_value(&quantity.value, col, path)?;
        let units = if self.config.space_units_operators {
            space_units(&quantity.units)
        } else {
            quantity.units.clone()
        };
        Ok(format!("{inner} <{units}>"))
    }

    fn format_collection(
        &self,
        items: &[Value],
        open: char,
        close: char,
        col: usize,
        path: &mut Vec<String>,
        is_set: bool,
    ) -> Result<String, EncodeError> {
        if is_set && self.config.restrict_set_elements {
            for item in items {
                match item {
                    Value::Integer(_) | Value::BasedInteger(_) | Value::Symbol(_) => {}
                    other => {
                        return Err(self.rule(
                            path,
                            format!(
                                "sets may only contain integers and symbols, not {}",
                                other.kind_name()
                            ),
                        ));
                    }
                }
            }
        }

        let mut out = String::new();
        out.push(open);
        for (i, item) in items.iter().enumerate() {
            if i == 0 {
                let current = line_len(col, &out);
                let rendered = self.format_value(item, current, path)?;
                out.push_str(&rendered);
                continue;
            }
            out.push(',');
            let current = line_len(col, &out);
            let rendered = self.format_value(item, current + 1, path)?;
            let first_line = match rendered.find('\n') {
                Some(position) => rendered[..position].chars().count(),
                None => rendered.chars().count(),
            };
            let wraps = match self.config.line_width {
                Some(width) => current + 1 + first_line > width,
                None => false,
            };
            if wraps {
                out.push_str(self.config.newline);
                for _ in 0..=col {
                    out.push(' ');
                }
                let current = line_len(col, &out);
                let rendered = self.format_value(item, current, path)?;
                out.push_str(&rendered);
            } else {
                out.push(' ');
                out.push_str(&rendered);
            }
        }
        out.push(close);
        Ok(out)
    }

    fn rule(&self, path: &[String], rule: impl Into<String>) -> EncodeError {
        EncodeError::new(path, rule, self.config.dialect)
    }
}

/// Length of the line currently being built: `col` is where this text
/// began, unless the text itself started a fresh line.
fn line_len(col: usize, text: &str) -> usize {
    match text.rfind('\n') {
        Some(position) => text[position + 1..].chars().count(),
        None => col + text.chars().count(),
    }
}

/// PDS3 units formatting: operators get one space on each side.
fn space_units(units: &str) -> String {
    let mut out = String::with_capacity(units.len() + 4);
    let mut chars = units.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '/' => push_operator(&mut out, "/"),
            '*' => {
                if chars.peek() == Some(&'*') {
                    chars.next();
                    push_operator(&mut out, "**");
                } else {
                    push_operator(&mut out, "*");
                }
            }
            c if c.is_whitespace() => {
                if !out.is_empty() && !out.ends_with(' ') {
                    out.push(' ');
                }
            }
            _ => out.push(c),
        }
    }
    out.trim_end().to_string()
}

fn push_operator(out: &mut String, operator: &str) {
    while out.ends_with(' ') {
        out.pop();
    }
    if !out.is_empty() {
        out.push(' ');
    }
    out.push_str(operator);
    out.push(' ');
}
