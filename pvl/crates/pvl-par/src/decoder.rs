//! Token-to-scalar decoding.
//!
//! The parser hands each value token here to be turned into a typed
//! [`Value`] under the active grammar's rules. Words are classified in
//! a fixed order: boolean/null words, decimal integers, based integers,
//! reals, date/times, and finally symbols. A word whose *shape* matches
//! a date/time but whose fields violate the dialect (bad calendar day,
//! forbidden timezone, leap second) is an error, not a symbol.

use chrono::{FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};

use pvl_lex::patterns::{self, BasedParts, DateParts, DateTimeShape, TimeParts};
use pvl_lex::{Dialect, Grammar};
use pvl_util::Span;

use crate::ast::{BasedInteger, PvlDateTime, PvlTime, Value};
use crate::error::DecodeError;

/// A real literal normalized into its syntactic parts.
///
/// The decoder produces `f64` values, but the parts are public so
/// callers can convert the literal into another numeric type without
/// reparsing.
#[derive(Clone, Debug, PartialEq)]
pub struct RealParts {
    /// Whether a leading `-` was written.
    pub negative: bool,
    /// Digits before the decimal point (may be empty).
    pub integral: String,
    /// Digits after the decimal point (may be empty).
    pub fraction: String,
    /// The explicit decimal exponent, zero when absent.
    pub exponent: i32,
    /// The literal, verbatim.
    pub raw: String,
    /// The literal converted to a double.
    pub value: f64,
}

impl RealParts {
    /// Splits a real literal, or returns `None` when `text` is not one.
    pub fn parse(text: &str) -> Option<RealParts> {
        if !patterns::is_real(text) {
            return None;
        }
        let value: f64 = text.parse().ok()?;
        let negative = text.starts_with('-');
        let body = text.strip_prefix(['+', '-']).unwrap_or(text);
        let (mantissa, exponent) = match body.find(['e', 'E']) {
            Some(i) => {
                let exp = &body[i + 1..];
                let exponent = exp.parse::<i32>().unwrap_or(if exp.starts_with('-') {
                    i32::MIN
                } else {
                    i32::MAX
                });
                (&body[..i], exponent)
            }
            None => (body, 0),
        };
        let (integral, fraction) = match mantissa.find('.') {
            Some(i) => (&mantissa[..i], &mantissa[i + 1..]),
            None => (mantissa, ""),
        };
        Some(RealParts {
            negative,
            integral: integral.to_string(),
            fraction: fraction.to_string(),
            exponent,
            raw: text.to_string(),
            value,
        })
    }
}

/// Converts individual tokens into typed scalars per dialect rules.
#[derive(Clone, Copy, Debug)]
pub struct Decoder {
    grammar: Grammar,
}

impl Decoder {
    /// Creates a decoder for the given grammar.
    pub fn new(grammar: Grammar) -> Self {
        Self { grammar }
    }

    /// The grammar this decoder follows.
    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    /// Decodes an unquoted word token.
    pub fn decode_word(&self, text: &str, span: Span) -> Result<Value, DecodeError> {
        if self.grammar.is_true_word(text) {
            return Ok(Value::Boolean(true));
        }
        if self.grammar.is_false_word(text) {
            return Ok(Value::Boolean(false));
        }
        if self.grammar.is_null_word(text) {
            return Ok(Value::Null);
        }
        if let Some(parts) = patterns::based_integer_parts(text) {
            return self.decode_based(text, parts, span);
        }
        if patterns::is_decimal_integer(text) {
            return self.decode_integer(text, span);
        }
        if let Some(parts) = RealParts::parse(text) {
            return Ok(Value::Real(parts.value));
        }
        if let Some(shape) = patterns::datetime_shape(text) {
            return self.decode_datetime(text, shape, span);
        }
        if self.grammar.validate_identifiers && !patterns::is_odl_identifier(text) {
            return Err(DecodeError::Identifier {
                text: text.to_string(),
                line: span.line,
                column: span.column,
            });
        }
        Ok(Value::Symbol(text.to_string()))
    }

    /// Decodes a quoted string token (quotes still attached).
    ///
    /// Double quotes produce text strings, single quotes symbols.
    pub fn decode_quoted(&self, raw: &str, span: Span) -> Result<Value, DecodeError> {
        let quote = raw.chars().next().unwrap_or('"');
        let content = if raw.len() >= 2 {
            &raw[1..raw.len() - 1]
        } else {
            ""
        };
        let text = self.unescape(content, quote, span)?;
        if quote == '\'' {
            Ok(Value::Symbol(text))
        } else {
            Ok(Value::String(text))
        }
    }

    fn unescape(&self, content: &str, quote: char, span: Span) -> Result<String, DecodeError> {
        let mut out = String::with_capacity(content.len());
        let mut chars = content.chars().peekable();
        while let Some(c) = chars.next() {
            if c == quote {
                // The lexer only leaves quote characters in the content
                // as doubled pairs.
                if chars.peek() == Some(&quote) {
                    chars.next();
                }
                out.push(quote);
                continue;
            }
            if c == '\\' && self.grammar.backslash_escape {
                match chars.next() {
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some('r') => out.push('\r'),
                    Some('f') => out.push('\x0c'),
                    Some('v') => out.push('\x0b'),
                    Some('b') => out.push('\x08'),
                    Some('\\') => out.push('\\'),
                    Some('\'') => out.push('\''),
                    Some('"') => out.push('"'),
                    Some(other) => {
                        if self.grammar.dialect == Dialect::Omni {
                            out.push('\\');
                            out.push(other);
                        } else {
                            return Err(DecodeError::Escape {
                                escape: other,
                                line: span.line,
                                column: span.column,
                            });
                        }
                    }
                    None => out.push('\\'),
                }
                continue;
            }
            out.push(c);
        }
        Ok(out)
    }

    fn decode_integer(&self, text: &str, span: Span) -> Result<Value, DecodeError> {
        match text.parse::<i64>() {
            Ok(value) => Ok(Value::Integer(value)),
            Err(_) => {
                // Omni keeps reading labels from producers that write
                // integers wider than 64 bits; strict dialects refuse.
                if self.grammar.dialect == Dialect::Omni {
                    if let Ok(value) = text.parse::<f64>() {
                        return Ok(Value::Real(value));
                    }
                }
                Err(DecodeError::IntegerOverflow {
                    text: text.to_string(),
                    line: span.line,
                    column: span.column,
                })
            }
        }
    }

    fn decode_based(
        &self,
        text: &str,
        parts: BasedParts<'_>,
        span: Span,
    ) -> Result<Value, DecodeError> {
        let magnitude = i64::from_str_radix(parts.digits, parts.base).map_err(|_| {
            DecodeError::BasedInteger {
                text: text.to_string(),
                base: parts.base,
                line: span.line,
                column: span.column,
            }
        })?;
        let value = if parts.negative { -magnitude } else { magnitude };
        Ok(Value::BasedInteger(BasedInteger {
            base: parts.base,
            digits: parts.digits.to_string(),
            negative: parts.negative,
            value,
        }))
    }

    fn decode_datetime(
        &self,
        text: &str,
        shape: DateTimeShape<'_>,
        span: Span,
    ) -> Result<Value, DecodeError> {
        match shape {
            DateTimeShape::Date(date) => Ok(Value::Date(self.decode_date(text, date, span)?)),
            DateTimeShape::Time(time) => {
                let clock = self.decode_clock(text, &time, span)?;
                let offset = self.decode_offset(text, time.offset, span)?;
                Ok(Value::Time(self.finish_time(text, clock, offset, span)?))
            }
            DateTimeShape::DateTime(date, time) => {
                let date = self.decode_date(text, date, span)?;
                let clock = self.decode_clock(text, &time, span)?;
                let naive = NaiveDateTime::new(date, clock);
                let offset = self.decode_offset(text, time.offset, span)?;
                match offset {
                    Some(offset) => {
                        self.check_utc(text, offset, span)?;
                        match naive.and_local_timezone(offset).single() {
                            Some(aware) => Ok(Value::DateTime(PvlDateTime::Aware(aware))),
                            None => Err(self.datetime_error(text, "unrepresentable local time", span)),
                        }
                    }
                    None => match self.utc_default() {
                        Some(utc) => match naive.and_local_timezone(utc).single() {
                            Some(aware) => Ok(Value::DateTime(PvlDateTime::Aware(aware))),
                            None => {
                                Err(self.datetime_error(text, "unrepresentable local time", span))
                            }
                        },
                        None => Ok(Value::DateTime(PvlDateTime::Naive(naive))),
                    },
                }
            }
        }
    }

    fn decode_date(
        &self,
        text: &str,
        parts: DateParts<'_>,
        span: Span,
    ) -> Result<NaiveDate, DecodeError> {
        let year: i32 = parts.year.parse().unwrap_or(0);
        let date = if let Some((month, day)) = parts.month_day {
            NaiveDate::from_ymd_opt(year, month.parse().unwrap_or(0), day.parse().unwrap_or(0))
        } else if let Some(doy) = parts.day_of_year {
            NaiveDate::from_yo_opt(year, doy.parse().unwrap_or(0))
        } else {
            None
        };
        date.ok_or_else(|| self.datetime_error(text, "no such calendar date", span))
    }

    fn decode_clock(
        &self,
        text: &str,
        parts: &TimeParts<'_>,
        span: Span,
    ) -> Result<NaiveTime, DecodeError> {
        let hour: u32 = parts.hour.parse().unwrap_or(99);
        let minute: u32 = parts.minute.parse().unwrap_or(99);
        let second: u32 = match parts.second {
            Some(s) => s.parse().unwrap_or(99),
            None => 0,
        };
        let micros: u32 = match parts.fraction {
            Some(fraction) => {
                if fraction.len() > 6 {
                    return Err(self.datetime_error(
                        text,
                        "more than microsecond precision",
                        span,
                    ));
                }
                format!("{fraction:0<6}").parse().unwrap_or(0)
            }
            None => 0,
        };
        if second == 60 {
            if !self.grammar.allow_leap_second {
                return Err(self.datetime_error(
                    text,
                    &format!("{} does not allow leap seconds", self.grammar.dialect),
                    span,
                ));
            }
            // chrono models a leap second as 59 plus an oversized
            // fractional part.
            return NaiveTime::from_hms_micro_opt(hour, minute, 59, 1_000_000 + micros)
                .ok_or_else(|| self.datetime_error(text, "no such time of day", span));
        }
        NaiveTime::from_hms_micro_opt(hour, minute, second, micros)
            .ok_or_else(|| self.datetime_error(text, "no such time of day", span))
    }

    fn decode_offset(
        &self,
        text: &str,
        offset: Option<&str>,
        span: Span,
    ) -> Result<Option<FixedOffset>, DecodeError> {
        let raw = match offset {
            None => return Ok(None),
            Some(raw) => raw,
        };
        if raw == "Z" {
            return FixedOffset::east_opt(0)
                .map(Some)
                .ok_or_else(|| self.datetime_error(text, "bad timezone offset", span));
        }
        let negative = raw.starts_with('-');
        let body = &raw[1..];
        let (hours_text, minutes_text) = match body.find(':') {
            Some(i) => (&body[..i], &body[i + 1..]),
            None if body.len() == 4 => (&body[..2], &body[2..]),
            None => (body, ""),
        };
        let hours: i32 = match hours_text.parse() {
            Ok(h) => h,
            Err(_) => return Err(self.datetime_error(text, "bad timezone offset", span)),
        };
        let minutes: i32 = if minutes_text.is_empty() {
            0
        } else {
            match minutes_text.parse() {
                Ok(m) => m,
                Err(_) => return Err(self.datetime_error(text, "bad timezone offset", span)),
            }
        };
        let mut seconds = hours * 3600 + minutes * 60;
        if negative {
            seconds = -seconds;
        }
        FixedOffset::east_opt(seconds)
            .map(Some)
            .ok_or_else(|| self.datetime_error(text, "timezone offset out of range", span))
    }

    fn finish_time(
        &self,
        text: &str,
        clock: NaiveTime,
        offset: Option<FixedOffset>,
        span: Span,
    ) -> Result<PvlTime, DecodeError> {
        match offset {
            Some(offset) => {
                self.check_utc(text, offset, span)?;
                Ok(PvlTime::Aware {
                    time: clock,
                    offset,
                })
            }
            None => match self.utc_default() {
                Some(utc) => Ok(PvlTime::Aware {
                    time: clock,
                    offset: utc,
                }),
                None => Ok(PvlTime::Naive(clock)),
            },
        }
    }

    fn check_utc(&self, text: &str, offset: FixedOffset, span: Span) -> Result<(), DecodeError> {
        if self.grammar.require_utc && offset.local_minus_utc() != 0 {
            return Err(self.datetime_error(text, "only UTC times are allowed", span));
        }
        Ok(())
    }

    fn utc_default(&self) -> Option<FixedOffset> {
        if self.grammar.assume_utc {
            FixedOffset::east_opt(0)
        } else {
            None
        }
    }

    fn datetime_error(&self, text: &str, reason: &str, span: Span) -> DecodeError {
        DecodeError::DateTime {
            text: text.to_string(),
            reason: reason.to_string(),
            line: span.line,
            column: span.column,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(grammar: Grammar, word: &str) -> Result<Value, DecodeError> {
        Decoder::new(grammar).decode_word(word, Span::DUMMY)
    }

    #[test]
    fn test_booleans_per_dialect() {
        assert_eq!(decode(Grammar::pvl(), "TRUE"), Ok(Value::Boolean(true)));
        assert_eq!(decode(Grammar::omni(), "no"), Ok(Value::Boolean(false)));
        // ODL has no boolean words, so TRUE reads as a symbol.
        assert_eq!(
            decode(Grammar::odl(), "TRUE"),
            Ok(Value::Symbol("TRUE".to_string()))
        );
    }

    #[test]
    fn test_null_word() {
        assert_eq!(decode(Grammar::omni(), "NULL"), Ok(Value::Null));
        assert_eq!(
            decode(Grammar::pds3(), "NULL"),
            Ok(Value::Symbol("NULL".to_string()))
        );
    }

    #[test]
    fn test_integers() {
        assert_eq!(decode(Grammar::pvl(), "42"), Ok(Value::Integer(42)));
        assert_eq!(decode(Grammar::pvl(), "-7"), Ok(Value::Integer(-7)));
        assert_eq!(decode(Grammar::pvl(), "+5"), Ok(Value::Integer(5)));
    }

    #[test]
    fn test_integer_overflow_policy() {
        let wide = "99999999999999999999";
        assert!(matches!(
            decode(Grammar::pds3(), wide),
            Err(DecodeError::IntegerOverflow { .. })
        ));
        match decode(Grammar::omni(), wide) {
            Ok(Value::Real(v)) => assert!(v > 9.9e18),
            other => panic!("unexpected decode: {other:?}"),
        }
    }

    #[test]
    fn test_based_integers() {
        match decode(Grammar::pvl(), "2#1011#") {
            Ok(Value::BasedInteger(b)) => {
                assert_eq!(b.value, 11);
                assert_eq!(b.digits, "1011");
            }
            other => panic!("unexpected decode: {other:?}"),
        }
        match decode(Grammar::pvl(), "-16#ff#") {
            Ok(Value::BasedInteger(b)) => {
                assert_eq!(b.value, -255);
                assert!(b.negative);
            }
            other => panic!("unexpected decode: {other:?}"),
        }
        assert!(matches!(
            decode(Grammar::pvl(), "2#1019#"),
            Err(DecodeError::BasedInteger { base: 2, .. })
        ));
    }

    #[test]
    fn test_reals_and_parts() {
        assert_eq!(decode(Grammar::pvl(), "1.5"), Ok(Value::Real(1.5)));
        assert_eq!(decode(Grammar::pvl(), "-2.5E-3"), Ok(Value::Real(-0.0025)));

        let parts = RealParts::parse("-12.250e2").unwrap();
        assert!(parts.negative);
        assert_eq!(parts.integral, "12");
        assert_eq!(parts.fraction, "250");
        assert_eq!(parts.exponent, 2);
        assert_eq!(parts.value, -1225.0);
        assert!(RealParts::parse("42").is_none());
    }

    #[test]
    fn test_dates() {
        assert_eq!(
            decode(Grammar::pvl(), "2001-01-31"),
            Ok(Value::Date(NaiveDate::from_ymd_opt(2001, 1, 31).unwrap()))
        );
        assert_eq!(
            decode(Grammar::pvl(), "2001-120"),
            Ok(Value::Date(NaiveDate::from_yo_opt(2001, 120).unwrap()))
        );
        assert!(matches!(
            decode(Grammar::pvl(), "2001-02-30"),
            Err(DecodeError::DateTime { .. })
        ));
    }

    #[test]
    fn test_times_naive_and_aware() {
        match decode(Grammar::pvl(), "01:12:22") {
            Ok(Value::Time(PvlTime::Naive(t))) => {
                assert_eq!(t, NaiveTime::from_hms_opt(1, 12, 22).unwrap());
            }
            other => panic!("unexpected decode: {other:?}"),
        }
        match decode(Grammar::pvl(), "01:12:22+07:00") {
            Ok(Value::Time(PvlTime::Aware { offset, .. })) => {
                assert_eq!(offset.local_minus_utc(), 7 * 3600);
            }
            other => panic!("unexpected decode: {other:?}"),
        }
    }

    #[test]
    fn test_pds3_times_are_utc() {
        // Naive times pick up the UTC default.
        match decode(Grammar::pds3(), "01:12:22") {
            Ok(Value::Time(PvlTime::Aware { offset, .. })) => {
                assert_eq!(offset.local_minus_utc(), 0);
            }
            other => panic!("unexpected decode: {other:?}"),
        }
        // Non-UTC offsets are refused.
        assert!(matches!(
            decode(Grammar::pds3(), "01:12:22+07:00"),
            Err(DecodeError::DateTime { .. })
        ));
    }

    #[test]
    fn test_leap_second_policy() {
        assert!(decode(Grammar::pvl(), "23:59:60").is_ok());
        assert!(matches!(
            decode(Grammar::odl(), "23:59:60"),
            Err(DecodeError::DateTime { .. })
        ));
    }

    #[test]
    fn test_datetime_combined() {
        match decode(Grammar::omni(), "2001-027T23:45:01Z") {
            Ok(Value::DateTime(PvlDateTime::Aware(dt))) => {
                assert_eq!(dt.offset().local_minus_utc(), 0);
            }
            other => panic!("unexpected decode: {other:?}"),
        }
        match decode(Grammar::odl(), "2001-01-01T12:00:00") {
            Ok(Value::DateTime(PvlDateTime::Naive(_))) => {}
            other => panic!("unexpected decode: {other:?}"),
        }
    }

    #[test]
    fn test_symbols_and_identifier_rule() {
        assert_eq!(
            decode(Grammar::omni(), "N/A"),
            Ok(Value::Symbol("N/A".to_string()))
        );
        assert!(matches!(
            decode(Grammar::odl(), "N/A"),
            Err(DecodeError::Identifier { .. })
        ));
    }

    #[test]
    fn test_quoted_strings() {
        let decoder = Decoder::new(Grammar::pvl());
        assert_eq!(
            decoder.decode_quoted("\"he said \"\"hi\"\"\"", Span::DUMMY),
            Ok(Value::String("he said \"hi\"".to_string()))
        );
        assert_eq!(
            decoder.decode_quoted("'N/A'", Span::DUMMY),
            Ok(Value::Symbol("N/A".to_string()))
        );

        let decoder = Decoder::new(Grammar::odl());
        assert_eq!(
            decoder.decode_quoted(r#""tab\there""#, Span::DUMMY),
            Ok(Value::String("tab\there".to_string()))
        );
        assert!(matches!(
            decoder.decode_quoted(r#""bad\qescape""#, Span::DUMMY),
            Err(DecodeError::Escape { escape: 'q', .. })
        ));
    }
}
