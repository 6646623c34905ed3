//! Syntactic shapes of unquoted scalars.
//!
//! The decoder asks these predicates whether a word has the shape of an
//! integer, a real, a based integer, or a date/time before it commits to
//! a conversion. Each rule is a total character walk: no backtracking,
//! no partial matches. Field validation (month in range, base digits
//! legal) is the decoder's job; only shape is judged here.

/// `[+-]? digit+`
pub fn is_decimal_integer(s: &str) -> bool {
    let digits = strip_sign(s);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// `[+-]? (digit+ [.digit*] | .digit+) [(e|E) [+-]? digit+]`
///
/// A word qualifies only if it carries a decimal point or an exponent;
/// plain digit runs are integers.
pub fn is_real(s: &str) -> bool {
    let body = strip_sign(s);
    let (mantissa, exponent) = match body.find(['e', 'E']) {
        Some(i) => (&body[..i], Some(&body[i + 1..])),
        None => (body, None),
    };
    if let Some(exp) = exponent {
        let exp_digits = strip_sign(exp);
        if exp_digits.is_empty() || !exp_digits.bytes().all(|b| b.is_ascii_digit()) {
            return false;
        }
    }
    let (integral, fraction) = match mantissa.find('.') {
        Some(i) => (&mantissa[..i], Some(&mantissa[i + 1..])),
        None => (mantissa, None),
    };
    if fraction.is_none() && exponent.is_none() {
        return false;
    }
    if !integral.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    if let Some(frac) = fraction {
        if !frac.bytes().all(|b| b.is_ascii_digit()) {
            return false;
        }
        if integral.is_empty() && frac.is_empty() {
            return false;
        }
    } else if integral.is_empty() {
        return false;
    }
    true
}

/// The pieces of a `base#digits#` literal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BasedParts<'a> {
    /// Whether a leading `-` was written.
    pub negative: bool,
    /// The radix, 2 through 16.
    pub base: u32,
    /// The digit run between the octothorpes, verbatim.
    pub digits: &'a str,
}

/// Splits `[+-]? base # digits #` or returns `None` when the shape does
/// not match. The base must be 2..=16; the digits must be a non-empty
/// alphanumeric run (whether each digit is legal for the base is checked
/// by the decoder).
pub fn based_integer_parts(s: &str) -> Option<BasedParts<'_>> {
    let negative = s.starts_with('-');
    let body = strip_sign(s);
    let open = body.find('#')?;
    let radix = &body[..open];
    if radix.is_empty() || !radix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let base: u32 = radix.parse().ok()?;
    if !(2..=16).contains(&base) {
        return None;
    }
    let rest = &body[open + 1..];
    let digits = rest.strip_suffix('#')?;
    if digits.is_empty() || digits.contains('#') {
        return None;
    }
    if !digits.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return None;
    }
    Some(BasedParts {
        negative,
        base,
        digits,
    })
}

/// The ODL identifier rule: a letter followed by letters, digits, or
/// underscores.
pub fn is_odl_identifier(s: &str) -> bool {
    let mut bytes = s.bytes();
    match bytes.next() {
        Some(b) if b.is_ascii_alphabetic() => {}
        _ => return false,
    }
    bytes.all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

/// The date half of an ISO-8601 subset: `YYYY-MM-DD` or `YYYY-DOY`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateParts<'a> {
    pub year: &'a str,
    /// Month and day for the calendar form.
    pub month_day: Option<(&'a str, &'a str)>,
    /// Day-of-year for the ordinal form.
    pub day_of_year: Option<&'a str>,
}

/// The time half: `HH:MM[:SS[.fff...]]` plus an optional offset suffix.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeParts<'a> {
    pub hour: &'a str,
    pub minute: &'a str,
    pub second: Option<&'a str>,
    pub fraction: Option<&'a str>,
    /// `Z` or `[+-]HH[:MM]`, verbatim.
    pub offset: Option<&'a str>,
}

/// A word shaped like a date, a time, or a date `T` time combination.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DateTimeShape<'a> {
    Date(DateParts<'a>),
    Time(TimeParts<'a>),
    DateTime(DateParts<'a>, TimeParts<'a>),
}

/// Judges whether `s` has a date/time shape and splits it into parts.
pub fn datetime_shape(s: &str) -> Option<DateTimeShape<'_>> {
    if let Some(t) = s.find(['T', 't']) {
        let date = date_parts(&s[..t])?;
        let time = time_parts(&s[t + 1..])?;
        return Some(DateTimeShape::DateTime(date, time));
    }
    if let Some(date) = date_parts(s) {
        return Some(DateTimeShape::Date(date));
    }
    time_parts(s).map(DateTimeShape::Time)
}

fn date_parts(s: &str) -> Option<DateParts<'_>> {
    let mut fields = s.split('-');
    let year = fields.next()?;
    if year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let second = fields.next()?;
    match fields.next() {
        // YYYY-MM-DD
        Some(day) => {
            if fields.next().is_some() {
                return None;
            }
            if second.len() != 2 || day.len() != 2 {
                return None;
            }
            if !second.bytes().all(|b| b.is_ascii_digit())
                || !day.bytes().all(|b| b.is_ascii_digit())
            {
                return None;
            }
            Some(DateParts {
                year,
                month_day: Some((second, day)),
                day_of_year: None,
            })
        }
        // YYYY-DOY
        None => {
            if second.len() != 3 || !second.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            Some(DateParts {
                year,
                month_day: None,
                day_of_year: Some(second),
            })
        }
    }
}

fn time_parts(s: &str) -> Option<TimeParts<'_>> {
    let (clock, offset) = split_offset(s);
    let mut fields = clock.split(':');
    let hour = fields.next()?;
    let minute = fields.next()?;
    if hour.len() != 2 || minute.len() != 2 {
        return None;
    }
    if !hour.bytes().all(|b| b.is_ascii_digit()) || !minute.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let (second, fraction) = match fields.next() {
        Some(sec_field) => {
            if fields.next().is_some() {
                return None;
            }
            let (sec, frac) = match sec_field.find('.') {
                Some(i) => (&sec_field[..i], Some(&sec_field[i + 1..])),
                None => (sec_field, None),
            };
            if sec.len() != 2 || !sec.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            if let Some(frac) = frac {
                if frac.is_empty() || !frac.bytes().all(|b| b.is_ascii_digit()) {
                    return None;
                }
            }
            (Some(sec), frac)
        }
        None => (None, None),
    };
    Some(TimeParts {
        hour,
        minute,
        second,
        fraction,
        offset,
    })
}

/// Cuts a trailing `Z` or `[+-]HH[:MM]` offset off a clock string.
fn split_offset(s: &str) -> (&str, Option<&str>) {
    if let Some(clock) = s.strip_suffix(['Z', 'z']) {
        return (clock, Some("Z"));
    }
    // A sign can only introduce an offset after the hour:minute core, so
    // search from the first colon onward.
    if let Some(colon) = s.find(':') {
        if let Some(rel) = s[colon..].find(['+', '-']) {
            let at = colon + rel;
            return (&s[..at], Some(&s[at..]));
        }
    }
    (s, None)
}

fn strip_sign(s: &str) -> &str {
    s.strip_prefix(['+', '-']).unwrap_or(s)
}
