//! Turning raw label bytes into text.
//!
//! Archive products routinely append binary image data after the text
//! label. Decoding must therefore tolerate non-text bytes: the default
//! policy first tries UTF-8 and then falls back to byte-wise ASCII,
//! substituting `U+FFFD` for every non-ASCII byte. The substitute is a
//! reserved character in every grammar, so it can never extend a token
//! — and since the parser stops at the first top-level `END`, the
//! binary tail is never tokenized at all.

use std::borrow::Cow;

use crate::error::PvlError;

/// How to decode label bytes into text.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextPolicy {
    /// UTF-8, falling back to byte-wise ASCII with `U+FFFD`
    /// substitution when the input is not valid UTF-8.
    #[default]
    Utf8OrAsciiReplace,
    /// Strict UTF-8; invalid input is an error.
    Utf8,
}

/// Decodes label bytes under `policy`.
pub fn decode_label_bytes(bytes: &[u8], policy: TextPolicy) -> Result<Cow<'_, str>, PvlError> {
    match std::str::from_utf8(bytes) {
        Ok(text) => Ok(Cow::Borrowed(text)),
        Err(e) => match policy {
            TextPolicy::Utf8 => Err(PvlError::Encoding {
                encoding: "UTF-8",
                reason: e.to_string(),
            }),
            TextPolicy::Utf8OrAsciiReplace => Ok(Cow::Owned(ascii_replace(bytes))),
        },
    }
}

fn ascii_replace(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|&b| {
            if b.is_ascii() {
                b as char
            } else {
                '\u{fffd}'
            }
        })
        .collect()
}
