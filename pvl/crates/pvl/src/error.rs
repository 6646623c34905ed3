//! The driver's aggregate error.

use thiserror::Error;

use pvl_enc::EncodeError;
use pvl_lex::LexError;
use pvl_par::{DecodeError, ParseError};

/// Anything that can go wrong loading or dumping a label.
#[derive(Debug, Error)]
pub enum PvlError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    /// The input bytes are not text under the requested policy.
    #[error("label is not valid {encoding} text: {reason}")]
    Encoding {
        encoding: &'static str,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
