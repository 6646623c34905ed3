//! Encoding errors.

use pvl_lex::Dialect;
use thiserror::Error;

/// A dialect-validity violation found while writing a label.
///
/// The encoder fails fast: it never silently transforms a value to make
/// it fit the requested dialect. `path` names the offending parameter
/// (dotted through enclosing blocks), `rule` the violated rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot encode {path} under the {dialect} dialect: {rule}")]
pub struct EncodeError {
    pub path: String,
    pub rule: String,
    pub dialect: Dialect,
}

impl EncodeError {
    pub(crate) fn new(path: &[String], rule: impl Into<String>, dialect: Dialect) -> Self {
        let path = if path.is_empty() {
            "<label>".to_string()
        } else {
            path.join(".")
        };
        Self {
            path,
            rule: rule.into(),
            dialect,
        }
    }
}
