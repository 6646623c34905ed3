//! Per-dialect formatting profiles.

use pvl_lex::Dialect;

/// The formatting and validity rules one encoder enforces.
///
/// A profile is plain data; [`Encoder`](crate::Encoder) interprets it.
/// The four constructors reproduce the published (or de-facto) layout
/// of each dialect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EncodeConfig {
    /// Which dialect's validity rules apply.
    pub dialect: Dialect,
    /// Appended to every statement, where the dialect has one.
    pub statement_delimiter: Option<&'static str>,
    /// Keyword opening an OBJECT block.
    pub object_begin: &'static str,
    /// Keyword closing an OBJECT block.
    pub object_end: &'static str,
    /// Keyword opening a GROUP block.
    pub group_begin: &'static str,
    /// Keyword closing a GROUP block.
    pub group_end: &'static str,
    /// The label-terminating keyword.
    pub end_keyword: &'static str,
    /// Uppercase parameter names (never block names).
    pub uppercase_parameters: bool,
    /// Align the `=` of consecutive assignments within a block.
    pub align_assignments: bool,
    /// Spaces per nesting level.
    pub indent_width: usize,
    /// Wrap sequence/set elements past this column.
    pub line_width: Option<usize>,
    /// Repeat the block name on its end line.
    pub end_block_names: bool,
    /// Emit a blank line after the terminating keyword.
    pub trailing_blank_after_end: bool,
    /// Restrict set elements to integers and symbols.
    pub restrict_set_elements: bool,
    /// Refuse non-UTC times.
    pub require_utc_times: bool,
    /// Maximum digits of fractional seconds, when limited.
    pub max_fraction_digits: Option<u32>,
    /// Escape quotes/backslashes with backslashes; otherwise quotes are
    /// doubled.
    pub backslash_escapes: bool,
    /// Put spaces around `/`, `*` and `**` in units expressions.
    pub space_units_operators: bool,
    /// Line terminator.
    pub newline: &'static str,
}

impl EncodeConfig {
    /// CCSDS PVL layout: `;` terminators, `BEGIN_OBJECT` keywords.
    pub const fn pvl() -> EncodeConfig {
        EncodeConfig {
            dialect: Dialect::Pvl,
            statement_delimiter: Some(";"),
            object_begin: "BEGIN_OBJECT",
            object_end: "END_OBJECT",
            group_begin: "BEGIN_GROUP",
            group_end: "END_GROUP",
            end_keyword: "END",
            uppercase_parameters: false,
            align_assignments: false,
            indent_width: 2,
            line_width: None,
            end_block_names: true,
            trailing_blank_after_end: false,
            restrict_set_elements: false,
            require_utc_times: false,
            max_fraction_digits: None,
            backslash_escapes: false,
            space_units_operators: false,
            newline: "\n",
        }
    }

    /// ODL layout: no terminators, `OBJECT` keywords, aligned `=`.
    pub const fn odl() -> EncodeConfig {
        EncodeConfig {
            dialect: Dialect::Odl,
            statement_delimiter: None,
            object_begin: "OBJECT",
            object_end: "END_OBJECT",
            group_begin: "GROUP",
            group_end: "END_GROUP",
            end_keyword: "END",
            uppercase_parameters: false,
            align_assignments: true,
            indent_width: 2,
            line_width: None,
            end_block_names: true,
            trailing_blank_after_end: false,
            restrict_set_elements: false,
            require_utc_times: false,
            max_fraction_digits: None,
            backslash_escapes: true,
            space_units_operators: false,
            newline: "\n",
        }
    }

    /// PDS3 label layout: uppercased parameters, 80-column wrapping,
    /// UTC-only millisecond times, restricted sets, trailing blank.
    pub const fn pds3() -> EncodeConfig {
        EncodeConfig {
            dialect: Dialect::Pds3,
            statement_delimiter: None,
            object_begin: "OBJECT",
            object_end: "END_OBJECT",
            group_begin: "GROUP",
            group_end: "END_GROUP",
            end_keyword: "END",
            uppercase_parameters: true,
            align_assignments: true,
            indent_width: 2,
            line_width: Some(80),
            end_block_names: true,
            trailing_blank_after_end: true,
            restrict_set_elements: true,
            require_utc_times: true,
            max_fraction_digits: Some(3),
            backslash_escapes: true,
            space_units_operators: true,
            newline: "\n",
        }
    }

    /// ISIS cube-label layout: `Object`/`End_Object`, bare end lines,
    /// `End` terminator.
    pub const fn isis() -> EncodeConfig {
        EncodeConfig {
            dialect: Dialect::Isis,
            statement_delimiter: None,
            object_begin: "Object",
            object_end: "End_Object",
            group_begin: "Group",
            group_end: "End_Group",
            end_keyword: "End",
            uppercase_parameters: false,
            align_assignments: true,
            indent_width: 2,
            line_width: None,
            end_block_names: false,
            trailing_blank_after_end: false,
            restrict_set_elements: false,
            require_utc_times: false,
            max_fraction_digits: None,
            backslash_escapes: true,
            space_units_operators: false,
            newline: "\n",
        }
    }

    /// The profile for a dialect, or `None` for the parse-only Omni.
    pub const fn for_dialect(dialect: Dialect) -> Option<EncodeConfig> {
        match dialect {
            Dialect::Pvl => Some(EncodeConfig::pvl()),
            Dialect::Odl => Some(EncodeConfig::odl()),
            Dialect::Pds3 => Some(EncodeConfig::pds3()),
            Dialect::Isis => Some(EncodeConfig::isis()),
            Dialect::Omni => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profiles_match_their_dialect() {
        assert_eq!(EncodeConfig::pvl().dialect, Dialect::Pvl);
        assert_eq!(EncodeConfig::pds3().dialect, Dialect::Pds3);
        assert_eq!(EncodeConfig::isis().end_keyword, "End");
    }

    #[test]
    fn test_omni_has_no_profile() {
        assert!(EncodeConfig::for_dialect(Dialect::Omni).is_none());
        assert!(EncodeConfig::for_dialect(Dialect::Odl).is_some());
    }
}
