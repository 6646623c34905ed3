//! Error-context extraction from source text.

/// How many characters of context to keep on either side of the anchor.
const CONTEXT_CHARS: usize = 20;

/// Returns a short slice of `source` around `offset`, for error messages.
///
/// The slice never crosses a line break and is clamped to character
/// boundaries, so it is safe to cut from the middle of multi-byte text.
pub fn context_snippet(source: &str, offset: usize) -> String {
    let mut anchor = offset.min(source.len());
    while anchor > 0 && !source.is_char_boundary(anchor) {
        anchor -= 1;
    }

    let line_start = source[..anchor].rfind('\n').map(|i| i + 1).unwrap_or(0);
    let line_end = source[anchor..]
        .find('\n')
        .map(|i| anchor + i)
        .unwrap_or(source.len());

    let before: Vec<char> = source[line_start..anchor]
        .chars()
        .rev()
        .take(CONTEXT_CHARS)
        .collect();
    let after = source[anchor..line_end].chars().take(CONTEXT_CHARS);

    before.into_iter().rev().chain(after).collect()
}
