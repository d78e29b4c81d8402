//! Captured-text helpers.
//!
//! Every comparison the harness performs sees text that went through [`decode_captured`], so platform line
//! endings never leak into an assertion.

use std::borrow::Cow;

/// Collapse line endings to a single `\n`.
///
/// ## Notes
/// - A run of `\r` followed by `\n` (`\r\n`, `\r\r\n`, ...) becomes one `\n`.
/// - A lone `\r` not followed by `\n` is left untouched.
/// - Idempotent: the output never contains `\r\n`, so normalizing it again returns it unchanged (and borrowed).
///
/// ## Examples
/// ```rust
/// use harness_core::normalize_newlines;
/// assert_eq!(normalize_newlines("2\r\n3\n"), "2\n3\n");
/// ```
pub fn normalize_newlines(text: &str) -> Cow<'_, str> {
    if !text.contains("\r\n") {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len());
    let mut pending_cr = 0usize;
    for ch in text.chars() {
        match ch {
            '\r' => pending_cr += 1,
            '\n' => {
                pending_cr = 0;
                out.push('\n');
            }
            other => {
                out.extend(std::iter::repeat_n('\r', pending_cr));
                pending_cr = 0;
                out.push(other);
            }
        }
    }
    out.extend(std::iter::repeat_n('\r', pending_cr));
    Cow::Owned(out)
}

/// Decode raw sink bytes into normalized text.
///
/// Invalid UTF-8 is replaced with U+FFFD instead of failing the run; the harness compares what the program
/// wrote, not whether it wrote valid text.
pub fn decode_captured(bytes: &[u8]) -> String {
    normalize_newlines(&String::from_utf8_lossy(bytes)).into_owned()
}
