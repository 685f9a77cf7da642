//! Character classes and value formatting for the KDL document grammar.
//!
//! See <https://kdl.dev/spec/> for the sets referenced here.

use std::fmt::{self, Write};

/// Keywords a reader would not take as a bare string.
const KEYWORDS: [&str; 6] = ["true", "false", "null", "inf", "-inf", "nan"];

/// <https://kdl.dev/spec/#newline>
pub(crate) fn is_newline(c: char) -> bool {
    matches!(
        c,
        '\r' | '\n' | '\u{85}' | '\u{0B}' | '\u{0C}' | '\u{2028}' | '\u{2029}'
    )
}

/// <https://kdl.dev/spec/#disallowed-literal-code-points>
///
/// Surrogates are part of the set but cannot occur in a `&str`.
pub(crate) fn is_disallowed_literal(c: char) -> bool {
    matches!(
        c,
        '\u{0}'..='\u{8}'
            | '\u{0E}'..='\u{1F}'
            | '\u{7F}'
            | '\u{200E}'..='\u{200F}'
            | '\u{202A}'..='\u{202E}'
            | '\u{2066}'..='\u{2069}'
            | '\u{FEFF}'
    )
}

/// <https://kdl.dev/spec/#whitespace>
pub(crate) fn is_whitespace(c: char) -> bool {
    matches!(
        c,
        '\t' | ' '
            | '\u{A0}'
            | '\u{1680}'
            | '\u{2000}'..='\u{200A}'
            | '\u{202F}'
            | '\u{205F}'
            | '\u{3000}'
    )
}

/// Characters that must be escaped inside a quoted string.
pub(crate) fn requires_escaping(c: char) -> bool {
    c == '"' || c == '\\' || is_newline(c) || is_disallowed_literal(c)
}

/// <https://kdl.dev/spec/#non-identifier-characters>
fn is_non_identifier_char(c: char) -> bool {
    matches!(
        c,
        '(' | ')' | '{' | '}' | '[' | ']' | '/' | '\\' | '"' | '#' | ';' | '='
    ) || is_whitespace(c)
        || is_newline(c)
        || is_disallowed_literal(c)
}

/// A leading digit, or a sign/dot followed by a digit, would be read as a number.
fn looks_like_number(value: &str) -> bool {
    matches!(
        value.as_bytes(),
        [b'0'..=b'9', ..]
            | [b'-' | b'+' | b'.', b'0'..=b'9', ..]
            | [b'-' | b'+', b'.', b'0'..=b'9', ..]
    )
}

/// Whether `value` can be written without quotes.
pub fn is_bare_identifier(value: &str) -> bool {
    !value.is_empty()
        && !looks_like_number(value)
        && !KEYWORDS.contains(&value)
        && !value.chars().any(is_non_identifier_char)
}

/// Write `value` as a quoted string.
///
/// `\u` escapes use the fewest hex digits unless the next literal character is
/// itself a hex digit, in which case all six are written.
pub(crate) fn write_quoted<W: Write>(out: &mut W, value: &str) -> fmt::Result {
    out.write_char('"')?;

    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' => out.write_str("\\\"")?,
            '\\' => out.write_str("\\\\")?,
            '\r' => out.write_str("\\r")?,
            '\n' => out.write_str("\\n")?,
            '\u{08}' => out.write_str("\\b")?,
            '\u{0C}' => out.write_str("\\f")?,
            c if requires_escaping(c) => {
                let next_is_hex = chars.peek().is_some_and(|next| next.is_ascii_hexdigit());
                if next_is_hex {
                    write!(out, "\\u{:06x}", u32::from(c))?;
                } else {
                    write!(out, "\\u{:x}", u32::from(c))?;
                }
            }
            c => out.write_char(c)?,
        }
    }

    out.write_char('"')
}

/// Format an integer with `_` between groups of three digits.
pub fn format_grouped(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut formatted = String::with_capacity(digits.len() + digits.len() / 3 + 1);

    if value < 0 {
        formatted.push('-');
    }
    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            formatted.push('_');
        }
        formatted.push(digit);
    }

    formatted
}
