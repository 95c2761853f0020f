//! Character-level preprocessing: newline normalization, comment stripping,
//! backslash-escape decoding.
//!
//! The scanner runs before the tokenizer. Newline normalization maps all of
//! CRLF, CR, and FF to a single LF so that the tokenizer only ever has to
//! reason about `\n`. Comment stripping is optional; the tokenizer also emits
//! [`Comment`](crate::tokenizer::TokenKind::Comment) tokens, which the parser
//! skips, so most callers never need it.

use std::borrow::Cow;
use std::iter::Peekable;
use std::str::Chars;

/// Normalize line endings: `\r\n`, `\r`, and `\x0c` (form feed) become `\n`.
///
/// Returns the input unchanged (borrowed) when it contains none of those
/// characters, which is the common case.
pub fn normalize(input: &str) -> Cow<'_, str> {
    if !input.contains(['\r', '\x0c']) {
        return Cow::Borrowed(input);
    }

    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                out.push('\n');
            }
            '\x0c' => out.push('\n'),
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Strip block comments (`/* ... */`) from the input, replacing each comment
/// with a single space. An unterminated comment consumes the rest of the input.
///
/// This works on raw text and is not string-literal aware: a `/*` inside a
/// quoted string is treated as a comment opener. Callers that need exact
/// string handling should tokenize instead and skip `Comment` tokens.
pub fn strip_comments(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("/*") {
        result.push_str(&rest[..start]);
        result.push(' ');
        rest = match rest[start + 2..].find("*/") {
            Some(end) => &rest[start + 2 + end + 2..],
            None => "",
        };
    }
    result.push_str(rest);
    result
}

/// Decode a hex escape after the backslash has been consumed.
///
/// Reads up to six hex digits plus one optional trailing whitespace character
/// (which terminates the escape, per CSS). Invalid code points decode to
/// U+FFFD.
pub(crate) fn decode_hex_escape(chars: &mut Peekable<Chars<'_>>) -> char {
    let mut code = 0u32;
    let mut digits = 0;
    while digits < 6 {
        match chars.peek().and_then(|c| c.to_digit(16)) {
            Some(d) => {
                code = code * 16 + d;
                chars.next();
                digits += 1;
            }
            None => break,
        }
    }
    if chars.peek().is_some_and(|c| c.is_whitespace()) {
        chars.next();
    }
    char::from_u32(code).unwrap_or('\u{fffd}')
}

/// Decode backslash escapes in an identifier-like chunk of text.
///
/// `\` followed by hex digits is a hex escape; `\` followed by anything else
/// yields that character literally. A trailing lone `\` is kept as-is.
pub(crate) fn decode_escapes(raw: &str) -> String {
    if !raw.contains('\\') {
        return raw.to_owned();
    }

    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.peek().copied() {
            None => out.push('\\'),
            Some(d) if d.is_ascii_hexdigit() => out.push(decode_hex_escape(&mut chars)),
            Some(d) => {
                chars.next();
                out.push(d);
            }
        }
    }
    out
}
