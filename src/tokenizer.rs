//! logos-based CSS tokenizer.
//!
//! The lexer never fails: malformed constructs degrade to a best-effort token
//! (an unterminated string still yields a `String` token with the text read so
//! far, an unmatched character becomes a `Delim`). Token priority in logos is
//! determined by longest match first, then explicit `priority` for ties.
//!
//! Our ordering ensures:
//! - `16km` matches one [`TokenKind::Dimension`], not `Number` + `Ident`
//! - `50%` matches [`TokenKind::Percentage`], not `Number` + `Delim`
//! - `url(` starts a [`TokenKind::Url`] token, not a `Function`
//! - `+2` matches a signed `Number`, so `1+2` lexes as two numbers — this is
//!   a documented property of the grammar, callers that want an operator must
//!   put whitespace after the sign
//!
//! The tokenizer expects newline-normalized input (see [`crate::scanner`]).

use std::fmt;

use logos::Logos;

use crate::scanner::{decode_escapes, decode_hex_escape};

/// The public classification of a [`Token`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Identifier such as `color`, `-moz-thing`, or `--custom-prop`.
    Ident,
    /// `@`-prefixed keyword such as `@media`.
    AtKeyword,
    /// Quoted string. May be unterminated; see [`Token::is_complete`].
    String,
    /// `url(...)` literal.
    Url,
    /// `#`-prefixed name such as `#sidebar`.
    Hash,
    /// Plain number, including the literals `INF`, `-INF`, and `NaN`.
    Number,
    /// Number followed by `%`.
    Percentage,
    /// Number followed by a unit identifier, e.g. `16km`.
    Dimension,
    /// Identifier immediately followed by `(`, e.g. `calc(`.
    Function,
    /// Any single punctuation character: `{`, `}`, `;`, `>`, `+`, ...
    Delim,
    /// Block comment `/* ... */`.
    Comment,
    /// `<!--` (legacy SGML comment open, passed through).
    Cdo,
    /// `-->` (legacy SGML comment close, passed through).
    Cdc,
    /// A run of whitespace.
    Whitespace,
    /// End of input. Produced only by the parser's sentinel, never by
    /// [`tokenize`].
    Eof,
}

/// One lexical unit.
///
/// `text` is always the raw source slice (or a synthesized rendering for
/// tokens produced by the function evaluator), so concatenating the `text` of
/// a token stream reconstructs the input.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Raw source text of the token.
    pub text: String,
    /// Numeric value for `Number` / `Percentage` / `Dimension`.
    pub value: Option<f64>,
    /// Unit suffix for `Dimension` (e.g. `"km"`).
    pub unit: Option<String>,
    /// Decoded payload: string contents, identifier with escapes resolved,
    /// function/at-keyword/hash name, URL body, comment body.
    pub string: Option<String>,
    /// Byte offset of the token start in the normalized source.
    pub offset: usize,
    complete: bool,
}

impl Token {
    fn new(kind: TokenKind, text: &str, offset: usize) -> Self {
        Self {
            kind,
            text: text.to_owned(),
            value: None,
            unit: None,
            string: None,
            offset,
            complete: true,
        }
    }

    /// Synthesize a quoted string token.
    pub fn string(value: impl Into<String>) -> Self {
        let value = value.into();
        let text = format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""));
        Self {
            string: Some(value),
            ..Self::new(TokenKind::String, &text, 0)
        }
    }

    /// Synthesize a plain number token.
    pub fn number(value: f64) -> Self {
        Self {
            value: Some(value),
            ..Self::new(TokenKind::Number, &fmt_number(value), 0)
        }
    }

    /// Synthesize a percentage token.
    pub fn percentage(value: f64) -> Self {
        Self {
            value: Some(value),
            ..Self::new(TokenKind::Percentage, &format!("{}%", fmt_number(value)), 0)
        }
    }

    /// Synthesize a dimension token.
    pub fn dimension(value: f64, unit: impl Into<String>) -> Self {
        let unit = unit.into();
        Self {
            value: Some(value),
            unit: Some(unit.clone()),
            ..Self::new(TokenKind::Dimension, &format!("{}{unit}", fmt_number(value)), 0)
        }
    }

    /// Synthesize an identifier token.
    pub fn ident(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            string: Some(name.clone()),
            ..Self::new(TokenKind::Ident, &name, 0)
        }
    }

    /// Synthesize an end-of-input sentinel at the given offset.
    pub(crate) fn eof(offset: usize) -> Self {
        Self::new(TokenKind::Eof, "", offset)
    }

    /// `true` if this is a `Delim` token for exactly the given character.
    pub fn is_delim(&self, c: char) -> bool {
        self.kind == TokenKind::Delim && self.text.chars().eq(std::iter::once(c))
    }

    /// `false` for strings, urls, and comments that ran into a newline or the
    /// end of input before their closing delimiter. Such tokens still carry
    /// the text collected up to that point.
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// `true` for whitespace and comment tokens, which carry no meaning for
    /// the parser beyond separating other tokens.
    pub fn is_trivia(&self) -> bool {
        matches!(self.kind, TokenKind::Whitespace | TokenKind::Comment)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Render a numeric value the way the tokenizer would have read it: integers
/// without a fraction, the special values as `INF` / `-INF` / `NaN`.
pub(crate) fn fmt_number(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_owned()
    } else if value == f64::INFINITY {
        "INF".to_owned()
    } else if value == f64::NEG_INFINITY {
        "-INF".to_owned()
    } else if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

/// Internal lexeme classification; collapsed into [`TokenKind`] by
/// [`tokenize`]. Punctuation variants all surface as `Delim`.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
enum Lexeme {
    #[regex(r"[ \t\n\r\x0c]+")]
    Whitespace,

    #[regex(r"/\*", lex_comment)]
    Comment,

    #[token("<!--")]
    Cdo,

    #[token("-->")]
    Cdc,

    #[regex(r#"["']"#, lex_string)]
    QuotedString,

    #[regex(r"[uU][rR][lL]\(", lex_url, priority = 20)]
    Url,

    #[regex(
        r"[+-]?([0-9]+(\.[0-9]+)?|\.[0-9]+)([eE][+-]?[0-9]+)?%",
        priority = 12
    )]
    Percentage,

    #[regex(
        r"[+-]?([0-9]+(\.[0-9]+)?|\.[0-9]+)([eE][+-]?[0-9]+)?",
        priority = 11
    )]
    Number,

    #[regex(
        r"[+-]?([0-9]+(\.[0-9]+)?|\.[0-9]+)([eE][+-]?[0-9]+)?-?-?([A-Za-z_]|\\[^\n\r\x0c])([0-9A-Za-z_-]|\\[^\n\r\x0c])*",
        priority = 10
    )]
    Dimension,

    #[regex(r"@-?-?([A-Za-z_]|\\[^\n\r\x0c])([0-9A-Za-z_-]|\\[^\n\r\x0c])*")]
    AtKeyword,

    #[regex(r"#([0-9A-Za-z_-]|\\[^\n\r\x0c])+")]
    Hash,

    #[regex(
        r"-?-?([A-Za-z_]|\\[^\n\r\x0c])([0-9A-Za-z_-]|\\[^\n\r\x0c])*\(",
        priority = 6
    )]
    Function,

    #[regex(
        r"-?-?([A-Za-z_]|\\[^\n\r\x0c])([0-9A-Za-z_-]|\\[^\n\r\x0c])*",
        priority = 5
    )]
    Ident,

    // ── Punctuation (all map to TokenKind::Delim) ────────────────────
    #[token("{")]
    BraceOpen,
    #[token("}")]
    BraceClose,
    #[token("(")]
    ParenOpen,
    #[token(")")]
    ParenClose,
    #[token("[")]
    BracketOpen,
    #[token("]")]
    BracketClose,
    #[token(";")]
    Semicolon,
    #[token(":")]
    Colon,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token(">")]
    GreaterThan,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("~")]
    Tilde,
    #[token("*")]
    Star,
    #[token("=")]
    Equals,
    #[token("|")]
    Pipe,
    #[token("^")]
    Caret,
    #[token("$")]
    Dollar,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
}

/// Consume the remainder of a `/* ... */` comment. EOF closes it silently.
fn lex_comment(lex: &mut logos::Lexer<'_, Lexeme>) {
    let rem = lex.remainder();
    match rem.find("*/") {
        Some(i) => lex.bump(i + 2),
        None => lex.bump(rem.len()),
    }
}

/// Given the text after an opening quote, return the number of bytes that
/// belong to the string body (including the closing quote if found). An
/// unescaped newline terminates the string without being consumed.
fn scan_string_body(rest: &str, quote: char) -> usize {
    let mut chars = rest.char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            '\\' => {
                chars.next();
            }
            '\n' => return i,
            c if c == quote => return i + c.len_utf8(),
            _ => {}
        }
    }
    rest.len()
}

fn lex_string(lex: &mut logos::Lexer<'_, Lexeme>) {
    let quote = lex.slice().chars().next().unwrap_or('"');
    let n = scan_string_body(lex.remainder(), quote);
    lex.bump(n);
}

/// Consume the body of `url(...)`: optional whitespace, a quoted string or a
/// raw run of characters, optional whitespace, and the closing paren if it is
/// there. A missing `)` just ends the token at EOF.
fn lex_url(lex: &mut logos::Lexer<'_, Lexeme>) {
    let rem = lex.remainder();
    let bytes = rem.as_bytes();
    let is_ws = |b: u8| matches!(b, b' ' | b'\t' | b'\n' | b'\r' | 0x0c);

    let mut i = 0;
    while i < bytes.len() && is_ws(bytes[i]) {
        i += 1;
    }

    if i < bytes.len() && (bytes[i] == b'"' || bytes[i] == b'\'') {
        let quote = bytes[i] as char;
        i += 1;
        i += scan_string_body(&rem[i..], quote);
        while i < bytes.len() && is_ws(bytes[i]) {
            i += 1;
        }
        if i < bytes.len() && bytes[i] == b')' {
            i += 1;
        }
    } else {
        while i < bytes.len() && bytes[i] != b')' {
            i += 1;
        }
        if i < bytes.len() {
            i += 1;
        }
    }
    lex.bump(i);
}

/// Split a numeric literal into its number prefix and the remaining unit text.
/// The prefix follows the token grammar (sign, digits, fraction, exponent), so
/// `16km` splits into `("16", "km")` and `3.5e2mm` into `("3.5e2", "mm")`.
fn split_numeric(text: &str) -> (&str, &str) {
    let bytes = text.as_bytes();
    let mut i = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        i += 1;
    }
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    if i + 1 < bytes.len() && bytes[i] == b'.' && bytes[i + 1].is_ascii_digit() {
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
    }
    if i < bytes.len() && matches!(bytes[i], b'e' | b'E') {
        let mut j = i + 1;
        if j < bytes.len() && matches!(bytes[j], b'+' | b'-') {
            j += 1;
        }
        if j < bytes.len() && bytes[j].is_ascii_digit() {
            i = j;
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
        }
    }
    (&text[..i], &text[i..])
}

/// Decode the body of a quoted string token. Returns the decoded text and
/// whether the closing quote was present.
fn decode_string(raw: &str) -> (String, bool) {
    let mut chars = raw.chars().peekable();
    let quote = match chars.next() {
        Some(q) => q,
        None => return (String::new(), false),
    };

    let mut out = String::new();
    while let Some(c) = chars.next() {
        if c == quote {
            return (out, true);
        }
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.peek().copied() {
            None => {}
            // Backslash-newline is a line continuation: both disappear.
            Some('\n') => {
                chars.next();
            }
            Some(d) if d.is_ascii_hexdigit() => out.push(decode_hex_escape(&mut chars)),
            Some(d) => {
                chars.next();
                out.push(d);
            }
        }
    }
    (out, false)
}

/// Decode a `url(...)` token. Returns the body and whether the closing paren
/// was present.
fn decode_url(raw: &str) -> (String, bool) {
    let mut body = &raw[4..];
    let terminated = body.ends_with(')');
    if terminated {
        body = &body[..body.len() - 1];
    }
    let body = body.trim_matches(|c: char| matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0c'));

    match body.chars().next() {
        Some(q @ ('"' | '\'')) => {
            let (s, inner_terminated) = decode_string(body);
            let _ = q;
            (s, terminated && inner_terminated)
        }
        _ => (decode_escapes(body), terminated),
    }
}

fn parse_number(text: &str) -> Option<f64> {
    text.parse::<f64>().ok()
}

fn token_from(lexeme: Lexeme, slice: &str, offset: usize) -> Token {
    match lexeme {
        Lexeme::Whitespace => Token::new(TokenKind::Whitespace, slice, offset),
        Lexeme::Comment => {
            let complete = slice.len() >= 4 && slice.ends_with("*/");
            let inner = if complete {
                &slice[2..slice.len() - 2]
            } else {
                &slice[2..]
            };
            Token {
                string: Some(inner.to_owned()),
                complete,
                ..Token::new(TokenKind::Comment, slice, offset)
            }
        }
        Lexeme::Cdo => Token::new(TokenKind::Cdo, slice, offset),
        Lexeme::Cdc => Token::new(TokenKind::Cdc, slice, offset),
        Lexeme::QuotedString => {
            let (value, complete) = decode_string(slice);
            Token {
                string: Some(value),
                complete,
                ..Token::new(TokenKind::String, slice, offset)
            }
        }
        Lexeme::Url => {
            let (value, complete) = decode_url(slice);
            Token {
                string: Some(value),
                complete,
                ..Token::new(TokenKind::Url, slice, offset)
            }
        }
        Lexeme::Percentage => Token {
            value: parse_number(&slice[..slice.len() - 1]),
            ..Token::new(TokenKind::Percentage, slice, offset)
        },
        Lexeme::Number => Token {
            value: parse_number(slice),
            ..Token::new(TokenKind::Number, slice, offset)
        },
        Lexeme::Dimension => {
            let (num, unit) = split_numeric(slice);
            Token {
                value: parse_number(num),
                unit: Some(decode_escapes(unit)),
                ..Token::new(TokenKind::Dimension, slice, offset)
            }
        }
        Lexeme::AtKeyword => Token {
            string: Some(decode_escapes(&slice[1..])),
            ..Token::new(TokenKind::AtKeyword, slice, offset)
        },
        Lexeme::Hash => Token {
            string: Some(decode_escapes(&slice[1..])),
            ..Token::new(TokenKind::Hash, slice, offset)
        },
        Lexeme::Function => Token {
            string: Some(decode_escapes(&slice[..slice.len() - 1])),
            ..Token::new(TokenKind::Function, slice, offset)
        },
        Lexeme::Ident => {
            let name = decode_escapes(slice);
            // The numeric literal vocabulary includes these three idents.
            let special = match name.as_str() {
                "INF" => Some(f64::INFINITY),
                "-INF" => Some(f64::NEG_INFINITY),
                "NaN" => Some(f64::NAN),
                _ => None,
            };
            match special {
                Some(value) => Token {
                    value: Some(value),
                    ..Token::new(TokenKind::Number, slice, offset)
                },
                None => Token {
                    string: Some(name),
                    ..Token::new(TokenKind::Ident, slice, offset)
                },
            }
        }
        _ => Token::new(TokenKind::Delim, slice, offset),
    }
}

/// Tokenize input into a flat token list. Never fails; characters no rule
/// matches become individual `Delim` tokens.
///
/// The input should already be newline-normalized (see
/// [`scanner::normalize`](crate::scanner::normalize)); [`crate::parse`] takes
/// care of that.
pub fn tokenize(input: &str) -> Vec<Token> {
    let mut out = Vec::new();
    let mut lexer = Lexeme::lexer(input);
    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let slice = &input[span.clone()];
        match result {
            Ok(lexeme) => out.push(token_from(lexeme, slice, span.start)),
            Err(()) => {
                let mut offset = span.start;
                for c in slice.chars() {
                    out.push(Token::new(TokenKind::Delim, c.encode_utf8(&mut [0; 4]), offset));
                    offset += c.len_utf8();
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        tokenize(input)
            .into_iter()
            .filter(|t| t.kind != TokenKind::Whitespace)
            .map(|t| t.kind)
            .collect()
    }

    fn one(input: &str) -> Token {
        let tokens = tokenize(input);
        assert_eq!(tokens.len(), 1, "expected one token for {input:?}: {tokens:?}");
        tokens.into_iter().next().unwrap()
    }

    // ── Numbers, percentages, dimensions ─────────────────────────────

    #[test]
    fn dimension_with_unit() {
        let t = one("16km");
        assert_eq!(t.kind, TokenKind::Dimension);
        assert_eq!(t.value, Some(16.0));
        assert_eq!(t.unit.as_deref(), Some("km"));
    }

    #[test]
    fn percentage() {
        let t = one("50%");
        assert_eq!(t.kind, TokenKind::Percentage);
        assert_eq!(t.value, Some(50.0));
    }

    #[test]
    fn plain_number() {
        let t = one("3.5");
        assert_eq!(t.kind, TokenKind::Number);
        assert_eq!(t.value, Some(3.5));
    }

    #[test]
    fn signed_numbers() {
        let t = one("-5");
        assert_eq!(t.value, Some(-5.0));
        let t = one("+2");
        assert_eq!(t.value, Some(2.0));
    }

    #[test]
    fn exponent_is_number_not_dimension() {
        let t = one("1e5");
        assert_eq!(t.kind, TokenKind::Number);
        assert_eq!(t.value, Some(1e5));
    }

    #[test]
    fn em_unit_is_dimension_not_exponent() {
        let t = one("16em");
        assert_eq!(t.kind, TokenKind::Dimension);
        assert_eq!(t.unit.as_deref(), Some("em"));
    }

    #[test]
    fn leading_dot_number() {
        assert_eq!(one(".5").value, Some(0.5));
    }

    #[test]
    fn adjacent_signed_number_absorbs_plus() {
        // `1+2` is two numbers; the `+` belongs to the second one.
        let tokens = tokenize("1+2");
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].value, Some(1.0));
        assert_eq!(tokens[1].value, Some(2.0));
    }

    #[test]
    fn spaced_plus_is_delim() {
        let tokens = tokenize("1 + 2");
        assert_eq!(tokens.len(), 5);
        assert!(tokens[2].is_delim('+'));
    }

    #[test]
    fn special_numeric_literals() {
        assert_eq!(one("INF").value, Some(f64::INFINITY));
        assert_eq!(one("-INF").value, Some(f64::NEG_INFINITY));
        assert_eq!(one("INF").kind, TokenKind::Number);
        assert!(one("NaN").value.unwrap().is_nan());
    }

    // ── Strings ──────────────────────────────────────────────────────

    #[test]
    fn double_quoted_string() {
        let t = one("\"hello\"");
        assert_eq!(t.kind, TokenKind::String);
        assert_eq!(t.string.as_deref(), Some("hello"));
        assert!(t.is_complete());
    }

    #[test]
    fn single_quoted_string() {
        let t = one("'world'");
        assert_eq!(t.string.as_deref(), Some("world"));
    }

    #[test]
    fn unterminated_string_at_eof() {
        let t = one("'hello");
        assert_eq!(t.kind, TokenKind::String);
        assert_eq!(t.string.as_deref(), Some("hello"));
        assert!(!t.is_complete());
    }

    #[test]
    fn string_stops_at_newline() {
        let tokens = tokenize("'ab\ncd");
        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(tokens[0].string.as_deref(), Some("ab"));
        assert!(!tokens[0].is_complete());
        // The newline and `cd` are lexed normally afterwards.
        assert_eq!(tokens[1].kind, TokenKind::Whitespace);
        assert_eq!(tokens[2].string.as_deref(), Some("cd"));
    }

    #[test]
    fn string_line_continuation() {
        let t = one("'ab\\\ncd'");
        assert_eq!(t.string.as_deref(), Some("abcd"));
        assert!(t.is_complete());
    }

    #[test]
    fn string_escaped_quote() {
        let t = one(r#""a\"b""#);
        assert_eq!(t.string.as_deref(), Some("a\"b"));
    }

    #[test]
    fn string_with_other_quote_kind() {
        let t = one(r#""it's""#);
        assert_eq!(t.string.as_deref(), Some("it's"));
    }

    // ── Identifiers, functions, hashes ───────────────────────────────

    #[test]
    fn idents() {
        let t = one("-moz-thing");
        assert_eq!(t.kind, TokenKind::Ident);
        assert_eq!(t.string.as_deref(), Some("-moz-thing"));
    }

    #[test]
    fn custom_property_ident() {
        let t = one("--accent");
        assert_eq!(t.kind, TokenKind::Ident);
        assert_eq!(t.string.as_deref(), Some("--accent"));
    }

    #[test]
    fn ident_with_escape() {
        let t = one(r"a\.b");
        assert_eq!(t.string.as_deref(), Some("a.b"));
    }

    #[test]
    fn function_token() {
        let t = one("calc(");
        assert_eq!(t.kind, TokenKind::Function);
        assert_eq!(t.string.as_deref(), Some("calc"));
    }

    #[test]
    fn hash_token() {
        let t = one("#sidebar");
        assert_eq!(t.kind, TokenKind::Hash);
        assert_eq!(t.string.as_deref(), Some("sidebar"));
    }

    #[test]
    fn at_keyword() {
        let t = one("@media");
        assert_eq!(t.kind, TokenKind::AtKeyword);
        assert_eq!(t.string.as_deref(), Some("media"));
    }

    // ── url() ────────────────────────────────────────────────────────

    #[test]
    fn unquoted_url() {
        let t = one("url( http://example.com/a.png )");
        assert_eq!(t.kind, TokenKind::Url);
        assert_eq!(t.string.as_deref(), Some("http://example.com/a.png"));
        assert!(t.is_complete());
    }

    #[test]
    fn quoted_url() {
        let t = one("url('a b.png')");
        assert_eq!(t.string.as_deref(), Some("a b.png"));
    }

    #[test]
    fn quoted_url_with_paren_in_body() {
        let t = one(r#"url("a)b")"#);
        assert_eq!(t.string.as_deref(), Some("a)b"));
        assert!(t.is_complete());
    }

    #[test]
    fn unterminated_url() {
        let t = one("url(abc");
        assert_eq!(t.kind, TokenKind::Url);
        assert_eq!(t.string.as_deref(), Some("abc"));
        assert!(!t.is_complete());
    }

    #[test]
    fn url_case_insensitive() {
        assert_eq!(one("URL(x)").kind, TokenKind::Url);
    }

    // ── Comments, CDO/CDC, delimiters ────────────────────────────────

    #[test]
    fn comment_token() {
        let t = one("/* hi */");
        assert_eq!(t.kind, TokenKind::Comment);
        assert_eq!(t.string.as_deref(), Some(" hi "));
        assert!(t.is_complete());
    }

    #[test]
    fn unterminated_comment() {
        let t = one("/* hi");
        assert_eq!(t.kind, TokenKind::Comment);
        assert!(!t.is_complete());
    }

    #[test]
    fn comments_do_not_nest() {
        let kinds = kinds("/* a /* b */ c */");
        assert_eq!(kinds[0], TokenKind::Comment);
        // `c` and the stray `*/` lex as ordinary tokens.
        assert_eq!(kinds[1], TokenKind::Ident);
    }

    #[test]
    fn cdo_cdc() {
        assert_eq!(kinds("<!-- -->"), vec![TokenKind::Cdo, TokenKind::Cdc]);
    }

    #[test]
    fn punctuation_is_delim() {
        for c in ['{', '}', '(', ')', '[', ']', ';', ':', ',', '.', '>', '+', '~', '*'] {
            let t = one(&c.to_string());
            assert!(t.is_delim(c), "expected {c:?} to be a delim");
        }
    }

    #[test]
    fn unknown_char_degrades_to_delim() {
        let t = one("§");
        assert_eq!(t.kind, TokenKind::Delim);
        assert_eq!(t.text, "§");
    }

    #[test]
    fn never_fails_on_garbage() {
        // No panic, every byte accounted for.
        let input = "@@ §§ '' url( /* \\";
        let total: usize = tokenize(input).iter().map(|t| t.text.len()).sum();
        assert_eq!(total, input.len());
    }

    // ── Reconstruction idempotence ───────────────────────────────────

    #[test]
    fn retokenizing_reconstruction_preserves_kinds() {
        let inputs = [
            "a > b { color: #fff; width: calc(100% - 16px); }",
            "url( x.png ) 'str' 16km 50% @media <!-- -->",
            "/* note */ .cls #id :hover [attr~=word]",
        ];
        for input in inputs {
            let first = tokenize(input);
            let rebuilt: String = first.iter().map(|t| t.text.as_str()).collect();
            let second = tokenize(&rebuilt);
            let k1: Vec<_> = first.iter().map(|t| t.kind).collect();
            let k2: Vec<_> = second.iter().map(|t| t.kind).collect();
            assert_eq!(k1, k2, "kinds changed for {input:?}");
        }
    }

    #[test]
    fn offsets_are_byte_positions() {
        let tokens = tokenize("ab  cd");
        assert_eq!(tokens[0].offset, 0);
        assert_eq!(tokens[1].offset, 2);
        assert_eq!(tokens[2].offset, 4);
    }

    // ── fmt_number ───────────────────────────────────────────────────

    #[test]
    fn fmt_number_renders() {
        assert_eq!(fmt_number(42.0), "42");
        assert_eq!(fmt_number(3.5), "3.5");
        assert_eq!(fmt_number(-0.25), "-0.25");
        assert_eq!(fmt_number(f64::INFINITY), "INF");
        assert_eq!(fmt_number(f64::NEG_INFINITY), "-INF");
        assert_eq!(fmt_number(f64::NAN), "NaN");
    }
}
