//! Scalar readers.
//!
//! Each reader either consumes a complete token and returns it, returns
//! `Ok(None)` with the cursor untouched when the text is not of its kind, or
//! fails with a hard error. The caller decides which reader to try next.

use crate::chars::{is_bare_string_char, is_digit, is_end_of_value, is_quoted_string_char};
use crate::cursor::Cursor;
use crate::error::{ParseError, Result};

const BOOLEANS: [(&str, bool); 8] = [
    ("TRUE", true),
    ("True", true),
    ("true", true),
    ("T", true),
    ("FALSE", false),
    ("False", false),
    ("false", false),
    ("F", false),
];

/// Read an optionally signed decimal integer. A `:` also ends it, so the
/// counts of a `Properties` value read the same way.
pub(crate) fn read_integer(cur: &mut Cursor<'_>, inside_array: bool) -> Result<Option<i64>> {
    read_integer_until(cur, |c| is_end_of_value(c, inside_array) || c == Some(b':'))
}

/// Read an integer that must be followed by a byte accepted by `ends`.
pub(crate) fn read_integer_until(
    cur: &mut Cursor<'_>,
    ends: impl Fn(Option<u8>) -> bool,
) -> Result<Option<i64>> {
    cur.attempt(|cur| {
        let start = cur.pos();
        if matches!(cur.peek(), Some(b'+' | b'-')) {
            cur.bump();
        }
        if cur.skip_while(is_digit) == 0 || !ends(cur.peek()) {
            return Ok(None);
        }
        match cur.slice(start, cur.pos()).parse::<i64>() {
            Ok(n) => Ok(Some(n)),
            Err(_) => Err(cur.error_at(ParseError::IntegerOverflow(String::new()), start)),
        }
    })
}

/// Read a real number, with `e`, `E`, `d` or `D` exponents.
pub(crate) fn read_real(cur: &mut Cursor<'_>, inside_array: bool) -> Result<Option<f64>> {
    cur.attempt(|cur| {
        let start = cur.pos();
        if matches!(cur.peek(), Some(b'+' | b'-')) {
            cur.bump();
        }
        let mantissa_start = cur.pos();
        let mut digits = cur.skip_while(is_digit);
        if cur.peek() == Some(b'.') {
            // A dot must be followed by at least one digit.
            if !matches!(cur.byte_at(cur.pos() + 1), Some(c) if is_digit(c)) {
                return Ok(None);
            }
            cur.bump();
            digits += cur.skip_while(is_digit);
        }
        if digits == 0 {
            return Ok(None);
        }
        let mantissa = cur.slice(mantissa_start, cur.pos());
        if matches!(cur.peek(), Some(b'e' | b'E' | b'd' | b'D')) {
            cur.bump();
            if matches!(cur.peek(), Some(b'+' | b'-')) {
                cur.bump();
            }
            if cur.skip_while(is_digit) == 0 {
                return Ok(None);
            }
        }
        if !is_end_of_value(cur.peek(), inside_array) {
            return Ok(None);
        }

        let text = cur.slice(start, cur.pos()).replace(|c: char| c == 'd' || c == 'D', "e");
        let value = match text.parse::<f64>() {
            Ok(value) => value,
            Err(_) => return Ok(None),
        };
        let nonzero_mantissa = mantissa.bytes().any(|c| matches!(c, b'1'..=b'9'));
        if value.is_infinite() || (value == 0.0 && nonzero_mantissa) {
            return Ok(None);
        }
        Ok(Some(value))
    })
}

/// Read one of the accepted boolean spellings.
pub(crate) fn read_bool(cur: &mut Cursor<'_>, inside_array: bool) -> Option<bool> {
    let rest = cur.rest();
    for (literal, value) in BOOLEANS {
        if rest.starts_with(literal)
            && is_end_of_value(cur.byte_at(cur.pos() + literal.len()), inside_array)
        {
            cur.reset(cur.pos() + literal.len());
            return Some(value);
        }
    }
    None
}

pub(crate) fn read_bare_string<'a>(cur: &mut Cursor<'a>) -> Option<&'a str> {
    let start = cur.pos();
    if cur.skip_while(is_bare_string_char) == 0 {
        return None;
    }
    Some(cur.slice(start, cur.pos()))
}

/// Scan a quoted string, returning the raw text between the quotes.
fn scan_quoted_string<'a>(cur: &mut Cursor<'a>) -> Result<Option<&'a str>> {
    if cur.peek() != Some(b'"') {
        return Ok(None);
    }
    cur.attempt(|cur| {
        let open = cur.pos();
        cur.bump();
        loop {
            match cur.peek() {
                None => {
                    return Err(cur.error_at(ParseError::UnterminatedString(String::new()), open))
                }
                Some(b'"') => {
                    let raw = cur.slice(open + 1, cur.pos());
                    cur.bump();
                    return Ok(Some(raw));
                }
                Some(b'\\') => {
                    cur.bump();
                    match cur.peek() {
                        None => {
                            return Err(cur.error_at(
                                ParseError::UnterminatedString(String::new()),
                                open,
                            ))
                        }
                        Some(c) if c == b'"' || is_quoted_string_char(c) => cur.bump(),
                        Some(_) => return Err(cur.error(ParseError::BadCharInString(String::new()))),
                    }
                }
                Some(c) if is_quoted_string_char(c) => cur.bump(),
                Some(_) => return Err(cur.error(ParseError::BadCharInString(String::new()))),
            }
        }
    })
}

/// Read a quoted string and decode its escapes.
pub(crate) fn read_quoted_string(cur: &mut Cursor<'_>) -> Result<Option<String>> {
    let open = cur.pos();
    match scan_quoted_string(cur)? {
        Some(raw) => unescape(raw)
            .map(Some)
            .map_err(|e| cur.error_at(e, open)),
        None => Ok(None),
    }
}

/// Read a quoted string, or else a bare one.
pub(crate) fn read_string(cur: &mut Cursor<'_>) -> Result<Option<String>> {
    if cur.peek() == Some(b'"') {
        return read_quoted_string(cur);
    }
    Ok(read_bare_string(cur).map(str::to_string))
}

/// Like [`read_string`], without building the value.
pub(crate) fn skip_string(cur: &mut Cursor<'_>) -> Result<bool> {
    if cur.peek() == Some(b'"') {
        return Ok(scan_quoted_string(cur)?.is_some());
    }
    Ok(read_bare_string(cur).is_some())
}

/// Decode the text between the quotes of a quoted string.
///
/// `\n` is a newline; a backslash before any other character yields that
/// character.
pub fn unescape(raw: &str) -> Result<String> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some(escaped) => out.push(escaped),
            None => return Err(ParseError::TrailingBackslash(String::new())),
        }
    }
    Ok(out)
}

/// Column of each byte of `unescape(raw)`, then of its end, for `raw`
/// starting at column `first`. Quoted text is ASCII, so an escape pair is
/// two bytes that decode to one.
pub(crate) fn unescaped_columns(raw: &str, first: usize) -> Vec<usize> {
    let bytes = raw.as_bytes();
    let mut columns = Vec::with_capacity(bytes.len() + 1);
    let mut i = 0;
    while i < bytes.len() {
        columns.push(first + i);
        i += if bytes[i] == b'\\' { 2 } else { 1 };
    }
    columns.push(first + bytes.len());
    columns
}
