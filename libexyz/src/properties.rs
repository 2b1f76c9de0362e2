//! The `Properties` column declaration.
//!
//! The value is a `:` separated list of `name:type:count` triples, for
//! example `species:S:1:pos:R:3`.

use crate::chars::is_ident_char;
use crate::cursor::Cursor;
use crate::error::{ParseError, Result};
use crate::scalar::read_integer_until;
use crate::value::{DataType, Property};

/// Parse a decoded `Properties` value. The cursor places its errors in the
/// comment line.
pub(crate) fn parse_properties(mut cur: Cursor<'_>) -> Result<Vec<Property>> {
    let mut properties = Vec::new();
    if cur.at_end() {
        return Ok(properties);
    }

    loop {
        let start = cur.pos();
        if cur.skip_while(is_ident_char) == 0 {
            return Err(cur.error(ParseError::ExpectedIdentifier(String::new())));
        }
        let key = cur.slice(start, cur.pos()).to_string();
        expect_colon(&mut cur)?;

        let kind = read_type(&mut cur)?;
        expect_colon(&mut cur)?;

        let count = read_count(&mut cur)?;
        properties.push(Property { key, kind, count });

        if cur.at_end() {
            return Ok(properties);
        }
        // read_count only stops at a colon or the end.
        cur.bump();
        if cur.at_end() {
            return Err(cur.error(ParseError::ExpectedIdentifier(String::new())));
        }
    }
}

fn expect_colon(cur: &mut Cursor<'_>) -> Result<()> {
    if cur.peek() != Some(b':') {
        return Err(cur.error(ParseError::ExpectedColon(String::new())));
    }
    cur.bump();
    Ok(())
}

/// A single type letter followed by `:`.
fn read_type(cur: &mut Cursor<'_>) -> Result<DataType> {
    let start = cur.pos();
    let len = cur.skip_while(|c| c != b':');
    let code = cur.slice(start, cur.pos());
    match DataType::from_code(cur.byte_at(start).unwrap_or(b':')) {
        Some(kind) if len == 1 => Ok(kind),
        _ => Err(cur.error_at(
            ParseError::InvalidPropertyType(code.to_string(), String::new()),
            start,
        )),
    }
}

fn read_count(cur: &mut Cursor<'_>) -> Result<usize> {
    let start = cur.pos();
    let count = read_integer_until(cur, |c| c.is_none() || c == Some(b':'))?
        .ok_or_else(|| cur.error(ParseError::InvalidPropertyCount(String::new())))?;
    usize::try_from(count)
        .map_err(|_| cur.error_at(ParseError::NegativePropertyCount(count, String::new()), start))
}
