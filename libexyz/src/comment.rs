//! The comment line driver.
//!
//! Reads `key=value` pairs separated by whitespace. The `Properties` key
//! declares the per-atom columns; every other key becomes an info entry
//! whose value type is the first of array, integer, real, boolean and
//! string that matches.

use crate::array::read_array;
use crate::chars::is_end_of_value;
use crate::cursor::Cursor;
use crate::error::{ParseContext, ParseError, Result};
use crate::properties::parse_properties;
use crate::scalar::{read_bool, read_integer, read_real, read_string, unescaped_columns};
use crate::value::{CommentLine, Info, Value};
use tracing::trace;

const PROPERTIES_KEY: &str = "Properties";

/// Parse a comment line.
///
/// # Example
///
/// ```
/// use libexyz::{parse_comment_line, DataType, Value};
///
/// let line = parse_comment_line("Properties=species:S:1:pos:R:3 energy=-1.5").unwrap();
/// assert_eq!(line.properties[1].kind, DataType::Real);
/// assert_eq!(line.get("energy"), Some(&Value::Real(-1.5)));
/// ```
pub fn parse_comment_line(line: &str) -> Result<CommentLine> {
    parse_comment_line_with_context(line, &ParseContext::default())
}

/// Parse a comment line, locating errors with `ctx`.
pub fn parse_comment_line_with_context(line: &str, ctx: &ParseContext) -> Result<CommentLine> {
    if let Some(pos) = line.bytes().position(|c| matches!(c, b'\n' | b'\r' | 0)) {
        let err = if line.as_bytes()[pos] == 0 {
            ParseError::NulInComment(String::new())
        } else {
            ParseError::NewlineInComment(String::new())
        };
        return Err(err.with_location(ctx, pos));
    }

    let mut cur = Cursor::new(line, ctx);
    let mut comment = CommentLine::default();
    let mut seen_properties = false;

    loop {
        cur.skip_whitespace();
        if cur.at_end() {
            return Ok(comment);
        }

        let key_pos = cur.pos();
        let key = read_string(&mut cur)?
            .ok_or_else(|| cur.error(ParseError::ExpectedKey(String::new())))?;
        cur.skip_whitespace();
        if cur.peek() != Some(b'=') {
            return Err(cur.error(ParseError::ExpectedEquals(String::new())));
        }
        cur.bump();
        cur.skip_whitespace();

        if key == PROPERTIES_KEY {
            if seen_properties {
                return Err(cur.error_at(ParseError::DuplicateProperties(String::new()), key_pos));
            }
            seen_properties = true;
            let value_pos = cur.pos();
            let quoted = cur.peek() == Some(b'"');
            let text = read_string(&mut cur)?
                .ok_or_else(|| cur.error(ParseError::ExpectedPropertiesString(String::new())))?;
            comment.properties = if quoted {
                let raw = &line[value_pos + 1..cur.pos() - 1];
                let columns = unescaped_columns(raw, value_pos + 1);
                parse_properties(Cursor::with_columns(&text, ctx, &columns))?
            } else {
                parse_properties(Cursor::with_offset(&text, ctx, value_pos))?
            };
            trace!(columns = comment.properties.len(), "parsed Properties");
        } else {
            let value = read_value(&mut cur)?
                .ok_or_else(|| cur.error(ParseError::ExpectedValue(String::new())))?;
            trace!(key = %key, value = ?value, "parsed info entry");
            comment.info.push(Info { key, value });
        }

        if !is_end_of_value(cur.peek(), false) {
            return Err(cur.error(ParseError::ExpectedWhitespace(String::new())));
        }
    }
}

/// Read one info value, trying array, integer, real, boolean, then string.
pub(crate) fn read_value(cur: &mut Cursor<'_>) -> Result<Option<Value>> {
    if let Some(value) = read_array(cur)? {
        return Ok(Some(value));
    }
    if let Some(n) = read_integer(cur, false)? {
        return Ok(Some(Value::Integer(n)));
    }
    if let Some(x) = read_real(cur, false)? {
        return Ok(Some(Value::Real(x)));
    }
    if let Some(b) = read_bool(cur, false) {
        return Ok(Some(Value::Bool(b)));
    }
    Ok(read_string(cur)?.map(Value::String))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{DataType, Property};

    #[test]
    fn test_empty_line() {
        assert_eq!(parse_comment_line("").unwrap(), CommentLine::default());
        assert_eq!(parse_comment_line(" \t ").unwrap(), CommentLine::default());
    }

    #[test]
    fn test_pairs_in_order() {
        let line = parse_comment_line("b=1 a=2.5 c=T d=text").unwrap();
        let keys: Vec<&str> = line.info.iter().map(|i| i.key.as_str()).collect();
        assert_eq!(keys, ["b", "a", "c", "d"]);
        assert_eq!(line.info[0].value, Value::Integer(1));
        assert_eq!(line.info[1].value, Value::Real(2.5));
        assert_eq!(line.info[2].value, Value::Bool(true));
        assert_eq!(line.info[3].value, Value::String("text".into()));
    }

    #[test]
    fn test_quoted_properties() {
        let line = parse_comment_line(r#"Properties="species:S:1:pos:R:3""#).unwrap();
        assert_eq!(
            line.properties,
            vec![
                Property::new("species", DataType::String, 1),
                Property::new("pos", DataType::Real, 3),
            ]
        );
        assert!(line.info.is_empty());
    }

    #[test]
    fn test_properties_error_column() {
        let err = parse_comment_line(r#"a=1 Properties="pos:R:3:""#).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Expected an identifier in Properties at column 25"
        );
    }

    #[test]
    fn test_properties_error_column_after_escape() {
        let line = parse_comment_line(r#"Properties="spe\cies:S:1""#).unwrap();
        assert_eq!(line.properties[0].key, "species");

        let err = parse_comment_line(r#"Properties="spe\cies:S:1:pos:Q:3""#).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Expected one of L/S/R/I in Properties, got \"Q\" at column 30"
        );
    }

    #[test]
    fn test_colon_after_integer() {
        let err = parse_comment_line("time=12:30").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Expected whitespace between key=value pairs at column 8"
        );
        let err = parse_comment_line("a=[1:2]").unwrap_err();
        assert_eq!(err.to_string(), "Expected ',' between array values at column 5");

        let line = parse_comment_line(r#"time="12:30" t=1.5:2"#).unwrap();
        assert_eq!(line.get("time"), Some(&Value::String("12:30".into())));
        assert_eq!(line.get("t"), Some(&Value::String("1.5:2".into())));
    }

    #[test]
    fn test_line_errors() {
        let cases = [
            ("a=1\nb=2", "New line character inside the comment line at column 4"),
            ("a=1\r", "New line character inside the comment line at column 4"),
            ("a=\0", "NUL character inside the comment line at column 3"),
            ("=1", "Expected a key at column 1"),
            ("a 1", "Expected '=' after key at column 3"),
            ("a=", "Expected a value at column 3"),
            ("a==", "Expected a value at column 3"),
            ("a=1,2", "Expected whitespace between key=value pairs at column 4"),
            ("a=\"x\"b=2", "Expected whitespace between key=value pairs at column 6"),
            ("Properties=1.5:R", "Expected ':' in Properties at column 13"),
            ("Properties==", "Expected a string value for Properties at column 12"),
            (
                "Properties=a:R:1 Properties=b:R:1",
                "Multiple Properties in comment line at column 18",
            ),
        ];
        for (text, message) in cases {
            assert_eq!(
                parse_comment_line(text).unwrap_err().to_string(),
                message,
                "{:?}",
                text
            );
        }
    }

    #[test]
    fn test_error_context() {
        let ctx = ParseContext::new(Some("traj.xyz")).at_line(1);
        let err = parse_comment_line_with_context("a=[1,", &ctx).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Expected ']' to finish the array at 2:6 of <traj.xyz>"
        );
    }
}
