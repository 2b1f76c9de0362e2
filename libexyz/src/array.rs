//! Array readers.
//!
//! Three spellings are accepted:
//!
//! - bracketed: `[1, 2, 3]` and `[[1, 2], [3, 4]]`
//! - legacy quoted: `"1 2 3"` (numbers and booleans only)
//! - legacy braced: `{a b c}` (always strings)
//!
//! Every reader makes two passes over the text. The first pass only walks
//! the elements, deciding the shape and the element type. The second pass
//! rewinds, reserves exactly that many elements and reads them all with the
//! final type. A failure in either pass leaves the cursor where it started.

use crate::chars::is_whitespace;
use crate::cursor::Cursor;
use crate::error::{ParseError, Result};
use crate::infer::classify;
use crate::scalar::{read_bool, read_integer, read_real, read_string};
use crate::value::{Array, ArrayData, DataType, Value};

/// Read an array in any of the three spellings.
///
/// Single-element legacy arrays are returned as the scalar they hold.
pub(crate) fn read_array(cur: &mut Cursor<'_>) -> Result<Option<Value>> {
    match cur.peek() {
        Some(b'[') => Ok(cur.attempt(bracketed_passes)?.map(Value::Array)),
        Some(b'"') => Ok(cur.attempt(legacy_quoted_passes)?.map(Array::into_scalar)),
        Some(b'{') => Ok(cur.attempt(legacy_braced_passes)?.map(Array::into_scalar)),
        _ => Ok(None),
    }
}

/// Storage for `len` elements of type `kind`.
fn reserve(cur: &Cursor<'_>, kind: DataType, len: usize, open: usize) -> Result<ArrayData> {
    ArrayData::with_capacity(kind, len)
        .map_err(|_| cur.error_at(ParseError::OutOfMemory(String::new()), open))
}

/// Read one element with the array's final type and store it.
fn read_element(data: &mut ArrayData, cur: &mut Cursor<'_>) -> Result<bool> {
    match data {
        ArrayData::Integer(values) => match read_integer(cur, true)? {
            Some(n) => values.push(n),
            None => return Ok(false),
        },
        ArrayData::Real(values) => match read_real(cur, true)? {
            Some(x) => values.push(x),
            None => return Ok(false),
        },
        ArrayData::Bool(values) => match read_bool(cur, true) {
            Some(b) => values.push(b),
            None => return Ok(false),
        },
        ArrayData::String(values) => match read_string(cur)? {
            Some(s) => values.push(s),
            None => return Ok(false),
        },
    }
    Ok(true)
}

// =============================================================================
// Bracketed arrays
// =============================================================================

fn bracketed_passes<'a>(cur: &mut Cursor<'a>) -> Result<Option<Array>> {
    let open = cur.pos();

    let mut kind = DataType::Integer;
    let shape = walk_bracketed(cur, |c: &mut Cursor<'a>| {
        classify(c, &mut kind, DataType::String)
    })?;
    let (nrows, ncols) = match shape {
        Some(shape) => shape,
        None => return Ok(None),
    };

    let mut data = reserve(cur, kind, nrows * ncols, open)?;
    cur.reset(open);
    if walk_bracketed(cur, |c: &mut Cursor<'a>| read_element(&mut data, c))?.is_none() {
        return Ok(None);
    }
    Ok(Some(Array::new(nrows, ncols, data)?))
}

/// Walk a bracketed array, calling `element` on each element in row-major
/// order. Returns the shape, or `None` when an element does not match.
fn walk_bracketed<'a, F>(cur: &mut Cursor<'a>, mut element: F) -> Result<Option<(usize, usize)>>
where
    F: FnMut(&mut Cursor<'a>) -> Result<bool>,
{
    cur.bump();
    cur.skip_whitespace();
    if cur.peek() != Some(b'[') {
        return Ok(walk_row(cur, &mut element, false)?.map(|ncols| (1, ncols)));
    }

    let mut nrows = 0;
    let mut ncols = 0;
    loop {
        cur.skip_whitespace();
        match cur.peek() {
            Some(b'[') => {}
            Some(b']') => return Err(cur.error(ParseError::ExpectedValue(String::new()))),
            None => return Err(cur.error(ParseError::UnterminatedArray(']', String::new()))),
            Some(_) => return Err(cur.error(ParseError::MixedNesting(String::new()))),
        }
        let row_open = cur.pos();
        cur.bump();
        let len = match walk_row(cur, &mut element, true)? {
            Some(len) => len,
            None => return Ok(None),
        };
        if nrows > 0 && len != ncols {
            return Err(cur.error_at(ParseError::RaggedArray(String::new()), row_open));
        }
        ncols = len;
        nrows += 1;
        if close_or_continue(cur)? {
            return Ok(Some((nrows, ncols)));
        }
    }
}

/// Walk the elements of one row, just past its `[`, through its `]`.
fn walk_row<'a, F>(cur: &mut Cursor<'a>, element: &mut F, nested: bool) -> Result<Option<usize>>
where
    F: FnMut(&mut Cursor<'a>) -> Result<bool>,
{
    let mut len = 0;
    loop {
        cur.skip_whitespace();
        match cur.peek() {
            Some(b'[') if nested => {
                return Err(cur.error(ParseError::TooManyDimensions(String::new())))
            }
            Some(b'[') => return Err(cur.error(ParseError::MixedNesting(String::new()))),
            Some(b']') if len == 0 => return Err(cur.error(ParseError::EmptyArray(String::new()))),
            Some(b']') => return Err(cur.error(ParseError::ExpectedValue(String::new()))),
            None => return Err(cur.error(ParseError::UnterminatedArray(']', String::new()))),
            Some(_) => {}
        }
        if !element(cur)? {
            return Ok(None);
        }
        len += 1;
        if close_or_continue(cur)? {
            return Ok(Some(len));
        }
    }
}

/// After an element: consume `,` and return false, or `]` and return true.
fn close_or_continue(cur: &mut Cursor<'_>) -> Result<bool> {
    cur.skip_whitespace();
    match cur.peek() {
        Some(b',') => {
            cur.bump();
            Ok(false)
        }
        Some(b']') => {
            cur.bump();
            Ok(true)
        }
        None => Err(cur.error(ParseError::UnterminatedArray(']', String::new()))),
        Some(_) => Err(cur.error(ParseError::ExpectedComma(String::new()))),
    }
}

// =============================================================================
// Legacy arrays
// =============================================================================

/// `"1 2 3"`. Anything that is not a list of numbers or booleans is a no
/// match, leaving the text to be read as a quoted string.
fn legacy_quoted_passes<'a>(cur: &mut Cursor<'a>) -> Result<Option<Array>> {
    let open = cur.pos();

    let mut kind = DataType::Integer;
    let len = walk_words(cur, b'"', false, |c: &mut Cursor<'a>| {
        classify(c, &mut kind, DataType::Bool)
    })?;
    let len = match len {
        Some(len) if len > 0 => len,
        _ => return Ok(None),
    };

    let mut data = reserve(cur, kind, len, open)?;
    cur.reset(open);
    if walk_words(cur, b'"', false, |c: &mut Cursor<'a>| read_element(&mut data, c))?.is_none() {
        return Ok(None);
    }
    Ok(Some(Array::new(1, len, data)?))
}

/// `{a b c}`. Elements are bare or quoted strings.
fn legacy_braced_passes<'a>(cur: &mut Cursor<'a>) -> Result<Option<Array>> {
    let open = cur.pos();

    let len = walk_words(cur, b'}', true, |c: &mut Cursor<'a>| {
        classify(c, &mut DataType::String, DataType::String)
    })?;
    let len = match len {
        Some(0) => return Err(cur.error_at(ParseError::EmptyArray(String::new()), open)),
        Some(len) => len,
        None => return Ok(None),
    };

    let mut data = reserve(cur, DataType::String, len, open)?;
    cur.reset(open);
    if walk_words(cur, b'}', true, |c: &mut Cursor<'a>| read_element(&mut data, c))?.is_none() {
        return Ok(None);
    }
    Ok(Some(Array::new(1, len, data)?))
}

/// Walk whitespace separated elements from an opening delimiter through
/// `close`, returning the element count.
///
/// When `strict`, malformed content is a hard error; otherwise it is a no
/// match.
fn walk_words<'a, F>(
    cur: &mut Cursor<'a>,
    close: u8,
    strict: bool,
    mut element: F,
) -> Result<Option<usize>>
where
    F: FnMut(&mut Cursor<'a>) -> Result<bool>,
{
    let unterminated = || ParseError::UnterminatedArray(close as char, String::new());

    cur.bump();
    let mut len = 0;
    loop {
        cur.skip_whitespace();
        match cur.peek() {
            Some(c) if c == close => {
                cur.bump();
                return Ok(Some(len));
            }
            None => return reject(cur, strict, unterminated()),
            Some(_) => {}
        }
        if !element(cur)? {
            return reject(cur, strict, ParseError::ExpectedValue(String::new()));
        }
        len += 1;
        match cur.peek() {
            Some(c) if c == close || is_whitespace(c) => {}
            None => return reject(cur, strict, unterminated()),
            Some(_) => {
                return reject(cur, strict, ParseError::ExpectedSpaceInArray(String::new()))
            }
        }
    }
}

fn reject(cur: &Cursor<'_>, strict: bool, err: ParseError) -> Result<Option<usize>> {
    if strict {
        Err(cur.error(err))
    } else {
        Ok(None)
    }
}
