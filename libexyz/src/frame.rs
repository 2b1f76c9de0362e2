//! Frames of a trajectory file.
//!
//! A frame is an atom count line, a comment line and one line per atom.
//! [`FrameLocator`] splits a stream into raw frames by counting lines;
//! [`Reader`] parses each raw frame into typed per-atom arrays.

use crate::comment::parse_comment_line_with_context;
use crate::cursor::Cursor;
use crate::encode::{array_node, info_node, Node};
use crate::error::{ParseContext, ParseError, Result};
use crate::scalar::{read_bool, read_integer, read_real};
use crate::value::{Array, ArrayData, DataType, Info, Property, Value};
use std::io::{BufRead, Read};
use tracing::{debug, warn};

/// Columns assumed when a comment line has no `Properties`.
pub fn default_properties() -> Vec<Property> {
    vec![
        Property::new("species", DataType::String, 1),
        Property::new("pos", DataType::Real, 3),
    ]
}

// =============================================================================
// Locating frames
// =============================================================================

/// The undecoded text of one frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawFrame {
    pub natoms: usize,
    /// Zero-based line of the atom count in the input.
    pub first_line: usize,
    /// Comment line and atom lines, each terminated by `\n`.
    pub text: String,
}

impl RawFrame {
    pub fn comment_line(&self) -> &str {
        self.text.split('\n').next().unwrap_or_default()
    }

    pub fn atom_lines(&self) -> impl Iterator<Item = &str> {
        self.text.split('\n').skip(1).take(self.natoms)
    }
}

/// Splits a stream into frames by counting lines.
pub struct FrameLocator<R> {
    input: R,
    ctx: ParseContext,
    line: usize,
}

impl<R: BufRead> FrameLocator<R> {
    pub fn new(input: R, filename: Option<&str>) -> Self {
        Self {
            input,
            ctx: ParseContext::new(filename),
            line: 0,
        }
    }

    /// The next frame, or `None` at the end of the input. Blank lines after
    /// the last frame are ignored.
    pub fn next_frame(&mut self) -> Result<Option<RawFrame>> {
        let first_line = self.line;
        let header = match self.read_line()? {
            Some(header) => header,
            None => return Ok(None),
        };
        if header.trim().is_empty() {
            return self.expect_end(first_line);
        }

        let token = header.split_whitespace().next().unwrap_or_default();
        let natoms = token.parse::<usize>().map_err(|_| {
            let col = header.find(token).unwrap_or(0);
            ParseError::InvalidAtomCount(token.to_string(), String::new())
                .with_location(&self.ctx.at_line(first_line), col)
        })?;

        let mut text = String::new();
        for _ in 0..=natoms {
            match self.read_line()? {
                Some(line) => {
                    text.push_str(&line);
                    text.push('\n');
                }
                None => {
                    return Err(ParseError::NotEnoughLines(String::new())
                        .with_location(&self.ctx.at_line(first_line), 0))
                }
            }
        }
        debug!(natoms, line = first_line + 1, "located frame");
        Ok(Some(RawFrame {
            natoms,
            first_line,
            text,
        }))
    }

    fn expect_end(&mut self, blank_line: usize) -> Result<Option<RawFrame>> {
        while let Some(line) = self.read_line()? {
            if !line.trim().is_empty() {
                return Err(ParseError::MissingAtomCount(String::new())
                    .with_location(&self.ctx.at_line(blank_line), 0));
            }
        }
        Ok(None)
    }

    /// One line without its terminator, `None` at the end of the input.
    fn read_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        self.line += 1;
        if line.ends_with('\n') {
            line.pop();
        }
        if line.ends_with('\r') {
            line.pop();
        }
        Ok(Some(line))
    }
}

// =============================================================================
// Parsing frames
// =============================================================================

/// One per-atom column: `nrows` is the atom count, `ncols` the declared
/// count.
#[derive(Clone, Debug, PartialEq)]
pub struct AtomArray {
    pub key: String,
    pub array: Array,
}

/// A parsed frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    pub natoms: usize,
    /// Declared columns, including those with no values. `arrays` holds one
    /// entry per declaration with a nonzero count, unless there are no atoms.
    pub properties: Vec<Property>,
    pub info: Vec<Info>,
    pub arrays: Vec<AtomArray>,
}

impl Frame {
    /// A frame declaring exactly the columns of `arrays`, or the default
    /// columns when there are none.
    pub fn new(natoms: usize, info: Vec<Info>, arrays: Vec<AtomArray>) -> Self {
        let properties = if arrays.is_empty() {
            default_properties()
        } else {
            arrays
                .iter()
                .map(|a| Property::new(a.key.clone(), a.array.data_type(), a.array.ncols()))
                .collect()
        };
        Self {
            natoms,
            properties,
            info,
            arrays,
        }
    }

    /// First info value with the given key.
    pub fn info(&self, key: &str) -> Option<&Value> {
        self.info.iter().find(|i| i.key == key).map(|i| &i.value)
    }

    /// First per-atom array with the given key.
    pub fn array(&self, key: &str) -> Option<&Array> {
        self.arrays.iter().find(|a| a.key == key).map(|a| &a.array)
    }

    /// `{"natoms", "info", "arrays"}`. Single-column arrays become flat
    /// lists, others a list per atom.
    pub fn to_node(&self) -> Node {
        let mut arrays = Node::map();
        for a in &self.arrays {
            arrays.insert(a.key.clone(), array_node(&a.array, a.array.ncols() == 1));
        }
        let mut node = Node::map();
        node.insert("natoms", Node::Integer(self.natoms as i64));
        node.insert("info", info_node(&self.info));
        node.insert("arrays", arrays);
        node
    }
}

/// Reads frames from a stream.
pub struct Reader<R> {
    locator: FrameLocator<R>,
    ctx: ParseContext,
}

impl<R: BufRead> Reader<R> {
    pub fn new(input: R, filename: Option<&str>) -> Self {
        Self {
            locator: FrameLocator::new(input, filename),
            ctx: ParseContext::new(filename),
        }
    }

    /// Parse a frame found by the locator.
    pub fn parse_frame(&self, raw: &RawFrame) -> Result<Frame> {
        let comment = parse_comment_line_with_context(
            raw.comment_line(),
            &self.ctx.at_line(raw.first_line + 1),
        )?;
        let properties = if comment.properties.is_empty() {
            default_properties()
        } else {
            comment.properties
        };
        let columns = properties
            .iter()
            .try_fold(0usize, |sum, p| sum.checked_add(p.count))
            .ok_or_else(|| {
                ParseError::TooManyColumns(String::new())
                    .with_location(&self.ctx.at_line(raw.first_line + 1), 0)
            })?;

        // Check every line before reserving, so storage never outgrows the
        // input.
        let mut rows = Vec::with_capacity(raw.natoms);
        for (i, line) in raw.atom_lines().enumerate() {
            let tokens = tokenize(line);
            if tokens.len() != columns {
                return Err(ParseError::AtomColumnCount(columns, tokens.len(), String::new())
                    .with_location(&self.ctx.at_line(raw.first_line + 2 + i), 0));
            }
            rows.push(tokens);
        }

        let mut data = Vec::with_capacity(properties.len());
        for property in &properties {
            let storage = ArrayData::with_capacity(property.kind, raw.natoms * property.count)
                .map_err(|_| ParseError::OutOfMemory(String::new()))?;
            data.push(storage);
        }

        for (i, tokens) in rows.into_iter().enumerate() {
            let line_ctx = self.ctx.at_line(raw.first_line + 2 + i);
            let mut tokens = tokens.into_iter();
            for (property, storage) in properties.iter().zip(data.iter_mut()) {
                for (col, token) in tokens.by_ref().take(property.count) {
                    push_token(storage, token).map_err(|e| e.with_location(&line_ctx, col))?;
                }
            }
        }

        if raw.natoms == 0 {
            warn!(line = raw.first_line + 1, "frame has no atoms");
        }
        let mut arrays = Vec::with_capacity(properties.len());
        for (property, storage) in properties.iter().zip(data) {
            if raw.natoms == 0 {
                continue;
            }
            if property.count == 0 {
                warn!(key = %property.key, "skipping property with no columns");
                continue;
            }
            arrays.push(AtomArray {
                array: Array::new(raw.natoms, property.count, storage)?,
                key: property.key.clone(),
            });
        }
        debug!(natoms = raw.natoms, arrays = arrays.len(), "parsed frame");

        Ok(Frame {
            natoms: raw.natoms,
            properties,
            info: comment.info,
            arrays,
        })
    }
}

impl<R: BufRead> Iterator for Reader<R> {
    type Item = Result<Frame>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.locator.next_frame() {
            Ok(Some(raw)) => Some(self.parse_frame(&raw)),
            Ok(None) => None,
            Err(e) => Some(Err(e)),
        }
    }
}

/// Read every frame of an in-memory trajectory.
pub fn read_frames(input: &str) -> Result<Vec<Frame>> {
    Reader::new(input.as_bytes(), None).collect()
}

/// Read every frame of a stream.
pub fn read_frames_from<R: Read>(input: R, filename: Option<&str>) -> Result<Vec<Frame>> {
    Reader::new(std::io::BufReader::new(input), filename).collect()
}

/// Whitespace separated tokens with their columns.
fn tokenize(line: &str) -> Vec<(usize, &str)> {
    let mut tokens = Vec::new();
    let mut start = None;
    for (i, c) in line.char_indices() {
        match (c == ' ' || c == '\t', start) {
            (true, Some(s)) => {
                tokens.push((s, &line[s..i]));
                start = None;
            }
            (false, None) => start = Some(i),
            _ => {}
        }
    }
    if let Some(s) = start {
        tokens.push((s, &line[s..]));
    }
    tokens
}

/// Convert one atom token with the column's type.
fn push_token(storage: &mut ArrayData, token: &str) -> Result<()> {
    let ctx = ParseContext::default();
    let mut cur = Cursor::new(token, &ctx);
    let invalid = |kind: DataType| {
        ParseError::InvalidAtomValue(token.to_string(), kind.name(), String::new())
    };
    match storage {
        ArrayData::Integer(values) => match read_integer(&mut cur, false)? {
            Some(n) if cur.at_end() => values.push(n),
            _ => return Err(invalid(DataType::Integer)),
        },
        ArrayData::Real(values) => match read_real(&mut cur, false)? {
            Some(x) if cur.at_end() => values.push(x),
            _ => return Err(invalid(DataType::Real)),
        },
        ArrayData::Bool(values) => match read_bool(&mut cur, false) {
            Some(b) if cur.at_end() => values.push(b),
            _ => return Err(invalid(DataType::Bool)),
        },
        ArrayData::String(values) => values.push(token.to_string()),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_FRAMES: &str = "2\nProperties=species:S:1:pos:R:3 step=0\nH 0.0 0.0 0.0\nO 1.0 0.0 0.0\n\
                              1\r\nstep=1\r\nC 0 0 1d0\r\n";

    #[test]
    fn test_locate_frames() {
        let mut locator = FrameLocator::new(TWO_FRAMES.as_bytes(), None);
        let first = locator.next_frame().unwrap().unwrap();
        assert_eq!(first.natoms, 2);
        assert_eq!(first.first_line, 0);
        assert_eq!(first.comment_line(), "Properties=species:S:1:pos:R:3 step=0");
        assert_eq!(first.atom_lines().collect::<Vec<_>>(), ["H 0.0 0.0 0.0", "O 1.0 0.0 0.0"]);

        let second = locator.next_frame().unwrap().unwrap();
        assert_eq!(second.first_line, 4);
        assert_eq!(second.comment_line(), "step=1");
        assert_eq!(second.atom_lines().collect::<Vec<_>>(), ["C 0 0 1d0"]);

        assert!(locator.next_frame().unwrap().is_none());
    }

    #[test]
    fn test_last_line_without_newline() {
        let mut locator = FrameLocator::new("1\n\nX 1 2 3".as_bytes(), None);
        let frame = locator.next_frame().unwrap().unwrap();
        assert_eq!(frame.atom_lines().collect::<Vec<_>>(), ["X 1 2 3"]);
    }

    #[test]
    fn test_trailing_blank_lines() {
        let mut locator = FrameLocator::new("0\n\n\n  \n".as_bytes(), None);
        assert!(locator.next_frame().unwrap().is_some());
        assert!(locator.next_frame().unwrap().is_none());
    }

    #[test]
    fn test_locator_errors() {
        let mut locator = FrameLocator::new("3\ncomment\nH 0 0 0\n".as_bytes(), Some("a.xyz"));
        assert_eq!(
            locator.next_frame().unwrap_err().to_string(),
            "Not enough lines in file for XYZ format at 1:1 of <a.xyz>"
        );

        let mut locator = FrameLocator::new("  two\n".as_bytes(), None);
        assert_eq!(
            locator.next_frame().unwrap_err().to_string(),
            "Invalid number of atoms \"two\" at 1:3"
        );

        let mut locator = FrameLocator::new("\n1\n\nH 0 0 0\n".as_bytes(), None);
        assert_eq!(
            locator.next_frame().unwrap_err().to_string(),
            "Expected the number of atoms at 1:1"
        );
    }

    #[test]
    fn test_tokenize() {
        assert_eq!(tokenize("  H\t1.0  2 "), [(2, "H"), (4, "1.0"), (9, "2")]);
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn test_read_frames() {
        let frames = read_frames(TWO_FRAMES).unwrap();
        assert_eq!(frames.len(), 2);

        let first = &frames[0];
        assert_eq!(first.natoms, 2);
        assert_eq!(first.info("step"), Some(&Value::Integer(0)));
        let species = first.array("species").unwrap();
        assert_eq!(
            species.data(),
            &ArrayData::String(vec!["H".to_string(), "O".to_string()])
        );
        let pos = first.array("pos").unwrap();
        assert_eq!((pos.nrows(), pos.ncols()), (2, 3));
        assert_eq!(pos.get(1, 0), Some(Value::Real(1.0)));

        // No Properties: species and positions are assumed.
        let second = &frames[1];
        assert_eq!(second.properties, default_properties());
        assert_eq!(second.array("pos").unwrap().get(0, 2), Some(Value::Real(1.0)));
    }

    #[test]
    fn test_typed_columns() {
        let text = "2\nProperties=Z:I:1:fixed:L:1:charge:R:1\n8 T -0.5\n1 F 0.25\n";
        let frame = &read_frames(text).unwrap()[0];
        assert_eq!(frame.array("Z").unwrap().data(), &ArrayData::Integer(vec![8, 1]));
        assert_eq!(
            frame.array("fixed").unwrap().data(),
            &ArrayData::Bool(vec![true, false])
        );
        assert_eq!(
            frame.array("charge").unwrap().data(),
            &ArrayData::Real(vec![-0.5, 0.25])
        );
    }

    #[test]
    fn test_zero_width_property_skipped() {
        let text = "1\nProperties=species:S:1:none:R:0:pos:R:3\nH 0 0 0\n";
        let frame = &read_frames(text).unwrap()[0];
        let keys: Vec<&str> = frame.arrays.iter().map(|a| a.key.as_str()).collect();
        assert_eq!(keys, ["species", "pos"]);
    }

    #[test]
    fn test_zero_atoms() {
        let frame = &read_frames("0\nenergy=1.5\n").unwrap()[0];
        assert_eq!(frame.natoms, 0);
        assert!(frame.arrays.is_empty());
        assert_eq!(frame.info("energy"), Some(&Value::Real(1.5)));
    }

    #[test]
    fn test_atom_line_errors() {
        let err = read_frames("1\n\nH 0 0\n").unwrap_err();
        assert_eq!(err.to_string(), "Expected 4 values in atom line, got 3 at 3:1");

        let err = read_frames("1\nProperties=Z:I:1\n 1.5\n").unwrap_err();
        assert_eq!(err.to_string(), "Invalid integer value \"1.5\" at 3:2");

        let err = read_frames("1\nProperties=ok:L:1\nt\n").unwrap_err();
        assert_eq!(err.to_string(), "Invalid bool value \"t\" at 3:1");

        let err = read_frames("1\na=[1,\nH 0 0 0\n").unwrap_err();
        assert_eq!(err.to_string(), "Expected ']' to finish the array at 2:6");
    }
}
