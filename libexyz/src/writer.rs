//! Write frames back as extended XYZ text.

use crate::encode::{encode_comment_line, format_bool, format_real};
use crate::error::{ParseError, Result};
use crate::frame::Frame;
use crate::value::ArrayData;
use std::io::Write;

/// Write one frame: atom count, comment line, then one line per atom with
/// the columns in declaration order.
pub fn write_frame<W: Write>(w: &mut W, frame: &Frame) -> Result<()> {
    check_columns(frame)?;

    writeln!(w, "{}", frame.natoms)?;
    writeln!(w, "{}", encode_comment_line(&frame.properties, &frame.info)?)?;

    let mut line = Vec::new();
    for row in 0..frame.natoms {
        line.clear();
        for a in &frame.arrays {
            let ncols = a.array.ncols();
            for index in row * ncols..(row + 1) * ncols {
                line.push(atom_token(a.array.data(), index)?);
            }
        }
        writeln!(w, "{}", line.join(" "))?;
    }
    Ok(())
}

/// Write every frame in order.
pub fn write_frames<W: Write>(w: &mut W, frames: &[Frame]) -> Result<()> {
    for frame in frames {
        write_frame(w, frame)?;
    }
    Ok(())
}

/// Every array has one row per atom, and the arrays are the declared
/// properties with a nonzero count, in order.
fn check_columns(frame: &Frame) -> Result<()> {
    for a in &frame.arrays {
        if a.array.nrows() != frame.natoms {
            return Err(ParseError::ArrayRowMismatch(
                a.key.clone(),
                a.array.nrows(),
                frame.natoms,
            ));
        }
    }
    // Without a declaration the reader would assume the default columns.
    if frame.properties.is_empty() {
        return Err(ParseError::MissingProperties(frame.natoms));
    }

    let mut arrays = frame.arrays.iter();
    let declared = frame
        .properties
        .iter()
        .filter(|p| frame.natoms > 0 && p.count > 0);
    for p in declared {
        match arrays.next() {
            Some(a)
                if a.key == p.key && a.array.data_type() == p.kind && a.array.ncols() == p.count => {}
            Some(a) => return Err(ParseError::PropertyMismatch(a.key.clone())),
            None => return Err(ParseError::PropertyMismatch(p.key.clone())),
        }
    }
    match arrays.next() {
        Some(a) => Err(ParseError::PropertyMismatch(a.key.clone())),
        None => Ok(()),
    }
}

fn atom_token(data: &ArrayData, index: usize) -> Result<String> {
    match data {
        ArrayData::Integer(v) => Ok(v[index].to_string()),
        ArrayData::Real(v) => format_real(v[index]),
        ArrayData::Bool(v) => Ok(format_bool(v[index]).to_string()),
        ArrayData::String(v) => {
            let s = &v[index];
            if s.is_empty() || s.chars().any(|c| matches!(c, ' ' | '\t' | '\n' | '\r')) {
                return Err(ParseError::UnrepresentableString(s.clone()));
            }
            Ok(s.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{read_frames, AtomArray};
    use crate::value::{Array, DataType, Info, Property};

    fn frame() -> Frame {
        Frame::new(
            2,
            vec![Info::new("energy", -3.25), Info::new("name", "water box")],
            vec![
                AtomArray {
                    key: "species".into(),
                    array: Array::new(2, 1, ArrayData::String(vec!["H".into(), "O".into()]))
                        .unwrap(),
                },
                AtomArray {
                    key: "pos".into(),
                    array: Array::new(2, 2, ArrayData::Real(vec![0.0, 1.5, -2.0, 1e-7])).unwrap(),
                },
            ],
        )
    }

    #[test]
    fn test_row_mismatch() {
        let mut frame = frame();
        frame.arrays[0].array =
            Array::new(1, 2, ArrayData::String(vec!["H".into(), "O".into()])).unwrap();
        let err = write_frame(&mut Vec::new(), &frame).unwrap_err();
        assert_eq!(err.to_string(), "Array \"species\" has 1 rows, expected 2");
    }

    #[test]
    fn test_write_frame() {
        let frame = frame();
        let mut out = Vec::new();
        write_frame(&mut out, &frame).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "2\nProperties=species:S:1:pos:R:2 energy=-3.25 name=\"water box\"\n\
             H 0.0 1.5\nO -2.0 1e-7\n"
        );
        assert_eq!(read_frames(&text).unwrap(), vec![frame]);
    }

    #[test]
    fn test_bad_atom_string() {
        let mut frame = frame();
        frame.arrays[0].array =
            Array::new(2, 1, ArrayData::String(vec!["H".into(), "O 2".into()])).unwrap();
        let err = write_frame(&mut Vec::new(), &frame).unwrap_err();
        assert!(matches!(err, ParseError::UnrepresentableString(_)));
    }

    #[test]
    fn test_columns_without_values() {
        let frames = read_frames("1\nProperties=none:R:0\n\n").unwrap();
        assert!(frames[0].arrays.is_empty());
        assert_eq!(frames[0].properties, [Property::new("none", DataType::Real, 0)]);

        let mut out = Vec::new();
        write_frames(&mut out, &frames).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "1\nProperties=none:R:0\n\n");
        assert_eq!(read_frames(&text).unwrap(), frames);
    }

    #[test]
    fn test_declared_properties_must_match_arrays() {
        let mut frame = frame();
        frame.properties[1] = Property::new("pos", DataType::Real, 3);
        let err = write_frame(&mut Vec::new(), &frame).unwrap_err();
        assert_eq!(err.to_string(), "Array \"pos\" does not match the declared properties");

        frame.properties.truncate(1);
        let err = write_frame(&mut Vec::new(), &frame).unwrap_err();
        assert!(matches!(err, ParseError::PropertyMismatch(key) if key == "pos"));

        frame.properties.clear();
        let err = write_frame(&mut Vec::new(), &frame).unwrap_err();
        assert_eq!(err.to_string(), "Frame with 2 atoms declares no properties");
    }
}
