//! Element type inference for arrays.

use crate::cursor::Cursor;
use crate::error::Result;
use crate::scalar::{read_bool, read_integer, read_real, skip_string};
use crate::value::DataType;

/// Consume one array element, widening `kind` until a reader accepts it.
///
/// `kind` is shared by all the elements of an array and never narrows. Types
/// wider than `widest` are not tried. Returns `false` when no allowed type
/// matches; `kind` may have been widened by then.
pub(crate) fn classify(cur: &mut Cursor<'_>, kind: &mut DataType, widest: DataType) -> Result<bool> {
    loop {
        let matched = match *kind {
            DataType::Integer => read_integer(cur, true)?.is_some(),
            DataType::Real => read_real(cur, true)?.is_some(),
            DataType::Bool => read_bool(cur, true).is_some(),
            DataType::String => skip_string(cur)?,
        };
        if matched {
            return Ok(true);
        }
        if *kind >= widest {
            return Ok(false);
        }
        *kind = kind.wider();
    }
}
