//! Extended XYZ value representation.

use crate::error::ParseError;
use std::collections::TryReserveError;
use std::fmt;

/// Element type of a property column or of an array.
///
/// The declaration order is the widening order used when inferring the
/// type of an array: `Integer < Real < Bool < String`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DataType {
    Integer,
    Real,
    Bool,
    String,
}

impl DataType {
    /// Letter used for this type in `Properties` declarations.
    pub fn code(self) -> char {
        match self {
            DataType::Integer => 'I',
            DataType::Real => 'R',
            DataType::Bool => 'L',
            DataType::String => 'S',
        }
    }

    /// Inverse of [`DataType::code`].
    pub fn from_code(code: u8) -> Option<DataType> {
        match code {
            b'I' => Some(DataType::Integer),
            b'R' => Some(DataType::Real),
            b'L' => Some(DataType::Bool),
            b'S' => Some(DataType::String),
            _ => None,
        }
    }

    /// Lowercase name used in diagnostics and document encodings.
    pub fn name(self) -> &'static str {
        match self {
            DataType::Integer => "integer",
            DataType::Real => "real",
            DataType::Bool => "bool",
            DataType::String => "string",
        }
    }

    /// Next type in the widening order. `String` is the widest.
    pub fn wider(self) -> DataType {
        match self {
            DataType::Integer => DataType::Real,
            DataType::Real => DataType::Bool,
            DataType::Bool | DataType::String => DataType::String,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Row-major element storage of an [`Array`].
#[derive(Clone, Debug, PartialEq)]
pub enum ArrayData {
    Integer(Vec<i64>),
    Real(Vec<f64>),
    Bool(Vec<bool>),
    String(Vec<String>),
}

impl ArrayData {
    /// Empty storage of the given type with room for exactly `capacity`
    /// elements.
    pub fn with_capacity(
        kind: DataType,
        capacity: usize,
    ) -> std::result::Result<ArrayData, TryReserveError> {
        fn reserved<T>(capacity: usize) -> std::result::Result<Vec<T>, TryReserveError> {
            let mut values = Vec::new();
            values.try_reserve_exact(capacity)?;
            Ok(values)
        }

        Ok(match kind {
            DataType::Integer => ArrayData::Integer(reserved(capacity)?),
            DataType::Real => ArrayData::Real(reserved(capacity)?),
            DataType::Bool => ArrayData::Bool(reserved(capacity)?),
            DataType::String => ArrayData::String(reserved(capacity)?),
        })
    }

    pub fn data_type(&self) -> DataType {
        match self {
            ArrayData::Integer(_) => DataType::Integer,
            ArrayData::Real(_) => DataType::Real,
            ArrayData::Bool(_) => DataType::Bool,
            ArrayData::String(_) => DataType::String,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ArrayData::Integer(v) => v.len(),
            ArrayData::Real(v) => v.len(),
            ArrayData::Bool(v) => v.len(),
            ArrayData::String(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element at a flat index, as a scalar value.
    pub fn get(&self, index: usize) -> Option<Value> {
        match self {
            ArrayData::Integer(v) => v.get(index).map(|x| Value::Integer(*x)),
            ArrayData::Real(v) => v.get(index).map(|x| Value::Real(*x)),
            ArrayData::Bool(v) => v.get(index).map(|x| Value::Bool(*x)),
            ArrayData::String(v) => v.get(index).map(|x| Value::String(x.clone())),
        }
    }
}

/// A one or two dimensional array with a single element type.
///
/// Always holds `nrows * ncols >= 1` elements.
#[derive(Clone, Debug, PartialEq)]
pub struct Array {
    nrows: usize,
    ncols: usize,
    data: ArrayData,
}

impl Array {
    /// Build an array, checking that the shape matches the data.
    pub fn new(nrows: usize, ncols: usize, data: ArrayData) -> Result<Array, ParseError> {
        let len = data.len();
        match nrows.checked_mul(ncols) {
            Some(size) if size == len && size > 0 => Ok(Array { nrows, ncols, data }),
            _ => Err(ParseError::InvalidShape(nrows, ncols, len)),
        }
    }

    pub fn nrows(&self) -> usize {
        self.nrows
    }

    pub fn ncols(&self) -> usize {
        self.ncols
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Never true for an array built by [`Array::new`].
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn data_type(&self) -> DataType {
        self.data.data_type()
    }

    pub fn data(&self) -> &ArrayData {
        &self.data
    }

    pub fn into_data(self) -> ArrayData {
        self.data
    }

    /// Element at (`row`, `col`).
    pub fn get(&self, row: usize, col: usize) -> Option<Value> {
        if row >= self.nrows || col >= self.ncols {
            return None;
        }
        self.data.get(row * self.ncols + col)
    }

    /// A single-element array becomes the scalar it holds; anything larger
    /// stays an array value.
    pub fn into_scalar(self) -> Value {
        if self.data.len() == 1 {
            if let Some(value) = self.data.get(0) {
                return value;
            }
        }
        Value::Array(self)
    }
}

/// A value attached to a key in the comment line.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Integer(i64),
    Real(f64),
    Bool(bool),
    String(String),
    Array(Array),
}

impl Value {
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Value::Integer(_) => Some(DataType::Integer),
            Value::Real(_) => Some(DataType::Real),
            Value::Bool(_) => Some(DataType::Bool),
            Value::String(_) => Some(DataType::String),
            Value::Array(_) => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_real(&self) -> Option<f64> {
        match self {
            Value::Real(x) => Some(*x),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Real(x)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<Array> for Value {
    fn from(a: Array) -> Self {
        Value::Array(a)
    }
}

/// One per-atom column declared in `Properties`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Property {
    pub key: String,
    pub kind: DataType,
    pub count: usize,
}

impl Property {
    pub fn new(key: impl Into<String>, kind: DataType, count: usize) -> Self {
        Self {
            key: key.into(),
            kind,
            count,
        }
    }
}

/// A `key=value` entry of the comment line, other than `Properties`.
#[derive(Clone, Debug, PartialEq)]
pub struct Info {
    pub key: String,
    pub value: Value,
}

impl Info {
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Everything declared by one comment line, in source order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CommentLine {
    pub properties: Vec<Property>,
    pub info: Vec<Info>,
}

impl CommentLine {
    /// First info entry with the given key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.info.iter().find(|i| i.key == key).map(|i| &i.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_widening_order() {
        assert!(DataType::Integer < DataType::Real);
        assert!(DataType::Real < DataType::Bool);
        assert!(DataType::Bool < DataType::String);
        assert_eq!(DataType::Integer.wider(), DataType::Real);
        assert_eq!(DataType::String.wider(), DataType::String);
    }

    #[test]
    fn test_type_codes() {
        for kind in [
            DataType::Integer,
            DataType::Real,
            DataType::Bool,
            DataType::String,
        ] {
            assert_eq!(DataType::from_code(kind.code() as u8), Some(kind));
        }
        assert_eq!(DataType::from_code(b'X'), None);
    }

    #[test]
    fn test_array_shape_checked() {
        let data = ArrayData::Integer(vec![1, 2, 3, 4]);
        let array = Array::new(2, 2, data.clone()).unwrap();
        assert_eq!(array.get(1, 0), Some(Value::Integer(3)));
        assert_eq!(array.get(2, 0), None);
        assert!(Array::new(1, 3, data).is_err());
        assert!(Array::new(0, 0, ArrayData::Real(vec![])).is_err());
    }

    #[test]
    fn test_into_scalar() {
        let single = Array::new(1, 1, ArrayData::String(vec!["Foo".into()])).unwrap();
        assert_eq!(single.into_scalar(), Value::String("Foo".into()));
        let pair = Array::new(1, 2, ArrayData::Bool(vec![true, false])).unwrap();
        assert!(matches!(pair.into_scalar(), Value::Array(_)));
    }

    #[test]
    fn test_with_capacity() {
        let data = ArrayData::with_capacity(DataType::Real, 8).unwrap();
        assert_eq!(data.data_type(), DataType::Real);
        assert!(data.is_empty());
    }
}
