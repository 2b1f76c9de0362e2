//! Encode parsed values.
//!
//! Two directions are covered here:
//!
//! - back to extended XYZ text, so that re-reading the output gives the
//!   same properties and info entries;
//! - into a [`Node`] document tree, which the command-line tool turns into
//!   JSON, YAML, TOML or CBOR.

use crate::chars::{is_bare_string_char, is_ident_char, is_quoted_string_char};
use crate::comment::read_value;
use crate::cursor::Cursor;
use crate::error::{ParseContext, ParseError, Result};
use crate::value::{Array, ArrayData, CommentLine, Info, Property, Value};

// =============================================================================
// Extended XYZ
// =============================================================================

/// Encode a comment line: `Properties` first, then the info entries in
/// order, separated by single spaces.
pub fn encode_comment_line(properties: &[Property], info: &[Info]) -> Result<String> {
    let mut parts = Vec::with_capacity(info.len() + 1);
    if !properties.is_empty() {
        parts.push(format!("Properties={}", encode_properties(properties)?));
    }
    for entry in info {
        if entry.key == "Properties" {
            return Err(ParseError::ReservedKey);
        }
        parts.push(format!("{}={}", encode_key(&entry.key)?, encode_value(&entry.value)?));
    }
    Ok(parts.join(" "))
}

fn encode_properties(properties: &[Property]) -> Result<String> {
    let mut triples = Vec::with_capacity(properties.len());
    for property in properties {
        if property.key.is_empty() || !property.key.bytes().all(is_ident_char) {
            return Err(ParseError::InvalidPropertyKey(property.key.clone()));
        }
        triples.push(format!(
            "{}:{}:{}",
            property.key,
            property.kind.code(),
            property.count
        ));
    }
    Ok(triples.join(":"))
}

/// Keys are never typed, so any non-empty run of bare characters stays bare.
pub fn encode_key(key: &str) -> Result<String> {
    if !key.is_empty() && key.bytes().all(is_bare_string_char) {
        return Ok(key.to_string());
    }
    quote(key)
}

/// Encode a value so that it reads back as the same value.
///
/// Arrays are always written in bracketed form.
pub fn encode_value(value: &Value) -> Result<String> {
    match value {
        Value::Integer(n) => Ok(n.to_string()),
        Value::Real(x) => format_real(*x),
        Value::Bool(b) => Ok(format_bool(*b).to_string()),
        Value::String(s) => encode_string(s),
        Value::Array(array) => encode_array(array),
    }
}

/// Encode a string value.
///
/// Bare when the text would not read back as another type, quoted
/// otherwise. A quoted string that would read back as a legacy array is
/// wrapped in braces, which always reads as a string.
pub fn encode_string(s: &str) -> Result<String> {
    if !s.is_empty() && s.bytes().all(is_bare_string_char) && reads_as_string(s, s) {
        return Ok(s.to_string());
    }
    let quoted = quote(s)?;
    if reads_as_string(&quoted, s) {
        Ok(quoted)
    } else {
        Ok(format!("{{{}}}", quoted))
    }
}

/// Real in shortest round-trip form, always with a `.` or an exponent.
pub fn format_real(x: f64) -> Result<String> {
    if !x.is_finite() {
        return Err(ParseError::NonFiniteReal(x));
    }
    Ok(format!("{:?}", x))
}

pub(crate) fn format_bool(b: bool) -> &'static str {
    if b {
        "T"
    } else {
        "F"
    }
}

fn quote(s: &str) -> Result<String> {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            c if c.is_ascii() && is_quoted_string_char(c as u8) => out.push(c),
            _ => return Err(ParseError::UnrepresentableString(s.to_string())),
        }
    }
    out.push('"');
    Ok(out)
}

fn reads_as_string(text: &str, expected: &str) -> bool {
    let ctx = ParseContext::default();
    let mut cur = Cursor::new(text, &ctx);
    match read_value(&mut cur) {
        Ok(Some(Value::String(s))) => cur.at_end() && s == expected,
        _ => false,
    }
}

fn encode_array(array: &Array) -> Result<String> {
    let ncols = array.ncols();
    let mut elements = Vec::with_capacity(array.len());
    match array.data() {
        ArrayData::Integer(values) => elements.extend(values.iter().map(|n| n.to_string())),
        ArrayData::Real(values) => {
            for x in values {
                elements.push(format_real(*x)?);
            }
        }
        ArrayData::Bool(values) => {
            elements.extend(values.iter().map(|b| format_bool(*b).to_string()))
        }
        ArrayData::String(values) => {
            for s in values {
                elements.push(quote(s)?);
            }
        }
    }

    let rows: Vec<String> = elements
        .chunks(ncols)
        .map(|row| format!("[{}]", row.join(", ")))
        .collect();
    if array.nrows() == 1 {
        Ok(rows.concat())
    } else {
        Ok(format!("[{}]", rows.join(", ")))
    }
}

// =============================================================================
// Document tree
// =============================================================================

/// An ordered document tree.
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    Integer(i64),
    Real(f64),
    Bool(bool),
    String(String),
    List(Vec<Node>),
    /// Entries in insertion order. Keys may repeat.
    Map(Vec<(String, Node)>),
}

impl Node {
    pub fn map() -> Self {
        Node::Map(Vec::new())
    }

    /// Append an entry to a map; other nodes are left alone.
    pub fn insert(&mut self, key: impl Into<String>, value: Node) {
        if let Node::Map(entries) = self {
            entries.push((key.into(), value));
        }
    }
}

impl From<&Value> for Node {
    fn from(value: &Value) -> Self {
        match value {
            Value::Integer(n) => Node::Integer(*n),
            Value::Real(x) => Node::Real(*x),
            Value::Bool(b) => Node::Bool(*b),
            Value::String(s) => Node::String(s.clone()),
            Value::Array(array) => array_node(array, array.nrows() == 1),
        }
    }
}

/// Array as a list of rows, or as a flat list when `flat`.
pub(crate) fn array_node(array: &Array, flat: bool) -> Node {
    let values: Vec<Node> = match array.data() {
        ArrayData::Integer(v) => v.iter().map(|n| Node::Integer(*n)).collect(),
        ArrayData::Real(v) => v.iter().map(|x| Node::Real(*x)).collect(),
        ArrayData::Bool(v) => v.iter().map(|b| Node::Bool(*b)).collect(),
        ArrayData::String(v) => v.iter().map(|s| Node::String(s.clone())).collect(),
    };
    if flat {
        return Node::List(values);
    }
    Node::List(
        values
            .chunks(array.ncols())
            .map(|row| Node::List(row.to_vec()))
            .collect(),
    )
}

pub(crate) fn info_node(info: &[Info]) -> Node {
    Node::Map(
        info.iter()
            .map(|entry| (entry.key.clone(), Node::from(&entry.value)))
            .collect(),
    )
}

impl CommentLine {
    /// `{"properties": [{"name", "type", "count"}], "info": {...}}`.
    pub fn to_node(&self) -> Node {
        let properties = self
            .properties
            .iter()
            .map(|p| {
                Node::Map(vec![
                    ("name".to_string(), Node::String(p.key.clone())),
                    ("type".to_string(), Node::String(p.kind.name().to_string())),
                    ("count".to_string(), Node::Integer(p.count as i64)),
                ])
            })
            .collect();
        let mut node = Node::map();
        node.insert("properties", Node::List(properties));
        node.insert("info", info_node(&self.info));
        node
    }

    /// The line in extended XYZ syntax.
    pub fn encode(&self) -> Result<String> {
        encode_comment_line(&self.properties, &self.info)
    }
}

// =============================================================================
// JSON
// =============================================================================

/// Pretty-printed JSON with two-space indentation. Non-finite reals become
/// `null`.
pub fn to_json(node: &Node) -> String {
    encode_json(node, 0)
}

fn encode_json(node: &Node, indent: usize) -> String {
    let pad = "  ".repeat(indent);
    let pad1 = "  ".repeat(indent + 1);

    match node {
        Node::Integer(n) => n.to_string(),
        Node::Real(x) => {
            if x.is_finite() {
                format!("{:?}", x)
            } else {
                "null".to_string()
            }
        }
        Node::Bool(b) => b.to_string(),
        Node::String(s) => encode_json_string(s),
        Node::List(items) => {
            if items.is_empty() {
                return "[]".to_string();
            }
            let items: Vec<String> = items
                .iter()
                .map(|item| format!("{}{}", pad1, encode_json(item, indent + 1)))
                .collect();
            format!("[\n{}\n{}]", items.join(",\n"), pad)
        }
        Node::Map(entries) => {
            if entries.is_empty() {
                return "{}".to_string();
            }
            let items: Vec<String> = entries
                .iter()
                .map(|(key, value)| {
                    format!(
                        "{}{}: {}",
                        pad1,
                        encode_json_string(key),
                        encode_json(value, indent + 1)
                    )
                })
                .collect();
            format!("{{\n{}\n{}}}", items.join(",\n"), pad)
        }
    }
}

fn encode_json_string(s: &str) -> String {
    let mut result = String::from("\"");
    for c in s.chars() {
        match c {
            '"' => result.push_str("\\\""),
            '\\' => result.push_str("\\\\"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            c if c.is_control() => result.push_str(&format!("\\u{:04x}", c as u32)),
            c => result.push(c),
        }
    }
    result.push('"');
    result
}
