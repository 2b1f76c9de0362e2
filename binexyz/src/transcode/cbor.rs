//! CBOR transcoding: convert a document tree to CBOR binary data.
//!
//! Mapping:
//!   - Node::Integer -> CBOR integer (smallest encoding that fits)
//!   - Node::Real    -> CBOR float64 (always 9 bytes, never downgraded)
//!   - Node::Bool    -> CBOR bool (simple values 20/21)
//!   - Node::String  -> CBOR text string (determinate length)
//!   - Node::List    -> CBOR array (determinate length)
//!   - Node::Map     -> CBOR map (determinate length, text keys in insertion
//!     order)

use ciborium::value::Value as CborValue;
use libexyz::Node;

// ---------------------------------------------------------------------------
// Encode
//
// Written by hand rather than through ciborium's Value type, which
// downgrades float64 to float16/float32 whenever the value fits. Reals
// stay float64 on the wire.
// ---------------------------------------------------------------------------

/// Encode a document tree as CBOR bytes.
pub fn encode(node: &Node) -> Vec<u8> {
    let mut buf = Vec::new();
    write_node(&mut buf, node);
    buf
}

fn write_node(buf: &mut Vec<u8>, node: &Node) {
    match node {
        Node::Integer(n) => write_integer(buf, *n),
        Node::Real(x) => {
            buf.push(0xfb);
            buf.extend_from_slice(&x.to_be_bytes());
        }
        Node::Bool(b) => buf.push(if *b { 0xf5 } else { 0xf4 }),
        Node::String(s) => write_text(buf, s),
        Node::List(items) => {
            write_type_and_length(buf, 4, items.len() as u64);
            for item in items {
                write_node(buf, item);
            }
        }
        Node::Map(entries) => {
            write_type_and_length(buf, 5, entries.len() as u64);
            for (key, value) in entries {
                write_text(buf, key);
                write_node(buf, value);
            }
        }
    }
}

fn write_text(buf: &mut Vec<u8>, s: &str) {
    write_type_and_length(buf, 3, s.len() as u64);
    buf.extend_from_slice(s.as_bytes());
}

/// Write a CBOR major type and its argument, using the low 5 bits of the
/// initial byte for arguments below 24 and 1, 2, 4 or 8 following bytes
/// otherwise.
fn write_type_and_length(buf: &mut Vec<u8>, major: u8, val: u64) {
    let high = major << 5;
    match val {
        0..=23 => buf.push(high | val as u8),
        24..=0xff => {
            buf.push(high | 24);
            buf.push(val as u8);
        }
        0x100..=0xffff => {
            buf.push(high | 25);
            buf.extend_from_slice(&(val as u16).to_be_bytes());
        }
        0x10000..=0xffff_ffff => {
            buf.push(high | 26);
            buf.extend_from_slice(&(val as u32).to_be_bytes());
        }
        _ => {
            buf.push(high | 27);
            buf.extend_from_slice(&val.to_be_bytes());
        }
    }
}

/// Major type 0 holds `n`; major type 1 holds `-1 - n`.
fn write_integer(buf: &mut Vec<u8>, n: i64) {
    if n < 0 {
        write_type_and_length(buf, 1, (-(n + 1)) as u64);
    } else {
        write_type_and_length(buf, 0, n as u64);
    }
}

// ---------------------------------------------------------------------------
// Diagnostic notation (RFC 8949 §8)
// ---------------------------------------------------------------------------

/// Render CBOR bytes as diagnostic notation.
///
/// Rendering starts from the bytes, so the output shows the actual wire
/// encoding.
pub fn diagnostic(input: &[u8]) -> Result<String, String> {
    let cbor_value: CborValue =
        ciborium::de::from_reader(input).map_err(|e| format!("CBOR decode error: {}", e))?;
    let mut out = String::new();
    diag_value(&mut out, &cbor_value, 0);
    out.push('\n');
    Ok(out)
}

fn diag_value(out: &mut String, val: &CborValue, indent: usize) {
    match val {
        CborValue::Null => out.push_str("null"),
        CborValue::Bool(true) => out.push_str("true"),
        CborValue::Bool(false) => out.push_str("false"),
        CborValue::Integer(i) => {
            let n: i128 = (*i).into();
            out.push_str(&n.to_string());
        }
        CborValue::Float(f) => diag_float(out, *f),
        CborValue::Text(s) => diag_text(out, s),
        CborValue::Array(items) => diag_array(out, items, indent),
        CborValue::Map(pairs) => diag_map(out, pairs, indent),
        _ => out.push_str(&format!("<?unknown {:?}>", val)),
    }
}

fn diag_float(out: &mut String, f: f64) {
    if f.is_nan() {
        out.push_str("NaN");
    } else if f.is_infinite() {
        out.push_str(if f > 0.0 { "Infinity" } else { "-Infinity" });
    } else {
        out.push_str(&format!("{:?}", f));
    }
}

fn diag_text(out: &mut String, s: &str) {
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
}

fn pad(out: &mut String, indent: usize) {
    out.extend(std::iter::repeat(' ').take(indent));
}

fn diag_array(out: &mut String, items: &[CborValue], indent: usize) {
    if items.is_empty() {
        out.push_str("[]");
        return;
    }
    // Rows of atom data stay on one line.
    if items.len() <= 5 && items.iter().all(is_simple_value) {
        out.push('[');
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            diag_value(out, item, indent);
        }
        out.push(']');
        return;
    }
    out.push_str("[\n");
    for (i, item) in items.iter().enumerate() {
        pad(out, indent + 2);
        diag_value(out, item, indent + 2);
        if i + 1 < items.len() {
            out.push(',');
        }
        out.push('\n');
    }
    pad(out, indent);
    out.push(']');
}

fn diag_map(out: &mut String, pairs: &[(CborValue, CborValue)], indent: usize) {
    if pairs.is_empty() {
        out.push_str("{}");
        return;
    }
    out.push_str("{\n");
    for (i, (k, v)) in pairs.iter().enumerate() {
        pad(out, indent + 2);
        diag_value(out, k, indent + 2);
        out.push_str(": ");
        diag_value(out, v, indent + 2);
        if i + 1 < pairs.len() {
            out.push(',');
        }
        out.push('\n');
    }
    pad(out, indent);
    out.push('}');
}

fn is_simple_value(val: &CborValue) -> bool {
    matches!(
        val,
        CborValue::Null
            | CborValue::Bool(_)
            | CborValue::Integer(_)
            | CborValue::Float(_)
            | CborValue::Text(_)
    )
}
