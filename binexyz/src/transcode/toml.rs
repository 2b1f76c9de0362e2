//! TOML transcoding: convert a document tree to TOML text.
//!
//! Mapping:
//!   - Node::Integer  -> TOML integer
//!   - Node::Real     -> TOML float (nan and inf included)
//!   - Node::Bool     -> TOML boolean
//!   - Node::String   -> TOML string
//!   - Node::List     -> TOML array
//!   - Node::Map      -> TOML table, or inline table inside an array
//!
//! TOML requires a table at the top level, so a list of frames or comment
//! lines is written as an array of tables named `frames`. A repeated key
//! keeps its last value.

use libexyz::Node;
use toml_edit::{ArrayOfTables, DocumentMut, Formatted, InlineTable, Item, Table, Value};

/// Encode a document tree as a TOML string.
pub fn encode(node: &Node) -> Result<String, String> {
    let mut doc = DocumentMut::new();
    match node {
        Node::Map(entries) => {
            for (key, value) in entries {
                doc.insert(key.as_str(), node_to_item(value));
            }
        }
        Node::List(items) => {
            let mut frames = ArrayOfTables::new();
            for item in items {
                match item {
                    Node::Map(entries) => frames.push(map_to_table(entries)),
                    _ => return Err("TOML frames must be tables".to_string()),
                }
            }
            doc.insert("frames", Item::ArrayOfTables(frames));
        }
        _ => return Err("TOML requires the top-level value to be a table".to_string()),
    }
    Ok(doc.to_string())
}

fn map_to_table(entries: &[(String, Node)]) -> Table {
    let mut table = Table::new();
    for (key, value) in entries {
        table.insert(key.as_str(), node_to_item(value));
    }
    table
}

fn node_to_item(node: &Node) -> Item {
    match node {
        Node::Map(entries) => Item::Table(map_to_table(entries)),
        _ => Item::Value(node_to_value(node)),
    }
}

fn node_to_value(node: &Node) -> Value {
    match node {
        Node::Integer(n) => Value::Integer(Formatted::new(*n)),
        Node::Real(x) => Value::Float(Formatted::new(*x)),
        Node::Bool(b) => Value::Boolean(Formatted::new(*b)),
        Node::String(s) => Value::String(Formatted::new(s.clone())),
        Node::List(items) => {
            let mut array = toml_edit::Array::new();
            for item in items {
                array.push(node_to_value(item));
            }
            Value::Array(array)
        }
        Node::Map(entries) => {
            let mut inline = InlineTable::new();
            for (key, value) in entries {
                inline.insert(key.as_str(), node_to_value(value));
            }
            Value::InlineTable(inline)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use libexyz::read_frames;

    #[test]
    fn test_frames_become_array_of_tables() {
        let frames = read_frames("1\nenergy=-1.5 name=water\nO 0.0 0.0 0.5\n").unwrap();
        let node = Node::List(frames.iter().map(|f| f.to_node()).collect());
        let text = encode(&node).unwrap();
        assert!(text.contains("[[frames]]"), "{}", text);

        let doc = text.parse::<DocumentMut>().unwrap();
        let frames = doc["frames"].as_array_of_tables().unwrap();
        assert_eq!(frames.len(), 1);
        let frame = frames.get(0).unwrap();
        assert_eq!(frame["natoms"].as_integer(), Some(1));
        assert_eq!(frame["info"]["energy"].as_float(), Some(-1.5));
        assert_eq!(frame["info"]["name"].as_str(), Some("water"));
        let pos = frame["arrays"]["pos"].as_array().unwrap();
        let row = pos.get(0).and_then(|row| row.as_array()).unwrap();
        assert_eq!(row.get(2).and_then(|x| x.as_float()), Some(0.5));
    }

    #[test]
    fn test_top_level_must_be_table() {
        assert!(encode(&Node::Integer(1)).is_err());
        assert!(encode(&Node::List(vec![Node::Integer(1)])).is_err());
    }
}
