//! YAML transcoding: convert a document tree to YAML text.
//!
//! Mapping:
//!   - Node::Integer  -> YAML integer
//!   - Node::Real     -> YAML float (including .nan, .inf, -.inf)
//!   - Node::Bool     -> YAML bool
//!   - Node::String   -> YAML string
//!   - Node::List     -> YAML sequence
//!   - Node::Map      -> YAML mapping, in insertion order
//!
//! YAML mappings can not repeat a key; a repeated info key keeps its first
//! position and its last value.

use libexyz::Node;

/// Encode a document tree as a YAML string.
pub fn encode(node: &Node) -> Result<String, String> {
    serde_yaml::to_string(&node_to_yaml(node)).map_err(|e| format!("YAML encode error: {}", e))
}

fn node_to_yaml(node: &Node) -> serde_yaml::Value {
    match node {
        Node::Integer(n) => serde_yaml::Value::Number(serde_yaml::Number::from(*n)),
        Node::Real(x) => serde_yaml::Value::Number(serde_yaml::Number::from(*x)),
        Node::Bool(b) => serde_yaml::Value::Bool(*b),
        Node::String(s) => serde_yaml::Value::String(s.clone()),
        Node::List(items) => serde_yaml::Value::Sequence(items.iter().map(node_to_yaml).collect()),
        Node::Map(entries) => {
            let mut map = serde_yaml::Mapping::new();
            for (key, value) in entries {
                map.insert(serde_yaml::Value::String(key.clone()), node_to_yaml(value));
            }
            serde_yaml::Value::Mapping(map)
        }
    }
}
