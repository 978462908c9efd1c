//! Topology configuration parser.
//!
//! Converts a decoded JSON document into a validated [`GraphModel`].
//! Construction is all-or-nothing: the model is assembled privately and
//! only handed back once every node and link has been accepted.

use std::collections::BTreeMap;

use log::{debug, info};
use serde_json::{Map, Value};

use crate::error::TopologyError;
use crate::graph::model::{AttrValue, GraphModel, Link, Node, DEFAULT_NODE_KIND};

/// Top-level keys understood by the parser; anything else is ignored
const KNOWN_KEYS: [&str; 2] = ["nodes", "links"];

/// Parse a decoded topology document into a [`GraphModel`]
///
/// # Errors
/// * `TopologyError::Schema` - document shape is wrong (missing `nodes`,
///   non-object entries, missing identifiers, nested attribute values) or a
///   link joins a declared node to itself
/// * `TopologyError::DuplicateNode` - two nodes share an identifier
/// * `TopologyError::DanglingLink` - a link endpoint names no declared node
pub fn parse_topology(config: &Value) -> Result<GraphModel, TopologyError> {
    let root = config.as_object().ok_or_else(|| {
        TopologyError::schema(format!(
            "expected a JSON object at top level, found {}",
            kind_of(config)
        ))
    })?;

    for key in root.keys().filter(|k| !KNOWN_KEYS.contains(&k.as_str())) {
        debug!("Ignoring unrecognized top-level key '{}'", key);
    }

    let nodes = match root.get("nodes") {
        Some(Value::Array(items)) => items,
        Some(other) => {
            return Err(TopologyError::schema(format!(
                "'nodes' must be an array, found {}",
                kind_of(other)
            )));
        }
        None => return Err(TopologyError::schema("missing required 'nodes' key")),
    };

    let links: &[Value] = match root.get("links") {
        Some(Value::Array(items)) => items,
        Some(Value::Null) | None => &[],
        Some(other) => {
            return Err(TopologyError::schema(format!(
                "'links' must be an array, found {}",
                kind_of(other)
            )));
        }
    };

    let mut graph = GraphModel::new();

    for (index, entry) in nodes.iter().enumerate() {
        graph.add_node(parse_node(index, entry)?)?;
    }

    for (index, entry) in links.iter().enumerate() {
        graph.add_link(parse_link(index, entry)?)?;
    }

    info!(
        "Parsed topology: {} nodes, {} links",
        graph.node_count(),
        graph.link_count()
    );
    Ok(graph)
}

fn parse_node(index: usize, entry: &Value) -> Result<Node, TopologyError> {
    let fields = entry.as_object().ok_or_else(|| {
        TopologyError::schema(format!(
            "node #{} must be an object, found {}",
            index,
            kind_of(entry)
        ))
    })?;

    let mut id = None;
    let mut kind = None;
    let mut label = None;
    let mut attributes = BTreeMap::new();

    for (key, value) in fields {
        match key.as_str() {
            "id" => id = Some(parse_identifier(value, || format!("node #{} 'id'", index))?),
            "kind" => kind = Some(parse_text(value, || format!("node #{} 'kind'", index))?),
            "label" => label = Some(parse_text(value, || format!("node #{} 'label'", index))?),
            _ => {
                let value =
                    parse_scalar(value, || format!("node #{} attribute '{}'", index, key))?;
                attributes.insert(key.clone(), value);
            }
        }
    }

    let id = id.ok_or_else(|| {
        TopologyError::schema(format!("node #{} missing required 'id'", index))
    })?;

    Ok(Node {
        id,
        kind: kind.unwrap_or_else(|| DEFAULT_NODE_KIND.to_string()),
        label,
        attributes,
    })
}

fn parse_link(index: usize, entry: &Value) -> Result<Link, TopologyError> {
    let fields = entry.as_object().ok_or_else(|| {
        TopologyError::schema(format!(
            "link #{} must be an object, found {}",
            index,
            kind_of(entry)
        ))
    })?;

    let from = endpoint(fields, index, "from")?;
    let to = endpoint(fields, index, "to")?;

    let mut attributes = BTreeMap::new();
    for (key, value) in fields.iter().filter(|(k, _)| *k != "from" && *k != "to") {
        let value = parse_scalar(value, || format!("link #{} attribute '{}'", index, key))?;
        attributes.insert(key.clone(), value);
    }

    Ok(Link { from, to, attributes })
}

fn endpoint(fields: &Map<String, Value>, index: usize, key: &str) -> Result<String, TopologyError> {
    let value = fields.get(key).ok_or_else(|| {
        TopologyError::schema(format!("link #{} missing required '{}'", index, key))
    })?;
    match value {
        // Blank endpoints name no node and surface as dangling links
        Value::String(s) => Ok(s.clone()),
        _ => parse_identifier(value, || format!("link #{} '{}'", index, key)),
    }
}

/// Identifiers are non-empty strings; integers are accepted and stringified
fn parse_identifier(value: &Value, what: impl Fn() -> String) -> Result<String, TopologyError> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Ok(s.clone()),
        Value::String(_) => Err(TopologyError::schema(format!("{} must not be empty", what()))),
        Value::Number(n) if n.is_i64() || n.is_u64() => Ok(n.to_string()),
        other => Err(TopologyError::schema(format!(
            "{} must be a string or integer, found {}",
            what(),
            kind_of(other)
        ))),
    }
}

fn parse_text(value: &Value, what: impl Fn() -> String) -> Result<String, TopologyError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        other => Err(TopologyError::schema(format!(
            "{} must be a string, found {}",
            what(),
            kind_of(other)
        ))),
    }
}

fn parse_scalar(value: &Value, what: impl Fn() -> String) -> Result<AttrValue, TopologyError> {
    match value {
        Value::Bool(b) => Ok(AttrValue::Bool(*b)),
        Value::Number(n) => n.as_f64().map(AttrValue::Number).ok_or_else(|| {
            TopologyError::schema(format!("{} is not a representable number", what()))
        }),
        Value::String(s) => Ok(AttrValue::Text(s.clone())),
        other => Err(TopologyError::schema(format!(
            "{} must be a string, number or boolean, found {}",
            what(),
            kind_of(other)
        ))),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_simple_topology() {
        let config = json!({
            "nodes": [
                { "id": "h1", "kind": "host", "ip": "10.0.0.1" },
                { "id": "s1", "kind": "switch", "label": "Core", "ports": 48 }
            ],
            "links": [
                { "from": "h1", "to": "s1", "bandwidth": "1Gbit", "label": "uplink" }
            ]
        });

        let graph = parse_topology(&config).unwrap();

        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.link_count(), 1);
        assert!(graph.neighbors("h1").unwrap().contains("s1"));

        let switch = graph.node("s1").unwrap();
        assert_eq!(switch.kind, "switch");
        assert_eq!(switch.display_label(), "Core");
        assert_eq!(switch.attributes.get("ports"), Some(&AttrValue::Number(48.0)));
        assert_eq!(graph.attribute("h1", "ip"), Some(&AttrValue::Text("10.0.0.1".to_string())));

        let link = &graph.links()[0];
        assert_eq!(link.label().as_deref(), Some("uplink"));
        assert!(!link.attributes.contains_key("from"));
    }

    #[test]
    fn test_default_kind_and_integer_ids() {
        let config = json!({
            "nodes": [ { "id": 1 }, { "id": 2 } ],
            "links": [ { "from": 1, "to": 2 } ]
        });

        let graph = parse_topology(&config).unwrap();
        assert_eq!(graph.node("1").unwrap().kind, DEFAULT_NODE_KIND);
        assert!(graph.neighbors("2").unwrap().contains("1"));
    }

    #[test]
    fn test_missing_nodes_is_schema_error() {
        let err = parse_topology(&json!({ "links": [] })).unwrap_err();
        assert!(matches!(err, TopologyError::Schema(_)));

        let err = parse_topology(&json!({ "nodes": {} })).unwrap_err();
        assert!(matches!(err, TopologyError::Schema(_)));

        let err = parse_topology(&json!([1, 2, 3])).unwrap_err();
        assert!(matches!(err, TopologyError::Schema(_)));
    }

    #[test]
    fn test_missing_links_means_no_links() {
        let graph = parse_topology(&json!({ "nodes": [ { "id": "a" } ] })).unwrap();
        assert_eq!(graph.link_count(), 0);
    }

    #[test]
    fn test_unknown_top_level_keys_ignored() {
        let config = json!({
            "version": 3,
            "meta": { "author": "ops" },
            "nodes": [ { "id": "a" } ],
            "links": []
        });
        assert!(parse_topology(&config).is_ok());
    }

    #[test]
    fn test_node_entry_errors() {
        let cases = vec![
            json!({ "nodes": [ "a" ] }),
            json!({ "nodes": [ { "kind": "host" } ] }),
            json!({ "nodes": [ { "id": "" } ] }),
            json!({ "nodes": [ { "id": 1.5 } ] }),
            json!({ "nodes": [ { "id": "a", "kind": 7 } ] }),
            json!({ "nodes": [ { "id": "a", "tags": ["x"] } ] }),
            json!({ "nodes": [ { "id": "a", "extra": null } ] }),
        ];

        for config in cases {
            let err = parse_topology(&config).unwrap_err();
            assert!(matches!(err, TopologyError::Schema(_)), "{config} gave {err:?}");
        }
    }

    #[test]
    fn test_link_entry_errors() {
        let cases = vec![
            json!({ "nodes": [ { "id": "a" } ], "links": {} }),
            json!({ "nodes": [ { "id": "a" } ], "links": [ 1 ] }),
            json!({ "nodes": [ { "id": "a" } ], "links": [ { "from": "a" } ] }),
            json!({ "nodes": [ { "id": "a" } ], "links": [ { "from": "a", "to": "a" } ] }),
        ];

        for config in cases {
            let err = parse_topology(&config).unwrap_err();
            assert!(matches!(err, TopologyError::Schema(_)), "{config} gave {err:?}");
        }
    }

    #[test]
    fn test_duplicate_node_error() {
        let config = json!({ "nodes": [ { "id": "a" }, { "id": "b" }, { "id": "a" } ] });
        let err = parse_topology(&config).unwrap_err();
        assert!(matches!(err, TopologyError::DuplicateNode { ref id } if id == "a"));
    }

    #[test]
    fn test_dangling_link_error() {
        let config = json!({
            "nodes": [ { "id": "a" }, { "id": "b" } ],
            "links": [ { "from": "a", "to": "b" }, { "from": "ghost", "to": "b" } ]
        });

        match parse_topology(&config).unwrap_err() {
            TopologyError::DanglingLink { index, from, missing, .. } => {
                assert_eq!(index, 1);
                assert_eq!(from, "ghost");
                assert_eq!(missing, "ghost");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_endpoint_always_dangling() {
        let cases = vec![
            (json!({ "from": "Z", "to": "Z" }), "Z"),
            (json!({ "from": "a", "to": "" }), ""),
            (json!({ "from": "  ", "to": "a" }), "  "),
            (json!({ "from": 7, "to": "a" }), "7"),
        ];

        for (link, expected) in cases {
            let config = json!({ "nodes": [ { "id": "a" } ], "links": [ link ] });
            match parse_topology(&config) {
                Err(TopologyError::DanglingLink { index, missing, .. }) => {
                    assert_eq!(index, 0);
                    assert_eq!(missing, expected);
                }
                other => panic!("{config} gave {other:?}"),
            }
        }
    }

    #[test]
    fn test_duplicate_links_counted() {
        let config = json!({
            "nodes": [ { "id": "a" }, { "id": "b" } ],
            "links": [
                { "from": "a", "to": "b" },
                { "from": "a", "to": "b" },
                { "from": "b", "to": "a" }
            ]
        });

        let graph = parse_topology(&config).unwrap();
        assert_eq!(graph.link_count(), 3);
        assert_eq!(graph.degree("a"), 1);
    }
}
