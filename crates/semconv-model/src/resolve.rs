//! Relation resolvers: turn a group's `attributes`, `events` and
//! `entity_associations` fields into edges.

use crate::graph::GraphModel;
use crate::report::{BuildIssue, BuildReport};
use crate::types::{Edge, EdgeType, Fields, Node, NodeType};
use serde_json::Value;

/// Resolve attribute descriptors into `HasAttribute` edges from `source_id`.
///
/// A descriptor with `ref` points at a shared attribute: the remaining
/// descriptor fields become per-usage edge properties. A descriptor without
/// `ref` is a full definition and is registered as an attribute node.
/// Edges are emitted in descriptor order.
///
/// A second inline definition of an already registered id is reported as a
/// duplicate but still linked: the edge points at the first definition, so
/// an id defined in two groups gets one edge from each.
///
/// Descriptor keys that collide with the edge endpoints (`from`, `to`) are
/// dropped and reported; the edge keeps `source_id` and the `ref` target.
pub fn resolve_attributes(
    model: &mut GraphModel,
    report: &mut BuildReport,
    source_type: NodeType,
    source_id: &str,
    descriptors: &[Value],
) {
    for (position, descriptor) in descriptors.iter().enumerate() {
        let Some(fields) = descriptor.as_object() else {
            report.record(BuildIssue::MalformedAttribute {
                source_id: source_id.to_string(),
                position,
                reason: "descriptor is not a mapping".to_string(),
            });
            continue;
        };
        let mut fields = fields.clone();

        let edge = match fields.remove("ref") {
            Some(Value::String(target)) => {
                for key in Edge::ENDPOINT_KEYS {
                    if let Some(value) = fields.remove(key) {
                        report.record(BuildIssue::ReservedProperty {
                            source_id: source_id.to_string(),
                            position,
                            key: key.to_string(),
                            value,
                        });
                    }
                }
                flatten_requirement_level(&mut fields);
                if let Some(examples) = fields.get_mut("examples") {
                    *examples = Value::String(collapse_examples(examples));
                }
                Edge::new(source_id, target).with_properties(fields)
            }
            Some(other) => {
                report.record(BuildIssue::MalformedAttribute {
                    source_id: source_id.to_string(),
                    position,
                    reason: format!("`ref` is not a string: {other}"),
                });
                continue;
            }
            None => {
                fields.remove("type");
                let id = match fields.remove("id") {
                    Some(Value::String(id)) => id,
                    _ => {
                        report.record(BuildIssue::MalformedAttribute {
                            source_id: source_id.to_string(),
                            position,
                            reason: "inline attribute has no string `id`".to_string(),
                        });
                        continue;
                    }
                };
                // A rejected duplicate still gets its edge: the retained
                // definition carries the same id.
                if let Err(err) = model.register_attribute(Node::new(id.clone(), fields)) {
                    report.record(err);
                }
                Edge::new(source_id, id)
            }
        };

        model.push_edge(EdgeType::HasAttribute, source_type, edge);
    }
}

/// Resolve bare event names into `HasEvent` edges.
pub fn resolve_events(
    model: &mut GraphModel,
    report: &mut BuildReport,
    source_type: NodeType,
    source_id: &str,
    events: &[Value],
) {
    resolve_references(model, report, EdgeType::HasEvent, source_type, source_id, events);
}

/// Resolve bare entity names into `AssociatedWith` edges.
pub fn resolve_entity_associations(
    model: &mut GraphModel,
    report: &mut BuildReport,
    source_type: NodeType,
    source_id: &str,
    entities: &[Value],
) {
    resolve_references(
        model,
        report,
        EdgeType::AssociatedWith,
        source_type,
        source_id,
        entities,
    );
}

fn resolve_references(
    model: &mut GraphModel,
    report: &mut BuildReport,
    edge_type: EdgeType,
    source_type: NodeType,
    source_id: &str,
    identifiers: &[Value],
) {
    for (position, identifier) in identifiers.iter().enumerate() {
        let Some(identifier) = identifier.as_str() else {
            report.record(BuildIssue::MalformedReference {
                edge_type,
                source_id: source_id.to_string(),
                position,
                value: identifier.clone(),
            });
            continue;
        };
        let to = match edge_type.namespace_prefix() {
            Some(prefix) => qualify(identifier, prefix),
            None => identifier.to_string(),
        };
        model.push_edge(edge_type, source_type, Edge::new(source_id, to));
    }
}

/// Qualify a possibly-short name with `prefix`.
///
/// Best-effort: the result is not checked against the node tables.
pub fn qualify(identifier: &str, prefix: &str) -> String {
    if identifier.starts_with(prefix) {
        identifier.to_string()
    } else {
        format!("{prefix}{identifier}")
    }
}

/// Flatten a compound `requirement_level` into `requirement_level` +
/// `condition`.
///
/// Only `conditionally_required` and `recommended` are understood; both are
/// checked, so `recommended` wins when both are present. Any other compound
/// value is left as is.
pub fn flatten_requirement_level(properties: &mut Fields) {
    let Some(Value::Object(level)) = properties.get("requirement_level") else {
        return;
    };
    let level = level.clone();
    for key in ["conditionally_required", "recommended"] {
        if let Some(condition) = level.get(key) {
            properties.insert("condition".to_string(), condition.clone());
            properties.insert("requirement_level".to_string(), Value::String(key.to_string()));
        }
    }
}

/// Collapse an `examples` value into one newline-joined string.
pub fn collapse_examples(examples: &Value) -> String {
    match examples {
        Value::Array(items) => items
            .iter()
            .map(scalar_text)
            .collect::<Vec<_>>()
            .join("\n"),
        other => scalar_text(other),
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
