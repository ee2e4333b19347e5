//! Convention graph builder.
//!
//! Consumes raw groups one at a time and grows a [`GraphModel`]:
//!
//! 1. classify the group (unknown kinds are dropped),
//! 2. reject a second definition of an id (first one wins, no edges derived),
//! 3. store the group without its `type` discriminator,
//! 4. derive `HasAttribute`, `HasEvent` and `AssociatedWith` edges,
//! 5. give attribute groups a `display_name` when they lack one.

use crate::classify::{classify, Classification};
use crate::graph::GraphModel;
use crate::report::{BuildIssue, BuildReport};
use crate::resolve::{resolve_attributes, resolve_entity_associations, resolve_events};
use crate::types::{Node, NodeType};
use serde_json::Value;

#[derive(Debug, Default)]
pub struct ConventionGraphBuilder {
    model: GraphModel,
    report: BuildReport,
}

impl ConventionGraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn model(&self) -> &GraphModel {
        &self.model
    }

    pub fn report(&self) -> &BuildReport {
        &self.report
    }

    /// Add every group of a parsed document.
    pub fn add_document(&mut self, document: &Value) {
        self.report.documents += 1;
        let Some(document) = document.as_object() else {
            self.report.record(BuildIssue::MalformedDocument {
                reason: "document is not a mapping".to_string(),
            });
            return;
        };
        match document.get("groups") {
            None => {}
            Some(Value::Array(groups)) => {
                for group in groups {
                    self.add_entry(group.clone());
                }
            }
            Some(other) => self.report.record(BuildIssue::MalformedDocument {
                reason: format!("`groups` is not a list: {other}"),
            }),
        }
    }

    /// Add one raw group.
    pub fn add_entry(&mut self, entry: Value) {
        let Value::Object(mut fields) = entry else {
            self.report.record(BuildIssue::MalformedEntry {
                id: None,
                reason: "group is not a mapping".to_string(),
            });
            return;
        };

        let node_type = match classify(&fields) {
            Classification::Known(node_type) => node_type,
            Classification::Unknown { declared } => {
                let id = fields.get("id").and_then(Value::as_str).map(str::to_string);
                self.report.record(BuildIssue::UnknownKind { declared, id });
                return;
            }
        };

        let id = match fields.remove("id") {
            Some(Value::String(id)) => id,
            other => {
                self.report.record(BuildIssue::MalformedEntry {
                    id: other.map(|v| v.to_string()),
                    reason: "group has no string `id`".to_string(),
                });
                return;
            }
        };
        fields.remove("type");

        if let Err(err) = self.model.insert_node(node_type, Node::new(id.clone(), fields)) {
            self.report.record(err);
            return;
        }

        let Some(stored) = self.model.node(node_type, &id) else {
            return;
        };
        let attributes = stored.field("attributes").cloned();
        let events = stored.field("events").cloned();
        let entities = stored.field("entity_associations").cloned();

        let attributes = self.relation_list(&id, "attributes", attributes);
        let events = self.relation_list(&id, "events", events);
        let entities =
            entities.map(|value| self.relation_list(&id, "entity_associations", Some(value)));

        let (model, report) = (&mut self.model, &mut self.report);
        resolve_attributes(model, report, node_type, &id, &attributes);
        resolve_events(model, report, node_type, &id, &events);
        if let Some(entities) = entities {
            resolve_entity_associations(model, report, node_type, &id, &entities);
        }

        if node_type == NodeType::AttributeGroup {
            if let Some(node) = self.model.node_mut(node_type, &id) {
                if !node.fields.contains_key("display_name") {
                    node.fields
                        .insert("display_name".to_string(), Value::String(id.clone()));
                }
            }
        }

        self.report.groups_accepted += 1;
    }

    /// A relation field as a list; absent means empty.
    fn relation_list(&mut self, id: &str, field: &str, value: Option<Value>) -> Vec<Value> {
        match value {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items,
            Some(other) => {
                self.report.record(BuildIssue::MalformedField {
                    id: id.to_string(),
                    field: field.to_string(),
                    reason: format!("expected a list, got {other}"),
                });
                Vec::new()
            }
        }
    }

    pub fn finish(self) -> (GraphModel, BuildReport) {
        (self.model, self.report)
    }
}

/// Build a model from already-parsed documents.
pub fn build_from_documents<'a>(
    documents: impl IntoIterator<Item = &'a Value>,
) -> (GraphModel, BuildReport) {
    let mut builder = ConventionGraphBuilder::new();
    for document in documents {
        builder.add_document(document);
    }
    builder.finish()
}
