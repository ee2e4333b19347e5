use semconv_model::{BuildIssue, ConventionGraphBuilder, EdgeType, NodeType};
use serde_json::json;

#[test]
fn metric_with_reference_and_entity_association() {
    let mut builder = ConventionGraphBuilder::new();
    builder.add_entry(json!({
        "type": "metric",
        "id": "http.server.duration",
        "attributes": [{"ref": "http.method"}],
        "entity_associations": ["server"]
    }));
    let (model, report) = builder.finish();

    assert!(report.is_clean());
    assert_eq!(report.groups_accepted, 1);

    let metric = model
        .node(NodeType::Metric, "http.server.duration")
        .expect("metric stored");
    assert_eq!(metric.field("type"), None);

    let has_attr = model.edges(EdgeType::HasAttribute, NodeType::Metric);
    assert_eq!(has_attr.len(), 1);
    assert_eq!(has_attr[0].from, "http.server.duration");
    assert_eq!(has_attr[0].to, "http.method");

    let assoc = model.edges(EdgeType::AssociatedWith, NodeType::Metric);
    assert_eq!(assoc.len(), 1);
    assert_eq!(assoc[0].from, "http.server.duration");
    assert_eq!(assoc[0].to, "entity.server");

    // A bare reference does not create an attribute node.
    assert!(model.nodes(NodeType::Attribute).unwrap().is_empty());
}

#[test]
fn inline_attribute_becomes_node_without_discriminator() {
    let mut builder = ConventionGraphBuilder::new();
    builder.add_entry(json!({
        "type": "attribute_group",
        "id": "registry.new",
        "attributes": [{"id": "new.attr", "type": "string", "brief": "x"}]
    }));
    let (model, report) = builder.finish();
    assert!(report.is_clean());

    let attr = model.node(NodeType::Attribute, "new.attr").unwrap();
    assert_eq!(attr.field("type"), None);
    assert_eq!(attr.field("brief"), Some(&json!("x")));

    let edges = model.edges(EdgeType::HasAttribute, NodeType::AttributeGroup);
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0].to, "new.attr");
}

#[test]
fn duplicate_group_keeps_first_and_derives_no_edges() {
    let entry = json!({
        "type": "span",
        "id": "span.http.client",
        "brief": "first",
        "attributes": [{"ref": "http.request.method"}],
        "events": ["exception"]
    });
    let mut second = entry.clone();
    second["brief"] = json!("second");

    let mut builder = ConventionGraphBuilder::new();
    builder.add_entry(entry);
    builder.add_entry(second);
    let (model, report) = builder.finish();

    assert_eq!(model.nodes(NodeType::Span).unwrap().len(), 1);
    assert_eq!(
        model.node(NodeType::Span, "span.http.client").unwrap().field("brief"),
        Some(&json!("first"))
    );
    assert_eq!(model.edges(EdgeType::HasAttribute, NodeType::Span).len(), 1);
    assert_eq!(model.edges(EdgeType::HasEvent, NodeType::Span).len(), 1);

    let duplicates: Vec<_> = report.duplicates().collect();
    assert_eq!(duplicates.len(), 1);
    match duplicates[0] {
        BuildIssue::DuplicateNode { node_type, id, .. } => {
            assert_eq!(*node_type, NodeType::Span);
            assert_eq!(id, "span.http.client");
        }
        other => panic!("unexpected issue {other:?}"),
    }
}

#[test]
fn same_id_in_different_tables_is_allowed() {
    let mut builder = ConventionGraphBuilder::new();
    builder.add_entry(json!({"type": "metric", "id": "db.client"}));
    builder.add_entry(json!({"type": "span", "id": "db.client"}));
    let (model, report) = builder.finish();

    assert!(report.is_clean());
    assert!(model.node(NodeType::Metric, "db.client").is_some());
    assert!(model.node(NodeType::Span, "db.client").is_some());
}

#[test]
fn unknown_kind_is_dropped_and_reported() {
    let mut builder = ConventionGraphBuilder::new();
    builder.add_entry(json!({
        "type": "resource",
        "id": "legacy.resource",
        "attributes": [{"id": "orphan", "type": "string"}]
    }));
    builder.add_entry(json!({"type": "attribute", "id": "top.level.attr"}));
    let (model, report) = builder.finish();

    assert_eq!(model.node_count(), 0);
    assert_eq!(model.edge_count(), 0);
    assert_eq!(report.unknown_kinds().count(), 2);
    assert_eq!(report.groups_accepted, 0);
}

#[test]
fn attribute_group_gets_display_name() {
    let mut builder = ConventionGraphBuilder::new();
    builder.add_entry(json!({"type": "attribute_group", "id": "registry.http"}));
    builder.add_entry(json!({
        "type": "attribute_group",
        "id": "registry.url",
        "display_name": "URL Attributes"
    }));
    builder.add_entry(json!({"type": "metric", "id": "m"}));
    let (model, _) = builder.finish();

    assert_eq!(
        model.node(NodeType::AttributeGroup, "registry.http").unwrap().field("display_name"),
        Some(&json!("registry.http"))
    );
    assert_eq!(
        model.node(NodeType::AttributeGroup, "registry.url").unwrap().field("display_name"),
        Some(&json!("URL Attributes"))
    );
    assert_eq!(model.node(NodeType::Metric, "m").unwrap().field("display_name"), None);
}

#[test]
fn span_events_are_qualified() {
    let mut builder = ConventionGraphBuilder::new();
    builder.add_entry(json!({
        "type": "span",
        "id": "span.rpc",
        "events": ["rpc.message", "event.exception"]
    }));
    let (model, _) = builder.finish();

    let to: Vec<_> = model
        .edges(EdgeType::HasEvent, NodeType::Span)
        .iter()
        .map(|e| e.to.as_str())
        .collect();
    assert_eq!(to, vec!["event.rpc.message", "event.exception"]);
}

#[test]
fn malformed_groups_are_reported() {
    let mut builder = ConventionGraphBuilder::new();
    builder.add_entry(json!("not a mapping"));
    builder.add_entry(json!({"type": "metric"}));
    builder.add_entry(json!({"type": "metric", "id": "m", "events": "oops"}));
    let (model, report) = builder.finish();

    assert_eq!(report.issues.len(), 3);
    // The group with a bad relation field is still stored.
    assert!(model.node(NodeType::Metric, "m").is_some());
    assert_eq!(report.groups_accepted, 1);
}

#[test]
fn documents_contribute_their_groups() {
    let mut builder = ConventionGraphBuilder::new();
    builder.add_document(&json!({
        "groups": [
            {"type": "entity", "id": "entity.server"},
            {"type": "event", "id": "event.exception"}
        ]
    }));
    builder.add_document(&json!({"something_else": true}));
    builder.add_document(&json!({"groups": "nope"}));
    let (model, report) = builder.finish();

    assert_eq!(report.documents, 3);
    assert_eq!(model.node_count(), 2);
    assert_eq!(report.issues.len(), 1);
}

#[test]
fn every_has_attribute_edge_resolves_after_inline_definitions() {
    let mut builder = ConventionGraphBuilder::new();
    builder.add_entry(json!({
        "type": "attribute_group",
        "id": "registry.http",
        "attributes": [
            {"id": "http.request.method", "type": "string"},
            {"id": "http.response.status_code", "type": "int"}
        ]
    }));
    builder.add_entry(json!({
        "type": "metric",
        "id": "http.client.request.duration",
        "attributes": [
            {"ref": "http.request.method", "requirement_level": "required"},
            {"ref": "http.response.status_code",
             "requirement_level": {"conditionally_required": "If one was received."}}
        ]
    }));
    let (model, _) = builder.finish();

    let dangling: Vec<_> = model
        .dangling_edges()
        .into_iter()
        .filter(|d| d.edge_type == EdgeType::HasAttribute)
        .collect();
    assert!(dangling.is_empty(), "{dangling:?}");

    let edges = model.edges(EdgeType::HasAttribute, NodeType::Metric);
    assert_eq!(edges[1].property("requirement_level"), Some(&json!("conditionally_required")));
    assert_eq!(edges[1].property("condition"), Some(&json!("If one was received.")));
}
