//! Structured diagram description handed to renderers

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::inference::{CollectionSchema, FieldSchema};
use crate::relationships::{Cardinality, Relationship, RelationshipKind};

/// Key marker of a diagram attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum KeyKind {
    /// The document identifier
    Primary,
    /// Source field of a detected relationship
    Foreign,
}

/// One attribute of a diagram node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramField {
    /// Full field path
    pub path: String,
    /// Compact type label (`string`, `int[]`, `mixed`, ...)
    pub type_name: String,
    /// Full unified type (`string(email)`, `(int | string)?`, ...)
    pub display: String,
    /// Present in every enclosing document
    pub required: bool,
    /// Null was observed alongside other values
    pub nullable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<KeyKind>,
}

/// One collection in the diagram
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramNode {
    pub name: String,
    pub fields: Vec<DiagramField>,
    pub sample_count: usize,
}

/// One relationship in the diagram
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramEdge {
    pub source: String,
    pub field: String,
    pub target: String,
    pub kind: RelationshipKind,
    pub cardinality: Cardinality,
}

/// Nodes and edges of one diagram
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramSpec {
    pub nodes: Vec<DiagramNode>,
    pub edges: Vec<DiagramEdge>,
}

impl DiagramField {
    fn from_schema(field: &FieldSchema, foreign_keys: &HashSet<&str>) -> Self {
        let key = if field.path == "_id" {
            Some(KeyKind::Primary)
        } else if foreign_keys.contains(field.path.as_str()) {
            Some(KeyKind::Foreign)
        } else {
            None
        };

        Self {
            path: field.path.clone(),
            type_name: field.ty.short_name(),
            display: field.ty.to_string(),
            required: field.required,
            nullable: field.ty.is_optional(),
            key,
        }
    }
}

impl DiagramSpec {
    /// Build the spec of a set of schemas and their relationships
    ///
    /// Nodes follow schema order and fields follow schema field order.
    /// Relationships whose endpoints are not among `schemas` are ignored.
    pub fn new(schemas: &[CollectionSchema], relationships: &[Relationship]) -> Self {
        let names: HashSet<&str> = schemas.iter().map(CollectionSchema::name).collect();

        let edges: Vec<DiagramEdge> = relationships
            .iter()
            .filter(|rel| {
                names.contains(rel.source_collection.as_str())
                    && names.contains(rel.target_collection.as_str())
            })
            .map(|rel| DiagramEdge {
                source: rel.source_collection.clone(),
                field: rel.source_field.clone(),
                target: rel.target_collection.clone(),
                kind: rel.kind,
                cardinality: rel.cardinality,
            })
            .collect();

        let nodes = schemas
            .iter()
            .map(|schema| {
                let foreign_keys: HashSet<&str> = edges
                    .iter()
                    .filter(|edge| edge.source == schema.name())
                    .map(|edge| edge.field.as_str())
                    .collect();
                DiagramNode {
                    name: schema.name().to_string(),
                    fields: schema
                        .fields()
                        .map(|field| DiagramField::from_schema(field, &foreign_keys))
                        .collect(),
                    sample_count: schema.sample_count(),
                }
            })
            .collect();

        Self { nodes, edges }
    }

    /// Whether the spec has no node
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node names in order
    pub fn node_names(&self) -> Vec<&str> {
        self.nodes.iter().map(|node| node.name.as_str()).collect()
    }

    /// Look up a node
    pub fn node(&self, name: &str) -> Option<&DiagramNode> {
        self.nodes.iter().find(|node| node.name == name)
    }

    /// The same nodes without relationships or foreign key markers
    pub fn without_edges(&self) -> Self {
        let nodes = self
            .nodes
            .iter()
            .cloned()
            .map(|mut node| {
                for field in &mut node.fields {
                    if field.key == Some(KeyKind::Foreign) {
                        field.key = None;
                    }
                }
                node
            })
            .collect();
        Self {
            nodes,
            edges: Vec::new(),
        }
    }

    /// Sub-diagram of one collection
    ///
    /// Contains the collection's node, the edges leaving it and the nodes
    /// those edges point at, in the original node order.
    pub fn for_collection(&self, name: &str) -> Option<Self> {
        self.node(name)?;

        let edges: Vec<DiagramEdge> = self
            .edges
            .iter()
            .filter(|edge| edge.source == name)
            .cloned()
            .collect();

        let mut wanted: HashSet<&str> = edges.iter().map(|edge| edge.target.as_str()).collect();
        wanted.insert(name);

        let nodes = self
            .nodes
            .iter()
            .filter(|node| wanted.contains(node.name.as_str()))
            .cloned()
            .map(|mut node| {
                if node.name != name {
                    // Only the focused collection keeps its outgoing FK markers
                    for field in &mut node.fields {
                        if field.key == Some(KeyKind::Foreign) {
                            field.key = None;
                        }
                    }
                }
                node
            })
            .collect();

        Some(Self { nodes, edges })
    }
}
