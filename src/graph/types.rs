//! Node and link records exchanged between the loader and the graph model.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::classify::EntityType;

/// Typed attributes of an entity, plus an open bag for provenance fields.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeProperties {
	/// Stable key the entity was extracted under.
	pub entity_id: String,
	/// Category assigned by the classifier.
	pub entity_type: EntityType,
	/// Free-text description.
	pub description: String,
	/// Originating chunk or document.
	pub source_id: String,
	/// Originating file.
	pub file_path: String,
	/// Anything else carried by the source record.
	#[serde(flatten)]
	pub extra: BTreeMap<String, Value>,
}

/// Typed attributes of a relation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EdgeProperties {
	/// Number of source records that produced this (source, target) pair.
	pub weight: u32,
	/// Comma-separated keywords; used as the edge label when non-empty.
	pub keywords: String,
	/// Free-text description.
	pub description: String,
	/// Anything else carried by the source record.
	#[serde(flatten)]
	pub extra: BTreeMap<String, Value>,
}

/// An entity as loaded, before any derived visual attributes exist.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphNode {
	/// Display name; unique within a dataset.
	pub id: String,
	/// Display strings, normally just the name.
	pub labels: Vec<String>,
	/// Typed attributes.
	pub properties: NodeProperties,
}

/// A relation as loaded: one per ordered (source, target) pair.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphLink {
	/// Sequence-based id, `edge-<n>`.
	pub id: String,
	/// Source node id.
	pub source: String,
	/// Target node id.
	pub target: String,
	/// Free-form relation type.
	pub edge_type: String,
	/// Typed attributes.
	pub properties: EdgeProperties,
}

/// Output of the dataset loader.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphData {
	/// Unique entities in first-seen order.
	pub nodes: Vec<GraphNode>,
	/// Aggregated relations in first-seen order.
	pub links: Vec<GraphLink>,
}

impl GraphData {
	/// True when the dataset has no entities at all.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}
}

/// A node of the canonical graph, with derived visual attributes.
#[derive(Clone, Debug, PartialEq)]
pub struct RawNode {
	/// Display name; unique within the graph.
	pub id: String,
	/// Display strings.
	pub labels: Vec<String>,
	/// Typed attributes.
	pub properties: NodeProperties,
	/// Rendered radius, derived from degree.
	pub size: f64,
	/// Snapshot x position.
	pub x: f64,
	/// Snapshot y position.
	pub y: f64,
	/// Fill color, derived from the category.
	pub color: &'static str,
	/// Number of incident edges.
	pub degree: usize,
}

impl RawNode {
	/// Label shown next to the node.
	pub fn label(&self) -> String {
		self.labels.join(", ")
	}
}

/// An edge of the canonical graph.
#[derive(Clone, Debug, PartialEq)]
pub struct RawEdge {
	/// Stable id assigned at load time.
	pub id: String,
	/// Source node id.
	pub source: String,
	/// Target node id.
	pub target: String,
	/// Free-form relation type.
	pub edge_type: String,
	/// Typed attributes.
	pub properties: EdgeProperties,
}
