//! The live, position-bearing twin of the canonical graph.

use std::collections::HashMap;

use indexmap::IndexMap;
use log::{debug, warn};

use super::camera::BBox;
use super::types::{EdgeAttributes, NodeAttributes, RenderEdge, RenderNode};
use crate::config::theme;
use crate::graph::{EdgeIdTable, EdgeKey, RawGraph};

/// Mutable graph the layout engine and interaction controller work on.
#[derive(Clone, Debug, Default)]
pub struct RenderGraph {
	nodes: IndexMap<String, RenderNode>,
	edges: IndexMap<EdgeKey, RenderEdge>,
	incident: HashMap<String, Vec<EdgeKey>>,
	next_edge_key: u32,
}

impl RenderGraph {
	pub fn node_count(&self) -> usize {
		self.nodes.len()
	}

	pub fn edge_count(&self) -> usize {
		self.edges.len()
	}

	/// Register a node. Returns false if the id is taken.
	pub fn add_node(&mut self, id: &str, x: f64, y: f64, attrs: NodeAttributes) -> bool {
		if self.nodes.contains_key(id) {
			return false;
		}
		self.nodes.insert(id.to_string(), RenderNode { x, y, attrs });
		self.incident.insert(id.to_string(), Vec::new());
		true
	}

	/// Remove a node and every edge touching it.
	pub fn remove_node(&mut self, id: &str) -> bool {
		let Some(keys) = self.incident.remove(id) else {
			return false;
		};
		for key in keys {
			self.remove_edge(key);
		}
		self.nodes.shift_remove(id).is_some()
	}

	/// Register an edge; the graph assigns its key. `None` if an endpoint is missing.
	pub fn add_edge(&mut self, source: &str, target: &str, attrs: EdgeAttributes) -> Option<EdgeKey> {
		if !self.has_node(source) || !self.has_node(target) {
			return None;
		}
		let key = EdgeKey(self.next_edge_key);
		self.next_edge_key += 1;
		self.edges.insert(
			key,
			RenderEdge {
				source: source.to_string(),
				target: target.to_string(),
				attrs,
			},
		);
		for end in [source, target] {
			if let Some(keys) = self.incident.get_mut(end) {
				if !keys.contains(&key) {
					keys.push(key);
				}
			}
		}
		Some(key)
	}

	pub fn remove_edge(&mut self, key: EdgeKey) -> bool {
		let Some(edge) = self.edges.shift_remove(&key) else {
			return false;
		};
		for end in [&edge.source, &edge.target] {
			if let Some(keys) = self.incident.get_mut(end) {
				keys.retain(|k| *k != key);
			}
		}
		true
	}

	pub fn has_node(&self, id: &str) -> bool {
		self.nodes.contains_key(id)
	}

	pub fn has_edge(&self, key: EdgeKey) -> bool {
		self.edges.contains_key(&key)
	}

	pub fn node(&self, id: &str) -> Option<&RenderNode> {
		self.nodes.get(id)
	}

	pub fn edge(&self, key: EdgeKey) -> Option<&RenderEdge> {
		self.edges.get(&key)
	}

	pub fn nodes(&self) -> impl Iterator<Item = (&str, &RenderNode)> {
		self.nodes.iter().map(|(id, node)| (id.as_str(), node))
	}

	pub fn nodes_mut(&mut self) -> impl Iterator<Item = (&str, &mut RenderNode)> {
		self.nodes.iter_mut().map(|(id, node)| (id.as_str(), node))
	}

	pub fn edges(&self) -> impl Iterator<Item = (EdgeKey, &RenderEdge)> {
		self.edges.iter().map(|(key, edge)| (*key, edge))
	}

	/// Edges touching `id`.
	pub fn incident_edges(&self, id: &str) -> &[EdgeKey] {
		self.incident.get(id).map(Vec::as_slice).unwrap_or(&[])
	}

	/// Distinct nodes sharing an edge with `id`, `None` if `id` is unknown.
	pub fn neighbors(&self, id: &str) -> Option<Vec<&str>> {
		let keys = self.incident.get(id)?;
		let mut out: Vec<&str> = Vec::with_capacity(keys.len());
		for key in keys {
			let Some(edge) = self.edges.get(key) else {
				continue;
			};
			let other = if edge.source == id { &edge.target } else { &edge.source };
			if other != id && !out.contains(&other.as_str()) {
				out.push(other.as_str());
			}
		}
		Some(out)
	}

	/// Both endpoints of an edge.
	pub fn extremities(&self, key: EdgeKey) -> Option<(&str, &str)> {
		self.edges
			.get(&key)
			.map(|edge| (edge.source.as_str(), edge.target.as_str()))
	}

	pub fn set_node_position(&mut self, id: &str, x: f64, y: f64) -> bool {
		match self.nodes.get_mut(id) {
			Some(node) => {
				node.x = x;
				node.y = y;
				true
			}
			None => false,
		}
	}

	pub fn set_node_highlighted(&mut self, id: &str, highlighted: bool) {
		if let Some(node) = self.nodes.get_mut(id) {
			node.attrs.highlighted = highlighted;
		}
	}

	/// Bounding box of all node positions.
	pub fn bbox(&self) -> Option<BBox> {
		BBox::around(self.nodes.values().map(|node| (node.x, node.y)))
	}
}

/// Result of building the render graph: the graph plus the edge key table.
#[derive(Clone, Debug)]
pub struct BuiltGraph {
	pub graph: RenderGraph,
	pub edge_ids: EdgeIdTable,
}

/// Build the render graph for a canonical graph. `None` for a missing or empty graph.
///
/// Node positions come from the id-seeded unit-square positions of the canonical
/// graph, stretched over a `spread`-wide square centred on the origin.
pub fn build(raw: Option<&RawGraph>, spread: f64) -> Option<BuiltGraph> {
	let raw = raw.filter(|raw| !raw.is_empty())?;
	let mut graph = RenderGraph::default();

	for node in raw.nodes() {
		let attrs = NodeAttributes {
			label: node.label(),
			color: node.color,
			size: node.size,
			border_color: theme::NODE_BORDER,
			border_size: 0.2,
			highlighted: false,
		};
		let (x, y) = ((node.x - 0.5) * spread, (node.y - 0.5) * spread);
		if !graph.add_node(&node.id, x, y, attrs) {
			warn!("duplicate node {} not added to render graph", node.id);
		}
	}

	let mut edge_ids = EdgeIdTable::default();
	for (idx, edge) in raw.edges().iter().enumerate() {
		if !graph.has_node(&edge.source) {
			warn!("source node not found: {}", edge.source);
			continue;
		}
		if !graph.has_node(&edge.target) {
			warn!("target node not found: {}", edge.target);
			continue;
		}
		let weight = edge.properties.weight;
		let attrs = EdgeAttributes {
			label: Some(edge.properties.keywords.clone()).filter(|k| !k.is_empty()),
			size: weight as f64,
			original_weight: weight,
		};
		if let Some(key) = graph.add_edge(&edge.source, &edge.target, attrs) {
			edge_ids.insert(key, idx);
		}
	}

	debug!(
		"render graph built: {} nodes, {} edges",
		graph.node_count(),
		graph.edge_count()
	);
	Some(BuiltGraph { graph, edge_ids })
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::loader::{EntitiesDocument, RelationsDocument, assemble};
	use crate::graph::types::GraphData;

	fn attrs() -> NodeAttributes {
		NodeAttributes {
			label: String::new(),
			color: "#000",
			size: 4.0,
			border_color: theme::NODE_BORDER,
			border_size: 0.2,
			highlighted: false,
		}
	}

	fn edge_attrs() -> EdgeAttributes {
		EdgeAttributes {
			label: None,
			size: 1.0,
			original_weight: 1,
		}
	}

	fn raw(entities: &str, relations: &str) -> RawGraph {
		RawGraph::from_data(assemble(
			&EntitiesDocument::parse(entities).unwrap(),
			&RelationsDocument::parse(relations).unwrap(),
		))
	}

	#[test]
	fn empty_or_missing_graph_builds_nothing() {
		assert!(build(None, 100.0).is_none());
		assert!(build(Some(&RawGraph::from_data(GraphData::default())), 100.0).is_none());
	}

	#[test]
	fn build_copies_nodes_and_maps_edge_keys() {
		let raw = raw(
			r#"{ "d": { "entity_names": ["Alice", "Acme Corp", "Bob"] } }"#,
			r#"{ "d": { "relation_pairs": [["Alice", "Acme Corp"], ["Alice", "Acme Corp"], ["Bob", "Alice"]] } }"#,
		);
		let built = build(Some(&raw), 100.0).unwrap();
		assert_eq!(built.graph.node_count(), 3);
		assert_eq!(built.graph.edge_count(), 2);
		assert_eq!(built.edge_ids.len(), 2);

		for (key, edge) in built.graph.edges() {
			let canonical = raw.edge_by_key(&built.edge_ids, key).unwrap();
			assert_eq!((edge.source.as_str(), edge.target.as_str()), (canonical.source.as_str(), canonical.target.as_str()));
			assert_eq!(edge.attrs.original_weight, canonical.properties.weight);
		}

		let alice = built.graph.node("Alice").unwrap();
		assert_eq!(alice.attrs.color, raw.get_node("Alice").unwrap().color);
		assert!(alice.x.abs() <= 50.0 && alice.y.abs() <= 50.0);
	}

	#[test]
	fn positions_are_reproducible() {
		let raw = raw(r#"{ "d": { "entity_names": ["A", "B", "C"] } }"#, "{}");
		let a = build(Some(&raw), 100.0).unwrap().graph;
		let b = build(Some(&raw), 100.0).unwrap().graph;
		for (id, node) in a.nodes() {
			let other = b.node(id).unwrap();
			assert_eq!((node.x, node.y), (other.x, other.y));
		}
	}

	#[test]
	fn edges_need_both_endpoints() {
		let mut g = RenderGraph::default();
		g.add_node("a", 0.0, 0.0, attrs());
		assert!(g.add_edge("a", "ghost", edge_attrs()).is_none());
		assert!(!g.add_node("a", 1.0, 1.0, attrs()));
		assert_eq!(g.edge_count(), 0);
	}

	#[test]
	fn neighbor_and_incidence_queries() {
		let mut g = RenderGraph::default();
		for id in ["a", "b", "c"] {
			g.add_node(id, 0.0, 0.0, attrs());
		}
		let ab = g.add_edge("a", "b", edge_attrs()).unwrap();
		let ba = g.add_edge("b", "a", edge_attrs()).unwrap();
		g.add_edge("c", "a", edge_attrs()).unwrap();

		assert_ne!(ab, ba);
		assert_eq!(g.neighbors("a").unwrap(), vec!["b", "c"]);
		assert_eq!(g.incident_edges("b"), &[ab, ba]);
		assert_eq!(g.extremities(ab), Some(("a", "b")));
		assert!(g.neighbors("zzz").is_none());

		assert!(g.remove_node("a"));
		assert_eq!(g.edge_count(), 0);
		assert!(g.incident_edges("b").is_empty());
		assert!(!g.has_edge(ab));
	}

	#[test]
	fn bbox_spans_positions() {
		let mut g = RenderGraph::default();
		assert!(g.bbox().is_none());
		g.add_node("a", -2.0, 1.0, attrs());
		g.add_node("b", 3.0, 5.0, attrs());
		let bbox = g.bbox().unwrap();
		assert_eq!((bbox.min_x, bbox.min_y, bbox.max_x, bbox.max_y), (-2.0, 1.0, 3.0, 5.0));
	}
}
