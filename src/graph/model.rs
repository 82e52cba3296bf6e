//! Canonical in-memory graph built from loader output.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hasher;

use log::{info, warn};
use twox_hash::XxHash64;

use super::classify::EntityType;
use super::types::{GraphData, RawEdge, RawNode};
use crate::config::{MAX_NODE_SIZE, MIN_NODE_SIZE};

/// Identifier the render layer assigns to an edge when it registers it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeKey(pub u32);

impl fmt::Display for EdgeKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "e{}", self.0)
	}
}

/// Mapping between render-layer edge keys and canonical edge indices,
/// produced by the render graph builder.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EdgeIdTable {
	by_key: HashMap<EdgeKey, usize>,
	by_index: HashMap<usize, EdgeKey>,
}

impl EdgeIdTable {
	/// Record that edge `index` of the canonical graph was registered as `key`.
	pub fn insert(&mut self, key: EdgeKey, index: usize) {
		self.by_key.insert(key, index);
		self.by_index.insert(index, key);
	}

	/// Canonical edge index for a render-layer key.
	pub fn index_of(&self, key: EdgeKey) -> Option<usize> {
		self.by_key.get(&key).copied()
	}

	/// Render-layer key of a canonical edge, if it was registered.
	pub fn key_of(&self, index: usize) -> Option<EdgeKey> {
		self.by_index.get(&index).copied()
	}

	/// Number of registered edges.
	pub fn len(&self) -> usize {
		self.by_key.len()
	}

	/// True when no edge was registered.
	pub fn is_empty(&self) -> bool {
		self.by_key.is_empty()
	}
}

/// Reproducible position in the unit square derived from a node id.
pub fn seeded_position(id: &str) -> (f64, f64) {
	let mut hasher = XxHash64::with_seed(0);
	hasher.write(id.as_bytes());
	let hash = hasher.finish();
	let unit = |bits: u64| (bits & 0xffff_ffff) as f64 / u32::MAX as f64;
	(unit(hash), unit(hash >> 32))
}

/// Radius for a node of `degree`, square-root scaled over the degree range.
pub fn node_size(degree: usize, min_degree: usize, max_degree: usize) -> f64 {
	let range = max_degree.saturating_sub(min_degree).max(1) as f64;
	let t = (degree.saturating_sub(min_degree) as f64 / range).sqrt();
	MIN_NODE_SIZE + (MAX_NODE_SIZE - MIN_NODE_SIZE) * t
}

/// The canonical graph of one loaded dataset.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawGraph {
	nodes: Vec<RawNode>,
	edges: Vec<RawEdge>,
	node_id_map: HashMap<String, usize>,
	edge_id_map: HashMap<String, usize>,
}

impl RawGraph {
	/// Build the canonical graph and derive degree, size and color.
	pub fn from_data(data: GraphData) -> Self {
		let mut graph = RawGraph::default();

		for node in data.nodes {
			if graph.node_id_map.contains_key(&node.id) {
				warn!("duplicate entity {} ignored", node.id);
				continue;
			}
			let (x, y) = seeded_position(&node.id);
			graph.node_id_map.insert(node.id.clone(), graph.nodes.len());
			graph.nodes.push(RawNode {
				color: node.properties.entity_type.color(),
				id: node.id,
				labels: node.labels,
				properties: node.properties,
				size: MIN_NODE_SIZE,
				x,
				y,
				degree: 0,
			});
		}

		for link in data.links {
			if !graph.node_id_map.contains_key(&link.source)
				|| !graph.node_id_map.contains_key(&link.target)
			{
				warn!(
					"edge {} dropped: {} -> {} references a missing node",
					link.id, link.source, link.target
				);
				continue;
			}
			graph.edge_id_map.insert(link.id.clone(), graph.edges.len());
			graph.edges.push(RawEdge {
				id: link.id,
				source: link.source,
				target: link.target,
				edge_type: link.edge_type,
				properties: link.properties,
			});
		}

		graph.derive_visuals();
		graph
	}

	/// Recompute degree, size and color from the current edge set.
	fn derive_visuals(&mut self) {
		let mut degrees = vec![0usize; self.nodes.len()];
		for edge in &self.edges {
			for id in [&edge.source, &edge.target] {
				if let Some(&idx) = self.node_id_map.get(id) {
					degrees[idx] += 1;
				}
			}
		}
		let min_degree = degrees.iter().copied().min().unwrap_or(0);
		let max_degree = degrees.iter().copied().max().unwrap_or(0);
		for (node, degree) in self.nodes.iter_mut().zip(degrees) {
			node.degree = degree;
			node.size = node_size(degree, min_degree, max_degree);
			node.color = node.properties.entity_type.color();
		}
	}

	/// Nodes in load order.
	pub fn nodes(&self) -> &[RawNode] {
		&self.nodes
	}

	/// Edges in load order.
	pub fn edges(&self) -> &[RawEdge] {
		&self.edges
	}

	/// True when the graph has no nodes.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	/// Index of a node in [`RawGraph::nodes`].
	pub fn node_index(&self, id: &str) -> Option<usize> {
		self.node_id_map.get(id).copied()
	}

	/// Look up a node by id.
	pub fn get_node(&self, id: &str) -> Option<&RawNode> {
		self.node_index(id).map(|idx| &self.nodes[idx])
	}

	/// Look up an edge by its load-time id.
	pub fn get_edge(&self, id: &str) -> Option<&RawEdge> {
		self.edge_id_map.get(id).map(|&idx| &self.edges[idx])
	}

	/// Look up an edge by the key the render layer assigned to it.
	pub fn edge_by_key(&self, table: &EdgeIdTable, key: EdgeKey) -> Option<&RawEdge> {
		table.index_of(key).and_then(|idx| self.edges.get(idx))
	}

	/// Node count per category, most frequent first.
	pub fn category_counts(&self) -> Vec<(EntityType, usize)> {
		let mut counts: HashMap<EntityType, usize> = HashMap::new();
		for node in &self.nodes {
			*counts.entry(node.properties.entity_type).or_default() += 1;
		}
		let mut counts: Vec<_> = counts.into_iter().collect();
		counts.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
		counts
	}

	/// Log the per-category distribution of the graph.
	pub fn log_summary(&self, dataset: &str) {
		info!(
			"graph loaded for {dataset}: {} nodes, {} edges",
			self.nodes.len(),
			self.edges.len()
		);
		let total = self.nodes.len().max(1) as f64;
		for (ty, count) in self.category_counts() {
			info!(
				"  {ty}: {count} ({:.1}%) {}",
				count as f64 * 100.0 / total,
				ty.color()
			);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::loader::{EntitiesDocument, RelationsDocument, assemble};

	fn graph(entities: &str, relations: &str) -> RawGraph {
		RawGraph::from_data(assemble(
			&EntitiesDocument::parse(entities).unwrap(),
			&RelationsDocument::parse(relations).unwrap(),
		))
	}

	fn star() -> RawGraph {
		graph(
			r#"{ "d": { "entity_names": ["hub", "a", "b", "c", "lone"] } }"#,
			r#"{ "d": { "relation_pairs": [["hub", "a"], ["hub", "b"], ["c", "hub"], ["a", "b"]] } }"#,
		)
	}

	#[test]
	fn degree_counts_incident_edges() {
		let g = star();
		let degree = |id: &str| g.get_node(id).unwrap().degree;
		assert_eq!(degree("hub"), 3);
		assert_eq!(degree("a"), 2);
		assert_eq!(degree("c"), 1);
		assert_eq!(degree("lone"), 0);
		for node in g.nodes() {
			let incident = g
				.edges()
				.iter()
				.filter(|e| e.source == node.id || e.target == node.id)
				.count();
			assert_eq!(node.degree, incident);
		}
	}

	#[test]
	fn degree_ignores_load_order() {
		let a = star();
		let b = graph(
			r#"{ "d": { "entity_names": ["lone", "c", "b", "a", "hub"] } }"#,
			r#"{ "d": { "relation_pairs": [["a", "b"], ["c", "hub"], ["hub", "b"], ["hub", "a"]] } }"#,
		);
		for node in a.nodes() {
			let other = b.get_node(&node.id).unwrap();
			assert_eq!(node.degree, other.degree);
			assert_eq!(node.size, other.size);
		}
	}

	#[test]
	fn size_spans_range_and_grows_with_degree() {
		let g = star();
		let size = |id: &str| g.get_node(id).unwrap().size;
		assert_eq!(size("lone"), MIN_NODE_SIZE);
		assert_eq!(size("hub"), MAX_NODE_SIZE);
		let mut nodes: Vec<_> = g.nodes().iter().collect();
		nodes.sort_by_key(|n| n.degree);
		for pair in nodes.windows(2) {
			assert!(pair[0].size <= pair[1].size);
		}
	}

	#[test]
	fn size_of_uniform_degrees_is_minimum() {
		assert_eq!(node_size(3, 3, 3), MIN_NODE_SIZE);
		assert_eq!(node_size(0, 0, 0), MIN_NODE_SIZE);
	}

	#[test]
	fn color_follows_category() {
		let g = graph(r#"{ "d": { "entity_names": ["Alice", "Acme Corp"] } }"#, "{}");
		assert_eq!(g.get_node("Alice").unwrap().color, EntityType::Unknown.color());
		assert_eq!(g.get_node("Acme Corp").unwrap().color, EntityType::Organization.color());
	}

	#[test]
	fn lookups_return_the_indexed_objects() {
		let g = star();
		for node in g.nodes() {
			let idx = g.node_index(&node.id).unwrap();
			assert!(std::ptr::eq(g.get_node(&node.id).unwrap(), &g.nodes()[idx]));
		}
		for edge in g.edges() {
			assert_eq!(g.get_edge(&edge.id).unwrap(), edge);
		}
		assert!(g.get_node("nobody").is_none());
		assert!(g.get_edge("edge-99").is_none());
	}

	#[test]
	fn edges_with_missing_endpoints_are_not_stored() {
		let mut data = star_data();
		data.links[0].target = "ghost".into();
		let g = RawGraph::from_data(data);
		assert_eq!(g.edges().len(), 3);
		assert!(g.get_edge("edge-0").is_none());
	}

	fn star_data() -> GraphData {
		assemble(
			&EntitiesDocument::parse(r#"{ "d": { "entity_names": ["hub", "a", "b", "c"] } }"#).unwrap(),
			&RelationsDocument::parse(
				r#"{ "d": { "relation_pairs": [["hub", "a"], ["hub", "b"], ["c", "hub"], ["a", "b"]] } }"#,
			)
			.unwrap(),
		)
	}

	#[test]
	fn reloading_yields_identical_graph() {
		assert_eq!(star(), star());
	}

	#[test]
	fn seeded_positions_are_stable_and_in_unit_square() {
		let (x, y) = seeded_position("Alice");
		assert_eq!((x, y), seeded_position("Alice"));
		assert!((0.0..=1.0).contains(&x) && (0.0..=1.0).contains(&y));
		assert_ne!(seeded_position("Alice"), seeded_position("Bob"));
	}

	#[test]
	fn category_counts_are_sorted_by_frequency() {
		let g = graph(
			r#"{ "d": { "entity_names": ["Alice", "Bob", "Acme Corp"] } }"#,
			"{}",
		);
		assert_eq!(
			g.category_counts(),
			vec![(EntityType::Unknown, 2), (EntityType::Organization, 1)]
		);
	}

	#[test]
	fn dynamic_keys_resolve_through_the_table() {
		let g = star();
		let mut table = EdgeIdTable::default();
		table.insert(EdgeKey(7), 2);
		assert_eq!(g.edge_by_key(&table, EdgeKey(7)).unwrap().id, "edge-2");
		assert!(g.edge_by_key(&table, EdgeKey(8)).is_none());
		assert_eq!(table.key_of(2), Some(EdgeKey(7)));
	}
}
