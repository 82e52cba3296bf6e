use crate::graph::EdgeKey;

/// Visual attributes of a node in the render graph.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeAttributes {
	pub label: String,
	pub color: &'static str,
	pub size: f64,
	pub border_color: &'static str,
	pub border_size: f64,
	/// Set while the node is being dragged.
	pub highlighted: bool,
}

/// Visual attributes of an edge in the render graph.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeAttributes {
	pub label: Option<String>,
	/// Line width, from the aggregated weight.
	pub size: f64,
	pub original_weight: u32,
}

/// A node as stored by the render graph: live position plus attributes.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderNode {
	pub x: f64,
	pub y: f64,
	pub attrs: NodeAttributes,
}

/// An edge as stored by the render graph.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderEdge {
	pub source: String,
	pub target: String,
	pub attrs: EdgeAttributes,
}

/// How a node is drawn in the current frame.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeStyle {
	pub color: &'static str,
	pub label_color: &'static str,
	pub border_color: &'static str,
	pub size: f64,
	pub highlighted: bool,
}

/// How an edge is drawn in the current frame.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeStyle {
	pub color: &'static str,
	pub size: f64,
}

/// What lies under the pointer.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum PointerTarget {
	Node(String),
	Edge(EdgeKey),
	#[default]
	Stage,
}
