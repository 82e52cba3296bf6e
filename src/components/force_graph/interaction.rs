//! Pointer interaction on the render graph and the per-frame emphasis derived from selection.

use std::collections::HashSet;

use log::{debug, warn};

use super::render_graph::RenderGraph;
use super::types::{EdgeStyle, NodeStyle, PointerTarget, RenderEdge, RenderNode};
use crate::config::theme;
use crate::graph::EdgeKey;
use crate::store::Selection;

/// Pointer travel (px) below which a press and release count as a click.
pub const CLICK_TOLERANCE: f64 = 3.0;

/// Size of the two endpoint nodes while an edge is emphasised.
const EDGE_END_SIZE: f64 = 3.0;

#[derive(Clone, Debug)]
struct Press {
	target: PointerTarget,
	x: f64,
	y: f64,
	moved: bool,
}

/// Turns raw pointer input into focus, selection and drag updates.
#[derive(Clone, Debug, Default)]
pub struct InteractionController {
	hovered: PointerTarget,
	press: Option<Press>,
	dragged: Option<String>,
}

impl InteractionController {
	/// Node currently being dragged; the layout engine leaves it in place.
	pub fn dragged_node(&self) -> Option<&str> {
		self.dragged.as_deref()
	}

	pub fn is_dragging(&self) -> bool {
		self.dragged.is_some()
	}

	pub fn hovered(&self) -> &PointerTarget {
		&self.hovered
	}

	/// The pointer is over `target`. Leaving and entering only move focus
	/// while no button is held.
	pub fn hover(&mut self, target: PointerTarget, buttons_pressed: bool, selection: &mut Selection) {
		if self.hovered == target {
			return;
		}
		let previous = std::mem::replace(&mut self.hovered, target.clone());
		if buttons_pressed {
			return;
		}
		match previous {
			PointerTarget::Node(_) => selection.set_focused_node(None),
			PointerTarget::Edge(_) => selection.set_focused_edge(None),
			PointerTarget::Stage => {}
		}
		match target {
			PointerTarget::Node(id) => selection.set_focused_node(Some(id)),
			PointerTarget::Edge(key) => selection.set_focused_edge(Some(key)),
			PointerTarget::Stage => {}
		}
	}

	/// Button pressed over `target`. Pressing a node starts dragging it.
	pub fn press(&mut self, target: PointerTarget, x: f64, y: f64, graph: &mut RenderGraph) {
		if let PointerTarget::Node(id) = &target {
			graph.set_node_highlighted(id, true);
			debug!("drag started on {id}");
			self.dragged = Some(id.clone());
		}
		self.press = Some(Press {
			target,
			x,
			y,
			moved: false,
		});
	}

	/// Pointer moved to viewport (`x`, `y`), graph position `to`.
	///
	/// Returns true when a node drag consumed the move, in which case the
	/// camera must not pan.
	pub fn pointer_moved(&mut self, x: f64, y: f64, to: (f64, f64), graph: &mut RenderGraph) -> bool {
		if let Some(press) = self.press.as_mut() {
			if (x - press.x).hypot(y - press.y) > CLICK_TOLERANCE {
				press.moved = true;
			}
		}
		let Some(id) = &self.dragged else {
			return false;
		};
		graph.set_node_position(id, to.0, to.1);
		true
	}

	/// Button released. A release close to the press is a click on the pressed target.
	pub fn release(&mut self, graph: &mut RenderGraph, selection: &mut Selection) {
		self.end_drag(graph);
		let Some(press) = self.press.take() else {
			return;
		};
		if !press.moved {
			Self::click(press.target, selection);
		}
	}

	/// The pointer left the canvas: abandon any press without clicking.
	pub fn cancel(&mut self, graph: &mut RenderGraph) {
		self.end_drag(graph);
		self.press = None;
	}

	/// Forget all pointer state, e.g. after the graph was replaced.
	pub fn reset(&mut self) {
		*self = Self::default();
	}

	fn end_drag(&mut self, graph: &mut RenderGraph) {
		if let Some(id) = self.dragged.take() {
			graph.set_node_highlighted(&id, false);
			debug!("drag ended on {id}");
		}
	}

	fn click(target: PointerTarget, selection: &mut Selection) {
		match target {
			PointerTarget::Node(id) => {
				debug!("node clicked: {id}");
				selection.set_selected_node(Some(id), false);
				selection.set_selected_edge(None);
			}
			PointerTarget::Edge(key) => {
				debug!("edge clicked: {key}");
				selection.set_selected_edge(Some(key));
				selection.set_selected_node(None, false);
			}
			PointerTarget::Stage => selection.clear(),
		}
	}
}

/// Highlight state for one frame, derived from the render graph and the selection.
pub struct Emphasis<'a> {
	active_node: Option<&'a str>,
	selected_node: Option<&'a str>,
	neighbors: HashSet<&'a str>,
	edge_ends: Option<(&'a str, &'a str)>,
	selected_edge: Option<EdgeKey>,
	focused_edge: Option<EdgeKey>,
	active: bool,
	degraded: bool,
}

impl<'a> Emphasis<'a> {
	pub fn new(graph: &'a RenderGraph, selection: &'a Selection) -> Self {
		let mut emphasis = Emphasis {
			active_node: selection.active_node(),
			selected_node: selection.selected_node.as_deref(),
			neighbors: HashSet::new(),
			edge_ends: None,
			selected_edge: selection.selected_edge,
			focused_edge: selection.focused_edge,
			active: selection.is_active(),
			degraded: false,
		};
		if let Some(node) = emphasis.active_node {
			match graph.neighbors(node) {
				Some(neighbors) => emphasis.neighbors = neighbors.into_iter().collect(),
				None => {
					warn!("emphasis skipped: node {node} is not in the graph");
					emphasis.degraded = true;
				}
			}
		} else if let Some(key) = selection.active_edge() {
			match graph.extremities(key) {
				Some(ends) => emphasis.edge_ends = Some(ends),
				None => {
					warn!("emphasis skipped: edge {key} is not in the graph");
					emphasis.degraded = true;
				}
			}
		}
		emphasis
	}

	/// True when any focus or selection is in effect.
	pub fn is_active(&self) -> bool {
		self.active && !self.degraded
	}

	pub fn node_style(&self, id: &str, node: &RenderNode) -> NodeStyle {
		let base = NodeStyle {
			color: node.attrs.color,
			label_color: theme::LABEL,
			border_color: node.attrs.border_color,
			size: node.attrs.size,
			highlighted: node.attrs.highlighted,
		};
		if !self.is_active() {
			return base;
		}
		let (highlighted, size) = match self.active_node {
			Some(active) => (id == active || self.neighbors.contains(id), base.size),
			None if self.edge_ends.is_some_and(|(s, t)| id == s || id == t) => (true, EDGE_END_SIZE),
			None => (false, base.size),
		};
		if highlighted || node.attrs.highlighted {
			NodeStyle {
				highlighted: true,
				size,
				label_color: theme::LABEL_HIGHLIGHTED,
				border_color: if self.selected_node == Some(id) {
					theme::NODE_BORDER_SELECTED
				} else {
					base.border_color
				},
				..base
			}
		} else {
			NodeStyle {
				color: theme::NODE_DISABLED,
				..base
			}
		}
	}

	pub fn edge_style(&self, key: EdgeKey, edge: &RenderEdge) -> EdgeStyle {
		let base = EdgeStyle {
			color: theme::EDGE,
			size: edge.attrs.size,
		};
		if !self.is_active() {
			return base;
		}
		let color = match self.active_node {
			Some(active) if edge.source == active || edge.target == active => theme::EDGE_HIGHLIGHTED,
			Some(_) => return base,
			None if self.selected_edge == Some(key) => theme::EDGE_SELECTED,
			None if self.focused_edge == Some(key) => theme::EDGE_HIGHLIGHTED,
			None => return base,
		};
		EdgeStyle { color, ..base }
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::force_graph::types::{EdgeAttributes, NodeAttributes};

	fn graph() -> (RenderGraph, EdgeKey, EdgeKey) {
		let mut g = RenderGraph::default();
		for (i, id) in ["a", "b", "c", "d"].into_iter().enumerate() {
			g.add_node(
				id,
				i as f64,
				0.0,
				NodeAttributes {
					label: id.to_uppercase(),
					color: "#123456",
					size: 5.0,
					border_color: theme::NODE_BORDER,
					border_size: 0.2,
					highlighted: false,
				},
			);
		}
		let edge = || EdgeAttributes {
			label: None,
			size: 1.0,
			original_weight: 1,
		};
		let ab = g.add_edge("a", "b", edge()).unwrap();
		let cd = g.add_edge("c", "d", edge()).unwrap();
		(g, ab, cd)
	}

	fn node_style(g: &RenderGraph, sel: &Selection, id: &str) -> NodeStyle {
		Emphasis::new(g, sel).node_style(id, g.node(id).unwrap())
	}

	fn edge_color(g: &RenderGraph, sel: &Selection, key: EdgeKey) -> &'static str {
		Emphasis::new(g, sel).edge_style(key, g.edge(key).unwrap()).color
	}

	#[test]
	fn focus_ignored_while_button_held() {
		let mut c = InteractionController::default();
		let mut sel = Selection::default();
		c.hover(PointerTarget::Node("a".into()), true, &mut sel);
		assert_eq!(sel.focused_node, None);
		c.hover(PointerTarget::Node("b".into()), false, &mut sel);
		assert_eq!(sel.focused_node.as_deref(), Some("b"));
		c.hover(PointerTarget::Stage, true, &mut sel);
		assert_eq!(sel.focused_node.as_deref(), Some("b"));
		c.hover(PointerTarget::Node("b".into()), false, &mut sel);
		c.hover(PointerTarget::Stage, false, &mut sel);
		assert_eq!(sel.focused_node, None);
	}

	#[test]
	fn node_and_edge_selection_are_exclusive() {
		let (mut g, ab, _) = graph();
		let mut c = InteractionController::default();
		let mut sel = Selection::default();

		c.press(PointerTarget::Edge(ab), 10.0, 10.0, &mut g);
		c.release(&mut g, &mut sel);
		assert_eq!(sel.selected_edge, Some(ab));

		c.press(PointerTarget::Node("c".into()), 10.0, 10.0, &mut g);
		c.release(&mut g, &mut sel);
		assert_eq!(sel.selected_node.as_deref(), Some("c"));
		assert_eq!(sel.selected_edge, None);

		c.press(PointerTarget::Edge(ab), 10.0, 10.0, &mut g);
		c.release(&mut g, &mut sel);
		assert_eq!(sel.selected_node, None);
		assert_eq!(sel.selected_edge, Some(ab));
	}

	#[test]
	fn stage_click_clears_selection_and_focus() {
		let (mut g, ab, _) = graph();
		let mut c = InteractionController::default();
		let mut sel = Selection::default();
		sel.set_selected_node(Some("a".into()), false);
		sel.set_selected_edge(Some(ab));
		sel.set_focused_node(Some("b".into()));
		c.press(PointerTarget::Stage, 0.0, 0.0, &mut g);
		c.release(&mut g, &mut sel);
		assert_eq!(sel, Selection::default());
	}

	#[test]
	fn drag_moves_node_and_skips_click() {
		let (mut g, _, _) = graph();
		let mut c = InteractionController::default();
		let mut sel = Selection::default();
		c.press(PointerTarget::Node("a".into()), 0.0, 0.0, &mut g);
		assert_eq!(c.dragged_node(), Some("a"));
		assert!(g.node("a").unwrap().attrs.highlighted);

		assert!(c.pointer_moved(40.0, 0.0, (12.0, -3.0), &mut g));
		assert_eq!(g.node("a").map(|n| (n.x, n.y)), Some((12.0, -3.0)));

		c.release(&mut g, &mut sel);
		assert!(!c.is_dragging());
		assert!(!g.node("a").unwrap().attrs.highlighted);
		assert_eq!(sel.selected_node, None);
		assert!(!c.pointer_moved(50.0, 0.0, (0.0, 0.0), &mut g));
	}

	#[test]
	fn leaving_canvas_ends_drag_without_click() {
		let (mut g, _, _) = graph();
		let mut c = InteractionController::default();
		let mut sel = Selection::default();
		c.press(PointerTarget::Node("b".into()), 0.0, 0.0, &mut g);
		c.cancel(&mut g);
		c.release(&mut g, &mut sel);
		assert!(!g.node("b").unwrap().attrs.highlighted);
		assert_eq!(sel.selected_node, None);
	}

	#[test]
	fn node_emphasis_covers_neighbors() {
		let (g, ab, cd) = graph();
		let mut sel = Selection::default();
		sel.set_selected_node(Some("a".into()), false);

		let a = node_style(&g, &sel, "a");
		assert!(a.highlighted);
		assert_eq!(a.border_color, theme::NODE_BORDER_SELECTED);
		assert_eq!(a.label_color, theme::LABEL_HIGHLIGHTED);

		let b = node_style(&g, &sel, "b");
		assert!(b.highlighted);
		assert_eq!(b.border_color, theme::NODE_BORDER);

		assert_eq!(node_style(&g, &sel, "c").color, theme::NODE_DISABLED);
		assert_eq!(edge_color(&g, &sel, ab), theme::EDGE_HIGHLIGHTED);
		assert_eq!(edge_color(&g, &sel, cd), theme::EDGE);

		// Focus wins over selection but the border still marks only the selected node.
		sel.set_focused_node(Some("c".into()));
		assert!(node_style(&g, &sel, "d").highlighted);
		assert_eq!(node_style(&g, &sel, "c").border_color, theme::NODE_BORDER);
		assert_eq!(node_style(&g, &sel, "b").color, theme::NODE_DISABLED);
	}

	#[test]
	fn edge_emphasis_applies_without_node() {
		let (g, ab, cd) = graph();
		let mut sel = Selection::default();
		sel.set_selected_edge(Some(ab));
		assert_eq!(edge_color(&g, &sel, ab), theme::EDGE_SELECTED);
		assert!(node_style(&g, &sel, "a").highlighted);
		assert!(node_style(&g, &sel, "b").highlighted);
		assert_eq!(node_style(&g, &sel, "a").size, EDGE_END_SIZE);
		assert_eq!(node_style(&g, &sel, "c").color, theme::NODE_DISABLED);
		assert_eq!(node_style(&g, &sel, "c").size, 5.0);

		sel.set_focused_edge(Some(cd));
		assert_eq!(edge_color(&g, &sel, cd), theme::EDGE_HIGHLIGHTED);
		assert_eq!(edge_color(&g, &sel, ab), theme::EDGE_SELECTED);

		// A node selection takes over edge emphasis.
		sel.set_selected_node(Some("c".into()), false);
		sel.set_focused_edge(None);
		assert_eq!(edge_color(&g, &sel, ab), theme::EDGE);
		assert_eq!(edge_color(&g, &sel, cd), theme::EDGE_HIGHLIGHTED);
	}

	#[test]
	fn selected_edge_keeps_accent_while_hovered() {
		let (g, ab, _) = graph();
		let mut sel = Selection::default();
		sel.set_selected_edge(Some(ab));
		sel.set_focused_edge(Some(ab));
		assert_eq!(edge_color(&g, &sel, ab), theme::EDGE_SELECTED);
	}

	#[test]
	fn node_focus_keeps_node_size() {
		let (g, _, _) = graph();
		let mut sel = Selection::default();
		sel.set_focused_node(Some("a".into()));
		assert_eq!(node_style(&g, &sel, "a").size, 5.0);
		assert_eq!(node_style(&g, &sel, "b").size, 5.0);
	}

	#[test]
	fn no_selection_leaves_base_style() {
		let (g, ab, _) = graph();
		let sel = Selection::default();
		let style = node_style(&g, &sel, "c");
		assert_eq!(style.color, "#123456");
		assert!(!style.highlighted);
		assert_eq!(edge_color(&g, &sel, ab), theme::EDGE);
	}

	#[test]
	fn stale_selection_degrades_to_base_style() {
		let (g, ab, _) = graph();
		let mut sel = Selection::default();
		sel.set_selected_node(Some("ghost".into()), false);
		let emphasis = Emphasis::new(&g, &sel);
		assert!(!emphasis.is_active());
		assert_eq!(emphasis.node_style("a", g.node("a").unwrap()).color, "#123456");
		assert_eq!(emphasis.edge_style(ab, g.edge(ab).unwrap()).color, theme::EDGE);
	}
}
