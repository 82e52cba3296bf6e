use log::debug;
use rand::SeedableRng;
use rand::rngs::SmallRng;

use super::camera::{Camera, CameraState, Frame};
use super::interaction::{Emphasis, InteractionController};
use super::layout::LayoutEngine;
use super::render_graph::RenderGraph;
use super::types::PointerTarget;
use crate::config::LayoutSettings;
use crate::store::{LayoutMode, Selection};

/// Extra screen pixels around a node disc that still count as a hit.
pub const HIT_SLACK: f64 = 3.0;
/// Distance (px) from an edge's line within which the edge is hit.
pub const EDGE_HIT_WIDTH: f64 = 4.0;
/// Seconds taken by "Fit view".
pub const FIT_DURATION: f64 = 1.0;
/// Seconds taken to travel to a selected node.
pub const MOVE_TO_DURATION: f64 = 0.5;

pub fn ease_out_cubic(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}

fn segment_distance(p: (f64, f64), a: (f64, f64), b: (f64, f64)) -> f64 {
	let (dx, dy) = (b.0 - a.0, b.1 - a.1);
	let len2 = dx * dx + dy * dy;
	let t = if len2 < 1e-12 {
		0.0
	} else {
		(((p.0 - a.0) * dx + (p.1 - a.1) * dy) / len2).clamp(0.0, 1.0)
	};
	(p.0 - (a.0 + t * dx)).hypot(p.1 - (a.1 + t * dy))
}

/// Everything the canvas needs between frames.
pub struct ForceGraphState {
	pub graph: RenderGraph,
	pub camera: Camera,
	pub layout: LayoutEngine,
	pub interaction: InteractionController,
	pub width: f64,
	pub height: f64,
	rng: SmallRng,
}

impl ForceGraphState {
	/// Wrap a freshly built graph and start the current layout mode on it.
	pub fn new(graph: RenderGraph, settings: LayoutSettings, mode: LayoutMode, width: f64, height: f64) -> Self {
		let mut layout = LayoutEngine::new(settings, mode);
		layout.start(&graph, None);
		Self {
			graph,
			camera: Camera::new(),
			layout,
			interaction: InteractionController::default(),
			width,
			height,
			rng: SmallRng::from_entropy(),
		}
	}

	/// CSS cursor for the current pointer state.
	pub fn cursor(&self) -> &'static str {
		if self.interaction.is_dragging() || self.camera.pan.active {
			"grabbing"
		} else if *self.interaction.hovered() != PointerTarget::Stage {
			"pointer"
		} else {
			"grab"
		}
	}

	pub fn frame(&self) -> Frame {
		self.camera.frame(self.graph.bbox(), self.width, self.height)
	}

	pub fn emphasis<'a>(&'a self, selection: &'a Selection) -> Emphasis<'a> {
		Emphasis::new(&self.graph, selection)
	}

	/// Topmost node under the pointer, else the closest edge within reach, else the stage.
	pub fn target_at(&self, sx: f64, sy: f64) -> PointerTarget {
		let frame = self.frame();
		let mut found = None;
		for (id, node) in self.graph.nodes() {
			let (x, y) = frame.graph_to_viewport(node.x, node.y);
			if (x - sx).hypot(y - sy) <= frame.node_radius(node.attrs.size) + HIT_SLACK {
				found = Some(id);
			}
		}
		if let Some(id) = found {
			return PointerTarget::Node(id.to_string());
		}

		let mut closest: Option<(f64, _)> = None;
		for (key, edge) in self.graph.edges() {
			let (Some(a), Some(b)) = (self.graph.node(&edge.source), self.graph.node(&edge.target)) else {
				continue;
			};
			let d = segment_distance(
				(sx, sy),
				frame.graph_to_viewport(a.x, a.y),
				frame.graph_to_viewport(b.x, b.y),
			);
			if d <= EDGE_HIT_WIDTH + edge_width(edge.attrs.size) / 2.0
				&& closest.is_none_or(|(best, _)| d < best)
			{
				closest = Some((d, key));
			}
		}
		closest.map_or(PointerTarget::Stage, |(_, key)| PointerTarget::Edge(key))
	}

	/// Advance layout and camera by one frame.
	pub fn tick(&mut self, dt: f64) {
		self.layout.step_frame(&mut self.graph, self.interaction.dragged_node());
		self.camera.tick(dt);
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}

	pub fn pointer_down(&mut self, sx: f64, sy: f64) {
		// Freeze autoscaling so dragging a node does not rescale the view under the pointer.
		if self.camera.custom_bbox().is_none() {
			self.camera.set_custom_bbox(self.graph.bbox());
		}
		let target = self.target_at(sx, sy);
		if target == PointerTarget::Stage {
			self.camera.begin_pan(sx, sy);
		}
		self.interaction.press(target, sx, sy, &mut self.graph);
	}

	pub fn pointer_move(&mut self, sx: f64, sy: f64, buttons_pressed: bool, selection: &mut Selection) {
		let frame = self.frame();
		let to = frame.viewport_to_graph(sx, sy);
		if self.interaction.pointer_moved(sx, sy, to, &mut self.graph) {
			return;
		}
		if self.camera.pan.active {
			self.camera.pan_to(&frame, sx, sy);
		}
		let target = self.target_at(sx, sy);
		self.interaction.hover(target, buttons_pressed, selection);
	}

	pub fn pointer_up(&mut self, selection: &mut Selection) {
		self.camera.end_pan();
		self.interaction.release(&mut self.graph, selection);
	}

	pub fn pointer_leave(&mut self, buttons_pressed: bool, selection: &mut Selection) {
		self.camera.end_pan();
		self.interaction.cancel(&mut self.graph);
		self.interaction.hover(PointerTarget::Stage, buttons_pressed, selection);
	}

	pub fn wheel(&mut self, sx: f64, sy: f64, delta_y: f64) {
		let factor = if delta_y > 0.0 { 1.1 } else { 1.0 / 1.1 };
		let frame = self.frame();
		self.camera.zoom_at(&frame, sx, sy, factor);
	}

	pub fn set_mode(&mut self, mode: LayoutMode) {
		if mode != self.layout.mode() {
			self.layout.set_mode(mode, &self.graph, self.interaction.dragged_node());
		}
	}

	pub fn rerun_layout(&mut self) {
		self.layout.start(&self.graph, self.interaction.dragged_node());
	}

	pub fn reshuffle(&mut self) {
		self.camera.set_custom_bbox(None);
		let pinned = self.interaction.dragged_node();
		self.layout.reshuffle(&mut self.graph, &mut self.rng, pinned);
	}

	pub fn fit_view(&mut self) {
		self.camera.animate(CameraState::default(), FIT_DURATION);
	}

	/// Animate the camera onto a node, keeping the zoom. False if the node is unknown.
	pub fn move_to_node(&mut self, id: &str) -> bool {
		let Some(node) = self.graph.node(id) else {
			debug!("cannot move to unknown node {id}");
			return false;
		};
		let (x, y) = self.frame().graph_to_normalized(node.x, node.y);
		let ratio = self.camera.state.ratio;
		self.camera.animate(CameraState { x, y, ratio }, MOVE_TO_DURATION);
		true
	}
}

/// Stroke width for an edge of the given aggregated weight.
pub fn edge_width(size: f64) -> f64 {
	1.0 + size.max(1.0).ln()
}
