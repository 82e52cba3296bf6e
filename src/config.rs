//! Static configuration: data locations, node sizing, theme colors and layout tunables.

use force_graph::SimulationParameters;

/// Manifest listing the datasets shipped with the bundle.
pub const MANIFEST_URL: &str = "./datasets.json";
/// Directory holding one sub-folder per dataset.
pub const DATA_ROOT: &str = "./data";
/// Per-dataset entities document.
pub const ENTITIES_FILE: &str = "kv_store_full_entities.json";
/// Per-dataset relations document.
pub const RELATIONS_FILE: &str = "kv_store_full_relations.json";

/// Smallest rendered node radius.
pub const MIN_NODE_SIZE: f64 = 4.0;
/// Largest rendered node radius.
pub const MAX_NODE_SIZE: f64 = 20.0;

/// `localStorage` key holding the layout mode.
pub const LAYOUT_MODE_KEY: &str = "kg-visualizer.layout-mode";

/// Theme colors shared by the renderer and the interaction controller.
pub mod theme {
	/// Canvas background.
	pub const BACKGROUND: &str = "#0b1120";
	/// Default label color.
	pub const LABEL: &str = "#B2EBF2";
	/// Label color on highlighted nodes.
	pub const LABEL_HIGHLIGHTED: &str = "#000";
	/// Fill of nodes dimmed by an active focus or selection.
	pub const NODE_DISABLED: &str = "#E2E2E2";
	/// Default node border.
	pub const NODE_BORDER: &str = "#EEEEEE";
	/// Border of the selected node.
	pub const NODE_BORDER_SELECTED: &str = "#F57F17";
	/// Default edge color.
	pub const EDGE: &str = "#969696";
	/// Selected edge color.
	pub const EDGE_SELECTED: &str = "#F57F17";
	/// Focused edge, or an edge touching the focused node.
	pub const EDGE_HIGHLIGHTED: &str = "#B2EBF2";
}

/// Tunables for the two layout algorithms.
#[derive(Clone, Debug)]
pub struct LayoutSettings {
	/// Force-directed iterations per run.
	pub force_iterations: u32,
	/// Simulated seconds per force-directed iteration.
	pub force_step: f32,
	/// Repulsion between every pair of nodes.
	pub force_charge: f32,
	/// Spring strength along edges.
	pub force_spring: f32,
	/// Upper bound on any single force.
	pub force_max: f32,
	/// Velocity scale of the simulation.
	pub node_speed: f32,
	/// Velocity kept between steps.
	pub damping_factor: f32,
	/// Overlap-removal iterations per run.
	pub overlap_iterations: u32,
	/// Minimum gap kept between two node discs.
	pub overlap_margin: f64,
	/// Multiplier applied to node sizes when testing for overlap.
	pub overlap_ratio: f64,
	/// Extra push applied when separating two overlapping nodes.
	pub overlap_expansion: f64,
	/// Iterations executed per animation frame, shared by both phases.
	pub steps_per_frame: u32,
	/// Side of the square that initial positions are spread over.
	pub initial_spread: f64,
}

impl Default for LayoutSettings {
	fn default() -> Self {
		Self {
			force_iterations: 120,
			force_step: 0.035,
			force_charge: 250.0,
			force_spring: 0.05,
			force_max: 100.0,
			node_speed: 3000.0,
			damping_factor: 0.9,
			overlap_iterations: 100,
			overlap_margin: 5.0,
			overlap_ratio: 1.0,
			overlap_expansion: 1.1,
			steps_per_frame: 10,
			initial_spread: 400.0,
		}
	}
}

impl LayoutSettings {
	/// Parameters handed to the `force_graph` simulation.
	pub fn simulation(&self) -> SimulationParameters {
		SimulationParameters {
			force_charge: self.force_charge,
			force_spring: self.force_spring,
			force_max: self.force_max,
			node_speed: self.node_speed,
			damping_factor: self.damping_factor,
		}
	}
}
