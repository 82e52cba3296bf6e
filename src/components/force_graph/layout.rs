//! Layout engine: force-directed placement and overlap removal.
//!
//! A run is a small state machine advanced a bounded number of iterations per
//! animation frame, so the UI thread is never held for a whole layout. In
//! hybrid mode overlap removal starts only once the force-directed phase has
//! finished its iterations. Starting a run replaces the previous one; the
//! replaced run never writes another position.

use std::collections::HashMap;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData};
use log::{debug, info};
use rand::Rng;

use super::render_graph::RenderGraph;
use crate::config::LayoutSettings;
use crate::store::LayoutMode;

#[derive(Clone, Debug, Default)]
struct SimNode {
	id: String,
}

/// Force-directed simulation seeded from the render graph's current positions.
struct ForcePhase {
	sim: ForceGraph<SimNode, ()>,
	remaining: u32,
}

impl ForcePhase {
	fn new(graph: &RenderGraph, settings: &LayoutSettings, pinned: Option<&str>) -> Self {
		let mut sim = ForceGraph::new(settings.simulation());
		let mut idx: HashMap<&str, DefaultNodeIdx> = HashMap::new();
		for (id, node) in graph.nodes() {
			let i = sim.add_node(NodeData {
				x: node.x as f32,
				y: node.y as f32,
				mass: 10.0 + node.attrs.size as f32,
				is_anchor: pinned == Some(id),
				user_data: SimNode { id: id.to_string() },
			});
			idx.insert(id, i);
		}
		for (_, edge) in graph.edges() {
			if let (Some(&src), Some(&tgt)) =
				(idx.get(edge.source.as_str()), idx.get(edge.target.as_str()))
			{
				if src != tgt {
					sim.add_edge(src, tgt, EdgeData::default());
				}
			}
		}
		Self {
			sim,
			remaining: settings.force_iterations,
		}
	}

	/// Run up to `budget` iterations; returns how many ran.
	fn step(
		&mut self,
		graph: &mut RenderGraph,
		settings: &LayoutSettings,
		pinned: Option<&str>,
		budget: u32,
	) -> u32 {
		let steps = budget.min(self.remaining);
		if steps == 0 {
			return 0;
		}
		// The pinned node may have moved since the last frame.
		let pinned_pos = pinned.and_then(|id| graph.node(id)).map(|n| (n.x as f32, n.y as f32));
		self.sim.visit_nodes_mut(|node| {
			let is_pinned = pinned == Some(node.data.user_data.id.as_str());
			node.data.is_anchor = is_pinned;
			if let (true, Some((x, y))) = (is_pinned, pinned_pos) {
				node.data.x = x;
				node.data.y = y;
			}
		});
		for _ in 0..steps {
			self.sim.update(settings.force_step);
		}
		self.remaining -= steps;
		self.sim.visit_nodes(|node| {
			let id = node.data.user_data.id.as_str();
			if pinned != Some(id) {
				graph.set_node_position(id, node.x() as f64, node.y() as f64);
			}
		});
		steps
	}
}

/// Push apart every pair of overlapping nodes once. Returns true if any pair overlapped.
pub fn remove_overlaps(graph: &mut RenderGraph, settings: &LayoutSettings, pinned: Option<&str>) -> bool {
	let mut points: Vec<(String, f64, f64, f64)> = graph
		.nodes()
		.map(|(id, node)| {
			let radius = node.attrs.size * settings.overlap_ratio + settings.overlap_margin / 2.0;
			(id.to_string(), node.x, node.y, radius)
		})
		.collect();
	if points.len() < 2 {
		return false;
	}

	let max_radius = points.iter().map(|p| p.3).fold(0.0, f64::max);
	let cell = (2.0 * max_radius).max(1e-6);
	let cell_of = |x: f64, y: f64| ((x / cell).floor() as i64, (y / cell).floor() as i64);
	let mut grid: HashMap<(i64, i64), Vec<usize>> = HashMap::new();
	for (i, p) in points.iter().enumerate() {
		grid.entry(cell_of(p.1, p.2)).or_default().push(i);
	}

	let mut shifts = vec![(0.0f64, 0.0f64); points.len()];
	let mut overlapped = false;
	for i in 0..points.len() {
		let (cx, cy) = cell_of(points[i].1, points[i].2);
		for gx in cx - 1..=cx + 1 {
			for gy in cy - 1..=cy + 1 {
				let Some(bucket) = grid.get(&(gx, gy)) else {
					continue;
				};
				for &j in bucket {
					if j <= i {
						continue;
					}
					let (dx, dy) = (points[j].1 - points[i].1, points[j].2 - points[i].2);
					let dist = (dx * dx + dy * dy).sqrt();
					let min_dist = points[i].3 + points[j].3;
					if dist >= min_dist {
						continue;
					}
					overlapped = true;
					let (ux, uy) = if dist > 1e-9 {
						(dx / dist, dy / dist)
					} else {
						// Coincident nodes: split along a direction fixed by the pair.
						let angle = (i * 7 + j * 13) as f64;
						(angle.cos(), angle.sin())
					};
					let push = (min_dist - dist) * settings.overlap_expansion;
					let i_pinned = pinned == Some(points[i].0.as_str());
					let j_pinned = pinned == Some(points[j].0.as_str());
					let (share_i, share_j) = match (i_pinned, j_pinned) {
						(true, _) => (0.0, 1.0),
						(_, true) => (1.0, 0.0),
						_ => (0.5, 0.5),
					};
					shifts[i].0 -= ux * push * share_i;
					shifts[i].1 -= uy * push * share_i;
					shifts[j].0 += ux * push * share_j;
					shifts[j].1 += uy * push * share_j;
				}
			}
		}
	}

	if overlapped {
		for (p, (sx, sy)) in points.iter_mut().zip(shifts) {
			graph.set_node_position(&p.0, p.1 + sx, p.2 + sy);
		}
	}
	overlapped
}

enum Phase {
	Force(ForcePhase),
	Overlap { remaining: u32 },
}

struct LayoutRun {
	generation: u64,
	mode: LayoutMode,
	phase: Phase,
}

/// Runs layout algorithms on the render graph, a bounded slice per frame.
pub struct LayoutEngine {
	settings: LayoutSettings,
	mode: LayoutMode,
	generation: u64,
	run: Option<LayoutRun>,
}

impl LayoutEngine {
	pub fn new(settings: LayoutSettings, mode: LayoutMode) -> Self {
		Self {
			settings,
			mode,
			generation: 0,
			run: None,
		}
	}

	pub fn settings(&self) -> &LayoutSettings {
		&self.settings
	}

	pub fn mode(&self) -> LayoutMode {
		self.mode
	}

	pub fn is_running(&self) -> bool {
		self.run.is_some()
	}

	/// Generation of the most recently started run.
	pub fn generation(&self) -> u64 {
		self.generation
	}

	/// Switch mode and run it from the current positions.
	pub fn set_mode(&mut self, mode: LayoutMode, graph: &RenderGraph, pinned: Option<&str>) {
		self.mode = mode;
		self.start(graph, pinned);
	}

	/// Re-run the current mode from the current positions.
	pub fn start(&mut self, graph: &RenderGraph, pinned: Option<&str>) {
		self.generation += 1;
		if let Some(old) = &self.run {
			debug!("layout run {} superseded", old.generation);
		}
		let phase = match self.mode {
			LayoutMode::ForceAtlas2 | LayoutMode::Hybrid => {
				Phase::Force(ForcePhase::new(graph, &self.settings, pinned))
			}
			LayoutMode::Noverlap => Phase::Overlap {
				remaining: self.settings.overlap_iterations,
			},
		};
		info!("layout run {} started ({})", self.generation, self.mode);
		self.run = Some(LayoutRun {
			generation: self.generation,
			mode: self.mode,
			phase,
		});
	}

	/// Randomize every position inside the initial spread, then run the current mode.
	pub fn reshuffle(&mut self, graph: &mut RenderGraph, rng: &mut impl Rng, pinned: Option<&str>) {
		let half = self.settings.initial_spread / 2.0;
		for (id, node) in graph.nodes_mut() {
			if pinned == Some(id) {
				continue;
			}
			node.x = rng.gen_range(-half..=half);
			node.y = rng.gen_range(-half..=half);
		}
		self.start(graph, pinned);
	}

	/// Drop the current run without touching positions.
	pub fn stop(&mut self) {
		self.run = None;
	}

	/// Advance the current run by one frame's budget. Returns true while work remains.
	pub fn step_frame(&mut self, graph: &mut RenderGraph, pinned: Option<&str>) -> bool {
		let budget = self.settings.steps_per_frame.max(1);
		self.advance(graph, pinned, budget)
	}

	/// Run the current run to the end.
	pub fn run_to_completion(&mut self, graph: &mut RenderGraph, pinned: Option<&str>) {
		let total = self.settings.force_iterations + self.settings.overlap_iterations + 2;
		for _ in 0..total {
			if !self.advance(graph, pinned, u32::MAX) {
				break;
			}
		}
	}

	fn advance(&mut self, graph: &mut RenderGraph, pinned: Option<&str>, budget: u32) -> bool {
		let Some(run) = self.run.as_mut() else {
			return false;
		};
		let next = match &mut run.phase {
			Phase::Force(force) => {
				force.step(graph, &self.settings, pinned, budget);
				if force.remaining > 0 {
					return true;
				}
				debug!("layout run {}: force-directed phase complete", run.generation);
				match run.mode {
					LayoutMode::Hybrid => Some(Phase::Overlap {
						remaining: self.settings.overlap_iterations,
					}),
					_ => None,
				}
			}
			Phase::Overlap { remaining } => {
				let mut done = *remaining == 0;
				let mut steps = budget.min(*remaining);
				while steps > 0 && !done {
					steps -= 1;
					*remaining -= 1;
					done = !remove_overlaps(graph, &self.settings, pinned) || *remaining == 0;
				}
				if !done {
					return true;
				}
				None
			}
		};
		match next {
			Some(phase) => {
				run.phase = phase;
				true
			}
			None => {
				info!("layout run {} finished", run.generation);
				self.run = None;
				false
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use rand::SeedableRng;
	use rand::rngs::SmallRng;

	use super::*;
	use crate::components::force_graph::render_graph::build;
	use crate::components::force_graph::types::{EdgeAttributes, NodeAttributes};
	use crate::graph::RawGraph;
	use crate::graph::loader::{EntitiesDocument, RelationsDocument, assemble};

	fn node(size: f64) -> NodeAttributes {
		NodeAttributes {
			label: String::new(),
			color: "#000",
			size,
			border_color: "#fff",
			border_size: 0.2,
			highlighted: false,
		}
	}

	fn clustered(n: usize) -> RenderGraph {
		let mut g = RenderGraph::default();
		for i in 0..n {
			g.add_node(&format!("n{i}"), (i % 3) as f64, (i / 3) as f64, node(6.0));
		}
		for i in 1..n {
			g.add_edge(
				&format!("n{i}"),
				&format!("n{}", i / 2),
				EdgeAttributes {
					label: None,
					size: 1.0,
					original_weight: 1,
				},
			);
		}
		g
	}

	fn overlaps(g: &RenderGraph, settings: &LayoutSettings) -> usize {
		let nodes: Vec<_> = g.nodes().map(|(_, n)| n.clone()).collect();
		let mut count = 0;
		for i in 0..nodes.len() {
			for j in i + 1..nodes.len() {
				let (dx, dy) = (nodes[i].x - nodes[j].x, nodes[i].y - nodes[j].y);
				let min = (nodes[i].attrs.size + nodes[j].attrs.size) * settings.overlap_ratio
					+ settings.overlap_margin;
				if (dx * dx + dy * dy).sqrt() < min - 1e-6 {
					count += 1;
				}
			}
		}
		count
	}

	fn positions(g: &RenderGraph) -> Vec<(String, f64, f64)> {
		g.nodes().map(|(id, n)| (id.to_string(), n.x, n.y)).collect()
	}

	#[test]
	fn overlap_removal_separates_nodes() {
		let settings = LayoutSettings {
			overlap_iterations: 1000,
			..LayoutSettings::default()
		};
		let mut g = clustered(12);
		assert!(overlaps(&g, &settings) > 0);
		let mut engine = LayoutEngine::new(settings.clone(), LayoutMode::Noverlap);
		engine.start(&g, None);
		engine.run_to_completion(&mut g, None);
		assert!(!engine.is_running());
		assert_eq!(overlaps(&g, &settings), 0);
	}

	#[test]
	fn coincident_nodes_are_split() {
		let settings = LayoutSettings::default();
		let mut g = RenderGraph::default();
		g.add_node("a", 0.0, 0.0, node(4.0));
		g.add_node("b", 0.0, 0.0, node(4.0));
		assert!(remove_overlaps(&mut g, &settings, None));
		assert_ne!(g.node("a").unwrap().x, g.node("b").unwrap().x);
	}

	#[test]
	fn force_phase_moves_nodes_within_bounded_steps() {
		let settings = LayoutSettings {
			force_iterations: 30,
			..LayoutSettings::default()
		};
		let mut g = clustered(6);
		let before = positions(&g);
		let mut engine = LayoutEngine::new(settings, LayoutMode::ForceAtlas2);
		engine.start(&g, None);
		let mut frames = 0;
		while engine.step_frame(&mut g, None) {
			frames += 1;
			assert!(frames < 100, "layout did not terminate");
		}
		// 30 iterations at 10 per frame.
		assert_eq!(frames, 2);
		assert_ne!(before, positions(&g));
		for (_, n) in g.nodes() {
			assert!(n.x.is_finite() && n.y.is_finite());
		}
	}

	#[test]
	fn hybrid_runs_force_then_overlap() {
		let settings = LayoutSettings {
			force_iterations: 20,
			overlap_iterations: 1000,
			..LayoutSettings::default()
		};
		let mut g = clustered(9);
		let mut engine = LayoutEngine::new(settings.clone(), LayoutMode::Hybrid);
		engine.start(&g, None);

		// Two frames exhaust the force phase and hand over to overlap removal.
		assert!(engine.step_frame(&mut g, None));
		assert!(engine.step_frame(&mut g, None));
		assert!(matches!(engine.run.as_ref().unwrap().phase, Phase::Overlap { .. }));

		engine.run_to_completion(&mut g, None);
		assert_eq!(overlaps(&g, &settings), 0);
	}

	#[test]
	fn pinned_node_is_never_moved() {
		let mut g = clustered(9);
		let pinned = g.node("n4").map(|n| (n.x, n.y)).unwrap();
		let mut engine = LayoutEngine::new(LayoutSettings::default(), LayoutMode::Hybrid);
		engine.start(&g, Some("n4"));
		engine.run_to_completion(&mut g, Some("n4"));
		let after = g.node("n4").map(|n| (n.x, n.y)).unwrap();
		assert_eq!(pinned, after);
	}

	#[test]
	fn new_run_supersedes_old() {
		let mut g = clustered(6);
		let mut engine = LayoutEngine::new(LayoutSettings::default(), LayoutMode::Hybrid);
		engine.start(&g, None);
		engine.step_frame(&mut g, None);
		let first = engine.generation();
		engine.set_mode(LayoutMode::Noverlap, &g, None);
		assert_eq!(engine.generation(), first + 1);
		assert!(matches!(engine.run.as_ref().unwrap().phase, Phase::Overlap { .. }));
		engine.stop();
		assert!(!engine.step_frame(&mut g, None));
	}

	#[test]
	fn mode_switches_keep_graph_identity() {
		let raw = RawGraph::from_data(assemble(
			&EntitiesDocument::parse(r#"{ "d": { "entity_names": ["Alice", "Acme Corp", "Bob"] } }"#)
				.unwrap(),
			&RelationsDocument::parse(r#"{ "d": { "relation_pairs": [["Alice", "Acme Corp"], ["Bob", "Alice"]] } }"#)
				.unwrap(),
		));
		let mut g = build(Some(&raw), 400.0).unwrap().graph;
		let ids: Vec<String> = g.nodes().map(|(id, _)| id.to_string()).collect();
		let mut engine = LayoutEngine::new(LayoutSettings::default(), LayoutMode::Hybrid);
		for mode in [LayoutMode::ForceAtlas2, LayoutMode::Hybrid] {
			engine.set_mode(mode, &g, None);
			engine.run_to_completion(&mut g, None);
		}
		assert_eq!(g.node_count(), 3);
		assert_eq!(g.edge_count(), 2);
		assert_eq!(ids, g.nodes().map(|(id, _)| id.to_string()).collect::<Vec<_>>());
	}

	#[test]
	fn reshuffle_randomizes_then_runs() {
		let mut g = clustered(6);
		let before = positions(&g);
		let mut engine = LayoutEngine::new(LayoutSettings::default(), LayoutMode::Noverlap);
		let mut rng = SmallRng::seed_from_u64(7);
		engine.reshuffle(&mut g, &mut rng, None);
		assert!(engine.is_running());
		assert_ne!(before, positions(&g));
		let half = engine.settings().initial_spread / 2.0;
		for (_, n) in g.nodes() {
			assert!(n.x.abs() <= half && n.y.abs() <= half);
		}
	}
}
