//! Session state shared by every component.
//!
//! The app keeps one [`SessionState`] inside a signal provided through context.
//! Each concern has its own narrow API: selection, datasets and loading,
//! layout mode and canvas commands, category colors.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use log::{error, info, warn};

use crate::error::LoadError;
use crate::graph::{EdgeIdTable, EdgeKey, EntityType, GraphData, RawGraph};
use crate::preferences::{self, PreferenceStore};

/// Layout algorithm(s) applied to the render graph.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LayoutMode {
	/// Force-directed placement only.
	ForceAtlas2,
	/// Overlap removal only.
	Noverlap,
	/// Force-directed placement, then overlap removal.
	#[default]
	Hybrid,
}

impl LayoutMode {
	/// Every mode, in menu order.
	pub const ALL: [LayoutMode; 3] = [LayoutMode::Hybrid, LayoutMode::ForceAtlas2, LayoutMode::Noverlap];

	/// Persisted name.
	pub fn as_str(self) -> &'static str {
		match self {
			LayoutMode::ForceAtlas2 => "forceatlas2",
			LayoutMode::Noverlap => "noverlap",
			LayoutMode::Hybrid => "hybrid",
		}
	}

	/// Button caption.
	pub fn display_name(self) -> &'static str {
		match self {
			LayoutMode::ForceAtlas2 => "Force",
			LayoutMode::Noverlap => "No overlap",
			LayoutMode::Hybrid => "Hybrid",
		}
	}
}

impl fmt::Display for LayoutMode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for LayoutMode {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"forceatlas2" => Ok(LayoutMode::ForceAtlas2),
			"noverlap" => Ok(LayoutMode::Noverlap),
			"hybrid" => Ok(LayoutMode::Hybrid),
			other => Err(format!("unknown layout mode `{other}`")),
		}
	}
}

/// Sticky (click) and transient (hover) emphasis.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Selection {
	/// Node chosen by click.
	pub selected_node: Option<String>,
	/// Node under the pointer.
	pub focused_node: Option<String>,
	/// Edge chosen by click.
	pub selected_edge: Option<EdgeKey>,
	/// Edge under the pointer.
	pub focused_edge: Option<EdgeKey>,
	/// The camera should travel to the selected node.
	pub move_to_selected: bool,
}

impl Selection {
	/// Set or clear the selected node.
	pub fn set_selected_node(&mut self, node: Option<String>, move_to: bool) {
		self.selected_node = node;
		self.move_to_selected = move_to;
	}

	/// Set or clear the focused node.
	pub fn set_focused_node(&mut self, node: Option<String>) {
		self.focused_node = node;
	}

	/// Set or clear the selected edge.
	pub fn set_selected_edge(&mut self, edge: Option<EdgeKey>) {
		self.selected_edge = edge;
	}

	/// Set or clear the focused edge.
	pub fn set_focused_edge(&mut self, edge: Option<EdgeKey>) {
		self.focused_edge = edge;
	}

	/// Drop every selection and focus.
	pub fn clear(&mut self) {
		*self = Selection::default();
	}

	/// Focused node, else selected node.
	pub fn active_node(&self) -> Option<&str> {
		self.focused_node.as_deref().or(self.selected_node.as_deref())
	}

	/// Focused edge, else selected edge.
	pub fn active_edge(&self) -> Option<EdgeKey> {
		self.focused_edge.or(self.selected_edge)
	}

	/// True when any emphasis is in effect.
	pub fn is_active(&self) -> bool {
		self.active_node().is_some() || self.active_edge().is_some()
	}
}

/// Outcome of the most recent dataset load.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum LoadStatus {
	/// Nothing requested yet.
	#[default]
	Idle,
	/// A load is in flight.
	Loading,
	/// A non-empty graph is available.
	Loaded,
	/// The dataset loaded but has no entities.
	Empty,
	/// The dataset could not be loaded.
	Failed(String),
}

/// Identifies one load; completions carrying an outdated ticket are discarded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadTicket {
	generation: u64,
	/// Dataset being loaded.
	pub dataset: String,
}

/// Pending request for the graph canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GraphCommand {
	/// Re-run the current mode from current positions.
	Rerun,
	/// Randomize positions, then run the current mode.
	Reshuffle,
	/// Animate the camera back to the whole graph.
	FitView,
}

/// Application state shared across components.
pub struct SessionState {
	/// Selection and focus.
	pub selection: Selection,
	available_datasets: Vec<String>,
	selected_dataset: Option<String>,
	is_loading_datasets: bool,
	datasets_listed: bool,
	is_fetching: bool,
	generation: u64,
	status: LoadStatus,
	graph: Option<Arc<RawGraph>>,
	graph_version: u64,
	edge_ids: Option<Arc<EdgeIdTable>>,
	layout_mode: LayoutMode,
	command: Option<(u64, GraphCommand)>,
	command_seq: u64,
	type_colors: BTreeMap<EntityType, &'static str>,
	preferences: Box<dyn PreferenceStore + Send + Sync>,
}

impl fmt::Debug for SessionState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("SessionState")
			.field("selection", &self.selection)
			.field("selected_dataset", &self.selected_dataset)
			.field("generation", &self.generation)
			.field("status", &self.status)
			.field("layout_mode", &self.layout_mode)
			.finish_non_exhaustive()
	}
}

impl SessionState {
	/// Fresh state; the layout mode is read from `preferences`.
	pub fn new(preferences: Box<dyn PreferenceStore + Send + Sync>) -> Self {
		Self {
			selection: Selection::default(),
			available_datasets: Vec::new(),
			selected_dataset: None,
			is_loading_datasets: false,
			datasets_listed: false,
			is_fetching: false,
			generation: 0,
			status: LoadStatus::Idle,
			graph: None,
			graph_version: 0,
			edge_ids: None,
			layout_mode: preferences::load_layout_mode(preferences.as_ref()),
			command: None,
			command_seq: 0,
			type_colors: BTreeMap::new(),
			preferences,
		}
	}

	/// Clear selection and the loaded graph. The dataset choice is kept.
	pub fn reset(&mut self) {
		self.selection.clear();
		if self.graph.take().is_some() {
			self.graph_version += 1;
		}
		self.edge_ids = None;
		self.status = LoadStatus::Idle;
	}

	// Datasets

	/// Datasets listed in the manifest.
	pub fn available_datasets(&self) -> &[String] {
		&self.available_datasets
	}

	/// Dataset currently chosen.
	pub fn selected_dataset(&self) -> Option<&str> {
		self.selected_dataset.as_deref()
	}

	/// True while the manifest is being fetched.
	pub fn is_loading_datasets(&self) -> bool {
		self.is_loading_datasets
	}

	/// True while a dataset load is in flight.
	pub fn is_fetching(&self) -> bool {
		self.is_fetching
	}

	/// Outcome of the current dataset's load.
	pub fn status(&self) -> &LoadStatus {
		&self.status
	}

	/// Claim the manifest fetch. False if it is running or already done.
	pub fn begin_dataset_list(&mut self) -> bool {
		if self.is_loading_datasets || self.datasets_listed {
			return false;
		}
		self.is_loading_datasets = true;
		true
	}

	/// Store the manifest contents and choose the first dataset if none is chosen.
	pub fn finish_dataset_list(&mut self, datasets: Vec<String>) {
		self.is_loading_datasets = false;
		self.datasets_listed = true;
		self.available_datasets = datasets;
		if self.selected_dataset.is_none() {
			if let Some(first) = self.available_datasets.first().cloned() {
				self.select_dataset(first);
			}
		}
	}

	/// Switch datasets: drop the current graph and invalidate in-flight loads.
	/// Returns false when `dataset` is already selected.
	pub fn select_dataset(&mut self, dataset: String) -> bool {
		if self.selected_dataset.as_deref() == Some(dataset.as_str()) {
			return false;
		}
		info!("dataset selected: {dataset}");
		self.reset();
		self.selected_dataset = Some(dataset);
		self.generation += 1;
		self.is_fetching = false;
		true
	}

	/// Claim the load of the selected dataset.
	///
	/// Returns `None` when no dataset is selected, a load is already in flight,
	/// or the current generation already finished loading.
	pub fn begin_load(&mut self) -> Option<LoadTicket> {
		let dataset = self.selected_dataset.clone()?;
		if self.is_fetching || self.status != LoadStatus::Idle {
			return None;
		}
		self.is_fetching = true;
		self.status = LoadStatus::Loading;
		Some(LoadTicket {
			generation: self.generation,
			dataset,
		})
	}

	/// Commit a load result. Returns false and changes nothing if the ticket is stale.
	pub fn finish_load(
		&mut self,
		ticket: &LoadTicket,
		outcome: Result<GraphData, LoadError>,
	) -> bool {
		if ticket.generation != self.generation {
			warn!(
				"discarding stale load of {} (generation {} superseded by {})",
				ticket.dataset, ticket.generation, self.generation
			);
			return false;
		}
		self.is_fetching = false;
		self.graph_version += 1;
		match outcome {
			Ok(data) if data.is_empty() => {
				info!("dataset {} has no entities", ticket.dataset);
				self.graph = None;
				self.status = LoadStatus::Empty;
			}
			Ok(data) => {
				let graph = RawGraph::from_data(data);
				graph.log_summary(&ticket.dataset);
				for (ty, _) in graph.category_counts() {
					self.type_color(ty);
				}
				self.graph = Some(Arc::new(graph));
				self.status = LoadStatus::Loaded;
			}
			Err(err) => {
				error!("failed to load dataset {}: {err}", ticket.dataset);
				self.graph = None;
				self.status = LoadStatus::Failed(err.to_string());
			}
		}
		true
	}

	/// The loaded canonical graph.
	pub fn graph(&self) -> Option<&Arc<RawGraph>> {
		self.graph.as_ref()
	}

	/// Bumped whenever the canonical graph is replaced or dropped.
	pub fn graph_version(&self) -> u64 {
		self.graph_version
	}

	/// Record the render layer's edge keys for the current graph.
	pub fn attach_edge_ids(&mut self, table: EdgeIdTable) {
		self.edge_ids = Some(Arc::new(table));
	}

	/// Render layer edge keys of the current graph.
	pub fn edge_ids(&self) -> Option<&Arc<EdgeIdTable>> {
		self.edge_ids.as_ref()
	}

	// Layout

	/// Current layout mode.
	pub fn layout_mode(&self) -> LayoutMode {
		self.layout_mode
	}

	/// Change and persist the layout mode.
	pub fn set_layout_mode(&mut self, mode: LayoutMode) {
		self.layout_mode = mode;
		preferences::save_layout_mode(self.preferences.as_ref(), mode);
	}

	/// Queue a canvas command; each request gets a fresh sequence number.
	pub fn request(&mut self, command: GraphCommand) {
		self.command_seq += 1;
		self.command = Some((self.command_seq, command));
	}

	/// Most recent canvas command with its sequence number.
	pub fn command(&self) -> Option<(u64, GraphCommand)> {
		self.command
	}

	// Colors

	/// Display color for a category, cached for the session.
	pub fn type_color(&mut self, ty: EntityType) -> &'static str {
		*self.type_colors.entry(ty).or_insert_with(|| ty.color())
	}

	/// Categories colored so far in this session.
	pub fn type_colors(&self) -> &BTreeMap<EntityType, &'static str> {
		&self.type_colors
	}
}
