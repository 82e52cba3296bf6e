pub mod controls;
pub mod dataset_selector;
pub mod force_graph;
pub mod legend;
