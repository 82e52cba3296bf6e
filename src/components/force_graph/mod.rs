//! Canvas graph view: render graph, camera, layout engine and pointer interaction.

mod camera;
mod component;
mod interaction;
mod layout;
mod render;
mod render_graph;
mod state;
mod types;

pub use component::ForceGraphCanvas;
