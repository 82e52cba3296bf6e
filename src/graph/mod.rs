//! Dataset loading and the canonical graph model.

pub mod classify;
pub mod loader;
pub mod manifest;
pub mod model;
pub mod types;

pub use classify::{EntityType, classify};
pub use model::{EdgeIdTable, EdgeKey, RawGraph};
pub use types::{GraphData, RawEdge, RawNode};
