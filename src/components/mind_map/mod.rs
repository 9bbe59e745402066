mod component;
mod config;
mod intent;
mod panel;
mod render;
mod store;
mod types;
mod view;

pub use component::{MindMapCanvas, dispatch};
pub use config::MindMapConfig;
pub use intent::Intent;
pub use panel::MindMapPanel;
pub use store::{GraphStore, InvariantViolation, ReferenceMissing, Snapshot, Transition};
pub use types::{Edge, EdgeId, EdgeStyle, Marker, Node, NodeId, Position, Selection};
