use std::ops::Range;

use super::types::Position;

/// Placeholder labels and spawn geometry for new nodes.
#[derive(Clone, Debug, PartialEq)]
pub struct MindMapConfig {
	/// Label of the node a fresh map starts with.
	pub main_label: String,
	/// Label of root-level topics added later.
	pub topic_label: String,
	/// Label of nodes created under a parent.
	pub subtopic_label: String,
	/// Where the initial node is placed.
	pub first_position: Position,
	/// Horizontal spawn range of root-level topics.
	pub topic_x: Range<f64>,
	/// Vertical spawn range of root-level topics.
	pub topic_y: Range<f64>,
	/// Random horizontal offset of a child from its parent.
	pub child_jitter_x: Range<f64>,
	/// Fixed vertical offset of a child below its parent.
	pub child_offset_y: f64,
}

impl Default for MindMapConfig {
	fn default() -> Self {
		Self {
			main_label: "Main Topic".into(),
			topic_label: "New Topic".into(),
			subtopic_label: "New Subtopic".into(),
			first_position: Position::new(250.0, 5.0),
			topic_x: 100.0..400.0,
			topic_y: 0.0..100.0,
			child_jitter_x: 0.0..100.0,
			child_offset_y: 100.0,
		}
	}
}
