use std::fmt;

/// Identifier of a topic node. Allocated from a counter and never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

/// Identifier of a connection between two nodes.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(String);

impl EdgeId {
	/// Id of the edge created together with `child` under `parent`.
	pub fn child(parent: NodeId, child: NodeId) -> Self {
		Self(format!("e{parent}-{child}"))
	}

	/// Id of the `seq`-th free-form connection.
	pub fn connection(seq: u64, source: NodeId, target: NodeId) -> Self {
		Self(format!("c{seq}:{source}-{target}"))
	}

	/// The id as text.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for EdgeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for EdgeId {
	fn from(value: &str) -> Self {
		Self(value.to_owned())
	}
}

/// World-space coordinate of a node's top-left corner.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Position {
	/// Horizontal coordinate.
	pub x: f64,
	/// Vertical coordinate.
	pub y: f64,
}

impl Position {
	/// Shorthand constructor.
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}
}

/// A labeled topic.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
	/// Stable identity.
	pub id: NodeId,
	/// User-editable text, stored verbatim.
	pub label: String,
	/// Top-left corner in world space.
	pub position: Position,
}

/// Arrow drawn at the end of an edge.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Marker {
	/// Filled triangle.
	#[default]
	ArrowClosed,
	/// No marker.
	None,
}

/// Presentation attributes of an edge. Every edge carries the defaults.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeStyle {
	/// Whether the stroke dash flows from source to target.
	pub animated: bool,
	/// End marker.
	pub marker: Marker,
	/// CSS color of the stroke and marker.
	pub stroke: &'static str,
	/// Stroke width in world units.
	pub stroke_width: f64,
}

impl Default for EdgeStyle {
	fn default() -> Self {
		Self {
			animated: true,
			marker: Marker::ArrowClosed,
			stroke: "#6366f1",
			stroke_width: 2.0,
		}
	}
}

/// A directed connection between two nodes.
#[derive(Clone, Debug, PartialEq)]
pub struct Edge {
	/// Stable identity.
	pub id: EdgeId,
	/// Node the edge starts at.
	pub source: NodeId,
	/// Node the edge points to.
	pub target: NodeId,
	/// Presentation defaults.
	pub style: EdgeStyle,
}

impl Edge {
	/// True when `node` is either endpoint.
	pub fn touches(&self, node: NodeId) -> bool {
		self.source == node || self.target == node
	}
}

/// What the user currently has selected. A node and an edge are never selected together.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Selection {
	/// Nothing selected.
	#[default]
	None,
	/// A single node.
	Node(NodeId),
	/// A single edge.
	Edge(EdgeId),
}
