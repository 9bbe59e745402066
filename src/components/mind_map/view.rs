use super::store::Snapshot;
use super::types::{Edge, EdgeId, Node, NodeId, Position};

pub const NODE_WIDTH: f64 = 180.0;
pub const NODE_HEIGHT: f64 = 56.0;
pub const HANDLE_RADIUS: f64 = 6.0;
/// Half-width of the clickable band around an edge, in world units.
pub const EDGE_HIT_WIDTH: f64 = 10.0;
pub const LOOP_RADIUS: f64 = 18.0;

#[derive(Clone, Debug)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self { x: 0.0, y: 0.0, k: 1.0 }
	}
}

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub node: Option<NodeId>,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start: Position,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

/// A connection being dragged out of `source`, following the pointer.
#[derive(Clone, Debug, Default)]
pub struct ConnectState {
	pub source: Option<NodeId>,
	pub pointer: (f64, f64),
}

/// Presentation-only state of the canvas: camera, gestures, hover.
pub struct CanvasView {
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	pub connect: ConnectState,
	pub hover: Option<NodeId>,
	pub width: f64,
	pub height: f64,
	pub flow_time: f64,
}

impl CanvasView {
	pub fn new(width: f64, height: f64) -> Self {
		Self {
			transform: ViewTransform {
				x: width / 2.0 - 250.0,
				y: height / 4.0,
				k: 1.0,
			},
			drag: DragState::default(),
			pan: PanState::default(),
			connect: ConnectState::default(),
			hover: None,
			width,
			height,
			flow_time: 0.0,
		}
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	/// Topmost node under the screen point. Later nodes are drawn on top.
	pub fn node_at_position(&self, snapshot: &Snapshot, sx: f64, sy: f64) -> Option<NodeId> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		snapshot
			.nodes()
			.iter()
			.rev()
			.find(|node| contains(node, gx, gy))
			.map(|node| node.id)
	}

	/// Whether the screen point is on the connection handle of `node`.
	pub fn on_handle(&self, node: &Node, sx: f64, sy: f64) -> bool {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let (hx, hy) = source_anchor(node);
		let (dx, dy) = (gx - hx, gy - hy);
		(dx * dx + dy * dy).sqrt() <= HANDLE_RADIUS * 2.0
	}

	/// Closest edge within the hit band of the screen point.
	pub fn edge_at_position(&self, snapshot: &Snapshot, sx: f64, sy: f64) -> Option<EdgeId> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		snapshot
			.edges()
			.iter()
			.filter_map(|edge| {
				let d = edge_distance(snapshot, edge, gx, gy)?;
				(d <= EDGE_HIT_WIDTH).then_some((d, edge))
			})
			.min_by(|a, b| a.0.total_cmp(&b.0))
			.map(|(_, edge)| edge.id.clone())
	}

	/// Zoom by `factor` keeping the screen point fixed.
	pub fn zoom_at(&mut self, sx: f64, sy: f64, factor: f64) {
		let new_k = (self.transform.k * factor).clamp(0.2, 4.0);
		let ratio = new_k / self.transform.k;
		self.transform.x = sx - (sx - self.transform.x) * ratio;
		self.transform.y = sy - (sy - self.transform.y) * ratio;
		self.transform.k = new_k;
	}

	pub fn tick(&mut self, dt: f64) {
		self.flow_time += dt;
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}
}

fn contains(node: &Node, gx: f64, gy: f64) -> bool {
	let Position { x, y } = node.position;
	gx >= x && gx <= x + NODE_WIDTH && gy >= y && gy <= y + NODE_HEIGHT
}

/// Bottom-center of a node, where outgoing edges leave.
pub fn source_anchor(node: &Node) -> (f64, f64) {
	(node.position.x + NODE_WIDTH / 2.0, node.position.y + NODE_HEIGHT)
}

/// Top-center of a node, where incoming edges arrive.
pub fn target_anchor(node: &Node) -> (f64, f64) {
	(node.position.x + NODE_WIDTH / 2.0, node.position.y)
}

/// Center of the loop drawn for an edge whose endpoints coincide.
pub fn loop_center(node: &Node) -> (f64, f64) {
	(node.position.x + NODE_WIDTH, node.position.y + NODE_HEIGHT / 2.0)
}

fn edge_distance(snapshot: &Snapshot, edge: &Edge, gx: f64, gy: f64) -> Option<f64> {
	let source = snapshot.node(edge.source)?;
	if edge.source == edge.target {
		let (cx, cy) = loop_center(source);
		let (dx, dy) = (gx - cx, gy - cy);
		return Some(((dx * dx + dy * dy).sqrt() - LOOP_RADIUS).abs());
	}
	let target = snapshot.node(edge.target)?;
	Some(segment_distance(source_anchor(source), target_anchor(target), (gx, gy)))
}

fn segment_distance(a: (f64, f64), b: (f64, f64), p: (f64, f64)) -> f64 {
	let (abx, aby) = (b.0 - a.0, b.1 - a.1);
	let len2 = abx * abx + aby * aby;
	let t = if len2 < f64::EPSILON {
		0.0
	} else {
		(((p.0 - a.0) * abx + (p.1 - a.1) * aby) / len2).clamp(0.0, 1.0)
	};
	let (cx, cy) = (a.0 + abx * t, a.1 + aby * t);
	let (dx, dy) = (p.0 - cx, p.1 - cy);
	(dx * dx + dy * dy).sqrt()
}
