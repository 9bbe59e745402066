use std::collections::HashSet;
use std::ops::Range;

use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::config::MindMapConfig;
use super::types::{Edge, EdgeId, EdgeStyle, Node, NodeId, Position, Selection};

/// An operation referred to an id that is not in the current snapshot.
///
/// Intents come from a UI that can race with its own rapid clicks, so a missing
/// target is reported back as a value and otherwise ignored.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ReferenceMissing {
	/// No node with this id.
	#[error("node {0} does not exist")]
	Node(NodeId),
	/// No edge with this id.
	#[error("edge {0} does not exist")]
	Edge(EdgeId),
}

/// Result of applying an operation to the store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Transition<T = ()> {
	/// The snapshot changed; carries whatever the operation created.
	Applied(T),
	/// The snapshot is exactly as before.
	Unchanged(ReferenceMissing),
}

impl<T> Transition<T> {
	/// Whether the snapshot changed.
	pub fn is_applied(&self) -> bool {
		matches!(self, Self::Applied(_))
	}

	/// The created value, if the operation applied.
	pub fn applied(self) -> Option<T> {
		match self {
			Self::Applied(value) => Some(value),
			Self::Unchanged(_) => None,
		}
	}
}

/// A structural invariant that does not hold on a snapshot.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum InvariantViolation {
	/// An edge endpoint is not in the node set.
	#[error("edge {edge} references missing node {node}")]
	DanglingEdge {
		/// Offending edge.
		edge: EdgeId,
		/// Endpoint that is gone.
		node: NodeId,
	},
	/// Two nodes share an id.
	#[error("node id {0} is used more than once")]
	DuplicateNode(NodeId),
	/// Two edges share an id.
	#[error("edge id {0} is used more than once")]
	DuplicateEdge(EdgeId),
	/// The selection names something that no longer exists.
	#[error("selection {0:?} refers to a missing entity")]
	StaleSelection(Selection),
}

/// Everything the presentation layer needs to draw the map.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Snapshot {
	nodes: Vec<Node>,
	edges: Vec<Edge>,
	selection: Selection,
}

impl Snapshot {
	/// Nodes in creation order.
	pub fn nodes(&self) -> &[Node] {
		&self.nodes
	}

	/// Edges in creation order.
	pub fn edges(&self) -> &[Edge] {
		&self.edges
	}

	/// Current selection.
	pub fn selection(&self) -> &Selection {
		&self.selection
	}

	/// Selected node, if a node is selected.
	pub fn selected_node(&self) -> Option<NodeId> {
		match self.selection {
			Selection::Node(id) => Some(id),
			_ => None,
		}
	}

	/// Selected edge, if an edge is selected.
	pub fn selected_edge(&self) -> Option<&EdgeId> {
		match &self.selection {
			Selection::Edge(id) => Some(id),
			_ => None,
		}
	}

	/// Look up a node.
	pub fn node(&self, id: NodeId) -> Option<&Node> {
		self.nodes.iter().find(|n| n.id == id)
	}

	/// Look up an edge.
	pub fn edge(&self, id: &EdgeId) -> Option<&Edge> {
		self.edges.iter().find(|e| &e.id == id)
	}

	/// Whether a node with this id exists.
	pub fn contains_node(&self, id: NodeId) -> bool {
		self.nodes.iter().any(|n| n.id == id)
	}

	/// Whether an edge with this id exists.
	pub fn contains_edge(&self, id: &EdgeId) -> bool {
		self.edges.iter().any(|e| &e.id == id)
	}

	/// Edges with `node` as source or target.
	pub fn edges_of(&self, node: NodeId) -> impl Iterator<Item = &Edge> {
		self.edges.iter().filter(move |e| e.touches(node))
	}

	/// Nodes directly connected to `node` in either direction.
	pub fn neighbors(&self, node: NodeId) -> HashSet<NodeId> {
		self.edges_of(node)
			.flat_map(|e| [e.source, e.target])
			.filter(|&id| id != node || self.is_self_looped(node))
			.collect()
	}

	fn is_self_looped(&self, node: NodeId) -> bool {
		self.edges.iter().any(|e| e.source == node && e.target == node)
	}

	/// Verify referential integrity, id uniqueness and selection validity.
	pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
		let mut node_ids = HashSet::with_capacity(self.nodes.len());
		for node in &self.nodes {
			if !node_ids.insert(node.id) {
				return Err(InvariantViolation::DuplicateNode(node.id));
			}
		}

		let mut edge_ids = HashSet::with_capacity(self.edges.len());
		for edge in &self.edges {
			if !edge_ids.insert(&edge.id) {
				return Err(InvariantViolation::DuplicateEdge(edge.id.clone()));
			}
			for endpoint in [edge.source, edge.target] {
				if !node_ids.contains(&endpoint) {
					return Err(InvariantViolation::DanglingEdge {
						edge: edge.id.clone(),
						node: endpoint,
					});
				}
			}
		}

		let selection_exists = match &self.selection {
			Selection::None => true,
			Selection::Node(id) => node_ids.contains(id),
			Selection::Edge(id) => edge_ids.contains(id),
		};
		if !selection_exists {
			return Err(InvariantViolation::StaleSelection(self.selection.clone()));
		}
		Ok(())
	}

	fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
		self.nodes.iter_mut().find(|n| n.id == id)
	}
}

/// Owns the mind map and applies every mutation to it.
///
/// Each operation runs to completion and leaves the [`Snapshot`] consistent. An
/// operation whose target id is absent changes nothing and returns
/// [`Transition::Unchanged`].
#[derive(Clone, Debug)]
pub struct GraphStore {
	snapshot: Snapshot,
	config: MindMapConfig,
	rng: StdRng,
	next_node: u64,
	next_connection: u64,
}

impl Default for GraphStore {
	fn default() -> Self {
		Self::new()
	}
}

impl GraphStore {
	/// A map holding the main topic, with positions drawn from entropy.
	pub fn new() -> Self {
		Self::seeded(MindMapConfig::default(), StdRng::from_entropy())
	}

	/// A map holding the main topic, with reproducible positions.
	pub fn with_seed(seed: u64) -> Self {
		Self::with_config(MindMapConfig::default(), seed)
	}

	/// A map holding the main topic, using `config` for labels and spawn geometry.
	pub fn with_config(config: MindMapConfig, seed: u64) -> Self {
		Self::seeded(config, StdRng::seed_from_u64(seed))
	}

	/// A map with no nodes at all.
	pub fn empty(config: MindMapConfig, seed: u64) -> Self {
		Self {
			snapshot: Snapshot::default(),
			config,
			rng: StdRng::seed_from_u64(seed),
			next_node: 1,
			next_connection: 1,
		}
	}

	fn seeded(config: MindMapConfig, rng: StdRng) -> Self {
		let mut store = Self {
			snapshot: Snapshot::default(),
			config,
			rng,
			next_node: 1,
			next_connection: 1,
		};
		let id = store.alloc_node();
		store.snapshot.nodes.push(Node {
			id,
			label: store.config.main_label.clone(),
			position: store.config.first_position,
		});
		info!("Mind map created with main topic {id}");
		store
	}

	/// Current state, for rendering.
	pub fn snapshot(&self) -> &Snapshot {
		&self.snapshot
	}

	/// Labels and spawn geometry in use.
	pub fn config(&self) -> &MindMapConfig {
		&self.config
	}

	/// Add a root-level topic at a random spot in the topic region.
	pub fn create_root_node(&mut self) -> NodeId {
		let position = Position::new(
			sample(&mut self.rng, &self.config.topic_x),
			sample(&mut self.rng, &self.config.topic_y),
		);
		let id = self.alloc_node();
		self.snapshot.nodes.push(Node {
			id,
			label: self.config.topic_label.clone(),
			position,
		});
		debug!("Created topic {id} at ({:.1}, {:.1})", position.x, position.y);
		self.debug_check();
		id
	}

	/// Add a subtopic below `parent` together with the edge linking them.
	pub fn create_child_node(&mut self, parent: NodeId) -> Transition<(NodeId, EdgeId)> {
		let Some(anchor) = self.snapshot.node(parent).map(|n| n.position) else {
			return Transition::Unchanged(ReferenceMissing::Node(parent));
		};
		let position = Position::new(
			anchor.x + sample(&mut self.rng, &self.config.child_jitter_x),
			anchor.y + self.config.child_offset_y,
		);
		let id = self.alloc_node();
		let edge_id = EdgeId::child(parent, id);
		self.snapshot.nodes.push(Node {
			id,
			label: self.config.subtopic_label.clone(),
			position,
		});
		self.snapshot.edges.push(Edge {
			id: edge_id.clone(),
			source: parent,
			target: id,
			style: EdgeStyle::default(),
		});
		debug!("Created subtopic {id} under {parent} via {edge_id}");
		self.debug_check();
		Transition::Applied((id, edge_id))
	}

	/// Replace a node's label verbatim. Empty strings are accepted.
	pub fn relabel_node(&mut self, id: NodeId, label: impl Into<String>) -> Transition {
		let Some(node) = self.snapshot.node_mut(id) else {
			return Transition::Unchanged(ReferenceMissing::Node(id));
		};
		node.label = label.into();
		debug!("Relabelled node {id}");
		Transition::Applied(())
	}

	/// Store a dragged position without validating it.
	pub fn move_node(&mut self, id: NodeId, position: Position) -> Transition {
		let Some(node) = self.snapshot.node_mut(id) else {
			return Transition::Unchanged(ReferenceMissing::Node(id));
		};
		node.position = position;
		Transition::Applied(())
	}

	/// Remove a node, every edge touching it, and any selection of either.
	pub fn delete_node(&mut self, id: NodeId) -> Transition {
		let before = self.snapshot.nodes.len();
		self.snapshot.nodes.retain(|n| n.id != id);
		if self.snapshot.nodes.len() == before {
			return Transition::Unchanged(ReferenceMissing::Node(id));
		}

		let edges_before = self.snapshot.edges.len();
		self.snapshot.edges.retain(|e| !e.touches(id));
		let removed = edges_before - self.snapshot.edges.len();

		let clear = match &self.snapshot.selection {
			Selection::Node(selected) => *selected == id,
			Selection::Edge(selected) => !self.snapshot.contains_edge(selected),
			Selection::None => false,
		};
		if clear {
			self.snapshot.selection = Selection::None;
		}
		debug!("Deleted node {id} and {removed} edge(s)");
		self.debug_check();
		Transition::Applied(())
	}

	/// Connect two existing nodes. Self-loops and parallel edges are allowed.
	pub fn connect(&mut self, source: NodeId, target: NodeId) -> Transition<EdgeId> {
		for endpoint in [source, target] {
			if !self.snapshot.contains_node(endpoint) {
				return Transition::Unchanged(ReferenceMissing::Node(endpoint));
			}
		}
		let id = EdgeId::connection(self.next_connection, source, target);
		self.next_connection += 1;
		self.snapshot.edges.push(Edge {
			id: id.clone(),
			source,
			target,
			style: EdgeStyle::default(),
		});
		debug!("Connected {source} -> {target} as {id}");
		self.debug_check();
		Transition::Applied(id)
	}

	/// Remove an edge, clearing the selection if it was selected.
	pub fn delete_edge(&mut self, id: &EdgeId) -> Transition {
		let before = self.snapshot.edges.len();
		self.snapshot.edges.retain(|e| &e.id != id);
		if self.snapshot.edges.len() == before {
			return Transition::Unchanged(ReferenceMissing::Edge(id.clone()));
		}
		if self.snapshot.selected_edge() == Some(id) {
			self.snapshot.selection = Selection::None;
		}
		debug!("Deleted edge {id}");
		self.debug_check();
		Transition::Applied(())
	}

	/// Select a node, dropping any edge selection.
	pub fn select_node(&mut self, id: NodeId) -> Transition {
		if !self.snapshot.contains_node(id) {
			return Transition::Unchanged(ReferenceMissing::Node(id));
		}
		self.snapshot.selection = Selection::Node(id);
		Transition::Applied(())
	}

	/// Select an edge, dropping any node selection.
	pub fn select_edge(&mut self, id: &EdgeId) -> Transition {
		if !self.snapshot.contains_edge(id) {
			return Transition::Unchanged(ReferenceMissing::Edge(id.clone()));
		}
		self.snapshot.selection = Selection::Edge(id.clone());
		Transition::Applied(())
	}

	/// Deselect everything.
	pub fn clear_selection(&mut self) {
		self.snapshot.selection = Selection::None;
	}

	fn alloc_node(&mut self) -> NodeId {
		let id = NodeId(self.next_node);
		self.next_node += 1;
		id
	}

	fn debug_check(&self) {
		debug_assert_eq!(self.snapshot.check_invariants(), Ok(()));
	}
}

fn sample(rng: &mut StdRng, range: &Range<f64>) -> f64 {
	if range.is_empty() {
		range.start
	} else {
		rng.gen_range(range.clone())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn two_nodes() -> (GraphStore, NodeId, NodeId) {
		let mut store = GraphStore::with_seed(7);
		let first = store.snapshot().nodes()[0].id;
		let second = store.create_root_node();
		(store, first, second)
	}

	#[test]
	fn starts_with_main_topic() {
		let store = GraphStore::with_seed(1);
		let snap = store.snapshot();
		assert_eq!(snap.nodes().len(), 1);
		assert!(snap.edges().is_empty());
		assert_eq!(snap.nodes()[0].label, "Main Topic");
		assert_eq!(snap.nodes()[0].position, Position::new(250.0, 5.0));
		assert_eq!(snap.selection(), &Selection::None);
	}

	#[test]
	fn root_topics_spawn_inside_region() {
		let mut store = GraphStore::with_seed(3);
		for _ in 0..200 {
			let id = store.create_root_node();
			let node = store.snapshot().node(id).unwrap();
			assert_eq!(node.label, "New Topic");
			assert!((100.0..400.0).contains(&node.position.x));
			assert!((0.0..100.0).contains(&node.position.y));
		}
		assert!(store.snapshot().edges().is_empty());
	}

	#[test]
	fn child_is_placed_below_parent() {
		let mut store = GraphStore::with_seed(11);
		let parent = store.snapshot().nodes()[0].id;
		let (child, edge) = store.create_child_node(parent).applied().unwrap();

		let node = store.snapshot().node(child).unwrap();
		assert_eq!(node.label, "New Subtopic");
		assert!((250.0..350.0).contains(&node.position.x));
		assert_eq!(node.position.y, 105.0);

		let edge = store.snapshot().edge(&edge).unwrap();
		assert_eq!((edge.source, edge.target), (parent, child));
		assert_eq!(edge.id.as_str(), format!("e{parent}-{child}"));
		assert_eq!(edge.style, EdgeStyle::default());
	}

	#[test]
	fn child_of_missing_parent_changes_nothing() {
		let mut store = GraphStore::with_seed(2);
		let before = store.snapshot().clone();
		let result = store.create_child_node(NodeId(99));
		assert_eq!(result, Transition::Unchanged(ReferenceMissing::Node(NodeId(99))));
		assert_eq!(store.snapshot(), &before);
	}

	#[test]
	fn ids_are_not_reused_after_delete() {
		let (mut store, _, second) = two_nodes();
		store.delete_node(second);
		let third = store.create_root_node();
		assert_ne!(third, second);
		assert!(third > second);
	}

	#[test]
	fn relabel_keeps_text_verbatim() {
		let (mut store, first, _) = two_nodes();
		store.select_node(first);
		let position = store.snapshot().node(first).unwrap().position;

		assert!(store.relabel_node(first, "  spaced  ").is_applied());
		assert_eq!(store.snapshot().node(first).unwrap().label, "  spaced  ");
		assert!(store.relabel_node(first, "").is_applied());
		assert_eq!(store.snapshot().node(first).unwrap().label, "");

		assert_eq!(store.snapshot().node(first).unwrap().position, position);
		assert_eq!(store.snapshot().selected_node(), Some(first));
	}

	#[test]
	fn move_node_accepts_any_position() {
		let (mut store, first, _) = two_nodes();
		let target = Position::new(-1e6, f64::MAX);
		assert!(store.move_node(first, target).is_applied());
		assert_eq!(store.snapshot().node(first).unwrap().position, target);
		assert!(!store.move_node(NodeId(404), target).is_applied());
	}

	#[test]
	fn delete_node_cascades_edges() {
		let (mut store, first, second) = two_nodes();
		let (child, _) = store.create_child_node(first).applied().unwrap();
		store.connect(second, first);
		store.connect(first, first);
		let kept = store.connect(second, child).applied().unwrap();

		assert!(store.delete_node(first).is_applied());
		let snap = store.snapshot();
		assert_eq!(snap.edges().len(), 1);
		assert_eq!(snap.edges()[0].id, kept);
		assert_eq!(snap.edges_of(first).count(), 0);
	}

	#[test]
	fn delete_node_clears_its_selection() {
		let (mut store, first, second) = two_nodes();
		store.select_node(first);
		store.delete_node(second);
		assert_eq!(store.snapshot().selected_node(), Some(first));
		store.delete_node(first);
		assert_eq!(store.snapshot().selection(), &Selection::None);
	}

	#[test]
	fn delete_node_clears_selection_of_cascaded_edge() {
		let (mut store, first, second) = two_nodes();
		let edge = store.connect(first, second).applied().unwrap();
		store.select_edge(&edge);
		store.delete_node(second);
		assert_eq!(store.snapshot().selection(), &Selection::None);
		assert_eq!(store.snapshot().check_invariants(), Ok(()));
	}

	#[test]
	fn delete_node_twice_is_harmless() {
		let (mut store, first, _) = two_nodes();
		assert!(store.delete_node(first).is_applied());
		let after = store.snapshot().clone();
		assert!(!store.delete_node(first).is_applied());
		assert_eq!(store.snapshot(), &after);
	}

	#[test]
	fn connect_allows_parallel_edges_and_self_loops() {
		let (mut store, first, second) = two_nodes();
		let a = store.connect(first, second).applied().unwrap();
		let b = store.connect(first, second).applied().unwrap();
		let looped = store.connect(first, first).applied().unwrap();
		assert_ne!(a, b);
		assert_eq!(store.snapshot().edges().len(), 3);
		assert_eq!(store.snapshot().edge(&looped).unwrap().target, first);
		assert!(store.snapshot().neighbors(first).contains(&first));
		assert!(!store.snapshot().neighbors(second).contains(&second));
	}

	#[test]
	fn connect_rejects_missing_endpoint() {
		let (mut store, first, _) = two_nodes();
		let before = store.snapshot().clone();
		let ghost = NodeId(1234);
		assert_eq!(
			store.connect(first, ghost),
			Transition::Unchanged(ReferenceMissing::Node(ghost))
		);
		assert_eq!(
			store.connect(ghost, first),
			Transition::Unchanged(ReferenceMissing::Node(ghost))
		);
		assert_eq!(store.snapshot(), &before);
	}

	#[test]
	fn selection_is_exclusive() {
		let (mut store, first, second) = two_nodes();
		let edge = store.connect(first, second).applied().unwrap();

		store.select_node(first);
		assert_eq!(store.snapshot().selected_edge(), None);
		store.select_edge(&edge);
		assert_eq!(store.snapshot().selected_node(), None);
		assert_eq!(store.snapshot().selected_edge(), Some(&edge));
		store.clear_selection();
		assert_eq!(store.snapshot().selection(), &Selection::None);
	}

	#[test]
	fn selecting_missing_entity_keeps_selection() {
		let (mut store, first, _) = two_nodes();
		store.select_node(first);
		assert!(!store.select_node(NodeId(77)).is_applied());
		assert!(!store.select_edge(&EdgeId::from("nope")).is_applied());
		assert_eq!(store.snapshot().selected_node(), Some(first));
	}

	#[test]
	fn delete_edge_only_clears_matching_selection() {
		let (mut store, first, second) = two_nodes();
		let a = store.connect(first, second).applied().unwrap();
		let b = store.connect(second, first).applied().unwrap();
		store.select_edge(&a);
		store.delete_edge(&b);
		assert_eq!(store.snapshot().selected_edge(), Some(&a));
		store.delete_edge(&a);
		assert_eq!(store.snapshot().selection(), &Selection::None);
	}

	#[test]
	fn check_invariants_reports_dangling_edge() {
		let snapshot = Snapshot {
			nodes: vec![Node {
				id: NodeId(1),
				label: String::new(),
				position: Position::default(),
			}],
			edges: vec![Edge {
				id: EdgeId::from("x"),
				source: NodeId(1),
				target: NodeId(2),
				style: EdgeStyle::default(),
			}],
			selection: Selection::None,
		};
		assert_eq!(
			snapshot.check_invariants(),
			Err(InvariantViolation::DanglingEdge {
				edge: EdgeId::from("x"),
				node: NodeId(2),
			})
		);
	}

	#[test]
	fn check_invariants_reports_stale_selection() {
		let snapshot = Snapshot {
			selection: Selection::Node(NodeId(5)),
			..Snapshot::default()
		};
		assert_eq!(
			snapshot.check_invariants(),
			Err(InvariantViolation::StaleSelection(Selection::Node(NodeId(5))))
		);
	}

	#[test]
	fn empty_range_config_is_deterministic() {
		let config = MindMapConfig {
			topic_x: 10.0..10.0,
			topic_y: 20.0..20.0,
			..MindMapConfig::default()
		};
		let mut store = GraphStore::empty(config, 0);
		assert!(store.snapshot().nodes().is_empty());
		let id = store.create_root_node();
		assert_eq!(id, NodeId(1));
		assert_eq!(store.snapshot().node(id).unwrap().position, Position::new(10.0, 20.0));
	}
}
