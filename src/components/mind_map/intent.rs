use super::store::{GraphStore, Snapshot};
use super::types::{EdgeId, NodeId, Position, Selection};

/// A discrete request from the canvas or panel.
#[derive(Clone, Debug, PartialEq)]
pub enum Intent {
	/// Add a root-level topic.
	CreateRootNode,
	/// Add a subtopic under the node.
	CreateChildNode(NodeId),
	/// Replace the node's label.
	RelabelNode(NodeId, String),
	/// Store a dragged position.
	MoveNode(NodeId, Position),
	/// Remove the node and its edges.
	DeleteNode(NodeId),
	/// Add an edge from the first node to the second.
	Connect(NodeId, NodeId),
	/// Remove the edge.
	DeleteEdge(EdgeId),
	/// Select the node.
	SelectNode(NodeId),
	/// Select the edge.
	SelectEdge(EdgeId),
	/// Click on empty canvas.
	ClearSelection,
}

impl Intent {
	/// Map a key press to an intent. Only Delete/Backspace with a selected edge
	/// does anything; selected nodes are removed through the panel.
	pub fn from_key(key: &str, snapshot: &Snapshot) -> Option<Self> {
		match key {
			"Delete" | "Backspace" => snapshot.selected_edge().cloned().map(Self::DeleteEdge),
			_ => None,
		}
	}
}

impl GraphStore {
	/// Apply an intent, returning whether the snapshot changed.
	pub fn apply(&mut self, intent: Intent) -> bool {
		match intent {
			Intent::CreateRootNode => {
				self.create_root_node();
				true
			}
			Intent::CreateChildNode(parent) => self.create_child_node(parent).is_applied(),
			Intent::RelabelNode(id, label) => self.relabel_node(id, label).is_applied(),
			Intent::MoveNode(id, position) => self.move_node(id, position).is_applied(),
			Intent::DeleteNode(id) => self.delete_node(id).is_applied(),
			Intent::Connect(source, target) => self.connect(source, target).is_applied(),
			Intent::DeleteEdge(id) => self.delete_edge(&id).is_applied(),
			Intent::SelectNode(id) => self.select_node(id).is_applied(),
			Intent::SelectEdge(id) => self.select_edge(&id).is_applied(),
			Intent::ClearSelection => {
				let changed = self.snapshot().selection() != &Selection::None;
				self.clear_selection();
				changed
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn delete_key_removes_selected_edge() {
		let mut store = GraphStore::with_seed(5);
		let root = store.snapshot().nodes()[0].id;
		let (_, edge) = store.create_child_node(root).applied().unwrap();
		store.select_edge(&edge);

		for key in ["Delete", "Backspace"] {
			assert_eq!(
				Intent::from_key(key, store.snapshot()),
				Some(Intent::DeleteEdge(edge.clone()))
			);
		}
		let intent = Intent::from_key("Delete", store.snapshot()).unwrap();
		assert!(store.apply(intent));
		assert!(store.snapshot().edges().is_empty());
		assert_eq!(store.snapshot().selection(), &Selection::None);
	}

	#[test]
	fn delete_key_ignores_selected_node() {
		let mut store = GraphStore::with_seed(5);
		let root = store.snapshot().nodes()[0].id;
		store.select_node(root);
		assert_eq!(Intent::from_key("Delete", store.snapshot()), None);
		assert_eq!(Intent::from_key("Backspace", store.snapshot()), None);
	}

	#[test]
	fn other_keys_do_nothing() {
		let mut store = GraphStore::with_seed(5);
		let root = store.snapshot().nodes()[0].id;
		let (_, edge) = store.create_child_node(root).applied().unwrap();
		store.select_edge(&edge);
		assert_eq!(Intent::from_key("Enter", store.snapshot()), None);
		assert_eq!(Intent::from_key("d", store.snapshot()), None);
	}

	#[test]
	fn apply_reports_changes() {
		let mut store = GraphStore::with_seed(9);
		let root = store.snapshot().nodes()[0].id;

		assert!(store.apply(Intent::CreateRootNode));
		assert!(store.apply(Intent::CreateChildNode(root)));
		assert!(!store.apply(Intent::CreateChildNode(NodeId(500))));
		assert!(store.apply(Intent::RelabelNode(root, "Ideas".into())));
		assert!(store.apply(Intent::SelectNode(root)));
		assert!(store.apply(Intent::ClearSelection));
		assert!(!store.apply(Intent::ClearSelection));
		assert!(!store.apply(Intent::DeleteEdge(EdgeId::from("missing"))));
		assert!(store.apply(Intent::DeleteNode(root)));
		assert_eq!(store.snapshot().nodes().len(), 2);
		assert!(store.snapshot().edges().is_empty());
	}
}
