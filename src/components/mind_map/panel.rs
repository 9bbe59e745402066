use leptos::ev;
use leptos::prelude::*;

use super::component::dispatch;
use super::intent::Intent;
use super::store::GraphStore;

/// Controls overlaid on the canvas: add topics, toggle connection mode, and
/// edit or delete whatever is selected.
#[component]
pub fn MindMapPanel(store: RwSignal<GraphStore>, connect_mode: RwSignal<bool>) -> impl IntoView {
	let selected_node = Memo::new(move |_| store.with(|s| s.snapshot().selected_node()));
	let selected_edge = Memo::new(move |_| store.with(|s| s.snapshot().selected_edge().cloned()));
	let label = move || {
		selected_node
			.get()
			.and_then(|id| store.with(|s| s.snapshot().node(id).map(|n| n.label.clone())))
			.unwrap_or_default()
	};

	let on_label_input = move |ev: ev::Event| {
		if let Some(id) = selected_node.get_untracked() {
			dispatch(store, Intent::RelabelNode(id, event_target_value(&ev)));
		}
	};
	let on_add_child = move |_: ev::MouseEvent| {
		if let Some(id) = selected_node.get_untracked() {
			dispatch(store, Intent::CreateChildNode(id));
		}
	};
	let on_delete_node = move |_: ev::MouseEvent| {
		if let Some(id) = selected_node.get_untracked() {
			dispatch(store, Intent::DeleteNode(id));
		}
	};
	let on_delete_edge = move |_: ev::MouseEvent| {
		if let Some(id) = selected_edge.get_untracked() {
			dispatch(store, Intent::DeleteEdge(id));
		}
	};

	view! {
		<div class="mind-map-panel">
			<button class="primary" on:click=move |_| dispatch(store, Intent::CreateRootNode)>
				"+ Add Topic"
			</button>
			<label class="connect-toggle">
				<input
					type="checkbox"
					prop:checked=move || connect_mode.get()
					on:change=move |_| connect_mode.update(|on| *on = !*on)
				/>
				"Connection mode"
			</label>
			<p class="hint">
				{move || {
					if connect_mode.get() {
						"Drag from a node and release over another node to connect them."
					} else {
						"Drag from a blue handle to connect. Click a connection and press Delete to remove it."
					}
				}}
			</p>
			<Show when=move || selected_node.get().is_some()>
				<div class="node-editor">
					<input type="text" prop:value=label on:input=on_label_input />
					<div class="node-actions">
						<button on:click=on_add_child>"+ Subtopic"</button>
						<button class="danger" on:click=on_delete_node>"Delete"</button>
					</div>
				</div>
			</Show>
			<Show when=move || selected_edge.get().is_some()>
				<button class="danger" on:click=on_delete_edge>"Remove connection"</button>
			</Show>
		</div>
	}
}
