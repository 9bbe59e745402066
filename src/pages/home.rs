use leptos::prelude::*;

use crate::components::mind_map::{GraphStore, MindMapCanvas, MindMapPanel};

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let store = RwSignal::new(GraphStore::new());
	let connect_mode = RwSignal::new(false);

	view! {
		<div class="fullscreen-graph">
			<MindMapCanvas store=store connect_mode=connect_mode fullscreen=true />
			<div class="graph-overlay">
				<h1>"Mind Map"</h1>
				<MindMapPanel store=store connect_mode=connect_mode />
			</div>
		</div>
	}
}
