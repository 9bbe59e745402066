//! Mind map editor: a Leptos client-side app around a graph store of topics and
//! their connections.

use leptos::prelude::*;
use leptos_meta::*;
use leptos_router::components::*;
use leptos_router::path;
use log::{Level, info};

// `rand` draws entropy through getrandom, which needs its `js` backend on wasm32.
use getrandom as _;

// Modules
mod components;
mod pages;

pub use crate::components::mind_map::{
	Edge, EdgeId, EdgeStyle, GraphStore, Intent, InvariantViolation, Marker, MindMapCanvas,
	MindMapConfig, MindMapPanel, Node, NodeId, Position, ReferenceMissing, Selection, Snapshot,
	Transition, dispatch,
};

// Top-Level pages
use crate::pages::home::Home;
use crate::pages::not_found::NotFound;

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("Logging initialized");
}

/// An app router which renders the mind map and handles 404's
#[component]
pub fn App() -> impl IntoView {
	// Provides context that manages stylesheets, titles, meta tags, etc.
	provide_meta_context();

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="light" />

		// sets the document title
		<Title text="Mind Map" />

		// injects metadata in the <head> of the page
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<Router>
			<Routes fallback=|| view! { <NotFound /> }>
				<Route path=path!("/") view=Home />
			</Routes>
		</Router>
	}
}
