use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use wasm_bindgen::prelude::*;
use web_sys::{
	CanvasRenderingContext2d, HtmlCanvasElement, KeyboardEvent, MouseEvent, WheelEvent, Window,
};

use super::intent::Intent;
use super::render;
use super::store::GraphStore;
use super::types::Position;
use super::view::{CanvasView, DragState};

/// Apply an intent and notify readers only if the map changed.
pub fn dispatch(store: RwSignal<GraphStore>, intent: Intent) {
	store.maybe_update(|s| s.apply(intent));
}

fn local_coords(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get_untracked()?;
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

fn viewport(window: &Window) -> (f64, f64) {
	let dim = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
	(dim(window.inner_width()), dim(window.inner_height()))
}

/// Interactive canvas drawing the mind map held in `store`.
///
/// Clicking selects, dragging a node moves it, dragging from a node's handle
/// (or anywhere on a node while `connect_mode` is on, or with Shift held)
/// connects it to the node the pointer is released over. Dragging the
/// background pans and the wheel zooms. Delete/Backspace removes the selected
/// edge.
#[component]
pub fn MindMapCanvas(
	store: RwSignal<GraphStore>,
	#[prop(into)] connect_mode: Signal<bool>,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let view: Rc<RefCell<Option<CanvasView>>> = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let (view_init, animate_init, resize_cb_init) =
		(view.clone(), animate.clone(), resize_cb.clone());

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let Some(window) = web_sys::window() else {
			return;
		};

		let (w, h) = if fullscreen {
			viewport(&window)
		} else {
			(
				width.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_width() as f64)
						.unwrap_or(800.0)
				}),
				height.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_height() as f64)
						.unwrap_or(600.0)
				}),
			)
		};
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let Some(ctx) = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
		else {
			log::error!("Canvas 2d context unavailable");
			return;
		};
		*view_init.borrow_mut() = Some(CanvasView::new(w, h));

		if fullscreen {
			let (view_resize, canvas_resize) = (view_init.clone(), canvas.clone());
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				let Some(win) = web_sys::window() else {
					return;
				};
				let (nw, nh) = viewport(&win);
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				if let Some(ref mut v) = *view_resize.borrow_mut() {
					v.resize(nw, nh);
				}
			}));
			if let Some(ref cb) = *resize_cb_init.borrow() {
				let _ =
					window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		let (view_anim, animate_inner) = (view_init.clone(), animate_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			let alive = if let Some(ref mut v) = *view_anim.borrow_mut() {
				v.tick(0.016);
				store
					.try_with_untracked(|s| render::render(s.snapshot(), v, &ctx))
					.is_some()
			} else {
				true
			};
			// The store is gone once the page unmounts; stop scheduling frames.
			if !alive {
				return;
			}
			if let (Some(cb), Some(win)) = (animate_inner.borrow().as_ref(), web_sys::window()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let view_md = view.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = local_coords(canvas_ref, &ev) else {
			return;
		};
		if let Some(canvas) = canvas_ref.get_untracked() {
			let _ = canvas.focus();
		}

		let intent = {
			let mut guard = view_md.borrow_mut();
			let Some(v) = guard.as_mut() else {
				return;
			};
			let (node_hit, edge_hit) = store.with_untracked(|s| {
				let snap = s.snapshot();
				let node = v
					.node_at_position(snap, x, y)
					.and_then(|id| snap.node(id))
					.map(|n| (n.id, n.position, v.on_handle(n, x, y)));
				let edge = match node {
					Some(_) => None,
					None => v.edge_at_position(snap, x, y),
				};
				(node, edge)
			});

			match (node_hit, edge_hit) {
				(Some((id, position, on_handle)), _) => {
					if on_handle || ev.shift_key() || connect_mode.get_untracked() {
						v.connect.source = Some(id);
						v.connect.pointer = (x, y);
					} else {
						v.drag = DragState {
							node: Some(id),
							start_x: x,
							start_y: y,
							node_start: position,
						};
					}
					Intent::SelectNode(id)
				}
				(None, Some(edge)) => Intent::SelectEdge(edge),
				(None, None) => {
					v.pan.active = true;
					v.pan.start_x = x;
					v.pan.start_y = y;
					v.pan.transform_start_x = v.transform.x;
					v.pan.transform_start_y = v.transform.y;
					Intent::ClearSelection
				}
			}
		};
		dispatch(store, intent);
	};

	let view_mm = view.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = local_coords(canvas_ref, &ev) else {
			return;
		};

		let moved = {
			let mut guard = view_mm.borrow_mut();
			let Some(v) = guard.as_mut() else {
				return;
			};
			if v.drag.node.is_none() {
				v.hover = store.with_untracked(|s| v.node_at_position(s.snapshot(), x, y));
			}

			if v.connect.source.is_some() {
				v.connect.pointer = (x, y);
				None
			} else if let Some(id) = v.drag.node {
				let (dx, dy) = (
					(x - v.drag.start_x) / v.transform.k,
					(y - v.drag.start_y) / v.transform.k,
				);
				Some(Intent::MoveNode(
					id,
					Position::new(v.drag.node_start.x + dx, v.drag.node_start.y + dy),
				))
			} else {
				if v.pan.active {
					v.transform.x = v.pan.transform_start_x + (x - v.pan.start_x);
					v.transform.y = v.pan.transform_start_y + (y - v.pan.start_y);
				}
				None
			}
		};
		if let Some(intent) = moved {
			dispatch(store, intent);
		}
	};

	let view_mu = view.clone();
	let on_mouseup = move |ev: MouseEvent| {
		let coords = local_coords(canvas_ref, &ev);
		let connection = {
			let mut guard = view_mu.borrow_mut();
			let Some(v) = guard.as_mut() else {
				return;
			};
			let source = v.connect.source.take();
			let target = coords.and_then(|(x, y)| {
				store.with_untracked(|s| v.node_at_position(s.snapshot(), x, y))
			});
			v.drag = DragState::default();
			v.pan.active = false;
			// Releasing on the source node is a click, not a connection.
			match (source, target) {
				(Some(source), Some(target)) if source != target => {
					Some(Intent::Connect(source, target))
				}
				_ => None,
			}
		};
		if let Some(intent) = connection {
			dispatch(store, intent);
		}
	};

	let view_ml = view.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut v) = *view_ml.borrow_mut() {
			v.drag = DragState::default();
			v.pan.active = false;
			v.connect.source = None;
			v.hover = None;
		}
	};

	let view_wh = view.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some((x, y)) = local_coords(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut v) = *view_wh.borrow_mut() {
			let factor = if ev.delta_y() > 0.0 { 0.9 } else { 1.1 };
			v.zoom_at(x, y, factor);
		}
	};

	let on_keydown = move |ev: KeyboardEvent| {
		let intent = store.with_untracked(|s| Intent::from_key(&ev.key(), s.snapshot()));
		if let Some(intent) = intent {
			ev.prevent_default();
			dispatch(store, intent);
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="mind-map-canvas"
			tabindex="0"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			on:keydown=on_keydown
			style="display: block; cursor: grab; outline: none;"
		/>
	}
}
