use std::cell::{Cell, RefCell};
use std::rc::Rc;

use leptos::prelude::*;
use log::{debug, warn};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::render;
use super::render_graph::build;
use super::state::ForceGraphState;
use crate::config::{LayoutSettings, theme};
use crate::store::{GraphCommand, Selection, SessionState};

const FRAME_DT: f64 = 0.016;

type Shared<T> = Rc<RefCell<Option<T>>>;

fn window_size(window: &Window) -> Option<(f64, f64)> {
	Some((window.inner_width().ok()?.as_f64()?, window.inner_height().ok()?.as_f64()?))
}

fn pointer_position(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((ev.client_x() as f64 - rect.left(), ev.client_y() as f64 - rect.top()))
}

/// Run `f` on a copy of the selection and write it back only if it changed.
fn update_selection(store: RwSignal<SessionState>, f: impl FnOnce(&mut Selection)) {
	let mut selection = store.with_untracked(|s| s.selection.clone());
	f(&mut selection);
	if store.with_untracked(|s| s.selection != selection) {
		store.update(|s| s.selection = selection);
	}
}

/// Canvas view of the session's current graph.
///
/// Reads the [`SessionState`] signal from context. A new render graph is built
/// whenever the loaded graph changes; layout mode and canvas commands from the
/// store are applied to the live graph.
#[component]
pub fn ForceGraphCanvas(
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let store = expect_context::<RwSignal<SessionState>>();
	let settings = LayoutSettings::default();
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let state: Shared<ForceGraphState> = Rc::new(RefCell::new(None));
	let animate: Shared<Closure<dyn FnMut()>> = Rc::new(RefCell::new(None));
	let resize_cb: Shared<Closure<dyn FnMut()>> = Rc::new(RefCell::new(None));
	let size = Rc::new(Cell::new((width.unwrap_or(800.0), height.unwrap_or(600.0))));

	// Canvas setup and the frame loop.
	let (state_init, animate_init, resize_cb_init, size_init) =
		(state.clone(), animate.clone(), resize_cb.clone(), size.clone());
	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			warn!("no window, graph canvas disabled");
			return;
		};

		let (w, h) = if fullscreen {
			window_size(&window).unwrap_or((800.0, 600.0))
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
		size_init.set((w, h));
		if let Some(s) = state_init.borrow_mut().as_mut() {
			s.resize(w, h);
		}

		let ctx = match canvas.get_context("2d") {
			Ok(Some(ctx)) => ctx.dyn_into::<CanvasRenderingContext2d>().ok(),
			_ => None,
		};
		let Some(ctx) = ctx else {
			warn!("2d canvas context unavailable, graph will not be drawn");
			return;
		};

		if fullscreen {
			let (state_resize, size_resize, canvas_resize) =
				(state_init.clone(), size_init.clone(), canvas.clone());
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				let Some((nw, nh)) = web_sys::window().as_ref().and_then(window_size) else {
					return;
				};
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				size_resize.set((nw, nh));
				if let Some(s) = state_resize.borrow_mut().as_mut() {
					s.resize(nw, nh);
				}
			}));
			if let Some(ref cb) = *resize_cb_init.borrow() {
				let _ =
					window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		let (state_anim, animate_inner, size_anim) =
			(state_init.clone(), animate_init.clone(), size_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			let selection = store.with_untracked(|s| s.selection.clone());
			let mut moved_to = false;
			if let Some(ref mut s) = *state_anim.borrow_mut() {
				if selection.move_to_selected {
					if let Some(id) = &selection.selected_node {
						s.move_to_node(id);
					}
					moved_to = true;
				}
				s.tick(FRAME_DT);
				render::render(s, &selection, &ctx);
			} else {
				ctx.set_fill_style_str(theme::BACKGROUND);
				let (w, h) = size_anim.get();
				ctx.fill_rect(0.0, 0.0, w, h);
			}
			if moved_to {
				store.update(|s| s.selection.move_to_selected = false);
			}
			if let Some(ref cb) = *animate_inner.borrow() {
				if let Some(win) = web_sys::window() {
					let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
				}
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	// Rebuild the render graph whenever the canonical graph changes.
	let graph_version = Memo::new(move |_| store.with(|s| s.graph_version()));
	let (state_build, size_build, build_settings) = (state.clone(), size.clone(), settings.clone());
	Effect::new(move |_| {
		graph_version.track();
		let (graph, mode) = store.with_untracked(|s| (s.graph().cloned(), s.layout_mode()));
		let built = build(graph.as_deref(), build_settings.initial_spread);
		let (w, h) = size_build.get();
		match built {
			Some(built) => {
				*state_build.borrow_mut() =
					Some(ForceGraphState::new(built.graph, build_settings.clone(), mode, w, h));
				store.update(|s| s.attach_edge_ids(built.edge_ids));
			}
			None => {
				debug!("no graph to draw");
				*state_build.borrow_mut() = None;
			}
		}
	});

	let layout_mode = Memo::new(move |_| store.with(|s| s.layout_mode()));
	let state_mode = state.clone();
	Effect::new(move |_| {
		let mode = layout_mode.get();
		if let Some(s) = state_mode.borrow_mut().as_mut() {
			s.set_mode(mode);
		}
	});

	let command = Memo::new(move |_| store.with(|s| s.command()));
	let handled = Cell::new(store.with_untracked(|s| s.command().map_or(0, |(seq, _)| seq)));
	let state_cmd = state.clone();
	Effect::new(move |_| {
		let Some((seq, cmd)) = command.get() else {
			return;
		};
		if seq <= handled.get() {
			return;
		}
		handled.set(seq);
		let mut guard = state_cmd.borrow_mut();
		let Some(s) = guard.as_mut() else {
			debug!("{cmd:?} ignored, no graph");
			return;
		};
		match cmd {
			GraphCommand::Rerun => s.rerun_layout(),
			GraphCommand::Reshuffle => s.reshuffle(),
			GraphCommand::FitView => s.fit_view(),
		}
	});

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = pointer_position(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_md.borrow_mut() {
			s.pointer_down(x, y);
		}
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = pointer_position(canvas_ref, &ev) else {
			return;
		};
		let pressed = ev.buttons() != 0;
		let mut cursor = None;
		update_selection(store, |selection| {
			if let Some(ref mut s) = *state_mm.borrow_mut() {
				s.pointer_move(x, y, pressed, selection);
				cursor = Some(s.cursor());
			}
		});
		if let (Some(cursor), Some(canvas)) = (cursor, canvas_ref.get()) {
			let _ = web_sys::HtmlElement::style(&canvas).set_property("cursor", cursor);
		}
	};

	let state_mu = state.clone();
	let on_mouseup = move |_: MouseEvent| {
		update_selection(store, |selection| {
			if let Some(ref mut s) = *state_mu.borrow_mut() {
				s.pointer_up(selection);
			}
		});
	};

	let state_ml = state.clone();
	let on_mouseleave = move |ev: MouseEvent| {
		let pressed = ev.buttons() != 0;
		update_selection(store, |selection| {
			if let Some(ref mut s) = *state_ml.borrow_mut() {
				s.pointer_leave(pressed, selection);
			}
		});
	};

	let state_wh = state.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some((x, y)) = pointer_position(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_wh.borrow_mut() {
			s.wheel(x, y, ev.delta_y());
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="force-graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			style="display: block; cursor: grab;"
		/>
	}
}
