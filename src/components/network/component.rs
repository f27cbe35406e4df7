//! Leptos component painting a [`Network`] on a canvas.
//!
//! The component owns only view state (pan/zoom, hover focus, pointer
//! bookkeeping). Every graph change goes through the network, which the
//! animation loop ticks and paints once per frame via
//! `requestAnimationFrame`.

use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::warn;
use wasm_bindgen::prelude::*;
use web_sys::{
	CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, TouchEvent, WheelEvent, Window,
};

use super::drag::{MOUSE_POINTER, PointerId};
use super::highlight::HighlightState;
use super::network::Network;
use super::reconcile::NodeClick;
use super::render::{self, ViewTransform};

/// Frame time assumed for the first frame.
const FRAME_DT: f64 = 0.016;
/// Longest step taken after a stall (hidden tab, debugger).
const MAX_FRAME_DT: f64 = 0.05;

/// Pointer travel (screen pixels) after which a press counts as a drag and
/// the click that follows it is swallowed.
const CLICK_SLOP: f64 = 3.0;

#[derive(Clone, Copy, Debug, Default)]
struct PanState {
	active: bool,
	start_x: f64,
	start_y: f64,
	transform_start_x: f64,
	transform_start_y: f64,
}

#[derive(Clone, Copy, Debug, Default)]
struct Press {
	dragging: bool,
	start_x: f64,
	start_y: f64,
	moved: bool,
}

struct ViewState {
	transform: ViewTransform,
	highlight: HighlightState,
	pan: PanState,
	press: Press,
	suppress_click: bool,
	width: f64,
	height: f64,
}

impl ViewState {
	fn new(width: f64, height: f64) -> Self {
		Self {
			transform: ViewTransform::centered(width, height),
			highlight: HighlightState::new(),
			pan: PanState::default(),
			press: Press::default(),
			suppress_click: false,
			width,
			height,
		}
	}
}

fn viewport_size(window: &Window) -> Option<(f64, f64)> {
	let width = window.inner_width().ok()?.as_f64()?;
	let height = window.inner_height().ok()?.as_f64()?;
	Some((width, height))
}

/// Client coordinates relative to the canvas' top-left corner.
fn canvas_position(canvas: &HtmlCanvasElement, client_x: i32, client_y: i32) -> (f64, f64) {
	let rect = canvas.get_bounding_client_rect();
	(client_x as f64 - rect.left(), client_y as f64 - rect.top())
}

/// Renders `network` on a canvas with node dragging (mouse and multi-touch),
/// click dispatch to node handlers, panning and wheel zoom.
///
/// The canvas sizes itself to its parent by default; `fullscreen` fills the
/// viewport and follows window resizes. Explicit `width`/`height` win over
/// automatic sizing.
#[component]
pub fn NetworkCanvas(
	network: Network,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let view: Rc<RefCell<Option<ViewState>>> = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let zoom_extent = network.config().zoom_extent;

	let (view_init, animate_init, resize_init, network_init) =
		(view.clone(), animate.clone(), resize_cb.clone(), network.clone());
	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};

		let parent_size = |f: fn(&web_sys::Element) -> i32, fallback: f64| {
			canvas
				.parent_element()
				.map(|p| f(&p) as f64)
				.unwrap_or(fallback)
		};
		let (w, h) = match viewport_size(&window) {
			Some(size) if fullscreen => size,
			_ => (
				width.unwrap_or_else(|| parent_size(web_sys::Element::client_width, 800.0)),
				height.unwrap_or_else(|| parent_size(web_sys::Element::client_height, 600.0)),
			),
		};
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let Some(ctx) = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|ctx| ctx.dyn_into::<CanvasRenderingContext2d>().ok())
		else {
			warn!("netgraph: canvas has no 2d context");
			return;
		};

		*view_init.borrow_mut() = Some(ViewState::new(w, h));

		if fullscreen {
			let (view_resize, canvas_resize) = (view_init.clone(), canvas.clone());
			*resize_init.borrow_mut() = Some(Closure::new(move || {
				let Some((nw, nh)) = web_sys::window().as_ref().and_then(viewport_size) else {
					return;
				};
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				if let Some(ref mut v) = *view_resize.borrow_mut() {
					v.width = nw;
					v.height = nh;
				}
			}));
			if let Some(ref cb) = *resize_init.borrow() {
				let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		let (view_anim, animate_inner, network_anim) =
			(view_init.clone(), animate_init.clone(), network_init.clone());
		let mut last_frame: Option<f64> = None;
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			let now = js_sys::Date::now();
			let dt = last_frame
				.map(|last| ((now - last) / 1000.0).clamp(0.0, MAX_FRAME_DT))
				.unwrap_or(FRAME_DT);
			last_frame = Some(now);
			if let Some(ref mut v) = *view_anim.borrow_mut() {
				v.highlight.tick(dt);
				network_anim.tick(dt as f32);
				network_anim.with_scene(|scene| {
					render::render(scene, &v.highlight, &v.transform, &ctx, v.width, v.height)
				});
			}
			if let (Some(cb), Some(window)) = (&*animate_inner.borrow(), web_sys::window()) {
				let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let to_canvas = move |client_x: i32, client_y: i32| {
		canvas_ref
			.get()
			.map(|canvas| canvas_position(&canvas.into(), client_x, client_y))
	};

	let (view_md, network_md) = (view.clone(), network.clone());
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = to_canvas(ev.client_x(), ev.client_y()) else {
			return;
		};
		let mut guard = view_md.borrow_mut();
		let Some(v) = guard.as_mut() else {
			return;
		};
		let (gx, gy) = v.transform.screen_to_graph(x, y);
		v.press = Press {
			dragging: false,
			start_x: x,
			start_y: y,
			moved: false,
		};
		if let Some(node) = network_md.node_at(gx, gy) {
			network_md.drag_start(MOUSE_POINTER, &node, gx, gy);
			v.press.dragging = true;
		} else {
			v.pan = PanState {
				active: true,
				start_x: x,
				start_y: y,
				transform_start_x: v.transform.x,
				transform_start_y: v.transform.y,
			};
		}
	};

	let (view_mm, network_mm) = (view.clone(), network.clone());
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = to_canvas(ev.client_x(), ev.client_y()) else {
			return;
		};
		let mut guard = view_mm.borrow_mut();
		let Some(v) = guard.as_mut() else {
			return;
		};
		let (gx, gy) = v.transform.screen_to_graph(x, y);
		if (x - v.press.start_x).hypot(y - v.press.start_y) > CLICK_SLOP {
			v.press.moved = true;
		}

		if v.press.dragging {
			network_mm.drag_move(MOUSE_POINTER, gx, gy);
		} else if v.pan.active {
			v.transform.x = v.pan.transform_start_x + (x - v.pan.start_x);
			v.transform.y = v.pan.transform_start_y + (y - v.pan.start_y);
		} else {
			let hovered = network_mm.node_at(gx, gy).map(|node| node.key());
			v.highlight.set_hover(hovered);
		}
	};

	let (view_mu, network_mu) = (view.clone(), network.clone());
	let on_mouseup = move |_: MouseEvent| {
		if let Some(ref mut v) = *view_mu.borrow_mut() {
			if v.press.dragging {
				network_mu.drag_end(MOUSE_POINTER);
			}
			v.suppress_click = v.press.moved;
			v.press = Press::default();
			v.pan.active = false;
		}
	};

	let (view_ml, network_ml) = (view.clone(), network.clone());
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut v) = *view_ml.borrow_mut() {
			if v.press.dragging {
				network_ml.drag_end(MOUSE_POINTER);
			}
			v.press = Press::default();
			v.pan.active = false;
			v.highlight.set_hover(None);
		}
	};

	let (view_cl, network_cl) = (view.clone(), network.clone());
	let on_click = move |ev: MouseEvent| {
		let Some((x, y)) = to_canvas(ev.client_x(), ev.client_y()) else {
			return;
		};
		let (gx, gy) = {
			let mut guard = view_cl.borrow_mut();
			let Some(v) = guard.as_mut() else {
				return;
			};
			if std::mem::take(&mut v.suppress_click) {
				return;
			}
			v.transform.screen_to_graph(x, y)
		};
		if let Some(node) = network_cl.node_at(gx, gy) {
			let click = NodeClick {
				x: gx,
				y: gy,
				detail: ev.detail(),
			};
			network_cl.click(&node, click);
		}
	};

	let view_wh = view.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some((x, y)) = to_canvas(ev.client_x(), ev.client_y()) else {
			return;
		};
		if let Some(ref mut v) = *view_wh.borrow_mut() {
			let factor = if ev.delta_y() > 0.0 { 0.9 } else { 1.1 };
			v.transform.zoom_at(x, y, factor, zoom_extent);
		}
	};

	// Each touch drags on its own, keyed by its identifier.
	let touches = move |ev: &TouchEvent| {
		let list = ev.changed_touches();
		(0..list.length())
			.filter_map(move |i| list.get(i))
			.filter_map(move |touch| {
				let (x, y) = to_canvas(touch.client_x(), touch.client_y())?;
				Some((touch.identifier() as PointerId, x, y))
			})
			.collect::<Vec<_>>()
	};

	let (view_ts, network_ts) = (view.clone(), network.clone());
	let on_touchstart = move |ev: TouchEvent| {
		let guard = view_ts.borrow();
		let Some(v) = guard.as_ref() else {
			return;
		};
		for (pointer, x, y) in touches(&ev) {
			let (gx, gy) = v.transform.screen_to_graph(x, y);
			if let Some(node) = network_ts.node_at(gx, gy) {
				ev.prevent_default();
				network_ts.drag_start(pointer, &node, gx, gy);
			}
		}
	};

	let (view_tm, network_tm) = (view.clone(), network.clone());
	let on_touchmove = move |ev: TouchEvent| {
		let guard = view_tm.borrow();
		let Some(v) = guard.as_ref() else {
			return;
		};
		if network_tm.active_drags() > 0 {
			ev.prevent_default();
		}
		for (pointer, x, y) in touches(&ev) {
			let (gx, gy) = v.transform.screen_to_graph(x, y);
			network_tm.drag_move(pointer, gx, gy);
		}
	};

	let network_te = network.clone();
	let on_touchend = move |ev: TouchEvent| {
		for (pointer, _, _) in touches(&ev) {
			network_te.drag_end(pointer);
		}
	};
	let on_touchcancel = on_touchend.clone();

	view! {
		<canvas
			node_ref=canvas_ref
			class="network-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:click=on_click
			on:wheel=on_wheel
			on:touchstart=on_touchstart
			on:touchmove=on_touchmove
			on:touchend=on_touchend
			on:touchcancel=on_touchcancel
			style="display: block; cursor: grab; touch-action: none;"
		/>
	}
}
