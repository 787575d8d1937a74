use std::cell::{Cell, RefCell};
use std::rc::Rc;

use leptos::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, MouseEvent, PointerEvent, WheelEvent};

use crate::app::{MapRevision, PopupAnchor, PopupView, request_redraw};
use crate::render_loop::RenderScheduler;
use crate::state::with_map_state;

/// Pointer travel below which a press-release counts as a click rather than a drag.
const CLICK_SLOP_PX: f64 = 5.0;

fn device_pixel_ratio() -> f64 {
    web_sys::window()
        .map(|w| w.device_pixel_ratio())
        .unwrap_or(1.0)
        .max(1.0)
}

fn set_cursor(target: Option<web_sys::EventTarget>, cursor: &str) {
    if let Some(target) = target
        && let Ok(el) = target.dyn_into::<web_sys::HtmlElement>()
    {
        el.style().set_property("cursor", cursor).ok();
    }
}

#[component]
pub fn MapCanvas() -> impl IntoView {
    let MapRevision(revision) = expect_context();
    let PopupView(popup) = expect_context();
    let PopupAnchor(anchor) = expect_context();

    let canvas_ref = NodeRef::<leptos::html::Canvas>::new();

    // Track drag state
    let is_dragging = Rc::new(Cell::new(false));
    let drag_start_x = Rc::new(Cell::new(0.0f64));
    let drag_start_y = Rc::new(Cell::new(0.0f64));
    let last_x = Rc::new(Cell::new(0.0f64));
    let last_y = Rc::new(Cell::new(0.0f64));

    // Track pinch state
    let pinch_dist = Rc::new(Cell::new(0.0f64));

    // Cached 2D context (invalidated on canvas resize)
    let cached_ctx: Rc<RefCell<Option<CanvasRenderingContext2d>>> = Rc::new(RefCell::new(None));

    let scheduler = RenderScheduler::new(move || {
        let Some(canvas) = canvas_ref.get_untracked() else {
            return;
        };
        let Some(parent) = canvas.parent_element() else {
            return;
        };
        let w = parent.client_width() as f64;
        let h = parent.client_height() as f64;
        if w <= 0.0 || h <= 0.0 {
            return;
        }

        let dpr = device_pixel_ratio();
        let pw = (w * dpr).round().max(1.0) as u32;
        let ph = (h * dpr).round().max(1.0) as u32;
        if canvas.width() != pw || canvas.height() != ph {
            canvas.set_width(pw);
            canvas.set_height(ph);
            // Resizing resets 2D context state
            *cached_ctx.borrow_mut() = None;
        }

        let ctx = {
            let mut ctx_cache = cached_ctx.borrow_mut();
            if ctx_cache.is_none() {
                *ctx_cache = canvas
                    .get_context("2d")
                    .ok()
                    .flatten()
                    .and_then(|ctx| ctx.dyn_into::<CanvasRenderingContext2d>().ok());
            }
            let Some(ctx) = ctx_cache.clone() else {
                return;
            };
            ctx
        };
        // All drawing stays in CSS pixel coordinates
        ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0).ok();

        let screen_anchor = with_map_state(|state| {
            state.map.set_size(w, h);
            state.map.draw(&ctx);
            state.popup_anchor_on_screen()
        })
        .flatten();
        if anchor.get_untracked() != screen_anchor {
            anchor.set(screen_anchor);
        }
    });

    // Repaint whenever map state changes
    let sched_revision = scheduler.clone();
    Effect::new(move || {
        revision.track();
        sched_revision.mark_dirty();
    });

    let _resize_listener = window_event_listener(leptos::ev::resize, move |_| {
        request_redraw(revision);
    });

    // --- Input handlers ---

    let on_wheel = move |e: WheelEvent| {
        e.prevent_default();
        let delta = e.delta_y();
        let x = e.offset_x() as f64;
        let y = e.offset_y() as f64;
        with_map_state(|state| state.viewport_mut().zoom_at(delta, x, y));
        request_redraw(revision);
    };

    let on_pointer_down = {
        let is_dragging = is_dragging.clone();
        let drag_start_x = drag_start_x.clone();
        let drag_start_y = drag_start_y.clone();
        let last_x = last_x.clone();
        let last_y = last_y.clone();
        move |e: PointerEvent| {
            is_dragging.set(true);
            drag_start_x.set(e.client_x() as f64);
            drag_start_y.set(e.client_y() as f64);
            last_x.set(e.client_x() as f64);
            last_y.set(e.client_y() as f64);

            if let Some(target) = e.target()
                && let Ok(el) = target.dyn_into::<web_sys::HtmlElement>()
            {
                el.set_pointer_capture(e.pointer_id()).ok();
                el.style().set_property("cursor", "grabbing").ok();
            }
        }
    };

    let on_pointer_move = {
        let is_dragging = is_dragging.clone();
        let last_x = last_x.clone();
        let last_y = last_y.clone();
        move |e: PointerEvent| {
            if is_dragging.get() {
                let dx = e.client_x() as f64 - last_x.get();
                let dy = e.client_y() as f64 - last_y.get();
                last_x.set(e.client_x() as f64);
                last_y.set(e.client_y() as f64);
                with_map_state(|state| state.viewport_mut().pan(dx, dy));
                request_redraw(revision);
            } else {
                let (x, y) = local_position(canvas_ref, e.client_x(), e.client_y());
                let over_feature =
                    with_map_state(|state| state.map.hit_test(x, y).is_some()).unwrap_or(false);
                set_cursor(e.target(), if over_feature { "pointer" } else { "grab" });
            }
        }
    };

    let on_pointer_up = {
        let is_dragging = is_dragging.clone();
        move |e: PointerEvent| {
            is_dragging.set(false);
            set_cursor(e.target(), "grab");
        }
    };

    let on_click = {
        let drag_start_x = drag_start_x.clone();
        let drag_start_y = drag_start_y.clone();
        move |e: MouseEvent| {
            let dx = (e.client_x() as f64 - drag_start_x.get()).abs();
            let dy = (e.client_y() as f64 - drag_start_y.get()).abs();
            if dx >= CLICK_SLOP_PX || dy >= CLICK_SLOP_PX {
                return;
            }
            let (x, y) = local_position(canvas_ref, e.client_x(), e.client_y());
            let content = with_map_state(|state| state.click(x, y)).flatten();
            popup.set(content);
            request_redraw(revision);
        }
    };

    let on_touch_start = {
        let pinch_dist = pinch_dist.clone();
        move |e: web_sys::TouchEvent| {
            let touches = e.touches();
            if touches.length() == 2 {
                e.prevent_default();
                let (Some(t0), Some(t1)) = (touches.get(0), touches.get(1)) else {
                    return;
                };
                let dx = (t1.client_x() - t0.client_x()) as f64;
                let dy = (t1.client_y() - t0.client_y()) as f64;
                pinch_dist.set((dx * dx + dy * dy).sqrt());
            }
        }
    };

    let on_touch_move = {
        let pinch_dist = pinch_dist.clone();
        move |e: web_sys::TouchEvent| {
            let touches = e.touches();
            if touches.length() == 2 {
                e.prevent_default();
                let (Some(t0), Some(t1)) = (touches.get(0), touches.get(1)) else {
                    return;
                };
                let dx = (t1.client_x() - t0.client_x()) as f64;
                let dy = (t1.client_y() - t0.client_y()) as f64;
                let new_dist = (dx * dx + dy * dy).sqrt();
                let old_dist = pinch_dist.get();

                if old_dist > 0.0 {
                    let (mid_x, mid_y) = local_position(
                        canvas_ref,
                        (t0.client_x() + t1.client_x()) / 2,
                        (t0.client_y() + t1.client_y()) / 2,
                    );
                    let delta = -(new_dist - old_dist) * 2.0;
                    with_map_state(|state| state.viewport_mut().zoom_at(delta, mid_x, mid_y));
                    request_redraw(revision);
                }

                pinch_dist.set(new_dist);
            }
        }
    };

    view! {
        <div
            style="position: absolute; inset: 0; overflow: hidden;"
            on:wheel=on_wheel
            on:pointerdown=on_pointer_down
            on:pointermove=on_pointer_move
            on:pointerup=on_pointer_up
            on:click=on_click
            on:touchstart=on_touch_start
            on:touchmove=on_touch_move
        >
            <canvas
                node_ref=canvas_ref
                style="position: absolute; inset: 0; width: 100%; height: 100%; touch-action: none; cursor: grab;"
            />
        </div>
    }
}

/// Client coordinates relative to the canvas' top-left corner.
fn local_position(
    canvas_ref: NodeRef<leptos::html::Canvas>,
    client_x: i32,
    client_y: i32,
) -> (f64, f64) {
    let (x, y) = (client_x as f64, client_y as f64);
    canvas_ref
        .get_untracked()
        .map(|el| {
            let rect = el.get_bounding_client_rect();
            (x - rect.left(), y - rect.top())
        })
        .unwrap_or((x, y))
}
