use leptos::prelude::*;
use wasm_bindgen::JsCast;

use std::cell::RefCell;

use geonet_shared::PopupContent;

use crate::api;
use crate::canvas::MapCanvas;
use crate::popup::PopupPanel;
use crate::state::with_map_state;

const KEY_ZOOM_STEP: f64 = 120.0;
const KEY_PAN_PX: f64 = 50.0;

fn canvas_dimensions() -> (f64, f64) {
    let Some(window) = web_sys::window() else {
        return (1200.0, 800.0);
    };
    let w = window
        .inner_width()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(1200.0);
    let h = window
        .inner_height()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(800.0);
    (w, h)
}

struct KeydownBinding {
    window: web_sys::Window,
    _handler: wasm_bindgen::closure::Closure<dyn Fn(web_sys::KeyboardEvent)>,
}

thread_local! {
    static KEYDOWN_BINDING: RefCell<Option<KeydownBinding>> = const { RefCell::new(None) };
}

/// Bumped whenever the map state changes and the canvas needs a repaint.
#[derive(Clone, Copy)]
pub(crate) struct MapRevision(pub RwSignal<u64>);
/// Content of the open popup, `None` when closed.
#[derive(Clone, Copy)]
pub(crate) struct PopupView(pub RwSignal<Option<PopupContent>>);
/// Screen position the open popup points at, refreshed on every frame.
#[derive(Clone, Copy)]
pub(crate) struct PopupAnchor(pub RwSignal<Option<(f64, f64)>>);

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum LoadStatus {
    Loading,
    Ready { tracks: usize, features: usize },
    Failed(String),
}

impl LoadStatus {
    fn message(&self) -> String {
        match self {
            Self::Loading => "Loading map data\u{2026}".to_string(),
            Self::Ready { tracks, features } => format!("{tracks} tracks, {features} features"),
            Self::Failed(e) => format!("Could not load map data: {e}"),
        }
    }
}

pub(crate) fn request_redraw(revision: RwSignal<u64>) {
    revision.update(|r| *r = r.wrapping_add(1));
}

pub(crate) fn close_popup(popup: RwSignal<Option<PopupContent>>, revision: RwSignal<u64>) {
    with_map_state(|state| state.close_popup());
    popup.set(None);
    request_redraw(revision);
}

/// Root application component. Provides global reactive signals via context.
#[component]
pub fn App() -> impl IntoView {
    let revision: RwSignal<u64> = RwSignal::new(0);
    let popup: RwSignal<Option<PopupContent>> = RwSignal::new(None);
    let anchor: RwSignal<Option<(f64, f64)>> = RwSignal::new(None);
    let status: RwSignal<LoadStatus> = RwSignal::new(LoadStatus::Loading);

    provide_context(MapRevision(revision));
    provide_context(PopupView(popup));
    provide_context(PopupAnchor(anchor));

    // Load the dataset once on mount
    Effect::new(move || {
        wasm_bindgen_futures::spawn_local(async move {
            match api::fetch_dataset().await {
                Ok(dataset) => {
                    let loaded = LoadStatus::Ready {
                        tracks: dataset.catalog.len(),
                        features: dataset.features.len(),
                    };
                    with_map_state(|state| state.load(dataset));
                    status.set(loaded);
                    request_redraw(revision);
                }
                Err(e) => {
                    web_sys::console::error_1(&format!("Map data load failed: {e}").into());
                    status.set(LoadStatus::Failed(e));
                }
            }
        });
    });

    // Global keyboard shortcuts
    Effect::new(move || {
        use wasm_bindgen::prelude::*;

        let Some(window) = web_sys::window() else {
            return;
        };

        KEYDOWN_BINDING.with(|slot| {
            if let Some(old) = slot.borrow_mut().take() {
                let _ = old.window.remove_event_listener_with_callback(
                    "keydown",
                    old._handler.as_ref().unchecked_ref(),
                );
            }
        });

        let handler =
            Closure::<dyn Fn(web_sys::KeyboardEvent)>::new(move |e: web_sys::KeyboardEvent| {
                let target_tag = e
                    .target()
                    .and_then(|t| t.dyn_into::<web_sys::HtmlElement>().ok())
                    .map(|el| el.tag_name())
                    .unwrap_or_default();
                // Checkboxes keep their own keyboard handling
                if target_tag == "INPUT" || target_tag == "TEXTAREA" {
                    return;
                }

                match e.key().as_str() {
                    "Escape" => close_popup(popup, revision),
                    "r" | "0" => {
                        with_map_state(|state| state.refit());
                        request_redraw(revision);
                    }
                    "+" | "=" | "-" => {
                        e.prevent_default();
                        let delta = if e.key() == "-" { KEY_ZOOM_STEP } else { -KEY_ZOOM_STEP };
                        let (cw, ch) = canvas_dimensions();
                        with_map_state(|state| {
                            state.viewport_mut().zoom_at(delta, cw / 2.0, ch / 2.0)
                        });
                        request_redraw(revision);
                    }
                    "ArrowLeft" | "ArrowRight" | "ArrowUp" | "ArrowDown" => {
                        e.prevent_default();
                        let (dx, dy) = match e.key().as_str() {
                            "ArrowLeft" => (KEY_PAN_PX, 0.0),
                            "ArrowRight" => (-KEY_PAN_PX, 0.0),
                            "ArrowUp" => (0.0, KEY_PAN_PX),
                            _ => (0.0, -KEY_PAN_PX),
                        };
                        with_map_state(|state| state.viewport_mut().pan(dx, dy));
                        request_redraw(revision);
                    }
                    _ => {}
                }
            });

        if window
            .add_event_listener_with_callback("keydown", handler.as_ref().unchecked_ref())
            .is_ok()
        {
            KEYDOWN_BINDING.with(|slot| {
                *slot.borrow_mut() = Some(KeydownBinding {
                    window: window.clone(),
                    _handler: handler,
                });
            });
        }
    });

    let status_color = move || match status.get() {
        LoadStatus::Failed(_) => "#b3261e",
        _ => "#5a5860",
    };

    view! {
        <div style="position: fixed; inset: 0; overflow: hidden; background: #f4f1ea;">
            <MapCanvas />
            <PopupPanel />
            <div
                class="geonet-status"
                style:color=status_color
                style="position: absolute; left: 10px; bottom: 8px; z-index: 10; padding: 3px 8px; border-radius: 4px; background: rgba(255,255,255,0.85); font: 12px/1.4 'Helvetica Neue', Arial, sans-serif; pointer-events: none;"
            >
                {move || status.with(LoadStatus::message)}
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::LoadStatus;

    #[test]
    fn status_messages_describe_the_load() {
        assert_eq!(
            LoadStatus::Ready {
                tracks: 3,
                features: 42
            }
            .message(),
            "3 tracks, 42 features"
        );
        assert_eq!(
            LoadStatus::Failed("HTTP 500 from /api/meta".into()).message(),
            "Could not load map data: HTTP 500 from /api/meta"
        );
        assert!(LoadStatus::Loading.message().starts_with("Loading"));
    }
}
