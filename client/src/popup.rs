use leptos::prelude::*;
use wasm_bindgen::JsCast;

use geonet_shared::{PopupContent, TrackRow};

use crate::app::{MapRevision, PopupAnchor, PopupView, close_popup, request_redraw};
use crate::state::with_map_state;

/// Detail panel of the clicked feature, pinned above the click position.
#[component]
pub fn PopupPanel() -> impl IntoView {
    let PopupView(popup) = expect_context();
    let PopupAnchor(anchor) = expect_context();
    let MapRevision(revision) = expect_context();

    let visible = move || popup.with(Option::is_some) && anchor.with(Option::is_some);
    let left = move || anchor.get().map(|(x, _)| format!("{x}px")).unwrap_or_default();
    let top = move || anchor.get().map(|(_, y)| format!("{y}px")).unwrap_or_default();

    view! {
        <Show when=visible>
            <div
                class="geonet-popup"
                style:left=left
                style:top=top
                style="position: absolute; transform: translate(-50%, calc(-100% - 14px)); z-index: 20; min-width: 160px; max-width: 320px; background: #ffffff; color: #333333; border-radius: 8px; box-shadow: 0 3px 14px rgba(0,0,0,0.35); padding: 12px 28px 10px 14px; font: 13px/1.4 'Helvetica Neue', Arial, sans-serif;"
            >
                <button
                    class="geonet-popup-close"
                    title="Close"
                    style="position: absolute; top: 4px; right: 6px; border: none; background: none; color: #757575; font-size: 18px; cursor: pointer;"
                    on:click=move |_| close_popup(popup, revision)
                >
                    "\u{00D7}"
                </button>
                {move || popup.get().map(popup_body)}
            </div>
        </Show>
    }
}

fn popup_body(content: PopupContent) -> impl IntoView {
    let PopupContent { title, rows } = content;
    view! {
        {title.map(|title| view! {
            <div class="geonet-popup-title" style="font-weight: 600; margin-bottom: 4px;">{title}</div>
        })}
        {rows
            .into_iter()
            .map(|row| view! { <TrackRowView row=row /> })
            .collect_view()}
    }
}

/// One checkbox row. Toggling it highlights or clears the track's layer.
#[component]
fn TrackRowView(row: TrackRow) -> impl IntoView {
    let PopupView(popup) = expect_context();
    let MapRevision(revision) = expect_context();

    let on_change = move |e: leptos::ev::Event| {
        let Some(input) = e
            .target()
            .and_then(|target| target.dyn_into::<web_sys::HtmlInputElement>().ok())
        else {
            return;
        };
        let checked = input.checked();
        let track_attr = input.value();
        let applied = with_map_state(|state| state.toggle_attr(&track_attr, checked)).flatten();
        // A toggle can close the popup when it removes the layer the popup sits on
        if let Some(content) = applied {
            popup.set(content);
        }
        request_redraw(revision);
    };

    let TrackRow { checkbox, label } = row;
    let title = match label.link {
        Some(link) => view! {
            <a href=link target="_blank" rel="noopener noreferrer" style="color: #0078a8;">{label.text}</a>
        }
        .into_any(),
        None => view! { <span>{label.text}</span> }.into_any(),
    };

    view! {
        <label class="geonet-track-row" style="display: flex; align-items: center; gap: 6px; margin-top: 3px; cursor: pointer;">
            <input
                type="checkbox"
                value=checkbox.track().to_string()
                prop:checked=checkbox.checked()
                on:change=on_change
            />
            <span>{label.prefix}{title}</span>
        </label>
    }
}
