use std::cell::RefCell;

use geonet_shared::{
    BaseLayer, Dataset, HighlightRegistry, PopupContent, PopupController, TrackId,
};

use crate::canvas_map::CanvasMap;
use crate::viewport::Viewport;

/// Everything the page mutates in response to user input.
#[derive(Default)]
pub struct MapState {
    pub map: CanvasMap,
    pub dataset: Dataset,
    pub registry: HighlightRegistry,
    pub popups: PopupController,
    pub base: Option<BaseLayer>,
    /// World position the open popup points at.
    pub popup_anchor: Option<(f64, f64)>,
}

impl MapState {
    /// Install a freshly loaded dataset and draw it. Runs once per page load.
    pub fn load(&mut self, dataset: Dataset) {
        self.dataset = dataset;
        self.base = Some(BaseLayer::render(&mut self.map, &self.dataset));
    }

    /// Route a canvas click: open the popup of the feature under the cursor, or close
    /// the open popup when the click hits nothing.
    pub fn click(&mut self, sx: f64, sy: f64) -> Option<PopupContent> {
        let Some(hit) = self.map.hit_test(sx, sy) else {
            self.close_popup();
            return None;
        };
        let content = self
            .popups
            .open(hit, &self.registry, &self.dataset)
            .map(|popup| popup.content.clone());
        self.popup_anchor = content
            .is_some()
            .then(|| self.map.viewport().screen_to_world(sx, sy));
        content
    }

    /// Apply a checkbox change from the open popup. `track_attr` is the checkbox's
    /// `value` attribute; anything but a track id leaves the state untouched.
    ///
    /// Returns `None` when there was nothing to apply, otherwise the popup's new
    /// content, which is itself `None` once the popup has closed.
    pub fn toggle_attr(
        &mut self,
        track_attr: &str,
        checked: bool,
    ) -> Option<Option<PopupContent>> {
        let track = TrackId::parse_attr(track_attr)?;
        Some(self.toggle_track(track, checked))
    }

    pub fn toggle_track(&mut self, track: TrackId, checked: bool) -> Option<PopupContent> {
        let Self {
            map,
            dataset,
            registry,
            popups,
            ..
        } = self;
        popups.toggle_track(track, checked, registry, map, dataset);
        let content = popups.current().map(|popup| popup.content.clone());
        if content.is_none() {
            self.popup_anchor = None;
        }
        content
    }

    pub fn close_popup(&mut self) {
        self.popups.close();
        self.popup_anchor = None;
    }

    pub fn refit(&mut self) {
        if let Some(base) = self.base {
            base.refit(&mut self.map);
        }
    }

    pub fn popup_anchor_on_screen(&self) -> Option<(f64, f64)> {
        let (wx, wy) = self.popup_anchor?;
        Some(self.map.viewport().world_to_screen(wx, wy))
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        self.map.viewport_mut()
    }
}

thread_local! {
    static MAP_STATE: RefCell<MapState> = RefCell::new(MapState::default());
}

/// Run `f` against the page's map state. Returns `None` instead of panicking if the
/// state is already borrowed further up the stack.
pub fn with_map_state<R>(f: impl FnOnce(&mut MapState) -> R) -> Option<R> {
    MAP_STATE.with(|slot| {
        let mut state = slot.try_borrow_mut().ok()?;
        Some(f(&mut state))
    })
}
