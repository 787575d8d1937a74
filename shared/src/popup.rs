use crate::checkbox::Checkbox;
use crate::dataset::Dataset;
use crate::feature::Feature;
use crate::highlight::HighlightRegistry;
use crate::map::{FeatureClick, MapWidget};
use crate::track::{TrackCatalog, TrackId, TrackLabel};

#[derive(Debug, Clone, PartialEq)]
pub struct TrackRow {
    pub checkbox: Checkbox,
    pub label: TrackLabel,
}

/// Detail panel of a clicked feature.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PopupContent {
    /// `"<geometry type> id: <id>"`, present when the feature carries an id.
    pub title: Option<String>,
    /// One row per track the feature lists, in listed order.
    pub rows: Vec<TrackRow>,
}

impl PopupContent {
    /// Build the panel from the current highlight state.
    pub fn build(feature: &Feature, registry: &HighlightRegistry, catalog: &TrackCatalog) -> Self {
        let title = feature.display_id().map(|id| {
            let geometry = feature.geometry_type().unwrap_or("Feature");
            format!("{geometry} id: {id}")
        });
        let rows = feature
            .track_list()
            .unwrap_or_default()
            .iter()
            .map(|&track| TrackRow {
                checkbox: Checkbox::new(track, registry),
                label: catalog.label(track),
            })
            .collect();
        Self { title, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.rows.is_empty()
    }
}

/// A popup bound to the feature it was opened for.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenPopup {
    pub target: FeatureClick,
    pub content: PopupContent,
}

/// Popup lifecycle. Content is rebuilt on every open and dropped on close, so a
/// reopened popup always shows the highlight state of the moment.
#[derive(Debug, Default)]
pub struct PopupController {
    bound: Option<OpenPopup>,
}

impl PopupController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a popup for a clicked feature, replacing any popup that is open.
    /// Returns `None` (and leaves nothing open) if the click names no feature.
    pub fn open(
        &mut self,
        click: FeatureClick,
        registry: &HighlightRegistry,
        dataset: &Dataset,
    ) -> Option<&OpenPopup> {
        self.bound = None;
        let feature = dataset.feature(click.feature)?;
        let content = PopupContent::build(feature, registry, &dataset.catalog);
        self.bound = Some(OpenPopup {
            target: click,
            content,
        });
        self.bound.as_ref()
    }

    /// Unbind the open popup. Returns the feature it was bound to.
    pub fn close(&mut self) -> Option<FeatureClick> {
        self.bound.take().map(|popup| popup.target)
    }

    pub fn current(&self) -> Option<&OpenPopup> {
        self.bound.as_ref()
    }

    /// Route a checkbox toggle from row `row` of the open popup into the registry.
    /// Ignored when no popup is open or the row does not exist.
    pub fn toggle_row<M>(
        &mut self,
        row: usize,
        checked: bool,
        registry: &mut HighlightRegistry,
        map: &mut M,
        dataset: &Dataset,
    ) where
        M: MapWidget + ?Sized,
    {
        let Some(track) = self
            .bound
            .as_ref()
            .and_then(|popup| popup.content.rows.get(row))
            .map(|row| row.checkbox.track())
        else {
            return;
        };
        self.toggle_track(track, checked, registry, map, dataset);
    }

    /// Route a toggle of `track` from the open popup into the registry, then rebuild
    /// the content so every row for that track agrees.
    ///
    /// Unchecking the track whose highlight layer the popup was opened on removes
    /// that layer, and the popup closes with it. Ignored when no popup is open or
    /// the popup lists no such track.
    pub fn toggle_track<M>(
        &mut self,
        track: TrackId,
        checked: bool,
        registry: &mut HighlightRegistry,
        map: &mut M,
        dataset: &Dataset,
    ) where
        M: MapWidget + ?Sized,
    {
        let Some(popup) = self.bound.as_mut() else {
            return;
        };
        let Some(row) = popup
            .content
            .rows
            .iter_mut()
            .find(|row| row.checkbox.track() == track)
        else {
            return;
        };

        let released = registry.layer(track);
        row.checkbox.set_checked(checked, registry, map, dataset);
        if !checked && released == Some(popup.target.layer) {
            self.bound = None;
            return;
        }
        if let Some(feature) = dataset.feature(popup.target.feature) {
            popup.content = PopupContent::build(feature, registry, &dataset.catalog);
        }
    }
}
