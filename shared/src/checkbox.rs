use crate::dataset::Dataset;
use crate::highlight::HighlightRegistry;
use crate::map::MapWidget;
use crate::track::TrackId;

/// Toggle control for highlighting one track.
///
/// The checked state is read from the registry once, on creation. From then on the
/// checkbox drives the registry and does not follow it: if another checkbox for the
/// same track changes the registry meanwhile, this one goes stale until rebuilt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkbox {
    track: TrackId,
    checked: bool,
}

impl Checkbox {
    pub fn new(track: TrackId, registry: &HighlightRegistry) -> Self {
        Self {
            track,
            checked: registry.is_active(track),
        }
    }

    pub fn track(&self) -> TrackId {
        self.track
    }

    pub fn checked(&self) -> bool {
        self.checked
    }

    /// Apply a user toggle: checking highlights the track, unchecking removes the
    /// highlight. The map reflects the change before this returns.
    pub fn set_checked<M>(
        &mut self,
        checked: bool,
        registry: &mut HighlightRegistry,
        map: &mut M,
        dataset: &Dataset,
    ) where
        M: MapWidget + ?Sized,
    {
        self.checked = checked;
        if checked {
            registry.add(self.track, map, dataset);
        } else {
            registry.remove(self.track, map);
        }
    }
}
