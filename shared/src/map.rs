use crate::feature::Feature;
use crate::style::{MarkerOptions, PathStyle};

/// Handle of an overlay layer created by a [`MapWidget`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LayerId(pub u64);

/// How an overlay turns features into drawables.
pub struct OverlayOptions<'a> {
    pub style: &'a dyn Fn(&Feature) -> PathStyle,
    /// Features rejected by the filter are not part of the layer at all.
    pub filter: Option<&'a dyn Fn(&Feature) -> bool>,
    /// Circle marker options for point features, before style overrides.
    pub marker: MarkerOptions,
    /// Interactive layers report clicks on their features as [`FeatureClick`]s.
    pub interactive: bool,
}

/// The rendering widget the map state drives.
///
/// Styles and filters are evaluated once, when the overlay is created.
pub trait MapWidget {
    fn create_overlay(&mut self, features: &[Feature], options: OverlayOptions<'_>) -> LayerId;

    fn add_layer(&mut self, layer: LayerId);

    /// Detach a layer from the map. The handle is not used again afterwards.
    fn remove_layer(&mut self, layer: LayerId);

    /// Fit the viewport to the bounds of everything on the layer. An empty layer
    /// leaves the viewport as it is.
    fn fit_to_layer(&mut self, layer: LayerId);
}

/// A click on a feature of an interactive layer. `feature` indexes the dataset's
/// feature list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureClick {
    pub layer: LayerId,
    pub feature: usize,
}
