use crate::dataset::Dataset;
use crate::feature::Feature;
use crate::map::{LayerId, MapWidget, OverlayOptions};
use crate::style::{POINT_MARKER, default_style};

/// The always-visible layer with every feature in its default style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BaseLayer {
    layer: LayerId,
}

impl BaseLayer {
    /// Draw all features and fit the viewport to them. Called once at startup.
    pub fn render<M>(map: &mut M, dataset: &Dataset) -> Self
    where
        M: MapWidget + ?Sized,
    {
        let style = |feature: &Feature| {
            default_style(feature, &dataset.catalog, dataset.use_track_colors)
        };
        let layer = map.create_overlay(
            &dataset.features,
            OverlayOptions {
                style: &style,
                filter: None,
                marker: POINT_MARKER,
                interactive: true,
            },
        );
        map.add_layer(layer);
        map.fit_to_layer(layer);
        Self { layer }
    }

    pub fn layer(&self) -> LayerId {
        self.layer
    }

    /// Fit the viewport back to all features.
    pub fn refit<M>(&self, map: &mut M)
    where
        M: MapWidget + ?Sized,
    {
        map.fit_to_layer(self.layer);
    }
}
