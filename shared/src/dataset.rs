use serde::{Deserialize, Serialize};

use crate::colors::ColorName;
use crate::feature::{Feature, FeatureCollection};
use crate::track::{Meta, TrackCatalog};

/// Rendering switches published by the server next to the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MapConfig {
    #[serde(default)]
    pub use_track_colors: bool,
}

/// Everything loaded at startup. Immutable afterwards.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub features: Vec<Feature>,
    pub catalog: TrackCatalog,
    pub use_track_colors: bool,
}

impl Dataset {
    pub fn new(
        collection: FeatureCollection,
        meta: Meta,
        palette: &[ColorName],
        config: MapConfig,
    ) -> Self {
        Self {
            features: collection.features,
            catalog: TrackCatalog::from_meta(meta, palette),
            use_track_colors: config.use_track_colors,
        }
    }

    pub fn feature(&self, index: usize) -> Option<&Feature> {
        self.features.get(index)
    }
}
