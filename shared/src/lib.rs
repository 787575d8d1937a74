pub mod base_layer;
pub mod checkbox;
pub mod colors;
pub mod dataset;
pub mod feature;
pub mod highlight;
pub mod map;
pub mod popup;
pub mod style;
pub mod track;

pub use base_layer::BaseLayer;
pub use checkbox::Checkbox;
pub use colors::{ColorName, TRACK_PALETTE};
pub use dataset::{Dataset, MapConfig};
pub use feature::{Feature, FeatureCollection, GeometryKind};
pub use highlight::HighlightRegistry;
pub use map::{FeatureClick, LayerId, MapWidget, OverlayOptions};
pub use popup::{OpenPopup, PopupContent, PopupController, TrackRow};
pub use style::{MarkerOptions, PathStyle};
pub use track::{Meta, Track, TrackCatalog, TrackId, TrackLabel};
