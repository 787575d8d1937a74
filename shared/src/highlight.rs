use std::collections::BTreeMap;

use crate::dataset::Dataset;
use crate::feature::Feature;
use crate::map::{LayerId, MapWidget, OverlayOptions};
use crate::style::{POINT_MARKER, highlighted_style};
use crate::track::TrackId;

/// Whether a feature belongs to a track. Malformed features (not a `Feature`, no
/// valid track list) never belong to any track.
pub fn is_feature_on_track(feature: &Feature, track: TrackId) -> bool {
    if !feature.is_well_formed() {
        return false;
    }
    feature
        .track_list()
        .is_some_and(|tracks| tracks.contains(&track))
}

/// Highlighted tracks and the overlay layer drawing each of them.
///
/// Holds at most one layer per track. `add` and `remove` are idempotent, so any
/// number of checkboxes may call them for the same track without coordinating.
#[derive(Debug, Default)]
pub struct HighlightRegistry {
    layers: BTreeMap<TrackId, LayerId>,
}

impl HighlightRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put a highlight layer for `track` on the map, unless one is already there.
    pub fn add<M>(&mut self, track: TrackId, map: &mut M, dataset: &Dataset)
    where
        M: MapWidget + ?Sized,
    {
        if self.layers.contains_key(&track) {
            return;
        }

        let on_track = move |feature: &Feature| is_feature_on_track(feature, track);
        let layer = map.create_overlay(
            &dataset.features,
            OverlayOptions {
                style: &highlighted_style,
                filter: Some(&on_track),
                marker: POINT_MARKER,
                interactive: true,
            },
        );
        map.add_layer(layer);
        self.layers.insert(track, layer);
    }

    /// Take the highlight layer of `track` off the map, if there is one.
    pub fn remove<M>(&mut self, track: TrackId, map: &mut M)
    where
        M: MapWidget + ?Sized,
    {
        let Some(layer) = self.layers.remove(&track) else {
            return;
        };
        map.remove_layer(layer);
    }

    pub fn is_active(&self, track: TrackId) -> bool {
        self.layers.contains_key(&track)
    }

    pub fn layer(&self, track: TrackId) -> Option<LayerId> {
        self.layers.get(&track).copied()
    }

    /// Highlighted tracks in ascending id order.
    pub fn active_tracks(&self) -> impl Iterator<Item = TrackId> + '_ {
        self.layers.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colors::HIGHLIGHT_COLOR;
    use crate::dataset::MapConfig;
    use crate::feature::FeatureCollection;
    use crate::map::testing::RecordingMap;
    use crate::track::Meta;

    fn dataset() -> Dataset {
        let collection: FeatureCollection = serde_json::from_str(
            r#"{"type":"FeatureCollection","features":[
                {"type":"Feature","geometry":{"type":"LineString","coordinates":[[0,0],[1,1]]},"properties":{"tracks":[1,2]}},
                {"type":"Feature","geometry":{"type":"Point","coordinates":[1,1]},"properties":{"tracks":[2]}},
                {"type":"Feature","geometry":{"type":"Point","coordinates":[2,2]},"properties":{"tracks":[]}},
                {"type":"Feature","geometry":{"type":"Point","coordinates":[3,3]},"properties":{}}
            ]}"#,
        )
        .expect("parse collection");
        Dataset::new(collection, Meta::default(), &[], MapConfig::default())
    }

    #[test]
    fn add_builds_a_layer_with_exactly_the_track_features() {
        let dataset = dataset();
        let mut map = RecordingMap::default();
        let mut registry = HighlightRegistry::new();

        registry.add(TrackId(2), &mut map, &dataset);

        let layer = registry.layer(TrackId(2)).expect("layer for track 2");
        assert!(map.is_attached(layer));
        let recorded = map.layer(layer);
        assert_eq!(recorded.features, vec![0, 1]);
        assert!(recorded.interactive);
        assert_eq!(recorded.styles[0].color, Some(HIGHLIGHT_COLOR));
        assert_eq!(recorded.styles[1].fill_color, Some(HIGHLIGHT_COLOR));
    }

    #[test]
    fn add_twice_keeps_a_single_layer() {
        let dataset = dataset();
        let mut map = RecordingMap::default();
        let mut registry = HighlightRegistry::new();

        registry.add(TrackId(1), &mut map, &dataset);
        registry.add(TrackId(1), &mut map, &dataset);

        assert_eq!(registry.len(), 1);
        assert_eq!(map.layers.len(), 1);
        assert_eq!(map.attached.len(), 1);
    }

    #[test]
    fn remove_twice_is_harmless() {
        let dataset = dataset();
        let mut map = RecordingMap::default();
        let mut registry = HighlightRegistry::new();

        registry.remove(TrackId(1), &mut map);
        assert!(registry.is_empty());
        assert!(map.removed.is_empty());

        registry.add(TrackId(1), &mut map, &dataset);
        registry.remove(TrackId(1), &mut map);
        registry.remove(TrackId(1), &mut map);

        assert!(registry.is_empty());
        assert_eq!(map.removed.len(), 1);
    }

    #[test]
    fn add_then_remove_detaches_the_layer() {
        let dataset = dataset();
        let mut map = RecordingMap::default();
        let mut registry = HighlightRegistry::new();

        registry.add(TrackId(2), &mut map, &dataset);
        let layer = registry.layer(TrackId(2)).expect("layer for track 2");
        registry.remove(TrackId(2), &mut map);

        assert!(!registry.is_active(TrackId(2)));
        assert_eq!(registry.layer(TrackId(2)), None);
        assert!(!map.is_attached(layer));
        assert_eq!(map.removed, vec![layer]);
    }

    #[test]
    fn tracks_are_independent() {
        let dataset = dataset();
        let mut map = RecordingMap::default();
        let mut registry = HighlightRegistry::new();

        registry.add(TrackId(2), &mut map, &dataset);
        registry.add(TrackId(1), &mut map, &dataset);
        registry.remove(TrackId(2), &mut map);

        assert_eq!(registry.active_tracks().collect::<Vec<_>>(), vec![TrackId(1)]);
        let layer = registry.layer(TrackId(1)).expect("layer for track 1");
        assert_eq!(map.layer(layer).features, vec![0]);
    }

    #[test]
    fn unknown_track_gets_an_empty_layer() {
        let dataset = dataset();
        let mut map = RecordingMap::default();
        let mut registry = HighlightRegistry::new();

        registry.add(TrackId(99), &mut map, &dataset);

        let layer = registry.layer(TrackId(99)).expect("layer for track 99");
        assert!(map.layer(layer).features.is_empty());
    }

    #[test]
    fn membership_requires_a_well_formed_feature() {
        let untyped: Feature =
            serde_json::from_str(r#"{"properties":{"tracks":[5]}}"#).expect("parse feature");
        assert!(!is_feature_on_track(&untyped, TrackId(5)));

        let typed: Feature = serde_json::from_str(r#"{"type":"Feature","properties":{"tracks":[5]}}"#)
            .expect("parse feature");
        assert!(is_feature_on_track(&typed, TrackId(5)));
        assert!(!is_feature_on_track(&typed, TrackId(6)));
    }
}
