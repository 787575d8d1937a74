use std::path::PathBuf;
use std::sync::Arc;

use bytes::Bytes;
use geonet_shared::MapConfig;

use crate::data::Documents;

/// A pre-serialized JSON document with its validator.
#[derive(Debug, Clone)]
pub struct ServedDocument {
    pub etag: String,
    pub json: Arc<Bytes>,
}

impl ServedDocument {
    pub fn new(name: &str, json: Bytes) -> Self {
        let etag = format!("\"{name}-{:08x}\"", crc32fast::hash(&json));
        Self {
            etag,
            json: Arc::new(json),
        }
    }
}

/// Immutable after startup; cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    pub meta: ServedDocument,
    pub features: ServedDocument,
    pub config: ServedDocument,
    pub track_count: usize,
    pub feature_count: usize,
    pub static_dir: PathBuf,
}

impl AppState {
    pub fn new(documents: Documents, config: MapConfig, static_dir: PathBuf) -> Self {
        let config_json = serde_json::to_vec(&config)
            .map(Bytes::from)
            .unwrap_or_else(|_| Bytes::from_static(br#"{"use_track_colors":false}"#));

        Self {
            meta: ServedDocument::new("meta", documents.meta_raw),
            features: ServedDocument::new("features", documents.features_raw),
            config: ServedDocument::new("config", config_json),
            track_count: documents.meta.tracks.len(),
            feature_count: documents.features.features.len(),
            static_dir,
        }
    }
}

#[cfg(test)]
pub(crate) fn test_state(use_track_colors: bool) -> AppState {
    let documents = crate::data::parse_documents(
        std::path::Path::new("meta.json"),
        Bytes::from_static(br#"{"tracks":[{"id":1,"meta":{"post_title":"Ridge"}},{"id":2,"meta":{"post_title":"Valley"}}]}"#),
        std::path::Path::new("features.geojson"),
        Bytes::from_static(
            br#"{"type":"FeatureCollection","features":[{"type":"Feature","geometry":{"type":"Point","coordinates":[1,2]},"properties":{"tracks":[1,2]}}]}"#,
        ),
    )
    .expect("test documents parse");
    AppState::new(
        documents,
        MapConfig { use_track_colors },
        PathBuf::from("/nonexistent/geonet-static"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_tracks_and_features() {
        let state = test_state(false);
        assert_eq!(state.track_count, 2);
        assert_eq!(state.feature_count, 1);
    }

    #[test]
    fn config_document_carries_track_color_flag() {
        let state = test_state(true);
        assert_eq!(
            state.config.json.as_ref(),
            &Bytes::from_static(br#"{"use_track_colors":true}"#)
        );
    }

    #[test]
    fn etag_changes_with_content() {
        let a = ServedDocument::new("meta", Bytes::from_static(b"{\"tracks\":[]}"));
        let b = ServedDocument::new("meta", Bytes::from_static(b"{\"tracks\":null}"));
        assert!(a.etag.starts_with("\"meta-"));
        assert_ne!(a.etag, b.etag);
    }
}
