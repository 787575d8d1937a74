use std::path::{Path, PathBuf};

use bytes::Bytes;
use geonet_shared::{FeatureCollection, Meta};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON in {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// The two source documents, raw for serving and parsed for validation and stats.
#[derive(Debug, Clone)]
pub struct Documents {
    pub meta_raw: Bytes,
    pub features_raw: Bytes,
    pub meta: Meta,
    pub features: FeatureCollection,
}

pub async fn read_documents(meta_path: &Path, features_path: &Path) -> Result<Documents, DataError> {
    let meta_raw = read(meta_path).await?;
    let features_raw = read(features_path).await?;
    parse_documents(meta_path, meta_raw, features_path, features_raw)
}

pub fn parse_documents(
    meta_path: &Path,
    meta_raw: Bytes,
    features_path: &Path,
    features_raw: Bytes,
) -> Result<Documents, DataError> {
    let meta = serde_json::from_slice::<Meta>(&meta_raw).map_err(|source| DataError::Parse {
        path: meta_path.to_path_buf(),
        source,
    })?;
    let features =
        serde_json::from_slice::<FeatureCollection>(&features_raw).map_err(|source| {
            DataError::Parse {
                path: features_path.to_path_buf(),
                source,
            }
        })?;

    Ok(Documents {
        meta_raw,
        features_raw,
        meta,
        features,
    })
}

async fn read(path: &Path) -> Result<Bytes, DataError> {
    tokio::fs::read(path)
        .await
        .map(Bytes::from)
        .map_err(|source| DataError::Read {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const META: &str = r#"{"tracks":[{"id":1,"meta":{"post_title":"Ridge"}}]}"#;
    const FEATURES: &str = r#"{"type":"FeatureCollection","features":[
        {"type":"Feature","geometry":{"type":"Point","coordinates":[1,2]},"properties":{"tracks":[1]}},
        {"geometry":null}
    ]}"#;

    fn scratch_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "geonet-server-{}-{name}",
            std::process::id()
        ));
        std::fs::write(&path, contents).expect("write scratch file");
        path
    }

    #[test]
    fn parses_valid_documents_and_keeps_raw_bytes() {
        let documents = parse_documents(
            Path::new("meta.json"),
            Bytes::from_static(META.as_bytes()),
            Path::new("features.geojson"),
            Bytes::from_static(FEATURES.as_bytes()),
        )
        .expect("documents parse");

        assert_eq!(documents.meta.tracks.len(), 1);
        assert_eq!(documents.features.features.len(), 2);
        assert_eq!(documents.meta_raw, Bytes::from_static(META.as_bytes()));
    }

    #[test]
    fn invalid_json_names_the_offending_file() {
        let err = parse_documents(
            Path::new("meta.json"),
            Bytes::from_static(META.as_bytes()),
            Path::new("broken.geojson"),
            Bytes::from_static(b"{not json"),
        )
        .expect_err("features must not parse");

        assert!(matches!(err, DataError::Parse { .. }));
        assert!(err.to_string().contains("broken.geojson"));
    }

    #[tokio::test]
    async fn reads_documents_from_disk() {
        let meta_path = scratch_file("read-meta.json", META);
        let features_path = scratch_file("read-features.geojson", FEATURES);

        let documents = read_documents(&meta_path, &features_path)
            .await
            .expect("documents load");
        assert_eq!(documents.features.features.len(), 2);

        let _ = std::fs::remove_file(meta_path);
        let _ = std::fs::remove_file(features_path);
    }

    #[tokio::test]
    async fn missing_file_is_a_read_error() {
        let err = read_documents(
            Path::new("/nonexistent/geonet/meta.json"),
            Path::new("/nonexistent/geonet/features.geojson"),
        )
        .await
        .expect_err("missing files must fail");

        assert!(matches!(err, DataError::Read { .. }));
        assert!(err.to_string().contains("/nonexistent/geonet/meta.json"));
    }
}
