use geonet_shared::{Dataset, FeatureCollection, MapConfig, Meta, TRACK_PALETTE};
use serde::de::DeserializeOwned;

async fn fetch_json<T: DeserializeOwned>(url: &str) -> Result<T, String> {
    let resp = gloo_net::http::Request::get(url)
        .send()
        .await
        .map_err(|e| format!("fetch error: {e}"))?;

    if !resp.ok() {
        return Err(format!("HTTP {} from {url}", resp.status()));
    }

    resp.json::<T>()
        .await
        .map_err(|e| format!("parse error in {url}: {e}"))
}

pub async fn fetch_meta() -> Result<Meta, String> {
    fetch_json("/api/meta").await
}

pub async fn fetch_features() -> Result<FeatureCollection, String> {
    fetch_json("/api/features").await
}

pub async fn fetch_config() -> Result<MapConfig, String> {
    fetch_json("/api/config").await
}

/// Fetch all three documents and assemble the dataset with track colors assigned.
pub async fn fetch_dataset() -> Result<Dataset, String> {
    let meta = fetch_meta().await?;
    let features = fetch_features().await?;
    let config = fetch_config().await?;
    Ok(Dataset::new(features, meta, TRACK_PALETTE, config))
}
