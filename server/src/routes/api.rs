use axum::Json;
use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;

use crate::state::{AppState, ServedDocument};

/// Documents never change while the process runs; clients revalidate with the ETag.
const DOCUMENT_CACHE_CONTROL: &str = "public, no-cache";

pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "tracks": state.track_count,
        "features": state.feature_count,
    }))
}

pub async fn get_meta(State(state): State<AppState>, headers: HeaderMap) -> Response {
    serve_document(&state.meta, &headers)
}

pub async fn get_features(State(state): State<AppState>, headers: HeaderMap) -> Response {
    serve_document(&state.features, &headers)
}

pub async fn get_config(State(state): State<AppState>, headers: HeaderMap) -> Response {
    serve_document(&state.config, &headers)
}

fn serve_document(document: &ServedDocument, headers: &HeaderMap) -> Response {
    if if_none_match_matches(headers, &document.etag) {
        return not_modified_response(DOCUMENT_CACHE_CONTROL, Some(document.etag.as_str()));
    }
    json_bytes_response(
        (*document.json).clone(),
        DOCUMENT_CACHE_CONTROL,
        Some(document.etag.as_str()),
    )
}

fn json_bytes_response(body: Bytes, cache_control: &'static str, etag: Option<&str>) -> Response {
    let mut response = Response::new(Body::from(body));
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static(cache_control),
    );
    if let Some(etag) = etag
        && let Ok(etag_header) = HeaderValue::from_str(etag)
    {
        headers.insert(header::ETAG, etag_header);
    }
    response
}

fn not_modified_response(cache_control: &'static str, etag: Option<&str>) -> Response {
    let mut response = StatusCode::NOT_MODIFIED.into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static(cache_control),
    );
    if let Some(etag) = etag
        && let Ok(etag_header) = HeaderValue::from_str(etag)
    {
        headers.insert(header::ETAG, etag_header);
    }
    response
}

fn normalize_etag(candidate: &str) -> &str {
    candidate.strip_prefix("W/").unwrap_or(candidate).trim()
}

fn if_none_match_matches(headers: &HeaderMap, etag: &str) -> bool {
    let Some(value) = headers.get(header::IF_NONE_MATCH) else {
        return false;
    };
    let Ok(raw) = value.to_str() else {
        return false;
    };

    raw.split(',').any(|candidate| {
        let candidate = candidate.trim();
        candidate == "*" || normalize_etag(candidate) == normalize_etag(etag)
    })
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;
    use axum::http::Request;
    use tower::ServiceExt;

    use super::*;
    use crate::state::test_state;

    async fn get(uri: &str, if_none_match: Option<&str>) -> Response {
        let mut request = Request::builder().uri(uri);
        if let Some(etag) = if_none_match {
            request = request.header(header::IF_NONE_MATCH, etag);
        }
        crate::app::build_app(test_state(true))
            .oneshot(request.body(Body::empty()).expect("build request"))
            .await
            .expect("router is infallible")
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read response body");
        serde_json::from_slice(&bytes).expect("response body is JSON")
    }

    #[test]
    fn if_none_match_supports_weak_and_multiple_etags() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::IF_NONE_MATCH,
            HeaderValue::from_static("W/\"other\", \"meta-0badf00d\""),
        );
        assert!(if_none_match_matches(&headers, "\"meta-0badf00d\""));
        assert!(!if_none_match_matches(&headers, "\"meta-12345678\""));
    }

    #[tokio::test]
    async fn health_reports_dataset_size() {
        let response = get("/api/health", None).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["tracks"], 2);
        assert_eq!(body["features"], 1);
    }

    #[tokio::test]
    async fn meta_is_served_as_loaded() {
        let response = get("/api/meta", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response
                .headers()
                .get(header::CONTENT_TYPE)
                .and_then(|value| value.to_str().ok()),
            Some("application/json")
        );

        let body = body_json(response).await;
        assert_eq!(body["tracks"][1]["meta"]["post_title"], "Valley");
    }

    #[tokio::test]
    async fn config_exposes_track_color_flag() {
        let body = body_json(get("/api/config", None).await).await;
        assert_eq!(body["use_track_colors"], true);
    }

    #[tokio::test]
    async fn features_endpoint_returns_not_modified_when_etag_matches() {
        let first = get("/api/features", None).await;
        assert_eq!(first.status(), StatusCode::OK);
        let etag = first
            .headers()
            .get(header::ETAG)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned)
            .expect("etag header should be present");

        let second = get("/api/features", Some(&etag)).await;
        assert_eq!(second.status(), StatusCode::NOT_MODIFIED);
        assert_eq!(
            second
                .headers()
                .get(header::CACHE_CONTROL)
                .and_then(|value| value.to_str().ok()),
            Some(DOCUMENT_CACHE_CONTROL)
        );
    }

    #[tokio::test]
    async fn unknown_paths_fall_through_to_static_assets() {
        let response = get("/api/nope", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
