use axum::body::{Body, to_bytes};
use axum::http::Request;
use tower::ServiceExt;

use super::*;

fn public() -> PublicConfig {
    PublicConfig::new("https://abc.supabase.co", "anon-key").unwrap()
}

async fn get_path(path: &str) -> (StatusCode, Vec<u8>) {
    let response = api_routes(public())
        .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), 64 * 1024).await.unwrap();
    (status, body.to_vec())
}

#[tokio::test]
async fn healthz_returns_ok() {
    let (status, _) = get_path("/healthz").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn config_endpoint_serves_public_config() {
    let (status, body) = get_path(CONFIG_ENDPOINT).await;
    assert_eq!(status, StatusCode::OK);

    let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(
        value,
        serde_json::json!({ "supabase_url": "https://abc.supabase.co", "supabase_anon_key": "anon-key" })
    );

    let decoded: PublicConfig = serde_json::from_slice(&body).unwrap();
    assert_eq!(decoded.validated().unwrap(), public());
}

#[tokio::test]
async fn unknown_api_path_is_not_found() {
    let (status, _) = get_path("/api/unknown").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn public_config_handler_echoes_state() {
    let Json(config) = public_config(State(public())).await;
    assert_eq!(config, public());
}
