//! Client-side cache negotiation with `ETag` and `If-None-Match`.

use std::time::Duration;

use axum::http::StatusCode;

use resize_proxy::server::{fnv1_64, unix_now};
use resize_proxy::{create_router, ResizeService, RouterConfig};

use super::test_utils::{
    assert_status, body_bytes, get, get_with_etag, resize_uri, standard_router, MockImageSource,
    SAMPLE_URL,
};

fn query_of(uri: &str) -> &str {
    uri.split_once('?').map(|(_, q)| q).unwrap_or_default()
}

#[tokio::test]
async fn test_etag_format() {
    let (router, _) = standard_router();
    let uri = resize_uri(SAMPLE_URL, 64, 64);

    let before = unix_now();
    let response = get(&router, &uri).await;
    let after = unix_now();
    assert_status(&response, StatusCode::OK);

    let etag = response.headers().get("etag").unwrap().to_str().unwrap();
    let (hash, timestamp) = etag.split_once('X').unwrap();

    assert_eq!(hash, fnv1_64(query_of(&uri).as_bytes()).to_string());
    let timestamp: i64 = timestamp.parse().unwrap();
    assert!((before..=after).contains(&timestamp));
}

#[tokio::test]
async fn test_replayed_etag_is_not_modified() {
    let (router, counter) = standard_router();
    let uri = resize_uri(SAMPLE_URL, 64, 64);

    let response = get(&router, &uri).await;
    let etag = response
        .headers()
        .get("etag")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert_eq!(counter.get(SAMPLE_URL).await, 1);

    let response = get_with_etag(&router, &uri, &etag).await;
    assert_status(&response, StatusCode::NOT_MODIFIED);
    assert!(body_bytes(response).await.is_empty());

    // Answered without touching the source
    assert_eq!(counter.get(SAMPLE_URL).await, 1);
}

#[tokio::test]
async fn test_not_modified_skips_source_entirely() {
    // A fresh ETag short-circuits even when the server never saw the query
    let (router, counter) = standard_router();
    let uri = resize_uri(SAMPLE_URL, 77, 0);
    let etag = format!("{}X{}", fnv1_64(query_of(&uri).as_bytes()), unix_now());

    let response = get_with_etag(&router, &uri, &etag).await;
    assert_status(&response, StatusCode::NOT_MODIFIED);
    assert_eq!(counter.get(SAMPLE_URL).await, 0);
}

#[tokio::test]
async fn test_stale_etag_gets_full_response() {
    let (router, _) = standard_router();
    let uri = resize_uri(SAMPLE_URL, 64, 64);
    let stale = format!(
        "{}X{}",
        fnv1_64(query_of(&uri).as_bytes()),
        unix_now() - 2 * 3600
    );

    let response = get_with_etag(&router, &uri, &stale).await;
    assert_status(&response, StatusCode::OK);

    let etag = response.headers().get("etag").unwrap().to_str().unwrap();
    assert_ne!(etag, stale);
    assert!(!body_bytes(response).await.is_empty());
}

#[tokio::test]
async fn test_etag_from_other_query_is_ignored() {
    let (router, _) = standard_router();

    let response = get(&router, &resize_uri(SAMPLE_URL, 64, 64)).await;
    let etag = response
        .headers()
        .get("etag")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();

    let response = get_with_etag(&router, &resize_uri(SAMPLE_URL, 65, 64), &etag).await;
    assert_status(&response, StatusCode::OK);
}

#[tokio::test]
async fn test_malformed_etags_get_full_response() {
    let (router, _) = standard_router();
    let uri = resize_uri(SAMPLE_URL, 64, 64);
    let hash = fnv1_64(query_of(&uri).as_bytes());

    for value in [
        "garbage".to_string(),
        format!("{}", hash),
        format!("{}Xsoon", hash),
        format!("\"{}X{}\"", hash, unix_now()),
    ] {
        let response = get_with_etag(&router, &uri, &value).await;
        assert_status(&response, StatusCode::OK);
    }
}

#[tokio::test]
async fn test_validation_runs_before_negotiation() {
    let (router, _) = standard_router();
    let uri = resize_uri(SAMPLE_URL, 0, 0);
    let etag = format!("{}X{}", fnv1_64(query_of(&uri).as_bytes()), unix_now());

    let response = get_with_etag(&router, &uri, &etag).await;
    assert_status(&response, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_zero_caching_window_never_matches() {
    let source = MockImageSource::standard();
    let service = ResizeService::new(source).with_cache_ttl(Duration::ZERO);
    let router = create_router(service, RouterConfig::new());
    let uri = resize_uri(SAMPLE_URL, 64, 64);

    let response = get(&router, &uri).await;
    assert_eq!(
        response.headers().get("cache-control").unwrap(),
        "public, max-age=0"
    );
    let etag = response
        .headers()
        .get("etag")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();

    let response = get_with_etag(&router, &uri, &etag).await;
    assert_status(&response, StatusCode::OK);
}
