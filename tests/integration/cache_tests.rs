//! Server-side cache behavior through the HTTP layer.

use std::time::Duration;

use axum::http::StatusCode;

use resize_proxy::{create_router, ResizeCache, ResizeService, RouterConfig};

use super::test_utils::{
    assert_status, body_bytes, get, resize_uri, standard_router, MockImageSource, SAMPLE_URL,
};

#[tokio::test]
async fn test_repeated_request_is_served_from_cache() {
    let (router, counter) = standard_router();
    let uri = resize_uri(SAMPLE_URL, 120, 90);

    let first = get(&router, &uri).await;
    assert_status(&first, StatusCode::OK);
    assert_eq!(first.headers().get("x-cache-hit").unwrap(), "false");
    let first_body = body_bytes(first).await;

    let second = get(&router, &uri).await;
    assert_status(&second, StatusCode::OK);
    assert_eq!(second.headers().get("x-cache-hit").unwrap(), "true");
    let second_body = body_bytes(second).await;

    assert_eq!(first_body, second_body, "cached body must be byte-identical");
    assert_eq!(counter.get(SAMPLE_URL).await, 1);
}

#[tokio::test]
async fn test_different_dimensions_are_separate_entries() {
    let (router, counter) = standard_router();

    get(&router, &resize_uri(SAMPLE_URL, 100, 0)).await;
    get(&router, &resize_uri(SAMPLE_URL, 100, 75)).await;
    get(&router, &resize_uri(SAMPLE_URL, 0, 75)).await;

    // Same output size, different keys
    assert_eq!(counter.get(SAMPLE_URL).await, 3);

    let response = get(&router, &resize_uri(SAMPLE_URL, 100, 0)).await;
    assert_eq!(response.headers().get("x-cache-hit").unwrap(), "true");
    assert_eq!(counter.get(SAMPLE_URL).await, 3);
}

#[tokio::test]
async fn test_expired_entries_are_regenerated() {
    let source = MockImageSource::standard();
    let counter = source.counter();
    let service = ResizeService::new(source).with_cache_ttl(Duration::ZERO);
    let router = create_router(service, RouterConfig::new());
    let uri = resize_uri(SAMPLE_URL, 64, 64);

    for _ in 0..3 {
        let response = get(&router, &uri).await;
        assert_status(&response, StatusCode::OK);
        assert_eq!(response.headers().get("x-cache-hit").unwrap(), "false");
    }

    assert_eq!(counter.get(SAMPLE_URL).await, 3);
}

#[tokio::test]
async fn test_least_recently_used_entry_is_evicted() {
    let source = MockImageSource::standard();
    let counter = source.counter();
    let cache = ResizeCache::with_capacity_and_entries(1024 * 1024, 1);
    let service = ResizeService::with_cache(source, cache);
    let router = create_router(service, RouterConfig::new());

    get(&router, &resize_uri(SAMPLE_URL, 40, 40)).await;
    get(&router, &resize_uri(SAMPLE_URL, 48, 48)).await;
    get(&router, &resize_uri(SAMPLE_URL, 40, 40)).await;

    assert_eq!(counter.get(SAMPLE_URL).await, 3);
}

#[tokio::test]
async fn test_entry_larger_than_cache_is_not_retained() {
    let source = MockImageSource::standard();
    let counter = source.counter();
    let service = ResizeService::with_cache(source, ResizeCache::with_capacity(1));
    let router = create_router(service, RouterConfig::new());
    let uri = resize_uri(SAMPLE_URL, 40, 40);

    let first = get(&router, &uri).await;
    assert_status(&first, StatusCode::OK);
    let second = get(&router, &uri).await;
    assert_eq!(second.headers().get("x-cache-hit").unwrap(), "false");

    assert_eq!(counter.get(SAMPLE_URL).await, 2);
}
