//! End-to-end resizing with sources fetched over real HTTP.

use std::time::Duration;

use axum::http::StatusCode;
use axum::Router;

use resize_proxy::{create_router, HttpImageSource, ResizeService, RouterConfig};

use super::test_utils::{
    assert_status, body_bytes, body_text, create_test_jpeg, get, jpeg_dimensions, resize_uri,
};

fn http_router(max_size: u64) -> Router {
    let source = HttpImageSource::with_limits(Duration::from_secs(5), max_size).unwrap();
    create_router(ResizeService::new(source), RouterConfig::new())
}

#[tokio::test]
async fn test_resize_remote_jpeg() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/photos/cat.jpg")
        .with_status(200)
        .with_header("content-type", "image/jpeg")
        .with_body(create_test_jpeg(320, 240))
        .expect(1)
        .create_async()
        .await;

    let router = http_router(1024 * 1024);
    let source_url = format!("{}/photos/cat.jpg", server.url());

    let response = get(&router, &resize_uri(&source_url, 160, 0)).await;
    assert_status(&response, StatusCode::OK);
    assert_eq!(jpeg_dimensions(&body_bytes(response).await), (160, 120));

    // Second request comes from the server-side cache
    let response = get(&router, &resize_uri(&source_url, 160, 0)).await;
    assert_eq!(response.headers().get("x-cache-hit").unwrap(), "true");

    mock.assert_async().await;
}

#[tokio::test]
async fn test_remote_not_found_is_failed_dependency() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/gone.jpg")
        .with_status(404)
        .create_async()
        .await;

    let router = http_router(1024 * 1024);
    let source_url = format!("{}/gone.jpg", server.url());

    let response = get(&router, &resize_uri(&source_url, 64, 64)).await;
    assert_status(&response, StatusCode::FAILED_DEPENDENCY);
    assert!(body_text(response).await.contains("404"));
}

#[tokio::test]
async fn test_remote_non_jpeg_is_failed_dependency() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/page.jpg")
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_body("<html><body>not an image</body></html>")
        .create_async()
        .await;

    let router = http_router(1024 * 1024);
    let source_url = format!("{}/page.jpg", server.url());

    let response = get(&router, &resize_uri(&source_url, 64, 64)).await;
    assert_status(&response, StatusCode::FAILED_DEPENDENCY);
}

#[tokio::test]
async fn test_remote_too_large_is_failed_dependency() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/huge.jpg")
        .with_status(200)
        .with_body(create_test_jpeg(320, 240))
        .create_async()
        .await;

    let router = http_router(128);
    let source_url = format!("{}/huge.jpg", server.url());

    let response = get(&router, &resize_uri(&source_url, 64, 64)).await;
    assert_status(&response, StatusCode::FAILED_DEPENDENCY);
}

#[tokio::test]
async fn test_unreachable_host_is_failed_dependency() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let router = http_router(1024 * 1024);
    let source_url = format!("http://{}/missing.jpg", addr);

    let response = get(&router, &resize_uri(&source_url, 64, 64)).await;
    assert_status(&response, StatusCode::FAILED_DEPENDENCY);
    assert!(body_text(response)
        .await
        .starts_with("image loading error:"));
}
