use ambserver::ServerBuilder;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use tower::ServiceExt;

async fn get(router: axum::Router, uri: &str) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
    let response = router
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, headers, body.to_vec())
}

#[tokio::test]
async fn test_json_route() {
    let mut server = ServerBuilder::new("Test", "localhost", 0).build();
    server
        .add_route("/info", || async { serde_json::json!({"name": "test"}) })
        .await;

    let (status, _, body) = get(server.router().await, "/info").await;
    assert_eq!(status, StatusCode::OK);
    let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(value["name"], "test");
}

#[tokio::test]
async fn test_static_dir_serves_files() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("harbor.mp3"), b"ID3fake").unwrap();

    let mut server = ServerBuilder::new("Test", "localhost", 0).build();
    server.add_dir("/audio", dir.path()).await;
    let router = server.router().await;

    let (status, _, body) = get(router.clone(), "/audio/harbor.mp3").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"ID3fake");

    let (status, _, _) = get(router, "/audio/missing.mp3").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_redirect() {
    let mut server = ServerBuilder::new("Test", "localhost", 0).build();
    server.add_redirect("/home", "/api/zones").await;

    let (status, headers, _) = get(server.router().await, "/home").await;
    assert_eq!(status, StatusCode::PERMANENT_REDIRECT);
    assert_eq!(headers[header::LOCATION], "/api/zones");
}

#[tokio::test]
async fn test_start_on_ephemeral_port_and_shutdown() {
    let mut server = ServerBuilder::new("Test", "127.0.0.1", 0).build();
    server
        .add_route("/ping", || async { serde_json::json!("pong") })
        .await;

    let addr = server.start().await.unwrap();
    assert_ne!(addr.port(), 0);

    server.shutdown();
    tokio::time::timeout(std::time::Duration::from_secs(5), server.wait())
        .await
        .unwrap();
}
