use ambconfig::Config;
use ambserver::ServerBuilder;
use ambzones::api::{zones_api_router, ErrorResponse, ZonesState};
use ambzones::{Error, ZoneDirectoryClient, ZoneId, ZonesConfigExt, ZonesServerExt};
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use std::path::Path;
use tempfile::TempDir;
use tower::ServiceExt;

const ZONES: &str = r#"[
  {"id": 1, "name": "Harbor", "center": {"lat": 0.0, "lng": 0.0}, "radius_m": 100,
   "playlist": ["/audio/gulls.mp3", "/audio/waves.mp3"]},
  {"id": "market", "name": "Market", "center": {"lat": 0.001, "lng": 0.0},
   "playlist": ["/audio/crowd.mp3"]}
]"#;

fn write_zones(dir: &Path, content: &str) -> std::path::PathBuf {
    let path = dir.join("zones.json");
    std::fs::write(&path, content).unwrap();
    path
}

async fn call(router: axum::Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let response = router
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

#[tokio::test]
async fn test_list_zones_in_file_order() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_zones(dir.path(), ZONES);

    let (status, body) = call(zones_api_router(ZonesState::new(file)), "/").await;
    assert_eq!(status, StatusCode::OK);

    let zones: Vec<serde_json::Value> = serde_json::from_slice(&body).unwrap();
    assert_eq!(zones.len(), 2);
    assert_eq!(zones[0]["name"], "Harbor");
    assert_eq!(zones[1]["id"], "market");
    assert_eq!(zones[1]["radius_m"], 50.0);
}

#[tokio::test]
async fn test_missing_file_answers_500_with_json_error() {
    let dir = tempfile::tempdir().unwrap();
    let router = zones_api_router(ZonesState::new(dir.path().join("absent.json")));

    let (status, body) = call(router, "/").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let err: ErrorResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(err.error, "ZONES_UNAVAILABLE");
}

#[tokio::test]
async fn test_malformed_file_answers_500() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_zones(dir.path(), "{ not json");

    let (status, body) = call(zones_api_router(ZonesState::new(file)), "/").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let err: ErrorResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(err.error, "INVALID_ZONES_FILE");
}

#[tokio::test]
async fn test_get_single_zone() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_zones(dir.path(), ZONES);
    let router = zones_api_router(ZonesState::new(file));

    let (status, body) = call(router.clone(), "/market").await;
    assert_eq!(status, StatusCode::OK);
    let zone: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(zone["name"], "Market");

    let (status, body) = call(router, "/42").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let err: ErrorResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(err.error, "ZONE_NOT_FOUND");
}

async fn start_server(dir: &TempDir) -> (ambserver::Server, String) {
    let config = Config::load_config(dir.path().to_str().unwrap()).unwrap();
    let mut server = ServerBuilder::new("Test", "127.0.0.1", 0).build();
    let file = server.init_zones_api(&config).await.unwrap();
    assert_eq!(file, config.get_zones_file());
    server.init_audio_assets(&config).await.unwrap();

    let addr = server.start().await.unwrap();
    (server, format!("http://127.0.0.1:{}", addr.port()))
}

#[tokio::test]
async fn test_root_redirects_to_zones_docs() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::load_config(dir.path().to_str().unwrap()).unwrap();
    let mut server = ServerBuilder::new("Test", "127.0.0.1", 0).build();
    server.init_zones_api(&config).await.unwrap();

    let response = server
        .router()
        .await
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PERMANENT_REDIRECT);
    assert_eq!(response.headers()["location"], "/swagger-ui/zones");
}

#[tokio::test]
async fn test_client_fetches_zones_over_http() {
    let dir = tempfile::tempdir().unwrap();
    write_zones(dir.path(), ZONES);
    let (server, url) = start_server(&dir).await;

    let client = ZoneDirectoryClient::new(&url).unwrap();
    assert_eq!(client.endpoint(), format!("{}/api/zones", url));

    let zones = client.fetch().await.unwrap();
    assert_eq!(zones.len(), 2);
    assert_eq!(zones[0].id, ZoneId::Number(1));
    assert_eq!(zones[0].first_track(), Some("/audio/gulls.mp3"));

    server.shutdown();
}

#[tokio::test]
async fn test_client_treats_server_error_as_empty_directory() {
    let dir = tempfile::tempdir().unwrap();
    // Pas de fichier de zones : le serveur répond 500
    let (server, url) = start_server(&dir).await;

    let client = ZoneDirectoryClient::new(&url).unwrap();
    assert!(matches!(client.fetch().await, Err(Error::Status(500))));
    assert!(client.fetch_or_empty().await.is_empty());

    server.shutdown();
}

#[tokio::test]
async fn test_client_unreachable_server_gives_empty_directory() {
    // Port réservé puis libéré : plus personne n'écoute
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let client = ZoneDirectoryClient::new(&format!("http://127.0.0.1:{}/", port)).unwrap();
    assert!(client.fetch_or_empty().await.is_empty());
}

#[tokio::test]
async fn test_audio_assets_are_served() {
    let dir = tempfile::tempdir().unwrap();
    let (server, url) = start_server(&dir).await;
    std::fs::write(dir.path().join("audio").join("gulls.mp3"), b"mp3").unwrap();

    let body = reqwest::get(format!("{}/audio/gulls.mp3", url))
        .await
        .unwrap()
        .bytes()
        .await
        .unwrap();
    assert_eq!(&body[..], b"mp3");

    server.shutdown();
}
