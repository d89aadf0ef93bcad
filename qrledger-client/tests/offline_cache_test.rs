use std::sync::Arc;

use axum::body::Body;
use axum::http::{HeaderValue, Method, Request, StatusCode, header::ACCEPT};
use axum_test::TestServer;
use qrledger_client::offline::{
    CacheRequest, CacheStorage, CachedResponse, Destination, DiskCacheStorage,
    FetchSource, MemoryCacheStorage, OfflineCache, OfflineError, ResponseKind,
    proxy,
};
use qrledger_client::testing::StubNetwork;
use tower::ServiceExt;
use url::Url;

const CACHE: &str = "qr-manager-v1";
const ORIGIN: &str = "http://localhost:8000/";
const CDN_SCRIPT: &str = "https://unpkg.com/qr-scanner@1.4.2/qr-scanner.min.js";

fn origin() -> Url {
    Url::parse(ORIGIN).unwrap()
}

fn url(path: &str) -> Url {
    origin().join(path).unwrap()
}

fn assets() -> Vec<String> {
    vec![
        "/".to_string(),
        "/static/js/app.js".to_string(),
        CDN_SCRIPT.to_string(),
    ]
}

fn cache_with(
    storage: Arc<dyn CacheStorage>,
    network: Arc<StubNetwork>,
) -> OfflineCache {
    OfflineCache::new(storage, network, CACHE, origin(), assets())
}

fn stub_all_assets(network: &StubNetwork) {
    network
        .respond(url("/").as_str(), 200, ResponseKind::Basic, "<html>home</html>")
        .respond(
            url("/static/js/app.js").as_str(),
            200,
            ResponseKind::Basic,
            "app()",
        )
        .respond(CDN_SCRIPT, 200, ResponseKind::Cors, "scanner()");
}

fn basic(body: &str) -> CachedResponse {
    CachedResponse {
        status: 200,
        kind: ResponseKind::Basic,
        content_type: Some("text/plain".into()),
        body: body.as_bytes().to_vec(),
    }
}

#[tokio::test]
async fn install_stores_every_asset_under_current_version() {
    let storage = Arc::new(MemoryCacheStorage::new());
    let network = Arc::new(StubNetwork::new());
    stub_all_assets(&network);
    let cache = cache_with(storage.clone(), network);

    assert_eq!(cache.install().await.unwrap(), 3);
    assert_eq!(storage.entry_count(CACHE).await, 3);
    assert!(storage.get(CACHE, CDN_SCRIPT).await.unwrap().is_some());
}

#[tokio::test]
async fn install_is_all_or_nothing() {
    let storage = Arc::new(MemoryCacheStorage::new());
    let network = Arc::new(StubNetwork::new());
    network.respond(url("/").as_str(), 200, ResponseKind::Basic, "home");
    let cache = cache_with(storage.clone(), network);

    let err = cache.install().await.unwrap_err();
    assert!(matches!(err, OfflineError::Install { ref asset, .. } if asset == "/static/js/app.js"));
    assert!(storage.cache_names().await.unwrap().is_empty());
}

#[tokio::test]
async fn activate_removes_other_versions_only() {
    let storage = Arc::new(MemoryCacheStorage::new());
    storage.put("qr-manager-v0", ORIGIN, &basic("old")).await.unwrap();
    storage.put(CACHE, ORIGIN, &basic("new")).await.unwrap();
    let cache = cache_with(storage.clone(), Arc::new(StubNetwork::new()));

    assert_eq!(cache.activate().await.unwrap(), vec!["qr-manager-v0".to_string()]);
    assert_eq!(storage.cache_names().await.unwrap(), vec![CACHE.to_string()]);
}

#[tokio::test]
async fn cached_response_wins_over_network() {
    let storage = Arc::new(MemoryCacheStorage::new());
    storage
        .put("qr-manager-v0", url("/static/js/app.js").as_str(), &basic("cached"))
        .await
        .unwrap();
    let network = Arc::new(StubNetwork::new());
    network.respond(
        url("/static/js/app.js").as_str(),
        200,
        ResponseKind::Basic,
        "fresh",
    );
    let cache = cache_with(storage, network.clone());

    let outcome = cache
        .fetch(&CacheRequest::new(url("/static/js/app.js"), Destination::Other))
        .await
        .unwrap();

    assert_eq!(outcome.source, FetchSource::Cache);
    assert_eq!(outcome.response.body, b"cached");
    assert!(network.requests().is_empty());
}

#[tokio::test]
async fn only_complete_same_origin_responses_are_stored() {
    let storage = Arc::new(MemoryCacheStorage::new());
    let network = Arc::new(StubNetwork::new());
    network
        .respond(url("/api/qrcodes/").as_str(), 200, ResponseKind::Basic, "[]")
        .respond(CDN_SCRIPT, 200, ResponseKind::Cors, "scanner()")
        .respond(url("/missing").as_str(), 404, ResponseKind::Basic, "nope");
    let cache = cache_with(storage.clone(), network);

    for target in [url("/api/qrcodes/"), Url::parse(CDN_SCRIPT).unwrap(), url("/missing")] {
        let outcome = cache
            .fetch(&CacheRequest::new(target, Destination::Other))
            .await
            .unwrap();
        assert_eq!(outcome.source, FetchSource::Network);
    }

    assert!(storage.get(CACHE, url("/api/qrcodes/").as_str()).await.unwrap().is_some());
    assert!(storage.get(CACHE, CDN_SCRIPT).await.unwrap().is_none());
    assert!(storage.get(CACHE, url("/missing").as_str()).await.unwrap().is_none());
}

#[tokio::test]
async fn offline_documents_fall_back_to_root_page() {
    let storage = Arc::new(MemoryCacheStorage::new());
    storage
        .put(CACHE, url("/").as_str(), &basic("<html>home</html>"))
        .await
        .unwrap();
    let network = Arc::new(StubNetwork::new());
    network.set_offline(true);
    let cache = cache_with(storage, network);

    let document = cache
        .fetch(&CacheRequest::new(url("/list"), Destination::Document))
        .await
        .unwrap();
    assert_eq!(document.source, FetchSource::Fallback);
    assert_eq!(document.response.body, b"<html>home</html>");

    let script = cache
        .fetch(&CacheRequest::new(url("/static/js/new.js"), Destination::Other))
        .await
        .unwrap_err();
    assert!(matches!(script, OfflineError::Offline { .. }));
}

#[tokio::test]
async fn disk_storage_serves_installed_assets_after_restart() {
    let dir = tempfile::tempdir().unwrap();
    let network = Arc::new(StubNetwork::new());
    stub_all_assets(&network);
    cache_with(Arc::new(DiskCacheStorage::new(dir.path())), network)
        .install()
        .await
        .unwrap();

    let offline = Arc::new(StubNetwork::new());
    offline.set_offline(true);
    let cache = cache_with(Arc::new(DiskCacheStorage::new(dir.path())), offline);

    let outcome = cache
        .fetch(&CacheRequest::new(url("/static/js/app.js"), Destination::Other))
        .await
        .unwrap();
    assert_eq!(outcome.source, FetchSource::Cache);
    assert_eq!(outcome.response.body, b"app()");
}

#[tokio::test]
async fn proxy_serves_get_through_cache_and_forwards_other_methods() {
    let storage = Arc::new(MemoryCacheStorage::new());
    storage
        .put(CACHE, url("/").as_str(), &basic("<html>home</html>"))
        .await
        .unwrap();
    let network = Arc::new(StubNetwork::new());
    network.respond(url("/api/qrcodes/").as_str(), 201, ResponseKind::Basic, "{}");
    let cache = Arc::new(cache_with(storage, network.clone()));
    let server = TestServer::new(proxy::router(cache, network.clone())).unwrap();

    let home = server.get("/").await;
    home.assert_status_ok();
    home.assert_text("<html>home</html>");
    assert_eq!(home.header("x-qrledger-cache"), "hit");

    let created = server
        .post("/api/qrcodes/")
        .json(&serde_json::json!({"number": "1001"}))
        .await;
    created.assert_status(StatusCode::CREATED);
    let forwarded = network.requests();
    assert_eq!(forwarded.len(), 1);
    assert_eq!(forwarded[0].method, axum::http::Method::POST);
    assert_eq!(forwarded[0].body, br#"{"number":"1001"}"#);

    network.set_offline(true);
    let page = server
        .get("/list")
        .add_header(ACCEPT, HeaderValue::from_static("text/html"))
        .await;
    page.assert_status_ok();
    assert_eq!(page.header("x-qrledger-cache"), "fallback");

    let asset = server.get("/static/js/new.js").await;
    asset.assert_status(StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn registry_api_goes_to_the_network_first() {
    let storage = Arc::new(MemoryCacheStorage::new());
    let list = url("/api/qrcodes/");
    storage.put(CACHE, list.as_str(), &basic("[\"old\"]")).await.unwrap();
    let network = Arc::new(StubNetwork::new());
    network.respond(list.as_str(), 200, ResponseKind::Basic, "[\"new\"]");
    let cache = cache_with(storage.clone(), network.clone());
    let request = CacheRequest::new(list.clone(), Destination::Other);

    let online = cache.fetch(&request).await.unwrap();
    assert_eq!(online.source, FetchSource::Network);
    assert_eq!(online.response.body, br#"["new"]"#);

    network.set_offline(true);
    let offline = cache.fetch(&request).await.unwrap();
    assert_eq!(offline.source, FetchSource::Cache);
    assert_eq!(offline.response.body, br#"["new"]"#);
}

#[test]
fn request_paths_cannot_leave_the_origin() {
    let cache = cache_with(
        Arc::new(MemoryCacheStorage::new()),
        Arc::new(StubNetwork::new()),
    );

    let target = cache.origin_url("//evil.example/steal", Some("x=1"));
    assert_eq!(target.host_str(), Some("localhost"));
    assert_eq!(target.port(), Some(8000));
    assert_eq!(target.path(), "//evil.example/steal");
    assert_eq!(target.query(), Some("x=1"));
}

#[tokio::test]
async fn proxy_never_forwards_to_another_host() {
    let network = Arc::new(StubNetwork::new());
    let cache = Arc::new(cache_with(
        Arc::new(MemoryCacheStorage::new()),
        network.clone(),
    ));
    let app = proxy::router(cache, network.clone());

    let post = Request::builder()
        .method(Method::POST)
        .uri("//evil.example/collect")
        .body(Body::from("secret"))
        .unwrap();
    app.clone().oneshot(post).await.unwrap();

    let get = Request::builder()
        .uri("//evil.example/steal?x=1")
        .body(Body::empty())
        .unwrap();
    app.oneshot(get).await.unwrap();

    let seen = network.requests();
    assert_eq!(seen.len(), 2);
    for request in &seen {
        assert_eq!(request.url.host_str(), Some("localhost"));
        assert_eq!(request.url.port(), Some(8000));
    }
}
