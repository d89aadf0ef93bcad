use axum_test::TestServer;
use qrledger_config::{Config, ConfigLoader, sources::EnvConfig};
use qrledger_server::{AppState, create_app};
use tempfile::TempDir;

/// In-memory registry behind a test server. The temp dir holds the offline
/// cache root and any static files a test writes.
#[allow(unused)]
pub struct TestApp {
    pub server: TestServer,
    pub state: AppState,
    pub dir: TempDir,
}

pub fn test_config(dir: &TempDir, tweak: impl FnOnce(&mut EnvConfig)) -> Config {
    let mut env = EnvConfig {
        cache_root: Some(dir.path().join("offline")),
        dev_mode: Some(true),
        ..EnvConfig::default()
    };
    tweak(&mut env);
    ConfigLoader::new()
        .with_env(env)
        .load()
        .expect("test configuration loads")
        .config
}

#[allow(unused)]
pub fn build_test_app() -> TestApp {
    build_test_app_with(|_| {})
}

pub fn build_test_app_with(tweak: impl FnOnce(&mut EnvConfig)) -> TestApp {
    let dir = TempDir::new().expect("temp dir");
    let config = test_config(&dir, tweak);
    let state = AppState::in_memory(config);
    let server =
        TestServer::new(create_app(state.clone())).expect("test server");
    TestApp { server, state, dir }
}
