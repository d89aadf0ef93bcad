use std::time::Duration;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub const DEFAULT_SCAN_COOLDOWN: Duration = Duration::from_secs(2);
pub const DEFAULT_MAX_SCANS_PER_SECOND: u32 = 3;

/// Bumping this string invalidates every previously installed offline cache.
pub const DEFAULT_CACHE_NAME: &str = "qr-manager-v1";
pub const DEFAULT_CACHE_DIR: &str = "./cache/offline";
pub const DEFAULT_PROXY_LISTEN: &str = "127.0.0.1:8081";

pub const DEFAULT_OFFLINE_ASSETS: &[&str] = &[
    "/",
    "/static/css/style.css",
    "/static/js/app.js",
    "/static/js/scanner.js",
    "/static/js/pwa.js",
    "/static/manifest.json",
    "/static/icons/icon-192x192.png",
    "https://cdnjs.cloudflare.com/ajax/libs/font-awesome/6.4.0/css/all.min.css",
    "https://fonts.googleapis.com/css2?family=Cairo:wght@300;400;600;700&display=swap",
    "https://unpkg.com/qr-scanner@1.4.2/qr-scanner.min.js",
];
