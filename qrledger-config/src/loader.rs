use once_cell::sync::Lazy;
use std::{
    fs,
    net::SocketAddr,
    path::{Path, PathBuf},
    time::Duration,
};
use thiserror::Error;
use url::Url;

use crate::{
    constants::{
        DEFAULT_API_URL, DEFAULT_CACHE_DIR, DEFAULT_CACHE_NAME,
        DEFAULT_DB_MAX_CONNECTIONS, DEFAULT_HOST, DEFAULT_MAX_SCANS_PER_SECOND,
        DEFAULT_OFFLINE_ASSETS, DEFAULT_PORT, DEFAULT_PROXY_LISTEN,
        DEFAULT_REQUEST_TIMEOUT, DEFAULT_SCAN_COOLDOWN,
    },
    models::{
        ClientConfig, Config, ConfigMetadata, CorsConfig, DatabaseConfig,
        OfflineConfig, ScannerConfig, ServerConfig,
    },
    sources::{EnvConfig, FileConfig},
    validation::{self, ConfigGuardRailError, ConfigWarnings},
};

static DEFAULT_CONFIG_LOCATIONS: Lazy<Vec<PathBuf>> = Lazy::new(|| {
    vec![
        PathBuf::from("qrledger.toml"),
        PathBuf::from("config/qrledger.toml"),
    ]
});

#[derive(Debug, Default, Clone)]
pub struct ConfigLoaderOptions {
    pub config_path: Option<PathBuf>,
    pub env_file: Option<PathBuf>,
    /// Replaces the process environment. When set, no `.env` file is read.
    pub env: Option<EnvConfig>,
}

#[derive(Debug, Default)]
pub struct ConfigLoader {
    options: ConfigLoaderOptions,
}

#[derive(Debug)]
pub struct ConfigLoad {
    pub config: Config,
    pub warnings: ConfigWarnings,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ConfigLoaderOptions) -> Self {
        Self { options }
    }

    pub fn with_config_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.config_path = Some(path.into());
        self
    }

    pub fn with_env_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.env_file = Some(path.into());
        self
    }

    pub fn with_env(mut self, env: EnvConfig) -> Self {
        self.options.env = Some(env);
        self
    }

    pub fn load(&self) -> Result<ConfigLoad, ConfigLoadError> {
        let (env_config, env_file_loaded) = match &self.options.env {
            Some(env) => (env.clone(), false),
            None => {
                let loaded = self.load_env_file()?;
                (EnvConfig::gather(), loaded)
            }
        };

        let (file_config, config_path) = self.load_file_config(&env_config)?;
        let config_present = config_path.is_some();

        let mut warnings = ConfigWarnings::default();
        if !config_present {
            warnings.push_with_hint(
                "No qrledger.toml detected; using environment variables and defaults",
                "Create qrledger.toml or set QRLEDGER_CONFIG to point at one",
            );
        }

        let config = compose_config(
            file_config.unwrap_or_default(),
            env_config,
            ConfigMetadata {
                config_path,
                env_file_loaded,
            },
        )?;

        warnings.extend(validation::apply_guard_rails(&config)?);

        Ok(ConfigLoad { config, warnings })
    }

    fn load_env_file(&self) -> Result<bool, ConfigLoadError> {
        let result = match &self.options.env_file {
            Some(path) => dotenvy::from_path(path).map(|_| true),
            None => dotenvy::dotenv().map(|_| true),
        };
        match result {
            Ok(loaded) => Ok(loaded),
            Err(dotenvy::Error::Io(_)) => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    fn load_file_config(
        &self,
        env_config: &EnvConfig,
    ) -> Result<(Option<FileConfig>, Option<PathBuf>), ConfigLoadError> {
        let (path, explicit) = if let Some(path) = &self.options.config_path {
            (Some(path.clone()), true)
        } else if let Some(path) = &env_config.config_path {
            (Some(path.clone()), true)
        } else {
            let found = DEFAULT_CONFIG_LOCATIONS
                .iter()
                .find(|candidate| candidate.exists())
                .cloned();
            (found, false)
        };

        let Some(path) = path else {
            return Ok((None, None));
        };

        if !path.exists() {
            if explicit {
                return Err(ConfigLoadError::MissingConfig { path });
            }
            return Ok((None, None));
        }

        let contents =
            fs::read_to_string(&path).map_err(|source| ConfigLoadError::Io {
                path: path.clone(),
                source,
            })?;
        let file_config: FileConfig =
            toml::from_str(&contents).map_err(|source| {
                ConfigLoadError::Parse {
                    path: path.clone(),
                    source,
                }
            })?;

        Ok((Some(file_config), Some(path)))
    }
}

fn compose_config(
    file: FileConfig,
    env: EnvConfig,
    metadata: ConfigMetadata,
) -> Result<Config, ConfigLoadError> {
    let FileConfig {
        server: file_server,
        database: file_database,
        cors: file_cors,
        client: file_client,
        scanner: file_scanner,
        offline: file_offline,
        dev_mode: file_dev_mode,
    } = file;

    let server = ServerConfig {
        host: env
            .server_host
            .clone()
            .or(file_server.host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string()),
        port: env.server_port.or(file_server.port).unwrap_or(DEFAULT_PORT),
        static_dir: env.static_dir.clone().or(file_server.static_dir),
    };

    let database = DatabaseConfig {
        url: resolve_database_url(&env, file_database.url)?,
        max_connections: env
            .database_max_connections
            .or(file_database.max_connections)
            .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS),
    };

    let cors = CorsConfig {
        allowed_origins: env
            .cors_allowed_origins
            .clone()
            .or(file_cors.allowed_origins)
            .unwrap_or_default(),
    };

    let api_url_raw = env
        .api_url
        .clone()
        .or(file_client.api_url)
        .unwrap_or_else(|| DEFAULT_API_URL.to_string());
    let client = ClientConfig {
        api_url: parse_url("api_url", &api_url_raw)?,
        request_timeout: parse_duration(
            "request_timeout",
            env.request_timeout.clone().or(file_client.request_timeout),
            DEFAULT_REQUEST_TIMEOUT,
        )?,
    };

    let scanner = ScannerConfig {
        cooldown: parse_duration(
            "scanner.cooldown",
            env.scan_cooldown.clone().or(file_scanner.cooldown),
            DEFAULT_SCAN_COOLDOWN,
        )?,
        max_scans_per_second: env
            .max_scans_per_second
            .or(file_scanner.max_scans_per_second)
            .unwrap_or(DEFAULT_MAX_SCANS_PER_SECOND),
    };

    let proxy_listen_raw = env
        .proxy_listen
        .clone()
        .or(file_offline.proxy_listen)
        .unwrap_or_else(|| DEFAULT_PROXY_LISTEN.to_string());
    let proxy_listen: SocketAddr = proxy_listen_raw.trim().parse().map_err(
        |_| ConfigLoadError::InvalidSocketAddr {
            value: proxy_listen_raw.clone(),
        },
    )?;

    // Same-origin for the offline cache defaults to the registry itself.
    let origin = match env.origin.clone().or(file_offline.origin) {
        Some(raw) => parse_url("offline.origin", &raw)?,
        None => client.api_url.clone(),
    };

    let offline = OfflineConfig {
        cache_name: env
            .cache_name
            .clone()
            .or(file_offline.cache_name)
            .unwrap_or_else(|| DEFAULT_CACHE_NAME.to_string()),
        cache_root: env
            .cache_root
            .clone()
            .or(file_offline.cache_root)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CACHE_DIR)),
        assets: env
            .offline_assets
            .clone()
            .or(file_offline.assets)
            .unwrap_or_else(|| {
                DEFAULT_OFFLINE_ASSETS
                    .iter()
                    .map(|asset| asset.to_string())
                    .collect()
            }),
        proxy_listen,
        origin,
    };

    Ok(Config {
        server,
        database,
        cors,
        client,
        scanner,
        offline,
        dev_mode: env.dev_mode.or(file_dev_mode).unwrap_or(false),
        metadata,
    })
}

fn resolve_database_url(
    env: &EnvConfig,
    file_url: Option<String>,
) -> Result<Option<String>, ConfigLoadError> {
    if let Some(url) = env
        .database_url
        .clone()
        .filter(|value| !value.trim().is_empty())
    {
        return Ok(Some(url));
    }

    if let Some(path) = env.database_url_file.as_ref()
        && let Some(url) = read_secret_file(path)?
    {
        return Ok(Some(url));
    }

    Ok(file_url
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty()))
}

fn read_secret_file(path: &Path) -> Result<Option<String>, ConfigLoadError> {
    let contents = fs::read_to_string(path).map_err(|source| {
        ConfigLoadError::SecretFileIo {
            path: path.to_path_buf(),
            source,
        }
    })?;
    let trimmed = contents.trim();
    if trimmed.is_empty() {
        Ok(None)
    } else {
        Ok(Some(trimmed.to_string()))
    }
}

fn parse_duration(
    field: &'static str,
    raw: Option<String>,
    default: Duration,
) -> Result<Duration, ConfigLoadError> {
    match raw {
        None => Ok(default),
        Some(value) => humantime::parse_duration(value.trim()).map_err(
            |source| ConfigLoadError::InvalidDuration {
                field,
                value,
                source,
            },
        ),
    }
}

fn parse_url(field: &'static str, raw: &str) -> Result<Url, ConfigLoadError> {
    Url::parse(raw.trim()).map_err(|source| ConfigLoadError::InvalidUrl {
        field,
        value: raw.to_string(),
        source,
    })
}

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("configuration file missing: {path}")]
    MissingConfig { path: PathBuf },
    #[error("failed to read configuration {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("failed to read secret file {path}")]
    SecretFileIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid duration for {field}: '{value}'")]
    InvalidDuration {
        field: &'static str,
        value: String,
        #[source]
        source: humantime::DurationError,
    },
    #[error("invalid URL for {field}: '{value}'")]
    InvalidUrl {
        field: &'static str,
        value: String,
        #[source]
        source: url::ParseError,
    },
    #[error("invalid listen address '{value}'")]
    InvalidSocketAddr { value: String },
    #[error(transparent)]
    GuardRail(#[from] ConfigGuardRailError),
    #[error(transparent)]
    EnvFile(#[from] dotenvy::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    fn loader_with(env: EnvConfig) -> ConfigLoader {
        ConfigLoader::new().with_env(env)
    }

    fn isolated_env(dir: &TempDir) -> EnvConfig {
        // Point at a missing default so the working directory never leaks in.
        EnvConfig {
            cache_root: Some(dir.path().join("offline")),
            ..EnvConfig::default()
        }
    }

    #[test]
    fn defaults_apply_without_file_or_env() {
        let dir = TempDir::new().unwrap();
        let load = loader_with(isolated_env(&dir)).load().unwrap();
        let config = load.config;

        assert_eq!(config.server.host, DEFAULT_HOST);
        assert_eq!(config.server.port, DEFAULT_PORT);
        assert_eq!(config.scanner.cooldown, Duration::from_secs(2));
        assert_eq!(config.offline.cache_name, "qr-manager-v1");
        assert_eq!(config.offline.assets.len(), DEFAULT_OFFLINE_ASSETS.len());
        assert_eq!(config.offline.origin, config.client.api_url);
        assert!(!config.dev_mode);
        assert!(config.database.url.is_none());
    }

    #[test]
    fn file_values_are_overridden_by_env() {
        let dir = TempDir::new().unwrap();
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
dev_mode = true

[server]
host = "127.0.0.1"
port = 9000

[scanner]
cooldown = "750ms"

[offline]
cache_name = "from-file"
assets = ["/", "/static/css/style.css"]
"#
        )
        .unwrap();

        let env = EnvConfig {
            server_port: Some(9100),
            cache_name: Some("from-env".into()),
            ..isolated_env(&dir)
        };
        let load = loader_with(env)
            .with_config_path(file.path())
            .load()
            .unwrap();
        let config = load.config;

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.scanner.cooldown, Duration::from_millis(750));
        assert_eq!(config.offline.cache_name, "from-env");
        assert_eq!(config.offline.assets, vec!["/", "/static/css/style.css"]);
        assert!(config.dev_mode);
        assert_eq!(
            config.metadata.config_path.as_deref(),
            Some(file.path())
        );
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = loader_with(isolated_env(&dir))
            .with_config_path(dir.path().join("absent.toml"))
            .load()
            .unwrap_err();
        assert!(matches!(err, ConfigLoadError::MissingConfig { .. }));
    }

    #[test]
    fn invalid_duration_is_reported_with_field() {
        let dir = TempDir::new().unwrap();
        let env = EnvConfig {
            scan_cooldown: Some("soon".into()),
            ..isolated_env(&dir)
        };
        let err = loader_with(env).load().unwrap_err();
        assert!(matches!(
            err,
            ConfigLoadError::InvalidDuration {
                field: "scanner.cooldown",
                ..
            }
        ));
    }

    #[test]
    fn database_url_file_is_trimmed() {
        let dir = TempDir::new().unwrap();
        let secret = dir.path().join("db_url");
        fs::write(&secret, "postgres://qr@localhost/qr\n").unwrap();
        let env = EnvConfig {
            database_url_file: Some(secret),
            ..isolated_env(&dir)
        };
        let config = loader_with(env).load().unwrap().config;
        assert_eq!(
            config.database.url.as_deref(),
            Some("postgres://qr@localhost/qr")
        );
    }

    #[test]
    fn wildcard_cors_outside_dev_mode_is_rejected() {
        let dir = TempDir::new().unwrap();
        let env = EnvConfig {
            cors_allowed_origins: Some(vec!["*".into()]),
            ..isolated_env(&dir)
        };
        let err = loader_with(env).load().unwrap_err();
        assert!(matches!(
            err,
            ConfigLoadError::GuardRail(
                ConfigGuardRailError::DangerousCorsWildcard
            )
        ));
    }
}
