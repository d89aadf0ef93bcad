use thiserror::Error;

use crate::models::Config;

#[derive(Debug, Error)]
pub enum ConfigGuardRailError {
    #[error("CORS wildcard origins are not allowed when DEV_MODE is false")]
    DangerousCorsWildcard,
    #[error("offline cache name must not be blank")]
    BlankCacheName,
    #[error("offline asset list must not be empty")]
    EmptyAssetList,
    #[error("offline asset '{asset}' is neither a path nor an absolute URL")]
    InvalidAsset { asset: String },
    #[error("scanner rate must be at least one scan per second")]
    ZeroScanRate,
}

#[derive(Debug, Clone)]
pub struct ConfigWarning {
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, Default, Clone)]
pub struct ConfigWarnings {
    pub items: Vec<ConfigWarning>,
}

impl ConfigWarnings {
    pub fn push<S: Into<String>>(&mut self, message: S) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: None,
        });
    }

    pub fn push_with_hint<S: Into<String>, H: Into<String>>(
        &mut self,
        message: S,
        hint: H,
    ) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: Some(hint.into()),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn extend(&mut self, other: ConfigWarnings) {
        self.items.extend(other.items);
    }

    /// Emits every warning through `tracing`.
    pub fn log(&self) {
        for warning in &self.items {
            match &warning.hint {
                Some(hint) => {
                    tracing::warn!(hint = %hint, "{}", warning.message)
                }
                None => tracing::warn!("{}", warning.message),
            }
        }
    }
}

pub fn apply_guard_rails(
    config: &Config,
) -> Result<ConfigWarnings, ConfigGuardRailError> {
    let mut warnings = ConfigWarnings::default();

    if config.cors.is_wildcard_included() {
        if !config.dev_mode {
            return Err(ConfigGuardRailError::DangerousCorsWildcard);
        }
        warnings.push("CORS allows any origin; acceptable only in DEV_MODE");
    }

    if config.offline.cache_name.trim().is_empty() {
        return Err(ConfigGuardRailError::BlankCacheName);
    }

    if config.offline.assets.is_empty() {
        return Err(ConfigGuardRailError::EmptyAssetList);
    }

    if let Some(asset) = config.offline.assets.iter().find(|asset| {
        !(asset.starts_with('/') || url::Url::parse(asset).is_ok())
    }) {
        return Err(ConfigGuardRailError::InvalidAsset {
            asset: asset.clone(),
        });
    }

    if config.scanner.max_scans_per_second == 0 {
        return Err(ConfigGuardRailError::ZeroScanRate);
    }

    if !config.database.is_configured() {
        warnings.push_with_hint(
            "DATABASE_URL not configured; records are kept in memory and lost on restart",
            "Set DATABASE_URL or DATABASE_URL_FILE to persist the registry in PostgreSQL",
        );
    }

    if config.scanner.cooldown.is_zero() {
        warnings.push(
            "Scanner cooldown is zero; a code held in front of the camera is handled on every frame",
        );
    }

    Ok(warnings)
}
