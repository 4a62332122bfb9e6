use serde::{Deserialize, Serialize};
use std::env;
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

use crate::paths::ConfigPaths;

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    8000
}

fn default_usage_limit() -> i64 {
    400
}

fn default_detection_endpoint() -> String {
    "https://api.gowinston.ai/v2/ai-content-detection".to_string()
}

fn default_paraphrase_endpoint() -> String {
    // Paraphrase models are typically served by a local sidecar.
    "http://127.0.0.1:8600/paraphrase".to_string()
}

/// The AI-content detection service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionConfig {
    #[serde(default = "default_detection_endpoint")]
    pub endpoint: String,
    /// Bearer token for the detection service. Usually supplied via
    /// `REDRAFT_DETECTION_API_KEY` rather than the config file.
    #[serde(default)]
    pub api_key: String,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            endpoint: default_detection_endpoint(),
            api_key: String::new(),
        }
    }
}

/// The paraphrase model server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParaphraseConfig {
    #[serde(default = "default_paraphrase_endpoint")]
    pub endpoint: String,
    /// Optional bearer token; local sidecars usually run without one.
    #[serde(default)]
    pub api_key: Option<String>,
}

impl Default for ParaphraseConfig {
    fn default() -> Self {
        Self {
            endpoint: default_paraphrase_endpoint(),
            api_key: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Quota granted to a user the first time the service sees them.
    #[serde(default = "default_usage_limit")]
    pub default_usage_limit: i64,
    /// Shared secret gating the limit-adjustment endpoint. Usually supplied
    /// via `REDRAFT_ADMIN_TOKEN` rather than the config file.
    #[serde(default)]
    pub admin_token: String,
    /// Explicit usage ledger location; when unset the ledger lives at
    /// `usage.db` under the config dir. The service always persists usage,
    /// there is no in-memory fallback.
    #[serde(default)]
    pub database_path: Option<PathBuf>,
    #[serde(default)]
    pub detection: DetectionConfig,
    #[serde(default)]
    pub paraphrase: ParaphraseConfig,
    #[serde(skip)]
    paths: Option<ConfigPaths>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            default_usage_limit: default_usage_limit(),
            admin_token: String::new(),
            database_path: None,
            detection: DetectionConfig::default(),
            paraphrase: ParaphraseConfig::default(),
            paths: None,
        }
    }
}

impl ServiceConfig {
    /// Returns the `ConfigPaths` for this config. If paths haven't been set,
    /// creates the default paths (may fail if `$HOME` is unset).
    pub fn paths(&self) -> anyhow::Result<ConfigPaths> {
        match &self.paths {
            Some(p) => Ok(p.clone()),
            None => ConfigPaths::new(),
        }
    }

    /// Set a custom `ConfigPaths` (useful for testing or multi-instance).
    pub fn set_paths(&mut self, paths: ConfigPaths) {
        self.paths = Some(paths);
    }

    /// Load config from the default location (`~/.redraft/config.toml`).
    pub fn load() -> anyhow::Result<Self> {
        let paths = ConfigPaths::new()?;
        Self::load_from(&paths)
    }

    /// Load config from a specific `ConfigPaths`. File values are overlaid
    /// with environment overrides before validation, so secrets can stay
    /// out of the file entirely.
    pub fn load_from(paths: &ConfigPaths) -> anyhow::Result<Self> {
        let config_file = paths.config_path();
        let mut config = if config_file.exists() {
            let content = std::fs::read_to_string(&config_file)?;
            let config: ServiceConfig = toml::from_str(&content)?;
            config
        } else {
            Self::default()
        };
        config.apply_env_overrides()?;
        config.paths = Some(paths.clone());
        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) -> anyhow::Result<()> {
        if let Ok(val) = env::var("REDRAFT_ADMIN_TOKEN") {
            if !val.is_empty() {
                self.admin_token = val;
            }
        }
        if let Ok(val) = env::var("REDRAFT_DETECTION_API_KEY") {
            if !val.is_empty() {
                self.detection.api_key = val;
            }
        }
        if let Ok(val) = env::var("REDRAFT_PARAPHRASE_API_KEY") {
            if !val.is_empty() {
                self.paraphrase.api_key = Some(val);
            }
        }
        if let Ok(val) = env::var("REDRAFT_DEFAULT_USAGE_LIMIT") {
            self.default_usage_limit = val
                .parse()
                .map_err(|_| anyhow::anyhow!("REDRAFT_DEFAULT_USAGE_LIMIT must be an integer"))?;
        }
        if let Ok(val) = env::var("REDRAFT_DATABASE_PATH") {
            if !val.is_empty() {
                self.database_path = Some(PathBuf::from(val));
            }
        }
        Ok(())
    }

    /// Validate config values. Called automatically by `load` / `load_from`.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.port == 0 {
            anyhow::bail!("port must not be 0");
        }
        if self.default_usage_limit < 0 {
            anyhow::bail!("default_usage_limit must not be negative");
        }
        if self.admin_token.is_empty() {
            anyhow::bail!("admin_token must be set (REDRAFT_ADMIN_TOKEN)");
        }
        if self.detection.endpoint.is_empty() {
            anyhow::bail!("detection.endpoint must not be empty");
        }
        if self.detection.api_key.is_empty() {
            anyhow::bail!("detection.api_key must be set (REDRAFT_DETECTION_API_KEY)");
        }
        if self.paraphrase.endpoint.is_empty() {
            anyhow::bail!("paraphrase.endpoint must not be empty");
        }
        Ok(())
    }

    /// Resolved ledger location: the explicit override, else `usage.db`
    /// under the config dir.
    pub fn resolved_database_path(&self) -> anyhow::Result<PathBuf> {
        match &self.database_path {
            Some(p) => Ok(p.clone()),
            None => Ok(self.paths()?.usage_db_path()),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn test_paths() -> ConfigPaths {
        let dir = tempfile::tempdir().unwrap();
        ConfigPaths::with_base(dir.keep())
    }

    // TOML carrying the secrets so load-time validation passes without
    // relying on process environment.
    const SECRETS_TOML: &str = "admin_token = \"tadmin\"\n[detection]\napi_key = \"tkey\"\n";

    fn valid_config() -> ServiceConfig {
        let mut config = ServiceConfig::default();
        config.admin_token = "tadmin".to_string();
        config.detection.api_key = "tkey".to_string();
        config
    }

    #[test]
    fn default_produces_expected_values() {
        let config = ServiceConfig::default();
        assert_eq!(config.host, IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        assert_eq!(config.port, 8000);
        assert_eq!(config.default_usage_limit, 400);
        assert!(config.database_path.is_none());
        assert!(config.detection.endpoint.contains("gowinston"));
        assert!(config.paraphrase.api_key.is_none());
    }

    #[test]
    fn bind_addr_formats_correctly() {
        let mut config = valid_config();
        config.port = 8080;
        config.host = IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1));
        assert_eq!(config.bind_addr(), "127.0.0.1:8080");
    }

    #[test]
    fn load_with_no_file_and_no_secrets_fails_validation() {
        let paths = test_paths();
        paths.ensure_config_dir().unwrap();
        // Unless the environment supplies the secrets, a bare load must
        // refuse to start the service.
        if env::var("REDRAFT_ADMIN_TOKEN").is_err()
            && env::var("REDRAFT_DETECTION_API_KEY").is_err()
        {
            assert!(ServiceConfig::load_from(&paths).is_err());
        }
    }

    #[test]
    fn load_with_valid_toml() {
        let paths = test_paths();
        paths.ensure_config_dir().unwrap();
        std::fs::write(
            paths.config_path(),
            format!("port = 8888\n{SECRETS_TOML}"),
        )
        .unwrap();
        let config = ServiceConfig::load_from(&paths).unwrap();
        assert_eq!(config.port, 8888);
    }

    #[test]
    fn load_with_partial_toml_fills_defaults() {
        let paths = test_paths();
        paths.ensure_config_dir().unwrap();
        std::fs::write(
            paths.config_path(),
            format!("port = 7777\n{SECRETS_TOML}"),
        )
        .unwrap();
        let config = ServiceConfig::load_from(&paths).unwrap();
        assert_eq!(config.port, 7777);
        assert_eq!(config.default_usage_limit, 400);
        assert!(config.detection.endpoint.contains("gowinston"));
    }

    #[test]
    fn load_with_invalid_toml_returns_error() {
        let paths = test_paths();
        paths.ensure_config_dir().unwrap();
        std::fs::write(paths.config_path(), "not valid {{{{ toml").unwrap();
        assert!(ServiceConfig::load_from(&paths).is_err());
    }

    #[test]
    fn validate_rejects_port_zero() {
        let mut config = valid_config();
        config.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_negative_default_limit() {
        let mut config = valid_config();
        config.default_usage_limit = -1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_missing_admin_token() {
        let mut config = valid_config();
        config.admin_token = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_missing_detection_key() {
        let mut config = valid_config();
        config.detection.api_key = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_empty_endpoints() {
        let mut config = valid_config();
        config.detection.endpoint = String::new();
        assert!(config.validate().is_err());

        let mut config = valid_config();
        config.paraphrase.endpoint = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn resolved_database_path_prefers_explicit_override() {
        let mut config = valid_config();
        config.set_paths(ConfigPaths::with_base(PathBuf::from("/custom/base")));
        assert_eq!(
            config.resolved_database_path().unwrap(),
            PathBuf::from("/custom/base/usage.db")
        );

        config.database_path = Some(PathBuf::from("/var/lib/redraft/ledger.db"));
        assert_eq!(
            config.resolved_database_path().unwrap(),
            PathBuf::from("/var/lib/redraft/ledger.db")
        );
    }

    #[test]
    fn toml_roundtrip() {
        let config = valid_config();
        let serialized = toml::to_string(&config).unwrap();
        let deserialized: ServiceConfig = toml::from_str(&serialized).unwrap();
        assert_eq!(deserialized.port, config.port);
        assert_eq!(deserialized.default_usage_limit, config.default_usage_limit);
        assert_eq!(deserialized.detection.endpoint, config.detection.endpoint);
    }

    #[test]
    fn set_paths_is_used_by_paths_accessor() {
        let mut config = valid_config();
        let base = PathBuf::from("/custom/base");
        config.set_paths(ConfigPaths::with_base(base.clone()));
        let paths = config.paths().unwrap();
        assert_eq!(paths.config_dir(), base.as_path());
    }
}
