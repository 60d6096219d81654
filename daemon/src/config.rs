//! Daemon configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use vouch_ledger::{LedgerConfig, StaticRegistry};
use vouch_utils::LogFormat;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {what}: {message}")]
    Parse { what: String, message: String },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Configuration for `vouchd`.
///
/// Loaded from a TOML file via [`DaemonConfig::from_toml_file`]; command
/// line flags and `VOUCH_*` environment variables override file values.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Data directory for the LMDB environment.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_rpc_port")]
    pub rpc_port: u16,

    /// LMDB map size in MiB.
    #[serde(default = "default_map_size_mb")]
    pub map_size_mb: usize,

    #[serde(default)]
    pub log_format: LogFormat,

    /// Log level filter, overridden by `RUST_LOG`.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// TOML file of attestation statuses grouped by registry reference.
    #[serde(default)]
    pub registry_file: Option<PathBuf>,

    #[serde(default)]
    pub ledger: LedgerConfig,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_data_dir() -> PathBuf {
    PathBuf::from("./vouch_data")
}

fn default_rpc_port() -> u16 {
    7090
}

fn default_map_size_mb() -> usize {
    1024
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl DaemonConfig {
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::Parse {
            what: "daemon config".into(),
            message: e.to_string(),
        })
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    pub fn map_size_bytes(&self) -> usize {
        self.map_size_mb.saturating_mul(1024 * 1024)
    }

    /// Fail at startup rather than on first use.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.map_size_mb == 0 {
            return Err(ConfigError::Invalid("map_size_mb must be positive".into()));
        }
        self.ledger
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            rpc_port: default_rpc_port(),
            map_size_mb: default_map_size_mb(),
            log_format: LogFormat::default(),
            log_level: default_log_level(),
            registry_file: None,
            ledger: LedgerConfig::default(),
        }
    }
}

/// Load the registry served to the ledger from a TOML file.
///
/// ```toml
/// [main.attestation-1]
/// is_valid = true
/// issuer = "registrar"
/// ```
pub fn load_registry_file(path: &Path) -> Result<StaticRegistry, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|e| ConfigError::Parse {
        what: format!("registry file {}", path.display()),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use vouch_ledger::AttestationRegistry;
    use vouch_types::{AttestationId, RegistryRef};

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = DaemonConfig::default();
        let toml_str = config.to_toml_string().expect("serialize");
        let parsed = DaemonConfig::from_toml_str(&toml_str).expect("should parse");
        assert_eq!(parsed.rpc_port, config.rpc_port);
        assert_eq!(parsed.ledger, config.ledger);
    }

    #[test]
    fn minimal_toml_uses_defaults() {
        let config = DaemonConfig::from_toml_str("").expect("empty toml should use defaults");
        assert_eq!(config.rpc_port, 7090);
        assert_eq!(config.log_format, LogFormat::Human);
        assert_eq!(config.ledger.max_batch_size, 256);
        assert!(config.registry_file.is_none());
    }

    #[test]
    fn partial_toml_overrides() {
        let toml = r#"
            rpc_port = 9999
            log_format = "json"

            [ledger]
            initial_admins = ["root"]
            consensus_threshold_percent = 67
        "#;
        let config = DaemonConfig::from_toml_str(toml).expect("should parse");
        assert_eq!(config.rpc_port, 9999);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.ledger.consensus_threshold_percent, 67);
        assert_eq!(config.ledger.min_verifications_for_consensus, 2); // default
        assert!(config.validate().is_ok());
    }

    #[test]
    fn invalid_parameters_fail_validation() {
        let toml = r#"
            [ledger]
            initial_admins = ["root"]
            min_verifications_for_consensus = 1
        "#;
        let config = DaemonConfig::from_toml_str(toml).expect("should parse");
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn missing_file_returns_read_error() {
        let result = DaemonConfig::from_toml_file(Path::new("/nonexistent/vouch.toml"));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn registry_file_loads_statuses() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("registry.toml");
        std::fs::write(
            &path,
            r#"
                [main.A1]
                is_valid = true
                issuer = "registrar"

                [main.A2]
                is_valid = false
            "#,
        )
        .unwrap();
        let registry = load_registry_file(&path).expect("load registry");
        let main = RegistryRef::parse("main").unwrap();
        let status = registry
            .attestation_status(&main, &AttestationId::parse("A1").unwrap())
            .unwrap();
        assert!(status.is_valid);
        assert_eq!(status.issuer.as_deref(), Some("registrar"));
        assert!(
            !registry
                .attestation_status(&main, &AttestationId::parse("A3").unwrap())
                .unwrap()
                .is_valid
        );
    }
}
