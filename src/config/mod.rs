use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

pub mod profile;
pub mod settings;

pub use profile::Profile;
pub use settings::{
    AuthAlgorithm, PrivacyAlgorithm, Settings, SinkKind, SnmpVersion,
};

pub const DEFAULT_CONFIG_PATH: &str = "./config/collector.yaml";

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Base settings
    pub settings: Settings,
    /// Walk roots and volume filter
    pub profile: Profile,
}

impl AppConfig {
    /// Loads the YAML configuration; a missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .context(format!("cannot read config file: {}", path.display()))?;
            Self::from_yaml(&content).context(format!("cannot parse {}", path.display()))?
        } else {
            tracing::info!(path = %path.display(), "config file not found, using defaults");
            Self::default()
        };

        config.profile.validate()?;
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yml::from_str(content).context("invalid YAML")
    }

    /// Config path from `SNMP_CONFIG` or the default location
    pub fn default_path() -> String {
        env::var("SNMP_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string())
    }

    /// Secret id from the environment or the settings
    pub fn get_secret_id(&self) -> String {
        env::var("SNMP_SECRET_ID").unwrap_or_else(|_| self.settings.auth.secret_id.clone())
    }

    /// Agent port from the environment or the settings
    pub fn get_port(&self) -> u16 {
        env::var("SNMP_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(self.settings.connection.port)
    }

    /// SNMPv3 principal from the environment or the settings
    pub fn get_username(&self) -> String {
        env::var("SNMP_USERNAME").unwrap_or_else(|_| self.settings.auth.username.clone())
    }

    /// Walk timeout in seconds
    pub fn get_timeout(&self) -> u64 {
        env::var("SNMP_TIMEOUT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(self.settings.connection.timeout)
    }

    /// Worker pool size, never below one
    pub fn get_concurrency(&self) -> usize {
        env::var("SNMP_CONCURRENCY")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(self.settings.connection.concurrency)
            .max(1)
    }

    pub fn log_summary(&self) {
        tracing::info!(
            profile = %self.profile.name,
            version = ?self.settings.auth.version,
            port = self.get_port(),
            timeout_secs = self.get_timeout(),
            concurrency = self.get_concurrency(),
            inventory = %self.settings.directory.inventory,
            "collector configuration"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = AppConfig::from_yaml("{}").unwrap();
        assert_eq!(config.settings.connection.port, 161);
        assert_eq!(config.settings.connection.concurrency, 5);
        assert_eq!(config.settings.auth.version, SnmpVersion::V3);
        assert_eq!(config.settings.auth.auth_protocol, AuthAlgorithm::Sha1);
        assert_eq!(config.settings.auth.privacy_protocol, PrivacyAlgorithm::Aes128);
        assert_eq!(config.profile.memory_oid, "1.3.6.1.4.1.2021.4");
        assert_eq!(config.profile.storage_oid, "1.3.6.1.2.1.25.2.3");
        assert!(config.profile.pseudo_mounts.contains(&"/dev/shm".to_string()));
    }

    #[test]
    fn partial_document_overrides_only_given_fields() {
        let yaml = r#"
settings:
  connection:
    port: 1161
  auth:
    username: poller
    privacy_protocol: aes256
  sink:
    kind: json_lines
    path: /tmp/metrics.jsonl
profile:
  name: appliance
  pseudo_mounts: ["/dev"]
"#;
        let config = AppConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.settings.connection.port, 1161);
        assert_eq!(config.settings.connection.timeout, 10);
        assert_eq!(config.settings.auth.username, "poller");
        assert_eq!(config.settings.auth.privacy_protocol, PrivacyAlgorithm::Aes256);
        assert_eq!(config.settings.sink.kind, SinkKind::JsonLines);
        assert_eq!(config.profile.name, "appliance");
        assert_eq!(config.profile.pseudo_mounts, vec!["/dev".to_string()]);
        assert_eq!(config.profile.memory_oid, "1.3.6.1.4.1.2021.4");
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(dir.path().join("absent.yaml")).unwrap();
        assert_eq!(config.settings.directory.tag_key, "Role");
    }

    #[test]
    fn invalid_walk_root_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("collector.yaml");
        std::fs::write(&path, "profile:\n  memory_oid: not.an.oid\n").unwrap();
        assert!(AppConfig::load(&path).is_err());
    }
}
