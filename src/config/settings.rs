use serde::{Deserialize, Serialize};
use snmp2::v3::{AuthProtocol, Cipher};

/// Process-level settings of the collector.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Connection settings
    pub connection: ConnectionSettings,
    /// Authentication settings
    pub auth: AuthSettings,
    /// Where targets come from
    pub directory: DirectorySettings,
    /// Where metrics go
    pub sink: SinkSettings,
    /// HTTP trigger surface
    pub server: ServerSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionSettings {
    /// Timeout for a single walk (seconds)
    pub timeout: u64,
    /// Extra attempts for a walk that failed at the transport level
    pub retries: u32,
    /// Agent UDP port
    pub port: u16,
    /// Targets processed at the same time
    pub concurrency: usize,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            timeout: 10,
            retries: 2,
            port: 161,
            concurrency: 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnmpVersion {
    V2c,
    V3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthAlgorithm {
    Md5,
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
}

impl AuthAlgorithm {
    pub fn to_snmp(self) -> AuthProtocol {
        match self {
            AuthAlgorithm::Md5 => AuthProtocol::Md5,
            AuthAlgorithm::Sha1 => AuthProtocol::Sha1,
            AuthAlgorithm::Sha224 => AuthProtocol::Sha224,
            AuthAlgorithm::Sha256 => AuthProtocol::Sha256,
            AuthAlgorithm::Sha384 => AuthProtocol::Sha384,
            AuthAlgorithm::Sha512 => AuthProtocol::Sha512,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrivacyAlgorithm {
    Des,
    Aes128,
    Aes192,
    Aes256,
}

impl PrivacyAlgorithm {
    pub fn to_snmp(self) -> Cipher {
        match self {
            PrivacyAlgorithm::Des => Cipher::Des,
            PrivacyAlgorithm::Aes128 => Cipher::Aes128,
            PrivacyAlgorithm::Aes192 => Cipher::Aes192,
            PrivacyAlgorithm::Aes256 => Cipher::Aes256,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    pub version: SnmpVersion,
    /// SNMPv3 principal
    pub username: String,
    /// Secret holding the SNMPv3 password (used for both auth and privacy keys)
    pub secret_id: String,
    pub auth_protocol: AuthAlgorithm,
    pub privacy_protocol: PrivacyAlgorithm,
    /// SNMPv2c community
    pub community: String,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            version: SnmpVersion::V3,
            username: "snmpmonitor".to_string(),
            secret_id: "snmp/password".to_string(),
            auth_protocol: AuthAlgorithm::Sha1,
            privacy_protocol: PrivacyAlgorithm::Aes128,
            community: "public".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectorySettings {
    /// YAML host inventory
    pub inventory: String,
    /// Only hosts carrying this tag key are polled
    pub tag_key: String,
}

impl Default for DirectorySettings {
    fn default() -> Self {
        Self {
            inventory: "./config/inventory.yaml".to_string(),
            tag_key: "Role".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkKind {
    #[default]
    Log,
    JsonLines,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SinkSettings {
    pub kind: SinkKind,
    /// Output file for `json_lines`
    pub path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub listen: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            listen: "0.0.0.0:8080".to_string(),
        }
    }
}
