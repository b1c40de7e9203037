use async_trait::async_trait;
use snmp2::{AsyncSession, Pdu, Value};
use std::fmt;

pub mod clients_enum;
pub mod known_oids;
pub mod oid;
pub mod v2c;
pub mod v3;
pub mod walker;

pub use clients_enum::SnmpClient;
pub use known_oids::{MemoryCounter, StorageColumn, Subtree};
pub use oid::{parse_oid, ObjectId};
pub use v2c::SnmpClientV2c;
pub use v3::SnmpClientV3;
pub use walker::{walk, Agent, NextBinding, RawValue, WalkResult};

use crate::config::{AuthAlgorithm, PrivacyAlgorithm, SnmpVersion};
use crate::error::{CollectorError, Result};

/// Principal and password shared by every target of a pass.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Opens an [`Agent`] session for one target address.
#[async_trait]
pub trait AgentConnector: Send + Sync {
    async fn connect(&self, address: &str, credentials: &Credentials) -> Result<Box<dyn Agent>>;
}

/// Connector backed by real `snmp2` UDP sessions.
pub struct SnmpConnector {
    pub version: SnmpVersion,
    pub port: u16,
    pub auth_protocol: AuthAlgorithm,
    pub privacy_protocol: PrivacyAlgorithm,
    pub community: String,
}

#[async_trait]
impl AgentConnector for SnmpConnector {
    async fn connect(&self, address: &str, credentials: &Credentials) -> Result<Box<dyn Agent>> {
        let target = socket_target(address, self.port);
        let client = match self.version {
            SnmpVersion::V3 => create_v3_client_auth_priv(
                &target,
                credentials.username.as_bytes(),
                credentials.password.as_bytes(),
                self.auth_protocol,
                self.privacy_protocol,
                credentials.password.as_bytes(),
            )
            .await,
            SnmpVersion::V2c => create_v2c_client(&target, self.community.as_bytes()).await,
        }
        .map_err(|e| CollectorError::TransportFailure(format!("{:#}", e)))?;

        Ok(Box::new(client))
    }
}

pub async fn create_v2c_client(target: &str, community: &[u8]) -> anyhow::Result<SnmpClient> {
    let client = SnmpClientV2c::new(target, community).await?;
    Ok(SnmpClient::V2c(client))
}

pub async fn create_v3_client_auth_priv(
    target: &str,
    username: &[u8],
    auth_password: &[u8],
    auth_protocol: AuthAlgorithm,
    cipher: PrivacyAlgorithm,
    privacy_password: &[u8],
) -> anyhow::Result<SnmpClient> {
    let client = SnmpClientV3::new_auth_priv(
        target,
        username,
        auth_password,
        auth_protocol.to_snmp(),
        cipher.to_snmp(),
        privacy_password,
    )
    .await?;
    Ok(SnmpClient::V3(client))
}

#[async_trait]
impl Agent for SnmpClient {
    async fn get_next(&mut self, oid: &ObjectId) -> Result<NextBinding> {
        match self {
            SnmpClient::V2c(client) => session_get_next(&mut client.session, oid).await,
            SnmpClient::V3(client) => session_get_next(&mut client.session, oid).await,
        }
    }
}

async fn session_get_next(session: &mut AsyncSession, oid: &ObjectId) -> Result<NextBinding> {
    let request = oid.to_snmp().map_err(|e| CollectorError::ProtocolFailure {
        status: format!("badRequest ({})", e),
        oid: oid.to_string(),
    })?;

    // The first v3 request after a time-window change only refreshes the
    // engine parameters and has to be sent again.
    for attempt in 0..2 {
        match session.getnext(&request).await {
            Ok(pdu) => return decode_next(pdu),
            Err(snmp2::Error::AuthUpdated) if attempt == 0 => continue,
            Err(e) => return Err(CollectorError::TransportFailure(e.to_string())),
        }
    }

    Err(CollectorError::TransportFailure(
        "security parameters kept changing".to_string(),
    ))
}

fn decode_next(pdu: Pdu<'_>) -> Result<NextBinding> {
    let error_status = pdu.error_status as u32;
    let error_index = pdu.error_index as usize;
    let varbinds: Vec<(snmp2::Oid<'_>, Value<'_>)> = pdu.varbinds.collect();

    if error_status != 0 {
        let names: Vec<String> = varbinds.iter().map(|(oid, _)| oid.to_string()).collect();
        return Err(protocol_failure(error_status, error_index, &names));
    }

    let Some((name, value)) = varbinds.into_iter().next() else {
        return Err(CollectorError::TransportFailure(
            "SNMP response carried no bindings".to_string(),
        ));
    };

    let raw = match value {
        Value::EndOfMibView | Value::NoSuchObject | Value::NoSuchInstance => {
            return Ok(NextBinding::EndOfView)
        }
        Value::Integer(v) => RawValue::Integer(v),
        Value::Counter32(v) | Value::Unsigned32(v) | Value::Timeticks(v) => {
            RawValue::Unsigned(u64::from(v))
        }
        Value::Counter64(v) => RawValue::Unsigned(v),
        Value::OctetString(bytes) => RawValue::Text(String::from_utf8_lossy(bytes).into_owned()),
        other => RawValue::Text(format!("{:?}", other)),
    };

    let oid = parse_oid(&name.to_string())
        .map_err(|e| CollectorError::TransportFailure(format!("undecodable OID: {}", e)))?;

    Ok(NextBinding::Binding(oid, raw))
}

fn protocol_failure(error_status: u32, error_index: usize, names: &[String]) -> CollectorError {
    CollectorError::ProtocolFailure {
        status: status_name(error_status).to_string(),
        oid: offending_oid(error_index, names),
    }
}

/// Identifier named by a 1-based error index, `?` when it does not resolve.
fn offending_oid(error_index: usize, names: &[String]) -> String {
    error_index
        .checked_sub(1)
        .and_then(|i| names.get(i))
        .cloned()
        .unwrap_or_else(|| "?".to_string())
}

/// RFC 3416 error-status names.
pub fn status_name(status: u32) -> &'static str {
    match status {
        0 => "noError",
        1 => "tooBig",
        2 => "noSuchName",
        3 => "badValue",
        4 => "readOnly",
        5 => "genErr",
        6 => "noAccess",
        7 => "wrongType",
        8 => "wrongLength",
        9 => "wrongEncoding",
        10 => "wrongValue",
        11 => "noCreation",
        12 => "inconsistentValue",
        13 => "resourceUnavailable",
        14 => "commitFailed",
        15 => "undoFailed",
        16 => "authorizationError",
        17 => "notWritable",
        18 => "inconsistentName",
        _ => "unknownError",
    }
}

/// `host:port`, bracketing bare IPv6 literals.
pub fn socket_target(address: &str, port: u16) -> String {
    if address.contains(':') && !address.starts_with('[') {
        format!("[{}]:{}", address, port)
    } else {
        format!("{}:{}", address, port)
    }
}
