use async_trait::async_trait;
use std::env;

use super::SecretProvider;
use crate::error::{CollectorError, Result};

/// Resolves secrets from environment variables.
///
/// The secret id is upper-cased and every non-alphanumeric character becomes
/// `_`, so `snmp/password` is read from `SNMP_PASSWORD`.
#[derive(Debug, Default)]
pub struct EnvSecretProvider;

impl EnvSecretProvider {
    pub fn variable_name(secret_id: &str) -> String {
        secret_id
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
            .collect()
    }
}

#[async_trait]
impl SecretProvider for EnvSecretProvider {
    async fn get_secret(&self, secret_id: &str) -> Result<String> {
        let name = Self::variable_name(secret_id);
        match env::var(&name) {
            Ok(value) if !value.is_empty() => Ok(value),
            Ok(_) => Err(CollectorError::SecretUnavailable(format!(
                "secret '{}' ({}) is empty",
                secret_id, name
            ))),
            Err(e) => Err(CollectorError::SecretUnavailable(format!(
                "secret '{}' ({}): {}",
                secret_id, name, e
            ))),
        }
    }
}
