use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;

use super::DirectoryService;
use crate::collector::types::Target;
use crate::error::{CollectorError, Result};

/// Tag holding the human readable host name.
const NAME_TAG: &str = "Name";

#[derive(Debug, Deserialize)]
struct Inventory {
    #[serde(default)]
    hosts: Vec<InventoryHost>,
}

#[derive(Debug, Deserialize)]
struct InventoryHost {
    id: String,
    address: String,
    #[serde(default)]
    tags: HashMap<String, String>,
}

/// Host directory backed by a YAML inventory file, re-read on every call.
///
/// ```yaml
/// hosts:
///   - id: i-044d0e2df33fb6a08
///     address: 10.0.1.15
///     tags: { Name: app-01, Role: app }
/// ```
#[derive(Debug, Clone)]
pub struct InventoryDirectory {
    path: PathBuf,
}

impl InventoryDirectory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn parse(content: &str, tag_key: &str) -> Result<Vec<Target>> {
        let inventory: Inventory = serde_yml::from_str(content)
            .map_err(|e| CollectorError::DirectoryUnavailable(format!("invalid inventory: {}", e)))?;

        Ok(inventory
            .hosts
            .into_iter()
            .filter(|host| host.tags.contains_key(tag_key))
            .map(|host| Target {
                display_name: host
                    .tags
                    .get(NAME_TAG)
                    .cloned()
                    .unwrap_or_else(|| host.id.clone()),
                id: host.id,
                address: host.address,
            })
            .collect())
    }
}

#[async_trait]
impl DirectoryService for InventoryDirectory {
    async fn list_targets(&self, tag_key: &str) -> Result<Vec<Target>> {
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            CollectorError::DirectoryUnavailable(format!("{}: {}", self.path.display(), e))
        })?;
        Self::parse(&content, tag_key)
    }
}
