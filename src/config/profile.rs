use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::snmp::{parse_oid, ObjectId, Subtree};

/// What to walk on each host and which mounts are not real volumes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub name: String,
    /// Root of the memory counters walk
    pub memory_oid: String,
    /// Root of the storage table walk
    pub storage_oid: String,
    /// Mount points reported by the agent that are virtual filesystems
    pub pseudo_mounts: Vec<String>,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            name: "net-snmp-linux".to_string(),
            memory_oid: Subtree::Memory.base().to_string(),
            storage_oid: Subtree::Storage.base().to_string(),
            pseudo_mounts: vec![
                "/sys/fs/cgroup".to_string(),
                "/dev/shm".to_string(),
                "/dev".to_string(),
                "/mnt/menus_tmp".to_string(),
            ],
        }
    }
}

impl Profile {
    pub fn memory_base(&self) -> Result<ObjectId> {
        parse_oid(&self.memory_oid).context(format!("profile '{}': memory_oid", self.name))
    }

    pub fn storage_base(&self) -> Result<ObjectId> {
        parse_oid(&self.storage_oid).context(format!("profile '{}': storage_oid", self.name))
    }

    pub fn validate(&self) -> Result<()> {
        self.memory_base()?;
        self.storage_base()?;
        Ok(())
    }
}
