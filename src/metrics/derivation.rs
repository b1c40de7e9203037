//! Pure conversions from walked counters to metric records.
//!
//! Memory follows the Net-SNMP convention: used = total - available -
//! buffered - cached. Volume usage comes from hrStorageTable, where sizes are
//! expressed in allocation units.

use std::collections::BTreeMap;

use super::record::{MetricRecord, Unit};
use crate::collector::scalar_collector::ScalarCollector;
use crate::collector::table_collector::StorageRow;
use crate::error::{CollectorError, Result};
use crate::snmp::{ObjectId, RawValue, WalkResult};

pub const MEMORY_NAMESPACE: &str = "SNMP/Memory";
pub const VOLUME_NAMESPACE: &str = "SNMP/Volume";

/// Rounds to two decimal places, ties to even.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// MemoryTotalKB and MemoryUtilisation from a memory subtree walk.
pub fn derive_memory(walk: &WalkResult) -> Result<Vec<MetricRecord>> {
    let counters = ScalarCollector::memory_counters(walk)?;

    if counters.total <= 0 {
        return Err(CollectorError::InvalidMetricInput(format!(
            "memTotalReal is {}, utilisation is undefined",
            counters.total
        )));
    }

    let used = counters
        .total
        .checked_sub(counters.available)
        .and_then(|v| v.checked_sub(counters.buffered))
        .and_then(|v| v.checked_sub(counters.cached))
        .ok_or_else(|| {
            CollectorError::InvalidMetricInput(format!(
                "memory counters overflow: total {}, available {}, buffered {}, cached {}",
                counters.total, counters.available, counters.buffered, counters.cached
            ))
        })?;
    let percent = round2(used as f64 / counters.total as f64 * 100.0);

    Ok(vec![
        MetricRecord::instance(MEMORY_NAMESPACE, "MemoryTotalKB", Unit::Kilobytes, counters.total as f64),
        MetricRecord::instance(MEMORY_NAMESPACE, "MemoryUtilisation", Unit::Percent, percent),
    ])
}

/// Decides which storage entries are durable volumes.
#[derive(Debug, Clone)]
pub struct VolumeFilter {
    pseudo_mounts: Vec<String>,
}

impl VolumeFilter {
    pub fn new(pseudo_mounts: Vec<String>) -> Self {
        Self { pseudo_mounts }
    }

    /// Only absolute mount paths outside `/run` and not in the pseudo-mount list.
    pub fn is_volume(&self, path: &str) -> bool {
        path.starts_with('/')
            && !path.starts_with("/run")
            && !self.pseudo_mounts.iter().any(|m| m == path)
    }
}

/// Records for the volumes that could be computed, errors for those that could not.
#[derive(Debug, Default)]
pub struct DiskDerivation {
    pub records: Vec<MetricRecord>,
    pub errors: Vec<CollectorError>,
}

/// VolumeSize and VolumeUtilisation for every durable volume row.
pub fn derive_disk(rows: &BTreeMap<ObjectId, StorageRow>, filter: &VolumeFilter) -> DiskDerivation {
    let mut derivation = DiskDerivation::default();

    for row in rows.values() {
        let path = row.descr.to_string();
        if !filter.is_volume(&path) {
            tracing::debug!(path = %path, index = %row.index, "skipping pseudo filesystem");
            continue;
        }

        match volume_metrics(row, &path) {
            Ok(records) => derivation.records.extend(records),
            Err(e) => derivation.errors.push(e),
        }
    }

    derivation
}

fn volume_metrics(row: &StorageRow, path: &str) -> Result<[MetricRecord; 2]> {
    let unit = integer(&row.allocation_units, "hrStorageAllocationUnits", row, path)?;
    let size = integer(&row.size, "hrStorageSize", row, path)?;
    let used = integer(&row.used, "hrStorageUsed", row, path)?;

    let total_bytes = size.checked_mul(unit);
    let used_bytes = used.checked_mul(unit);
    let (total_bytes, used_bytes) = match (total_bytes, used_bytes) {
        (Some(t), Some(u)) if t > 0 => (t, u),
        (Some(_), Some(_)) => {
            return Err(CollectorError::InvalidMetricInput(format!(
                "volume {} (row {}): total size is zero",
                path, row.index
            )))
        }
        _ => {
            return Err(CollectorError::InvalidMetricInput(format!(
                "volume {} (row {}): size overflows",
                path, row.index
            )))
        }
    };

    let percent = round2(used_bytes as f64 / total_bytes as f64 * 100.0);
    let size_kb = (total_bytes as f64 / 1024.0).round_ties_even();

    Ok([
        MetricRecord::volume(VOLUME_NAMESPACE, "VolumeSize", Unit::Kilobytes, size_kb, path),
        MetricRecord::volume(VOLUME_NAMESPACE, "VolumeUtilisation", Unit::Percent, percent, path),
    ])
}

fn integer(value: &RawValue, column: &str, row: &StorageRow, path: &str) -> Result<i64> {
    value.as_i64().ok_or_else(|| {
        CollectorError::InvalidMetricInput(format!(
            "volume {} (row {}): {} is not an integer: {}",
            path, row.index, column, value
        ))
    })
}
