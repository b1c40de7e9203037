use crate::error::{CollectorError, Result};
use crate::snmp::{MemoryCounter, WalkResult};

/// Memory counters in kilobytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryCounters {
    pub total: i64,
    pub available: i64,
    pub buffered: i64,
    pub cached: i64,
}

/// Picks scalar values out of a subtree walk.
pub struct ScalarCollector;

impl ScalarCollector {
    /// Reads the four memory counters from a memory subtree walk.
    pub fn memory_counters(walk: &WalkResult) -> Result<MemoryCounters> {
        Ok(MemoryCounters {
            total: Self::counter(walk, MemoryCounter::Total)?,
            available: Self::counter(walk, MemoryCounter::Available)?,
            buffered: Self::counter(walk, MemoryCounter::Buffered)?,
            cached: Self::counter(walk, MemoryCounter::Cached)?,
        })
    }

    fn counter(walk: &WalkResult, counter: MemoryCounter) -> Result<i64> {
        let oid = counter.oid();
        let value = walk.get(&oid).ok_or_else(|| {
            CollectorError::InvalidMetricInput(format!("{} ({}) missing from walk", counter.name(), oid))
        })?;

        value.as_i64().ok_or_else(|| {
            CollectorError::InvalidMetricInput(format!("{} is not an integer: {}", counter.name(), value))
        })
    }
}
