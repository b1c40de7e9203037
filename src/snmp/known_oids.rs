use super::oid::ObjectId;

const UCD_MEMORY: [u64; 8] = [1, 3, 6, 1, 4, 1, 2021, 4];
const HR_STORAGE_TABLE: [u64; 9] = [1, 3, 6, 1, 2, 1, 25, 2, 3];
const HR_STORAGE_ENTRY: [u64; 10] = [1, 3, 6, 1, 2, 1, 25, 2, 3, 1];

/// Subtrees walked on every target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subtree {
    /// UCD-SNMP-MIB::memory
    Memory,
    /// HOST-RESOURCES-MIB::hrStorageTable
    Storage,
}

impl Subtree {
    pub fn base(self) -> ObjectId {
        match self {
            Subtree::Memory => ObjectId::from_arcs(&UCD_MEMORY),
            Subtree::Storage => ObjectId::from_arcs(&HR_STORAGE_TABLE),
        }
    }
}

/// Scalar memory counters under [`Subtree::Memory`], all in kilobytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemoryCounter {
    Total,
    Available,
    Buffered,
    Cached,
}

impl MemoryCounter {
    pub const ALL: [MemoryCounter; 4] = [
        MemoryCounter::Total,
        MemoryCounter::Available,
        MemoryCounter::Buffered,
        MemoryCounter::Cached,
    ];

    pub fn oid(self) -> ObjectId {
        let column = match self {
            MemoryCounter::Total => 5,
            MemoryCounter::Available => 6,
            MemoryCounter::Buffered => 14,
            MemoryCounter::Cached => 15,
        };
        ObjectId::from_arcs(&UCD_MEMORY).child(column).child(0)
    }

    pub fn name(self) -> &'static str {
        match self {
            MemoryCounter::Total => "memTotalReal",
            MemoryCounter::Available => "memAvailReal",
            MemoryCounter::Buffered => "memBuffer",
            MemoryCounter::Cached => "memCached",
        }
    }
}

/// Columns of hrStorageEntry needed to compute volume usage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageColumn {
    /// Mount path or description, a string.
    Descr,
    /// Bytes per allocation unit.
    AllocationUnits,
    /// Size in allocation units.
    Size,
    /// Used space in allocation units.
    Used,
}

impl StorageColumn {
    pub const ALL: [StorageColumn; 4] = [
        StorageColumn::Descr,
        StorageColumn::AllocationUnits,
        StorageColumn::Size,
        StorageColumn::Used,
    ];

    /// Column prefix; the row index follows it.
    pub fn oid(self) -> ObjectId {
        let column = match self {
            StorageColumn::Descr => 3,
            StorageColumn::AllocationUnits => 4,
            StorageColumn::Size => 5,
            StorageColumn::Used => 6,
        };
        ObjectId::from_arcs(&HR_STORAGE_ENTRY).child(column)
    }

    pub fn name(self) -> &'static str {
        match self {
            StorageColumn::Descr => "hrStorageDescr",
            StorageColumn::AllocationUnits => "hrStorageAllocationUnits",
            StorageColumn::Size => "hrStorageSize",
            StorageColumn::Used => "hrStorageUsed",
        }
    }

    /// Resolves which column an identifier belongs to, if any.
    pub fn of(oid: &ObjectId) -> Option<StorageColumn> {
        Self::ALL
            .into_iter()
            .find(|column| oid.is_descendant_of(&column.oid()))
    }
}
