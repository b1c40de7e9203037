use std::collections::{BTreeMap, HashMap};

use crate::snmp::{ObjectId, RawValue, StorageColumn, WalkResult};

/// One hrStorageEntry with every column needed for volume metrics.
#[derive(Debug, Clone, PartialEq)]
pub struct StorageRow {
    pub index: ObjectId,
    pub descr: RawValue,
    pub allocation_units: RawValue,
    pub size: RawValue,
    pub used: RawValue,
}

#[derive(Debug, Default)]
struct StorageRowBuilder {
    descr: Option<RawValue>,
    allocation_units: Option<RawValue>,
    size: Option<RawValue>,
    used: Option<RawValue>,
}

impl StorageRowBuilder {
    fn set(&mut self, column: StorageColumn, value: RawValue) {
        let slot = match column {
            StorageColumn::Descr => &mut self.descr,
            StorageColumn::AllocationUnits => &mut self.allocation_units,
            StorageColumn::Size => &mut self.size,
            StorageColumn::Used => &mut self.used,
        };
        *slot = Some(value);
    }

    /// Names of the columns that never arrived.
    fn missing(&self) -> Vec<&'static str> {
        let slots = [
            (StorageColumn::Descr, &self.descr),
            (StorageColumn::AllocationUnits, &self.allocation_units),
            (StorageColumn::Size, &self.size),
            (StorageColumn::Used, &self.used),
        ];
        slots
            .into_iter()
            .filter(|(_, slot)| slot.is_none())
            .map(|(column, _)| column.name())
            .collect()
    }

    /// `None` unless every column arrived.
    fn build(self, index: ObjectId) -> Option<StorageRow> {
        Some(StorageRow {
            index,
            descr: self.descr?,
            allocation_units: self.allocation_units?,
            size: self.size?,
            used: self.used?,
        })
    }
}

/// Rebuilds table rows from column-oriented walk results.
pub struct TableCollector;

impl TableCollector {
    /// Splits a whole-table walk into one walk result per known column.
    /// Columns that are not needed (hrStorageType, ...) are dropped.
    pub fn split_columns(walk: &WalkResult) -> HashMap<StorageColumn, WalkResult> {
        let mut columns: HashMap<StorageColumn, Vec<(ObjectId, RawValue)>> = HashMap::new();

        for (oid, value) in walk.iter() {
            if let Some(column) = StorageColumn::of(oid) {
                columns
                    .entry(column)
                    .or_default()
                    .push((oid.clone(), value.clone()));
            }
        }

        columns
            .into_iter()
            .map(|(column, bindings)| (column, WalkResult::from_iter(bindings)))
            .collect()
    }

    /// Joins columns on their row index (the identifier suffix after the
    /// column prefix, kept verbatim). Rows missing any column are dropped.
    pub fn correlate(columns: &HashMap<StorageColumn, WalkResult>) -> BTreeMap<ObjectId, StorageRow> {
        let mut builders: BTreeMap<ObjectId, StorageRowBuilder> = BTreeMap::new();

        for (&column, walk) in columns {
            let prefix = column.oid();
            for (oid, value) in walk.iter() {
                if let Some(index) = oid.suffix_after(&prefix) {
                    builders.entry(index).or_default().set(column, value.clone());
                }
            }
        }

        let mut rows = BTreeMap::new();
        for (index, builder) in builders {
            let missing = builder.missing();
            match builder.build(index.clone()) {
                Some(row) => {
                    rows.insert(index, row);
                }
                None => tracing::debug!(index = %index, missing = ?missing, "dropping storage row with missing columns"),
            }
        }
        rows
    }

    /// Correlated rows straight from a storage subtree walk.
    pub fn storage_rows(walk: &WalkResult) -> BTreeMap<ObjectId, StorageRow> {
        Self::correlate(&Self::split_columns(walk))
    }
}
