//! Domain data structures for addresses, pickup records, and schedule snapshots.

use std::collections::HashMap;
use std::fmt;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Opaque free-text address a schedule source resolves pickups for.
///
/// Owned by the provider instance and never mutated after configuration.
pub struct AddressQuery(String);

impl AddressQuery {
    /// Construct a query from user input, trimming surrounding whitespace.
    #[must_use]
    pub fn new<S: Into<String>>(address: S) -> Self {
        Self(address.into().trim().to_owned())
    }

    /// Check whether the query carries any usable text.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The raw query string as passed to the upstream API.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AddressQuery {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Waste category key, unique within one schedule snapshot.
///
/// Carries the upstream title verbatim (e.g. "Hushållsavfall").
pub struct WasteType(pub String);

impl fmt::Display for WasteType {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// One waste type's next scheduled collection.
pub struct PickupRecord {
    /// Waste category this record belongs to.
    pub waste_type: WasteType,
    /// Date of the next pickup.
    pub pickup_date: NaiveDate,
    /// Weekday of the pickup date, fixed at parse time.
    pub weekday: Weekday,
    /// Bin volume as reported upstream.
    pub bin_size: Option<f64>,
    /// Unit for the bin volume (typically liters).
    pub bin_size_unit: Option<String>,
    /// Human-readable pickup frequency note from the provider.
    pub frequency: Option<String>,
}

impl PickupRecord {
    /// Build a record, deriving the weekday from the pickup date.
    #[must_use]
    pub fn new(waste_type: WasteType, pickup_date: NaiveDate) -> Self {
        Self {
            waste_type,
            pickup_date,
            weekday: pickup_date.weekday(),
            bin_size: None,
            bin_size_unit: None,
            frequency: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
/// One full schedule fetch: a mapping from waste type to its next pickup.
pub struct ScheduleSnapshot {
    records: HashMap<WasteType, PickupRecord>,
}

impl ScheduleSnapshot {
    /// Build a snapshot from parsed records.
    ///
    /// Waste-type uniqueness is an invariant of the snapshot; should the
    /// upstream response repeat a title, the earliest pickup date wins since
    /// that is the next collection.
    #[must_use]
    pub fn from_records<I: IntoIterator<Item = PickupRecord>>(records: I) -> Self {
        let mut map: HashMap<WasteType, PickupRecord> = HashMap::new();
        for record in records {
            match map.get(&record.waste_type) {
                Some(existing) if existing.pickup_date <= record.pickup_date => {}
                _ => {
                    map.insert(record.waste_type.clone(), record);
                }
            }
        }
        Self { records: map }
    }

    /// Look up the record for a waste type.
    #[must_use]
    pub fn get(&self, waste_type: &WasteType) -> Option<&PickupRecord> {
        self.records.get(waste_type)
    }

    /// Iterate over all records in the snapshot.
    pub fn records(&self) -> impl Iterator<Item = &PickupRecord> {
        self.records.values()
    }

    /// Number of waste types in the snapshot.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the snapshot holds no records at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Metadata describing a schedule source backend.
pub struct SourceMeta {
    /// Stable identifier (slug) for the source.
    pub id: String,
    /// Human-friendly display name.
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid test date")
    }

    #[test]
    fn address_query_trims_input() {
        let query = AddressQuery::new("  Storgatan 1  ");
        assert_eq!(query.as_str(), "Storgatan 1");
        assert!(!query.is_empty());
        assert!(AddressQuery::new("   ").is_empty());
    }

    #[test]
    fn record_derives_weekday() {
        let record = PickupRecord::new(WasteType("Matavfall".into()), date(2024, 6, 10));
        assert_eq!(record.weekday, Weekday::Mon);
    }

    #[test]
    fn snapshot_keeps_earliest_date_per_waste_type() {
        let later = PickupRecord::new(WasteType("Hushållsavfall".into()), date(2024, 6, 24));
        let earlier = PickupRecord::new(WasteType("Hushållsavfall".into()), date(2024, 6, 10));
        let snapshot = ScheduleSnapshot::from_records(vec![later, earlier]);

        assert_eq!(snapshot.len(), 1);
        let record = snapshot
            .get(&WasteType("Hushållsavfall".into()))
            .expect("record present");
        assert_eq!(record.pickup_date, date(2024, 6, 10));
    }
}
