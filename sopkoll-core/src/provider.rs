//! Per-address provider facade combining cache gate and calculator.

use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::cache::CacheGate;
use crate::derive::{DerivedAttributes, WeekConvention, derive};
use crate::model::{AddressQuery, PickupRecord, ScheduleSnapshot};
use crate::ports::{FetchError, ScheduleSource};

#[derive(Debug, Clone)]
/// Configuration handed in by the host layer: an already-validated address
/// plus display options.
pub struct ProviderConfig {
    /// Address the provider resolves pickups for.
    pub address: AddressQuery,
    /// Optional display name; defaults to the address text.
    pub display_name: Option<String>,
    /// How long a fetched snapshot stays fresh.
    pub freshness: Duration,
    /// Week-boundary convention for derived attributes.
    pub convention: WeekConvention,
}

#[derive(Debug, Clone, PartialEq)]
/// Sensor-ready view of one waste type: the pickup record plus its derived
/// attributes at read time. This is the entire surface the entity layer
/// consumes.
pub struct SensorReading {
    /// The underlying pickup record.
    pub record: PickupRecord,
    /// Attributes computed against the caller's "today".
    pub derived: DerivedAttributes,
}

/// One configured address with its own isolated cache gate.
///
/// Holds no timer of its own; the host invokes [`tick`](Self::tick) on its
/// schedule, which keeps the provider deterministic and testable.
pub struct ScheduleProvider {
    name: String,
    convention: WeekConvention,
    gate: CacheGate,
}

impl ScheduleProvider {
    /// Wire a provider instance to a schedule source.
    #[must_use]
    pub fn new(source: Arc<dyn ScheduleSource>, config: ProviderConfig) -> Self {
        let name = config
            .display_name
            .unwrap_or_else(|| config.address.to_string());
        Self {
            name,
            convention: config.convention,
            gate: CacheGate::new(source, config.address, config.freshness),
        }
    }

    /// Display name for this provider instance.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Address this provider is configured for.
    #[must_use]
    pub fn address(&self) -> &AddressQuery {
        self.gate.address()
    }

    /// Externally driven update entry point.
    ///
    /// Goes through the cache gate (fetching only when stale) and maps every
    /// record in the snapshot to a [`SensorReading`] against `today`.
    ///
    /// # Errors
    ///
    /// Propagates [`FetchError`] when a refresh was needed and failed; any
    /// stale snapshot remains available via [`last_known`](Self::last_known).
    pub async fn tick(
        &self,
        now: DateTime<Utc>,
        today: NaiveDate,
    ) -> Result<Vec<SensorReading>, FetchError> {
        let snapshot = self.gate.get_schedule(now).await?;
        Ok(self.readings_from(&snapshot, today))
    }

    /// Force a fetch regardless of cache freshness.
    ///
    /// # Errors
    ///
    /// Propagates [`FetchError`] on fetch failure, leaving the cache intact.
    pub async fn refresh(
        &self,
        now: DateTime<Utc>,
        today: NaiveDate,
    ) -> Result<Vec<SensorReading>, FetchError> {
        let snapshot = self.gate.refresh(now).await?;
        Ok(self.readings_from(&snapshot, today))
    }

    /// Readings from the last successful fetch, however stale. Fallback for
    /// callers that want to keep showing data after a failed tick.
    pub async fn last_known(&self, today: NaiveDate) -> Option<Vec<SensorReading>> {
        let snapshot = self.gate.last_known().await?;
        Some(self.readings_from(&snapshot, today))
    }

    /// Timestamp of the last successful fetch.
    pub async fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.gate.fetched_at().await
    }

    fn readings_from(&self, snapshot: &ScheduleSnapshot, today: NaiveDate) -> Vec<SensorReading> {
        let mut readings: Vec<SensorReading> = snapshot
            .records()
            .map(|record| SensorReading {
                record: record.clone(),
                derived: derive(record, today, self.convention),
            })
            .collect();
        readings.sort_by(|left, right| {
            left.record
                .pickup_date
                .cmp(&right.record.pickup_date)
                .then_with(|| left.record.waste_type.0.cmp(&right.record.waste_type.0))
        });
        readings
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::model::{SourceMeta, WasteType};

    struct StaticSource {
        meta: SourceMeta,
        fetch_count: AtomicUsize,
        records: Vec<PickupRecord>,
    }

    impl StaticSource {
        fn new(records: Vec<PickupRecord>) -> Self {
            Self {
                meta: SourceMeta {
                    id: "static".to_owned(),
                    name: "Static".to_owned(),
                },
                fetch_count: AtomicUsize::new(0),
                records,
            }
        }
    }

    #[async_trait]
    impl ScheduleSource for StaticSource {
        fn meta(&self) -> &SourceMeta {
            &self.meta
        }

        async fn fetch(&self, _address: &AddressQuery) -> Result<ScheduleSnapshot, FetchError> {
            self.fetch_count.fetch_add(1, Ordering::SeqCst);
            if self.records.is_empty() {
                return Err(FetchError::EmptySchedule);
            }
            Ok(ScheduleSnapshot::from_records(self.records.clone()))
        }
    }

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid test date")
    }

    fn provider(records: Vec<PickupRecord>) -> (Arc<StaticSource>, ScheduleProvider) {
        let source = Arc::new(StaticSource::new(records));
        let config = ProviderConfig {
            address: AddressQuery::new("Storgatan 1"),
            display_name: Some("Home".to_owned()),
            freshness: Duration::hours(12),
            convention: WeekConvention::default(),
        };
        let provider =
            ScheduleProvider::new(Arc::clone(&source) as Arc<dyn ScheduleSource>, config);
        (source, provider)
    }

    #[tokio::test]
    async fn tick_yields_sorted_readings_with_derived_attributes() {
        let records = vec![
            PickupRecord::new(WasteType("Trädgårdsavfall".into()), date(2024, 6, 14)),
            PickupRecord::new(WasteType("Hushållsavfall".into()), date(2024, 6, 10)),
        ];
        let (_source, provider) = provider(records);

        let now = date(2024, 6, 9).and_hms_opt(8, 0, 0).expect("time").and_utc();
        let readings = provider.tick(now, date(2024, 6, 9)).await.expect("tick");

        assert_eq!(readings.len(), 2);
        let first = readings.first().expect("first reading");
        assert_eq!(first.record.waste_type, WasteType("Hushållsavfall".into()));
        assert!(first.derived.is_tomorrow);
        assert_eq!(first.derived.pickup_weekday, "Monday");
    }

    #[tokio::test]
    async fn repeated_ticks_within_freshness_fetch_once() {
        let records = vec![PickupRecord::new(
            WasteType("Matavfall".into()),
            date(2024, 6, 12),
        )];
        let (source, provider) = provider(records);

        let morning = date(2024, 6, 9).and_hms_opt(6, 0, 0).expect("time").and_utc();
        let noon = date(2024, 6, 9).and_hms_opt(12, 0, 0).expect("time").and_utc();
        provider.tick(morning, date(2024, 6, 9)).await.expect("tick");
        provider.tick(noon, date(2024, 6, 9)).await.expect("tick");

        assert_eq!(source.fetch_count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_first_tick_has_no_fallback_readings() {
        let (_source, provider) = provider(Vec::new());
        let now = date(2024, 6, 9).and_hms_opt(8, 0, 0).expect("time").and_utc();

        assert!(provider.tick(now, date(2024, 6, 9)).await.is_err());
        assert!(provider.last_known(date(2024, 6, 9)).await.is_none());
        assert_eq!(provider.name(), "Home");
    }
}
