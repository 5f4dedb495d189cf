use std::sync::Arc;

use chrono::{DateTime, Local, NaiveDate, Utc};
use sopkoll_core::provider::{ScheduleProvider, SensorReading};

pub(crate) struct App {
    pub provider: Arc<ScheduleProvider>,

    pub readings: Vec<SensorReading>,
    pub fetched_at: Option<DateTime<Utc>>,
    /// Readings come from an older snapshot because the last refresh failed.
    pub stale: bool,

    pub is_loading: bool,
    pub error_message: Option<String>,
}

impl App {
    pub(crate) fn new(provider: Arc<ScheduleProvider>) -> Self {
        Self {
            provider,
            readings: Vec::new(),
            fetched_at: None,
            stale: false,
            is_loading: false,
            error_message: None,
        }
    }

    pub(crate) fn today() -> NaiveDate {
        Local::now().date_naive()
    }

    /// Run one update through the provider's cache gate.
    pub(crate) async fn tick(&mut self) {
        let result = self.provider.tick(Utc::now(), Self::today()).await;
        self.apply(result).await;
    }

    /// Force a fetch regardless of cache freshness.
    pub(crate) async fn force_refresh(&mut self) {
        let result = self.provider.refresh(Utc::now(), Self::today()).await;
        self.apply(result).await;
    }

    async fn apply(&mut self, result: Result<Vec<SensorReading>, sopkoll_core::FetchError>) {
        match result {
            Ok(readings) => {
                self.readings = readings;
                self.fetched_at = self.provider.fetched_at().await;
                self.stale = false;
                self.error_message = None;
            }
            Err(error) => {
                self.error_message = Some(format!("Update failed: {error}"));
                // Keep showing the last good snapshot if one exists.
                if let Some(readings) = self.provider.last_known(Self::today()).await {
                    self.readings = readings;
                    self.stale = true;
                }
            }
        }
    }
}
