//! Schedule source for the Affärsverken open waste API (Karlskrona, Sweden).

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use sopkoll_core::{
    model::{AddressQuery, PickupRecord, ScheduleSnapshot, SourceMeta, WasteType},
    ports::{FetchError, ScheduleSource},
};

const BASE_URL: &str = "https://kundapi.affarsverken.se/api/v1/open-api";
const PICKUP_DATE_FORMAT: &str = "%Y-%m-%d";

/// Building match from /waste/buildings/search
#[derive(Debug, Deserialize)]
struct BuildingMatch {
    /// Token the calendar endpoint expects as its path segment.
    query: String,
}

/// Response from /waste/buildings/{query}
#[derive(Debug, Deserialize)]
struct BuildingResponse {
    #[serde(default)]
    services: Vec<ServiceEntry>,
}

/// Single subscribed waste service for a building.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServiceEntry {
    title: Option<String>,
    next_pickup: Option<String>,

    #[serde(default)]
    bin_size: Option<f64>,
    #[serde(default)]
    bin_size_unit: Option<String>,
    #[serde(default)]
    pickup_frequency_description: Option<String>,
    // the response carries more fields (container ids, prices) we don't model
}

/// Schedule source backed by the Affärsverken customer API.
///
/// Stateless across fetches: every call resolves the address to a building
/// token and loads that building's services. Request-frequency limiting is
/// the cache gate's job, not this source's.
pub struct AffarsverkenSource {
    client: Client,
    meta: SourceMeta,
}

impl AffarsverkenSource {
    /// Create a source bound to the given HTTP client.
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self {
            client,
            meta: source_meta(),
        }
    }

    async fn resolve_building(&self, address: &AddressQuery) -> Result<String, FetchError> {
        let req = self
            .client
            .get(format!("{BASE_URL}/waste/buildings/search"))
            .query(&[("address", address.as_str())]);

        let matches = fetch_json::<Vec<BuildingMatch>>(req).await?;

        // The search is fuzzy and ordered by relevance; the first hit is the
        // building the user meant.
        matches
            .into_iter()
            .next()
            .map(|building| building.query)
            .ok_or_else(|| FetchError::AddressNotFound(address.to_string()))
    }
}

#[async_trait]
impl ScheduleSource for AffarsverkenSource {
    fn meta(&self) -> &SourceMeta {
        &self.meta
    }

    async fn fetch(&self, address: &AddressQuery) -> Result<ScheduleSnapshot, FetchError> {
        if address.is_empty() {
            return Err(FetchError::EmptyAddress);
        }

        let building_query = self.resolve_building(address).await?;
        debug!(address = %address, building = %building_query, "resolved building token");

        let response = fetch_json::<BuildingResponse>(
            self.client
                .get(format!("{BASE_URL}/waste/buildings/{building_query}")),
        )
        .await?;

        let records = parse_services(response.services);
        if records.is_empty() {
            return Err(FetchError::EmptySchedule);
        }

        Ok(ScheduleSnapshot::from_records(records))
    }
}

fn source_meta() -> SourceMeta {
    SourceMeta {
        id: String::from("affarsverken"),
        name: String::from("Affärsverken"),
    }
}

/// Map upstream service entries to pickup records.
///
/// Entries missing a title or pickup date, or carrying an unparsable date,
/// are dropped with a warning; partial parse failures never fail the fetch.
fn parse_services(services: Vec<ServiceEntry>) -> Vec<PickupRecord> {
    let mut records = Vec::with_capacity(services.len());

    for service in services {
        let Some(title) = service.title.filter(|title| !title.trim().is_empty()) else {
            warn!("service entry without title, skipping");
            continue;
        };

        let Some(raw_date) = service
            .next_pickup
            .filter(|next_pickup| !next_pickup.trim().is_empty())
        else {
            warn!(waste_type = %title, "no next pickup date provided, skipping");
            continue;
        };

        let pickup_date = match NaiveDate::parse_from_str(raw_date.trim(), PICKUP_DATE_FORMAT) {
            Ok(date) => date,
            Err(error) => {
                warn!(waste_type = %title, raw = %raw_date, %error, "unparsable pickup date, skipping");
                continue;
            }
        };

        let mut record = PickupRecord::new(WasteType(title), pickup_date);
        record.bin_size = service.bin_size;
        record.bin_size_unit = service.bin_size_unit;
        record.frequency = service.pickup_frequency_description;
        records.push(record);
    }

    records
}

// Small helper to fetch and decode JSON with status handling.
async fn fetch_json<T: DeserializeOwned>(req: RequestBuilder) -> Result<T, FetchError> {
    req.send()
        .await
        .map_err(FetchError::from)?
        .error_for_status()
        .map_err(FetchError::from)?
        .json()
        .await
        .map_err(FetchError::from)
}
