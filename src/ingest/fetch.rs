/// The fetch primitive shared by every source.
///
/// One blocking GET, a status check, then a `ResponseParser` turns the body
/// into a reading. No retries and no caching: two calls against an unchanged
/// upstream document return the same reading.

use crate::ingest::{arcgis, vizallas};
use crate::model::{FetchError, StationQuery, WaterLevelReading};
use std::time::Duration;
use tracing::debug;

const USER_AGENT: &str = concat!("lakelevel_service/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// Response parsers
// ---------------------------------------------------------------------------

/// How a response body is turned into a reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseParser {
    /// Last element of the `Vizallas` array on a vizugy.hu station page.
    EmbeddedArray,
    /// First feature of a server-filtered geoportal query.
    SingleStation,
    /// First feature named like `StationQuery::station_name`.
    MultiStation,
}

impl ResponseParser {
    pub fn parse(&self, body: &str, query: &StationQuery) -> Result<WaterLevelReading, FetchError> {
        match self {
            ResponseParser::EmbeddedArray => vizallas::parse_station_page(body),
            ResponseParser::SingleStation => arcgis::parse_single_station(body),
            ResponseParser::MultiStation => {
                let place = query
                    .station_name
                    .as_deref()
                    .ok_or_else(|| FetchError::parse("multi-station query has no station name"))?;
                arcgis::parse_multi_station(body, place)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Fetcher
// ---------------------------------------------------------------------------

/// Blocking HTTP client wrapper. Cheap to share between threads.
#[derive(Debug, Clone)]
pub struct WaterLevelFetcher {
    client: reqwest::blocking::Client,
}

impl WaterLevelFetcher {
    /// Builds a client with the given request timeout.
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::blocking::Client) -> Self {
        Self { client }
    }

    /// Sends the query and returns the body of a 2xx response.
    ///
    /// # Errors
    /// - `FetchError::HttpStatus` for any non-2xx status; the body is not read.
    /// - `FetchError::Request` when sending or reading the body fails.
    pub fn fetch_body(&self, query: &StationQuery) -> Result<String, FetchError> {
        let url = query.url();
        debug!(%url, "fetching water level");

        let response = self.client.get(&url).send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                status_code: status.as_u16(),
            });
        }

        Ok(response.text()?)
    }

    /// Performs one fetch and extracts the reading with `parser`.
    pub fn fetch(
        &self,
        query: &StationQuery,
        parser: ResponseParser,
    ) -> Result<WaterLevelReading, FetchError> {
        let body = self.fetch_body(query)?;
        parser.parse(&body, query)
    }

    /// Lists every station returned by a geoportal query, in upstream order.
    pub fn list_stations(
        &self,
        query: &StationQuery,
    ) -> Result<Vec<(String, WaterLevelReading)>, FetchError> {
        let body = self.fetch_body(query)?;
        arcgis::list_stations(&body)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
