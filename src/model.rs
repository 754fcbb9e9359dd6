/// Shared data types for the lake level service.
///
/// `StationQuery` describes one upstream request, `WaterLevelReading` is the
/// single number it produces, and `FetchError` covers every way producing it
/// can fail.

use thiserror::Error;

// ---------------------------------------------------------------------------
// Sensor metadata constants
// ---------------------------------------------------------------------------

/// Unit of every reading produced by this service.
pub const UNIT_CENTIMETERS: &str = "cm";

/// Device class reported for water level sensors.
pub const DEVICE_CLASS_DISTANCE: &str = "distance";

/// State class reported for water level sensors.
pub const STATE_CLASS_MEASUREMENT: &str = "measurement";

// ---------------------------------------------------------------------------
// Query and reading
// ---------------------------------------------------------------------------

/// One upstream request: where to send it and what to ask for.
///
/// `query_params` keeps insertion order so the built URL is deterministic.
/// `station_name` is only consulted by parsers that filter client-side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationQuery {
    pub endpoint: String,
    pub query_params: Vec<(String, String)>,
    pub station_name: Option<String>,
}

impl StationQuery {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            query_params: Vec::new(),
            station_name: None,
        }
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_params.push((key.into(), value.into()));
        self
    }

    pub fn station(mut self, name: impl Into<String>) -> Self {
        self.station_name = Some(name.into());
        self
    }

    /// Full request URL with every query parameter percent-encoded.
    pub fn url(&self) -> String {
        if self.query_params.is_empty() {
            return self.endpoint.clone();
        }

        let query = self
            .query_params
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");

        let separator = if self.endpoint.contains('?') { '&' } else { '?' };
        format!("{}{}{}", self.endpoint, separator, query)
    }
}

/// A water level in centimeters.
///
/// Carries no timestamp; whoever records the reading attaches its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WaterLevelReading(pub i64);

impl WaterLevelReading {
    pub fn centimeters(self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for WaterLevelReading {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.0, UNIT_CENTIMETERS)
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failure of a single fetch. None of these are retried internally.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Upstream answered with a non-2xx status.
    #[error("upstream returned HTTP {status_code}")]
    HttpStatus { status_code: u16 },

    /// The body did not have the expected shape.
    #[error("failed to parse upstream response: {reason}")]
    Parse { reason: String },

    /// The request could not be sent or the body could not be read.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
}

impl FetchError {
    pub fn parse(reason: impl Into<String>) -> Self {
        FetchError::Parse {
            reason: reason.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
