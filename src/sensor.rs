/// Water level sensor entity.
///
/// Wraps one configured place and source with the metadata a smart-home
/// host expects (unique id, display name, unit, device/state class) and a
/// throttled `update` that drives the fetch.

use crate::ingest::fetch::WaterLevelFetcher;
use crate::ingest::source::Source;
use crate::model::{
    DEVICE_CLASS_DISTANCE, FetchError, STATE_CLASS_MEASUREMENT, StationQuery, UNIT_CENTIMETERS,
    WaterLevelReading,
};
use crate::throttle::Throttle;
use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};

/// Display name used when the configuration does not set one.
pub const DEFAULT_NAME: &str = "Balaton átlag";

/// Default minimum interval between two fetches for the same sensor.
pub const DEFAULT_THROTTLE_MINUTES: i64 = 5;

#[derive(Debug)]
pub struct WaterLevelSensor {
    place: String,
    source: Source,
    query: StationQuery,
    throttle: Throttle,
    native_value: Option<i64>,
    available: bool,
}

impl WaterLevelSensor {
    pub fn new(place: impl Into<String>, source: Source) -> Self {
        Self::with_throttle(place, source, Duration::minutes(DEFAULT_THROTTLE_MINUTES))
    }

    pub fn with_throttle(place: impl Into<String>, source: Source, min_interval: Duration) -> Self {
        let place = place.into();
        let query = source.query(&place);
        Self {
            place,
            source,
            query,
            throttle: Throttle::new(min_interval),
            native_value: None,
            available: false,
        }
    }

    pub fn place(&self) -> &str {
        &self.place
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    pub fn query(&self) -> &StationQuery {
        &self.query
    }

    pub fn unique_id(&self) -> String {
        format!("{}WaterLevel", self.place)
    }

    pub fn name(&self) -> String {
        format!("{} water level", self.place)
    }

    pub fn device_class(&self) -> &'static str {
        DEVICE_CLASS_DISTANCE
    }

    pub fn unit_of_measurement(&self) -> &'static str {
        UNIT_CENTIMETERS
    }

    pub fn state_class(&self) -> &'static str {
        STATE_CLASS_MEASUREMENT
    }

    /// Last successfully fetched level. Survives later failures.
    pub fn native_value(&self) -> Option<i64> {
        self.native_value
    }

    /// False until the first success and after any failed update.
    pub fn available(&self) -> bool {
        self.available
    }

    pub fn next_update_allowed(&self) -> Option<DateTime<Utc>> {
        self.throttle.next_allowed()
    }

    pub fn update(
        &mut self,
        fetcher: &WaterLevelFetcher,
    ) -> Result<Option<WaterLevelReading>, FetchError> {
        self.update_at(fetcher, Utc::now())
    }

    /// Fetches a new reading unless the throttle is closed at `now`.
    ///
    /// Returns `Ok(None)` when throttled; no request is made and the current
    /// value is untouched. On failure the value is kept but the sensor is
    /// marked unavailable.
    pub fn update_at(
        &mut self,
        fetcher: &WaterLevelFetcher,
        now: DateTime<Utc>,
    ) -> Result<Option<WaterLevelReading>, FetchError> {
        if !self.throttle.try_acquire(now) {
            debug!(sensor = %self.unique_id(), "update throttled");
            return Ok(None);
        }

        match fetcher.fetch(&self.query, self.source.parser()) {
            Ok(reading) => {
                info!(sensor = %self.unique_id(), level_cm = reading.centimeters(), "water level updated");
                self.native_value = Some(reading.centimeters());
                self.available = true;
                Ok(Some(reading))
            }
            Err(e) => {
                warn!(sensor = %self.unique_id(), error = %e, "water level update failed");
                self.available = false;
                Err(e)
            }
        }
    }
}
