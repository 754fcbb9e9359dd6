/// In-memory monitoring board of the latest sensor readings.
///
/// The daemon writes one `SensorSnapshot` per sensor after every update
/// attempt; the HTTP endpoint only reads. Nothing here is persisted: a
/// restart begins with every sensor unavailable until its first poll.
///
/// Shared between threads as `SharedBoard` (`Arc<RwLock<MonitoringBoard>>`).

use crate::sensor::WaterLevelSensor;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

pub type SharedBoard = Arc<RwLock<MonitoringBoard>>;

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Externally visible state of one sensor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorSnapshot {
    pub unique_id: String,
    pub name: String,
    pub place: String,
    pub source: String,
    pub value: Option<i64>,
    pub unit: String,
    pub device_class: String,
    pub state_class: String,
    pub available: bool,
    pub last_updated: Option<DateTime<Utc>>,
    pub last_attempt: Option<DateTime<Utc>>,
    pub consecutive_failures: u32,
    pub last_error: Option<String>,
}

impl From<&WaterLevelSensor> for SensorSnapshot {
    fn from(sensor: &WaterLevelSensor) -> Self {
        SensorSnapshot {
            unique_id: sensor.unique_id(),
            name: sensor.name(),
            place: sensor.place().to_string(),
            source: sensor.source().kind().to_string(),
            value: sensor.native_value(),
            unit: sensor.unit_of_measurement().to_string(),
            device_class: sensor.device_class().to_string(),
            state_class: sensor.state_class().to_string(),
            available: sensor.available(),
            last_updated: None,
            last_attempt: None,
            consecutive_failures: 0,
            last_error: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Board
// ---------------------------------------------------------------------------

/// Latest snapshot per sensor, keyed by unique id.
#[derive(Debug, Default)]
pub struct MonitoringBoard {
    entries: HashMap<String, SensorSnapshot>,
}

impl MonitoringBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedBoard {
        Arc::new(RwLock::new(Self::new()))
    }

    /// Adds or replaces the snapshot for a sensor.
    pub fn register(&mut self, snapshot: SensorSnapshot) {
        self.entries.insert(snapshot.unique_id.clone(), snapshot);
    }

    /// Records a successful update. Unknown ids are ignored.
    pub fn record_success(&mut self, unique_id: &str, value: i64, at: DateTime<Utc>) {
        if let Some(entry) = self.entries.get_mut(unique_id) {
            entry.value = Some(value);
            entry.available = true;
            entry.last_updated = Some(at);
            entry.last_attempt = Some(at);
            entry.consecutive_failures = 0;
            entry.last_error = None;
        }
    }

    /// Records a failed update. The previous value stays in place.
    pub fn record_failure(&mut self, unique_id: &str, error: &str, at: DateTime<Utc>) {
        if let Some(entry) = self.entries.get_mut(unique_id) {
            entry.available = false;
            entry.last_attempt = Some(at);
            entry.consecutive_failures += 1;
            entry.last_error = Some(error.to_string());
        }
    }

    pub fn get(&self, unique_id: &str) -> Option<&SensorSnapshot> {
        self.entries.get(unique_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All snapshots ordered by unique id.
    pub fn all(&self) -> Vec<SensorSnapshot> {
        let mut snapshots: Vec<SensorSnapshot> = self.entries.values().cloned().collect();
        snapshots.sort_by(|a, b| a.unique_id.cmp(&b.unique_id));
        snapshots
    }

    /// True when the last successful update is older than `threshold`.
    pub fn is_stale(&self, unique_id: &str, now: DateTime<Utc>, threshold: Duration) -> bool {
        match self.get(unique_id).and_then(|s| s.last_updated) {
            Some(updated) => now - updated > threshold,
            None => true, // Unknown or never updated
        }
    }

    /// Sensors that are unavailable or whose last attempt failed.
    pub fn unhealthy(&self) -> Vec<&SensorSnapshot> {
        let mut unhealthy: Vec<&SensorSnapshot> = self
            .entries
            .values()
            .filter(|s| !s.available || s.consecutive_failures > 0)
            .collect();
        unhealthy.sort_by(|a, b| a.unique_id.cmp(&b.unique_id));
        unhealthy
    }
}

/// Read access that survives a writer panicking mid-update.
pub fn read_board(board: &SharedBoard) -> RwLockReadGuard<'_, MonitoringBoard> {
    board.read().unwrap_or_else(PoisonError::into_inner)
}

pub fn write_board(board: &SharedBoard) -> RwLockWriteGuard<'_, MonitoringBoard> {
    board.write().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::source::Source;

    fn board_with_balaton() -> MonitoringBoard {
        let mut board = MonitoringBoard::new();
        let sensor = WaterLevelSensor::new("Balaton átlag", Source::default());
        board.register(SensorSnapshot::from(&sensor));
        board
    }

    const ID: &str = "Balaton átlagWaterLevel";

    #[test]
    fn test_registered_sensor_starts_unavailable() {
        let board = board_with_balaton();
        let snapshot = board.get(ID).expect("sensor should be registered");
        assert!(!snapshot.available);
        assert_eq!(snapshot.value, None);
        assert_eq!(snapshot.unit, "cm");
        assert_eq!(snapshot.source, "embedded_array");
    }

    #[test]
    fn test_failure_keeps_previous_value() {
        let mut board = board_with_balaton();
        let t0 = Utc::now();
        board.record_success(ID, 87, t0);
        board.record_failure(ID, "upstream returned HTTP 500", t0 + Duration::minutes(5));
        board.record_failure(ID, "upstream returned HTTP 500", t0 + Duration::minutes(10));

        let snapshot = board.get(ID).unwrap();
        assert_eq!(snapshot.value, Some(87), "stale value should be kept");
        assert!(!snapshot.available);
        assert_eq!(snapshot.consecutive_failures, 2);
        assert_eq!(snapshot.last_updated, Some(t0));
        assert_eq!(snapshot.last_attempt, Some(t0 + Duration::minutes(10)));
    }

    #[test]
    fn test_success_resets_failures() {
        let mut board = board_with_balaton();
        let t0 = Utc::now();
        board.record_failure(ID, "boom", t0);
        board.record_success(ID, 90, t0 + Duration::minutes(5));

        let snapshot = board.get(ID).unwrap();
        assert!(snapshot.available);
        assert_eq!(snapshot.consecutive_failures, 0);
        assert_eq!(snapshot.last_error, None);
        assert!(board.unhealthy().is_empty());
    }

    #[test]
    fn test_staleness() {
        let mut board = board_with_balaton();
        let now = Utc::now();
        assert!(board.is_stale(ID, now, Duration::minutes(60)), "never updated is stale");

        board.record_success(ID, 87, now - Duration::minutes(90));
        assert!(board.is_stale(ID, now, Duration::minutes(60)));

        board.record_success(ID, 87, now - Duration::minutes(10));
        assert!(!board.is_stale(ID, now, Duration::minutes(60)));

        assert!(board.is_stale("UnknownWaterLevel", now, Duration::minutes(60)));
    }

    #[test]
    fn test_unknown_ids_are_ignored() {
        let mut board = board_with_balaton();
        board.record_success("UnknownWaterLevel", 1, Utc::now());
        assert_eq!(board.len(), 1);
    }

    #[test]
    fn test_all_is_sorted() {
        let mut board = board_with_balaton();
        board.register(SensorSnapshot::from(&WaterLevelSensor::new(
            "Alsóörs",
            Source::SingleStation { endpoint: None },
        )));
        let ids: Vec<String> = board.all().into_iter().map(|s| s.unique_id).collect();
        assert_eq!(ids, vec!["AlsóörsWaterLevel", "Balaton átlagWaterLevel"]);
    }
}
