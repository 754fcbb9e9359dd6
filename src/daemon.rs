/// Core daemon implementation for the lake level service
///
/// This module implements the main daemon loop that:
/// 1. Builds one sensor per configured place
/// 2. Runs a poll cycle on a worker pool, one job per sensor
/// 3. Publishes every outcome to the shared monitoring board
/// 4. Sleeps out the rest of the poll interval and repeats
///
/// Failed polls are not retried within a cycle; the sensor's throttle and
/// the next cycle decide when it is tried again.

use crate::config::{ServiceConfig, ServiceSettings};
use crate::ingest::fetch::WaterLevelFetcher;
use crate::model::{FetchError, WaterLevelReading};
use crate::monitor::{self, MonitoringBoard, SensorSnapshot, SharedBoard};
use crate::sensor::WaterLevelSensor;
use chrono::{DateTime, Utc};
use std::sync::mpsc;
use std::sync::{Arc, Mutex, PoisonError};
use threadpool::ThreadPool;
use tracing::{info, warn};

// ---------------------------------------------------------------------------
// Poll outcome
// ---------------------------------------------------------------------------

/// Result of one sensor's update within a cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    Updated(WaterLevelReading),
    Throttled,
    Failed(String),
}

// ---------------------------------------------------------------------------
// Daemon State
// ---------------------------------------------------------------------------

/// Main daemon state
pub struct Daemon {
    settings: ServiceSettings,
    sensors: Vec<Arc<Mutex<WaterLevelSensor>>>,
    fetcher: Arc<WaterLevelFetcher>,
    board: SharedBoard,
    pool: ThreadPool,
}

impl Daemon {
    /// Create a daemon from a validated configuration.
    pub fn from_config(config: &ServiceConfig) -> Result<Self, FetchError> {
        let timeout = std::time::Duration::from_secs(config.service.request_timeout_secs);
        let fetcher = WaterLevelFetcher::new(timeout)?;
        Ok(Self::with_fetcher(config, fetcher))
    }

    /// Create a daemon around an existing fetcher.
    pub fn with_fetcher(config: &ServiceConfig, fetcher: WaterLevelFetcher) -> Self {
        let board = MonitoringBoard::shared();
        let sensors = config.build_sensors();

        {
            let mut board = monitor::write_board(&board);
            for sensor in &sensors {
                board.register(SensorSnapshot::from(sensor));
            }
        }

        Self {
            settings: config.service.clone(),
            sensors: sensors.into_iter().map(|s| Arc::new(Mutex::new(s))).collect(),
            fetcher: Arc::new(fetcher),
            board,
            pool: ThreadPool::with_name("sensor-poll".to_string(), config.service.workers.max(1)),
        }
    }

    pub fn settings(&self) -> &ServiceSettings {
        &self.settings
    }

    pub fn sensor_count(&self) -> usize {
        self.sensors.len()
    }

    /// Board handle for readers such as the HTTP endpoint.
    pub fn board(&self) -> SharedBoard {
        Arc::clone(&self.board)
    }

    /// Run one poll cycle for all sensors
    pub fn poll_all(&self) -> Vec<(String, PollOutcome)> {
        self.poll_all_at(Utc::now())
    }

    /// Run one poll cycle as if it started at `now`.
    ///
    /// Every sensor sees the same `now`, so sensors throttled at the poll
    /// interval line up with the cycle instead of drifting by job latency.
    /// Board timestamps are recorded at the same `now`. Returns outcomes ordered by unique id.
    pub fn poll_all_at(&self, now: DateTime<Utc>) -> Vec<(String, PollOutcome)> {
        let (tx, rx) = mpsc::channel();

        for sensor in &self.sensors {
            let sensor = Arc::clone(sensor);
            let fetcher = Arc::clone(&self.fetcher);
            let board = Arc::clone(&self.board);
            let tx = tx.clone();

            self.pool.execute(move || {
                let mut sensor = sensor.lock().unwrap_or_else(PoisonError::into_inner);
                let unique_id = sensor.unique_id();

                let outcome = match sensor.update_at(&fetcher, now) {
                    Ok(Some(reading)) => {
                        monitor::write_board(&board).record_success(
                            &unique_id,
                            reading.centimeters(),
                            now,
                        );
                        PollOutcome::Updated(reading)
                    }
                    Ok(None) => PollOutcome::Throttled,
                    Err(e) => {
                        let message = e.to_string();
                        monitor::write_board(&board).record_failure(&unique_id, &message, now);
                        PollOutcome::Failed(message)
                    }
                };

                let _ = tx.send((unique_id, outcome));
            });
        }
        drop(tx);

        let mut results: Vec<(String, PollOutcome)> = rx.iter().collect();
        results.sort_by(|a, b| a.0.cmp(&b.0));
        results
    }

    /// Main daemon loop (runs indefinitely)
    pub fn run(&self) -> ! {
        info!(
            poll_interval_minutes = self.settings.poll_interval_minutes,
            sensors = self.sensors.len(),
            "starting daemon loop"
        );

        let interval = self.settings.poll_interval();
        let staleness = self.settings.staleness_threshold();

        loop {
            let start = Utc::now();
            let results = self.poll_all_at(start);
            log_cycle(&results);

            {
                let board = monitor::read_board(&self.board);
                for (unique_id, _) in &results {
                    if board.is_stale(unique_id, Utc::now(), staleness) {
                        warn!(sensor = %unique_id, "reading is stale");
                    }
                }
            }

            // Sleep until next poll interval
            let remaining = interval - (Utc::now() - start);
            if let Ok(sleep) = remaining.to_std() {
                std::thread::sleep(sleep);
            }
        }
    }
}

fn log_cycle(results: &[(String, PollOutcome)]) {
    let updated = results
        .iter()
        .filter(|(_, o)| matches!(o, PollOutcome::Updated(_)))
        .count();
    let failed = results
        .iter()
        .filter(|(_, o)| matches!(o, PollOutcome::Failed(_)))
        .count();
    info!(
        updated,
        failed,
        throttled = results.len() - updated - failed,
        "poll cycle complete"
    );
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;

    fn unreachable_config() -> ServiceConfig {
        parse_config(
            r#"
            [service]
            workers = 2
            request_timeout_secs = 1

            [[sensor]]
            name = "Siófok"
            source = "single_station"
            endpoint = "http://127.0.0.1:9/query"

            [[sensor]]
            name = "Keszthely"
            source = "multi_station"
            endpoint = "http://127.0.0.1:9/query"
            "#,
        )
        .unwrap()
    }

    #[test]
    fn test_daemon_registers_every_sensor() {
        let daemon = Daemon::from_config(&unreachable_config()).unwrap();
        assert_eq!(daemon.sensor_count(), 2);

        let board = daemon.board();
        let board = monitor::read_board(&board);
        assert_eq!(board.len(), 2);
        assert!(board.get("SiófokWaterLevel").is_some());
        assert!(board.get("KeszthelyWaterLevel").is_some());
    }

    #[test]
    fn test_daemon_uses_configured_settings() {
        let daemon = Daemon::from_config(&unreachable_config()).unwrap();
        assert_eq!(daemon.settings().workers, 2);
        assert_eq!(daemon.settings().poll_interval_minutes, 5);
    }

    #[test]
    fn test_failed_cycle_is_recorded_then_throttled() {
        let daemon = Daemon::from_config(&unreachable_config()).unwrap();
        let now = Utc::now();

        let first = daemon.poll_all_at(now);
        assert_eq!(first.len(), 2);
        assert!(first.iter().all(|(_, o)| matches!(o, PollOutcome::Failed(_))));

        {
            let board = daemon.board();
            let board = monitor::read_board(&board);
            assert_eq!(board.unhealthy().len(), 2);
            assert_eq!(board.get("SiófokWaterLevel").unwrap().consecutive_failures, 1);
        }

        let second = daemon.poll_all_at(now + chrono::Duration::minutes(1));
        assert!(second.iter().all(|(_, o)| *o == PollOutcome::Throttled));
    }

    #[test]
    fn test_board_timestamps_follow_cycle_time() {
        let daemon = Daemon::from_config(&unreachable_config()).unwrap();
        let cycle = Utc::now() - chrono::Duration::days(3);

        daemon.poll_all_at(cycle);

        let board = daemon.board();
        let board = monitor::read_board(&board);
        let snapshot = board.get("KeszthelyWaterLevel").unwrap();
        assert_eq!(snapshot.last_attempt, Some(cycle));
        assert!(snapshot.last_updated.is_none());
    }
}
