/// lakelevel_service: lake water level sensors backed by vizugy.hu.
///
/// # Module structure
///
/// ```text
/// lakelevel_service
/// ├── model       — shared data types (StationQuery, WaterLevelReading, FetchError)
/// ├── config      — sensor configuration loader (sensors.toml)
/// ├── sensor      — water level sensor entity with throttled update
/// ├── throttle    — per-sensor minimum interval between fetches
/// ├── monitor     — in-memory board of the latest sensor snapshots
/// ├── daemon      — main daemon loop (worker pool, board publishing)
/// ├── endpoint    — read-only HTTP API over the board
/// ├── logging     — tracing subscriber setup
/// └── ingest
///     ├── fetch    — the shared HTTP fetch primitive + response parsers
///     ├── source   — configured upstream variant of a sensor
///     ├── vizallas — vizugy.hu station page (embedded `Vizallas` array)
///     ├── arcgis   — geoportal feature query (single- and multi-station)
///     ├── numeric  — centimeter decoding shared by the parsers
///     └── fixtures (test only) — representative upstream payloads
/// ```

/// Public modules
pub mod config;
pub mod daemon;
pub mod endpoint;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod monitor;
pub mod sensor;
pub mod throttle;
