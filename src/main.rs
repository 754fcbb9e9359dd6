//! Lake Level Service - Main Daemon
//!
//! Polls vizugy.hu for lake water levels and keeps the latest reading of
//! every configured sensor on an in-memory board, optionally served over
//! HTTP.
//!
//! Usage:
//!   cargo run --release -- run                    # Start daemon without HTTP endpoint
//!   cargo run --release -- run --endpoint 8080    # Start with HTTP endpoint on port 8080
//!   cargo run --release -- poll                   # One poll cycle, print readings
//!   cargo run --release -- stations               # List geoportal stations for owner code 4
//!
//! Environment:
//!   LAKELEVEL_CONFIG - path to sensors.toml (default: ./sensors.toml)
//!   RUST_LOG         - tracing filter (default: info)

use clap::{Parser, Subcommand};
use lakelevel_service::config::{self, DEFAULT_CONFIG_PATH};
use lakelevel_service::daemon::{Daemon, PollOutcome};
use lakelevel_service::endpoint;
use lakelevel_service::ingest::arcgis::{self, DEFAULT_OWNER_CODE, GEOPORTAL_QUERY_URL};
use lakelevel_service::ingest::fetch::WaterLevelFetcher;
use lakelevel_service::logging;
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "lakelevel_service", version, about = "Lake water level sensors backed by vizugy.hu")]
struct Cli {
    /// Sensor configuration file
    #[arg(long, global = true, env = "LAKELEVEL_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the polling daemon (default)
    Run {
        /// Serve the monitoring board over HTTP on this port
        #[arg(long)]
        endpoint: Option<u16>,
    },
    /// Run a single poll cycle and print the readings
    Poll,
    /// List every geoportal station of one owner with its current level
    Stations {
        #[arg(long, default_value_t = DEFAULT_OWNER_CODE)]
        owner_code: u32,

        /// Query URL override
        #[arg(long, default_value = GEOPORTAL_QUERY_URL)]
        url: String,

        #[arg(long, default_value_t = 30)]
        timeout_secs: u64,
    },
}

fn main() {
    dotenv::dotenv().ok();
    logging::init(logging::DEFAULT_DIRECTIVE);

    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Run { endpoint: None }) {
        Command::Run { endpoint } => run_daemon(&cli.config, endpoint),
        Command::Poll => poll_once(&cli.config),
        Command::Stations {
            owner_code,
            url,
            timeout_secs,
        } => list_stations(owner_code, &url, timeout_secs),
    }
}

fn build_daemon(config_path: &Path) -> Daemon {
    let config = match config::load_config(config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e);
            process::exit(1);
        }
    };

    match Daemon::from_config(&config) {
        Ok(daemon) => daemon,
        Err(e) => {
            eprintln!("❌ Failed to create HTTP client: {}", e);
            process::exit(1);
        }
    }
}

fn run_daemon(config_path: &Path, endpoint_port: Option<u16>) {
    println!("🌊 Lake Level Service");
    println!("=====================\n");

    let daemon = build_daemon(config_path);

    // Start HTTP endpoint if requested (in background thread)
    if let Some(port) = endpoint_port {
        let board = daemon.board();
        std::thread::spawn(move || {
            if let Err(e) = endpoint::start_endpoint_server(port, board) {
                eprintln!("❌ Endpoint server error: {}", e);
                process::exit(1);
            }
        });
        println!("🚀 Endpoint running on http://0.0.0.0:{}", port);
    }

    println!("🔄 Starting continuous monitoring loop...");
    println!("   Poll interval: {} minutes", daemon.settings().poll_interval_minutes);
    println!("   Monitoring {} sensors", daemon.sensor_count());
    println!("   Press Ctrl+C to stop\n");

    daemon.run();
}

fn poll_once(config_path: &Path) {
    let daemon = build_daemon(config_path);
    let mut failures = 0;

    for (unique_id, outcome) in daemon.poll_all() {
        match outcome {
            PollOutcome::Updated(reading) => println!("   ✓ {} - {}", unique_id, reading),
            PollOutcome::Throttled => println!("   - {} - throttled", unique_id),
            PollOutcome::Failed(e) => {
                failures += 1;
                eprintln!("   ✗ {} - {}", unique_id, e);
            }
        }
    }

    if failures > 0 {
        process::exit(2);
    }
}

fn list_stations(owner_code: u32, url: &str, timeout_secs: u64) {
    let fetcher = match WaterLevelFetcher::new(Duration::from_secs(timeout_secs)) {
        Ok(fetcher) => fetcher,
        Err(e) => {
            eprintln!("❌ Failed to create HTTP client: {}", e);
            process::exit(1);
        }
    };

    match fetcher.list_stations(&arcgis::build_owner_query(url, owner_code)) {
        Ok(stations) => {
            println!("📋 {} stations for owner code {}", stations.len(), owner_code);
            for (name, reading) in stations {
                println!("   {:<40} {}", name, reading);
            }
        }
        Err(e) => {
            eprintln!("❌ Station listing failed: {}", e);
            process::exit(1);
        }
    }
}
