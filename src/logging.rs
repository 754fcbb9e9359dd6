/// Tracing subscriber setup shared by the binaries.
///
/// Filter directives come from `RUST_LOG` (a `.env` file works too, once
/// `dotenv` has been loaded); without it the given default applies.

use tracing_subscriber::EnvFilter;

pub const DEFAULT_DIRECTIVE: &str = "info";

/// Installs the global fmt subscriber. Safe to call more than once; later
/// calls are no-ops.
pub fn init(default_directive: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
