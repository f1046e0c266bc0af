// Tracing setup for the journal store and its collaborators

use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "JOURNAL_LOG";

/// Install a stderr fmt subscriber filtered by JOURNAL_LOG (default "info")
/// Safe to call more than once; later calls leave the first subscriber in place
pub fn initTracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok();

    if installed {
        tracing::debug!("[initTracing] Logging to stderr");
    }
}
