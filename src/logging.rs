use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "ESCOUADE_LOG";
pub const DEFAULT_FILTER: &str = "game=info,combat=warn,optimizer=warn,parallel=warn,server=info,config=warn";

/// Installs the global fmt subscriber, filtered by `ESCOUADE_LOG`. Logs go to
/// stderr so command output on stdout stays clean. Safe to call twice.
pub fn init() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init();
}
