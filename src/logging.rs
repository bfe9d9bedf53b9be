use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

pub const LOG_ENV: &str = "CANAICODE_LOG";

/// Install the stderr logger. `verbose` raises the default level from WARN
/// to INFO; `CANAICODE_LOG` overrides either.
pub fn init(verbose: bool) {
    let env_filter = EnvFilter::builder()
        .with_default_directive(if verbose {
            LevelFilter::INFO.into()
        } else {
            LevelFilter::WARN.into()
        })
        .with_env_var(LOG_ENV)
        .from_env_lossy();

    let fmt = fmt::layer()
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr);

    // a second init (tests driving both CLIs in one process) keeps the first
    let _ = tracing_subscriber::registry()
        .with(fmt)
        .with(env_filter)
        .try_init();
}
