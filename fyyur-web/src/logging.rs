use std::fs;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::Config;

const DEFAULT_FILTER: &str = "fyyur_web=info,fyyur_core=info,tower_http=info";

/// Initializes console logging, plus daily-rotated JSON files under
/// `config.log_dir` outside debug mode.
///
/// The returned guard flushes the file writer when dropped, so `main` keeps it
/// alive for the life of the process.
pub fn init_logging(config: &Config) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let (file_layer, guard) = if config.debug {
        (None, None)
    } else {
        let _ = fs::create_dir_all(&config.log_dir);
        let file_appender = tracing_appender::rolling::daily(&config.log_dir, "fyyur.log");
        let (non_blocking_writer, guard) = tracing_appender::non_blocking(file_appender);
        (
            Some(fmt::layer().json().with_writer(non_blocking_writer)),
            Some(guard),
        )
    };

    let console_layer = fmt::layer().with_writer(std::io::stdout);

    if let Err(e) = tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(console_layer)
        .try_init()
    {
        eprintln!("Logging already initialized: {e}");
    }

    guard
}
