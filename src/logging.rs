//! File logging. The terminal belongs to the dashboard, so nothing is ever
//! written to stdout or stderr while it is running.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{self, RollingFileAppender};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{LogRotation, LoggingConfig};

const LOG_PREFIX: &str = "nfl-feed.log";

/// Installs the global subscriber.
///
/// Returns the appender guard, which must live until shutdown so buffered
/// lines are flushed. Returns `None`, leaving logging off, when there is
/// nowhere to write.
pub fn init(config: &LoggingConfig) -> Option<WorkerGuard> {
    let dir = config.dir.as_ref()?;
    if std::fs::create_dir_all(dir).is_err() {
        return None;
    }

    let appender: RollingFileAppender = match config.rotation {
        LogRotation::Hourly => rolling::hourly(dir, LOG_PREFIX),
        LogRotation::Daily => rolling::daily(dir, LOG_PREFIX),
        LogRotation::Never => rolling::never(dir, LOG_PREFIX),
    };
    let (writer, guard) = tracing_appender::non_blocking(appender);

    // RUST_LOG wins over the configured level.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(&config.level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false),
        )
        .init();

    Some(guard)
}

/// Scopes a bare level to this crate so dependencies stay quiet.
fn filter_directive(level: &str) -> String {
    if level.contains('=') || level.contains(',') {
        level.to_string()
    } else {
        format!("nfl_feed={level}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_level_is_scoped_to_crate() {
        assert_eq!(filter_directive("debug"), "nfl_feed=debug");
    }

    #[test]
    fn test_full_directive_passes_through() {
        assert_eq!(
            filter_directive("nfl_feed=trace,reqwest=debug"),
            "nfl_feed=trace,reqwest=debug"
        );
    }

    #[test]
    fn test_no_dir_disables_logging() {
        let config = LoggingConfig {
            dir: None,
            ..LoggingConfig::default()
        };
        assert!(init(&config).is_none());
    }
}
