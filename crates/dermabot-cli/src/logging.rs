//! Log sink setup.
//!
//! Bot runs write `<timestamp> - <LEVEL> - <message>` lines to the log file
//! through a non-blocking appender. Other commands log to stderr only.

use std::fmt;
use std::fs;
use std::path::Path;

use dermabot_core::config::LoggingConfig;
use tracing::{Event, Level, Subscriber};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{prelude::*, EnvFilter};

/// Timestamp layout of log lines, e.g. `2024-05-01 12:00:00,123`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S,%3f";

/// `<timestamp> - <LEVEL> - <message>`
pub struct LineFormat;

impl<S, N> FormatEvent<S, N> for LineFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        write!(
            writer,
            "{} - {} - ",
            chrono::Local::now().format(TIMESTAMP_FORMAT),
            level_name(event.metadata().level())
        )?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

fn level_name(level: &Level) -> &'static str {
    match *level {
        Level::TRACE => "TRACE",
        Level::DEBUG => "DEBUG",
        Level::INFO => "INFO",
        Level::WARN => "WARNING",
        Level::ERROR => "ERROR",
    }
}

fn filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Make sure `dir` is a directory, removing a plain file in its place.
pub fn prepare_log_dir(dir: &Path) -> std::io::Result<()> {
    if dir.exists() && !dir.is_dir() {
        fs::remove_file(dir)?;
    }
    fs::create_dir_all(dir)
}

/// Log to the configured file, plus stderr when `verbose`.
///
/// The returned guard flushes the file on drop; keep it alive for the
/// whole run.
pub fn init_file(config: &LoggingConfig, verbose: bool) -> anyhow::Result<WorkerGuard> {
    prepare_log_dir(&config.dir)?;
    let appender = tracing_appender::rolling::never(&config.dir, &config.file);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .event_format(LineFormat)
        .with_writer(writer)
        .with_ansi(false)
        .with_filter(filter(&config.level));

    let console_layer = verbose.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_filter(filter("debug"))
    });

    tracing_subscriber::registry()
        .with(file_layer)
        .with(console_layer)
        .init();

    Ok(guard)
}

/// Log to stderr only.
pub fn init_console(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(filter(level)),
        )
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_prepare_replaces_plain_file() {
        let tmp = TempDir::new().unwrap();
        let logs = tmp.path().join("logs");
        fs::write(&logs, "stray file").unwrap();

        prepare_log_dir(&logs).unwrap();
        assert!(logs.is_dir());

        // Idempotent on an existing directory
        prepare_log_dir(&logs).unwrap();
        assert!(logs.is_dir());
    }

    #[test]
    fn test_level_names() {
        assert_eq!(level_name(&Level::WARN), "WARNING");
        assert_eq!(level_name(&Level::INFO), "INFO");
    }
}
