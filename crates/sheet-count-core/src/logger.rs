//! Diagnostics sinks for the `sheet-count` tools.
//!
//! Pipeline stages only emit `log` records; binaries choose where they go.
//! `-v` style verbosity counts map onto levels through [`level_for_verbosity`].

use std::io::Write;
use std::sync::OnceLock;
use std::time::Instant;

use log::{LevelFilter, Log, Metadata, Record};

#[cfg(feature = "tracing")]
use tracing_subscriber::fmt::format::FmtSpan;
#[cfg(feature = "tracing")]
use tracing_subscriber::util::SubscriberInitExt;
#[cfg(feature = "tracing")]
use tracing_subscriber::{fmt, EnvFilter};

/// 0 → warn, 1 → info, 2 → debug, more → trace.
pub fn level_for_verbosity(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// `sheet_count_lines::hough` → `lines::hough`, `sheet_count::sequence` → `sequence`.
fn stage_name(target: &str) -> &str {
    target
        .strip_prefix("sheet_count_")
        .or_else(|| target.strip_prefix("sheet_count::"))
        .unwrap_or(target)
}

struct StageLogger {
    level: LevelFilter,
    started: Instant,
}

impl Log for StageLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let ms = self.started.elapsed().as_millis();
        let mut stderr = std::io::stderr().lock();
        let _ = writeln!(
            stderr,
            "{ms:>7}ms {:<5} {}: {}",
            record.level(),
            stage_name(record.target()),
            record.args()
        );
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

static LOGGER: OnceLock<StageLogger> = OnceLock::new();

/// Send `log` records at or above `level` to stderr.
///
/// Only the first call installs the logger; later calls keep its level.
pub fn init_with_level(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    if LOGGER.get().is_none() {
        let logger = LOGGER.get_or_init(|| StageLogger {
            level,
            started: Instant::now(),
        });
        log::set_logger(logger)?;
        log::set_max_level(level);
    }
    Ok(())
}

/// `tracing` subscriber with an `info` default; see [`init_tracing_with_level`].
#[cfg(feature = "tracing")]
pub fn init_tracing(json: bool) {
    init_tracing_with_level(json, LevelFilter::Info);
}

/// Install a `tracing` subscriber that also receives `log` records.
///
/// `RUST_LOG` wins over `level` when set. Span close events carry the
/// per-stage timings of the instrumented pipeline functions.
#[cfg(feature = "tracing")]
pub fn init_tracing_with_level(json: bool, level: LevelFilter) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_string().to_lowercase()));
    let builder = fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(std::io::stderr);
    let _ = if json {
        builder.json().flatten_event(true).finish().try_init()
    } else {
        builder.finish().try_init()
    };
}
