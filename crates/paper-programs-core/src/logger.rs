//! Logging setup shared by the library crates and the CLI.
//!
//! `verbosity_level` turns a `-v` count into a level filter that both
//! backends accept:
//! - `init_with_level` installs a stderr logger writing
//!   `  1.234s DEBUG detect::tracker: message`, crate prefixes shortened;
//! - `init_tracing` (feature `tracing`) installs a `tracing-subscriber`
//!   formatter whose span close events carry per-stage pipeline timings.
//!   `RUST_LOG`, when set, overrides the level.

use std::fmt;
use std::io::Write;
use std::sync::OnceLock;
use std::time::Instant;

use log::{Level, LevelFilter, Log, Metadata, Record};

#[cfg(feature = "tracing")]
use tracing_subscriber::fmt::format::FmtSpan;
#[cfg(feature = "tracing")]
use tracing_subscriber::util::SubscriberInitExt;
#[cfg(feature = "tracing")]
use tracing_subscriber::EnvFilter;

const CRATE_PREFIX: &str = "paper_programs_";

/// `0` → info, `1` → debug, more → trace.
pub fn verbosity_level(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// `paper_programs_detect::tracker` → `detect::tracker`.
fn short_target(target: &str) -> &str {
    target.strip_prefix(CRATE_PREFIX).unwrap_or(target)
}

fn format_line(elapsed: f64, level: Level, target: &str, args: &fmt::Arguments<'_>) -> String {
    format!("{elapsed:8.3}s {level:<5} {}: {args}", short_target(target))
}

struct StderrLogger {
    level: LevelFilter,
    started: Instant,
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format_line(
            self.started.elapsed().as_secs_f64(),
            record.level(),
            record.target(),
            record.args(),
        );
        let _ = writeln!(std::io::stderr().lock(), "{line}");
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

static LOGGER: OnceLock<StderrLogger> = OnceLock::new();

/// Install the stderr logger. The first call wins; later calls are no-ops.
pub fn init_with_level(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    if LOGGER.get().is_some() {
        return Ok(());
    }
    log::set_logger(LOGGER.get_or_init(|| StderrLogger {
        level,
        started: Instant::now(),
    }))?;
    log::set_max_level(level);
    Ok(())
}

/// Install a `tracing` subscriber at `level` unless `RUST_LOG` says otherwise.
#[cfg(feature = "tracing")]
pub fn init_tracing(level: LevelFilter, json: bool) {
    let directive = level.as_str().to_ascii_lowercase();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(std::io::stderr);
    if json {
        let _ = builder.json().flatten_event(true).finish().try_init();
    } else {
        let _ = builder
            .with_timer(tracing_subscriber::fmt::time::Uptime::default())
            .finish()
            .try_init();
    }
}
