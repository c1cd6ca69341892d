use std::fs::{self, File};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::Level;
use tracing_appender::non_blocking::{self, WorkerGuard};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::{LoggingConfig, ResolvedOutputs};

pub struct LoggingGuard {
    _guard: WorkerGuard,
    pub telemetry_path: PathBuf,
}

/// Installs the global subscriber: human-readable events on stderr, plus JSON
/// lines in a telemetry file when structured logging is enabled. `RUST_LOG`
/// overrides the configured level.
pub fn init_logging(
    logging: &LoggingConfig,
    outputs: &ResolvedOutputs,
    run_id: &str,
) -> Result<Option<LoggingGuard>> {
    let level = logging.level().unwrap_or(Level::WARN);
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    let console = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_span_events(FmtSpan::NONE);

    let (json, guard) = if logging.enable_structured {
        let telemetry_path = telemetry_path(outputs, run_id);
        if let Some(dir) = telemetry_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(dir).with_context(|| {
                format!("creating telemetry directory at {}", dir.display())
            })?;
        }
        let file = File::create(&telemetry_path).with_context(|| {
            format!("creating telemetry file at {}", telemetry_path.display())
        })?;

        let (writer, guard) = non_blocking::NonBlockingBuilder::default()
            .lossy(false)
            .finish(file);
        let layer = fmt::layer()
            .json()
            .with_current_span(false)
            .with_span_events(FmtSpan::NONE)
            .with_writer(writer);
        (
            Some(layer),
            Some(LoggingGuard {
                _guard: guard,
                telemetry_path,
            }),
        )
    } else {
        (None, None)
    };

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(json);

    // Ignore error if a global subscriber is already set (e.g., when running in tests)
    let _ = tracing::subscriber::set_global_default(subscriber);

    Ok(guard)
}

/// Configured telemetry path, or `telemetry.jsonl` beside the Markdown summary.
fn telemetry_path(outputs: &ResolvedOutputs, run_id: &str) -> PathBuf {
    if let Some(path) = &outputs.telemetry {
        return path.clone();
    }
    let dir = outputs
        .summary_md
        .as_deref()
        .or(outputs.summary_json.as_deref())
        .and_then(Path::parent)
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    dir.join(format!("{run_id}.telemetry.jsonl"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn telemetry_defaults_beside_summary() {
        let outputs = ResolvedOutputs {
            summary_md: Some(PathBuf::from("out/run/summary.md")),
            ..ResolvedOutputs::default()
        };
        assert_eq!(
            telemetry_path(&outputs, "run"),
            PathBuf::from("out/run/run.telemetry.jsonl")
        );
        assert_eq!(
            telemetry_path(&ResolvedOutputs::default(), "x"),
            PathBuf::from("./x.telemetry.jsonl")
        );
    }

    #[test]
    fn explicit_telemetry_path_wins() {
        let outputs = ResolvedOutputs {
            summary_md: Some(PathBuf::from("out/summary.md")),
            telemetry: Some(PathBuf::from("logs/events.jsonl")),
            ..ResolvedOutputs::default()
        };
        assert_eq!(
            telemetry_path(&outputs, "run"),
            PathBuf::from("logs/events.jsonl")
        );
    }
}
