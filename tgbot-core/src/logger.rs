//! Tracing setup: one fmt layer (level, target, span events, all fields) written to stdout and a log file.

use std::fs::{self, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Arc;

use tracing_subscriber::{
    fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry,
};

/// Installs the global tracing subscriber. Missing parent directories of the log file are
/// created.
///
/// Level comes from `RUST_LOG` (default `info`). Load `.env` before calling this or
/// `RUST_LOG` from the file is not seen.
pub fn init_tracing(log_file_path: &str) -> anyhow::Result<()> {
    ensure_log_dir(Path::new(log_file_path))?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path)?;
    let file = Arc::new(file);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    use tracing_subscriber::fmt::writer::MakeWriterExt;
    let writer = io::stdout.and(file);

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(true)
        .with_thread_ids(true)
        .with_level(true)
        .with_file(false)
        .with_line_number(false);

    Registry::default()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to set global subscriber: {}", e))?;

    Ok(())
}

fn ensure_log_dir(log_file_path: &Path) -> io::Result<()> {
    match log_file_path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => fs::create_dir_all(dir),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_log_dir_creates_parents() {
        let root = std::env::temp_dir().join(format!("tgbot-logs-{}", std::process::id()));
        let log_file = root.join("nested").join("bot.log");

        ensure_log_dir(&log_file).unwrap();

        assert!(root.join("nested").is_dir());
        fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn test_ensure_log_dir_accepts_bare_file_name() {
        ensure_log_dir(Path::new("bot.log")).unwrap();
    }
}
