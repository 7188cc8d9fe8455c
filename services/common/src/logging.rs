use std::{
    fs, io,
    path::{Path, PathBuf},
    thread,
    time::{Duration, SystemTime},
};

use tracing::Subscriber;
use tracing_appender::{
    non_blocking::{NonBlocking, WorkerGuard},
    rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

use crate::env::env_or;

const DEFAULT_LOG_DIR: &str = "/var/log/asteria";

/// Keeps the non-blocking file writer alive. Drop it last in `main`.
pub struct TracingGuards {
    _file_guard: Option<WorkerGuard>,
}

/// Installs the global subscriber: stdout always, plus a daily rolling file
/// under `$LOG_DIR/<service_name>` when that directory is usable.
///
/// A missing or unwritable log directory degrades to stdout only. Calling this
/// twice is harmless; the second subscriber is discarded.
pub fn init_tracing(service_name: &str) -> TracingGuards {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let log_dir = std::env::var("LOG_DIR").unwrap_or_else(|_| DEFAULT_LOG_DIR.to_string());
    let log_root = PathBuf::from(log_dir).join(service_name);

    let (file_writer, file_guard, sink_error) = match open_file_sink(&log_root, service_name) {
        Ok((writer, guard)) => (Some(writer), Some(guard), None),
        Err(err) => (None, None, Some(err)),
    };

    let _ = subscriber(filter, file_writer).try_init();

    match sink_error {
        Some(err) => {
            tracing::warn!(path = %log_root.display(), error = %err, "file logging disabled");
        }
        None => {
            let retention_days = env_or("LOG_RETENTION_DAYS", 14u64);
            let cleanup_interval = env_or("LOG_CLEANUP_INTERVAL_MINUTES", 360u64);
            spawn_log_cleanup(log_root, retention_days, cleanup_interval);
        }
    }

    TracingGuards {
        _file_guard: file_guard,
    }
}

/// Stdout layer plus, when a writer is given, an uncoloured file layer.
fn subscriber(
    filter: EnvFilter,
    file_writer: Option<NonBlocking>,
) -> impl Subscriber + Send + Sync + 'static {
    let file_layer = file_writer.map(|writer| fmt::layer().with_ansi(false).with_writer(writer));
    Registry::default()
        .with(filter)
        .with(fmt::layer().with_writer(io::stdout))
        .with(file_layer)
}

fn open_file_sink(log_root: &Path, service_name: &str) -> io::Result<(NonBlocking, WorkerGuard)> {
    fs::create_dir_all(log_root)?;
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(service_name)
        .filename_suffix("log")
        .build(log_root)
        .map_err(io::Error::other)?;
    Ok(tracing_appender::non_blocking(appender))
}

fn spawn_log_cleanup(log_root: PathBuf, retention_days: u64, cleanup_interval_minutes: u64) {
    if retention_days == 0 || cleanup_interval_minutes == 0 {
        return;
    }

    let retention = Duration::from_secs(retention_days * 24 * 60 * 60);
    let interval = Duration::from_secs(cleanup_interval_minutes * 60);

    thread::spawn(move || loop {
        if let Some(cutoff) = SystemTime::now().checked_sub(retention) {
            let removed = prune_logs(&log_root, cutoff);
            if removed > 0 {
                tracing::debug!(removed, "pruned rotated log files");
            }
        }
        thread::sleep(interval);
    });
}

/// Removes files under `root` last modified before `cutoff`, recursively.
/// Returns how many were removed; unreadable entries are skipped.
fn prune_logs(root: &Path, cutoff: SystemTime) -> usize {
    let Ok(entries) = fs::read_dir(root) else {
        return 0;
    };

    let mut removed = 0;
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            removed += prune_logs(&path, cutoff);
            continue;
        }
        let stale = fs::metadata(&path)
            .and_then(|metadata| metadata.modified())
            .map(|modified| modified < cutoff)
            .unwrap_or(false);
        if stale && fs::remove_file(&path).is_ok() {
            removed += 1;
        }
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prunes_files_older_than_cutoff() {
        let dir = tempfile::tempdir().expect("tempdir");
        let nested = dir.path().join("telemetry-service");
        fs::create_dir_all(&nested).expect("mkdir");
        fs::write(nested.join("telemetry-service.2026-01-01.log"), b"old").expect("write");
        fs::write(dir.path().join("stray.log"), b"old").expect("write");

        let cutoff = SystemTime::now() + Duration::from_secs(3600);
        assert_eq!(prune_logs(dir.path(), cutoff), 2);
        assert!(fs::read_dir(&nested).expect("read").next().is_none());
    }

    #[test]
    fn keeps_recent_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = dir.path().join("telemetry-service.log");
        fs::write(&file, b"fresh").expect("write");

        let cutoff = SystemTime::now() - Duration::from_secs(3600);
        assert_eq!(prune_logs(dir.path(), cutoff), 0);
        assert!(file.exists());
    }

    #[test]
    fn missing_root_prunes_nothing() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert_eq!(prune_logs(&dir.path().join("absent"), SystemTime::now()), 0);
    }

    #[test]
    fn unusable_log_dir_is_an_error() {
        let file = tempfile::NamedTempFile::new().expect("tempfile");
        let root = file.path().join("svc");
        assert!(open_file_sink(&root, "svc").is_err());
    }

    #[test]
    fn stdout_only_subscriber_still_logs() {
        let file = tempfile::NamedTempFile::new().expect("tempfile");
        let root = file.path().join("svc");
        let writer = open_file_sink(&root, "svc").ok().map(|(writer, _guard)| writer);
        assert!(writer.is_none());

        let stdout_only = subscriber(EnvFilter::new("info"), writer);
        tracing::subscriber::with_default(stdout_only, || {
            tracing::info!("file sink unavailable, stdout only");
        });
    }

    #[test]
    fn file_layer_writes_to_rolling_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (writer, guard) = open_file_sink(dir.path(), "svc").expect("file sink");

        let with_file = subscriber(EnvFilter::new("info"), Some(writer));
        tracing::subscriber::with_default(with_file, || {
            tracing::info!("Detected ship Argo in position (1,2) with fuel 3");
        });
        drop(guard);

        let contents: String = fs::read_dir(dir.path())
            .expect("read dir")
            .flatten()
            .filter_map(|entry| fs::read_to_string(entry.path()).ok())
            .collect();
        assert!(contents.contains("Detected ship Argo in position (1,2) with fuel 3"));
    }

    #[test]
    fn file_sink_creates_service_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path().join("telemetry-service");
        let sink = open_file_sink(&root, "telemetry-service");
        assert!(sink.is_ok());
        assert!(root.is_dir());
    }
}
