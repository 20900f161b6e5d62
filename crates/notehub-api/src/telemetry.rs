//! Tracing subscriber setup shared by the server and the admin CLI.
//!
//! Environment variables:
//!   LOG_FORMAT  - "json" or "text" (default: "text")
//!   LOG_FILE    - path to log file (optional, enables daily-rotated file logging)
//!   LOG_ANSI    - "true"/"false" override ANSI colors (auto-detected by default)
//!   RUST_LOG    - standard env filter

use std::path::{Path, PathBuf};

use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[derive(Debug, Clone, PartialEq, Eq)]
struct LogSettings {
    json: bool,
    file: Option<PathBuf>,
    ansi: Option<bool>,
}

impl LogSettings {
    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            json: get("LOG_FORMAT").is_some_and(|v| v.eq_ignore_ascii_case("json")),
            file: get("LOG_FILE").filter(|v| !v.is_empty()).map(PathBuf::from),
            ansi: get("LOG_ANSI").map(|v| v == "true" || v == "1"),
        }
    }

    /// Directory and file name prefix for the daily appender.
    fn file_target(path: &Path) -> (PathBuf, String) {
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."))
            .to_path_buf();
        let name = path
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or("notehub-api.log")
            .to_string();
        (dir, name)
    }
}

/// Install the global subscriber. Keep the returned guard alive for the
/// lifetime of the process when file logging is enabled.
pub fn init_tracing(default_filter: &str) -> Option<WorkerGuard> {
    let settings = LogSettings::from_lookup(|key| std::env::var(key).ok());
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into());

    let (layer, guard) = match &settings.file {
        Some(path) => {
            let (dir, name) = LogSettings::file_target(path);
            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, name));
            // Files get plain text unless ANSI is forced on.
            let layer = if settings.json {
                fmt::layer().json().with_writer(writer).boxed()
            } else {
                fmt::layer()
                    .with_writer(writer)
                    .with_ansi(settings.ansi.unwrap_or(false))
                    .boxed()
            };
            (layer, Some(guard))
        }
        None => {
            let layer = if settings.json {
                fmt::layer().json().boxed()
            } else {
                let mut layer = fmt::layer();
                if let Some(ansi) = settings.ansi {
                    layer = layer.with_ansi(ansi);
                }
                layer.boxed()
            };
            (layer, None)
        }
    };

    tracing_subscriber::registry().with(env_filter).with(layer).init();

    info!(
        log_format = if settings.json { "json" } else { "text" },
        log_file = settings
            .file
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(stdout)".to_string()),
        "Logging initialized"
    );
    guard
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(pairs: &[(&str, &str)]) -> LogSettings {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        LogSettings::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_defaults_to_text_on_stdout() {
        assert_eq!(
            settings(&[]),
            LogSettings {
                json: false,
                file: None,
                ansi: None
            }
        );
    }

    #[test]
    fn test_reads_format_file_and_ansi() {
        let s = settings(&[
            ("LOG_FORMAT", "JSON"),
            ("LOG_FILE", "/var/log/notehub/api.log"),
            ("LOG_ANSI", "0"),
        ]);
        assert!(s.json);
        assert_eq!(s.file, Some(PathBuf::from("/var/log/notehub/api.log")));
        assert_eq!(s.ansi, Some(false));
    }

    #[test]
    fn test_bare_file_name_logs_to_current_dir() {
        let (dir, name) = LogSettings::file_target(Path::new("api.log"));
        assert_eq!(dir, PathBuf::from("."));
        assert_eq!(name, "api.log");
    }
}
