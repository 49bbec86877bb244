//! Startup configuration from `TILE_MERGE_*` environment variables.

use std::fs::OpenOptions;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Context;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const DEFAULT_DATA_DIR: &str = ".tile-merge";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// RNG seed for tile placement
    pub seed: u32,
    /// Directory of the file-backed key/value store
    pub data_dir: PathBuf,
    /// Log file; logging is off when unset
    pub log_path: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any variable source (tests pass a map)
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let seed = non_empty("TILE_MERGE_SEED")
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(clock_seed);
        let data_dir = non_empty("TILE_MERGE_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));
        let log_path = non_empty("TILE_MERGE_LOG").map(PathBuf::from);

        Self {
            seed,
            data_dir,
            log_path,
        }
    }
}

fn clock_seed() -> u32 {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as u64;
    // Fold so both the seconds and the sub-second part contribute.
    (nanos ^ (nanos >> 32)) as u32
}

/// Install the global subscriber, writing to `log_path`
///
/// The terminal owns stdout, so without a path nothing is installed. Keep
/// the returned guard alive until exit or buffered lines are lost.
pub fn init_tracing(log_path: Option<&Path>) -> anyhow::Result<Option<WorkerGuard>> {
    let Some(path) = log_path else {
        return Ok(None);
    };
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create log directory {}", dir.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    let (writer, guard) = tracing_appender::non_blocking(BufWriter::new(file));
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true),
        )
        .try_init()
        .context("tracing subscriber already installed")?;

    tracing::info!(path = %path.display(), "logging to file");
    Ok(Some(guard))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup(&[]));
        assert_eq!(config.data_dir, PathBuf::from(DEFAULT_DATA_DIR));
        assert_eq!(config.log_path, None);
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            ("TILE_MERGE_SEED", "1234"),
            ("TILE_MERGE_DATA_DIR", "/tmp/tm"),
            ("TILE_MERGE_LOG", "tm.log"),
        ]));
        assert_eq!(config.seed, 1234);
        assert_eq!(config.data_dir, PathBuf::from("/tmp/tm"));
        assert_eq!(config.log_path, Some(PathBuf::from("tm.log")));
    }

    #[test]
    fn test_blank_and_bad_values_fall_back() {
        let config = AppConfig::from_lookup(lookup(&[
            ("TILE_MERGE_SEED", "not-a-number"),
            ("TILE_MERGE_LOG", "   "),
        ]));
        assert_eq!(config.log_path, None);
        assert_eq!(config.data_dir, PathBuf::from(DEFAULT_DATA_DIR));
    }

    #[test]
    fn test_no_log_path_installs_nothing() {
        assert!(init_tracing(None).unwrap().is_none());
    }
}
