use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub const LOG_ENV: &str = "DYNAPSY_LOG";
pub const LOG_FILE: &str = "dynapsy.log";

/// `DYNAPSY_LOG` wins over the configured level; unparsable values fall back to `info`.
fn build_filter(env_value: Option<&str>, configured: &str) -> EnvFilter {
    let directive = env_value
        .filter(|v| !v.trim().is_empty())
        .unwrap_or(configured);
    EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new("info"))
}

pub fn log_path(data_dir: &Path) -> PathBuf {
    data_dir.join(LOG_FILE)
}

/// Send all tracing output to `<data_dir>/dynapsy.log`. The terminal belongs
/// to the TUI, so nothing is written to stdout or stderr.
pub fn init(data_dir: &Path, log_level: &str) -> Result<()> {
    fs::create_dir_all(data_dir)
        .with_context(|| format!("creating data directory {}", data_dir.display()))?;
    let path = log_path(data_dir);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("opening log file {}", path.display()))?;

    let env_value = std::env::var(LOG_ENV).ok();
    let filter = build_filter(env_value.as_deref(), log_level);
    let file_layer = fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .try_init()
        .context("installing tracing subscriber")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_value_overrides_config() {
        assert_eq!(build_filter(Some("debug"), "warn").to_string(), "debug");
        assert_eq!(build_filter(None, "warn").to_string(), "warn");
        assert_eq!(build_filter(Some("  "), "warn").to_string(), "warn");
    }

    #[test]
    fn invalid_directive_falls_back_to_info() {
        assert_eq!(build_filter(None, "dynapsy=loud").to_string(), "info");
    }

    #[test]
    fn log_file_lives_in_data_dir() {
        let dir = tempfile::TempDir::new().unwrap();
        assert_eq!(log_path(dir.path()), dir.path().join("dynapsy.log"));
    }
}
