use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use tracing::Level;
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};

use tripwire_api as api;
use api::config::Config;

/// Parse a level name, anything unknown means info
pub fn parse_level(level: &str) -> Level {
    level.parse::<Level>().unwrap_or(Level::INFO)
}

/// Subscriber used before the configured one is installed, e.g. while reading the config file
pub fn bootstrap_subscriber() -> impl tracing::Subscriber + Send + Sync {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(Level::INFO)
        .finish()
}

fn make_writer(cfg: &Config) -> Result<(BoxMakeWriter, bool)> {
    if cfg.log_file.is_empty() {
        return Ok((BoxMakeWriter::new(std::io::stdout), true));
    }

    let path = Path::new(&cfg.log_file);
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)?;
        }
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| anyhow!("Failed to open log file {}: {}", cfg.log_file, e))?;
    let file = Arc::new(file);

    if cfg.log_console {
        Ok((BoxMakeWriter::new(std::io::stdout.and(file)), false))
    } else {
        Ok((BoxMakeWriter::new(file), false))
    }
}

/// Install the global subscriber, must be called once
pub fn init(cfg: &Config) -> Result<()> {
    let level = parse_level(cfg.effective_log_level());
    let (writer, ansi) = make_writer(cfg)?;

    let builder = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(writer)
        .with_ansi(ansi)
        .with_thread_names(true);

    match cfg.log_format.as_str() {
        "text" => builder.try_init(),
        _ => builder.json().flatten_event(true).try_init(),
    }
    .map_err(|e| anyhow!("Failed to initialize logging: {}", e))
}
