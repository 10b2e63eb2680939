use crate::config::LoggingConfig;
use crate::constants::LOG_TIMESTAMP_FORMAT;
use anyhow::{Context, Result};
use chrono::Utc;
use log::LevelFilter;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Application logger behind the `log` facade.
///
/// Every formatted line is kept in memory; when logging is enabled lines are
/// also written to the configured file, or stderr without one.
#[derive(Clone)]
pub struct Logger {
    logs: Arc<Mutex<Vec<String>>>,
    level: LevelFilter,
    enabled: bool,
    file: Option<PathBuf>,
}

impl Logger {
    pub fn from_config(config: &LoggingConfig) -> Result<Self> {
        Ok(Self {
            logs: Arc::new(Mutex::new(Vec::new())),
            level: config.level_filter()?,
            enabled: config.enabled,
            file: config.file.clone(),
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn has_file_writer(&self) -> bool {
        self.enabled && self.file.is_some()
    }

    /// Build the fern dispatch for this logger without installing it.
    pub fn dispatch(&self) -> Result<fern::Dispatch> {
        let buffer = Arc::clone(&self.logs);

        let mut dispatch = fern::Dispatch::new()
            .format(|out, message, record| {
                out.finish(format_args!(
                    "[{}] {:<5} {}: {}",
                    Utc::now().format(LOG_TIMESTAMP_FORMAT),
                    record.level(),
                    record.target(),
                    message
                ))
            })
            .level(self.level)
            .chain(fern::Output::call(move |record| {
                if let Ok(mut logs) = buffer.lock() {
                    logs.push(record.args().to_string());
                }
            }));

        if self.enabled {
            dispatch = match &self.file {
                Some(path) => dispatch.chain(
                    fern::log_file(path).with_context(|| format!("Failed to open log file: {}", path.display()))?,
                ),
                None => dispatch.chain(std::io::stderr()),
            };
        }

        Ok(dispatch)
    }

    /// Install as the global `log` logger. Fails if one is already set.
    pub fn install(&self) -> Result<()> {
        self.dispatch()?
            .apply()
            .map_err(|_| anyhow::anyhow!("A global logger is already installed"))
    }

    /// Get all logs sorted by date (newest first)
    pub fn get_logs(&self) -> Vec<String> {
        if let Ok(logs) = self.logs.lock() {
            let mut sorted_logs = logs.clone();
            sorted_logs.reverse();
            sorted_logs
        } else {
            Vec::new()
        }
    }

    /// Clear all logs
    pub fn clear(&self) {
        if let Ok(mut logs) = self.logs.lock() {
            logs.clear();
        }
    }
}
