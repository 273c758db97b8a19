//! Daily-rotating file sink and its configuration builder.
//!
//! `RotationConfig` is the merged record handed to the rolling engine:
//! defaults overlaid with destination, caller options, and an optional
//! filename segment, in that order. The resulting sink name is
//! `file:<extname>`, so two sinks with the same extension name cannot
//! coexist; the logger replaces the older one on registration.

use crate::error::{LoggerError, SinkError};
use crate::format;
use crate::level::Level;
use crate::rotation::LogRotator;
use crate::sink::{LogRecord, Sink, SinkFlags};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::PathBuf;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};

/// How often the rolling engine switches to a new file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatePattern {
    /// A new file every day.
    #[default]
    Daily,
    /// A new file every hour.
    Hourly,
    /// A single file, never switched on time.
    Never,
}

/// Finished configuration owned by one rotating file sink.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RotationConfig {
    /// Absolute destination directory.
    pub destination: PathBuf,
    /// Optional custom filename segment, the `<segment>` of
    /// `<segment>.<date>.<extname>.log`.
    pub file_segment: Option<String>,
    /// Distinguishing extension name, the `<extname>` of the filename and
    /// of the sink name `file:<extname>`.
    pub extname: String,
    /// Rotation cadence.
    pub date_pattern: DatePattern,
    /// Size ceiling in bytes before maintenance renames the current file.
    pub max_size: u64,
    /// Retention window in days; also caps the number of kept daily files.
    pub retention_days: u32,
    /// Whether archived files should be compressed by the rotation engine.
    pub zipped: bool,
    /// Maximum verbosity admitted by the sink.
    pub level: Level,
    /// Whether runtime level changes apply to the sink.
    pub can_change_level: bool,
    /// Write record messages as-is, without timestamp/label decoration.
    /// Used by the access-log sink, whose lines arrive pre-formatted.
    pub raw_lines: bool,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            destination: PathBuf::from("."),
            file_segment: None,
            extname: "combined".to_string(),
            date_pattern: DatePattern::default(),
            max_size: 20 * 1024 * 1024,
            retention_days: 14,
            zipped: true,
            level: Level::Debug,
            can_change_level: true,
            raw_lines: false,
        }
    }
}

impl RotationConfig {
    /// Overlay defaults with a validated destination, caller options, and
    /// the filename segment override.
    pub fn merged(destination: PathBuf, options: &RotationOptions) -> Self {
        let defaults = Self::default();

        Self {
            destination,
            file_segment: options.filename.clone().filter(|s| !s.trim().is_empty()),
            extname: options.extname.clone().unwrap_or(defaults.extname),
            date_pattern: options.date_pattern.unwrap_or(defaults.date_pattern),
            max_size: options.max_size.unwrap_or(defaults.max_size),
            retention_days: options.retention_days.unwrap_or(defaults.retention_days),
            zipped: options.zipped.unwrap_or(defaults.zipped),
            level: options.level.unwrap_or(defaults.level),
            can_change_level: options
                .can_change_level
                .unwrap_or(defaults.can_change_level),
            raw_lines: false,
        }
    }

    /// Registered sink name for this configuration.
    pub fn sink_name(&self) -> String {
        format!("file:{}", self.extname)
    }

    /// Path the current log file resolves to right now.
    pub fn current_log_path(&self) -> PathBuf {
        let date = match self.date_pattern {
            DatePattern::Daily => Some(Utc::now().format("%Y-%m-%d").to_string()),
            DatePattern::Hourly => Some(Utc::now().format("%Y-%m-%d-%H").to_string()),
            DatePattern::Never => None,
        };

        let name = [
            self.file_segment.clone(),
            date,
            Some(format!("{}.log", self.extname)),
        ]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(".");

        self.destination.join(name)
    }

    /// Maintenance rotator matching this configuration.
    pub fn rotator(&self) -> LogRotator {
        LogRotator::new(self.retention_days, self.max_size)
    }
}

/// Caller-supplied overrides for [`RotationConfig`]; unset fields keep
/// their documented defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RotationOptions {
    /// Destination directory (defaults to the current working directory).
    pub destination: Option<PathBuf>,
    /// Custom filename segment.
    pub filename: Option<String>,
    /// Distinguishing extension name.
    pub extname: Option<String>,
    /// Rotation cadence.
    pub date_pattern: Option<DatePattern>,
    /// Size ceiling in bytes.
    pub max_size: Option<u64>,
    /// Retention window in days.
    pub retention_days: Option<u32>,
    /// Compress archived files.
    pub zipped: Option<bool>,
    /// Minimum admitted verbosity.
    pub level: Option<Level>,
    /// Allow runtime level changes.
    pub can_change_level: Option<bool>,
    /// Request-header allowlist for the access-log integration.
    pub xheaders: Option<Vec<String>>,
}

/// File sink writing through the rolling engine's non-blocking worker.
///
/// The worker guard lives as long as the sink; dropping the sink flushes
/// buffered lines.
pub struct RotatingFileSink {
    name: String,
    config: RotationConfig,
    writer: NonBlocking,
    _guard: WorkerGuard,
    flags: SinkFlags,
}

impl RotatingFileSink {
    /// Build the rolling appender described by `config` and wrap it in a
    /// sink. Fails when the engine cannot create the initial file.
    pub fn new(config: RotationConfig) -> Result<Self, LoggerError> {
        let name = config.sink_name();

        let mut builder = RollingFileAppender::builder()
            .rotation(match config.date_pattern {
                DatePattern::Daily => Rotation::DAILY,
                DatePattern::Hourly => Rotation::HOURLY,
                DatePattern::Never => Rotation::NEVER,
            })
            .filename_suffix(format!("{}.log", config.extname))
            .max_log_files(config.retention_days.max(1) as usize);

        if let Some(segment) = &config.file_segment {
            builder = builder.filename_prefix(segment.clone());
        }

        let appender =
            builder
                .build(&config.destination)
                .map_err(|err| LoggerError::SinkRegistration {
                    name: name.clone(),
                    reason: err.to_string(),
                })?;

        let (writer, guard) = tracing_appender::non_blocking(appender);
        let flags = SinkFlags::new(config.level, true, config.can_change_level);

        Ok(Self {
            name,
            config,
            writer,
            _guard: guard,
            flags,
        })
    }

    /// The merged configuration this sink was built from.
    pub fn config(&self) -> &RotationConfig {
        &self.config
    }
}

impl Sink for RotatingFileSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn write(&self, record: &LogRecord) -> Result<(), SinkError> {
        let line = if self.config.raw_lines {
            record.message.clone()
        } else {
            format::render_line(record, false)
        };

        let mut writer = self.writer.clone();
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(())
    }

    fn level(&self) -> Level {
        self.flags.level()
    }

    fn set_level(&self, level: Level) {
        self.flags.set_level(level);
    }

    fn is_silent(&self) -> bool {
        self.flags.is_silent()
    }

    fn set_silent(&self, silent: bool) {
        self.flags.set_silent(silent);
    }

    fn handles_exceptions(&self) -> bool {
        self.flags.handles_exceptions()
    }

    fn set_handle_exceptions(&self, enabled: bool) {
        self.flags.set_handle_exceptions(enabled);
    }

    fn can_change_level(&self) -> bool {
        self.flags.can_change_level()
    }
}
