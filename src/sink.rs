//! Sink contract and the built-in console sink.

use crate::error::SinkError;
use crate::format;
use crate::level::Level;
use console::Term;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;

/// Well-known name of the always-present console sink.
pub const CONSOLE_SINK: &str = "console";

/// Shared handle to a registered sink.
pub type SinkHandle = Arc<dyn Sink>;

/// A single log entry on its way to the sinks.
#[derive(Debug, Clone)]
pub struct LogRecord {
    /// Severity of the entry.
    pub level: Level,
    /// Rendered message text.
    pub message: String,
    /// Optional structured metadata, appended to the formatted line.
    pub metadata: Option<Value>,
}

/// Message payload accepted by the leveled logging methods.
///
/// Structured values are serialized to text before dispatch.
#[derive(Debug, Clone)]
pub enum LogMessage {
    /// Plain text.
    Text(String),
    /// A structured value (object, array, ...).
    Structured(Value),
}

impl LogMessage {
    /// Flatten to the text that will be dispatched.
    pub fn into_text(self) -> String {
        match self {
            Self::Text(text) => text,
            Self::Structured(value) => value.to_string(),
        }
    }
}

impl From<&str> for LogMessage {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for LogMessage {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&String> for LogMessage {
    fn from(text: &String) -> Self {
        Self::Text(text.clone())
    }
}

impl From<Value> for LogMessage {
    fn from(value: Value) -> Self {
        Self::Structured(value)
    }
}

/// A named output destination for formatted log lines.
///
/// Sinks carry their own minimum-verbosity level and mutable `silent` /
/// `handle_exceptions` flags, toggled at runtime by the level controller.
pub trait Sink: Send + Sync {
    /// Registered name of this sink.
    fn name(&self) -> &str;

    /// Write one record. Filtering has already happened by the time this
    /// is called.
    fn write(&self, record: &LogRecord) -> Result<(), SinkError>;

    /// Maximum verbosity this sink admits.
    fn level(&self) -> Level;

    /// Change the admitted verbosity.
    fn set_level(&self, level: Level);

    /// Whether the sink is muted.
    fn is_silent(&self) -> bool;

    /// Mute or unmute the sink.
    fn set_silent(&self, silent: bool);

    /// Whether uncaught-failure reports are routed to this sink.
    fn handles_exceptions(&self) -> bool;

    /// Toggle uncaught-failure routing.
    fn set_handle_exceptions(&self, enabled: bool);

    /// Whether runtime level changes apply to this sink.
    fn can_change_level(&self) -> bool;

    /// Whether a record at `level` should be written: not muted, and the
    /// record is at most as verbose as the sink's threshold.
    fn admits(&self, level: Level) -> bool {
        !self.is_silent() && level.rank() <= self.level().rank()
    }
}

/// Mutable per-sink state shared by the sink implementations.
#[derive(Debug)]
pub(crate) struct SinkFlags {
    level: AtomicU8,
    silent: AtomicBool,
    handle_exceptions: AtomicBool,
    can_change_level: bool,
}

impl SinkFlags {
    pub(crate) fn new(level: Level, handle_exceptions: bool, can_change_level: bool) -> Self {
        Self {
            level: AtomicU8::new(level.rank()),
            silent: AtomicBool::new(false),
            handle_exceptions: AtomicBool::new(handle_exceptions),
            can_change_level,
        }
    }

    pub(crate) fn level(&self) -> Level {
        Level::from_rank(self.level.load(Ordering::Relaxed))
    }

    pub(crate) fn set_level(&self, level: Level) {
        self.level.store(level.rank(), Ordering::Relaxed);
    }

    pub(crate) fn is_silent(&self) -> bool {
        self.silent.load(Ordering::Relaxed)
    }

    pub(crate) fn set_silent(&self, silent: bool) {
        self.silent.store(silent, Ordering::Relaxed);
    }

    pub(crate) fn handles_exceptions(&self) -> bool {
        self.handle_exceptions.load(Ordering::Relaxed)
    }

    pub(crate) fn set_handle_exceptions(&self, enabled: bool) {
        self.handle_exceptions.store(enabled, Ordering::Relaxed);
    }

    pub(crate) const fn can_change_level(&self) -> bool {
        self.can_change_level
    }
}

/// Console sink: colorized lines on stderr.
pub struct ConsoleSink {
    term: Term,
    flags: SinkFlags,
}

impl ConsoleSink {
    /// Console sink admitting everything up to `level`.
    pub fn new(level: Level) -> Self {
        Self {
            term: Term::stderr(),
            flags: SinkFlags::new(level, true, true),
        }
    }
}

impl Sink for ConsoleSink {
    fn name(&self) -> &str {
        CONSOLE_SINK
    }

    fn write(&self, record: &LogRecord) -> Result<(), SinkError> {
        self.term.write_line(&format::render_line(record, true))?;
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
