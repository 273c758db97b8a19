//! The level controller: leveled logging methods, runtime level changes,
//! sink toggles, and rotating-sink registration.

use crate::dispatch::SinkDispatcher;
use crate::error::LoggerError;
use crate::file_sink::{RotatingFileSink, RotationConfig, RotationOptions};
use crate::format::{self, BannerStyle};
use crate::http::{AccessLogStream, RequestLogger};
use crate::level::Level;
use crate::sink::{ConsoleSink, LogMessage, LogRecord, SinkHandle, CONSOLE_SINK};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Leveled logger in front of a console sink and any number of named
/// rotating file sinks.
///
/// Construct one per component with [`Logger::new`]; there is no global
/// instance. All failure paths degrade to a diagnostic recorded through
/// the logger itself plus a sentinel return value; nothing here panics or
/// aborts the caller.
///
/// ```no_run
/// use rotolog::Logger;
/// use std::path::Path;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), rotolog::LoggerError> {
/// let log = Logger::new();
/// log.info("starting up").notice("listening on :8080");
/// log.add_rotating_sink(Some(Path::new("/var/log/app")), None, None)
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct Logger {
    dispatcher: SinkDispatcher,
    current: AtomicU8,
    // Serializes sink registration: the stat/access checks and the
    // remove/insert of add_rotating_sink must not interleave between two
    // in-flight calls for the same name.
    registration: Mutex<()>,
}

impl Logger {
    /// Logger with a console sink pre-registered and the starting level
    /// taken from the environment (`APP_ENV=production` starts at notice,
    /// anything else at debug).
    pub fn new() -> Self {
        let level = Level::default_for_env();
        let dispatcher = SinkDispatcher::new();
        dispatcher.insert(Arc::new(ConsoleSink::new(level)));

        Self {
            dispatcher,
            current: AtomicU8::new(level.rank()),
            registration: Mutex::new(()),
        }
    }

    /// Logger with no sinks at all; backs the secondary access-log logger.
    pub(crate) fn detached() -> Self {
        Self {
            dispatcher: SinkDispatcher::new(),
            current: AtomicU8::new(Level::Debug.rank()),
            registration: Mutex::new(()),
        }
    }

    pub(crate) fn dispatcher(&self) -> &SinkDispatcher {
        &self.dispatcher
    }

    /// The controller's current level.
    pub fn current_level(&self) -> Level {
        Level::from_rank(self.current.load(Ordering::Relaxed))
    }

    /// Names of the registered sinks.
    pub fn sink_names(&self) -> Vec<String> {
        self.dispatcher.names()
    }

    /// Handle to the sink registered under `name`.
    pub fn sink(&self, name: &str) -> Option<SinkHandle> {
        self.dispatcher.get(name)
    }

    /// Register a custom sink under its own name, replacing (with a
    /// warning) any sink already held under that name.
    pub fn add_sink(&self, sink: SinkHandle) -> &Self {
        if self.dispatcher.insert(sink).is_some() {
            self.warning("replaced an existing sink during registration");
        }
        self
    }

    /// Remove and return the sink registered under `name`.
    pub fn remove_sink(&self, name: &str) -> Option<SinkHandle> {
        self.dispatcher.remove(name)
    }

    // ---------------------------------------------------------------
    // Leveled dispatch
    // ---------------------------------------------------------------

    /// Log a message under a symbolic level name, optionally with
    /// structured metadata and scoped to one named sink.
    ///
    /// An unknown level name never fails hard: it degrades to an
    /// error-level diagnostic about the invalid name and returns `false`.
    /// A `true` return means the record was forwarded to at least one
    /// admitting sink, not that it reached stable storage.
    pub fn log(
        &self,
        level_name: &str,
        message: impl Into<LogMessage>,
        metadata: Option<Value>,
        target_sink: Option<&str>,
    ) -> bool {
        let Some(level) = Level::from_name(level_name) else {
            self.emit(
                Level::Error,
                format!("cannot log with unknown level {level_name:?}").into(),
                None,
                None,
            );
            return false;
        };

        self.emit(level, message.into(), metadata, target_sink)
    }

    /// Log at a typed level. Same delivery contract as [`Logger::log`].
    pub fn log_at(
        &self,
        level: Level,
        message: impl Into<LogMessage>,
        metadata: Option<Value>,
        target_sink: Option<&str>,
    ) -> bool {
        self.emit(level, message.into(), metadata, target_sink)
    }

    fn emit(
        &self,
        level: Level,
        message: LogMessage,
        metadata: Option<Value>,
        target_sink: Option<&str>,
    ) -> bool {
        let record = LogRecord {
            level,
            message: message.into_text(),
            metadata,
        };

        self.dispatcher.dispatch(&record, target_sink)
    }

    /// Log at emergency level.
    pub fn emergency(&self, message: impl Into<LogMessage>) -> &Self {
        self.emit(Level::Emergency, message.into(), None, None);
        self
    }

    /// Log at alert level.
    pub fn alert(&self, message: impl Into<LogMessage>) -> &Self {
        self.emit(Level::Alert, message.into(), None, None);
        self
    }

    /// Log at critical level.
    pub fn critical(&self, message: impl Into<LogMessage>) -> &Self {
        self.emit(Level::Critical, message.into(), None, None);
        self
    }

    /// Log at error level.
    pub fn error(&self, message: impl Into<LogMessage>) -> &Self {
        self.emit(Level::Error, message.into(), None, None);
        self
    }

    /// Log at warning level.
    pub fn warning(&self, message: impl Into<LogMessage>) -> &Self {
        self.emit(Level::Warning, message.into(), None, None);
        self
    }

    /// Log at notice level.
    pub fn notice(&self, message: impl Into<LogMessage>) -> &Self {
        self.emit(Level::Notice, message.into(), None, None);
        self
    }

    /// Log at info level.
    pub fn info(&self, message: impl Into<LogMessage>) -> &Self {
        self.emit(Level::Info, message.into(), None, None);
        self
    }

    /// Log at debug level.
    pub fn debug(&self, message: impl Into<LogMessage>) -> &Self {
        self.emit(Level::Debug, message.into(), None, None);
        self
    }

    // ---------------------------------------------------------------
    // Runtime level control
    // ---------------------------------------------------------------

    /// Step the current level one rank toward less or more verbose,
    /// clamped at emergency and debug. Sinks that allow runtime changes
    /// (all of them, or just the targeted one) follow the new level.
    pub fn shift_level(&self, less_verbose: bool, target_sink: Option<&str>) -> &Self {
        let from = self.current_level();
        let to = if less_verbose {
            from.less_verbose()
        } else {
            from.more_verbose()
        };

        self.apply_level(from, to, target_sink);
        self
    }

    /// Jump directly to a named level. Unknown names leave the current
    /// rank untouched, record a warning, and return the error; an unknown
    /// target sink is a logged no-op, not a failure.
    pub fn set_level(
        &self,
        level_name: &str,
        target_sink: Option<&str>,
    ) -> Result<&Self, LoggerError> {
        let Some(to) = Level::from_name(level_name) else {
            self.warning(format!(
                "unknown log level {level_name:?}; keeping {}",
                self.current_level()
            ));
            return Err(LoggerError::InvalidLevel(level_name.to_string()));
        };

        self.apply_level(self.current_level(), to, target_sink);
        Ok(self)
    }

    fn apply_level(&self, from: Level, to: Level, target_sink: Option<&str>) {
        if let Some(name) = target_sink {
            if !self.dispatcher.contains(name) {
                self.warning(format!("no sink named {name:?}; level unchanged"));
                return;
            }
        }

        self.current.store(to.rank(), Ordering::Relaxed);
        self.dispatcher.for_each(target_sink, |sink| {
            if sink.can_change_level() {
                sink.set_level(to);
            }
        });

        // Best effort: at notice rank this transition may itself be
        // filtered out by the new level.
        self.notice(format!("log level changed from {from} to {to}"));
    }

    // ---------------------------------------------------------------
    // Sink toggles
    // ---------------------------------------------------------------

    /// Unmute (or with `false`, mute) the console sink. Returns whether a
    /// console sink was found and updated.
    pub fn enable_console(&self, status: bool) -> bool {
        let Some(sink) = self.dispatcher.get(CONSOLE_SINK) else {
            return false;
        };

        sink.set_silent(!status);
        if status {
            self.info("console sink enabled");
        }

        true
    }

    /// Mute the console sink. The intent is logged before the sink goes
    /// silent.
    pub fn disable_console(&self) -> bool {
        self.info("disabling console sink");
        self.enable_console(false)
    }

    /// Toggle exception routing on all sinks, or just the named one.
    /// Logs one message per affected sink; an unknown target records a
    /// warning and returns `false`.
    pub fn enable_exceptions(&self, status: bool, target_sink: Option<&str>) -> bool {
        if let Some(name) = target_sink {
            if !self.dispatcher.contains(name) {
                self.warning(format!("no sink named {name:?}; exception handling unchanged"));
                return false;
            }
        }

        let mut affected = Vec::new();
        self.dispatcher.for_each(target_sink, |sink| {
            sink.set_handle_exceptions(status);
            affected.push(sink.name().to_string());
        });

        let state = if status { "enabled" } else { "disabled" };
        for name in &affected {
            self.info(format!("exception handling {state} on sink {name:?}"));
        }

        !affected.is_empty()
    }

    /// Disable exception routing on all sinks, or just the named one.
    pub fn disable_exceptions(&self, target_sink: Option<&str>) -> bool {
        self.enable_exceptions(false, target_sink)
    }

    /// Route a panic/uncaught-failure report at emergency level to the
    /// sinks that opted into exception handling. Suitable for calling
    /// from a `std::panic` hook installed by the embedding application.
    pub fn panic_message(&self, message: &str) -> bool {
        let record = LogRecord {
            level: Level::Emergency,
            message: message.to_string(),
            metadata: None,
        };

        self.dispatcher.dispatch_exceptions(&record)
    }

    // ---------------------------------------------------------------
    // Rotating file sinks
    // ---------------------------------------------------------------

    /// Register a daily-rotating file sink.
    ///
    /// The destination (explicit argument, or `options.destination`, or
    /// the current working directory with a warning) must exist, be a
    /// directory, and be readable and writable; each check failure
    /// rejects with [`LoggerError::InvalidDestination`] and mirrors the
    /// message at error level. A sink already registered under the
    /// resolved name is removed first with a warning. On success the
    /// resolved log path is logged and the new sink handle returned.
    pub async fn add_rotating_sink(
        &self,
        destination: Option<&Path>,
        filename: Option<&str>,
        options: Option<RotationOptions>,
    ) -> Result<SinkHandle, LoggerError> {
        let _guard = self.registration.lock().await;
        let config = self
            .build_config(destination, filename, options.unwrap_or_default(), false)
            .await?;
        self.register_file_sink(&self.dispatcher, config)
    }

    /// Rotating sink capturing warnings and above into
    /// `<date>.error.log` files, pinned against runtime level changes.
    pub async fn enable_error_rotation(
        &self,
        options: Option<RotationOptions>,
    ) -> Result<SinkHandle, LoggerError> {
        let mut options = options.unwrap_or_default();
        options.extname = Some("error".to_string());
        options.level = Some(Level::Warning);
        options.can_change_level = Some(false);

        self.add_rotating_sink(None, None, Some(options)).await
    }

    /// Rotating access-log sink writing raw `<date>.access.log` lines
    /// through a dedicated secondary logger. Returns the request logger
    /// bound to that stream; the `xheaders` option selects request
    /// headers appended to each line.
    pub async fn enable_request_rotation(
        &self,
        options: Option<RotationOptions>,
    ) -> Result<RequestLogger, LoggerError> {
        let mut options = options.unwrap_or_default();
        options.extname = Some("access".to_string());
        options.level = Some(Level::Info);
        options.can_change_level = Some(false);
        let xheaders = options.xheaders.take().unwrap_or_default();

        let _guard = self.registration.lock().await;
        let config = self.build_config(None, None, options, true).await?;

        let secondary = Arc::new(Self::detached());
        self.register_file_sink(secondary.dispatcher(), config)?;

        Ok(RequestLogger::new(AccessLogStream::new(secondary), xheaders))
    }

    async fn build_config(
        &self,
        destination: Option<&Path>,
        filename: Option<&str>,
        mut options: RotationOptions,
        raw_lines: bool,
    ) -> Result<RotationConfig, LoggerError> {
        let requested = destination
            .map(Path::to_path_buf)
            .or_else(|| options.destination.take());
        let destination = self.resolve_destination(requested)?;

        // Stat check: the destination must exist and be a directory.
        let metadata = match tokio::fs::metadata(&destination).await {
            Ok(metadata) => metadata,
            Err(err) => {
                return Err(self.destination_error(destination, format!("cannot stat: {err}")));
            }
        };
        if !metadata.is_dir() {
            return Err(self.destination_error(destination, "not a directory".to_string()));
        }

        // Access check: readable and writable.
        if let Err(err) = tokio::fs::read_dir(&destination).await {
            return Err(self.destination_error(destination, format!("not readable: {err}")));
        }
        if metadata.permissions().readonly() {
            return Err(self.destination_error(destination, "not writable".to_string()));
        }

        match filename {
            Some(name) if !name.trim().is_empty() => {
                options.filename = Some(name.to_string());
            }
            Some(_) => {
                self.warning("ignoring blank filename override; keeping the default naming");
            }
            None => {}
        }

        let mut config = RotationConfig::merged(destination, &options);
        config.raw_lines = raw_lines;
        Ok(config)
    }

    fn resolve_destination(&self, requested: Option<PathBuf>) -> Result<PathBuf, LoggerError> {
        let path = match requested {
            Some(path) if !path.as_os_str().is_empty() => path,
            _ => {
                self.warning(
                    "no destination directory given; defaulting to the current working directory",
                );
                PathBuf::from(".")
            }
        };

        std::path::absolute(&path)
            .map_err(|err| self.destination_error(path, format!("cannot resolve: {err}")))
    }

    fn destination_error(&self, path: PathBuf, reason: String) -> LoggerError {
        let err = LoggerError::InvalidDestination { path, reason };
        self.error(err.to_string());
        err
    }

    fn register_file_sink(
        &self,
        dispatcher: &SinkDispatcher,
        config: RotationConfig,
    ) -> Result<SinkHandle, LoggerError> {
        let name = config.sink_name();
        let log_path = config.current_log_path();

        // Build before swapping: an engine failure must leave any sink
        // already registered under this name in place.
        let sink = RotatingFileSink::new(config).map_err(|err| {
            self.error(format!("cannot register rotating sink: {err}"));
            err
        })?;

        let handle: SinkHandle = Arc::new(sink);
        if dispatcher.insert(Arc::clone(&handle)).is_some() {
            self.warning(format!("replacing existing sink {name:?}"));
        }
        self.info(format!(
            "rotating sink {name:?} added; logging to {}",
            log_path.display()
        ));

        Ok(handle)
    }

    // ---------------------------------------------------------------
    // Decorative output
    // ---------------------------------------------------------------

    /// Log the three-line banner block (rule, delimited uppercased
    /// message, rule) at info level, unstyled.
    pub fn banner(&self, message: &str) -> &Self {
        for line in format::render_banner(message, &BannerStyle::default()) {
            self.info(line);
        }
        self
    }

    /// Banner with terminal styling. An unsupported foreground/background
    /// pair records a warning and falls back to the plain three lines.
    pub fn banner_styled(&self, message: &str, style: &BannerStyle) -> &Self {
        let lines = format::render_banner(message, style);

        match format::resolve_banner_style(style) {
            Some(term_style) => {
                for line in lines {
                    self.info(term_style.apply_to(&line).to_string());
                }
            }
            None => {
                self.warning(format!(
                    "unsupported banner colors {:?} on {:?}; printing plain",
                    style.foreground, style.background
                ));
                for line in lines {
                    self.info(line);
                }
            }
        }

        self
    }

    /// Notice-level deprecation pointer from an old method name to its
    /// replacement.
    pub fn deprecated(&self, old: &str, new: &str, extra: Option<&str>) -> &Self {
        let mut message = format!("[DEPRECATED] {old} is deprecated, use {new} instead.");
        if let Some(extra) = extra {
            message.push(' ');
            message.push_str(extra);
        }

        self.notice(message)
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}
