//! rotolog - syslog-style leveled logging with rotating file sinks
//!
//! A thin control layer over a sink dispatcher: eight syslog levels with
//! runtime level changes (global or scoped to one named sink), a console
//! sink with colorized output, daily-rotating file sinks built through a
//! validated configuration record, and an HTTP access-log integration
//! that streams Combined-Log-Format lines into their own rotating file.
//!
//! # Architecture
//!
//! - [`Logger`]: the level controller; one owned instance per component
//! - [`SinkDispatcher`]: named-sink registry and record fan-out
//! - [`ConsoleSink`] / [`RotatingFileSink`]: the two sink kinds
//! - [`RotationConfig`] / [`RotationOptions`]: rotating-sink defaults and
//!   caller overrides
//! - [`LogRotator`]: size and retention maintenance for log directories
//! - [`RequestLogger`]: access-log lines into a dedicated rotating sink
//!
//! # Example
//!
//! ```
//! use rotolog::Logger;
//!
//! let log = Logger::new();
//! log.info("service starting").warning("cache is cold");
//! log.set_level("warning", None).ok();
//! assert_eq!(log.current_level(), rotolog::Level::Warning);
//! ```

pub mod dispatch;
pub mod error;
pub mod file_sink;
pub mod format;
pub mod http;
pub mod level;
pub mod logger;
pub mod rotation;
pub mod sink;

// Re-export commonly used types for convenience
pub use dispatch::SinkDispatcher;
pub use error::{LoggerError, SinkError};
pub use file_sink::{DatePattern, RotatingFileSink, RotationConfig, RotationOptions};
pub use format::BannerStyle;
pub use self::http::{AccessLogStream, RequestLogger};
pub use level::Level;
pub use logger::Logger;
pub use rotation::LogRotator;
pub use sink::{ConsoleSink, LogMessage, LogRecord, Sink, SinkHandle, CONSOLE_SINK};
