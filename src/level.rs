//! Syslog level table and rank resolution.
//!
//! Ranks run from 0 (`Emergency`, most severe) to 7 (`Debug`, most
//! verbose). "More verbose" always means a numerically higher rank; a sink
//! configured at level `L` admits a record at level `R` when
//! `R.rank() <= L.rank()`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The eight syslog severity levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// System is unusable.
    Emergency,
    /// Action must be taken immediately.
    Alert,
    /// Critical conditions.
    Critical,
    /// Error conditions.
    Error,
    /// Warning conditions.
    Warning,
    /// Normal but significant condition.
    Notice,
    /// Informational messages.
    Info,
    /// Debug-level messages.
    Debug,
}

impl Level {
    /// All levels in rank order, most severe first.
    pub const ALL: [Self; 8] = [
        Self::Emergency,
        Self::Alert,
        Self::Critical,
        Self::Error,
        Self::Warning,
        Self::Notice,
        Self::Info,
        Self::Debug,
    ];

    /// Numeric rank: 0 = most severe, 7 = most verbose.
    pub const fn rank(self) -> u8 {
        self as u8
    }

    /// Level for a numeric rank, clamped into the valid range.
    pub const fn from_rank(rank: u8) -> Self {
        match rank {
            0 => Self::Emergency,
            1 => Self::Alert,
            2 => Self::Critical,
            3 => Self::Error,
            4 => Self::Warning,
            5 => Self::Notice,
            6 => Self::Info,
            _ => Self::Debug,
        }
    }

    /// Canonical lowercase identifier, e.g. `"warning"`.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Emergency => "emergency",
            Self::Alert => "alert",
            Self::Critical => "critical",
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Notice => "notice",
            Self::Info => "info",
            Self::Debug => "debug",
        }
    }

    /// Identifier handed to the dispatch engine. Matches the syslog table,
    /// which abbreviates two of the level names.
    pub const fn dispatch_key(self) -> &'static str {
        match self {
            Self::Emergency => "emerg",
            Self::Critical => "crit",
            other => other.name(),
        }
    }

    /// Case-insensitive lookup by canonical name or dispatch key.
    pub fn from_name(name: &str) -> Option<Self> {
        let lower = name.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|level| level.name() == lower || level.dispatch_key() == lower)
    }

    /// One step toward `Debug`, clamped at the top.
    pub const fn more_verbose(self) -> Self {
        Self::from_rank(self.rank().saturating_add(1))
    }

    /// One step toward `Emergency`, clamped at the bottom.
    pub const fn less_verbose(self) -> Self {
        Self::from_rank(self.rank().saturating_sub(1))
    }

    /// Starting level for the current environment: `Notice` when `APP_ENV`
    /// is `production`, `Debug` otherwise.
    pub fn default_for_env() -> Self {
        match std::env::var("APP_ENV") {
            Ok(env) if env == "production" => Self::Notice,
            _ => Self::Debug,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_round_trip() {
        for level in Level::ALL {
            assert_eq!(Level::from_rank(level.rank()), level);
        }
    }

    #[test]
    fn test_rank_order() {
        assert_eq!(Level::Emergency.rank(), 0);
        assert_eq!(Level::Debug.rank(), 7);
        assert!(Level::Emergency < Level::Debug);
        assert!(Level::Warning < Level::Info);
    }

    #[test]
    fn test_from_name_accepts_canonical_and_dispatch_keys() {
        assert_eq!(Level::from_name("warning"), Some(Level::Warning));
        assert_eq!(Level::from_name("critical"), Some(Level::Critical));
        assert_eq!(Level::from_name("crit"), Some(Level::Critical));
        assert_eq!(Level::from_name("emerg"), Some(Level::Emergency));
        assert_eq!(Level::from_name("EMERGENCY"), Some(Level::Emergency));
        assert_eq!(Level::from_name(" info "), Some(Level::Info));
        assert_eq!(Level::from_name("bogus"), None);
        assert_eq!(Level::from_name(""), None);
    }

    #[test]
    fn test_stepping_clamps_at_extremes() {
        assert_eq!(Level::Debug.more_verbose(), Level::Debug);
        assert_eq!(Level::Emergency.less_verbose(), Level::Emergency);
        assert_eq!(Level::Info.more_verbose(), Level::Debug);
        assert_eq!(Level::Info.less_verbose(), Level::Notice);
    }

    #[test]
    fn test_default_for_env() {
        temp_env::with_var("APP_ENV", Some("production"), || {
            assert_eq!(Level::default_for_env(), Level::Notice);
        });
        temp_env::with_var("APP_ENV", None::<&str>, || {
            assert_eq!(Level::default_for_env(), Level::Debug);
        });
        temp_env::with_var("APP_ENV", Some("staging"), || {
            assert_eq!(Level::default_for_env(), Level::Debug);
        });
    }

    #[test]
    fn test_serde_names() {
        let level: Level = serde_json::from_str("\"warning\"").unwrap();
        assert_eq!(level, Level::Warning);
        assert_eq!(serde_json::to_string(&Level::Notice).unwrap(), "\"notice\"");
    }
}
