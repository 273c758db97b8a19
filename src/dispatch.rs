//! Named-sink registry and record fan-out.

use crate::sink::{LogRecord, Sink, SinkHandle};
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Registry of named sinks with fan-out dispatch.
///
/// At most one sink is registered under a given name; inserting a second
/// returns the sink it displaced so the caller can log the replacement.
#[derive(Default)]
pub struct SinkDispatcher {
    sinks: RwLock<HashMap<String, SinkHandle>>,
}

impl SinkDispatcher {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a sink under its own name, returning any sink previously
    /// held under that name.
    pub fn insert(&self, sink: SinkHandle) -> Option<SinkHandle> {
        self.write_sinks().insert(sink.name().to_string(), sink)
    }

    /// Remove and return the sink registered under `name`.
    pub fn remove(&self, name: &str) -> Option<SinkHandle> {
        self.write_sinks().remove(name)
    }

    /// Handle to the sink registered under `name`.
    pub fn get(&self, name: &str) -> Option<SinkHandle> {
        self.read_sinks().get(name).cloned()
    }

    /// Whether a sink is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.read_sinks().contains_key(name)
    }

    /// Names of all registered sinks.
    pub fn names(&self) -> Vec<String> {
        self.read_sinks().keys().cloned().collect()
    }

    /// Number of registered sinks.
    pub fn len(&self) -> usize {
        self.read_sinks().len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.read_sinks().is_empty()
    }

    /// Fan a record out to the targeted sink, or to every sink when no
    /// target is given. Each sink filters by its own threshold and silent
    /// flag. Returns whether at least one sink accepted the record.
    ///
    /// A failing sink write is reported on raw stderr, since the normal
    /// reporting path is the sink itself; it does not stop fan-out.
    pub fn dispatch(&self, record: &LogRecord, target: Option<&str>) -> bool {
        self.dispatch_where(record, |sink| {
            target.is_none_or(|name| sink.name() == name)
        })
    }

    /// Fan a record out to the sinks that opted into exception handling.
    pub fn dispatch_exceptions(&self, record: &LogRecord) -> bool {
        self.dispatch_where(record, |sink| sink.handles_exceptions())
    }

    fn dispatch_where(&self, record: &LogRecord, selected: impl Fn(&dyn Sink) -> bool) -> bool {
        let mut delivered = false;

        for sink in self.read_sinks().values() {
            if !selected(sink.as_ref()) || !sink.admits(record.level) {
                continue;
            }

            match sink.write(record) {
                Ok(()) => delivered = true,
                Err(err) => {
                    eprintln!("rotolog: sink {:?} write failed: {err}", sink.name());
                }
            }
        }

        delivered
    }

    /// Run `apply` on every registered sink, or only the named one.
    /// Returns the number of sinks visited.
    pub fn for_each(&self, target: Option<&str>, mut apply: impl FnMut(&dyn Sink)) -> usize {
        let mut visited = 0;

        for sink in self.read_sinks().values() {
            if target.is_none_or(|name| sink.name() == name) {
                apply(sink.as_ref());
                visited += 1;
            }
        }

        visited
    }

    // A poisoned registry lock only means another thread panicked while
    // holding it; the map itself is still consistent for our usage.
    fn read_sinks(&self) -> RwLockReadGuard<'_, HashMap<String, SinkHandle>> {
        self.sinks.read().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn write_sinks(&self) -> RwLockWriteGuard<'_, HashMap<String, SinkHandle>> {
        self.sinks.write().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SinkError;
    use crate::level::Level;
    use crate::sink::SinkFlags;
    use std::sync::{Arc, Mutex};

    struct CaptureSink {
        name: String,
        flags: SinkFlags,
        records: Mutex<Vec<LogRecord>>,
    }

    impl CaptureSink {
        fn new(name: &str, level: Level) -> Arc<Self> {
            Arc::new(Self {
                name: name.to_string(),
                flags: SinkFlags::new(level, false, true),
                records: Mutex::new(Vec::new()),
            })
        }

        fn messages(&self) -> Vec<String> {
            self.records
                .lock()
                .unwrap()
                .iter()
                .map(|r| r.message.clone())
                .collect()
        }
    }

    impl Sink for CaptureSink {
        fn name(&self) -> &str {
            &self.name
        }

        fn write(&self, record: &LogRecord) -> Result<(), SinkError> {
            self.records.lock().unwrap().push(record.clone());
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

    fn record(level: Level, message: &str) -> LogRecord {
        LogRecord {
            level,
            message: message.to_string(),
            metadata: None,
        }
    }

    #[test]
    fn test_insert_replaces_same_name() {
        let dispatcher = SinkDispatcher::new();
        let first = CaptureSink::new("file:combined", Level::Debug);
        let second = CaptureSink::new("file:combined", Level::Debug);

        assert!(dispatcher.insert(first).is_none());
        let displaced = dispatcher.insert(second);
        assert!(displaced.is_some());
        assert_eq!(dispatcher.len(), 1);
    }

    #[test]
    fn test_dispatch_fans_out_to_all_sinks() {
        let dispatcher = SinkDispatcher::new();
        let a = CaptureSink::new("a", Level::Debug);
        let b = CaptureSink::new("b", Level::Debug);
        dispatcher.insert(a.clone());
        dispatcher.insert(b.clone());

        assert!(dispatcher.dispatch(&record(Level::Info, "hi"), None));
        assert_eq!(a.messages(), vec!["hi"]);
        assert_eq!(b.messages(), vec!["hi"]);
    }

    #[test]
    fn test_dispatch_respects_target_name() {
        let dispatcher = SinkDispatcher::new();
        let a = CaptureSink::new("a", Level::Debug);
        let b = CaptureSink::new("b", Level::Debug);
        dispatcher.insert(a.clone());
        dispatcher.insert(b.clone());

        assert!(dispatcher.dispatch(&record(Level::Info, "only-a"), Some("a")));
        assert_eq!(a.messages(), vec!["only-a"]);
        assert!(b.messages().is_empty());

        assert!(!dispatcher.dispatch(&record(Level::Info, "nobody"), Some("missing")));
    }

    #[test]
    fn test_dispatch_respects_sink_threshold() {
        let dispatcher = SinkDispatcher::new();
        let quiet = CaptureSink::new("quiet", Level::Warning);
        dispatcher.insert(quiet.clone());

        assert!(!dispatcher.dispatch(&record(Level::Debug, "too verbose"), None));
        assert!(dispatcher.dispatch(&record(Level::Error, "admitted"), None));
        assert_eq!(quiet.messages(), vec!["admitted"]);
    }

    #[test]
    fn test_dispatch_exceptions_filters_on_flag() {
        let dispatcher = SinkDispatcher::new();
        let plain = CaptureSink::new("plain", Level::Debug);
        let catcher = CaptureSink::new("catcher", Level::Debug);
        catcher.set_handle_exceptions(true);
        dispatcher.insert(plain.clone());
        dispatcher.insert(catcher.clone());

        assert!(dispatcher.dispatch_exceptions(&record(Level::Emergency, "panic")));
        assert!(plain.messages().is_empty());
        assert_eq!(catcher.messages(), vec!["panic"]);
    }

    #[test]
    fn test_for_each_counts_matches() {
        let dispatcher = SinkDispatcher::new();
        dispatcher.insert(CaptureSink::new("a", Level::Debug));
        dispatcher.insert(CaptureSink::new("b", Level::Debug));

        assert_eq!(dispatcher.for_each(None, |_| {}), 2);
        assert_eq!(dispatcher.for_each(Some("a"), |_| {}), 1);
        assert_eq!(dispatcher.for_each(Some("zzz"), |_| {}), 0);
    }
}
