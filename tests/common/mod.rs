//! Common test utilities for integration tests
//!
//! Provides the in-memory capture sink used to assert on what the logger
//! actually dispatched.

use rotolog::{Level, LogRecord, Sink, SinkError};
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Arc, Mutex};

/// Sink that records every entry it receives.
pub struct CaptureSink {
    name: String,
    level: AtomicU8,
    silent: AtomicBool,
    handle_exceptions: AtomicBool,
    records: Mutex<Vec<LogRecord>>,
}

impl CaptureSink {
    pub fn new(name: &str, level: Level) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            level: AtomicU8::new(level.rank()),
            silent: AtomicBool::new(false),
            handle_exceptions: AtomicBool::new(false),
            records: Mutex::new(Vec::new()),
        })
    }

    pub fn records(&self) -> Vec<LogRecord> {
        self.records.lock().unwrap().clone()
    }

    #[allow(dead_code)]
    pub fn messages(&self) -> Vec<String> {
        self.records()
            .into_iter()
            .map(|record| record.message)
            .collect()
    }

    pub fn messages_at(&self, level: Level) -> Vec<String> {
        self.records()
            .into_iter()
            .filter(|record| record.level == level)
            .map(|record| record.message)
            .collect()
    }

    #[allow(dead_code)]
    pub fn clear(&self) {
        self.records.lock().unwrap().clear();
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
        Level::from_rank(self.level.load(Ordering::Relaxed))
    }

    fn set_level(&self, level: Level) {
        self.level.store(level.rank(), Ordering::Relaxed);
    }

    fn is_silent(&self) -> bool {
        self.silent.load(Ordering::Relaxed)
    }

    fn set_silent(&self, silent: bool) {
        self.silent.store(silent, Ordering::Relaxed);
    }

    fn handles_exceptions(&self) -> bool {
        self.handle_exceptions.load(Ordering::Relaxed)
    }

    fn set_handle_exceptions(&self, enabled: bool) {
        self.handle_exceptions.store(enabled, Ordering::Relaxed);
    }

    fn can_change_level(&self) -> bool {
        true
    }
}
