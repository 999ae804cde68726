//! Source of the server-side timestamp stamped onto submissions.

use std::fmt::Debug;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

/// Provides the current UTC time.
pub trait TimeProvider: Debug + Send + Sync + 'static {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemProvider;

impl SystemProvider {
    pub fn new() -> Self {
        Self
    }
}

impl TimeProvider for SystemProvider {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A time that only moves when told to, for tests.
#[derive(Debug)]
pub struct MockProvider {
    now: RwLock<DateTime<Utc>>,
}

impl MockProvider {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: RwLock::new(start),
        }
    }

    pub fn set(&self, time: DateTime<Utc>) {
        *self.now.write() = time;
    }

    /// Advance by `duration` and return the new time.
    pub fn inc(&self, duration: chrono::Duration) -> DateTime<Utc> {
        let mut now = self.now.write();
        *now += duration;
        *now
    }
}

impl TimeProvider for MockProvider {
    fn now(&self) -> DateTime<Utc> {
        *self.now.read()
    }
}
