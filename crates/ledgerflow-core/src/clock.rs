//! Time sources.
//!
//! Window checks compare against `Clock::now`. Implementations must never
//! go backwards; the engines also clamp any regression they observe.

use ledgerflow_types::Timestamp;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Supplies the current timestamp.
pub trait Clock {
    /// Get the current timestamp
    fn now(&self) -> Timestamp;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

impl<C: Clock + ?Sized> Clock for Rc<C> {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    secs: AtomicU64,
}

impl ManualClock {
    /// Create a clock reading `start`.
    pub fn new(start: Timestamp) -> Self {
        Self {
            secs: AtomicU64::new(start.as_secs()),
        }
    }

    /// Move forward by `secs`.
    pub fn advance(&self, secs: u64) -> Timestamp {
        let prev = self
            .secs
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |s| Some(s.saturating_add(secs)))
            .unwrap_or_else(|s| s);
        Timestamp::from_secs(prev.saturating_add(secs))
    }

    /// Jump to `to`. Earlier targets are ignored.
    pub fn set(&self, to: Timestamp) -> Timestamp {
        let prev = self.secs.fetch_max(to.as_secs(), Ordering::SeqCst);
        Timestamp::from_secs(prev.max(to.as_secs()))
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_secs(self.secs.load(Ordering::SeqCst))
    }
}

/// Wall-clock seconds since the Unix epoch.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Timestamp::from_secs(secs)
    }
}
