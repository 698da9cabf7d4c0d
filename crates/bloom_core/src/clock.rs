//! Injected time source.
//!
//! # Responsibility
//! - Provide wall-clock timestamps for document metadata.
//! - Provide monotonic instants for debounce deadlines.
//!
//! # Invariants
//! - `ManualClock` only moves when `advance`/`set` is called; both readings
//!   move together.

use chrono::{DateTime, Utc};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Source of wall-clock and monotonic time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
    fn instant(&self) -> Instant;
}

/// Process clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn instant(&self) -> Instant {
        Instant::now()
    }
}

#[derive(Debug, Clone, Copy)]
struct ManualReading {
    wall: DateTime<Utc>,
    mono: Instant,
}

/// Test clock advanced by hand.
#[derive(Debug)]
pub struct ManualClock {
    reading: Mutex<ManualReading>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            reading: Mutex::new(ManualReading {
                wall: start,
                mono: Instant::now(),
            }),
        }
    }

    /// Moves both readings forward by `step`.
    pub fn advance(&self, step: Duration) {
        let mut reading = self.reading.lock().unwrap_or_else(PoisonError::into_inner);
        reading.mono += step;
        if let Ok(delta) = chrono::Duration::from_std(step) {
            reading.wall += delta;
        }
    }

    /// Shorthand for `advance(Duration::from_millis(ms))`.
    pub fn advance_ms(&self, ms: u64) {
        self.advance(Duration::from_millis(ms));
    }

    fn read(&self) -> ManualReading {
        *self.reading.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.read().wall
    }

    fn instant(&self) -> Instant {
        self.read().mono
    }
}
