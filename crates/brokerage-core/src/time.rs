//! Timestamp and duration arithmetic
//!
//! Both types follow the protobuf well-known layout: whole seconds plus a
//! nanosecond remainder. A `Timestamp` keeps `nanos` in `[0, 1e9)`. A
//! `Duration` may be negative; its `nanos` always carries the sign of its
//! `seconds` (or of the whole value when `seconds == 0`), so comparing the
//! two fields lexicographically matches comparing the total nanoseconds.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Neg;
use std::sync::Arc;

pub const NANOS_PER_SECOND: i32 = 1_000_000_000;

const NANOS_PER_SECOND_I128: i128 = NANOS_PER_SECOND as i128;

/// A point in time, seconds and nanoseconds since the Unix epoch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp {
    pub seconds: i64,
    pub nanos: i32,
}

impl Timestamp {
    /// Build a timestamp, carrying any nanosecond overflow into seconds
    pub fn new(seconds: i64, nanos: i32) -> Self {
        Self::from_nanos(seconds as i128 * NANOS_PER_SECOND_I128 + nanos as i128)
    }

    pub fn from_unix_seconds(seconds: i64) -> Self {
        Self { seconds, nanos: 0 }
    }

    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self {
            seconds: dt.timestamp(),
            nanos: dt.timestamp_subsec_nanos() as i32,
        }
    }

    /// Convert back to a chrono timestamp (None when out of chrono's range)
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.seconds, self.nanos as u32)
    }

    pub fn as_nanos(&self) -> i128 {
        self.seconds as i128 * NANOS_PER_SECOND_I128 + self.nanos as i128
    }

    fn from_nanos(total: i128) -> Self {
        Self {
            seconds: total.div_euclid(NANOS_PER_SECOND_I128) as i64,
            nanos: total.rem_euclid(NANOS_PER_SECOND_I128) as i32,
        }
    }

    /// `self - other` as a normalized duration.
    ///
    /// The raw field differences can disagree in sign (e.g. `+1s -0.5e9ns`);
    /// a single borrow or carry of one second fixes that, because both
    /// operands keep `nanos` in `[0, 1e9)`.
    pub fn subtract(&self, other: &Timestamp) -> Duration {
        let mut seconds = self.seconds - other.seconds;
        let mut nanos = self.nanos - other.nanos;

        if seconds > 0 && nanos < 0 {
            seconds -= 1;
            nanos += NANOS_PER_SECOND;
        } else if seconds < 0 && nanos > 0 {
            seconds += 1;
            nanos -= NANOS_PER_SECOND;
        }

        Duration { seconds, nanos }
    }

    /// `self + duration`
    pub fn add(&self, duration: &Duration) -> Timestamp {
        Self::from_nanos(self.as_nanos() + duration.as_nanos())
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_datetime() {
            Some(dt) => write!(f, "{}", dt.to_rfc3339()),
            None => write!(f, "{}.{:09}", self.seconds, self.nanos),
        }
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::from_datetime(dt)
    }
}

/// A signed span of time
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Duration {
    pub seconds: i64,
    pub nanos: i32,
}

impl Duration {
    pub const ZERO: Duration = Duration {
        seconds: 0,
        nanos: 0,
    };

    /// Build a duration from possibly unnormalized parts
    pub fn new(seconds: i64, nanos: i32) -> Self {
        Self::from_nanos(seconds as i128 * NANOS_PER_SECOND_I128 + nanos as i128)
    }

    pub fn from_secs(seconds: i64) -> Self {
        Self { seconds, nanos: 0 }
    }

    pub fn from_millis(millis: i64) -> Self {
        Self::from_nanos(millis as i128 * 1_000_000)
    }

    /// Truncating division keeps the remainder's sign equal to the quotient's
    pub fn from_nanos(total: i128) -> Self {
        Self {
            seconds: (total / NANOS_PER_SECOND_I128) as i64,
            nanos: (total % NANOS_PER_SECOND_I128) as i32,
        }
    }

    pub fn as_nanos(&self) -> i128 {
        self.seconds as i128 * NANOS_PER_SECOND_I128 + self.nanos as i128
    }

    pub fn is_negative(&self) -> bool {
        self.seconds < 0 || (self.seconds == 0 && self.nanos < 0)
    }

    /// Strictly longer than `other`.
    ///
    /// Seconds decide first; only equal seconds fall through to nanos.
    pub fn greater_than(&self, other: &Duration) -> bool {
        if self.seconds != other.seconds {
            return self.seconds > other.seconds;
        }
        self.nanos > other.nanos
    }
}

impl Neg for Duration {
    type Output = Duration;

    fn neg(self) -> Duration {
        Duration {
            seconds: -self.seconds,
            nanos: -self.nanos,
        }
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.is_negative() { "-" } else { "" };
        write!(
            f,
            "{}{}.{:09}s",
            sign,
            self.seconds.unsigned_abs(),
            self.nanos.unsigned_abs()
        )
    }
}

impl From<std::time::Duration> for Duration {
    fn from(d: std::time::Duration) -> Self {
        Self::from_nanos(d.as_nanos() as i128)
    }
}

/// Source of "now" for routing decisions
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

/// Wall clock backed by `chrono::Utc::now()`
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_datetime(Utc::now())
    }
}

/// Clock that only moves when told to
///
/// Used for deterministic replays and tests of window expiry.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<Timestamp>,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn set(&self, now: Timestamp) {
        *self.now.lock() = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock();
        *now = now.add(&by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        *self.now.lock()
    }
}
