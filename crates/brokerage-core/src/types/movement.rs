//! Share price movement windows
//!
//! A window accumulates the price samples of one share over a fixed
//! activity time. Windows are never closed explicitly: a window is OPEN
//! while its age is below the activity time and EXPIRED afterwards, and
//! the router only notices the transition when it next looks.

use crate::error::Result;
use crate::time::{Duration, Timestamp};
use crate::traits::Entity;
use crate::types::event::SharePricesUpdated;
use crate::types::money::Money;
use crate::types::share::ShareId;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Identity of one aggregation window
///
/// Windows of the same share differ by `when_created`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SharePriceMovementId {
    pub share: ShareId,
    pub activity_time: Duration,
    pub when_created: Timestamp,
}

impl SharePriceMovementId {
    pub fn new(share: ShareId, activity_time: Duration, when_created: Timestamp) -> Self {
        Self {
            share,
            activity_time,
            when_created,
        }
    }

    /// Stable storage key, unique per identity
    pub fn key(&self) -> String {
        format!(
            "{}@{}.{:09}+{}.{:09}",
            self.share,
            self.when_created.seconds,
            self.when_created.nanos,
            self.activity_time.seconds,
            self.activity_time.nanos
        )
    }

    pub fn window_end(&self) -> Timestamp {
        self.when_created.add(&self.activity_time)
    }

    pub fn age_at(&self, now: &Timestamp) -> Duration {
        now.subtract(&self.when_created)
    }

    /// OPEN while `activity_time > now - when_created`
    pub fn is_open_at(&self, now: &Timestamp) -> bool {
        self.activity_time.greater_than(&self.age_at(now))
    }

    /// Whether `time` falls in `[when_created, when_created + activity_time]`
    pub fn covers(&self, time: &Timestamp) -> bool {
        *time >= self.when_created && *time <= self.window_end()
    }
}

impl fmt::Display for SharePriceMovementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

/// One observed price sample
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceAtTime {
    pub price: Money,
    pub time: Timestamp,
}

impl PriceAtTime {
    /// `share`'s price in `event`, stamped with the update time
    pub fn from_update(share: &ShareId, event: &SharePricesUpdated) -> Option<Self> {
        event.price_for(share).map(|price| Self {
            price: price.clone(),
            time: event.when_updated,
        })
    }
}

/// Projection state: the samples of one share within one window
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharePriceMovementPerMinute {
    pub id: SharePriceMovementId,
    pub share: ShareId,
    #[serde(default)]
    pub price_at_time: Vec<PriceAtTime>,
}

impl Entity for SharePriceMovementPerMinute {
    const ENTITY_TYPE: &'static str = "share_price_movement_per_minute";
}

impl SharePriceMovementPerMinute {
    /// Empty projection for a freshly assigned window
    pub fn new(id: SharePriceMovementId) -> Self {
        let share = id.share.clone();
        Self {
            id,
            share,
            price_at_time: Vec::new(),
        }
    }

    /// Append this share's price from the batch.
    ///
    /// Returns the appended sample, or `None` when the batch carries no
    /// price for this share (the projection is left untouched).
    pub fn apply(&mut self, event: &SharePricesUpdated) -> Option<PriceAtTime> {
        let point = PriceAtTime::from_update(&self.share, event)?;
        self.price_at_time.push(point.clone());
        Some(point)
    }

    pub fn movement_point_count(&self) -> usize {
        self.price_at_time.len()
    }

    pub fn is_open_at(&self, now: &Timestamp) -> bool {
        self.id.is_open_at(now)
    }

    /// Every sample lies inside the window span
    pub fn is_within_window(&self) -> bool {
        self.price_at_time.iter().all(|p| self.id.covers(&p.time))
    }

    /// Open/close/high/low statistics, `None` for an empty window
    pub fn summary(&self) -> Result<Option<MovementSummary>> {
        let (first, last) = match (self.price_at_time.first(), self.price_at_time.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Ok(None),
        };

        let mut high = &first.price;
        let mut low = &first.price;
        for point in &self.price_at_time[1..] {
            if point.price.try_cmp(high)? == Ordering::Greater {
                high = &point.price;
            }
            if point.price.try_cmp(low)? == Ordering::Less {
                low = &point.price;
            }
        }

        Ok(Some(MovementSummary {
            open: first.price.clone(),
            close: last.price.clone(),
            high: high.clone(),
            low: low.clone(),
            change: last.price.try_sub(&first.price)?,
            point_count: self.price_at_time.len(),
            first_time: first.time,
            last_time: last.time,
        }))
    }
}

/// Price movement statistics of one window
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementSummary {
    pub open: Money,
    pub close: Money,
    pub high: Money,
    pub low: Money,
    /// `close - open`
    pub change: Money,
    pub point_count: usize,
    pub first_time: Timestamp,
    pub last_time: Timestamp,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::share::SharePrice;

    fn window(created: i64) -> SharePriceMovementId {
        SharePriceMovementId::new(
            ShareId::new("ACME"),
            Duration::from_secs(60),
            Timestamp::from_unix_seconds(created),
        )
    }

    fn update(at: i64, prices: &[(&str, i64)]) -> SharePricesUpdated {
        SharePricesUpdated::new(
            Timestamp::from_unix_seconds(at),
            prices
                .iter()
                .map(|(share, units)| SharePrice::new(*share, Money::new("EUR", *units, 0)))
                .collect(),
        )
    }

    #[test]
    fn test_window_open_then_expired() {
        let id = window(1_000);

        assert!(id.is_open_at(&Timestamp::from_unix_seconds(1_000)));
        assert!(id.is_open_at(&Timestamp::from_unix_seconds(1_030)));
        assert!(id.is_open_at(&Timestamp::new(1_059, 999_999_999)));
        // Age equal to the activity time is already expired
        assert!(!id.is_open_at(&Timestamp::from_unix_seconds(1_060)));
        assert!(!id.is_open_at(&Timestamp::from_unix_seconds(1_061)));
    }

    #[test]
    fn test_keys_differ_by_creation_time() {
        assert_ne!(window(1_000).key(), window(1_001).key());
        assert_eq!(window(1_000).key(), "ACME@1000.000000000+60.000000000");
    }

    #[test]
    fn test_apply_appends_in_arrival_order() {
        let mut projection = SharePriceMovementPerMinute::new(window(1_000));

        let p1 = projection.apply(&update(1_010, &[("ACME", 10), ("INIT", 99)]));
        let p2 = projection.apply(&update(1_020, &[("ACME", 12)]));

        assert_eq!(p1.unwrap().price, Money::new("EUR", 10, 0));
        assert_eq!(p2.unwrap().time, Timestamp::from_unix_seconds(1_020));
        assert_eq!(
            projection.price_at_time,
            vec![
                PriceAtTime {
                    price: Money::new("EUR", 10, 0),
                    time: Timestamp::from_unix_seconds(1_010),
                },
                PriceAtTime {
                    price: Money::new("EUR", 12, 0),
                    time: Timestamp::from_unix_seconds(1_020),
                },
            ]
        );
        assert!(projection.is_within_window());
    }

    #[test]
    fn test_apply_ignores_batches_without_share() {
        let mut projection = SharePriceMovementPerMinute::new(window(1_000));
        assert!(projection.apply(&update(1_010, &[("INIT", 5)])).is_none());
        assert_eq!(projection.movement_point_count(), 0);
    }

    #[test]
    fn test_late_sample_is_kept_but_flagged() {
        let mut projection = SharePriceMovementPerMinute::new(window(1_000));
        projection.apply(&update(1_075, &[("ACME", 10)]));

        assert_eq!(projection.movement_point_count(), 1);
        assert!(!projection.is_within_window());
    }

    #[test]
    fn test_summary() {
        let mut projection = SharePriceMovementPerMinute::new(window(1_000));
        assert!(projection.summary().unwrap().is_none());

        for (at, price) in [(1_001, 10), (1_002, 14), (1_003, 8), (1_004, 11)] {
            projection.apply(&update(at, &[("ACME", price)]));
        }

        let summary = projection.summary().unwrap().unwrap();
        assert_eq!(summary.open, Money::new("EUR", 10, 0));
        assert_eq!(summary.close, Money::new("EUR", 11, 0));
        assert_eq!(summary.high, Money::new("EUR", 14, 0));
        assert_eq!(summary.low, Money::new("EUR", 8, 0));
        assert_eq!(summary.change, Money::new("EUR", 1, 0));
        assert_eq!(summary.point_count, 4);
        assert_eq!(summary.last_time, Timestamp::from_unix_seconds(1_004));
    }
}
