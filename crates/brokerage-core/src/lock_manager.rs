//! Striped per-share locks
//!
//! Serializes routing decisions for the same share. Share ids hash to a
//! fixed set of stripes; all stripes needed by one event are taken in
//! ascending stripe order, so two multi-share batches can never deadlock.

use crate::error::{BrokerageError, Result};
use crate::observe;
use crate::types::ShareId;
use parking_lot::{Mutex, MutexGuard};
use std::collections::BTreeSet;
use std::time::{Duration, Instant};
use xxhash_rust::xxh3::xxh3_64;

/// Default lock acquisition timeout (5 seconds)
pub const DEFAULT_LOCK_TIMEOUT_MS: u64 = 5000;

/// Stripe lock table keyed by share id
///
/// Two shares may collide on one stripe; that only costs some parallelism,
/// never correctness.
///
/// # Example
///
/// ```ignore
/// let locks = LockManager::new(256, Duration::from_secs(5))?;
///
/// // Stripes are sorted before locking, whatever the batch order
/// let _guard = locks.acquire_shares(&[ShareId::new("MSFT"), ShareId::new("AAPL")])?;
/// ```
pub struct LockManager {
    stripes: Vec<Mutex<()>>,
    default_timeout: Duration,
}

/// Holds every stripe taken for one routing decision; released on drop
pub struct ShareLockGuard<'a> {
    _guards: Vec<MutexGuard<'a, ()>>,
}

impl ShareLockGuard<'_> {
    /// Number of distinct stripes held
    pub fn stripes_held(&self) -> usize {
        self._guards.len()
    }
}

impl LockManager {
    /// Fails with `Config` when `num_stripes` is 0
    pub fn new(num_stripes: usize, default_timeout: Duration) -> Result<Self> {
        if num_stripes == 0 {
            return Err(BrokerageError::Config(
                "lock stripe count must be positive".into(),
            ));
        }
        Ok(Self {
            stripes: (0..num_stripes).map(|_| Mutex::new(())).collect(),
            default_timeout,
        })
    }

    pub fn with_stripes(num_stripes: usize) -> Result<Self> {
        Self::new(num_stripes, Duration::from_millis(DEFAULT_LOCK_TIMEOUT_MS))
    }

    fn stripe_index(&self, key: &[u8]) -> usize {
        (xxh3_64(key) as usize) % self.stripes.len()
    }

    /// Lock every share of a batch with the default timeout
    pub fn acquire_shares(&self, shares: &[ShareId]) -> Result<ShareLockGuard<'_>> {
        self.acquire_keys(shares, self.default_timeout)
    }

    /// Lock the stripes of `keys` in ascending stripe order.
    ///
    /// Duplicate keys and keys sharing a stripe lock that stripe once.
    /// On timeout every stripe taken so far is released before returning
    /// `LockTimeout`.
    pub fn acquire_keys<K: AsRef<[u8]>>(
        &self,
        keys: &[K],
        timeout: Duration,
    ) -> Result<ShareLockGuard<'_>> {
        let started = Instant::now();
        let stripe_indices: BTreeSet<usize> =
            keys.iter().map(|k| self.stripe_index(k.as_ref())).collect();

        let mut guards = Vec::with_capacity(stripe_indices.len());
        for idx in stripe_indices {
            match self.stripes[idx].try_lock_for(timeout) {
                Some(guard) => guards.push(guard),
                None => {
                    return Err(BrokerageError::LockTimeout {
                        timeout_ms: timeout.as_millis() as u64,
                    })
                }
            }
        }

        observe::record_lock_wait(started.elapsed());
        Ok(ShareLockGuard { _guards: guards })
    }

    pub fn num_stripes(&self) -> usize {
        self.stripes.len()
    }

    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }
}
