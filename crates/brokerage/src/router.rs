//! Share price movement router
//!
//! Decides, for every share in a `SharePricesUpdated` batch, which
//! movement window receives the price: the share's first OPEN window in
//! query order, or a freshly minted one when every existing window has
//! expired.
//!
//! Each decision runs under the share's stripe lock, which serializes
//! events routed through one router. Minting goes through
//! [`WindowStore::reserve_window`], which re-checks for an open window and
//! inserts atomically in the store, so routers in other processes sharing
//! the store converge on the same window too.

use crate::reader::ProjectionReader;
use brokerage_core::{
    observe, ActorContext, BrokerageError, Clock, Filter, LockManager, QuerySource, Reservation,
    Result, RouterConfig, ShareId, SharePriceMovementId, SharePriceMovementPerMinute,
    SharePricesUpdated, Timestamp, WindowStore,
};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Routing function for `SharePricesUpdated`
pub struct SharePriceMovementRouter<S, C> {
    reader: ProjectionReader<Arc<S>>,
    windows: Arc<S>,
    locks: LockManager,
    clock: C,
    config: RouterConfig,
}

impl<S, C> SharePriceMovementRouter<S, C>
where
    S: QuerySource + WindowStore,
    C: Clock,
{
    pub fn new(store: Arc<S>, clock: C, config: RouterConfig) -> Result<Self> {
        if config.activity_time_secs <= 0 {
            return Err(BrokerageError::Config(format!(
                "activity_time_secs must be positive, got {}",
                config.activity_time_secs
            )));
        }

        let locks = LockManager::new(config.lock_stripes, config.lock_timeout())?;

        Ok(Self {
            reader: ProjectionReader::new(Arc::clone(&store)),
            windows: store,
            locks,
            clock,
            config,
        })
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Target windows for `event`, one per distinct share.
    ///
    /// `now` is read once, after the share locks are held. Windows minted
    /// here already exist (empty) in the store when this returns.
    pub fn route(
        &self,
        event: &SharePricesUpdated,
        ctx: &ActorContext,
    ) -> Result<BTreeSet<SharePriceMovementId>> {
        ctx.validate()?;
        let started = Instant::now();

        let shares = event.shares();
        let _guard = self.locks.acquire_shares(&shares)?;
        let now = self.clock.now();

        let mut targets = BTreeSet::new();
        let mut minted = 0u64;
        for share in &shares {
            let id = match self.open_window(share, ctx, &now)? {
                Some(id) => {
                    debug!(share = %share, window = %id, "routing to open window");
                    id
                }
                None => {
                    let candidate = SharePriceMovementId::new(
                        share.clone(),
                        self.config.activity_time(),
                        now,
                    );
                    match self.windows.reserve_window(&candidate, &now)? {
                        Reservation::Created(id) => {
                            minted += 1;
                            info!(share = %share, window = %id, "minted movement window");
                            id
                        }
                        Reservation::Existing(id) => {
                            debug!(share = %share, window = %id, "another writer opened the window");
                            id
                        }
                    }
                }
            };
            targets.insert(id);
        }

        observe::record_route(started.elapsed(), minted);
        Ok(targets)
    }

    /// First window of `share`, in query order, still open at `now`
    fn open_window(
        &self,
        share: &ShareId,
        ctx: &ActorContext,
        now: &Timestamp,
    ) -> Result<Option<SharePriceMovementId>> {
        let existing: Vec<SharePriceMovementPerMinute> =
            self.reader.read(ctx, &[Filter::eq("share", share)])?;

        Ok(existing
            .into_iter()
            .map(|projection| projection.id)
            .find(|id| id.is_open_at(now)))
    }
}
