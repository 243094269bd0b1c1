use crate::time::Timestamp;
use crate::traits::DomainEvent;
use crate::types::money::Money;
use crate::types::share::{ShareId, SharePrice};
use serde::{Deserialize, Serialize};

/// Event identifier - strictly monotonic per bus
pub type EventId = u64;

/// Market data update: prices for a batch of shares observed at one moment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharePricesUpdated {
    pub when_updated: Timestamp,
    pub prices: Vec<SharePrice>,
}

impl SharePricesUpdated {
    pub fn new(when_updated: Timestamp, prices: Vec<SharePrice>) -> Self {
        Self {
            when_updated,
            prices,
        }
    }

    /// First price listed for `share` in this batch
    pub fn price_for(&self, share: &ShareId) -> Option<&Money> {
        self.prices
            .iter()
            .find(|p| &p.share == share)
            .map(|p| &p.price)
    }

    /// Shares in batch order, duplicates included
    pub fn shares(&self) -> Vec<ShareId> {
        self.prices.iter().map(|p| p.share.clone()).collect()
    }
}

impl DomainEvent for SharePricesUpdated {
    const EVENT_TYPE: &'static str = "share_prices_updated";
}
