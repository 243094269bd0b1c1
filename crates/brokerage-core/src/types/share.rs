use crate::types::money::Money;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier of a tradable share
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShareId(String);

impl ShareId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<[u8]> for ShareId {
    fn as_ref(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl From<&str> for ShareId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ShareId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for ShareId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One entry of a market update batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharePrice {
    pub share: ShareId,
    pub price: Money,
}

impl SharePrice {
    pub fn new(share: impl Into<ShareId>, price: Money) -> Self {
        Self {
            share: share.into(),
            price,
        }
    }
}
