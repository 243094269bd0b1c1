//! Brokerage Prelude
//!
//! ```
//! use brokerage::prelude::*;
//! ```

// Core types
pub use crate::{
    ActorContext, BrokerageError, Duration, EventId, Money, MovementSummary, PriceAtTime, Result,
    ShareId, SharePrice, SharePriceMovementId, SharePriceMovementPerMinute, SharePricesUpdated,
    Timestamp,
};

// Configs
pub use crate::{RouterConfig, StoreConfig, SynchronousMode};

// Traits
pub use crate::{
    Clock, DomainEvent, Entity, EventCodec, ProjectionDelivery, QuerySource, Reservation,
    WindowStore,
};

// Implementations
pub use crate::{
    EventBus, ManualClock, ProjectionReader, SharePriceMovementRouter, SqliteMovementStore,
    SystemClock,
};

// Queries
pub use crate::{Filter, FilterOp, FilterValue};

// Event format
pub use crate::{DispatchReport, Event, EventMetadata, JsonCodec};

// Re-export common external deps
pub use serde::{Deserialize, Serialize};
pub use std::sync::Arc;
pub use tracing;
