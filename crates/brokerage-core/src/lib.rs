//! Brokerage Core: types and traits for share price movement projections
//!
//! This crate defines the building blocks shared by the projection store,
//! the router and the event bus:
//! - Time arithmetic: protobuf-style timestamps and signed durations
//! - Domain types: shares, money, price samples, movement windows
//! - Entity and query traits: typed reads over a filtered query source
//! - Stripe locking: per-share serialization of routing decisions
//!
//! Key properties:
//! - Windows are addressed purely by identity (`SharePriceMovementId`)
//! - Window expiry is time driven and discovered lazily
//! - Window creation is idempotent on identity

pub mod config;
pub mod error;
pub mod lock_manager;
pub mod observe;
pub mod time;
pub mod traits;
pub mod types;

pub use config::{RouterConfig, StoreConfig, SynchronousMode};
pub use error::{BrokerageError, Result};
pub use lock_manager::LockManager;
pub use time::{Clock, Duration, ManualClock, SystemClock, Timestamp};
pub use traits::{
    DomainEvent, Entity, Filter, FilterOp, FilterValue, ProjectionDelivery, Query, QuerySource,
    RawEntity, Reservation, WindowStore,
};
pub use types::{
    ActorContext, EventId, Money, MovementSummary, PriceAtTime, ShareId, SharePrice,
    SharePriceMovementId, SharePriceMovementPerMinute, SharePricesUpdated,
};
