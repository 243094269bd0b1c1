//! Brokerage: per-minute share price movement projections
//!
//! Market data arrives as `SharePricesUpdated` batches. The
//! [`SharePriceMovementRouter`] decides which movement window each share's
//! price belongs to, and the [`EventBus`] delivers the batch once to every
//! window it names:
//! - **Reader**: typed, filtered projection queries under an actor context
//! - **Router**: reuse the share's open window, or mint a new one
//! - **Bus**: one route per event type, sync and concurrent dispatch
//! - **Store**: SQLite persistence of windows and their samples
//!
//! # Quick Start
//!
//! ```no_run
//! use brokerage::prelude::*;
//!
//! # fn main() -> Result<()> {
//! let store = Arc::new(SqliteMovementStore::open(StoreConfig::new("./data/movements.db".into()))?);
//! let router = SharePriceMovementRouter::new(
//!     Arc::clone(&store),
//!     SystemClock,
//!     RouterConfig::default(),
//! )?;
//!
//! let mut bus = EventBus::new(Arc::new(SystemClock));
//! bus.route::<SharePricesUpdated, _, _>(
//!     move |event, ctx| router.route(event, ctx),
//!     Arc::clone(&store),
//! )?;
//!
//! let update = SharePricesUpdated::new(
//!     Timestamp::from_unix_seconds(1_700_000_000),
//!     vec![SharePrice::new("ACME", Money::new("EUR", 12, 500_000_000))],
//! );
//! let report = bus.emit(update, "feed")?;
//! println!("delivered to {:?}", report.targets);
//! # Ok(())
//! # }
//! ```

pub mod bus;
pub mod event_format;
pub mod prelude;
pub mod reader;
pub mod router;

// Re-export core types
pub use brokerage_core::{
    config::{RouterConfig, StoreConfig, SynchronousMode},
    error::{BrokerageError, Result},
    time::{Clock, Duration, ManualClock, SystemClock, Timestamp},
    traits::{
        DomainEvent, Entity, Filter, FilterOp, FilterValue, ProjectionDelivery, Query,
        QuerySource, RawEntity, Reservation, WindowStore,
    },
    types::{
        ActorContext, EventId, Money, MovementSummary, PriceAtTime, ShareId, SharePrice,
        SharePriceMovementId, SharePriceMovementPerMinute, SharePricesUpdated,
    },
    LockManager,
};

// Re-export implementations
pub use brokerage_sqlite::SqliteMovementStore;

// Re-export main types from this crate
pub use bus::{DispatchReport, EventBus};
pub use event_format::{Event, EventCodec, EventMetadata, JsonCodec};
pub use reader::ProjectionReader;
pub use router::SharePriceMovementRouter;
