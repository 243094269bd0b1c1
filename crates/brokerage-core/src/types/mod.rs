pub mod context;
pub mod event;
pub mod money;
pub mod movement;
pub mod share;

pub use context::ActorContext;
pub use event::{EventId, SharePricesUpdated};
pub use money::Money;
pub use movement::{
    MovementSummary, PriceAtTime, SharePriceMovementId, SharePriceMovementPerMinute,
};
pub use share::{ShareId, SharePrice};
