pub mod projection;
pub mod query;

pub use projection::{DomainEvent, ProjectionDelivery, Reservation, WindowStore};
pub use query::{Entity, Filter, FilterOp, FilterValue, Query, QuerySource, RawEntity};
