use crate::error::Result;
use crate::time::Timestamp;
use crate::types::SharePriceMovementId;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;

/// A domain event carried by the bus
///
/// `EVENT_TYPE` is the name routing functions are registered under.
pub trait DomainEvent: Serialize + DeserializeOwned + Send + Sync + 'static {
    const EVENT_TYPE: &'static str;
}

/// Delivers an event to the projection instance with the given identity
///
/// Implementations instantiate an empty projection first when the
/// identity has not been persisted yet.
pub trait ProjectionDelivery<E: DomainEvent>: Send + Sync {
    type Id;

    fn deliver(&self, id: &Self::Id, event: &E) -> Result<()>;

    /// Deliver `event` to every id in `ids`.
    ///
    /// The default delivers one id at a time. Stores with transactions
    /// override it so a failure leaves none of the ids updated.
    fn deliver_all(&self, ids: &[Self::Id], event: &E) -> Result<()> {
        for id in ids {
            self.deliver(id, event)?;
        }
        Ok(())
    }
}

impl<E: DomainEvent, T: ProjectionDelivery<E> + ?Sized> ProjectionDelivery<E> for Arc<T> {
    type Id = T::Id;

    fn deliver(&self, id: &Self::Id, event: &E) -> Result<()> {
        (**self).deliver(id, event)
    }

    fn deliver_all(&self, ids: &[Self::Id], event: &E) -> Result<()> {
        (**self).deliver_all(ids, event)
    }
}

/// Outcome of [`WindowStore::reserve_window`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reservation {
    /// The share already had a window open at the given time
    Existing(SharePriceMovementId),
    /// The candidate was persisted
    Created(SharePriceMovementId),
}

impl Reservation {
    pub fn id(&self) -> &SharePriceMovementId {
        match self {
            Reservation::Existing(id) | Reservation::Created(id) => id,
        }
    }

    pub fn into_id(self) -> SharePriceMovementId {
        match self {
            Reservation::Existing(id) | Reservation::Created(id) => id,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, Reservation::Created(_))
    }
}

/// Identity-keyed window creation
pub trait WindowStore: Send + Sync {
    /// Persist an empty window unless one with the same identity exists.
    ///
    /// Returns `true` when this call created it.
    fn create_if_absent(&self, id: &SharePriceMovementId) -> Result<bool>;

    /// Compare-and-create: the first window of `candidate.share` open at
    /// `now`, or `candidate` persisted empty when there is none.
    ///
    /// The check and the insert are one atomic step for every writer of
    /// the store, including other processes.
    fn reserve_window(
        &self,
        candidate: &SharePriceMovementId,
        now: &Timestamp,
    ) -> Result<Reservation>;
}

impl<T: WindowStore + ?Sized> WindowStore for Arc<T> {
    fn create_if_absent(&self, id: &SharePriceMovementId) -> Result<bool> {
        (**self).create_if_absent(id)
    }

    fn reserve_window(
        &self,
        candidate: &SharePriceMovementId,
        now: &Timestamp,
    ) -> Result<Reservation> {
        (**self).reserve_window(candidate, now)
    }
}
