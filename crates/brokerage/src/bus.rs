//! In-process event bus
//!
//! Each event type has exactly one route: a routing function that maps the
//! event to a set of projection identities, and a delivery that applies the
//! event to each of them. Events travel as encoded [`Event`] envelopes, so
//! [`EventBus::dispatch`] also accepts bytes produced elsewhere.
//!
//! # Example
//!
//! ```ignore
//! let mut bus = EventBus::new(Arc::new(SystemClock));
//! bus.route::<SharePricesUpdated, _, _>(
//!     move |event, ctx| router.route(event, ctx),
//!     Arc::clone(&store),
//! )?;
//!
//! let report = bus.emit(update, "feed")?;
//! ```

use crate::event_format::{Event, EventCodec, EventMetadata, JsonCodec};
use brokerage_core::{
    ActorContext, BrokerageError, Clock, DomainEvent, EventId, ProjectionDelivery, Result,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt::Display;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

type RouteHandler = Box<dyn Fn(&Event<serde_json::Value>) -> Result<Vec<String>> + Send + Sync>;

/// Outcome of dispatching one event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchReport {
    pub event_id: EventId,
    pub event_type: String,
    /// Keys of the projection instances the event was delivered to
    pub targets: Vec<String>,
}

/// Registry of routes keyed by event type
pub struct EventBus {
    routes: HashMap<String, RouteHandler>,
    codec: JsonCodec,
    clock: Arc<dyn Clock>,
    next_event_id: AtomicU64,
}

impl EventBus {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            routes: HashMap::new(),
            codec: JsonCodec,
            clock,
            next_event_id: AtomicU64::new(1),
        }
    }

    /// Register the route for `E`.
    ///
    /// `routing_fn` runs under the emitting actor's context; `delivery`
    /// receives the event for every distinct identity it returns in a
    /// single [`ProjectionDelivery::deliver_all`] call.
    pub fn route<E, F, D>(&mut self, routing_fn: F, delivery: D) -> Result<()>
    where
        E: DomainEvent,
        F: Fn(&E, &ActorContext) -> Result<BTreeSet<D::Id>> + Send + Sync + 'static,
        D: ProjectionDelivery<E> + 'static,
        D::Id: Ord + Display,
    {
        if self.routes.contains_key(E::EVENT_TYPE) {
            return Err(BrokerageError::InvalidState(format!(
                "Route for event type '{}' already registered",
                E::EVENT_TYPE
            )));
        }

        let handler: RouteHandler = Box::new(move |envelope| {
            let event: E = serde_json::from_value(envelope.payload.clone())
                .map_err(|e| BrokerageError::EventDecode(e.to_string()))?;
            let ctx = envelope.metadata.actor_context();

            let targets: Vec<D::Id> = routing_fn(&event, &ctx)?.into_iter().collect();
            let keys = targets.iter().map(|id| id.to_string()).collect();
            delivery.deliver_all(&targets, &event)?;
            Ok(keys)
        });

        self.routes.insert(E::EVENT_TYPE.to_string(), handler);
        Ok(())
    }

    /// Stamp, encode and dispatch one event
    pub fn emit<E: DomainEvent>(
        &self,
        event: E,
        actor_id: impl Into<String>,
    ) -> Result<DispatchReport> {
        let event_id = self.next_event_id.fetch_add(1, Ordering::SeqCst);
        let metadata = EventMetadata::new(event_id, actor_id, self.clock.now());
        let bytes = self
            .codec
            .encode(&Event::new(E::EVENT_TYPE, event, metadata))?;
        self.dispatch(&bytes)
    }

    /// Route and deliver an encoded envelope
    pub fn dispatch(&self, bytes: &[u8]) -> Result<DispatchReport> {
        let envelope: Event<serde_json::Value> = self.codec.decode(bytes)?;

        let handler = self.routes.get(&envelope.name).ok_or_else(|| {
            BrokerageError::EventDecode(format!("No route for event type '{}'", envelope.name))
        })?;

        let targets = handler(&envelope).map_err(|e| {
            warn!(
                event_id = envelope.metadata.event_id,
                event_type = %envelope.name,
                error = %e,
                "dispatch failed"
            );
            e
        })?;

        debug!(
            event_id = envelope.metadata.event_id,
            event_type = %envelope.name,
            targets = targets.len(),
            "event delivered"
        );

        Ok(DispatchReport {
            event_id: envelope.metadata.event_id,
            event_type: envelope.name,
            targets,
        })
    }

    /// Emit every event on the blocking pool at once.
    ///
    /// Reports come back in input order; the first failure is returned
    /// after all dispatches have finished.
    pub async fn emit_concurrent<E: DomainEvent>(
        self: Arc<Self>,
        events: Vec<(E, String)>,
    ) -> Result<Vec<DispatchReport>> {
        let handles: Vec<_> = events
            .into_iter()
            .map(|(event, actor_id)| {
                let bus = Arc::clone(&self);
                tokio::task::spawn_blocking(move || bus.emit(event, actor_id))
            })
            .collect();

        let mut results = Vec::with_capacity(handles.len());
        for handle in handles {
            results.push(handle.await.map_err(|e| {
                BrokerageError::Other(anyhow::anyhow!("Dispatch task join error: {}", e))
            })?);
        }

        results.into_iter().collect()
    }
}
