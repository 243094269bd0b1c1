//! Event envelope and codecs
//!
//! Every event crossing the bus is wrapped in an [`Event`]:
//! - **Name**: the event type the routing function is registered under
//! - **Payload**: the typed domain event
//! - **Metadata**: bus-assigned id, the emitting actor, issue time
//!
//! # Example
//!
//! ```no_run
//! use brokerage::event_format::{Event, EventCodec, EventMetadata, JsonCodec};
//! use brokerage::prelude::*;
//!
//! # fn main() -> Result<()> {
//! let update = SharePricesUpdated::new(
//!     Timestamp::from_unix_seconds(1_000),
//!     vec![SharePrice::new("ACME", Money::new("EUR", 12, 0))],
//! );
//! let event = Event::new(
//!     SharePricesUpdated::EVENT_TYPE,
//!     update,
//!     EventMetadata::new(1, "feed", Timestamp::from_unix_seconds(1_000)),
//! );
//!
//! let bytes = JsonCodec.encode(&event)?;
//! let decoded: Event<SharePricesUpdated> = JsonCodec.decode(&bytes)?;
//! # Ok(())
//! # }
//! ```

use brokerage_core::{ActorContext, BrokerageError, EventId, Result, Timestamp};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Structured event with name, typed payload and metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event<T> {
    /// Event type (e.g. "share_prices_updated")
    pub name: String,

    pub payload: T,

    pub metadata: EventMetadata,
}

/// Envelope metadata stamped by the bus
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMetadata {
    pub event_id: EventId,

    /// Actor the event was emitted by; routing queries run as this actor
    pub actor_id: String,

    pub issued_at: Timestamp,

    /// Correlation ID for tracing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
}

impl EventMetadata {
    pub fn new(event_id: EventId, actor_id: impl Into<String>, issued_at: Timestamp) -> Self {
        Self {
            event_id,
            actor_id: actor_id.into(),
            issued_at,
            correlation_id: None,
        }
    }

    /// The actor context routing functions execute under
    pub fn actor_context(&self) -> ActorContext {
        let ctx = ActorContext::new(self.actor_id.clone(), self.issued_at);
        match &self.correlation_id {
            Some(id) => ctx.with_correlation_id(id.clone()),
            None => ctx,
        }
    }
}

impl<T> Event<T> {
    pub fn new(name: impl Into<String>, payload: T, metadata: EventMetadata) -> Self {
        Self {
            name: name.into(),
            payload,
            metadata,
        }
    }

    /// Add a correlation ID
    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.metadata.correlation_id = Some(id.into());
        self
    }
}

/// Encodes and decodes event envelopes
pub trait EventCodec: Send + Sync {
    fn encode<T: Serialize>(&self, event: &Event<T>) -> Result<Vec<u8>>;

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<Event<T>>;
}

/// JSON codec
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl EventCodec for JsonCodec {
    fn encode<T: Serialize>(&self, event: &Event<T>) -> Result<Vec<u8>> {
        serde_json::to_vec(event).map_err(|e| BrokerageError::Serialization(e.to_string()))
    }

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<Event<T>> {
        serde_json::from_slice(bytes).map_err(|e| BrokerageError::EventDecode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brokerage_core::{DomainEvent, Money, SharePrice, SharePricesUpdated};

    fn sample() -> Event<SharePricesUpdated> {
        Event::new(
            SharePricesUpdated::EVENT_TYPE,
            SharePricesUpdated::new(
                Timestamp::from_unix_seconds(1_000),
                vec![SharePrice::new("ACME", Money::new("EUR", 12, 500_000_000))],
            ),
            EventMetadata::new(7, "feed", Timestamp::from_unix_seconds(1_000)),
        )
    }

    #[test]
    fn test_json_codec() {
        let event = sample().with_correlation_id("req-1");
        let bytes = JsonCodec.encode(&event).unwrap();

        let decoded: Event<SharePricesUpdated> = JsonCodec.decode(&bytes).unwrap();
        assert_eq!(decoded.name, "share_prices_updated");
        assert_eq!(decoded.payload, event.payload);
        assert_eq!(decoded.metadata, event.metadata);
    }

    #[test]
    fn test_untyped_payload_decode() {
        let bytes = JsonCodec.encode(&sample()).unwrap();
        let envelope: Event<serde_json::Value> = JsonCodec.decode(&bytes).unwrap();

        assert_eq!(envelope.name, SharePricesUpdated::EVENT_TYPE);
        assert_eq!(envelope.metadata.event_id, 7);
        assert_eq!(envelope.payload["prices"][0]["share"], "ACME");
    }

    #[test]
    fn test_actor_context_from_metadata() {
        let ctx = sample()
            .with_correlation_id("req-1")
            .metadata
            .actor_context();

        assert_eq!(ctx.actor_id, "feed");
        assert_eq!(ctx.issued_at, Timestamp::from_unix_seconds(1_000));
        assert_eq!(ctx.correlation_id.as_deref(), Some("req-1"));
    }

    #[test]
    fn test_malformed_bytes() {
        let err = JsonCodec.decode::<SharePricesUpdated>(b"deposit:100").unwrap_err();
        assert!(matches!(err, BrokerageError::EventDecode(_)));
    }
}
