use crate::error::{BrokerageError, Result};
use crate::time::Timestamp;
use serde::{Deserialize, Serialize};

/// Identity envelope a query or delivery executes under
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorContext {
    pub actor_id: String,
    pub issued_at: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
}

impl ActorContext {
    pub fn new(actor_id: impl Into<String>, issued_at: Timestamp) -> Self {
        Self {
            actor_id: actor_id.into(),
            issued_at,
            correlation_id: None,
        }
    }

    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = Some(id.into());
        self
    }

    /// A blank actor id means no context was supplied
    pub fn validate(&self) -> Result<()> {
        if self.actor_id.trim().is_empty() {
            return Err(BrokerageError::InvalidArgument(
                "actor context is required but no actor id was given".into(),
            ));
        }
        Ok(())
    }
}
