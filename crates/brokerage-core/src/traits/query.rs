use crate::error::Result;
use crate::types::{ActorContext, ShareId};
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::Arc;

/// A queryable entity type
///
/// `ENTITY_TYPE` scopes queries and is checked against every raw record
/// before it is deserialized.
pub trait Entity: DeserializeOwned + Send {
    const ENTITY_TYPE: &'static str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl FilterOp {
    pub fn as_operator(&self) -> &'static str {
        match self {
            FilterOp::Eq => "=",
            FilterOp::Ne => "!=",
            FilterOp::Lt => "<",
            FilterOp::Le => "<=",
            FilterOp::Gt => ">",
            FilterOp::Ge => ">=",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    Text(String),
    Integer(i64),
}

impl From<&str> for FilterValue {
    fn from(v: &str) -> Self {
        FilterValue::Text(v.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(v: String) -> Self {
        FilterValue::Text(v)
    }
}

impl From<&ShareId> for FilterValue {
    fn from(v: &ShareId) -> Self {
        FilterValue::Text(v.as_str().to_string())
    }
}

impl From<i64> for FilterValue {
    fn from(v: i64) -> Self {
        FilterValue::Integer(v)
    }
}

/// One field condition; a query ANDs all of its filters
///
/// Integer values on timestamp and duration fields (`when_created`,
/// `activity_time`) are whole seconds. They are compared against the full
/// nanosecond value, so `gt("when_created", 10)` matches a window created
/// at 10.5s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub field: String,
    pub op: FilterOp,
    pub value: FilterValue,
}

impl Filter {
    pub fn new(field: impl Into<String>, op: FilterOp, value: impl Into<FilterValue>) -> Self {
        Self {
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    pub fn eq(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::new(field, FilterOp::Eq, value)
    }

    pub fn ne(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::new(field, FilterOp::Ne, value)
    }

    pub fn lt(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::new(field, FilterOp::Lt, value)
    }

    pub fn le(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::new(field, FilterOp::Le, value)
    }

    pub fn gt(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::new(field, FilterOp::Gt, value)
    }

    pub fn ge(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::new(field, FilterOp::Ge, value)
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            FilterValue::Text(v) => write!(f, "{} {} '{}'", self.field, self.op.as_operator(), v),
            FilterValue::Integer(v) => write!(f, "{} {} {}", self.field, self.op.as_operator(), v),
        }
    }
}

/// A read request scoped to one entity type and one actor
#[derive(Debug, Clone)]
pub struct Query {
    pub entity_type: String,
    pub filters: Vec<Filter>,
    pub actor_id: String,
    pub correlation_id: Option<String>,
}

impl Query {
    pub fn for_entity<S: Entity>(ctx: &ActorContext) -> Self {
        Self {
            entity_type: S::ENTITY_TYPE.to_string(),
            filters: Vec::new(),
            actor_id: ctx.actor_id.clone(),
            correlation_id: ctx.correlation_id.clone(),
        }
    }

    pub fn with_filters(mut self, filters: &[Filter]) -> Self {
        self.filters.extend_from_slice(filters);
        self
    }
}

/// One undecoded query result
#[derive(Debug, Clone)]
pub struct RawEntity {
    pub entity_type: String,
    /// JSON document
    pub body: Vec<u8>,
}

/// Synchronous query surface over persisted projections
pub trait QuerySource: Send + Sync {
    /// Run the query, blocking until the full result is available
    fn execute(&self, query: &Query) -> Result<Vec<RawEntity>>;
}

impl<Q: QuerySource + ?Sized> QuerySource for Arc<Q> {
    fn execute(&self, query: &Query) -> Result<Vec<RawEntity>> {
        (**self).execute(query)
    }
}
