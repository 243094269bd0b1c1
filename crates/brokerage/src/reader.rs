//! Typed reads over a projection query source

use brokerage_core::{
    ActorContext, BrokerageError, Entity, Filter, Query, QuerySource, RawEntity, Result,
};
use tracing::debug;

/// Executes filtered queries and decodes the results into entities
///
/// Reads are synchronous and side-effect free. Faults from the source are
/// returned unchanged; nothing is retried.
pub struct ProjectionReader<Q> {
    source: Q,
}

impl<Q: QuerySource> ProjectionReader<Q> {
    pub fn new(source: Q) -> Self {
        Self { source }
    }

    /// All entities of type `S` matching every filter, in source order.
    ///
    /// Fails with `InvalidArgument` before touching the source when `ctx`
    /// carries no actor.
    pub fn read<S: Entity>(&self, ctx: &ActorContext, filters: &[Filter]) -> Result<Vec<S>> {
        ctx.validate()?;

        let query = Query::for_entity::<S>(ctx).with_filters(filters);
        let records = self.source.execute(&query)?;
        debug!(
            entity = S::ENTITY_TYPE,
            actor = %ctx.actor_id,
            found = records.len(),
            "projection query"
        );

        records.iter().map(decode_record::<S>).collect()
    }

    /// Every entity of type `S`
    pub fn read_all<S: Entity>(&self, ctx: &ActorContext) -> Result<Vec<S>> {
        self.read(ctx, &[])
    }
}

fn decode_record<S: Entity>(record: &RawEntity) -> Result<S> {
    if record.entity_type != S::ENTITY_TYPE {
        return Err(BrokerageError::Serialization(format!(
            "expected entity type '{}', got '{}'",
            S::ENTITY_TYPE,
            record.entity_type
        )));
    }
    Ok(serde_json::from_slice(&record.body)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use brokerage_core::{FilterOp, FilterValue, Timestamp};
    use parking_lot::Mutex;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Holding {
        account: String,
        quantity: i64,
    }

    impl Entity for Holding {
        const ENTITY_TYPE: &'static str = "holding";
    }

    /// Returns canned records and remembers every query it saw
    struct CannedSource {
        records: Vec<RawEntity>,
        seen: Mutex<Vec<Query>>,
    }

    impl CannedSource {
        fn new(records: Vec<RawEntity>) -> Self {
            Self {
                records,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    impl QuerySource for CannedSource {
        fn execute(&self, query: &Query) -> Result<Vec<RawEntity>> {
            self.seen.lock().push(query.clone());
            Ok(self.records.clone())
        }
    }

    struct FailingSource;

    impl QuerySource for FailingSource {
        fn execute(&self, _query: &Query) -> Result<Vec<RawEntity>> {
            Err(BrokerageError::Query("connection reset".into()))
        }
    }

    fn record(entity_type: &str, body: &str) -> RawEntity {
        RawEntity {
            entity_type: entity_type.into(),
            body: body.as_bytes().to_vec(),
        }
    }

    fn ctx() -> ActorContext {
        ActorContext::new("reader-test", Timestamp::from_unix_seconds(0))
            .with_correlation_id("req-9")
    }

    #[test]
    fn test_read_decodes_in_order() {
        let reader = ProjectionReader::new(CannedSource::new(vec![
            record("holding", r#"{"account":"a","quantity":3}"#),
            record("holding", r#"{"account":"b","quantity":5}"#),
        ]));

        let holdings: Vec<Holding> = reader.read(&ctx(), &[Filter::gt("quantity", 1i64)]).unwrap();
        assert_eq!(
            holdings,
            vec![
                Holding {
                    account: "a".into(),
                    quantity: 3
                },
                Holding {
                    account: "b".into(),
                    quantity: 5
                },
            ]
        );
    }

    #[test]
    fn test_query_carries_scope_and_filters() {
        let reader = ProjectionReader::new(CannedSource::new(Vec::new()));
        let _: Vec<Holding> = reader
            .read(
                &ctx(),
                &[Filter::eq("account", "a"), Filter::le("quantity", 10i64)],
            )
            .unwrap();

        let seen = reader.source.seen.lock();
        let query = &seen[0];
        assert_eq!(query.entity_type, "holding");
        assert_eq!(query.actor_id, "reader-test");
        assert_eq!(query.correlation_id.as_deref(), Some("req-9"));
        assert_eq!(query.filters.len(), 2);
        assert_eq!(query.filters[1].op, FilterOp::Le);
        assert_eq!(query.filters[1].value, FilterValue::Integer(10));
    }

    #[test]
    fn test_read_all_sends_no_filters() {
        let reader = ProjectionReader::new(CannedSource::new(Vec::new()));
        let found: Vec<Holding> = reader.read_all(&ctx()).unwrap();

        assert!(found.is_empty());
        assert!(reader.source.seen.lock()[0].filters.is_empty());
    }

    #[test]
    fn test_blank_actor_fails_before_query() {
        let reader = ProjectionReader::new(CannedSource::new(Vec::new()));
        let blank = ActorContext::new("  ", Timestamp::from_unix_seconds(0));

        let result: Result<Vec<Holding>> = reader.read_all(&blank);
        assert!(matches!(result, Err(BrokerageError::InvalidArgument(_))));
        assert!(reader.source.seen.lock().is_empty());
    }

    #[test]
    fn test_source_fault_propagates() {
        let reader = ProjectionReader::new(FailingSource);
        let result: Result<Vec<Holding>> = reader.read_all(&ctx());
        assert!(matches!(result, Err(BrokerageError::Query(_))));
    }

    #[test]
    fn test_wrong_entity_type_is_a_decode_fault() {
        let reader = ProjectionReader::new(CannedSource::new(vec![record(
            "order",
            r#"{"account":"a","quantity":3}"#,
        )]));
        let result: Result<Vec<Holding>> = reader.read_all(&ctx());
        assert!(matches!(result, Err(BrokerageError::Serialization(_))));
    }

    #[test]
    fn test_malformed_body_is_a_decode_fault() {
        let reader = ProjectionReader::new(CannedSource::new(vec![record(
            "holding",
            r#"{"account":"a"}"#,
        )]));
        let result: Result<Vec<Holding>> = reader.read_all(&ctx());
        assert!(matches!(result, Err(BrokerageError::Serialization(_))));
    }
}
