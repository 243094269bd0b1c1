use brokerage_core::{
    ActorContext, BrokerageError, Duration, Entity, Filter, Money, ProjectionDelivery, Query,
    QuerySource, Reservation, ShareId, SharePrice, SharePriceMovementId,
    SharePriceMovementPerMinute, SharePricesUpdated, StoreConfig, Timestamp, WindowStore,
};
use brokerage_sqlite::SqliteMovementStore;
use tempfile::TempDir;

fn open_store() -> (SqliteMovementStore, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let store = SqliteMovementStore::open(StoreConfig::new(dir.path().join("movements.db"))).unwrap();
    (store, dir)
}

fn window(share: &str, created: i64) -> SharePriceMovementId {
    SharePriceMovementId::new(
        ShareId::new(share),
        Duration::from_secs(60),
        Timestamp::from_unix_seconds(created),
    )
}

fn update(at: i64, prices: &[(&str, i64)]) -> SharePricesUpdated {
    SharePricesUpdated::new(
        Timestamp::from_unix_seconds(at),
        prices
            .iter()
            .map(|(share, units)| SharePrice::new(*share, Money::new("EUR", *units, 0)))
            .collect(),
    )
}

fn ctx() -> ActorContext {
    ActorContext::new("store-test", Timestamp::from_unix_seconds(0))
}

fn decode(raw: &[brokerage_core::RawEntity]) -> Vec<SharePriceMovementPerMinute> {
    raw.iter()
        .map(|r| serde_json::from_slice(&r.body).unwrap())
        .collect()
}

#[test]
fn test_create_if_absent_is_idempotent() {
    let (store, _dir) = open_store();
    let id = window("ACME", 1_000);

    assert!(store.create_if_absent(&id).unwrap());
    assert!(!store.create_if_absent(&id).unwrap());
    assert_eq!(store.count_windows().unwrap(), 1);

    let loaded = store.load(&id).unwrap().unwrap();
    assert_eq!(loaded.id, id);
    assert_eq!(loaded.share, ShareId::new("ACME"));
    assert_eq!(loaded.movement_point_count(), 0);
}

#[test]
fn test_deliver_creates_missing_window_and_appends() {
    let (store, _dir) = open_store();
    let id = window("ACME", 1_000);

    store.deliver(&id, &update(1_010, &[("ACME", 10)])).unwrap();
    store.deliver(&id, &update(1_020, &[("ACME", 12), ("INIT", 3)])).unwrap();

    let loaded = store.load(&id).unwrap().unwrap();
    let prices: Vec<_> = loaded.price_at_time.iter().map(|p| p.price.units).collect();
    let times: Vec<_> = loaded.price_at_time.iter().map(|p| p.time.seconds).collect();
    assert_eq!(prices, vec![10, 12]);
    assert_eq!(times, vec![1_010, 1_020]);
    assert_eq!(store.count_windows().unwrap(), 1);
}

#[test]
fn test_deliver_without_share_price_leaves_window_empty() {
    let (store, _dir) = open_store();
    let id = window("ACME", 1_000);

    store.deliver(&id, &update(1_010, &[("INIT", 10)])).unwrap();

    let loaded = store.load(&id).unwrap().unwrap();
    assert_eq!(loaded.movement_point_count(), 0);
    assert_eq!(store.count_points().unwrap(), 0);
}

#[test]
fn test_query_filters_by_share_in_insertion_order() {
    let (store, _dir) = open_store();
    store.create_if_absent(&window("ACME", 2_000)).unwrap();
    store.create_if_absent(&window("INIT", 1_500)).unwrap();
    store.create_if_absent(&window("ACME", 1_000)).unwrap();

    let query = Query::for_entity::<SharePriceMovementPerMinute>(&ctx())
        .with_filters(&[Filter::eq("share", "ACME")]);
    let found = decode(&store.execute(&query).unwrap());

    let created: Vec<_> = found.iter().map(|p| p.id.when_created.seconds).collect();
    assert_eq!(created, vec![2_000, 1_000]);

    let by_share = store.windows_for_share(&ShareId::new("ACME")).unwrap();
    let created: Vec<_> = by_share.iter().map(|p| p.id.when_created.seconds).collect();
    assert_eq!(created, vec![1_000, 2_000]);
}

#[test]
fn test_query_range_filters_are_and_combined() {
    let (store, _dir) = open_store();
    for created in [1_000, 1_060, 1_120, 1_180] {
        store.create_if_absent(&window("ACME", created)).unwrap();
    }

    let query = Query::for_entity::<SharePriceMovementPerMinute>(&ctx()).with_filters(&[
        Filter::eq("share", "ACME"),
        Filter::gt("when_created", 1_000i64),
        Filter::le("when_created", 1_120i64),
    ]);
    let found = decode(&store.execute(&query).unwrap());

    let created: Vec<_> = found.iter().map(|p| p.id.when_created.seconds).collect();
    assert_eq!(created, vec![1_060, 1_120]);
}

#[test]
fn test_time_filters_keep_sub_second_precision() {
    let (store, _dir) = open_store();
    let at_whole = window("ACME", 1_000);
    let half_past = SharePriceMovementId::new(
        ShareId::new("ACME"),
        Duration::from_secs(60),
        Timestamp::new(1_000, 500_000_000),
    );
    store.create_if_absent(&at_whole).unwrap();
    store.create_if_absent(&half_past).unwrap();

    let query = Query::for_entity::<SharePriceMovementPerMinute>(&ctx())
        .with_filters(&[Filter::gt("when_created", 1_000i64)]);
    let found = decode(&store.execute(&query).unwrap());

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, half_past);
}

#[test]
fn test_reserve_window_returns_open_window_or_creates() {
    let (store, _dir) = open_store();
    let first = window("ACME", 1_000);

    let created = store
        .reserve_window(&first, &Timestamp::from_unix_seconds(1_000))
        .unwrap();
    assert_eq!(created, Reservation::Created(first.clone()));

    // A later candidate while the first is still open
    let sibling = window("ACME", 1_030);
    let existing = store
        .reserve_window(&sibling, &Timestamp::from_unix_seconds(1_030))
        .unwrap();
    assert_eq!(existing, Reservation::Existing(first.clone()));
    assert!(store.load(&sibling).unwrap().is_none());

    // Once the first has expired, the candidate is minted
    let next = window("ACME", 1_060);
    let rolled = store
        .reserve_window(&next, &Timestamp::from_unix_seconds(1_060))
        .unwrap();
    assert!(rolled.is_created());
    assert_eq!(store.count_windows().unwrap(), 2);
}

#[test]
fn test_reserve_window_ignores_other_shares() {
    let (store, _dir) = open_store();
    store.create_if_absent(&window("INIT", 1_000)).unwrap();

    let acme = window("ACME", 1_010);
    let reservation = store
        .reserve_window(&acme, &Timestamp::from_unix_seconds(1_010))
        .unwrap();
    assert_eq!(reservation, Reservation::Created(acme));
}

#[test]
fn test_deliver_all_is_all_or_nothing() {
    let (store, _dir) = open_store();
    let acme = window("ACME", 1_000);
    let init = window("INIT", 1_000);

    let broken = SharePricesUpdated::new(
        Timestamp::from_unix_seconds(1_010),
        vec![
            SharePrice::new("ACME", Money::new("EUR", 10, 0)),
            SharePrice::new(
                "INIT",
                Money {
                    currency: "EUR".into(),
                    units: 1,
                    nanos: 2_000_000_000,
                },
            ),
        ],
    );
    let result = store.deliver_all(&[acme.clone(), init.clone()], &broken);
    assert!(matches!(result, Err(BrokerageError::Projection(_))));
    assert_eq!(store.count_points().unwrap(), 0);
    assert_eq!(store.count_windows().unwrap(), 0);

    store
        .deliver_all(&[acme.clone(), init], &update(1_010, &[("ACME", 10), ("INIT", 3)]))
        .unwrap();
    assert_eq!(store.load(&acme).unwrap().unwrap().movement_point_count(), 1);
    assert_eq!(store.count_points().unwrap(), 2);
}

#[test]
fn test_query_returns_points_in_arrival_order() {
    let (store, _dir) = open_store();
    let id = window("ACME", 1_000);
    for (at, price) in [(1_001, 7), (1_002, 5), (1_003, 9)] {
        store.deliver(&id, &update(at, &[("ACME", price)])).unwrap();
    }

    let query = Query::for_entity::<SharePriceMovementPerMinute>(&ctx());
    let raw = store.execute(&query).unwrap();
    assert_eq!(raw.len(), 1);
    assert_eq!(raw[0].entity_type, SharePriceMovementPerMinute::ENTITY_TYPE);

    let found = decode(&raw);
    let prices: Vec<_> = found[0].price_at_time.iter().map(|p| p.price.units).collect();
    assert_eq!(prices, vec![7, 5, 9]);
}

#[test]
fn test_unknown_entity_type_is_a_query_error() {
    let (store, _dir) = open_store();
    let mut query = Query::for_entity::<SharePriceMovementPerMinute>(&ctx());
    query.entity_type = "account_balance".into();

    assert!(matches!(store.execute(&query), Err(BrokerageError::Query(_))));
}

#[test]
fn test_reopen_keeps_windows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("movements.db");
    let id = window("ACME", 1_000);

    {
        let store = SqliteMovementStore::open(StoreConfig::new(path.clone())).unwrap();
        store.deliver(&id, &update(1_001, &[("ACME", 10)])).unwrap();
    }

    let store = SqliteMovementStore::open(StoreConfig::new(path)).unwrap();
    assert_eq!(store.schema_version().unwrap(), 1);
    assert_eq!(store.load(&id).unwrap().unwrap().movement_point_count(), 1);
}
