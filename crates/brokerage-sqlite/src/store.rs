use brokerage_core::{
    error::{BrokerageError, Result},
    observe,
    traits::{
        Entity, ProjectionDelivery, Query, QuerySource, RawEntity, Reservation, WindowStore,
    },
    types::{
        Money, PriceAtTime, ShareId, SharePriceMovementId, SharePriceMovementPerMinute,
        SharePricesUpdated,
    },
    Duration, StoreConfig, Timestamp,
};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension, Row, TransactionBehavior};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::query::{build_window_query, SELECT_WINDOWS};
use crate::schema;

fn read_err(e: rusqlite::Error) -> BrokerageError {
    BrokerageError::Query(e.to_string())
}

fn write_err(e: rusqlite::Error) -> BrokerageError {
    BrokerageError::Projection(e.to_string())
}

/// SQLite-backed store of share price movement windows
///
/// Serves as the query source for the router and as the delivery target
/// of the event bus.
pub struct SqliteMovementStore {
    conn: Arc<Mutex<Connection>>,
    config: StoreConfig,
}

impl SqliteMovementStore {
    /// Open (or create) the store at `cfg.path`
    pub fn open(cfg: StoreConfig) -> Result<Self> {
        if let Some(parent) = cfg.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open_with_flags(
            &cfg.path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE,
        )
        .map_err(write_err)?;

        Self::configure_connection(&conn, &cfg)?;
        schema::init_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            config: cfg,
        })
    }

    fn configure_connection(conn: &Connection, cfg: &StoreConfig) -> Result<()> {
        if cfg.wal_mode {
            conn.pragma_update(None, "journal_mode", "WAL")
                .map_err(|e| BrokerageError::Config(e.to_string()))?;
        }

        conn.pragma_update(None, "synchronous", cfg.synchronous.as_pragma())
            .map_err(|e| BrokerageError::Config(e.to_string()))?;

        conn.pragma_update(None, "foreign_keys", "ON")
            .map_err(|e| BrokerageError::Config(e.to_string()))?;

        conn.pragma_update(None, "cache_size", cfg.cache_size)
            .map_err(|e| BrokerageError::Config(e.to_string()))?;

        // Other connections on the same file hold the write lock briefly
        conn.busy_timeout(cfg.busy_timeout())
            .map_err(|e| BrokerageError::Config(e.to_string()))?;

        Ok(())
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn schema_version(&self) -> Result<u32> {
        schema::schema_version(&self.conn.lock())
    }

    /// Load one window with its points
    pub fn load(&self, id: &SharePriceMovementId) -> Result<Option<SharePriceMovementPerMinute>> {
        load_window(&self.conn.lock(), &id.key())
    }

    /// Every window of `share`, oldest first
    pub fn windows_for_share(&self, share: &ShareId) -> Result<Vec<SharePriceMovementPerMinute>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare(&format!(
                "{} WHERE share_id = ?1 ORDER BY created_seconds ASC, created_nanos ASC",
                SELECT_WINDOWS
            ))
            .map_err(read_err)?;

        let ids = stmt
            .query_map(params![share.as_str()], window_id_from_row)
            .map_err(read_err)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(read_err)?;

        ids.into_iter().map(|id| with_points(&conn, id)).collect()
    }

    pub fn count_windows(&self) -> Result<u64> {
        let count: i64 = self
            .conn
            .lock()
            .query_row("SELECT COUNT(*) FROM share_price_movements", [], |row| {
                row.get(0)
            })
            .map_err(read_err)?;
        Ok(count as u64)
    }

    pub fn count_points(&self) -> Result<u64> {
        let count: i64 = self
            .conn
            .lock()
            .query_row("SELECT COUNT(*) FROM share_price_points", [], |row| {
                row.get(0)
            })
            .map_err(read_err)?;
        Ok(count as u64)
    }
}

fn window_id_from_row(row: &Row<'_>) -> rusqlite::Result<SharePriceMovementId> {
    Ok(SharePriceMovementId {
        share: ShareId::new(row.get::<_, String>(1)?),
        activity_time: Duration {
            seconds: row.get(2)?,
            nanos: row.get(3)?,
        },
        when_created: Timestamp {
            seconds: row.get(4)?,
            nanos: row.get(5)?,
        },
    })
}

fn load_points(conn: &Connection, movement_key: &str) -> Result<Vec<PriceAtTime>> {
    let mut stmt = conn
        .prepare(
            r#"
            SELECT currency, units, nanos, time_seconds, time_nanos
            FROM share_price_points
            WHERE movement_key = ?1
            ORDER BY point_id ASC
            "#,
        )
        .map_err(read_err)?;

    let points = stmt
        .query_map(params![movement_key], |row| {
            Ok(PriceAtTime {
                price: Money {
                    currency: row.get(0)?,
                    units: row.get(1)?,
                    nanos: row.get(2)?,
                },
                time: Timestamp {
                    seconds: row.get(3)?,
                    nanos: row.get(4)?,
                },
            })
        })
        .map_err(read_err)?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(read_err)?;

    Ok(points)
}

fn with_points(conn: &Connection, id: SharePriceMovementId) -> Result<SharePriceMovementPerMinute> {
    let price_at_time = load_points(conn, &id.key())?;
    let mut projection = SharePriceMovementPerMinute::new(id);
    projection.price_at_time = price_at_time;
    Ok(projection)
}

fn load_window(conn: &Connection, movement_key: &str) -> Result<Option<SharePriceMovementPerMinute>> {
    let id = conn
        .query_row(
            &format!("{} WHERE movement_key = ?1", SELECT_WINDOWS),
            params![movement_key],
            window_id_from_row,
        )
        .optional()
        .map_err(read_err)?;

    id.map(|id| with_points(conn, id)).transpose()
}

/// Returns `true` when the row was inserted
fn insert_window(conn: &Connection, id: &SharePriceMovementId) -> Result<bool> {
    let inserted = conn
        .execute(
            r#"
            INSERT INTO share_price_movements
            (movement_key, share_id, activity_seconds, activity_nanos,
             created_seconds, created_nanos)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(movement_key) DO NOTHING
            "#,
            params![
                id.key(),
                id.share.as_str(),
                id.activity_time.seconds,
                id.activity_time.nanos,
                id.when_created.seconds,
                id.when_created.nanos,
            ],
        )
        .map_err(write_err)?;

    Ok(inserted == 1)
}

/// Append the price `event` carries for `id.share`
///
/// Returns `false` when the event has no price for the share.
fn append_update(
    conn: &Connection,
    id: &SharePriceMovementId,
    event: &SharePricesUpdated,
) -> Result<bool> {
    let key = id.key();
    if insert_window(conn, id)? {
        debug!(window = %key, "instantiated empty window on delivery");
    }

    let Some(point) = PriceAtTime::from_update(&id.share, event) else {
        warn!(window = %key, share = %id.share, "update carries no price for this share");
        return Ok(false);
    };

    if !id.covers(&point.time) {
        warn!(
            window = %key,
            time = %point.time,
            "price sample outside its window span"
        );
    }
    insert_point(conn, &key, &point)?;
    Ok(true)
}

fn insert_point(conn: &Connection, movement_key: &str, point: &PriceAtTime) -> Result<()> {
    conn.execute(
        r#"
        INSERT INTO share_price_points
        (movement_key, currency, units, nanos, time_seconds, time_nanos)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
        params![
            movement_key,
            point.price.currency,
            point.price.units,
            point.price.nanos,
            point.time.seconds,
            point.time.nanos,
        ],
    )
    .map_err(write_err)?;
    Ok(())
}

impl QuerySource for SqliteMovementStore {
    fn execute(&self, query: &Query) -> Result<Vec<RawEntity>> {
        if query.entity_type != SharePriceMovementPerMinute::ENTITY_TYPE {
            return Err(BrokerageError::Query(format!(
                "unsupported entity type '{}'",
                query.entity_type
            )));
        }

        let (sql, bound_params) = build_window_query(&query.filters)?;
        debug!(
            actor = %query.actor_id,
            filters = query.filters.len(),
            "querying share price movements"
        );

        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&sql).map_err(read_err)?;
        let ids = stmt
            .query_map(
                rusqlite::params_from_iter(bound_params.iter()),
                window_id_from_row,
            )
            .map_err(read_err)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(read_err)?;

        ids.into_iter()
            .map(|id| -> Result<RawEntity> {
                let projection = with_points(&conn, id)?;
                Ok(RawEntity {
                    entity_type: query.entity_type.clone(),
                    body: serde_json::to_vec(&projection)?,
                })
            })
            .collect()
    }
}

impl WindowStore for SqliteMovementStore {
    fn create_if_absent(&self, id: &SharePriceMovementId) -> Result<bool> {
        insert_window(&self.conn.lock(), id)
    }

    /// Select-then-insert under SQLite's write lock
    ///
    /// `BEGIN IMMEDIATE` serializes this against every other connection on
    /// the file, so two processes cannot both miss an open window and
    /// mint siblings.
    fn reserve_window(
        &self,
        candidate: &SharePriceMovementId,
        now: &Timestamp,
    ) -> Result<Reservation> {
        let mut conn = self.conn.lock();
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(write_err)?;

        let open = {
            let mut stmt = tx
                .prepare(&format!(
                    "{} WHERE share_id = ?1 ORDER BY rowid ASC",
                    SELECT_WINDOWS
                ))
                .map_err(read_err)?;
            let ids = stmt
                .query_map(params![candidate.share.as_str()], window_id_from_row)
                .map_err(read_err)?
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(read_err)?;
            ids.into_iter().find(|id| id.is_open_at(now))
        };

        let reservation = match open {
            Some(id) => Reservation::Existing(id),
            None if insert_window(&tx, candidate)? => Reservation::Created(candidate.clone()),
            None => Reservation::Existing(candidate.clone()),
        };

        tx.commit().map_err(write_err)?;
        Ok(reservation)
    }
}

impl ProjectionDelivery<SharePricesUpdated> for SqliteMovementStore {
    type Id = SharePriceMovementId;

    fn deliver(&self, id: &SharePriceMovementId, event: &SharePricesUpdated) -> Result<()> {
        self.deliver_all(std::slice::from_ref(id), event)
    }

    /// Create-or-append for every id in one transaction
    fn deliver_all(&self, ids: &[SharePriceMovementId], event: &SharePricesUpdated) -> Result<()> {
        let mut conn = self.conn.lock();
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(write_err)?;

        let mut appended = 0;
        for id in ids {
            if append_update(&tx, id, event)? {
                appended += 1;
            }
        }

        tx.commit().map_err(write_err)?;
        for _ in 0..appended {
            observe::record_point_appended();
        }
        Ok(())
    }
}
