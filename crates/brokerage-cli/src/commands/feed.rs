//! Feed command implementation

use anyhow::{Context, Result};
use brokerage::prelude::*;
use std::path::PathBuf;

pub struct FeedArgs {
    pub share: String,
    pub currency: String,
    pub units: i64,
    pub nanos: i32,
    pub actor: String,
    pub activity_secs: i64,
}

pub fn execute(db_path: PathBuf, args: FeedArgs) -> Result<()> {
    let store = Arc::new(super::open_store(&db_path)?);
    let clock = Arc::new(SystemClock);

    let router = SharePriceMovementRouter::new(
        Arc::clone(&store),
        Arc::clone(&clock),
        RouterConfig::default().with_activity_time_secs(args.activity_secs),
    )
    .context("Invalid router configuration")?;

    let mut bus = EventBus::new(clock.clone());
    bus.route::<SharePricesUpdated, _, _>(
        move |event, ctx| router.route(event, ctx),
        Arc::clone(&store),
    )
    .context("Failed to register route")?;

    let price = Money::new(args.currency, args.units, args.nanos);
    let update = SharePricesUpdated::new(
        clock.now(),
        vec![SharePrice::new(args.share.as_str(), price.clone())],
    );

    let report = bus
        .emit(update, args.actor)
        .context("Failed to dispatch price update")?;

    println!("✓ Event {} ({})", report.event_id, report.event_type);
    println!("  {} {}", args.share, price);
    for target in &report.targets {
        println!("  -> {}", target);
    }

    Ok(())
}
