//! American Dynamism Tracker — Binary Entrypoint
//! Boots the Axum HTTP server and the background feed pipeline: a scheduled
//! fetch→dedup→score cycle feeding the bounded in-memory article cache the
//! API reads from.

use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use dynamism_tracker::metrics::Metrics;
use dynamism_tracker::{api, scheduler, Pipeline};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("dynamism_tracker=info,warn"));

    // try_init: the hosting runtime may have installed a subscriber already.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .try_init();
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let pipeline = Pipeline::from_env();
    let metrics = Metrics::init(pipeline.config.fetch_interval.as_secs());

    // First cycle runs immediately, then every fetch_interval.
    scheduler::spawn_scheduler(pipeline.clone());

    let router = api::create_router(pipeline).merge(metrics.router());
    Ok(router.into())
}
