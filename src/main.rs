//! Spam → Ham Transformer: binary entrypoint
//! Boots the Axum HTTP server on Shuttle with the trained filter, the
//! rewriter and an empty message store.

use shuttle_axum::ShuttleAxum;
use tracing::info;

use dnasb_transformer::{app, config::AppConfig, logging::init_tracing};

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    // Initialize dev tracing early (no-op in production).
    init_tracing();

    let cfg = AppConfig::from_env()?;
    let router = app(&cfg)?;
    info!(target: "api", metrics = cfg.metrics, "router ready");

    Ok(router.into())
}
