use clap::Parser; // for cli
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use gemini_quota_proxy::config::Args;
use gemini_quota_proxy::handlers::router;
use gemini_quota_proxy::rate_limit::{QuotaLedger, quota_sweeper};
use gemini_quota_proxy::state::AppState;
use gemini_quota_proxy::upstream::GeminiClient;

// this is main async function with tokio
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // parse cli arguments
    let args = Args::parse();

    let ledger = Arc::new(QuotaLedger::new(args.rate_limit, args.rate_window()));

    let gateway = GeminiClient::new(
        reqwest::Client::builder().build()?,
        &args.upstream_url,
        &args.model,
        args.api_key.clone(),
        args.upstream_timeout(),
    );
    if !gateway.has_credential() {
        warn!("No provider credential configured; generate requests will fail with 500");
    }

    let state = AppState::new(Arc::clone(&ledger), gateway);

    // spawn the background sweeper
    tokio::spawn(quota_sweeper(ledger, args.sweep_interval()));

    let app = router(state);

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("Proxy running on http://localhost:{}", args.port);
    info!("Forwarding to {} (model {})", args.upstream_url, args.model);
    info!(
        "Rate limit: {} requests per {} seconds per client",
        args.rate_limit, args.rate_window
    );
    axum::serve(listener, app).await?;

    Ok(())
}
