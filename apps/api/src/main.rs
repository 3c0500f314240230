use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use skillsync_api::analysis::analyzer::GroqAnalyzer;
use skillsync_api::config::Config;
use skillsync_api::llm_client::{self, LlmClient};
use skillsync_api::quota::store::MemoryStore;
use skillsync_api::quota::{SystemClock, UsageLedger};
use skillsync_api::routes::build_router;
use skillsync_api::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.rust_log)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting SkillSync API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM client and analyzer
    let llm = LlmClient::new(config.groq_api_key.clone());
    info!("LLM client initialized (model: {})", llm_client::MODEL);
    let analyzer = Arc::new(GroqAnalyzer::new(llm));

    // Initialize the usage ledger (in-memory, per-IP, rolling window)
    let window = (config.quota_window_hours > 0)
        .then(|| chrono::Duration::hours(config.quota_window_hours as i64));
    let ledger = UsageLedger::new(
        Arc::new(MemoryStore::default()),
        Arc::new(SystemClock),
        config.token_quota,
        window,
    );
    info!(
        "Usage ledger initialized (quota: {}, window hours: {})",
        config.token_quota, config.quota_window_hours
    );

    // Build app state
    let state = AppState {
        analyzer,
        ledger,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
