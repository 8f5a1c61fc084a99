//! # FitCoach API Server
//!
//! Serves the FitCoach HTTP API: onboarding, coaching chat, training
//! programs, and admin views behind Supabase sessions.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p fitcoach-api
//! ```

use fitcoach_api::{
    app::{build_router, AppState},
    config::Config,
};
use fitcoach_shared::auth::session::SessionResolver;
use fitcoach_shared::auth::supabase::SupabaseAuth;
use fitcoach_shared::db::{migrations, pool};
use fitcoach_shared::llm::GeminiClient;
use fitcoach_shared::store::PgStore;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fitcoach_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "FitCoach API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;

    let db = pool::create_pool(pool::DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await?;
    migrations::run_migrations(&db).await?;

    let sessions = SessionResolver::new(Arc::new(SupabaseAuth::new(
        config.supabase.url.clone(),
        config.supabase.anon_key.clone(),
    )));
    let llm = Arc::new(GeminiClient::new(
        config.gemini.base_url.clone(),
        config.gemini.model.clone(),
        config.gemini.api_key.clone(),
    ));

    if config.maintenance_mode {
        tracing::warn!("Maintenance mode is ON: only admins can use the app");
    }

    let bind_address = config.bind_address();
    let state = AppState::new(Arc::new(PgStore::new(db.clone())), sessions, llm, config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool::close_pool(db).await;
    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received, draining connections...");
}
