//! learnpath HTTP server binary.
//!
//! Resolves every capability once at startup, then serves the learning path
//! API. Any capability without a credential runs on demo fixtures.
//!
//! # Environment Variables
//!
//! - `PORT`: HTTP port (default: 8080)
//! - `LEARNPATH_CONFIG`: optional YAML settings file
//! - `LEARNPATH_FIXTURES_DIR`: directory holding `demo.json` (default: embedded)
//! - `GEMINI_API_KEY`, `FIREBASE_API_KEY`, `FIREBASE_PROJECT_ID`,
//!   `FIREBASE_ACCESS_TOKEN`, `TWILIO_ACCOUNT_SID`, `TWILIO_AUTH_TOKEN`,
//!   `ELEVENLABS_API_KEY`, `YOUTUBE_API_KEY`, `GOOGLE_DRIVE_ACCESS_TOKEN`:
//!   vendor credentials
//! - `RUST_LOG`: tracing filter (default: "info,learnpath=debug")
//!
//! A credential that is present but malformed aborts startup.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin server
//! ```

use anyhow::Context;
use learnpath::server::{app_router, AppState};
use learnpath::{CapabilityResolver, CredentialSet, FixtureStore, Settings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,learnpath=debug".into()),
        )
        .init();

    let settings = Settings::from_env().context("loading settings")?;
    let credentials = CredentialSet::from_env().context("reading credentials")?;
    let fixtures = FixtureStore::load(&settings).context("loading demo fixtures")?;

    let bind_addr = format!("0.0.0.0:{}", settings.port);
    let resolver = CapabilityResolver::new(settings, fixtures)?;
    let bindings = resolver.resolve_all(&credentials);

    let app = app_router(AppState::new(bindings));

    tracing::info!("learnpath server starting on {}", bind_addr);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding {}", bind_addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server failed")?;

    tracing::info!("learnpath server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
    }
}
