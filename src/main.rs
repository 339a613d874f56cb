//! Session registry demo binary.
//!
//! Loads configuration (optional JSON path as the first argument, then
//! `SESSION_REGISTRY__*` environment overrides), runs a short session
//! lifecycle and prints the resulting stats as JSON. Set `LOG_FORMAT=json`
//! for structured log output.

use std::path::PathBuf;
use std::sync::Arc;

use session_registry::adapters::TracingObserver;
use session_registry::{RegistryConfig, SessionRegistry, UserId};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,session_registry=debug"));
    // LOG_FORMAT=json switches to structured output
    if std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json")) {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    let path = std::env::args().nth(1).map(PathBuf::from);
    let config = RegistryConfig::load(path.as_deref())?;
    tracing::info!(config = %config, "Configuration loaded");

    let registry = SessionRegistry::new(config)?;
    registry.register_termination_callback(Arc::new(TracingObserver::new()));

    let alice = UserId::new("alice")?;
    let bob = UserId::new("bob")?;

    let session = registry.create_session(&alice, None);
    registry.set_session_data(session.id(), "theme", "dark");
    registry.create_session(&bob, None);

    let limit = registry.config().max_sessions_per_user;
    for _ in 0..limit {
        registry.create_session(&alice, None);
    }

    println!("{}", serde_json::to_string_pretty(&registry.get_stats())?);

    let terminated = registry.shutdown().await;
    tracing::info!(terminated, "Demo finished");
    Ok(())
}
