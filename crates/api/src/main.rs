use anyhow::{Context, Result};
use tracing::{info, warn};

use internal_tools_api::{
    app,
    config::{self, SessionSecretSource},
    middleware,
    services::ProviderRegistry,
};
use persistence::db;
use shared::crypto::sha256_hex;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = config::Config::load().context("Failed to load configuration")?;

    middleware::logging::init_logging(&config.logging);
    info!("Starting Internal Tools server v{}", env!("CARGO_PKG_VERSION"));

    // Only a fingerprint of the secret is ever logged
    let fingerprint = sha256_hex(&config.auth.session_secret);
    match config.auth.session_secret_source {
        SessionSecretSource::Config => {
            info!(fingerprint = &fingerprint[..8], "Session secret loaded from configuration")
        }
        SessionSecretSource::Environment => info!(
            fingerprint = &fingerprint[..8],
            "Session secret loaded from SESSION_SECRET"
        ),
        SessionSecretSource::Default => warn!(
            "SESSION_SECRET is not set; using the built-in default session secret. \
             Set SESSION_SECRET before exposing this server."
        ),
    }

    middleware::init_metrics().context("Failed to install metrics recorder")?;

    let pool = db::create_datastore(&config.datastore.to_pool_config())
        .await
        .context("Exception while creating datastore")?;

    db::run_migrations(&pool)
        .await
        .context("Failed to run migrations")?;

    let providers = ProviderRegistry::from_config(&config)
        .context("Failed to register identity provider")?;
    if providers.is_empty() {
        warn!("No identity provider configured; logins are disabled");
    }

    let addr = config.socket_addr().context("Invalid server address")?;
    let app = app::create_app(config, pool, providers).context("Failed to build application")?;

    info!("Server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
