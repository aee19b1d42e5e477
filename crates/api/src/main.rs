use std::sync::Arc;

use anyhow::Context;

use notekeep_api::{app, app::services::AppServices, config::ApiConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = ApiConfig::load();
    let log_format = config.as_ref().map(|c| c.log_format).unwrap_or_default();
    notekeep_observability::init(log_format);

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration");
            return Err(e.into());
        }
    };

    let services = Arc::new(AppServices::from_config(&config));
    if let Some(seed) = &config.seed_admin {
        match services.seed_admin(seed).context("failed to seed admin account")? {
            Some(user) => tracing::info!(user_id = %user.id, name = %user.name, "seeded admin account"),
            None => tracing::debug!(name = %seed.name, "admin account already present"),
        }
    }
    if services.telegram_bot_token.is_none() {
        tracing::info!("TELEGRAM_BOT_TOKEN not set; telegram login disabled");
    }

    let app = app::build_app(services);

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, app).await?;
    Ok(())
}
