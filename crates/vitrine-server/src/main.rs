//! Vitrine server binary.

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use vitrine_auth::{hash_password, Role, UserRecord};
use vitrine_server::{handlers, AppState, CliArgs, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_args(args)?;
    let state = AppState::from_config(config);

    tokio::fs::create_dir_all(state.config.invoice_dir())
        .await
        .context("creating invoice directory")?;

    bootstrap_admin(&state).await?;

    let app = handlers::router(state.clone());
    let listener = tokio::net::TcpListener::bind(state.config.bind)
        .await
        .with_context(|| format!("binding {}", state.config.bind))?;
    tracing::info!(addr = %state.config.bind, "vitrine listening");
    axum::serve(listener, app).await.context("serving")?;
    Ok(())
}

/// Create the bootstrap admin account when configured and absent.
async fn bootstrap_admin(state: &AppState) -> anyhow::Result<()> {
    let Some((email, password)) = state.config.bootstrap_admin.clone() else {
        return Ok(());
    };
    if state
        .users
        .find_by_email(&email)
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .is_some()
    {
        return Ok(());
    }
    let hash = hash_password(&password).map_err(|e| anyhow::anyhow!(e.to_string()))?;
    let admin = UserRecord::new(email.clone(), hash).with_role(Role::Admin);
    state
        .users
        .insert(admin)
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;
    tracing::info!(%email, "bootstrap admin created");
    Ok(())
}
