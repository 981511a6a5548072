use std::sync::Arc;

use anyhow::Context;
use dotenvy::dotenv;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use gatehouse::router::init_router;
use gatehouse::state::AppState;
use gatehouse_config::{CorsConfig, JwtConfig, ServerConfig};
use gatehouse_db::{InMemoryCredentialStore, PgCredentialStore, init_db_pool, run_migrations};
use gatehouse_observability::{init_metrics, init_tracing, metrics_app};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    init_tracing()?;

    let jwt_config = JwtConfig::from_env().context("invalid JWT configuration")?;
    let cors_config = CorsConfig::from_env();
    let server_config = ServerConfig::from_env().context("invalid server configuration")?;

    let state = match &server_config.database_url {
        Some(database_url) => {
            let pool = init_db_pool(database_url)
                .await
                .context("failed to connect to database")?;
            run_migrations(&pool)
                .await
                .context("failed to run migrations")?;
            AppState::new(Arc::new(PgCredentialStore::new(pool)), &jwt_config, cors_config)?
        }
        None => {
            warn!("DATABASE_URL is not set; using the in-memory credential store");
            AppState::new(Arc::new(InMemoryCredentialStore::new()), &jwt_config, cors_config)?
        }
    };

    if let Some(handle) = init_metrics() {
        let metrics_address = server_config.metrics_address();
        let listener = TcpListener::bind(&metrics_address)
            .await
            .with_context(|| format!("failed to bind metrics listener on {}", metrics_address))?;
        info!("Metrics available at http://{}/metrics", metrics_address);

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, metrics_app(handle)).await {
                error!(error = %e, "Metrics server stopped");
            }
        });
    }

    let app = init_router(state);

    let address = server_config.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {}", address))?;
    info!("Server running on http://{}", address);
    info!("OpenAPI document at http://{}/api-docs/openapi.json", address);

    axum::serve(listener, app).await?;
    Ok(())
}
