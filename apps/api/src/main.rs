//! Nutria access control API composition root.

#![forbid(unsafe_code)]

mod api_config;
mod api_router;
mod dto;
mod error;
mod handlers;
mod middleware;
mod state;

use std::sync::Arc;

use nutria_core::AppError;
use nutria_domain::{PermissionRegistry, ProvisioningDefinition};
use nutria_infrastructure::{
    PostgresAuthorizationRepository, PostgresIdentityDirectory, PostgresSecurityAdminRepository,
};
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use crate::api_config::{ApiConfig, init_tracing};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ApiConfig::load()?;

    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await
        .map_err(|error| AppError::Internal(format!("failed to connect to database: {error}")))?;

    sqlx::migrate!("../../crates/infrastructure/migrations")
        .run(&pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to run migrations: {error}")))?;

    if config.migrate_only {
        info!("database migrations applied successfully");
        return Ok(());
    }

    verify_permission_registry(&config).await?;

    let app_state = AppState::from_ports(
        Arc::new(PostgresIdentityDirectory::new(pool.clone())),
        Arc::new(PostgresAuthorizationRepository::new(pool.clone())),
        Arc::new(PostgresSecurityAdminRepository::new(pool)),
    );
    let app = api_router::build_router(app_state);

    let address = config.socket_address()?;
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind {address}: {error}")))?;

    info!(%address, "nutria api listening");

    axum::serve(listener, app)
        .await
        .map_err(|error| AppError::Internal(format!("api server failed: {error}")))
}

/// Refuses to start when the permission constants drift from the canonical catalog.
async fn verify_permission_registry(config: &ApiConfig) -> Result<(), AppError> {
    let raw = tokio::fs::read_to_string(&config.definition_path)
        .await
        .map_err(|error| {
            AppError::Validation(format!(
                "failed to read {}: {error}",
                config.definition_path.display()
            ))
        })?;

    let definition = ProvisioningDefinition::from_json(raw.as_str())?;
    PermissionRegistry::verify(&definition)?;

    info!(
        path = %config.definition_path.display(),
        permissions = definition.permissions.len(),
        "permission registry verified"
    );

    Ok(())
}
