//! Nutria access control provisioning loader.
//!
//! Applies the canonical permission catalog and system roles, then
//! materializes tenant role templates for every `--tenant` given.

#![forbid(unsafe_code)]

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use nutria_application::ProvisioningService;
use nutria_core::{AppError, AppResult, TenantId};
use nutria_domain::{PermissionRegistry, ProvisioningDefinition};
use nutria_infrastructure::PostgresSecurityAdminRepository;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(
    name = "nutria-provisioner",
    about = "Applies the canonical permission catalog and role definitions"
)]
struct ProvisionerArgs {
    /// Onboard a tenant from the role templates. Repeatable.
    #[arg(long = "tenant", value_name = "UUID", value_parser = TenantId::parse)]
    tenants: Vec<TenantId>,
    /// Validate the definition without touching the database.
    #[arg(long)]
    dry_run: bool,
}

#[derive(Debug, Clone)]
struct ProvisionerConfig {
    database_url: Option<String>,
    definition_path: PathBuf,
    args: ProvisionerArgs,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ProvisionerConfig::load()?;
    let definition = load_definition(&config).await?;

    if config.args.dry_run {
        info!(
            path = %config.definition_path.display(),
            permissions = definition.permissions.len(),
            roles = definition.roles.len(),
            "provisioning definition is valid, dry run requested"
        );
        return Ok(());
    }

    let database_url = config
        .database_url
        .as_deref()
        .ok_or_else(|| AppError::Validation("DATABASE_URL is required".to_owned()))?;
    let pool = connect_pool(database_url).await?;

    sqlx::migrate!("../../crates/infrastructure/migrations")
        .run(&pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to run migrations: {error}")))?;

    let service = ProvisioningService::new(Arc::new(PostgresSecurityAdminRepository::new(pool)));
    service.provision(&definition).await?;

    for tenant_id in &config.args.tenants {
        service.provision_tenant(*tenant_id, &definition).await?;
    }

    info!(
        tenants = config.args.tenants.len(),
        "nutria-provisioner finished"
    );

    Ok(())
}

impl ProvisionerConfig {
    fn load() -> AppResult<Self> {
        let args = ProvisionerArgs::parse().deduplicated();
        let database_url = env::var("DATABASE_URL")
            .ok()
            .filter(|value| !value.trim().is_empty());
        let definition_path = env::var("RBAC_DEFINITION_PATH")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map_or_else(|| PathBuf::from("provisioning/rbac.json"), PathBuf::from);

        Ok(Self {
            database_url,
            definition_path,
            args,
        })
    }
}

impl ProvisionerArgs {
    fn deduplicated(mut self) -> Self {
        self.tenants.sort();
        self.tenants.dedup();
        self
    }
}

async fn load_definition(config: &ProvisionerConfig) -> AppResult<ProvisioningDefinition> {
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

    Ok(definition)
}

async fn connect_pool(database_url: &str) -> AppResult<PgPool> {
    PgPoolOptions::new()
        .max_connections(2)
        .connect(database_url)
        .await
        .map_err(|error| AppError::Internal(format!("failed to connect to database: {error}")))
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}
