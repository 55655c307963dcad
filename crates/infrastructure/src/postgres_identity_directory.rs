use async_trait::async_trait;

use nutria_application::IdentityDirectory;
use nutria_core::{AppError, AppResult, Identity, TenantId, UserId, UserType};

use sqlx::{FromRow, PgPool};

/// Read-only view over the platform user table.
#[derive(Clone)]
pub struct PostgresIdentityDirectory {
    pool: PgPool,
}

impl PostgresIdentityDirectory {
    /// Creates a directory with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct PlatformUserRow {
    id: uuid::Uuid,
    tenant_id: Option<uuid::Uuid>,
    user_type: String,
}

#[async_trait]
impl IdentityDirectory for PostgresIdentityDirectory {
    async fn find_identity(&self, user_id: UserId) -> AppResult<Option<Identity>> {
        let row = sqlx::query_as::<_, PlatformUserRow>(
            r#"
            SELECT id, tenant_id, user_type
            FROM platform_users
            WHERE id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to resolve identity: {error}")))?;

        row.map(identity_from_row).transpose()
    }
}

fn identity_from_row(row: PlatformUserRow) -> AppResult<Identity> {
    let user_type = UserType::parse(row.user_type.as_str()).ok_or_else(|| {
        AppError::Internal(format!(
            "user '{}' has unsupported user type '{}'",
            row.id, row.user_type
        ))
    })?;

    Ok(Identity::new(
        UserId::from_uuid(row.id),
        row.tenant_id.map(TenantId::from_uuid),
        user_type,
    ))
}
