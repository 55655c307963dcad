use async_trait::async_trait;

use nutria_application::AuthorizationRepository;
use nutria_core::{AppError, AppResult, UserId};
use nutria_domain::PermissionName;

use sqlx::{FromRow, PgPool};

/// PostgreSQL-backed repository for effective permission lookups.
#[derive(Clone)]
pub struct PostgresAuthorizationRepository {
    pool: PgPool,
}

impl PostgresAuthorizationRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct PermissionRow {
    permission: String,
}

#[async_trait]
impl AuthorizationRepository for PostgresAuthorizationRepository {
    async fn list_permissions_for_user(&self, user_id: UserId) -> AppResult<Vec<PermissionName>> {
        let rows = sqlx::query_as::<_, PermissionRow>(
            r#"
            SELECT DISTINCT permissions.name AS permission
            FROM rbac_user_roles AS user_roles
            INNER JOIN rbac_roles AS roles
                ON roles.id = user_roles.role_id
            INNER JOIN rbac_role_permissions AS grants
                ON grants.role_id = roles.id
            INNER JOIN rbac_permissions AS permissions
                ON permissions.id = grants.permission_id
            WHERE user_roles.user_id = $1
                AND user_roles.is_active
                AND roles.is_active
            ORDER BY permissions.name
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load permissions: {error}")))?;

        rows.into_iter()
            .map(|row| {
                PermissionName::new(row.permission.as_str()).map_err(|error| {
                    AppError::Internal(format!(
                        "failed to decode permission '{}' for user '{user_id}': {error}",
                        row.permission
                    ))
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests;
