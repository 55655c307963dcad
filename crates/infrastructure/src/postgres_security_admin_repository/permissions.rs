use super::*;

impl PostgresSecurityAdminRepository {
    pub(super) async fn list_permissions_impl(
        &self,
        module: Option<&str>,
    ) -> AppResult<Vec<PermissionDefinition>> {
        let rows = sqlx::query_as::<_, PermissionRow>(
            r#"
            SELECT name, module, action, description
            FROM rbac_permissions
            WHERE $1::TEXT IS NULL OR module = $1
            ORDER BY name
            "#,
        )
        .bind(module)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list permissions: {error}")))?;

        rows.into_iter().map(PermissionRow::into_definition).collect()
    }

    pub(super) async fn list_permissions_for_role_impl(
        &self,
        role_id: RoleId,
    ) -> AppResult<Vec<PermissionDefinition>> {
        let rows = sqlx::query_as::<_, PermissionRow>(
            r#"
            SELECT
                permissions.name,
                permissions.module,
                permissions.action,
                permissions.description
            FROM rbac_role_permissions AS grants
            INNER JOIN rbac_permissions AS permissions
                ON permissions.id = grants.permission_id
            WHERE grants.role_id = $1
            ORDER BY permissions.name
            "#,
        )
        .bind(role_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list permissions for role: {error}"))
        })?;

        rows.into_iter().map(PermissionRow::into_definition).collect()
    }
}

/// Inserts a catalog entry or refreshes its descriptive fields by name.
pub(super) async fn upsert_permission(
    connection: &mut PgConnection,
    permission: &PermissionDefinition,
) -> AppResult<UpsertOutcome> {
    let inserted = sqlx::query_scalar::<_, bool>(
        r#"
        INSERT INTO rbac_permissions (name, module, action, description)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (name) DO UPDATE
        SET module = EXCLUDED.module,
            action = EXCLUDED.action,
            description = EXCLUDED.description,
            updated_at = now()
        RETURNING (xmax = 0) AS inserted
        "#,
    )
    .bind(permission.name.as_str())
    .bind(permission.module.as_str())
    .bind(permission.action.as_str())
    .bind(permission.description.as_str())
    .fetch_one(&mut *connection)
    .await
    .map_err(|error| {
        AppError::Internal(format!(
            "failed to upsert permission '{}': {error}",
            permission.name
        ))
    })?;

    Ok(if inserted {
        UpsertOutcome::Created
    } else {
        UpsertOutcome::Updated
    })
}
