use super::*;

#[derive(Debug, FromRow)]
struct CatalogIdRow {
    id: uuid::Uuid,
    name: String,
}

impl PostgresSecurityAdminRepository {
    pub(super) async fn set_role_permissions_impl(
        &self,
        role_id: RoleId,
        permissions: &[PermissionName],
        audit: &AuditEvent,
    ) -> AppResult<Vec<PermissionName>> {
        let mut transaction = self.begin().await?;

        lock_role_or_not_found(&mut transaction, role_id).await?;
        let granted = replace_bindings(&mut transaction, role_id.as_uuid(), permissions).await?;
        audit::append_audit(&mut transaction, audit).await?;

        commit(transaction).await?;
        Ok(granted)
    }
}

async fn lock_role_or_not_found(connection: &mut PgConnection, role_id: RoleId) -> AppResult<()> {
    roles::lock_role(connection, role_id)
        .await?
        .map(|_| ())
        .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' was not found")))
}

/// Replaces every grant of a role with exactly `permissions`.
///
/// Fails with `UnknownPermission` before deleting anything when a name is
/// missing from the catalog.
pub(super) async fn replace_bindings(
    connection: &mut PgConnection,
    role_id: uuid::Uuid,
    permissions: &[PermissionName],
) -> AppResult<Vec<PermissionName>> {
    let mut requested = permissions.to_vec();
    requested.sort();
    requested.dedup();
    let names: Vec<String> = requested
        .iter()
        .map(|permission| permission.as_str().to_owned())
        .collect();

    let catalog = sqlx::query_as::<_, CatalogIdRow>(
        r#"
        SELECT id, name
        FROM rbac_permissions
        WHERE name = ANY($1)
        "#,
    )
    .bind(&names)
    .fetch_all(&mut *connection)
    .await
    .map_err(|error| AppError::Internal(format!("failed to resolve permissions: {error}")))?;

    if let Some(unknown) = names
        .iter()
        .find(|name| !catalog.iter().any(|row| &row.name == *name))
    {
        return Err(AppError::UnknownPermission(format!(
            "permission '{unknown}' does not exist"
        )));
    }

    sqlx::query(
        r#"
        DELETE FROM rbac_role_permissions
        WHERE role_id = $1
        "#,
    )
    .bind(role_id)
    .execute(&mut *connection)
    .await
    .map_err(|error| AppError::Internal(format!("failed to clear role grants: {error}")))?;

    let permission_ids: Vec<uuid::Uuid> = catalog.iter().map(|row| row.id).collect();
    sqlx::query(
        r#"
        INSERT INTO rbac_role_permissions (role_id, permission_id)
        SELECT $1, permission_id
        FROM UNNEST($2::UUID[]) AS permission_id
        "#,
    )
    .bind(role_id)
    .bind(&permission_ids)
    .execute(&mut *connection)
    .await
    .map_err(|error| AppError::Internal(format!("failed to persist role grants: {error}")))?;

    Ok(requested)
}
