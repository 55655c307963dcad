use super::*;

impl PostgresSecurityAdminRepository {
    pub(super) async fn create_role_impl(
        &self,
        input: CreateRoleInput,
        audit: &AuditEvent,
    ) -> AppResult<RoleDefinition> {
        let label = input
            .label
            .filter(|label| !label.trim().is_empty())
            .unwrap_or_else(|| input.name.to_string());

        let mut transaction = self.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO rbac_roles (id, name, label, description, is_system_role, tenant_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(input.role_id.as_uuid())
        .bind(input.name.as_str())
        .bind(label.as_str())
        .bind(input.description.as_str())
        .bind(input.scope.is_system())
        .bind(scope_tenant(input.scope))
        .execute(&mut *transaction)
        .await
        .map_err(|error| map_role_conflict(error, &input.name, input.scope))?;

        audit::append_audit(&mut transaction, audit).await?;
        commit(transaction).await?;

        Ok(RoleDefinition {
            role_id: input.role_id,
            name: input.name,
            label,
            description: input.description,
            scope: input.scope,
            is_active: true,
            permissions: Vec::new(),
        })
    }

    pub(super) async fn find_role_by_name_impl(
        &self,
        name: &RoleName,
        scope: RoleScope,
    ) -> AppResult<Option<RoleDefinition>> {
        let rows = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT
                roles.id AS role_id,
                roles.name,
                roles.label,
                roles.description,
                roles.is_system_role,
                roles.tenant_id,
                roles.is_active,
                permissions.name AS permission
            FROM rbac_roles AS roles
            LEFT JOIN rbac_role_permissions AS grants
                ON grants.role_id = roles.id
            LEFT JOIN rbac_permissions AS permissions
                ON permissions.id = grants.permission_id
            WHERE roles.name = $1
                AND roles.tenant_id IS NOT DISTINCT FROM $2
            "#,
        )
        .bind(name.as_str())
        .bind(scope_tenant(scope))
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find role: {error}")))?;

        Ok(aggregate_roles(rows)?.into_iter().next())
    }

    pub(super) async fn list_roles_impl(&self, scope: RoleScope) -> AppResult<Vec<RoleDefinition>> {
        let rows = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT
                roles.id AS role_id,
                roles.name,
                roles.label,
                roles.description,
                roles.is_system_role,
                roles.tenant_id,
                roles.is_active,
                permissions.name AS permission
            FROM rbac_roles AS roles
            LEFT JOIN rbac_role_permissions AS grants
                ON grants.role_id = roles.id
            LEFT JOIN rbac_permissions AS permissions
                ON permissions.id = grants.permission_id
            WHERE roles.tenant_id IS NOT DISTINCT FROM $1
            ORDER BY roles.name, permissions.name
            "#,
        )
        .bind(scope_tenant(scope))
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list roles: {error}")))?;

        aggregate_roles(rows)
    }

    pub(super) async fn update_role_impl(
        &self,
        role_id: RoleId,
        input: UpdateRoleInput,
        audit: &AuditEvent,
    ) -> AppResult<RoleDefinition> {
        let mut transaction = self.begin().await?;

        let updated = sqlx::query_scalar::<_, uuid::Uuid>(
            r#"
            UPDATE rbac_roles
            SET label = $2,
                description = $3,
                updated_at = now()
            WHERE id = $1
            RETURNING id
            "#,
        )
        .bind(role_id.as_uuid())
        .bind(input.label.as_str())
        .bind(input.description.as_str())
        .fetch_optional(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to update role: {error}")))?;

        if updated.is_none() {
            return Err(AppError::NotFound(format!("role '{role_id}' was not found")));
        }

        let role = fetch_role(&mut transaction, role_id.as_uuid()).await?;
        audit::append_audit(&mut transaction, audit).await?;
        commit(transaction).await?;

        role.ok_or_else(|| AppError::NotFound(format!("role '{role_id}' was not found")))
    }

    pub(super) async fn retire_role_impl(
        &self,
        role_id: RoleId,
        audit: &AuditEvent,
    ) -> AppResult<RoleDefinition> {
        let mut transaction = self.begin().await?;

        lock_role(&mut transaction, role_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' was not found")))?;

        let active_assignments = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM rbac_user_roles
            WHERE role_id = $1
                AND is_active
            "#,
        )
        .bind(role_id.as_uuid())
        .fetch_one(&mut *transaction)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to count role assignments: {error}"))
        })?;

        if active_assignments > 0 {
            return Err(AppError::RoleInUse(format!(
                "role '{role_id}' still has {active_assignments} active assignment(s)"
            )));
        }

        sqlx::query(
            r#"
            UPDATE rbac_roles
            SET is_active = false,
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(role_id.as_uuid())
        .execute(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to retire role: {error}")))?;

        let role = fetch_role(&mut transaction, role_id.as_uuid()).await?;
        audit::append_audit(&mut transaction, audit).await?;
        commit(transaction).await?;

        role.ok_or_else(|| AppError::NotFound(format!("role '{role_id}' was not found")))
    }
}

/// Loads one role with its grant set.
pub(super) async fn fetch_role(
    connection: &mut PgConnection,
    role_id: uuid::Uuid,
) -> AppResult<Option<RoleDefinition>> {
    let rows = sqlx::query_as::<_, RoleRow>(
        r#"
        SELECT
            roles.id AS role_id,
            roles.name,
            roles.label,
            roles.description,
            roles.is_system_role,
            roles.tenant_id,
            roles.is_active,
            permissions.name AS permission
        FROM rbac_roles AS roles
        LEFT JOIN rbac_role_permissions AS grants
            ON grants.role_id = roles.id
        LEFT JOIN rbac_permissions AS permissions
            ON permissions.id = grants.permission_id
        WHERE roles.id = $1
        "#,
    )
    .bind(role_id)
    .fetch_all(&mut *connection)
    .await
    .map_err(|error| AppError::Internal(format!("failed to load role: {error}")))?;

    Ok(aggregate_roles(rows)?.into_iter().next())
}

/// Locks a role row for the rest of the transaction and returns its active flag.
pub(super) async fn lock_role(
    connection: &mut PgConnection,
    role_id: RoleId,
) -> AppResult<Option<bool>> {
    sqlx::query_scalar::<_, bool>(
        r#"
        SELECT is_active
        FROM rbac_roles
        WHERE id = $1
        FOR UPDATE
        "#,
    )
    .bind(role_id.as_uuid())
    .fetch_optional(&mut *connection)
    .await
    .map_err(|error| AppError::Internal(format!("failed to lock role: {error}")))
}
