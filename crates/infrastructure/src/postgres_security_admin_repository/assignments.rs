use super::*;

impl PostgresSecurityAdminRepository {
    pub(super) async fn assign_role_impl(
        &self,
        user_id: UserId,
        role_id: RoleId,
        assigned_by: UserId,
        audit: &AuditEvent,
    ) -> AppResult<AssignmentOutcome> {
        let mut transaction = self.begin().await?;

        let is_active = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT is_active
            FROM rbac_roles
            WHERE id = $1
            FOR SHARE
            "#,
        )
        .bind(role_id.as_uuid())
        .fetch_optional(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to resolve role: {error}")))?;

        if is_active != Some(true) {
            return Err(AppError::NotFound(format!(
                "role '{role_id}' was not found or is retired"
            )));
        }

        // No row back means the assignment was already active.
        let inserted = sqlx::query_scalar::<_, bool>(
            r#"
            INSERT INTO rbac_user_roles (user_id, role_id, is_active, assigned_by)
            VALUES ($1, $2, true, $3)
            ON CONFLICT (user_id, role_id) DO UPDATE
            SET is_active = true,
                assigned_by = EXCLUDED.assigned_by,
                assigned_at = now(),
                deactivated_at = NULL
            WHERE NOT rbac_user_roles.is_active
            RETURNING (xmax = 0) AS inserted
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(role_id.as_uuid())
        .bind(assigned_by.as_uuid())
        .fetch_optional(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to assign role: {error}")))?;

        let change = match inserted {
            Some(true) => AssignmentChange::Created,
            Some(false) => AssignmentChange::Reactivated,
            None => AssignmentChange::Unchanged,
        };
        if change != AssignmentChange::Unchanged {
            audit::append_audit(&mut transaction, audit).await?;
        }

        let assignment = fetch_assignment(&mut transaction, user_id, role_id)
            .await?
            .ok_or_else(|| {
                AppError::Internal(format!("assignment '{user_id}:{role_id}' vanished"))
            })?;
        commit(transaction).await?;

        Ok(AssignmentOutcome { assignment, change })
    }

    pub(super) async fn revoke_role_impl(
        &self,
        user_id: UserId,
        role_id: RoleId,
        audit: &AuditEvent,
    ) -> AppResult<Option<RoleAssignment>> {
        let mut transaction = self.begin().await?;

        let rows_affected = sqlx::query(
            r#"
            UPDATE rbac_user_roles
            SET is_active = false,
                deactivated_at = now()
            WHERE user_id = $1
                AND role_id = $2
                AND is_active
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(role_id.as_uuid())
        .execute(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to revoke role: {error}")))?
        .rows_affected();

        if rows_affected == 0 {
            return Ok(None);
        }

        let assignment = fetch_assignment(&mut transaction, user_id, role_id).await?;
        audit::append_audit(&mut transaction, audit).await?;
        commit(transaction).await?;

        Ok(assignment)
    }

    pub(super) async fn list_role_assignments_impl(
        &self,
        scope: RoleScope,
    ) -> AppResult<Vec<RoleAssignment>> {
        let rows = sqlx::query_as::<_, AssignmentRow>(
            r#"
            SELECT
                user_roles.user_id,
                user_roles.role_id,
                roles.name AS role_name,
                roles.tenant_id,
                user_roles.is_active,
                user_roles.assigned_by,
                user_roles.assigned_at,
                user_roles.deactivated_at
            FROM rbac_user_roles AS user_roles
            INNER JOIN rbac_roles AS roles
                ON roles.id = user_roles.role_id
            WHERE roles.tenant_id IS NOT DISTINCT FROM $1
            ORDER BY user_roles.user_id, roles.name
            "#,
        )
        .bind(scope_tenant(scope))
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list role assignments: {error}")))?;

        rows.into_iter().map(AssignmentRow::into_assignment).collect()
    }
}

async fn fetch_assignment(
    connection: &mut PgConnection,
    user_id: UserId,
    role_id: RoleId,
) -> AppResult<Option<RoleAssignment>> {
    let row = sqlx::query_as::<_, AssignmentRow>(
        r#"
        SELECT
            user_roles.user_id,
            user_roles.role_id,
            roles.name AS role_name,
            roles.tenant_id,
            user_roles.is_active,
            user_roles.assigned_by,
            user_roles.assigned_at,
            user_roles.deactivated_at
        FROM rbac_user_roles AS user_roles
        INNER JOIN rbac_roles AS roles
            ON roles.id = user_roles.role_id
        WHERE user_roles.user_id = $1
            AND user_roles.role_id = $2
        "#,
    )
    .bind(user_id.as_uuid())
    .bind(role_id.as_uuid())
    .fetch_optional(&mut *connection)
    .await
    .map_err(|error| AppError::Internal(format!("failed to load role assignment: {error}")))?;

    row.map(AssignmentRow::into_assignment).transpose()
}
