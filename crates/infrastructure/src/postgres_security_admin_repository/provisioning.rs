use tracing::debug;

use super::*;

impl PostgresSecurityAdminRepository {
    pub(super) async fn apply_provisioning_impl(
        &self,
        permissions: &[PermissionDefinition],
        scope: RoleScope,
        roles: &[RoleTemplate],
    ) -> AppResult<ProvisioningReport> {
        let mut transaction = self.begin().await?;
        let mut report = ProvisioningReport::default();

        for permission in permissions {
            report.record_permission(
                permissions::upsert_permission(&mut transaction, permission).await?,
            );
        }

        for template in roles {
            let upserted = upsert_role(&mut transaction, template, scope).await?;
            report.record_role(if upserted.inserted {
                UpsertOutcome::Created
            } else {
                UpsertOutcome::Updated
            });

            let granted = bindings::replace_bindings(
                &mut transaction,
                upserted.id,
                &template.permission_set(),
            )
            .await?;
            report.bindings_written += granted.len();

            debug!(
                role = %template.name,
                %scope,
                grants = granted.len(),
                "role provisioned"
            );
        }

        commit(transaction).await?;
        Ok(report)
    }
}

/// Inserts a role or refreshes its label and description, reactivating it.
async fn upsert_role(
    connection: &mut PgConnection,
    template: &RoleTemplate,
    scope: RoleScope,
) -> AppResult<UpsertedRow> {
    sqlx::query_as::<_, UpsertedRow>(
        r#"
        INSERT INTO rbac_roles (name, label, description, is_system_role, tenant_id)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT ON CONSTRAINT rbac_roles_name_scope_key DO UPDATE
        SET label = EXCLUDED.label,
            description = EXCLUDED.description,
            is_active = true,
            updated_at = now()
        RETURNING id, (xmax = 0) AS inserted
        "#,
    )
    .bind(template.name.as_str())
    .bind(template.display_label())
    .bind(template.description.as_str())
    .bind(scope.is_system())
    .bind(scope_tenant(scope))
    .fetch_one(&mut *connection)
    .await
    .map_err(|error| {
        AppError::Internal(format!(
            "failed to provision role '{}' in {scope}: {error}",
            template.name
        ))
    })
}
