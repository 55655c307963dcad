use std::collections::BTreeSet;

use super::*;

impl SecurityAdminService {
    /// Replaces the grant set of a role with exactly `permission_names`.
    ///
    /// The whole call fails with `UnknownPermission` if any name is missing
    /// from the catalog; the previous grants stay untouched in that case.
    pub async fn set_role_permissions(
        &self,
        actor: UserId,
        role_id: RoleId,
        permission_names: &[String],
    ) -> AppResult<Vec<PermissionName>> {
        let role = self.load_role(role_id).await?;
        let identity = self
            .authorize_scope(actor, Permission::RoleManage, role.scope)
            .await?;

        if !role.is_active {
            return Err(AppError::Validation(format!(
                "role '{}' is retired and cannot receive grants",
                role.name
            )));
        }

        let permissions = permission_names
            .iter()
            .map(|value| {
                PermissionName::new(value.as_str()).map_err(|_| {
                    AppError::UnknownPermission(format!("permission '{value}' does not exist"))
                })
            })
            .collect::<AppResult<Vec<_>>>()?;

        let listed = permissions
            .iter()
            .map(PermissionName::as_str)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect::<Vec<_>>()
            .join(", ");
        let audit = Self::audit_event(
            &identity,
            role.scope,
            AuditAction::SecurityRolePermissionsReplaced,
            "rbac_role_permissions",
            role_id.to_string(),
            format!("set grants of role '{}' to [{listed}]", role.name),
        );

        let granted = self
            .repository
            .set_role_permissions(role_id, &permissions, audit)
            .await?;
        info!(
            %role_id,
            role = %role.name,
            grants = granted.len(),
            "role permissions replaced"
        );

        Ok(granted)
    }

    /// Lists catalog entries bound to a role.
    pub async fn list_permissions_for_role(
        &self,
        actor: UserId,
        role_id: RoleId,
    ) -> AppResult<Vec<PermissionDefinition>> {
        let role = self.load_role(role_id).await?;
        self.authorize_scope(actor, Permission::PermissionView, role.scope)
            .await?;

        self.repository.list_permissions_for_role(role_id).await
    }
}
