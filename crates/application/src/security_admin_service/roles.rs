use super::*;

impl SecurityAdminService {
    /// Creates a role in the requested scope and emits an audit event.
    pub async fn create_role(&self, actor: UserId, draft: RoleDraft) -> AppResult<RoleDefinition> {
        let scope = RoleScope::from_parts(draft.is_system_role, draft.tenant_id)?;
        let name = RoleName::new(draft.name)?;
        let identity = self
            .authorize_scope(actor, Permission::RoleManage, scope)
            .await?;

        let role_id = RoleId::new();
        let audit = Self::audit_event(
            &identity,
            scope,
            AuditAction::SecurityRoleCreated,
            "rbac_role",
            role_id.to_string(),
            format!("created role '{name}'"),
        );
        let role = self
            .repository
            .create_role(
                CreateRoleInput {
                    role_id,
                    name,
                    label: draft.label,
                    description: draft.description,
                    scope,
                },
                audit,
            )
            .await?;
        info!(%role_id, role = %role.name, %scope, "role created");

        Ok(role)
    }

    /// Updates the display label and description of a role.
    pub async fn update_role(
        &self,
        actor: UserId,
        role_id: RoleId,
        input: UpdateRoleInput,
    ) -> AppResult<RoleDefinition> {
        let role = self.load_role(role_id).await?;
        let identity = self
            .authorize_scope(actor, Permission::RoleManage, role.scope)
            .await?;

        if input.label.trim().is_empty() {
            return Err(AppError::Validation(
                "role label must not be empty".to_owned(),
            ));
        }

        let audit = Self::audit_event(
            &identity,
            role.scope,
            AuditAction::SecurityRoleUpdated,
            "rbac_role",
            role_id.to_string(),
            format!("relabeled role '{}' as '{}'", role.name, input.label),
        );
        let updated = self.repository.update_role(role_id, input, audit).await?;
        info!(%role_id, role = %updated.name, label = %updated.label, "role updated");

        Ok(updated)
    }

    /// Retires a role that no active assignment references.
    pub async fn retire_role(&self, actor: UserId, role_id: RoleId) -> AppResult<RoleDefinition> {
        let role = self.load_role(role_id).await?;
        let identity = self
            .authorize_scope(actor, Permission::RoleManage, role.scope)
            .await?;

        if !role.is_active {
            return Ok(role);
        }

        let audit = Self::audit_event(
            &identity,
            role.scope,
            AuditAction::SecurityRoleRetired,
            "rbac_role",
            role_id.to_string(),
            format!("retired role '{}'", role.name),
        );
        let retired = self.repository.retire_role(role_id, audit).await?;
        info!(%role_id, role = %retired.name, "role retired");

        Ok(retired)
    }

    /// Lists roles of a tenant, or system roles when `tenant_id` is `None`.
    pub async fn list_roles_for_tenant(
        &self,
        actor: UserId,
        tenant_id: Option<TenantId>,
    ) -> AppResult<Vec<RoleDefinition>> {
        let scope = RoleScope::for_lookup(tenant_id);
        self.authorize_scope(actor, Permission::PermissionView, scope)
            .await?;

        self.repository.list_roles(scope).await
    }
}
