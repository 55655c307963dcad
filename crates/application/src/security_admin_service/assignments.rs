use super::*;

impl SecurityAdminService {
    /// Assigns the role `(role_name, tenant_scope)` to a user.
    ///
    /// Re-assigning an active role changes nothing; an inactive row is
    /// reactivated rather than duplicated.
    pub async fn assign_role(
        &self,
        actor: UserId,
        user_id: UserId,
        role_name: &str,
        tenant_scope: Option<TenantId>,
    ) -> AppResult<AssignmentOutcome> {
        let scope = RoleScope::for_lookup(tenant_scope);
        let identity = self
            .authorize_scope(actor, Permission::RoleAssign, scope)
            .await?;

        let target = self
            .guard
            .authorization_service()
            .resolve_identity(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' was not found")))?;

        let name = RoleName::new(role_name)?;
        let role = self
            .repository
            .find_role_by_name(&name, scope)
            .await?
            .filter(|role| role.is_active)
            .ok_or_else(|| {
                AppError::NotFound(format!("role '{role_name}' was not found in {scope}"))
            })?;

        role.scope.ensure_assignable_to(&target)?;

        let audit = Self::audit_event(
            &identity,
            scope,
            AuditAction::SecurityRoleAssigned,
            "rbac_user_role",
            format!("{user_id}:{}", role.role_id),
            format!("assigned role '{}' to '{user_id}'", role.name),
        );
        let outcome = self
            .repository
            .assign_role(user_id, role.role_id, identity.user_id(), audit)
            .await?;

        if outcome.change != AssignmentChange::Unchanged {
            info!(%user_id, role = %role.name, %scope, change = ?outcome.change, "role assigned");
        }

        Ok(outcome)
    }

    /// Revokes the role `(role_name, tenant_scope)` from a user.
    ///
    /// Returns `None` when there was no active assignment to revoke.
    pub async fn revoke_role(
        &self,
        actor: UserId,
        user_id: UserId,
        role_name: &str,
        tenant_scope: Option<TenantId>,
    ) -> AppResult<Option<RoleAssignment>> {
        let scope = RoleScope::for_lookup(tenant_scope);
        let identity = self
            .authorize_scope(actor, Permission::RoleAssign, scope)
            .await?;

        // A malformed name cannot match a stored role, so there is nothing to revoke.
        let Ok(name) = RoleName::new(role_name) else {
            return Ok(None);
        };
        let Some(role) = self.repository.find_role_by_name(&name, scope).await? else {
            return Ok(None);
        };

        let audit = Self::audit_event(
            &identity,
            scope,
            AuditAction::SecurityRoleRevoked,
            "rbac_user_role",
            format!("{user_id}:{}", role.role_id),
            format!("revoked role '{}' from '{user_id}'", role.name),
        );
        let Some(revoked) = self
            .repository
            .revoke_role(user_id, role.role_id, audit)
            .await?
        else {
            return Ok(None);
        };
        info!(%user_id, role = %role.name, %scope, "role revoked");

        Ok(Some(revoked))
    }

    /// Lists assignments of roles in a tenant, or of system roles.
    pub async fn list_role_assignments(
        &self,
        actor: UserId,
        tenant_scope: Option<TenantId>,
    ) -> AppResult<Vec<RoleAssignment>> {
        let scope = RoleScope::for_lookup(tenant_scope);
        self.authorize_scope(actor, Permission::PermissionView, scope)
            .await?;

        self.repository.list_role_assignments(scope).await
    }
}
