use std::sync::Arc;

use tracing::info;

use nutria_core::{AppError, AppResult, Identity, TenantId, UserId};
use nutria_domain::{
    AuditAction, Permission, PermissionDefinition, PermissionName, RoleId, RoleName, RoleScope,
};

use crate::{
    AssignmentChange, AssignmentOutcome, AuditEvent, AuthorizationDecision,
    CreateRoleInput, DenialReason, RoleAssignment, RoleDefinition, RoleDraft,
    SecurityAdminRepository, TenantScopeGuard, UpdateRoleInput,
};

mod assignments;
mod bindings;
mod roles;

/// Application service for role, binding and assignment administration.
///
/// Every call is gated through the [`TenantScopeGuard`] on the scope of the
/// role it touches. System-scope administration additionally requires a
/// platform admin. Mutations hand their audit event to the repository so it
/// is stored in the same transaction as the change.
#[derive(Clone)]
pub struct SecurityAdminService {
    guard: TenantScopeGuard,
    repository: Arc<dyn SecurityAdminRepository>,
}

impl SecurityAdminService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(guard: TenantScopeGuard, repository: Arc<dyn SecurityAdminRepository>) -> Self {
        Self { guard, repository }
    }

    /// Returns catalog permissions, optionally filtered by module.
    pub async fn list_permissions(
        &self,
        actor: UserId,
        module: Option<&str>,
    ) -> AppResult<Vec<PermissionDefinition>> {
        self.guard
            .require(Some(actor), Permission::PermissionView, None)
            .await?;

        self.repository.list_permissions(module).await
    }

    async fn authorize_scope(
        &self,
        actor: UserId,
        permission: Permission,
        scope: RoleScope,
    ) -> AppResult<Identity> {
        let decision = self
            .guard
            .authorize(Some(actor), permission.as_str(), scope.tenant_id())
            .await?;

        if let AuthorizationDecision::Forbidden {
            identity,
            reason: DenialReason::TenantMismatch,
        } = &decision
        {
            return Err(AppError::TenantMismatch(format!(
                "user '{}' may not administer roles in {scope}",
                identity.user_id()
            )));
        }

        let identity = decision.into_identity(permission.as_str())?;
        if scope.is_system() && !identity.is_platform_admin() {
            return Err(AppError::Forbidden(format!(
                "user '{}' may not administer system roles",
                identity.user_id()
            )));
        }

        Ok(identity)
    }

    async fn load_role(&self, role_id: RoleId) -> AppResult<RoleDefinition> {
        self.repository
            .find_role(role_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' was not found")))
    }

    fn audit_event(
        actor: &Identity,
        scope: RoleScope,
        action: AuditAction,
        resource_type: &str,
        resource_id: String,
        detail: String,
    ) -> AuditEvent {
        AuditEvent {
            tenant_id: scope.tenant_id(),
            actor: actor.user_id(),
            action,
            resource_type: resource_type.to_owned(),
            resource_id,
            detail: Some(detail),
        }
    }
}
