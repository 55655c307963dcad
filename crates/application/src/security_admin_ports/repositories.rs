use async_trait::async_trait;

use nutria_core::{AppResult, UserId};
use nutria_domain::{
    PermissionDefinition, PermissionName, RoleId, RoleName, RoleScope, RoleTemplate,
};

use super::{
    AssignmentOutcome, AuditEvent, CreateRoleInput, ProvisioningReport, RoleAssignment, RoleDefinition,
    UpdateRoleInput, UpsertOutcome,
};

/// Repository port for the permission catalog, roles, bindings and assignments.
///
/// Every mutating method is one unit of work: implementations apply it inside
/// a single transaction so concurrent readers never observe partial state.
/// Administrative mutations take the `AuditEvent` describing them and append
/// it in that same transaction; a failed audit write aborts the mutation.
#[async_trait]
pub trait SecurityAdminRepository: Send + Sync {
    /// Inserts a permission or refreshes its descriptive fields.
    async fn upsert_permission(
        &self,
        permission: PermissionDefinition,
    ) -> AppResult<UpsertOutcome>;

    /// Lists catalog permissions, optionally restricted to one module.
    async fn list_permissions(
        &self,
        module: Option<&str>,
    ) -> AppResult<Vec<PermissionDefinition>>;

    /// Creates a role without grants.
    ///
    /// Fails with `DuplicateRole` when `(name, scope)` already exists, retired
    /// roles included.
    async fn create_role(
        &self,
        input: CreateRoleInput,
        audit: AuditEvent,
    ) -> AppResult<RoleDefinition>;

    /// Finds a role by identifier.
    async fn find_role(&self, role_id: RoleId) -> AppResult<Option<RoleDefinition>>;

    /// Finds a role by key within a scope.
    async fn find_role_by_name(
        &self,
        name: &RoleName,
        scope: RoleScope,
    ) -> AppResult<Option<RoleDefinition>>;

    /// Updates the label and description of a role.
    async fn update_role(
        &self,
        role_id: RoleId,
        input: UpdateRoleInput,
        audit: AuditEvent,
    ) -> AppResult<RoleDefinition>;

    /// Marks a role inactive.
    ///
    /// Fails with `RoleInUse` while active assignments reference the role.
    async fn retire_role(&self, role_id: RoleId, audit: AuditEvent) -> AppResult<RoleDefinition>;

    /// Replaces the role's grant set with exactly `permissions`.
    ///
    /// Fails with `UnknownPermission`, leaving the previous set intact, when a
    /// name is missing from the catalog.
    async fn set_role_permissions(
        &self,
        role_id: RoleId,
        permissions: &[PermissionName],
        audit: AuditEvent,
    ) -> AppResult<Vec<PermissionName>>;

    /// Lists roles in one scope, retired roles included.
    async fn list_roles(&self, scope: RoleScope) -> AppResult<Vec<RoleDefinition>>;

    /// Lists catalog entries currently bound to a role.
    async fn list_permissions_for_role(
        &self,
        role_id: RoleId,
    ) -> AppResult<Vec<PermissionDefinition>>;

    /// Activates the `(user, role)` assignment, inserting or reactivating it.
    ///
    /// Fails with `NotFound` when the role no longer exists or is retired.
    /// `audit` is only appended when the row actually changed.
    async fn assign_role(
        &self,
        user_id: UserId,
        role_id: RoleId,
        assigned_by: UserId,
        audit: AuditEvent,
    ) -> AppResult<AssignmentOutcome>;

    /// Deactivates the `(user, role)` assignment.
    ///
    /// Returns the deactivated row, or `None` when no active row existed, in
    /// which case `audit` is discarded.
    async fn revoke_role(
        &self,
        user_id: UserId,
        role_id: RoleId,
        audit: AuditEvent,
    ) -> AppResult<Option<RoleAssignment>>;

    /// Lists assignments for roles in one scope, inactive rows included.
    async fn list_role_assignments(&self, scope: RoleScope) -> AppResult<Vec<RoleAssignment>>;

    /// Applies a canonical catalog in one transaction.
    ///
    /// Upserts `permissions`, upserts every role of `roles` into `scope`
    /// (reactivating retired ones) and fully replaces each role's grants.
    /// Assignments are never touched.
    async fn apply_provisioning(
        &self,
        permissions: &[PermissionDefinition],
        scope: RoleScope,
        roles: &[RoleTemplate],
    ) -> AppResult<ProvisioningReport>;
}
