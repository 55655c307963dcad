use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection, PgPool, Postgres, Transaction};

use nutria_application::{
    AssignmentChange, AssignmentOutcome, AuditEvent, CreateRoleInput, ProvisioningReport, RoleAssignment,
    RoleDefinition, SecurityAdminRepository, UpdateRoleInput, UpsertOutcome,
};
use nutria_core::{AppError, AppResult, TenantId, UserId};
use nutria_domain::{
    PermissionDefinition, PermissionName, RoleId, RoleName, RoleScope, RoleTemplate,
};

mod assignments;
mod audit;
mod bindings;
mod permissions;
mod provisioning;
mod roles;

/// PostgreSQL-backed repository for permission, role and assignment administration.
///
/// Administrative mutations write their audit entry to `audit_log_entries`
/// inside the same transaction as the change.
#[derive(Clone)]
pub struct PostgresSecurityAdminRepository {
    pool: PgPool,
}

impl PostgresSecurityAdminRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn begin(&self) -> AppResult<Transaction<'static, Postgres>> {
        self.pool
            .begin()
            .await
            .map_err(|error| AppError::Internal(format!("failed to begin transaction: {error}")))
    }
}

async fn commit(transaction: Transaction<'_, Postgres>) -> AppResult<()> {
    transaction
        .commit()
        .await
        .map_err(|error| AppError::Internal(format!("failed to commit transaction: {error}")))
}

#[derive(Debug, FromRow)]
struct PermissionRow {
    name: String,
    module: String,
    action: String,
    description: String,
}

impl PermissionRow {
    fn into_definition(self) -> AppResult<PermissionDefinition> {
        let name = PermissionName::new(self.name.as_str()).map_err(|error| {
            AppError::Internal(format!("invalid stored permission '{}': {error}", self.name))
        })?;

        Ok(PermissionDefinition {
            name,
            module: self.module,
            action: self.action,
            description: self.description,
        })
    }
}

#[derive(Debug, FromRow)]
struct RoleRow {
    role_id: uuid::Uuid,
    name: String,
    label: String,
    description: String,
    is_system_role: bool,
    tenant_id: Option<uuid::Uuid>,
    is_active: bool,
    permission: Option<String>,
}

#[derive(Debug, FromRow)]
struct AssignmentRow {
    user_id: uuid::Uuid,
    role_id: uuid::Uuid,
    role_name: String,
    tenant_id: Option<uuid::Uuid>,
    is_active: bool,
    assigned_by: Option<uuid::Uuid>,
    assigned_at: DateTime<Utc>,
    deactivated_at: Option<DateTime<Utc>>,
}

impl AssignmentRow {
    fn into_assignment(self) -> AppResult<RoleAssignment> {
        let role_name = RoleName::new(self.role_name.as_str()).map_err(|error| {
            AppError::Internal(format!("invalid stored role '{}': {error}", self.role_name))
        })?;

        Ok(RoleAssignment {
            user_id: UserId::from_uuid(self.user_id),
            role_id: RoleId::from_uuid(self.role_id),
            role_name,
            scope: RoleScope::for_lookup(self.tenant_id.map(TenantId::from_uuid)),
            is_active: self.is_active,
            assigned_by: self.assigned_by.map(UserId::from_uuid),
            assigned_at: self.assigned_at,
            deactivated_at: self.deactivated_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct UpsertedRow {
    id: uuid::Uuid,
    inserted: bool,
}

fn scope_tenant(scope: RoleScope) -> Option<uuid::Uuid> {
    scope.tenant_id().map(|tenant_id| tenant_id.as_uuid())
}

/// Folds joined role/grant rows into role definitions sorted by name.
fn aggregate_roles(rows: Vec<RoleRow>) -> AppResult<Vec<RoleDefinition>> {
    let mut by_id: HashMap<uuid::Uuid, RoleDefinition> = HashMap::new();

    for row in rows {
        let role = match by_id.entry(row.role_id) {
            std::collections::hash_map::Entry::Occupied(entry) => entry.into_mut(),
            std::collections::hash_map::Entry::Vacant(entry) => {
                let name = RoleName::new(row.name.as_str()).map_err(|error| {
                    AppError::Internal(format!("invalid stored role '{}': {error}", row.name))
                })?;
                let scope = RoleScope::from_parts(
                    row.is_system_role,
                    row.tenant_id.map(TenantId::from_uuid),
                )
                .map_err(|error| {
                    AppError::Internal(format!(
                        "invalid stored scope for role '{}': {error}",
                        row.role_id
                    ))
                })?;

                entry.insert(RoleDefinition {
                    role_id: RoleId::from_uuid(row.role_id),
                    name,
                    label: row.label.clone(),
                    description: row.description.clone(),
                    scope,
                    is_active: row.is_active,
                    permissions: Vec::new(),
                })
            }
        };

        if let Some(permission_value) = row.permission {
            let permission = PermissionName::new(permission_value.as_str()).map_err(|error| {
                AppError::Internal(format!(
                    "invalid stored permission '{permission_value}' for role '{}': {error}",
                    row.role_id
                ))
            })?;

            role.permissions.push(permission);
        }
    }

    let mut roles = by_id.into_values().collect::<Vec<_>>();
    for role in &mut roles {
        role.permissions.sort();
    }
    roles.sort_by(|left, right| left.name.cmp(&right.name));
    Ok(roles)
}

fn map_role_conflict(error: sqlx::Error, role_name: &RoleName, scope: RoleScope) -> AppError {
    if let sqlx::Error::Database(database_error) = &error
        && database_error.code().as_deref() == Some("23505")
    {
        return AppError::DuplicateRole(format!("role '{role_name}' already exists in {scope}"));
    }

    AppError::Internal(format!("failed to create role: {error}"))
}

#[async_trait]
impl SecurityAdminRepository for PostgresSecurityAdminRepository {
    async fn upsert_permission(
        &self,
        permission: PermissionDefinition,
    ) -> AppResult<UpsertOutcome> {
        let mut connection = self.pool.acquire().await.map_err(|error| {
            AppError::Internal(format!("failed to acquire connection: {error}"))
        })?;
        permissions::upsert_permission(&mut connection, &permission).await
    }

    async fn list_permissions(
        &self,
        module: Option<&str>,
    ) -> AppResult<Vec<PermissionDefinition>> {
        self.list_permissions_impl(module).await
    }

    async fn create_role(
        &self,
        input: CreateRoleInput,
        audit: AuditEvent,
    ) -> AppResult<RoleDefinition> {
        self.create_role_impl(input, &audit).await
    }

    async fn find_role(&self, role_id: RoleId) -> AppResult<Option<RoleDefinition>> {
        let mut connection = self.pool.acquire().await.map_err(|error| {
            AppError::Internal(format!("failed to acquire connection: {error}"))
        })?;
        roles::fetch_role(&mut connection, role_id.as_uuid()).await
    }

    async fn find_role_by_name(
        &self,
        name: &RoleName,
        scope: RoleScope,
    ) -> AppResult<Option<RoleDefinition>> {
        self.find_role_by_name_impl(name, scope).await
    }

    async fn update_role(
        &self,
        role_id: RoleId,
        input: UpdateRoleInput,
        audit: AuditEvent,
    ) -> AppResult<RoleDefinition> {
        self.update_role_impl(role_id, input, &audit).await
    }

    async fn retire_role(&self, role_id: RoleId, audit: AuditEvent) -> AppResult<RoleDefinition> {
        self.retire_role_impl(role_id, &audit).await
    }

    async fn set_role_permissions(
        &self,
        role_id: RoleId,
        permissions: &[PermissionName],
        audit: AuditEvent,
    ) -> AppResult<Vec<PermissionName>> {
        self.set_role_permissions_impl(role_id, permissions, &audit).await
    }

    async fn list_roles(&self, scope: RoleScope) -> AppResult<Vec<RoleDefinition>> {
        self.list_roles_impl(scope).await
    }

    async fn list_permissions_for_role(
        &self,
        role_id: RoleId,
    ) -> AppResult<Vec<PermissionDefinition>> {
        self.list_permissions_for_role_impl(role_id).await
    }

    async fn assign_role(
        &self,
        user_id: UserId,
        role_id: RoleId,
        assigned_by: UserId,
        audit: AuditEvent,
    ) -> AppResult<AssignmentOutcome> {
        self.assign_role_impl(user_id, role_id, assigned_by, &audit).await
    }

    async fn revoke_role(
        &self,
        user_id: UserId,
        role_id: RoleId,
        audit: AuditEvent,
    ) -> AppResult<Option<RoleAssignment>> {
        self.revoke_role_impl(user_id, role_id, &audit).await
    }

    async fn list_role_assignments(&self, scope: RoleScope) -> AppResult<Vec<RoleAssignment>> {
        self.list_role_assignments_impl(scope).await
    }

    async fn apply_provisioning(
        &self,
        permissions: &[PermissionDefinition],
        scope: RoleScope,
        roles: &[RoleTemplate],
    ) -> AppResult<ProvisioningReport> {
        self.apply_provisioning_impl(permissions, scope, roles).await
    }
}
