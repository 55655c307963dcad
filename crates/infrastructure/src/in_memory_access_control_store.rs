use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use nutria_application::{
    AssignmentChange, AssignmentOutcome, AuditEvent, AuthorizationRepository,
    CreateRoleInput, IdentityDirectory, ProvisioningReport, RoleAssignment, RoleDefinition,
    SecurityAdminRepository, UpdateRoleInput, UpsertOutcome,
};
use nutria_core::{AppError, AppResult, Identity, UserId};
use nutria_domain::{
    PermissionDefinition, PermissionName, RoleId, RoleName, RoleScope, RoleTemplate,
};

mod provisioning;

/// In-memory access control store implementing every storage port.
///
/// Each mutation runs under one write lock, which gives the same
/// all-or-nothing visibility as a database transaction. Audit events are
/// appended inside that critical section, after the change has been applied.
#[derive(Debug, Default)]
pub struct InMemoryAccessControlStore {
    state: RwLock<StoreState>,
}

#[derive(Debug, Clone, Default)]
struct StoreState {
    identities: HashMap<UserId, Identity>,
    permissions: HashMap<PermissionName, PermissionDefinition>,
    roles: HashMap<RoleId, StoredRole>,
    bindings: HashMap<RoleId, BTreeSet<PermissionName>>,
    assignments: HashMap<(UserId, RoleId), StoredAssignment>,
    audit_events: Vec<AuditEvent>,
}

#[derive(Debug, Clone)]
struct StoredRole {
    name: RoleName,
    label: String,
    description: String,
    scope: RoleScope,
    is_active: bool,
}

#[derive(Debug, Clone)]
struct StoredAssignment {
    is_active: bool,
    assigned_by: Option<UserId>,
    assigned_at: DateTime<Utc>,
    deactivated_at: Option<DateTime<Utc>>,
}

impl InMemoryAccessControlStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers or replaces a directory identity.
    pub async fn insert_identity(&self, identity: Identity) {
        self.state
            .write()
            .await
            .identities
            .insert(identity.user_id(), identity);
    }

    /// Returns every recorded audit event in insertion order.
    pub async fn audit_events(&self) -> Vec<AuditEvent> {
        self.state.read().await.audit_events.clone()
    }
}

impl StoreState {
    fn role_definition(&self, role_id: RoleId) -> Option<RoleDefinition> {
        let role = self.roles.get(&role_id)?;
        Some(RoleDefinition {
            role_id,
            name: role.name.clone(),
            label: role.label.clone(),
            description: role.description.clone(),
            scope: role.scope,
            is_active: role.is_active,
            permissions: self
                .bindings
                .get(&role_id)
                .map(|set| set.iter().cloned().collect())
                .unwrap_or_default(),
        })
    }

    fn find_role_id(&self, name: &RoleName, scope: RoleScope) -> Option<RoleId> {
        self.roles
            .iter()
            .find(|(_, role)| &role.name == name && role.scope == scope)
            .map(|(role_id, _)| *role_id)
    }

    fn assignment(&self, user_id: UserId, role_id: RoleId) -> Option<RoleAssignment> {
        let stored = self.assignments.get(&(user_id, role_id))?;
        let role = self.roles.get(&role_id)?;
        Some(RoleAssignment {
            user_id,
            role_id,
            role_name: role.name.clone(),
            scope: role.scope,
            is_active: stored.is_active,
            assigned_by: stored.assigned_by,
            assigned_at: stored.assigned_at,
            deactivated_at: stored.deactivated_at,
        })
    }

    fn upsert_permission(&mut self, permission: PermissionDefinition) -> UpsertOutcome {
        match self.permissions.insert(permission.name.clone(), permission) {
            Some(_) => UpsertOutcome::Updated,
            None => UpsertOutcome::Created,
        }
    }

    fn replace_bindings(
        &mut self,
        role_id: RoleId,
        permissions: &[PermissionName],
    ) -> AppResult<Vec<PermissionName>> {
        if !self.roles.contains_key(&role_id) {
            return Err(AppError::NotFound(format!("role '{role_id}' was not found")));
        }

        if let Some(unknown) = permissions
            .iter()
            .find(|permission| !self.permissions.contains_key(*permission))
        {
            return Err(AppError::UnknownPermission(format!(
                "permission '{unknown}' does not exist"
            )));
        }

        let granted: BTreeSet<PermissionName> = permissions.iter().cloned().collect();
        let listed = granted.iter().cloned().collect();
        self.bindings.insert(role_id, granted);
        Ok(listed)
    }
}

#[async_trait]
impl IdentityDirectory for InMemoryAccessControlStore {
    async fn find_identity(&self, user_id: UserId) -> AppResult<Option<Identity>> {
        Ok(self.state.read().await.identities.get(&user_id).cloned())
    }
}

#[async_trait]
impl AuthorizationRepository for InMemoryAccessControlStore {
    async fn list_permissions_for_user(&self, user_id: UserId) -> AppResult<Vec<PermissionName>> {
        let state = self.state.read().await;

        let granted: BTreeSet<PermissionName> = state
            .assignments
            .iter()
            .filter(|((assigned_user, _), assignment)| {
                assigned_user == &user_id && assignment.is_active
            })
            .filter(|((_, role_id), _)| {
                state.roles.get(role_id).is_some_and(|role| role.is_active)
            })
            .filter_map(|((_, role_id), _)| state.bindings.get(role_id))
            .flatten()
            .cloned()
            .collect();

        Ok(granted.into_iter().collect())
    }
}

#[async_trait]
impl SecurityAdminRepository for InMemoryAccessControlStore {
    async fn upsert_permission(
        &self,
        permission: PermissionDefinition,
    ) -> AppResult<UpsertOutcome> {
        Ok(self.state.write().await.upsert_permission(permission))
    }

    async fn list_permissions(
        &self,
        module: Option<&str>,
    ) -> AppResult<Vec<PermissionDefinition>> {
        let state = self.state.read().await;
        let mut permissions: Vec<PermissionDefinition> = state
            .permissions
            .values()
            .filter(|permission| module.is_none_or(|module| permission.module == module))
            .cloned()
            .collect();
        permissions.sort_by(|left, right| left.name.cmp(&right.name));
        Ok(permissions)
    }

    async fn create_role(
        &self,
        input: CreateRoleInput,
        audit: AuditEvent,
    ) -> AppResult<RoleDefinition> {
        let mut state = self.state.write().await;

        if state.find_role_id(&input.name, input.scope).is_some() {
            return Err(AppError::DuplicateRole(format!(
                "role '{}' already exists in {}",
                input.name, input.scope
            )));
        }

        let role_id = input.role_id;
        if state.roles.contains_key(&role_id) {
            return Err(AppError::Conflict(format!("role '{role_id}' already exists")));
        }

        let label = input
            .label
            .filter(|label| !label.trim().is_empty())
            .unwrap_or_else(|| input.name.to_string());
        state.roles.insert(
            role_id,
            StoredRole {
                name: input.name,
                label,
                description: input.description,
                scope: input.scope,
                is_active: true,
            },
        );
        state.audit_events.push(audit);

        state
            .role_definition(role_id)
            .ok_or_else(|| AppError::Internal(format!("role '{role_id}' vanished after insert")))
    }

    async fn find_role(&self, role_id: RoleId) -> AppResult<Option<RoleDefinition>> {
        Ok(self.state.read().await.role_definition(role_id))
    }

    async fn find_role_by_name(
        &self,
        name: &RoleName,
        scope: RoleScope,
    ) -> AppResult<Option<RoleDefinition>> {
        let state = self.state.read().await;
        Ok(state
            .find_role_id(name, scope)
            .and_then(|role_id| state.role_definition(role_id)))
    }

    async fn update_role(
        &self,
        role_id: RoleId,
        input: UpdateRoleInput,
        audit: AuditEvent,
    ) -> AppResult<RoleDefinition> {
        let mut state = self.state.write().await;
        let role = state
            .roles
            .get_mut(&role_id)
            .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' was not found")))?;
        role.label = input.label;
        role.description = input.description;
        state.audit_events.push(audit);

        state
            .role_definition(role_id)
            .ok_or_else(|| AppError::Internal(format!("role '{role_id}' vanished after update")))
    }

    async fn retire_role(&self, role_id: RoleId, audit: AuditEvent) -> AppResult<RoleDefinition> {
        let mut state = self.state.write().await;

        let active_assignments = state
            .assignments
            .iter()
            .filter(|((_, assigned_role), assignment)| {
                assigned_role == &role_id && assignment.is_active
            })
            .count();
        if active_assignments > 0 {
            return Err(AppError::RoleInUse(format!(
                "role '{role_id}' still has {active_assignments} active assignment(s)"
            )));
        }

        let role = state
            .roles
            .get_mut(&role_id)
            .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' was not found")))?;
        role.is_active = false;
        state.audit_events.push(audit);

        state
            .role_definition(role_id)
            .ok_or_else(|| AppError::Internal(format!("role '{role_id}' vanished after retire")))
    }

    async fn set_role_permissions(
        &self,
        role_id: RoleId,
        permissions: &[PermissionName],
        audit: AuditEvent,
    ) -> AppResult<Vec<PermissionName>> {
        let mut state = self.state.write().await;
        let granted = state.replace_bindings(role_id, permissions)?;
        state.audit_events.push(audit);

        Ok(granted)
    }

    async fn list_roles(&self, scope: RoleScope) -> AppResult<Vec<RoleDefinition>> {
        let state = self.state.read().await;
        let mut roles: Vec<RoleDefinition> = state
            .roles
            .iter()
            .filter(|(_, role)| role.scope == scope)
            .filter_map(|(role_id, _)| state.role_definition(*role_id))
            .collect();
        roles.sort_by(|left, right| left.name.cmp(&right.name));
        Ok(roles)
    }

    async fn list_permissions_for_role(
        &self,
        role_id: RoleId,
    ) -> AppResult<Vec<PermissionDefinition>> {
        let state = self.state.read().await;
        Ok(state
            .bindings
            .get(&role_id)
            .map(|names| {
                names
                    .iter()
                    .filter_map(|name| state.permissions.get(name).cloned())
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn assign_role(
        &self,
        user_id: UserId,
        role_id: RoleId,
        assigned_by: UserId,
        audit: AuditEvent,
    ) -> AppResult<AssignmentOutcome> {
        let mut state = self.state.write().await;

        if !state.roles.get(&role_id).is_some_and(|role| role.is_active) {
            return Err(AppError::NotFound(format!(
                "role '{role_id}' was not found or is retired"
            )));
        }

        let now = Utc::now();
        let change = match state.assignments.get_mut(&(user_id, role_id)) {
            Some(assignment) if assignment.is_active => AssignmentChange::Unchanged,
            Some(assignment) => {
                assignment.is_active = true;
                assignment.assigned_by = Some(assigned_by);
                assignment.assigned_at = now;
                assignment.deactivated_at = None;
                AssignmentChange::Reactivated
            }
            None => {
                state.assignments.insert(
                    (user_id, role_id),
                    StoredAssignment {
                        is_active: true,
                        assigned_by: Some(assigned_by),
                        assigned_at: now,
                        deactivated_at: None,
                    },
                );
                AssignmentChange::Created
            }
        };
        if change != AssignmentChange::Unchanged {
            state.audit_events.push(audit);
        }

        let assignment = state.assignment(user_id, role_id).ok_or_else(|| {
            AppError::Internal(format!("assignment '{user_id}:{role_id}' vanished"))
        })?;

        Ok(AssignmentOutcome { assignment, change })
    }

    async fn revoke_role(
        &self,
        user_id: UserId,
        role_id: RoleId,
        audit: AuditEvent,
    ) -> AppResult<Option<RoleAssignment>> {
        let mut state = self.state.write().await;

        let Some(assignment) = state
            .assignments
            .get_mut(&(user_id, role_id))
            .filter(|assignment| assignment.is_active)
        else {
            return Ok(None);
        };
        assignment.is_active = false;
        assignment.deactivated_at = Some(Utc::now());
        state.audit_events.push(audit);

        Ok(state.assignment(user_id, role_id))
    }

    async fn list_role_assignments(&self, scope: RoleScope) -> AppResult<Vec<RoleAssignment>> {
        let state = self.state.read().await;
        let mut assignments: Vec<RoleAssignment> = state
            .assignments
            .keys()
            .filter_map(|(user_id, role_id)| state.assignment(*user_id, *role_id))
            .filter(|assignment| assignment.scope == scope)
            .collect();
        assignments.sort_by(|left, right| {
            left.user_id
                .cmp(&right.user_id)
                .then_with(|| left.role_name.cmp(&right.role_name))
        });
        Ok(assignments)
    }

    async fn apply_provisioning(
        &self,
        permissions: &[PermissionDefinition],
        scope: RoleScope,
        roles: &[RoleTemplate],
    ) -> AppResult<ProvisioningReport> {
        let mut state = self.state.write().await;

        let mut draft = state.clone();
        let report = draft.apply_provisioning(permissions, scope, roles)?;
        *state = draft;

        Ok(report)
    }
}

#[cfg(test)]
mod tests;
