use nutria_application::{AssignmentChange, AssignmentOutcome, RoleAssignment, RoleDefinition};
use nutria_domain::PermissionDefinition;

use super::{AssignRoleResponse, PermissionResponse, RoleAssignmentResponse, RoleResponse};

impl From<PermissionDefinition> for PermissionResponse {
    fn from(value: PermissionDefinition) -> Self {
        Self {
            name: value.name.as_str().to_owned(),
            module: value.module,
            action: value.action,
            description: value.description,
        }
    }
}

impl From<RoleDefinition> for RoleResponse {
    fn from(value: RoleDefinition) -> Self {
        Self {
            role_id: value.role_id.to_string(),
            name: value.name.to_string(),
            label: value.label,
            description: value.description,
            is_system_role: value.scope.is_system(),
            tenant_id: value.scope.tenant_id().map(|tenant_id| tenant_id.to_string()),
            is_active: value.is_active,
            permissions: value
                .permissions
                .into_iter()
                .map(|permission| permission.as_str().to_owned())
                .collect(),
        }
    }
}

impl From<RoleAssignment> for RoleAssignmentResponse {
    fn from(value: RoleAssignment) -> Self {
        Self {
            user_id: value.user_id.to_string(),
            role_id: value.role_id.to_string(),
            role_name: value.role_name.to_string(),
            tenant_id: value.scope.tenant_id().map(|tenant_id| tenant_id.to_string()),
            is_active: value.is_active,
            assigned_by: value.assigned_by.map(|user_id| user_id.to_string()),
            assigned_at: value.assigned_at.to_rfc3339(),
            deactivated_at: value.deactivated_at.map(|at| at.to_rfc3339()),
        }
    }
}

impl From<AssignmentOutcome> for AssignRoleResponse {
    fn from(value: AssignmentOutcome) -> Self {
        let change = match value.change {
            AssignmentChange::Created => "created",
            AssignmentChange::Reactivated => "reactivated",
            AssignmentChange::Unchanged => "unchanged",
        };

        Self {
            change: change.to_owned(),
            assignment: RoleAssignmentResponse::from(value.assignment),
        }
    }
}
