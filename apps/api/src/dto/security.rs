use serde::{Deserialize, Serialize};
use ts_rs::TS;

mod conversions;

/// Optional module filter for catalog listing.
#[derive(Debug, Default, Deserialize)]
pub struct PermissionModuleQuery {
    pub module: Option<String>,
}

/// API representation of a catalog permission.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/permission-response.ts"
)]
pub struct PermissionResponse {
    pub name: String,
    pub module: String,
    pub action: String,
    pub description: String,
}

/// Incoming payload for role creation.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-role-request.ts"
)]
pub struct CreateRoleRequest {
    pub name: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_system_role: bool,
    #[serde(default)]
    pub tenant_id: Option<String>,
}

/// Incoming payload for role label and description edits.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/update-role-request.ts"
)]
pub struct UpdateRoleRequest {
    pub label: String,
    #[serde(default)]
    pub description: String,
}

/// API representation of an RBAC role.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/role-response.ts"
)]
pub struct RoleResponse {
    pub role_id: String,
    pub name: String,
    pub label: String,
    pub description: String,
    pub is_system_role: bool,
    pub tenant_id: Option<String>,
    pub is_active: bool,
    pub permissions: Vec<String>,
}

/// Incoming payload replacing the grants of a role.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/set-role-permissions-request.ts"
)]
pub struct SetRolePermissionsRequest {
    pub permissions: Vec<String>,
}

/// Grant set of a role after replacement.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/role-permissions-response.ts"
)]
pub struct RolePermissionsResponse {
    pub role_id: String,
    pub permissions: Vec<String>,
}

/// Incoming payload for role assignment.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/assign-role-request.ts"
)]
pub struct AssignRoleRequest {
    pub user_id: String,
    pub role_name: String,
    #[serde(default)]
    pub tenant_id: Option<String>,
}

/// Incoming payload for role revocation.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/revoke-role-request.ts"
)]
pub struct RevokeRoleRequest {
    pub user_id: String,
    pub role_name: String,
    #[serde(default)]
    pub tenant_id: Option<String>,
}

/// API representation of a role assignment.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/role-assignment-response.ts"
)]
pub struct RoleAssignmentResponse {
    pub user_id: String,
    pub role_id: String,
    pub role_name: String,
    pub tenant_id: Option<String>,
    pub is_active: bool,
    pub assigned_by: Option<String>,
    pub assigned_at: String,
    pub deactivated_at: Option<String>,
}

/// Result of an assignment call.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/assign-role-response.ts"
)]
pub struct AssignRoleResponse {
    pub change: String,
    pub assignment: RoleAssignmentResponse,
}
