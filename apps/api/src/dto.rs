mod authorization;
mod common;
mod security;

pub use authorization::{AuthorizationDecisionResponse, CheckPermissionRequest, MeResponse};
pub use common::{HealthResponse, TenantScopeQuery, parse_tenant_id};
pub use security::{
    AssignRoleRequest, AssignRoleResponse, CreateRoleRequest, PermissionModuleQuery,
    PermissionResponse, RevokeRoleRequest, RoleAssignmentResponse, RolePermissionsResponse,
    RoleResponse, SetRolePermissionsRequest, UpdateRoleRequest,
};
