use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;

use nutria_application::{AssignmentChange, RoleDraft, UpdateRoleInput};
use nutria_core::UserId;
use nutria_domain::RoleId;

use crate::dto::{
    AssignRoleRequest, AssignRoleResponse, CreateRoleRequest, PermissionModuleQuery,
    PermissionResponse, RevokeRoleRequest, RoleAssignmentResponse, RolePermissionsResponse,
    RoleResponse, SetRolePermissionsRequest, TenantScopeQuery, UpdateRoleRequest,
    parse_tenant_id,
};
use crate::error::ApiResult;
use crate::state::AppState;

mod assignments;
mod bindings;
mod permissions;
mod roles;

pub use assignments::{assign_role_handler, list_role_assignments_handler, revoke_role_handler};
pub use bindings::{list_role_permissions_handler, set_role_permissions_handler};
pub use permissions::list_permissions_handler;
pub use roles::{create_role_handler, list_roles_handler, retire_role_handler, update_role_handler};
