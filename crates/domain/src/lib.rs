//! Domain entities and invariants for role-based access control.

#![forbid(unsafe_code)]

mod provisioning;
mod role;
mod security;

pub use provisioning::{PermissionRegistry, ProvisioningDefinition, RoleTemplate};
pub use role::{RoleId, RoleName, RoleScope};
pub use security::{AuditAction, Permission, PermissionDefinition, PermissionName};
