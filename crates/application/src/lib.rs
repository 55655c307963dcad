//! Application services and ports for role-based access control.

#![forbid(unsafe_code)]

mod authorization_service;
mod provisioning_service;
mod security_admin_ports;
mod security_admin_service;
mod tenant_scope_guard;

#[cfg(test)]
mod test_support;

pub use authorization_service::{AuthorizationRepository, AuthorizationService, IdentityDirectory};
pub use provisioning_service::ProvisioningService;
pub use security_admin_ports::{
    AssignmentChange, AssignmentOutcome, AuditEvent, CreateRoleInput, ProvisioningReport,
    RoleAssignment, RoleDefinition, RoleDraft, SecurityAdminRepository, UpdateRoleInput,
    UpsertOutcome,
};
pub use security_admin_service::SecurityAdminService;
pub use tenant_scope_guard::{AuthorizationDecision, DenialReason, TenantScopeGuard};
