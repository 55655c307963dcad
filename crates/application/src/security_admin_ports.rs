mod assignments;
mod audit;
mod provisioning;
mod repositories;
mod roles;

pub use assignments::{AssignmentChange, AssignmentOutcome, RoleAssignment};
pub use audit::AuditEvent;
pub use provisioning::{ProvisioningReport, UpsertOutcome};
pub use repositories::SecurityAdminRepository;
pub use roles::{CreateRoleInput, RoleDefinition, RoleDraft, UpdateRoleInput};
