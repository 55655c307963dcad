use nutria_core::{TenantId, UserId};
use nutria_domain::AuditAction;

/// Audit entry written in the same unit of work as the mutation it describes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    /// Tenant scope for the event, `None` for platform-wide changes.
    pub tenant_id: Option<TenantId>,
    /// User that performed the action.
    pub actor: UserId,
    /// Stable audit action identifier.
    pub action: AuditAction,
    /// Resource type label.
    pub resource_type: String,
    /// Resource identifier.
    pub resource_id: String,
    /// Optional audit detail payload.
    pub detail: Option<String>,
}
