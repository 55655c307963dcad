use nutria_core::TenantId;
use nutria_domain::{PermissionName, RoleId, RoleName, RoleScope};

/// Role definition returned to callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleDefinition {
    /// Stable role identifier.
    pub role_id: RoleId,
    /// Immutable role key, unique in scope.
    pub name: RoleName,
    /// Mutable display label.
    pub label: String,
    /// Human-readable description.
    pub description: String,
    /// System or tenant scope.
    pub scope: RoleScope,
    /// `false` once the role is retired.
    pub is_active: bool,
    /// Exact grant set of the role, sorted by name.
    pub permissions: Vec<PermissionName>,
}

impl RoleDefinition {
    /// Returns whether the role is platform-wide.
    #[must_use]
    pub fn is_system_role(&self) -> bool {
        self.scope.is_system()
    }

    /// Returns the owning tenant for tenant roles.
    #[must_use]
    pub fn tenant_id(&self) -> Option<TenantId> {
        self.scope.tenant_id()
    }
}

/// Input payload for role creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRoleInput {
    /// Identifier assigned to the new role.
    pub role_id: RoleId,
    /// Role key, unique in scope.
    pub name: RoleName,
    /// Optional display label, defaults to the key.
    pub label: Option<String>,
    /// Human-readable description.
    pub description: String,
    /// Validated scope.
    pub scope: RoleScope,
}

/// Descriptive fields editable after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateRoleInput {
    /// New display label.
    pub label: String,
    /// New description.
    pub description: String,
}

/// Unvalidated role creation request as received from administrators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleDraft {
    /// Requested role key.
    pub name: String,
    /// Optional display label.
    pub label: Option<String>,
    /// Human-readable description.
    pub description: String,
    /// Whether the role is platform-wide.
    pub is_system_role: bool,
    /// Owning tenant for tenant roles.
    pub tenant_id: Option<TenantId>,
}
