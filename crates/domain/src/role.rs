use std::fmt::{Display, Formatter};

use nutria_core::{AppError, AppResult, Identity, TenantId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::security::is_name_char;

const ROLE_NAME_MIN_LENGTH: usize = 2;
const ROLE_NAME_MAX_LENGTH: usize = 64;

/// Unique identifier for a role record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoleId(Uuid);

impl RoleId {
    /// Creates a new random role identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a role identifier from an existing UUID value.
    #[must_use]
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Parses a role identifier from its textual form.
    pub fn parse(value: &str) -> AppResult<Self> {
        Uuid::parse_str(value.trim())
            .map(Self)
            .map_err(|error| AppError::Validation(format!("invalid role id '{value}': {error}")))
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for RoleId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for RoleId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Immutable lookup key of a role, unique within its scope.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoleName(String);

impl RoleName {
    /// Creates a validated role name (lowercase slug).
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim();

        if trimmed.len() < ROLE_NAME_MIN_LENGTH || trimmed.len() > ROLE_NAME_MAX_LENGTH {
            return Err(AppError::Validation(format!(
                "role name '{trimmed}' must be between {ROLE_NAME_MIN_LENGTH} and {ROLE_NAME_MAX_LENGTH} characters"
            )));
        }

        if !trimmed.chars().all(is_name_char) {
            return Err(AppError::Validation(format!(
                "role name '{trimmed}' may only contain lowercase letters, digits, '-' and '_'"
            )));
        }

        if !trimmed
            .chars()
            .next()
            .is_some_and(|character| character.is_ascii_alphanumeric())
        {
            return Err(AppError::Validation(format!(
                "role name '{trimmed}' must start with a letter or digit"
            )));
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the underlying string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String> for RoleName {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RoleName> for String {
    fn from(value: RoleName) -> Self {
        value.0
    }
}

impl Display for RoleName {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

/// Visibility scope of a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "tenant_id", rename_all = "snake_case")]
pub enum RoleScope {
    /// Platform-wide role, assignable only to platform administrators.
    System,
    /// Role owned by exactly one tenant.
    Tenant(TenantId),
}

impl RoleScope {
    /// Builds a scope from the persisted `(is_system_role, tenant_id)` pair.
    pub fn from_parts(is_system_role: bool, tenant_id: Option<TenantId>) -> AppResult<Self> {
        match (is_system_role, tenant_id) {
            (true, None) => Ok(Self::System),
            (false, Some(tenant_id)) => Ok(Self::Tenant(tenant_id)),
            (true, Some(tenant_id)) => Err(AppError::InvalidScope(format!(
                "system roles must not be bound to tenant '{tenant_id}'"
            ))),
            (false, None) => Err(AppError::InvalidScope(
                "tenant roles require a tenant id".to_owned(),
            )),
        }
    }

    /// Resolves the lookup scope used by assignment: no tenant means system.
    #[must_use]
    pub fn for_lookup(tenant_id: Option<TenantId>) -> Self {
        tenant_id.map_or(Self::System, Self::Tenant)
    }

    /// Returns whether the scope is platform-wide.
    #[must_use]
    pub fn is_system(&self) -> bool {
        matches!(self, Self::System)
    }

    /// Returns the owning tenant for tenant roles.
    #[must_use]
    pub fn tenant_id(&self) -> Option<TenantId> {
        match self {
            Self::System => None,
            Self::Tenant(tenant_id) => Some(*tenant_id),
        }
    }

    /// Checks that a role in this scope may be held by `identity`.
    ///
    /// System roles require a platform administrator. Tenant roles require
    /// the identity to belong to the same tenant.
    pub fn ensure_assignable_to(&self, identity: &Identity) -> AppResult<()> {
        match self {
            Self::System if identity.is_platform_admin() => Ok(()),
            Self::System => Err(AppError::InvalidScope(format!(
                "system roles can only be held by platform admins, user '{}' is a tenant user",
                identity.user_id()
            ))),
            Self::Tenant(tenant_id) if identity.tenant_id() == Some(*tenant_id) => Ok(()),
            Self::Tenant(tenant_id) => Err(AppError::TenantMismatch(format!(
                "user '{}' does not belong to tenant '{tenant_id}'",
                identity.user_id()
            ))),
        }
    }
}

impl Display for RoleScope {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::System => formatter.write_str("system"),
            Self::Tenant(tenant_id) => write!(formatter, "tenant:{tenant_id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use nutria_core::{AppError, Identity, TenantId, UserId};
    use proptest::prelude::*;

    use super::{RoleName, RoleScope};

    #[test]
    fn system_scope_rejects_tenant() {
        let scope = RoleScope::from_parts(true, Some(TenantId::new()));
        assert!(matches!(scope, Err(AppError::InvalidScope(_))));
    }

    #[test]
    fn tenant_scope_requires_tenant() {
        let scope = RoleScope::from_parts(false, None);
        assert!(matches!(scope, Err(AppError::InvalidScope(_))));
    }

    #[test]
    fn scope_roundtrips_tenant_id() {
        let tenant_id = TenantId::new();
        let scope = RoleScope::from_parts(false, Some(tenant_id));
        assert!(matches!(scope, Ok(RoleScope::Tenant(value)) if value == tenant_id));
        assert_eq!(RoleScope::for_lookup(None), RoleScope::System);
    }

    #[test]
    fn system_role_requires_platform_admin() {
        let admin = Identity::platform_admin(UserId::new());
        let member = Identity::tenant_user(UserId::new(), TenantId::new());

        assert!(RoleScope::System.ensure_assignable_to(&admin).is_ok());
        assert!(matches!(
            RoleScope::System.ensure_assignable_to(&member),
            Err(AppError::InvalidScope(_))
        ));
    }

    #[test]
    fn tenant_role_rejects_other_tenant_and_tenantless_admin() {
        let tenant_id = TenantId::new();
        let scope = RoleScope::Tenant(tenant_id);

        let member = Identity::tenant_user(UserId::new(), tenant_id);
        let outsider = Identity::tenant_user(UserId::new(), TenantId::new());
        let admin = Identity::platform_admin(UserId::new());

        assert!(scope.ensure_assignable_to(&member).is_ok());
        assert!(matches!(
            scope.ensure_assignable_to(&outsider),
            Err(AppError::TenantMismatch(_))
        ));
        assert!(matches!(
            scope.ensure_assignable_to(&admin),
            Err(AppError::TenantMismatch(_))
        ));
    }

    #[test]
    fn role_name_accepts_slug() {
        assert!(RoleName::new("manager-operasional").is_ok());
        assert!(RoleName::new("staff_admin").is_ok());
    }

    #[test]
    fn role_name_rejects_labels() {
        assert!(RoleName::new("Manager Operasional").is_err());
        assert!(RoleName::new("-leading").is_err());
        assert!(RoleName::new("x").is_err());
    }

    proptest! {
        #[test]
        fn slugs_within_bounds_are_accepted(value in "[a-z][a-z0-9_-]{1,63}") {
            prop_assert!(RoleName::new(value).is_ok());
        }

        #[test]
        fn uppercase_is_always_rejected(value in "[A-Z]{2,16}") {
            prop_assert!(RoleName::new(value).is_err());
        }
    }
}
