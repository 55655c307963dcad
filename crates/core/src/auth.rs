use serde::{Deserialize, Serialize};

use crate::{TenantId, UserId};

/// Trust tier of an identity, independent of its role bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserType {
    /// Cross-tenant platform operator.
    PlatformAdmin,
    /// Member of exactly one tenant.
    TenantUser,
}

impl UserType {
    /// Returns a stable storage value for this user type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PlatformAdmin => "PLATFORM_ADMIN",
            Self::TenantUser => "TENANT_USER",
        }
    }

    /// Parses a storage value into a user type.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "PLATFORM_ADMIN" => Some(Self::PlatformAdmin),
            "TENANT_USER" => Some(Self::TenantUser),
            _ => None,
        }
    }
}

/// Resolved caller identity, owned by the external user directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    user_id: UserId,
    tenant_id: Option<TenantId>,
    user_type: UserType,
}

impl Identity {
    /// Creates an identity from directory data.
    #[must_use]
    pub fn new(user_id: UserId, tenant_id: Option<TenantId>, user_type: UserType) -> Self {
        Self {
            user_id,
            tenant_id,
            user_type,
        }
    }

    /// Creates a tenant member identity.
    #[must_use]
    pub fn tenant_user(user_id: UserId, tenant_id: TenantId) -> Self {
        Self::new(user_id, Some(tenant_id), UserType::TenantUser)
    }

    /// Creates a platform administrator identity without tenant affiliation.
    #[must_use]
    pub fn platform_admin(user_id: UserId) -> Self {
        Self::new(user_id, None, UserType::PlatformAdmin)
    }

    /// Returns the directory user identifier.
    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the tenant the identity belongs to, if any.
    #[must_use]
    pub fn tenant_id(&self) -> Option<TenantId> {
        self.tenant_id
    }

    /// Returns the identity trust tier.
    #[must_use]
    pub fn user_type(&self) -> UserType {
        self.user_type
    }

    /// Returns whether the identity is a platform administrator.
    #[must_use]
    pub fn is_platform_admin(&self) -> bool {
        self.user_type == UserType::PlatformAdmin
    }
}
