use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use nutria_core::{AppResult, Identity, UserId};
use nutria_domain::{Permission, PermissionName};

/// Read-only port onto the external user directory.
#[async_trait]
pub trait IdentityDirectory: Send + Sync {
    /// Resolves a user identifier, returning `None` when the user is unknown.
    async fn find_identity(&self, user_id: UserId) -> AppResult<Option<Identity>>;
}

/// Repository port for permission lookups.
#[async_trait]
pub trait AuthorizationRepository: Send + Sync {
    /// Lists the union of permission names granted through the user's active
    /// assignments to active roles.
    async fn list_permissions_for_user(&self, user_id: UserId) -> AppResult<Vec<PermissionName>>;
}

/// Application service answering "may this identity perform this action".
///
/// Every call reads the authoritative store; nothing is cached here. Missing
/// identities, roles or bindings evaluate to `false`, only storage failures
/// surface as errors.
#[derive(Clone)]
pub struct AuthorizationService {
    identity_directory: Arc<dyn IdentityDirectory>,
    repository: Arc<dyn AuthorizationRepository>,
}

impl AuthorizationService {
    /// Creates a new authorization service from its ports.
    #[must_use]
    pub fn new(
        identity_directory: Arc<dyn IdentityDirectory>,
        repository: Arc<dyn AuthorizationRepository>,
    ) -> Self {
        Self {
            identity_directory,
            repository,
        }
    }

    /// Returns whether the user currently holds the named permission.
    pub async fn has_permission(&self, user_id: UserId, permission_name: &str) -> AppResult<bool> {
        let Some(identity) = self.resolve_identity(user_id).await? else {
            debug!(%user_id, permission = permission_name, "unknown identity denied");
            return Ok(false);
        };

        self.identity_has_permission(&identity, permission_name)
            .await
    }

    /// Typed variant of [`Self::has_permission`] for registry constants.
    pub async fn has(&self, user_id: UserId, permission: Permission) -> AppResult<bool> {
        self.has_permission(user_id, permission.as_str()).await
    }

    /// Returns whether the user is a platform administrator.
    ///
    /// This reads the identity trust tier only and never consults role
    /// bindings.
    pub async fn is_platform_admin(&self, user_id: UserId) -> AppResult<bool> {
        Ok(self
            .resolve_identity(user_id)
            .await?
            .is_some_and(|identity| identity.is_platform_admin()))
    }

    /// Returns every permission the user holds, empty for unknown users.
    pub async fn effective_permissions(
        &self,
        user_id: UserId,
    ) -> AppResult<BTreeSet<PermissionName>> {
        if self.resolve_identity(user_id).await?.is_none() {
            return Ok(BTreeSet::new());
        }

        Ok(self
            .repository
            .list_permissions_for_user(user_id)
            .await?
            .into_iter()
            .collect())
    }

    /// Resolves an identity through the directory.
    pub async fn resolve_identity(&self, user_id: UserId) -> AppResult<Option<Identity>> {
        self.identity_directory.find_identity(user_id).await
    }

    pub(crate) async fn identity_has_permission(
        &self,
        identity: &Identity,
        permission_name: &str,
    ) -> AppResult<bool> {
        let granted = self
            .repository
            .list_permissions_for_user(identity.user_id())
            .await?
            .iter()
            .any(|granted| granted.as_str() == permission_name);

        if !granted {
            debug!(
                user_id = %identity.user_id(),
                permission = permission_name,
                "permission not granted"
            );
        }

        Ok(granted)
    }
}
