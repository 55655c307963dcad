use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use nutria_core::{AppResult, Identity, UserId};
use nutria_domain::{Permission, PermissionName};

use crate::{AuthorizationRepository, IdentityDirectory};

#[derive(Default)]
pub(crate) struct FakeIdentityDirectory {
    pub(crate) identities: HashMap<UserId, Identity>,
}

impl FakeIdentityDirectory {
    pub(crate) fn with(identities: impl IntoIterator<Item = Identity>) -> Self {
        Self {
            identities: identities
                .into_iter()
                .map(|identity| (identity.user_id(), identity))
                .collect(),
        }
    }
}

#[async_trait]
impl IdentityDirectory for FakeIdentityDirectory {
    async fn find_identity(&self, user_id: UserId) -> AppResult<Option<Identity>> {
        Ok(self.identities.get(&user_id).cloned())
    }
}

#[derive(Default)]
pub(crate) struct FakeAuthorizationRepository {
    pub(crate) grants: Mutex<HashMap<UserId, Vec<PermissionName>>>,
}

impl FakeAuthorizationRepository {
    pub(crate) fn with(grants: impl IntoIterator<Item = (UserId, Vec<Permission>)>) -> Self {
        Self {
            grants: Mutex::new(
                grants
                    .into_iter()
                    .map(|(user_id, permissions)| {
                        (
                            user_id,
                            permissions.iter().map(Permission::name).collect(),
                        )
                    })
                    .collect(),
            ),
        }
    }
}

#[async_trait]
impl AuthorizationRepository for FakeAuthorizationRepository {
    async fn list_permissions_for_user(&self, user_id: UserId) -> AppResult<Vec<PermissionName>> {
        Ok(self
            .grants
            .lock()
            .await
            .get(&user_id)
            .cloned()
            .unwrap_or_default())
    }
}
