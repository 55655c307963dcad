use std::collections::BTreeSet;

use nutria_application::AuthorizationDecision;
use nutria_core::Identity;
use nutria_domain::PermissionName;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Effective access of the calling user.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/me-response.ts"
)]
pub struct MeResponse {
    pub user_id: String,
    pub tenant_id: Option<String>,
    pub user_type: String,
    pub is_platform_admin: bool,
    pub permissions: Vec<String>,
}

impl MeResponse {
    pub fn new(identity: &Identity, permissions: BTreeSet<PermissionName>) -> Self {
        Self {
            user_id: identity.user_id().to_string(),
            tenant_id: identity.tenant_id().map(|tenant_id| tenant_id.to_string()),
            user_type: identity.user_type().as_str().to_owned(),
            is_platform_admin: identity.is_platform_admin(),
            permissions: permissions
                .into_iter()
                .map(|permission| permission.as_str().to_owned())
                .collect(),
        }
    }
}

/// Incoming payload for a permission check.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/check-permission-request.ts"
)]
pub struct CheckPermissionRequest {
    pub permission: String,
    #[serde(default)]
    pub tenant_id: Option<String>,
}

/// Outcome of a permission check.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/authorization-decision-response.ts"
)]
pub struct AuthorizationDecisionResponse {
    pub decision: String,
    pub reason: Option<String>,
}

impl From<&AuthorizationDecision> for AuthorizationDecisionResponse {
    fn from(value: &AuthorizationDecision) -> Self {
        Self {
            decision: value.as_str().to_owned(),
            reason: value
                .denial_reason()
                .map(|reason| reason.as_str().to_owned()),
        }
    }
}
