use tracing::debug;

use nutria_core::{AppError, AppResult, Identity, TenantId, UserId};
use nutria_domain::Permission;

use crate::AuthorizationService;

/// Why an identified caller was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenialReason {
    /// The request targets another tenant and the caller is not a platform admin.
    TenantMismatch,
    /// No active role grants the required permission.
    MissingPermission,
}

impl DenialReason {
    /// Returns a stable transport value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TenantMismatch => "tenant_mismatch",
            Self::MissingPermission => "missing_permission",
        }
    }
}

/// Terminal state of a guarded request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationDecision {
    /// Identity resolved and permitted.
    Authorized(Identity),
    /// Identity resolved but refused.
    Forbidden {
        /// Resolved caller.
        identity: Identity,
        /// Refusal cause.
        reason: DenialReason,
    },
    /// No resolvable identity.
    Unauthenticated,
}

impl AuthorizationDecision {
    /// Returns a stable transport value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Authorized(_) => "AUTHORIZED",
            Self::Forbidden { .. } => "FORBIDDEN",
            Self::Unauthenticated => "UNAUTHENTICATED",
        }
    }

    /// Returns whether the request may proceed.
    #[must_use]
    pub fn is_authorized(&self) -> bool {
        matches!(self, Self::Authorized(_))
    }

    /// Returns the denial reason, if any.
    #[must_use]
    pub fn denial_reason(&self) -> Option<DenialReason> {
        match self {
            Self::Forbidden { reason, .. } => Some(*reason),
            _ => None,
        }
    }

    /// Converts the decision into the caller identity or an error.
    pub fn into_identity(self, permission_name: &str) -> AppResult<Identity> {
        match self {
            Self::Authorized(identity) => Ok(identity),
            Self::Unauthenticated => Err(AppError::Unauthorized(
                "authentication required".to_owned(),
            )),
            Self::Forbidden {
                identity,
                reason: DenialReason::TenantMismatch,
            } => Err(AppError::Forbidden(format!(
                "user '{}' may not act outside its tenant",
                identity.user_id()
            ))),
            Self::Forbidden {
                identity,
                reason: DenialReason::MissingPermission,
            } => Err(AppError::Forbidden(format!(
                "user '{}' is missing permission '{permission_name}'",
                identity.user_id()
            ))),
        }
    }
}

/// Request-level enforcement combining tenant matching with the evaluator.
///
/// `UNAUTHENTICATED -> IDENTIFIED -> {AUTHORIZED | FORBIDDEN}`. The tenant
/// check runs before, and independently of, the permission check.
#[derive(Clone)]
pub struct TenantScopeGuard {
    authorization_service: AuthorizationService,
}

impl TenantScopeGuard {
    /// Creates a guard over the provided evaluator.
    #[must_use]
    pub fn new(authorization_service: AuthorizationService) -> Self {
        Self {
            authorization_service,
        }
    }

    /// Returns the wrapped evaluator.
    #[must_use]
    pub fn authorization_service(&self) -> &AuthorizationService {
        &self.authorization_service
    }

    /// Evaluates a caller against a permission and optional tenant.
    pub async fn authorize(
        &self,
        user_id: Option<UserId>,
        permission_name: &str,
        required_tenant_id: Option<TenantId>,
    ) -> AppResult<AuthorizationDecision> {
        let Some(user_id) = user_id else {
            return Ok(AuthorizationDecision::Unauthenticated);
        };

        let Some(identity) = self.authorization_service.resolve_identity(user_id).await? else {
            debug!(%user_id, "caller identity could not be resolved");
            return Ok(AuthorizationDecision::Unauthenticated);
        };

        if let Some(required_tenant_id) = required_tenant_id
            && identity.tenant_id() != Some(required_tenant_id)
            && !identity.is_platform_admin()
        {
            debug!(
                %user_id,
                tenant_id = %required_tenant_id,
                permission = permission_name,
                "cross-tenant request denied"
            );
            return Ok(AuthorizationDecision::Forbidden {
                identity,
                reason: DenialReason::TenantMismatch,
            });
        }

        if self
            .authorization_service
            .identity_has_permission(&identity, permission_name)
            .await?
        {
            Ok(AuthorizationDecision::Authorized(identity))
        } else {
            Ok(AuthorizationDecision::Forbidden {
                identity,
                reason: DenialReason::MissingPermission,
            })
        }
    }

    /// Ensures the caller may perform `permission`, returning its identity.
    pub async fn require(
        &self,
        user_id: Option<UserId>,
        permission: Permission,
        required_tenant_id: Option<TenantId>,
    ) -> AppResult<Identity> {
        self.authorize(user_id, permission.as_str(), required_tenant_id)
            .await?
            .into_identity(permission.as_str())
    }
}
