use std::sync::Arc;

use nutria_application::{
    AuthorizationRepository, AuthorizationService, IdentityDirectory, SecurityAdminRepository,
    SecurityAdminService, TenantScopeGuard,
};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub authorization_service: AuthorizationService,
    pub tenant_scope_guard: TenantScopeGuard,
    pub security_admin_service: SecurityAdminService,
}

impl AppState {
    /// Wires the access control services over the provided storage ports.
    pub fn from_ports(
        identity_directory: Arc<dyn IdentityDirectory>,
        authorization_repository: Arc<dyn AuthorizationRepository>,
        security_admin_repository: Arc<dyn SecurityAdminRepository>,
    ) -> Self {
        let authorization_service =
            AuthorizationService::new(identity_directory, authorization_repository);
        let tenant_scope_guard = TenantScopeGuard::new(authorization_service.clone());
        let security_admin_service =
            SecurityAdminService::new(tenant_scope_guard.clone(), security_admin_repository);

        Self {
            authorization_service,
            tenant_scope_guard,
            security_admin_service,
        }
    }
}
