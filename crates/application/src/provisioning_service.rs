use std::sync::Arc;

use tracing::info;

use nutria_core::{AppResult, TenantId};
use nutria_domain::{ProvisioningDefinition, RoleScope, RoleTemplate};

use crate::{ProvisioningReport, SecurityAdminRepository};

/// Deploy-time loader forcing the store to match a canonical definition.
///
/// Runs are idempotent: permissions and roles are upserted, every role's
/// grants are fully replaced, and assignments are never touched.
#[derive(Clone)]
pub struct ProvisioningService {
    repository: Arc<dyn SecurityAdminRepository>,
}

impl ProvisioningService {
    /// Creates a loader over the provided repository.
    #[must_use]
    pub fn new(repository: Arc<dyn SecurityAdminRepository>) -> Self {
        Self { repository }
    }

    /// Materializes the permission catalog and every system role.
    pub async fn provision(
        &self,
        definition: &ProvisioningDefinition,
    ) -> AppResult<ProvisioningReport> {
        definition.validate()?;

        let system_roles: Vec<RoleTemplate> = definition.system_roles().cloned().collect();
        let report = self
            .repository
            .apply_provisioning(&definition.permissions, RoleScope::System, &system_roles)
            .await?;

        info!(
            permissions_created = report.permissions_created,
            permissions_updated = report.permissions_updated,
            roles_created = report.roles_created,
            roles_updated = report.roles_updated,
            bindings = report.bindings_written,
            "platform catalog provisioned"
        );

        Ok(report)
    }

    /// Materializes the tenant role templates for one tenant.
    ///
    /// Referenced permissions must already exist in the catalog.
    pub async fn provision_tenant(
        &self,
        tenant_id: TenantId,
        definition: &ProvisioningDefinition,
    ) -> AppResult<ProvisioningReport> {
        definition.validate()?;

        let templates: Vec<RoleTemplate> = definition.tenant_templates().cloned().collect();
        let report = self
            .repository
            .apply_provisioning(&[], RoleScope::Tenant(tenant_id), &templates)
            .await?;

        info!(
            %tenant_id,
            roles_created = report.roles_created,
            roles_updated = report.roles_updated,
            bindings = report.bindings_written,
            "tenant role templates provisioned"
        );

        Ok(report)
    }
}
