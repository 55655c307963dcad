use std::fmt::{Display, Formatter};
use std::str::FromStr;

use nutria_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Validated permission key in `module.action` form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PermissionName(String);

impl PermissionName {
    /// Creates a validated permission name.
    ///
    /// Names are lowercase, dot separated, with at least a module and an
    /// action segment. Segments use `[a-z0-9_-]`.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim();

        let segments: Vec<&str> = trimmed.split('.').collect();
        if segments.len() < 2 {
            return Err(AppError::Validation(format!(
                "permission name '{trimmed}' must have the form 'module.action'"
            )));
        }

        for segment in &segments {
            if segment.is_empty() || !segment.chars().all(is_name_char) {
                return Err(AppError::Validation(format!(
                    "permission name '{trimmed}' contains an invalid segment '{segment}'"
                )));
            }
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the underlying string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the module segment of the name.
    #[must_use]
    pub fn module(&self) -> &str {
        self.0.split_once('.').map_or("", |(module, _)| module)
    }

    /// Returns everything after the module segment.
    #[must_use]
    pub fn action(&self) -> &str {
        self.0.split_once('.').map_or("", |(_, action)| action)
    }
}

impl TryFrom<String> for PermissionName {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PermissionName> for String {
    fn from(value: PermissionName) -> Self {
        value.0
    }
}

impl Display for PermissionName {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

pub(crate) fn is_name_char(character: char) -> bool {
    character.is_ascii_lowercase() || character.is_ascii_digit() || matches!(character, '_' | '-')
}

/// Catalog entry describing one grantable action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionDefinition {
    /// Globally unique permission key.
    pub name: PermissionName,
    /// Functional module the permission belongs to.
    pub module: String,
    /// Action within the module.
    pub action: String,
    /// Human-readable description.
    pub description: String,
}

/// Permissions referenced by platform code.
///
/// Storage stays string keyed; these constants are checked against the
/// canonical provisioning definition at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    /// Cross-tenant platform administration.
    PlatformManage,
    /// Tenant onboarding and lifecycle management.
    TenantManage,
    /// Creating, relabeling, retiring roles and editing their grants.
    RoleManage,
    /// Assigning and revoking roles for users.
    RoleAssign,
    /// Reading the permission catalog and role grants.
    PermissionView,
    /// Reading security audit entries.
    AuditView,
    /// Reading menu plans.
    MenuView,
    /// Drafting menu plans.
    MenuCreate,
    /// Approving menu plans for production.
    MenuApprove,
    /// Raising purchase requests.
    ProcurementCreate,
    /// Approving purchase requests.
    ProcurementApprove,
    /// Managing warehouse stock.
    InventoryManage,
    /// Managing kitchen production batches.
    ProductionManage,
    /// Managing deliveries to beneficiary schools.
    DistributionManage,
    /// Viewing daily operational reports.
    ReportDaily,
    /// Viewing weekly operational reports.
    ReportWeekly,
    /// Exporting reports.
    ReportExport,
    /// Managing subscription and invoices.
    BillingManage,
}

impl Permission {
    /// Returns a stable storage value for this permission.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PlatformManage => "platform.manage",
            Self::TenantManage => "tenant.manage",
            Self::RoleManage => "role.manage",
            Self::RoleAssign => "role.assign",
            Self::PermissionView => "permission.view",
            Self::AuditView => "audit.view",
            Self::MenuView => "menu.view",
            Self::MenuCreate => "menu.create",
            Self::MenuApprove => "menu.approve",
            Self::ProcurementCreate => "procurement.create",
            Self::ProcurementApprove => "procurement.approve",
            Self::InventoryManage => "inventory.manage",
            Self::ProductionManage => "production.manage",
            Self::DistributionManage => "distribution.manage",
            Self::ReportDaily => "report.daily",
            Self::ReportWeekly => "report.weekly",
            Self::ReportExport => "report.export",
            Self::BillingManage => "billing.manage",
        }
    }

    /// Returns all known permissions.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Permission] = &[
            Permission::PlatformManage,
            Permission::TenantManage,
            Permission::RoleManage,
            Permission::RoleAssign,
            Permission::PermissionView,
            Permission::AuditView,
            Permission::MenuView,
            Permission::MenuCreate,
            Permission::MenuApprove,
            Permission::ProcurementCreate,
            Permission::ProcurementApprove,
            Permission::InventoryManage,
            Permission::ProductionManage,
            Permission::DistributionManage,
            Permission::ReportDaily,
            Permission::ReportWeekly,
            Permission::ReportExport,
            Permission::BillingManage,
        ];

        ALL
    }

    /// Returns the validated catalog key for this permission.
    #[must_use]
    pub fn name(&self) -> PermissionName {
        PermissionName(self.as_str().to_owned())
    }

    /// Parses a transport value into a permission.
    pub fn from_transport(value: &str) -> Result<Self, AppError> {
        Self::from_str(value)
    }
}

impl FromStr for Permission {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .find(|permission| permission.as_str() == value)
            .copied()
            .ok_or_else(|| AppError::UnknownPermission(format!("unknown permission value '{value}'")))
    }
}

impl Display for Permission {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Stable audit actions emitted by security administration use-cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Emitted when a role is created.
    SecurityRoleCreated,
    /// Emitted when a role label or description changes.
    SecurityRoleUpdated,
    /// Emitted when a role is retired.
    SecurityRoleRetired,
    /// Emitted when a role's grant set is replaced.
    SecurityRolePermissionsReplaced,
    /// Emitted when a role is assigned to a user.
    SecurityRoleAssigned,
    /// Emitted when a role assignment is revoked.
    SecurityRoleRevoked,
}

impl AuditAction {
    /// Returns a stable storage value for this action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SecurityRoleCreated => "security.role.created",
            Self::SecurityRoleUpdated => "security.role.updated",
            Self::SecurityRoleRetired => "security.role.retired",
            Self::SecurityRolePermissionsReplaced => "security.role.permissions_replaced",
            Self::SecurityRoleAssigned => "security.role.assigned",
            Self::SecurityRoleRevoked => "security.role.revoked",
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use nutria_core::AppError;
    use proptest::prelude::*;

    use super::{Permission, PermissionName};

    #[test]
    fn permission_roundtrip_storage_value() {
        let permission = Permission::MenuApprove;
        let restored = Permission::from_str(permission.as_str());
        assert!(matches!(restored, Ok(Permission::MenuApprove)));
    }

    #[test]
    fn unknown_permission_is_rejected() {
        let parsed = Permission::from_str("menu.unknown");
        assert!(matches!(parsed, Err(AppError::UnknownPermission(_))));
    }

    #[test]
    fn every_constant_is_a_valid_name() {
        for permission in Permission::all() {
            assert!(PermissionName::new(permission.as_str()).is_ok());
        }
    }

    #[test]
    fn permission_name_splits_module_and_action() {
        let Ok(name) = PermissionName::new("report.export.csv") else {
            panic!("expected valid permission name");
        };
        assert_eq!(name.module(), "report");
        assert_eq!(name.action(), "export.csv");
    }

    #[test]
    fn permission_name_rejects_missing_action() {
        assert!(PermissionName::new("menu").is_err());
        assert!(PermissionName::new("menu.").is_err());
        assert!(PermissionName::new(".approve").is_err());
        assert!(PermissionName::new("Menu.Approve").is_err());
    }

    proptest! {
        #[test]
        fn valid_segments_always_parse(
            module in "[a-z0-9_-]{1,12}",
            action in "[a-z0-9_-]{1,12}",
        ) {
            let name = PermissionName::new(format!("{module}.{action}"));
            prop_assert!(name.is_ok());
        }

        #[test]
        fn names_with_whitespace_inside_are_rejected(
            module in "[a-z]{1,8}",
            action in "[a-z]{1,8}",
        ) {
            let name = PermissionName::new(format!("{module} .{action}"));
            prop_assert!(name.is_err());
        }
    }
}
