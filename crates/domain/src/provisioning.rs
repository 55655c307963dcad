//! Declarative permission/role catalog consumed by the provisioning loader.

use std::collections::{BTreeSet, HashSet};
use std::str::FromStr;

use nutria_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

use crate::{Permission, PermissionDefinition, PermissionName, RoleName};

/// Canonical role entry.
///
/// System entries are materialized once platform-wide. Non-system entries are
/// templates copied into every tenant at onboarding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleTemplate {
    /// Immutable role key.
    pub name: RoleName,
    /// Display label; defaults to the key.
    #[serde(default)]
    pub label: Option<String>,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Whether the role is platform-wide.
    #[serde(default)]
    pub is_system_role: bool,
    /// Exact grant set of the role.
    #[serde(default)]
    pub permissions: Vec<PermissionName>,
}

impl RoleTemplate {
    /// Returns the label to persist for this role.
    #[must_use]
    pub fn display_label(&self) -> &str {
        self.label
            .as_deref()
            .filter(|label| !label.trim().is_empty())
            .unwrap_or(self.name.as_str())
    }

    /// Returns the grant set with duplicates collapsed.
    #[must_use]
    pub fn permission_set(&self) -> Vec<PermissionName> {
        self.permissions
            .iter()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

/// Full provisioning input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisioningDefinition {
    /// Permission catalog.
    #[serde(default)]
    pub permissions: Vec<PermissionDefinition>,
    /// System roles and tenant role templates.
    #[serde(default)]
    pub roles: Vec<RoleTemplate>,
}

impl ProvisioningDefinition {
    /// Parses and validates a JSON definition.
    pub fn from_json(value: &str) -> AppResult<Self> {
        let definition: Self = serde_json::from_str(value).map_err(|error| {
            AppError::Validation(format!("invalid provisioning definition: {error}"))
        })?;
        definition.validate()?;
        Ok(definition)
    }

    /// Checks internal consistency of the definition.
    pub fn validate(&self) -> AppResult<()> {
        let mut permission_names = HashSet::new();
        for permission in &self.permissions {
            if permission.module.trim().is_empty() || permission.action.trim().is_empty() {
                return Err(AppError::Validation(format!(
                    "permission '{}' must declare a module and an action",
                    permission.name
                )));
            }

            if !permission_names.insert(permission.name.as_str()) {
                return Err(AppError::Validation(format!(
                    "permission '{}' is declared more than once",
                    permission.name
                )));
            }
        }

        let mut role_names = HashSet::new();
        for role in &self.roles {
            if !role_names.insert(role.name.as_str()) {
                return Err(AppError::Validation(format!(
                    "role '{}' is declared more than once",
                    role.name
                )));
            }

            if let Some(unknown) = role
                .permissions
                .iter()
                .find(|permission| !permission_names.contains(permission.as_str()))
            {
                return Err(AppError::UnknownPermission(format!(
                    "role '{}' references undeclared permission '{unknown}'",
                    role.name
                )));
            }
        }

        Ok(())
    }

    /// Returns platform-wide role entries.
    pub fn system_roles(&self) -> impl Iterator<Item = &RoleTemplate> {
        self.roles.iter().filter(|role| role.is_system_role)
    }

    /// Returns tenant role templates.
    pub fn tenant_templates(&self) -> impl Iterator<Item = &RoleTemplate> {
        self.roles.iter().filter(|role| !role.is_system_role)
    }
}

/// Compile-time permission vocabulary checked against a definition.
pub struct PermissionRegistry;

impl PermissionRegistry {
    /// Fails when the definition and the [`Permission`] constants disagree.
    pub fn verify(definition: &ProvisioningDefinition) -> AppResult<()> {
        let declared: BTreeSet<&str> = definition
            .permissions
            .iter()
            .map(|permission| permission.name.as_str())
            .collect();

        let missing: Vec<&str> = Permission::all()
            .iter()
            .map(Permission::as_str)
            .filter(|name| !declared.contains(name))
            .collect();

        let unregistered: Vec<&str> = declared
            .iter()
            .copied()
            .filter(|name| Permission::from_str(name).is_err())
            .collect();

        if missing.is_empty() && unregistered.is_empty() {
            return Ok(());
        }

        Err(AppError::Validation(format!(
            "permission registry drift: missing from definition [{}], not registered in code [{}]",
            missing.join(", "),
            unregistered.join(", ")
        )))
    }
}
