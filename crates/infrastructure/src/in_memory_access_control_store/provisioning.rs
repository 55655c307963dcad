use super::*;

impl StoreState {
    pub(super) fn apply_provisioning(
        &mut self,
        permissions: &[PermissionDefinition],
        scope: RoleScope,
        roles: &[RoleTemplate],
    ) -> AppResult<ProvisioningReport> {
        let mut report = ProvisioningReport::default();

        for permission in permissions {
            report.record_permission(self.upsert_permission(permission.clone()));
        }

        for template in roles {
            let (role_id, outcome) = self.upsert_role(template, scope);
            report.record_role(outcome);

            let granted = self.replace_bindings(role_id, &template.permission_set())?;
            report.bindings_written += granted.len();
        }

        Ok(report)
    }

    fn upsert_role(&mut self, template: &RoleTemplate, scope: RoleScope) -> (RoleId, UpsertOutcome) {
        if let Some(role_id) = self.find_role_id(&template.name, scope)
            && let Some(role) = self.roles.get_mut(&role_id)
        {
            role.label = template.display_label().to_owned();
            role.description = template.description.clone();
            role.is_active = true;
            return (role_id, UpsertOutcome::Updated);
        }

        let role_id = RoleId::new();
        self.roles.insert(
            role_id,
            StoredRole {
                name: template.name.clone(),
                label: template.display_label().to_owned(),
                description: template.description.clone(),
                scope,
                is_active: true,
            },
        );
        (role_id, UpsertOutcome::Created)
    }
}
