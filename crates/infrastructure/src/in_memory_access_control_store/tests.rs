use std::sync::Arc;

use nutria_application::{
    AssignmentChange, AuditEvent, AuthorizationService, ProvisioningService, RoleDraft,
    SecurityAdminRepository, SecurityAdminService, TenantScopeGuard,
};
use nutria_core::{AppError, Identity, TenantId, UserId};
use nutria_domain::{AuditAction, ProvisioningDefinition, RoleId, RoleName, RoleScope};

use super::InMemoryAccessControlStore;

const DEFINITION: &str = include_str!("../../../../provisioning/rbac.json");

struct Stack {
    store: Arc<InMemoryAccessControlStore>,
    authorization: AuthorizationService,
    admin: SecurityAdminService,
    provisioning: ProvisioningService,
    definition: ProvisioningDefinition,
    platform_admin: UserId,
}

impl Stack {
    /// Provisions the canonical catalog and a bootstrapped superadmin.
    async fn provisioned() -> Self {
        let store = Arc::new(InMemoryAccessControlStore::new());
        let authorization = AuthorizationService::new(store.clone(), store.clone());
        let admin =
            SecurityAdminService::new(TenantScopeGuard::new(authorization.clone()), store.clone());
        let provisioning = ProvisioningService::new(store.clone());

        let definition = match ProvisioningDefinition::from_json(DEFINITION) {
            Ok(definition) => definition,
            Err(error) => panic!("canonical definition should parse: {error}"),
        };
        assert!(provisioning.provision(&definition).await.is_ok());

        let platform_admin = UserId::new();
        store
            .insert_identity(Identity::platform_admin(platform_admin))
            .await;
        let superadmin = role_id(&store, "platform-superadmin", RoleScope::System).await;
        assert!(
            store
                .assign_role(
                    platform_admin,
                    superadmin,
                    platform_admin,
                    bootstrap_audit(platform_admin, superadmin),
                )
                .await
                .is_ok()
        );

        Self {
            store,
            authorization,
            admin,
            provisioning,
            definition,
            platform_admin,
        }
    }

    async fn onboard_tenant(&self) -> TenantId {
        let tenant_id = TenantId::new();
        assert!(
            self.provisioning
                .provision_tenant(tenant_id, &self.definition)
                .await
                .is_ok()
        );
        tenant_id
    }

    async fn tenant_user(&self, tenant_id: TenantId) -> UserId {
        let user_id = UserId::new();
        self.store
            .insert_identity(Identity::tenant_user(user_id, tenant_id))
            .await;
        user_id
    }

    async fn assign(&self, user_id: UserId, role_name: &str, tenant_id: TenantId) {
        let result = self
            .admin
            .assign_role(self.platform_admin, user_id, role_name, Some(tenant_id))
            .await;
        assert!(result.is_ok(), "assigning {role_name} should succeed");
    }

    async fn can(&self, user_id: UserId, permission_name: &str) -> bool {
        match self
            .authorization
            .has_permission(user_id, permission_name)
            .await
        {
            Ok(granted) => granted,
            Err(error) => panic!("evaluation should not fail: {error}"),
        }
    }
}

fn bootstrap_audit(platform_admin: UserId, role_id: RoleId) -> AuditEvent {
    AuditEvent {
        tenant_id: None,
        actor: platform_admin,
        action: AuditAction::SecurityRoleAssigned,
        resource_type: "rbac_user_role".to_owned(),
        resource_id: format!("{platform_admin}:{role_id}"),
        detail: Some("bootstrap superadmin".to_owned()),
    }
}

async fn role_id(store: &InMemoryAccessControlStore, name: &str, scope: RoleScope) -> RoleId {
    let Ok(name) = RoleName::new(name) else {
        panic!("role name should be valid");
    };
    match store.find_role_by_name(&name, scope).await {
        Ok(Some(role)) => role.role_id,
        Ok(None) => panic!("role '{name}' should exist in {scope}"),
        Err(error) => panic!("role lookup should not fail: {error}"),
    }
}

#[tokio::test]
async fn revoking_an_assignment_withdraws_its_permissions() {
    let stack = Stack::provisioned().await;
    let tenant_id = stack.onboard_tenant().await;
    let user_id = stack.tenant_user(tenant_id).await;

    assert!(!stack.can(user_id, "menu.approve").await);
    stack.assign(user_id, "manager-operasional", tenant_id).await;
    assert!(stack.can(user_id, "menu.approve").await);

    let revoked = stack
        .admin
        .revoke_role(
            stack.platform_admin,
            user_id,
            "manager-operasional",
            Some(tenant_id),
        )
        .await;
    assert!(matches!(revoked, Ok(Some(ref assignment)) if !assignment.is_active));
    assert!(!stack.can(user_id, "menu.approve").await);
}

#[tokio::test]
async fn changing_role_grants_applies_to_existing_assignments() {
    let stack = Stack::provisioned().await;
    let tenant_id = stack.onboard_tenant().await;
    let user_id = stack.tenant_user(tenant_id).await;
    stack.assign(user_id, "staff-admin", tenant_id).await;

    assert!(stack.can(user_id, "report.daily").await);
    assert!(!stack.can(user_id, "report.weekly").await);

    let staff_admin = role_id(&stack.store, "staff-admin", RoleScope::Tenant(tenant_id)).await;
    let updated = stack
        .admin
        .set_role_permissions(
            stack.platform_admin,
            staff_admin,
            &[
                "menu.view".to_owned(),
                "procurement.create".to_owned(),
                "report.daily".to_owned(),
                "report.weekly".to_owned(),
            ],
        )
        .await;
    assert!(matches!(updated, Ok(ref granted) if granted.len() == 4));

    assert!(stack.can(user_id, "report.weekly").await);
}

#[tokio::test]
async fn replacing_grants_keeps_exactly_the_new_set() {
    let stack = Stack::provisioned().await;
    let tenant_id = stack.onboard_tenant().await;
    let user_id = stack.tenant_user(tenant_id).await;
    stack.assign(user_id, "staff-admin", tenant_id).await;
    let staff_admin = role_id(&stack.store, "staff-admin", RoleScope::Tenant(tenant_id)).await;

    let daily_only = stack
        .admin
        .set_role_permissions(
            stack.platform_admin,
            staff_admin,
            &["report.daily".to_owned()],
        )
        .await;
    assert!(daily_only.is_ok());
    assert!(stack.can(user_id, "report.daily").await);
    assert!(!stack.can(user_id, "report.weekly").await);
    assert!(!stack.can(user_id, "menu.view").await);

    let weekly_only = stack
        .admin
        .set_role_permissions(
            stack.platform_admin,
            staff_admin,
            &["report.weekly".to_owned()],
        )
        .await;
    assert!(weekly_only.is_ok());
    assert!(!stack.can(user_id, "report.daily").await);
    assert!(stack.can(user_id, "report.weekly").await);

    let Ok(Some(role)) = stack.store.find_role(staff_admin).await else {
        panic!("role should exist");
    };
    assert_eq!(
        role.permissions
            .iter()
            .map(|permission| permission.as_str())
            .collect::<Vec<_>>(),
        vec!["report.weekly"]
    );
}

#[tokio::test]
async fn reassigning_after_revoke_reactivates_the_same_row() {
    let stack = Stack::provisioned().await;
    let tenant_id = stack.onboard_tenant().await;
    let user_id = stack.tenant_user(tenant_id).await;

    stack.assign(user_id, "ahli-gizi", tenant_id).await;
    let revoked = stack
        .admin
        .revoke_role(stack.platform_admin, user_id, "ahli-gizi", Some(tenant_id))
        .await;
    assert!(revoked.is_ok());

    let reassigned = stack
        .admin
        .assign_role(stack.platform_admin, user_id, "ahli-gizi", Some(tenant_id))
        .await;
    assert!(
        matches!(reassigned, Ok(ref outcome) if outcome.change == AssignmentChange::Reactivated)
    );

    let again = stack
        .admin
        .assign_role(stack.platform_admin, user_id, "ahli-gizi", Some(tenant_id))
        .await;
    assert!(matches!(again, Ok(ref outcome) if outcome.change == AssignmentChange::Unchanged));

    let rows = stack
        .store
        .list_role_assignments(RoleScope::Tenant(tenant_id))
        .await;
    let Ok(rows) = rows else {
        panic!("assignments should list");
    };
    assert_eq!(
        rows.iter()
            .filter(|assignment| assignment.user_id == user_id)
            .count(),
        1
    );
    assert!(stack.can(user_id, "menu.create").await);
}

#[tokio::test]
async fn provisioning_twice_is_idempotent() {
    let stack = Stack::provisioned().await;
    let tenant_id = stack.onboard_tenant().await;
    let user_id = stack.tenant_user(tenant_id).await;
    stack.assign(user_id, "staff-gudang", tenant_id).await;

    let Ok(before) = stack.store.list_roles(RoleScope::Tenant(tenant_id)).await else {
        panic!("roles should list");
    };

    let platform = stack.provisioning.provision(&stack.definition).await;
    let Ok(platform) = platform else {
        panic!("second provisioning run should succeed");
    };
    assert_eq!(platform.permissions_created, 0);
    assert_eq!(platform.roles_created, 0);

    let tenant = stack
        .provisioning
        .provision_tenant(tenant_id, &stack.definition)
        .await;
    assert!(matches!(tenant, Ok(ref report) if report.roles_created == 0));

    let Ok(after) = stack.store.list_roles(RoleScope::Tenant(tenant_id)).await else {
        panic!("roles should list");
    };
    assert_eq!(before, after);
    assert!(stack.can(user_id, "inventory.manage").await);
}

#[tokio::test]
async fn provisioning_restores_drifted_grants_and_retired_roles() {
    let stack = Stack::provisioned().await;
    let tenant_id = stack.onboard_tenant().await;
    let scope = RoleScope::Tenant(tenant_id);
    let staff_gudang = role_id(&stack.store, "staff-gudang", scope).await;

    let drifted = stack
        .admin
        .set_role_permissions(
            stack.platform_admin,
            staff_gudang,
            &["billing.manage".to_owned()],
        )
        .await;
    assert!(drifted.is_ok());
    let retired = stack
        .admin
        .retire_role(stack.platform_admin, staff_gudang)
        .await;
    assert!(matches!(retired, Ok(ref role) if !role.is_active));

    let restored = stack
        .provisioning
        .provision_tenant(tenant_id, &stack.definition)
        .await;
    assert!(restored.is_ok());

    let role = stack.store.find_role(staff_gudang).await;
    let Ok(Some(role)) = role else {
        panic!("role should still exist");
    };
    assert!(role.is_active);
    assert_eq!(
        role.permissions
            .iter()
            .map(|permission| permission.as_str())
            .collect::<Vec<_>>(),
        vec!["inventory.manage", "menu.view"]
    );
}

#[tokio::test]
async fn unknown_permission_leaves_grants_untouched() {
    let stack = Stack::provisioned().await;
    let tenant_id = stack.onboard_tenant().await;
    let staff_admin = role_id(&stack.store, "staff-admin", RoleScope::Tenant(tenant_id)).await;

    let result = stack
        .admin
        .set_role_permissions(
            stack.platform_admin,
            staff_admin,
            &["report.weekly".to_owned(), "menu.teleport".to_owned()],
        )
        .await;
    assert!(matches!(result, Err(AppError::UnknownPermission(_))));

    let Ok(Some(role)) = stack.store.find_role(staff_admin).await else {
        panic!("role should exist");
    };
    assert_eq!(role.permissions.len(), 3);
    assert!(
        !role
            .permissions
            .iter()
            .any(|permission| permission.as_str() == "report.weekly")
    );
}

#[tokio::test]
async fn retiring_a_role_with_active_assignments_fails() {
    let stack = Stack::provisioned().await;
    let tenant_id = stack.onboard_tenant().await;
    let user_id = stack.tenant_user(tenant_id).await;
    stack.assign(user_id, "staff-distribusi", tenant_id).await;
    let role = role_id(
        &stack.store,
        "staff-distribusi",
        RoleScope::Tenant(tenant_id),
    )
    .await;

    let blocked = stack.admin.retire_role(stack.platform_admin, role).await;
    assert!(matches!(blocked, Err(AppError::RoleInUse(_))));

    let revoked = stack
        .admin
        .revoke_role(
            stack.platform_admin,
            user_id,
            "staff-distribusi",
            Some(tenant_id),
        )
        .await;
    assert!(revoked.is_ok());

    let retired = stack.admin.retire_role(stack.platform_admin, role).await;
    assert!(retired.is_ok());

    let reassign = stack
        .admin
        .assign_role(
            stack.platform_admin,
            user_id,
            "staff-distribusi",
            Some(tenant_id),
        )
        .await;
    assert!(matches!(reassign, Err(AppError::NotFound(_))));
    assert!(!stack.can(user_id, "distribution.manage").await);
}

#[tokio::test]
async fn duplicate_role_names_are_scoped_per_tenant() {
    let stack = Stack::provisioned().await;
    let first = stack.onboard_tenant().await;
    let second = stack.onboard_tenant().await;

    let draft = |tenant_id| RoleDraft {
        name: "koordinator-sekolah".to_owned(),
        label: None,
        description: "School coordinator".to_owned(),
        is_system_role: false,
        tenant_id: Some(tenant_id),
    };

    let created = stack.admin.create_role(stack.platform_admin, draft(first)).await;
    assert!(matches!(created, Ok(ref role) if role.label == "koordinator-sekolah"));

    let duplicate = stack.admin.create_role(stack.platform_admin, draft(first)).await;
    assert!(matches!(duplicate, Err(AppError::DuplicateRole(_))));

    let other_tenant = stack
        .admin
        .create_role(stack.platform_admin, draft(second))
        .await;
    assert!(other_tenant.is_ok());
}

#[tokio::test]
async fn tenant_administrator_cannot_reach_another_tenant() {
    let stack = Stack::provisioned().await;
    let home = stack.onboard_tenant().await;
    let foreign = stack.onboard_tenant().await;
    let head = stack.tenant_user(home).await;
    stack.assign(head, "kepala-sppg", home).await;
    let foreign_user = stack.tenant_user(foreign).await;

    let foreign_assign = stack
        .admin
        .assign_role(head, foreign_user, "staff-admin", Some(foreign))
        .await;
    assert!(matches!(foreign_assign, Err(AppError::TenantMismatch(_))));

    let home_user = stack.tenant_user(home).await;
    let home_assign = stack
        .admin
        .assign_role(head, home_user, "staff-admin", Some(home))
        .await;
    assert!(home_assign.is_ok());

    let cross_assign = stack
        .admin
        .assign_role(head, foreign_user, "staff-admin", Some(home))
        .await;
    assert!(matches!(cross_assign, Err(AppError::TenantMismatch(_))));
}

#[tokio::test]
async fn mutations_are_audited_with_the_acting_tenant() {
    let stack = Stack::provisioned().await;
    let tenant_id = stack.onboard_tenant().await;
    let user_id = stack.tenant_user(tenant_id).await;
    stack.assign(user_id, "staff-admin", tenant_id).await;

    let events = stack.store.audit_events().await;
    let Some(event) = events.last() else {
        panic!("assignment should be audited");
    };
    assert_eq!(event.action, AuditAction::SecurityRoleAssigned);
    assert_eq!(event.tenant_id, Some(tenant_id));
    assert_eq!(event.actor, stack.platform_admin);
}

#[tokio::test]
async fn platform_admin_tier_is_independent_of_roles() {
    let stack = Stack::provisioned().await;
    let bare_admin = UserId::new();
    stack
        .store
        .insert_identity(Identity::platform_admin(bare_admin))
        .await;

    assert!(matches!(
        stack.authorization.is_platform_admin(bare_admin).await,
        Ok(true)
    ));
    assert!(!stack.can(bare_admin, "platform.manage").await);
    assert!(stack.can(stack.platform_admin, "platform.manage").await);
}

#[tokio::test]
async fn rejected_and_noop_mutations_leave_no_audit_entry() {
    let stack = Stack::provisioned().await;
    let tenant_id = stack.onboard_tenant().await;
    let user_id = stack.tenant_user(tenant_id).await;
    stack.assign(user_id, "staff-distribusi", tenant_id).await;
    let role = role_id(
        &stack.store,
        "staff-distribusi",
        RoleScope::Tenant(tenant_id),
    )
    .await;
    let recorded = stack.store.audit_events().await.len();

    let unchanged = stack
        .admin
        .assign_role(
            stack.platform_admin,
            user_id,
            "staff-distribusi",
            Some(tenant_id),
        )
        .await;
    assert!(matches!(unchanged, Ok(ref outcome) if outcome.change == AssignmentChange::Unchanged));

    let in_use = stack.admin.retire_role(stack.platform_admin, role).await;
    assert!(matches!(in_use, Err(AppError::RoleInUse(_))));

    let unknown = stack
        .admin
        .set_role_permissions(
            stack.platform_admin,
            role,
            &["distribution.teleport".to_owned()],
        )
        .await;
    assert!(matches!(unknown, Err(AppError::UnknownPermission(_))));

    let nothing_to_revoke = stack
        .admin
        .revoke_role(
            stack.platform_admin,
            stack.tenant_user(tenant_id).await,
            "staff-distribusi",
            Some(tenant_id),
        )
        .await;
    assert!(matches!(nothing_to_revoke, Ok(None)));

    assert_eq!(stack.store.audit_events().await.len(), recorded);
}

#[tokio::test]
async fn catalog_module_is_stored_as_declared() {
    let store = Arc::new(InMemoryAccessControlStore::new());
    let definition = ProvisioningDefinition::from_json(
        r#"{
            "permissions": [
                {
                    "name": "menu.approve",
                    "module": "menu-planning",
                    "action": "approve",
                    "description": ""
                }
            ],
            "roles": [
                {"name": "menu-approver", "permissions": ["menu.approve"]}
            ]
        }"#,
    );
    let Ok(definition) = definition else {
        panic!("definition with a free-form module should parse");
    };
    let tenant_id = TenantId::new();
    let provisioning = ProvisioningService::new(store.clone());
    assert!(provisioning.provision(&definition).await.is_ok());
    assert!(provisioning.provision_tenant(tenant_id, &definition).await.is_ok());

    let Ok(planning) = store.list_permissions(Some("menu-planning")).await else {
        panic!("permissions should list by module");
    };
    assert_eq!(planning.len(), 1);
    assert_eq!(planning[0].name.as_str(), "menu.approve");
    let Ok(by_prefix) = store.list_permissions(Some("menu")).await else {
        panic!("permissions should list by module");
    };
    assert!(by_prefix.is_empty());

    let user_id = UserId::new();
    store
        .insert_identity(Identity::tenant_user(user_id, tenant_id))
        .await;
    let approver = role_id(&store, "menu-approver", RoleScope::Tenant(tenant_id)).await;
    let audit = AuditEvent {
        tenant_id: Some(tenant_id),
        actor: user_id,
        action: AuditAction::SecurityRoleAssigned,
        resource_type: "rbac_user_role".to_owned(),
        resource_id: format!("{user_id}:{approver}"),
        detail: None,
    };
    assert!(store.assign_role(user_id, approver, user_id, audit).await.is_ok());

    let authorization = AuthorizationService::new(store.clone(), store.clone());
    let granted = authorization.has_permission(user_id, "menu.approve").await;
    assert!(matches!(granted, Ok(true)));
}
