use nutria_application::{
    AuditEvent, AuthorizationRepository, CreateRoleInput, IdentityDirectory,
    SecurityAdminRepository,
};
use nutria_core::{TenantId, UserId, UserType};
use nutria_domain::{
    AuditAction, PermissionDefinition, PermissionName, RoleId, RoleName, RoleScope,
};
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;

use super::PostgresAuthorizationRepository;
use crate::{PostgresIdentityDirectory, PostgresSecurityAdminRepository};

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

async fn test_pool() -> Option<PgPool> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        return None;
    };

    let pool = match PgPoolOptions::new()
        .max_connections(2)
        .connect(database_url.as_str())
        .await
    {
        Ok(pool) => pool,
        Err(error) => panic!("failed to connect to DATABASE_URL in test: {error}"),
    };

    if let Err(error) = MIGRATOR.run(&pool).await {
        panic!("failed to run migrations for postgres authorization tests: {error}");
    }

    Some(pool)
}

async fn insert_platform_user(pool: &PgPool, user_id: UserId, tenant_id: Option<TenantId>) {
    let user_type = if tenant_id.is_some() {
        UserType::TenantUser
    } else {
        UserType::PlatformAdmin
    };

    let insert = sqlx::query(
        r#"
            INSERT INTO platform_users (id, tenant_id, user_type)
            VALUES ($1, $2, $3)
            "#,
    )
    .bind(user_id.as_uuid())
    .bind(tenant_id.map(|tenant_id| tenant_id.as_uuid()))
    .bind(user_type.as_str())
    .execute(pool)
    .await;

    assert!(insert.is_ok());
}

fn permission_name(value: &str) -> PermissionName {
    match PermissionName::new(value) {
        Ok(name) => name,
        Err(error) => panic!("test permission should be valid: {error}"),
    }
}

fn audit(scope: RoleScope, action: AuditAction) -> AuditEvent {
    AuditEvent {
        tenant_id: scope.tenant_id(),
        actor: UserId::new(),
        action,
        resource_type: "rbac_test".to_owned(),
        resource_id: action.as_str().to_owned(),
        detail: None,
    }
}

#[tokio::test]
async fn identity_directory_reads_platform_users() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let directory = PostgresIdentityDirectory::new(pool.clone());
    let tenant_id = TenantId::new();
    let tenant_user = UserId::new();
    let admin = UserId::new();
    insert_platform_user(&pool, tenant_user, Some(tenant_id)).await;
    insert_platform_user(&pool, admin, None).await;

    let found = directory.find_identity(tenant_user).await;
    assert!(
        matches!(found, Ok(Some(ref identity)) if identity.tenant_id() == Some(tenant_id) && !identity.is_platform_admin())
    );

    let found_admin = directory.find_identity(admin).await;
    assert!(matches!(found_admin, Ok(Some(ref identity)) if identity.is_platform_admin()));

    let missing = directory.find_identity(UserId::new()).await;
    assert!(matches!(missing, Ok(None)));
}

#[tokio::test]
async fn effective_permissions_follow_active_assignments() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let authorization = PostgresAuthorizationRepository::new(pool.clone());
    let admin = PostgresSecurityAdminRepository::new(pool);
    let scope = RoleScope::Tenant(TenantId::new());

    for (module, action) in [("report", "daily"), ("report", "weekly")] {
        let upsert = admin
            .upsert_permission(PermissionDefinition {
                name: permission_name(format!("{module}.{action}").as_str()),
                module: module.to_owned(),
                action: action.to_owned(),
                description: String::new(),
            })
            .await;
        assert!(upsert.is_ok());
    }

    let Ok(role_name) = RoleName::new("pg-reporter") else {
        panic!("role name should be valid");
    };
    let Ok(role) = admin
        .create_role(
            CreateRoleInput {
                role_id: RoleId::new(),
                name: role_name,
                label: None,
                description: String::new(),
                scope,
            },
            audit(scope, AuditAction::SecurityRoleCreated),
        )
        .await
    else {
        panic!("role should be created");
    };
    let granted = admin
        .set_role_permissions(
            role.role_id,
            &[permission_name("report.daily")],
            audit(scope, AuditAction::SecurityRolePermissionsReplaced),
        )
        .await;
    assert!(granted.is_ok());

    let user_id = UserId::new();
    assert!(
        admin
            .assign_role(
                user_id,
                role.role_id,
                UserId::new(),
                audit(scope, AuditAction::SecurityRoleAssigned),
            )
            .await
            .is_ok()
    );

    let permissions = authorization.list_permissions_for_user(user_id).await;
    assert!(matches!(permissions, Ok(ref names) if names == &vec![permission_name("report.daily")]));

    let replaced = admin
        .set_role_permissions(
            role.role_id,
            &[permission_name("report.weekly")],
            audit(scope, AuditAction::SecurityRolePermissionsReplaced),
        )
        .await;
    assert!(replaced.is_ok());
    let permissions = authorization.list_permissions_for_user(user_id).await;
    assert!(
        matches!(permissions, Ok(ref names) if names == &vec![permission_name("report.weekly")])
    );

    let revoked = admin
        .revoke_role(
            user_id,
            role.role_id,
            audit(scope, AuditAction::SecurityRoleRevoked),
        )
        .await;
    assert!(revoked.is_ok());
    let permissions = authorization.list_permissions_for_user(user_id).await;
    assert!(matches!(permissions, Ok(ref names) if names.is_empty()));
}
