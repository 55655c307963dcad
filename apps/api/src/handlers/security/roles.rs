use super::*;

pub async fn list_roles_handler(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserId>,
    Query(query): Query<TenantScopeQuery>,
) -> ApiResult<Json<Vec<RoleResponse>>> {
    let tenant_id = parse_tenant_id(query.tenant_id.as_deref())?;

    let roles = state
        .security_admin_service
        .list_roles_for_tenant(user_id, tenant_id)
        .await?
        .into_iter()
        .map(RoleResponse::from)
        .collect();

    Ok(Json(roles))
}

pub async fn create_role_handler(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserId>,
    Json(payload): Json<CreateRoleRequest>,
) -> ApiResult<(StatusCode, Json<RoleResponse>)> {
    let tenant_id = parse_tenant_id(payload.tenant_id.as_deref())?;

    let role = state
        .security_admin_service
        .create_role(
            user_id,
            RoleDraft {
                name: payload.name,
                label: payload.label,
                description: payload.description,
                is_system_role: payload.is_system_role,
                tenant_id,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(RoleResponse::from(role))))
}

pub async fn update_role_handler(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserId>,
    Path(role_id): Path<String>,
    Json(payload): Json<UpdateRoleRequest>,
) -> ApiResult<Json<RoleResponse>> {
    let role_id = RoleId::parse(role_id.as_str())?;

    let role = state
        .security_admin_service
        .update_role(
            user_id,
            role_id,
            UpdateRoleInput {
                label: payload.label,
                description: payload.description,
            },
        )
        .await?;

    Ok(Json(RoleResponse::from(role)))
}

pub async fn retire_role_handler(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserId>,
    Path(role_id): Path<String>,
) -> ApiResult<Json<RoleResponse>> {
    let role_id = RoleId::parse(role_id.as_str())?;

    let role = state
        .security_admin_service
        .retire_role(user_id, role_id)
        .await?;

    Ok(Json(RoleResponse::from(role)))
}
