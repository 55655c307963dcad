use super::*;

pub async fn list_role_assignments_handler(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserId>,
    Query(query): Query<TenantScopeQuery>,
) -> ApiResult<Json<Vec<RoleAssignmentResponse>>> {
    let tenant_id = parse_tenant_id(query.tenant_id.as_deref())?;

    let assignments = state
        .security_admin_service
        .list_role_assignments(user_id, tenant_id)
        .await?
        .into_iter()
        .map(RoleAssignmentResponse::from)
        .collect();

    Ok(Json(assignments))
}

pub async fn assign_role_handler(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserId>,
    Json(payload): Json<AssignRoleRequest>,
) -> ApiResult<(StatusCode, Json<AssignRoleResponse>)> {
    let target = UserId::parse(payload.user_id.as_str())?;
    let tenant_id = parse_tenant_id(payload.tenant_id.as_deref())?;

    let outcome = state
        .security_admin_service
        .assign_role(user_id, target, payload.role_name.as_str(), tenant_id)
        .await?;

    let status = if outcome.change == AssignmentChange::Created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    Ok((status, Json(AssignRoleResponse::from(outcome))))
}

pub async fn revoke_role_handler(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserId>,
    Json(payload): Json<RevokeRoleRequest>,
) -> ApiResult<StatusCode> {
    let target = UserId::parse(payload.user_id.as_str())?;
    let tenant_id = parse_tenant_id(payload.tenant_id.as_deref())?;

    state
        .security_admin_service
        .revoke_role(user_id, target, payload.role_name.as_str(), tenant_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
