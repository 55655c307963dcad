use super::*;

pub async fn list_role_permissions_handler(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserId>,
    Path(role_id): Path<String>,
) -> ApiResult<Json<Vec<PermissionResponse>>> {
    let role_id = RoleId::parse(role_id.as_str())?;

    let permissions = state
        .security_admin_service
        .list_permissions_for_role(user_id, role_id)
        .await?
        .into_iter()
        .map(PermissionResponse::from)
        .collect();

    Ok(Json(permissions))
}

pub async fn set_role_permissions_handler(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserId>,
    Path(role_id): Path<String>,
    Json(payload): Json<SetRolePermissionsRequest>,
) -> ApiResult<Json<RolePermissionsResponse>> {
    let role_id = RoleId::parse(role_id.as_str())?;

    let granted = state
        .security_admin_service
        .set_role_permissions(user_id, role_id, &payload.permissions)
        .await?;

    Ok(Json(RolePermissionsResponse {
        role_id: role_id.to_string(),
        permissions: granted
            .into_iter()
            .map(|permission| permission.as_str().to_owned())
            .collect(),
    }))
}
