use super::*;

pub async fn list_permissions_handler(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserId>,
    Query(query): Query<PermissionModuleQuery>,
) -> ApiResult<Json<Vec<PermissionResponse>>> {
    let module = query
        .module
        .as_deref()
        .map(str::trim)
        .filter(|module| !module.is_empty());

    let permissions = state
        .security_admin_service
        .list_permissions(user_id, module)
        .await?
        .into_iter()
        .map(PermissionResponse::from)
        .collect();

    Ok(Json(permissions))
}
