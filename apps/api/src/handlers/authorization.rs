use axum::Json;
use axum::extract::{Extension, State};
use nutria_core::{AppError, UserId};
use tracing::debug;

use crate::dto::{AuthorizationDecisionResponse, CheckPermissionRequest, MeResponse, parse_tenant_id};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn me_handler(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserId>,
) -> ApiResult<Json<MeResponse>> {
    let identity = state
        .authorization_service
        .resolve_identity(user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("unknown caller".to_owned()))?;

    let permissions = state
        .authorization_service
        .effective_permissions(user_id)
        .await?;

    Ok(Json(MeResponse::new(&identity, permissions)))
}

pub async fn check_permission_handler(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserId>,
    Json(payload): Json<CheckPermissionRequest>,
) -> ApiResult<Json<AuthorizationDecisionResponse>> {
    let tenant_id = parse_tenant_id(payload.tenant_id.as_deref())?;

    let decision = state
        .tenant_scope_guard
        .authorize(Some(user_id), payload.permission.as_str(), tenant_id)
        .await?;

    debug!(
        %user_id,
        permission = payload.permission.as_str(),
        decision = decision.as_str(),
        "permission checked"
    );

    Ok(Json(AuthorizationDecisionResponse::from(&decision)))
}
