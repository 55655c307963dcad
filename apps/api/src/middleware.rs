use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use nutria_core::{AppError, UserId};

use crate::error::ApiResult;

/// Header carrying the caller id established by the upstream authentication layer.
pub const USER_ID_HEADER: &str = "x-user-id";

pub async fn require_auth(mut request: Request, next: Next) -> ApiResult<Response> {
    let user_id = request
        .headers()
        .get(USER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()))?;

    let user_id = UserId::parse(user_id.trim())
        .map_err(|_| AppError::Unauthorized("caller id is not a valid user id".to_owned()))?;

    request.extensions_mut().insert(user_id);
    Ok(next.run(request).await)
}
