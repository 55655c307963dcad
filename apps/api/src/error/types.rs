use nutria_core::AppError;
use serde::Serialize;
use ts_rs::TS;

/// Stable, machine-readable error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/error-code.ts"
)]
pub enum ErrorCode {
    Validation,
    InvalidScope,
    UnknownPermission,
    Unauthorized,
    Forbidden,
    TenantMismatch,
    NotFound,
    Conflict,
    DuplicateRole,
    RoleInUse,
    Internal,
}

impl From<&AppError> for ErrorCode {
    fn from(error: &AppError) -> Self {
        match error {
            AppError::Validation(_) => Self::Validation,
            AppError::InvalidScope(_) => Self::InvalidScope,
            AppError::UnknownPermission(_) => Self::UnknownPermission,
            AppError::Unauthorized(_) => Self::Unauthorized,
            AppError::Forbidden(_) => Self::Forbidden,
            AppError::TenantMismatch(_) => Self::TenantMismatch,
            AppError::NotFound(_) => Self::NotFound,
            AppError::Conflict(_) => Self::Conflict,
            AppError::DuplicateRole(_) => Self::DuplicateRole,
            AppError::RoleInUse(_) => Self::RoleInUse,
            AppError::Internal(_) => Self::Internal,
        }
    }
}

/// API error payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/error-response.ts"
)]
pub struct ErrorResponse {
    code: ErrorCode,
    message: String,
}

impl ErrorResponse {
    pub(super) fn from_error(error: &AppError) -> Self {
        Self {
            code: ErrorCode::from(error),
            message: error.to_string(),
        }
    }
}
