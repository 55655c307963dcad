use nutria_core::{AppResult, TenantId};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Health response payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/health-response.ts"
)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Optional tenant scope carried in the query string. Absent means system scope.
#[derive(Debug, Default, Deserialize)]
pub struct TenantScopeQuery {
    pub tenant_id: Option<String>,
}

/// Parses an optional transport tenant id, treating blank values as absent.
pub fn parse_tenant_id(value: Option<&str>) -> AppResult<Option<TenantId>> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(TenantId::parse)
        .transpose()
}
