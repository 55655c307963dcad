use super::*;

/// Appends an audit entry on the connection of the surrounding transaction.
pub(super) async fn append_audit(
    connection: &mut PgConnection,
    event: &AuditEvent,
) -> AppResult<()> {
    sqlx::query(
        r#"
        INSERT INTO audit_log_entries (
            tenant_id,
            actor_id,
            action,
            resource_type,
            resource_id,
            detail
        )
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(event.tenant_id.map(|tenant_id| tenant_id.as_uuid()))
    .bind(event.actor.as_uuid())
    .bind(event.action.as_str())
    .bind(event.resource_type.as_str())
    .bind(event.resource_id.as_str())
    .bind(event.detail.as_deref())
    .execute(&mut *connection)
    .await
    .map_err(|error| {
        AppError::Internal(format!(
            "failed to append audit event '{}': {error}",
            event.action.as_str()
        ))
    })?;

    Ok(())
}
