use chrono::{DateTime, Utc};

use nutria_core::UserId;
use nutria_domain::{RoleId, RoleName, RoleScope};

/// Assignment projection mapping a user to a role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleAssignment {
    /// Assigned user.
    pub user_id: UserId,
    /// Assigned role identifier.
    pub role_id: RoleId,
    /// Assigned role key.
    pub role_name: RoleName,
    /// Scope of the assigned role.
    pub scope: RoleScope,
    /// Whether the assignment currently grants access.
    pub is_active: bool,
    /// User that made the latest (re)assignment.
    pub assigned_by: Option<UserId>,
    /// Timestamp of the latest (re)assignment.
    pub assigned_at: DateTime<Utc>,
    /// Timestamp of the latest revocation, cleared on reactivation.
    pub deactivated_at: Option<DateTime<Utc>>,
}

/// What an assignment call did to the stored row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentChange {
    /// A new row was inserted.
    Created,
    /// An inactive row was flipped back to active.
    Reactivated,
    /// The row was already active; nothing changed.
    Unchanged,
}

/// Result of an assignment call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentOutcome {
    /// Assignment state after the call.
    pub assignment: RoleAssignment,
    /// Applied change.
    pub change: AssignmentChange,
}
