/// Whether an upsert inserted or updated a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// Row was inserted.
    Created,
    /// Existing row had its descriptive fields refreshed.
    Updated,
}

/// Counters describing one provisioning run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProvisioningReport {
    /// Permissions inserted.
    pub permissions_created: usize,
    /// Permissions refreshed.
    pub permissions_updated: usize,
    /// Roles inserted.
    pub roles_created: usize,
    /// Roles refreshed or reactivated.
    pub roles_updated: usize,
    /// Binding rows written by the full replace of every role.
    pub bindings_written: usize,
}

impl ProvisioningReport {
    /// Records a permission upsert.
    pub fn record_permission(&mut self, outcome: UpsertOutcome) {
        match outcome {
            UpsertOutcome::Created => self.permissions_created += 1,
            UpsertOutcome::Updated => self.permissions_updated += 1,
        }
    }

    /// Records a role upsert.
    pub fn record_role(&mut self, outcome: UpsertOutcome) {
        match outcome {
            UpsertOutcome::Created => self.roles_created += 1,
            UpsertOutcome::Updated => self.roles_updated += 1,
        }
    }
}
