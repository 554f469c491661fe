//! Consent change entry point

use std::sync::Arc;

use crate::consent::RootDirectoryProvider;
use crate::diagnostics::{Severity, SharedSink};
use crate::types::Consent;

use super::executor::MigrationExecutor;
use super::planner::MigrationPlanner;

/// Plans and schedules the migration for each consent change
pub struct ConsentMigrator {
    directories: Arc<dyn RootDirectoryProvider>,
    planner: MigrationPlanner,
    executor: MigrationExecutor,
    diagnostics: SharedSink,
}

impl ConsentMigrator {
    pub fn new(
        directories: Arc<dyn RootDirectoryProvider>,
        executor: MigrationExecutor,
        diagnostics: SharedSink,
    ) -> Self {
        Self {
            directories,
            planner: MigrationPlanner::new(diagnostics.clone()),
            executor,
            diagnostics,
        }
    }

    /// React to a consent change; returns before the migration runs
    ///
    /// With no previous consent (startup) the pending root stands in for the
    /// previous one: whatever an earlier session buffered there was never
    /// decided on and is wiped.
    pub fn on_consent_changed(&self, previous: Option<Consent>, next: Consent) {
        let previous_root = self
            .directories
            .root_dir(previous.unwrap_or(Consent::Pending));
        let new_root = self.directories.root_dir(next);

        let operation = self
            .planner
            .plan(previous, next, Some(previous_root.as_path()), &new_root);
        self.diagnostics.record(
            Severity::Debug,
            &format!(
                "Consent changed from {:?} to {}: {}",
                previous, next, operation
            ),
            None,
        );

        self.executor.schedule(operation);
    }

    pub fn executor(&self) -> &MigrationExecutor {
        &self.executor
    }
}
