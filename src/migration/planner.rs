//! Consent transition table
//!
//! Maps a (previous consent, new consent) pair to the data-lifecycle action
//! applied to already buffered data:
//!
//! | previous → new                              | action              |
//! |---------------------------------------------|---------------------|
//! | none → any, PENDING → NOT_GRANTED           | wipe previous root  |
//! | GRANTED → PENDING, NOT_GRANTED → PENDING    | wipe new root       |
//! | PENDING → GRANTED                           | move previous → new |
//! | any other pair                              | nothing             |
//!
//! Pairs missing from the table resolve to a no-op and are reported. With no
//! previous consent the previous root is whatever the caller supplies for
//! leftovers of an earlier session; without one there is nothing to wipe.

use std::path::Path;

use crate::diagnostics::{Severity, SharedSink};
use crate::types::Consent;

use super::operation::MigrationOperation;

/// What happens to buffered data on a consent transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationAction {
    /// Delete everything in the previous consent's root directory
    WipePrevious,
    /// Delete everything in the new consent's root directory
    WipeNew,
    /// Relocate the previous root's content into the new root
    MoveToNew,
    /// Leave buffered data alone
    Nothing,
}

/// One row of the transition table
pub type Transition = (Option<Consent>, Consent, MigrationAction);

/// The complete transition table
pub const TRANSITIONS: [Transition; 12] = [
    // Startup: data left by an earlier session was never decided on
    (None, Consent::Pending, MigrationAction::WipePrevious),
    (None, Consent::Granted, MigrationAction::WipePrevious),
    (None, Consent::NotGranted, MigrationAction::WipePrevious),
    (Some(Consent::Pending), Consent::Pending, MigrationAction::Nothing),
    (Some(Consent::Pending), Consent::Granted, MigrationAction::MoveToNew),
    (Some(Consent::Pending), Consent::NotGranted, MigrationAction::WipePrevious),
    (Some(Consent::Granted), Consent::Pending, MigrationAction::WipeNew),
    (Some(Consent::Granted), Consent::Granted, MigrationAction::Nothing),
    (Some(Consent::Granted), Consent::NotGranted, MigrationAction::Nothing),
    (Some(Consent::NotGranted), Consent::Pending, MigrationAction::WipeNew),
    (Some(Consent::NotGranted), Consent::Granted, MigrationAction::Nothing),
    (Some(Consent::NotGranted), Consent::NotGranted, MigrationAction::Nothing),
];

/// Turns consent transitions into migration operations
pub struct MigrationPlanner {
    table: &'static [Transition],
    diagnostics: SharedSink,
}

impl MigrationPlanner {
    pub fn new(diagnostics: SharedSink) -> Self {
        Self::with_table(&TRANSITIONS, diagnostics)
    }

    pub(crate) fn with_table(table: &'static [Transition], diagnostics: SharedSink) -> Self {
        Self { table, diagnostics }
    }

    /// Look up the action for a transition
    pub fn action_for(&self, previous: Option<Consent>, next: Consent) -> Option<MigrationAction> {
        self.table
            .iter()
            .find(|(p, n, _)| *p == previous && *n == next)
            .map(|(_, _, action)| *action)
    }

    /// Plan the operation for a transition between two root directories
    ///
    /// `previous_root` may only be `None` when `previous` is; that case plans
    /// nothing.
    pub fn plan(
        &self,
        previous: Option<Consent>,
        next: Consent,
        previous_root: Option<&Path>,
        new_root: &Path,
    ) -> MigrationOperation {
        let Some(action) = self.action_for(previous, next) else {
            self.diagnostics.record(
                Severity::Warn,
                &format!(
                    "Unexpected migration from {} to {}",
                    describe(previous),
                    next
                ),
                None,
            );
            return MigrationOperation::NoOp;
        };

        match (action, previous_root) {
            (MigrationAction::Nothing, _) => MigrationOperation::NoOp,
            (MigrationAction::WipeNew, _) => MigrationOperation::Wipe {
                directory: new_root.to_path_buf(),
            },
            (MigrationAction::WipePrevious, Some(root)) => MigrationOperation::Wipe {
                directory: root.to_path_buf(),
            },
            (MigrationAction::MoveToNew, Some(root)) => MigrationOperation::Move {
                source: root.to_path_buf(),
                destination: new_root.to_path_buf(),
            },
            (MigrationAction::WipePrevious | MigrationAction::MoveToNew, None)
                if previous.is_none() =>
            {
                MigrationOperation::NoOp
            }
            (MigrationAction::WipePrevious | MigrationAction::MoveToNew, None) => {
                self.diagnostics.record(
                    Severity::Warn,
                    &format!(
                        "Migration from {} to {} needs the previous root directory",
                        describe(previous),
                        next
                    ),
                    None,
                );
                MigrationOperation::NoOp
            }
        }
    }
}

fn describe(consent: Option<Consent>) -> String {
    consent.map_or_else(|| "null".to_string(), |c| c.to_string())
}
