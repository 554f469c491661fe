//! Migration operations
//!
//! Operations are best-effort: a failing entry is reported and skipped, the
//! rest of the directory is still processed, and nothing is rolled back.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::diagnostics::{DiagnosticSink, Severity};
use crate::utils::fs::{relocate_entry, remove_entry, unique_destination};

const MAX_RENAME_ATTEMPTS: usize = 16;

/// A data-lifecycle operation on root directories
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationOperation {
    /// Delete every entry under `directory`
    Wipe { directory: PathBuf },
    /// Relocate every entry of `source` into `destination`, creating it if absent
    Move {
        source: PathBuf,
        destination: PathBuf,
    },
    /// Leave everything as is
    NoOp,
}

/// What an executed operation did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MigrationReport {
    pub entries_deleted: usize,
    pub entries_moved: usize,
    /// Moved entries that got a new name to avoid overwriting
    pub entries_renamed: usize,
    pub failures: usize,
}

impl fmt::Display for MigrationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} deleted, {} moved ({} renamed), {} failed",
            self.entries_deleted, self.entries_moved, self.entries_renamed, self.failures
        )
    }
}

impl fmt::Display for MigrationOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MigrationOperation::Wipe { directory } => write!(f, "wipe {}", directory.display()),
            MigrationOperation::Move {
                source,
                destination,
            } => write!(f, "move {} -> {}", source.display(), destination.display()),
            MigrationOperation::NoOp => write!(f, "no-op"),
        }
    }
}

impl MigrationOperation {
    /// Execute the operation, reporting failures to `diagnostics`
    pub fn run(&self, diagnostics: &dyn DiagnosticSink) -> MigrationReport {
        match self {
            MigrationOperation::Wipe { directory } => wipe(directory, diagnostics),
            MigrationOperation::Move {
                source,
                destination,
            } => move_all(source, destination, diagnostics),
            MigrationOperation::NoOp => MigrationReport::default(),
        }
    }
}

fn wipe(directory: &Path, diagnostics: &dyn DiagnosticSink) -> MigrationReport {
    let mut report = MigrationReport::default();

    let Some(entries) = list_entries(directory, &mut report, diagnostics) else {
        return report;
    };

    for path in entries {
        match remove_entry(&path) {
            Ok(()) => report.entries_deleted += 1,
            Err(e) => {
                report.failures += 1;
                diagnostics.record(
                    Severity::Error,
                    &format!("Unable to delete {}", path.display()),
                    Some(&e),
                );
            }
        }
    }

    report
}

fn move_all(source: &Path, destination: &Path, diagnostics: &dyn DiagnosticSink) -> MigrationReport {
    let mut report = MigrationReport::default();

    if source == destination {
        return report;
    }

    let Some(entries) = list_entries(source, &mut report, diagnostics) else {
        return report;
    };

    if let Err(e) = fs::create_dir_all(destination) {
        report.failures += 1;
        diagnostics.record(
            Severity::Error,
            &format!("Unable to create directory {}", destination.display()),
            Some(&e),
        );
        return report;
    }

    for path in entries {
        let Some(name) = path.file_name() else {
            continue;
        };
        let name = name.to_string_lossy();

        let mut target = destination.join(&*name);
        let mut renamed = false;
        let mut attempts = 0;
        let result = loop {
            match relocate_entry(&path, &target) {
                // Taken, possibly by an append that raced this move
                Err(e)
                    if e.kind() == io::ErrorKind::AlreadyExists
                        && attempts < MAX_RENAME_ATTEMPTS =>
                {
                    attempts += 1;
                    renamed = true;
                    target = unique_destination(destination, &name);
                }
                other => break other,
            }
        };

        match result {
            Ok(()) => {
                report.entries_moved += 1;
                if renamed {
                    report.entries_renamed += 1;
                }
            }
            Err(e) => {
                report.failures += 1;
                diagnostics.record(
                    Severity::Error,
                    &format!("Unable to move {} to {}", path.display(), target.display()),
                    Some(&e),
                );
            }
        }
    }

    report
}

/// Paths of the direct children of `dir`
///
/// A missing directory has no entries; any other listing failure is counted
/// and reported, and yields `None`.
fn list_entries(
    dir: &Path,
    report: &mut MigrationReport,
    diagnostics: &dyn DiagnosticSink,
) -> Option<Vec<PathBuf>> {
    let read = fs::read_dir(dir).and_then(|entries| {
        entries
            .map(|entry| entry.map(|e| e.path()))
            .collect::<io::Result<Vec<_>>>()
    });

    match read {
        Ok(paths) => Some(paths),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Some(Vec::new()),
        Err(e) => {
            report.failures += 1;
            diagnostics.record(
                Severity::Error,
                &format!("Unable to list {}", dir.display()),
                Some(&e),
            );
            None
        }
    }
}
