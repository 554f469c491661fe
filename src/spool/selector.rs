//! Batch file selection
//!
//! Decides which file the next payload goes to. The newest file is reused
//! while it has room for the payload and is younger than the maximum age;
//! otherwise a new file is started.

use std::path::Path;

use crate::types::BatchFile;

use super::config::BatchConfig;

/// Outcome of [`select_file`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Append to the newest existing file
    Reuse(BatchFile),
    /// Start a new file
    Create(BatchFile),
}

impl Selection {
    pub fn file(&self) -> &BatchFile {
        match self {
            Selection::Reuse(file) | Selection::Create(file) => file,
        }
    }

    pub fn is_new(&self) -> bool {
        matches!(self, Selection::Create(_))
    }
}

/// Choose the file a payload of `payload_size` bytes is appended to
///
/// `existing` is the directory listing; it does not need to be sorted. The
/// newest file is reused iff
/// `size < max_batch_size - payload_size` and `now - created_at < max_file_age_ms`.
/// A payload at least as large as `max_batch_size` always gets a new file.
///
/// A new file is named `now`, or one past the newest file when the clock has
/// not moved past it, so names stay unique and increasing.
pub fn select_file(
    dir: &Path,
    existing: &[BatchFile],
    payload_size: u64,
    now_millis: u64,
    config: &BatchConfig,
) -> Selection {
    let Some(last) = existing.iter().max_by_key(|f| f.created_at_millis) else {
        return Selection::Create(BatchFile::new_at(dir, now_millis));
    };

    let has_room = config
        .max_batch_size
        .checked_sub(payload_size)
        .is_some_and(|limit| last.size_bytes < limit);
    let is_recent = now_millis.saturating_sub(last.created_at_millis) < config.max_file_age_ms;

    if has_room && is_recent {
        Selection::Reuse(last.clone())
    } else {
        let created_at = now_millis.max(last.created_at_millis.saturating_add(1));
        Selection::Create(BatchFile::new_at(dir, created_at))
    }
}
