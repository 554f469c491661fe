//! Batch files on disk
//!
//! A batch file is named after its creation time in milliseconds since the
//! epoch. Ordering files by the parsed name is the same as ordering them
//! chronologically, so the newest file is always the last one.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// One batch file inside a root directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchFile {
    /// Full path of the file
    pub path: PathBuf,
    /// Creation time parsed from the file name
    pub created_at_millis: u64,
    /// Current length in bytes
    pub size_bytes: u64,
}

impl BatchFile {
    /// A file that does not exist yet, created at `millis`
    pub fn new_at(dir: &Path, millis: u64) -> Self {
        Self {
            path: dir.join(millis.to_string()),
            created_at_millis: millis,
            size_bytes: 0,
        }
    }

    /// Parse a batch file name into its creation timestamp
    ///
    /// Only plain decimal names qualify.
    pub fn parse_name(name: &str) -> Option<u64> {
        if name.is_empty() || !name.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        name.parse().ok()
    }

    /// List the batch files of `dir`, oldest first
    ///
    /// Entries that are not regular files or whose names are not timestamps
    /// are ignored.
    pub fn list(dir: &Path) -> io::Result<Vec<BatchFile>> {
        let mut files = Vec::new();

        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let Some(created_at_millis) = entry.file_name().to_str().and_then(Self::parse_name)
            else {
                continue;
            };

            let metadata = match entry.metadata() {
                Ok(m) => m,
                // Deleted between read_dir and stat
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e),
            };
            if !metadata.is_file() {
                continue;
            }

            files.push(BatchFile {
                path: entry.path(),
                created_at_millis,
                size_bytes: metadata.len(),
            });
        }

        files.sort_by_key(|f| f.created_at_millis);
        Ok(files)
    }

    /// File name as written on disk
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_name() {
        assert_eq!(BatchFile::parse_name("1571234567890"), Some(1_571_234_567_890));
        assert_eq!(BatchFile::parse_name("0"), Some(0));
        assert_eq!(BatchFile::parse_name(""), None);
        assert_eq!(BatchFile::parse_name("+12"), None);
        assert_eq!(BatchFile::parse_name("12.1"), None);
        assert_eq!(BatchFile::parse_name("abc"), None);
    }

    #[test]
    fn test_list_sorts_numerically_and_filters() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();

        fs::write(dir.join("900"), "abc").unwrap();
        fs::write(dir.join("1000"), "a").unwrap();
        fs::write(dir.join("README"), "ignored").unwrap();
        fs::create_dir(dir.join("1200")).unwrap();

        let files = BatchFile::list(dir).unwrap();
        let stamps: Vec<u64> = files.iter().map(|f| f.created_at_millis).collect();

        // Lexicographic order would put "1000" before "900"
        assert_eq!(stamps, vec![900, 1000]);
        assert_eq!(files[0].size_bytes, 3);
        assert_eq!(files[1].name(), "1000");
    }

    #[test]
    fn test_new_at() {
        let file = BatchFile::new_at(Path::new("/spool"), 77);
        assert_eq!(file.path, PathBuf::from("/spool/77"));
        assert_eq!(file.size_bytes, 0);
    }
}
