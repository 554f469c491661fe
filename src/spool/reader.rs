//! Reading batch files back
//!
//! This is the read side used by whatever drains the spool (the uploader):
//! a batch file is split on the separator byte and each block is decoded.

use std::fs;
use std::io;
use std::path::Path;

use crate::error::SpoolResult;
use crate::types::BatchFile;

use super::codec;
use super::SEPARATOR;

/// Decode every payload stored in one batch file, in write order
pub fn read_batch<P: AsRef<Path>>(path: P) -> SpoolResult<Vec<Vec<u8>>> {
    let bytes = fs::read(path)?;

    let mut blocks: Vec<&[u8]> = bytes.split(|b| *b == SEPARATOR).collect();
    // Whatever follows the last separator is either empty or a torn write
    blocks.pop();

    blocks.into_iter().map(codec::decode).collect()
}

/// Decode every batch file of a directory, oldest file first
///
/// A missing directory reads as empty.
pub fn read_directory<P: AsRef<Path>>(dir: P) -> SpoolResult<Vec<(BatchFile, Vec<Vec<u8>>)>> {
    let files = match BatchFile::list(dir.as_ref()) {
        Ok(files) => files,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut batches = Vec::with_capacity(files.len());
    for file in files {
        let payloads = read_batch(&file.path)?;
        batches.push((file, payloads));
    }
    Ok(batches)
}

/// Summary of the batch files in a directory
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryStats {
    /// Number of batch files
    pub file_count: usize,
    /// Sum of all batch file sizes in bytes
    pub total_bytes: u64,
    /// Creation time of the oldest file
    pub oldest_millis: Option<u64>,
    /// Creation time of the newest file
    pub newest_millis: Option<u64>,
}

impl DirectoryStats {
    /// Format size in human-readable format
    pub fn format_size(bytes: u64) -> String {
        const KB: u64 = 1024;
        const MB: u64 = KB * 1024;

        if bytes >= MB {
            format!("{:.2} MB", bytes as f64 / MB as f64)
        } else if bytes >= KB {
            format!("{:.2} KB", bytes as f64 / KB as f64)
        } else {
            format!("{} B", bytes)
        }
    }
}

/// Collect [`DirectoryStats`] for `dir`
pub fn directory_stats<P: AsRef<Path>>(dir: P) -> SpoolResult<DirectoryStats> {
    let files = match BatchFile::list(dir.as_ref()) {
        Ok(files) => files,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(DirectoryStats::default()),
        Err(e) => return Err(e.into()),
    };

    Ok(DirectoryStats {
        file_count: files.len(),
        total_bytes: files.iter().map(|f| f.size_bytes).sum(),
        oldest_millis: files.first().map(|f| f.created_at_millis),
        newest_millis: files.last().map(|f| f.created_at_millis),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_blocks(path: &Path, payloads: &[&[u8]]) {
        let mut bytes = Vec::new();
        for payload in payloads {
            bytes.extend(codec::encode(payload));
            bytes.push(SEPARATOR);
        }
        fs::write(path, bytes).unwrap();
    }

    #[test]
    fn test_read_batch() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("100");
        write_blocks(&path, &[b"one", b"", b"three"]);

        let payloads = read_batch(&path).unwrap();
        assert_eq!(payloads, vec![b"one".to_vec(), Vec::new(), b"three".to_vec()]);
    }

    #[test]
    fn test_read_batch_ignores_torn_tail() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("100");
        let mut bytes = codec::encode(b"complete");
        bytes.push(SEPARATOR);
        bytes.extend_from_slice(b"cGFydGlh");
        fs::write(&path, bytes).unwrap();

        assert_eq!(read_batch(&path).unwrap(), vec![b"complete".to_vec()]);
    }

    #[test]
    fn test_read_batch_rejects_corruption() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("100");
        fs::write(&path, b"%%%\n").unwrap();

        assert!(read_batch(&path).is_err());
    }

    #[test]
    fn test_read_directory_in_name_order() {
        let temp_dir = TempDir::new().unwrap();
        write_blocks(&temp_dir.path().join("20"), &[b"later"]);
        write_blocks(&temp_dir.path().join("3"), &[b"earlier"]);

        let batches = read_directory(temp_dir.path()).unwrap();
        let payloads: Vec<Vec<u8>> = batches.into_iter().flat_map(|(_, p)| p).collect();
        assert_eq!(payloads, vec![b"earlier".to_vec(), b"later".to_vec()]);
    }

    #[test]
    fn test_missing_directory_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing");

        assert!(read_directory(&missing).unwrap().is_empty());
        assert_eq!(directory_stats(&missing).unwrap(), DirectoryStats::default());
    }

    #[test]
    fn test_directory_stats() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("5"), b"abc\n").unwrap();
        fs::write(temp_dir.path().join("9"), b"de\n").unwrap();
        fs::write(temp_dir.path().join("notes"), b"ignored").unwrap();

        let stats = directory_stats(temp_dir.path()).unwrap();
        assert_eq!(stats.file_count, 2);
        assert_eq!(stats.total_bytes, 7);
        assert_eq!(stats.oldest_millis, Some(5));
        assert_eq!(stats.newest_millis, Some(9));
    }

    #[test]
    fn test_format_size() {
        assert_eq!(DirectoryStats::format_size(512), "512 B");
        assert_eq!(DirectoryStats::format_size(2048), "2.00 KB");
        assert_eq!(DirectoryStats::format_size(3 * 1024 * 1024), "3.00 MB");
    }
}
