//! Filesystem helpers for bulk directory operations
//!
//! Relocation never replaces an existing entry: a taken destination is an
//! error the caller resolves by picking another name.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

/// Remove a file or a whole directory tree
///
/// A missing entry is not an error.
pub fn remove_entry<P: AsRef<Path>>(path: P) -> io::Result<()> {
    let path = path.as_ref();
    let result = match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => fs::remove_dir_all(path),
        Ok(_) => fs::remove_file(path),
        Err(e) => Err(e),
    };

    match result {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

/// Pick a path inside `dir` for an entry called `name` that does not exist yet
///
/// Decimal names (batch files) are bumped to the next free integer so they
/// keep parsing as timestamps; any other name gets a `.N` suffix.
pub fn unique_destination(dir: &Path, name: &str) -> PathBuf {
    let candidate = dir.join(name);
    if !candidate.exists() {
        return candidate;
    }

    if let Ok(base) = name.parse::<u64>() {
        let mut next = base;
        loop {
            next = next.saturating_add(1);
            let candidate = dir.join(next.to_string());
            if !candidate.exists() || next == u64::MAX {
                return candidate;
            }
        }
    }

    let mut suffix = 1u64;
    loop {
        let candidate = dir.join(format!("{}.{}", name, suffix));
        if !candidate.exists() {
            return candidate;
        }
        suffix += 1;
    }
}

/// Move `from` to `to` without ever replacing an existing `to`
///
/// Fails with [`io::ErrorKind::AlreadyExists`] when `to` is taken. Files are
/// hard-linked into place and then unlinked, falling back to an exclusive
/// copy when linking is not possible (e.g. across filesystems). Directories
/// are recreated at `to` and their entries relocated one by one.
pub fn relocate_entry<P1, P2>(from: P1, to: P2) -> io::Result<()>
where
    P1: AsRef<Path>,
    P2: AsRef<Path>,
{
    let from = from.as_ref();
    let to = to.as_ref();

    if fs::symlink_metadata(from)?.is_dir() {
        fs::create_dir(to)?;
        for entry in fs::read_dir(from)? {
            let entry = entry?;
            relocate_entry(entry.path(), to.join(entry.file_name()))?;
        }
        return fs::remove_dir(from);
    }

    match fs::hard_link(from, to) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => return Err(e),
        Err(_) => copy_exclusive(from, to)?,
    }
    fs::remove_file(from)
}

/// Copy a file into a path that must not exist yet
fn copy_exclusive(from: &Path, to: &Path) -> io::Result<()> {
    let mut source = File::open(from)?;
    let mut target = OpenOptions::new().write(true).create_new(true).open(to)?;
    io::copy(&mut source, &mut target)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_remove_entry_file_dir_and_missing() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("file");
        let nested = temp_dir.path().join("nested");
        fs::write(&file, "x").unwrap();
        fs::create_dir_all(nested.join("deeper")).unwrap();
        fs::write(nested.join("deeper").join("leaf"), "y").unwrap();

        remove_entry(&file).unwrap();
        remove_entry(&nested).unwrap();
        remove_entry(temp_dir.path().join("never-existed")).unwrap();

        assert!(!file.exists());
        assert!(!nested.exists());
    }

    #[test]
    fn test_unique_destination_bumps_timestamps() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("1000"), "").unwrap();
        fs::write(temp_dir.path().join("1001"), "").unwrap();

        let dest = unique_destination(temp_dir.path(), "1000");
        assert_eq!(dest, temp_dir.path().join("1002"));

        let free = unique_destination(temp_dir.path(), "2000");
        assert_eq!(free, temp_dir.path().join("2000"));
    }

    #[test]
    fn test_unique_destination_suffixes_other_names() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("notes"), "").unwrap();

        let dest = unique_destination(temp_dir.path(), "notes");
        assert_eq!(dest, temp_dir.path().join("notes.1"));
    }

    #[test]
    fn test_relocate_entry_moves_tree() {
        let temp_dir = TempDir::new().unwrap();
        let src = temp_dir.path().join("src");
        fs::create_dir_all(src.join("inner")).unwrap();
        fs::write(src.join("inner").join("a"), "payload").unwrap();

        let dst = temp_dir.path().join("dst");
        relocate_entry(&src, &dst).unwrap();

        assert!(!src.exists());
        assert_eq!(fs::read_to_string(dst.join("inner").join("a")).unwrap(), "payload");
    }

    #[test]
    fn test_relocate_entry_never_overwrites() {
        let temp_dir = TempDir::new().unwrap();
        let src = temp_dir.path().join("100");
        let dst_dir = temp_dir.path().join("granted");
        fs::create_dir_all(&dst_dir).unwrap();
        fs::write(&src, "incoming").unwrap();
        fs::write(dst_dir.join("100"), "written meanwhile").unwrap();

        let err = relocate_entry(&src, dst_dir.join("100")).unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
        assert_eq!(fs::read_to_string(&src).unwrap(), "incoming");
        assert_eq!(fs::read_to_string(dst_dir.join("100")).unwrap(), "written meanwhile");
    }

    #[test]
    fn test_copy_exclusive_refuses_existing_target() {
        let temp_dir = TempDir::new().unwrap();
        let src = temp_dir.path().join("a");
        let dst = temp_dir.path().join("b");
        fs::write(&src, "1").unwrap();

        copy_exclusive(&src, &dst).unwrap();
        assert_eq!(fs::read_to_string(&dst).unwrap(), "1");
        assert!(src.exists());

        fs::write(&src, "2").unwrap();
        assert!(copy_exclusive(&src, &dst).is_err());
        assert_eq!(fs::read_to_string(&dst).unwrap(), "1");
    }
}
