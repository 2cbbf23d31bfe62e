//! Atomic I/O operations with file locking

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use fs2::FileExt;

use crate::{Error, NormalizedPath, Result};

/// Write content atomically to a file with locking.
///
/// Uses write-to-temp-then-rename so a reader never observes a partially
/// written file. The temporary file is a dot file in the target directory,
/// which keeps the rename on one filesystem and keeps it out of store
/// listings. Permissions of an existing target are carried over.
pub fn write_atomic(path: &NormalizedPath, content: &[u8]) -> Result<()> {
    let native_path = path.to_native();

    if let Some(parent) = native_path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    let temp_name = format!(
        ".{}.{}.tmp",
        native_path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default(),
        std::process::id()
    );
    let temp_path = native_path.with_file_name(&temp_name);

    let result = write_temp(&temp_path, &native_path, content)
        .and_then(|()| fs::rename(&temp_path, &native_path).map_err(|e| Error::io(&native_path, e)));

    if result.is_err() {
        // Never leave the temp file behind on failure.
        let _ = fs::remove_file(&temp_path);
    }
    result
}

fn write_temp(temp_path: &Path, target: &Path, content: &[u8]) -> Result<()> {
    let mut temp_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(temp_path)
        .map_err(|e| Error::io(temp_path, e))?;

    temp_file
        .lock_exclusive()
        .map_err(|_| Error::LockFailed {
            path: target.to_path_buf(),
        })?;

    temp_file
        .write_all(content)
        .map_err(|e| Error::io(temp_path, e))?;

    temp_file.sync_all().map_err(|e| Error::io(temp_path, e))?;

    if let Ok(metadata) = fs::metadata(target) {
        temp_file
            .set_permissions(metadata.permissions())
            .map_err(|e| Error::io(temp_path, e))?;
    }

    temp_file.unlock().map_err(|_| Error::LockFailed {
        path: target.to_path_buf(),
    })?;

    Ok(())
}

/// Read text content from a file.
pub fn read_text(path: &NormalizedPath) -> Result<String> {
    let native_path = path.to_native();
    fs::read_to_string(&native_path).map_err(|e| Error::io(&native_path, e))
}

/// Read text content from a file, returning `None` when it does not exist.
pub fn read_text_if_exists(path: &NormalizedPath) -> Result<Option<String>> {
    match read_text(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(e),
    }
}

/// Write text content to a file atomically.
pub fn write_text(path: &NormalizedPath, content: &str) -> Result<()> {
    write_atomic(path, content.as_bytes())
}

/// Remove a file.
pub fn remove_file(path: &NormalizedPath) -> Result<()> {
    let native_path = path.to_native();
    fs::remove_file(&native_path).map_err(|e| Error::io(&native_path, e))
}

/// Remove a directory if it exists and is empty.
///
/// Returns whether the directory was removed.
pub fn remove_empty_dir(path: &NormalizedPath) -> Result<bool> {
    let native_path = path.to_native();
    match fs::remove_dir(&native_path) {
        Ok(()) => Ok(true),
        Err(e)
            if matches!(
                e.kind(),
                std::io::ErrorKind::NotFound | std::io::ErrorKind::DirectoryNotEmpty
            ) =>
        {
            Ok(false)
        }
        Err(e) => Err(Error::io(&native_path, e)),
    }
}

/// Set or clear the executable bits for owner, group and others (Unix only).
#[cfg(unix)]
pub fn set_executable(path: &NormalizedPath, executable: bool) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let native_path = path.to_native();
    let mut permissions = fs::metadata(&native_path)
        .map_err(|e| Error::io(&native_path, e))?
        .permissions();
    let mode = if executable {
        permissions.mode() | 0o111
    } else {
        permissions.mode() & !0o111
    };
    permissions.set_mode(mode);
    fs::set_permissions(&native_path, permissions).map_err(|e| Error::io(&native_path, e))
}

/// Set or clear the executable bits (no-op on this platform).
#[cfg(not(unix))]
pub fn set_executable(_path: &NormalizedPath, _executable: bool) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn write_atomic_creates_parent_directories() {
        let temp = TempDir::new().unwrap();
        let path = NormalizedPath::new(temp.path()).join("nested/dir/file.txt");

        write_text(&path, "content").unwrap();

        assert_eq!(read_text(&path).unwrap(), "content");
    }

    #[test]
    fn write_atomic_leaves_no_temp_files() {
        let temp = TempDir::new().unwrap();
        let path = NormalizedPath::new(temp.path()).join("file.txt");

        write_text(&path, "one").unwrap();
        write_text(&path, "two").unwrap();

        let entries: Vec<_> = fs::read_dir(temp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(entries, vec!["file.txt".to_string()]);
        assert_eq!(read_text(&path).unwrap(), "two");
    }

    #[test]
    fn read_text_if_exists_returns_none_for_missing_file() {
        let temp = TempDir::new().unwrap();
        let path = NormalizedPath::new(temp.path()).join("missing");
        assert!(read_text_if_exists(&path).unwrap().is_none());
    }

    #[test]
    fn remove_empty_dir_keeps_populated_directories() {
        let temp = TempDir::new().unwrap();
        let root = NormalizedPath::new(temp.path());
        write_text(&root.join("full/file.txt"), "x").unwrap();
        fs::create_dir(temp.path().join("empty")).unwrap();

        assert!(!remove_empty_dir(&root.join("full")).unwrap());
        assert!(remove_empty_dir(&root.join("empty")).unwrap());
        assert!(!remove_empty_dir(&root.join("missing")).unwrap());
        assert!(temp.path().join("full/file.txt").exists());
        assert!(!temp.path().join("empty").exists());
    }

    #[cfg(unix)]
    #[test]
    fn write_atomic_preserves_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let path = NormalizedPath::new(temp.path()).join("script.sh");
        write_text(&path, "#!/bin/sh\n").unwrap();
        set_executable(&path, true).unwrap();

        write_text(&path, "#!/bin/sh\necho hi\n").unwrap();

        let mode = fs::metadata(path.to_native()).unwrap().permissions().mode();
        assert_eq!(mode & 0o111, 0o111);
    }

    #[cfg(unix)]
    #[test]
    fn set_executable_clears_bits() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let path = NormalizedPath::new(temp.path()).join("script.sh");
        write_text(&path, "#!/bin/sh\n").unwrap();
        fs::set_permissions(path.to_native(), fs::Permissions::from_mode(0o755)).unwrap();

        set_executable(&path, false).unwrap();

        let mode = fs::metadata(path.to_native()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o644);
    }
}
