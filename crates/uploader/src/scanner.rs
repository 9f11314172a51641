//! File enumeration for upload.
//!
//! Walks a file or directory and produces [`FileEntry`] records whose
//! names are paths relative to the root, normalized to forward slashes.

use std::path::Path;

use ethfs_protocol::FileEntry;
use tracing::debug;

use crate::error::UploadError;

/// Enumerates `root` into upload entries.
///
/// A single file yields one entry named after its base name. A directory
/// is walked depth-first in name order; symbolic links below the root are
/// skipped. Fails if `root` does not exist or cannot be read.
pub fn enumerate_files(root: &Path) -> Result<Vec<FileEntry>, UploadError> {
    let metadata = std::fs::metadata(root)?;

    if metadata.is_file() {
        let name = root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| std::io::Error::other(format!("{} has no file name", root.display())))?;
        return Ok(vec![FileEntry {
            path: root.to_path_buf(),
            name,
            size: metadata.len(),
        }]);
    }

    let mut files = Vec::new();
    walk_dir(root, root, &mut files)?;
    Ok(files)
}

fn walk_dir(root: &Path, current: &Path, files: &mut Vec<FileEntry>) -> Result<(), UploadError> {
    let mut entries = std::fs::read_dir(current)?.collect::<Result<Vec<_>, _>>()?;
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        let path = entry.path();
        let file_type = entry.file_type()?;

        if file_type.is_symlink() {
            debug!(path = %path.display(), "skipping symbolic link");
        } else if file_type.is_dir() {
            walk_dir(root, &path, files)?;
        } else if file_type.is_file() {
            let rel_path = path.strip_prefix(root).map_err(std::io::Error::other)?;

            // Normalize to forward slashes.
            let name = rel_path.to_string_lossy().replace('\\', "/");
            files.push(FileEntry {
                size: entry.metadata()?.len(),
                path,
                name,
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_tree() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();

        fs::write(root.join("index.html"), b"<html></html>").unwrap();
        fs::write(root.join("favicon.ico"), b"ICO").unwrap();

        fs::create_dir_all(root.join("assets").join("js")).unwrap();
        fs::write(root.join("assets").join("site.css"), b"body{}").unwrap();
        fs::write(
            root.join("assets").join("js").join("app.js"),
            b"console.log(1)",
        )
        .unwrap();

        dir
    }

    #[test]
    fn directory_names_are_relative_with_forward_slashes() {
        let dir = create_test_tree();
        let files = enumerate_files(dir.path()).unwrap();

        let names: Vec<&str> = files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["assets/js/app.js", "assets/site.css", "favicon.ico", "index.html"]
        );
        for f in &files {
            assert!(!f.name.contains('\\'));
            assert_eq!(f.size, fs::metadata(&f.path).unwrap().len());
        }
    }

    #[test]
    fn sizes_are_recorded() {
        let dir = create_test_tree();
        let files = enumerate_files(dir.path()).unwrap();
        let total: u64 = files.iter().map(|f| f.size).sum();
        assert_eq!(total, 13 + 3 + 6 + 14);
    }

    #[test]
    fn single_file_uses_base_name() {
        let dir = create_test_tree();
        let files = enumerate_files(&dir.path().join("assets").join("site.css")).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name, "site.css");
        assert_eq!(files[0].size, 6);
    }

    #[test]
    fn empty_directory_yields_nothing() {
        let dir = TempDir::new().unwrap();
        assert!(enumerate_files(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn missing_root_is_an_error() {
        let err = enumerate_files(Path::new("/nonexistent/ethfs/site")).unwrap_err();
        assert!(matches!(err, UploadError::Io(_)));
    }

    #[cfg(unix)]
    #[test]
    fn symlinks_are_skipped() {
        let dir = create_test_tree();
        let root = dir.path();
        std::os::unix::fs::symlink(root, root.join("loop")).unwrap();
        std::os::unix::fs::symlink(root.join("index.html"), root.join("alias.html")).unwrap();

        let files = enumerate_files(root).unwrap();
        assert_eq!(files.len(), 4);
        assert!(files.iter().all(|f| !f.name.starts_with("loop") && f.name != "alias.html"));
    }
}
