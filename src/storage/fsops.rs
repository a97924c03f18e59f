//! Filesystem primitives used by the build pipeline
//!
//! Every operation is synchronous and idempotent where that makes sense:
//! creating an existing directory or removing a missing one is a no-op.
//! Failures carry the path involved and are never retried.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};

use thiserror::Error;
use walkdir::WalkDir;

#[derive(Debug, Error)]
pub enum FsError {
    #[error("Failed to create directory {}: {source}", path.display())]
    CreateDir { path: PathBuf, source: io::Error },

    #[error("Failed to copy {} to {}: {source}", from.display(), to.display())]
    Copy {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },

    #[error("Failed to remove {}: {source}", path.display())]
    Remove { path: PathBuf, source: io::Error },

    #[error("Failed to read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("Failed to write {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },
}

pub type FsResult<T> = Result<T, FsError>;

/// Creates `path` and any missing ancestors. Returns true if it was created.
pub fn ensure_dir(path: &Path) -> FsResult<bool> {
    if path.is_dir() {
        return Ok(false);
    }

    fs::create_dir_all(path).map_err(|source| FsError::CreateDir {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(true)
}

/// Copies one file, creating the destination's parent directories and
/// overwriting any existing file. Returns the number of bytes copied.
pub fn copy_file(from: &Path, to: &Path) -> FsResult<u64> {
    if let Some(parent) = to.parent() {
        ensure_dir(parent)?;
    }

    fs::copy(from, to).map_err(|source| FsError::Copy {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    })
}

/// Mirrors every file under `from` into `to`.
///
/// Additive: files already in `to` that don't exist in `from` are left
/// alone. Empty subdirectories are recreated. Returns the (source,
/// destination) pair of each copied file.
pub fn copy_tree(from: &Path, to: &Path) -> FsResult<Vec<(PathBuf, PathBuf)>> {
    ensure_dir(to)?;

    let mut copied = Vec::new();
    for entry in WalkDir::new(from).min_depth(1).follow_links(true) {
        let entry = entry.map_err(|e| walk_error(from, e))?;
        let relative = entry.path().strip_prefix(from).unwrap_or(entry.path());
        let dest = to.join(relative);

        if entry.file_type().is_dir() {
            ensure_dir(&dest)?;
        } else if entry.file_type().is_file() {
            copy_file(entry.path(), &dest)?;
            copied.push((entry.into_path(), dest));
        }
    }

    Ok(copied)
}

/// Deletes `path` and everything below it. Returns false if it didn't exist.
pub fn remove_tree(path: &Path) -> FsResult<bool> {
    let meta = match fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(source) => {
            return Err(FsError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let result = if meta.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };

    result.map_err(|source| FsError::Remove {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(true)
}

/// Lists every file below `root`, depth first, in directory read order.
///
/// Directories themselves are not listed. The order is not sorted and
/// differs between platforms.
pub fn list_files_recursive(root: &Path) -> FsResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(true) {
        let entry = entry.map_err(|e| walk_error(root, e))?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn walk_error(root: &Path, err: walkdir::Error) -> FsError {
    let path = err.path().unwrap_or(root).to_path_buf();
    let source = err
        .into_io_error()
        .unwrap_or_else(|| io::Error::new(io::ErrorKind::Other, "filesystem loop"));
    FsError::Read { path, source }
}

/// Reads a UTF-8 text file
pub fn read_text(path: &Path) -> FsResult<String> {
    fs::read_to_string(path).map_err(|source| FsError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes `content` to a temp file next to `path`, then renames it over `path`
pub fn write_atomic(path: &Path, content: &str) -> FsResult<()> {
    let write_err = |source| FsError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }

    let mut temp_name = path.file_name().unwrap_or_default().to_os_string();
    temp_name.push(".tmp");
    let temp_path = path.with_file_name(temp_name);

    {
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)
            .map_err(write_err)?;
        file.write_all(content.as_bytes()).map_err(write_err)?;
        file.flush().map_err(write_err)?;
    }

    fs::rename(&temp_path, path).map_err(write_err)
}

/// Returns `path` relative to `root` with `/` separators
pub fn relative_slash_path(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Content digest of a directory tree.
///
/// Hashes every file's relative path and bytes in sorted path order, so two
/// trees with identical contents produce the same digest regardless of the
/// order the filesystem lists them in.
pub fn tree_digest(root: &Path) -> FsResult<String> {
    let mut files: Vec<(String, PathBuf)> = list_files_recursive(root)?
        .into_iter()
        .map(|p| (relative_slash_path(root, &p), p))
        .collect();
    files.sort_by(|a, b| a.0.cmp(&b.0));

    let mut hasher = blake3::Hasher::new();
    for (rel, path) in files {
        let bytes = fs::read(&path).map_err(|source| FsError::Read {
            path: path.clone(),
            source,
        })?;
        hasher.update(rel.as_bytes());
        hasher.update(&[0]);
        hasher.update(&(bytes.len() as u64).to_le_bytes());
        hasher.update(&bytes);
    }

    Ok(hasher.finalize().to_hex().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn ensure_dir_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b");

        assert!(ensure_dir(&nested).unwrap());
        assert!(!ensure_dir(&nested).unwrap());
        assert!(nested.is_dir());
    }

    #[test]
    fn copy_file_creates_parents_and_overwrites() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("src.txt");
        let dest = dir.path().join("x").join("y").join("dest.txt");
        write(&src, "first");
        write(&dest, "old contents");

        copy_file(&src, &dest).unwrap();
        assert_eq!(fs::read_to_string(&dest).unwrap(), "first");
    }

    #[test]
    fn copy_file_missing_source_fails_with_path() {
        let dir = TempDir::new().unwrap();
        let err = copy_file(&dir.path().join("nope"), &dir.path().join("out")).unwrap_err();
        assert!(err.to_string().contains("nope"));
    }

    #[test]
    fn copy_tree_is_additive() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("src");
        let dest = dir.path().join("dest");
        write(&src.join("a.js"), "a");
        write(&src.join("nested").join("b.js"), "b");
        write(&dest.join("unrelated.js"), "keep");

        let copied = copy_tree(&src, &dest).unwrap();

        assert_eq!(copied.len(), 2);
        assert_eq!(fs::read_to_string(dest.join("a.js")).unwrap(), "a");
        assert_eq!(fs::read_to_string(dest.join("nested/b.js")).unwrap(), "b");
        assert_eq!(fs::read_to_string(dest.join("unrelated.js")).unwrap(), "keep");
    }

    #[test]
    fn copy_tree_recreates_empty_subdirectories() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("src");
        fs::create_dir_all(src.join("empty")).unwrap();
        write(&src.join("deep/er/c.js"), "c");

        let copied = copy_tree(&src, &dir.path().join("dest")).unwrap();

        assert_eq!(copied.len(), 1);
        assert!(dir.path().join("dest/empty").is_dir());
        assert_eq!(copied[0].1, dir.path().join("dest/deep/er/c.js"));
    }

    #[test]
    fn list_files_missing_root_fails_with_path() {
        let dir = TempDir::new().unwrap();
        let err = list_files_recursive(&dir.path().join("gone")).unwrap_err();

        assert!(matches!(err, FsError::Read { .. }));
        assert!(err.to_string().contains("gone"));
    }

    #[test]
    fn remove_tree_deletes_and_tolerates_missing() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("target");
        write(&target.join("deep").join("file.js"), "x");

        assert!(remove_tree(&target).unwrap());
        assert!(!target.exists());
        assert!(!remove_tree(&target).unwrap());
    }

    #[test]
    fn list_files_excludes_directories() {
        let dir = TempDir::new().unwrap();
        write(&dir.path().join("a.js"), "");
        write(&dir.path().join("routes").join("userRoutes.js"), "");
        fs::create_dir_all(dir.path().join("empty")).unwrap();

        let mut files: Vec<String> = list_files_recursive(dir.path())
            .unwrap()
            .iter()
            .map(|p| relative_slash_path(dir.path(), p))
            .collect();
        files.sort();

        assert_eq!(files, vec!["a.js", "routes/userRoutes.js"]);
    }

    #[test]
    fn write_atomic_replaces_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out").join("app.js");

        write_atomic(&path, "one").unwrap();
        write_atomic(&path, "two").unwrap();

        assert_eq!(read_text(&path).unwrap(), "two");
        assert!(!dir.path().join("out").join("app.js.tmp").exists());
    }

    #[test]
    fn tree_digest_tracks_content_not_listing_order() {
        let a = TempDir::new().unwrap();
        let b = TempDir::new().unwrap();
        write(&a.path().join("x/1.js"), "one");
        write(&a.path().join("y.js"), "two");
        write(&b.path().join("y.js"), "two");
        write(&b.path().join("x/1.js"), "one");

        assert_eq!(tree_digest(a.path()).unwrap(), tree_digest(b.path()).unwrap());

        write(&b.path().join("y.js"), "changed");
        assert_ne!(tree_digest(a.path()).unwrap(), tree_digest(b.path()).unwrap());
    }
}
