//! Filesystem access used by the walker.
use std::io;
use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;

/// Bytes and metadata of one file.
#[derive(Debug, Clone, Default)]
pub struct FileContents {
    /// Raw file content.
    pub bytes: Vec<u8>,
    /// Last modification time, if the platform reports one.
    pub modified: Option<SystemTime>,
}

/// Read access to configuration files.
///
/// [`DiskSource`] is the real implementation; tests substitute doubles to
/// simulate conditions that are hard to produce on disk, such as permission
/// errors when running as root.
#[cfg_attr(test, mockall::automock)]
pub trait FileSource {
    /// Resolve symlinks and relative segments. Fails with
    /// [`io::ErrorKind::NotFound`] when no file exists.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error.
    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf>;

    /// Read the whole file.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error.
    fn read(&self, path: &Path) -> io::Result<FileContents>;
}

/// [`FileSource`] backed by the local filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiskSource;

impl FileSource for DiskSource {
    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        dunce::canonicalize(path)
    }

    fn read(&self, path: &Path) -> io::Result<FileContents> {
        let bytes = std::fs::read(path)?;
        let modified = std::fs::metadata(path).and_then(|m| m.modified()).ok();
        Ok(FileContents { bytes, modified })
    }
}

/// Make `path` absolute and fold `.` and `..` segments without touching the
/// filesystem. Used as the identity of paths that do not exist.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use confgraph::graph::normalize_lexically;
///
/// # #[cfg(unix)]
/// assert_eq!(
///     normalize_lexically(Path::new("/etc/nixos/./hosts/../missing.nix")),
///     Path::new("/etc/nixos/missing.nix"),
/// );
/// ```
#[must_use]
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let mut out = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
