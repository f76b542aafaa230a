//! Working root resolution.
//!
//! Every filesystem tool resolves its path arguments against an explicit
//! root instead of the process working directory, so concurrent runs on
//! different roots never interfere. Absolute paths are used as given.

use agentdir_core::ToolErrorKind;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a tool path argument against the root.
    pub fn resolve(&self, path: &str) -> PathBuf {
        let p = Path::new(path);
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            self.root.join(p)
        }
    }

    /// Absolute form of the root, falling back to the configured path when
    /// it cannot be canonicalized.
    pub async fn absolute_root(&self) -> PathBuf {
        match tokio::fs::canonicalize(&self.root).await {
            Ok(p) => p,
            Err(_) if self.root.is_absolute() => self.root.clone(),
            Err(_) => std::env::current_dir()
                .map(|cwd| cwd.join(&self.root))
                .unwrap_or_else(|_| self.root.clone()),
        }
    }
}

/// Metadata of `path` without following a final symlink, `None` if absent.
pub(crate) async fn probe(path: &Path) -> Option<std::fs::Metadata> {
    tokio::fs::symlink_metadata(path).await.ok()
}

/// Map an I/O error onto the tool failure classification.
pub(crate) fn io_kind(err: &io::Error) -> ToolErrorKind {
    match err.kind() {
        io::ErrorKind::NotFound => ToolErrorKind::NotFound,
        io::ErrorKind::PermissionDenied => ToolErrorKind::PermissionDenied,
        io::ErrorKind::AlreadyExists => ToolErrorKind::AlreadyExists,
        _ => ToolErrorKind::Io,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_paths_join_the_root() {
        let ws = Workspace::new("/data/inbox");
        assert_eq!(ws.resolve("reports"), PathBuf::from("/data/inbox/reports"));
        assert_eq!(ws.resolve("."), PathBuf::from("/data/inbox/."));
    }

    #[cfg(unix)]
    #[test]
    fn absolute_paths_are_kept() {
        let ws = Workspace::new("/data/inbox");
        assert_eq!(ws.resolve("/tmp/x"), PathBuf::from("/tmp/x"));
    }

    #[tokio::test]
    async fn absolute_root_canonicalizes() {
        let dir = tempfile::tempdir().unwrap();
        let ws = Workspace::new(dir.path());
        let abs = ws.absolute_root().await;
        assert!(abs.is_absolute());
        assert_eq!(abs, dir.path().canonicalize().unwrap());
    }

    #[test]
    fn io_errors_are_classified() {
        let err = io::Error::from(io::ErrorKind::PermissionDenied);
        assert_eq!(io_kind(&err), ToolErrorKind::PermissionDenied);
        let err = io::Error::other("weird");
        assert_eq!(io_kind(&err), ToolErrorKind::Io);
    }
}
