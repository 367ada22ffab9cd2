//! Working-directory ownership and idempotent cleanup.

use std::path::{Path, PathBuf};

use tracing::debug;

/// Best-effort recursive removal of a temp directory.
///
/// Swallows every error (already removed, permissions, open handles on
/// Windows): cleanup runs on every exit path, including failure paths, and
/// must never escalate. Calling it repeatedly on the same path is fine.
pub fn cleanup_dir(path: &Path) {
    match std::fs::remove_dir_all(path) {
        Ok(()) => debug!(dir = %path.display(), "removed working directory"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => debug!(dir = %path.display(), error = %e, "cleanup failed, ignoring"),
    }
}

/// Owned working directory for a split batch.
///
/// Created under the system temp dir; removed when the guard is dropped or
/// [`WorkDir::cleanup`] is called, whichever comes first. The guard makes
/// removal fire on every exit path of the caller, including early returns
/// and panics mid-batch.
#[derive(Debug)]
pub struct WorkDir {
    /// Present until cleanup; its own Drop is a second line of defense.
    dir: Option<tempfile::TempDir>,
    path: PathBuf,
}

impl WorkDir {
    pub(crate) fn create() -> std::io::Result<Self> {
        let dir = tempfile::Builder::new().prefix("cleaver-split-").tempdir()?;
        let path = dir.path().to_path_buf();
        Ok(Self {
            dir: Some(dir),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the directory now. Idempotent; errors are swallowed.
    pub fn cleanup(&mut self) {
        if let Some(dir) = self.dir.take() {
            // TempDir::close reports errors; we only want best-effort.
            let _ = dir.close();
        }
        cleanup_dir(&self.path);
    }
}

impl Drop for WorkDir {
    fn drop(&mut self) {
        self.cleanup();
    }
}
