//! Per-request scratch directories.
//!
//! A `Workspace` is a uniquely named directory under the configured root
//! (a tmpfs such as `/dev/shm` by default). It is deleted when released or
//! dropped, so every exit path of a comparison cleans up after itself,
//! including unwinding out of a panicking backend.

use std::path::{Component, Path, PathBuf};

use crate::error::{Result, StudioError};

const PREFIX: &str = "asm-studio-";

#[derive(Debug)]
pub struct Workspace {
    dir: tempfile::TempDir,
}

impl Workspace {
    /// Create a fresh, empty workspace under `root`.
    pub fn acquire(root: &Path) -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix(PREFIX)
            .tempdir_in(root)
            .map_err(StudioError::Workspace)?;
        log::debug!("acquired workspace {}", dir.path().display());
        Ok(Workspace { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Path of a file named `name` inside the workspace. Does not create it.
    pub fn file(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Write `contents` to `path`, which must lie inside the workspace.
    pub fn write(&self, path: &Path, contents: &str) -> Result<()> {
        let escapes = path.components().any(|c| c == Component::ParentDir);
        if escapes || !path.starts_with(self.dir.path()) {
            return Err(StudioError::Io {
                path: path.to_path_buf(),
                source: std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    "path escapes the workspace",
                ),
            });
        }
        std::fs::write(path, contents).map_err(|source| StudioError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Delete the workspace and everything in it, reporting failures.
    /// Dropping a workspace does the same but swallows the error.
    pub fn release(self) -> Result<()> {
        let path = self.dir.path().to_path_buf();
        self.dir.close().map_err(StudioError::Workspace)?;
        log::debug!("released workspace {}", path.display());
        Ok(())
    }
}
