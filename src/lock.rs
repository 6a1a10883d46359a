//! Exclusive lock on a build directory.

use anyhow::{Context, Result};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

pub const LOCK_FILENAME: &str = ".yocto-release.lock";

/// RAII guard: the lock is released when the file handle is dropped.
#[derive(Debug)]
pub struct BuildDirLock {
    file: File,
    path: PathBuf,
}

impl BuildDirLock {
    /// Try to take the lock for `build_dir` without blocking.
    pub fn acquire(build_dir: &Path) -> Result<Self> {
        let path = build_dir.join(LOCK_FILENAME);

        // The lock file is never unlinked. Removing a file another process
        // still holds would let a third process lock a fresh inode at the
        // same path.
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .with_context(|| format!("Failed to create lock file: {}", path.display()))?;

        if file.try_lock_exclusive().is_err() {
            drop(file);
            anyhow::bail!(
                "Build directory is locked by another release run: {}",
                path.display()
            );
        }

        Ok(Self { file, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for BuildDirLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}
