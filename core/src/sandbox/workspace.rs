use std::path::{Path, PathBuf};

use rand::Rng;

/// The process-wide directory that every [`Workspace`] lives under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScratchRoot {
    dir: PathBuf,
}

impl ScratchRoot {
    /// Creates the directory if it does not exist yet. Idempotent.
    pub fn ensure(dir: impl Into<PathBuf>) -> fsutil::Result<Self> {
        let dir = dir.into();
        fsutil::mkdir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }
}

/// An ephemeral directory owned by exactly one evaluation.
///
/// Removed by [`Workspace::release`], or on drop if `release` was never reached.
#[derive(Debug)]
pub struct Workspace {
    dir: PathBuf,
    released: bool,
}

impl Workspace {
    pub fn acquire(root: &ScratchRoot) -> fsutil::Result<Self> {
        let id = format!("{:032x}", rand::thread_rng().gen::<u128>());
        let dir = root.path().join(id);
        fsutil::mkdir_new(&dir)?;
        log::debug!("Acquired workspace {:?}", dir);
        Ok(Self {
            dir,
            released: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }

    /// Removes the directory recursively. Failures are logged, never returned.
    pub fn release(mut self) {
        self.remove();
    }

    fn remove(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        match fsutil::remove_dir_all(&self.dir) {
            Ok(()) => log::debug!("Released workspace {:?}", self.dir),
            Err(e) => log::warn!("Failed to clean up workspace: {}", e),
        }
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        self.remove();
    }
}
