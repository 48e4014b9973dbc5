//! Per-run scratch directory.
//!
//! A [`WorkingTree`] is created right before the first download and holds
//! everything a run writes outside the mirror repository:
//!
//! ```text
//! <tmp>/plugin-mirror-<uuid>/
//! ├── archives/<slug>-<version>.zip
//! └── plugins/<slug>/...
//! ```
//!
//! The pipeline removes it explicitly with [`WorkingTree::cleanup`] so a
//! failure can be reported; dropping the value removes it as well, so an early
//! return or a panic never leaves it behind.

use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::{ARCHIVES_DIR, PLUGINS_DIR, WORKING_TREE_PREFIX};
use crate::core::MirrorError;

/// Uniquely named temporary directory with `archives/` and `plugins/`.
#[derive(Debug)]
pub struct WorkingTree {
    root: PathBuf,
    removed: bool,
}

impl WorkingTree {
    /// Create a working tree under the system temporary directory.
    pub fn create() -> Result<Self, MirrorError> {
        Self::create_in(&std::env::temp_dir())
    }

    /// Create a working tree under `parent`.
    pub fn create_in(parent: &Path) -> Result<Self, MirrorError> {
        let root = parent.join(format!("{WORKING_TREE_PREFIX}-{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&root)?;
        let tree = Self {
            root,
            removed: false,
        };
        fs::create_dir(tree.archives_dir())?;
        fs::create_dir(tree.plugins_dir())?;
        tracing::debug!(target: "workspace", "Created working tree {}", tree.root.display());
        Ok(tree)
    }

    /// Root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory downloaded archives are written to.
    #[must_use]
    pub fn archives_dir(&self) -> PathBuf {
        self.root.join(ARCHIVES_DIR)
    }

    /// Directory archives are extracted into.
    #[must_use]
    pub fn plugins_dir(&self) -> PathBuf {
        self.root.join(PLUGINS_DIR)
    }

    /// `archives/<slug>-<version>.zip`
    #[must_use]
    pub fn archive_path(&self, slug: &str, version: &str) -> PathBuf {
        self.archives_dir().join(format!("{slug}-{version}.zip"))
    }

    /// `plugins/<slug>`
    #[must_use]
    pub fn plugin_dir(&self, slug: &str) -> PathBuf {
        self.plugins_dir().join(slug)
    }

    /// Remove the tree and everything in it.
    ///
    /// # Errors
    ///
    /// [`MirrorError::CleanupFailed`] when the directory cannot be removed.
    pub fn cleanup(mut self) -> Result<(), MirrorError> {
        self.removed = true;
        crate::ui::command(&format!("rm -f -R {}", self.root.display()));
        match fs::remove_dir_all(&self.root) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(MirrorError::CleanupFailed {
                path: self.root.display().to_string(),
                reason: e.to_string(),
            }),
        }
    }
}

impl Drop for WorkingTree {
    fn drop(&mut self) {
        if !self.removed {
            let _ = fs::remove_dir_all(&self.root);
        }
    }
}
