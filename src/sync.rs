//! One-way directory synchronization into the mirror repository.
//!
//! After a sync the destination holds exactly the source tree, except for
//! entries whose name is in the exclude list. Those are never copied, never
//! deleted, and never descended into, at any depth; the default list protects
//! the repository's `.git` directory and its `.github` workflows.
//!
//! Deletion runs before copying, so a file that turned into a directory (or
//! the other way round) is removed first and recreated with its new type.
//! Regular files keep their permission bits and modification time, and a file
//! whose size and modification time already match is left untouched.

use async_trait::async_trait;
use filetime::FileTime;
use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use crate::constants::MANIFEST_FILE_NAME;
use crate::core::MirrorError;
use crate::ui;

/// What a sync changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Files and links written.
    pub copied: usize,
    /// Destination entries removed.
    pub deleted: usize,
    /// Files already up to date.
    pub unchanged: usize,
}

/// Mirrors one directory into another.
#[async_trait]
pub trait Synchronizer: Send + Sync {
    /// Make `dest` match `source`, leaving entries named in `excludes` alone.
    async fn sync(
        &self,
        source: &Path,
        dest: &Path,
        excludes: &[String],
    ) -> Result<SyncReport, MirrorError>;
}

/// Verify that `source` is a staged plugin directory: it exists and carries
/// the generated manifest.
///
/// # Errors
///
/// [`MirrorError::SyncSourceInvalid`] otherwise.
pub fn check_source(source: &Path) -> Result<(), MirrorError> {
    if source.is_dir() && source.join(MANIFEST_FILE_NAME).is_file() {
        Ok(())
    } else {
        Err(MirrorError::SyncSourceInvalid {
            path: source.display().to_string(),
        })
    }
}

/// [`Synchronizer`] over the local filesystem, run on the blocking pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirSynchronizer;

#[async_trait]
impl Synchronizer for DirSynchronizer {
    async fn sync(
        &self,
        source: &Path,
        dest: &Path,
        excludes: &[String],
    ) -> Result<SyncReport, MirrorError> {
        let exclude_flags: String = excludes.iter().map(|e| format!(" --exclude={e}")).collect();
        ui::command(&format!(
            "sync --delete-before{exclude_flags} {}/ {}",
            source.display(),
            dest.display()
        ));

        let failed = |reason: String| MirrorError::SyncFailed {
            staged: source.display().to_string(),
            destination: dest.display().to_string(),
            reason,
        };

        let job = SyncJob {
            source: source.to_path_buf(),
            dest: dest.to_path_buf(),
            excludes: excludes.to_vec(),
        };
        let report = tokio::task::spawn_blocking(move || job.run())
            .await
            .map_err(|e| failed(format!("sync task failed: {e}")))?
            .map_err(|e| failed(e.to_string()))?;

        tracing::info!(
            target: "sync",
            "Synchronized: {} copied, {} deleted, {} unchanged",
            report.copied,
            report.deleted,
            report.unchanged
        );
        Ok(report)
    }
}

struct SyncJob {
    source: PathBuf,
    dest: PathBuf,
    excludes: Vec<String>,
}

impl SyncJob {
    fn run(&self) -> io::Result<SyncReport> {
        let mut report = SyncReport::default();
        fs::create_dir_all(&self.dest)?;
        self.delete_extraneous(&mut report)?;
        self.copy_all(&mut report)?;
        Ok(report)
    }

    fn included(&self, entry: &DirEntry) -> bool {
        entry.depth() == 0 || !self.excludes.iter().any(|x| entry.file_name() == OsStr::new(x))
    }

    fn delete_extraneous(&self, report: &mut SyncReport) -> io::Result<()> {
        let mut walker =
            WalkDir::new(&self.dest).min_depth(1).into_iter().filter_entry(|e| self.included(e));

        while let Some(entry) = walker.next() {
            let entry = entry?;
            let relative = relative_to(entry.path(), &self.dest)?;
            let counterpart = self.source.join(relative);
            let keep = match fs::symlink_metadata(&counterpart) {
                Ok(meta) => same_kind(meta.file_type(), entry.file_type()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => false,
                Err(e) => return Err(e),
            };
            if keep {
                continue;
            }

            tracing::debug!(target: "sync", "deleting {}", relative.display());
            if entry.file_type().is_dir() {
                fs::remove_dir_all(entry.path())?;
                walker.skip_current_dir();
            } else {
                fs::remove_file(entry.path())?;
            }
            report.deleted += 1;
        }
        Ok(())
    }

    fn copy_all(&self, report: &mut SyncReport) -> io::Result<()> {
        let walker =
            WalkDir::new(&self.source).min_depth(1).into_iter().filter_entry(|e| self.included(e));

        for entry in walker {
            let entry = entry?;
            let relative = relative_to(entry.path(), &self.source)?;
            let target = self.dest.join(relative);
            let file_type = entry.file_type();

            if file_type.is_dir() {
                fs::create_dir_all(&target)?;
                fs::set_permissions(&target, entry.metadata()?.permissions())?;
                continue;
            }

            #[cfg(unix)]
            if file_type.is_symlink() {
                let link = fs::read_link(entry.path())?;
                if fs::read_link(&target).is_ok_and(|existing| existing == link) {
                    report.unchanged += 1;
                    continue;
                }
                remove_if_present(&target)?;
                std::os::unix::fs::symlink(&link, &target)?;
                tracing::debug!(target: "sync", "{} -> {}", relative.display(), link.display());
                report.copied += 1;
                continue;
            }

            let meta = fs::metadata(entry.path())?;
            if is_up_to_date(&target, &meta) {
                report.unchanged += 1;
                continue;
            }
            // A read-only target cannot be opened for writing, so replace it.
            remove_if_present(&target)?;
            fs::copy(entry.path(), &target)?;
            filetime::set_file_mtime(&target, FileTime::from_last_modification_time(&meta))?;
            tracing::debug!(target: "sync", "{}", relative.display());
            report.copied += 1;
        }
        Ok(())
    }
}

fn relative_to<'p>(path: &'p Path, base: &Path) -> io::Result<&'p Path> {
    path.strip_prefix(base).map_err(io::Error::other)
}

fn same_kind(a: fs::FileType, b: fs::FileType) -> bool {
    a.is_dir() == b.is_dir() && a.is_symlink() == b.is_symlink()
}

fn is_up_to_date(target: &Path, source: &fs::Metadata) -> bool {
    let Ok(existing) = fs::symlink_metadata(target) else {
        return false;
    };
    existing.is_file()
        && existing.len() == source.len()
        && matches!((existing.modified(), source.modified()), (Ok(a), Ok(b)) if a == b)
}

fn remove_if_present(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}
