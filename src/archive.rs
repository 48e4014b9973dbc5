//! Plugin archive extraction.

use async_trait::async_trait;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use crate::core::MirrorError;
use crate::ui;

/// Unpacks an archive into a directory.
#[async_trait]
pub trait Archiver: Send + Sync {
    /// Extract `archive` into `dest`, creating it if needed. Returns the number
    /// of entries written.
    async fn extract(&self, archive: &Path, dest: &Path) -> Result<usize, MirrorError>;
}

/// [`Archiver`] for zip files.
///
/// Runs on the blocking pool. Entries whose path would land outside the
/// destination, directly or through a symlink, are rejected and fail the
/// whole extraction; so are symlinks pointing outside it. Unix permission
/// bits stored in the archive are restored.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZipArchiver;

#[async_trait]
impl Archiver for ZipArchiver {
    async fn extract(&self, archive: &Path, dest: &Path) -> Result<usize, MirrorError> {
        ui::command(&format!("unzip {} -d {}", archive.display(), dest.display()));
        let archive = archive.to_path_buf();
        let dest = dest.to_path_buf();
        let label = archive.display().to_string();

        let result = tokio::task::spawn_blocking(move || extract_zip(&archive, &dest))
            .await
            .map_err(|e| MirrorError::ExtractFailed {
                archive: label.clone(),
                reason: format!("extraction task failed: {e}"),
            })?;

        let count = result.map_err(|e| MirrorError::ExtractFailed {
            archive: label.clone(),
            reason: e.to_string(),
        })?;
        tracing::debug!(target: "archive", "Extracted {count} entries from {label}");
        Ok(count)
    }
}

fn extract_zip(archive_path: &Path, dest: &Path) -> io::Result<usize> {
    let file = fs::File::open(archive_path)?;
    let mut archive = zip::ZipArchive::new(file).map_err(io::Error::other)?;
    fs::create_dir_all(dest)?;
    let root = dest.canonicalize()?;

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index).map_err(io::Error::other)?;
        let relative: PathBuf = entry.enclosed_name().ok_or_else(|| {
            escapes(format!("entry escapes the destination: {}", entry.name()))
        })?;
        let out = dest.join(&relative);

        // Earlier symlink entries may redirect any ancestor of `out`.
        if let Some(parent) = out.parent() {
            ensure_within(&root, parent)?;
        }

        if entry.is_dir() {
            fs::create_dir_all(&out)?;
            continue;
        }
        if let Some(parent) = out.parent() {
            fs::create_dir_all(parent)?;
        }
        if out.symlink_metadata().is_ok_and(|m| !m.is_dir()) {
            fs::remove_file(&out)?;
        }

        #[cfg(unix)]
        if entry.is_symlink() {
            let mut target = String::new();
            io::Read::read_to_string(&mut entry, &mut target)?;
            if !link_stays_within(&relative, Path::new(&target)) {
                return Err(escapes(format!(
                    "symlink escapes the destination: {} -> {target}",
                    relative.display()
                )));
            }
            std::os::unix::fs::symlink(target, &out)?;
            continue;
        }

        let mut outfile = fs::File::create(&out)?;
        io::copy(&mut entry, &mut outfile)?;

        #[cfg(unix)]
        if let Some(mode) = entry.unix_mode() {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&out, fs::Permissions::from_mode(mode & 0o7777))?;
        }
    }

    Ok(archive.len())
}

fn escapes(message: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, message)
}

/// Fail when the deepest existing ancestor of `path` resolves outside `root`.
fn ensure_within(root: &Path, path: &Path) -> io::Result<()> {
    let existing = path.ancestors().find(|p| p.symlink_metadata().is_ok()).unwrap_or(path);
    let resolved = existing.canonicalize()?;
    if resolved.starts_with(root) {
        Ok(())
    } else {
        Err(escapes(format!("entry resolves outside the destination: {}", path.display())))
    }
}

/// Whether `target`, read relative to the directory of the link at `link`,
/// stays inside the extraction root. `link` is already enclosed.
fn link_stays_within(link: &Path, target: &Path) -> bool {
    let mut depth = link.parent().map_or(0, |p| p.components().count());
    for component in target.components() {
        match component {
            Component::Normal(_) => depth += 1,
            Component::CurDir => {}
            Component::ParentDir => match depth.checked_sub(1) {
                Some(up) => depth = up,
                None => return false,
            },
            Component::RootDir | Component::Prefix(_) => return false,
        }
    }
    true
}
