//! Pipeline stage identifiers.

use std::fmt;

/// One step of a mirroring run.
///
/// Stages run strictly in declaration order. A [`StageError`](super::StageError)
/// records the first stage that failed so the top-level runner can report it
/// and map it to an exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Loading and validating the required run-time inputs.
    Inputs,
    /// Querying the vendor update-check API.
    UpdateCheck,
    /// Asking the release host whether the tag is already published.
    ReleaseLookup,
    /// Creating the per-run working tree.
    Prepare,
    /// Downloading the plugin archive.
    Download,
    /// Extracting the plugin archive.
    Extract,
    /// Writing the generated package manifest.
    Manifest,
    /// Synchronizing the staged plugin into the mirror repository.
    Sync,
    /// Committing and pushing the mirror repository.
    VersionControl,
    /// Creating the tagged release.
    Release,
    /// Removing the working tree.
    Cleanup,
}

impl Stage {
    /// Heading printed when the stage starts.
    pub const fn heading(self) -> &'static str {
        match self {
            Self::Inputs => "Read inputs",
            Self::UpdateCheck => "Check WooCommerce.com",
            Self::ReleaseLookup => "Look up release",
            Self::Prepare => "Prepare working tree",
            Self::Download => "Download plugin",
            Self::Extract => "Unzip plugin",
            Self::Manifest => "Generate composer.json",
            Self::Sync => "Synchronize plugin",
            Self::VersionControl => "Version control",
            Self::Release => "GitHub release",
            Self::Cleanup => "Clean up",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Inputs => "inputs",
            Self::UpdateCheck => "update check",
            Self::ReleaseLookup => "release lookup",
            Self::Prepare => "prepare",
            Self::Download => "download",
            Self::Extract => "extract",
            Self::Manifest => "manifest",
            Self::Sync => "sync",
            Self::VersionControl => "version control",
            Self::Release => "release",
            Self::Cleanup => "cleanup",
        };
        f.write_str(name)
    }
}
