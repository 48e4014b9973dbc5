//! Artifact staging: download, extract, and generate the manifest.

use std::path::PathBuf;

use crate::archive::Archiver;
use crate::composer::PackageManifest;
use crate::core::{MirrorError, Stage, StageError, StageResultExt};
use crate::fetch::Fetcher;
use crate::models::{ProductReference, UpdateRecord};
use crate::ui;
use crate::workspace::WorkingTree;

/// A plugin ready to be synchronized into the mirror repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedPlugin {
    /// Downloaded archive, attached to the release later.
    pub archive: PathBuf,
    /// Extracted plugin directory.
    pub plugin_dir: PathBuf,
    /// Generated manifest inside `plugin_dir`.
    pub manifest: PathBuf,
}

/// Turns an [`UpdateRecord`] into a [`StagedPlugin`] inside a [`WorkingTree`].
pub struct ArtifactStager<'a> {
    fetcher: &'a dyn Fetcher,
    archiver: &'a dyn Archiver,
}

impl<'a> ArtifactStager<'a> {
    /// Stager using the given capabilities.
    pub fn new(fetcher: &'a dyn Fetcher, archiver: &'a dyn Archiver) -> Self {
        Self {
            fetcher,
            archiver,
        }
    }

    /// Download the archive to `archives/<slug>-<version>.zip`, extract it into
    /// `plugins/`, check that `plugins/<slug>` appeared, and write the manifest.
    ///
    /// # Errors
    ///
    /// A [`StageError`] tagged [`Stage::Download`], [`Stage::Extract`], or
    /// [`Stage::Manifest`].
    pub async fn stage(
        &self,
        tree: &WorkingTree,
        product: &ProductReference,
        record: &UpdateRecord,
        namespace: &str,
    ) -> Result<StagedPlugin, StageError> {
        let slug = product.slug();
        let archive = tree.archive_path(slug, &record.version);
        let plugin_dir = tree.plugin_dir(slug);

        {
            let _group = ui::group(Stage::Download.heading());
            let bytes =
                self.fetcher.download(&record.package_url, &archive).await.in_stage(Stage::Download)?;
            tracing::info!(target: "stager", "Downloaded {} ({bytes} bytes)", archive.display());
        }

        {
            let _group = ui::group(Stage::Extract.heading());
            self.archiver.extract(&archive, &tree.plugins_dir()).await.in_stage(Stage::Extract)?;
            if !plugin_dir.is_dir() {
                return Err(StageError::new(
                    Stage::Extract,
                    MirrorError::PluginDirMissing {
                        path: plugin_dir.display().to_string(),
                    },
                ));
            }
        }

        let manifest = {
            let _group = ui::group(Stage::Manifest.heading());
            PackageManifest::new(namespace, slug, &record.version)
                .write_to(&plugin_dir)
                .await
                .in_stage(Stage::Manifest)?
        };

        Ok(StagedPlugin {
            archive,
            plugin_dir,
            manifest,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::ZipArchiver;
    use crate::test_utils::{CallLog, FakeFetcher, plugin_zip};
    use tempfile::TempDir;

    fn record() -> UpdateRecord {
        UpdateRecord {
            version: "2.0.0".to_string(),
            package_url: "https://example.com/pkg.zip".to_string(),
        }
    }

    #[tokio::test]
    async fn test_stages_plugin_with_manifest() {
        let parent = TempDir::new().unwrap();
        let tree = WorkingTree::create_in(parent.path()).unwrap();
        let log = CallLog::default();
        let fetcher = FakeFetcher::new(log.clone(), plugin_zip("foo", &[("foo.php", "<?php\n")]));
        let product = ProductReference::new("18734", "foo/foo.php").unwrap();

        let staged = ArtifactStager::new(&fetcher, &ZipArchiver)
            .stage(&tree, &product, &record(), "woocommerce")
            .await
            .unwrap();

        assert_eq!(staged.archive, tree.root().join("archives/foo-2.0.0.zip"));
        assert_eq!(staged.plugin_dir, tree.root().join("plugins/foo"));
        assert!(staged.plugin_dir.join("foo.php").is_file());
        let manifest = std::fs::read_to_string(&staged.manifest).unwrap();
        assert!(manifest.contains("\"name\": \"woocommerce/foo\""));
        assert_eq!(log.calls(), vec!["download https://example.com/pkg.zip"]);
    }

    #[tokio::test]
    async fn test_missing_plugin_directory_is_reported() {
        let parent = TempDir::new().unwrap();
        let tree = WorkingTree::create_in(parent.path()).unwrap();
        let fetcher =
            FakeFetcher::new(CallLog::default(), plugin_zip("other", &[("other.php", "<?php\n")]));
        let product = ProductReference::new("18734", "foo/foo.php").unwrap();

        let err = ArtifactStager::new(&fetcher, &ZipArchiver)
            .stage(&tree, &product, &record(), "woocommerce")
            .await
            .unwrap_err();

        assert_eq!(err.stage, Stage::Extract);
        assert!(matches!(err.error, MirrorError::PluginDirMissing { .. }));
    }
}
