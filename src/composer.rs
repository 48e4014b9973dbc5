//! Generated `composer.json` for the mirrored plugin.
//!
//! The manifest makes the mirror repository installable as a Composer package
//! named `<namespace>/<slug>`, installed by `composer/installers` into a
//! directory named after the slug.

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::constants::{
    INSTALLERS_CONSTRAINT, INSTALLERS_PACKAGE, MANIFEST_FILE_NAME, MINIMUM_STABILITY, PACKAGE_TYPE,
};
use crate::core::MirrorError;
use crate::json::{self, EncodeOptions};

/// Composer package manifest. Field order is the serialized order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageManifest {
    /// `<namespace>/<slug>`
    pub name: String,
    /// Plugin version as reported by the update check.
    pub version: String,
    /// Always `wordpress-plugin`.
    #[serde(rename = "type")]
    pub package_type: String,
    /// Always `stable`.
    #[serde(rename = "minimum-stability")]
    pub minimum_stability: String,
    /// Package requirements.
    pub require: BTreeMap<String, String>,
    /// Installer settings.
    pub extra: ManifestExtra,
}

/// `extra` section of [`PackageManifest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestExtra {
    /// Directory name the installer uses.
    #[serde(rename = "installer-name")]
    pub installer_name: String,
}

impl PackageManifest {
    /// Manifest for plugin `slug` at `version`.
    pub fn new(namespace: &str, slug: &str, version: &str) -> Self {
        Self {
            name: format!("{namespace}/{slug}"),
            version: version.to_string(),
            package_type: PACKAGE_TYPE.to_string(),
            minimum_stability: MINIMUM_STABILITY.to_string(),
            require: BTreeMap::from([(
                INSTALLERS_PACKAGE.to_string(),
                INSTALLERS_CONSTRAINT.to_string(),
            )]),
            extra: ManifestExtra {
                installer_name: slug.to_string(),
            },
        }
    }

    /// Four-space pretty JSON with slashes unescaped and no trailing newline.
    pub fn to_json(&self) -> Result<String, MirrorError> {
        Ok(json::encode(self, EncodeOptions::MANIFEST)?)
    }

    /// Write `composer.json` into `plugin_dir`, replacing any shipped one.
    pub async fn write_to(&self, plugin_dir: &Path) -> Result<PathBuf, MirrorError> {
        let path = plugin_dir.join(MANIFEST_FILE_NAME);
        tokio::fs::write(&path, self.to_json()?).await?;
        tracing::debug!(target: "composer", "Wrote {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const FOO_MANIFEST: &str = r#"{
    "name": "woocommerce/foo",
    "version": "1.2.3",
    "type": "wordpress-plugin",
    "minimum-stability": "stable",
    "require": {
        "composer/installers": "~1.0 || ~2.0"
    },
    "extra": {
        "installer-name": "foo"
    }
}"#;

    #[test]
    fn test_manifest_for_slug_and_version() {
        let manifest = PackageManifest::new("woocommerce", "foo", "1.2.3");
        assert_eq!(manifest.to_json().unwrap(), FOO_MANIFEST);
    }

    #[test]
    fn test_namespace_is_configurable() {
        let manifest = PackageManifest::new("acme", "bar", "2.0.0");
        assert_eq!(manifest.name, "acme/bar");
        assert_eq!(manifest.extra.installer_name, "bar");
    }

    #[tokio::test]
    async fn test_write_replaces_existing_manifest() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("composer.json"), "{\"name\": \"vendor/original\"}").unwrap();

        let path = PackageManifest::new("woocommerce", "foo", "1.2.3")
            .write_to(dir.path())
            .await
            .unwrap();

        assert_eq!(path, dir.path().join("composer.json"));
        assert_eq!(std::fs::read_to_string(path).unwrap(), FOO_MANIFEST);
    }
}
