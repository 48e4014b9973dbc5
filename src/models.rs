//! Domain values carried through a mirroring run.
//!
//! Everything here is created once at the start of a run (or once by the
//! update oracle) and read-only afterwards.

use std::fmt;
use std::path::{Component, Path};

use crate::core::MirrorError;

/// Vendor API credentials.
///
/// Used only to sign and authenticate the update-check request. The `Debug`
/// implementation never prints either value.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    access_token: String,
    access_token_secret: String,
}

impl Credentials {
    /// Pair an access token with its signing secret.
    pub fn new(access_token: impl Into<String>, access_token_secret: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            access_token_secret: access_token_secret.into(),
        }
    }

    /// Bearer token sent with requests.
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// HMAC key for request signatures.
    pub fn access_token_secret(&self) -> &str {
        &self.access_token_secret
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_token", &"<redacted>")
            .field("access_token_secret", &"<redacted>")
            .finish()
    }
}

/// The product being mirrored.
///
/// `slug` is the directory containing the plugin's main file, e.g.
/// `woocommerce-subscriptions/woocommerce-subscriptions.php` has slug
/// `woocommerce-subscriptions`. It names the extracted plugin directory, the
/// archive file, and the generated package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductReference {
    product_id: String,
    plugin_basename: String,
    slug: String,
}

impl ProductReference {
    /// Build a reference from the vendor product id and the plugin basename.
    ///
    /// # Errors
    ///
    /// [`MirrorError::InvalidInput`] when the basename has no single parent
    /// directory to derive the slug from.
    pub fn new(
        product_id: impl Into<String>,
        plugin_basename: impl Into<String>,
    ) -> Result<Self, MirrorError> {
        let plugin_basename = plugin_basename.into();
        let slug = slug_from_basename(&plugin_basename).ok_or_else(|| {
            MirrorError::InvalidInput {
                name: "plugin-basename".to_string(),
                reason: format!("cannot derive a plugin slug from '{plugin_basename}'"),
            }
        })?;

        Ok(Self {
            product_id: product_id.into(),
            plugin_basename,
            slug,
        })
    }

    /// Vendor product identifier.
    pub fn product_id(&self) -> &str {
        &self.product_id
    }

    /// Plugin main file relative to the plugins directory.
    pub fn plugin_basename(&self) -> &str {
        &self.plugin_basename
    }

    /// Plugin directory name.
    pub fn slug(&self) -> &str {
        &self.slug
    }
}

fn slug_from_basename(basename: &str) -> Option<String> {
    let parent = Path::new(basename).parent()?;
    let mut components = parent.components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(name)), None) => name.to_str().map(str::to_string),
        _ => None,
    }
}

/// Latest available artifact for a product, as reported by the update oracle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateRecord {
    /// Version string, non-empty, used as the release tag suffix.
    pub version: String,
    /// Absolute URL of the plugin archive.
    pub package_url: String,
}

impl UpdateRecord {
    /// Tag the release of this version is published under.
    pub fn release_tag(&self) -> ReleaseTag {
        ReleaseTag::for_version(&self.version)
    }
}

/// Release identifier, `v<version>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReleaseTag(String);

impl ReleaseTag {
    /// Tag for `version`.
    pub fn for_version(version: &str) -> Self {
        Self(format!("v{version}"))
    }

    /// The tag text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReleaseTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
