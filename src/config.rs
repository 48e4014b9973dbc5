//! Run-time inputs and the context a run carries.
//!
//! Inputs arrive as optional strings (from flags or the CI runner's `INPUT_*`
//! variables) and are validated once, up front, into a [`MirrorContext`].
//! Nothing after this point reads the environment.

use std::path::PathBuf;

use crate::constants::{
    COMMITTER_EMAIL, COMMITTER_NAME, DEFAULT_BRANCH, DEFAULT_REMOTE, PACKAGE_NAMESPACE,
    SYNC_EXCLUDES, UPDATE_CHECK_URL,
};
use crate::core::MirrorError;
use crate::models::{Credentials, ProductReference};

/// Raw inputs of a run. Required values are optional here so that a missing
/// one can be reported by name.
#[derive(Debug, Clone, Default)]
pub struct RunInputs {
    /// Vendor API access token.
    pub access_token: Option<String>,
    /// Vendor API access token secret.
    pub access_token_secret: Option<String>,
    /// Vendor product id.
    pub product_id: Option<String>,
    /// Plugin main file relative to the plugins directory.
    pub plugin_basename: Option<String>,
    /// Non-required settings.
    pub settings: MirrorSettings,
}

impl RunInputs {
    /// Validate the inputs.
    ///
    /// Required inputs are checked in a fixed order (access token, secret,
    /// product id, plugin basename); an absent or empty value fails with
    /// [`MirrorError::MissingInput`] naming the first one missing.
    ///
    /// # Errors
    ///
    /// [`MirrorError::MissingInput`], or [`MirrorError::InvalidInput`] when the
    /// plugin basename has no slug.
    pub fn into_context(self) -> Result<MirrorContext, MirrorError> {
        let access_token = required("woo-access-token", self.access_token)?;
        let access_token_secret = required("woo-access-token-secret", self.access_token_secret)?;
        let product_id = required("woo-product-id", self.product_id)?;
        let plugin_basename = required("plugin-basename", self.plugin_basename)?;

        Ok(MirrorContext {
            credentials: Credentials::new(access_token, access_token_secret),
            product: ProductReference::new(product_id, plugin_basename)?,
            settings: self.settings,
        })
    }
}

fn required(name: &str, value: Option<String>) -> Result<String, MirrorError> {
    value.filter(|v| !v.is_empty()).ok_or_else(|| MirrorError::MissingInput {
        name: name.to_string(),
    })
}

/// Committer identity configured before committing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Committer {
    /// `user.name`
    pub name: String,
    /// `user.email`
    pub email: String,
}

impl Default for Committer {
    fn default() -> Self {
        Self {
            name: COMMITTER_NAME.to_string(),
            email: COMMITTER_EMAIL.to_string(),
        }
    }
}

/// Settings with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorSettings {
    /// Update-check endpoint.
    pub update_check_url: String,
    /// Composer vendor namespace of the generated package.
    pub namespace: String,
    /// Mirror repository checkout.
    pub repo_dir: PathBuf,
    /// Remote pushed to.
    pub remote: String,
    /// Branch pushed.
    pub branch: String,
    /// Commit identity.
    pub committer: Committer,
    /// Release notes.
    pub release_notes: String,
    /// Entry names the sync leaves alone.
    pub sync_excludes: Vec<String>,
}

impl Default for MirrorSettings {
    fn default() -> Self {
        Self {
            update_check_url: UPDATE_CHECK_URL.to_string(),
            namespace: PACKAGE_NAMESPACE.to_string(),
            repo_dir: PathBuf::from("."),
            remote: DEFAULT_REMOTE.to_string(),
            branch: DEFAULT_BRANCH.to_string(),
            committer: Committer::default(),
            release_notes: String::new(),
            sync_excludes: SYNC_EXCLUDES.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Everything a run needs, validated.
#[derive(Debug, Clone)]
pub struct MirrorContext {
    /// Vendor API credentials.
    pub credentials: Credentials,
    /// Product being mirrored.
    pub product: ProductReference,
    /// Settings.
    pub settings: MirrorSettings,
}
