//! Global constants used throughout the mirroring pipeline.
//!
//! Endpoint, identity, and layout values that the vendor API, the mirror
//! repository, and the generated manifest all agree on. Keeping them here
//! lets the CLI expose overrides without scattering literals.

/// Vendor update-check endpoint queried for the latest plugin version.
pub const UPDATE_CHECK_URL: &str = "https://woocommerce.com/wp-json/helper/1.0/update-check";

/// Header carrying the hex HMAC signature of the update-check request.
pub const SIGNATURE_HEADER: &str = "X-Woo-Signature";

/// Composer vendor namespace of generated package names (`<namespace>/<slug>`).
pub const PACKAGE_NAMESPACE: &str = "woocommerce";

/// Composer package type of every mirrored plugin.
pub const PACKAGE_TYPE: &str = "wordpress-plugin";

/// Composer `minimum-stability` of generated manifests.
pub const MINIMUM_STABILITY: &str = "stable";

/// Installer package required by generated manifests.
pub const INSTALLERS_PACKAGE: &str = "composer/installers";

/// Version constraint pinned for [`INSTALLERS_PACKAGE`].
pub const INSTALLERS_CONSTRAINT: &str = "~1.0 || ~2.0";

/// File name of the generated manifest inside the staged plugin directory.
pub const MANIFEST_FILE_NAME: &str = "composer.json";

/// Committer name configured before committing in unattended runs.
pub const COMMITTER_NAME: &str = "Woo";

/// Committer email configured before committing in unattended runs.
pub const COMMITTER_EMAIL: &str = "info@woo.com";

/// Remote pushed to after committing.
pub const DEFAULT_REMOTE: &str = "origin";

/// Branch pushed to after committing.
pub const DEFAULT_BRANCH: &str = "main";

/// Entry names the synchronizer never deletes or overwrites, at any depth.
pub const SYNC_EXCLUDES: &[&str] = &[".git", ".github"];

/// Prefix of the per-run working tree directory name.
pub const WORKING_TREE_PREFIX: &str = "plugin-mirror";

/// Working tree subdirectory holding downloaded archives.
pub const ARCHIVES_DIR: &str = "archives";

/// Working tree subdirectory holding extracted plugin trees.
pub const PLUGINS_DIR: &str = "plugins";

/// Exit code of `gh release view` when no release carries the tag.
pub const RELEASE_NOT_FOUND_CODE: i32 = 1;

/// Exit code of `git commit` when the working tree has nothing to commit.
pub const NOTHING_TO_COMMIT_CODE: i32 = 1;
