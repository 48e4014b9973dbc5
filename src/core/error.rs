//! Error handling for the mirroring pipeline
//!
//! The error system follows two principles:
//! 1. **Strongly-typed errors** crossing every module seam, so the pipeline can
//!    decide what is fatal and which exit code a failure maps to
//! 2. **User-friendly messages** rendered once, at the binary boundary
//!
//! # Architecture
//!
//! - [`MirrorError`] - every failure mode of a run
//! - [`StageError`] - a [`MirrorError`] tagged with the [`Stage`] that produced it
//! - [`ErrorContext`] - wrapper adding details and a suggestion for display
//!
//! # Exit codes
//!
//! [`MirrorError::exit_code`] preserves the externally observable contract of
//! the job: a failed external command propagates its own exit code verbatim,
//! everything else (missing input, unusable API response, download, extraction,
//! and filesystem failures) exits with `1`.
//!
//! # Examples
//!
//! ```rust,no_run
//! use plugin_mirror::core::{MirrorError, Stage, StageError, user_friendly_error};
//!
//! let error = StageError::new(
//!     Stage::Inputs,
//!     MirrorError::MissingInput { name: "woo-product-id".to_string() },
//! );
//! assert_eq!(error.exit_code(), 1);
//! user_friendly_error(error).display();
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

use super::Stage;

/// The main error type for mirroring operations
///
/// # Error Categories
///
/// ## Input
/// - [`MissingInput`] - a required input is absent or empty
/// - [`InvalidInput`] - an input is present but unusable
///
/// ## Update oracle
/// - [`UnexpectedResponseKind`] - the response is not a JSON object
/// - [`ProductNotFound`] - the response has no entry for the product
/// - [`InvalidUpdateRecord`] - the entry lacks a usable version or package URL
///
/// ## Staging and sync
/// - [`DownloadFailed`], [`ExtractFailed`], [`PluginDirMissing`]
/// - [`SyncSourceInvalid`], [`SyncFailed`]
///
/// ## External commands
/// - [`CommandFailed`] - non-zero exit code that the caller does not tolerate
/// - [`CommandNotFound`] - the program is not on `PATH`
///
/// [`MissingInput`]: MirrorError::MissingInput
/// [`InvalidInput`]: MirrorError::InvalidInput
/// [`UnexpectedResponseKind`]: MirrorError::UnexpectedResponseKind
/// [`ProductNotFound`]: MirrorError::ProductNotFound
/// [`InvalidUpdateRecord`]: MirrorError::InvalidUpdateRecord
/// [`DownloadFailed`]: MirrorError::DownloadFailed
/// [`ExtractFailed`]: MirrorError::ExtractFailed
/// [`PluginDirMissing`]: MirrorError::PluginDirMissing
/// [`SyncSourceInvalid`]: MirrorError::SyncSourceInvalid
/// [`SyncFailed`]: MirrorError::SyncFailed
/// [`CommandFailed`]: MirrorError::CommandFailed
/// [`CommandNotFound`]: MirrorError::CommandNotFound
#[derive(Error, Debug)]
pub enum MirrorError {
    /// A required input was not supplied or is empty
    #[error("Input required and not supplied: {name}")]
    MissingInput {
        /// Input name as accepted on the command line
        name: String,
    },

    /// An input was supplied but cannot be used
    #[error("Invalid input '{name}': {reason}")]
    InvalidInput {
        /// Input name as accepted on the command line
        name: String,
        /// Why the value was rejected
        reason: String,
    },

    /// A URL could not be parsed or has no host
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl {
        /// The offending URL
        url: String,
        /// Parser message
        reason: String,
    },

    /// The update-check response is not a structured object
    #[error("Unknown response from: {url}")]
    UnexpectedResponseKind {
        /// Endpoint queried, without credentials
        url: String,
    },

    /// The update-check response has no entry for the product
    #[error("No update information for product ID: {product_id}")]
    ProductNotFound {
        /// Product that was queried
        product_id: String,
    },

    /// The product entry lacks a usable version or package URL
    #[error("Invalid update information for product ID {product_id}: {reason}")]
    InvalidUpdateRecord {
        /// Product that was queried
        product_id: String,
        /// What is missing or malformed
        reason: String,
    },

    /// A request could not be sent or its response could not be read
    #[error("Network error: {operation}")]
    Network {
        /// What was being attempted
        operation: String,
        /// Transport error message
        reason: String,
    },

    /// The plugin archive could not be downloaded
    #[error("Failed to download {url}")]
    DownloadFailed {
        /// Archive URL
        url: String,
        /// Transport error or HTTP status
        reason: String,
    },

    /// The plugin archive could not be extracted
    #[error("Failed to extract {archive}")]
    ExtractFailed {
        /// Archive path
        archive: String,
        /// Archive or filesystem error message
        reason: String,
    },

    /// Extraction did not produce a directory named after the plugin slug
    #[error("Plugin directory not found after extraction: {path}")]
    PluginDirMissing {
        /// Expected plugin directory
        path: String,
    },

    /// The sync source is missing or has no generated manifest
    #[error("Sync source is not a staged plugin directory: {path}")]
    SyncSourceInvalid {
        /// Staged plugin directory
        path: String,
    },

    /// Synchronizing the staged plugin into the repository failed
    #[error("Failed to synchronize {staged} into {destination}")]
    SyncFailed {
        /// Staged plugin directory
        staged: String,
        /// Repository directory
        destination: String,
        /// Filesystem error message
        reason: String,
    },

    /// An external command exited with a code the caller does not tolerate
    #[error("Command failed with exit code {code}: {command}")]
    CommandFailed {
        /// Command line as echoed to the log
        command: String,
        /// Exit code, or `-1` when terminated by a signal
        code: i32,
        /// Captured standard error
        stderr: String,
    },

    /// An external program is not installed or not on `PATH`
    #[error("Command not found: {program}")]
    CommandNotFound {
        /// Program name
        program: String,
    },

    /// The working tree could not be removed
    #[error("Failed to remove working tree: {path}")]
    CleanupFailed {
        /// Working tree root
        path: String,
        /// Filesystem error message
        reason: String,
    },

    /// IO error from [`std::io::Error`]
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON error from [`serde_json::Error`]
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl MirrorError {
    /// Process exit code for this error.
    ///
    /// Command failures propagate the command's own code; a command killed by
    /// a signal, and every other error, maps to `1`.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::CommandFailed {
                code,
                ..
            } if *code > 0 => *code,
            _ => 1,
        }
    }
}

/// A [`MirrorError`] together with the stage that produced it.
#[derive(Debug, Error)]
#[error("{stage}: {error}")]
pub struct StageError {
    /// First stage that failed
    pub stage: Stage,
    /// Underlying failure
    pub error: MirrorError,
}

impl StageError {
    /// Tag `error` with `stage`.
    pub const fn new(stage: Stage, error: MirrorError) -> Self {
        Self {
            stage,
            error,
        }
    }

    /// Process exit code of the failed run.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        self.error.exit_code()
    }
}

/// Extension for tagging results with the stage they belong to.
pub trait StageResultExt<T> {
    /// Convert the error side into a [`StageError`] for `stage`.
    fn in_stage(self, stage: Stage) -> Result<T, StageError>;
}

impl<T, E> StageResultExt<T> for Result<T, E>
where
    E: Into<MirrorError>,
{
    fn in_stage(self, stage: Stage) -> Result<T, StageError> {
        self.map_err(|e| StageError::new(stage, e.into()))
    }
}

/// Error wrapper carrying display-only details and a suggestion
///
/// Details explain what the failure means; the suggestion is an actionable
/// next step. Both are optional.
#[derive(Debug)]
pub struct ErrorContext {
    /// The failure being reported
    pub error: MirrorError,
    /// Stage the failure happened in, when known
    pub stage: Option<Stage>,
    /// Actionable next step
    pub suggestion: Option<String>,
    /// Additional explanation
    pub details: Option<String>,
}

impl ErrorContext {
    /// Wrap `error` without details or suggestion.
    #[must_use]
    pub const fn new(error: MirrorError) -> Self {
        Self {
            error,
            stage: None,
            suggestion: None,
            details: None,
        }
    }

    /// Record the stage the error happened in
    #[must_use]
    pub const fn with_stage(mut self, stage: Stage) -> Self {
        self.stage = Some(stage);
        self
    }

    /// Add a suggestion for resolving the error
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error to stderr with terminal colors
    ///
    /// The first line is the labeled error (`Error:` in bold red). Missing
    /// inputs render their label dimmed followed by the input name. Details
    /// follow in yellow, the suggestion in green.
    pub fn display(&self) {
        let label = "Error:".red().bold();
        match &self.error {
            MirrorError::MissingInput {
                name,
            } => {
                eprintln!("{label} {} {name}", "Input required and not supplied:".bright_black());
            }
            error => match self.stage {
                Some(stage) => eprintln!("{label} {error} {}", format!("({stage})").dimmed()),
                None => eprintln!("{label} {error}"),
            },
        }

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert a failed run into a user-friendly [`ErrorContext`]
///
/// Attaches the failing stage and, for the failures users can act on, a
/// details line and a suggestion.
#[must_use]
pub fn user_friendly_error(error: StageError) -> ErrorContext {
    let StageError {
        stage,
        error,
    } = error;

    let context = match &error {
        MirrorError::MissingInput {
            name,
        } => {
            let flag = format!("--{name}");
            let env = format!("INPUT_{}", name.to_uppercase());
            ErrorContext::new(error).with_suggestion(format!("Pass {flag} or set {env}"))
        }
        MirrorError::InvalidInput {
            name,
            ..
        } if name == "plugin-basename" => ErrorContext::new(error)
            .with_suggestion("Use the plugin's main file relative to the plugins directory, e.g. my-plugin/my-plugin.php"),
        MirrorError::UnexpectedResponseKind {
            ..
        } => ErrorContext::new(error)
            .with_details("The update-check endpoint did not return a JSON object")
            .with_suggestion("Verify the access token and secret; the endpoint rejects badly signed requests"),
        MirrorError::ProductNotFound {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Check that the product ID is correct and that the access token's account owns it"),
        MirrorError::CommandNotFound {
            program,
        } => {
            let suggestion = match program.as_str() {
                "gh" => "Install the GitHub CLI from https://cli.github.com/".to_string(),
                "git" | "git.exe" => "Install git from https://git-scm.com/".to_string(),
                other => format!("Install {other} and make sure it is on PATH"),
            };
            ErrorContext::new(error).with_suggestion(suggestion)
        }
        MirrorError::CommandFailed {
            stderr,
            ..
        } => {
            let stderr = stderr.trim();
            if stderr.is_empty() {
                ErrorContext::new(error)
            } else {
                let details = stderr.to_string();
                ErrorContext::new(error).with_details(details)
            }
        }
        MirrorError::DownloadFailed {
            reason,
            ..
        }
        | MirrorError::ExtractFailed {
            reason,
            ..
        }
        | MirrorError::SyncFailed {
            reason,
            ..
        }
        | MirrorError::CleanupFailed {
            reason,
            ..
        }
        | MirrorError::Network {
            reason,
            ..
        }
        | MirrorError::InvalidUpdateRecord {
            reason,
            ..
        } => {
            let details = reason.clone();
            ErrorContext::new(error).with_details(details)
        }
        _ => ErrorContext::new(error),
    };

    context.with_stage(stage)
}
