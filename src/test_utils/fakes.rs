//! Recording fakes for the pipeline capabilities.
//!
//! Every fake appends a short, command-like line to a shared [`CallLog`], so a
//! test can assert on the exact order of side effects across capabilities.
//! Exit codes are scripted per operation; unscripted operations succeed.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::archive::{Archiver, ZipArchiver};
use crate::core::MirrorError;
use crate::fetch::Fetcher;
use crate::models::{Credentials, ProductReference, ReleaseTag, UpdateRecord};
use crate::oracle::UpdateOracle;
use crate::process::CommandOutput;
use crate::release::{ReleaseClient, ReleaseRequest};
use crate::sync::{DirSynchronizer, SyncReport, Synchronizer};

/// Ordered record of capability calls, shared between fakes.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    /// Append one call.
    pub fn record(&self, call: impl Into<String>) {
        self.0.lock().unwrap_or_else(|e| e.into_inner()).push(call.into());
    }

    /// Calls so far, oldest first.
    pub fn calls(&self) -> Vec<String> {
        self.0.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Whether any call starts with `prefix`.
    pub fn contains(&self, prefix: &str) -> bool {
        self.calls().iter().any(|c| c.starts_with(prefix))
    }
}

fn output(command: String, code: i32) -> CommandOutput {
    let stderr = if code == 0 { String::new() } else { format!("{command}: exit {code}") };
    CommandOutput {
        command,
        code,
        stdout: String::new(),
        stderr,
    }
}

/// [`UpdateOracle`] returning a fixed record or a fixed error.
pub struct FakeOracle {
    log: CallLog,
    reply: Result<UpdateRecord, fn(&str) -> MirrorError>,
}

impl FakeOracle {
    /// Oracle reporting `version` available at `package_url`.
    pub fn returning(log: CallLog, version: &str, package_url: &str) -> Self {
        Self {
            log,
            reply: Ok(UpdateRecord {
                version: version.to_string(),
                package_url: package_url.to_string(),
            }),
        }
    }

    /// Oracle failing with the error built by `error` from the product id.
    pub fn failing(log: CallLog, error: fn(&str) -> MirrorError) -> Self {
        Self {
            log,
            reply: Err(error),
        }
    }
}

#[async_trait]
impl UpdateOracle for FakeOracle {
    async fn check(
        &self,
        _credentials: &Credentials,
        product: &ProductReference,
    ) -> Result<UpdateRecord, MirrorError> {
        self.log.record(format!("check {}", product.product_id()));
        match &self.reply {
            Ok(record) => Ok(record.clone()),
            Err(error) => Err(error(product.product_id())),
        }
    }
}

/// [`ReleaseClient`] with scripted exit codes.
///
/// Defaults: `view` exits `1` (no release), `auth status` and `create` exit `0`.
pub struct FakeReleaseClient {
    log: CallLog,
    view_code: i32,
    auth_code: i32,
    create_code: i32,
}

impl FakeReleaseClient {
    /// Client for a repository without the release.
    pub const fn new(log: CallLog) -> Self {
        Self {
            log,
            view_code: 1,
            auth_code: 0,
            create_code: 0,
        }
    }

    /// Exit code of `release view`.
    pub const fn with_view_code(mut self, code: i32) -> Self {
        self.view_code = code;
        self
    }

    /// Exit code of `auth status`.
    pub const fn with_auth_code(mut self, code: i32) -> Self {
        self.auth_code = code;
        self
    }

    /// Exit code of `release create`.
    pub const fn with_create_code(mut self, code: i32) -> Self {
        self.create_code = code;
        self
    }
}

#[async_trait]
impl ReleaseClient for FakeReleaseClient {
    async fn view(&self, tag: &ReleaseTag) -> Result<CommandOutput, MirrorError> {
        let command = format!("gh release view {tag}");
        self.log.record(command.clone());
        Ok(output(command, self.view_code))
    }

    async fn auth_status(&self) -> Result<CommandOutput, MirrorError> {
        let command = "gh auth status".to_string();
        self.log.record(command.clone());
        Ok(output(command, self.auth_code))
    }

    async fn create(&self, request: &ReleaseRequest) -> Result<CommandOutput, MirrorError> {
        let asset = request.asset.file_name().map(|n| n.to_string_lossy().into_owned());
        let command = format!(
            "gh release create {} {} --title {}",
            request.tag,
            asset.unwrap_or_default(),
            request.title
        );
        self.log.record(command.clone());
        Ok(output(command, self.create_code))
    }
}

/// [`Fetcher`] writing fixed bytes instead of downloading.
pub struct FakeFetcher {
    log: CallLog,
    bytes: Option<Vec<u8>>,
}

impl FakeFetcher {
    /// Fetcher "downloading" `bytes`.
    pub const fn new(log: CallLog, bytes: Vec<u8>) -> Self {
        Self {
            log,
            bytes: Some(bytes),
        }
    }

    /// Fetcher failing every download like an HTTP 404.
    pub const fn failing(log: CallLog) -> Self {
        Self {
            log,
            bytes: None,
        }
    }
}

#[async_trait]
impl Fetcher for FakeFetcher {
    async fn download(&self, url: &str, dest: &Path) -> Result<u64, MirrorError> {
        self.log.record(format!("download {url}"));
        let bytes = self.bytes.as_ref().ok_or_else(|| MirrorError::DownloadFailed {
            url: url.to_string(),
            reason: "HTTP 404 Not Found".to_string(),
        })?;
        tokio::fs::write(dest, bytes).await?;
        Ok(bytes.len() as u64)
    }
}

/// [`ZipArchiver`] that records each extraction.
pub struct RecordingArchiver {
    log: CallLog,
}

impl RecordingArchiver {
    /// Wrap the real archiver.
    pub const fn new(log: CallLog) -> Self {
        Self {
            log,
        }
    }
}

#[async_trait]
impl Archiver for RecordingArchiver {
    async fn extract(&self, archive: &Path, dest: &Path) -> Result<usize, MirrorError> {
        let name = archive.file_name().map(|n| n.to_string_lossy().into_owned());
        self.log.record(format!("extract {}", name.unwrap_or_default()));
        ZipArchiver.extract(archive, dest).await
    }
}

/// [`DirSynchronizer`] that records each sync.
pub struct RecordingSynchronizer {
    log: CallLog,
}

impl RecordingSynchronizer {
    /// Wrap the real synchronizer.
    pub const fn new(log: CallLog) -> Self {
        Self {
            log,
        }
    }
}

#[async_trait]
impl Synchronizer for RecordingSynchronizer {
    async fn sync(
        &self,
        source: &Path,
        dest: &Path,
        excludes: &[String],
    ) -> Result<SyncReport, MirrorError> {
        self.log.record(format!("sync --exclude={}", excludes.join(",")));
        DirSynchronizer.sync(source, dest, excludes).await
    }
}

/// [`VcsClient`](crate::git::VcsClient) with scripted exit codes.
///
/// Codes are keyed by operation: `config`, `add`, `commit`, `push`.
pub struct FakeVcs {
    log: CallLog,
    codes: HashMap<&'static str, i32>,
}

impl FakeVcs {
    /// Client where every operation succeeds.
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            codes: HashMap::new(),
        }
    }

    /// Exit code of `operation`.
    pub fn with_code(mut self, operation: &'static str, code: i32) -> Self {
        self.codes.insert(operation, code);
        self
    }

    fn run(&self, operation: &str, command: String) -> CommandOutput {
        self.log.record(command.clone());
        output(command, self.codes.get(operation).copied().unwrap_or(0))
    }
}

#[async_trait]
impl crate::git::VcsClient for FakeVcs {
    async fn config(&self, key: &str, value: &str) -> Result<CommandOutput, MirrorError> {
        Ok(self.run("config", format!("git config {key} {value}")))
    }

    async fn add_all(&self) -> Result<CommandOutput, MirrorError> {
        Ok(self.run("add", "git add --all".to_string()))
    }

    async fn commit_all(&self, message: &str) -> Result<CommandOutput, MirrorError> {
        Ok(self.run("commit", format!("git commit --all -m {message}")))
    }

    async fn push(&self, remote: &str, branch: &str) -> Result<CommandOutput, MirrorError> {
        Ok(self.run("push", format!("git push {remote} {branch}")))
    }
}
