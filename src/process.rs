//! External command execution.
//!
//! [`ToolCommand`] is a small builder around [`tokio::process::Command`] used
//! for every `git` and `gh` invocation. It resolves the program on `PATH`
//! first so a missing tool surfaces as [`MirrorError::CommandNotFound`]
//! instead of a bare IO error, echoes the command line to the job log,
//! captures both output streams, and reports the exit code without judging
//! it. Callers decide which codes are acceptable with
//! [`CommandOutput::expect_codes`].
//!
//! # Examples
//!
//! ```rust,no_run
//! use plugin_mirror::process::ToolCommand;
//!
//! # async fn example() -> Result<(), plugin_mirror::core::MirrorError> {
//! let output = ToolCommand::new("gh")
//!     .args(["release", "view", "v1.0.0"])
//!     .current_dir("/path/to/repo")
//!     .execute()
//!     .await?;
//! let exists = output.expect_codes(&[0, 1])?.success();
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Instant;
use tokio::process::Command;

use crate::core::MirrorError;
use crate::ui;

/// Builder for one external command.
#[derive(Debug, Clone)]
pub struct ToolCommand {
    program: String,
    args: Vec<String>,
    current_dir: Option<PathBuf>,
    env_vars: Vec<(String, String)>,
    echo_output: bool,
    context: Option<String>,
}

impl ToolCommand {
    /// Start a command for `program`, looked up on `PATH` when executed.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
            env_vars: Vec::new(),
            echo_output: true,
            context: None,
        }
    }

    /// Append one argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments in order.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Run in `dir` instead of the process working directory.
    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.current_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Set an environment variable for the child only.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env_vars.push((key.into(), value.into()));
        self
    }

    /// Keep captured output out of the job log; it is still logged at debug level.
    pub const fn quiet(mut self) -> Self {
        self.echo_output = false;
        self
    }

    /// Label included in debug log lines.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Program name as given.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments in order.
    pub fn arguments(&self) -> &[String] {
        &self.args
    }

    /// Environment variables set for the child, in order.
    pub fn environment(&self) -> &[(String, String)] {
        &self.env_vars
    }

    /// Command line as echoed to the job log.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .map(quote_arg)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Run the command to completion and capture its output.
    ///
    /// A non-zero exit code is not an error here.
    ///
    /// # Errors
    ///
    /// - [`MirrorError::CommandNotFound`] when the program is not on `PATH`
    /// - [`MirrorError::IoError`] when the process cannot be spawned
    pub async fn execute(self) -> Result<CommandOutput, MirrorError> {
        let resolved = which::which(&self.program).map_err(|_| MirrorError::CommandNotFound {
            program: self.program.clone(),
        })?;
        let line = self.command_line();
        let prefix = self.context.as_deref().map(|c| format!("({c}) ")).unwrap_or_default();

        ui::command(&line);
        tracing::debug!(target: "process", "{prefix}Executing command: {line}");

        let mut cmd = Command::new(&resolved);
        cmd.args(&self.args).stdin(Stdio::null()).stdout(Stdio::piped()).stderr(Stdio::piped());
        if let Some(dir) = &self.current_dir {
            cmd.current_dir(dir);
        }
        for (key, value) in &self.env_vars {
            tracing::trace!(target: "process", "Setting env var: {key}={value}");
            cmd.env(key, value);
        }

        let start = Instant::now();
        let output = cmd.output().await?;
        let code = output.status.code().unwrap_or(-1);
        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        tracing::debug!(
            target: "process",
            "{prefix}{} exited with code {code} after {}ms",
            self.program,
            start.elapsed().as_millis()
        );
        if !stdout.trim().is_empty() {
            tracing::debug!(target: "process", "{prefix}{}", stdout.trim());
        }
        if !stderr.trim().is_empty() {
            tracing::debug!(target: "process", "{prefix}{}", stderr.trim());
        }
        if self.echo_output {
            print!("{stdout}");
            eprint!("{stderr}");
        }

        Ok(CommandOutput {
            command: line,
            code,
            stdout,
            stderr,
        })
    }
}

fn quote_arg(arg: &str) -> String {
    if !arg.is_empty() && !arg.contains(|c: char| c.is_whitespace() || c == '\'' || c == '"') {
        return arg.to_string();
    }
    format!("'{}'", arg.replace('\'', r"'\''"))
}

/// Result of a finished command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Command line as echoed
    pub command: String,
    /// Exit code, `-1` when terminated by a signal
    pub code: i32,
    /// Captured standard output
    pub stdout: String,
    /// Captured standard error
    pub stderr: String,
}

impl CommandOutput {
    /// Whether the command exited with code `0`.
    pub const fn success(&self) -> bool {
        self.code == 0
    }

    /// Pass the output through when its code is in `codes`.
    ///
    /// # Errors
    ///
    /// [`MirrorError::CommandFailed`] carrying the code and captured stderr.
    pub fn expect_codes(self, codes: &[i32]) -> Result<Self, MirrorError> {
        if codes.contains(&self.code) {
            Ok(self)
        } else {
            Err(MirrorError::CommandFailed {
                command: self.command,
                code: self.code,
                stderr: self.stderr,
            })
        }
    }

    /// Shorthand for `expect_codes(&[0])`.
    ///
    /// # Errors
    ///
    /// [`MirrorError::CommandFailed`] on any non-zero code.
    pub fn expect_success(self) -> Result<Self, MirrorError> {
        self.expect_codes(&[0])
    }
}
