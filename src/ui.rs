//! Job log output.
//!
//! Stage headings, echoed commands, and status lines go to stdout so they
//! interleave with the output of the external commands being run. Inside a
//! GitHub Actions job (`GITHUB_ACTIONS=true`) each stage is wrapped in a
//! collapsible `::group::` block; elsewhere it gets a bold heading.

use colored::Colorize;

/// Whether the process runs inside a GitHub Actions job.
pub fn in_github_actions() -> bool {
    std::env::var("GITHUB_ACTIONS").is_ok_and(|v| v == "true")
}

/// Open a log group for `heading`. The group closes when the guard drops.
#[must_use = "the group closes when the guard is dropped"]
pub fn group(heading: &str) -> LogGroup {
    let workflow = in_github_actions();
    if workflow {
        println!("::group::{heading}");
    } else {
        println!("{}", format!("==> {heading}").bold());
    }
    LogGroup {
        workflow,
    }
}

/// Guard closing a log group on drop.
#[derive(Debug)]
pub struct LogGroup {
    workflow: bool,
}

impl Drop for LogGroup {
    fn drop(&mut self) {
        if self.workflow {
            println!("::endgroup::");
        }
    }
}

/// Echo a command line before it runs.
pub fn command(line: &str) {
    println!("{}", line.cyan());
}

/// Neutral progress line.
pub fn status(message: &str) {
    println!("{message}");
}

/// Final line of a successful run.
pub fn success(message: &str) {
    println!("{}", message.green().bold());
}
