//! plugin-mirror entry point
//!
//! Parses arguments, sets up logging, runs the pipeline, and turns the result
//! into the process exit code: `0` on success or when the release already
//! exists, the failing command's own code when an external command failed,
//! and `1` for everything else.

use anyhow::Result;
use clap::Parser;
use plugin_mirror::cli::Cli;
use plugin_mirror::core::user_friendly_error;
use plugin_mirror::pipeline::Outcome;
use plugin_mirror::ui;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up colored output for Windows
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    cli.init_logging()?;

    match cli.execute().await {
        Ok(Outcome::AlreadyReleased {
            ..
        }) => Ok(()),
        Ok(Outcome::Published {
            tag,
            committed,
            pushed,
            ..
        }) => {
            if !committed {
                ui::status("Repository already up to date.");
            }
            if !pushed {
                ui::status("Push failed; see the log above.");
            }
            ui::success(&format!("Released {tag}"));
            Ok(())
        }
        Err(e) => {
            let code = e.exit_code();
            user_friendly_error(e).display();
            std::process::exit(code);
        }
    }
}
