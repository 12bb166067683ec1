//! # Fetch-Chromium Command Implementation
//!
//! Implements `fetch-chromium`. When syncing over git, gclient does not
//! fetch `src` itself; this command clones (or updates) the
//! chromium-crosswalk mirror into `<root>/src` and checks out the revision
//! pinned by `chromium_crosswalk_point` in `DEPS.xwalk`.
//!
//! Without git mode the command does nothing and succeeds.

use anyhow::{Context, Result};
use clap::Args;
use std::fs;
use std::path::PathBuf;

use xwalk_sync::checkout::GitCheckout;
use xwalk_sync::defaults::CHROMIUM_CROSSWALK_BRANCH;
use xwalk_sync::orchestrator::{self, Fetched, Workspace};
use xwalk_sync::output::OutputConfig;
use xwalk_sync::settings::{Settings, USE_GIT_VAR};

/// Check out chromium-crosswalk into src when syncing over git
#[derive(Args, Debug)]
pub struct FetchChromiumArgs {
    /// The xwalk project directory, normally <root>/src/xwalk.
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub xwalk_dir: PathBuf,

    /// Fetch even when XWALK_USE_GIT is not set.
    #[arg(long)]
    pub use_git: bool,
}

/// Execute the `fetch-chromium` command.
///
/// # Arguments
/// * `args` - The command arguments
/// * `color_flag` - The value of the global --color flag ("always", "never", or "auto")
pub fn execute(args: FetchChromiumArgs, color_flag: &str) -> Result<()> {
    let out = OutputConfig::from_env_and_flag(color_flag);
    let settings = Settings::from_env();

    if !(args.use_git || settings.use_git) {
        println!(
            "{} {} is not set, nothing to fetch",
            out.info(),
            USE_GIT_VAR
        );
        return Ok(());
    }

    let xwalk_dir = fs::canonicalize(&args.xwalk_dir).with_context(|| {
        format!(
            "Cannot use {} as the xwalk directory",
            args.xwalk_dir.display()
        )
    })?;
    let workspace = Workspace::new(xwalk_dir);
    let git = GitCheckout::discover(CHROMIUM_CROSSWALK_BRANCH)?;

    match orchestrator::fetch_chromium(&workspace, &settings, args.use_git, &git)? {
        Fetched::Skipped => println!("{} Nothing to fetch", out.info()),
        Fetched::CheckedOut { dest, revision } => println!(
            "{} Checked out {} at {}",
            out.ok(),
            dest.display(),
            revision
        ),
    }

    Ok(())
}
