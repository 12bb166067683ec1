//! # Generate Command Implementation
//!
//! Implements `generate`, which reads `DEPS.xwalk` and writes the solved
//! checkout descriptor `.gclient-xwalk` two levels above the xwalk project.
//!
//! In git mode (`--use-git` or `XWALK_USE_GIT`) the release metadata is
//! fetched with `svn` first, so the command fails early when no subversion
//! client is installed.

use anyhow::{Context, Result};
use clap::Args;
use console::Style;
use std::fs;
use std::path::PathBuf;

use xwalk_sync::checkout::{Checkout, SvnCheckout};
use xwalk_sync::descriptor::SyncMode;
use xwalk_sync::orchestrator::{self, GenerateRequest, Workspace};
use xwalk_sync::output::OutputConfig;
use xwalk_sync::settings::Settings;

/// Generate .gclient-xwalk from the DEPS.xwalk manifest
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Manifest to read instead of <xwalk-dir>/DEPS.xwalk.
    #[arg(long, value_name = "FILE")]
    pub deps: Option<PathBuf>,

    /// Directory gclient uses to cache git mirrors.
    #[arg(long, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Fetch chromium's dependencies over git (.DEPS.git).
    ///
    /// Also enabled when XWALK_USE_GIT is set.
    #[arg(long)]
    pub use_git: bool,

    /// The xwalk project directory, normally <root>/src/xwalk.
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub xwalk_dir: PathBuf,

    /// Print the descriptor without writing it.
    #[arg(long)]
    pub dry_run: bool,
}

impl GenerateArgs {
    fn request(&self) -> GenerateRequest {
        GenerateRequest {
            deps_file: self.deps.clone(),
            cache_dir: self.cache_dir.clone(),
            use_git: self.use_git,
            dry_run: self.dry_run,
        }
    }
}

/// Execute the `generate` command.
///
/// # Arguments
/// * `args` - The command arguments
/// * `color_flag` - The value of the global --color flag ("always", "never", or "auto")
pub fn execute(args: GenerateArgs, color_flag: &str) -> Result<()> {
    let out = OutputConfig::from_env_and_flag(color_flag);
    let settings = Settings::from_env();
    let request = args.request();

    let xwalk_dir = fs::canonicalize(&args.xwalk_dir).with_context(|| {
        format!(
            "Cannot use {} as the xwalk directory",
            args.xwalk_dir.display()
        )
    })?;
    let workspace = Workspace::new(xwalk_dir);

    let svn = match request.mode(&settings) {
        SyncMode::Git => Some(SvnCheckout::discover()?),
        SyncMode::Svn => None,
    };
    let checkout = svn.as_ref().map(|svn| svn as &dyn Checkout);

    let generated = match orchestrator::generate(&workspace, &request, &settings, checkout) {
        Ok(generated) => generated,
        Err(e) => {
            println!("{} Failed to generate {}", out.err(), workspace.gclient_file().display());
            return Err(e.into());
        }
    };

    if let Some(branch) = &generated.branch {
        println!(
            "{} Patched .DEPS.git from chromium branch {}",
            out.ok(),
            branch
        );
    }

    let rendered = generated.descriptor.render();
    let verb = if request.dry_run { "Would place" } else { "Place" };
    println!(
        "{} {} {} with solutions:\n{}",
        out.ok(),
        verb,
        out.paint(&Style::new().bold(), &generated.path.display().to_string()),
        rendered.trim_end()
    );

    Ok(())
}
