//! # Checkout Collaborators
//!
//! The generator never talks to a version-control server itself. It asks a
//! [`Checkout`] to materialize a URL on disk and then reads plain files.
//!
//! ## Design
//!
//! [`Checkout`] is the seam between the pipeline and the outside world:
//!
//! - **`SvnCheckout`** wraps the `svn` command line client and is used to
//!   fetch release and branch metadata from the chromium subversion mirror.
//! - **`GitCheckout`** wraps the `git` command line client and is used to
//!   fetch `src` from the chromium-crosswalk mirror.
//!
//! Both are located once, through `discover()`, which fails with a clear
//! message when the tool is not on `PATH`. Tests substitute their own
//! implementations that write fixture files instead of running commands.
//!
//! Commands run in the foreground and block until they exit. A non-zero
//! exit is reported as [`Error::ExternalTool`] with the tool's stderr.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use log::{debug, info};

use crate::error::{Error, Result};

/// Materializes remote sources on disk.
pub trait Checkout {
    /// Short tool name, used in messages.
    fn tool(&self) -> &str;

    /// Check out `url` into `dest`, or update `dest` if it already holds a
    /// checkout. `revision` pins the result when given.
    fn prepare(&self, url: &str, dest: &Path, revision: Option<&str>) -> Result<()>;

    /// Check out only `files` (relative to `url`) into `dest`.
    fn prepare_files(&self, url: &str, dest: &Path, files: &[&str]) -> Result<()>;
}

/// Locate `tool` on `PATH`.
fn locate(tool: &str, hint: &str) -> Result<PathBuf> {
    let path = which::which(tool).map_err(|e| Error::ToolNotFound {
        tool: tool.to_string(),
        message: format!("{}. {}", e, hint),
    })?;
    debug!("Using {} at {}", tool, path.display());
    Ok(path)
}

/// Run `program` with `args`, optionally in `cwd`, failing on non-zero exit.
fn run(tool: &str, program: &Path, args: &[&str], cwd: Option<&Path>) -> Result<String> {
    let command_line = format!("{} {}", tool, args.join(" "));
    info!("Running: {}", command_line);

    let mut command = Command::new(program);
    command.args(args);
    if let Some(dir) = cwd {
        command.current_dir(dir);
    }

    let output = command.output().map_err(|e| Error::ExternalTool {
        tool: tool.to_string(),
        command: command_line.clone(),
        stderr: e.to_string(),
    })?;

    if !output.status.success() {
        return Err(Error::ExternalTool {
            tool: tool.to_string(),
            command: command_line,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

fn create_parent(dest: &Path) -> Result<()> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

fn is_populated(dir: &Path) -> Result<bool> {
    if !dir.is_dir() {
        return Ok(false);
    }
    Ok(fs::read_dir(dir)?.next().is_some())
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Subversion checkouts through the `svn` client.
#[derive(Debug, Clone)]
pub struct SvnCheckout {
    program: PathBuf,
}

impl SvnCheckout {
    /// Find `svn` on `PATH`.
    pub fn discover() -> Result<Self> {
        Ok(Self::with_program(locate(
            "svn",
            "Install a subversion client and make sure it is on PATH",
        )?))
    }

    /// Use the `svn` binary at `program`.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn run(&self, args: &[&str], cwd: Option<&Path>) -> Result<String> {
        run(self.tool(), &self.program, args, cwd)
    }
}

impl Checkout for SvnCheckout {
    fn tool(&self) -> &str {
        "svn"
    }

    fn prepare(&self, url: &str, dest: &Path, revision: Option<&str>) -> Result<()> {
        let dest_arg = path_arg(dest);
        let mut args = Vec::new();
        if dest.join(".svn").is_dir() {
            args.extend(["update", "--non-interactive"]);
        } else {
            create_parent(dest)?;
            args.extend(["checkout", "--non-interactive"]);
        }
        if let Some(rev) = revision {
            args.extend(["--revision", rev]);
        }
        if args[0] == "checkout" {
            args.push(url);
        }
        args.push(dest_arg.as_str());
        self.run(&args, None)?;
        Ok(())
    }

    fn prepare_files(&self, url: &str, dest: &Path, files: &[&str]) -> Result<()> {
        if !dest.join(".svn").is_dir() {
            create_parent(dest)?;
            let dest_arg = path_arg(dest);
            self.run(
                &["checkout", "--non-interactive", "--depth", "empty", url, dest_arg.as_str()],
                None,
            )?;
        }
        let mut args = vec!["update", "--non-interactive"];
        args.extend_from_slice(files);
        self.run(&args, Some(dest))?;
        Ok(())
    }
}

/// Git checkouts through the `git` client.
#[derive(Debug, Clone)]
pub struct GitCheckout {
    program: PathBuf,
    branch: String,
}

impl GitCheckout {
    /// Find `git` on `PATH`; clones track `branch`.
    pub fn discover(branch: &str) -> Result<Self> {
        Ok(Self::with_program(
            locate("git", "Install git and make sure it is on PATH")?,
            branch,
        ))
    }

    /// Use the `git` binary at `program`.
    pub fn with_program(program: impl Into<PathBuf>, branch: &str) -> Self {
        Self {
            program: program.into(),
            branch: branch.to_string(),
        }
    }

    fn run(&self, args: &[&str], cwd: Option<&Path>) -> Result<String> {
        run(self.tool(), &self.program, args, cwd)
    }

    /// Clone into `dest` or fetch if it is already a repository. Returns the
    /// ref that names the tip of the tracked branch.
    ///
    /// A `dest` that exists but is not a repository (`<root>/src` already
    /// holds `xwalk/` on a first run) is initialized in place, since
    /// `git clone` refuses non-empty directories.
    fn clone_or_fetch(&self, url: &str, dest: &Path, no_checkout: bool) -> Result<String> {
        if dest.join(".git").exists() {
            self.run(&["fetch", "--quiet", "origin"], Some(dest))?;
            Ok(format!("origin/{}", self.branch))
        } else if is_populated(dest)? {
            info!("{} exists without a repository, initializing it", dest.display());
            self.run(&["init", "--quiet"], Some(dest))?;
            self.run(&["remote", "add", "origin", url], Some(dest))?;
            self.run(&["fetch", "--quiet", "origin", self.branch.as_str()], Some(dest))?;
            Ok(format!("origin/{}", self.branch))
        } else {
            create_parent(dest)?;
            let dest_arg = path_arg(dest);
            let mut args = vec!["clone", "--quiet", "--branch", self.branch.as_str()];
            if no_checkout {
                args.push("--no-checkout");
            }
            args.extend([url, dest_arg.as_str()]);
            self.run(&args, None)?;
            Ok(self.branch.clone())
        }
    }
}

impl Checkout for GitCheckout {
    fn tool(&self) -> &str {
        "git"
    }

    fn prepare(&self, url: &str, dest: &Path, revision: Option<&str>) -> Result<()> {
        let tip = self.clone_or_fetch(url, dest, false)?;
        let target = revision.map_or(tip, str::to_string);
        self.run(&["checkout", "--force", "--quiet", target.as_str()], Some(dest))?;
        Ok(())
    }

    fn prepare_files(&self, url: &str, dest: &Path, files: &[&str]) -> Result<()> {
        let tip = self.clone_or_fetch(url, dest, true)?;
        let mut args = vec!["checkout", tip.as_str(), "--"];
        args.extend_from_slice(files);
        self.run(&args, Some(dest))?;
        Ok(())
    }
}
