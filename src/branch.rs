//! Chromium branch resolution.
//!
//! A chromium release's `DEPS` file references its source through
//! `.../branches/chromium/<number>@<revision>` URLs. The first such line
//! gives the branch whose `.DEPS.git` describes the same release for git.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::OnceLock;

use log::debug;
use regex::Regex;

use crate::error::{Error, Result};

fn branch_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^.*/branches/chromium/(\d+)@.*$").expect("branch pattern is valid")
    })
}

/// Return the branch number from the first matching line of `reader`.
///
/// Lines are scanned in order and the first match wins.
pub fn find_branch<R: BufRead>(reader: R) -> Result<Option<String>> {
    let pattern = branch_pattern();
    for line in reader.lines() {
        let line = line?;
        if let Some(branch) = pattern.captures(&line).and_then(|c| c.get(1)) {
            return Ok(Some(branch.as_str().to_string()));
        }
    }
    Ok(None)
}

/// Resolve the branch of the release whose `DEPS` file is at `deps_file`.
///
/// Fails with [`Error::BranchNotFound`] when no line matches.
pub fn resolve_branch(deps_file: &Path, version: &str) -> Result<String> {
    let reader = BufReader::new(File::open(deps_file)?);
    match find_branch(reader)? {
        Some(branch) => {
            debug!("Release {} is on chromium branch {}", version, branch);
            Ok(branch)
        }
        None => Err(Error::BranchNotFound {
            version: version.to_string(),
            deps_file: deps_file.to_path_buf(),
        }),
    }
}
