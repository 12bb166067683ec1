//! Default values for xwalk-sync.
//!
//! This module keeps the fixed file names, URLs and directory layout used
//! across commands in one place.
//!
//! The expected layout is `<root>/src/xwalk`, where `xwalk` is the overlay
//! project. The generated descriptor lands in `<root>`.

use std::path::{Path, PathBuf};

/// Dependency path that every manifest must define.
pub const ROOT_DEPENDENCY: &str = "src";

/// Manifest file name, relative to the xwalk directory.
pub const MANIFEST_FILE: &str = "DEPS.xwalk";

/// Generated descriptor file name, relative to the checkout root.
pub const GCLIENT_FILE: &str = ".gclient-xwalk";

/// Deps file gclient reads in git mode.
pub const GIT_DEPS_FILE: &str = ".DEPS.git";

/// Deps file of a chromium release.
pub const RELEASE_DEPS_FILE: &str = "DEPS";

/// Diff that brings a branch's `.DEPS.git` up to date, relative to the xwalk
/// directory.
pub const GIT_DEPS_DIFF: &str = "tools/DEPS_git.diff";

/// Sub-directory of a release checkout that holds the branch's `.DEPS.git`.
pub const GIT_DEPS_CHECKOUT: &str = "deps_git";

/// Git mirror that `src` is fetched from in git mode.
pub const CHROMIUM_CROSSWALK_URL: &str =
    "https://github.com/crosswalk-project/chromium-crosswalk.git";

/// Branch cloned from [`CHROMIUM_CROSSWALK_URL`] before checking out a
/// revision.
pub const CHROMIUM_CROSSWALK_BRANCH: &str = "master";

const RELEASES_URL: &str = "http://src.chromium.org/svn/releases/";
const BRANCHES_URL: &str = "http://src.chromium.org/svn/branches/";

/// URL of the subversion release tag for `version`.
pub fn release_url(version: &str) -> String {
    format!("{}{}", RELEASES_URL, version)
}

/// URL of the `src` directory of chromium branch `branch`.
pub fn branch_src_url(branch: &str) -> String {
    format!("{}{}/src/", BRANCHES_URL, branch)
}

/// Checkout root for an xwalk directory at `<root>/src/xwalk`.
///
/// Falls back to the xwalk directory itself when it has fewer than two
/// ancestors.
pub fn root_dir(xwalk_dir: &Path) -> PathBuf {
    xwalk_dir
        .parent()
        .and_then(Path::parent)
        .unwrap_or(xwalk_dir)
        .to_path_buf()
}
