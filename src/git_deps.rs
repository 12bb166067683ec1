//! Preparation of `.DEPS.git` for git mode.
//!
//! In git mode gclient reads `<root>/<version>/.DEPS.git` instead of the
//! release's subversion `DEPS`. Chromium stops updating `.DEPS.git` on a
//! branch once it is cut, while `DEPS` keeps moving, so the branch's copy is
//! fetched and brought up to date with `tools/DEPS_git.diff` from the xwalk
//! tree:
//!
//! 1. Check out the release tag into `<root>/<version>`.
//! 2. Find the release's chromium branch in `<root>/<version>/DEPS`.
//! 3. Check out only `.DEPS.git` of that branch into
//!    `<root>/<version>/deps_git`.
//! 4. Apply the diff and write the result to `<root>/<version>/.DEPS.git`.
//!
//! A release without a branch, or a diff that does not apply, aborts the run.

use std::fs;
use std::path::{Path, PathBuf};

use log::info;

use crate::branch;
use crate::checkout::Checkout;
use crate::defaults::{self, GIT_DEPS_CHECKOUT, GIT_DEPS_DIFF, GIT_DEPS_FILE, RELEASE_DEPS_FILE};
use crate::error::Result;
use crate::patch;

/// Paths involved in preparing `.DEPS.git` for one release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitDepsLayout {
    /// Release checkout, `<root>/<version>`.
    pub release_dir: PathBuf,
    /// Branch checkout holding the unpatched `.DEPS.git`.
    pub branch_dir: PathBuf,
    /// Diff applied to the branch's `.DEPS.git`.
    pub diff_file: PathBuf,
    /// Patched output read by gclient.
    pub output_file: PathBuf,
}

impl GitDepsLayout {
    pub fn new(root_dir: &Path, xwalk_dir: &Path, version: &str) -> Self {
        let release_dir = root_dir.join(version);
        Self {
            branch_dir: release_dir.join(GIT_DEPS_CHECKOUT),
            output_file: release_dir.join(GIT_DEPS_FILE),
            diff_file: xwalk_dir.join(GIT_DEPS_DIFF),
            release_dir,
        }
    }
}

/// Produce the patched `.DEPS.git` for `version`. Returns the branch it was
/// taken from.
pub fn generate_git_deps(
    checkout: &dyn Checkout,
    layout: &GitDepsLayout,
    version: &str,
) -> Result<String> {
    let release_url = defaults::release_url(version);
    info!("Fetching release {} with {}", version, checkout.tool());
    checkout.prepare(&release_url, &layout.release_dir, None)?;

    let branch = branch::resolve_branch(&layout.release_dir.join(RELEASE_DEPS_FILE), version)?;

    let branch_url = defaults::branch_src_url(&branch);
    info!("Fetching {} of branch {}", GIT_DEPS_FILE, branch);
    checkout.prepare_files(&branch_url, &layout.branch_dir, &[GIT_DEPS_FILE])?;

    let diff = fs::read_to_string(&layout.diff_file)?;
    patch::apply_to_file(
        &layout.branch_dir.join(GIT_DEPS_FILE),
        &diff,
        &layout.output_file,
    )?;

    Ok(branch)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::Error;
    use std::cell::RefCell;
    use tempfile::TempDir;

    /// A checkout that writes canned files instead of running a tool.
    pub(crate) struct FakeCheckout {
        pub release_deps: String,
        pub branch_deps_git: String,
        pub calls: RefCell<Vec<String>>,
    }

    impl FakeCheckout {
        pub(crate) fn new(release_deps: &str, branch_deps_git: &str) -> Self {
            Self {
                release_deps: release_deps.to_string(),
                branch_deps_git: branch_deps_git.to_string(),
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl Checkout for FakeCheckout {
        fn tool(&self) -> &str {
            "fake"
        }

        fn prepare(&self, url: &str, dest: &Path, revision: Option<&str>) -> Result<()> {
            self.calls
                .borrow_mut()
                .push(format!("prepare {} {:?}", url, revision));
            fs::create_dir_all(dest)?;
            fs::write(dest.join(RELEASE_DEPS_FILE), &self.release_deps)?;
            Ok(())
        }

        fn prepare_files(&self, url: &str, dest: &Path, files: &[&str]) -> Result<()> {
            self.calls
                .borrow_mut()
                .push(format!("prepare_files {} {:?}", url, files));
            fs::create_dir_all(dest)?;
            for file in files {
                fs::write(dest.join(file), &self.branch_deps_git)?;
            }
            Ok(())
        }
    }

    pub(crate) const RELEASE_DEPS: &str =
        "deps = {\n  'src': '/branches/chromium/1985@270796',\n}\n";
    pub(crate) const BRANCH_DEPS_GIT: &str = "vars = {\n  'webkit_rev': '1000',\n}\n";
    pub(crate) const DEPS_GIT_DIFF: &str = "--- .DEPS.git\n+++ .DEPS.git\n@@ -1,3 +1,3 @@\n vars = {\n-  'webkit_rev': '1000',\n+  'webkit_rev': '1001',\n }\n";

    fn setup(diff: &str) -> (TempDir, GitDepsLayout) {
        let temp_dir = TempDir::new().unwrap();
        let xwalk_dir = temp_dir.path().join("src/xwalk");
        fs::create_dir_all(xwalk_dir.join("tools")).unwrap();
        fs::write(xwalk_dir.join(GIT_DEPS_DIFF), diff).unwrap();
        let layout = GitDepsLayout::new(temp_dir.path(), &xwalk_dir, "36.0.1985.18");
        (temp_dir, layout)
    }

    #[test]
    fn test_layout_paths() {
        let layout = GitDepsLayout::new(Path::new("/w"), Path::new("/w/src/xwalk"), "40.0");
        assert_eq!(layout.release_dir, PathBuf::from("/w/40.0"));
        assert_eq!(layout.branch_dir, PathBuf::from("/w/40.0/deps_git"));
        assert_eq!(layout.output_file, PathBuf::from("/w/40.0/.DEPS.git"));
        assert_eq!(
            layout.diff_file,
            PathBuf::from("/w/src/xwalk/tools/DEPS_git.diff")
        );
    }

    #[test]
    fn test_generate_git_deps() {
        let (_temp_dir, layout) = setup(DEPS_GIT_DIFF);
        let checkout = FakeCheckout::new(RELEASE_DEPS, BRANCH_DEPS_GIT);

        let branch = generate_git_deps(&checkout, &layout, "36.0.1985.18").unwrap();

        assert_eq!(branch, "1985");
        assert_eq!(
            fs::read_to_string(&layout.output_file).unwrap(),
            "vars = {\n  'webkit_rev': '1001',\n}\n"
        );
        // The branch checkout itself stays pristine.
        assert_eq!(
            fs::read_to_string(layout.branch_dir.join(GIT_DEPS_FILE)).unwrap(),
            BRANCH_DEPS_GIT
        );
        assert_eq!(
            *checkout.calls.borrow(),
            vec![
                "prepare http://src.chromium.org/svn/releases/36.0.1985.18 None".to_string(),
                "prepare_files http://src.chromium.org/svn/branches/1985/src/ [\".DEPS.git\"]"
                    .to_string(),
            ]
        );
    }

    #[test]
    fn test_unbranched_release_stops_before_branch_checkout() {
        let (_temp_dir, layout) = setup(DEPS_GIT_DIFF);
        let checkout = FakeCheckout::new("deps = {}\n", BRANCH_DEPS_GIT);

        let err = generate_git_deps(&checkout, &layout, "36.0.1985.18").unwrap_err();

        assert!(matches!(err, Error::BranchNotFound { .. }));
        assert_eq!(checkout.calls.borrow().len(), 1);
        assert!(!layout.output_file.exists());
    }

    #[test]
    fn test_stale_diff_fails() {
        let (_temp_dir, layout) = setup(DEPS_GIT_DIFF);
        let checkout = FakeCheckout::new(RELEASE_DEPS, "vars = {\n  'webkit_rev': '999',\n}\n");

        let err = generate_git_deps(&checkout, &layout, "36.0.1985.18").unwrap_err();

        assert!(matches!(err, Error::PatchApply { .. }));
        assert!(!layout.output_file.exists());
    }
}
