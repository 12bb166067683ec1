//! Shared test utilities for the CLI end-to-end tests.
//!
//! Add `mod common;` to a test file and `use common::prelude::*;`.

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::manifests;
    pub use super::TestFixture;
}

/// `DEPS.xwalk` snippets.
#[allow(dead_code)]
pub mod manifests {
    /// Two dependencies, no variables.
    pub const BASIC: &str = r#"
chromium_version = '40.0'
chromium_crosswalk_point = 'abc123'
deps_xwalk = {
  'src': 'https://github.com/crosswalk-project/chromium-crosswalk.git@abc123',
  'src/foo': 'https://example.com/foo.git@1',
}
vars_xwalk = {}
"#;

    /// Variables and a computed dependency url.
    pub const WITH_VARS: &str = r#"
crosswalk_git = 'https://github.com/crosswalk-project'
chromium_version = '36.0.1985.18'
deps_xwalk = {
  'src': crosswalk_git + '/chromium-crosswalk.git@abc',
  'src/v8': '%s/v8-crosswalk.git@%s' % (crosswalk_git, 'def'),
}
vars_xwalk = {
  'webkit_rev': '1000',
}
"#;

    /// No root dependency.
    pub const NO_ROOT: &str = r#"
chromium_version = '40.0'
deps_xwalk = {'src/foo': 'https://example.com/foo.git'}
vars_xwalk = {}
"#;

    /// Unbalanced braces.
    pub const BROKEN: &str = "chromium_version = '40.0'\ndeps_xwalk = {\n";
}

/// A checkout root with `src/xwalk` inside a temporary directory.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

impl TestFixture {
    /// An empty `<root>/src/xwalk`.
    pub fn new() -> Self {
        let temp_dir = assert_fs::TempDir::new().expect("Failed to create temp directory");
        temp_dir
            .child("src/xwalk")
            .create_dir_all()
            .expect("Failed to create xwalk directory");
        Self { temp_dir }
    }

    /// Write `src/xwalk/DEPS.xwalk`.
    pub fn with_manifest(self, content: &str) -> Self {
        self.with_file("src/xwalk/DEPS.xwalk", content)
    }

    /// Write a file relative to the root.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// A path relative to the root.
    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }

    pub fn xwalk_dir(&self) -> PathBuf {
        self.root().join("src/xwalk")
    }

    /// The generated descriptor.
    pub fn gclient_file(&self) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(".gclient-xwalk")
    }

    /// A command with a clean `XWALK_*` environment, running in the
    /// xwalk directory.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("xwalk-sync");
        cmd.current_dir(self.xwalk_dir())
            .env_remove("XWALK_SYNC_IGNORE")
            .env_remove("XWALK_OS_ANDROID")
            .env_remove("XWALK_USE_GIT")
            .env_remove("RUST_LOG")
            .arg("--color")
            .arg("never");
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}
