//! # Orchestrator
//!
//! Runs the single-shot pipelines behind the CLI commands.
//!
//! `generate` builds `.gclient-xwalk`:
//!
//! 1. **Load** the deps manifest.
//! 2. **Ignore**: resolve the ignore set from the environment or defaults.
//! 3. **Git deps** (git mode only): fetch and patch `.DEPS.git`.
//! 4. **Describe**: build the solved descriptor.
//! 5. **Write** the descriptor, replacing any previous file.
//!
//! `fetch_chromium` checks out `src` from the chromium-crosswalk git mirror
//! at the revision the manifest pins, and does nothing outside git mode.
//!
//! Steps run strictly in order and the first failure aborts the pipeline.
//! The descriptor is only written after every other step succeeded.

use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::checkout::Checkout;
use crate::defaults::{self, CHROMIUM_CROSSWALK_URL, GCLIENT_FILE, MANIFEST_FILE, ROOT_DEPENDENCY};
use crate::descriptor::{self, GclientFile, GenerateOptions, SyncMode};
use crate::error::{Error, Result};
use crate::git_deps::{self, GitDepsLayout};
use crate::ignore;
use crate::manifest::{self, CROSSWALK_POINT_BINDING};
use crate::settings::Settings;

/// Where the pipeline reads from and writes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    /// The overlay project, `<root>/src/xwalk`.
    pub xwalk_dir: PathBuf,
    /// The checkout root, two levels above `xwalk_dir`.
    pub root_dir: PathBuf,
}

impl Workspace {
    pub fn new(xwalk_dir: impl Into<PathBuf>) -> Self {
        let xwalk_dir = xwalk_dir.into();
        Self {
            root_dir: defaults::root_dir(&xwalk_dir),
            xwalk_dir,
        }
    }

    /// Default manifest location.
    pub fn manifest_file(&self) -> PathBuf {
        self.xwalk_dir.join(MANIFEST_FILE)
    }

    /// Location of the generated descriptor.
    pub fn gclient_file(&self) -> PathBuf {
        self.root_dir.join(GCLIENT_FILE)
    }
}

/// Inputs of one `generate` run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateRequest {
    /// Manifest override; defaults to [`Workspace::manifest_file`].
    pub deps_file: Option<PathBuf>,
    /// Value for `cache_dir`.
    pub cache_dir: Option<PathBuf>,
    /// Force git mode regardless of the environment.
    pub use_git: bool,
    /// Build the descriptor but do not write it.
    pub dry_run: bool,
}

impl GenerateRequest {
    /// Git mode is on when requested here or through the environment.
    pub fn mode(&self, settings: &Settings) -> SyncMode {
        if self.use_git || settings.use_git {
            SyncMode::Git
        } else {
            SyncMode::Svn
        }
    }
}

/// What a `generate` run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generated {
    /// Path of the descriptor (written unless the run was a dry run).
    pub path: PathBuf,
    pub descriptor: GclientFile,
    /// Branch `.DEPS.git` was taken from, in git mode.
    pub branch: Option<String>,
}

/// Run the `generate` pipeline.
///
/// `checkout` is only used in git mode and must be provided there.
pub fn generate(
    workspace: &Workspace,
    request: &GenerateRequest,
    settings: &Settings,
    checkout: Option<&dyn Checkout>,
) -> Result<Generated> {
    let mode = request.mode(settings);
    let deps_file = request
        .deps_file
        .clone()
        .unwrap_or_else(|| workspace.manifest_file());

    let manifest = manifest::load(&deps_file)?;
    let ignores = ignore::resolve_ignores(settings.sync_ignore.as_deref());
    let version = manifest.chromium_version.clone();
    debug!("Generating for chromium {} in {:?} mode", version, mode);

    let branch = match mode {
        SyncMode::Git => {
            let checkout = checkout.ok_or_else(|| Error::ToolNotFound {
                tool: "svn".to_string(),
                message: "git mode needs a subversion client to fetch release metadata"
                    .to_string(),
            })?;
            let layout = GitDepsLayout::new(&workspace.root_dir, &workspace.xwalk_dir, &version);
            Some(git_deps::generate_git_deps(checkout, &layout, &version)?)
        }
        SyncMode::Svn => None,
    };

    let options = GenerateOptions {
        target_os: if settings.os_android {
            vec!["android".to_string()]
        } else {
            Vec::new()
        },
        cache_dir: request.cache_dir.clone(),
    };
    let descriptor = descriptor::generate(manifest, &ignores, mode, &options);

    let path = workspace.gclient_file();
    if request.dry_run {
        info!("Dry run, not writing {}", path.display());
    } else {
        descriptor.write(&path)?;
    }

    Ok(Generated {
        path,
        descriptor,
        branch,
    })
}

/// What a `fetch_chromium` run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fetched {
    /// Not in git mode; nothing was fetched.
    Skipped,
    /// `dest` was checked out at `revision`.
    CheckedOut { dest: PathBuf, revision: String },
}

/// Check out `<root>/src` at the manifest's `chromium_crosswalk_point`.
///
/// `checkout` is only called in git mode.
pub fn fetch_chromium(
    workspace: &Workspace,
    settings: &Settings,
    use_git: bool,
    checkout: &dyn Checkout,
) -> Result<Fetched> {
    if !(use_git || settings.use_git) {
        debug!("Not in git mode, skipping chromium fetch");
        return Ok(Fetched::Skipped);
    }

    let deps_file = workspace.manifest_file();
    let manifest = manifest::load(&deps_file)?;
    let revision = manifest
        .chromium_crosswalk_point
        .ok_or_else(|| missing_point(&deps_file))?;

    let dest = workspace.root_dir.join(ROOT_DEPENDENCY);
    info!("Checking out {} at {}", CHROMIUM_CROSSWALK_URL, revision);
    checkout.prepare(CHROMIUM_CROSSWALK_URL, &dest, Some(&revision))?;

    Ok(Fetched::CheckedOut { dest, revision })
}

fn missing_point(deps_file: &Path) -> Error {
    Error::ManifestMalformed {
        path: deps_file.to_path_buf(),
        message: format!("missing binding '{}'", CROSSWALK_POINT_BINDING),
        hint: Some(format!(
            "Add `{} = '<revision>'` to fetch src through git",
            CROSSWALK_POINT_BINDING
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git_deps::tests::{FakeCheckout, BRANCH_DEPS_GIT, DEPS_GIT_DIFF, RELEASE_DEPS};
    use std::fs;
    use tempfile::TempDir;

    const MANIFEST: &str = "chromium_version = '40.0'\nchromium_crosswalk_point = 'abc123'\ndeps_xwalk = {\n  'src': 'url1',\n  'src/foo': 'url2',\n}\nvars_xwalk = {}\n";

    fn workspace_with(manifest: &str) -> (TempDir, Workspace) {
        let temp_dir = TempDir::new().unwrap();
        let xwalk_dir = temp_dir.path().join("src").join("xwalk");
        fs::create_dir_all(xwalk_dir.join("tools")).unwrap();
        fs::write(xwalk_dir.join(MANIFEST_FILE), manifest).unwrap();
        fs::write(xwalk_dir.join("tools/DEPS_git.diff"), DEPS_GIT_DIFF).unwrap();
        let workspace = Workspace::new(xwalk_dir);
        (temp_dir, workspace)
    }

    fn ignoring(paths: &str) -> Settings {
        Settings {
            sync_ignore: Some(paths.to_string()),
            ..Settings::default()
        }
    }

    #[test]
    fn test_workspace_layout() {
        let workspace = Workspace::new("/w/src/xwalk");
        assert_eq!(workspace.root_dir, PathBuf::from("/w"));
        assert_eq!(workspace.manifest_file(), PathBuf::from("/w/src/xwalk/DEPS.xwalk"));
        assert_eq!(workspace.gclient_file(), PathBuf::from("/w/.gclient-xwalk"));
    }

    #[test]
    fn test_generate_end_to_end() {
        let (temp_dir, workspace) = workspace_with(MANIFEST);

        let generated = generate(
            &workspace,
            &GenerateRequest::default(),
            &ignoring("src/foo"),
            None,
        )
        .unwrap();

        assert_eq!(generated.path, temp_dir.path().join(".gclient-xwalk"));
        assert_eq!(generated.branch, None);
        let solution = &generated.descriptor.solutions[0];
        assert_eq!(solution.name, "40.0");
        assert_eq!(solution.url, "http://src.chromium.org/svn/releases/40.0");
        assert_eq!(solution.custom_deps["src"].as_deref(), Some("url1"));
        assert_eq!(solution.custom_deps["src/foo"], None);
        assert_eq!(solution.custom_deps.len(), 2);

        let written = fs::read_to_string(&generated.path).unwrap();
        assert_eq!(written, generated.descriptor.render());
    }

    #[test]
    fn test_generate_uses_default_ignores() {
        let (_temp_dir, workspace) = workspace_with(MANIFEST);

        let generated = generate(
            &workspace,
            &GenerateRequest::default(),
            &Settings::default(),
            None,
        )
        .unwrap();

        let deps = &generated.descriptor.solutions[0].custom_deps;
        assert_eq!(deps["depot_tools"], None);
        assert_eq!(deps["src/foo"].as_deref(), Some("url2"));
    }

    #[test]
    fn test_generate_twice_is_byte_identical() {
        let (_temp_dir, workspace) = workspace_with(MANIFEST);
        let settings = ignoring("src/foo");

        let first = generate(&workspace, &GenerateRequest::default(), &settings, None).unwrap();
        let first_bytes = fs::read(&first.path).unwrap();
        let second = generate(&workspace, &GenerateRequest::default(), &settings, None).unwrap();
        let second_bytes = fs::read(&second.path).unwrap();

        assert_eq!(first_bytes, second_bytes);
    }

    #[test]
    fn test_generate_dry_run_writes_nothing() {
        let (_temp_dir, workspace) = workspace_with(MANIFEST);
        let request = GenerateRequest {
            dry_run: true,
            ..GenerateRequest::default()
        };

        let generated = generate(&workspace, &request, &Settings::default(), None).unwrap();

        assert!(!generated.path.exists());
    }

    #[test]
    fn test_generate_deps_override_and_options() {
        let (temp_dir, workspace) = workspace_with(MANIFEST);
        let other = temp_dir.path().join("other.deps");
        fs::write(
            &other,
            "deps_xwalk = {'src': 'x'}\nvars_xwalk = {'v': 'w'}\nchromium_version = '41.0'\n",
        )
        .unwrap();
        let request = GenerateRequest {
            deps_file: Some(other),
            cache_dir: Some(PathBuf::from("/cache")),
            ..GenerateRequest::default()
        };
        let settings = Settings {
            os_android: true,
            ..ignoring("none")
        };

        let generated = generate(&workspace, &request, &settings, None).unwrap();

        let rendered = fs::read_to_string(&generated.path).unwrap();
        assert!(rendered.contains("'name': '41.0'"));
        assert!(rendered.contains("'custom_vars': {"));
        assert!(rendered.contains("target_os = ['android']\n"));
        assert!(rendered.ends_with("cache_dir = '/cache'\n"));
    }

    #[test]
    fn test_generate_missing_manifest() {
        let temp_dir = TempDir::new().unwrap();
        let workspace = Workspace::new(temp_dir.path().join("src/xwalk"));

        let err = generate(
            &workspace,
            &GenerateRequest::default(),
            &Settings::default(),
            None,
        )
        .unwrap_err();

        assert!(matches!(err, Error::ManifestNotFound { .. }));
    }

    #[test]
    fn test_generate_git_mode() {
        let (temp_dir, workspace) = workspace_with(MANIFEST);
        let checkout = FakeCheckout::new(RELEASE_DEPS, BRANCH_DEPS_GIT);
        let request = GenerateRequest {
            use_git: true,
            ..GenerateRequest::default()
        };

        let generated = generate(
            &workspace,
            &request,
            &ignoring("src/foo"),
            Some(&checkout),
        )
        .unwrap();

        assert_eq!(generated.branch.as_deref(), Some("1985"));
        let solution = &generated.descriptor.solutions[0];
        assert_eq!(solution.custom_deps["src"], None);
        assert_eq!(solution.deps_file.as_deref(), Some(".DEPS.git"));
        assert!(temp_dir.path().join("40.0/.DEPS.git").exists());
        assert!(generated.path.exists());
    }

    #[test]
    fn test_generate_git_mode_from_environment() {
        let (_temp_dir, workspace) = workspace_with(MANIFEST);
        let checkout = FakeCheckout::new(RELEASE_DEPS, BRANCH_DEPS_GIT);
        let settings = Settings {
            use_git: true,
            ..Settings::default()
        };

        let generated = generate(
            &workspace,
            &GenerateRequest::default(),
            &settings,
            Some(&checkout),
        )
        .unwrap();

        assert_eq!(generated.descriptor.solutions[0].deps_file.as_deref(), Some(".DEPS.git"));
    }

    #[test]
    fn test_generate_git_mode_without_branch_writes_nothing() {
        let (_temp_dir, workspace) = workspace_with(MANIFEST);
        let checkout = FakeCheckout::new("deps = {}\n", BRANCH_DEPS_GIT);
        let request = GenerateRequest {
            use_git: true,
            ..GenerateRequest::default()
        };

        let err = generate(&workspace, &request, &Settings::default(), Some(&checkout))
            .unwrap_err();

        assert!(matches!(err, Error::BranchNotFound { .. }));
        assert!(!workspace.gclient_file().exists());
    }

    #[test]
    fn test_generate_git_mode_patch_failure_writes_nothing() {
        let (_temp_dir, workspace) = workspace_with(MANIFEST);
        let drifted = BRANCH_DEPS_GIT.replace("1000", "999");
        let checkout = FakeCheckout::new(RELEASE_DEPS, &drifted);
        let request = GenerateRequest {
            use_git: true,
            ..GenerateRequest::default()
        };

        let err = generate(&workspace, &request, &Settings::default(), Some(&checkout))
            .unwrap_err();

        assert!(matches!(err, Error::PatchApply { .. }), "{err}");
        assert!(!workspace.gclient_file().exists());
    }

    #[test]
    fn test_generate_git_mode_without_checkout() {
        let (_temp_dir, workspace) = workspace_with(MANIFEST);
        let request = GenerateRequest {
            use_git: true,
            ..GenerateRequest::default()
        };

        let err = generate(&workspace, &request, &Settings::default(), None).unwrap_err();

        assert!(matches!(err, Error::ToolNotFound { .. }));
        assert!(!workspace.gclient_file().exists());
    }

    #[test]
    fn test_fetch_chromium_skipped_without_git_mode() {
        let temp_dir = TempDir::new().unwrap();
        let workspace = Workspace::new(temp_dir.path().join("src/xwalk"));
        let checkout = FakeCheckout::new(RELEASE_DEPS, BRANCH_DEPS_GIT);

        let fetched = fetch_chromium(&workspace, &Settings::default(), false, &checkout).unwrap();

        assert_eq!(fetched, Fetched::Skipped);
        assert!(checkout.calls.borrow().is_empty());
    }

    #[test]
    fn test_fetch_chromium_checks_out_pinned_revision() {
        let (temp_dir, workspace) = workspace_with(MANIFEST);
        let checkout = FakeCheckout::new(RELEASE_DEPS, BRANCH_DEPS_GIT);

        let fetched = fetch_chromium(&workspace, &Settings::default(), true, &checkout).unwrap();

        assert_eq!(
            fetched,
            Fetched::CheckedOut {
                dest: temp_dir.path().join("src"),
                revision: "abc123".to_string(),
            }
        );
        assert_eq!(
            *checkout.calls.borrow(),
            vec![format!(
                "prepare {} Some(\"abc123\")",
                CHROMIUM_CROSSWALK_URL
            )]
        );
    }

    #[test]
    fn test_fetch_chromium_needs_crosswalk_point() {
        let (_temp_dir, workspace) = workspace_with(
            "deps_xwalk = {'src': 'x'}\nvars_xwalk = {}\nchromium_version = '41.0'\n",
        );
        let checkout = FakeCheckout::new(RELEASE_DEPS, BRANCH_DEPS_GIT);
        let settings = Settings {
            use_git: true,
            ..Settings::default()
        };

        let err = fetch_chromium(&workspace, &settings, false, &checkout).unwrap_err();

        assert!(err.to_string().contains(CROSSWALK_POINT_BINDING));
        assert!(checkout.calls.borrow().is_empty());
    }
}
