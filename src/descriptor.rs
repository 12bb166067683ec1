//! # Solved Checkout Descriptor
//!
//! The descriptor is what gclient reads from `.gclient-xwalk`: one solution
//! naming the chromium release, the per-path overrides from the manifest,
//! and a few optional top-level settings.
//!
//! [`generate`] is a pure transformation from a loaded [`Manifest`] to a
//! [`GclientFile`]. Writing is a separate step ([`GclientFile::write`]) so
//! that nothing reaches the disk until every earlier step has succeeded.

use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;
use std::path::{Path, PathBuf};

use log::debug;
use tempfile::NamedTempFile;

use crate::defaults::{self, GIT_DEPS_FILE, ROOT_DEPENDENCY};
use crate::error::Result;
use crate::manifest::Manifest;
use crate::syntax::{render_binding, Value};

/// How chromium's own dependencies are fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncMode {
    /// gclient follows the release's subversion `DEPS`.
    #[default]
    Svn,
    /// gclient follows `.DEPS.git`; `src` is fetched separately.
    Git,
}

/// Optional top-level settings of the generated file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateOptions {
    /// Written as `target_os` when non-empty.
    pub target_os: Vec<String>,
    /// Written as `cache_dir` when set.
    pub cache_dir: Option<PathBuf>,
}

/// One gclient solution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    pub name: String,
    pub url: String,
    pub custom_deps: BTreeMap<String, Option<String>>,
    pub custom_vars: Option<BTreeMap<String, Value>>,
    pub deps_file: Option<String>,
}

impl Solution {
    fn to_value(&self) -> Value {
        let mut map = BTreeMap::new();
        map.insert("name".to_string(), Value::from(self.name.as_str()));
        map.insert("url".to_string(), Value::from(self.url.as_str()));
        map.insert(
            "custom_deps".to_string(),
            Value::Dict(
                self.custom_deps
                    .iter()
                    .map(|(path, source)| (path.clone(), Value::from(source.clone())))
                    .collect(),
            ),
        );
        if let Some(vars) = &self.custom_vars {
            map.insert("custom_vars".to_string(), Value::Dict(vars.clone()));
        }
        if let Some(deps_file) = &self.deps_file {
            map.insert("deps_file".to_string(), Value::from(deps_file.as_str()));
        }
        Value::Dict(map)
    }
}

/// The full contents of `.gclient-xwalk`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GclientFile {
    pub solutions: Vec<Solution>,
    pub target_os: Option<Vec<String>>,
    pub cache_dir: Option<String>,
}

impl GclientFile {
    /// Serialize in the deps language. Equal descriptors render to
    /// identical text.
    pub fn render(&self) -> String {
        let solutions = Value::List(self.solutions.iter().map(Solution::to_value).collect());
        let mut out = render_binding("solutions", &solutions);
        if let Some(target_os) = &self.target_os {
            let list = Value::List(target_os.iter().map(|os| Value::from(os.as_str())).collect());
            out.push_str(&render_binding("target_os", &list));
        }
        if let Some(cache_dir) = &self.cache_dir {
            out.push_str(&render_binding("cache_dir", &Value::from(cache_dir.as_str())));
        }
        out
    }

    /// Replace the file at `path` with the rendered descriptor.
    ///
    /// The text goes to a temporary file next to `path` first and is renamed
    /// over it, so a failed write never leaves a truncated descriptor.
    pub fn write(&self, path: &Path) -> Result<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut file = NamedTempFile::new_in(dir)?;
        file.write_all(self.render().as_bytes())?;
        file.persist(path).map_err(|e| e.error)?;
        debug!("Wrote {}", path.display());
        Ok(())
    }
}

/// Build the descriptor for `manifest`.
///
/// Steps, in order: exclude every path in `ignores`; in git mode exclude
/// `src` (it is fetched on its own) and point gclient at `.DEPS.git`; name
/// the solution after the release; attach variables, target OS and cache
/// directory when present.
pub fn generate(
    mut manifest: Manifest,
    ignores: &BTreeSet<String>,
    mode: SyncMode,
    options: &GenerateOptions,
) -> GclientFile {
    manifest.apply_ignores(ignores);

    let mut deps_file = None;
    if mode == SyncMode::Git {
        manifest.deps.insert(ROOT_DEPENDENCY.to_string(), None);
        deps_file = Some(GIT_DEPS_FILE.to_string());
    }

    let solution = Solution {
        url: defaults::release_url(&manifest.chromium_version),
        name: manifest.chromium_version,
        custom_deps: manifest.deps,
        custom_vars: (!manifest.vars.is_empty()).then_some(manifest.vars),
        deps_file,
    };

    GclientFile {
        solutions: vec![solution],
        target_os: (!options.target_os.is_empty()).then(|| options.target_os.clone()),
        cache_dir: options
            .cache_dir
            .as_ref()
            .map(|dir| dir.to_string_lossy().into_owned()),
    }
}
