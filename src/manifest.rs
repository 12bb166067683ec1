//! # Dependency Manifest
//!
//! Loading of `DEPS.xwalk`, the manifest that pins the chromium release and
//! lists the dependency overrides the overlay project needs.
//!
//! The file is written in the declarative language from [`crate::syntax`]
//! and must bind three names:
//!
//! - `deps_xwalk`: dict of dependency path to source URL (or `None` to skip
//!   the path),
//! - `vars_xwalk`: dict of gclient variables,
//! - `chromium_version`: the chromium release label.
//!
//! `chromium_crosswalk_point` is optional and names the chromium-crosswalk
//! revision used when `src` is fetched through git.
//!
//! Any other bindings are evaluated in the loader's own namespace, so they
//! can be referenced by the required ones, and are then dropped.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use log::debug;

use crate::defaults::ROOT_DEPENDENCY;
use crate::error::{Error, Result};
use crate::syntax::{self, Value};

pub const DEPS_BINDING: &str = "deps_xwalk";
pub const VARS_BINDING: &str = "vars_xwalk";
pub const VERSION_BINDING: &str = "chromium_version";
pub const CROSSWALK_POINT_BINDING: &str = "chromium_crosswalk_point";

/// The evaluated contents of a deps manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    /// Dependency path to source URL. `None` excludes the path from the sync.
    pub deps: BTreeMap<String, Option<String>>,
    /// gclient variables passed through as `custom_vars`.
    pub vars: BTreeMap<String, Value>,
    /// Chromium release label, e.g. `36.0.1985.18`.
    pub chromium_version: String,
    /// chromium-crosswalk revision for git checkouts of `src`.
    pub chromium_crosswalk_point: Option<String>,
}

impl Manifest {
    /// Source URL of the root dependency, if it is not excluded.
    pub fn root_source(&self) -> Option<&str> {
        self.deps.get(ROOT_DEPENDENCY).and_then(|s| s.as_deref())
    }

    /// Exclude every path in `ignores`, overriding any source location.
    ///
    /// Paths that are not in the manifest are added as exclusions.
    pub fn apply_ignores(&mut self, ignores: &BTreeSet<String>) {
        for path in ignores {
            self.deps.insert(path.clone(), None);
        }
    }
}

/// Load and validate the manifest at `path`.
pub fn load(path: &Path) -> Result<Manifest> {
    if !path.exists() {
        return Err(Error::ManifestNotFound {
            path: path.to_path_buf(),
        });
    }
    debug!("Reading deps file {}", path.display());
    let source = fs::read_to_string(path)?;
    parse(&source, path)
}

/// Evaluate manifest `source`. `path` is only used in error messages.
pub fn parse(source: &str, path: &Path) -> Result<Manifest> {
    let malformed = |message: String, hint: Option<String>| Error::ManifestMalformed {
        path: path.to_path_buf(),
        message,
        hint,
    };

    let mut bindings = syntax::parse(source).map_err(|e| malformed(e.to_string(), None))?;

    let mut take = |name: &str, example: &str| -> Result<Value> {
        bindings.remove(name).ok_or_else(|| {
            malformed(
                format!("missing binding '{}'", name),
                Some(format!("Add `{} = {}` to the deps file", name, example)),
            )
        })
    };

    let deps = take(DEPS_BINDING, "{'src': '<url>'}")?;
    let vars = take(VARS_BINDING, "{}")?;
    let version = take(VERSION_BINDING, "'<release>'")?;
    let crosswalk_point = bindings.remove(CROSSWALK_POINT_BINDING);

    let deps = match deps {
        Value::Dict(map) => map
            .into_iter()
            .map(|(dep_path, source)| match source {
                Value::Str(url) => Ok((dep_path, Some(url))),
                Value::None => Ok((dep_path, None)),
                other => Err(malformed(
                    format!(
                        "'{}' in {} must be a str or None, found '{}'",
                        dep_path,
                        DEPS_BINDING,
                        other.type_name()
                    ),
                    None,
                )),
            })
            .collect::<Result<BTreeMap<_, _>>>()?,
        other => return Err(wrong_type(DEPS_BINDING, "dict", &other, path)),
    };

    let vars = match vars {
        Value::Dict(map) => map,
        other => return Err(wrong_type(VARS_BINDING, "dict", &other, path)),
    };

    let chromium_version = match version {
        Value::Str(v) if !v.is_empty() => v,
        Value::Str(_) => {
            return Err(malformed(
                format!("'{}' must not be empty", VERSION_BINDING),
                None,
            ))
        }
        other => return Err(wrong_type(VERSION_BINDING, "str", &other, path)),
    };

    let chromium_crosswalk_point = match crosswalk_point {
        None | Some(Value::None) => None,
        Some(Value::Str(point)) => Some(point),
        Some(other) => return Err(wrong_type(CROSSWALK_POINT_BINDING, "str", &other, path)),
    };

    if !deps.contains_key(ROOT_DEPENDENCY) {
        return Err(Error::MissingRootDependency {
            root: ROOT_DEPENDENCY.to_string(),
            path: path.to_path_buf(),
        });
    }

    debug!(
        "Loaded {} dependencies and {} variables for chromium {}",
        deps.len(),
        vars.len(),
        chromium_version
    );

    Ok(Manifest {
        deps,
        vars,
        chromium_version,
        chromium_crosswalk_point,
    })
}

fn wrong_type(name: &str, expected: &str, found: &Value, path: &Path) -> Error {
    Error::ManifestMalformed {
        path: path.to_path_buf(),
        message: format!(
            "'{}' must be a {}, found '{}'",
            name,
            expected,
            found.type_name()
        ),
        hint: None,
    }
}
