//! # xwalk-sync
//!
//! Generates `.gclient-xwalk`, the gclient checkout descriptor for a
//! Crosswalk tree, from the `DEPS.xwalk` manifest kept in the xwalk project.
//!
//! ## Quick Example
//!
//! ```
//! use std::collections::BTreeSet;
//! use std::path::Path;
//! use xwalk_sync::descriptor::{self, GenerateOptions, SyncMode};
//! use xwalk_sync::manifest;
//!
//! let source = r#"
//! chromium_version = '36.0.1985.18'
//! deps_xwalk = {
//!   'src': 'https://github.com/crosswalk-project/chromium-crosswalk.git@abc',
//!   'src/v8': 'https://github.com/crosswalk-project/v8-crosswalk.git@def',
//! }
//! vars_xwalk = {}
//! "#;
//! let manifest = manifest::parse(source, Path::new("DEPS.xwalk")).unwrap();
//!
//! let ignores: BTreeSet<String> = ["src/v8".to_string()].into();
//! let file = descriptor::generate(manifest, &ignores, SyncMode::Svn, &GenerateOptions::default());
//!
//! assert_eq!(file.solutions[0].name, "36.0.1985.18");
//! assert_eq!(file.solutions[0].custom_deps["src/v8"], None);
//! assert!(file.render().starts_with("solutions = [\n"));
//! ```
//!
//! ## Core Concepts
//!
//! - **Deps language (`syntax`)**: the restricted, data-only language that both
//!   the manifest and the descriptor are written in.
//! - **Manifest (`manifest`)**: the loaded and validated `DEPS.xwalk`.
//! - **Ignore policy (`ignore`)**: paths that are never synced.
//! - **Descriptor (`descriptor`)**: the solved `.gclient-xwalk` contents.
//! - **Git mode (`git_deps`, `branch`, `patch`, `checkout`)**: fetching and
//!   patching `.DEPS.git` when chromium is synced over git.
//! - **Orchestration (`orchestrator`)**: the end-to-end pipelines run by the
//!   command-line tool.

pub mod branch;
pub mod checkout;
pub mod defaults;
pub mod descriptor;
pub mod error;
pub mod git_deps;
pub mod ignore;
pub mod manifest;
pub mod orchestrator;
pub mod output;
pub mod patch;
pub mod settings;
pub mod syntax;
