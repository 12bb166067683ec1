//! Ignore policy: which dependency paths are left out of the sync.
//!
//! Without an override the policy is the list of auxiliary build, test and
//! tooling subtrees recommended upstream. An override replaces that list
//! entirely.

use std::collections::BTreeSet;

use log::debug;

/// Paths excluded when `XWALK_SYNC_IGNORE` is not set.
pub const DEFAULT_IGNORES: &[&str] = &[
    "build",
    "build/scripts/command_wrapper/bin",
    "build/scripts/gsd_generate_index",
    "build/scripts/private/data/reliability",
    "build/scripts/tools/deps2git",
    "build/third_party/cbuildbot_chromite",
    "build/third_party/gsutil",
    "build/third_party/lighttpd",
    "build/third_party/swarm_client",
    "build/third_party/xvfb",
    "build/xvfb",
    "commit-queue",
    "depot_tools",
    "src/webkit/data/layout_tests/LayoutTests",
    "src/third_party/WebKit/LayoutTests",
    "src/content/test/data/layout_tests/LayoutTests",
    "src/chrome/tools/test/reference_build/chrome_win",
    "src/chrome_frame/tools/test/reference_build/chrome_win",
    "src/chrome/tools/test/reference_build/chrome_linux",
    "src/chrome/tools/test/reference_build/chrome_mac",
    "src/third_party/chromite",
    "src/third_party/hunspell_dictionaries",
    "src/third_party/pyelftools",
];

/// Compute the ignore set from an optional override.
///
/// The override is a list separated by `:` or `;` (both may appear in the
/// same value). Empty segments are skipped; nothing else is validated.
pub fn resolve_ignores(override_value: Option<&str>) -> BTreeSet<String> {
    match override_value.filter(|v| !v.is_empty()) {
        None => {
            debug!("Using {} default ignore paths", DEFAULT_IGNORES.len());
            DEFAULT_IGNORES.iter().map(|p| p.to_string()).collect()
        }
        Some(value) => {
            let ignores: BTreeSet<String> = value
                .replace(':', ";")
                .split(';')
                .filter(|p| !p.is_empty())
                .map(str::to_string)
                .collect();
            debug!("Using {} ignore paths from the environment", ignores.len());
            ignores
        }
    }
}
