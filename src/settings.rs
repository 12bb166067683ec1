//! # Environment Settings
//!
//! The generator's behavior can be tuned through a handful of environment
//! variables. They are read exactly once, into [`Settings`], which is then
//! passed by reference to everything that needs it. Tests build `Settings`
//! from a closure instead of touching the process environment.
//!
//! | Variable            | Effect                                             |
//! |---------------------|----------------------------------------------------|
//! | `XWALK_SYNC_IGNORE` | `:`/`;`-separated paths to leave out of the sync   |
//! | `XWALK_OS_ANDROID`  | non-empty value adds `target_os = ['android']`     |
//! | `XWALK_USE_GIT`     | set (any value) to fetch through git mirrors       |

use std::env;

pub const SYNC_IGNORE_VAR: &str = "XWALK_SYNC_IGNORE";
pub const OS_ANDROID_VAR: &str = "XWALK_OS_ANDROID";
pub const USE_GIT_VAR: &str = "XWALK_USE_GIT";

/// Options taken from the environment at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    /// Raw value of `XWALK_SYNC_IGNORE`, if set and non-empty.
    pub sync_ignore: Option<String>,
    /// Whether the checkout targets Android.
    pub os_android: bool,
    /// Whether git mode was requested through the environment.
    pub use_git: bool,
}

impl Settings {
    /// Read settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build settings from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            sync_ignore: lookup(SYNC_IGNORE_VAR).filter(|v| !v.is_empty()),
            os_android: lookup(OS_ANDROID_VAR).is_some_and(|v| !v.is_empty()),
            use_git: lookup(USE_GIT_VAR).is_some(),
        }
    }
}
