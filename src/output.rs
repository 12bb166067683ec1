//! # Terminal Output
//!
//! Controls whether command output uses colors and status markers.
//!
//! `--color=always|never` decides outright. With `--color=auto` the usual
//! conventions apply: `NO_COLOR` (any value) and `CLICOLOR=0` disable color,
//! `CLICOLOR_FORCE` enables it for non-terminals, `TERM=dumb` disables it, and
//! otherwise the terminal's own capabilities decide.

use std::env;

use console::{Style, StyledObject};

/// Output preferences for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputConfig {
    pub use_color: bool,
}

impl OutputConfig {
    /// Resolve the `--color` flag against the process environment.
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        Self::from_lookup(color_flag, |key| env::var(key).ok(), || {
            console::Term::stdout().features().colors_supported()
        })
    }

    /// Resolve the `--color` flag with `lookup` standing in for the
    /// environment and `terminal` reporting whether stdout supports color.
    pub fn from_lookup<F, T>(color_flag: &str, lookup: F, terminal: T) -> Self
    where
        F: Fn(&str) -> Option<String>,
        T: FnOnce() -> bool,
    {
        let use_color = match color_flag.to_ascii_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => detect(&lookup, terminal),
        };
        Self { use_color }
    }

    /// Create a configuration with colors always disabled.
    #[cfg(test)]
    pub fn plain() -> Self {
        Self { use_color: false }
    }

    /// Render `text` in `style` when colors are on.
    pub fn paint<'a>(&self, style: &Style, text: &'a str) -> StyledObject<&'a str> {
        style.apply_to(text).force_styling(self.use_color)
    }

    /// Marker for a successful step.
    pub fn ok(&self) -> &'static str {
        marker(self, "✅", "[OK]")
    }

    /// Marker for a failed step.
    pub fn err(&self) -> &'static str {
        marker(self, "❌", "[ERR]")
    }

    /// Marker for a skipped or informational step.
    pub fn info(&self) -> &'static str {
        marker(self, "ℹ️", "[INFO]")
    }
}

fn detect<F, T>(lookup: &F, terminal: T) -> bool
where
    F: Fn(&str) -> Option<String>,
    T: FnOnce() -> bool,
{
    if lookup("NO_COLOR").is_some() {
        return false;
    }
    if lookup("CLICOLOR").is_some_and(|v| v == "0") {
        return false;
    }
    if lookup("CLICOLOR_FORCE").is_some_and(|v| v != "0" && !v.is_empty()) {
        return true;
    }
    if lookup("TERM").is_some_and(|v| v == "dumb") {
        return false;
    }
    terminal()
}

/// `fancy` when colors are on, `plain` otherwise.
pub fn marker<'a>(config: &OutputConfig, fancy: &'a str, plain: &'a str) -> &'a str {
    if config.use_color {
        fancy
    } else {
        plain
    }
}
