//! # Error Handling
//!
//! This module defines the centralized error type for `xwalk-sync`. It uses
//! the `thiserror` library to build one `Error` enum covering every failure
//! the generator can hit, with messages that name the failing step.
//!
//! ## Key Components
//!
//! - **`Error`**: The enum of all failure modes. Each variant carries enough
//!   context (paths, versions, commands) to explain the failure to a user.
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`.
//!
//! Every error is fatal to the current run. Nothing in this crate retries:
//! the generator is a single-shot pipeline and the first failure aborts it.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for xwalk-sync operations
#[derive(Error, Debug)]
pub enum Error {
    /// The dependency manifest does not exist.
    #[error("Deps file does not exist ({})", path.display())]
    ManifestNotFound { path: PathBuf },

    /// The manifest was read but could not be evaluated into the expected
    /// bindings.
    #[error("Malformed deps file {}: {message}{}", path.display(), hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    ManifestMalformed {
        path: PathBuf,
        message: String,
        /// Optional hint for how to fix the manifest
        hint: Option<String>,
    },

    /// The manifest's dependency table has no entry for the root path.
    #[error("'{root}' not specified in deps file ({})", path.display())]
    MissingRootDependency { root: String, path: PathBuf },

    /// The release `DEPS` file names no chromium branch.
    ///
    /// This is terminal: an unbranched release cannot be fetched in git mode.
    #[error("No chromium branch found for release {version} in {}", deps_file.display())]
    BranchNotFound { version: String, deps_file: PathBuf },

    /// A unified diff did not apply cleanly.
    #[error("Failed to apply patch to {file}: {message}")]
    PatchApply { file: String, message: String },

    /// An external checkout tool exited unsuccessfully.
    #[error("{tool} failed: {command} - {stderr}")]
    ExternalTool {
        tool: String,
        command: String,
        stderr: String,
    },

    /// A required external tool could not be located.
    #[error("Can't find {tool}: {message}")]
    ToolNotFound { tool: String, message: String },

    /// The declarative mini-language could not be parsed.
    #[error("Syntax error at line {line}, column {column}: {message}")]
    Syntax {
        line: usize,
        column: usize,
        message: String,
    },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
