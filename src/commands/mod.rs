//! # CLI Command Implementations
//!
//! One module per subcommand. Each holds an `Args` struct derived with
//! `clap` and an `execute` function that calls into the `xwalk_sync`
//! library and reports progress on stdout.

pub mod completions;
pub mod fetch_chromium;
pub mod generate;
