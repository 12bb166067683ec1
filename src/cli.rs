//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::{Parser, Subcommand};
use log::LevelFilter;

use crate::commands;

/// xwalk-sync - Generate the gclient checkout descriptor for a Crosswalk tree
#[derive(Parser, Debug)]
#[command(name = "xwalk-sync")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(
        long,
        global = true,
        value_name = "LEVEL",
        default_value = "warn",
        value_parser = ["off", "error", "warn", "info", "debug", "trace"]
    )]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate .gclient-xwalk from the DEPS.xwalk manifest
    Generate(commands::generate::GenerateArgs),

    /// Check out chromium-crosswalk into src when syncing over git
    FetchChromium(commands::fetch_chromium::FetchChromiumArgs),

    /// Generate shell completion scripts
    Completions(commands::completions::CompletionsArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        init_logging(self.log_level.parse().unwrap_or(LevelFilter::Warn));

        match self.command {
            Commands::Generate(args) => commands::generate::execute(args, &self.color),
            Commands::FetchChromium(args) => {
                commands::fetch_chromium::execute(args, &self.color)
            }
            Commands::Completions(args) => commands::completions::execute(args),
        }
    }
}

/// `RUST_LOG`, when set, takes precedence over `--log-level`.
fn init_logging(level: LevelFilter) {
    env_logger::Builder::new()
        .filter_level(level)
        .parse_env("RUST_LOG")
        .format_timestamp(None)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_defaults() {
        let cli = Cli::try_parse_from(["xwalk-sync", "generate"]).unwrap();
        assert_eq!(cli.color, "auto");
        assert_eq!(cli.log_level, "warn");
        assert!(matches!(cli.command, Commands::Generate(_)));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "xwalk-sync",
            "fetch-chromium",
            "--log-level",
            "debug",
            "--color",
            "never",
        ])
        .unwrap();
        assert_eq!(cli.log_level, "debug");
        assert_eq!(cli.color, "never");
        assert!(matches!(cli.command, Commands::FetchChromium(_)));
    }

    #[test]
    fn test_invalid_log_level_is_rejected() {
        assert!(Cli::try_parse_from(["xwalk-sync", "--log-level", "loud", "generate"]).is_err());
    }
}
