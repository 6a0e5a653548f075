//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for examgen using clap.

pub mod commands;

use clap::{Args, Parser, Subcommand};

/// examgen - Randomized exam generation and timed sharing
#[derive(Parser, Debug)]
#[command(name = "examgen")]
#[command(version, about, long_about = None)]
#[command(author = "Examgen Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "examgen.toml", env = "EXAMGEN_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "EXAMGEN_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Draw a variant per question for each student and build their workspaces
    Generate(commands::generate::GenerateArgs),

    /// Share workspaces now and revoke them when each student's time is up
    Share(commands::share::ShareArgs),

    /// Revoke workspace access now
    Unshare(commands::unshare::UnshareArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

impl Commands {
    /// Whether the command talks to Google and so needs a loaded configuration
    pub fn needs_config(&self) -> bool {
        matches!(
            self,
            Commands::Generate(_) | Commands::Share(_) | Commands::Unshare(_)
        )
    }
}

/// Exam folder and student selection shared by the run commands
#[derive(Args, Debug, Clone)]
pub struct FolderArgs {
    /// Name of the exam folder in Drive
    pub folder: String,

    /// Only these student ids (comma-separated)
    #[arg(long, value_delimiter = ',', value_name = "IDS")]
    pub only: Vec<String>,

    /// Every student except these ids (comma-separated)
    #[arg(long, value_delimiter = ',', value_name = "IDS", conflicts_with = "only")]
    pub except: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_generate() {
        let cli = Cli::parse_from(["examgen", "generate", "Midterm"]);
        assert_eq!(cli.config, "examgen.toml");
        match cli.command {
            Commands::Generate(args) => {
                assert_eq!(args.target.folder, "Midterm");
                assert!(args.target.only.is_empty());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_cli_parse_with_config() {
        let cli = Cli::parse_from(["examgen", "--config", "custom.toml", "generate", "Midterm"]);
        assert_eq!(cli.config, "custom.toml");
    }

    #[test]
    fn test_cli_parse_with_log_level() {
        let cli = Cli::parse_from(["examgen", "--log-level", "debug", "unshare", "Midterm"]);
        assert_eq!(cli.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_cli_parse_share_with_minutes_and_only() {
        let cli = Cli::parse_from([
            "examgen", "share", "Midterm", "--minutes", "90", "--only", "17,23",
        ]);
        match cli.command {
            Commands::Share(args) => {
                assert_eq!(args.minutes, Some(90));
                assert_eq!(args.target.only, vec!["17", "23"]);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_cli_only_conflicts_with_except() {
        let result = Cli::try_parse_from([
            "examgen", "generate", "Midterm", "--only", "1", "--except", "2",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_parse_validate_config() {
        let cli = Cli::parse_from(["examgen", "validate-config"]);
        assert!(matches!(cli.command, Commands::ValidateConfig(_)));
        assert!(!cli.command.needs_config());
    }

    #[test]
    fn test_cli_parse_init() {
        let cli = Cli::parse_from(["examgen", "init"]);
        assert!(matches!(cli.command, Commands::Init(_)));
    }

    #[test]
    fn test_cli_requires_folder() {
        assert!(Cli::try_parse_from(["examgen", "share"]).is_err());
    }
}
