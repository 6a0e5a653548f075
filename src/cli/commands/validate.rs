//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the examgen configuration file.

use crate::config::load_config;
use clap::Args;
use secrecy::ExposeSecret;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // Loading validates every section
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Configuration validation failed");
                println!("   Error: {e}");
                println!();
                return Ok(2);
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Drive API: {}", config.google.drive_base_url);
        println!("  Sheets API: {}", config.google.sheets_base_url);
        println!(
            "  Access Token: {}",
            if config.google.access_token.expose_secret().is_empty() {
                "(empty)"
            } else {
                "set"
            }
        );
        println!(
            "  Retry: {} attempts from {}ms",
            config.retry.max_attempts, config.retry.initial_delay_ms
        );
        println!(
            "  Class List: {} ({})",
            config.roster.class_list_name, config.roster.range
        );
        println!(
            "  Override Column: {}",
            config
                .roster
                .override_column
                .map_or_else(|| "none".to_string(), |c| c.to_string())
        );
        println!("  Workspaces Folder: {}", config.exam.exams_root_name);
        println!("  Share Role: {}", config.sharing.role);
        println!("  Clock Tick: {}s", config.sharing.tick_seconds);
        println!("  Override Policy: {}", config.sharing.override_policy);
        println!();
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_validate_missing_file_is_config_error() {
        let args = ValidateArgs {};
        let code = args.execute("does-not-exist-examgen.toml").await.unwrap();
        assert_eq!(code, 2);
    }

    #[tokio::test]
    async fn test_validate_good_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("examgen.toml");
        std::fs::write(&path, "[google]\naccess_token = \"abc\"\n").unwrap();

        let args = ValidateArgs {};
        let code = args.execute(&path.display().to_string()).await.unwrap();
        assert_eq!(code, 0);
    }
}
