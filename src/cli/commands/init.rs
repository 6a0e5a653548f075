//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "examgen.toml")]
    pub output: String,

    /// Include every option with comments
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing examgen configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2);
        }

        let config_content = if self.with_examples {
            Self::generate_config_with_examples()
        } else {
            Self::generate_minimal_config()
        };

        match fs::write(&self.output, config_content) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} to match your class list layout", self.output);
                println!("  2. Put an OAuth access token in .env:");
                println!("     EXAMGEN_ACCESS_TOKEN=ya29...");
                println!("  3. Validate configuration: examgen validate-config");
                println!("  4. Build workspaces: examgen generate <exam folder>");
                println!("  5. Start the exam: examgen share <exam folder> --minutes 90");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {}", e);
                Ok(5)
            }
        }
    }

    /// Generate minimal configuration
    fn generate_minimal_config() -> String {
        r#"# examgen configuration

[application]
log_level = "info"

[google]
access_token = "${EXAMGEN_ACCESS_TOKEN}"

[roster]
class_list_name = "ClassList"
email_column = 7
override_column = 10

[sharing]
role = "writer"
override_policy = "always"

[logging]
local_enabled = false
"#
        .to_string()
    }

    /// Generate configuration with examples and comments
    fn generate_config_with_examples() -> String {
        r#"# examgen configuration
#
# Every key below is shown with its default. Values of the form ${VAR} are
# read from the environment (or a .env file), and any key can be overridden
# with EXAMGEN_<SECTION>_<KEY>, e.g. EXAMGEN_SHARING_TICK_SECONDS=60.

# ============================================================================
# Application Settings
# ============================================================================
[application]
# Log level (trace, debug, info, warn, error)
log_level = "info"

# ============================================================================
# Google APIs
# ============================================================================
[google]
# OAuth 2.0 bearer token with Drive and Sheets scopes
access_token = "${EXAMGEN_ACCESS_TOKEN}"

drive_base_url = "https://www.googleapis.com/drive/v3"
sheets_base_url = "https://sheets.googleapis.com/v4"

# Per-request timeout
timeout_seconds = 60

# Permission mutations in flight at once during a bulk share or revoke (1-100)
batch_concurrency = 8

# ============================================================================
# Retry policy for single remote calls
# ============================================================================
[retry]
# Attempts per call (1-20); the delay doubles after each failure
max_attempts = 10
initial_delay_ms = 1000
max_delay_ms = 600000
backoff_multiplier = 2.0

# Stop retrying on errors that cannot succeed (404, 403, bad request)
fail_fast_on_permanent = false

# ============================================================================
# Class list
# ============================================================================
[roster]
# Spreadsheet name inside the exam folder
class_list_name = "ClassList"
range = "Sheet1!A1:K10000"
header_rows = 1

# Zero-based column indices
id_column = 0
last_name_column = 1
first_name_column = 2
email_column = 7

# Per-student exam length in minutes; remove to ignore overrides
override_column = 10

# ============================================================================
# Exam folder layout
# ============================================================================
[exam]
# Sub-folders whose name contains this text are questions
question_folder_prefix = "Q"

# Folder created inside the exam folder holding one workspace per student
exams_root_name = "Student Exams"

# Title prefix of the variant ledger spreadsheet
ledger_title = "Variant Ledger"

# Students assembled concurrently (1-64)
parallel_students = 4

# ============================================================================
# Sharing
# ============================================================================
[sharing]
# reader | commenter | writer
role = "writer"

# Seconds per clock minute
tick_seconds = 60

# always: an override replaces --minutes, and grants a timed share even when
#         --minutes is omitted
# finite_only: overrides only apply when --minutes is given
override_policy = "always"

# Let Drive email students when a workspace is shared
send_notification_email = false

# ============================================================================
# Logging
# ============================================================================
[logging]
# JSON log files next to the console output
local_enabled = false
local_path = "./logs"

# daily | hourly | never
local_rotation = "daily"
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;

    #[test]
    fn test_init_args_defaults() {
        let args = InitArgs {
            output: "examgen.toml".to_string(),
            with_examples: false,
            force: false,
        };

        assert_eq!(args.output, "examgen.toml");
        assert!(!args.with_examples);
        assert!(!args.force);
    }

    #[test]
    fn test_generated_configs_parse() {
        std::env::set_var("EXAMGEN_ACCESS_TOKEN", "init-test-token");
        for content in [
            InitArgs::generate_minimal_config(),
            InitArgs::generate_config_with_examples(),
        ] {
            let config = parse_config(&content).unwrap();
            assert_eq!(config.roster.override_column, Some(10));
            assert_eq!(config.sharing.role, "writer");
        }
    }

    #[tokio::test]
    async fn test_init_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("examgen.toml");
        std::fs::write(&path, "existing").unwrap();

        let args = InitArgs {
            output: path.display().to_string(),
            with_examples: false,
            force: false,
        };
        assert_eq!(args.execute().await.unwrap(), 2);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "existing");
    }

    #[tokio::test]
    async fn test_init_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("examgen.toml");

        let args = InitArgs {
            output: path.display().to_string(),
            with_examples: true,
            force: false,
        };
        assert_eq!(args.execute().await.unwrap(), 0);
        assert!(std::fs::read_to_string(&path).unwrap().contains("[sharing]"));
    }
}
