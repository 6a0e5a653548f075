//! Configuration management for examgen.
//!
//! This module provides TOML-based configuration loading, parsing, and validation.
//!
//! # Overview
//!
//! examgen uses a TOML configuration file with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `EXAMGEN_<SECTION>_<KEY>` environment overrides
//! - Default values for optional settings
//! - Validation of every section on load
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use examgen::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("examgen.toml")?;
//!
//! println!("Drive API: {}", config.google.drive_base_url);
//! println!("Tick: {}s", config.sharing.tick_seconds);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Application settings (log level)
//! - [`GoogleConfig`] - Drive/Sheets endpoints, token and request limits
//! - [`RetryConfig`] - Backoff policy for single remote calls
//! - [`RosterConfig`] - Class list name, range and column layout
//! - [`ExamConfig`] - Question folder and workspace conventions
//! - [`SharingConfig`] - Role, clock cadence and override policy
//! - [`LoggingConfig`] - Local JSON log files
//!
//! # Example Configuration
//!
//! ```toml
//! [google]
//! access_token = "${EXAMGEN_ACCESS_TOKEN}"
//!
//! [roster]
//! email_column = 7
//! override_column = 10
//!
//! [sharing]
//! role = "writer"
//! override_policy = "always"
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::{load_config, parse_config};
pub use schema::{
    ApplicationConfig, ExamConfig, ExamGenConfig, GoogleConfig, LoggingConfig, OverridePolicy,
    RetryConfig, RosterConfig, SharingConfig,
};
pub use secret::{secret_string, SecretString, SecretValue};
