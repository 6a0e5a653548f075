//! Configuration schema types
//!
//! This module defines the configuration structure that maps to `examgen.toml`.

use crate::config::SecretString;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Main examgen configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamGenConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Google Drive / Sheets connection
    pub google: GoogleConfig,

    /// Retry policy for single remote calls
    #[serde(default)]
    pub retry: RetryConfig,

    /// Class roster layout
    #[serde(default)]
    pub roster: RosterConfig,

    /// Exam folder conventions
    #[serde(default)]
    pub exam: ExamConfig,

    /// Sharing and revocation settings
    #[serde(default)]
    pub sharing: SharingConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ExamGenConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.google.validate()?;
        self.retry.validate()?;
        self.roster.validate()?;
        self.exam.validate()?;
        self.sharing.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Google API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleConfig {
    /// OAuth bearer token with Drive and Sheets scopes
    /// Stored securely in memory and automatically zeroized on drop
    pub access_token: SecretString,

    /// Drive v3 REST base URL
    #[serde(default = "default_drive_base_url")]
    pub drive_base_url: String,

    /// Sheets v4 REST base URL
    #[serde(default = "default_sheets_base_url")]
    pub sheets_base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Number of mutations of one batch in flight at the same time
    #[serde(default = "default_batch_concurrency")]
    pub batch_concurrency: usize,
}

impl GoogleConfig {
    fn validate(&self) -> Result<(), String> {
        use secrecy::ExposeSecret;

        if self.access_token.expose_secret().is_empty() {
            return Err("google.access_token cannot be empty".to_string());
        }

        for (key, value) in [
            ("google.drive_base_url", &self.drive_base_url),
            ("google.sheets_base_url", &self.sheets_base_url),
        ] {
            if !value.starts_with("http://") && !value.starts_with("https://") {
                return Err(format!("{key} must start with http:// or https://"));
            }
        }

        if self.timeout_seconds == 0 {
            return Err("google.timeout_seconds must be > 0".to_string());
        }

        if self.batch_concurrency == 0 || self.batch_concurrency > 100 {
            return Err(format!(
                "google.batch_concurrency must be between 1 and 100, got {}",
                self.batch_concurrency
            ));
        }

        Ok(())
    }
}

/// Retry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts, the first one included
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay before the first retry in milliseconds
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    /// Maximum delay in milliseconds
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Backoff multiplier
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    /// Give up immediately on not-found / permission-denied style failures
    #[serde(default)]
    pub fail_fast_on_permanent: bool,
}

impl RetryConfig {
    fn validate(&self) -> Result<(), String> {
        if self.max_attempts == 0 || self.max_attempts > 20 {
            return Err(format!(
                "retry.max_attempts must be between 1 and 20, got {}",
                self.max_attempts
            ));
        }

        if self.backoff_multiplier < 1.0 {
            return Err(format!(
                "retry.backoff_multiplier must be >= 1.0, got {}",
                self.backoff_multiplier
            ));
        }

        if self.max_delay_ms < self.initial_delay_ms {
            return Err("retry.max_delay_ms must be >= retry.initial_delay_ms".to_string());
        }

        Ok(())
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
            fail_fast_on_permanent: false,
        }
    }
}

/// Class roster layout (zero-based column indices)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterConfig {
    /// Name of the roster spreadsheet inside the exam folder
    #[serde(default = "default_class_list_name")]
    pub class_list_name: String,

    /// A1 range read from the roster
    #[serde(default = "default_roster_range")]
    pub range: String,

    /// Leading rows to skip (column titles)
    #[serde(default = "default_header_rows")]
    pub header_rows: usize,

    /// Student ID column
    #[serde(default)]
    pub id_column: usize,

    /// Last name column
    #[serde(default = "default_last_name_column")]
    pub last_name_column: usize,

    /// First name column
    #[serde(default = "default_first_name_column")]
    pub first_name_column: usize,

    /// Email column
    #[serde(default = "default_email_column")]
    pub email_column: usize,

    /// Override duration column (minutes); blank cells mean no override
    #[serde(default = "default_override_column")]
    pub override_column: Option<usize>,
}

impl RosterConfig {
    fn validate(&self) -> Result<(), String> {
        if self.class_list_name.trim().is_empty() {
            return Err("roster.class_list_name cannot be empty".to_string());
        }
        if !self.range.contains('!') {
            return Err(format!(
                "roster.range must be an A1 range such as 'Sheet1!A1:K10000', got '{}'",
                self.range
            ));
        }

        let mut columns = vec![
            self.id_column,
            self.last_name_column,
            self.first_name_column,
            self.email_column,
        ];
        columns.extend(self.override_column);
        let mut unique = columns.clone();
        unique.sort_unstable();
        unique.dedup();
        if unique.len() != columns.len() {
            return Err("roster column indices must be distinct".to_string());
        }

        Ok(())
    }

    /// Smallest row width that contains every required column
    pub fn required_width(&self) -> usize {
        [
            self.id_column,
            self.last_name_column,
            self.first_name_column,
            self.email_column,
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
            + 1
    }
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            class_list_name: default_class_list_name(),
            range: default_roster_range(),
            header_rows: default_header_rows(),
            id_column: 0,
            last_name_column: default_last_name_column(),
            first_name_column: default_first_name_column(),
            email_column: default_email_column(),
            override_column: default_override_column(),
        }
    }
}

/// Exam folder conventions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamConfig {
    /// Substring identifying question folders inside the exam folder
    #[serde(default = "default_question_folder_prefix")]
    pub question_folder_prefix: String,

    /// Folder (inside the exam folder) holding every student workspace
    #[serde(default = "default_exams_root_name")]
    pub exams_root_name: String,

    /// Title prefix of the variant ledger spreadsheet
    #[serde(default = "default_ledger_title")]
    pub ledger_title: String,

    /// Number of students assembled at the same time
    #[serde(default = "default_parallel_students")]
    pub parallel_students: usize,
}

impl ExamConfig {
    fn validate(&self) -> Result<(), String> {
        if self.question_folder_prefix.is_empty() {
            return Err("exam.question_folder_prefix cannot be empty".to_string());
        }
        if self.exams_root_name.trim().is_empty() {
            return Err("exam.exams_root_name cannot be empty".to_string());
        }
        if self.parallel_students == 0 || self.parallel_students > 64 {
            return Err(format!(
                "exam.parallel_students must be between 1 and 64, got {}",
                self.parallel_students
            ));
        }
        Ok(())
    }
}

impl Default for ExamConfig {
    fn default() -> Self {
        Self {
            question_folder_prefix: default_question_folder_prefix(),
            exams_root_name: default_exams_root_name(),
            ledger_title: default_ledger_title(),
            parallel_students: default_parallel_students(),
        }
    }
}

/// How a student's override duration interacts with the default duration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OverridePolicy {
    /// The override always sets the deadline, even when sharing is otherwise indefinite
    #[default]
    Always,
    /// The override only replaces a finite default duration
    FiniteOnly,
}

impl fmt::Display for OverridePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverridePolicy::Always => write!(f, "always"),
            OverridePolicy::FiniteOnly => write!(f, "finite_only"),
        }
    }
}

impl FromStr for OverridePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "always" => Ok(OverridePolicy::Always),
            "finite_only" => Ok(OverridePolicy::FiniteOnly),
            other => Err(format!(
                "Invalid override policy '{other}'. Must be one of: always, finite_only"
            )),
        }
    }
}

/// Sharing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharingConfig {
    /// Drive role granted on the workspace (reader, commenter, writer)
    #[serde(default = "default_share_role")]
    pub role: String,

    /// Wall-clock seconds per virtual minute
    #[serde(default = "default_tick_seconds")]
    pub tick_seconds: u64,

    /// Override deadline policy
    #[serde(default)]
    pub override_policy: OverridePolicy,

    /// Let Drive email the student when access is granted
    #[serde(default)]
    pub send_notification_email: bool,
}

impl SharingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_roles = ["reader", "commenter", "writer"];
        if !valid_roles.contains(&self.role.as_str()) {
            return Err(format!(
                "Invalid sharing.role '{}'. Must be one of: {}",
                self.role,
                valid_roles.join(", ")
            ));
        }
        if self.tick_seconds == 0 {
            return Err("sharing.tick_seconds must be > 0".to_string());
        }
        Ok(())
    }
}

impl Default for SharingConfig {
    fn default() -> Self {
        Self {
            role: default_share_role(),
            tick_seconds: default_tick_seconds(),
            override_policy: OverridePolicy::default(),
            send_notification_email: false,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local JSON file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when local logging is enabled".to_string());
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_drive_base_url() -> String {
    "https://www.googleapis.com/drive/v3".to_string()
}

fn default_sheets_base_url() -> String {
    "https://sheets.googleapis.com/v4".to_string()
}

fn default_timeout_seconds() -> u64 {
    60
}

fn default_batch_concurrency() -> usize {
    8
}

fn default_max_attempts() -> u32 {
    10
}

fn default_initial_delay_ms() -> u64 {
    1000
}

fn default_max_delay_ms() -> u64 {
    600_000
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_class_list_name() -> String {
    "ClassList".to_string()
}

fn default_roster_range() -> String {
    "Sheet1!A1:K10000".to_string()
}

fn default_header_rows() -> usize {
    1
}

fn default_last_name_column() -> usize {
    1
}

fn default_first_name_column() -> usize {
    2
}

fn default_email_column() -> usize {
    7
}

fn default_override_column() -> Option<usize> {
    Some(10)
}

fn default_question_folder_prefix() -> String {
    "Q".to_string()
}

fn default_exams_root_name() -> String {
    "Student Exams".to_string()
}

fn default_ledger_title() -> String {
    "Variant Ledger".to_string()
}

fn default_parallel_students() -> usize {
    4
}

fn default_share_role() -> String {
    "writer".to_string()
}

fn default_tick_seconds() -> u64 {
    60
}

fn default_local_path() -> String {
    "./logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
