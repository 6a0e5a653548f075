//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::ExamGenConfig;
use super::secret::secret_string;
use crate::domain::errors::ExamGenError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into ExamGenConfig
/// 4. Applies environment variable overrides (EXAMGEN_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns a `Configuration` error if the file is missing or unreadable, if a
/// referenced environment variable is unset, or if parsing or validation fails.
///
/// # Examples
///
/// ```no_run
/// use examgen::config::loader::load_config;
///
/// let config = load_config("examgen.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<ExamGenConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ExamGenError::Configuration(format!(
            "Configuration file not found: {} (run `examgen init` to create one)",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        ExamGenError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    parse_config(&contents)
}

/// Parses and validates configuration text
///
/// Shared by [`load_config`] and the `validate-config` command.
pub fn parse_config(contents: &str) -> Result<ExamGenConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: ExamGenConfig = toml::from_str(&contents)
        .map_err(|e| ExamGenError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config);

    config.validate().map_err(|e| {
        ExamGenError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are copied untouched.
///
/// # Errors
///
/// Returns an error listing every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| ExamGenError::Other(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::new();
    let mut missing_vars = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{}}}", var_name);
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.contains(&var_name.to_string()) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(ExamGenError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides using the EXAMGEN_* prefix
///
/// Variables follow the pattern EXAMGEN_<SECTION>_<KEY>, for example
/// EXAMGEN_SHARING_ROLE. Unparseable numeric values are ignored.
fn apply_env_overrides(config: &mut ExamGenConfig) {
    if let Ok(val) = std::env::var("EXAMGEN_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    // Google overrides
    if let Ok(val) = std::env::var("EXAMGEN_GOOGLE_ACCESS_TOKEN") {
        config.google.access_token = secret_string(val);
    }
    if let Ok(val) = std::env::var("EXAMGEN_GOOGLE_DRIVE_BASE_URL") {
        config.google.drive_base_url = val;
    }
    if let Ok(val) = std::env::var("EXAMGEN_GOOGLE_SHEETS_BASE_URL") {
        config.google.sheets_base_url = val;
    }
    if let Ok(val) = std::env::var("EXAMGEN_GOOGLE_BATCH_CONCURRENCY") {
        if let Ok(concurrency) = val.parse() {
            config.google.batch_concurrency = concurrency;
        }
    }

    // Retry overrides
    if let Ok(val) = std::env::var("EXAMGEN_RETRY_MAX_ATTEMPTS") {
        if let Ok(attempts) = val.parse() {
            config.retry.max_attempts = attempts;
        }
    }
    if let Ok(val) = std::env::var("EXAMGEN_RETRY_INITIAL_DELAY_MS") {
        if let Ok(delay) = val.parse() {
            config.retry.initial_delay_ms = delay;
        }
    }
    if let Ok(val) = std::env::var("EXAMGEN_RETRY_FAIL_FAST_ON_PERMANENT") {
        config.retry.fail_fast_on_permanent = val.parse().unwrap_or(false);
    }

    // Exam overrides
    if let Ok(val) = std::env::var("EXAMGEN_EXAM_PARALLEL_STUDENTS") {
        if let Ok(parallel) = val.parse() {
            config.exam.parallel_students = parallel;
        }
    }

    // Sharing overrides
    if let Ok(val) = std::env::var("EXAMGEN_SHARING_ROLE") {
        config.sharing.role = val;
    }
    if let Ok(val) = std::env::var("EXAMGEN_SHARING_TICK_SECONDS") {
        if let Ok(seconds) = val.parse() {
            config.sharing.tick_seconds = seconds;
        }
    }
    if let Ok(val) = std::env::var("EXAMGEN_SHARING_OVERRIDE_POLICY") {
        if let Ok(policy) = val.parse() {
            config.sharing.override_policy = policy;
        }
    }

    // Logging overrides
    if let Ok(val) = std::env::var("EXAMGEN_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("EXAMGEN_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
}
