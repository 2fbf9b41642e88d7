//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::GardenConfig;
use crate::config::secret_string;
use crate::domain::errors::GardenError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into GardenConfig
/// 4. Applies environment variable overrides (GARDEN_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns a configuration error if any step fails.
///
/// # Examples
///
/// ```no_run
/// use garden_sync::config::loader::load_config;
///
/// let config = load_config("garden.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<GardenConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(GardenError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        GardenError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    parse_config(&contents)
}

/// Parses configuration from TOML text (substitution, overrides, validation)
pub fn parse_config(contents: &str) -> Result<GardenConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: GardenConfig = toml::from_str(&contents)
        .map_err(|e| GardenError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config);

    config.validate().map_err(|e| {
        GardenError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| GardenError::Other(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::new();
    let mut missing_vars: Vec<String> = Vec::new();

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
                    let placeholder = format!("${{{var_name}}}");
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(GardenError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides using GARDEN_* prefix
///
/// Environment variables follow the pattern GARDEN_<SECTION>_<KEY>,
/// for example GARDEN_GITHUB_TOKEN or GARDEN_EXPORT_PATH.
fn apply_env_overrides(config: &mut GardenConfig) {
    if let Ok(val) = std::env::var("GARDEN_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Ok(val) = std::env::var("GARDEN_APPLICATION_DRY_RUN") {
        config.application.dry_run = val.parse().unwrap_or(false);
    }

    if let Ok(val) = std::env::var("GARDEN_VAULT_ROOT") {
        config.vault.root = val;
    }

    if let Ok(val) = std::env::var("GARDEN_GITHUB_REPO") {
        config.github.repo = val;
    }
    if let Ok(val) = std::env::var("GARDEN_GITHUB_USERNAME") {
        config.github.username = val;
    }
    if let Ok(val) = std::env::var("GARDEN_GITHUB_TOKEN") {
        config.github.token = Some(secret_string(val));
    }
    if let Ok(val) = std::env::var("GARDEN_GITHUB_BRANCH") {
        config.github.branch = val;
    }
    if let Ok(val) = std::env::var("GARDEN_GITHUB_API_BASE_URL") {
        config.github.api_base_url = val;
    }

    if let Ok(val) = std::env::var("GARDEN_EXPORT_PATH") {
        config.export.path = Some(val);
    }

    if let Ok(val) = std::env::var("GARDEN_PUBLISH_OPERATION_TIMEOUT_SECONDS") {
        if let Ok(secs) = val.parse() {
            config.publish.operation_timeout_seconds = secs;
        }
    }

    if let Ok(val) = std::env::var("GARDEN_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("GARDEN_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
}
