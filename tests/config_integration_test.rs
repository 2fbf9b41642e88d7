//! Integration tests for configuration loading and validation
//!
//! Note: Tests that modify environment variables should be run with --test-threads=1
//! to avoid interference between tests.

use garden_sync::config::load_config;
use secrecy::ExposeSecret;
use std::io::Write;
use std::sync::Mutex;
use tempfile::NamedTempFile;

// Mutex to serialize tests that modify environment variables
static ENV_MUTEX: Mutex<()> = Mutex::new(());

/// Helper function to clean up environment variables
fn cleanup_env_vars() {
    std::env::remove_var("GARDEN_APPLICATION_LOG_LEVEL");
    std::env::remove_var("GARDEN_APPLICATION_DRY_RUN");
    std::env::remove_var("GARDEN_VAULT_ROOT");
    std::env::remove_var("GARDEN_GITHUB_TOKEN");
    std::env::remove_var("GARDEN_GITHUB_BRANCH");
    std::env::remove_var("GARDEN_EXPORT_PATH");
    std::env::remove_var("GARDEN_PUBLISH_OPERATION_TIMEOUT_SECONDS");
    std::env::remove_var("TEST_GARDEN_TOKEN");
}

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_load_complete_config() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let file = write_config(
        r#"
[application]
log_level = "debug"
dry_run = true

[vault]
root = "/home/alice/vault"

[github]
repo = "digital-garden"
username = "alice"
token = "ghp_complete"
branch = "published"
api_base_url = "https://github.example.com/api/v3"
timeout_seconds = 45

[export]
path = "/srv/garden"
slugify_paths = true

[publish]
operation_timeout_seconds = 20

[[publish.path_rewrite_rules]]
from = "Public"
to = ""

[[publish.path_rewrite_rules]]
from = "Blog/Drafts"
to = "posts"

[logging]
local_enabled = true
local_path = "/tmp/garden-logs"
local_rotation = "hourly"
"#,
    );

    let config = load_config(file.path()).unwrap();

    assert_eq!(config.application.log_level, "debug");
    assert!(config.application.dry_run);
    assert_eq!(config.vault.root, "/home/alice/vault");

    assert_eq!(config.github.repo, "digital-garden");
    assert_eq!(config.github.username, "alice");
    assert_eq!(config.github.branch, "published");
    assert_eq!(config.github.api_base_url, "https://github.example.com/api/v3");
    assert_eq!(config.github.timeout_seconds, 45);
    let token = config.github.token.as_ref().unwrap();
    let token: &str = token.expose_secret().as_ref();
    assert_eq!(token, "ghp_complete");
    assert!(config.github.validate_credentials().is_ok());

    assert_eq!(config.export.path.as_deref(), Some("/srv/garden"));
    assert!(config.export.slugify_paths);

    assert_eq!(config.publish.operation_timeout_seconds, 20);
    assert_eq!(config.publish.path_rewrite_rules.len(), 2);
    assert_eq!(config.publish.path_rewrite_rules[1].to, "posts");

    assert!(config.logging.local_enabled);
    assert_eq!(config.logging.local_rotation, "hourly");
}

#[test]
fn test_load_minimal_config_with_defaults() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let file = write_config("[vault]\nroot = \"/vault\"\n");
    let config = load_config(file.path()).unwrap();

    assert_eq!(config.application.log_level, "info");
    assert!(!config.application.dry_run);
    assert_eq!(config.github.branch, "main");
    assert_eq!(config.github.api_base_url, "https://api.github.com");
    assert!(config.github.token.is_none());
    assert!(config.export.path.is_none());
    assert!(!config.export.slugify_paths);
    assert!(config.publish.path_rewrite_rules.is_empty());
    assert!(!config.logging.local_enabled);

    // Loading succeeds without credentials; remote operations check them later
    let err = config.github.validate_credentials().unwrap_err();
    assert!(err.contains("GitHub repo"));
    assert!(config.export.validate_target().is_err());
}

#[test]
fn test_env_var_substitution() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();
    std::env::set_var("TEST_GARDEN_TOKEN", "ghp_from_env");

    let file = write_config(
        r#"
[vault]
root = "/vault"

[github]
repo = "garden"
username = "alice"
# token = "${NEVER_SET_IN_A_COMMENT}"
token = "${TEST_GARDEN_TOKEN}"
"#,
    );

    let config = load_config(file.path()).unwrap();
    let token = config.github.token.as_ref().unwrap();
    let token: &str = token.expose_secret().as_ref();
    assert_eq!(token, "ghp_from_env");

    cleanup_env_vars();
}

#[test]
fn test_missing_substitution_variable_fails() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let file = write_config(
        r#"
[vault]
root = "/vault"

[github]
token = "${TEST_GARDEN_TOKEN}"
"#,
    );

    let err = load_config(file.path()).unwrap_err();
    assert!(err.to_string().contains("TEST_GARDEN_TOKEN"));
}

#[test]
fn test_env_var_overrides() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    std::env::set_var("GARDEN_APPLICATION_LOG_LEVEL", "warn");
    std::env::set_var("GARDEN_APPLICATION_DRY_RUN", "true");
    std::env::set_var("GARDEN_VAULT_ROOT", "/override/vault");
    std::env::set_var("GARDEN_GITHUB_TOKEN", "ghp_override");
    std::env::set_var("GARDEN_GITHUB_BRANCH", "gh-pages");
    std::env::set_var("GARDEN_EXPORT_PATH", "/override/export");
    std::env::set_var("GARDEN_PUBLISH_OPERATION_TIMEOUT_SECONDS", "5");

    let file = write_config(
        r#"
[application]
log_level = "info"

[vault]
root = "/vault"

[github]
repo = "garden"
username = "alice"
token = "ghp_file"
"#,
    );

    let config = load_config(file.path()).unwrap();

    assert_eq!(config.application.log_level, "warn");
    assert!(config.application.dry_run);
    assert_eq!(config.vault.root, "/override/vault");
    let token = config.github.token.as_ref().unwrap();
    let token: &str = token.expose_secret().as_ref();
    assert_eq!(token, "ghp_override");
    assert_eq!(config.github.branch, "gh-pages");
    assert_eq!(config.export.path.as_deref(), Some("/override/export"));
    assert_eq!(config.publish.operation_timeout_seconds, 5);

    cleanup_env_vars();
}

#[test]
fn test_invalid_config_validation() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let cases = [
        "[vault]\nroot = \"\"\n",
        "[application]\nlog_level = \"loud\"\n\n[vault]\nroot = \"/vault\"\n",
        "[vault]\nroot = \"/vault\"\n\n[github]\napi_base_url = \"ftp://example.com\"\n",
        "[vault]\nroot = \"/vault\"\n\n[publish]\noperation_timeout_seconds = 0\n",
        "[vault]\nroot = \"/vault\"\n\n[[publish.path_rewrite_rules]]\nfrom = \"\"\nto = \"x\"\n",
        "[vault]\nroot = \"/vault\"\n\n[logging]\nlocal_rotation = \"size\"\n",
    ];

    for contents in cases {
        let file = write_config(contents);
        assert!(
            load_config(file.path()).is_err(),
            "expected validation failure for:\n{contents}"
        );
    }
}

#[test]
fn test_missing_file_is_an_error() {
    let err = load_config("/definitely/not/here/garden.toml").unwrap_err();
    assert!(err.to_string().contains("garden.toml"));
}
