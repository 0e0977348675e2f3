//! Tests for Config
//!
//! These tests verify:
//! - Defaults
//! - Loading tables, database and misc settings from TOML
//! - Startup failures for bad transform names and settings

use std::path::PathBuf;
use std::time::Duration;

use socketmap_sql::config::{Config, DatabaseConfig};
use socketmap_sql::query::MultiRowPolicy;
use socketmap_sql::transform::{Builtin, Transform, TransformRegistry};
use tempfile::TempDir;

// =============================================================================
// Defaults
// =============================================================================

#[test]
fn test_defaults() {
    let config = Config::default();
    assert_eq!(config.database, DatabaseConfig::default());
    assert_eq!(config.database.driver, "sqlite");
    assert!(config.database.read_only);
    assert!(config.tables.is_empty());
    assert_eq!(config.multi_row, MultiRowPolicy::FirstRow);
    assert_eq!(config.max_requests, None);
    assert_eq!(config.idle_timeout, Some(Duration::from_secs(5)));
    assert_eq!(config.transform_options.recipient_delimiter, None);
}

#[test]
fn test_builder() {
    let config = Config::builder()
        .recipient_delimiter("+")
        .max_requests(10)
        .idle_timeout(None)
        .multi_row(MultiRowPolicy::Join(";".to_string()))
        .build();

    assert_eq!(config.transform_options.recipient_delimiter.as_deref(), Some("+"));
    assert_eq!(config.max_requests, Some(10));
    assert_eq!(config.idle_timeout, None);
    assert_eq!(config.multi_row, MultiRowPolicy::Join(";".to_string()));
}

// =============================================================================
// File Loading
// =============================================================================

const FULL_CONFIG: &str = r#"
[database]
driver = "sqlite"
path = "/var/lib/mail/virtual.db"
busy_timeout_ms = 250

[misc]
recipient_delimiter = "+"
max_requests = 500
multi_row = "join"
join_delimiter = " "

[tables.aliases]
query = "SELECT alias FROM aliases WHERE address = ?"

[tables.mailboxes]
query = "SELECT mailbox FROM users WHERE local = ? AND domain = ?"
transform = "split"

[tables.disabled]
transform = "domain"
"#;

#[test]
fn test_load_full_config() {
    let config = Config::from_toml_str(FULL_CONFIG, &TransformRegistry::new()).unwrap();

    assert_eq!(config.database.path, Some(PathBuf::from("/var/lib/mail/virtual.db")));
    assert_eq!(config.database.busy_timeout_ms, 250);
    assert!(config.database.read_only);

    assert_eq!(config.transform_options.recipient_delimiter.as_deref(), Some("+"));
    assert_eq!(config.max_requests, Some(500));
    assert_eq!(config.multi_row, MultiRowPolicy::Join(" ".to_string()));

    // Tables without a query are skipped
    assert_eq!(config.tables.names(), vec!["aliases", "mailboxes"]);

    let aliases = config.tables.get("aliases").unwrap();
    assert_eq!(aliases.query, "SELECT alias FROM aliases WHERE address = ?");
    assert!(matches!(aliases.transform, Transform::Builtin(Builtin::All)));

    let mailboxes = config.tables.get("mailboxes").unwrap();
    assert!(matches!(mailboxes.transform, Transform::Builtin(Builtin::Split)));
}

#[test]
fn test_empty_config() {
    let config = Config::from_toml_str("", &TransformRegistry::new()).unwrap();
    assert!(config.tables.is_empty());
    assert_eq!(config.database, DatabaseConfig::default());
}

#[test]
fn test_external_transform_resolved_at_load() {
    let mut transforms = TransformRegistry::new();
    transforms.register("reverse", |key, _| Ok(vec![key.chars().rev().collect()]));

    let config = Config::from_toml_str(
        "[tables.rev]\nquery = \"SELECT ?\"\ntransform = \"reverse\"\n",
        &transforms,
    )
    .unwrap();
    assert_eq!(config.tables.get("rev").unwrap().transform.name(), "reverse");
}

#[test]
fn test_unknown_transform_fails_at_load() {
    let err = Config::from_toml_str(
        "[tables.rev]\nquery = \"SELECT ?\"\ntransform = \"mymodule:reverse\"\n",
        &TransformRegistry::new(),
    )
    .unwrap_err();
    assert!(err.to_string().contains("unknown transform: mymodule:reverse"));
}

#[test]
fn test_bad_multi_row_policy() {
    let err = Config::from_toml_str("[misc]\nmulti_row = \"last\"\n", &TransformRegistry::new())
        .unwrap_err();
    assert!(err.to_string().contains("misc.multi_row"));
}

#[test]
fn test_unknown_key_rejected() {
    let result = Config::from_toml_str("[database]\nhost = \"db\"\n", &TransformRegistry::new());
    assert!(result.is_err());
}

#[test]
fn test_empty_recipient_delimiter_is_ignored() {
    let config =
        Config::from_toml_str("[misc]\nrecipient_delimiter = \"\"\n", &TransformRegistry::new())
            .unwrap();
    assert_eq!(config.transform_options.recipient_delimiter, None);
}

#[test]
fn test_load_from_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("socketmap-sql.toml");
    std::fs::write(&path, FULL_CONFIG).unwrap();

    let config = Config::load(&path, &TransformRegistry::new()).unwrap();
    assert_eq!(config.tables.len(), 2);
}

#[test]
fn test_load_missing_file() {
    let err = Config::load("/nonexistent/socketmap-sql.toml", &TransformRegistry::new()).unwrap_err();
    assert!(err.to_string().contains("failed to read"));
}
