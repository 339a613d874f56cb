//! Integration tests for building a registry from a configuration document.

use std::fs;

use session_registry::config::{ConfigError, RegistryConfig};
use session_registry::{SessionRegistry, UserId};
use tempfile::TempDir;

#[test]
fn registry_from_saved_config() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("registry.json");
    let original = RegistryConfig::default()
        .with_inactive_timeout(5)
        .with_cleanup_interval(2)
        .with_max_sessions_per_user(2)
        .with_auto_cleanup(false);
    original.save_to_file(&path).unwrap();

    let loaded = RegistryConfig::from_file(&path).unwrap();
    assert_eq!(loaded, original);

    let registry = SessionRegistry::new(loaded).unwrap();
    let alice = UserId::new("alice").unwrap();
    for _ in 0..3 {
        registry.create_session(&alice, None);
    }
    assert_eq!(registry.get_user_sessions(&alice).len(), 2);
}

#[test]
fn partial_document_uses_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("partial.json");
    fs::write(&path, r#"{ "max_sessions_per_user": 1, "enable_auto_cleanup": false }"#).unwrap();

    let config = RegistryConfig::from_file(&path).unwrap();

    assert_eq!(config.max_sessions_per_user, 1);
    assert_eq!(config.inactive_timeout, 1800);
    assert_eq!(config.cleanup_interval, 300);
    assert!(!config.enable_auto_cleanup);
}

#[test]
fn zero_cap_in_document_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.json");
    fs::write(&path, r#"{ "max_sessions_per_user": 0 }"#).unwrap();

    let result = RegistryConfig::from_file(&path);

    assert!(matches!(result, Err(ConfigError::ValidationFailed(_))));
}
